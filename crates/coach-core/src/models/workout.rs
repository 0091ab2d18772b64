// ABOUTME: Workout models for weekly programs, sessions, sets, and the exercise catalog
// ABOUTME: A program's weekly schedule is sliced per weekday to find today's workout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Day of the week as stored in program schedules
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    /// Monday
    Monday,
    /// Tuesday
    Tuesday,
    /// Wednesday
    Wednesday,
    /// Thursday
    Thursday,
    /// Friday
    Friday,
    /// Saturday
    Saturday,
    /// Sunday
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

/// Exercise prescribed inside a workout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannedExercise {
    /// Exercise name as written by the coach or generator
    pub name: String,
    /// Catalog id once matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<String>,
    /// Number of working sets
    pub sets: u32,
    /// Rep prescription, e.g. "8-12"
    pub reps: String,
    /// Rest between sets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_seconds: Option<u32>,
    /// Free-form coaching notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Single workout of a program
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    /// Workout name, e.g. "Upper Body A"
    pub name: String,
    /// Training focus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
    /// Exercises in order
    #[serde(default)]
    pub exercises: Vec<PlannedExercise>,
}

/// One weekday of a program's schedule; no workout means rest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledDay {
    /// Weekday
    pub day: DayOfWeek,
    /// Planned workout, `None` on rest days
    #[serde(default)]
    pub workout: Option<Workout>,
}

/// Workout program with a repeating weekly schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutProgram {
    /// Row id
    pub id: Uuid,
    /// Athlete
    pub user_id: Uuid,
    /// Program name
    pub name: String,
    /// Only one program is active at a time
    #[serde(default)]
    pub is_active: bool,
    /// Weekly schedule
    #[serde(default)]
    pub schedule: Vec<ScheduledDay>,
}

impl WorkoutProgram {
    /// Workout planned for the weekday of `date`, `None` on rest days
    #[must_use]
    pub fn workout_for(&self, date: NaiveDate) -> Option<&Workout> {
        use chrono::Datelike;
        let day = DayOfWeek::from(date.weekday());
        self.schedule
            .iter()
            .find(|scheduled| scheduled.day == day)
            .and_then(|scheduled| scheduled.workout.as_ref())
    }
}

/// Workout session performed by an athlete
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSession {
    /// Row id
    pub id: Uuid,
    /// Athlete
    pub user_id: Uuid,
    /// Program the session belongs to
    #[serde(default)]
    pub program_id: Option<Uuid>,
    /// Workout performed
    pub workout_name: String,
    /// Local calendar date
    pub date: NaiveDate,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// Completion time, `None` while in progress
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Set performed within a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSet {
    /// Row id
    pub id: Uuid,
    /// Owning session
    pub session_id: Uuid,
    /// Athlete
    pub user_id: Uuid,
    /// Exercise name
    pub exercise_name: String,
    /// 1-based set index
    pub set_number: u32,
    /// Repetitions completed
    pub reps: u32,
    /// Load in kilograms
    #[serde(default)]
    pub weight_kg: Option<f64>,
    /// When the set was logged
    pub completed_at: DateTime<Utc>,
}

/// Entry of the exercise catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    /// Catalog id
    pub id: String,
    /// Canonical name
    pub name: String,
    /// Primary and secondary muscle groups
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    /// Required equipment
    #[serde(default)]
    pub equipment: Option<String>,
    /// Category (strength, cardio, mobility)
    #[serde(default)]
    pub category: Option<String>,
}
