// ABOUTME: Workout program generation from free-form LLM output
// ABOUTME: Extracts JSON by regex, validates it into a typed program, and matches exercises to the catalog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{ChatMessage, ChatRequest, LlmProvider};
use crate::errors::{AppError, AppResult, ErrorCode};
use coach_core::models::{DayOfWeek, Exercise, PlannedExercise, ScheduledDay, Workout, WorkoutProgram};
use coach_intelligence::{match_exercise, MatchConfig};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Most working sets accepted for one exercise
const MAX_SETS: u32 = 20;

static FENCED_JSON: OnceLock<Option<Regex>> = OnceLock::new();
static BARE_JSON: OnceLock<Option<Regex>> = OnceLock::new();

fn fenced_json() -> Option<&'static Regex> {
    FENCED_JSON
        .get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").ok())
        .as_ref()
}

fn bare_json() -> Option<&'static Regex> {
    BARE_JSON
        .get_or_init(|| Regex::new(r"(?s)\{.*\}").ok())
        .as_ref()
}

/// First JSON object in `text`, preferring a fenced code block
///
/// # Errors
///
/// Returns an invalid format error when no parseable object is present
pub fn extract_json(text: &str) -> AppResult<serde_json::Value> {
    let fenced = fenced_json()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());
    let bare = bare_json().and_then(|re| re.find(text)).map(|m| m.as_str());

    for candidate in fenced.into_iter().chain(bare) {
        match serde_json::from_str::<serde_json::Value>(candidate) {
            Ok(value) if value.is_object() => return Ok(value),
            Ok(_) => {}
            Err(e) => debug!(error = %e, "JSON candidate did not parse"),
        }
    }
    Err(AppError::new(
        ErrorCode::InvalidFormat,
        "openrouter: response contained no JSON object",
    ))
}

fn lenient_day<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DayOfWeek, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let lower = raw.trim().to_lowercase();
    let day = match lower.get(..3).unwrap_or(lower.as_str()) {
        "mon" => DayOfWeek::Monday,
        "tue" => DayOfWeek::Tuesday,
        "wed" => DayOfWeek::Wednesday,
        "thu" => DayOfWeek::Thursday,
        "fri" => DayOfWeek::Friday,
        "sat" => DayOfWeek::Saturday,
        "sun" => DayOfWeek::Sunday,
        _ => {
            return Err(serde::de::Error::custom(format!(
                "unknown day of week: {raw}"
            )))
        }
    };
    Ok(day)
}

/// Reps arrive as `10` or `"8-12"`
fn reps_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid reps: {other}"))),
    }
}

/// Exercise as written by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedExercise {
    /// Free-text exercise name
    pub name: String,
    /// Working sets
    pub sets: u32,
    /// Rep prescription
    #[serde(deserialize_with = "reps_text")]
    pub reps: String,
    /// Rest between sets
    #[serde(default, alias = "rest")]
    pub rest_seconds: Option<u32>,
    /// Coaching notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// Workout as written by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedWorkout {
    /// Workout name, referenced by the schedule
    pub name: String,
    /// Training focus
    #[serde(default)]
    pub focus: Option<String>,
    /// Exercises in order
    pub exercises: Vec<GeneratedExercise>,
}

/// One scheduled weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDay {
    /// Weekday
    #[serde(deserialize_with = "lenient_day")]
    pub day: DayOfWeek,
    /// Workout name, `None` for rest
    #[serde(default)]
    pub workout: Option<String>,
}

/// Program as returned by the model, before catalog matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedProgram {
    /// Program name
    pub name: String,
    /// Summary
    #[serde(default)]
    pub description: Option<String>,
    /// Distinct workouts
    pub workouts: Vec<GeneratedWorkout>,
    /// Weekly layout; workouts are spread over the week when absent
    #[serde(default)]
    pub schedule: Vec<GeneratedDay>,
}

impl GeneratedProgram {
    /// Parse and validate a program from raw model output
    ///
    /// # Errors
    ///
    /// Returns an invalid format error if no JSON is found or it does not
    /// describe a usable program
    pub fn from_model_output(text: &str) -> AppResult<Self> {
        let value = extract_json(text)?;
        let program: Self = serde_json::from_value(value).map_err(|e| {
            AppError::new(
                ErrorCode::InvalidFormat,
                format!("generated program has the wrong shape: {e}"),
            )
        })?;
        program.validate()?;
        Ok(program)
    }

    /// Check structural rules the schema cannot express
    ///
    /// # Errors
    ///
    /// Returns a value-out-of-range error naming the first violation
    pub fn validate(&self) -> AppResult<()> {
        let invalid = |msg: String| Err(AppError::new(ErrorCode::ValueOutOfRange, msg));

        if self.name.trim().is_empty() {
            return invalid("program has no name".to_owned());
        }
        if self.workouts.is_empty() {
            return invalid("program has no workouts".to_owned());
        }
        let mut names = HashSet::new();
        for workout in &self.workouts {
            if !names.insert(workout.name.trim().to_lowercase()) {
                return invalid(format!("workout '{}' is defined twice", workout.name));
            }
            if workout.exercises.is_empty() {
                return invalid(format!("workout '{}' has no exercises", workout.name));
            }
            if let Some(exercise) = workout
                .exercises
                .iter()
                .find(|e| e.sets == 0 || e.sets > MAX_SETS)
            {
                return invalid(format!(
                    "{} in '{}' has {} sets",
                    exercise.name, workout.name, exercise.sets
                ));
            }
        }

        let mut days = HashSet::new();
        for scheduled in &self.schedule {
            if !days.insert(scheduled.day) {
                return invalid(format!("{:?} is scheduled twice", scheduled.day));
            }
            if let Some(name) = &scheduled.workout {
                if !names.contains(&name.trim().to_lowercase()) {
                    return invalid(format!("schedule references unknown workout '{name}'"));
                }
            }
        }
        Ok(())
    }

    fn workout(&self, name: &str) -> Option<&GeneratedWorkout> {
        let name = name.trim();
        self.workouts
            .iter()
            .find(|w| w.name.trim().eq_ignore_ascii_case(name))
    }
}

/// Training days used when the model gave no schedule
fn default_days(count: usize) -> &'static [DayOfWeek] {
    use DayOfWeek::{Friday, Monday, Saturday, Sunday, Thursday, Tuesday, Wednesday};
    match count {
        0 => &[],
        1 => &[Monday],
        2 => &[Monday, Thursday],
        3 => &[Monday, Wednesday, Friday],
        4 => &[Monday, Tuesday, Thursday, Friday],
        5 => &[Monday, Tuesday, Wednesday, Thursday, Friday],
        6 => &[Monday, Tuesday, Wednesday, Thursday, Friday, Saturday],
        _ => &[Monday, Tuesday, Wednesday, Thursday, Friday, Saturday, Sunday],
    }
}

/// What the athlete asked for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramRequest {
    /// Training goal, e.g. "hypertrophy"
    pub goal: String,
    /// Experience level
    pub experience: String,
    /// Training days per week, 1-7
    pub days_per_week: u8,
    /// Available equipment
    #[serde(default)]
    pub equipment: Vec<String>,
    /// Session length
    #[serde(default)]
    pub session_minutes: Option<u32>,
    /// Injuries, preferences
    #[serde(default)]
    pub notes: Option<String>,
}

impl ProgramRequest {
    fn validate(&self) -> AppResult<()> {
        if !(1..=7).contains(&self.days_per_week) {
            return Err(AppError::new(
                ErrorCode::ValueOutOfRange,
                "days_per_week must be between 1 and 7",
            ));
        }
        if self.goal.trim().is_empty() {
            return Err(AppError::missing_field("goal"));
        }
        Ok(())
    }

    fn messages(&self) -> Vec<ChatMessage> {
        let mut user = format!(
            "Goal: {}\nExperience: {}\nDays per week: {}\n",
            self.goal, self.experience, self.days_per_week
        );
        if !self.equipment.is_empty() {
            user.push_str(&format!("Equipment: {}\n", self.equipment.join(", ")));
        }
        if let Some(minutes) = self.session_minutes {
            user.push_str(&format!("Session length: {minutes} minutes\n"));
        }
        if let Some(notes) = &self.notes {
            user.push_str(&format!("Notes: {notes}\n"));
        }
        vec![
            ChatMessage::system(
                "Reply with one JSON object: {\"name\", \"description\", \"workouts\": \
                 [{\"name\", \"focus\", \"exercises\": [{\"name\", \"sets\", \"reps\", \
                 \"rest_seconds\", \"notes\"}]}], \"schedule\": [{\"day\", \"workout\"}]}",
            ),
            ChatMessage::user(user),
        ]
    }
}

/// Generates programs and resolves their exercises against the catalog
pub struct ProgramGenerator {
    provider: Arc<dyn LlmProvider>,
    catalog: Vec<Exercise>,
    match_config: MatchConfig,
}

impl ProgramGenerator {
    /// Generator over `provider`, matching against `catalog`
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, catalog: Vec<Exercise>) -> Self {
        Self {
            provider,
            catalog,
            match_config: MatchConfig::default(),
        }
    }

    /// Override matching weights and threshold
    #[must_use]
    pub const fn with_match_config(mut self, match_config: MatchConfig) -> Self {
        self.match_config = match_config;
        self
    }

    /// Ask the model for a program and validate the answer
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid, the model call fails or
    /// times out, or the output is not a valid program
    pub async fn generate(&self, request: &ProgramRequest) -> AppResult<GeneratedProgram> {
        request.validate()?;
        let chat = ChatRequest::new(request.messages()).with_temperature(0.7);
        let response = self.provider.complete(&chat).await?;
        let program = GeneratedProgram::from_model_output(&response.content)?;
        info!(
            provider = self.provider.name(),
            workouts = program.workouts.len(),
            "Program generated"
        );
        Ok(program)
    }

    /// Turn a validated program into an inactive program for `user_id`
    #[must_use]
    pub fn build_program(&self, generated: &GeneratedProgram, user_id: Uuid) -> WorkoutProgram {
        let schedule = if generated.schedule.is_empty() {
            default_days(generated.workouts.len())
                .iter()
                .zip(&generated.workouts)
                .map(|(day, workout)| ScheduledDay {
                    day: *day,
                    workout: Some(self.resolve_workout(workout)),
                })
                .collect()
        } else {
            let mut days: Vec<ScheduledDay> = generated
                .schedule
                .iter()
                .map(|scheduled| ScheduledDay {
                    day: scheduled.day,
                    workout: scheduled
                        .workout
                        .as_deref()
                        .and_then(|name| generated.workout(name))
                        .map(|workout| self.resolve_workout(workout)),
                })
                .collect();
            days.sort_by_key(|d| d.day);
            days
        };

        WorkoutProgram {
            id: Uuid::new_v4(),
            user_id,
            name: generated.name.trim().to_owned(),
            is_active: false,
            schedule,
        }
    }

    /// Generate and build in one step
    ///
    /// # Errors
    ///
    /// See [`Self::generate`]
    pub async fn generate_program(
        &self,
        request: &ProgramRequest,
        user_id: Uuid,
    ) -> AppResult<WorkoutProgram> {
        let generated = self.generate(request).await?;
        Ok(self.build_program(&generated, user_id))
    }

    fn resolve_workout(&self, workout: &GeneratedWorkout) -> Workout {
        Workout {
            name: workout.name.trim().to_owned(),
            focus: workout.focus.clone(),
            exercises: workout
                .exercises
                .iter()
                .map(|exercise| self.resolve_exercise(exercise))
                .collect(),
        }
    }

    fn resolve_exercise(&self, exercise: &GeneratedExercise) -> PlannedExercise {
        let matched = match_exercise(&exercise.name, &self.catalog, &self.match_config);
        let (name, exercise_id) = match matched {
            Some(m) => {
                debug!(query = %exercise.name, matched = %m.exercise.name, score = m.score, "Exercise matched");
                (m.exercise.name.clone(), Some(m.exercise.id.clone()))
            }
            None => {
                warn!(query = %exercise.name, "No catalog match for generated exercise");
                (exercise.name.trim().to_owned(), None)
            }
        };
        PlannedExercise {
            name,
            exercise_id,
            sets: exercise.sets,
            reps: exercise.reps.clone(),
            rest_seconds: exercise.rest_seconds,
            notes: exercise.notes.clone(),
        }
    }
}
