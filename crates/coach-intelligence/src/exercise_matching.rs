// ABOUTME: Fuzzy exercise name matching using Levenshtein similarity and weighted scoring
// ABOUTME: Maps free-form names from generated programs onto the exercise catalog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use coach_core::models::Exercise;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Equipment words recognised in free-form exercise names
const EQUIPMENT_WORDS: &[&str] = &[
    "barbell",
    "dumbbell",
    "kettlebell",
    "cable",
    "machine",
    "band",
    "bodyweight",
    "smith",
];

/// Weights and acceptance threshold for exercise matching
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Weight of whole-name Levenshtein similarity
    pub name_weight: f64,
    /// Weight of word overlap (Jaccard index)
    pub token_weight: f64,
    /// Weight of agreeing equipment
    pub equipment_weight: f64,
    /// Minimum score for a match to be accepted
    pub threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            name_weight: 0.6,
            token_weight: 0.3,
            equipment_weight: 0.1,
            threshold: 0.55,
        }
    }
}

/// Best catalog entry for a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExerciseMatch<'a> {
    /// Matched catalog entry
    pub exercise: &'a Exercise,
    /// Weighted score in `[0, 1]`
    pub score: f64,
}

/// Edit distance between two strings, counted in chars
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

fn singular(word: &str) -> &str {
    if let Some(stem) = word.strip_suffix("es") {
        if ["ss", "sh", "ch", "x"].iter().any(|end| stem.ends_with(end)) {
            return stem;
        }
    }
    match word.strip_suffix('s') {
        Some(stem) if stem.len() > 2 && !stem.ends_with('s') => stem,
        _ => word,
    }
}

fn normalize(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(singular)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Levenshtein similarity `1 - distance / max_len` of the normalized names
#[must_use]
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / max_len as f64
}

fn token_overlap(a: &str, b: &str) -> f64 {
    let a: HashSet<&str> = a.split_whitespace().collect();
    let b: HashSet<&str> = b.split_whitespace().collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

fn equipment_agreement(query: &str, exercise: &Exercise) -> f64 {
    let Some(mentioned) = EQUIPMENT_WORDS.iter().find(|word| query.contains(*word)) else {
        return 0.5;
    };
    let haystack = format!(
        "{} {}",
        normalize(&exercise.name),
        exercise.equipment.as_deref().map(normalize).unwrap_or_default()
    );
    if haystack.contains(mentioned) {
        1.0
    } else {
        0.0
    }
}

fn score(query: &str, exercise: &Exercise, config: &MatchConfig) -> f64 {
    let candidate = normalize(&exercise.name);
    if candidate == query {
        return 1.0;
    }
    config.name_weight * name_similarity(query, &candidate)
        + config.token_weight * token_overlap(query, &candidate)
        + config.equipment_weight * equipment_agreement(query, exercise)
}

/// Best catalog match for `query`, or `None` when nothing clears the threshold
#[must_use]
pub fn match_exercise<'a>(
    query: &str,
    catalog: &'a [Exercise],
    config: &MatchConfig,
) -> Option<ExerciseMatch<'a>> {
    let query = normalize(query);
    if query.is_empty() {
        return None;
    }

    catalog
        .par_iter()
        .map(|exercise| ExerciseMatch {
            exercise,
            score: score(&query, exercise, config),
        })
        .filter(|candidate| candidate.score >= config.threshold)
        .max_by(|a, b| a.score.total_cmp(&b.score))
}
