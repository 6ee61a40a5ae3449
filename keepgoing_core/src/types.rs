//! Core domain types for the KeepGoing habit tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and their daily targets
//! - Day logs of completed exercises
//! - Progression prompt bookkeeping
//! - The persisted application aggregate

use crate::calendar::DateKey;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Exercise Types
// ============================================================================

/// Type of exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    #[default]
    Weights,
    Yoga,
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseKind::Weights => write!(f, "weights"),
            ExerciseKind::Yoga => write!(f, "yoga"),
        }
    }
}

impl FromStr for ExerciseKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "weights" => Ok(ExerciseKind::Weights),
            "yoga" => Ok(ExerciseKind::Yoga),
            other => Err(crate::Error::InvalidExercise(format!(
                "unknown exercise type '{}'",
                other
            ))),
        }
    }
}

/// Daily target for an exercise
///
/// Decided once when the exercise is entered: a plain number is a
/// [`Target::Count`] that progression can raise, anything else (`30s`,
/// `1 min`, `3 sets`) is a [`Target::Label`] shown as written.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Target {
    Count { value: u32 },
    Label { text: String },
}

impl Target {
    /// Classify user input as a count or a free-form label
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(value) = trimmed.parse::<u32>() {
                return Target::Count { value };
            }
        }
        Target::Label {
            text: trimmed.to_string(),
        }
    }

    /// Keep the input as a label even if it looks numeric
    pub fn label(input: &str) -> Self {
        Target::Label {
            text: input.trim().to_string(),
        }
    }

    pub fn count(&self) -> Option<u32> {
        match self {
            Target::Count { value } => Some(*value),
            Target::Label { .. } => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Target::Label { text } if text.is_empty())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Count { value } => write!(f, "{}", value),
            Target::Label { text } => write!(f, "{}", text),
        }
    }
}

/// An exercise in the user's daily routine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub target: Target,
    #[serde(default)]
    pub kind: ExerciseKind,
    pub order: u32,
}

// ============================================================================
// Log and Progress Types
// ============================================================================

/// Exercises completed on one calendar day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DayLog {
    pub date: DateKey,
    #[serde(default)]
    pub completed: BTreeSet<String>,
}

impl DayLog {
    pub fn new(date: DateKey) -> Self {
        Self {
            date,
            completed: BTreeSet::new(),
        }
    }

    pub fn is_completed(&self, exercise_id: &str) -> bool {
        self.completed.contains(exercise_id)
    }
}

/// Streak length at which each exercise was last prompted to progress
///
/// A missing entry means the exercise has never been prompted.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct ProgressState {
    #[serde(default)]
    pub last_streak_prompt: HashMap<String, u32>,
}

impl ProgressState {
    pub fn last_prompted(&self, exercise_id: &str) -> Option<u32> {
        self.last_streak_prompt.get(exercise_id).copied()
    }

    pub fn record_prompt(&mut self, exercise_id: &str, streak: u32) {
        self.last_streak_prompt.insert(exercise_id.to_string(), streak);
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// Everything persisted on the device
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct AppData {
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default, deserialize_with = "deserialize_logs_lenient")]
    pub logs: Vec<DayLog>,
    #[serde(default)]
    pub onboarded: bool,
    #[serde(default)]
    pub progress: ProgressState,
}

impl AppData {
    pub fn exercise(&self, exercise_id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == exercise_id)
    }

    pub fn log_for(&self, date: DateKey) -> Option<&DayLog> {
        self.logs.iter().find(|log| log.date == date)
    }

    /// The log for `date`, created empty on first use
    pub fn log_for_mut(&mut self, date: DateKey) -> &mut DayLog {
        let index = match self.logs.iter().position(|log| log.date == date) {
            Some(index) => index,
            None => {
                tracing::debug!("Creating day log for {}", date);
                self.logs.push(DayLog::new(date));
                self.logs.len() - 1
            }
        };
        &mut self.logs[index]
    }
}

/// Deserialize day logs, skipping entries that fail to parse
fn deserialize_logs_lenient<'de, D>(deserializer: D) -> std::result::Result<Vec<DayLog>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    let mut logs = Vec::with_capacity(raw.len());

    for (index, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<DayLog>(value) {
            Ok(log) => logs.push(log),
            Err(e) => {
                tracing::warn!("Skipping malformed day log at index {}: {}", index, e);
            }
        }
    }

    Ok(logs)
}
