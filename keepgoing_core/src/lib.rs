#![forbid(unsafe_code)]

//! Core domain model and business logic for the KeepGoing habit tracker.
//!
//! This crate provides:
//! - Domain types (exercises, targets, day logs, progress bookkeeping)
//! - Calendar date keys
//! - Streak computation
//! - Progression prompts
//! - Routine editing and the daily toggle flow
//! - Persistence (JSON file store) and configuration

pub mod types;
pub mod error;
pub mod calendar;
pub mod config;
pub mod logging;
pub mod streaks;
pub mod progression;
pub mod routine;
pub mod tracker;
pub mod store;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use calendar::{previous_day, today, DateKey};
pub use config::Config;
pub use streaks::{exercise_streak, overall_streak};
pub use progression::{
    accept_prompt, evaluate_prompt, resolve_prompt, should_prompt_increase, skip_prompt,
    ProgressionPolicy, PromptOffer, PromptResponse, StreakPrompt,
};
pub use routine::{
    add_exercise, complete_onboarding, move_exercise, remove_exercise, update_exercise,
    ExerciseDraft, ExercisePatch,
};
pub use tracker::{daily_board, toggle_exercise, BoardRow, DailyBoard, ToggleOutcome};
pub use store::{AppStore, JsonFileStore, MemoryStore};
