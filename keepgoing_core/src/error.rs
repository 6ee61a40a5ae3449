//! Error types for the keepgoing_core library.

use std::fmt;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for keepgoing_core operations
#[derive(thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Exercise fields failed validation (empty name or target)
    #[error("Invalid exercise: {0}")]
    InvalidExercise(String),

    /// No exercise with this id in the routine
    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    /// The routine must keep at least one exercise
    #[error("You need at least one exercise in your routine")]
    LastExercise,

    /// Onboarding attempted with no exercises
    #[error("Add at least one exercise to start")]
    EmptyRoutine,

    /// Routine has not been set up yet
    #[error("No routine yet - run `keepgoing onboard` first")]
    NotOnboarded,

    /// Date key not in YYYY-MM-DD form
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Progression prompt could not be resolved as requested
    #[error("Progression error: {0}")]
    Progression(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

// `main` returns this type, so its Debug output is what users see on failure
impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
