//! Daily check-off flow.
//!
//! Toggling an exercise updates today's log, recomputes streaks against
//! the updated snapshot and, on a not-done to done transition only,
//! evaluates whether a progression prompt is due.

use crate::calendar::DateKey;
use crate::progression::{evaluate_prompt, ProgressionPolicy, StreakPrompt};
use crate::streaks::{exercise_streak, overall_streak};
use crate::{AppData, Error, ExerciseKind, Result, Target};

/// Result of toggling one exercise for a day
#[derive(Clone, Debug, PartialEq)]
pub struct ToggleOutcome {
    pub exercise_id: String,
    /// Completion state after the toggle
    pub completed: bool,
    /// Exercise streak after the toggle
    pub streak: u32,
    /// Whole-routine streak after the toggle
    pub overall_streak: u32,
    /// Every current exercise is done for the day
    pub routine_complete: bool,
    /// Progression prompt to show, if a milestone was reached
    pub prompt: Option<StreakPrompt>,
}

/// Flip completion of `exercise_id` on `today`
pub fn toggle_exercise(
    data: &mut AppData,
    exercise_id: &str,
    today: DateKey,
    policy: &ProgressionPolicy,
) -> Result<ToggleOutcome> {
    if !data.onboarded {
        return Err(Error::NotOnboarded);
    }
    if data.exercise(exercise_id).is_none() {
        return Err(Error::UnknownExercise(exercise_id.to_string()));
    }

    let log = data.log_for_mut(today);
    let completed = if log.completed.remove(exercise_id) {
        false
    } else {
        log.completed.insert(exercise_id.to_string());
        true
    };

    let streak = exercise_streak(exercise_id, &data.logs, today);
    let overall = overall_streak(&data.exercises, &data.logs, today);
    let routine_complete = data
        .log_for(today)
        .map(|log| data.exercises.iter().all(|e| log.is_completed(&e.id)))
        .unwrap_or(false);

    let prompt = if completed {
        data.exercise(exercise_id)
            .and_then(|exercise| evaluate_prompt(exercise, streak, &data.progress, policy))
    } else {
        None
    };

    tracing::info!(
        "Toggled {} on {}: completed={}, streak={}",
        exercise_id,
        today,
        completed,
        streak
    );

    Ok(ToggleOutcome {
        exercise_id: exercise_id.to_string(),
        completed,
        streak,
        overall_streak: overall,
        routine_complete,
        prompt,
    })
}

/// One exercise as shown on the daily board
#[derive(Clone, Debug, PartialEq)]
pub struct BoardRow {
    pub exercise_id: String,
    pub name: String,
    pub target: Target,
    pub kind: ExerciseKind,
    pub completed: bool,
    pub streak: u32,
}

/// Today's routine with completion state and streaks
#[derive(Clone, Debug, PartialEq)]
pub struct DailyBoard {
    pub date: DateKey,
    pub rows: Vec<BoardRow>,
    pub completed_count: usize,
    pub total: usize,
    pub overall_streak: u32,
}

impl DailyBoard {
    pub fn all_done(&self) -> bool {
        self.total > 0 && self.completed_count == self.total
    }
}

/// Build the daily board for `today` in routine order
pub fn daily_board(data: &AppData, today: DateKey) -> DailyBoard {
    let log = data.log_for(today);

    let rows: Vec<BoardRow> = data
        .exercises
        .iter()
        .map(|exercise| BoardRow {
            exercise_id: exercise.id.clone(),
            name: exercise.name.clone(),
            target: exercise.target.clone(),
            kind: exercise.kind,
            completed: log.map(|l| l.is_completed(&exercise.id)).unwrap_or(false),
            streak: exercise_streak(&exercise.id, &data.logs, today),
        })
        .collect();

    let completed_count = rows.iter().filter(|r| r.completed).count();

    DailyBoard {
        date: today,
        total: rows.len(),
        completed_count,
        overall_streak: overall_streak(&data.exercises, &data.logs, today),
        rows,
    }
}
