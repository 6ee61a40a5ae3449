//! Routine setup and editing.
//!
//! The routine is the ordered list of exercises the user does every day.
//! After onboarding it always holds at least one exercise, and `order`
//! values are kept dense (`0..n`) in display order.

use crate::{AppData, Error, Exercise, ExerciseKind, Result, Target};
use uuid::Uuid;

/// Validated input for a new or edited exercise
#[derive(Clone, Debug, PartialEq)]
pub struct ExerciseDraft {
    pub name: String,
    pub target: Target,
    pub kind: ExerciseKind,
}

impl ExerciseDraft {
    /// Trim and validate; name and target must both be non-empty
    pub fn new(name: &str, target: Target, kind: ExerciseKind) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidExercise("name must not be empty".into()));
        }
        if target.is_empty() {
            return Err(Error::InvalidExercise(format!(
                "target for '{}' must not be empty",
                name
            )));
        }

        Ok(Self {
            name: name.to_string(),
            target,
            kind,
        })
    }

    fn into_exercise(self, order: u32) -> Exercise {
        Exercise {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            target: self.target,
            kind: self.kind,
            order,
        }
    }
}

/// Partial update for an existing exercise
#[derive(Clone, Debug, Default)]
pub struct ExercisePatch {
    pub name: Option<String>,
    pub target: Option<Target>,
    pub kind: Option<ExerciseKind>,
}

/// Set up the initial routine and mark the user as onboarded
pub fn complete_onboarding(data: &mut AppData, drafts: Vec<ExerciseDraft>) -> Result<()> {
    if drafts.is_empty() {
        return Err(Error::EmptyRoutine);
    }

    data.exercises = drafts
        .into_iter()
        .enumerate()
        .map(|(i, draft)| draft.into_exercise(i as u32))
        .collect();
    data.onboarded = true;

    tracing::info!("Onboarded with {} exercises", data.exercises.len());
    Ok(())
}

/// Append a new exercise to the end of the routine
pub fn add_exercise(data: &mut AppData, draft: ExerciseDraft) -> &Exercise {
    let exercise = draft.into_exercise(data.exercises.len() as u32);
    tracing::info!("Added exercise {} ({})", exercise.name, exercise.id);
    data.exercises.push(exercise);
    renumber(data);
    &data.exercises[data.exercises.len() - 1]
}

/// Change name, target or kind of an exercise in place
pub fn update_exercise(data: &mut AppData, exercise_id: &str, patch: ExercisePatch) -> Result<()> {
    let exercise = data
        .exercises
        .iter_mut()
        .find(|e| e.id == exercise_id)
        .ok_or_else(|| Error::UnknownExercise(exercise_id.to_string()))?;

    let name = patch.name.unwrap_or_else(|| exercise.name.clone());
    let target = patch.target.unwrap_or_else(|| exercise.target.clone());
    let kind = patch.kind.unwrap_or(exercise.kind);
    let draft = ExerciseDraft::new(&name, target, kind)?;

    exercise.name = draft.name;
    exercise.target = draft.target;
    exercise.kind = draft.kind;

    tracing::info!("Updated exercise {}", exercise_id);
    Ok(())
}

/// Remove an exercise; the last remaining exercise cannot be removed
///
/// Past day logs keep the id; streak computation ignores it.
pub fn remove_exercise(data: &mut AppData, exercise_id: &str) -> Result<Exercise> {
    let index = data
        .exercises
        .iter()
        .position(|e| e.id == exercise_id)
        .ok_or_else(|| Error::UnknownExercise(exercise_id.to_string()))?;

    if data.exercises.len() <= 1 {
        return Err(Error::LastExercise);
    }

    let removed = data.exercises.remove(index);
    data.progress.last_streak_prompt.remove(exercise_id);
    renumber(data);

    tracing::info!("Removed exercise {} ({})", removed.name, removed.id);
    Ok(removed)
}

/// Move an exercise to `position` (0-based, clamped to the routine length)
pub fn move_exercise(data: &mut AppData, exercise_id: &str, position: usize) -> Result<()> {
    let index = data
        .exercises
        .iter()
        .position(|e| e.id == exercise_id)
        .ok_or_else(|| Error::UnknownExercise(exercise_id.to_string()))?;

    let exercise = data.exercises.remove(index);
    let position = position.min(data.exercises.len());
    data.exercises.insert(position, exercise);
    renumber(data);

    tracing::debug!("Moved exercise {} to position {}", exercise_id, position);
    Ok(())
}

/// Reassign dense `order` values from the current list positions
fn renumber(data: &mut AppData) {
    for (i, exercise) in data.exercises.iter_mut().enumerate() {
        exercise.order = i as u32;
    }
}

/// Sort exercises by their stored `order` and make the values dense
///
/// Applied to data read from storage, which may have gaps or ties.
pub fn normalize_order(data: &mut AppData) {
    data.exercises.sort_by_key(|e| e.order);
    renumber(data);
}
