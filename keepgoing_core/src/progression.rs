//! Progression prompts for increasing an exercise's target.
//!
//! When an exercise streak crosses a milestone (every 10 days by default)
//! the user is offered a harder target once. Accepting or skipping both
//! mark the milestone as seen, so the same boundary never prompts twice.

use crate::{AppData, Error, Exercise, ProgressState, Result, Target};

/// Streak length between progression prompts
pub const DEFAULT_MILESTONE_INTERVAL: u32 = 10;

/// Amount added to a numeric target when an increase is accepted
pub const DEFAULT_TARGET_INCREMENT: u32 = 2;

/// Milestone spacing and increment used to gate and apply increases
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressionPolicy {
    pub milestone_interval: u32,
    pub target_increment: u32,
}

impl Default for ProgressionPolicy {
    fn default() -> Self {
        Self {
            milestone_interval: DEFAULT_MILESTONE_INTERVAL,
            target_increment: DEFAULT_TARGET_INCREMENT,
        }
    }
}

impl ProgressionPolicy {
    /// Highest milestone reached by `streak` (0 below the first one)
    pub fn milestone(&self, streak: u32) -> u32 {
        let interval = self.milestone_interval.max(1);
        (streak / interval) * interval
    }

    /// Whether `streak` has crossed a milestone not yet prompted for
    pub fn should_prompt(&self, streak: u32, last_prompted: Option<u32>) -> bool {
        if streak < self.milestone_interval.max(1) {
            return false;
        }

        let milestone = self.milestone(streak);
        let last_milestone = last_prompted.map(|s| self.milestone(s)).unwrap_or(0);

        milestone > last_milestone
    }

    /// What the prompt can offer for this target
    pub fn offer_for(&self, target: &Target) -> PromptOffer {
        match target {
            Target::Count { value } => PromptOffer::Increase {
                from: *value,
                to: value.saturating_add(self.target_increment),
            },
            Target::Label { .. } => PromptOffer::Acknowledge,
        }
    }
}

/// Prompt decision with the default 10-day milestones
pub fn should_prompt_increase(streak: u32, last_prompted: Option<u32>) -> bool {
    ProgressionPolicy::default().should_prompt(streak, last_prompted)
}

/// What a shown prompt lets the user do
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptOffer {
    /// Numeric target: raise `from` to `to`
    Increase { from: u32, to: u32 },
    /// Label target: congratulate only, the target stays as written
    Acknowledge,
}

/// A progression prompt to present after a toggle
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreakPrompt {
    pub exercise_id: String,
    pub exercise_name: String,
    pub streak: u32,
    pub offer: PromptOffer,
}

/// The user's answer to a shown prompt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptResponse {
    Accept,
    Skip,
}

/// Decide whether `exercise` at `streak` should show a prompt
pub fn evaluate_prompt(
    exercise: &Exercise,
    streak: u32,
    progress: &ProgressState,
    policy: &ProgressionPolicy,
) -> Option<StreakPrompt> {
    let last_prompted = progress.last_prompted(&exercise.id);
    if !policy.should_prompt(streak, last_prompted) {
        return None;
    }

    tracing::info!(
        "{} reached a {}-day streak (last prompted at {:?})",
        exercise.name,
        streak,
        last_prompted
    );

    Some(StreakPrompt {
        exercise_id: exercise.id.clone(),
        exercise_name: exercise.name.clone(),
        streak,
        offer: policy.offer_for(&exercise.target),
    })
}

/// Accept the offered increase: raise the target and mark the milestone seen
///
/// The increment is applied to the exercise's current target, so an edit
/// made while the prompt was on screen is built upon rather than replaced.
/// Returns the new target value.
pub fn accept_prompt(
    data: &mut AppData,
    prompt: &StreakPrompt,
    policy: &ProgressionPolicy,
) -> Result<u32> {
    let exercise = data
        .exercises
        .iter_mut()
        .find(|e| e.id == prompt.exercise_id)
        .ok_or_else(|| Error::UnknownExercise(prompt.exercise_id.clone()))?;

    let to = match policy.offer_for(&exercise.target) {
        PromptOffer::Increase { to, .. } => to,
        PromptOffer::Acknowledge => {
            return Err(Error::Progression(format!(
                "{} has a non-numeric target; only acknowledgement is possible",
                exercise.name
            )));
        }
    };

    exercise.target = Target::Count { value: to };
    data.progress.record_prompt(&prompt.exercise_id, prompt.streak);

    tracing::info!("Increased {} target to {}", prompt.exercise_name, to);
    Ok(to)
}

/// Decline or acknowledge the prompt: only mark the milestone seen
///
/// Nothing is recorded for an exercise removed since the prompt was shown.
pub fn skip_prompt(data: &mut AppData, prompt: &StreakPrompt) {
    if data.exercise(&prompt.exercise_id).is_none() {
        tracing::debug!(
            "Exercise {} no longer in routine, skip not recorded",
            prompt.exercise_id
        );
        return;
    }

    data.progress.record_prompt(&prompt.exercise_id, prompt.streak);
    tracing::info!(
        "Skipped increase for {} at {}-day streak",
        prompt.exercise_name,
        prompt.streak
    );
}

/// Apply the user's response to a shown prompt
///
/// Returns the new target value when an increase was accepted.
pub fn resolve_prompt(
    data: &mut AppData,
    prompt: &StreakPrompt,
    response: PromptResponse,
    policy: &ProgressionPolicy,
) -> Result<Option<u32>> {
    match response {
        PromptResponse::Accept => accept_prompt(data, prompt, policy).map(Some),
        PromptResponse::Skip => {
            skip_prompt(data, prompt);
            Ok(None)
        }
    }
}
