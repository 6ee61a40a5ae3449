//! Streak computation over day logs.
//!
//! A streak is the number of consecutive calendar days, ending at and
//! including an anchor date, on which a day qualifies. Both walks stop at
//! the first day without a qualifying log and never visit more days than
//! there are distinct dates in the history.

use crate::calendar::DateKey;
use crate::{DayLog, Exercise};
use std::collections::{BTreeSet, HashMap};

/// Consecutive days ending at `from` on which `exercise_id` was completed
pub fn exercise_streak(exercise_id: &str, logs: &[DayLog], from: DateKey) -> u32 {
    let streak = walk_back(logs, from, |completed| completed.contains(exercise_id));
    tracing::debug!("Streak for {} from {}: {}", exercise_id, from, streak);
    streak
}

/// Consecutive days ending at `from` on which every current exercise was completed
///
/// Only the routine as it is now is checked, so days completed under an
/// older, smaller routine stop counting once an exercise is added.
pub fn overall_streak(exercises: &[Exercise], logs: &[DayLog], from: DateKey) -> u32 {
    if exercises.is_empty() {
        return 0;
    }

    let streak = walk_back(logs, from, |completed| {
        exercises.iter().all(|e| completed.contains(&e.id))
    });
    tracing::debug!("Overall streak from {}: {}", from, streak);
    streak
}

/// Count qualifying days walking backward from `from`
fn walk_back<F>(logs: &[DayLog], from: DateKey, qualifies: F) -> u32
where
    F: Fn(&BTreeSet<String>) -> bool,
{
    let by_date: HashMap<DateKey, &BTreeSet<String>> =
        logs.iter().map(|log| (log.date, &log.completed)).collect();

    let mut streak = 0;
    let mut current = Some(from);

    // Each counted day is a distinct key in `by_date`, so the map size bounds the walk
    while let Some(day) = current {
        if streak as usize >= by_date.len() {
            break;
        }
        match by_date.get(&day) {
            Some(completed) if qualifies(completed) => {
                streak += 1;
                current = day.previous();
            }
            _ => break,
        }
    }

    streak
}
