//! Feature modules backed by the local store.
//!
//! Each module is a thin borrowing wrapper over a [`LocalStore`](crate::store::LocalStore)
//! that loads its collection, applies one change and writes it back.
//! Callers pass `today` explicitly so date-dependent logic stays deterministic.

pub mod habits;
pub mod notes;
pub mod tasks;
pub mod timer;
pub mod today;

pub use habits::{Habit, Habits, streak};
pub use notes::Notes;
pub use tasks::{Planner, Task};
pub use timer::{FocusTimer, TimerMode, TimerState};
pub use today::{HabitStreak, TodaySummary, summarize};

/// Deserialize a field, reading an explicit `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    use serde::Deserialize;
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Fresh record id: 32 lowercase hex characters.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Trim a user-supplied label, rejecting blanks.
pub(crate) fn clean_label(field: &str, raw: &str) -> Result<String, crate::Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(crate::Error::InvalidInput(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}
