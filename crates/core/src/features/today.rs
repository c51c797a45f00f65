//! Daily overview: what is due and how the habits are going.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::habits::Habits;
use super::tasks::{Planner, Task};
use crate::store::{KeyValueStore, LocalStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HabitStreak {
    pub name: String,
    pub streak: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TodaySummary {
    #[schemars(with = "String")]
    pub date: NaiveDate,
    pub due_today: Vec<Task>,
    pub streaks: Vec<HabitStreak>,
}

/// Unfinished tasks due `today` plus every habit's current streak.
pub fn summarize<S: KeyValueStore>(store: &LocalStore<S>, today: NaiveDate) -> TodaySummary {
    let streaks = Habits::new(store)
        .habits()
        .into_iter()
        .map(|h| {
            let streak = h.streak(today);
            HabitStreak { name: h.name, streak }
        })
        .collect();

    TodaySummary { date: today, due_today: Planner::new(store).due_on(today), streaks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;

    #[test]
    fn test_summarize() {
        let store = LocalStore::new(MemoryStorage::new());
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let yesterday = today.pred_opt().unwrap();

        let planner = Planner::new(&store);
        let due = planner.add("Submit essay", Some(today)).unwrap();
        planner.add("Later", Some(today.succ_opt().unwrap())).unwrap();

        let habits = Habits::new(&store);
        let run = habits.add("Run").unwrap();
        habits.toggle_day(&run.id, yesterday).unwrap();
        habits.toggle_day(&run.id, today).unwrap();
        habits.add("Read").unwrap();

        let summary = summarize(&store, today);
        assert_eq!(summary.date, today);
        assert_eq!(summary.due_today, vec![due]);
        assert_eq!(
            summary.streaks,
            vec![HabitStreak { name: "Run".into(), streak: 2 }, HabitStreak { name: "Read".into(), streak: 0 }]
        );
    }

    #[test]
    fn test_summarize_empty_store() {
        let store = LocalStore::new(MemoryStorage::new());
        let summary = summarize(&store, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert!(summary.due_today.is_empty());
        assert!(summary.streaks.is_empty());
    }
}
