//! Habit tracker with daily check-offs and streaks.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{clean_label, new_id, null_as_default};
use crate::Error;
use crate::store::{KeyValueStore, LocalStore, keys};

/// A habit and the days it was done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[schemars(with = "Vec<String>")]
    pub days: Vec<NaiveDate>,
}

impl Habit {
    pub fn done_on(&self, day: NaiveDate) -> bool {
        self.days.contains(&day)
    }

    pub fn streak(&self, today: NaiveDate) -> u32 {
        streak(&self.days, today)
    }
}

/// Consecutive marked days ending at `today`.
///
/// Zero when `today` itself is unmarked; the first gap ends the count.
pub fn streak(days: &[NaiveDate], today: NaiveDate) -> u32 {
    let marked: HashSet<NaiveDate> = days.iter().copied().collect();
    let mut count = 0;
    let mut day = today;
    while marked.contains(&day) {
        count += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    count
}

/// Habit operations over the local store.
pub struct Habits<'a, S: KeyValueStore> {
    store: &'a LocalStore<S>,
}

impl<'a, S: KeyValueStore> Habits<'a, S> {
    pub fn new(store: &'a LocalStore<S>) -> Self {
        Self { store }
    }

    pub fn habits(&self) -> Vec<Habit> {
        self.store.get(keys::HABITS, Vec::new())
    }

    /// Add a habit with no history. The name is trimmed and must not be blank.
    pub fn add(&self, name: &str) -> Result<Habit, Error> {
        let habit = Habit { id: new_id(), name: clean_label("name", name)?, days: Vec::new() };
        self.store.update(keys::HABITS, Vec::new(), |habits: &mut Vec<Habit>| {
            habits.push(habit.clone());
            Ok(habit)
        })
    }

    /// Mark `today` done, or unmark it if it already was.
    pub fn toggle_day(&self, id: &str, today: NaiveDate) -> Result<Habit, Error> {
        self.update(id, |h| match h.days.iter().position(|d| *d == today) {
            Some(i) => {
                h.days.remove(i);
            }
            None => h.days.push(today),
        })
    }

    /// Forget every recorded day.
    pub fn clear(&self, id: &str) -> Result<Habit, Error> {
        self.update(id, |h| h.days.clear())
    }

    pub fn delete(&self, id: &str) -> Result<Habit, Error> {
        self.store.update(keys::HABITS, Vec::new(), |habits: &mut Vec<Habit>| {
            let index = habits
                .iter()
                .position(|h| h.id == id)
                .ok_or_else(|| Error::NotFound(format!("habit {id}")))?;
            Ok(habits.remove(index))
        })
    }

    fn update(&self, id: &str, change: impl FnOnce(&mut Habit)) -> Result<Habit, Error> {
        self.store.update(keys::HABITS, Vec::new(), |habits: &mut Vec<Habit>| {
            let habit = habits
                .iter_mut()
                .find(|h| h.id == id)
                .ok_or_else(|| Error::NotFound(format!("habit {id}")))?;
            change(habit);
            Ok(habit.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_streak_counts_back_from_today() {
        let today = date("2026-10-16");
        let days = [date("2026-10-14"), date("2026-10-16"), date("2026-10-15")];
        assert_eq!(streak(&days, today), 3);
    }

    #[test]
    fn test_streak_broken_by_gap() {
        let today = date("2026-10-16");
        let days = [date("2026-10-16"), date("2026-10-15"), date("2026-10-13"), date("2026-10-12")];
        assert_eq!(streak(&days, today), 2);
    }

    #[test]
    fn test_streak_zero_without_today() {
        let today = date("2026-10-16");
        assert_eq!(streak(&[date("2026-10-15"), date("2026-10-14")], today), 0);
        assert_eq!(streak(&[], today), 0);
    }

    #[test]
    fn test_streak_spans_month_boundary() {
        let today = date("2026-03-01");
        assert_eq!(streak(&[date("2026-02-28"), date("2026-03-01"), date("2026-02-27")], today), 3);
    }

    #[test]
    fn test_streak_ignores_duplicates() {
        let today = date("2026-10-16");
        assert_eq!(streak(&[today, today], today), 1);
    }

    #[test]
    fn test_toggle_day() {
        let store = LocalStore::new(MemoryStorage::new());
        let habits = Habits::new(&store);
        let today = date("2026-10-16");
        let habit = habits.add(" Run ").unwrap();
        assert_eq!(habit.name, "Run");

        let marked = habits.toggle_day(&habit.id, today).unwrap();
        assert!(marked.done_on(today));
        assert_eq!(marked.streak(today), 1);

        let unmarked = habits.toggle_day(&habit.id, today).unwrap();
        assert!(!unmarked.done_on(today));
        assert_eq!(habits.habits()[0].days, Vec::<NaiveDate>::new());
    }

    #[test]
    fn test_clear_and_delete() {
        let store = LocalStore::new(MemoryStorage::new());
        let habits = Habits::new(&store);
        let habit = habits.add("Read").unwrap();
        habits.toggle_day(&habit.id, date("2026-10-16")).unwrap();

        assert!(habits.clear(&habit.id).unwrap().days.is_empty());
        habits.delete(&habit.id).unwrap();
        assert!(habits.habits().is_empty());
        assert!(matches!(habits.clear(&habit.id), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_missing_days_field_defaults() {
        let habit: Habit = serde_json::from_str(r#"{"id":"x","name":"Stretch"}"#).unwrap();
        assert!(habit.days.is_empty());
    }

    #[test]
    fn test_null_days_loads_empty_and_keeps_other_habits() {
        let store = LocalStore::new(MemoryStorage::new());
        store
            .backend()
            .set_item(
                keys::HABITS,
                r#"[{"id":"a","name":"Run","days":["2026-10-15","2026-10-16"]},{"id":"b","name":"Read","days":null}]"#,
            )
            .unwrap();

        let habits = Habits::new(&store).habits();
        assert_eq!(habits.len(), 2);
        assert_eq!(habits[0].streak(date("2026-10-16")), 2);
        assert!(habits[1].days.is_empty());
        assert!(store.backend().get_item(keys::HABITS).unwrap().is_some());

        let marked = Habits::new(&store).toggle_day("b", date("2026-10-16")).unwrap();
        assert_eq!(marked.days, vec![date("2026-10-16")]);
    }

    #[test]
    fn test_corrupt_collection_resets() {
        let store = LocalStore::new(MemoryStorage::new());
        store.backend().set_item(keys::HABITS, r#"[{"id":"x","name":"Run","days":["not-a-date"]}]"#).unwrap();

        assert!(Habits::new(&store).habits().is_empty());
        assert_eq!(store.backend().get_item(keys::HABITS).unwrap(), None);
    }
}
