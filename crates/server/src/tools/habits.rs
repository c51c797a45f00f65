//! Habit tools: habit_add, habit_list, habit_toggle, habit_clear, habit_delete.

use chrono::NaiveDate;
use momentum_core::features::{Habit, Habits};
use momentum_core::{KeyValueStore, LocalStore};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the habit_add tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HabitAddParams {
    /// Habit name, e.g. "Read 20 pages".
    pub name: String,
}

/// Parameters for tools acting on one habit.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HabitIdParams {
    /// Habit id as returned by habit_add or habit_list.
    pub id: String,
}

/// A habit as seen on a given day.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HabitView {
    #[serde(flatten)]
    pub habit: Habit,
    pub done_today: bool,
    pub streak: u32,
}

impl HabitView {
    fn new(habit: Habit, today: NaiveDate) -> Self {
        let done_today = habit.done_on(today);
        let streak = habit.streak(today);
        Self { habit, done_today, streak }
    }
}

pub fn add_impl<S: KeyValueStore>(
    store: &LocalStore<S>, params: HabitAddParams, today: NaiveDate,
) -> Result<CallToolResult, McpError> {
    let habit = Habits::new(store).add(&params.name)?;
    json_result(&HabitView::new(habit, today))
}

pub fn list_impl<S: KeyValueStore>(store: &LocalStore<S>, today: NaiveDate) -> Result<CallToolResult, McpError> {
    let habits: Vec<HabitView> = Habits::new(store)
        .habits()
        .into_iter()
        .map(|h| HabitView::new(h, today))
        .collect();
    json_result(&habits)
}

/// Mark or unmark `today`.
pub fn toggle_impl<S: KeyValueStore>(
    store: &LocalStore<S>, params: HabitIdParams, today: NaiveDate,
) -> Result<CallToolResult, McpError> {
    let habit = Habits::new(store).toggle_day(&params.id, today)?;
    json_result(&HabitView::new(habit, today))
}

pub fn clear_impl<S: KeyValueStore>(
    store: &LocalStore<S>, params: HabitIdParams, today: NaiveDate,
) -> Result<CallToolResult, McpError> {
    let habit = Habits::new(store).clear(&params.id)?;
    json_result(&HabitView::new(habit, today))
}

pub fn delete_impl<S: KeyValueStore>(store: &LocalStore<S>, params: HabitIdParams) -> Result<CallToolResult, McpError> {
    let habit = Habits::new(store).delete(&params.id)?;
    json_result(&habit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use momentum_core::SqliteStorage;

    fn store() -> LocalStore<SqliteStorage> {
        LocalStore::new(SqliteStorage::open_in_memory().unwrap())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_view_reports_streak() {
        let habit = Habit {
            id: "h".into(),
            name: "Run".into(),
            days: vec![today(), today().pred_opt().unwrap()],
        };
        let view = HabitView::new(habit, today());
        assert!(view.done_today);
        assert_eq!(view.streak, 2);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "Run");
        assert_eq!(json["streak"], 2);
    }

    #[test]
    fn test_add_toggle_clear_delete() {
        let store = store();
        add_impl(&store, HabitAddParams { name: "Stretch".into() }, today()).unwrap();
        let id = Habits::new(&store).habits()[0].id.clone();

        toggle_impl(&store, HabitIdParams { id: id.clone() }, today()).unwrap();
        assert!(Habits::new(&store).habits()[0].done_on(today()));
        assert!(list_impl(&store, today()).is_ok());

        clear_impl(&store, HabitIdParams { id: id.clone() }, today()).unwrap();
        assert!(Habits::new(&store).habits()[0].days.is_empty());

        delete_impl(&store, HabitIdParams { id: id.clone() }).unwrap();
        assert!(Habits::new(&store).habits().is_empty());
        assert!(toggle_impl(&store, HabitIdParams { id }, today()).is_err());
    }

    #[test]
    fn test_add_blank_name_rejected() {
        let err = add_impl(&store(), HabitAddParams { name: " ".into() }, today()).unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
