//! Planner: a flat task list with optional due dates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{clean_label, new_id, null_as_default};
use crate::Error;
use crate::store::{KeyValueStore, LocalStore, keys};

/// A planned task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Task {
    pub id: String,
    pub title: String,
    /// Due date; stored as `""` when unset.
    #[serde(default, with = "optional_date")]
    #[schemars(with = "String")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub done: bool,
}

mod optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.collect_str(&d.format(FORMAT)),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, FORMAT).map(Some).map_err(de::Error::custom),
        }
    }
}

/// Task operations over the local store.
pub struct Planner<'a, S: KeyValueStore> {
    store: &'a LocalStore<S>,
}

impl<'a, S: KeyValueStore> Planner<'a, S> {
    pub fn new(store: &'a LocalStore<S>) -> Self {
        Self { store }
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> Vec<Task> {
        self.store.get(keys::TASKS, Vec::new())
    }

    /// Append a task. The title is trimmed and must not be blank.
    pub fn add(&self, title: &str, date: Option<NaiveDate>) -> Result<Task, Error> {
        let task = Task { id: new_id(), title: clean_label("title", title)?, date, done: false };
        self.store.update(keys::TASKS, Vec::new(), |tasks: &mut Vec<Task>| {
            tasks.push(task.clone());
            Ok(task)
        })
    }

    /// Flip a task's done flag.
    pub fn toggle(&self, id: &str) -> Result<Task, Error> {
        self.update(id, |t| t.done = !t.done)
    }

    /// Mark a task done (idempotent).
    pub fn complete(&self, id: &str) -> Result<Task, Error> {
        self.update(id, |t| t.done = true)
    }

    /// Remove a task, returning it.
    pub fn delete(&self, id: &str) -> Result<Task, Error> {
        self.store.update(keys::TASKS, Vec::new(), |tasks: &mut Vec<Task>| {
            let index = tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| Error::NotFound(format!("task {id}")))?;
            Ok(tasks.remove(index))
        })
    }

    /// Unfinished tasks due on `date`.
    pub fn due_on(&self, date: NaiveDate) -> Vec<Task> {
        self.tasks()
            .into_iter()
            .filter(|t| !t.done && t.date == Some(date))
            .collect()
    }

    fn update(&self, id: &str, change: impl FnOnce(&mut Task)) -> Result<Task, Error> {
        self.store.update(keys::TASKS, Vec::new(), |tasks: &mut Vec<Task>| {
            let task = tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| Error::NotFound(format!("task {id}")))?;
            change(task);
            Ok(task.clone())
        })
    }
}
