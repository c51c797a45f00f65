//! Planner tools: task_add, task_list, task_toggle, task_delete.

use chrono::NaiveDate;
use momentum_core::features::{Planner, Task};
use momentum_core::{Error, KeyValueStore, LocalStore};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the task_add tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TaskAddParams {
    /// What needs doing.
    pub title: String,

    /// Optional due date as YYYY-MM-DD.
    #[serde(default)]
    pub date: Option<String>,
}

/// Parameters for tools acting on one task.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TaskIdParams {
    /// Task id as returned by task_add or task_list.
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TaskListOutput {
    pub tasks: Vec<Task>,
    /// Tasks not yet done.
    pub open: usize,
}

pub(crate) fn parse_date(raw: &str) -> Result<Option<NaiveDate>, Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| Error::InvalidInput(format!("date {raw:?} is not YYYY-MM-DD: {e}")))
}

pub fn add_impl<S: KeyValueStore>(store: &LocalStore<S>, params: TaskAddParams) -> Result<CallToolResult, McpError> {
    let date = match params.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => None,
    };
    let task = Planner::new(store).add(&params.title, date)?;
    tracing::debug!(id = %task.id, "task added");
    json_result(&task)
}

pub fn list_impl<S: KeyValueStore>(store: &LocalStore<S>) -> Result<CallToolResult, McpError> {
    let tasks = Planner::new(store).tasks();
    let open = tasks.iter().filter(|t| !t.done).count();
    json_result(&TaskListOutput { tasks, open })
}

pub fn toggle_impl<S: KeyValueStore>(store: &LocalStore<S>, params: TaskIdParams) -> Result<CallToolResult, McpError> {
    let task = Planner::new(store).toggle(&params.id)?;
    json_result(&task)
}

pub fn delete_impl<S: KeyValueStore>(store: &LocalStore<S>, params: TaskIdParams) -> Result<CallToolResult, McpError> {
    let task = Planner::new(store).delete(&params.id)?;
    json_result(&task)
}
