//! timer_status and timer_control tools.

use momentum_core::features::{FocusTimer, TimerState};
use momentum_core::{KeyValueStore, LocalStore};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimerAction {
    Start,
    Pause,
    Reset,
}

/// Parameters for the timer_control tool.
///
/// Minute changes are applied before the action.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TimerControlParams {
    /// start, pause or reset.
    #[serde(default)]
    pub action: Option<TimerAction>,

    /// New work phase length in minutes (minimum 1).
    #[serde(default)]
    pub work_minutes: Option<u32>,

    /// New break phase length in minutes (minimum 1).
    #[serde(default)]
    pub break_minutes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TimerStatusOutput {
    #[serde(flatten)]
    pub state: TimerState,
    /// Remaining time as MM:SS.
    pub display: String,
}

impl From<TimerState> for TimerStatusOutput {
    fn from(state: TimerState) -> Self {
        let display = state.display();
        Self { state, display }
    }
}

pub fn status_impl<S: KeyValueStore>(store: &LocalStore<S>) -> Result<CallToolResult, McpError> {
    json_result(&TimerStatusOutput::from(FocusTimer::new(store).state()))
}

pub fn control_impl<S: KeyValueStore>(
    store: &LocalStore<S>, params: TimerControlParams,
) -> Result<CallToolResult, McpError> {
    let (state, _) = FocusTimer::new(store).update(|state| {
        if let Some(minutes) = params.work_minutes {
            state.set_work_minutes(minutes);
        }
        if let Some(minutes) = params.break_minutes {
            state.set_break_minutes(minutes);
        }
        match params.action {
            Some(TimerAction::Start) => state.start(),
            Some(TimerAction::Pause) => state.pause(),
            Some(TimerAction::Reset) => state.reset(),
            None => {}
        }
    })?;

    tracing::debug!(mode = %state.mode, running = state.running, "timer updated");
    json_result(&TimerStatusOutput::from(state))
}
