//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use momentum_client::{ClientId, Fetcher, Registration};
use momentum_core::{AppConfig, CacheDb, LocalStore, SqliteStorage};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use url::Url;

use crate::tools::cache::AssetFetchParams;
use crate::tools::habits::{HabitAddParams, HabitIdParams};
use crate::tools::notes::NotesSaveParams;
use crate::tools::tasks::{TaskAddParams, TaskIdParams};
use crate::tools::timer::TimerControlParams;
use crate::tools::{cache, habits, notes, tasks, timer, today};

/// Everything the tools operate on.
pub struct AppContext {
    pub config: AppConfig,
    pub scope: Url,
    pub store: LocalStore<SqliteStorage>,
    pub db: CacheDb,
    pub network: Arc<dyn Fetcher>,
    pub registration: Arc<Registration>,
    /// The client this server fetches assets as.
    pub client: ClientId,
}

/// The main MCP server handler for momentum.
#[derive(Clone)]
pub struct MomentumServer {
    ctx: Arc<AppContext>,
    tool_router: ToolRouter<Self>,
}

fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl MomentumServer {
    /// Create a new server handler.
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx, tool_router: Self::tool_router() }
    }

    #[tool(description = "Add a task to the planner. Optional due date as YYYY-MM-DD.")]
    async fn task_add(&self, params: Parameters<TaskAddParams>) -> Result<CallToolResult, McpError> {
        tasks::add_impl(&self.ctx.store, params.0)
    }

    #[tool(description = "List all planner tasks in the order they were added.")]
    async fn task_list(&self) -> Result<CallToolResult, McpError> {
        tasks::list_impl(&self.ctx.store)
    }

    #[tool(description = "Toggle a task between done and not done.")]
    async fn task_toggle(&self, params: Parameters<TaskIdParams>) -> Result<CallToolResult, McpError> {
        tasks::toggle_impl(&self.ctx.store, params.0)
    }

    #[tool(description = "Delete a task.")]
    async fn task_delete(&self, params: Parameters<TaskIdParams>) -> Result<CallToolResult, McpError> {
        tasks::delete_impl(&self.ctx.store, params.0)
    }

    #[tool(description = "Add a habit to track daily.")]
    async fn habit_add(&self, params: Parameters<HabitAddParams>) -> Result<CallToolResult, McpError> {
        habits::add_impl(&self.ctx.store, params.0, today_local())
    }

    #[tool(description = "List habits with whether each is done today and its current streak.")]
    async fn habit_list(&self) -> Result<CallToolResult, McpError> {
        habits::list_impl(&self.ctx.store, today_local())
    }

    #[tool(description = "Mark a habit done for today, or unmark it if it already is.")]
    async fn habit_toggle(&self, params: Parameters<HabitIdParams>) -> Result<CallToolResult, McpError> {
        habits::toggle_impl(&self.ctx.store, params.0, today_local())
    }

    #[tool(description = "Clear every recorded day of a habit.")]
    async fn habit_clear(&self, params: Parameters<HabitIdParams>) -> Result<CallToolResult, McpError> {
        habits::clear_impl(&self.ctx.store, params.0, today_local())
    }

    #[tool(description = "Delete a habit and its history.")]
    async fn habit_delete(&self, params: Parameters<HabitIdParams>) -> Result<CallToolResult, McpError> {
        habits::delete_impl(&self.ctx.store, params.0)
    }

    #[tool(description = "Read the saved notes.")]
    async fn notes_get(&self) -> Result<CallToolResult, McpError> {
        notes::get_impl(&self.ctx.store)
    }

    #[tool(description = "Replace the saved notes with new text.")]
    async fn notes_save(&self, params: Parameters<NotesSaveParams>) -> Result<CallToolResult, McpError> {
        notes::save_impl(&self.ctx.store, params.0)
    }

    #[tool(description = "Show the focus timer: mode, remaining time as MM:SS, phase lengths and whether it is running.")]
    async fn timer_status(&self) -> Result<CallToolResult, McpError> {
        timer::status_impl(&self.ctx.store)
    }

    /// Control the focus timer.
    ///
    /// Phase lengths are applied first, then the action.
    #[tool(description = "Start, pause or reset the focus timer, and/or set work and break lengths in minutes.")]
    async fn timer_control(&self, params: Parameters<TimerControlParams>) -> Result<CallToolResult, McpError> {
        timer::control_impl(&self.ctx.store, params.0)
    }

    #[tool(description = "Today's summary: unfinished tasks due today and every habit's streak.")]
    async fn today(&self) -> Result<CallToolResult, McpError> {
        today::today_impl(&self.ctx.store, today_local())
    }

    /// Fetch an app asset through the offline cache.
    ///
    /// Served from the cache when possible, then the network; the shell page
    /// stands in when the network is down.
    #[tool(description = "Fetch an app asset through the offline cache. Reports whether it came from cache, network or the offline fallback.")]
    async fn asset_fetch(&self, params: Parameters<AssetFetchParams>) -> Result<CallToolResult, McpError> {
        cache::fetch_impl(&self.ctx.registration, self.ctx.client, &self.ctx.scope, params.0).await
    }

    #[tool(description = "Show the active cache version, controller state and every stored cache.")]
    async fn cache_status(&self) -> Result<CallToolResult, McpError> {
        cache::status_impl(&self.ctx.registration, &self.ctx.db, self.ctx.config.offline_enabled).await
    }

    #[tool(description = "Re-download the asset manifest into the configured cache version and purge stale caches.")]
    async fn cache_update(&self) -> Result<CallToolResult, McpError> {
        cache::update_impl(&self.ctx.registration, &self.ctx.config, &self.ctx.db, self.ctx.network.clone()).await
    }
}

impl ServerHandler for MomentumServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "momentum".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
