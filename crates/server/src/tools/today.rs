//! today tool: what is due and how the streaks stand.

use chrono::NaiveDate;
use momentum_core::features::summarize;
use momentum_core::{KeyValueStore, LocalStore};
use rmcp::{ErrorData as McpError, model::CallToolResult};

use super::json_result;

pub fn today_impl<S: KeyValueStore>(store: &LocalStore<S>, today: NaiveDate) -> Result<CallToolResult, McpError> {
    json_result(&summarize(store, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use momentum_core::SqliteStorage;
    use momentum_core::features::Planner;

    #[test]
    fn test_today_impl() {
        let store = LocalStore::new(SqliteStorage::open_in_memory().unwrap());
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        Planner::new(&store).add("Submit essay", Some(today)).unwrap();

        assert!(today_impl(&store, today).is_ok());
        assert_eq!(summarize(&store, today).due_today.len(), 1);
    }
}
