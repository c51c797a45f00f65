//! Storage keys for each feature domain.
//!
//! Keys are namespaced and carry a schema version so a future layout change
//! can move to a new key instead of misreading old records.

pub const HABITS: &str = "cm6:habits:v1";
pub const TASKS: &str = "cm6:tasks:v1";
pub const NOTES: &str = "cm6:notes:v1";
pub const TIMER: &str = "cm6:timer:v1";

/// Every key the app writes, in no particular order.
pub const ALL: [&str; 4] = [HABITS, TASKS, NOTES, TIMER];
