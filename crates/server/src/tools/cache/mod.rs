//! Offline cache tools.
//!
//! These tools drive the cache controller registered for the app scope.

pub mod fetch;
pub mod status;
pub mod update;

pub use fetch::{AssetFetchParams, fetch_impl};
pub use status::status_impl;
pub use update::update_impl;
