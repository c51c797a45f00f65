//! Offline cache controller and its host-side registration.

pub mod controller;
pub mod manifest;
pub mod registration;
pub mod state;

#[cfg(test)]
mod testing;

pub use controller::{ActivateOutcome, CacheController, InstallOutcome, ResponseSource, Served};
pub use manifest::AssetManifest;
pub use registration::{ClientId, Registration};
pub use state::WorkerState;
