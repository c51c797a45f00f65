//! Client code for momentum.
//!
//! This crate provides the HTTP fetch pipeline and the offline cache
//! controller that sits in front of it.

pub mod fetch;
pub mod worker;

pub use fetch::{FetchConfig, FetchResponse, Fetcher, HttpFetcher, Method, Request, resolve};
pub use worker::{AssetManifest, CacheController, ClientId, Registration, ResponseSource, Served, WorkerState};
