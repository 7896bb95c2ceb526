//! # Photo Search
//!
//! A debounced, paginated photo search client for the Pexels API.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Photo, SearchResult, UiState)
//! - [`client`]: Typed request/response transport over a pluggable HTTP session
//! - [`sources`]: Photo providers behind the [`PhotosDataSource`] trait
//! - [`controller`]: Search screen state machine driven by user intents
//! - [`config`]: Configuration management

pub mod client;
pub mod config;
pub mod controller;
pub mod models;
pub mod sources;

// Re-export commonly used types
pub use client::{ApiClient, ApiError};
pub use controller::{ControllerSettings, Intent, SearchController};
pub use models::{Photo, Status, UiState};
pub use sources::{PexelsDataSource, PhotosDataSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
