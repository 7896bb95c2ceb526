//! Core data models for photos and the search screen state.

mod photo;
mod state;

pub use photo::{Photo, SearchResult};
pub use state::{Status, UiState};
