//! Observable search screen state.

use serde::{Deserialize, Serialize};

use super::Photo;

/// Lifecycle of the search screen. Exactly one holds at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Nothing has been searched yet
    #[default]
    Idle,
    /// First page (or a retried page) is being fetched
    Searching,
    /// At least one page is available
    Loaded,
    /// A further page is being fetched behind the already loaded items
    LoadingMore,
    /// The query matched nothing
    Empty,
    /// The last fetch failed; a retry is possible
    Error,
}

impl Status {
    /// Whether the status is one a fetch settles into
    pub fn is_settled(&self) -> bool {
        matches!(self, Status::Loaded | Status::Empty | Status::Error)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Status::Idle => "idle",
            Status::Searching => "searching",
            Status::Loaded => "loaded",
            Status::LoadingMore => "loading more",
            Status::Empty => "empty",
            Status::Error => "error",
        };
        f.write_str(name)
    }
}

/// Snapshot of the search screen, published by the controller.
///
/// `items` holds pages in fetch order. Once `total_count` is known it is never
/// below `items.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    /// Current query text; empty means no active search
    pub query: String,

    /// Accumulated photos across all loaded pages
    pub items: Vec<Photo>,

    /// Total matches reported by the provider
    pub total_count: usize,

    /// Current status
    pub status: Status,
}

impl UiState {
    /// Whether more pages can be requested
    pub fn has_more(&self) -> bool {
        self.total_count > self.items.len()
    }
}
