//! Debounced, cancellable, paginated search controller.
//!
//! A [`SearchController`] owns the search screen state. The presentation layer
//! sends [`Intent`]s and reads [`UiState`] snapshots; it never mutates state
//! directly.
//!
//! - `QueryChanged` resets the page cursor and clears loaded items right away,
//!   then waits for the input to be quiet for the debounce window before
//!   searching. Only the latest query after a quiet period reaches the network.
//! - `LoadMoreItems` fetches the next page, but only while `has_more()` holds.
//! - `Retry` re-fetches the current page without discarding loaded items.
//!
//! Every new intent cancels the previous operation. A cancelled operation's
//! late result is dropped, never applied.
//!
//! ```rust,no_run
//! use photo_search::controller::{ControllerSettings, SearchController};
//! use photo_search::models::Status;
//! use photo_search::sources::MockPhotosDataSource;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let controller = SearchController::spawn(
//!     Arc::new(MockPhotosDataSource::new()),
//!     ControllerSettings::default(),
//! );
//! controller.on_query_changed("nature");
//! let state = controller.wait_for(|s| s.status != Status::Idle).await;
//! println!("{:?}", state.map(|s| s.status));
//! # }
//! ```

mod actor;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use crate::models::UiState;
use crate::sources::PhotosDataSource;
use actor::SearchActor;

/// Default quiet period before a changed query is searched
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Default page size
pub const DEFAULT_PER_PAGE: u32 = 20;

/// User intents accepted by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// The search text changed
    QueryChanged(String),
    /// The user scrolled to the end of the loaded items
    LoadMoreItems,
    /// The user asked to repeat the last failed fetch
    Retry,
}

/// Tunables for a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Photos requested per page
    pub per_page: u32,

    /// Quiet period before a changed query is searched
    pub debounce: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl ControllerSettings {
    /// Set the page size
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Set the debounce window
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// Handle to a running search controller.
///
/// Dropping the handle stops the controller and cancels any in-flight work.
#[derive(Debug)]
pub struct SearchController {
    intents: mpsc::UnboundedSender<Intent>,
    state: watch::Receiver<UiState>,
}

impl SearchController {
    /// Start a controller on the current tokio runtime
    pub fn spawn(source: Arc<dyn PhotosDataSource>, settings: ControllerSettings) -> Self {
        let (state_tx, state_rx) = watch::channel(UiState::default());
        let (intents_tx, intents_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        tracing::debug!(
            source = source.name(),
            per_page = settings.per_page,
            debounce_ms = settings.debounce.as_millis() as u64,
            "starting search controller"
        );

        let actor = SearchActor::new(source, settings, state_tx, events_tx);
        tokio::spawn(actor.run(intents_rx, events_rx));

        Self {
            intents: intents_tx,
            state: state_rx,
        }
    }

    /// Send an intent
    pub fn send(&self, intent: Intent) {
        if self.intents.send(intent).is_err() {
            tracing::warn!("search controller is no longer running");
        }
    }

    /// The search text changed
    pub fn on_query_changed(&self, query: impl Into<String>) {
        self.send(Intent::QueryChanged(query.into()));
    }

    /// Load the next page, if there is one
    pub fn load_more_items(&self) {
        self.send(Intent::LoadMoreItems);
    }

    /// Repeat the last attempted fetch
    pub fn retry(&self) {
        self.send(Intent::Retry);
    }

    /// Current state snapshot
    pub fn state(&self) -> UiState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`.
    ///
    /// Returns `None` if the controller stopped first.
    pub async fn wait_for(&self, predicate: impl FnMut(&UiState) -> bool) -> Option<UiState> {
        let mut rx = self.state.clone();
        let state = rx.wait_for(predicate).await.ok()?;
        Some((*state).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiError;
    use crate::models::{SearchResult, Status};
    use crate::sources::mock::{make_page, SearchCall};
    use crate::sources::MockPhotosDataSource;
    use tokio::time::sleep;

    fn controller() -> (SearchController, Arc<MockPhotosDataSource>) {
        let source = Arc::new(MockPhotosDataSource::new());
        let controller = SearchController::spawn(source.clone(), ControllerSettings::default());
        (controller, source)
    }

    fn call(query: &str, page: u32) -> SearchCall {
        SearchCall {
            query: query.to_string(),
            page: Some(page),
            per_page: Some(DEFAULT_PER_PAGE),
        }
    }

    fn ids(state: &UiState) -> Vec<u64> {
        state.items.iter().map(|p| p.id).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_changed_loads_first_page() {
        let (controller, source) = controller();
        source.push_result(make_page(1, 1, 1));

        controller.on_query_changed("nature");
        sleep(Duration::from_millis(600)).await;

        let state = controller.state();
        assert_eq!(state.query, "nature");
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.status, Status::Loaded);
        assert_eq!(state.items[0].id, 1);
        assert_eq!(source.calls(), vec![call("nature", 1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_happens_before_debounce_window() {
        let (controller, source) = controller();
        source.push_result(make_page(1, 1, 1));

        controller.on_query_changed("nature");
        sleep(Duration::from_millis(400)).await;

        assert_eq!(source.call_count(), 0);
        assert_eq!(controller.state().status, Status::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_typing_only_searches_last_query() {
        let (controller, source) = controller();
        source.push_result(make_page(3, 1, 3));

        for query in ["n", "na", "nat", "natu"] {
            controller.on_query_changed(query);
            sleep(Duration::from_millis(100)).await;
        }
        sleep(Duration::from_millis(600)).await;

        assert_eq!(source.calls(), vec![call("natu", 1)]);
        assert_eq!(controller.state().status, Status::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_query_cancels_pending_search() {
        let (controller, source) = controller();
        source.push_result(make_page(3, 1, 3));

        controller.on_query_changed("nature");
        sleep(Duration::from_millis(100)).await;
        controller.on_query_changed("");
        sleep(Duration::from_secs(2)).await;

        assert_eq!(source.call_count(), 0);
        let state = controller.state();
        assert_eq!(state.status, Status::Idle);
        assert!(state.query.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_query_keeps_previous_status() {
        let (controller, source) = controller();
        source.push_result(make_page(3, 1, 3));

        controller.on_query_changed("nature");
        sleep(Duration::from_millis(600)).await;
        assert_eq!(controller.state().status, Status::Loaded);

        controller.on_query_changed("");
        sleep(Duration::from_secs(1)).await;

        let state = controller.state();
        assert_eq!(state.status, Status::Loaded);
        assert!(state.items.is_empty());
        assert_eq!(state.total_count, 0);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_change_clears_results_immediately() {
        let (controller, source) = controller();
        source.push_result(make_page(47, 1, 20));

        controller.on_query_changed("nature");
        sleep(Duration::from_millis(600)).await;
        assert_eq!(controller.state().items.len(), 20);

        controller.on_query_changed("ocean");
        sleep(Duration::from_millis(1)).await;

        let state = controller.state();
        assert_eq!(state.query, "ocean");
        assert!(state.items.is_empty());
        assert_eq!(state.total_count, 0);
        assert!(!state.has_more());
    }

    #[tokio::test(start_paused = true)]
    async fn test_paginates_until_exhausted() {
        let (controller, source) = controller();
        source.push_result(make_page(47, 1, 20));
        source.push_result(make_page(47, 21, 20));
        source.push_result(make_page(47, 41, 7));

        controller.on_query_changed("nature");
        sleep(Duration::from_millis(600)).await;
        let state = controller.state();
        assert_eq!(state.status, Status::Loaded);
        assert_eq!(state.items.len(), 20);
        assert!(state.has_more());

        controller.load_more_items();
        sleep(Duration::from_millis(50)).await;
        let state = controller.state();
        assert_eq!(state.status, Status::Loaded);
        assert_eq!(state.items.len(), 40);
        assert!(state.has_more());

        controller.load_more_items();
        sleep(Duration::from_millis(50)).await;
        let state = controller.state();
        assert_eq!(state.items.len(), 47);
        assert_eq!(state.total_count, 47);
        assert!(!state.has_more());
        assert_eq!(ids(&state), (1..=47).collect::<Vec<u64>>());

        assert_eq!(
            source.calls(),
            vec![call("nature", 1), call("nature", 2), call("nature", 3)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_more_without_more_items_is_noop() {
        let (controller, source) = controller();
        source.push_result(make_page(3, 1, 3));

        controller.on_query_changed("nature");
        sleep(Duration::from_millis(600)).await;
        let before = controller.state();
        assert!(!before.has_more());

        controller.load_more_items();
        sleep(Duration::from_millis(50)).await;

        assert_eq!(controller.state(), before);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_more_while_idle_is_noop() {
        let (controller, source) = controller();

        controller.load_more_items();
        sleep(Duration::from_millis(50)).await;

        assert_eq!(controller.state(), UiState::default());
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_more_keeps_rendered_items() {
        let (controller, source) = controller();
        source.push_result(make_page(47, 1, 20));
        source.push_delayed(Ok(make_page(47, 21, 20)), Duration::from_secs(1));

        controller.on_query_changed("nature");
        sleep(Duration::from_millis(600)).await;

        controller.load_more_items();
        sleep(Duration::from_millis(10)).await;
        let state = controller.state();
        assert_eq!(state.status, Status::LoadingMore);
        assert_eq!(state.items.len(), 20);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(controller.state().items.len(), 40);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_results() {
        let (controller, source) = controller();
        source.push_result(SearchResult::new(0, Vec::new()));

        controller.on_query_changed("zzzznoresults");
        sleep(Duration::from_millis(600)).await;

        let state = controller.state();
        assert_eq!(state.status, Status::Empty);
        assert_eq!(state.items.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_then_retry() {
        let (controller, source) = controller();
        source.push_error(ApiError::Connection("offline".into()));
        source.push_result(make_page(5, 1, 5));

        controller.on_query_changed("x");
        sleep(Duration::from_millis(600)).await;
        assert_eq!(controller.state().status, Status::Error);

        controller.retry();
        sleep(Duration::from_millis(50)).await;

        let state = controller.state();
        assert_eq!(state.status, Status::Loaded);
        assert_eq!(ids(&state), vec![1, 2, 3, 4, 5]);
        assert_eq!(source.calls(), vec![call("x", 1), call("x", 1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_failed_load_more_keeps_items() {
        let (controller, source) = controller();
        source.push_result(make_page(47, 1, 20));
        source.push_error(ApiError::Connection("offline".into()));
        source.push_result(make_page(47, 21, 20));

        controller.on_query_changed("nature");
        sleep(Duration::from_millis(600)).await;

        controller.load_more_items();
        sleep(Duration::from_millis(50)).await;
        let state = controller.state();
        assert_eq!(state.status, Status::Error);
        assert_eq!(state.items.len(), 20);
        assert_eq!(state.total_count, 47);

        controller.retry();
        sleep(Duration::from_millis(50)).await;
        let state = controller.state();
        assert_eq!(state.status, Status::Loaded);
        assert_eq!(state.items.len(), 40);

        assert_eq!(
            source.calls(),
            vec![call("nature", 1), call("nature", 2), call("nature", 2)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_change_discards_in_flight_fetch() {
        let (controller, source) = controller();
        source.push_delayed(Ok(make_page(10, 1, 10)), Duration::from_secs(1));
        source.push_result(make_page(2, 100, 2));

        controller.on_query_changed("slow");
        sleep(Duration::from_millis(700)).await;
        assert_eq!(controller.state().status, Status::Searching);

        controller.on_query_changed("fast");
        sleep(Duration::from_millis(600)).await;
        let state = controller.state();
        assert_eq!(state.query, "fast");
        assert_eq!(ids(&state), vec![100, 101]);

        sleep(Duration::from_secs(2)).await;
        let state = controller.state();
        assert_eq!(state.query, "fast");
        assert_eq!(ids(&state), vec![100, 101]);
        assert_eq!(state.status, Status::Loaded);
        assert_eq!(source.calls(), vec![call("slow", 1), call("fast", 1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invariants_hold_for_every_snapshot() {
        let (controller, source) = controller();
        source.push_result(make_page(25, 1, 20));
        source.push_result(make_page(25, 21, 5));
        let mut rx = controller.subscribe();

        controller.on_query_changed("nature");
        sleep(Duration::from_millis(600)).await;
        controller.load_more_items();
        sleep(Duration::from_millis(50)).await;

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert!(state.items.len() <= state.total_count);
        assert_eq!(state.has_more(), state.total_count > state.items.len());
        assert_eq!(state.items.len(), 25);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_settled_state() {
        let (controller, source) = controller();
        source.push_result(make_page(1, 1, 1));

        controller.on_query_changed("nature");
        let state = controller
            .wait_for(|s| s.status.is_settled())
            .await
            .unwrap();
        assert_eq!(state.status, Status::Loaded);
    }
}
