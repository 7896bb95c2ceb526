//! The task that owns the search state.
//!
//! All `UiState` writes happen here, one message at a time. Debounce timers and
//! fetches run as separate tasks and report back over the event channel; their
//! results are only applied if the operation that started them is still the
//! current one.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::{ControllerSettings, Intent};
use crate::client::ApiError;
use crate::models::{SearchResult, Status, UiState};
use crate::sources::PhotosDataSource;

/// Why a fetch was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FetchKind {
    Search,
    LoadMore,
    Retry,
}

/// Identifies one fetch attempt: the operation generation plus the
/// `(query, page)` fingerprint it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Ticket {
    pub generation: u64,
    pub query: String,
    pub page: u32,
    pub kind: FetchKind,
}

/// Completions reported back by spawned tasks
#[derive(Debug)]
pub(crate) enum Event {
    DebounceElapsed {
        generation: u64,
    },
    FetchCompleted {
        ticket: Ticket,
        outcome: Result<SearchResult, ApiError>,
    },
}

pub(crate) struct SearchActor {
    source: Arc<dyn PhotosDataSource>,
    settings: ControllerSettings,
    state: UiState,
    /// Next page to fetch for the current query
    page: u32,
    /// Bumped by every controller-initiated operation
    generation: u64,
    in_flight: Option<CancellationToken>,
    state_tx: watch::Sender<UiState>,
    events_tx: mpsc::UnboundedSender<Event>,
}

impl SearchActor {
    pub(crate) fn new(
        source: Arc<dyn PhotosDataSource>,
        settings: ControllerSettings,
        state_tx: watch::Sender<UiState>,
        events_tx: mpsc::UnboundedSender<Event>,
    ) -> Self {
        let state = state_tx.borrow().clone();
        Self {
            source,
            settings,
            state,
            page: 1,
            generation: 0,
            in_flight: None,
            state_tx,
            events_tx,
        }
    }

    /// Process intents and completions until every controller handle is gone
    pub(crate) async fn run(
        mut self,
        mut intents: mpsc::UnboundedReceiver<Intent>,
        mut events: mpsc::UnboundedReceiver<Event>,
    ) {
        loop {
            tokio::select! {
                intent = intents.recv() => match intent {
                    Some(intent) => self.handle_intent(intent),
                    None => break,
                },
                Some(event) = events.recv() => self.handle_event(event),
            }
        }

        self.cancel_in_flight();
        tracing::debug!("search controller stopped");
    }

    pub(crate) fn handle_intent(&mut self, intent: Intent) {
        match intent {
            Intent::QueryChanged(query) => self.on_query_changed(query),
            Intent::LoadMoreItems => self.on_load_more(),
            Intent::Retry => self.on_retry(),
        }
    }

    pub(crate) fn handle_event(&mut self, event: Event) {
        match event {
            Event::DebounceElapsed { generation } => self.on_debounce_elapsed(generation),
            Event::FetchCompleted { ticket, outcome } => self.on_fetch_completed(ticket, outcome),
        }
    }

    fn on_query_changed(&mut self, query: String) {
        let token = self.begin_operation();

        self.state.query = query;
        self.state.items.clear();
        self.state.total_count = 0;
        self.page = 1;
        self.publish();

        let generation = self.generation;
        let debounce = self.settings.debounce;
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(debounce) => {
                    let _ = events.send(Event::DebounceElapsed { generation });
                }
            }
        });
    }

    fn on_debounce_elapsed(&mut self, generation: u64) {
        if generation != self.generation {
            tracing::trace!(generation, "ignoring superseded debounce");
            return;
        }
        if self.state.query.is_empty() {
            tracing::debug!("debounced query is empty; not searching");
            self.in_flight = None;
            return;
        }

        self.state.status = Status::Searching;
        self.publish();
        self.start_fetch(FetchKind::Search);
    }

    fn on_load_more(&mut self) {
        if !self.state.has_more() {
            tracing::debug!(
                loaded = self.state.items.len(),
                total = self.state.total_count,
                "no more items to load"
            );
            return;
        }

        self.begin_operation();
        self.state.status = Status::LoadingMore;
        self.publish();
        self.start_fetch(FetchKind::LoadMore);
    }

    fn on_retry(&mut self) {
        self.begin_operation();
        if self.state.query.is_empty() {
            tracing::debug!("retry requested without a query; nothing to fetch");
            self.in_flight = None;
            return;
        }

        self.state.status = Status::Searching;
        self.publish();
        self.start_fetch(FetchKind::Retry);
    }

    fn on_fetch_completed(&mut self, ticket: Ticket, outcome: Result<SearchResult, ApiError>) {
        if ticket.generation != self.generation {
            tracing::trace!(
                query = %ticket.query,
                page = ticket.page,
                "discarding completion of a superseded fetch"
            );
            return;
        }

        match outcome {
            Err(e) if e.is_cancellation() => {
                tracing::trace!(query = %ticket.query, page = ticket.page, "fetch cancelled");
                return;
            }
            Err(e) => {
                if e.is_fatal() {
                    tracing::error!(query = %ticket.query, page = ticket.page, "search cannot run: {}", e);
                } else {
                    tracing::warn!(query = %ticket.query, page = ticket.page, "search failed: {}", e);
                }
                self.state.status = Status::Error;
            }
            Ok(result) if result.is_empty() => {
                tracing::debug!(query = %ticket.query, "no photos found");
                self.state.items.clear();
                self.state.total_count = 0;
                self.state.status = Status::Empty;
            }
            Ok(result) => {
                self.state.items.extend(result.photos);
                self.page += 1;
                self.state.total_count = result.total_count.max(self.state.items.len());
                self.state.status = Status::Loaded;
                tracing::debug!(
                    query = %ticket.query,
                    page = ticket.page,
                    kind = ?ticket.kind,
                    loaded = self.state.items.len(),
                    total = self.state.total_count,
                    "page loaded"
                );
            }
        }

        self.in_flight = None;
        self.publish();
    }

    /// Cancel whatever is running and start a new generation
    fn begin_operation(&mut self) -> CancellationToken {
        self.cancel_in_flight();
        self.generation += 1;
        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());
        token
    }

    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }

    fn start_fetch(&mut self, kind: FetchKind) {
        let token = self
            .in_flight
            .get_or_insert_with(CancellationToken::new)
            .clone();
        let ticket = Ticket {
            generation: self.generation,
            query: self.state.query.clone(),
            page: self.page,
            kind,
        };

        tracing::debug!(
            source = self.source.name(),
            query = %ticket.query,
            page = ticket.page,
            kind = ?kind,
            "fetching page"
        );

        let source = Arc::clone(&self.source);
        let per_page = self.settings.per_page;
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => Err(ApiError::Cancelled),
                result = source.search(&ticket.query, Some(ticket.page), Some(per_page)) => result,
            };
            let _ = events.send(Event::FetchCompleted { ticket, outcome });
        });
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }
}
