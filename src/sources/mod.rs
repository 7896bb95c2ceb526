//! Photo search sources.
//!
//! This module defines the [`PhotosDataSource`] trait, the single capability the
//! search controller depends on: fetch one page of photos for a query. The
//! production implementation is [`PexelsDataSource`]; [`MockPhotosDataSource`]
//! replays scripted pages for tests.
//!
//! Sources are stateless per call and propagate [`ApiError`]s from the transport
//! unchanged.

mod pexels;

pub mod mock;

pub use mock::MockPhotosDataSource;
pub use pexels::{
    PexelsDataSource, PexelsPhoto, PexelsPhotoSrc, PexelsSearchResponse, SearchPhotosRequest,
    PEXELS_API_BASE,
};

use crate::client::ApiError;
use crate::models::SearchResult;
use async_trait::async_trait;

/// The PhotosDataSource trait is the boundary between the search controller
/// and a photo provider.
///
/// Implementations translate `(query, page, per_page)` into a provider request
/// and project the provider response onto [`SearchResult`]. `page` and
/// `per_page` are omitted from the request when `None`.
#[async_trait]
pub trait PhotosDataSource: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Search for photos matching the query
    async fn search(
        &self,
        query: &str,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<SearchResult, ApiError>;
}
