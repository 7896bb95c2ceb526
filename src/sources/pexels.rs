//! Pexels photo search source.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiError, HttpMethod, Request};
use crate::models::{Photo, SearchResult};
use crate::sources::PhotosDataSource;

/// Default Pexels API base URL
pub const PEXELS_API_BASE: &str = "https://api.pexels.com/";

const SEARCH_PATH: &str = "v1/search";

/// Request for the `v1/search` endpoint.
///
/// `per_page` and `page` are only sent when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPhotosRequest {
    pub query: String,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl SearchPhotosRequest {
    /// Create a new search request
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            per_page: None,
            page: None,
        }
    }

    /// Set the page number
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the page size
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }
}

impl Request for SearchPhotosRequest {
    type Response = PexelsSearchResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> &str {
        SEARCH_PATH
    }

    fn query(&self) -> Vec<(String, String)> {
        let mut query = vec![("query".to_string(), self.query.clone())];
        if let Some(per_page) = self.per_page {
            query.push(("per_page".to_string(), per_page.to_string()));
        }
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        query
    }
}

/// Photo search backed by the Pexels REST API
#[derive(Debug, Clone)]
pub struct PexelsDataSource {
    client: ApiClient,
}

impl PexelsDataSource {
    /// Create a new Pexels source on top of an API client
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch one page with the full provider schema
    pub async fn fetch_page(
        &self,
        query: &str,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<PexelsSearchResponse, ApiError> {
        let request = SearchPhotosRequest {
            query: query.to_string(),
            per_page,
            page,
        };
        self.client.request(&request).await
    }

    /// Project a provider response onto the domain model
    pub fn to_search_result(response: PexelsSearchResponse) -> SearchResult {
        let photos = response
            .photos
            .iter()
            .map(|photo| Photo::from_urls(photo.id, &photo.src.tiny, &photo.src.original))
            .collect();

        let total_count = usize::try_from(response.total_results).unwrap_or(usize::MAX);
        SearchResult::new(total_count, photos)
    }
}

#[async_trait]
impl PhotosDataSource for PexelsDataSource {
    fn name(&self) -> &str {
        "Pexels"
    }

    async fn search(
        &self,
        query: &str,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<SearchResult, ApiError> {
        let response = self.fetch_page(query, page, per_page).await?;

        tracing::debug!(
            query,
            page = response.page,
            total = response.total_results,
            returned = response.photos.len(),
            "Pexels search page received"
        );

        Ok(Self::to_search_result(response))
    }
}

// ===== Pexels API Types =====

/// Response of the Pexels search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PexelsSearchResponse {
    pub total_results: u64,
    pub page: u32,
    pub per_page: u32,
    pub photos: Vec<PexelsPhoto>,
    pub next_page: Option<String>,
}

/// A photo record as returned by Pexels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PexelsPhoto {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub url: String,
    pub photographer: String,
    pub photographer_url: String,
    pub photographer_id: u64,
    pub avg_color: String,
    pub src: PexelsPhotoSrc,
    pub liked: bool,
    pub alt: String,
}

/// Image variants of a Pexels photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PexelsPhotoSrc {
    pub original: String,
    pub large2x: String,
    pub large: String,
    pub medium: String,
    pub small: String,
    pub portrait: String,
    pub landscape: String,
    pub tiny: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{
        "total_results": 1,
        "page": 1,
        "per_page": 1,
        "photos": [{
            "id": 1,
            "width": 100,
            "height": 100,
            "url": "https://www.pexels.com/photo/1/",
            "photographer": "John Doe",
            "photographer_url": "https://www.pexels.com/@john",
            "photographer_id": 123,
            "avg_color": "#FFFFFF",
            "src": {
                "original": "https://images.pexels.com/photos/1/original.jpeg",
                "large2x": "https://images.pexels.com/photos/1/large2x.jpeg",
                "large": "https://images.pexels.com/photos/1/large.jpeg",
                "medium": "https://images.pexels.com/photos/1/medium.jpeg",
                "small": "https://images.pexels.com/photos/1/small.jpeg",
                "portrait": "https://images.pexels.com/photos/1/portrait.jpeg",
                "landscape": "https://images.pexels.com/photos/1/landscape.jpeg",
                "tiny": "https://images.pexels.com/photos/1/tiny.jpeg"
            },
            "liked": false,
            "alt": "alt text"
        }],
        "next_page": null
    }"##;

    #[test]
    fn test_search_query_parameters() {
        let request = SearchPhotosRequest::new("nature").page(2).per_page(20);
        assert_eq!(
            request.query(),
            vec![
                ("query".to_string(), "nature".to_string()),
                ("per_page".to_string(), "20".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
        assert_eq!(request.path(), "v1/search");
        assert_eq!(request.method(), HttpMethod::Get);
    }

    #[test]
    fn test_search_query_omits_absent_paging() {
        let request = SearchPhotosRequest::new("nature");
        assert_eq!(
            request.query(),
            vec![("query".to_string(), "nature".to_string())]
        );
    }

    #[test]
    fn test_parse_search_response() {
        let response: PexelsSearchResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(response.total_results, 1);
        assert_eq!(response.photos[0].photographer, "John Doe");
        assert_eq!(response.photos[0].avg_color, "#FFFFFF");
        assert!(response.next_page.is_none());
    }

    #[test]
    fn test_projection_keeps_only_domain_fields() {
        let response: PexelsSearchResponse = serde_json::from_str(SAMPLE).unwrap();
        let result = PexelsDataSource::to_search_result(response);

        assert_eq!(result.total_count, 1);
        assert_eq!(result.photos.len(), 1);
        let photo = &result.photos[0];
        assert_eq!(photo.id, 1);
        assert_eq!(
            photo.thumbnail_url.as_ref().unwrap().as_str(),
            "https://images.pexels.com/photos/1/tiny.jpeg"
        );
        assert_eq!(
            photo.preview_url.as_ref().unwrap().as_str(),
            "https://images.pexels.com/photos/1/original.jpeg"
        );
    }

    #[test]
    fn test_projection_tolerates_bad_urls() {
        let mut response: PexelsSearchResponse = serde_json::from_str(SAMPLE).unwrap();
        response.photos[0].src.tiny = String::new();
        let result = PexelsDataSource::to_search_result(response);
        assert!(result.photos[0].thumbnail_url.is_none());
        assert!(result.photos[0].preview_url.is_some());
    }

    #[test]
    fn test_projection_saturates_oversized_total() {
        let mut response: PexelsSearchResponse = serde_json::from_str(SAMPLE).unwrap();
        response.total_results = u64::MAX;
        let result = PexelsDataSource::to_search_result(response);
        assert_eq!(result.total_count, usize::MAX);
        assert_eq!(result.photos.len(), 1);
    }
}
