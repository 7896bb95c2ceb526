//! Domain photo and per-page search result models.

use serde::{Deserialize, Serialize};
use url::Url;

/// A photo as the search core sees it.
///
/// Only the identifier and the two image URLs cross into the domain; every
/// other provider field stays at the data source boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Provider identifier, unique within a result set
    pub id: u64,

    /// Small image suitable for a grid cell
    pub thumbnail_url: Option<Url>,

    /// Full-size image for the preview screen
    pub preview_url: Option<Url>,
}

impl Photo {
    /// Create a photo from raw URL strings, dropping any that fail to parse
    pub fn from_urls(id: u64, thumbnail: &str, preview: &str) -> Self {
        Self {
            id,
            thumbnail_url: Url::parse(thumbnail).ok(),
            preview_url: Url::parse(preview).ok(),
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Total number of matches the provider reports for the query
    pub total_count: usize,

    /// Photos on this page, in provider order
    pub photos: Vec<Photo>,
}

impl SearchResult {
    /// Create a new search result
    pub fn new(total_count: usize, photos: Vec<Photo>) -> Self {
        Self {
            total_count,
            photos,
        }
    }

    /// An empty result (no matches)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the provider reported no matches at all
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_from_urls() {
        let photo = Photo::from_urls(7, "https://images.example.com/7/tiny.jpg", "not a url");

        assert_eq!(photo.id, 7);
        assert_eq!(
            photo.thumbnail_url.as_ref().map(Url::as_str),
            Some("https://images.example.com/7/tiny.jpg")
        );
        assert!(photo.preview_url.is_none());
    }

    #[test]
    fn test_search_result_empty() {
        assert!(SearchResult::empty().is_empty());
        assert!(!SearchResult::new(3, Vec::new()).is_empty());
    }
}
