//! Basic usage example for the Photo Search library.
//!
//! This example drives the search controller against the live Pexels API.
//! Set `PEXELS_API_KEY` before running it.

use photo_search::config::Config;
use photo_search::controller::SearchController;
use photo_search::models::Status;
use photo_search::{ApiClient, PexelsDataSource};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();

    // Build the transport and the Pexels source on top of it
    let session = config.http.build_session()?;
    let client = ApiClient::new(
        Arc::new(session),
        config.api.endpoint()?,
        config.api.credentials(),
    );
    let source = Arc::new(PexelsDataSource::new(client));

    let controller = SearchController::spawn(source, config.search.controller_settings());

    // Simulate someone typing; only the final query is searched
    for partial in ["n", "na", "nat", "natu", "nature"] {
        controller.on_query_changed(partial);
    }

    let Some(state) = controller.wait_for(|s| s.status.is_settled()).await else {
        return Err("controller stopped".into());
    };
    println!("{}: {} of {} photos", state.query, state.items.len(), state.total_count);

    if state.status == Status::Loaded && state.has_more() {
        // Watch from the current snapshot so only the load-more outcome counts
        let mut states = controller.subscribe();
        states.borrow_and_update();
        controller.load_more_items();
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            if state.status.is_settled() {
                println!("After loading more: {} photos ({})", state.items.len(), state.status);
                break;
            }
        }
    }

    // Print the first few photos
    for (i, photo) in controller.state().items.iter().take(3).enumerate() {
        println!("\n{}. Photo {}", i + 1, photo.id);
        if let Some(url) = &photo.thumbnail_url {
            println!("   Thumbnail: {}", url);
        }
        if let Some(url) = &photo.preview_url {
            println!("   Preview: {}", url);
        }
    }

    Ok(())
}
