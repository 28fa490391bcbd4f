//! Programming-language poll: vote intake plus read-side analytics.
//!
//! Votes are appended to a [`db::VoteStore`]; the views in [`voting`] are
//! recomputed from the full record set on every request.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod voting;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use config::AdminCredentials;
use db::VoteStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn VoteStore>,
    pub admin: Option<Arc<AdminCredentials>>,
}

impl AppState {
    pub fn new(store: Arc<dyn VoteStore>, admin: Option<AdminCredentials>) -> Self {
        Self {
            store,
            admin: admin.map(Arc::new),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/vote", post(handlers::submit_vote))
        .route("/results", get(handlers::get_results))
        .route("/timeline", get(handlers::get_timeline))
        .route("/voters", get(handlers::get_voters))
        .route("/api/votes/locations", get(handlers::get_locations))
        .route("/map-data", get(handlers::get_locations))
        .route("/admin/:secret", get(handlers::admin::admin_page))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
