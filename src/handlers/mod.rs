pub mod admin;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use log::{error, info, warn};
use serde::Serialize;
use serde_json::{Value, json};

use crate::AppState;
use crate::error::AppError;
use crate::models::{Language, SubmitVote};
use crate::voting::{self, GeoCluster, RosterEntry, TallyEntry, TimelineBucket};

#[derive(Debug, Serialize)]
pub struct TallyResponse {
    pub languages: Vec<&'static str>,
    pub results: Vec<TallyEntry>,
}

// POST /vote
pub async fn submit_vote(
    State(state): State<AppState>,
    payload: Result<Json<SubmitVote>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(submission) = payload.map_err(|e| {
        warn!("Rejected vote with unreadable body: {}", e);
        AppError::MalformedPayload(e.body_text())
    })?;

    let ballot = submission.validate().map_err(|e| {
        warn!("Rejected vote: {}", e);
        e
    })?;

    let record = state.store.insert(&ballot).await.map_err(|e| {
        error!("Failed to store vote: {}", e);
        e
    })?;
    info!("Vote recorded: {} -> {}", record.username, record.option);

    Ok(Json(json!({ "status": "success" })))
}

// GET /results
pub async fn get_results(State(state): State<AppState>) -> Result<Json<TallyResponse>, AppError> {
    let records = state.store.all_records().await.inspect_err(log_store_error)?;
    Ok(Json(TallyResponse {
        languages: Language::names(),
        results: voting::tally(&records),
    }))
}

// GET /timeline
pub async fn get_timeline(State(state): State<AppState>) -> Result<Json<Vec<TimelineBucket>>, AppError> {
    let records = state.store.all_records().await.inspect_err(log_store_error)?;
    Ok(Json(voting::timeline(&records)))
}

// GET /voters
pub async fn get_voters(State(state): State<AppState>) -> Result<Json<Vec<RosterEntry>>, AppError> {
    let records = state.store.all_records().await.inspect_err(log_store_error)?;
    Ok(Json(voting::voter_roster(&records)))
}

// GET /api/votes/locations and GET /map-data
pub async fn get_locations(State(state): State<AppState>) -> Result<Json<Vec<GeoCluster>>, AppError> {
    let records = state.store.located_records().await.inspect_err(log_store_error)?;
    Ok(Json(voting::geo_clusters(&records)))
}

fn log_store_error(e: &crate::error::StoreError) {
    error!("Vote store query failed: {}", e);
}
