use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

use wayfare_core::domain::attraction::{Attraction, Region};
use wayfare_core::domain::review::{ReviewRecord, ReviewSubmission};
use wayfare_core::errors::{ApplicationError, InterfaceError};
use wayfare_core::ranking::TrendingEntry;
use wayfare_core::recommendation::{Recommendation, RecommendationSource};
use wayfare_db::repositories::AttractionRepository;

use crate::recommendations::RecommendationOrchestrator;
use crate::reviews::ReviewLedger;
use crate::trending::TrendingService;

#[derive(Clone)]
pub struct AppState {
    pub recommendations: Arc<RecommendationOrchestrator>,
    pub trending: Arc<TrendingService>,
    pub reviews: Arc<ReviewLedger>,
    pub repository: Arc<dyn AttractionRepository>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecommendationsResponse {
    pub success: bool,
    pub key: String,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub backup: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecommendationsFailure {
    pub success: bool,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReviewCreated {
    pub message: &'static str,
    pub review: ReviewRecord,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttractionDetail {
    pub attraction: Attraction,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorBody>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/recommendations/{key}", get(recommendations))
        .route("/top-trending", get(top_trending))
        .route("/reviews", post(add_review))
        .route("/attraction-detail/{name}", get(attraction_detail))
        .route("/states", get(states))
        .with_state(state)
}

fn correlation_id() -> String {
    Uuid::new_v4().to_string()
}

fn status_for(error: &InterfaceError) -> StatusCode {
    match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client errors carry the user-facing message; server errors carry `internal_message` plus the
/// diagnostic detail.
fn api_error(error: ApplicationError, correlation_id: &str, internal_message: &str) -> ApiError {
    let interface = error.into_interface(correlation_id);
    let status = status_for(&interface);
    let message = match interface {
        InterfaceError::Internal { .. } => internal_message.to_string(),
        _ => interface.user_message().to_string(),
    };
    (status, Json(ErrorBody { message, error: Some(interface.detail().to_string()) }))
}

pub async fn recommendations(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<RecommendationsResponse>, (StatusCode, Json<RecommendationsFailure>)> {
    let correlation_id = correlation_id();
    match state.recommendations.recommend(&key, &correlation_id).await {
        Ok(outcome) => Ok(Json(RecommendationsResponse {
            success: true,
            key,
            backup: outcome.source == RecommendationSource::Backup,
            recommendations: outcome.items,
        })),
        Err(error) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RecommendationsFailure {
                success: false,
                message: format!("Error fetching recommendations: {error}"),
            }),
        )),
    }
}

pub async fn top_trending(
    State(state): State<AppState>,
) -> Result<Json<Vec<TrendingEntry>>, ApiError> {
    let correlation_id = correlation_id();
    state
        .trending
        .top(&correlation_id)
        .await
        .map(Json)
        .map_err(|error| api_error(error, &correlation_id, "Error fetching data"))
}

pub async fn add_review(
    State(state): State<AppState>,
    payload: Result<Json<ReviewSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<ReviewCreated>), ApiError> {
    let correlation_id = correlation_id();
    let Json(submission) = payload.map_err(|rejection| {
        warn!(
            event_name = "api.reviews.rejected_body",
            correlation_id = %correlation_id,
            error = %rejection,
            "review body could not be decoded"
        );
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                message: "Invalid request body".to_string(),
                error: Some(rejection.body_text()),
            }),
        )
    })?;

    let review = state
        .reviews
        .submit(submission, &correlation_id)
        .await
        .map_err(|error| api_error(error, &correlation_id, "Error adding review"))?;

    Ok((StatusCode::CREATED, Json(ReviewCreated { message: "Review added successfully", review })))
}

pub async fn attraction_detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<AttractionDetail>, ApiError> {
    let correlation_id = correlation_id();
    let found = state.repository.find_by_name(&name).await.map_err(|error| {
        error!(
            event_name = "api.attraction_detail.failed",
            correlation_id = %correlation_id,
            attraction = %name,
            error = %error,
            "attraction lookup failed"
        );
        api_error(error.into(), &correlation_id, "Error fetching data")
    })?;

    found.map(|attraction| Json(AttractionDetail { attraction })).ok_or_else(|| {
        api_error(
            ApplicationError::NotFound { entity: "attraction", key: name },
            &correlation_id,
            "Error fetching data",
        )
    })
}

pub async fn states(State(state): State<AppState>) -> Result<Json<Vec<Region>>, ApiError> {
    let correlation_id = correlation_id();
    state.repository.list_regions().await.map(Json).map_err(|error| {
        error!(
            event_name = "api.states.failed",
            correlation_id = %correlation_id,
            error = %error,
            "region listing failed"
        );
        api_error(error.into(), &correlation_id, "Error fetching data")
    })
}
