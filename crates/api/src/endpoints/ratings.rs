//! Rating endpoints.

use axum::{Json, Router, extract::State, routing::post};
use sietch_common::AppResult;
use sietch_core::{PendingRatings, SubmitRatingInput};
use sietch_db::entities::player_rating;
use serde::{Deserialize, Serialize};

use super::groups::GroupIdRequest;
use super::players::RatingSummaryResponse;
use crate::{extractors::AuthPlayer, middleware::AppState, response::ApiResponse};

/// Rating summary request. Defaults to the caller.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub player_id: Option<String>,
}

/// Rating response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub id: String,
    pub from_player_id: String,
    pub to_player_id: String,
    pub group_id: String,
    pub stars: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<player_rating::Model> for RatingResponse {
    fn from(r: player_rating::Model) -> Self {
        Self {
            id: r.id,
            from_player_id: r.from_player_id,
            to_player_id: r.to_player_id,
            group_id: r.group_id,
            stars: r.stars,
            comment: r.comment,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Rate another member of a closed group.
async fn submit(
    AuthPlayer(player_id): AuthPlayer,
    State(state): State<AppState>,
    Json(input): Json<SubmitRatingInput>,
) -> AppResult<ApiResponse<RatingResponse>> {
    let rating = state.rating_service.submit(&player_id, input).await?;
    Ok(ApiResponse::ok(rating.into()))
}

/// Members of a group the caller has yet to rate.
async fn pending(
    AuthPlayer(player_id): AuthPlayer,
    State(state): State<AppState>,
    Json(req): Json<GroupIdRequest>,
) -> AppResult<ApiResponse<PendingRatings>> {
    let pending = state
        .rating_service
        .pending_counterparts(&player_id, &req.group_id)
        .await?;
    Ok(ApiResponse::ok(pending))
}

/// Ratings a player received.
async fn summary(
    AuthPlayer(user_id): AuthPlayer,
    State(state): State<AppState>,
    Json(req): Json<SummaryRequest>,
) -> AppResult<ApiResponse<RatingSummaryResponse>> {
    let player_id = req.player_id.unwrap_or(user_id);
    let summary = state.rating_service.summary(&player_id).await?;
    Ok(ApiResponse::ok(summary.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/submit", post(submit))
        .route("/pending", post(pending))
        .route("/summary", post(summary))
}
