//! Group application endpoints.

use axum::{Json, Router, extract::State, routing::post};
use sietch_common::AppResult;
use sietch_core::ApplicationView;
use sietch_db::entities::group_match::{self, MatchStatus};
use serde::{Deserialize, Serialize};

use super::groups::GroupIdRequest;
use crate::{extractors::AuthPlayer, middleware::AppState, response::ApiResponse};

/// Request naming one application.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchIdRequest {
    pub match_id: String,
}

/// Application response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub id: String,
    pub group_id: String,
    pub player_id: String,
    pub status: MatchStatus,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<String>,
}

impl From<group_match::Model> for MatchResponse {
    fn from(m: group_match::Model) -> Self {
        Self {
            id: m.id,
            group_id: m.group_id,
            player_id: m.player_id,
            status: m.status,
            created_at: m.created_at.to_rfc3339(),
            accepted_at: m.accepted_at.map(|a| a.to_rfc3339()),
        }
    }
}

/// Apply to a group.
async fn apply(
    AuthPlayer(player_id): AuthPlayer,
    State(state): State<AppState>,
    Json(req): Json<GroupIdRequest>,
) -> AppResult<ApiResponse<MatchResponse>> {
    let application = state
        .application_service
        .apply(&req.group_id, &player_id)
        .await?;
    Ok(ApiResponse::ok(application.into()))
}

/// Accept an application to one of the caller's groups.
async fn accept(
    AuthPlayer(host_id): AuthPlayer,
    State(state): State<AppState>,
    Json(req): Json<MatchIdRequest>,
) -> AppResult<ApiResponse<MatchResponse>> {
    let application = state
        .application_service
        .accept(&req.match_id, &host_id)
        .await?;
    Ok(ApiResponse::ok(application.into()))
}

/// Decline an application, as host or as the candidate.
async fn decline(
    AuthPlayer(player_id): AuthPlayer,
    State(state): State<AppState>,
    Json(req): Json<MatchIdRequest>,
) -> AppResult<ApiResponse<MatchResponse>> {
    let application = state
        .application_service
        .decline(&req.match_id, &player_id)
        .await?;
    Ok(ApiResponse::ok(application.into()))
}

/// Withdraw from a group.
async fn leave(
    AuthPlayer(player_id): AuthPlayer,
    State(state): State<AppState>,
    Json(req): Json<GroupIdRequest>,
) -> AppResult<ApiResponse<MatchResponse>> {
    let application = state
        .application_service
        .leave(&req.group_id, &player_id)
        .await?;
    Ok(ApiResponse::ok(application.into()))
}

/// Pending and accepted applications of one of the caller's groups.
async fn list(
    AuthPlayer(host_id): AuthPlayer,
    State(state): State<AppState>,
    Json(req): Json<GroupIdRequest>,
) -> AppResult<ApiResponse<Vec<ApplicationView>>> {
    let applications = state
        .application_service
        .list_open_applications(&req.group_id, &host_id)
        .await?;
    Ok(ApiResponse::ok(applications))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/apply", post(apply))
        .route("/accept", post(accept))
        .route("/decline", post(decline))
        .route("/leave", post(leave))
        .route("/list", post(list))
}
