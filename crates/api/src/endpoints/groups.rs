//! Group endpoints.

use axum::{Json, Router, extract::State, routing::post};
use sietch_common::AppResult;
use sietch_core::{ActiveEngagement, BrowseEntry, CreateGroupInput, GroupDetails, GroupView};
use serde::{Deserialize, Serialize};

use super::PageRequest;
use crate::{extractors::AuthPlayer, middleware::AppState, response::ApiResponse};

/// Request naming one group.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupIdRequest {
    pub group_id: String,
}

/// The caller's active engagement, if any.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementResponse {
    pub engaged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engagement: Option<ActiveEngagement>,
}

/// Publish a group.
async fn create(
    AuthPlayer(host_id): AuthPlayer,
    State(state): State<AppState>,
    Json(input): Json<CreateGroupInput>,
) -> AppResult<ApiResponse<GroupDetails>> {
    let group = state.group_service.create(&host_id, input).await?;
    let details = state.group_service.get_group(&group.id).await?;
    Ok(ApiResponse::ok(details))
}

/// Show a group with its members.
async fn show(
    AuthPlayer(_): AuthPlayer,
    State(state): State<AppState>,
    Json(req): Json<GroupIdRequest>,
) -> AppResult<ApiResponse<GroupDetails>> {
    let details = state.group_service.get_group(&req.group_id).await?;
    Ok(ApiResponse::ok(details))
}

/// Browse groups accepting applications.
async fn browse(
    AuthPlayer(viewer_id): AuthPlayer,
    State(state): State<AppState>,
    Json(req): Json<PageRequest>,
) -> AppResult<ApiResponse<Vec<BrowseEntry>>> {
    let entries = state
        .group_service
        .browse_open_groups(&viewer_id, req.limit(), req.offset)
        .await?;
    Ok(ApiResponse::ok(entries))
}

/// Close one of the caller's groups.
async fn close(
    AuthPlayer(host_id): AuthPlayer,
    State(state): State<AppState>,
    Json(req): Json<GroupIdRequest>,
) -> AppResult<ApiResponse<GroupView>> {
    let group = state
        .group_service
        .close_group(&req.group_id, &host_id)
        .await?;
    Ok(ApiResponse::ok(group))
}

/// Groups the caller published.
async fn hosted(
    AuthPlayer(host_id): AuthPlayer,
    State(state): State<AppState>,
    Json(req): Json<PageRequest>,
) -> AppResult<ApiResponse<Vec<GroupView>>> {
    let groups = state
        .group_service
        .list_hosted(&host_id, req.limit(), req.offset)
        .await?;
    Ok(ApiResponse::ok(groups))
}

/// The group the caller is currently engaged in.
async fn engagement(
    AuthPlayer(player_id): AuthPlayer,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<EngagementResponse>> {
    let engagement = state.group_service.active_engagement(&player_id).await?;
    Ok(ApiResponse::ok(EngagementResponse {
        engaged: engagement.is_some(),
        engagement,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/show", post(show))
        .route("/browse", post(browse))
        .route("/close", post(close))
        .route("/hosted", post(hosted))
        .route("/engagement", post(engagement))
}
