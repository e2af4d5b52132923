//! Player endpoints.

use axum::{Json, Router, extract::State, routing::post};
use sietch_common::AppResult;
use sietch_core::{RegisterPlayerInput, UpdatePlayerInput};
use sietch_db::entities::group_ad::Activity;
use sietch_db::entities::player;
use sietch_db::store::RatingSummary;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthPlayer, middleware::AppState, response::ApiResponse};

/// Show player request. Defaults to the caller.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowPlayerRequest {
    pub player_id: Option<String>,
}

/// Player response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub id: String,
    pub nickname: String,
    pub game_id: String,
    pub level: i32,
    pub weapon_tier: Option<String>,
    pub armor_tier: Option<String>,
    pub vehicle_tier: Option<String>,
    pub mining_tool_tier: Option<String>,
    pub spice_tool_tier: Option<String>,
    pub interests: Vec<Activity>,
    pub has_base: bool,
    pub base_sector: Option<String>,
    pub created_at: String,
}

impl From<player::Model> for PlayerResponse {
    fn from(p: player::Model) -> Self {
        Self {
            id: p.id,
            nickname: p.nickname,
            game_id: p.game_id,
            level: p.level,
            weapon_tier: p.weapon_tier,
            armor_tier: p.armor_tier,
            vehicle_tier: p.vehicle_tier,
            mining_tool_tier: p.mining_tool_tier,
            spice_tool_tier: p.spice_tool_tier,
            interests: p.interests.0,
            has_base: p.has_base,
            base_sector: p.base_sector,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Rating summary response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummaryResponse {
    pub count: u64,
    pub average: Option<f64>,
}

impl From<RatingSummary> for RatingSummaryResponse {
    fn from(s: RatingSummary) -> Self {
        Self {
            count: s.count,
            average: s.average,
        }
    }
}

/// Player with received ratings.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDetailResponse {
    #[serde(flatten)]
    pub player: PlayerResponse,
    pub rating: RatingSummaryResponse,
}

/// Register the caller's player profile.
async fn register(
    AuthPlayer(user_id): AuthPlayer,
    State(state): State<AppState>,
    Json(input): Json<RegisterPlayerInput>,
) -> AppResult<ApiResponse<PlayerResponse>> {
    let player = state.player_service.register(&user_id, input).await?;
    Ok(ApiResponse::ok(player.into()))
}

/// Update the caller's player profile.
async fn update(
    AuthPlayer(user_id): AuthPlayer,
    State(state): State<AppState>,
    Json(input): Json<UpdatePlayerInput>,
) -> AppResult<ApiResponse<PlayerResponse>> {
    let player = state.player_service.update(&user_id, input).await?;
    Ok(ApiResponse::ok(player.into()))
}

/// Show a player profile.
async fn show(
    AuthPlayer(user_id): AuthPlayer,
    State(state): State<AppState>,
    Json(req): Json<ShowPlayerRequest>,
) -> AppResult<ApiResponse<PlayerDetailResponse>> {
    let player_id = req.player_id.unwrap_or(user_id);
    let player = state.player_service.get_by_id(&player_id).await?;
    let rating = state.rating_service.summary(&player_id).await?;
    Ok(ApiResponse::ok(PlayerDetailResponse {
        player: player.into(),
        rating: rating.into(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/update", post(update))
        .route("/show", post(show))
}
