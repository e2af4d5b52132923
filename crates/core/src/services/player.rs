//! Player profile service.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Deserializer};
use sietch_common::{AppError, AppResult};
use sietch_db::entities::group_ad::Activity;
use sietch_db::entities::player::{self, InterestSet};
use sietch_db::store::PlayerStore;
use validator::Validate;

use crate::rules::PlayerProfile;

/// Input for registering a player profile.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPlayerInput {
    #[validate(length(min = 3, max = 32))]
    pub nickname: String,
    #[validate(length(min = 1, max = 64))]
    pub game_id: String,
    #[validate(range(min = 1, max = 200))]
    pub level: i32,
    #[validate(length(max = 32))]
    pub weapon_tier: Option<String>,
    #[validate(length(max = 32))]
    pub armor_tier: Option<String>,
    #[validate(length(max = 32))]
    pub vehicle_tier: Option<String>,
    #[validate(length(max = 32))]
    pub mining_tool_tier: Option<String>,
    #[validate(length(max = 32))]
    pub spice_tool_tier: Option<String>,
    #[validate(length(min = 1))]
    pub interests: Vec<Activity>,
    #[serde(default)]
    pub has_base: bool,
    #[validate(length(max = 64))]
    pub base_sector: Option<String>,
}

/// Input for updating a player profile.
///
/// Nickname and game id are fixed at registration and cannot be changed.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlayerInput {
    #[validate(range(min = 1, max = 200))]
    pub level: Option<i32>,
    #[validate(length(max = 32))]
    #[serde(default, deserialize_with = "present")]
    pub weapon_tier: Option<Option<String>>,
    #[validate(length(max = 32))]
    #[serde(default, deserialize_with = "present")]
    pub armor_tier: Option<Option<String>>,
    #[validate(length(max = 32))]
    #[serde(default, deserialize_with = "present")]
    pub vehicle_tier: Option<Option<String>>,
    #[validate(length(max = 32))]
    #[serde(default, deserialize_with = "present")]
    pub mining_tool_tier: Option<Option<String>>,
    #[validate(length(max = 32))]
    #[serde(default, deserialize_with = "present")]
    pub spice_tool_tier: Option<Option<String>>,
    #[validate(length(min = 1))]
    pub interests: Option<Vec<Activity>>,
    pub has_base: Option<bool>,
    #[validate(length(max = 64))]
    #[serde(default, deserialize_with = "present")]
    pub base_sector: Option<Option<String>>,
}

/// Keep an explicit `null` apart from an absent field: absent stays `None`,
/// `null` becomes `Some(None)`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Service for player profiles.
#[derive(Clone)]
pub struct PlayerService {
    players: Arc<dyn PlayerStore>,
}

impl PlayerService {
    /// Create a new player service.
    #[must_use]
    pub fn new(players: Arc<dyn PlayerStore>) -> Self {
        Self { players }
    }

    /// Get a player by ID.
    pub async fn get(&self, player_id: &str) -> AppResult<Option<player::Model>> {
        self.players.find_player(player_id).await
    }

    /// Get a player by ID, failing when absent.
    pub async fn get_by_id(&self, player_id: &str) -> AppResult<player::Model> {
        self.get(player_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Player not found: {player_id}")))
    }

    /// The evaluator's view of a player, if they registered.
    pub async fn profile(&self, player_id: &str) -> AppResult<Option<PlayerProfile>> {
        Ok(self.get(player_id).await?.as_ref().map(PlayerProfile::from))
    }

    /// Register the profile of an authenticated identity.
    pub async fn register(
        &self,
        user_id: &str,
        input: RegisterPlayerInput,
    ) -> AppResult<player::Model> {
        input.validate()?;

        let nickname = input.nickname.trim().to_string();
        if nickname.chars().count() < 3 {
            return Err(AppError::Validation(
                "Nickname must be at least 3 characters".to_string(),
            ));
        }
        let base_sector = check_base(input.has_base, input.base_sector)?;

        if self.players.find_player(user_id).await?.is_some() {
            return Err(AppError::Conflict("Player already registered".to_string()));
        }
        if self
            .players
            .find_player_by_nickname(&nickname)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!("Nickname already taken: {nickname}")));
        }

        let model = player::Model {
            id: user_id.to_string(),
            nickname,
            game_id: input.game_id.trim().to_string(),
            level: input.level,
            weapon_tier: clean(input.weapon_tier),
            armor_tier: clean(input.armor_tier),
            vehicle_tier: clean(input.vehicle_tier),
            mining_tool_tier: clean(input.mining_tool_tier),
            spice_tool_tier: clean(input.spice_tool_tier),
            interests: interest_set(input.interests),
            has_base: input.has_base,
            base_sector,
            created_at: Utc::now().into(),
            updated_at: None,
        };

        let player = self.players.insert_player(model).await?;
        tracing::info!(player_id = %player.id, "Registered player");
        Ok(player)
    }

    /// Update the editable attributes of a profile.
    pub async fn update(&self, user_id: &str, input: UpdatePlayerInput) -> AppResult<player::Model> {
        input.validate()?;

        let mut player = self.get_by_id(user_id).await?;

        if let Some(level) = input.level {
            player.level = level;
        }
        if let Some(tier) = input.weapon_tier {
            player.weapon_tier = clean(tier);
        }
        if let Some(tier) = input.armor_tier {
            player.armor_tier = clean(tier);
        }
        if let Some(tier) = input.vehicle_tier {
            player.vehicle_tier = clean(tier);
        }
        if let Some(tier) = input.mining_tool_tier {
            player.mining_tool_tier = clean(tier);
        }
        if let Some(tier) = input.spice_tool_tier {
            player.spice_tool_tier = clean(tier);
        }
        if let Some(interests) = input.interests {
            player.interests = interest_set(interests);
        }
        if let Some(has_base) = input.has_base {
            player.has_base = has_base;
            if !has_base {
                player.base_sector = None;
            }
        }
        if let Some(sector) = input.base_sector {
            player.base_sector = sector;
        }
        player.base_sector = check_base(player.has_base, player.base_sector.take())?;
        player.updated_at = Some(Utc::now().into());

        let player = self.players.update_player(player).await?;
        tracing::debug!(player_id = %player.id, "Updated player");
        Ok(player)
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn interest_set(interests: Vec<Activity>) -> InterestSet {
    let mut unique = Vec::with_capacity(interests.len());
    for interest in interests {
        if !unique.contains(&interest) {
            unique.push(interest);
        }
    }
    InterestSet(unique)
}

/// A base sector is required with a base and refused without one.
fn check_base(has_base: bool, sector: Option<String>) -> AppResult<Option<String>> {
    match (has_base, clean(sector)) {
        (true, None) => Err(AppError::Validation(
            "Base sector is required when the player has a base".to_string(),
        )),
        (false, Some(_)) => Err(AppError::Validation(
            "Base sector requires a base".to_string(),
        )),
        (_, sector) => Ok(sector),
    }
}
