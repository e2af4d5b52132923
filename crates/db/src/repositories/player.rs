//! Player repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
};
use sietch_common::{AppError, AppResult};

use super::{is_unique_violation, store_err};
use crate::entities::{Player, player};
use crate::store::PlayerStore;

/// Repository for player profiles.
#[derive(Clone)]
pub struct PlayerRepository {
    db: Arc<DatabaseConnection>,
}

impl PlayerRepository {
    /// Create a new player repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlayerStore for PlayerRepository {
    async fn find_player(&self, id: &str) -> AppResult<Option<player::Model>> {
        Player::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(store_err)
    }

    async fn find_player_by_nickname(&self, nickname: &str) -> AppResult<Option<player::Model>> {
        Player::find()
            .filter(player::Column::Nickname.eq(nickname))
            .one(self.db.as_ref())
            .await
            .map_err(store_err)
    }

    async fn insert_player(&self, model: player::Model) -> AppResult<player::Model> {
        model
            .into_active_model()
            .reset_all()
            .insert(self.db.as_ref())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("Player or nickname already registered".to_string())
                } else {
                    store_err(e)
                }
            })
    }

    async fn update_player(&self, model: player::Model) -> AppResult<player::Model> {
        model
            .into_active_model()
            .reset_all()
            .update(self.db.as_ref())
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => AppError::NotFound("Player".to_string()),
                other => store_err(other),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::group_ad::Activity;
    use crate::entities::player::InterestSet;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_player(id: &str, nickname: &str) -> player::Model {
        player::Model {
            id: id.to_string(),
            nickname: nickname.to_string(),
            game_id: format!("game-{id}"),
            level: 40,
            weapon_tier: Some("T3 - Tier 3".to_string()),
            armor_tier: None,
            vehicle_tier: None,
            mining_tool_tier: None,
            spice_tool_tier: None,
            interests: InterestSet(vec![Activity::PvP]),
            has_base: false,
            base_sector: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_player() {
        let player = create_test_player("user1", "Stilgar");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[player.clone()]])
                .into_connection(),
        );

        let repo = PlayerRepository::new(db);
        let result = repo.find_player("user1").await.unwrap();

        assert_eq!(result, Some(player));
    }

    #[tokio::test]
    async fn test_find_player_missing_is_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<player::Model>::new()])
                .into_connection(),
        );

        let repo = PlayerRepository::new(db);
        let result = repo.find_player_by_nickname("Nobody").await.unwrap();

        assert!(result.is_none());
    }
}
