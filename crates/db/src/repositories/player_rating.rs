//! Player rating repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QuerySelect,
};
use sietch_common::{AppError, AppResult};

use super::{is_unique_violation, store_err};
use crate::entities::{PlayerRating, player_rating};
use crate::store::{RatingStore, RatingSummary};

/// Repository for player ratings.
#[derive(Clone)]
pub struct PlayerRatingRepository {
    db: Arc<DatabaseConnection>,
}

impl PlayerRatingRepository {
    /// Create a new player rating repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RatingStore for PlayerRatingRepository {
    async fn insert_rating(&self, model: player_rating::Model) -> AppResult<player_rating::Model> {
        model
            .into_active_model()
            .reset_all()
            .insert(self.db.as_ref())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::DuplicateRating
                } else {
                    store_err(e)
                }
            })
    }

    async fn list_given_in_group(
        &self,
        from_player_id: &str,
        group_id: &str,
    ) -> AppResult<Vec<player_rating::Model>> {
        PlayerRating::find()
            .filter(player_rating::Column::FromPlayerId.eq(from_player_id))
            .filter(player_rating::Column::GroupId.eq(group_id))
            .all(self.db.as_ref())
            .await
            .map_err(store_err)
    }

    async fn summary_for(&self, player_id: &str) -> AppResult<RatingSummary> {
        let totals: Option<(i64, Option<i64>)> = PlayerRating::find()
            .select_only()
            .column_as(player_rating::Column::Id.count(), "count")
            .column_as(player_rating::Column::Stars.sum(), "total")
            .filter(player_rating::Column::ToPlayerId.eq(player_id))
            .into_tuple()
            .one(self.db.as_ref())
            .await
            .map_err(store_err)?;

        let (count, total) = totals.unwrap_or((0, None));
        Ok(RatingSummary::from_totals(
            u64::try_from(count).unwrap_or(0),
            total.unwrap_or(0),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_rating(id: &str, from: &str, to: &str, stars: i16) -> player_rating::Model {
        player_rating::Model {
            id: id.to_string(),
            from_player_id: from.to_string(),
            to_player_id: to.to_string(),
            group_id: "grp1".to_string(),
            stars,
            comment: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_list_given_in_group() {
        let r1 = create_test_rating("r1", "user1", "user2", 5);
        let r2 = create_test_rating("r2", "user1", "user3", 3);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r1, r2]])
                .into_connection(),
        );

        let repo = PlayerRatingRepository::new(db);
        let result = repo.list_given_in_group("user1", "grp1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].to_player_id, "user2");
    }

    #[tokio::test]
    async fn test_insert_rating() {
        let rating = create_test_rating("r1", "user1", "user2", 4);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[rating.clone()]])
                .into_connection(),
        );

        let repo = PlayerRatingRepository::new(db);
        let result = repo.insert_rating(rating).await.unwrap();

        assert_eq!(result.stars, 4);
    }
}
