//! Player rating service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sietch_common::{AppError, AppResult, id::IdGenerator};
use sietch_db::entities::group_ad;
use sietch_db::entities::group_match::{self, MatchStatus};
use sietch_db::entities::player_rating;
use sietch_db::store::{GroupAdStore, MatchStore, RatingStore, RatingSummary};
use validator::Validate;

use crate::rules::{MatchmakingSettings, can_rate, rateable_members, rating_counterparts};

/// Input for rating another member of a closed group.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingInput {
    pub group_id: String,
    pub to_player_id: String,
    #[validate(range(min = 1, max = 5))]
    pub stars: i16,
    #[validate(length(max = 200))]
    pub comment: Option<String>,
}

/// Who a player still has to rate in one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRatings {
    pub group_id: String,
    pub window_open: bool,
    pub closes_at: Option<DateTime<Utc>>,
    pub pending: Vec<String>,
}

/// Service for ratings between group members.
#[derive(Clone)]
pub struct RatingService {
    groups: Arc<dyn GroupAdStore>,
    matches: Arc<dyn MatchStore>,
    ratings: Arc<dyn RatingStore>,
    settings: MatchmakingSettings,
    id_gen: IdGenerator,
}

impl RatingService {
    /// Create a new rating service.
    #[must_use]
    pub fn new(
        groups: Arc<dyn GroupAdStore>,
        matches: Arc<dyn MatchStore>,
        ratings: Arc<dyn RatingStore>,
        settings: MatchmakingSettings,
    ) -> Self {
        Self {
            groups,
            matches,
            ratings,
            settings,
            id_gen: IdGenerator::new(),
        }
    }

    /// Rate another member of a group during its rating window.
    pub async fn submit(
        &self,
        from_player_id: &str,
        input: SubmitRatingInput,
    ) -> AppResult<player_rating::Model> {
        input.validate()?;
        if input.to_player_id == from_player_id {
            return Err(AppError::Validation("Players cannot rate themselves".to_string()));
        }

        let group = self.group(&input.group_id).await?;
        let now = Utc::now();
        if !can_rate(&group, now, self.settings.rating_window) {
            return Err(AppError::RatingWindowClosed);
        }

        let members = rateable_members(&group, &self.accepted(&group).await?);
        if !members.contains(from_player_id) || !members.contains(&input.to_player_id) {
            return Err(AppError::NotGroupMember);
        }

        let comment = input
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let model = player_rating::Model {
            id: self.id_gen.generate(),
            from_player_id: from_player_id.to_string(),
            to_player_id: input.to_player_id,
            group_id: group.id,
            stars: input.stars,
            comment,
            created_at: now.into(),
        };

        let rating = self.ratings.insert_rating(model).await?;
        tracing::info!(
            group_id = %rating.group_id,
            from = %rating.from_player_id,
            to = %rating.to_player_id,
            "Recorded rating"
        );
        Ok(rating)
    }

    /// Counterparts `player_id` has not rated yet in a group.
    pub async fn pending_counterparts(
        &self,
        player_id: &str,
        group_id: &str,
    ) -> AppResult<PendingRatings> {
        let group = self.group(group_id).await?;
        let accepted = self.accepted(&group).await?;
        if !rateable_members(&group, &accepted).contains(player_id) {
            return Err(AppError::NotGroupMember);
        }

        let window_open = can_rate(&group, Utc::now(), self.settings.rating_window);
        let closes_at = group
            .closed_at
            .map(|c| c.with_timezone(&Utc) + self.settings.rating_window);

        let pending = if window_open {
            let given = self.ratings.list_given_in_group(player_id, group_id).await?;
            rating_counterparts(&group, &accepted, player_id)
                .into_iter()
                .filter(|to| !given.iter().any(|r| &r.to_player_id == to))
                .collect()
        } else {
            Vec::new()
        };

        Ok(PendingRatings {
            group_id: group.id,
            window_open,
            closes_at,
            pending,
        })
    }

    /// Number and average of the stars a player received.
    pub async fn summary(&self, player_id: &str) -> AppResult<RatingSummary> {
        self.ratings.summary_for(player_id).await
    }

    async fn group(&self, group_id: &str) -> AppResult<group_ad::Model> {
        self.groups
            .find_group(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group not found: {group_id}")))
    }

    async fn accepted(&self, group: &group_ad::Model) -> AppResult<Vec<group_match::Model>> {
        self.matches
            .list_for_group(&group.id, &[MatchStatus::Accepted])
            .await
    }
}
