//! Store interfaces consumed by the matchmaking engine.
//!
//! The engine never talks to the database directly. It sees these narrow
//! traits, implemented by the sea-orm repositories for production and by
//! [`crate::test_utils::MemoryStore`] for tests. Every implementation must
//! honour the same guarantees:
//!
//! - "not found" is `Ok(None)`, never an error
//! - a unique `(group_id, player_id)` application fails with
//!   [`AppError::AlreadyApplied`](sietch_common::AppError::AlreadyApplied)
//! - a unique `(from, to, group)` rating fails with
//!   [`AppError::DuplicateRating`](sietch_common::AppError::DuplicateRating)
//! - [`MatchStore::accept_within_capacity`] is atomic with respect to other
//!   accepts on the same group

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::DatabaseConnection;
use sietch_common::AppResult;

use crate::entities::group_match::MatchStatus;
use crate::entities::{group_ad, group_match, player, player_rating};
use crate::repositories::{
    GroupAdRepository, GroupMatchRepository, PlayerRatingRepository, PlayerRepository,
};

/// Result of a conditional accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// The application moved to `accepted`.
    Accepted(group_match::Model),
    /// The group already holds the maximum number of accepted members.
    CapacityReached,
    /// The application was no longer `invited`.
    NotPending(MatchStatus),
}

/// Ratings received by a player.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatingSummary {
    pub count: u64,
    pub average: Option<f64>,
}

impl RatingSummary {
    /// Build a summary from a star total and a rating count.
    #[must_use]
    pub fn from_totals(count: u64, total_stars: i64) -> Self {
        let average = (count > 0).then(|| total_stars as f64 / count as f64);
        Self { count, average }
    }
}

/// Player profile persistence.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    async fn find_player(&self, id: &str) -> AppResult<Option<player::Model>>;

    async fn find_player_by_nickname(&self, nickname: &str) -> AppResult<Option<player::Model>>;

    async fn insert_player(&self, model: player::Model) -> AppResult<player::Model>;

    async fn update_player(&self, model: player::Model) -> AppResult<player::Model>;
}

/// Group advertisement persistence.
#[async_trait]
pub trait GroupAdStore: Send + Sync {
    async fn insert_group(&self, model: group_ad::Model) -> AppResult<group_ad::Model>;

    async fn find_group(&self, id: &str) -> AppResult<Option<group_ad::Model>>;

    async fn find_groups(&self, ids: &[String]) -> AppResult<Vec<group_ad::Model>>;

    /// Groups with persisted status `open`, created strictly after
    /// `created_after` and holding fewer than `max_accepted` accepted
    /// applications, newest first. Paging applies after that filter.
    async fn find_joinable_created_after(
        &self,
        created_after: DateTime<FixedOffset>,
        max_accepted: u64,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<group_ad::Model>>;

    /// Groups of a host that are not closed, newest first.
    async fn find_unclosed_hosted_by(&self, host_id: &str) -> AppResult<Vec<group_ad::Model>>;

    /// All groups of a host, newest first.
    async fn find_hosted_by(
        &self,
        host_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<group_ad::Model>>;

    /// Persist `status = closed` and stamp `closed_at`, only if the group is
    /// not closed yet. Returns `None` when nothing changed.
    async fn close_if_open(
        &self,
        id: &str,
        closed_at: DateTime<FixedOffset>,
    ) -> AppResult<Option<group_ad::Model>>;
}

/// Application ledger persistence.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn insert_match(&self, model: group_match::Model) -> AppResult<group_match::Model>;

    async fn find_match(&self, id: &str) -> AppResult<Option<group_match::Model>>;

    async fn find_for_player_in_group(
        &self,
        group_id: &str,
        player_id: &str,
    ) -> AppResult<Option<group_match::Model>>;

    /// Applications of a group with one of `statuses`, oldest first.
    async fn list_for_group(
        &self,
        group_id: &str,
        statuses: &[MatchStatus],
    ) -> AppResult<Vec<group_match::Model>>;

    /// Invited or accepted applications of a player, in any group.
    async fn list_active_for_player(&self, player_id: &str)
    -> AppResult<Vec<group_match::Model>>;

    /// Number of accepted applications per group. Groups without any are absent.
    async fn count_accepted_by_group(&self, group_ids: &[String])
    -> AppResult<HashMap<String, u64>>;

    /// Accept an `invited` application only while the group has fewer than
    /// `max_accepted` accepted applications, as one atomic step.
    async fn accept_within_capacity(
        &self,
        match_id: &str,
        max_accepted: u64,
        accepted_at: DateTime<FixedOffset>,
    ) -> AppResult<AcceptOutcome>;

    /// Move an application to `declined` unless it already is.
    /// Returns `None` when it was already declined.
    async fn decline_if_active(
        &self,
        match_id: &str,
        declined_at: DateTime<FixedOffset>,
    ) -> AppResult<Option<group_match::Model>>;
}

/// Rating persistence.
#[async_trait]
pub trait RatingStore: Send + Sync {
    async fn insert_rating(&self, model: player_rating::Model) -> AppResult<player_rating::Model>;

    /// Ratings a player gave within one group.
    async fn list_given_in_group(
        &self,
        from_player_id: &str,
        group_id: &str,
    ) -> AppResult<Vec<player_rating::Model>>;

    async fn summary_for(&self, player_id: &str) -> AppResult<RatingSummary>;
}

/// The four stores a service layer is built from.
#[derive(Clone)]
pub struct Stores {
    pub players: Arc<dyn PlayerStore>,
    pub groups: Arc<dyn GroupAdStore>,
    pub matches: Arc<dyn MatchStore>,
    pub ratings: Arc<dyn RatingStore>,
}

impl Stores {
    /// Stores backed by the sea-orm repositories.
    #[must_use]
    pub fn postgres(db: Arc<DatabaseConnection>) -> Self {
        Self {
            players: Arc::new(PlayerRepository::new(Arc::clone(&db))),
            groups: Arc::new(GroupAdRepository::new(Arc::clone(&db))),
            matches: Arc::new(GroupMatchRepository::new(Arc::clone(&db))),
            ratings: Arc::new(PlayerRatingRepository::new(db)),
        }
    }

    /// Use one value implementing every store for all four roles.
    #[must_use]
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: PlayerStore + GroupAdStore + MatchStore + RatingStore + 'static,
    {
        Self {
            players: store.clone(),
            groups: store.clone(),
            matches: store.clone(),
            ratings: store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_without_ratings() {
        let summary = RatingSummary::from_totals(0, 0);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average, None);
    }

    #[test]
    fn test_summary_average() {
        let summary = RatingSummary::from_totals(4, 17);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.average, Some(4.25));
    }
}
