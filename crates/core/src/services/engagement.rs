//! The one place that decides whether a player is tied up in a group.
//!
//! Group creation and applying both ask [`EngagementQuery::find`], so the
//! host and member sides of the exclusivity rule cannot drift apart.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sietch_common::AppResult;
use sietch_db::entities::group_ad;
use sietch_db::entities::group_match::MatchStatus;
use sietch_db::store::{GroupAdStore, MatchStore};

use crate::rules::{MatchmakingSettings, derive_state};

/// How a player takes part in their active group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementRole {
    Host,
    Candidate,
    Member,
}

/// The group a player is currently engaged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEngagement {
    pub group: group_ad::Model,
    pub role: EngagementRole,
    pub match_id: Option<String>,
}

/// Lookup of a player's active engagement.
///
/// A group engages its host and its invited or accepted candidates until it
/// is closed or expires. Full groups still engage.
#[derive(Clone)]
pub struct EngagementQuery {
    groups: Arc<dyn GroupAdStore>,
    matches: Arc<dyn MatchStore>,
    settings: MatchmakingSettings,
}

impl EngagementQuery {
    #[must_use]
    pub fn new(
        groups: Arc<dyn GroupAdStore>,
        matches: Arc<dyn MatchStore>,
        settings: MatchmakingSettings,
    ) -> Self {
        Self {
            groups,
            matches,
            settings,
        }
    }

    /// Find the group `player_id` is engaged in at `now`, as host or candidate.
    pub async fn find(
        &self,
        player_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ActiveEngagement>> {
        let hosted = self.groups.find_unclosed_hosted_by(player_id).await?;
        if let Some(group) = hosted
            .into_iter()
            .find(|g| derive_state(g, 0, now, &self.settings).holds_members())
        {
            return Ok(Some(ActiveEngagement {
                group,
                role: EngagementRole::Host,
                match_id: None,
            }));
        }

        let applications = self.matches.list_active_for_player(player_id).await?;
        if applications.is_empty() {
            return Ok(None);
        }

        let group_ids: Vec<String> = applications.iter().map(|m| m.group_id.clone()).collect();
        let groups = self.groups.find_groups(&group_ids).await?;

        for application in applications {
            let Some(group) = groups.iter().find(|g| g.id == application.group_id) else {
                continue;
            };
            // Fullness does not release anyone, so the accepted count is irrelevant here.
            if derive_state(group, 0, now, &self.settings).holds_members() {
                let role = if application.status == MatchStatus::Accepted {
                    EngagementRole::Member
                } else {
                    EngagementRole::Candidate
                };
                return Ok(Some(ActiveEngagement {
                    group: group.clone(),
                    role,
                    match_id: Some(application.id),
                }));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_support::Fixture;
    use chrono::Duration;
    use sietch_db::entities::group_ad::GroupStatus;

    fn query(fx: &Fixture) -> EngagementQuery {
        EngagementQuery::new(fx.stores.groups.clone(), fx.stores.matches.clone(), fx.settings)
    }

    #[tokio::test]
    async fn test_no_engagement() {
        let fx = Fixture::new();
        fx.player("p1").await;

        assert!(query(&fx).find("p1", Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_full_group_still_engages() {
        let fx = Fixture::new();
        let group = fx.open_group("host").await;
        for p in ["a", "b", "c"] {
            fx.accepted_member(&group.id, p).await;
        }

        let engagement = query(&fx).find("b", Utc::now()).await.unwrap().unwrap();
        assert_eq!(engagement.role, EngagementRole::Member);
        assert!(engagement.match_id.is_some());
    }

    #[tokio::test]
    async fn test_expiry_releases_everyone() {
        let fx = Fixture::new();
        let group = fx.open_group("host").await;
        fx.player("p1").await;
        fx.applications.apply(&group.id, "p1").await.unwrap();

        let later = Utc::now() + fx.settings.group_ttl + Duration::seconds(1);
        assert!(query(&fx).find("p1", later).await.unwrap().is_none());
        assert!(query(&fx).find("host", later).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_closing_releases_members() {
        let fx = Fixture::new();
        let group = fx.open_group("host").await;
        fx.accepted_member(&group.id, "p1").await;

        fx.groups.close_group(&group.id, "host").await.unwrap();

        assert!(query(&fx).find("p1", Utc::now()).await.unwrap().is_none());
        assert!(query(&fx).find("host", Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_progress_group_engages_host_and_candidates() {
        let fx = Fixture::new();
        let seed = fx.insert_group_created_at("seed", "other", Utc::now()).await;
        fx.stores
            .groups
            .insert_group(group_ad::Model {
                id: "running".to_string(),
                host_id: "host".to_string(),
                status: GroupStatus::InProgress,
                created_at: (Utc::now() - Duration::days(1)).into(),
                ..seed
            })
            .await
            .unwrap();
        fx.player("p1").await;
        fx.store_invited("running", "p1").await;

        let host = query(&fx).find("host", Utc::now()).await.unwrap().unwrap();
        assert_eq!(host.role, EngagementRole::Host);
        assert_eq!(host.group.id, "running");

        let candidate = query(&fx).find("p1", Utc::now()).await.unwrap().unwrap();
        assert_eq!(candidate.role, EngagementRole::Candidate);
    }
}
