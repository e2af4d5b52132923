//! Application ledger service.
//!
//! Candidates apply to groups, hosts accept or decline them, and candidates
//! may withdraw. Every mutation re-checks the stored state it depends on;
//! the seat limit itself is enforced by [`MatchStore::accept_within_capacity`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sietch_common::{AppError, AppResult, id::IdGenerator};
use sietch_db::entities::group_ad::{self, GroupStatus};
use sietch_db::entities::group_match::{self, MatchStatus};
use sietch_db::store::{AcceptOutcome, GroupAdStore, MatchStore, PlayerStore};

use super::engagement::EngagementQuery;
use super::event_publisher::MatchmakingEventsService;
use crate::rules::{
    GroupState, MAX_ACCEPTED, MatchmakingSettings, PlayerProfile, derive_state, is_eligible,
};

/// An application as shown to the host.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    pub id: String,
    pub group_id: String,
    pub player_id: String,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub nickname: Option<String>,
    pub profile: Option<PlayerProfile>,
}

/// Service for group applications.
#[derive(Clone)]
pub struct ApplicationService {
    groups: Arc<dyn GroupAdStore>,
    matches: Arc<dyn MatchStore>,
    players: Arc<dyn PlayerStore>,
    engagement: EngagementQuery,
    settings: MatchmakingSettings,
    events: Option<MatchmakingEventsService>,
    id_gen: IdGenerator,
}

impl ApplicationService {
    /// Create a new application service.
    #[must_use]
    pub fn new(
        groups: Arc<dyn GroupAdStore>,
        matches: Arc<dyn MatchStore>,
        players: Arc<dyn PlayerStore>,
        settings: MatchmakingSettings,
    ) -> Self {
        Self {
            engagement: EngagementQuery::new(groups.clone(), matches.clone(), settings),
            groups,
            matches,
            players,
            settings,
            events: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the event publisher.
    pub fn set_events(&mut self, events: MatchmakingEventsService) {
        self.events = Some(events);
    }

    /// Apply to a group as a candidate.
    pub async fn apply(&self, group_id: &str, player_id: &str) -> AppResult<group_match::Model> {
        let group = self.group(group_id).await?;
        if group.host_id == player_id {
            return Err(AppError::HostSelfApply);
        }

        let Some(player) = self.players.find_player(player_id).await? else {
            return Err(AppError::NotFound(format!("Player not found: {player_id}")));
        };

        let now = Utc::now();
        self.ensure_joinable(&group, now).await?;

        if let Some(engagement) = self.engagement.find(player_id, now).await? {
            tracing::debug!(
                player_id = %player_id,
                engaged_in = %engagement.group.id,
                "Rejected application from engaged player"
            );
            return Err(AppError::AlreadyEngaged);
        }

        let filters = group.filters.clone().unwrap_or_default();
        if !is_eligible(&filters, &PlayerProfile::from(&player)) {
            return Err(AppError::NotEligible);
        }

        let model = group_match::Model {
            id: self.id_gen.generate(),
            group_id: group.id.clone(),
            player_id: player_id.to_string(),
            status: MatchStatus::Invited,
            created_at: now.into(),
            accepted_at: None,
            updated_at: None,
        };
        let application = self.matches.insert_match(model).await?;

        tracing::info!(
            match_id = %application.id,
            group_id = %group.id,
            player_id = %player_id,
            "Player applied to group"
        );

        if let Some(ref events) = self.events {
            if let Err(e) = events
                .application_created(&group.id, &group.host_id, &application.id, player_id)
                .await
            {
                tracing::warn!(error = %e, match_id = %application.id, "Failed to publish application event");
            }
        }

        Ok(application)
    }

    /// Accept a pending application. Host only.
    pub async fn accept(
        &self,
        match_id: &str,
        acting_host_id: &str,
    ) -> AppResult<group_match::Model> {
        let application = self.application(match_id).await?;
        let group = self.group(&application.group_id).await?;
        if group.host_id != acting_host_id {
            return Err(AppError::NotHost);
        }

        match application.status {
            MatchStatus::Invited => {}
            MatchStatus::Declined => return Err(AppError::MatchAlreadyDecided),
            MatchStatus::Accepted => {
                return Err(AppError::Conflict("Application already accepted".to_string()));
            }
        }

        let now = Utc::now();
        self.ensure_joinable(&group, now).await?;

        let accepted = match self
            .matches
            .accept_within_capacity(match_id, MAX_ACCEPTED, now.into())
            .await?
        {
            AcceptOutcome::Accepted(model) => model,
            AcceptOutcome::CapacityReached => return Err(AppError::GroupFull),
            AcceptOutcome::NotPending(MatchStatus::Declined) => {
                return Err(AppError::MatchAlreadyDecided);
            }
            AcceptOutcome::NotPending(status) => {
                return Err(AppError::Conflict(format!(
                    "Application is no longer pending: {status:?}"
                )));
            }
        };

        tracing::info!(
            match_id = %match_id,
            group_id = %group.id,
            player_id = %accepted.player_id,
            "Accepted application"
        );

        if let Some(ref events) = self.events {
            if let Err(e) = events
                .application_accepted(&group.id, match_id, &accepted.player_id)
                .await
            {
                tracing::warn!(error = %e, match_id = %match_id, "Failed to publish acceptance event");
            }
        }

        Ok(accepted)
    }

    /// Decline an application. The host rejects, the candidate withdraws.
    pub async fn decline(&self, match_id: &str, acting_id: &str) -> AppResult<group_match::Model> {
        let application = self.application(match_id).await?;
        let group = self.group(&application.group_id).await?;

        let by_candidate = application.player_id == acting_id;
        if !by_candidate && group.host_id != acting_id {
            return Err(AppError::NotHost);
        }
        if application.status == MatchStatus::Declined {
            return Err(AppError::MatchAlreadyDecided);
        }
        // The member set of a closed group is what its ratings are checked against.
        if group.status == GroupStatus::Closed {
            return Err(AppError::GroupUnavailable("group is closed".to_string()));
        }

        let Some(declined) = self
            .matches
            .decline_if_active(match_id, Utc::now().into())
            .await?
        else {
            return Err(AppError::MatchAlreadyDecided);
        };

        tracing::info!(
            match_id = %match_id,
            group_id = %group.id,
            player_id = %declined.player_id,
            by_candidate,
            "Declined application"
        );

        if let Some(ref events) = self.events {
            let published = if by_candidate {
                events
                    .member_left(&group.id, &group.host_id, &declined.player_id)
                    .await
            } else {
                events
                    .application_declined(&group.id, match_id, &declined.player_id)
                    .await
            };
            if let Err(e) = published {
                tracing::warn!(error = %e, match_id = %match_id, "Failed to publish decline event");
            }
        }

        Ok(declined)
    }

    /// Withdraw from a group the player applied to or was accepted into.
    pub async fn leave(&self, group_id: &str, player_id: &str) -> AppResult<group_match::Model> {
        let application = self
            .matches
            .find_for_player_in_group(group_id, player_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No application to group: {group_id}")))?;

        self.decline(&application.id, player_id).await
    }

    /// Invited and accepted applications of a group, oldest first. Host only.
    pub async fn list_open_applications(
        &self,
        group_id: &str,
        acting_host_id: &str,
    ) -> AppResult<Vec<ApplicationView>> {
        let group = self.group(group_id).await?;
        if group.host_id != acting_host_id {
            return Err(AppError::NotHost);
        }

        let applications = self
            .matches
            .list_for_group(group_id, &[MatchStatus::Invited, MatchStatus::Accepted])
            .await?;

        let mut views = Vec::with_capacity(applications.len());
        for application in applications {
            let player = self.players.find_player(&application.player_id).await?;
            views.push(ApplicationView {
                id: application.id,
                group_id: application.group_id,
                player_id: application.player_id,
                status: application.status,
                created_at: application.created_at.with_timezone(&Utc),
                accepted_at: application.accepted_at.map(|a| a.with_timezone(&Utc)),
                nickname: player.as_ref().map(|p| p.nickname.clone()),
                profile: player.as_ref().map(PlayerProfile::from),
            });
        }
        Ok(views)
    }

    async fn application(&self, match_id: &str) -> AppResult<group_match::Model> {
        self.matches
            .find_match(match_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application not found: {match_id}")))
    }

    async fn group(&self, group_id: &str) -> AppResult<group_ad::Model> {
        self.groups
            .find_group(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group not found: {group_id}")))
    }

    /// Fail unless the group takes players right now.
    async fn ensure_joinable(&self, group: &group_ad::Model, now: DateTime<Utc>) -> AppResult<()> {
        let accepted = self
            .matches
            .count_accepted_by_group(std::slice::from_ref(&group.id))
            .await?
            .get(&group.id)
            .copied()
            .unwrap_or(0);

        match derive_state(group, accepted, now, &self.settings) {
            GroupState::Open => Ok(()),
            GroupState::Full => Err(AppError::GroupFull),
            GroupState::Closed => Err(AppError::GroupUnavailable("group is closed".to_string())),
            GroupState::Expired => Err(AppError::GroupUnavailable("group has expired".to_string())),
            GroupState::InProgress => Err(AppError::GroupUnavailable(
                "group is in progress".to_string(),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::event_publisher::testing::RecordingEvents;
    use crate::services::test_support::Fixture;
    use chrono::Duration;
    use sietch_db::entities::group_ad::GroupFilterSet;

    #[tokio::test]
    async fn test_apply() {
        let mut fx = Fixture::new();
        let events = Arc::new(RecordingEvents::default());
        fx.applications.set_events(events.clone());

        let group = fx.open_group("host").await;
        fx.player("p1").await;

        let application = fx.applications.apply(&group.id, "p1").await.unwrap();
        assert_eq!(application.status, MatchStatus::Invited);
        assert_eq!(events.recorded(), vec![format!("created:{}:p1", group.id)]);
    }

    #[tokio::test]
    async fn test_host_cannot_apply_to_own_group() {
        let fx = Fixture::new();
        let group = fx.open_group("host").await;

        let err = fx.applications.apply(&group.id, "host").await.unwrap_err();
        assert!(matches!(err, AppError::HostSelfApply));
    }

    #[tokio::test]
    async fn test_apply_while_engaged_elsewhere() {
        let fx = Fixture::new();
        let a = fx.open_group("host-a").await;
        let b = fx.open_group("host-b").await;
        fx.player("p1").await;

        fx.applications.apply(&a.id, "p1").await.unwrap();
        let err = fx.applications.apply(&b.id, "p1").await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyEngaged));

        // A host is engaged in their own group too.
        let err = fx.applications.apply(&b.id, "host-a").await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyEngaged));
    }

    #[tokio::test]
    async fn test_accepted_member_stays_engaged() {
        let fx = Fixture::new();
        let a = fx.open_group("host-a").await;
        let b = fx.open_group("host-b").await;
        fx.accepted_member(&a.id, "p1").await;

        let err = fx.applications.apply(&b.id, "p1").await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyEngaged));
    }

    #[tokio::test]
    async fn test_declined_application_releases_player() {
        let fx = Fixture::new();
        let a = fx.open_group("host-a").await;
        let b = fx.open_group("host-b").await;
        fx.player("p1").await;

        let application = fx.applications.apply(&a.id, "p1").await.unwrap();
        fx.applications.decline(&application.id, "host-a").await.unwrap();

        fx.applications.apply(&b.id, "p1").await.unwrap();
    }

    #[tokio::test]
    async fn test_reapply_after_decline_is_rejected() {
        let fx = Fixture::new();
        let group = fx.open_group("host").await;
        fx.player("p1").await;

        let application = fx.applications.apply(&group.id, "p1").await.unwrap();
        fx.applications.decline(&application.id, "host").await.unwrap();

        let err = fx.applications.apply(&group.id, "p1").await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyApplied));
    }

    #[tokio::test]
    async fn test_apply_gated_by_state_and_filters() {
        let fx = Fixture::new();
        fx.player("p1").await;

        fx.player("old").await;
        fx.insert_group_created_at("stale", "old", Utc::now() - Duration::hours(6))
            .await;
        let err = fx.applications.apply("stale", "p1").await.unwrap_err();
        assert!(matches!(err, AppError::GroupUnavailable(_)));

        let closed = fx.open_group("closer").await;
        fx.groups.close_group(&closed.id, "closer").await.unwrap();
        let err = fx.applications.apply(&closed.id, "p1").await.unwrap_err();
        assert!(matches!(err, AppError::GroupUnavailable(_)));

        let full = fx.open_group("filler").await;
        for p in ["a", "b", "c"] {
            fx.accepted_member(&full.id, p).await;
        }
        let err = fx.applications.apply(&full.id, "p1").await.unwrap_err();
        assert!(matches!(err, AppError::GroupFull));

        let picky = fx
            .group_with_filters(
                "picky",
                GroupFilterSet {
                    min_level: Some(150),
                    ..Default::default()
                },
            )
            .await;
        let err = fx.applications.apply(&picky.id, "p1").await.unwrap_err();
        assert!(matches!(err, AppError::NotEligible));

        let err = fx.applications.apply(&picky.id, "unregistered").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert_eq!(fx.store.match_count(), 3);
    }

    #[tokio::test]
    async fn test_fourth_accept_is_rejected() {
        let fx = Fixture::new();
        let group = fx.open_group("host").await;
        for p in ["a", "b", "c"] {
            fx.accepted_member(&group.id, p).await;
        }

        // Applied before the group filled up.
        fx.player("d").await;
        let late = fx.store_invited(&group.id, "d").await;

        let err = fx.applications.accept(&late.id, "host").await.unwrap_err();
        assert!(matches!(err, AppError::GroupFull));

        let counts = fx
            .stores
            .matches
            .count_accepted_by_group(std::slice::from_ref(&group.id))
            .await
            .unwrap();
        assert_eq!(counts[&group.id], 3);
    }

    #[tokio::test]
    async fn test_concurrent_accepts_fill_exactly_the_free_seats() {
        let fx = Fixture::new();
        let group = fx.open_group("host").await;

        let mut pending = Vec::new();
        for i in 0..6 {
            let player = format!("p{i}");
            fx.player(&player).await;
            pending.push(fx.store_invited(&group.id, &player).await);
        }

        let handles: Vec<_> = pending
            .into_iter()
            .map(|application| {
                let service = fx.applications.clone();
                tokio::spawn(async move { service.accept(&application.id, "host").await })
            })
            .collect();

        let mut accepted = 0;
        let mut full = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(AppError::GroupFull) => full += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(accepted, 3);
        assert_eq!(full, 3);
    }

    #[tokio::test]
    async fn test_accept_requires_host() {
        let fx = Fixture::new();
        let group = fx.open_group("host").await;
        fx.player("p1").await;
        let application = fx.applications.apply(&group.id, "p1").await.unwrap();

        let err = fx.applications.accept(&application.id, "p1").await.unwrap_err();
        assert!(matches!(err, AppError::NotHost));

        let accepted = fx.applications.accept(&application.id, "host").await.unwrap();
        assert_eq!(accepted.status, MatchStatus::Accepted);
        assert!(accepted.accepted_at.is_some());

        let err = fx.applications.accept(&application.id, "host").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_declined_is_terminal() {
        let fx = Fixture::new();
        let group = fx.open_group("host").await;
        fx.player("p1").await;
        let application = fx.applications.apply(&group.id, "p1").await.unwrap();

        fx.applications.decline(&application.id, "host").await.unwrap();

        let err = fx.applications.accept(&application.id, "host").await.unwrap_err();
        assert!(matches!(err, AppError::MatchAlreadyDecided));
        let err = fx.applications.decline(&application.id, "host").await.unwrap_err();
        assert!(matches!(err, AppError::MatchAlreadyDecided));
        let err = fx.applications.decline(&application.id, "p1").await.unwrap_err();
        assert!(matches!(err, AppError::MatchAlreadyDecided));

        let stored = fx.stores.matches.find_match(&application.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MatchStatus::Declined);
    }

    #[tokio::test]
    async fn test_decline_permissions() {
        let fx = Fixture::new();
        let group = fx.open_group("host").await;
        fx.player("p1").await;
        fx.player("p2").await;
        let application = fx.applications.apply(&group.id, "p1").await.unwrap();

        let err = fx.applications.decline(&application.id, "p2").await.unwrap_err();
        assert!(matches!(err, AppError::NotHost));
    }

    #[tokio::test]
    async fn test_leave_frees_seat() {
        let mut fx = Fixture::new();
        let group = fx.open_group("host").await;
        for p in ["a", "b", "c"] {
            fx.accepted_member(&group.id, p).await;
        }
        fx.player("d").await;
        let waiting = fx.store_invited(&group.id, "d").await;

        let events = Arc::new(RecordingEvents::default());
        fx.applications.set_events(events.clone());

        let left = fx.applications.leave(&group.id, "b").await.unwrap();
        assert_eq!(left.status, MatchStatus::Declined);
        assert_eq!(events.recorded(), vec![format!("left:{}:b", group.id)]);

        fx.applications.accept(&waiting.id, "host").await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_group_freezes_members() {
        let fx = Fixture::new();
        let group = fx.open_group("host").await;
        fx.accepted_member(&group.id, "p1").await;
        fx.groups.close_group(&group.id, "host").await.unwrap();

        let err = fx.applications.leave(&group.id, "p1").await.unwrap_err();
        assert!(matches!(err, AppError::GroupUnavailable(_)));
    }

    #[tokio::test]
    async fn test_list_open_applications() {
        let fx = Fixture::new();
        let group = fx.open_group("host").await;
        fx.accepted_member(&group.id, "a").await;
        fx.player("b").await;
        fx.applications.apply(&group.id, "b").await.unwrap();
        fx.player("c").await;
        let rejected = fx.applications.apply(&group.id, "c").await.unwrap();
        fx.applications.decline(&rejected.id, "host").await.unwrap();

        let listed = fx
            .applications
            .list_open_applications(&group.id, "host")
            .await
            .unwrap();
        let players: Vec<_> = listed.iter().map(|a| a.player_id.as_str()).collect();
        assert_eq!(players, vec!["a", "b"]);
        assert_eq!(listed[1].nickname.as_deref(), Some("nick-b"));

        let err = fx
            .applications
            .list_open_applications(&group.id, "a")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotHost));
    }
}
