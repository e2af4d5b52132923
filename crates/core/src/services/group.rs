//! Group advertisement service.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sietch_common::{AppError, AppResult, id::IdGenerator};
use sietch_db::entities::group_ad::{self, Activity, GroupFilterSet, GroupStatus, RoleSlots};
use sietch_db::entities::group_match::MatchStatus;
use sietch_db::store::{GroupAdStore, MatchStore, PlayerStore};
use validator::Validate;

use super::engagement::{ActiveEngagement, EngagementQuery, EngagementRole};
use super::event_publisher::MatchmakingEventsService;
use crate::rules::{
    GROUP_CAPACITY, GroupState, MAX_ACCEPTED, MatchmakingSettings, Occupancy, PlayerProfile,
    derive_state, is_eligible,
};

/// Maximum length of a role label.
const MAX_ROLE_LENGTH: usize = 32;

/// Input for publishing a group.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 80))]
    pub title: String,
    #[validate(required)]
    pub objective: Option<Activity>,
    /// Slot 0 is the host's own role, slots 1-3 the roles sought.
    #[validate(length(equal = 4))]
    pub roles: Vec<String>,
    #[serde(default)]
    pub filters: Option<GroupFilterSet>,
}

/// A group with its derived state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub id: String,
    pub host_id: String,
    pub title: String,
    pub objective: Activity,
    pub host_role: Option<String>,
    pub sought_roles: Vec<String>,
    pub status: GroupStatus,
    pub state: GroupState,
    pub capacity: u64,
    #[serde(flatten)]
    pub occupancy: Occupancy,
    pub filters: Option<GroupFilterSet>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// A group together with its accepted members.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetails {
    #[serde(flatten)]
    pub group: GroupView,
    pub member_ids: Vec<String>,
}

/// A browse listing entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseEntry {
    #[serde(flatten)]
    pub group: GroupView,
    /// Whether the viewer would be allowed to apply right now.
    pub can_apply: bool,
}

/// Service for group advertisements.
#[derive(Clone)]
pub struct GroupService {
    groups: Arc<dyn GroupAdStore>,
    matches: Arc<dyn MatchStore>,
    players: Arc<dyn PlayerStore>,
    engagement: EngagementQuery,
    settings: MatchmakingSettings,
    events: Option<MatchmakingEventsService>,
    id_gen: IdGenerator,
}

impl GroupService {
    /// Create a new group service.
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

    /// Get a raw group by ID, failing when absent.
    pub async fn get_by_id(&self, group_id: &str) -> AppResult<group_ad::Model> {
        self.groups
            .find_group(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group not found: {group_id}")))
    }

    /// Get a group with its derived state and members.
    pub async fn get_group(&self, group_id: &str) -> AppResult<GroupDetails> {
        let group = self.get_by_id(group_id).await?;
        let members = self
            .matches
            .list_for_group(&group.id, &[MatchStatus::Accepted])
            .await?;

        let view = self.view(group, members.len() as u64, Utc::now());
        Ok(GroupDetails {
            group: view,
            member_ids: members.into_iter().map(|m| m.player_id).collect(),
        })
    }

    /// The group `player_id` is engaged in, as host or candidate.
    pub async fn active_engagement(&self, player_id: &str) -> AppResult<Option<ActiveEngagement>> {
        self.engagement.find(player_id, Utc::now()).await
    }

    /// Publish a new group advertisement.
    pub async fn create(
        &self,
        host_id: &str,
        input: CreateGroupInput,
    ) -> AppResult<group_ad::Model> {
        input.validate()?;

        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        let objective = input
            .objective
            .ok_or_else(|| AppError::Validation("Objective is required".to_string()))?;
        let roles = check_roles(input.roles)?;
        let filters = check_filters(input.filters)?;

        if self.players.find_player(host_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Player not found: {host_id}")));
        }

        let now = Utc::now();
        if let Some(engagement) = self.engagement.find(host_id, now).await? {
            tracing::debug!(
                host_id = %host_id,
                group_id = %engagement.group.id,
                "Rejected group creation for engaged player"
            );
            return Err(match engagement.role {
                EngagementRole::Host => AppError::HostAlreadyActive,
                EngagementRole::Candidate | EngagementRole::Member => AppError::AlreadyEngaged,
            });
        }

        let model = group_ad::Model {
            id: self.id_gen.generate(),
            host_id: host_id.to_string(),
            title,
            objective,
            roles,
            status: GroupStatus::Open,
            filters,
            created_at: now.into(),
            closed_at: None,
            updated_at: None,
        };

        let group = self.groups.insert_group(model).await?;
        tracing::info!(group_id = %group.id, host_id = %host_id, "Published group");
        Ok(group)
    }

    /// List groups that accept applications, newest first, with the viewer's eligibility.
    pub async fn browse_open_groups(
        &self,
        viewer_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<BrowseEntry>> {
        let now = Utc::now();
        let groups = self
            .groups
            .find_joinable_created_after(
                self.settings.expiry_cutoff(now).into(),
                MAX_ACCEPTED,
                limit,
                offset,
            )
            .await?;
        let accepted = self.accepted_counts(&groups).await?;

        let profile = self
            .players
            .find_player(viewer_id)
            .await?
            .as_ref()
            .map(PlayerProfile::from);
        let engaged = self.engagement.find(viewer_id, now).await?.is_some();

        Ok(groups
            .into_iter()
            .map(|group| {
                let count = accepted.get(&group.id).copied().unwrap_or(0);
                self.view(group, count, now)
            })
            .filter(|view| view.state.accepts_players())
            .map(|view| {
                let can_apply = !engaged
                    && view.host_id != viewer_id
                    && profile.as_ref().is_some_and(|profile| {
                        is_eligible(&view.filters.clone().unwrap_or_default(), profile)
                    });
                BrowseEntry {
                    group: view,
                    can_apply,
                }
            })
            .collect())
    }

    /// List the groups a host published, newest first.
    pub async fn list_hosted(
        &self,
        host_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<GroupView>> {
        let now = Utc::now();
        let groups = self.groups.find_hosted_by(host_id, limit, offset).await?;
        let accepted = self.accepted_counts(&groups).await?;

        Ok(groups
            .into_iter()
            .map(|group| {
                let count = accepted.get(&group.id).copied().unwrap_or(0);
                self.view(group, count, now)
            })
            .collect())
    }

    /// Close a group. Opens the rating window for its host and accepted members.
    pub async fn close_group(&self, group_id: &str, acting_host_id: &str) -> AppResult<GroupView> {
        let group = self.get_by_id(group_id).await?;
        if group.host_id != acting_host_id {
            return Err(AppError::NotHost);
        }

        let now = Utc::now();
        let Some(closed) = self.groups.close_if_open(group_id, now.into()).await? else {
            return Err(AppError::GroupUnavailable(
                "group is already closed".to_string(),
            ));
        };

        let members = self
            .matches
            .list_for_group(group_id, &[MatchStatus::Accepted])
            .await?;
        let member_ids: Vec<String> = members.into_iter().map(|m| m.player_id).collect();

        tracing::info!(
            group_id = %group_id,
            members = member_ids.len(),
            "Closed group"
        );

        if let Some(ref events) = self.events {
            if let Err(e) = events.group_closed(group_id, &member_ids).await {
                tracing::warn!(error = %e, group_id = %group_id, "Failed to publish group closed event");
            }
        }

        Ok(self.view(closed, member_ids.len() as u64, now))
    }

    async fn accepted_counts(&self, groups: &[group_ad::Model]) -> AppResult<HashMap<String, u64>> {
        let ids: Vec<String> = groups.iter().map(|g| g.id.clone()).collect();
        self.matches.count_accepted_by_group(&ids).await
    }

    fn view(&self, group: group_ad::Model, accepted: u64, now: DateTime<Utc>) -> GroupView {
        let state = derive_state(&group, accepted, now, &self.settings);
        let created_at = group.created_at.with_timezone(&Utc);

        GroupView {
            host_role: group.roles.host_role().map(str::to_string),
            sought_roles: group.roles.sought_roles().to_vec(),
            id: group.id,
            host_id: group.host_id,
            title: group.title,
            objective: group.objective,
            status: group.status,
            state,
            capacity: GROUP_CAPACITY,
            occupancy: Occupancy::from_accepted(accepted),
            filters: group.filters,
            created_at,
            expires_at: created_at + self.settings.group_ttl,
            closed_at: group.closed_at.map(|c| c.with_timezone(&Utc)),
        }
    }
}

fn check_roles(roles: Vec<String>) -> AppResult<RoleSlots> {
    let roles: Vec<String> = roles.into_iter().map(|r| r.trim().to_string()).collect();
    if roles.len() != GROUP_CAPACITY as usize {
        return Err(AppError::Validation(format!(
            "Exactly {GROUP_CAPACITY} roles are required"
        )));
    }
    if roles.iter().any(String::is_empty) {
        return Err(AppError::Validation("Roles cannot be blank".to_string()));
    }
    if roles.iter().any(|r| r.chars().count() > MAX_ROLE_LENGTH) {
        return Err(AppError::Validation(format!(
            "Roles are limited to {MAX_ROLE_LENGTH} characters"
        )));
    }
    Ok(RoleSlots(roles))
}

fn check_filters(filters: Option<GroupFilterSet>) -> AppResult<Option<GroupFilterSet>> {
    let Some(filters) = filters else {
        return Ok(None);
    };

    let sector_missing = filters
        .specific_sector
        .as_deref()
        .is_none_or(|s| s.trim().is_empty());
    if filters.requires_base && sector_missing {
        return Err(AppError::Validation(
            "A sector is required when a base is required".to_string(),
        ));
    }

    Ok((filters != GroupFilterSet::default()).then_some(filters))
}
