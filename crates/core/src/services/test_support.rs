//! Shared fixtures for service tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sietch_db::entities::group_ad::{self, Activity, GroupFilterSet, GroupStatus, RoleSlots};
use sietch_db::entities::group_match::{self, MatchStatus};
use sietch_db::store::{GroupAdStore, MatchStore, Stores};
use sietch_db::test_utils::MemoryStore;

use super::{
    ApplicationService, CreateGroupInput, GroupService, PlayerService, RatingService,
    RegisterPlayerInput,
};
use crate::rules::MatchmakingSettings;

pub fn group_input() -> CreateGroupInput {
    CreateGroupInput {
        title: "Spice run at dusk".to_string(),
        objective: Some(Activity::Collection),
        roles: vec![
            "Harvester".to_string(),
            "Guard".to_string(),
            "Guard".to_string(),
            "Scout".to_string(),
        ],
        filters: None,
    }
}

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub stores: Stores,
    pub settings: MatchmakingSettings,
    pub players: PlayerService,
    pub groups: GroupService,
    pub applications: ApplicationService,
    pub ratings: RatingService,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let stores = Stores::shared(store.clone());
        let settings = MatchmakingSettings::default();

        Self {
            players: PlayerService::new(stores.players.clone()),
            groups: GroupService::new(
                stores.groups.clone(),
                stores.matches.clone(),
                stores.players.clone(),
                settings,
            ),
            applications: ApplicationService::new(
                stores.groups.clone(),
                stores.matches.clone(),
                stores.players.clone(),
                settings,
            ),
            ratings: RatingService::new(
                stores.groups.clone(),
                stores.matches.clone(),
                stores.ratings.clone(),
                settings,
            ),
            store,
            stores,
            settings,
        }
    }

    /// Register a level 40 player with both interests and no tools.
    pub async fn player(&self, id: &str) {
        if self.players.get(id).await.unwrap().is_some() {
            return;
        }
        self.players
            .register(
                id,
                RegisterPlayerInput {
                    nickname: format!("nick-{id}"),
                    game_id: format!("game-{id}"),
                    level: 40,
                    weapon_tier: Some("T2".to_string()),
                    armor_tier: None,
                    vehicle_tier: None,
                    mining_tool_tier: None,
                    spice_tool_tier: None,
                    interests: vec![Activity::Collection, Activity::PvP],
                    has_base: false,
                    base_sector: None,
                },
            )
            .await
            .unwrap();
    }

    /// Register `host_id` and publish an unfiltered group.
    pub async fn open_group(&self, host_id: &str) -> group_ad::Model {
        self.player(host_id).await;
        self.groups.create(host_id, group_input()).await.unwrap()
    }

    pub async fn group_with_filters(
        &self,
        host_id: &str,
        filters: GroupFilterSet,
    ) -> group_ad::Model {
        self.player(host_id).await;
        let mut input = group_input();
        input.filters = Some(filters);
        self.groups.create(host_id, input).await.unwrap()
    }

    /// Store an open group directly, bypassing creation rules.
    pub async fn insert_group_created_at(
        &self,
        id: &str,
        host_id: &str,
        created_at: DateTime<Utc>,
    ) -> group_ad::Model {
        self.stores
            .groups
            .insert_group(group_ad::Model {
                id: id.to_string(),
                host_id: host_id.to_string(),
                title: "Old run".to_string(),
                objective: Activity::PvP,
                roles: RoleSlots(vec!["Gunner".to_string(); 4]),
                status: GroupStatus::Open,
                filters: None,
                created_at: created_at.into(),
                closed_at: None,
                updated_at: None,
            })
            .await
            .unwrap()
    }

    /// Register `player_id`, apply and have the host accept.
    pub async fn accepted_member(&self, group_id: &str, player_id: &str) -> group_match::Model {
        self.player(player_id).await;
        let group = self.groups.get_by_id(group_id).await.unwrap();
        let application = self.applications.apply(group_id, player_id).await.unwrap();
        self.applications
            .accept(&application.id, &group.host_id)
            .await
            .unwrap()
    }

    /// Store an invited application directly, bypassing the apply checks.
    pub async fn store_invited(&self, group_id: &str, player_id: &str) -> group_match::Model {
        self.stores
            .matches
            .insert_match(group_match::Model {
                id: format!("m-{group_id}-{player_id}"),
                group_id: group_id.to_string(),
                player_id: player_id.to_string(),
                status: MatchStatus::Invited,
                created_at: Utc::now().into(),
                accepted_at: None,
                updated_at: None,
            })
            .await
            .unwrap()
    }

    /// Close a group as if the host had done it at `closed_at`.
    pub async fn close_at(&self, group_id: &str, closed_at: DateTime<Utc>) {
        self.stores
            .groups
            .close_if_open(group_id, closed_at.into())
            .await
            .unwrap()
            .unwrap();
    }
}
