//! Shared application state.

#![allow(missing_docs)]

use std::sync::Arc;

use sietch_core::{
    ApplicationService, GroupService, MatchmakingEvents, MatchmakingSettings, PlayerService,
    RatingService,
};
use sietch_db::Stores;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub player_service: PlayerService,
    pub group_service: GroupService,
    pub application_service: ApplicationService,
    pub rating_service: RatingService,
}

impl AppState {
    /// Wire the services over one set of stores.
    #[must_use]
    pub fn new(
        stores: &Stores,
        settings: MatchmakingSettings,
        events: Option<Arc<dyn MatchmakingEvents>>,
    ) -> Self {
        let player_service = PlayerService::new(stores.players.clone());
        let mut group_service = GroupService::new(
            stores.groups.clone(),
            stores.matches.clone(),
            stores.players.clone(),
            settings,
        );
        let mut application_service = ApplicationService::new(
            stores.groups.clone(),
            stores.matches.clone(),
            stores.players.clone(),
            settings,
        );
        let rating_service = RatingService::new(
            stores.groups.clone(),
            stores.matches.clone(),
            stores.ratings.clone(),
            settings,
        );

        if let Some(events) = events {
            group_service.set_events(events.clone());
            application_service.set_events(events);
        }

        Self {
            player_service,
            group_service,
            application_service,
            rating_service,
        }
    }
}
