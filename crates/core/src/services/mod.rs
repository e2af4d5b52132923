//! Business logic services.

#![allow(missing_docs)]

pub mod application;
pub mod engagement;
pub mod event_publisher;
pub mod group;
pub mod player;
pub mod rating;

#[cfg(test)]
mod test_support;

pub use application::{ApplicationService, ApplicationView};
pub use engagement::{ActiveEngagement, EngagementQuery, EngagementRole};
pub use event_publisher::{MatchmakingEvents, MatchmakingEventsService, NoOpMatchmakingEvents};
pub use group::{BrowseEntry, CreateGroupInput, GroupDetails, GroupService, GroupView};
pub use player::{PlayerService, RegisterPlayerInput, UpdatePlayerInput};
pub use rating::{PendingRatings, RatingService, SubmitRatingInput};
