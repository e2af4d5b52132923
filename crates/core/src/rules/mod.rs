//! Pure matchmaking rules. Nothing in here touches a store or the clock.

pub mod eligibility;
pub mod lifecycle;
pub mod rating_window;
pub mod tier;

pub use eligibility::{PlayerProfile, is_eligible};
pub use lifecycle::{
    GROUP_CAPACITY, GroupState, MAX_ACCEPTED, MatchmakingSettings, Occupancy, derive_state,
};
pub use rating_window::{can_rate, rateable_members, rating_counterparts};
pub use tier::tier_rank;
