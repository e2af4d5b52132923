//! Database entities.

pub mod group_ad;
pub mod group_match;
pub mod player;
pub mod player_rating;

pub use group_ad::Entity as GroupAd;
pub use group_match::Entity as GroupMatch;
pub use player::Entity as Player;
pub use player_rating::Entity as PlayerRating;
