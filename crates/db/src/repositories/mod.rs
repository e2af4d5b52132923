//! Database repositories.
//!
//! Each repository implements one of the [`crate::store`] traits on top of a
//! shared sea-orm connection.

mod group_ad;
mod group_match;
mod player;
mod player_rating;

pub use group_ad::GroupAdRepository;
pub use group_match::GroupMatchRepository;
pub use player::PlayerRepository;
pub use player_rating::PlayerRatingRepository;

use sea_orm::{DbErr, SqlErr};
use sietch_common::AppError;

/// Translate a database error into the engine's transient failure.
pub(crate) fn store_err(err: DbErr) -> AppError {
    AppError::StoreUnavailable(err.to_string())
}

/// Check whether an error came from a unique index.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
