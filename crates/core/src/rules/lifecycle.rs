//! Derived group state.
//!
//! Only `closed` is ever persisted by a transition. Fullness and expiry are
//! recomputed from the stored row and the ledger on every read.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sietch_common::AppError;
use sietch_common::config::{
    DEFAULT_GROUP_TTL_MINUTES, DEFAULT_RATING_WINDOW_MINUTES, MatchmakingConfig,
};
use sietch_db::entities::group_ad::{self, GroupStatus};

/// Seats in every group, host included.
pub const GROUP_CAPACITY: u64 = 4;

/// Accepted applications a group can hold besides its host.
pub const MAX_ACCEPTED: u64 = GROUP_CAPACITY - 1;

/// State of a group as seen by readers.
///
/// When several facts hold at once the first listed wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupState {
    /// Host closed the group.
    Closed,
    /// Reserved. No current transition leads here.
    InProgress,
    /// Time-to-live elapsed without the host closing it.
    Expired,
    /// Every seat is taken.
    Full,
    /// Accepting applications.
    Open,
}

impl GroupState {
    /// Whether new applications and accepts are allowed.
    #[must_use]
    pub const fn accepts_players(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Whether the group still ties up its host and members.
    #[must_use]
    pub const fn holds_members(self) -> bool {
        matches!(self, Self::Open | Self::Full | Self::InProgress)
    }
}

/// Timing rules, resolved from [`MatchmakingConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchmakingSettings {
    pub group_ttl: Duration,
    pub rating_window: Duration,
}

impl MatchmakingSettings {
    /// Creation time at or before which an open group counts as expired.
    #[must_use]
    pub fn expiry_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.group_ttl
    }

    #[must_use]
    pub fn is_expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - created_at >= self.group_ttl
    }
}

impl Default for MatchmakingSettings {
    fn default() -> Self {
        Self {
            group_ttl: Duration::minutes(DEFAULT_GROUP_TTL_MINUTES),
            rating_window: Duration::minutes(DEFAULT_RATING_WINDOW_MINUTES),
        }
    }
}

impl TryFrom<&MatchmakingConfig> for MatchmakingSettings {
    type Error = AppError;

    fn try_from(config: &MatchmakingConfig) -> Result<Self, Self::Error> {
        config.validate()?;
        let minutes = |value: i64| {
            Duration::try_minutes(value)
                .ok_or_else(|| AppError::Config(format!("{value} minutes is out of range")))
        };
        Ok(Self {
            group_ttl: minutes(config.group_ttl_minutes)?,
            rating_window: minutes(config.rating_window_minutes)?,
        })
    }
}

/// Seat accounting: the host always occupies one seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occupancy {
    pub occupied: u64,
    pub available: u64,
}

impl Occupancy {
    #[must_use]
    pub const fn from_accepted(accepted: u64) -> Self {
        let occupied = 1 + accepted;
        Self {
            occupied,
            available: GROUP_CAPACITY.saturating_sub(occupied),
        }
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.occupied >= GROUP_CAPACITY
    }
}

/// Compute the reader-visible state of a group.
#[must_use]
pub fn derive_state(
    group: &group_ad::Model,
    accepted: u64,
    now: DateTime<Utc>,
    settings: &MatchmakingSettings,
) -> GroupState {
    match group.status {
        GroupStatus::Closed => GroupState::Closed,
        GroupStatus::InProgress => GroupState::InProgress,
        GroupStatus::Open if settings.is_expired(group.created_at.with_timezone(&Utc), now) => {
            GroupState::Expired
        }
        GroupStatus::Open if Occupancy::from_accepted(accepted).is_full() => GroupState::Full,
        GroupStatus::Open => GroupState::Open,
    }
}
