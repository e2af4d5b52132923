//! Post-closure rating window.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use sietch_db::entities::group_ad::{self, GroupStatus};
use sietch_db::entities::group_match::{self, MatchStatus};

/// Whether ratings for `group` are accepted at `now`.
///
/// The window opens when the host closes the group and lasts `window`.
/// A group that is not closed has no window.
#[must_use]
pub fn can_rate(group: &group_ad::Model, now: DateTime<Utc>, window: Duration) -> bool {
    if group.status != GroupStatus::Closed {
        return false;
    }
    group
        .closed_at
        .is_some_and(|closed_at| now - closed_at.with_timezone(&Utc) < window)
}

/// Host plus accepted members of a group.
#[must_use]
pub fn rateable_members(
    group: &group_ad::Model,
    matches: &[group_match::Model],
) -> BTreeSet<String> {
    std::iter::once(group.host_id.clone())
        .chain(
            matches
                .iter()
                .filter(|m| m.group_id == group.id && m.status == MatchStatus::Accepted)
                .map(|m| m.player_id.clone()),
        )
        .collect()
}

/// Everyone `player_id` may rate in `group`: the rateable members minus themself.
#[must_use]
pub fn rating_counterparts(
    group: &group_ad::Model,
    matches: &[group_match::Model],
    player_id: &str,
) -> BTreeSet<String> {
    let mut members = rateable_members(group, matches);
    members.remove(player_id);
    members
}
