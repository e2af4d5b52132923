//! In-memory store used by service and API tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sietch_common::{AppError, AppResult};

use crate::entities::group_ad::GroupStatus;
use crate::entities::group_match::MatchStatus;
use crate::entities::{group_ad, group_match, player, player_rating};
use crate::store::{
    AcceptOutcome, GroupAdStore, MatchStore, PlayerStore, RatingStore, RatingSummary,
};

#[derive(Default)]
struct State {
    players: BTreeMap<String, player::Model>,
    groups: BTreeMap<String, group_ad::Model>,
    matches: BTreeMap<String, group_match::Model>,
    ratings: Vec<player_rating::Model>,
}

impl State {
    fn accepted_in(&self, group_id: &str) -> u64 {
        self.matches
            .values()
            .filter(|m| m.group_id == group_id && m.status == MatchStatus::Accepted)
            .count() as u64
    }
}

/// Store backed by plain maps behind one mutex.
///
/// Enforces the same unique keys as the database schema, and the whole
/// capacity check of [`MatchStore::accept_within_capacity`] runs under the
/// lock, so concurrent accepts behave as they do against `PostgreSQL`.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`AppError::StoreUnavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored applications, in any state.
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.lock().matches.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> AppResult<MutexGuard<'_, State>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable(
                "memory store switched off".to_string(),
            ));
        }
        Ok(self.lock())
    }
}

fn newest_first(groups: &mut [group_ad::Model]) {
    groups.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}

fn page<T>(items: Vec<T>, limit: u64, offset: u64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

#[async_trait]
impl PlayerStore for MemoryStore {
    async fn find_player(&self, id: &str) -> AppResult<Option<player::Model>> {
        Ok(self.state()?.players.get(id).cloned())
    }

    async fn find_player_by_nickname(&self, nickname: &str) -> AppResult<Option<player::Model>> {
        Ok(self
            .state()?
            .players
            .values()
            .find(|p| p.nickname == nickname)
            .cloned())
    }

    async fn insert_player(&self, model: player::Model) -> AppResult<player::Model> {
        let mut state = self.state()?;
        let taken = state.players.contains_key(&model.id)
            || state.players.values().any(|p| p.nickname == model.nickname);
        if taken {
            return Err(AppError::Conflict(
                "Player or nickname already registered".to_string(),
            ));
        }
        state.players.insert(model.id.clone(), model.clone());
        Ok(model)
    }

    async fn update_player(&self, model: player::Model) -> AppResult<player::Model> {
        let mut state = self.state()?;
        let Some(slot) = state.players.get_mut(&model.id) else {
            return Err(AppError::NotFound("Player".to_string()));
        };
        *slot = model.clone();
        Ok(model)
    }
}

#[async_trait]
impl GroupAdStore for MemoryStore {
    async fn insert_group(&self, model: group_ad::Model) -> AppResult<group_ad::Model> {
        let mut state = self.state()?;
        if state.groups.contains_key(&model.id) {
            return Err(AppError::Conflict(format!("Duplicate group id: {}", model.id)));
        }
        state.groups.insert(model.id.clone(), model.clone());
        Ok(model)
    }

    async fn find_group(&self, id: &str) -> AppResult<Option<group_ad::Model>> {
        Ok(self.state()?.groups.get(id).cloned())
    }

    async fn find_groups(&self, ids: &[String]) -> AppResult<Vec<group_ad::Model>> {
        let state = self.state()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.groups.get(id).cloned())
            .collect())
    }

    async fn find_joinable_created_after(
        &self,
        created_after: DateTime<FixedOffset>,
        max_accepted: u64,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<group_ad::Model>> {
        let state = self.state()?;
        let mut groups: Vec<_> = state
            .groups
            .values()
            .filter(|g| g.status == GroupStatus::Open && g.created_at > created_after)
            .filter(|g| state.accepted_in(&g.id) < max_accepted)
            .cloned()
            .collect();
        newest_first(&mut groups);
        Ok(page(groups, limit, offset))
    }

    async fn find_unclosed_hosted_by(&self, host_id: &str) -> AppResult<Vec<group_ad::Model>> {
        let mut groups: Vec<_> = self
            .state()?
            .groups
            .values()
            .filter(|g| g.host_id == host_id && g.status != GroupStatus::Closed)
            .cloned()
            .collect();
        newest_first(&mut groups);
        Ok(groups)
    }

    async fn find_hosted_by(
        &self,
        host_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<group_ad::Model>> {
        let mut groups: Vec<_> = self
            .state()?
            .groups
            .values()
            .filter(|g| g.host_id == host_id)
            .cloned()
            .collect();
        newest_first(&mut groups);
        Ok(page(groups, limit, offset))
    }

    async fn close_if_open(
        &self,
        id: &str,
        closed_at: DateTime<FixedOffset>,
    ) -> AppResult<Option<group_ad::Model>> {
        let mut state = self.state()?;
        let Some(group) = state.groups.get_mut(id) else {
            return Ok(None);
        };
        if group.status == GroupStatus::Closed {
            return Ok(None);
        }
        group.status = GroupStatus::Closed;
        group.closed_at = Some(closed_at);
        group.updated_at = Some(closed_at);
        Ok(Some(group.clone()))
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn insert_match(&self, model: group_match::Model) -> AppResult<group_match::Model> {
        let mut state = self.state()?;
        let duplicate = state
            .matches
            .values()
            .any(|m| m.group_id == model.group_id && m.player_id == model.player_id);
        if duplicate {
            return Err(AppError::AlreadyApplied);
        }
        state.matches.insert(model.id.clone(), model.clone());
        Ok(model)
    }

    async fn find_match(&self, id: &str) -> AppResult<Option<group_match::Model>> {
        Ok(self.state()?.matches.get(id).cloned())
    }

    async fn find_for_player_in_group(
        &self,
        group_id: &str,
        player_id: &str,
    ) -> AppResult<Option<group_match::Model>> {
        Ok(self
            .state()?
            .matches
            .values()
            .find(|m| m.group_id == group_id && m.player_id == player_id)
            .cloned())
    }

    async fn list_for_group(
        &self,
        group_id: &str,
        statuses: &[MatchStatus],
    ) -> AppResult<Vec<group_match::Model>> {
        let mut matches: Vec<_> = self
            .state()?
            .matches
            .values()
            .filter(|m| m.group_id == group_id && statuses.contains(&m.status))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matches)
    }

    async fn list_active_for_player(
        &self,
        player_id: &str,
    ) -> AppResult<Vec<group_match::Model>> {
        Ok(self
            .state()?
            .matches
            .values()
            .filter(|m| m.player_id == player_id && m.status.is_active())
            .cloned()
            .collect())
    }

    async fn count_accepted_by_group(
        &self,
        group_ids: &[String],
    ) -> AppResult<HashMap<String, u64>> {
        let state = self.state()?;
        let mut counts = HashMap::new();
        for m in state.matches.values() {
            if m.status == MatchStatus::Accepted && group_ids.contains(&m.group_id) {
                *counts.entry(m.group_id.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn accept_within_capacity(
        &self,
        match_id: &str,
        max_accepted: u64,
        accepted_at: DateTime<FixedOffset>,
    ) -> AppResult<AcceptOutcome> {
        let mut state = self.state()?;
        let Some(current) = state.matches.get(match_id).cloned() else {
            return Err(AppError::NotFound(format!(
                "Application not found: {match_id}"
            )));
        };
        if current.status != MatchStatus::Invited {
            return Ok(AcceptOutcome::NotPending(current.status));
        }

        if state.accepted_in(&current.group_id) >= max_accepted {
            return Ok(AcceptOutcome::CapacityReached);
        }

        let Some(slot) = state.matches.get_mut(match_id) else {
            return Err(AppError::NotFound(format!(
                "Application not found: {match_id}"
            )));
        };
        slot.status = MatchStatus::Accepted;
        slot.accepted_at = Some(accepted_at);
        slot.updated_at = Some(accepted_at);
        Ok(AcceptOutcome::Accepted(slot.clone()))
    }

    async fn decline_if_active(
        &self,
        match_id: &str,
        declined_at: DateTime<FixedOffset>,
    ) -> AppResult<Option<group_match::Model>> {
        let mut state = self.state()?;
        let Some(slot) = state.matches.get_mut(match_id) else {
            return Ok(None);
        };
        if slot.status == MatchStatus::Declined {
            return Ok(None);
        }
        slot.status = MatchStatus::Declined;
        slot.updated_at = Some(declined_at);
        Ok(Some(slot.clone()))
    }
}

#[async_trait]
impl RatingStore for MemoryStore {
    async fn insert_rating(&self, model: player_rating::Model) -> AppResult<player_rating::Model> {
        let mut state = self.state()?;
        let duplicate = state.ratings.iter().any(|r| {
            r.from_player_id == model.from_player_id
                && r.to_player_id == model.to_player_id
                && r.group_id == model.group_id
        });
        if duplicate {
            return Err(AppError::DuplicateRating);
        }
        state.ratings.push(model.clone());
        Ok(model)
    }

    async fn list_given_in_group(
        &self,
        from_player_id: &str,
        group_id: &str,
    ) -> AppResult<Vec<player_rating::Model>> {
        Ok(self
            .state()?
            .ratings
            .iter()
            .filter(|r| r.from_player_id == from_player_id && r.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn summary_for(&self, player_id: &str) -> AppResult<RatingSummary> {
        let state = self.state()?;
        let received: Vec<_> = state
            .ratings
            .iter()
            .filter(|r| r.to_player_id == player_id)
            .collect();
        let total: i64 = received.iter().map(|r| i64::from(r.stars)).sum();
        Ok(RatingSummary::from_totals(received.len() as u64, total))
    }
}
