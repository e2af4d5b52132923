//! Matchmaking event publisher.
//!
//! Services report lifecycle changes through [`MatchmakingEvents`] after the
//! write succeeded. Delivery is fire-and-forget: a failing publisher is
//! logged and never fails the operation that triggered it.

use async_trait::async_trait;
use sietch_common::AppResult;
use std::sync::Arc;

/// Receiver of matchmaking lifecycle events.
#[async_trait]
pub trait MatchmakingEvents: Send + Sync {
    /// A candidate applied to a group.
    async fn application_created(
        &self,
        group_id: &str,
        host_id: &str,
        match_id: &str,
        player_id: &str,
    ) -> AppResult<()>;

    /// The host accepted a candidate.
    async fn application_accepted(
        &self,
        group_id: &str,
        match_id: &str,
        player_id: &str,
    ) -> AppResult<()>;

    /// The host declined a candidate or removed a member.
    async fn application_declined(
        &self,
        group_id: &str,
        match_id: &str,
        player_id: &str,
    ) -> AppResult<()>;

    /// A candidate or member withdrew on their own.
    async fn member_left(&self, group_id: &str, host_id: &str, player_id: &str) -> AppResult<()>;

    /// The host closed the group; `member_ids` are the accepted members.
    async fn group_closed(&self, group_id: &str, member_ids: &[String]) -> AppResult<()>;
}

/// Publisher that drops every event.
#[derive(Clone, Default)]
pub struct NoOpMatchmakingEvents;

#[async_trait]
impl MatchmakingEvents for NoOpMatchmakingEvents {
    async fn application_created(
        &self,
        _group_id: &str,
        _host_id: &str,
        _match_id: &str,
        _player_id: &str,
    ) -> AppResult<()> {
        Ok(())
    }

    async fn application_accepted(
        &self,
        _group_id: &str,
        _match_id: &str,
        _player_id: &str,
    ) -> AppResult<()> {
        Ok(())
    }

    async fn application_declined(
        &self,
        _group_id: &str,
        _match_id: &str,
        _player_id: &str,
    ) -> AppResult<()> {
        Ok(())
    }

    async fn member_left(
        &self,
        _group_id: &str,
        _host_id: &str,
        _player_id: &str,
    ) -> AppResult<()> {
        Ok(())
    }

    async fn group_closed(&self, _group_id: &str, _member_ids: &[String]) -> AppResult<()> {
        Ok(())
    }
}

/// Shared handle to a publisher.
pub type MatchmakingEventsService = Arc<dyn MatchmakingEvents>;
