//! Group application repository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use sietch_common::{AppError, AppResult};

use super::{is_unique_violation, store_err};
use crate::entities::group_match::MatchStatus;
use crate::entities::{GroupAd, GroupMatch, group_match};
use crate::store::{AcceptOutcome, MatchStore};

/// Repository for group applications.
#[derive(Clone)]
pub struct GroupMatchRepository {
    db: Arc<DatabaseConnection>,
}

impl GroupMatchRepository {
    /// Create a new group application repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MatchStore for GroupMatchRepository {
    async fn insert_match(&self, model: group_match::Model) -> AppResult<group_match::Model> {
        model
            .into_active_model()
            .reset_all()
            .insert(self.db.as_ref())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::AlreadyApplied
                } else {
                    store_err(e)
                }
            })
    }

    async fn find_match(&self, id: &str) -> AppResult<Option<group_match::Model>> {
        GroupMatch::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(store_err)
    }

    async fn find_for_player_in_group(
        &self,
        group_id: &str,
        player_id: &str,
    ) -> AppResult<Option<group_match::Model>> {
        GroupMatch::find()
            .filter(group_match::Column::GroupId.eq(group_id))
            .filter(group_match::Column::PlayerId.eq(player_id))
            .one(self.db.as_ref())
            .await
            .map_err(store_err)
    }

    async fn list_for_group(
        &self,
        group_id: &str,
        statuses: &[MatchStatus],
    ) -> AppResult<Vec<group_match::Model>> {
        if statuses.is_empty() {
            return Ok(vec![]);
        }

        GroupMatch::find()
            .filter(group_match::Column::GroupId.eq(group_id))
            .filter(group_match::Column::Status.is_in(statuses.iter().copied()))
            .order_by(group_match::Column::CreatedAt, Order::Asc)
            .order_by(group_match::Column::Id, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(store_err)
    }

    async fn list_active_for_player(
        &self,
        player_id: &str,
    ) -> AppResult<Vec<group_match::Model>> {
        GroupMatch::find()
            .filter(group_match::Column::PlayerId.eq(player_id))
            .filter(
                group_match::Column::Status.is_in([MatchStatus::Invited, MatchStatus::Accepted]),
            )
            .order_by(group_match::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(store_err)
    }

    async fn count_accepted_by_group(
        &self,
        group_ids: &[String],
    ) -> AppResult<HashMap<String, u64>> {
        if group_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(String, i64)> = GroupMatch::find()
            .select_only()
            .column(group_match::Column::GroupId)
            .column_as(group_match::Column::Id.count(), "accepted")
            .filter(group_match::Column::GroupId.is_in(group_ids.iter().cloned()))
            .filter(group_match::Column::Status.eq(MatchStatus::Accepted))
            .group_by(group_match::Column::GroupId)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(store_err)?;

        Ok(rows
            .into_iter()
            .map(|(group_id, count)| (group_id, u64::try_from(count).unwrap_or(0)))
            .collect())
    }

    async fn accept_within_capacity(
        &self,
        match_id: &str,
        max_accepted: u64,
        accepted_at: DateTime<FixedOffset>,
    ) -> AppResult<AcceptOutcome> {
        let txn = self.db.begin().await.map_err(store_err)?;

        let group_id = GroupMatch::find_by_id(match_id)
            .one(&txn)
            .await
            .map_err(store_err)?
            .map(|m| m.group_id)
            .ok_or_else(|| AppError::NotFound(format!("Application not found: {match_id}")))?;

        // Row lock on the group serializes concurrent accepts into it.
        GroupAd::find_by_id(group_id.as_str())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(store_err)?
            .ok_or_else(|| AppError::NotFound(format!("Group not found: {group_id}")))?;

        let current = GroupMatch::find_by_id(match_id)
            .one(&txn)
            .await
            .map_err(store_err)?
            .ok_or_else(|| AppError::NotFound(format!("Application not found: {match_id}")))?;

        if current.status != MatchStatus::Invited {
            return Ok(AcceptOutcome::NotPending(current.status));
        }

        let accepted = GroupMatch::find()
            .filter(group_match::Column::GroupId.eq(group_id.as_str()))
            .filter(group_match::Column::Status.eq(MatchStatus::Accepted))
            .count(&txn)
            .await
            .map_err(store_err)?;

        if accepted >= max_accepted {
            return Ok(AcceptOutcome::CapacityReached);
        }

        let updated = GroupMatch::update_many()
            .col_expr(group_match::Column::Status, Expr::value(MatchStatus::Accepted))
            .col_expr(group_match::Column::AcceptedAt, Expr::value(accepted_at))
            .col_expr(group_match::Column::UpdatedAt, Expr::value(accepted_at))
            .filter(group_match::Column::Id.eq(match_id))
            .filter(group_match::Column::Status.eq(MatchStatus::Invited))
            .exec_with_returning(&txn)
            .await
            .map_err(store_err)?;

        let Some(model) = updated.into_iter().next() else {
            // Declined by the candidate between the read and the update.
            return Ok(AcceptOutcome::NotPending(MatchStatus::Declined));
        };

        txn.commit().await.map_err(store_err)?;

        Ok(AcceptOutcome::Accepted(model))
    }

    async fn decline_if_active(
        &self,
        match_id: &str,
        declined_at: DateTime<FixedOffset>,
    ) -> AppResult<Option<group_match::Model>> {
        let updated = GroupMatch::update_many()
            .col_expr(group_match::Column::Status, Expr::value(MatchStatus::Declined))
            .col_expr(group_match::Column::UpdatedAt, Expr::value(declined_at))
            .filter(group_match::Column::Id.eq(match_id))
            .filter(group_match::Column::Status.ne(MatchStatus::Declined))
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(store_err)?;

        Ok(updated.into_iter().next())
    }
}
