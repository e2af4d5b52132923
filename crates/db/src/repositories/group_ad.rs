//! Group advertisement repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Order,
    QueryFilter, QueryOrder, QuerySelect,
};
use sietch_common::AppResult;

use super::store_err;
use crate::entities::group_ad::GroupStatus;
use crate::entities::group_match::MatchStatus;
use crate::entities::{GroupAd, GroupMatch, group_ad, group_match};
use crate::store::GroupAdStore;

/// Repository for group advertisements.
#[derive(Clone)]
pub struct GroupAdRepository {
    db: Arc<DatabaseConnection>,
}

impl GroupAdRepository {
    /// Create a new group advertisement repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GroupAdStore for GroupAdRepository {
    async fn insert_group(&self, model: group_ad::Model) -> AppResult<group_ad::Model> {
        model
            .into_active_model()
            .reset_all()
            .insert(self.db.as_ref())
            .await
            .map_err(store_err)
    }

    async fn find_group(&self, id: &str) -> AppResult<Option<group_ad::Model>> {
        GroupAd::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(store_err)
    }

    async fn find_groups(&self, ids: &[String]) -> AppResult<Vec<group_ad::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        GroupAd::find()
            .filter(group_ad::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(store_err)
    }

    async fn find_joinable_created_after(
        &self,
        created_after: DateTime<FixedOffset>,
        max_accepted: u64,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<group_ad::Model>> {
        let full_groups = Query::select()
            .column(group_match::Column::GroupId)
            .from(GroupMatch)
            .and_where(group_match::Column::Status.eq(MatchStatus::Accepted))
            .group_by_col(group_match::Column::GroupId)
            .and_having(
                Expr::expr(Expr::col(group_match::Column::Id).count())
                    .gte(i64::try_from(max_accepted).unwrap_or(i64::MAX)),
            )
            .to_owned();

        GroupAd::find()
            .filter(group_ad::Column::Status.eq(GroupStatus::Open))
            .filter(group_ad::Column::CreatedAt.gt(created_after))
            .filter(group_ad::Column::Id.not_in_subquery(full_groups))
            .order_by(group_ad::Column::CreatedAt, Order::Desc)
            .order_by(group_ad::Column::Id, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(store_err)
    }

    async fn find_unclosed_hosted_by(&self, host_id: &str) -> AppResult<Vec<group_ad::Model>> {
        GroupAd::find()
            .filter(group_ad::Column::HostId.eq(host_id))
            .filter(group_ad::Column::Status.ne(GroupStatus::Closed))
            .order_by(group_ad::Column::CreatedAt, Order::Desc)
            .order_by(group_ad::Column::Id, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(store_err)
    }

    async fn find_hosted_by(
        &self,
        host_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<group_ad::Model>> {
        GroupAd::find()
            .filter(group_ad::Column::HostId.eq(host_id))
            .order_by(group_ad::Column::CreatedAt, Order::Desc)
            .order_by(group_ad::Column::Id, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(store_err)
    }

    async fn close_if_open(
        &self,
        id: &str,
        closed_at: DateTime<FixedOffset>,
    ) -> AppResult<Option<group_ad::Model>> {
        // Conditional update: a second close must not move closed_at.
        let updated = GroupAd::update_many()
            .col_expr(group_ad::Column::Status, Expr::value(GroupStatus::Closed))
            .col_expr(group_ad::Column::ClosedAt, Expr::value(closed_at))
            .col_expr(group_ad::Column::UpdatedAt, Expr::value(closed_at))
            .filter(group_ad::Column::Id.eq(id))
            .filter(group_ad::Column::Status.ne(GroupStatus::Closed))
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(store_err)?;

        Ok(updated.into_iter().next())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::group_ad::{Activity, RoleSlots};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_group(id: &str, host_id: &str, title: &str) -> group_ad::Model {
        group_ad::Model {
            id: id.to_string(),
            host_id: host_id.to_string(),
            title: title.to_string(),
            objective: Activity::Collection,
            roles: RoleSlots(vec![
                "Harvester".to_string(),
                "Guard".to_string(),
                "Guard".to_string(),
                "Scout".to_string(),
            ]),
            status: GroupStatus::Open,
            filters: None,
            created_at: Utc::now().into(),
            closed_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_group() {
        let group = create_test_group("grp1", "user1", "Spice run");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[group.clone()]])
                .into_connection(),
        );

        let repo = GroupAdRepository::new(db);
        let result = repo.find_group("grp1").await.unwrap();

        assert_eq!(result.unwrap().title, "Spice run");
    }

    #[tokio::test]
    async fn test_find_groups_empty_ids_skips_query() {
        // No query results queued: a query would fail the test.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = GroupAdRepository::new(db);
        let result = repo.find_groups(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_find_hosted_by() {
        let grp1 = create_test_group("grp1", "user1", "Run 1");
        let grp2 = create_test_group("grp2", "user1", "Run 2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[grp1, grp2]])
                .into_connection(),
        );

        let repo = GroupAdRepository::new(db);
        let result = repo.find_hosted_by("user1", 10, 0).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_find_joinable_filters_full_groups_in_query() {
        let grp1 = create_test_group("grp1", "user1", "Run 1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[grp1]])
                .into_connection(),
        );

        let repo = GroupAdRepository::new(db.clone());
        let result = repo
            .find_joinable_created_after(Utc::now().into(), 3, 20, 0)
            .await
            .unwrap();
        assert_eq!(result.len(), 1);

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("NOT IN"), "{sql}");
        assert!(sql.contains("HAVING"), "{sql}");
    }

    #[tokio::test]
    async fn test_find_unclosed_hosted_by() {
        let mut running = create_test_group("grp1", "user1", "Run 1");
        running.status = GroupStatus::InProgress;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[running]])
                .into_connection(),
        );

        let repo = GroupAdRepository::new(db);
        let result = repo.find_unclosed_hosted_by("user1").await.unwrap();

        assert_eq!(result[0].status, GroupStatus::InProgress);
    }

    #[tokio::test]
    async fn test_close_if_open_already_closed() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group_ad::Model>::new()])
                .into_connection(),
        );

        let repo = GroupAdRepository::new(db);
        let result = repo.close_if_open("grp1", Utc::now().into()).await.unwrap();

        assert!(result.is_none());
    }
}
