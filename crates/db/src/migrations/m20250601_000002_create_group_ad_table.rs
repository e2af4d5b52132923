//! Create `group_ad` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GroupAd::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupAd::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroupAd::HostId).string_len(64).not_null())
                    .col(ColumnDef::new(GroupAd::Title).string_len(100).not_null())
                    .col(ColumnDef::new(GroupAd::Objective).string_len(20).not_null())
                    .col(ColumnDef::new(GroupAd::Roles).json_binary().not_null())
                    .col(
                        ColumnDef::new(GroupAd::Status)
                            .string_len(20)
                            .not_null()
                            .default("open"),
                    )
                    .col(ColumnDef::new(GroupAd::Filters).json_binary())
                    .col(
                        ColumnDef::new(GroupAd::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(GroupAd::ClosedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(GroupAd::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_ad_host")
                            .from(GroupAd::Table, GroupAd::HostId)
                            .to(Player::Table, Player::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Host lookups for the one-open-group rule
        manager
            .create_index(
                Index::create()
                    .name("idx_group_ad_host_status")
                    .table(GroupAd::Table)
                    .col(GroupAd::HostId)
                    .col(GroupAd::Status)
                    .to_owned(),
            )
            .await?;

        // Browse listing: open groups, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_group_ad_status_created_at")
                    .table(GroupAd::Table)
                    .col(GroupAd::Status)
                    .col(GroupAd::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GroupAd::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum GroupAd {
    Table,
    Id,
    HostId,
    Title,
    Objective,
    Roles,
    Status,
    Filters,
    CreatedAt,
    ClosedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Player {
    Table,
    Id,
}
