//! Create `group_match` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GroupMatch::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupMatch::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroupMatch::GroupId).string_len(32).not_null())
                    .col(ColumnDef::new(GroupMatch::PlayerId).string_len(64).not_null())
                    .col(
                        ColumnDef::new(GroupMatch::Status)
                            .string_len(20)
                            .not_null()
                            .default("invited"),
                    )
                    .col(
                        ColumnDef::new(GroupMatch::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(GroupMatch::AcceptedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(GroupMatch::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_match_group")
                            .from(GroupMatch::Table, GroupMatch::GroupId)
                            .to(GroupAd::Table, GroupAd::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_match_player")
                            .from(GroupMatch::Table, GroupMatch::PlayerId)
                            .to(Player::Table, Player::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One application per (group, player)
        manager
            .create_index(
                Index::create()
                    .name("idx_group_match_unique")
                    .table(GroupMatch::Table)
                    .col(GroupMatch::GroupId)
                    .col(GroupMatch::PlayerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Active engagement lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_group_match_player_status")
                    .table(GroupMatch::Table)
                    .col(GroupMatch::PlayerId)
                    .col(GroupMatch::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_group_match_group_status")
                    .table(GroupMatch::Table)
                    .col(GroupMatch::GroupId)
                    .col(GroupMatch::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GroupMatch::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum GroupMatch {
    Table,
    Id,
    GroupId,
    PlayerId,
    Status,
    CreatedAt,
    AcceptedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum GroupAd {
    Table,
    Id,
}

#[derive(Iden)]
enum Player {
    Table,
    Id,
}
