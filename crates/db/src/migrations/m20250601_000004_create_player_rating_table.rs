//! Create `player_rating` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlayerRating::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayerRating::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlayerRating::FromPlayerId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlayerRating::ToPlayerId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PlayerRating::GroupId).string_len(32).not_null())
                    .col(ColumnDef::new(PlayerRating::Stars).small_integer().not_null())
                    .col(ColumnDef::new(PlayerRating::Comment).string_len(200))
                    .col(
                        ColumnDef::new(PlayerRating::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(PlayerRating::Stars).between(1, 5))
                    .check(
                        Expr::col(PlayerRating::FromPlayerId)
                            .ne(Expr::col(PlayerRating::ToPlayerId)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_rating_group")
                            .from(PlayerRating::Table, PlayerRating::GroupId)
                            .to(GroupAd::Table, GroupAd::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_rating_from")
                            .from(PlayerRating::Table, PlayerRating::FromPlayerId)
                            .to(Player::Table, Player::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_rating_to")
                            .from(PlayerRating::Table, PlayerRating::ToPlayerId)
                            .to(Player::Table, Player::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One rating per (from, to, group)
        manager
            .create_index(
                Index::create()
                    .name("idx_player_rating_unique")
                    .table(PlayerRating::Table)
                    .col(PlayerRating::FromPlayerId)
                    .col(PlayerRating::ToPlayerId)
                    .col(PlayerRating::GroupId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_player_rating_to_player_id")
                    .table(PlayerRating::Table)
                    .col(PlayerRating::ToPlayerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlayerRating::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PlayerRating {
    Table,
    Id,
    FromPlayerId,
    ToPlayerId,
    GroupId,
    Stars,
    Comment,
    CreatedAt,
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
