//! Create player table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Player::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Player::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Player::Nickname).string_len(32).not_null())
                    .col(ColumnDef::new(Player::GameId).string_len(64).not_null())
                    .col(ColumnDef::new(Player::Level).integer().not_null())
                    .col(ColumnDef::new(Player::WeaponTier).string_len(64))
                    .col(ColumnDef::new(Player::ArmorTier).string_len(64))
                    .col(ColumnDef::new(Player::VehicleTier).string_len(64))
                    .col(ColumnDef::new(Player::MiningToolTier).string_len(64))
                    .col(ColumnDef::new(Player::SpiceToolTier).string_len(64))
                    .col(
                        ColumnDef::new(Player::Interests)
                            .json_binary()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Player::HasBase)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Player::BaseSector).string_len(64))
                    .col(
                        ColumnDef::new(Player::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Player::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_player_nickname")
                    .table(Player::Table)
                    .col(Player::Nickname)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Player::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Player {
    Table,
    Id,
    Nickname,
    GameId,
    Level,
    WeaponTier,
    ArmorTier,
    VehicleTier,
    MiningToolTier,
    SpiceToolTier,
    Interests,
    HasBase,
    BaseSector,
    CreatedAt,
    UpdatedAt,
}
