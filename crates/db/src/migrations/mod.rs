//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_player_table;
mod m20250601_000002_create_group_ad_table;
mod m20250601_000003_create_group_match_table;
mod m20250601_000004_create_player_rating_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_player_table::Migration),
            Box::new(m20250601_000002_create_group_ad_table::Migration),
            Box::new(m20250601_000003_create_group_match_table::Migration),
            Box::new(m20250601_000004_create_player_rating_table::Migration),
        ]
    }
}
