//! Player entity.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::group_ad::Activity;

/// Interest tags a player registered with (non-empty subset of [`Activity`]).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct InterestSet(pub Vec<Activity>);

impl InterestSet {
    /// Check whether any of the given activities is among the interests.
    #[must_use]
    pub fn overlaps(&self, other: &[Activity]) -> bool {
        self.0.iter().any(|a| other.contains(a))
    }
}

/// Player profile - one per authenticated identity.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "player")]
pub struct Model {
    /// Identity of the authenticated owner.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Display name, unique and immutable once registered.
    #[sea_orm(unique)]
    pub nickname: String,

    /// In-game character id, immutable once registered.
    pub game_id: String,

    /// Character level (1-200).
    pub level: i32,

    #[sea_orm(nullable)]
    pub weapon_tier: Option<String>,

    #[sea_orm(nullable)]
    pub armor_tier: Option<String>,

    #[sea_orm(nullable)]
    pub vehicle_tier: Option<String>,

    #[sea_orm(nullable)]
    pub mining_tool_tier: Option<String>,

    #[sea_orm(nullable)]
    pub spice_tool_tier: Option<String>,

    #[sea_orm(column_type = "JsonBinary")]
    pub interests: InterestSet,

    #[sea_orm(default_value = false)]
    pub has_base: bool,

    /// Sector of the player's base, present iff `has_base`.
    #[sea_orm(nullable)]
    pub base_sector: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::group_ad::Entity")]
    HostedGroups,
    #[sea_orm(has_many = "super::group_match::Entity")]
    Applications,
}

impl Related<super::group_ad::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HostedGroups.def()
    }
}

impl Related<super::group_match::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
