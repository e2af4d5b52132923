//! Group application ("match") entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// State of a candidate's application to a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum MatchStatus {
    /// Applied, waiting for the host.
    #[sea_orm(string_value = "invited")]
    #[default]
    Invited,
    /// Host accepted; occupies a slot.
    #[sea_orm(string_value = "accepted")]
    Accepted,
    /// Rejected by the host or left by the candidate. Terminal.
    #[sea_orm(string_value = "declined")]
    Declined,
}

impl MatchStatus {
    /// Invited and accepted applications count as an active engagement.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Invited | Self::Accepted)
    }
}

/// Application of a player to a group.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_match")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub group_id: String,

    /// The candidate.
    #[sea_orm(indexed)]
    pub player_id: String,

    pub status: MatchStatus,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub accepted_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::group_ad::Entity",
        from = "Column::GroupId",
        to = "super::group_ad::Column::Id",
        on_delete = "Cascade"
    )]
    Group,
    #[sea_orm(
        belongs_to = "super::player::Entity",
        from = "Column::PlayerId",
        to = "super::player::Column::Id",
        on_delete = "Cascade"
    )]
    Player,
}

impl Related<super::group_ad::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::player::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Player.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
