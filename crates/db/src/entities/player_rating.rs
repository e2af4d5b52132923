//! Player rating entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Star rating one group member left for another after the group closed.
///
/// At most one row exists per `(from_player_id, to_player_id, group_id)`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "player_rating")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub from_player_id: String,

    #[sea_orm(indexed)]
    pub to_player_id: String,

    #[sea_orm(indexed)]
    pub group_id: String,

    /// 1 to 5.
    pub stars: i16,

    #[sea_orm(nullable)]
    pub comment: Option<String>,

    pub created_at: DateTimeWithTimeZone,
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
        from = "Column::FromPlayerId",
        to = "super::player::Column::Id",
        on_delete = "Cascade"
    )]
    Rater,
    #[sea_orm(
        belongs_to = "super::player::Entity",
        from = "Column::ToPlayerId",
        to = "super::player::Column::Id",
        on_delete = "Cascade"
    )]
    Ratee,
}

impl Related<super::group_ad::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
