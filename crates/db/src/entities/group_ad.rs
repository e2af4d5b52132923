//! Group advertisement entity.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Activity a group is formed for; also used as a player interest tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum Activity {
    #[sea_orm(string_value = "collection")]
    Collection,
    #[sea_orm(string_value = "pvp")]
    #[serde(rename = "PvP")]
    PvP,
}

/// Tool category a group may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    Mining,
    Spice,
}

/// Persisted status of a group advertisement.
///
/// Fullness and expiry are never stored here; they are derived on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum GroupStatus {
    /// Accepting applications (subject to derived fullness/expiry).
    #[sea_orm(string_value = "open")]
    #[default]
    Open,
    /// Reserved. No transition in the current rule set produces it.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Closed by the host; the closure time opens the rating window.
    #[sea_orm(string_value = "closed")]
    Closed,
}

/// Ordered role slots. Slot 0 is the host's own role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct RoleSlots(pub Vec<String>);

impl RoleSlots {
    /// Role the host plays.
    #[must_use]
    pub fn host_role(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Roles the host is looking for.
    #[must_use]
    pub fn sought_roles(&self) -> &[String] {
        self.0.get(1..).unwrap_or_default()
    }
}

/// Eligibility filters attached to a group. Every field is optional and an
/// unset field places no constraint on candidates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupFilterSet {
    /// Minimum character level. Accepts a number or a numeric string.
    #[serde(deserialize_with = "deserialize_min_level")]
    pub min_level: Option<u32>,
    /// Candidate must share at least one of these interests.
    pub interests: Vec<Activity>,
    pub min_weapon_tier: Option<String>,
    pub min_armor_tier: Option<String>,
    pub min_vehicle_tier: Option<String>,
    pub requires_base: bool,
    /// Only checked when `requires_base` is set.
    pub specific_sector: Option<String>,
    /// Candidate must hold at least one of these tool categories.
    pub required_tools: Vec<ToolCategory>,
}

fn deserialize_min_level<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LevelRepr {
        Number(u32),
        Text(String),
    }

    match Option::<LevelRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(LevelRepr::Number(level)) => Ok(Some(level)),
        Some(LevelRepr::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid minimum level: {text}")))
        }
    }
}

/// Group advertisement published by a host.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_ad")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Player who published the group. Immutable.
    #[sea_orm(indexed)]
    pub host_id: String,

    pub title: String,

    pub objective: Activity,

    #[sea_orm(column_type = "JsonBinary")]
    pub roles: RoleSlots,

    pub status: GroupStatus,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub filters: Option<GroupFilterSet>,

    pub created_at: DateTimeWithTimeZone,

    /// Set once, when the host closes the group.
    #[sea_orm(nullable)]
    pub closed_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::player::Entity",
        from = "Column::HostId",
        to = "super::player::Column::Id",
        on_delete = "Cascade"
    )]
    Host,
    #[sea_orm(has_many = "super::group_match::Entity")]
    Matches,
    #[sea_orm(has_many = "super::player_rating::Entity")]
    Ratings,
}

impl Related<super::player::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Host.def()
    }
}

impl Related<super::group_match::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Matches.def()
    }
}

impl Related<super::player_rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filters_accept_string_level() {
        let filters: GroupFilterSet =
            serde_json::from_value(json!({ "minLevel": "20", "interests": ["PvP"] })).unwrap();
        assert_eq!(filters.min_level, Some(20));
        assert_eq!(filters.interests, vec![Activity::PvP]);
    }

    #[test]
    fn test_filters_accept_numeric_level() {
        let filters: GroupFilterSet = serde_json::from_value(json!({ "minLevel": 45 })).unwrap();
        assert_eq!(filters.min_level, Some(45));
    }

    #[test]
    fn test_filters_blank_level_is_unset() {
        let filters: GroupFilterSet = serde_json::from_value(json!({ "minLevel": "" })).unwrap();
        assert_eq!(filters.min_level, None);
    }

    #[test]
    fn test_filters_reject_garbage_level() {
        let result = serde_json::from_value::<GroupFilterSet>(json!({ "minLevel": "high" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_filters_default() {
        let filters: GroupFilterSet = serde_json::from_value(json!({})).unwrap();
        assert_eq!(filters, GroupFilterSet::default());
    }

    #[test]
    fn test_role_slots() {
        let roles = RoleSlots(vec![
            "Scout".to_string(),
            "Gunner".to_string(),
            "Driver".to_string(),
            "Harvester".to_string(),
        ]);
        assert_eq!(roles.host_role(), Some("Scout"));
        assert_eq!(roles.sought_roles().len(), 3);
        assert!(RoleSlots::default().sought_roles().is_empty());
    }
}
