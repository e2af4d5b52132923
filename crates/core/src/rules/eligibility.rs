//! Candidate eligibility against a group's filters.

use serde::{Deserialize, Deserializer, Serialize};
use sietch_db::entities::group_ad::{Activity, GroupFilterSet, ToolCategory};
use sietch_db::entities::player;

use super::tier::tier_rank;

/// The slice of a player's profile the evaluator looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerProfile {
    /// `None` when the level is missing or not numeric. Fails any minimum.
    #[serde(deserialize_with = "deserialize_lenient_level")]
    pub level: Option<u32>,
    pub interests: Vec<Activity>,
    pub weapon_tier: Option<String>,
    pub armor_tier: Option<String>,
    pub vehicle_tier: Option<String>,
    pub mining_tool_tier: Option<String>,
    pub spice_tool_tier: Option<String>,
    pub has_base: bool,
    pub base_sector: Option<String>,
}

impl PlayerProfile {
    /// A tool category is held when its tier field is filled in.
    #[must_use]
    pub fn holds_tool(&self, tool: ToolCategory) -> bool {
        let tier = match tool {
            ToolCategory::Mining => &self.mining_tool_tier,
            ToolCategory::Spice => &self.spice_tool_tier,
        };
        non_blank(tier.as_deref()).is_some()
    }
}

impl From<&player::Model> for PlayerProfile {
    fn from(model: &player::Model) -> Self {
        Self {
            level: u32::try_from(model.level).ok(),
            interests: model.interests.0.clone(),
            weapon_tier: model.weapon_tier.clone(),
            armor_tier: model.armor_tier.clone(),
            vehicle_tier: model.vehicle_tier.clone(),
            mining_tool_tier: model.mining_tool_tier.clone(),
            spice_tool_tier: model.spice_tool_tier.clone(),
            has_base: model.has_base,
            base_sector: model.base_sector.clone(),
        }
    }
}

fn deserialize_lenient_level<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LevelRepr {
        Number(u32),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<LevelRepr>::deserialize(deserializer)? {
        Some(LevelRepr::Number(level)) => Some(level),
        Some(LevelRepr::Text(text)) => text.trim().parse().ok(),
        Some(LevelRepr::Other(_)) | None => None,
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Decide whether `candidate` satisfies every filter of a group.
///
/// Unset filters pass. Levels and tiers are "meets or exceeds"; interests
/// and tools are "any of".
#[must_use]
pub fn is_eligible(filters: &GroupFilterSet, candidate: &PlayerProfile) -> bool {
    meets_level(filters, candidate)
        && shares_interest(filters, candidate)
        && meets_tier(
            filters.min_weapon_tier.as_deref(),
            candidate.weapon_tier.as_deref(),
        )
        && meets_tier(
            filters.min_armor_tier.as_deref(),
            candidate.armor_tier.as_deref(),
        )
        && meets_tier(
            filters.min_vehicle_tier.as_deref(),
            candidate.vehicle_tier.as_deref(),
        )
        && meets_base(filters, candidate)
        && holds_required_tool(filters, candidate)
}

fn meets_level(filters: &GroupFilterSet, candidate: &PlayerProfile) -> bool {
    match filters.min_level {
        None => true,
        Some(min) => candidate.level.is_some_and(|level| level >= min),
    }
}

fn shares_interest(filters: &GroupFilterSet, candidate: &PlayerProfile) -> bool {
    filters.interests.is_empty()
        || filters
            .interests
            .iter()
            .any(|interest| candidate.interests.contains(interest))
}

fn meets_tier(minimum: Option<&str>, held: Option<&str>) -> bool {
    match non_blank(minimum) {
        None => true,
        Some(minimum) => tier_rank(held.unwrap_or_default()) >= tier_rank(minimum),
    }
}

fn meets_base(filters: &GroupFilterSet, candidate: &PlayerProfile) -> bool {
    if !filters.requires_base {
        return true;
    }
    if !candidate.has_base {
        return false;
    }
    match non_blank(filters.specific_sector.as_deref()) {
        None => true,
        Some(sector) => candidate.base_sector.as_deref() == Some(sector),
    }
}

fn holds_required_tool(filters: &GroupFilterSet, candidate: &PlayerProfile) -> bool {
    filters.required_tools.is_empty()
        || filters
            .required_tools
            .iter()
            .any(|&tool| candidate.holds_tool(tool))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn veteran() -> PlayerProfile {
        PlayerProfile {
            level: Some(60),
            interests: vec![Activity::Collection],
            weapon_tier: Some("T3 - Tier 3".to_string()),
            armor_tier: Some("T2".to_string()),
            vehicle_tier: None,
            mining_tool_tier: Some("T4".to_string()),
            spice_tool_tier: None,
            has_base: true,
            base_sector: Some("Hagga Basin".to_string()),
        }
    }

    #[test]
    fn test_unset_filters_always_pass() {
        let filters = GroupFilterSet::default();
        assert!(is_eligible(&filters, &veteran()));
        assert!(is_eligible(&filters, &PlayerProfile::default()));
    }

    #[test]
    fn test_scenario_level_and_interest() {
        let filters: GroupFilterSet =
            serde_json::from_value(json!({ "minLevel": "20", "interests": ["PvP"] })).unwrap();
        let profile: PlayerProfile =
            serde_json::from_value(json!({ "level": 25, "interests": ["Collection", "PvP"] }))
                .unwrap();

        assert!(is_eligible(&filters, &profile));
    }

    #[test]
    fn test_scenario_weapon_tier_too_low() {
        let filters = GroupFilterSet {
            min_weapon_tier: Some("T3".to_string()),
            ..Default::default()
        };
        let profile = PlayerProfile {
            weapon_tier: Some("T2 - Tier 2".to_string()),
            ..Default::default()
        };

        assert!(!is_eligible(&filters, &profile));
    }

    #[test]
    fn test_interests_are_any_of() {
        let profile = PlayerProfile {
            interests: vec![Activity::PvP],
            ..Default::default()
        };
        let both = GroupFilterSet {
            interests: vec![Activity::Collection, Activity::PvP],
            ..Default::default()
        };
        let collection_only = GroupFilterSet {
            interests: vec![Activity::Collection],
            ..Default::default()
        };

        assert!(is_eligible(&both, &profile));
        assert!(!is_eligible(&collection_only, &profile));
    }

    #[test]
    fn test_non_numeric_level_fails_closed() {
        let profile: PlayerProfile = serde_json::from_value(json!({ "level": "veteran" })).unwrap();
        assert_eq!(profile.level, None);

        let filters = GroupFilterSet {
            min_level: Some(1),
            ..Default::default()
        };
        assert!(!is_eligible(&filters, &profile));
        assert!(is_eligible(&GroupFilterSet::default(), &profile));
    }

    #[test]
    fn test_higher_tiers_stay_eligible() {
        let filters = GroupFilterSet {
            min_weapon_tier: Some("T3".to_string()),
            min_armor_tier: Some("T2".to_string()),
            min_vehicle_tier: Some("T1".to_string()),
            ..Default::default()
        };
        let base = PlayerProfile {
            weapon_tier: Some("T3".to_string()),
            armor_tier: Some("T2".to_string()),
            vehicle_tier: Some("T1".to_string()),
            ..Default::default()
        };
        assert!(is_eligible(&filters, &base));

        for bump in 0..4 {
            let stronger = PlayerProfile {
                weapon_tier: Some(format!("T{}", 3 + bump)),
                armor_tier: Some(format!("T{} - Tier", 2 + bump)),
                vehicle_tier: Some(format!("T{}", 1 + bump * 2)),
                ..base.clone()
            };
            assert!(is_eligible(&filters, &stronger), "bump {bump}");
        }
    }

    #[test]
    fn test_missing_tier_fails_positive_minimum() {
        let filters = GroupFilterSet {
            min_vehicle_tier: Some("T1".to_string()),
            ..Default::default()
        };
        assert!(!is_eligible(&filters, &veteran()));
    }

    #[test]
    fn test_base_and_sector() {
        let requires_base = GroupFilterSet {
            requires_base: true,
            ..Default::default()
        };
        assert!(is_eligible(&requires_base, &veteran()));
        assert!(!is_eligible(&requires_base, &PlayerProfile::default()));

        let in_sector = GroupFilterSet {
            requires_base: true,
            specific_sector: Some("Hagga Basin".to_string()),
            ..Default::default()
        };
        assert!(is_eligible(&in_sector, &veteran()));

        let elsewhere = GroupFilterSet {
            requires_base: true,
            specific_sector: Some("Deep Desert".to_string()),
            ..Default::default()
        };
        assert!(!is_eligible(&elsewhere, &veteran()));
    }

    #[test]
    fn test_sector_ignored_without_base_requirement() {
        let filters = GroupFilterSet {
            specific_sector: Some("Deep Desert".to_string()),
            ..Default::default()
        };
        assert!(is_eligible(&filters, &PlayerProfile::default()));
    }

    #[test]
    fn test_tools_are_any_of() {
        let filters = GroupFilterSet {
            required_tools: vec![ToolCategory::Mining, ToolCategory::Spice],
            ..Default::default()
        };
        assert!(is_eligible(&filters, &veteran()));

        let spice_only = GroupFilterSet {
            required_tools: vec![ToolCategory::Spice],
            ..Default::default()
        };
        assert!(!is_eligible(&spice_only, &veteran()));

        let blank_tool = PlayerProfile {
            spice_tool_tier: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!is_eligible(&spice_only, &blank_tool));
    }
}
