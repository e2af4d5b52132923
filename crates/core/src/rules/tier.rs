//! Tier label normalization.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::unwrap_used)]
static TIER_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"T(\d+)").unwrap());

/// Extract the comparable rank from a free-form tier label such as `"T3 - Tier 3"`.
///
/// The first `T<digits>` token wins. Labels without one, and numbers too
/// large for a `u32`, rank 0: they never block an unset minimum but never
/// satisfy a positive one either.
#[must_use]
pub fn tier_rank(label: &str) -> u32 {
    TIER_TOKEN
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
        .unwrap_or(0)
}
