//! ID generation utilities.

use ulid::Ulid;

/// ID generator for groups, applications and ratings.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new lowercase ULID.
    ///
    /// ULIDs sort by creation time, which keeps "newest first" listings
    /// stable even when two rows share a timestamp.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Check whether a string looks like an ID this generator produced.
    #[must_use]
    pub fn is_well_formed(id: &str) -> bool {
        id.len() == 26 && Ulid::from_string(&id.to_uppercase()).is_ok()
    }
}
