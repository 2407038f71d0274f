//! Hashtag entity

use crate::value_objects::Snowflake;

/// A tag extracted from content descriptions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hashtag {
    pub id: Snowflake,
    pub name: String,
}

impl Hashtag {
    pub const MAX_NAME_LEN: usize = 64;

    pub fn new(id: Snowflake, name: String) -> Self {
        Self { id, name }
    }

    /// Whether `name` fits the storage limit for hashtag names
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty() && name.chars().count() <= Self::MAX_NAME_LEN
    }
}
