//! Type identifiers for counted entities.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::BlockStatsError;

/// Identifier of a countable entity kind: a registry name plus an optional
/// numeric variant, e.g. `minecraft:wool` or `minecraft:wool:14`.
///
/// The textual form doubles as the display name in reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey {
    id: String,
    variant: Option<u32>,
}

impl TypeKey {
    /// A key with no variant.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            variant: None,
        }
    }

    /// A key for one variant of `id`.
    pub fn with_variant(id: impl Into<String>, variant: u32) -> Self {
        Self {
            id: id.into(),
            variant: Some(variant),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn variant(&self) -> Option<u32> {
        self.variant
    }

    /// Display name used in reports.
    pub fn display_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant {
            Some(variant) => write!(f, "{}:{}", self.id, variant),
            None => f.write_str(&self.id),
        }
    }
}

impl FromStr for TypeKey {
    type Err = BlockStatsError;

    /// Parses `name`, `namespace:name` or `namespace:name:variant`.
    ///
    /// A trailing numeric segment is only read as a variant when a namespace
    /// precedes it, so `minecraft:stone` stays a plain id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || BlockStatsError::InvalidTypeKey(s.to_string());

        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        let parts: Vec<&str> = s.split(':').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(invalid());
        }

        match parts.as_slice() {
            [_] | [_, _] => Ok(TypeKey::new(s)),
            [namespace, name, variant] => {
                let variant = variant.parse::<u32>().map_err(|_| invalid())?;
                Ok(TypeKey::with_variant(
                    format!("{}:{}", namespace, name),
                    variant,
                ))
            }
            _ => Err(invalid()),
        }
    }
}

impl Serialize for TypeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
