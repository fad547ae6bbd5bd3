//! External field mapping.
//!
//! Incoming lead data names its fields however the source likes
//! (`phone_number`, `Full Name`, ...). Each field definition carries aliases,
//! and an external name maps to the first definition claiming it as an alias:
//! system fields in catalog order, then custom fields in stored order. Matching
//! is exact and case-sensitive.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::resolver::{FieldResolver, Slot};
use crate::types::FieldDetail;

/// Outcome of mapping one external field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMapping<'a> {
    Mapped(FieldDetail<'a>),
    /// No alias matched; the user has to map it by hand
    Unmapped,
}

impl<'a> FieldMapping<'a> {
    pub fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped(_))
    }

    /// Internal key of the matched field.
    pub fn key(&self) -> Option<&'a str> {
        match self {
            Self::Mapped(detail) => Some(detail.key()),
            Self::Unmapped => None,
        }
    }

    /// Display name of the matched field.
    pub fn name(&self) -> Option<&'a str> {
        match self {
            Self::Mapped(detail) => Some(detail.name()),
            Self::Unmapped => None,
        }
    }
}

/// A lead payload split by whether its field names resolve.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct MappedRecord {
    /// Internal field key -> value
    pub mapped: Map<String, Value>,
    /// External field name -> value, for names no alias matched
    pub unmapped: Map<String, Value>,
    /// External names dropped because an earlier name already filled their key
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duplicates: Vec<String>,
}

/// An alias claimed by more than one field definition.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AliasCollision {
    pub alias: String,
    /// Claiming field keys in scan order; the first one wins
    pub keys: Vec<String>,
}

impl<'a> FieldResolver<'a> {
    /// Map one external field name onto a field definition.
    pub fn map_external_field(&self, external: &str) -> FieldMapping<'a> {
        match self.aliases.get(external) {
            Some(&slot) => FieldMapping::Mapped(self.detail(slot)),
            None => FieldMapping::Unmapped,
        }
    }

    /// Map every discovered field name, in discovery order.
    pub fn map_discovered_fields(&self) -> Vec<(&'a str, FieldMapping<'a>)> {
        self.settings
            .discovered_fields
            .iter()
            .map(|name| (name.as_str(), self.map_external_field(name)))
            .collect()
    }

    /// Discovered names that still need manual mapping.
    pub fn unmapped_discovered_fields(&self) -> Vec<&'a str> {
        self.map_discovered_fields()
            .into_iter()
            .filter_map(|(name, mapping)| (!mapping.is_mapped()).then_some(name))
            .collect()
    }

    /// Split a flat lead payload into mapped and unmapped values.
    pub fn map_record(&self, record: &Map<String, Value>) -> MappedRecord {
        let mut out = MappedRecord::default();
        for (external, value) in record {
            match self.map_external_field(external).key() {
                Some(key) if out.mapped.contains_key(key) => {
                    out.duplicates.push(external.clone());
                }
                Some(key) => {
                    out.mapped.insert(key.to_string(), value.clone());
                }
                None => {
                    out.unmapped.insert(external.clone(), value.clone());
                }
            }
        }
        debug!(
            mapped = out.mapped.len(),
            unmapped = out.unmapped.len(),
            duplicates = out.duplicates.len(),
            "mapped lead record"
        );
        out
    }

    /// Every alias claimed by two or more distinct fields.
    pub fn alias_collisions(&self) -> Vec<AliasCollision> {
        let mut claims: IndexMap<&str, Vec<&str>> = IndexMap::new();
        let system = (0..self.catalog.len()).map(Slot::System);
        let custom = (0..self.settings.custom_fields.len()).map(Slot::Custom);
        for slot in system.chain(custom) {
            let detail = self.detail(slot);
            for alias in detail.aliases() {
                let keys = claims.entry(alias.as_str()).or_default();
                if !keys.contains(&detail.key()) {
                    keys.push(detail.key());
                }
            }
        }
        claims
            .into_iter()
            .filter(|(_, keys)| keys.len() > 1)
            .map(|(alias, keys)| AliasCollision {
                alias: alias.to_string(),
                keys: keys.into_iter().map(str::to_string).collect(),
            })
            .collect()
    }
}
