//! Custom field validation.
//!
//! Runs when a custom field is created or edited, before the new settings
//! value is produced. Keys must be unique across system and custom fields.
//! Alias collisions are rejected unless the caller opts into
//! [`AliasPolicy::Allow`], in which case mapping falls back to first match.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::SystemFieldCatalog;
use crate::error::{FieldsError, Result};
use crate::settings::CampaignSettings;
use crate::types::{CustomFieldDef, FieldType};

/// What to do when a new alias is already claimed by another field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AliasPolicy {
    #[default]
    Reject,
    Allow,
}

/// Keys are lowercase snake_case: a letter, then letters, digits or `_`.
pub fn validate_key(key: &str) -> Result<()> {
    let mut chars = key.chars();
    match chars.next() {
        None => return Err(FieldsError::invalid_field(key, "key cannot be empty")),
        Some(c) if !c.is_ascii_lowercase() => {
            return Err(FieldsError::invalid_field(
                key,
                "key must start with a lowercase letter",
            ))
        }
        _ => {}
    }
    if chars.any(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')) {
        return Err(FieldsError::invalid_field(
            key,
            "key may only contain lowercase letters, digits and '_'",
        ));
    }
    Ok(())
}

/// Validate a custom field definition against a campaign's schema.
///
/// `replacing` names the key of the definition being edited, which is
/// excluded from the uniqueness and alias checks.
pub fn validate_custom_field(
    catalog: &SystemFieldCatalog,
    settings: &CampaignSettings,
    def: &CustomFieldDef,
    policy: AliasPolicy,
    replacing: Option<&str>,
) -> Result<()> {
    validate_key(&def.key)?;

    if def.name.trim().is_empty() {
        return Err(FieldsError::invalid_field(&def.key, "name cannot be empty"));
    }

    let is_other = |key: &str| replacing != Some(key);

    if catalog.contains(&def.key)
        || settings
            .custom_fields
            .iter()
            .any(|f| f.key == def.key && is_other(&f.key))
    {
        return Err(FieldsError::DuplicateKey {
            key: def.key.clone(),
        });
    }

    validate_options(def)?;

    let mut own = HashSet::new();
    for alias in &def.aliases {
        if alias.is_empty() {
            return Err(FieldsError::invalid_field(&def.key, "aliases cannot be empty"));
        }
        if !own.insert(alias.as_str()) {
            return Err(FieldsError::invalid_field(
                &def.key,
                format!("alias '{alias}' is listed twice"),
            ));
        }
    }

    if policy == AliasPolicy::Reject {
        let system = catalog
            .fields()
            .iter()
            .map(|f| (f.key.as_str(), f.aliases.as_slice()));
        let custom = settings
            .custom_fields
            .iter()
            .filter(|f| is_other(&f.key))
            .map(|f| (f.key.as_str(), f.aliases.as_slice()));
        for (key, aliases) in system.chain(custom) {
            if let Some(alias) = def.aliases.iter().find(|a| aliases.contains(*a)) {
                return Err(FieldsError::AliasCollision {
                    alias: alias.clone(),
                    existing: key.to_string(),
                });
            }
        }
    }

    Ok(())
}

fn validate_options(def: &CustomFieldDef) -> Result<()> {
    if def.type_ != FieldType::Select {
        if !def.options.is_empty() {
            return Err(FieldsError::invalid_field(
                &def.key,
                format!("options are only allowed on select fields, not {}", def.type_),
            ));
        }
        return Ok(());
    }

    if def.options.is_empty() {
        return Err(FieldsError::invalid_field(
            &def.key,
            "select fields need at least one option",
        ));
    }
    let mut values = HashSet::new();
    for opt in &def.options {
        if opt.value.trim().is_empty() {
            return Err(FieldsError::invalid_field(&def.key, "option values cannot be empty"));
        }
        if !values.insert(opt.value.as_str()) {
            return Err(FieldsError::invalid_field(
                &def.key,
                format!("duplicate option '{}'", opt.value),
            ));
        }
    }
    Ok(())
}
