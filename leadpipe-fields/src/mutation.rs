//! Pure settings mutations.
//!
//! Every function here takes the current settings by reference and returns the
//! next settings value. Nothing is changed in place, so a pending replacement
//! never aliases the value it was derived from.
//!
//! When the effective primary field leaves the active set (deleted or
//! deactivated), the primary falls back to the first remaining active field,
//! which is also taken off the card body. With no active fields left the
//! primary is cleared and the default applies again.

use serde::{Deserialize, Serialize};

use crate::catalog::SystemFieldCatalog;
use crate::error::{FieldsError, Result};
use crate::resolver::FieldResolver;
use crate::settings::{CampaignSettings, ClientView};
use crate::types::{CustomFieldDef, FieldType, SelectOption, Visibility};
use crate::validation::{validate_custom_field, AliasPolicy};

/// Partial edit of a custom field. The key itself never changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomFieldPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
}

impl CustomFieldPatch {
    fn apply(&self, def: &mut CustomFieldDef) {
        if let Some(name) = &self.name {
            def.name = name.clone();
        }
        if let Some(type_) = self.type_ {
            def.type_ = type_;
        }
        if let Some(required) = self.required {
            def.required = required;
        }
        if let Some(active) = self.is_active {
            def.is_active = active;
        }
        if let Some(visibility) = self.visibility {
            def.visibility = visibility;
        }
        if let Some(options) = &self.options {
            def.options = options.clone();
        }
        if let Some(aliases) = &self.aliases {
            def.aliases = aliases.clone();
        }
    }
}

/// Choose a new card headline. Does not check that `key` is active.
pub fn set_primary_field(settings: &CampaignSettings, key: &str) -> CampaignSettings {
    let mut next = settings.clone();
    next.card_primary_field = Some(key.to_string());
    next.card_field_order.retain(|k| k != key);
    next
}

/// Show `key` at the end of the card body, or remove it from the body.
///
/// Showing is idempotent, and showing the current primary is a no-op.
pub fn set_field_visibility(
    settings: &CampaignSettings,
    key: &str,
    should_show: bool,
) -> CampaignSettings {
    let mut next = settings.clone();
    if should_show {
        if key != next.primary_field() && !next.is_on_card(key) {
            next.card_field_order.push(key.to_string());
        }
    } else {
        next.card_field_order.retain(|k| k != key);
    }
    next
}

/// Move `key` within the card body to `target_index`, clamped to the end.
pub fn reorder_field(
    settings: &CampaignSettings,
    key: &str,
    target_index: usize,
) -> Result<CampaignSettings> {
    if !settings.is_on_card(key) {
        return Err(FieldsError::not_found(key));
    }
    let mut next = settings.clone();
    next.card_field_order.retain(|k| k != key);
    let index = target_index.min(next.card_field_order.len());
    next.card_field_order.insert(index, key.to_string());
    Ok(next)
}

/// Remove a custom field and every reference to it.
pub fn delete_custom_field(
    catalog: &SystemFieldCatalog,
    settings: &CampaignSettings,
    key: &str,
) -> Result<CampaignSettings> {
    if catalog.contains(key) {
        return Err(FieldsError::invalid_operation(format!(
            "'{key}' is a system field and cannot be deleted"
        )));
    }
    if settings.custom_field(key).is_none() {
        return Err(FieldsError::not_found(key));
    }

    let mut next = settings.clone();
    next.custom_fields.retain(|f| f.key != key);
    next.card_field_order.retain(|k| k != key);
    next.active_system_fields.retain(|k| k != key);
    next.public_system_fields.retain(|k| k != key);
    fallback_primary(catalog, &mut next, key);
    Ok(next)
}

/// Append a new custom field after validating it against the schema.
pub fn add_custom_field(
    catalog: &SystemFieldCatalog,
    settings: &CampaignSettings,
    def: CustomFieldDef,
    policy: AliasPolicy,
) -> Result<CampaignSettings> {
    validate_custom_field(catalog, settings, &def, policy, None)?;
    let mut next = settings.clone();
    next.custom_fields.push(def);
    Ok(next)
}

/// Edit a custom field in place, keeping its position in the list.
pub fn update_custom_field(
    catalog: &SystemFieldCatalog,
    settings: &CampaignSettings,
    key: &str,
    patch: &CustomFieldPatch,
    policy: AliasPolicy,
) -> Result<CampaignSettings> {
    let current = settings
        .custom_field(key)
        .ok_or_else(|| FieldsError::not_found(key))?;
    let mut edited = current.clone();
    patch.apply(&mut edited);
    validate_custom_field(catalog, settings, &edited, policy, Some(key))?;

    let deactivated = current.is_active && !edited.is_active;
    let mut next = settings.clone();
    if let Some(slot) = next.custom_field_mut(key) {
        *slot = edited;
    }
    if deactivated {
        retire_from_card(catalog, &mut next, key);
    }
    Ok(next)
}

/// Switch a custom field's data collection on or off.
pub fn set_custom_field_active(
    catalog: &SystemFieldCatalog,
    settings: &CampaignSettings,
    key: &str,
    active: bool,
) -> Result<CampaignSettings> {
    let mut next = settings.clone();
    let def = next
        .custom_field_mut(key)
        .ok_or_else(|| FieldsError::not_found(key))?;
    def.is_active = active;
    if !active {
        retire_from_card(catalog, &mut next, key);
    }
    Ok(next)
}

/// Switch a system field on or off for this campaign.
pub fn set_system_field_active(
    catalog: &SystemFieldCatalog,
    settings: &CampaignSettings,
    key: &str,
    active: bool,
) -> Result<CampaignSettings> {
    if !catalog.contains(key) {
        return Err(FieldsError::not_found(key));
    }
    let mut next = settings.clone();
    if active {
        if !next.is_system_active(key) {
            next.active_system_fields.push(key.to_string());
        }
    } else {
        next.active_system_fields.retain(|k| k != key);
        next.public_system_fields.retain(|k| k != key);
        retire_from_card(catalog, &mut next, key);
    }
    Ok(next)
}

/// Expose an active system field to the client portal, or hide it again.
pub fn set_system_field_public(
    catalog: &SystemFieldCatalog,
    settings: &CampaignSettings,
    key: &str,
    public: bool,
) -> Result<CampaignSettings> {
    if !catalog.contains(key) {
        return Err(FieldsError::not_found(key));
    }
    let mut next = settings.clone();
    if public {
        if !next.is_system_active(key) {
            return Err(FieldsError::invalid_operation(format!(
                "'{key}' must be active before it can be made public"
            )));
        }
        if !next.is_system_public(key) {
            next.public_system_fields.push(key.to_string());
        }
    } else {
        next.public_system_fields.retain(|k| k != key);
    }
    Ok(next)
}

pub fn set_client_view(settings: &CampaignSettings, view: ClientView) -> CampaignSettings {
    let mut next = settings.clone();
    next.client_view = view;
    next
}

/// Replace the pending external field names, dropping repeats.
pub fn set_discovered_fields<I, S>(settings: &CampaignSettings, names: I) -> CampaignSettings
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut next = settings.clone();
    next.discovered_fields.clear();
    for name in names {
        let name = name.into();
        if !next.discovered_fields.contains(&name) {
            next.discovered_fields.push(name);
        }
    }
    next
}

/// Drop inactive keys, repeats and the primary from the stored card body.
pub fn purge_stale_card_fields(
    catalog: &SystemFieldCatalog,
    settings: &CampaignSettings,
) -> CampaignSettings {
    let keep: Vec<String> = FieldResolver::new(catalog, settings)
        .visible_card_fields()
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut next = settings.clone();
    next.card_field_order = keep;
    next
}

fn retire_from_card(catalog: &SystemFieldCatalog, next: &mut CampaignSettings, key: &str) {
    next.card_field_order.retain(|k| k != key);
    fallback_primary(catalog, next, key);
}

fn fallback_primary(catalog: &SystemFieldCatalog, next: &mut CampaignSettings, removed: &str) {
    if next.primary_field() != removed {
        return;
    }
    let replacement = FieldResolver::new(catalog, next)
        .active_field_keys()
        .into_iter()
        .find(|k| *k != removed)
        .map(str::to_string);
    match replacement {
        Some(key) => {
            next.card_field_order.retain(|k| *k != key);
            tracing::debug!(removed, primary = %key, "primary field fell back");
            next.card_primary_field = Some(key);
        }
        None => next.card_primary_field = None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> &'static SystemFieldCatalog {
        SystemFieldCatalog::builtin()
    }

    fn keys(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn scenario() -> CampaignSettings {
        CampaignSettings {
            active_system_fields: keys(&["full_name", "email"]),
            card_field_order: keys(&["email"]),
            card_primary_field: Some("full_name".into()),
            ..Default::default()
        }
    }

    fn with_budget_tier() -> CampaignSettings {
        CampaignSettings {
            active_system_fields: keys(&["full_name", "email", "phone"]),
            public_system_fields: keys(&["email"]),
            custom_fields: vec![
                CustomFieldDef::new("budget_tier", "Budget Tier", FieldType::Select)
                    .with_options(["Low", "High"]),
                CustomFieldDef::new("score", "Score", FieldType::Number),
            ],
            card_field_order: keys(&["email", "budget_tier", "phone"]),
            card_primary_field: Some("full_name".into()),
            ..Default::default()
        }
    }

    #[test]
    fn scenario_toggle_email_off_and_on() {
        let settings = scenario();
        let hidden = set_field_visibility(&settings, "email", false);
        assert!(hidden.card_field_order.is_empty());
        assert_eq!(
            FieldResolver::builtin(&hidden).hidden_field_keys(),
            vec!["email"]
        );

        let shown = set_field_visibility(&hidden, "email", true);
        assert_eq!(shown.card_field_order, keys(&["email"]));
        // input untouched
        assert!(hidden.card_field_order.is_empty());
    }

    #[test]
    fn show_is_idempotent_and_appends() {
        let settings = with_budget_tier();
        let once = set_field_visibility(&settings, "score", true);
        let twice = set_field_visibility(&once, "score", true);
        assert_eq!(once.card_field_order, twice.card_field_order);
        assert_eq!(once.card_field_order.last().map(String::as_str), Some("score"));
    }

    #[test]
    fn show_primary_is_noop() {
        let settings = scenario();
        let next = set_field_visibility(&settings, "full_name", true);
        assert_eq!(next, settings);
    }

    #[test]
    fn hide_removes_every_occurrence() {
        let mut settings = scenario();
        settings.card_field_order = keys(&["email", "email"]);
        let next = set_field_visibility(&settings, "email", false);
        assert!(next.card_field_order.is_empty());
    }

    #[test]
    fn set_primary_removes_from_body() {
        let settings = with_budget_tier();
        let next = set_primary_field(&settings, "phone");
        assert_eq!(next.card_primary_field.as_deref(), Some("phone"));
        assert_eq!(next.card_field_order, keys(&["email", "budget_tier"]));
    }

    #[test]
    fn set_primary_is_permissive() {
        let settings = scenario();
        let next = set_primary_field(&settings, "company");
        assert_eq!(next.primary_field(), "company");
    }

    #[test]
    fn reorder_moves_and_clamps() {
        let settings = with_budget_tier();
        let next = reorder_field(&settings, "phone", 0).unwrap();
        assert_eq!(next.card_field_order, keys(&["phone", "email", "budget_tier"]));

        let next = reorder_field(&settings, "email", 99).unwrap();
        assert_eq!(next.card_field_order, keys(&["budget_tier", "phone", "email"]));

        let next = reorder_field(&settings, "email", 1).unwrap();
        assert_eq!(next.card_field_order, keys(&["budget_tier", "email", "phone"]));
    }

    #[test]
    fn reorder_missing_key_is_not_found() {
        let settings = with_budget_tier();
        let result = reorder_field(&settings, "score", 0);
        assert!(matches!(result, Err(FieldsError::NotFound { .. })));
    }

    #[test]
    fn show_then_reorder_to_front() {
        let settings = with_budget_tier();
        let shown = set_field_visibility(&settings, "score", true);
        let next = reorder_field(&shown, "score", 0).unwrap();
        assert_eq!(next.card_field_order[0], "score");
    }

    #[test]
    fn delete_custom_field_cascades() {
        let mut settings = with_budget_tier();
        // stray reference that should never be there, removed all the same
        settings.active_system_fields.push("budget_tier".into());
        settings.public_system_fields.push("budget_tier".into());

        let next = delete_custom_field(catalog(), &settings, "budget_tier").unwrap();
        assert!(next.custom_field("budget_tier").is_none());
        assert!(!next.is_on_card("budget_tier"));
        assert!(!next.is_system_active("budget_tier"));
        assert!(!next.is_system_public("budget_tier"));
        assert_eq!(next.custom_fields.len(), 1);
    }

    #[test]
    fn delete_system_field_rejected() {
        let settings = with_budget_tier();
        let result = delete_custom_field(catalog(), &settings, "email");
        assert!(matches!(result, Err(FieldsError::InvalidOperation { .. })));
    }

    #[test]
    fn delete_unknown_field_not_found() {
        let settings = with_budget_tier();
        let result = delete_custom_field(catalog(), &settings, "nope");
        assert!(matches!(result, Err(FieldsError::NotFound { .. })));
    }

    #[test]
    fn delete_primary_falls_back_to_first_active() {
        let mut settings = with_budget_tier();
        settings = set_primary_field(&settings, "budget_tier");
        let next = delete_custom_field(catalog(), &settings, "budget_tier").unwrap();
        assert_eq!(next.card_primary_field.as_deref(), Some("full_name"));
        assert!(!next.is_on_card("full_name"));
    }

    #[test]
    fn fallback_takes_fallback_off_the_card() {
        let settings = CampaignSettings {
            active_system_fields: keys(&["email"]),
            custom_fields: vec![CustomFieldDef::new("budget_tier", "Tier", FieldType::Text)],
            card_field_order: keys(&["email"]),
            card_primary_field: Some("budget_tier".into()),
            ..Default::default()
        };
        let next = delete_custom_field(catalog(), &settings, "budget_tier").unwrap();
        assert_eq!(next.card_primary_field.as_deref(), Some("email"));
        assert!(next.card_field_order.is_empty());
    }

    #[test]
    fn fallback_clears_when_nothing_active() {
        let settings = CampaignSettings {
            custom_fields: vec![CustomFieldDef::new("budget_tier", "Tier", FieldType::Text)],
            card_primary_field: Some("budget_tier".into()),
            ..Default::default()
        };
        let next = delete_custom_field(catalog(), &settings, "budget_tier").unwrap();
        assert!(next.card_primary_field.is_none());
    }

    #[test]
    fn add_custom_field_validates() {
        let settings = with_budget_tier();
        let def = CustomFieldDef::new("budget_tier", "Again", FieldType::Text);
        let result = add_custom_field(catalog(), &settings, def, AliasPolicy::Reject);
        assert!(matches!(result, Err(FieldsError::DuplicateKey { .. })));

        let def = CustomFieldDef::new("industry", "Industry", FieldType::Text);
        let next = add_custom_field(catalog(), &settings, def, AliasPolicy::Reject).unwrap();
        assert_eq!(next.custom_fields.last().unwrap().key, "industry");
        assert_eq!(settings.custom_fields.len(), 2);
    }

    #[test]
    fn update_custom_field_keeps_position() {
        let settings = with_budget_tier();
        let patch = CustomFieldPatch {
            name: Some("Tier".into()),
            visibility: Some(Visibility::Public),
            ..Default::default()
        };
        let next =
            update_custom_field(catalog(), &settings, "budget_tier", &patch, AliasPolicy::Reject)
                .unwrap();
        assert_eq!(next.custom_fields[0].name, "Tier");
        assert_eq!(next.custom_fields[0].visibility, Visibility::Public);
        assert!(next.is_on_card("budget_tier"));
    }

    #[test]
    fn update_custom_field_deactivation_cascades() {
        let settings = with_budget_tier();
        let patch = CustomFieldPatch {
            is_active: Some(false),
            ..Default::default()
        };
        let next =
            update_custom_field(catalog(), &settings, "budget_tier", &patch, AliasPolicy::Reject)
                .unwrap();
        assert!(!next.custom_fields[0].is_active);
        assert!(!next.is_on_card("budget_tier"));
    }

    #[test]
    fn update_rejects_invalid_result() {
        let settings = with_budget_tier();
        let patch = CustomFieldPatch {
            options: Some(Vec::new()),
            ..Default::default()
        };
        let result =
            update_custom_field(catalog(), &settings, "budget_tier", &patch, AliasPolicy::Reject);
        assert!(matches!(result, Err(FieldsError::InvalidField { .. })));
    }

    #[test]
    fn deactivate_custom_field_removes_from_card() {
        let settings = with_budget_tier();
        let next = set_custom_field_active(catalog(), &settings, "budget_tier", false).unwrap();
        assert!(!next.is_on_card("budget_tier"));
        let back = set_custom_field_active(catalog(), &next, "budget_tier", true).unwrap();
        assert!(back.custom_fields[0].is_active);
        assert!(!back.is_on_card("budget_tier"));
    }

    #[test]
    fn deactivate_system_field_cascades() {
        let settings = with_budget_tier();
        let next = set_system_field_active(catalog(), &settings, "email", false).unwrap();
        assert!(!next.is_system_active("email"));
        assert!(!next.is_system_public("email"));
        assert!(!next.is_on_card("email"));
    }

    #[test]
    fn deactivate_primary_system_field_falls_back() {
        let settings = with_budget_tier();
        let next = set_system_field_active(catalog(), &settings, "full_name", false).unwrap();
        assert_eq!(next.card_primary_field.as_deref(), Some("email"));
        assert!(!next.is_on_card("email"));
    }

    #[test]
    fn activate_system_field_appends_once() {
        let settings = scenario();
        let next = set_system_field_active(catalog(), &settings, "company", true).unwrap();
        let again = set_system_field_active(catalog(), &next, "company", true).unwrap();
        assert_eq!(again.active_system_fields, keys(&["full_name", "email", "company"]));
        assert!(set_system_field_active(catalog(), &settings, "budget_tier", true).is_err());
    }

    #[test]
    fn public_requires_active() {
        let settings = scenario();
        let result = set_system_field_public(catalog(), &settings, "company", true);
        assert!(matches!(result, Err(FieldsError::InvalidOperation { .. })));

        let next = set_system_field_public(catalog(), &settings, "email", true).unwrap();
        assert!(next.is_system_public("email"));
        let next = set_system_field_public(catalog(), &next, "email", false).unwrap();
        assert!(!next.is_system_public("email"));
    }

    #[test]
    fn discovered_fields_dedupe() {
        let settings = scenario();
        let next = set_discovered_fields(&settings, ["phone_number", "tier", "phone_number"]);
        assert_eq!(next.discovered_fields, keys(&["phone_number", "tier"]));
    }

    #[test]
    fn client_view_replaced() {
        let settings = scenario();
        let view = ClientView {
            show_kpi: false,
            ..ClientView::default()
        };
        let next = set_client_view(&settings, view);
        assert!(!next.client_view.show_kpi);
        assert!(settings.client_view.show_kpi);
    }

    #[test]
    fn purge_drops_stale_keys() {
        let mut settings = with_budget_tier();
        settings.card_field_order = keys(&["full_name", "ghost", "email", "email", "phone"]);
        let next = purge_stale_card_fields(catalog(), &settings);
        assert_eq!(next.card_field_order, keys(&["email", "phone"]));
    }
}
