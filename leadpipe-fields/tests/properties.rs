//! Property-based tests for card layout resolution and settings mutations.

use leadpipe_fields::mutation::{
    delete_custom_field, reorder_field, set_field_visibility, set_primary_field,
};
use leadpipe_fields::{
    CampaignSettings, CustomFieldDef, FieldResolver, FieldType, SystemFieldCatalog,
};
use proptest::prelude::*;

const SYSTEM_KEYS: &[&str] = &["full_name", "email", "phone", "company", "city", "budget"];
const CUSTOM_KEYS: &[&str] = &["budget_tier", "score", "industry"];
const ALL_KEYS: &[&str] = &[
    "full_name",
    "email",
    "phone",
    "company",
    "city",
    "budget",
    "budget_tier",
    "score",
    "industry",
    "ghost",
];

fn settings_strategy() -> impl Strategy<Value = CampaignSettings> {
    (
        prop::sample::subsequence(SYSTEM_KEYS.to_vec(), 0..=SYSTEM_KEYS.len()),
        prop::sample::subsequence(CUSTOM_KEYS.to_vec(), 0..=CUSTOM_KEYS.len()),
        prop::collection::vec(any::<bool>(), CUSTOM_KEYS.len()),
        prop::collection::vec(prop::sample::select(ALL_KEYS.to_vec()), 0..8),
        prop::option::of(prop::sample::select(ALL_KEYS.to_vec())),
    )
        .prop_map(|(system, custom, active, card, primary)| {
            let custom_fields = custom
                .iter()
                .zip(active)
                .map(|(key, is_active)| {
                    let mut def = CustomFieldDef::new(*key, key.to_uppercase(), FieldType::Text);
                    def.is_active = is_active;
                    def
                })
                .collect();
            CampaignSettings {
                active_system_fields: system.iter().map(|k| k.to_string()).collect(),
                custom_fields,
                card_field_order: card.iter().map(|k| k.to_string()).collect(),
                card_primary_field: primary.map(str::to_string),
                ..Default::default()
            }
        })
}

fn catalog() -> &'static SystemFieldCatalog {
    SystemFieldCatalog::builtin()
}

proptest! {
    #[test]
    fn primary_never_visible(settings in settings_strategy()) {
        let resolver = FieldResolver::builtin(&settings);
        let primary = settings.primary_field();
        prop_assert!(!resolver.visible_card_fields().contains(&primary));
        prop_assert!(!resolver.hidden_field_keys().contains(&primary));
    }

    #[test]
    fn visible_fields_are_active(settings in settings_strategy()) {
        let resolver = FieldResolver::builtin(&settings);
        for key in resolver.visible_card_fields() {
            prop_assert!(resolver.is_active(key));
        }
    }

    #[test]
    fn showing_hidden_field_moves_it(settings in settings_strategy()) {
        let resolver = FieldResolver::builtin(&settings);
        for key in resolver.hidden_field_keys() {
            let once = set_field_visibility(&settings, key, true);
            let twice = set_field_visibility(&once, key, true);
            prop_assert_eq!(&once.card_field_order, &twice.card_field_order);

            let after = FieldResolver::builtin(&once);
            prop_assert!(!after.hidden_field_keys().contains(&key));
            prop_assert!(after.visible_card_fields().contains(&key));
        }
    }

    #[test]
    fn show_then_reorder_puts_key_first(settings in settings_strategy()) {
        let resolver = FieldResolver::builtin(&settings);
        for key in resolver.hidden_field_keys() {
            let shown = set_field_visibility(&settings, key, true);
            let moved = reorder_field(&shown, key, 0).unwrap();
            prop_assert_eq!(moved.card_field_order[0].as_str(), key);
        }
    }

    #[test]
    fn delete_cascades_everywhere(settings in settings_strategy()) {
        for def in &settings.custom_fields {
            let next = delete_custom_field(catalog(), &settings, &def.key).unwrap();
            prop_assert!(next.custom_field(&def.key).is_none());
            prop_assert!(!next.is_on_card(&def.key));
            prop_assert!(!next.is_system_active(&def.key));
            prop_assert!(!next.is_system_public(&def.key));
            prop_assert_ne!(next.primary_field(), def.key.as_str());
        }
    }

    #[test]
    fn set_primary_never_duplicates_into_body(
        settings in settings_strategy(),
        key in prop::sample::select(ALL_KEYS.to_vec()),
    ) {
        let next = set_primary_field(&settings, key);
        prop_assert!(!next.is_on_card(key));
        let shown = set_field_visibility(&next, key, true);
        prop_assert!(!shown.is_on_card(key));
    }

    #[test]
    fn mutations_leave_input_untouched(
        settings in settings_strategy(),
        key in prop::sample::select(ALL_KEYS.to_vec()),
    ) {
        let before = settings.clone();
        let _ = set_field_visibility(&settings, key, true);
        let _ = set_field_visibility(&settings, key, false);
        let _ = set_primary_field(&settings, key);
        let _ = reorder_field(&settings, key, 0);
        let _ = delete_custom_field(catalog(), &settings, key);
        prop_assert_eq!(before, settings);
    }
}
