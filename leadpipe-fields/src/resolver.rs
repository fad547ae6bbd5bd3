//! FieldResolver: read-only derivations over a campaign's field schema.
//!
//! A resolver borrows one system catalog and one settings value and indexes
//! every field key and alias up front, so lookups during card rendering and
//! lead mapping are hash lookups rather than scans.

use std::collections::HashMap;

use indexmap::IndexSet;
use serde::Serialize;

use crate::catalog::SystemFieldCatalog;
use crate::settings::{CampaignSettings, ClientView};
use crate::types::FieldDetail;

/// Where a key came from during indexing.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Slot {
    System(usize),
    Custom(usize),
}

/// Derived card layout for one campaign, ready to serialize.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CardLayout {
    /// Effective headline field key
    pub primary: String,
    /// Display name of the headline field, if it resolves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_name: Option<String>,
    /// Card body keys in display order
    pub body: Vec<String>,
    /// Active keys that can still be added to the body
    pub hidden: Vec<String>,
    /// Card body keys a client portal user may see
    pub client_body: Vec<String>,
    pub client_view: ClientView,
}

/// Field resolution over a system catalog and one campaign's settings.
pub struct FieldResolver<'a> {
    pub(crate) catalog: &'a SystemFieldCatalog,
    pub(crate) settings: &'a CampaignSettings,
    pub(crate) slots: HashMap<&'a str, Slot>,
    /// First claimant of each alias, system fields scanned before custom fields
    pub(crate) aliases: HashMap<&'a str, Slot>,
    active: IndexSet<&'a str>,
}

impl<'a> FieldResolver<'a> {
    pub fn new(catalog: &'a SystemFieldCatalog, settings: &'a CampaignSettings) -> Self {
        let mut slots = HashMap::with_capacity(catalog.len() + settings.custom_fields.len());
        let mut aliases = HashMap::new();

        for (i, def) in catalog.fields().iter().enumerate() {
            slots.entry(def.key.as_str()).or_insert(Slot::System(i));
            for alias in &def.aliases {
                aliases.entry(alias.as_str()).or_insert(Slot::System(i));
            }
        }
        for (i, def) in settings.custom_fields.iter().enumerate() {
            slots.entry(def.key.as_str()).or_insert(Slot::Custom(i));
            for alias in &def.aliases {
                aliases.entry(alias.as_str()).or_insert(Slot::Custom(i));
            }
        }

        let active = settings
            .active_system_fields
            .iter()
            .map(String::as_str)
            .chain(
                settings
                    .custom_fields
                    .iter()
                    .filter(|f| f.is_active)
                    .map(|f| f.key.as_str()),
            )
            .collect();

        Self {
            catalog,
            settings,
            slots,
            aliases,
            active,
        }
    }

    /// Resolver over the built-in catalog.
    pub fn builtin(settings: &'a CampaignSettings) -> Self {
        Self::new(SystemFieldCatalog::builtin(), settings)
    }

    pub fn settings(&self) -> &'a CampaignSettings {
        self.settings
    }

    pub fn catalog(&self) -> &'a SystemFieldCatalog {
        self.catalog
    }

    pub(crate) fn detail(&self, slot: Slot) -> FieldDetail<'a> {
        match slot {
            Slot::System(i) => {
                let def = &self.catalog.fields()[i];
                FieldDetail::System {
                    def,
                    active: self.settings.is_system_active(&def.key),
                    public: self.settings.is_system_public(&def.key),
                }
            }
            Slot::Custom(i) => FieldDetail::Custom(&self.settings.custom_fields[i]),
        }
    }

    /// Look up a field by key: system definitions first, then custom fields.
    pub fn resolve_field(&self, key: &str) -> Option<FieldDetail<'a>> {
        self.slots.get(key).map(|&slot| self.detail(slot))
    }

    /// Every known field: system catalog order, then custom fields in stored order.
    pub fn all_fields(&self) -> Vec<FieldDetail<'a>> {
        let system = (0..self.catalog.len()).map(Slot::System);
        let custom = (0..self.settings.custom_fields.len()).map(Slot::Custom);
        system.chain(custom).map(|slot| self.detail(slot)).collect()
    }

    /// Active system keys followed by active custom keys, each in stored order.
    pub fn active_field_keys(&self) -> Vec<&'a str> {
        self.active.iter().copied().collect()
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.active.contains(key)
    }

    /// Card body: `card_field_order` restricted to active keys, primary excluded.
    ///
    /// Stale keys in storage are skipped here and left in place until the next
    /// mutation touches them.
    pub fn visible_card_fields(&self) -> Vec<&'a str> {
        let primary = self.settings.primary_field();
        let mut seen = IndexSet::new();
        for key in &self.settings.card_field_order {
            if key != primary && self.active.contains(key.as_str()) {
                seen.insert(key.as_str());
            }
        }
        seen.into_iter().collect()
    }

    /// Active keys that are neither on the card body nor the primary.
    pub fn hidden_field_keys(&self) -> Vec<&'a str> {
        let primary = self.settings.primary_field();
        self.active
            .iter()
            .copied()
            .filter(|key| *key != primary && !self.settings.is_on_card(key))
            .collect()
    }

    /// Active keys a client portal user may see, in active order.
    pub fn public_field_keys(&self) -> Vec<&'a str> {
        self.active
            .iter()
            .copied()
            .filter(|key| self.is_public(key))
            .collect()
    }

    pub fn is_public(&self, key: &str) -> bool {
        self.is_active(key)
            && self
                .resolve_field(key)
                .is_some_and(|detail| detail.is_public())
    }

    /// Card body as rendered inside the client portal.
    pub fn client_card_fields(&self) -> Vec<&'a str> {
        self.visible_card_fields()
            .into_iter()
            .filter(|key| self.is_public(key))
            .collect()
    }

    /// Everything a card renderer needs in one value.
    pub fn card_layout(&self) -> CardLayout {
        let primary = self.settings.primary_field();
        let to_owned =
            |keys: Vec<&str>| -> Vec<String> { keys.into_iter().map(str::to_string).collect() };
        CardLayout {
            primary: primary.to_string(),
            primary_name: self.resolve_field(primary).map(|d| d.name().to_string()),
            body: to_owned(self.visible_card_fields()),
            hidden: to_owned(self.hidden_field_keys()),
            client_body: to_owned(self.client_card_fields()),
            client_view: self.settings.client_view,
        }
    }
}
