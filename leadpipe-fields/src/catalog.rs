//! System field catalog.
//!
//! `SystemFieldCatalog::builtin()` is the set of fields every campaign can
//! switch on. A deployment may replace it at start-up with a YAML document
//! (a list of [`SystemFieldDef`]) via [`SystemFieldCatalog::load`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use tracing::debug;

use crate::error::{FieldsError, Result};
use crate::types::{FieldType, SystemFieldDef};

static BUILTIN: LazyLock<SystemFieldCatalog> = LazyLock::new(|| {
    SystemFieldCatalog::from_defs(builtin_fields()).expect("invalid built-in system field catalog")
});

/// Ordered, key-indexed collection of system field definitions.
#[derive(Debug, Clone)]
pub struct SystemFieldCatalog {
    fields: Vec<SystemFieldDef>,
    index: HashMap<String, usize>,
}

impl SystemFieldCatalog {
    /// The compiled-in catalog.
    pub fn builtin() -> &'static SystemFieldCatalog {
        &BUILTIN
    }

    /// Build a catalog from definitions in match order. Keys must be unique.
    pub fn from_defs(fields: Vec<SystemFieldDef>) -> Result<Self> {
        let mut index = HashMap::with_capacity(fields.len());
        for (i, def) in fields.iter().enumerate() {
            if def.key.trim().is_empty() {
                return Err(FieldsError::invalid_field(&def.key, "key cannot be empty"));
            }
            if index.insert(def.key.clone(), i).is_some() {
                return Err(FieldsError::DuplicateKey {
                    key: def.key.clone(),
                });
            }
        }
        Ok(Self { fields, index })
    }

    /// Parse a YAML list of system field definitions.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let fields: Vec<SystemFieldDef> = serde_yaml_ng::from_str(yaml)?;
        Self::from_defs(fields)
    }

    /// Read a YAML catalog from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_yaml(&content)?;
        debug!(?path, fields = catalog.len(), "loaded system field catalog");
        Ok(catalog)
    }

    pub fn get(&self, key: &str) -> Option<&SystemFieldDef> {
        self.index.get(key).map(|&i| &self.fields[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// All definitions, in match order.
    pub fn fields(&self) -> &[SystemFieldDef] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serialize back to the YAML shape accepted by [`Self::from_yaml`].
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(&self.fields)?)
    }
}

impl Default for SystemFieldCatalog {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

fn builtin_fields() -> Vec<SystemFieldDef> {
    use FieldType::*;
    vec![
        SystemFieldDef::new(
            "full_name",
            "Full Name",
            Text,
            &["full_name", "name", "fullname", "Full Name", "full name", "contact_name"],
        ),
        SystemFieldDef::new(
            "first_name",
            "First Name",
            Text,
            &["first_name", "firstname", "First Name", "given_name"],
        ),
        SystemFieldDef::new(
            "last_name",
            "Last Name",
            Text,
            &["last_name", "lastname", "Last Name", "surname", "family_name"],
        ),
        SystemFieldDef::new(
            "email",
            "Email",
            Email,
            &["email", "email_address", "Email", "e-mail", "work_email"],
        ),
        SystemFieldDef::new(
            "phone",
            "Phone",
            Tel,
            &[
                "phone",
                "phone_number",
                "Phone",
                "mobile",
                "mobile_number",
                "cell",
                "telephone",
            ],
        ),
        SystemFieldDef::new(
            "company",
            "Company",
            Text,
            &["company", "company_name", "Company", "organization", "business_name"],
        ),
        SystemFieldDef::new(
            "job_title",
            "Job Title",
            Text,
            &["job_title", "title", "position", "role"],
        ),
        SystemFieldDef::new(
            "website",
            "Website",
            Text,
            &["website", "url", "company_website"],
        ),
        SystemFieldDef::new(
            "address",
            "Address",
            Text,
            &["address", "street_address", "street"],
        ),
        SystemFieldDef::new("city", "City", Text, &["city", "town"]),
        SystemFieldDef::new("state", "State", Text, &["state", "province", "region"]),
        SystemFieldDef::new(
            "zip_code",
            "Zip Code",
            Text,
            &["zip_code", "zip", "postal_code", "postcode"],
        ),
        SystemFieldDef::new("country", "Country", Text, &["country", "country_code"]),
        SystemFieldDef::new(
            "lead_source",
            "Lead Source",
            Text,
            &["lead_source", "source", "utm_source"],
        ),
        SystemFieldDef::new(
            "budget",
            "Budget",
            Currency,
            &["budget", "estimated_budget", "monthly_budget"],
        ),
        SystemFieldDef::new(
            "created_date",
            "Created Date",
            Date,
            &["created_date", "created_time", "created_at", "submitted_at"],
        ),
        SystemFieldDef::new("notes", "Notes", Text, &["notes", "message", "comments"]),
    ]
}
