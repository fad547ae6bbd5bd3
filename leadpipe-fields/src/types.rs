//! Core field types for the campaign schema.
//!
//! System field definitions are built in and shared by every campaign. Custom
//! field definitions belong to a single campaign's settings. Both serialize
//! with serde so settings documents and catalogs can be stored as JSON or YAML.

use serde::{Deserialize, Serialize};

/// The type of a field, which determines what shape the collected value takes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Date,
    Select,
    Email,
    Tel,
    Currency,
}

impl FieldType {
    /// Lowercase name as it appears in stored documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Select => "select",
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Currency => "currency",
        }
    }

    /// Whether values of this type are chosen from a fixed option list.
    pub fn is_enumerated(&self) -> bool {
        matches!(self, Self::Select)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "number" => Ok(Self::Number),
            "date" => Ok(Self::Date),
            "select" => Ok(Self::Select),
            "email" => Ok(Self::Email),
            "tel" => Ok(Self::Tel),
            "currency" => Ok(Self::Currency),
            other => Err(format!("unknown field type: {other}")),
        }
    }
}

/// Whether a client portal user may see a custom field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Agency users only
    #[default]
    Internal,
    /// Also shown in the client portal
    Public,
}

/// A single option in a select field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: None,
            color: None,
        }
    }

    /// Label shown to users, falling back to the stored value.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.value)
    }
}

/// A built-in field definition. Never created or destroyed at runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemFieldDef {
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: FieldType,
    /// Alternate external names, in match order
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl SystemFieldDef {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        type_: FieldType,
        aliases: &[&str],
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            type_,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// An agency-defined field owned by one campaign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomFieldDef {
    pub key: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl CustomFieldDef {
    /// Create an active, internal, optional field with no aliases.
    pub fn new(key: impl Into<String>, name: impl Into<String>, type_: FieldType) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            type_,
            required: false,
            is_active: true,
            visibility: Visibility::Internal,
            options: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(SelectOption::new).collect();
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Unified view of a resolved field, whichever kind of definition backs it.
///
/// System fields take their active/public state from the campaign settings;
/// custom fields carry it on the definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDetail<'a> {
    System {
        def: &'a SystemFieldDef,
        active: bool,
        public: bool,
    },
    Custom(&'a CustomFieldDef),
}

impl<'a> FieldDetail<'a> {
    pub fn key(&self) -> &'a str {
        match self {
            Self::System { def, .. } => &def.key,
            Self::Custom(def) => &def.key,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            Self::System { def, .. } => &def.name,
            Self::Custom(def) => &def.name,
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            Self::System { def, .. } => def.type_,
            Self::Custom(def) => def.type_,
        }
    }

    pub fn aliases(&self) -> &'a [String] {
        match self {
            Self::System { def, .. } => &def.aliases,
            Self::Custom(def) => &def.aliases,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Self::System { .. })
    }

    pub fn is_active(&self) -> bool {
        match self {
            Self::System { active, .. } => *active,
            Self::Custom(def) => def.is_active,
        }
    }

    /// Whether a client portal user may see this field.
    pub fn is_public(&self) -> bool {
        match self {
            Self::System { active, public, .. } => *active && *public,
            Self::Custom(def) => def.is_active && def.visibility == Visibility::Public,
        }
    }

    pub fn is_required(&self) -> bool {
        match self {
            Self::System { .. } => false,
            Self::Custom(def) => def.required,
        }
    }

    /// Select options; empty for system fields and non-select custom fields.
    pub fn options(&self) -> &'a [SelectOption] {
        match self {
            Self::System { .. } => &[],
            Self::Custom(def) => &def.options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_serializes_lowercase() {
        let json = serde_json::to_string(&FieldType::Currency).unwrap();
        assert_eq!(json, "\"currency\"");
        let parsed: FieldType = serde_json::from_str("\"tel\"").unwrap();
        assert_eq!(parsed, FieldType::Tel);
    }

    #[test]
    fn field_type_from_str_rejects_unknown() {
        assert_eq!("date".parse::<FieldType>().unwrap(), FieldType::Date);
        assert!("datetime".parse::<FieldType>().is_err());
    }

    #[test]
    fn custom_field_defaults_when_absent() {
        let json = r#"{"key": "budget_tier", "name": "Budget Tier"}"#;
        let def: CustomFieldDef = serde_json::from_str(json).unwrap();
        assert_eq!(def.type_, FieldType::Text);
        assert!(def.is_active);
        assert!(!def.required);
        assert_eq!(def.visibility, Visibility::Internal);
        assert!(def.options.is_empty());
        assert!(def.aliases.is_empty());
    }

    #[test]
    fn custom_field_type_renames_to_type() {
        let def = CustomFieldDef::new("budget_tier", "Budget Tier", FieldType::Select)
            .with_options(["Low", "High"]);
        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(value["type"], "select");
        assert!(value.get("type_").is_none());
        assert_eq!(value["options"][1]["value"], "High");
    }

    #[test]
    fn system_field_from_yaml() {
        let yaml = r#"
key: phone
name: Phone
type: tel
aliases:
  - phone_number
  - mobile
"#;
        let def: SystemFieldDef = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(def.key, "phone");
        assert_eq!(def.type_, FieldType::Tel);
        assert_eq!(def.aliases, vec!["phone_number", "mobile"]);
    }

    #[test]
    fn detail_public_requires_active() {
        let def = CustomFieldDef::new("notes", "Notes", FieldType::Text)
            .with_visibility(Visibility::Public)
            .inactive();
        let detail = FieldDetail::Custom(&def);
        assert!(!detail.is_public());
        assert!(!detail.is_system());

        let sys = SystemFieldDef::new("email", "Email", FieldType::Email, &["email"]);
        let detail = FieldDetail::System {
            def: &sys,
            active: false,
            public: true,
        };
        assert!(!detail.is_public());
        assert!(detail.is_system());
        assert!(detail.options().is_empty());
    }

    #[test]
    fn select_option_label_falls_back_to_value() {
        let mut opt = SelectOption::new("gold");
        assert_eq!(opt.display_label(), "gold");
        opt.label = Some("Gold".into());
        assert_eq!(opt.display_label(), "Gold");
    }
}
