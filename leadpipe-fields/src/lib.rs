//! Campaign field schema and card layout resolution
//!
//! `leadpipe-fields` is a standalone, schema-only crate. It knows which fields a
//! campaign can collect, which of them are switched on, which a client portal user
//! may see, and how the summary card of a lead is laid out. It performs no I/O on
//! campaign data: every mutation takes a [`CampaignSettings`] value and returns
//! the next one, and the caller decides where that value is stored.
//!
//! # Architecture
//!
//! - **System fields**: built-in, non-deletable definitions shared by every campaign
//!   ([`SystemFieldCatalog`])
//! - **Custom fields**: agency-defined definitions owned by one campaign's settings
//! - **Resolver**: read-only derivations over a catalog + settings pair ([`FieldResolver`])
//! - **Mutations**: pure `&CampaignSettings -> CampaignSettings` functions ([`mutation`])
//! - **Mapping**: alias-based translation of external field names into field keys

pub mod catalog;
pub mod error;
pub mod mapping;
pub mod mutation;
pub mod resolver;
pub mod settings;
pub mod types;
pub mod validation;

pub use catalog::SystemFieldCatalog;
pub use error::{FieldsError, Result};
pub use mapping::{AliasCollision, FieldMapping, MappedRecord};
pub use mutation::CustomFieldPatch;
pub use resolver::{CardLayout, FieldResolver};
pub use settings::{CampaignSettings, ClientView, DEFAULT_PRIMARY_FIELD};
pub use types::{
    CustomFieldDef, FieldDetail, FieldType, SelectOption, SystemFieldDef, Visibility,
};
pub use validation::AliasPolicy;
