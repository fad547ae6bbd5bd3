//! Card layout operations

mod get;
mod purge;

pub use get::GetCard;
pub use purge::PurgeCard;

use leadpipe_fields::{FieldResolver, SystemFieldCatalog};
use serde_json::{json, Value};

use crate::context::SettingsUpdate;
use crate::error::Result;
use crate::types::Campaign;

/// A campaign with its stored settings and the card they produce.
pub(crate) fn campaign_view(catalog: &SystemFieldCatalog, campaign: &Campaign) -> Result<Value> {
    let card = FieldResolver::new(catalog, &campaign.settings).card_layout();
    Ok(json!({
        "id": campaign.id,
        "name": campaign.name,
        "updated_at": campaign.updated_at,
        "settings": serde_json::to_value(&campaign.settings)?,
        "card": serde_json::to_value(&card)?,
    }))
}

/// Output of every settings mutation. `changed` is false when nothing was written.
pub(crate) fn update_view(catalog: &SystemFieldCatalog, update: &SettingsUpdate) -> Result<Value> {
    let mut value = campaign_view(catalog, &update.campaign)?;
    value["changed"] = Value::Bool(update.changed);
    Ok(value)
}
