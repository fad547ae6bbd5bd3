//! Field schema operations

mod activate;
mod add;
mod delete;
mod list;
mod primary;
mod publish;
mod reorder;
mod update;
mod visibility;

pub use activate::{SetCustomFieldActive, SetSystemFieldActive};
pub use add::AddCustomField;
pub use delete::{Confirmation, DeleteCustomField};
pub use list::GetFields;
pub use primary::SetPrimaryField;
pub use publish::SetSystemFieldPublic;
pub use reorder::ReorderField;
pub use update::UpdateCustomField;
pub use visibility::SetFieldVisibility;

use leadpipe_fields::{FieldResolver, FieldsError};

/// Fail unless `key` names a field that is switched on for the campaign.
pub(crate) fn require_active(resolver: &FieldResolver<'_>, key: &str) -> Result<(), FieldsError> {
    if resolver.resolve_field(key).is_none() {
        return Err(FieldsError::not_found(key));
    }
    if !resolver.is_active(key) {
        return Err(FieldsError::invalid_operation(format!(
            "'{key}' is not active for this campaign"
        )));
    }
    Ok(())
}
