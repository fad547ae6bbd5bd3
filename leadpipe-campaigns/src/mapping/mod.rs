//! Lead source field mapping operations

mod discover;
mod map;

pub use discover::SetDiscoveredFields;
pub use map::{MapDiscoveredFields, MapRecord};
