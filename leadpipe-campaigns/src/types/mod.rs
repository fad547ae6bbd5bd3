//! Core types for the settings service

mod campaign;
mod ids;
mod log;

pub use campaign::{Campaign, Client};
pub use ids::{CampaignId, ClientId, LogEntryId};
pub use log::LogEntry;
