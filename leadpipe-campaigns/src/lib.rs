//! Campaign settings service
//!
//! Wraps the pure field schema in `leadpipe-fields` with persistence, per-campaign
//! write serialization and an activity log.
//!
//! ## Overview
//!
//! - **Whole-object writes** - every change reads the stored settings, derives
//!   a replacement, submits it, and adopts what the store echoes back
//! - **One writer per campaign** - concurrent writes to the same campaign queue
//!   (or are rejected, per [`WritePolicy`]); different campaigns never block
//! - **Commands as data** - each operation is a serializable struct with a
//!   verb and a noun, so every change lands in the activity log with its input
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use leadpipe_campaigns::{
//!     campaign::AddCampaign, field::SetFieldVisibility, Execute, LeadpipeConfig,
//!     SettingsContext,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LeadpipeConfig::load()?;
//! let ctx = SettingsContext::from_config(&config).await?;
//!
//! AddCampaign::new("Spring Promo")
//!     .with_id("spring")
//!     .execute(&ctx)
//!     .await
//!     .into_result()?;
//!
//! let result = SetFieldVisibility::show("spring", "company")
//!     .execute(&ctx)
//!     .await
//!     .into_result()?;
//! println!("card body: {}", result["card"]["body"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Storage Structure
//!
//! ```text
//! <data_dir>/
//! ├── campaigns/
//! │   └── {id}.json     # Campaign with its settings
//! └── clients/
//!     └── {id}.json     # Client record
//! ```

pub mod config;
mod context;
mod error;
mod operation;
mod processor;
pub mod store;
pub mod types;

// Command modules
pub mod campaign;
pub mod card;
pub mod client_view;
pub mod field;
pub mod mapping;

pub use config::{LeadpipeConfig, WritePolicy};
pub use context::{SettingsContext, SettingsUpdate};
pub use error::{Result, SettingsError};
pub use operation::{Execute, ExecutionResult, Operation};
pub use processor::SettingsOperationProcessor;
pub use store::{CampaignStore, FileCampaignStore, MemoryCampaignStore};
pub use types::{Campaign, CampaignId, Client, ClientId, LogEntry, LogEntryId};

pub use leadpipe_fields as fields;
