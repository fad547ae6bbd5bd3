//! Campaign and client operations

mod add;
mod client;
mod get;
mod list;

pub use add::AddCampaign;
pub use client::{AddClient, ListClients};
pub use get::GetCampaign;
pub use list::ListCampaigns;
