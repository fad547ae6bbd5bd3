//! Leadpipe CLI - campaign card and field schema administration.
//!
//! Commands:
//! - `leadpipe campaign add|list|get`: Manage campaigns
//! - `leadpipe client add|list`: Manage clients
//! - `leadpipe fields <campaign>`: List system and custom fields
//! - `leadpipe card <campaign>`: Show the lead card layout
//! - `leadpipe show|hide|reorder|primary`: Arrange the card
//! - `leadpipe add-field|update-field|delete-field`: Edit custom fields
//! - `leadpipe activate|publish`: Switch fields on and expose them to clients
//! - `leadpipe client-view`: Toggle client portal surfaces
//! - `leadpipe discover|map|map-record`: Map lead source field names
//! - `leadpipe purge`: Drop stale keys from the card order
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error

use clap::Parser;
use tracing_subscriber::EnvFilter;

use leadpipe::{commands, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("leadpipe=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = commands::run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
