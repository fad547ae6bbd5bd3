//! CLI definition for the Leadpipe command-line interface.
//!
//! Only depends on `clap`, `std` and the field type enum so the argument
//! surface can be read in one place.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use leadpipe_fields::FieldType;

/// Leadpipe - campaign card and field schema administration.
///
/// Every campaign owns a field schema: which built-in system fields are
/// switched on, which custom fields exist, what the lead card shows, and
/// what the client portal may see.
#[derive(Parser, Debug)]
#[command(name = "leadpipe")]
#[command(version)]
#[command(about = "Campaign card and field schema administration")]
#[command(
    long_about = "Leadpipe manages each campaign's field schema and lead card layout.\n\n\
    Configuration is read from leadpipe.toml / leadpipe.yaml / leadpipe.json in the \
    working directory, then LEADPIPE_* environment variables.\n\n\
    Environment variables:\n  \
    LEADPIPE_DATA_DIR        Where campaigns and clients are stored\n  \
    LEADPIPE_WRITE_POLICY    queue (default) or reject\n  \
    LEADPIPE_ALIAS_POLICY    reject (default) or allow"
)]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Read configuration from this file instead of the working directory
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the configured data directory
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Name recorded as the actor of each change (user or user[session])
    #[arg(long, global = true, value_name = "ACTOR")]
    pub actor: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create and list campaigns
    Campaign {
        #[command(subcommand)]
        action: CampaignAction,
    },

    /// Create and list clients
    Client {
        #[command(subcommand)]
        action: ClientAction,
    },

    /// List a campaign's system and custom fields
    Fields {
        campaign: String,
        /// Only fields switched on for the campaign
        #[arg(long)]
        active: bool,
    },

    /// Show the lead card layout
    Card { campaign: String },

    /// Add a field to the end of the card body
    Show { campaign: String, key: String },

    /// Remove a field from the card body
    Hide { campaign: String, key: String },

    /// Move a card body field to a new position (0 = first)
    Reorder {
        campaign: String,
        key: String,
        index: usize,
    },

    /// Choose the card headline field
    Primary { campaign: String, key: String },

    /// Define a custom field
    AddField(AddFieldArgs),

    /// Edit a custom field definition
    UpdateField(UpdateFieldArgs),

    /// Delete a custom field (requires typing its name and key)
    DeleteField {
        campaign: String,
        key: String,
        /// The field's display name, exactly
        #[arg(long, value_name = "NAME")]
        confirm_name: String,
        /// The field's key, exactly
        #[arg(long, value_name = "KEY")]
        confirm_key: String,
    },

    /// Switch a system or custom field on (or off with --off)
    Activate {
        campaign: String,
        key: String,
        #[arg(long)]
        off: bool,
    },

    /// Expose a system field in the client portal (or withdraw with --off)
    Publish {
        campaign: String,
        key: String,
        #[arg(long)]
        off: bool,
    },

    /// Toggle client portal surfaces
    ClientView(ClientViewArgs),

    /// Record the field names a lead source sends
    Discover {
        campaign: String,
        #[arg(required = true)]
        fields: Vec<String>,
    },

    /// Show how discovered field names map onto campaign fields
    Map { campaign: String },

    /// Map one lead record (a JSON object) onto campaign fields
    MapRecord { campaign: String, record: String },

    /// Drop stale keys from the stored card order
    Purge { campaign: String },
}

#[derive(Subcommand, Debug)]
pub enum CampaignAction {
    /// Create a campaign with starter settings
    Add {
        name: String,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        client: Option<String>,
    },
    /// List campaigns
    List {
        #[arg(long)]
        client: Option<String>,
    },
    /// Show one campaign
    Get { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ClientAction {
    /// Register a client
    Add {
        name: String,
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// List clients
    List,
}

#[derive(Args, Debug)]
pub struct AddFieldArgs {
    pub campaign: String,
    /// Lowercase snake_case key
    pub key: String,
    /// Display name
    pub name: String,
    #[arg(long = "type", value_name = "TYPE", default_value = "text")]
    pub field_type: FieldType,
    /// Select option (repeatable)
    #[arg(long = "option", value_name = "VALUE")]
    pub options: Vec<String>,
    /// External name that maps to this field (repeatable)
    #[arg(long = "alias", value_name = "NAME")]
    pub aliases: Vec<String>,
    /// Visible in the client portal
    #[arg(long)]
    pub public: bool,
    #[arg(long)]
    pub required: bool,
}

#[derive(Args, Debug)]
pub struct UpdateFieldArgs {
    pub campaign: String,
    pub key: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long = "type", value_name = "TYPE")]
    pub field_type: Option<FieldType>,
    /// Replace the select options (repeatable)
    #[arg(long = "option", value_name = "VALUE")]
    pub options: Vec<String>,
    /// Replace the aliases (repeatable)
    #[arg(long = "alias", value_name = "NAME")]
    pub aliases: Vec<String>,
    #[arg(long, value_name = "BOOL")]
    pub public: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    pub required: Option<bool>,
}

#[derive(Args, Debug)]
pub struct ClientViewArgs {
    pub campaign: String,
    #[arg(long, value_name = "BOOL")]
    pub dashboard: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    pub kanban: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    pub list: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    pub kpi: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_field() {
        let cli = Cli::try_parse_from([
            "leadpipe",
            "add-field",
            "spring",
            "budget_tier",
            "Budget Tier",
            "--type",
            "select",
            "--option",
            "Low",
            "--option",
            "High",
            "--alias",
            "tier",
        ])
        .unwrap();
        match cli.command {
            Commands::AddField(args) => {
                assert_eq!(args.field_type, FieldType::Select);
                assert_eq!(args.options, vec!["Low", "High"]);
                assert_eq!(args.aliases, vec!["tier"]);
                assert!(!args.public);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let result = Cli::try_parse_from(["leadpipe", "delete-field", "spring", "score"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "leadpipe",
            "delete-field",
            "spring",
            "score",
            "--confirm-name",
            "Score",
            "--confirm-key",
            "score",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::DeleteField { .. }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["leadpipe", "card", "spring", "--json", "--debug"]).unwrap();
        assert!(cli.json);
        assert!(cli.debug);
    }
}
