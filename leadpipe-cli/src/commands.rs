//! Command dispatch: builds the settings context and runs one command.

use std::fmt::Display;

use leadpipe_campaigns::{
    campaign::{AddCampaign, AddClient, GetCampaign, ListCampaigns, ListClients},
    card::{GetCard, PurgeCard},
    client_view::UpdateClientView,
    field::{
        AddCustomField, Confirmation, DeleteCustomField, GetFields, ReorderField,
        SetCustomFieldActive, SetFieldVisibility, SetPrimaryField, SetSystemFieldActive,
        SetSystemFieldPublic, UpdateCustomField,
    },
    fields::{FieldsError, Visibility},
    mapping::{MapDiscoveredFields, MapRecord, SetDiscoveredFields},
    LeadpipeConfig, Result, SettingsContext, SettingsOperationProcessor,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::cli::{
    AddFieldArgs, CampaignAction, ClientAction, Cli, ClientViewArgs, Commands, UpdateFieldArgs,
};
use crate::table;

/// How a command result is printed when `--json` is off.
pub enum Render {
    /// The `card` key of a campaign view
    CampaignCard,
    Card,
    Fields,
    Campaigns,
    Clients,
    Mappings,
    Record,
    Message(String),
}

/// Load configuration the way the CLI flags ask for it.
pub fn load_config(cli: &Cli) -> Result<LeadpipeConfig> {
    let mut config = match &cli.config {
        Some(path) => LeadpipeConfig::load_file(path)?,
        None => LeadpipeConfig::load()?,
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

/// Run the parsed command line and print its result to stdout.
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    debug!(data_dir = %config.data_dir.display(), "loaded configuration");

    let ctx = SettingsContext::from_config(&config).await?;
    let processor = match &cli.actor {
        Some(actor) => SettingsOperationProcessor::with_actor(actor.clone()),
        None => SettingsOperationProcessor::new(),
    };

    let (value, render) = dispatch(cli.command, &ctx, &processor).await?;
    println!("{}", format_output(&value, &render, cli.json)?);
    Ok(())
}

fn format_output(value: &Value, render: &Render, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(value)?);
    }
    Ok(match render {
        Render::CampaignCard => format!(
            "{} ({})\n{}",
            value["name"].as_str().unwrap_or_default(),
            value["id"].as_str().unwrap_or_default(),
            table::render_card(&value["card"])
        ),
        Render::Card => table::render_card(value),
        Render::Fields => table::render_fields(value),
        Render::Campaigns => table::render_campaigns(value),
        Render::Clients => table::render_clients(value),
        Render::Mappings => table::render_mappings(value),
        Render::Record => table::render_record(value),
        Render::Message(message) => message.clone(),
    })
}

fn done(what: impl Display) -> Render {
    Render::Message(what.to_string())
}

/// Execute one command through the processor.
pub async fn dispatch(
    command: Commands,
    ctx: &SettingsContext,
    processor: &SettingsOperationProcessor,
) -> Result<(Value, Render)> {
    match command {
        Commands::Campaign { action } => match action {
            CampaignAction::Add { name, id, client } => {
                let mut op = AddCampaign::new(name);
                if let Some(id) = id {
                    op = op.with_id(id);
                }
                if let Some(client) = client {
                    op = op.with_client(client);
                }
                Ok((processor.process(&op, ctx).await?, Render::CampaignCard))
            }
            CampaignAction::List { client } => {
                let mut op = ListCampaigns::new();
                if let Some(client) = client {
                    op = op.for_client(client);
                }
                Ok((processor.process(&op, ctx).await?, Render::Campaigns))
            }
            CampaignAction::Get { id } => Ok((
                processor.process(&GetCampaign::new(id), ctx).await?,
                Render::CampaignCard,
            )),
        },

        Commands::Client { action } => match action {
            ClientAction::Add { name, id, email } => {
                let mut op = AddClient::new(name);
                if let Some(id) = id {
                    op = op.with_id(id);
                }
                if let Some(email) = email {
                    op = op.with_email(email);
                }
                let value = processor.process(&op, ctx).await?;
                let message = format!("Added client {}", value["id"].as_str().unwrap_or_default());
                Ok((value, done(message)))
            }
            ClientAction::List => Ok((
                processor.process(&ListClients, ctx).await?,
                Render::Clients,
            )),
        },

        Commands::Fields { campaign, active } => {
            let mut op = GetFields::new(campaign);
            if active {
                op = op.active_only();
            }
            Ok((processor.process(&op, ctx).await?, Render::Fields))
        }

        Commands::Card { campaign } => Ok((
            processor.process(&GetCard::new(campaign), ctx).await?,
            Render::Card,
        )),

        Commands::Show { campaign, key } => Ok((
            processor
                .process(&SetFieldVisibility::show(campaign, key), ctx)
                .await?,
            Render::CampaignCard,
        )),

        Commands::Hide { campaign, key } => Ok((
            processor
                .process(&SetFieldVisibility::hide(campaign, key), ctx)
                .await?,
            Render::CampaignCard,
        )),

        Commands::Reorder {
            campaign,
            key,
            index,
        } => Ok((
            processor
                .process(&ReorderField::new(campaign, key, index), ctx)
                .await?,
            Render::CampaignCard,
        )),

        Commands::Primary { campaign, key } => Ok((
            processor
                .process(&SetPrimaryField::new(campaign, key), ctx)
                .await?,
            Render::CampaignCard,
        )),

        Commands::AddField(args) => Ok((
            processor.process(&add_field(args), ctx).await?,
            Render::CampaignCard,
        )),

        Commands::UpdateField(args) => Ok((
            processor.process(&update_field(args), ctx).await?,
            Render::CampaignCard,
        )),

        Commands::DeleteField {
            campaign,
            key,
            confirm_name,
            confirm_key,
        } => {
            let op = DeleteCustomField::new(
                campaign,
                key.clone(),
                Confirmation::new(confirm_name, confirm_key),
            );
            let value = processor.process(&op, ctx).await?;
            Ok((value, done(format!("Deleted field {}", key))))
        }

        Commands::Activate { campaign, key, off } => {
            let value = if ctx.catalog().contains(&key) {
                processor
                    .process(&SetSystemFieldActive::new(campaign, key, !off), ctx)
                    .await?
            } else {
                processor
                    .process(&SetCustomFieldActive::new(campaign, key, !off), ctx)
                    .await?
            };
            Ok((value, Render::CampaignCard))
        }

        Commands::Publish { campaign, key, off } => Ok((
            processor
                .process(&SetSystemFieldPublic::new(campaign, key, !off), ctx)
                .await?,
            Render::CampaignCard,
        )),

        Commands::ClientView(args) => Ok((
            processor.process(&client_view(args), ctx).await?,
            Render::CampaignCard,
        )),

        Commands::Discover { campaign, fields } => Ok((
            processor
                .process(&SetDiscoveredFields::new(campaign, fields), ctx)
                .await?,
            Render::CampaignCard,
        )),

        Commands::Map { campaign } => Ok((
            processor
                .process(&MapDiscoveredFields::new(campaign), ctx)
                .await?,
            Render::Mappings,
        )),

        Commands::MapRecord { campaign, record } => {
            let record = parse_record(&record)?;
            Ok((
                processor
                    .process(&MapRecord::new(campaign, record), ctx)
                    .await?,
                Render::Record,
            ))
        }

        Commands::Purge { campaign } => Ok((
            processor.process(&PurgeCard::new(campaign), ctx).await?,
            Render::CampaignCard,
        )),
    }
}

fn visibility(public: bool) -> Visibility {
    if public {
        Visibility::Public
    } else {
        Visibility::Internal
    }
}

fn add_field(args: AddFieldArgs) -> AddCustomField {
    let mut op = AddCustomField::new(args.campaign, args.key, args.name, args.field_type)
        .with_options(args.options)
        .with_aliases(args.aliases)
        .with_visibility(visibility(args.public));
    if args.required {
        op = op.required();
    }
    op
}

fn update_field(args: UpdateFieldArgs) -> UpdateCustomField {
    let mut op = UpdateCustomField::new(args.campaign, args.key);
    if let Some(name) = args.name {
        op = op.with_name(name);
    }
    if let Some(field_type) = args.field_type {
        op = op.with_type(field_type);
    }
    if !args.options.is_empty() {
        op = op.with_options(args.options);
    }
    if !args.aliases.is_empty() {
        op = op.with_aliases(args.aliases);
    }
    if let Some(public) = args.public {
        op = op.with_visibility(visibility(public));
    }
    if let Some(required) = args.required {
        op = op.with_required(required);
    }
    op
}

fn client_view(args: ClientViewArgs) -> UpdateClientView {
    let mut op = UpdateClientView::new(args.campaign);
    if let Some(show) = args.dashboard {
        op = op.with_dashboard(show);
    }
    if let Some(show) = args.kanban {
        op = op.with_kanban(show);
    }
    if let Some(show) = args.list {
        op = op.with_list(show);
    }
    if let Some(show) = args.kpi {
        op = op.with_kpi(show);
    }
    op
}

/// Parse a lead record given on the command line; it must be a JSON object.
fn parse_record(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        _ => Err(FieldsError::InvalidOperation {
            message: "lead record must be a JSON object".to_string(),
        }
        .into()),
    }
}
