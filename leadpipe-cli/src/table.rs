//! Terminal-aware table rendering for command results.
//!
//! Every command returns JSON; these functions turn the shapes the settings
//! service produces into comfy_table output.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde_json::Value;

/// Create a table pre-configured for terminal-width-aware output.
///
/// Uses crossterm to detect the actual terminal width, falling back to
/// 120 columns when not connected to a TTY.
pub fn new_table() -> Table {
    let width = crossterm::terminal::size().map(|(w, _)| w).unwrap_or(120);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_width(width);
    table
}

/// Truncate a string to `max` characters, appending "..." if truncated.
pub fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn check(value: &Value) -> &'static str {
    if value.as_bool().unwrap_or(false) {
        "✓"
    } else {
        ""
    }
}

fn joined(value: &Value) -> String {
    value
        .as_array()
        .map(|items| items.iter().map(text).collect::<Vec<_>>().join(", "))
        .unwrap_or_default()
}

fn rows<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value[key].as_array().map(Vec::as_slice).unwrap_or(&[])
}

/// Render a card layout (`card` command, or the `card` key of a campaign view).
pub fn render_card(card: &Value) -> String {
    let label = |key: &str| -> String {
        card["labels"][key]
            .as_str()
            .map(|name| format!("{} ({})", name, key))
            .unwrap_or_else(|| key.to_string())
    };

    let mut out = String::new();
    let headline = card["primary_name"]
        .as_str()
        .map(|name| format!("{} ({})", name, text(&card["primary"])))
        .unwrap_or_else(|| text(&card["primary"]));
    out.push_str(&format!("Primary: {}\n", headline));

    let client_body: Vec<&str> = rows(card, "client_body")
        .iter()
        .filter_map(Value::as_str)
        .collect();

    let mut table = new_table();
    table.set_header(vec!["#", "Field", "Client"]);
    for (i, key) in rows(card, "body").iter().filter_map(Value::as_str).enumerate() {
        let client = if client_body.contains(&key) { "✓" } else { "" };
        table.add_row(vec![i.to_string(), label(key), client.to_string()]);
    }
    out.push_str(&table.to_string());
    out.push('\n');

    let hidden: Vec<String> = rows(card, "hidden")
        .iter()
        .filter_map(Value::as_str)
        .map(label)
        .collect();
    if !hidden.is_empty() {
        out.push_str(&format!("Hidden: {}\n", hidden.join(", ")));
    }

    let view = &card["client_view"];
    let surfaces: Vec<&str> = [
        ("show_dashboard", "dashboard"),
        ("show_kanban", "kanban"),
        ("show_list", "list"),
        ("show_kpi", "kpi"),
    ]
    .iter()
    .filter(|(flag, _)| view[*flag].as_bool().unwrap_or(false))
    .map(|(_, name)| *name)
    .collect();
    let surfaces = if surfaces.is_empty() {
        "none".to_string()
    } else {
        surfaces.join(", ")
    };
    out.push_str(&format!("Client portal: {}", surfaces));
    out
}

/// Render the `fields` command result.
pub fn render_fields(value: &Value) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Key", "Name", "Type", "Kind", "Active", "Public", "Card", "Aliases",
    ]);
    for field in rows(value, "fields") {
        let key = if field["primary"].as_bool().unwrap_or(false) {
            format!("{} *", text(&field["key"]))
        } else {
            text(&field["key"])
        };
        let kind = if field["system"].as_bool().unwrap_or(false) {
            "system"
        } else {
            "custom"
        };
        table.add_row(vec![
            key,
            truncate_str(&text(&field["name"]), 30),
            text(&field["type"]),
            kind.to_string(),
            check(&field["active"]).to_string(),
            check(&field["public"]).to_string(),
            check(&field["on_card"]).to_string(),
            truncate_str(&joined(&field["aliases"]), 40),
        ]);
    }

    let mut out = table.to_string();
    for collision in rows(value, "alias_collisions") {
        out.push_str(&format!(
            "\nwarning: alias '{}' is claimed by {}",
            text(&collision["alias"]),
            joined(&collision["keys"])
        ));
    }
    out
}

/// Render the `campaign list` result.
pub fn render_campaigns(value: &Value) -> String {
    if rows(value, "campaigns").is_empty() {
        return "No campaigns.".to_string();
    }
    let mut table = new_table();
    table.set_header(vec![
        "ID", "Name", "Client", "Primary", "Active", "Custom", "Updated",
    ]);
    for campaign in rows(value, "campaigns") {
        table.add_row(vec![
            text(&campaign["id"]),
            truncate_str(&text(&campaign["name"]), 40),
            text(&campaign["client_id"]),
            text(&campaign["primary"]),
            text(&campaign["active_fields"]),
            text(&campaign["custom_fields"]),
            text(&campaign["updated_at"]),
        ]);
    }
    table.to_string()
}

/// Render the `client list` result.
pub fn render_clients(value: &Value) -> String {
    if rows(value, "clients").is_empty() {
        return "No clients.".to_string();
    }
    let mut table = new_table();
    table.set_header(vec!["ID", "Name", "Email"]);
    for client in rows(value, "clients") {
        table.add_row(vec![
            text(&client["id"]),
            text(&client["name"]),
            text(&client["email"]),
        ]);
    }
    table.to_string()
}

/// Render the `map` result.
pub fn render_mappings(value: &Value) -> String {
    let mut table = new_table();
    table.set_header(vec!["External", "Field", "Name"]);
    for mapping in rows(value, "mappings") {
        table.add_row(vec![
            text(&mapping["external"]),
            text(&mapping["key"]),
            text(&mapping["name"]),
        ]);
    }
    table.to_string()
}

/// Render the `map-record` result.
pub fn render_record(value: &Value) -> String {
    let mut table = new_table();
    table.set_header(vec!["Field", "Value", ""]);
    let sections = [("mapped", ""), ("unmapped", "unmapped")];
    for (section, note) in sections {
        if let Some(entries) = value[section].as_object() {
            for (key, v) in entries {
                table.add_row(vec![
                    key.clone(),
                    truncate_str(&text(v), 60),
                    note.to_string(),
                ]);
            }
        }
    }
    let mut out = table.to_string();
    let duplicates = joined(&value["duplicates"]);
    if !duplicates.is_empty() {
        out.push_str(&format!("\nDropped duplicates: {}", duplicates));
    }
    out
}
