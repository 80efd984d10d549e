//! Backend catalog, health and publishing presentation.

use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

use super::shared::{format_section_heading, to_json};
use crate::backend::ServiceHealth;
use crate::error::ApiError;
use crate::publish::PublishState;
use crate::types::{Platform, PublishResponse, Tone};

pub fn format_platforms_text(platforms: &[Platform]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Display name", "Max length", "Description"]);
    for p in platforms {
        table.add_row(vec![
            p.name.clone(),
            p.display_name.clone(),
            p.max_length
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            p.description.clone(),
        ]);
    }
    table.to_string()
}

pub fn format_platforms_json(platforms: &[Platform]) -> Result<String, ApiError> {
    to_json(&json!({ "platforms": platforms }))
}

pub fn format_tones_text(tones: &[Tone]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Display name", "Description"]);
    for t in tones {
        table.add_row(vec![
            t.name.clone(),
            t.display_name.clone(),
            t.description.clone(),
        ]);
    }
    table.to_string()
}

pub fn format_tones_json(tones: &[Tone]) -> Result<String, ApiError> {
    to_json(&json!({ "tones": tones }))
}

fn online_label(online: bool) -> String {
    if online {
        format!("{}", "online".green())
    } else {
        format!("{}", "offline".red())
    }
}

pub fn format_health_text(snapshot: &ServiceHealth) -> String {
    let mut out = format!("Backend: {}\n", online_label(snapshot.online));
    if let Some(health) = &snapshot.health {
        out.push_str(&format!(
            "  Status: {}\n  Version: {}\n  Timestamp: {}\n",
            health.status, health.version, health.timestamp
        ));
    }
    if let Some(error) = &snapshot.last_error {
        out.push_str(&format!("  Error: {}\n", error));
    }
    out
}

pub fn format_health_json(snapshot: &ServiceHealth) -> Result<String, ApiError> {
    to_json(&json!({
        "online": snapshot.online,
        "health": snapshot.health,
        "error": snapshot.last_error,
        "checked_at": snapshot.checked_at.map(|t| t.to_rfc3339()),
    }))
}

pub fn format_status_text(snapshot: &ServiceHealth) -> String {
    let mut out = format!("{}\n", format_section_heading("Service Status"));
    out.push_str(&format!("  Backend: {}\n", online_label(snapshot.online)));
    let Some(status) = &snapshot.status else {
        if let Some(error) = &snapshot.last_error {
            out.push_str(&format!("  Error: {}\n", error));
        }
        return out;
    };
    out.push_str(&format!(
        "  Service: {}\n  Health: {}\n",
        status.service, status.health
    ));
    if !status.dependencies.is_empty() {
        out.push_str(&format!("\n{}\n", format_section_heading("Dependencies")));
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Dependency", "State"]);
        for (name, value) in &status.dependencies {
            let state = value
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string());
            table.add_row(vec![name.clone(), state]);
        }
        out.push_str(&format!("{}\n", table));
    }
    if !status.workflow_status.is_empty() {
        out.push_str(&format!("\n{}\n", format_section_heading("Workflow")));
        for (key, value) in &status.workflow_status {
            out.push_str(&format!("  {}: {}\n", key, value));
        }
    }
    out
}

pub fn format_status_json(snapshot: &ServiceHealth) -> Result<String, ApiError> {
    to_json(&json!({
        "online": snapshot.online,
        "status": snapshot.status,
        "error": snapshot.last_error,
    }))
}

pub fn format_publish_status_text(state: &PublishState) -> String {
    let mut out = if state.is_configured {
        format!("LinkedIn publishing: {}\n", "configured".green())
    } else {
        format!("LinkedIn publishing: {}\n", "not configured".yellow())
    };
    if let Some(caps) = &state.capabilities {
        out.push_str(&format!(
            "  Text posts: {}\n  Image posts: {}\n  Video posts: {}\n",
            caps.text_posting, caps.image_posting, caps.video_posting
        ));
    }
    if let Some(error) = &state.posting_error {
        out.push_str(&format!("  Error: {}\n", error));
    }
    out
}

pub fn format_publish_status_json(state: &PublishState) -> Result<String, ApiError> {
    to_json(&json!({
        "configured": state.is_configured,
        "capabilities": state.capabilities,
        "error": state.posting_error,
    }))
}

pub fn format_publish_response_text(response: &PublishResponse) -> String {
    let mut out = format!("{} Posted to LinkedIn\n", "✓".green());
    if let Some(id) = &response.post_id {
        out.push_str(&format!("  Post: {}\n", id));
    }
    if let Some(url) = &response.url {
        out.push_str(&format!("  URL: {}\n", url));
    }
    out
}
