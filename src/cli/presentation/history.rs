//! History presentation: list and show.

use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde_json::json;

use super::generation::format_generation_result_text;
use super::shared::{to_json, truncate};
use crate::error::ApiError;
use crate::history::HistoryItem;

fn short_timestamp(item: &HistoryItem) -> String {
    item.recorded_at()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| item.timestamp.clone())
}

pub fn format_history_list_text(items: &[HistoryItem]) -> String {
    if items.is_empty() {
        return "No generations recorded yet.\n\nUse 'quill generate <topic>' to create one."
            .to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["ID", "When", "Topic", "Platform", "Tone", "Words"]);
    for item in items {
        table.add_row(vec![
            item.id.clone(),
            short_timestamp(item),
            truncate(&item.request.topic, 40),
            item.request.platform.clone(),
            item.request.tone.clone(),
            item.response.word_count.to_string(),
        ]);
    }
    format!("{}\n\nTotal: {} generation(s)", table, items.len())
}

pub fn format_history_list_json(items: &[HistoryItem]) -> Result<String, ApiError> {
    to_json(&json!({ "items": items, "total": items.len() }))
}

pub fn format_history_item_text(item: &HistoryItem) -> String {
    format!(
        "ID: {}\nRecorded: {}\n\n{}",
        item.id,
        item.timestamp,
        format_generation_result_text(&item.response)
    )
}

pub fn format_history_item_json(item: &HistoryItem) -> Result<String, ApiError> {
    to_json(item)
}
