//! CLI presentation: text and json formatters per command family.

mod generation;
mod history;
mod service;
mod shared;

pub use generation::{
    format_generation_result_json, format_generation_result_text, format_progress_line,
};
pub use history::{
    format_history_item_json, format_history_item_text, format_history_list_json,
    format_history_list_text,
};
pub use service::{
    format_health_json, format_health_text, format_platforms_json, format_platforms_text,
    format_publish_response_text, format_publish_status_json, format_publish_status_text,
    format_status_json, format_status_text, format_tones_json, format_tones_text,
};
pub use shared::format_section_heading;
