//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::{command_name, uses_history};
pub use output::map_error;
pub use parse::{Cli, Commands, HistoryCommands, PublishCommands};
pub use presentation::{
    format_generation_result_json, format_generation_result_text, format_health_json,
    format_health_text, format_history_item_json, format_history_item_text,
    format_history_list_json, format_history_list_text, format_platforms_json,
    format_platforms_text, format_progress_line, format_publish_response_text,
    format_publish_status_json, format_publish_status_text, format_section_heading,
    format_status_json, format_status_text, format_tones_json, format_tones_text,
};
pub use route::RunContext;
