//! Generation presentation: live progress and finished results.

use owo_colors::OwoColorize;
use serde_json::json;

use super::shared::{format_section_heading, to_json};
use crate::error::ApiError;
use crate::history::format_execution_time;
use crate::session::{Session, StageStatus};
use crate::types::GenerationResult;

fn stage_marker(status: StageStatus) -> String {
    match status {
        StageStatus::Completed => format!("{}", "✓".green()),
        StageStatus::Current => format!("{}", "●".cyan()),
        StageStatus::Failed => format!("{}", "✗".red()),
        StageStatus::Pending => format!("{}", "○".dimmed()),
    }
}

/// One progress line: percentage, stage markers and current step.
pub fn format_progress_line(session: &Session) -> String {
    let view = &session.view;
    let stages = session
        .stages()
        .iter()
        .map(|(stage, status)| format!("{} {}", stage_marker(*status), stage.label()))
        .collect::<Vec<_>>()
        .join("  ");
    let step = match (&view.error, &view.current_step) {
        (Some(error), _) => format!("{}", error.red()),
        (None, Some(step)) => step.clone(),
        (None, None) => String::new(),
    };
    format!("[{:>3}%] {}  {}", view.progress, stages, step)
}

pub fn format_generation_result_text(result: &GenerationResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", format_section_heading("Generated Content")));
    out.push_str(&format!(
        "  Topic: {}\n  Platform: {}\n  Tone: {}\n  Words: {}\n  Time: {}\n\n",
        result.topic,
        result.platform,
        result.tone,
        result.word_count,
        format_execution_time(result.execution_time_seconds)
    ));
    if !result.research_points.is_empty() {
        out.push_str(&format!("{}\n", format_section_heading("Research Insights")));
        for (i, point) in result.research_points.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, point));
        }
        out.push('\n');
    }
    out.push_str(&result.content);
    out.push('\n');
    if let Some(image) = &result.image_path {
        out.push_str(&format!("\nImage: {}\n", image));
    }
    out
}

pub fn format_generation_result_json(
    result: &GenerationResult,
    history_id: Option<&str>,
) -> Result<String, ApiError> {
    to_json(&json!({ "history_id": history_id, "result": result }))
}
