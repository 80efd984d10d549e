//! Plain-text export of a generation result.

use crate::types::GenerationResult;

/// Human-readable duration: seconds below a minute, otherwise minutes and seconds.
pub fn format_execution_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0.0s".to_string();
    }
    if seconds < 60.0 {
        return format!("{:.1}s", seconds);
    }
    let whole = seconds.round() as u64;
    format!("{}m {}s", whole / 60, whole % 60)
}

/// Report with topic, research, content and image path.
pub fn export_text(result: &GenerationResult, generated: &str) -> String {
    let research = result
        .research_points
        .iter()
        .enumerate()
        .map(|(i, point)| format!("{}. {}", i + 1, point))
        .collect::<Vec<_>>()
        .join("\n");
    let mut out = format!(
        "Topic: {}\nPlatform: {}\nTone: {}\nGenerated: {}\nExecution Time: {}\n\n\
         RESEARCH INSIGHTS:\n{}\n\nGENERATED CONTENT:\n{}\n\nWord Count: {}\n",
        result.topic,
        result.platform,
        result.tone,
        generated,
        format_execution_time(result.execution_time_seconds),
        research,
        result.content,
        result.word_count,
    );
    if let Some(image) = &result.image_path {
        out.push_str(&format!("Image: {}\n", image));
    }
    out
}

/// `content_<topic>_<millis>.txt`, topic lowercased with whitespace runs as `_`.
pub fn export_filename(topic: &str, millis: i64) -> String {
    let slug = topic
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();
    format!("content_{}_{}.txt", slug, millis)
}
