//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::{Commands, HistoryCommands, PublishCommands};

/// Dotted command name for log fields (e.g. "history.list", "publish.post").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Generate { sync: true, .. } => "generate.sync".to_string(),
        Commands::Generate { .. } => "generate".to_string(),
        Commands::History { command } => format!("history.{}", history_command_name(command)),
        Commands::Platforms { .. } => "platforms".to_string(),
        Commands::Tones { .. } => "tones".to_string(),
        Commands::Health { .. } => "health".to_string(),
        Commands::Status { .. } => "status".to_string(),
        Commands::Publish { command } => format!("publish.{}", publish_command_name(command)),
    }
}

pub fn history_command_name(command: &HistoryCommands) -> &'static str {
    match command {
        HistoryCommands::List { .. } => "list",
        HistoryCommands::Show { .. } => "show",
        HistoryCommands::Remove { .. } => "remove",
        HistoryCommands::Clear { .. } => "clear",
        HistoryCommands::Export { .. } => "export",
    }
}

pub fn publish_command_name(command: &PublishCommands) -> &'static str {
    match command {
        PublishCommands::Post { .. } => "post",
        PublishCommands::Status { .. } => "status",
    }
}

/// Commands that need the history store.
pub fn uses_history(command: &Commands) -> bool {
    match command {
        Commands::Generate { no_history, .. } => !no_history,
        Commands::History { .. } => true,
        Commands::Publish {
            command: PublishCommands::Post { from_history, .. },
        } => from_history.is_some(),
        _ => false,
    }
}
