//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::backend::{check_once, platforms_or_fallback, tones_or_fallback, BackendApi, BackendClient};
use crate::cli::parse::{Commands, HistoryCommands, PublishCommands};
use crate::cli::presentation::{
    format_generation_result_json, format_generation_result_text, format_health_json,
    format_health_text, format_history_item_json, format_history_item_text,
    format_history_list_json, format_history_list_text, format_platforms_json,
    format_platforms_text, format_progress_line, format_publish_response_text,
    format_publish_status_json, format_publish_status_text, format_status_json,
    format_status_text, format_tones_json, format_tones_text,
};
use crate::cli::{command_name, uses_history};
use crate::config::{ConfigLoader, QuillConfig};
use crate::error::{ApiError, StorageError};
use crate::history::{HistoryCache, HistoryItem, SledHistoryBackend};
use crate::publish::PublishingClient;
use crate::session::{GenerationSessionController, WsConnector};
use crate::types::{GenerationRequest, GenerationResult, Visibility};

const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Runtime context for CLI execution: workspace, loaded config and the async runtime.
pub struct RunContext {
    workspace_root: PathBuf,
    config: QuillConfig,
    runtime: tokio::runtime::Runtime,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Self::from_config(workspace_root, config)
    }

    /// Create run context from an already loaded configuration.
    pub fn from_config(workspace_root: PathBuf, config: QuillConfig) -> Result<Self, ApiError> {
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create runtime: {}", e)))?;

        Ok(Self {
            workspace_root,
            config,
            runtime,
        })
    }

    pub fn config(&self) -> &QuillConfig {
        &self.config
    }

    /// History store location; relative paths resolve against the workspace root.
    pub fn history_path(&self) -> PathBuf {
        let path = &self.config.history.store_path;
        if path.is_absolute() {
            path.clone()
        } else {
            self.workspace_root.join(path)
        }
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let name = command_name(command);
        let started = Instant::now();
        debug!(command = %name, "Executing command");
        let result = self.execute_inner(command);
        info!(
            command = %name,
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        let mut history = if uses_history(command) {
            Some(self.open_history()?)
        } else {
            None
        };

        match command {
            Commands::Generate {
                topic,
                platform,
                tone,
                sync,
                no_history: _,
                format,
            } => {
                let request = GenerationRequest::new(topic.clone(), platform.clone(), tone.clone());
                self.handle_generate(request, *sync, format, history.as_mut())
            }
            Commands::History { command } => match history.as_mut() {
                Some(history) => self.handle_history_command(command, history),
                None => Err(ApiError::ConfigError("History store is not open".to_string())),
            },
            Commands::Platforms { format } => {
                let backend = self.backend()?;
                let platforms = self.runtime.block_on(platforms_or_fallback(backend.as_ref()));
                if format == "json" {
                    format_platforms_json(&platforms)
                } else {
                    Ok(format_platforms_text(&platforms))
                }
            }
            Commands::Tones { format } => {
                let backend = self.backend()?;
                let tones = self.runtime.block_on(tones_or_fallback(backend.as_ref()));
                if format == "json" {
                    format_tones_json(&tones)
                } else {
                    Ok(format_tones_text(&tones))
                }
            }
            Commands::Health { format } => {
                let backend = self.backend()?;
                let snapshot = self.runtime.block_on(check_once(backend.as_ref()));
                if format == "json" {
                    format_health_json(&snapshot)
                } else {
                    Ok(format_health_text(&snapshot))
                }
            }
            Commands::Status { format } => {
                let backend = self.backend()?;
                let snapshot = self.runtime.block_on(check_once(backend.as_ref()));
                if format == "json" {
                    format_status_json(&snapshot)
                } else {
                    Ok(format_status_text(&snapshot))
                }
            }
            Commands::Publish { command } => self.handle_publish_command(command, history.as_ref()),
        }
    }

    fn backend(&self) -> Result<Arc<BackendClient>, ApiError> {
        Ok(Arc::new(BackendClient::new(&self.config.backend)?))
    }

    fn open_history(&self) -> Result<HistoryCache<SledHistoryBackend>, ApiError> {
        let path = self.history_path();
        std::fs::create_dir_all(&path).map_err(StorageError::IoError)?;
        let backend = SledHistoryBackend::open(&path)?;
        let mut cache = HistoryCache::with_capacity(backend, self.config.history.capacity);
        cache.load();
        Ok(cache)
    }

    fn handle_generate(
        &self,
        request: GenerationRequest,
        sync: bool,
        format: &str,
        history: Option<&mut HistoryCache<SledHistoryBackend>>,
    ) -> Result<String, ApiError> {
        request.validate()?;
        let show_progress = format != "json";

        let result = if sync {
            let backend = self.backend()?;
            self.runtime.block_on(backend.generate(&request))?
        } else {
            self.stream_generation(request.clone(), show_progress)?
        };

        if !result.success {
            let message = result.error.clone().unwrap_or_else(|| UNKNOWN_ERROR.to_string());
            return Err(ApiError::Backend(message));
        }

        let history_id = history.map(|history| {
            let item = HistoryItem::from_result(request, result.clone());
            let id = item.id.clone();
            history.add(item);
            id
        });

        if format == "json" {
            format_generation_result_json(&result, history_id.as_deref())
        } else {
            let mut out = format_generation_result_text(&result);
            if let Some(id) = history_id {
                out.push_str(&format!("\nSaved to history as {}", id));
            }
            Ok(out)
        }
    }

    fn stream_generation(
        &self,
        request: GenerationRequest,
        show_progress: bool,
    ) -> Result<GenerationResult, ApiError> {
        let url = self.config.stream_url();
        let state = self.runtime.block_on(async {
            let mut controller = GenerationSessionController::new(WsConnector, url);
            controller.start_generation(request)?;
            let state = controller
                .run_to_completion(|session| {
                    if show_progress {
                        eprintln!("{}", format_progress_line(session));
                    }
                })
                .await;
            Ok::<_, ApiError>(state)
        })?;

        if let Some(error) = state.error {
            return Err(ApiError::Backend(error));
        }
        state.result.ok_or_else(|| {
            ApiError::Protocol("Generation stream closed before a result arrived".to_string())
        })
    }

    fn handle_history_command(
        &self,
        command: &HistoryCommands,
        history: &mut HistoryCache<SledHistoryBackend>,
    ) -> Result<String, ApiError> {
        match command {
            HistoryCommands::List { format } => {
                if format == "json" {
                    format_history_list_json(history.items())
                } else {
                    Ok(format_history_list_text(history.items()))
                }
            }
            HistoryCommands::Show { id, format } => {
                let item = find_item(history, id)?;
                if format == "json" {
                    format_history_item_json(item)
                } else {
                    Ok(format_history_item_text(item))
                }
            }
            HistoryCommands::Remove { id } => {
                if history.remove(id) {
                    Ok(format!("Removed {}", id))
                } else {
                    Ok(format!("No history item with id {}", id))
                }
            }
            HistoryCommands::Clear { force } => {
                if !*force {
                    use dialoguer::Confirm;
                    let confirmed = Confirm::new()
                        .with_prompt(format!("Remove all {} history item(s)?", history.len()))
                        .interact()
                        .map_err(|e| {
                            ApiError::ConfigError(format!("Failed to get user input: {}", e))
                        })?;
                    if !confirmed {
                        return Ok("Clear cancelled".to_string());
                    }
                }
                let count = history.len();
                history.clear();
                Ok(format!("Cleared {} history item(s)", count))
            }
            HistoryCommands::Export { id, output } => {
                let item = find_item(history, id)?;
                let path = output
                    .clone()
                    .unwrap_or_else(|| self.workspace_root.join(item.export_filename()));
                write_export(&path, &item.export_text())?;
                Ok(format!("Exported {} to {}", id, path.display()))
            }
        }
    }

    fn handle_publish_command(
        &self,
        command: &PublishCommands,
        history: Option<&HistoryCache<SledHistoryBackend>>,
    ) -> Result<String, ApiError> {
        let client = PublishingClient::new(self.backend()?);
        match command {
            PublishCommands::Status { format } => {
                let state = self.runtime.block_on(client.check_status());
                if format == "json" {
                    format_publish_status_json(&state)
                } else {
                    Ok(format_publish_status_text(&state))
                }
            }
            PublishCommands::Post {
                content,
                from_history,
                image,
                visibility,
            } => {
                let visibility: Visibility = visibility.parse()?;
                let (content, image) = match (from_history, history) {
                    (Some(id), Some(history)) => {
                        let item = find_item(history, id)?;
                        (
                            item.response.content.clone(),
                            image.clone().or_else(|| item.response.image_path.clone()),
                        )
                    }
                    _ => (content.clone().unwrap_or_default(), image.clone()),
                };

                let status = self.runtime.block_on(client.check_status());
                if !status.is_configured {
                    warn!("Publishing requested but integration is not configured");
                    return Err(ApiError::Backend(
                        status
                            .posting_error
                            .unwrap_or_else(|| "LinkedIn publishing is not configured".to_string()),
                    ));
                }

                let response = self.runtime.block_on(client.publish(
                    &content,
                    image.as_deref(),
                    visibility,
                ));
                if response.success {
                    Ok(format_publish_response_text(&response))
                } else {
                    Err(ApiError::Backend(
                        response
                            .error
                            .unwrap_or_else(|| crate::publish::POST_FAILED.to_string()),
                    ))
                }
            }
        }
    }
}

fn find_item<'a>(
    history: &'a HistoryCache<SledHistoryBackend>,
    id: &str,
) -> Result<&'a HistoryItem, ApiError> {
    history
        .get(id)
        .ok_or_else(|| ApiError::NotFound(format!("History item {}", id)))
}

fn write_export(path: &Path, text: &str) -> Result<(), ApiError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(StorageError::IoError)?;
        }
    }
    std::fs::write(path, text).map_err(StorageError::IoError)?;
    Ok(())
}
