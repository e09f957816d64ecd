//! Config commands - view the effective configuration, point the client
//! at a server, and wipe local storage.

use std::path::Path;

use clap::Subcommand;
use console::style;
use dialoguer::Confirm;

use wl_core::config::{AppConfig, ConfigHandle, StorageConfig};
use wl_core::error::{WlError, WlResult};
use wl_models::Database;

use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration.
    Show,
    /// Set the server endpoints and save the config file.
    #[command(name = "set-server")]
    SetServer {
        /// REST API base, e.g. https://worklog.example.com/api/v1
        api_base: String,
        /// WebSocket base (scheme and host); derived from the API base when omitted.
        #[arg(long)]
        ws: Option<String>,
    },
    /// Delete everything in local storage, including the stored session.
    #[command(name = "reset-storage")]
    ResetStorage {
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn run(
    config: ConfigHandle,
    path: &Path,
    action: ConfigAction,
    format: OutputFormat,
) -> WlResult<()> {
    match action {
        ConfigAction::Show => {
            let cfg = config.read().await;
            match format {
                OutputFormat::Json => super::print_json(&*cfg),
                OutputFormat::Text => {
                    let text = toml::to_string_pretty(&*cfg)
                        .map_err(|e| WlError::Config(format!("failed to serialize config: {e}")))?;
                    println!("{}", style(format!("# {}", path.display())).dim());
                    print!("{text}");
                }
            }
        }
        ConfigAction::SetServer { api_base, ws } => {
            let mut cfg = config.write().await;
            set_server(&mut cfg, &api_base, ws.as_deref())?;
            cfg.save_to_file(path)?;

            match format {
                OutputFormat::Json => super::print_json(&cfg.server),
                OutputFormat::Text => {
                    println!("  {} Saved {}", style("OK").green().bold(), path.display());
                    println!("  API:      {}", cfg.server.api_base);
                    println!("  Realtime: {}", cfg.server.messages_socket_url());
                }
            }
        }
        ConfigAction::ResetStorage { yes } => {
            let cfg = config.snapshot().await;
            let db_path = cfg.effective_storage_path()?;
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete all local data in {}?", db_path.display()))
                    .default(false)
                    .interact()
                    .map_err(|e| WlError::Internal(e.to_string()))?;
                if !confirmed {
                    println!("Aborted.");
                    return Ok(());
                }
            }

            let removed = reset_storage(&db_path, &cfg.storage)?;
            match format {
                OutputFormat::Json => super::print_json(&serde_json::json!({ "removed": removed })),
                OutputFormat::Text => {
                    println!(
                        "  {} Removed {removed} stored key(s) from {}",
                        style("OK").green().bold(),
                        db_path.display()
                    );
                }
            }
        }
    }
    Ok(())
}

/// Open the local database and drop every stored key.
fn reset_storage(db_path: &Path, storage: &StorageConfig) -> WlResult<usize> {
    Database::init(db_path, storage)?.reset()
}

/// Install new endpoints after normalizing them.
fn set_server(config: &mut AppConfig, api_base: &str, ws_base: Option<&str>) -> WlResult<()> {
    let api_base = AppConfig::sanitize_address(api_base);
    if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
        return Err(WlError::Config(format!(
            "API base must start with http:// or https://: {api_base}"
        )));
    }
    let ws_base = ws_base.map(AppConfig::sanitize_address).unwrap_or_default();
    if !ws_base.is_empty() && !(ws_base.starts_with("ws://") || ws_base.starts_with("wss://")) {
        return Err(WlError::Config(format!(
            "WebSocket base must start with ws:// or wss://: {ws_base}"
        )));
    }

    config.server.api_base = api_base;
    config.server.ws_base = ws_base;
    Ok(())
}
