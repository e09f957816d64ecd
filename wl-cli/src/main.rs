//! WorkLog CLI - command-line client for the WorkLog team server.
//!
//! Logs in, browses tasks, projects, teams, work logs and the message inbox,
//! and can stay connected to the realtime channel to print notifications as
//! they arrive.

mod commands;
mod context;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing::{debug, info, warn};

use wl_core::config::{AppConfig, ConfigHandle};
use wl_core::error::WlResult;
use wl_core::logging;

/// WorkLog - team task and work-log client.
#[derive(Parser)]
#[command(
    name = "worklog",
    version,
    about = "WorkLog team client CLI",
    long_about = "A command-line interface for the WorkLog team server.\n\
                   Log in, manage tasks and work logs, and receive realtime notifications."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session.
    Login {
        /// Username (prompted when omitted).
        #[arg(short, long)]
        username: Option<String>,
        /// Password (prompted when omitted).
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Log out and forget the stored session.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Show configuration, session and server status.
    Status,
    /// Stay connected and print realtime notifications until Ctrl+C.
    Listen,
    /// List and update tasks.
    Tasks {
        #[command(subcommand)]
        action: commands::tasks::TasksAction,
    },
    /// List projects.
    Projects {
        #[command(subcommand)]
        action: commands::projects::ProjectsAction,
    },
    /// List teams and their members.
    Teams {
        #[command(subcommand)]
        action: commands::teams::TeamsAction,
    },
    /// List work logs.
    #[command(name = "worklogs")]
    WorkLogs {
        #[command(subcommand)]
        action: commands::worklogs::WorkLogsAction,
    },
    /// Read the message inbox.
    Messages {
        #[command(subcommand)]
        action: commands::messages::MessagesAction,
    },
    /// View and modify the configuration file.
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        debug!("command failed: {e:?}");
        eprintln!("{} {e}", style("error:").red().bold());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> WlResult<()> {
    // Load configuration
    let config_path = match cli.config.as_deref() {
        Some(path) => PathBuf::from(path),
        None => AppConfig::default_config_path()?,
    };
    let config = if config_path.exists() {
        AppConfig::load_from_file(&config_path)?
    } else {
        AppConfig::default()
    };

    // Initialize logging
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let _guard = match config
        .effective_log_dir()
        .and_then(|dir| logging::init_logging(&log_level, &dir, config.logging.json_output))
    {
        Ok(guard) => Some(guard),
        Err(e) => {
            logging::init_console_logging(&log_level);
            warn!("file logging disabled: {e}");
            None
        }
    };

    let config_handle = ConfigHandle::new(config);

    info!("WorkLog CLI v{}", wl_core::constants::APP_VERSION);

    // Dispatch to command handlers
    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(config_handle, username, password, cli.format).await
        }
        Commands::Logout => commands::auth::logout(config_handle, cli.format).await,
        Commands::Whoami => commands::auth::whoami(config_handle, cli.format).await,
        Commands::Status => commands::status::run(config_handle, cli.format).await,
        Commands::Listen => commands::listen::run(config_handle, cli.format).await,
        Commands::Tasks { action } => {
            commands::tasks::run(config_handle, action, cli.format).await
        }
        Commands::Projects { action } => {
            commands::projects::run(config_handle, action, cli.format).await
        }
        Commands::Teams { action } => {
            commands::teams::run(config_handle, action, cli.format).await
        }
        Commands::WorkLogs { action } => {
            commands::worklogs::run(config_handle, action, cli.format).await
        }
        Commands::Messages { action } => {
            commands::messages::run(config_handle, action, cli.format).await
        }
        Commands::Config { action } => {
            commands::config::run(config_handle, &config_path, action, cli.format).await
        }
    }
}
