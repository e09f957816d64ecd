//! Status command - show configuration, session and server status.

use std::time::Instant;

use console::style;

use wl_core::config::ConfigHandle;
use wl_core::error::WlResult;

use crate::context::AppContext;
use crate::OutputFormat;

/// Run the status command.
pub async fn run(config: ConfigHandle, format: OutputFormat) -> WlResult<()> {
    let ctx = AppContext::init(&config, format).await?;
    let profile = ctx.gate.profile()?;
    let logged_in = ctx.gate.has_credential();

    // Only an authenticated request tells us anything about the server.
    let mut latency_ms = None;
    let mut unread = None;
    let mut online_users = None;
    if logged_in {
        let start = Instant::now();
        unread = ctx.reporter.check(ctx.api.unread_count().await).await;
        latency_ms = unread.map(|_| start.elapsed().as_millis());
        if unread.is_some() {
            online_users = ctx
                .reporter
                .check(ctx.api.connection_status().await)
                .await
                .map(|s| s.connected_users.len());
        }
    }
    // A 401 above ends the session.
    let logged_in = ctx.gate.has_credential();

    let storage_path = ctx.config.effective_storage_path()?;
    let stored_keys = ctx.db.key_count()?;

    match format {
        OutputFormat::Json => {
            super::print_json(&serde_json::json!({
                "api_base": ctx.config.server.api_base,
                "socket_url": ctx.config.server.messages_socket_url(),
                "storage_path": storage_path.display().to_string(),
                "stored_keys": stored_keys,
                "logged_in": logged_in,
                "user": profile.filter(|_| logged_in),
                "server_reachable": latency_ms.is_some(),
                "latency_ms": latency_ms,
                "unread_messages": unread,
                "online_users": online_users,
            }));
        }
        OutputFormat::Text => {
            println!("{}", style("Configuration").bold().underlined());
            println!("  API:       {}", ctx.config.server.api_base);
            println!("  Realtime:  {}", ctx.config.server.messages_socket_url());
            println!("  Storage:   {} ({stored_keys} key(s))", storage_path.display());

            println!();
            println!("{}", style("Session").bold().underlined());
            match profile.filter(|_| logged_in) {
                Some(p) => {
                    println!("  User:      {} ({})", style(&p.username).bold(), p.role);
                    if !p.email.is_empty() {
                        println!("  Email:     {}", p.email);
                    }
                }
                None if logged_in => println!("  User:      {}", style("unknown").yellow()),
                None => println!("  User:      {}", style("not logged in").yellow()),
            }

            if logged_in {
                println!();
                println!("{}", style("Server").bold().underlined());
                println!(
                    "  Status:    {}",
                    match latency_ms {
                        Some(ms) => format!("{} ({ms}ms)", style("reachable").green()),
                        None => style("unreachable").red().to_string(),
                    }
                );
                if let Some(count) = unread {
                    println!("  Unread:    {count}");
                }
                if let Some(count) = online_users {
                    println!("  Online:    {count} user(s)");
                }
            }
        }
    }

    Ok(())
}
