//! Listen command - hold the realtime connection and print what arrives.

use std::sync::Arc;

use console::style;
use tokio::sync::broadcast::error::RecvError;

use wl_core::config::ConfigHandle;
use wl_core::error::WlResult;
use wl_services::{AppEvent, NativeShell, RealtimeService, Service};
use wl_socket::{Dispatcher, SocketManager};

use crate::context::AppContext;
use crate::OutputFormat;

/// Run the listen command until Ctrl+C.
pub async fn run(config: ConfigHandle, format: OutputFormat) -> WlResult<()> {
    let ctx = AppContext::with_shell(&config, Arc::new(NativeShell::default()), format).await?;
    ctx.require_login()?;

    // Seed the counter from the server so it starts where the inbox is.
    let unread = ctx.request(ctx.api.unread_count().await).await?;

    let dispatcher = Dispatcher::new(ctx.config.socket.event_capacity);
    let socket = SocketManager::from_config(&ctx.config, dispatcher);
    let mut realtime = RealtimeService::new(
        socket,
        ctx.gate.clone(),
        ctx.presenter.clone(),
        ctx.bus.clone(),
    );
    realtime.set_unread_count(unread);

    let mut rx = ctx.bus.subscribe();
    realtime.init()?;

    if format == OutputFormat::Text {
        println!(
            "  {} Listening on {} ({unread} unread). Ctrl+C to stop.",
            style("OK").green().bold(),
            ctx.config.server.messages_socket_url()
        );
        println!();
    }

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(ev) => {
                        print_event(&ev, format);
                        if matches!(ev, AppEvent::SessionExpired | AppEvent::ConnectionFailed { .. }) {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        println!(
                            "  {} Missed {n} events (slow consumer)",
                            style("WARN").yellow()
                        );
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if format == OutputFormat::Text {
                    println!("\n  Disconnecting...");
                }
                break;
            }
        }
    }

    realtime.disconnect().await;
    realtime.shutdown()?;
    Ok(())
}

fn print_event(event: &AppEvent, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let json = match event {
                AppEvent::MessageCountUpdated { count } => {
                    serde_json::json!({"event": "message_count", "count": count})
                }
                AppEvent::TaskListRefresh => serde_json::json!({"event": "task_list_refresh"}),
                AppEvent::NotificationReceived { event } => {
                    serde_json::json!({"event": "notification", "notification": event})
                }
                AppEvent::TeamNotification { event } => {
                    serde_json::json!({"event": "team_notification", "notification": event})
                }
                AppEvent::ConnectionStateChanged { state } => {
                    serde_json::json!({"event": "connection_state", "state": state.to_string()})
                }
                AppEvent::ConnectionFailed { attempts } => {
                    serde_json::json!({"event": "connection_failed", "attempts": attempts})
                }
                AppEvent::SessionExpired => serde_json::json!({"event": "session_expired"}),
            };
            println!("{json}");
        }
        OutputFormat::Text => {
            // Notifications and connection failures already reach the
            // console through the status line.
            let now = chrono::Local::now().format("%H:%M:%S");
            match event {
                AppEvent::MessageCountUpdated { count } => {
                    println!("  {} {}", style(now).dim(), style(format!("unread: {count}")).cyan());
                }
                AppEvent::ConnectionStateChanged { state } => {
                    println!("  {} {}", style(now).dim(), style(format!("[{state}]")).dim());
                }
                AppEvent::SessionExpired => {
                    println!(
                        "  {} {} session expired, run `worklog login`",
                        style(now).dim(),
                        style("FAIL").red().bold()
                    );
                }
                AppEvent::NotificationReceived { .. }
                | AppEvent::TeamNotification { .. }
                | AppEvent::ConnectionFailed { .. }
                | AppEvent::TaskListRefresh => {}
            }
        }
    }
}
