//! Login, logout and whoami.

use console::style;
use dialoguer::{Input, Password};
use tracing::warn;

use wl_core::config::ConfigHandle;
use wl_core::error::{WlError, WlResult};
use wl_models::{User, UserProfile};

use crate::context::AppContext;
use crate::OutputFormat;

/// Log in, prompting for anything not given on the command line.
pub async fn login(
    config: ConfigHandle,
    username: Option<String>,
    password: Option<String>,
    format: OutputFormat,
) -> WlResult<()> {
    let ctx = AppContext::init(&config, format).await?;

    let username = match username {
        Some(u) => u,
        None => Input::<String>::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(|e| WlError::Internal(e.to_string()))?,
    };
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(|e| WlError::Internal(e.to_string()))?,
    };

    let pb = super::spinner(&format!("Logging in to {}...", ctx.api.api_root()));
    let result = ctx.api.login(&username, &password).await;
    pb.finish_and_clear();
    let response = ctx.request(result).await?;

    ctx.gate.set_session(&response).await?;

    // Older servers return only the token.
    let profile = match ctx.gate.profile()? {
        Some(profile) => profile,
        None => {
            let user = ctx.request(ctx.api.current_user().await).await?;
            let profile = UserProfile::from(&user);
            ctx.gate.save_profile(&profile)?;
            profile
        }
    };

    match format {
        OutputFormat::Json => super::print_json(&profile),
        OutputFormat::Text => {
            println!(
                "  {} Logged in as {} ({})",
                style("OK").green().bold(),
                style(&profile.username).bold(),
                profile.role
            );
        }
    }
    Ok(())
}

/// Tell the server, then forget the local session whatever it answered.
pub async fn logout(config: ConfigHandle, format: OutputFormat) -> WlResult<()> {
    let ctx = AppContext::init(&config, format).await?;
    let was_logged_in = ctx.gate.has_credential();
    if was_logged_in {
        if let Err(e) = ctx.api.logout().await {
            warn!("server logout failed: {e}");
        }
        ctx.gate.clear().await?;
    }

    match format {
        OutputFormat::Json => super::print_json(&serde_json::json!({ "logged_out": was_logged_in })),
        OutputFormat::Text if was_logged_in => {
            println!("  {} Logged out.", style("OK").green().bold());
        }
        OutputFormat::Text => println!("Not logged in."),
    }
    Ok(())
}

pub async fn whoami(config: ConfigHandle, format: OutputFormat) -> WlResult<()> {
    let ctx = AppContext::init(&config, format).await?;
    ctx.require_login()?;

    let user = ctx.request(ctx.api.current_user().await).await?;
    match format {
        OutputFormat::Json => super::print_json(&user),
        OutputFormat::Text => print_user(&user),
    }
    Ok(())
}

fn print_user(user: &User) {
    println!("{}", style("User").bold().underlined());
    println!("  ID:       {}", user.id);
    println!("  Username: {}", user.username);
    println!("  Email:    {}", user.email);
    println!("  Role:     {}", user.role);
    println!(
        "  Active:   {}",
        if user.is_active {
            style("yes").green().to_string()
        } else {
            style("no").red().to_string()
        }
    );
    if let (Some(start), Some(end)) = (&user.work_hours_start, &user.work_hours_end) {
        println!("  Hours:    {start} - {end}");
    }
    if let Some(enabled) = user.reminder_enabled {
        println!(
            "  Reminder: {}{}",
            if enabled { "on" } else { "off" },
            user.reminder_interval
                .map(|m| format!(" (every {m} min)"))
                .unwrap_or_default()
        );
    }
}
