//! Team commands.

use clap::Subcommand;
use console::style;

use wl_core::config::ConfigHandle;
use wl_core::error::WlResult;

use crate::context::AppContext;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum TeamsAction {
    /// List the teams you belong to.
    List,
    /// List the members of a team.
    Members {
        /// Team ID.
        team: i64,
    },
}

pub async fn run(config: ConfigHandle, action: TeamsAction, format: OutputFormat) -> WlResult<()> {
    let ctx = AppContext::init(&config, format).await?;
    ctx.require_login()?;

    match action {
        TeamsAction::List => {
            let teams = ctx.request(ctx.api.list_teams().await).await?;
            match format {
                OutputFormat::Json => super::print_json(&teams),
                OutputFormat::Text => {
                    if teams.is_empty() {
                        println!("No teams found.");
                        return Ok(());
                    }
                    let mut table = super::new_table(&["ID", "Name", "Members", "Description"]);
                    for team in &teams {
                        table.add_row(vec![
                            team.id.to_string(),
                            team.name.clone(),
                            team.members.len().to_string(),
                            super::truncate(team.description.as_deref().unwrap_or(""), 50),
                        ]);
                    }
                    println!("{table}");
                }
            }
        }
        TeamsAction::Members { team } => {
            let members = ctx.request(ctx.api.list_team_members(team).await).await?;
            match format {
                OutputFormat::Json => super::print_json(&members),
                OutputFormat::Text => {
                    if members.is_empty() {
                        println!("Team #{team} has no members.");
                        return Ok(());
                    }
                    let mut table = super::new_table(&["User ID", "Name", "Email", "Role", "Joined"]);
                    for m in &members {
                        let role = if m.is_team_admin() {
                            style(&m.role).yellow().to_string()
                        } else {
                            m.role.clone()
                        };
                        let email = m
                            .email
                            .clone()
                            .or_else(|| m.user.as_ref().map(|u| u.email.clone()));
                        table.add_row(vec![
                            m.user_id.to_string(),
                            m.display_name(),
                            super::or_dash(email),
                            role,
                            super::short_time(m.joined_at.as_deref()),
                        ]);
                    }
                    println!("{table}");
                }
            }
        }
    }

    Ok(())
}
