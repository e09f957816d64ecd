//! Project commands.

use clap::Subcommand;

use wl_core::config::ConfigHandle;
use wl_core::error::WlResult;

use crate::context::AppContext;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ProjectsAction {
    /// List projects.
    List {
        /// Only projects of this team.
        #[arg(short, long)]
        team: Option<i64>,
    },
}

pub async fn run(config: ConfigHandle, action: ProjectsAction, format: OutputFormat) -> WlResult<()> {
    let ctx = AppContext::init(&config, format).await?;
    ctx.require_login()?;

    match action {
        ProjectsAction::List { team } => {
            let projects = ctx.request(ctx.api.list_projects(team).await).await?;
            match format {
                OutputFormat::Json => super::print_json(&projects),
                OutputFormat::Text => {
                    if projects.is_empty() {
                        println!("No projects found.");
                        return Ok(());
                    }
                    let mut table =
                        super::new_table(&["ID", "Name", "Team", "Status", "Progress", "Tasks", "Ends"]);
                    for p in &projects {
                        table.add_row(vec![
                            p.id.to_string(),
                            super::truncate(&p.name, 36),
                            super::or_dash(p.team_name.as_deref()),
                            p.status.clone(),
                            format!("{:.0}%", p.progress),
                            super::or_dash(p.task_count),
                            super::short_time(p.end_date.as_deref()),
                        ]);
                    }
                    println!("{table}");
                }
            }
        }
    }

    Ok(())
}
