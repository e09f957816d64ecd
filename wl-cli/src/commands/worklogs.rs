//! Work log commands.

use clap::Subcommand;

use wl_core::config::ConfigHandle;
use wl_core::error::WlResult;
use wl_models::models::work_log::WorkLogFilter;

use crate::context::AppContext;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum WorkLogsAction {
    /// List work logs.
    List {
        /// Only logs of this team.
        #[arg(short, long)]
        team: Option<i64>,
        /// Only logs of this project.
        #[arg(short, long)]
        project: Option<i64>,
        /// Only logs against this task.
        #[arg(long)]
        task: Option<i64>,
        /// Earliest start date (YYYY-MM-DD).
        #[arg(long)]
        from: Option<String>,
        /// Latest start date (YYYY-MM-DD).
        #[arg(long)]
        to: Option<String>,
        /// Page number (1-based).
        #[arg(long, default_value = "1")]
        page: u32,
        /// Page size.
        #[arg(short = 'n', long, default_value = "20")]
        size: u32,
    },
}

pub async fn run(config: ConfigHandle, action: WorkLogsAction, format: OutputFormat) -> WlResult<()> {
    let ctx = AppContext::init(&config, format).await?;
    ctx.require_login()?;

    match action {
        WorkLogsAction::List {
            team,
            project,
            task,
            from,
            to,
            page,
            size,
        } => {
            let filter = WorkLogFilter {
                team_id: team,
                project_id: project,
                task_id: task,
                start_date: from,
                end_date: to,
                page: Some(page.max(1)),
                size: Some(size),
            };
            let (logs, total) = ctx.request(ctx.api.list_work_logs(&filter).await).await?;

            match format {
                OutputFormat::Json => super::print_json(&serde_json::json!({
                    "items": logs,
                    "total": total,
                })),
                OutputFormat::Text => {
                    if logs.is_empty() {
                        println!("No work logs found.");
                        return Ok(());
                    }
                    let mut table =
                        super::new_table(&["ID", "Started", "Type", "Title", "Project", "Hours", "By"]);
                    for log in &logs {
                        let title = log
                            .title
                            .clone()
                            .unwrap_or_else(|| log.content.lines().next().unwrap_or("").to_string());
                        table.add_row(vec![
                            log.id.to_string(),
                            super::short_time(log.start_time.as_deref()),
                            super::or_dash(log.work_type.as_deref()),
                            super::truncate(&title, 40),
                            super::or_dash(log.project_name.as_deref()),
                            super::or_dash(log.hours_spent.map(|h| format!("{h:.1}"))),
                            super::or_dash(log.user_name.as_deref()),
                        ]);
                    }
                    println!("{table}");
                    println!("  {} of {total} log(s), page {}", logs.len(), page.max(1));
                }
            }
        }
    }

    Ok(())
}
