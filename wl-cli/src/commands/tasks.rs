//! Task commands.

use clap::Subcommand;
use console::style;

use wl_core::config::ConfigHandle;
use wl_core::error::WlResult;
use wl_models::models::task::TaskFilter;
use wl_models::{Task, TaskStatus};

use crate::context::AppContext;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum TasksAction {
    /// List tasks.
    List {
        /// Only tasks with this status (pending, assigned, in_progress, review, completed, cancelled).
        #[arg(short, long)]
        status: Option<String>,
        /// Only tasks in this team.
        #[arg(short, long)]
        team: Option<i64>,
        /// Only tasks in this project.
        #[arg(short, long)]
        project: Option<i64>,
        /// Only tasks assigned to this user ID.
        #[arg(short, long)]
        assignee: Option<i64>,
        /// Search titles and descriptions.
        #[arg(long)]
        search: Option<String>,
        /// Page number (1-based).
        #[arg(long, default_value = "1")]
        page: u32,
        /// Page size.
        #[arg(short = 'n', long, default_value = "20")]
        size: u32,
    },
    /// Show one task.
    Get {
        /// Task ID.
        id: i64,
    },
    /// Move a task to a new status.
    Status {
        /// Task ID.
        id: i64,
        /// New status.
        status: String,
    },
}

pub async fn run(config: ConfigHandle, action: TasksAction, format: OutputFormat) -> WlResult<()> {
    let ctx = AppContext::init(&config, format).await?;
    ctx.require_login()?;

    match action {
        TasksAction::List {
            status,
            team,
            project,
            assignee,
            search,
            page,
            size,
        } => {
            let filter = TaskFilter {
                team_id: team,
                project_id: project,
                status: status.as_deref().map(str::parse::<TaskStatus>).transpose()?,
                assignee_id: assignee,
                search,
                page: Some(page.max(1)),
                page_size: Some(size),
            };
            let pb = super::spinner("Loading tasks...");
            let result = ctx.api.list_tasks(&filter).await;
            pb.finish_and_clear();
            let (tasks, total) = ctx.request(result).await?;

            match format {
                OutputFormat::Json => super::print_json(&serde_json::json!({
                    "items": tasks,
                    "total": total,
                })),
                OutputFormat::Text => {
                    if tasks.is_empty() {
                        println!("No tasks found.");
                        return Ok(());
                    }
                    let mut table =
                        super::new_table(&["ID", "Title", "Status", "Priority", "Assignee", "Due"]);
                    for task in &tasks {
                        table.add_row(vec![
                            task.id.to_string(),
                            super::truncate(&task.title, 40),
                            status_label(task),
                            super::or_dash(task.priority.as_deref()),
                            super::or_dash(task.assignee_name()),
                            super::short_time(task.due_date.as_deref()),
                        ]);
                    }
                    println!("{table}");
                    println!("  {} of {total} task(s), page {}", tasks.len(), page.max(1));
                }
            }
        }
        TasksAction::Get { id } => {
            let task = ctx.request(ctx.api.get_task(id).await).await?;
            match format {
                OutputFormat::Json => super::print_json(&task),
                OutputFormat::Text => print_task(&task),
            }
        }
        TasksAction::Status { id, status } => {
            let status: TaskStatus = status.parse()?;
            let task = ctx.request(ctx.api.update_task_status(id, status).await).await?;
            match format {
                OutputFormat::Json => super::print_json(&task),
                OutputFormat::Text => {
                    println!(
                        "  {} Task #{} \"{}\" is now {}",
                        style("OK").green().bold(),
                        task.id,
                        task.title,
                        status_label(&task)
                    );
                }
            }
        }
    }

    Ok(())
}

fn status_label(task: &Task) -> String {
    match task.status() {
        Some(TaskStatus::Completed) => style("completed").green().to_string(),
        Some(TaskStatus::Cancelled) => style("cancelled").dim().to_string(),
        Some(TaskStatus::InProgress) => style("in_progress").cyan().to_string(),
        Some(TaskStatus::Review) => style("review").magenta().to_string(),
        Some(other) => other.to_string(),
        None => task.status_raw.clone(),
    }
}

fn print_task(task: &Task) {
    println!("{} {}", style(format!("#{}", task.id)).dim(), style(&task.title).bold());
    println!("  Status:    {}", status_label(task));
    println!("  Priority:  {}", super::or_dash(task.priority.as_deref()));
    println!("  Type:      {}", super::or_dash(task.task_type.as_deref()));
    println!("  Assignee:  {}", super::or_dash(task.assignee_name()));
    println!("  Team:      {}", super::or_dash(task.team_id));
    println!("  Project:   {}", super::or_dash(task.project_id));
    println!("  Due:       {}", super::short_time(task.due_date.as_deref()));
    if let Some(hours) = task.estimated_hours {
        println!(
            "  Hours:     {:.1} estimated, {:.1} spent",
            hours,
            task.actual_hours.unwrap_or(0.0)
        );
    }
    println!("  Created:   {}", super::short_time(task.created_at.as_deref()));
    if let Some(desc) = task.description.as_deref().filter(|d| !d.is_empty()) {
        println!();
        println!("{desc}");
    }
}
