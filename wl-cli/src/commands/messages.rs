//! Message inbox commands.

use clap::Subcommand;
use console::style;

use wl_core::config::ConfigHandle;
use wl_core::error::WlResult;
use wl_models::models::message::MessageQuery;
use wl_models::Message;

use crate::context::AppContext;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum MessagesAction {
    /// List inbox messages, newest first.
    List {
        /// Only unread messages.
        #[arg(short, long)]
        unread: bool,
        /// Only messages of this type (e.g. task_assigned, worklog, system).
        #[arg(short = 't', long = "type")]
        message_type: Option<String>,
        /// Number of messages to show.
        #[arg(short = 'n', long, default_value = "20")]
        limit: u32,
        /// Messages to skip.
        #[arg(long, default_value = "0")]
        skip: u32,
    },
    /// Show a message and mark it read.
    Read {
        /// Message ID.
        id: i64,
    },
    /// Mark every message read.
    #[command(name = "read-all")]
    ReadAll {
        /// Only messages of this type.
        #[arg(short = 't', long = "type")]
        message_type: Option<String>,
    },
    /// Show the unread count.
    Unread,
}

pub async fn run(config: ConfigHandle, action: MessagesAction, format: OutputFormat) -> WlResult<()> {
    let ctx = AppContext::init(&config, format).await?;
    ctx.require_login()?;

    match action {
        MessagesAction::List {
            unread,
            message_type,
            limit,
            skip,
        } => {
            let query = MessageQuery {
                skip: Some(skip),
                limit: Some(limit),
                unread_only: unread.then_some(true),
                message_type,
            };
            let messages = ctx.request(ctx.api.list_messages(&query).await).await?;
            match format {
                OutputFormat::Json => super::print_json(&messages),
                OutputFormat::Text => {
                    if messages.is_empty() {
                        println!("No messages.");
                        return Ok(());
                    }
                    let mut table = super::new_table(&["", "ID", "Received", "Type", "From", "Title"]);
                    for msg in &messages {
                        table.add_row(vec![
                            if msg.is_read { String::new() } else { style("●").cyan().to_string() },
                            msg.id.to_string(),
                            super::short_time(msg.created_at.as_deref()),
                            msg.message_type.clone(),
                            super::or_dash(msg.sender_name.as_deref()),
                            super::truncate(&msg.title, 48),
                        ]);
                    }
                    println!("{table}");
                }
            }
        }
        MessagesAction::Read { id } => {
            let message = ctx.request(ctx.api.get_message(id).await).await?;
            if !message.is_read {
                ctx.request(ctx.api.mark_message_read(id).await).await?;
            }
            match format {
                OutputFormat::Json => super::print_json(&message),
                OutputFormat::Text => print_message(&message),
            }
        }
        MessagesAction::ReadAll { message_type } => {
            let marked = ctx
                .request(ctx.api.mark_all_messages_read(message_type.as_deref()).await)
                .await?;
            match format {
                OutputFormat::Json => super::print_json(&serde_json::json!({ "marked": marked })),
                OutputFormat::Text => {
                    println!("  {} Marked {marked} message(s) read.", style("OK").green().bold());
                }
            }
        }
        MessagesAction::Unread => {
            let count = ctx.request(ctx.api.unread_count().await).await?;
            match format {
                OutputFormat::Json => super::print_json(&serde_json::json!({ "unread": count })),
                OutputFormat::Text => println!("{count}"),
            }
        }
    }

    Ok(())
}

fn print_message(msg: &Message) {
    println!("{}", style(&msg.title).bold());
    println!(
        "  {} {} {}",
        style(super::short_time(msg.created_at.as_deref())).dim(),
        style(format!("[{}]", msg.message_type)).cyan(),
        msg.sender_name.as_deref().unwrap_or("system")
    );
    println!();
    println!("{}", msg.content);
}
