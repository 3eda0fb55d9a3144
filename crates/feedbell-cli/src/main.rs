use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feedbell_cli::cli::{render_item, run_watch, CliConfig, PrintNavigator};
use feedbell_core::api::PageRequest;
use feedbell_core::tracing_setup::init_tracing;
use feedbell_core::{
    ClientNotificationItem, Cursor, HttpNotificationApi, HttpPushTransport, NotificationApi,
    NotificationController, StaticSession, TabMode, UserId,
};

#[derive(Parser)]
#[command(name = "feedbell")]
#[command(about = "Notification feed and unread badge for the recipe community")]
struct Cli {
    /// Path to JSON config file (baseUrl, token, userId, ...)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Override the configured user id
    #[arg(long, short = 'u')]
    user: Option<String>,

    /// Print raw JSON instead of formatted lines
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Live panel: push + polling, commands on stdin
    Watch,

    /// Fetch one page of notifications
    List {
        /// Which partition to list (unread or read)
        #[arg(long, short = 't', default_value = "unread")]
        tab: TabMode,
        /// Page size (defaults to the configured pageSize)
        #[arg(long, short = 's')]
        size: Option<usize>,
        /// Continue after this notification id
        #[arg(long)]
        cursor: Option<String>,
    },

    /// Print the unread badge count
    Count,

    /// Mark one notification as read
    Read {
        /// Notification id
        id: String,
    },

    /// Mark every notification as read
    ReadAll,
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = CliConfig::resolve(cli.config.as_deref())?.apply_env();
    if let Some(user) = cli.user {
        config.user_id = Some(user);
    }

    let session = Arc::new(StaticSession::default());
    session.set_token(config.token.clone());
    let api = Arc::new(HttpNotificationApi::new(config.core.clone(), session.clone()));

    match cli.command {
        Commands::Watch => {
            let user = UserId::new(config.require_user_id()?);
            let controller = NotificationController::new(
                config.core.clone(),
                api,
                Arc::new(HttpPushTransport::new(session)),
                Arc::new(PrintNavigator),
            );
            run_watch(controller, user).await?;
        }
        Commands::List { tab, size, cursor } => {
            let size = size.unwrap_or(config.core.page_size);
            let request = match cursor {
                Some(cursor) => PageRequest::after(tab, size, Cursor::new(cursor)),
                None => PageRequest::first(tab, size),
            };
            let records = api
                .list_page(&request)
                .await
                .context("Failed to list notifications")?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                let returned = records.len();
                let last = records.last().map(|r| r.id.clone());
                for record in records {
                    println!("{}", render_item(&ClientNotificationItem::from(record)));
                }
                if feedbell_core::models::has_next_page(returned, size) {
                    if let Some(last) = last {
                        println!("… more available (--cursor {})", last);
                    }
                }
            }
        }
        Commands::Count => {
            let count = api
                .unread_count()
                .await
                .context("Failed to fetch unread count")?;
            if cli.json {
                println!("{}", serde_json::json!({ "unreadCount": count }));
            } else {
                println!("{}", count);
            }
        }
        Commands::Read { id } => {
            api.mark_read(&id)
                .await
                .with_context(|| format!("Failed to mark {} as read", id))?;
            println!("Marked {} as read", id);
        }
        Commands::ReadAll => {
            api.mark_all_read()
                .await
                .context("Failed to mark all notifications as read")?;
            println!("Marked all notifications as read");
        }
    }

    Ok(())
}
