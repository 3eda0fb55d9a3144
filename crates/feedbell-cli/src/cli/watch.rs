use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Result};
use feedbell_core::{NavigationTarget, Navigator, NotificationController, TabMode, UserId};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::render::render_panel;

/// Line commands accepted on stdin while watching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    Tab(TabMode),
    More,
    Expand,
    Collapse,
    Open(String),
    MarkAll,
    Dismiss,
    Reload,
    Quit,
}

impl FromStr for WatchCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            bail!("empty command");
        };
        let arg = parts.next();

        let command = match (verb.to_ascii_lowercase().as_str(), arg) {
            ("tab", Some(mode)) => WatchCommand::Tab(mode.parse().map_err(anyhow::Error::msg)?),
            ("tab", None) => bail!("usage: tab unread|read"),
            ("more", _) => WatchCommand::More,
            ("expand", _) => WatchCommand::Expand,
            ("collapse", _) => WatchCommand::Collapse,
            ("open", Some(id)) => WatchCommand::Open(id.to_string()),
            ("open", None) => bail!("usage: open <id>"),
            ("all", _) => WatchCommand::MarkAll,
            ("dismiss", _) => WatchCommand::Dismiss,
            ("reload", _) => WatchCommand::Reload,
            ("quit", _) | ("q", _) | ("exit", _) => WatchCommand::Quit,
            (other, _) => bail!("unknown command: {}", other),
        };
        Ok(command)
    }
}

/// Navigator for the terminal: prints the route that would be opened
#[derive(Debug, Default)]
pub struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn navigate(&self, target: &NavigationTarget) {
        println!("→ {}", target.path());
    }
}

/// Live panel: starts the session, re-renders on every snapshot and runs
/// stdin commands until `quit` or end of input. Tears the session down on exit.
pub async fn run_watch(controller: Arc<NotificationController>, user: UserId) -> Result<()> {
    let mut snapshots = controller.store().subscribe();
    controller.set_session(Some(user)).await;
    print_panel(&controller);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                print_panel(&controller);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<WatchCommand>() {
                    Ok(WatchCommand::Quit) => break,
                    Ok(command) => {
                        execute(&controller, command).await;
                        print_panel(&controller);
                    }
                    Err(e) => eprintln!("{}", e),
                }
            }
        }
    }

    controller.set_session(None).await;
    Ok(())
}

async fn execute(controller: &Arc<NotificationController>, command: WatchCommand) {
    tracing::debug!(?command, "watch command");
    match command {
        WatchCommand::Tab(mode) => controller.switch_tab(mode).await,
        WatchCommand::More => {
            if !controller.load_more().await {
                eprintln!("Nothing more to load.");
            }
        }
        WatchCommand::Expand => {
            controller.expand().await;
        }
        WatchCommand::Collapse => controller.collapse(),
        WatchCommand::Open(id) => controller.open_item(&id).await,
        WatchCommand::MarkAll => {
            if !controller.mark_all_read().await {
                eprintln!("Nothing to mark as read.");
            }
        }
        WatchCommand::Dismiss => controller.dismiss_error(),
        WatchCommand::Reload => controller.reload().await,
        WatchCommand::Quit => {}
    }
}

fn print_panel(controller: &NotificationController) {
    println!();
    for line in render_panel(&controller.view()) {
        println!("{}", line);
    }
}
