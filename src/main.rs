//! Chat Bubble - scripted chat conversations in timed bubbles
//!
//! Plays a conversation graph as animated chat bubbles, remembers what was
//! said across sessions and routes free text to an external chat backend.
//! This binary hosts the bubbles in a terminal.

mod backend;
mod bubble;
mod config;
mod conversation;
mod history;
mod input;
mod render;

use backend::{BackendConfig, HttpChatBackend, LoggingBackend};
use bubble::{BubbleQueue, TerminalSurface};
use config::BubbleOptions;
use conversation::{ConversationGraph, ConversationNavigator, HandlerRegistry};
use history::{HistoryStore, KeyValueStorage, MemoryStorage, SqliteStorage};
use input::InputChannel;
use render::{MarkdownRenderer, NoopTypesetter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so the transcript on stdout stays readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_bubble=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let options = BubbleOptions::from_env();
    let history = Arc::new(open_history(&options));

    let queue = Arc::new(BubbleQueue::new(
        options.clone(),
        Arc::new(TerminalSurface::new()),
        Arc::new(MarkdownRenderer::default()),
        Arc::new(NoopTypesetter),
        history.clone(),
    ));

    let handlers = {
        let think = queue.clone();
        let stop = queue.clone();
        HandlerRegistry::new()
            .with_handler("think", move |_| think.think())
            .with_handler("stop", move |_| stop.stop())
    };
    let navigator = Arc::new(ConversationNavigator::new(
        queue.clone(),
        history.clone(),
        handlers,
    ));

    let channel = if options.input_enabled {
        let config = BackendConfig::from_env();
        let backend = HttpChatBackend::new(&config)?;
        tracing::info!(endpoint = %backend.endpoint(), "Free input enabled");
        Some(Arc::new(InputChannel::new(
            navigator.clone(),
            queue.clone(),
            Arc::new(LoggingBackend::new(Arc::new(backend))),
        )))
    } else {
        None
    };

    queue.restore(&history.snapshot()).await;

    // A malformed start turn is logged by the navigator
    let _ = navigator.talk(load_script(), None);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            let (key, content) = match command.split_once(' ') {
                Some((key, content)) => (key, Some(content.trim())),
                None => (command, None),
            };
            let _ = navigator.answer(key, content);
        } else if let Ok(number) = line.parse::<usize>() {
            let picked = match queue.open_choice_set() {
                Some(id) if number > 0 => navigator.pick(id, number - 1),
                _ => Ok(None),
            };
            if matches!(picked, Ok(None)) {
                tracing::warn!(choice = number, "No open choice with that number");
            }
        } else if let Some(channel) = &channel {
            let channel = channel.clone();
            let text = line.to_string();
            tokio::spawn(async move {
                // Failures are logged where they happen
                let _ = channel.submit(&text).await;
            });
        } else {
            tracing::warn!("Free input is disabled; set CHAT_BUBBLE_INPUT=1 to enable it");
        }
    }

    // Let the last bubble finish before exiting
    while queue.in_flight().is_some() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    Ok(())
}

/// Interaction history backed by SQLite, or in memory when the database
/// cannot be opened
fn open_history(options: &BubbleOptions) -> HistoryStore {
    if options.recall_interactions == 0 {
        return HistoryStore::disabled();
    }

    let db_path = std::env::var("CHAT_BUBBLE_DB_PATH").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.chat-bubble/history.db")
    });

    let storage: Arc<dyn KeyValueStorage> = match open_sqlite(&db_path) {
        Ok(storage) => {
            tracing::info!(path = %db_path, "Opened history database");
            Arc::new(storage)
        }
        Err(e) => {
            tracing::warn!(path = %db_path, error = %e, "History database unavailable, keeping history in memory");
            Arc::new(MemoryStorage::new())
        }
    };
    HistoryStore::open(storage, options.recall_interactions)
}

fn open_sqlite(path: &str) -> Result<SqliteStorage, Box<dyn std::error::Error>> {
    if let Some(parent) = PathBuf::from(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(SqliteStorage::open(path)?)
}

/// Conversation graph from `CHAT_BUBBLE_SCRIPT`, empty when unset or unreadable
fn load_script() -> ConversationGraph {
    let Ok(path) = std::env::var("CHAT_BUBBLE_SCRIPT") else {
        return ConversationGraph::new();
    };
    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| ConversationGraph::from_json(&json).map_err(|e| e.to_string()));
    match parsed {
        Ok(graph) => {
            tracing::info!(path = %path, turns = graph.len(), "Loaded conversation script");
            graph
        }
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Failed to load conversation script");
            ConversationGraph::new()
        }
    }
}
