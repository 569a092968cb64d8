//! msg-enrich — stdin read loop driving the enrichment graph.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, BufReader};

use msg_enrich::completion::{CompletionPort, HttpCompletionPort};
use msg_enrich::config::EnrichConfig;
use msg_enrich::conversation::{Conversation, Turn};
use msg_enrich::enrich::standard_tasks;
use msg_enrich::graph::TaskGraph;
use msg_enrich::message::Message;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = EnrichConfig::from_env()?;

    let api_key = std::env::var("MSG_ENRICH_API_KEY").unwrap_or_else(|_| {
        eprintln!("Error: MSG_ENRICH_API_KEY not set");
        eprintln!("  export MSG_ENRICH_API_KEY=sk-...");
        std::process::exit(1);
    });

    eprintln!("📨 msg-enrich v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);
    eprintln!("   Endpoint: {}", config.base_url);
    eprintln!("   Type a message and press Enter. /quit to exit.\n");

    let port: Arc<dyn CompletionPort> = Arc::new(HttpCompletionPort::new(
        &config.base_url,
        SecretString::from(api_key),
        &config.model,
    ));

    let mut graph = TaskGraph::new();
    for task in standard_tasks(&port, &config) {
        graph.add(task);
    }

    // Shared context: the caller-visible conversation history. Tasks read it
    // at most; only this loop appends to it.
    let mut history = Conversation::new();

    let stdin = tokio::io::stdin();
    let reader = BufReader::new(stdin);
    let mut lines = reader.lines();

    eprint!("> ");
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            eprint!("> ");
            continue;
        }
        if line == "/quit" {
            break;
        }

        history.push(Turn::user(line));
        let context = Arc::new(history.clone());
        let message = Arc::new(Message::new(line));

        if let Err(e) = graph.execute_parallel(&message, &context).await {
            eprintln!("❌ {e}");
        }
        print_annotations(&message).await;
        eprint!("> ");
    }

    Ok(())
}

/// Print whatever annotations the run produced, in stable key order.
async fn print_annotations(message: &Message) {
    let mut annotations: Vec<_> = message.annotations().await.into_iter().collect();
    annotations.sort_by(|(a, _), (b, _)| a.cmp(b));

    if annotations.is_empty() {
        println!("(no annotations)");
        return;
    }
    for (key, annotation) in annotations {
        let cost = annotation
            .cost
            .map(|c| format!(" ({c} units)"))
            .unwrap_or_default();
        println!("{key}{cost}: {}", annotation.content);
    }
    println!();
}
