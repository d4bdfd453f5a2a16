//! LCU Companion - фоновая часть помощника для выбора чемпионов
//!
//! UI общается с процессом построчно через stdin/stdout:
//! - запрос: `{"op": "fetchSession"}`
//! - ответ: `{"op": "fetchSession", "result": ...}` (null при неудаче)
//! - событие: `{"event": "clientLost"}`
//!
//! Логи пишутся в stderr, чтобы не мешать протоколу.

use std::sync::Arc;

use env_logger::Builder;
use log::{error, info, warn, LevelFilter};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::broadcast::error::RecvError;

use lcu_companion::{commands, AppState, CompanionConfig};

async fn write_line(out: &mut Stdout, value: &Value) -> std::io::Result<()> {
    let mut line = value.to_string();
    line.push('\n');
    out.write_all(line.as_bytes()).await?;
    out.flush().await
}

#[tokio::main]
async fn main() {
    // Если .env нет — просто продолжаем.
    let _ = dotenvy::dotenv();

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("lcu_companion", LevelFilter::Debug)
        .parse_default_env()
        .init();

    info!("LCU Companion v{} starting...", env!("CARGO_PKG_VERSION"));

    let cfg = CompanionConfig::from_env();
    let state = match AppState::from_config(&cfg) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to set up HTTP clients: {}", e);
            std::process::exit(1);
        }
    };

    let mut events = state.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let outgoing = tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => None,
                Ok(Some(line)) => Some(commands::handle_line(&state, &line).await),
                Ok(None) => {
                    info!("stdin closed, shutting down");
                    break;
                }
                Err(e) => {
                    error!("Failed to read request: {}", e);
                    break;
                }
            },
            event = events.recv() => match event {
                Ok(event) => serde_json::to_value(&event).ok(),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Dropped {} events", skipped);
                    None
                }
                Err(RecvError::Closed) => break,
            },
        };

        if let Some(value) = outgoing {
            if let Err(e) = write_line(&mut stdout, &value).await {
                error!("Failed to write to stdout: {}", e);
                break;
            }
        }
    }
}
