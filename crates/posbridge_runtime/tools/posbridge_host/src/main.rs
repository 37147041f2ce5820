use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use posbridge_host::config::Config;
use posbridge_host::host::{Host, HostLine};
use posbridge_host::sim::SimProvider;
use posbridge_runtime::lifecycle::{CoordinatorConfig, LifecycleCoordinator};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_args();
    info!(
        owner = %config.owner,
        period_ms = config.period.as_millis() as u64,
        floor = config.floor.as_deref().unwrap_or("-"),
        "starting positioning bridge host"
    );

    let provider = SimProvider::new(config.period, config.floor.clone());
    let coordinator = Arc::new(
        LifecycleCoordinator::new(
            provider,
            CoordinatorConfig {
                owner: config.owner.clone(),
            },
        )
        .context("build lifecycle coordinator")?,
    );

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<HostLine>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = out_rx.recv().await {
            let mut text = match serde_json::to_string(&line) {
                Ok(text) => text,
                Err(e) => {
                    warn!("failed to encode output line: {e}");
                    continue;
                }
            };
            text.push('\n');
            if stdout.write_all(text.as_bytes()).await.is_err() {
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    let host = Host::new(Arc::clone(&coordinator), out_tx.clone());
    if config.auto_listen {
        host.listen().context("subscribe to event stream")?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("read stdin")? else {
                    info!("stdin closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let _ = out_tx.send(host.handle_line(&line));
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    coordinator.teardown();
    drop(host);
    drop(out_tx);
    let _ = writer.await;

    info!("positioning bridge host exited");
    Ok(())
}
