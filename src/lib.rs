//! Zoom Kiosk - an unattended meeting endpoint.
//!
//! Joins a fixed meeting on startup, shares the screen once someone else is
//! present, enables remote control, replays the operator's recorded menu
//! preferences, and reconnects with exponential backoff when the meeting
//! drops.

pub mod automation;
pub mod capture;
pub mod commands;
pub mod config;
pub mod kiosk;
pub mod meeting;
pub mod playback;
pub mod processing;
pub mod recorder;
pub mod recovery;

use commands::{CommandOutcome, KioskCommand};
use kiosk::KioskApp;
use meeting::MockMeetingSdk;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Run the kiosk until the operator quits or the process is interrupted
pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zoom_kiosk=debug,zoom_kiosk_lib=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Zoom Kiosk v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config))
}

async fn serve(config: config::KioskConfig) -> anyhow::Result<()> {
    tracing::warn!("No vendor meeting SDK linked, running in mock mode");
    let sdk = Arc::new(MockMeetingSdk::new());
    let app = KioskApp::new(config, sdk, automation::platform_loader());

    let events = tokio::spawn(app.clone().run_events());
    app.start().await;

    tracing::info!("Type \"help\" for operator commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            // stdin closed: keep running unattended until interrupted
            tokio::signal::ctrl_c().await?;
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<KioskCommand>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        match commands::dispatch(&app, command).await {
            Ok(CommandOutcome::Reply(reply)) => println!("{}", reply),
            Ok(CommandOutcome::Quit) => break,
            Err(e) => println!("Error: {}", e),
        }
    }

    app.shutdown().await;
    events.await?;
    tracing::info!("Zoom Kiosk stopped");
    Ok(())
}
