//! docchat
//!
//! Entry point for the terminal document chat client.

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use docchat::api::HttpApi;
use docchat::app::{App, AppEvent, forward_input};
use docchat::config::AppConfig;
use docchat::telemetry;
use docchat::term::Terminal;
use docchat::ui::{Notifications, Shell};

/// How often expired notifications are pruned.
const TICK_INTERVAL: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = AppConfig::load().context("Failed to load configuration")?;
    telemetry::init(&config.log, config.ui.color);
    if !config.ui.color {
        colored::control::set_override(false);
    }

    let api = HttpApi::from_config(&config.api).context("Invalid server configuration")?;
    info!(
        name: "api.config.loaded",
        upload_url = %api.upload_url(),
        chat_url = %api.chat_url(),
        "Server endpoints resolved"
    );

    let notifications =
        Notifications::with_ttl(Duration::from_millis(config.ui.notification_ttl_ms));
    let (app, events) = App::new(Shell::new(notifications), Arc::new(api));

    // Blocking reads live on their own thread so quitting never waits on stdin.
    let input = app.sender();
    std::thread::spawn(move || forward_input(std::io::stdin().lock(), &input));

    let ticks = app.sender();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        loop {
            interval.tick().await;
            if ticks.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });

    if let Some(document) = config.document.clone() {
        let _ = app.sender().send(AppEvent::Drop(vec![document]));
    }

    let mut terminal = Terminal::new(std::io::stdout(), config.ui.width);
    app.run(events, &mut terminal)
        .await
        .context("Failed to write to the terminal")?;

    info!(name: "app.exited", "Client exited");
    Ok(())
}
