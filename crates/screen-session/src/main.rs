//! Screen-Session: terminal front end for recording the screen and syncing
//! the recording with a remote service.

mod app;
mod app_command;
mod config;
mod error;
mod terminal_sink;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    terminal_sink::TerminalSink,
};

use crate::config::Config;

use std::sync::Arc;

use screen_session_core::{HttpRemoteSync, SessionController};
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "screen_session=info,screen_session_core=info";

/// Application entry point.
#[tokio::main]
async fn main() {
    init_tracing();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let controller = match build_controller(&config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to set up session: {:?}", e);
            std::process::exit(1);
        }
    };

    App::new(controller).run().await;
}

/// Wire the configured capture, remote client and terminal sink.
fn build_controller(config: &Config) -> AppResult<Arc<SessionController>> {
    let remote = HttpRemoteSync::new(
        config.server.base_url.clone(),
        config.server.request_timeout(),
    )?;

    Ok(Arc::new(SessionController::new(
        Arc::new(config.capture.process_capture()),
        Arc::new(remote),
        Arc::new(TerminalSink),
        config.session_config(),
    )))
}

/// Logs go to stderr so stdout stays the user interface.
///
/// `RUST_LOG` overrides the default filter; `SCREEN_SESSION_LOG_FORMAT=json`
/// switches to JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let json = std::env::var("SCREEN_SESSION_LOG_FORMAT").is_ok_and(|format| format == "json");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
