use crate::{AppCommand, app_command::HELP};

use screen_session_core::{
    Outcome, SessionController, SessionEvent, SessionState, ShutdownDecision,
};

use std::{
    io::{BufRead, Write},
    sync::Arc,
};

use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, instrument, warn};

/// Terminal front end for one [`SessionController`].
///
/// Reads commands from stdin, renders the elapsed-time feed while recording,
/// and routes Ctrl-C through the controller's shutdown veto.
pub struct App {
    pub(crate) controller: Arc<SessionController>,
    /// Set after a vetoed exit; the next exit request goes through.
    pub(crate) exit_pending: bool,
}

impl App {
    pub(crate) fn new(controller: Arc<SessionController>) -> Self {
        Self {
            controller,
            exit_pending: false,
        }
    }

    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) {
        info!("screen-session starting");
        println!("{HELP}");

        // Stdin forwarding on a plain thread: a blocked read must not keep
        // the runtime from shutting down. The thread ends on the first send
        // after `line_rx` is dropped.
        let (line_tx, mut line_rx) = mpsc::channel::<String>(32);
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line_tx.blocking_send(line).is_err() {
                    break;
                }
            }
        });

        let mut feed = Box::pin(self.controller.elapsed_feed());
        let mut last_shown: Option<String> = None;

        loop {
            tokio::select! {
                line = line_rx.recv() => {
                    let Some(line) = line else {
                        info!("Stdin closed");
                        break;
                    };
                    if self.handle_line(&line).await {
                        break;
                    }
                }

                signal = tokio::signal::ctrl_c() => {
                    if let Err(e) = signal {
                        error!(error = ?e, "Failed to listen for Ctrl-C");
                        break;
                    }
                    if self.confirm_exit() {
                        break;
                    }
                }

                Some(elapsed) = feed.next() => {
                    if self.controller.state() == SessionState::Recording
                        && last_shown.as_ref() != Some(&elapsed)
                    {
                        let mut stdout = std::io::stdout().lock();
                        let _ = write!(stdout, "\rREC {elapsed} ");
                        let _ = stdout.flush();
                        last_shown = Some(elapsed);
                    }
                }
            }
        }

        drop(line_rx);
        self.controller.teardown().await;
        info!("screen-session shut down");
    }

    /// Handle one stdin line. Returns `true` when the app should exit.
    pub(crate) async fn handle_line(&mut self, line: &str) -> bool {
        let command = match AppCommand::parse_line(line) {
            Ok(Some(command)) => command,
            Ok(None) => return false,
            Err(e) => {
                debug!(error = %e, "Rejected input");
                println!("Unknown command {:?}. Type `help` for the list.", line.trim());
                return false;
            }
        };

        if command != AppCommand::Quit {
            self.exit_pending = false;
        }

        match command {
            AppCommand::Intent(event) => {
                self.dispatch(event);
                false
            }
            AppCommand::Status => {
                self.print_status().await;
                false
            }
            AppCommand::Help => {
                println!("{HELP}");
                false
            }
            AppCommand::Quit => self.confirm_exit(),
        }
    }

    /// Run `event` on its own task so a slow transition never blocks input.
    fn dispatch(&self, event: SessionEvent) {
        let controller = Arc::clone(&self.controller);
        tokio::spawn(async move {
            let outcome = apply(&controller, event).await;
            debug!(
                event = %event,
                state = %outcome.state,
                error = ?outcome.error,
                "Intent settled"
            );
        });
    }

    /// Ask the controller whether leaving is safe; a veto must be confirmed
    /// by a second request.
    pub(crate) fn confirm_exit(&mut self) -> bool {
        match self.controller.request_shutdown() {
            ShutdownDecision::Allow => true,
            ShutdownDecision::Veto { .. } if self.exit_pending => {
                warn!("Leaving during an active recording");
                true
            }
            ShutdownDecision::Veto { message } => {
                println!("\r{message} Repeat to confirm.");
                self.exit_pending = true;
                false
            }
        }
    }

    async fn print_status(&self) {
        let controls: Vec<String> = self
            .controller
            .controls()
            .enabled()
            .map(|event| event.to_string())
            .collect();

        println!(
            "\rstate: {}  elapsed: {}  buffered chunks: {}  available: {}",
            self.controller.state(),
            self.controller.clock().display(),
            self.controller.buffered_chunks().await,
            controls.join(", ")
        );
    }
}

/// Route an intent to the matching controller operation.
pub(crate) async fn apply(controller: &SessionController, event: SessionEvent) -> Outcome {
    match event {
        SessionEvent::Start => controller.start().await,
        SessionEvent::Pause => controller.pause().await,
        SessionEvent::Resume => controller.resume().await,
        SessionEvent::Stop => controller.stop().await,
        SessionEvent::Discard => controller.discard().await,
        SessionEvent::Upload => controller.upload().await,
    }
}
