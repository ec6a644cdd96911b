use crate::{AppError, AppResult};

use std::{panic::Location, str::FromStr};

use error_location::ErrorLocation;
use screen_session_core::SessionEvent;

/// Commands read from stdin by the application loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Forward a user intent to the session controller.
    Intent(SessionEvent),
    /// Print state, elapsed time and enabled controls.
    Status,
    /// Print the command list.
    Help,
    /// Leave the application, subject to the shutdown veto.
    Quit,
}

impl AppCommand {
    /// Parse one input line. Blank lines yield `None`.
    #[track_caller]
    pub fn parse_line(line: &str) -> AppResult<Option<Self>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed.parse().map(Some)
    }
}

impl FromStr for AppCommand {
    type Err = AppError;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = match s.trim().to_ascii_lowercase().as_str() {
            "start" => AppCommand::Intent(SessionEvent::Start),
            "pause" => AppCommand::Intent(SessionEvent::Pause),
            "resume" => AppCommand::Intent(SessionEvent::Resume),
            "stop" => AppCommand::Intent(SessionEvent::Stop),
            "discard" => AppCommand::Intent(SessionEvent::Discard),
            "upload" | "save" => AppCommand::Intent(SessionEvent::Upload),
            "status" => AppCommand::Status,
            "help" | "?" => AppCommand::Help,
            "quit" | "exit" => AppCommand::Quit,
            other => {
                return Err(AppError::UnknownCommand {
                    input: other.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };
        Ok(command)
    }
}

/// Usage text printed by `help`.
pub const HELP: &str = "\
Commands:
  start     begin a new recording
  pause     pause the active recording
  resume    resume a paused recording
  stop      finalize the recording
  discard   throw the finished recording away
  upload    submit the finished recording (alias: save)
  status    show state, elapsed time and available commands
  quit      leave (asks for confirmation while recording)";
