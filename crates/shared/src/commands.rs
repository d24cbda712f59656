//! Operator commands
//!
//! Each command maps one-to-one to a lifecycle transition, plus the
//! state-dependent `Advance` key and prize selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum OperatorCommand {
    /// Grid to sphere
    Enter,
    /// Begin drawing the current prize
    Start,
    /// Reveal the winners
    Stop,
    /// Commit the round and go again
    Continue,
    /// Throw the round away and return to the grid
    Quit,
    /// Sphere back to grid with the burst animation
    BackToTable,
    /// Whatever the next step is for the current status
    Advance,
    /// Abort a running draw
    Escape,
    /// Choose the prize for upcoming rounds
    SelectPrize { prize_id: Uuid },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("Invalid prize id: {0}")]
    InvalidPrizeId(String),
}

impl FromStr for OperatorCommand {
    type Err = CommandParseError;

    /// Parse console input. A lone space (or blank line) is the advance key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(CommandParseError::Empty);
        }
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::Advance);
        }
        let mut parts = trimmed.split_whitespace();
        let head = parts.next().unwrap_or_default().to_ascii_lowercase();
        Ok(match head.as_str() {
            "enter" => Self::Enter,
            "start" => Self::Start,
            "stop" => Self::Stop,
            "continue" => Self::Continue,
            "quit" => Self::Quit,
            "back" | "back_to_table" => Self::BackToTable,
            "advance" | "space" => Self::Advance,
            "esc" | "escape" => Self::Escape,
            "prize" => {
                let raw = parts.next().unwrap_or_default();
                let prize_id = Uuid::parse_str(raw)
                    .map_err(|_| CommandParseError::InvalidPrizeId(raw.to_string()))?;
                Self::SelectPrize { prize_id }
            }
            _ => return Err(CommandParseError::Unknown(trimmed.to_string())),
        })
    }
}

impl fmt::Display for OperatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enter => write!(f, "enter"),
            Self::Start => write!(f, "start"),
            Self::Stop => write!(f, "stop"),
            Self::Continue => write!(f, "continue"),
            Self::Quit => write!(f, "quit"),
            Self::BackToTable => write!(f, "back"),
            Self::Advance => write!(f, "advance"),
            Self::Escape => write!(f, "esc"),
            Self::SelectPrize { prize_id } => write!(f, "prize {prize_id}"),
        }
    }
}
