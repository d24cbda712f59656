//! Draw lifecycle status

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of the running show.
///
/// `Init` is the grid display open for registration, `Ready` the spinning
/// sphere awaiting a draw, `Running` the draw in progress and `End` the
/// revealed winners awaiting an operator decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawStatus {
    #[default]
    Init,
    Ready,
    Running,
    End,
}

impl DrawStatus {
    /// Whether cards are arranged in the sphere formation in this status.
    pub fn uses_sphere(&self) -> bool {
        !matches!(self, Self::Init)
    }

    /// Numeric code used by older operator surfaces (0..=3).
    pub fn code(&self) -> u8 {
        match self {
            Self::Init => 0,
            Self::Ready => 1,
            Self::Running => 2,
            Self::End => 3,
        }
    }
}

impl fmt::Display for DrawStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Ready => write!(f, "ready"),
            Self::Running => write!(f, "running"),
            Self::End => write!(f, "end"),
        }
    }
}
