//! Console operator surface.
//!
//! Reads one command per line from stdin. A bare Enter is the space-bar
//! "advance" key; anything unparsable is reported and skipped.

use std::io::BufRead;
use std::thread::JoinHandle;

use tokio::sync::mpsc;

use luckydraw_shared::{CommandParseError, OperatorCommand};

/// Parse one console line. Blank lines advance.
pub fn parse_line(line: &str) -> Result<OperatorCommand, CommandParseError> {
    if line.trim().is_empty() {
        return Ok(OperatorCommand::Advance);
    }
    line.parse()
}

/// Forward commands from `input` until it ends or `tx` is closed.
///
/// Blocks the calling thread; run it off the runtime.
pub fn read_commands(input: impl BufRead, tx: mpsc::Sender<OperatorCommand>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read operator input");
                return;
            }
        };
        match parse_line(&line) {
            Ok(command) => {
                if tx.blocking_send(command).is_err() {
                    return;
                }
            }
            Err(e) => tracing::warn!(error = %e, "Unrecognised operator command"),
        }
    }
    tracing::debug!("Operator input closed");
}

/// Read commands from stdin on a dedicated thread.
///
/// The thread is not joined on shutdown; it ends with the process.
pub fn spawn_stdin(tx: mpsc::Sender<OperatorCommand>) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("operator-console".into())
        .spawn(move || read_commands(std::io::stdin().lock(), tx))
}
