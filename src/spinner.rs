//! A minimal terminal spinner shown while waiting on the tutor.

use std::future::Future;
use std::io::{IsTerminal, Write};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Braille spinner frames.
const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const INTERVAL: Duration = Duration::from_millis(80);

/// A terminal spinner that runs in a background task on stderr.
pub struct Spinner {
    handle: Option<JoinHandle<()>>,
    cancel: tokio::sync::watch::Sender<bool>,
}

impl Spinner {
    /// Start a spinner with the given message (e.g. `"考え中"`).
    /// Draws nothing when stderr is not a terminal.
    pub fn start(message: &str) -> Self {
        let (cancel_tx, mut cancel_rx) = tokio::sync::watch::channel(false);
        if !std::io::stderr().is_terminal() {
            return Self {
                handle: None,
                cancel: cancel_tx,
            };
        }

        let message = message.to_string();
        let handle = tokio::spawn(async move {
            let mut i = 0;
            loop {
                let frame = FRAMES[i % FRAMES.len()];
                // \x1b[2K clears the line, \r returns to its start
                eprint!("\x1b[2K\r{frame} {message}");
                let _ = std::io::stderr().flush();

                tokio::select! {
                    _ = tokio::time::sleep(INTERVAL) => {}
                    _ = cancel_rx.changed() => break,
                }
                i += 1;
            }
            eprint!("\x1b[2K\r");
            let _ = std::io::stderr().flush();
        });

        Self {
            handle: Some(handle),
            cancel: cancel_tx,
        }
    }

    /// Stop the spinner and clear its line.
    pub async fn stop(self) {
        let _ = self.cancel.send(true);
        if let Some(handle) = self.handle {
            let _ = handle.await;
        }
    }

    /// Spin while `fut` runs.
    pub async fn wrap<F: Future>(message: &str, fut: F) -> F::Output {
        let spinner = Self::start(message);
        let output = fut.await;
        spinner.stop().await;
        output
    }
}
