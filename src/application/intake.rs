//! Event intake - reads JSON-lines events and dispatches each on its own task.
//!
//! The loop stops on end of input, on a read error, or when the shutdown
//! future resolves. In every case the events already spawned are awaited
//! before returning, so their replies, presence updates and history writes
//! complete.

use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use super::handlers::{DispatchOutcome, Dispatcher};
use crate::adapters::messaging::parse_event_line;

/// Runs the intake loop until input ends, fails, or `shutdown` resolves.
///
/// # Errors
///
/// Returns the read error that stopped the loop, after in-flight events
/// have finished.
pub async fn run_event_loop<R, F>(
    reader: R,
    dispatcher: Arc<Dispatcher>,
    shutdown: F,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    let mut lines = reader.lines();
    let mut in_flight: JoinSet<DispatchOutcome> = JoinSet::new();
    let mut read_error = None;
    tokio::pin!(shutdown);
    info!("Waiting for events");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        info!("Input closed");
                        break;
                    }
                    Err(err) => {
                        error!(error = %err, "Failed to read event line");
                        read_error = Some(err);
                        break;
                    }
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match parse_event_line(line) {
                    Ok(event) => {
                        let dispatcher = dispatcher.clone();
                        in_flight.spawn(async move { dispatcher.dispatch(&event).await });
                    }
                    Err(err) => warn!(error = %err, "Skipping malformed event line"),
                }
            }
            Some(joined) = in_flight.join_next() => {
                if let Err(err) = joined {
                    error!(error = %err, "Event task failed");
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    let pending = in_flight.len();
    if pending > 0 {
        info!(pending, "Waiting for in-flight events");
    }
    while let Some(joined) = in_flight.join_next().await {
        if let Err(err) = joined {
            error!(error = %err, "Event task failed");
        }
    }

    match read_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
