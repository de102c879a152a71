//! JSON-lines event feed.
//!
//! Stands in for the gossip layer: every non-blank input line is one
//! [`Event`] in its tagged JSON form, e.g.
//!
//! ```text
//! {"type":"member-join","members":[{"name":"node-1","addr":"10.0.0.1","port":7946}]}
//! {"type":"user","name":"serfer:deploy","payload":[1,2,3]}
//! ```

use serfer_event_system::{Event, ShutdownState};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Counters describing one feed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    /// Events handed to the dispatch queue
    pub sent: u64,
    /// Lines that could not be parsed
    pub skipped: u64,
}

/// Parses a single input line. Blank lines yield `Ok(None)`.
pub fn parse_event_line(line: &str) -> Result<Option<Event>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Reads events from `reader` and enqueues them until input ends, the queue
/// closes, or shutdown is initiated.
///
/// Malformed lines are logged and skipped.
pub async fn feed_events<R>(
    reader: R,
    sender: mpsc::Sender<Event>,
    shutdown_state: &ShutdownState,
) -> std::io::Result<FeedSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut summary = FeedSummary::default();
    let mut line_number: u64 = 0;

    loop {
        let line = tokio::select! {
            biased;
            _ = shutdown_state.initiated() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            debug!("📄 Event input exhausted after {} lines", line_number);
            break;
        };
        line_number += 1;

        let event = match parse_event_line(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                warn!("🟡 Skipping malformed event on line {}: {}", line_number, e);
                summary.skipped += 1;
                continue;
            }
        };

        let sent = tokio::select! {
            biased;
            _ = shutdown_state.initiated() => break,
            sent = sender.send(event) => sent,
        };
        if sent.is_err() {
            warn!("📭 Dispatch queue closed - dropping remaining input");
            break;
        }
        summary.sent += 1;
    }

    Ok(summary)
}
