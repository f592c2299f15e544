use futures_util::{Sink, SinkExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_tungstenite::tungstenite::Message;

use crate::error::FeedError;

/// Per-run counters reported when the input is exhausted.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FeedSummary {
    pub sent: u64,
    pub skipped: u64,
}

/// Connect to the relay and forward every JSON line from `input` (or stdin).
pub async fn run(url: &str, input: Option<&str>) -> Result<(), FeedError> {
    let (mut ws, _) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(|source| FeedError::Connect {
            url: url.to_string(),
            source,
        })?;
    tracing::info!(%url, "connected to relay");

    let summary = match input {
        Some(path) => {
            let file = tokio::fs::File::open(path).await?;
            forward_lines(BufReader::new(file), &mut ws).await?
        }
        None => forward_lines(BufReader::new(tokio::io::stdin()), &mut ws).await?,
    };

    if let Err(e) = ws.send(Message::Close(None)).await {
        tracing::debug!(error = %e, "close handshake failed");
    }
    tracing::info!(sent = summary.sent, skipped = summary.skipped, "input exhausted");
    Ok(())
}

/// Send each non-blank, well-formed JSON line as one text frame.
///
/// Malformed lines are logged and skipped; the relay would drop them anyway.
pub async fn forward_lines<R, S>(mut reader: R, sink: &mut S) -> Result<FeedSummary, FeedError>
where
    R: AsyncBufRead + Unpin,
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let mut summary = FeedSummary::default();
    let mut buf = Vec::new();
    let mut line_no = 0u64;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        line_no += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "skipping non-UTF-8 line");
                summary.skipped += 1;
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        if let Err(e) = serde_json::from_str::<serde_json::Value>(line) {
            tracing::warn!(line = line_no, error = %e, "skipping malformed packet");
            summary.skipped += 1;
            continue;
        }

        sink.send(Message::Text(line.to_string().into()))
            .await
            .map_err(|e| FeedError::Send(e.to_string()))?;
        summary.sent += 1;
    }

    Ok(summary)
}
