//! Newline-delimited JSON-RPC over a byte stream
//!
//! One line is read, dispatched and answered before the next is read, so
//! responses come out in request order.

use std::io;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::mcp::{rpc::parse_error, server::handle_json_rpc_value};
use crate::AppState;

/// Serves requests until the reader hits EOF.
pub async fn serve<R, W>(state: &AppState, reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut segments = reader.split(b'\n');
    let mut handled = 0usize;

    while let Some(segment) = segments.next_segment().await? {
        let Some(response) = handle_raw_line(state, &segment).await else {
            continue;
        };
        handled += 1;

        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
    }

    info!(responses = handled, "input closed, stopping");
    Ok(())
}

pub async fn serve_stdio(state: &AppState) -> io::Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve(state, stdin, tokio::io::stdout()).await
}

/// Like `handle_line`, but for undecoded bytes. Invalid UTF-8 is a parse error.
pub async fn handle_raw_line(state: &AppState, raw: &[u8]) -> Option<Value> {
    match std::str::from_utf8(raw) {
        Ok(line) => handle_line(state, line).await,
        Err(err) => {
            warn!(error = %err, bytes = raw.len(), "discarding input line that is not UTF-8");
            Some(parse_error())
        }
    }
}

/// Decodes and dispatches a single input line. Blank lines yield nothing.
pub async fn handle_line(state: &AppState, line: &str) -> Option<Value> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(line) {
        Ok(payload) => handle_json_rpc_value(state, payload).await,
        Err(err) => {
            warn!(error = %err, "discarding malformed input line");
            debug!(line_chars = line.chars().count(), "malformed line length");
            Some(parse_error())
        }
    }
}
