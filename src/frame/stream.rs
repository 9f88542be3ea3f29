//! Frame stream input
//!
//! Pulls frames one at a time from an external source and feeds them to a
//! [`ThreadStore`] in arrival order. The only wire format handled here is
//! newline-delimited JSON; transport and reconnection belong to the caller.

use crate::error::StreamError;
use crate::frame::Frame;
use crate::store::ThreadStore;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{debug, info, warn};

/// Source of frames in arrival order
#[async_trait]
pub trait FrameSource: Send {
    /// Next frame, or `None` once the stream has ended
    async fn next_frame(&mut self) -> Result<Option<Frame>, StreamError>;
}

/// One JSON frame per line
///
/// Blank lines are skipped. Lines that fail to decode are logged and skipped
/// so a single bad record does not end the stream.
pub struct NdjsonFrameSource<R> {
    lines: Lines<R>,
    line_no: usize,
    skipped: usize,
}

impl<R> NdjsonFrameSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            skipped: 0,
        }
    }

    /// Number of malformed lines skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Decode a single NDJSON line
pub fn decode_line(line: &str, line_no: usize) -> Result<Frame, StreamError> {
    serde_json::from_str(line).map_err(|e| StreamError::Decode {
        line: line_no,
        reason: e.to_string(),
    })
}

#[async_trait]
impl<R> FrameSource for NdjsonFrameSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_frame(&mut self) -> Result<Option<Frame>, StreamError> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match decode_line(trimmed, self.line_no) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => {
                    self.skipped += 1;
                    warn!(error = %e, "Skipping malformed frame");
                }
            }
        }
        Ok(None)
    }
}

/// Counters from a completed [`pump`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub stored: usize,
    pub ignored: usize,
}

/// Ingest every frame from `source` until it ends
pub async fn pump<S>(source: &mut S, store: &ThreadStore) -> Result<PumpStats, StreamError>
where
    S: FrameSource + ?Sized,
{
    let mut stats = PumpStats::default();
    while let Some(frame) = source.next_frame().await? {
        if store.ingest(frame).is_stored() {
            stats.stored += 1;
        } else {
            stats.ignored += 1;
        }
    }
    debug!(stored = stats.stored, ignored = stats.ignored, "Frame stream ended");
    info!(heads = store.list_heads().len(), frames = store.len(), "Thread store loaded");
    Ok(stats)
}
