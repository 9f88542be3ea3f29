//! Thread Store
//!
//! Append-only frame map plus the current head set, updated together as one
//! step per ingested frame. Threads are derived on demand by walking
//! `meta.continues` pointers backward from a head.
//!
//! Threads are assumed acyclic: a `continues` pointer never refers forward or
//! to its own frame. The store does not verify this at ingest; thread walks
//! stop at the first revisited id instead of looping.

use crate::frame::Frame;
use crate::heads::HeadSet;
use crate::types::{FrameId, MESSAGE_TOPIC};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Why a frame did not enter the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Frame arrived without an identifier
    EmptyId,
    /// Frame topic is not the message topic
    OffTopic(String),
}

/// Result of a single ingest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Stored {
        /// Head replaced by this frame, if its parent was a head
        superseded: Option<FrameId>,
        /// Whether a frame with the same id was overwritten
        replaced: bool,
    },
    Ignored(IgnoreReason),
}

impl IngestOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, IngestOutcome::Stored { .. })
    }
}

/// Notification published after each stored frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestEvent {
    pub revision: u64,
    pub frame_id: FrameId,
    pub superseded: Option<FrameId>,
}

/// Heads observed together with the revision they belong to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadSnapshot {
    pub revision: u64,
    pub heads: Vec<FrameId>,
}

#[derive(Default)]
struct ThreadState {
    frames: HashMap<FrameId, Arc<Frame>>,
    heads: HeadSet,
    revision: u64,
}

/// Frame map and head set behind a single lock
///
/// One writer feeds `ingest`; any number of readers may call the lookup
/// methods concurrently. Readers never observe a frame without its head
/// update or the reverse.
pub struct ThreadStore {
    state: RwLock<ThreadState>,
    message_topic: String,
    events: broadcast::Sender<IngestEvent>,
}

impl Default for ThreadStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadStore {
    /// Create a store tracking the default message topic
    pub fn new() -> Self {
        Self::with_topic(MESSAGE_TOPIC)
    }

    /// Create a store tracking frames of the given topic
    pub fn with_topic(message_topic: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(ThreadState::default()),
            message_topic: message_topic.into(),
            events,
        }
    }

    pub fn message_topic(&self) -> &str {
        &self.message_topic
    }

    /// Apply one frame from the stream.
    ///
    /// Frames with another topic or an empty id are dropped without touching
    /// state. A stored frame overwrites any earlier frame with the same id.
    pub fn ingest(&self, frame: Frame) -> IngestOutcome {
        if frame.id.is_empty() {
            trace!(topic = %frame.topic, "Ignoring frame without id");
            return IngestOutcome::Ignored(IgnoreReason::EmptyId);
        }
        if frame.topic != self.message_topic {
            trace!(frame_id = %frame.id, topic = %frame.topic, "Ignoring off-topic frame");
            return IngestOutcome::Ignored(IgnoreReason::OffTopic(frame.topic));
        }

        let frame_id = frame.id.clone();
        let frame = Arc::new(frame);

        let mut state = self.state.write();
        let superseded = state.heads.advance(&frame_id, frame.continues());
        let replaced = state.frames.insert(frame_id.clone(), frame).is_some();
        state.revision += 1;
        let revision = state.revision;

        // Published under the write lock so observers see events in revision order
        let _ = self.events.send(IngestEvent {
            revision,
            frame_id: frame_id.clone(),
            superseded: superseded.clone(),
        });
        drop(state);

        debug!(
            frame_id = %frame_id,
            superseded = ?superseded,
            replaced,
            revision,
            "Ingested frame"
        );

        IngestOutcome::Stored {
            superseded,
            replaced,
        }
    }

    /// Look up a stored frame
    pub fn get_frame(&self, frame_id: &str) -> Option<Arc<Frame>> {
        self.state.read().frames.get(frame_id).cloned()
    }

    /// Current heads, sorted descending by identifier
    pub fn list_heads(&self) -> Vec<FrameId> {
        self.state.read().heads.descending()
    }

    /// Heads and revision read under one lock
    pub fn snapshot(&self) -> HeadSnapshot {
        let state = self.state.read();
        HeadSnapshot {
            revision: state.revision,
            heads: state.heads.descending(),
        }
    }

    /// Walk backward from `head_id`, newest frame first.
    ///
    /// Stops at the first id with no stored frame, at a frame without a
    /// `continues` pointer, or at an id already visited. Returns an empty
    /// thread for an unknown `head_id`.
    pub fn reconstruct_thread(&self, head_id: &str) -> Vec<Arc<Frame>> {
        let state = self.state.read();
        let mut thread = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = Some(head_id);

        while let Some(frame_id) = current {
            if !visited.insert(frame_id) {
                debug!(frame_id, "Cycle detected while walking thread");
                break;
            }
            let Some(frame) = state.frames.get(frame_id) else {
                break;
            };
            thread.push(Arc::clone(frame));
            current = frame.continues();
        }

        thread
    }

    /// Subscribe to ingest notifications
    pub fn subscribe(&self) -> broadcast::Receiver<IngestEvent> {
        self.events.subscribe()
    }

    /// Number of applied ingests
    pub fn revision(&self) -> u64 {
        self.state.read().revision
    }

    /// Number of stored frames
    pub fn len(&self) -> usize {
        self.state.read().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().frames.is_empty()
    }
}
