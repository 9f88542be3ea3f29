//! Thread Heads
//!
//! Tracks the tip of every live thread. A head is superseded only by a frame
//! that directly continues it.

use crate::types::FrameId;
use std::collections::BTreeSet;

/// Head set: the frame ids not (yet) continued by any ingested frame
#[derive(Debug, Clone, Default)]
pub struct HeadSet {
    pub(crate) heads: BTreeSet<FrameId>,
}

impl HeadSet {
    pub fn new() -> Self {
        HeadSet {
            heads: BTreeSet::new(),
        }
    }

    /// Apply an arriving frame to the head set.
    ///
    /// Removes `continues` if it is currently a head, then adds `frame_id`.
    /// A `continues` target that is not a head (unseen, or already continued)
    /// leaves the set untouched apart from the new head. Returns the id that
    /// was superseded, if any.
    pub fn advance(&mut self, frame_id: &str, continues: Option<&str>) -> Option<FrameId> {
        let superseded = continues
            .filter(|parent| *parent != frame_id)
            .and_then(|parent| self.heads.take(parent));
        self.heads.insert(frame_id.to_string());
        superseded
    }

    pub fn contains(&self, frame_id: &str) -> bool {
        self.heads.contains(frame_id)
    }

    /// Heads ordered by identifier, descending.
    pub fn descending(&self) -> Vec<FrameId> {
        self.heads.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.heads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }
}
