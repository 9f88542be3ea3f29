//! Frames
//!
//! Immutable records delivered by the frame stream. A frame names its content
//! by hash and may point back at the frame it continues.

pub mod stream;

pub use stream::{pump, FrameSource, NdjsonFrameSource, PumpStats};

use crate::types::{ContentHash, FrameId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display and causality metadata attached to a frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameMeta {
    /// Frame this one causally follows within its thread
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continues: Option<FrameId>,

    /// Speaker label, carried for display only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Fields not interpreted here, preserved for other consumers
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Stream frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: FrameId,
    pub topic: String,
    #[serde(default)]
    pub hash: ContentHash,
    #[serde(default)]
    pub meta: FrameMeta,
}

impl Frame {
    /// Create a frame that starts a new thread
    pub fn new(id: impl Into<FrameId>, topic: impl Into<String>, hash: impl Into<ContentHash>) -> Self {
        Frame {
            id: id.into(),
            topic: topic.into(),
            hash: hash.into(),
            meta: FrameMeta::default(),
        }
    }

    /// Set the frame this one continues
    pub fn continuing(mut self, parent: impl Into<FrameId>) -> Self {
        self.meta.continues = Some(parent.into());
        self
    }

    /// Set the display role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.meta.role = Some(role.into());
        self
    }

    /// Parent frame identifier, if any
    pub fn continues(&self) -> Option<&str> {
        self.meta.continues.as_deref()
    }
}
