//! Core types for the frameview thread and content model.

/// FrameId: Opaque, stream-assigned identifier of a frame
pub type FrameId = String;

/// ContentHash: Opaque content address of a blob held by the remote store
pub type ContentHash = String;

/// Topic carried by conversational message frames
pub const MESSAGE_TOPIC: &str = "message";
