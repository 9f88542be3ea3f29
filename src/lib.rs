//! Frameview: Thread Reconstruction over Frame Streams
//!
//! Ingests frames from a live event stream, tracks which message frames are
//! current thread heads, rebuilds a thread by walking `continues` links, and
//! resolves frame content hashes through a coalescing blob cache.

pub mod cas;
pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod heads;
pub mod logging;
pub mod store;
pub mod types;
