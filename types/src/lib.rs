//! Shared types for the v3xctrl GStreamer viewer bridge.
//!
//! This crate holds the domain model that does not depend on GStreamer
//! itself, so it can be used (and tested) without the framework present.

/// Port value that selects the built-in test pattern instead of RTP.
pub const TEST_PATTERN_PORT: u16 = 0;

pub mod events;
pub mod source;
pub mod state;

pub use events::ViewerEvent;
pub use source::{InvalidPort, VideoSource};
pub use state::PipelineState;
