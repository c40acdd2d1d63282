//! GStreamer integration.

pub mod description;
pub mod pipeline;

pub use description::{describe, VIDEO_SINK_NAME};
pub use pipeline::ViewerPipeline;
