//! Native GStreamer bridge for the v3xctrl Android viewer.
//!
//! The Android app hands a `Surface` and a UDP port to [`viewer::Viewer`]
//! through the JNI entry points in `android`. GStreamer receives the
//! H.264/RTP stream (or renders a test pattern when the port is `0`) and
//! draws it into that surface. All media handling lives in GStreamer; this
//! crate only builds the pipeline description, binds the window and runs
//! the bus main loop.

pub mod config;
pub mod error;
pub mod events;
pub mod gst;
pub mod logging;
pub mod surface;
pub mod viewer;

#[cfg(target_os = "android")]
mod android;

pub use config::{PipelineConfig, ViewerConfig};
pub use error::ViewerError;
pub use surface::{RawWindowHandle, WindowHandle};
pub use v3xctrl_gst_types::{PipelineState, VideoSource, ViewerEvent};
pub use viewer::{StartOutcome, Viewer};
