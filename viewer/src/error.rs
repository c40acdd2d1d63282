//! Error type shared by the viewer operations.

use gstreamer as gst;
use thiserror::Error;
use v3xctrl_gst_types::InvalidPort;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("GStreamer not initialized")]
    NotInitialized,

    #[error(transparent)]
    InvalidPort(#[from] InvalidPort),

    #[error("Failed to get native window from surface: {0}")]
    Surface(String),

    #[error("Failed to create pipeline: {0}")]
    Parse(String),

    #[error("GStreamer error: {0}")]
    GStreamer(#[from] gst::glib::Error),

    #[error("GStreamer boolean error: {0}")]
    BoolError(#[from] gst::glib::BoolError),

    #[error("Pipeline does not have a bus")]
    MissingBus,

    #[error("Pipeline state change failed: {0}")]
    StateChange(String),

    #[error("Main loop thread: {0}")]
    LoopThread(String),

    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_bus_message() {
        assert_eq!(
            ViewerError::MissingBus.to_string(),
            "Pipeline does not have a bus"
        );
    }

    #[test]
    fn test_invalid_port_is_transparent() {
        let err = ViewerError::from(InvalidPort(-1));
        assert_eq!(err.to_string(), InvalidPort(-1).to_string());
    }
}
