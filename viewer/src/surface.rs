//! Drawable surfaces handed to the video sink.

/// A platform window the video sink can draw into.
///
/// Implementors keep the underlying window alive until dropped; the
/// pipeline drops its handle only after the sink has been shut down.
pub trait WindowHandle: Send {
    /// Raw handle passed to `gst_video_overlay_set_window_handle`.
    fn as_raw(&self) -> usize;
}

/// A window handle that does not own anything.
///
/// Useful for sinks that ignore the handle, such as `fakesink` in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawWindowHandle(pub usize);

impl WindowHandle for RawWindowHandle {
    fn as_raw(&self) -> usize {
        self.0
    }
}
