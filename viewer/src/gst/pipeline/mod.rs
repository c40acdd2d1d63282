//! GStreamer pipeline that renders into a native window.

mod bus;
mod lifecycle;

use crate::events::EventBroadcaster;
use crate::surface::WindowHandle;
use gstreamer as gst;
use gstreamer::glib;
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread::JoinHandle;
use v3xctrl_gst_types::PipelineState;

/// A running receive pipeline together with everything it borrows from the host.
///
/// Dropping the value tears the pipeline down; the window handle is
/// released last, after the pipeline reached NULL.
pub struct ViewerPipeline {
    port: u16,
    pipeline: gst::Pipeline,
    /// The element named `videosink`, if the description had one
    video_sink: Option<gst::Element>,
    main_loop: glib::MainLoop,
    /// Thread running `main_loop`
    loop_thread: Option<JoinHandle<()>>,
    events: EventBroadcaster,
    /// Bus message handler IDs (disconnected on teardown)
    bus_handlers: Vec<glib::SignalHandlerId>,
    /// Pipeline state as last reported on the bus
    cached_state: Arc<RwLock<PipelineState>>,
    window: Option<Box<dyn WindowHandle>>,
    torn_down: bool,
}

impl ViewerPipeline {
    /// Port the pipeline listens on, `0` for the test pattern.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Last pipeline state reported on the bus.
    pub fn state(&self) -> PipelineState {
        *self.cached_state.read()
    }

    /// Whether the main loop thread is still dispatching bus messages.
    ///
    /// The loop quits on its own after an error or end-of-stream.
    pub fn is_main_loop_running(&self) -> bool {
        self.loop_thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// The sink the window was bound to.
    pub fn video_sink(&self) -> Option<&gst::Element> {
        self.video_sink.as_ref()
    }
}

/// Map a GStreamer state onto the bridge's state type.
pub(crate) fn pipeline_state(state: gst::State) -> PipelineState {
    match state {
        gst::State::Null => PipelineState::Null,
        gst::State::Ready => PipelineState::Ready,
        gst::State::Paused => PipelineState::Paused,
        gst::State::Playing => PipelineState::Playing,
        _ => PipelineState::Null,
    }
}

impl Drop for ViewerPipeline {
    fn drop(&mut self) {
        self.teardown();
    }
}
