use super::ViewerPipeline;
use crate::config::PipelineConfig;
use crate::error::ViewerError;
use crate::events::EventBroadcaster;
use crate::gst::description::{describe, VIDEO_SINK_NAME};
use crate::surface::WindowHandle;
use gstreamer as gst;
use gstreamer::glib;
use gstreamer::prelude::*;
use gstreamer_video as gst_video;
use gstreamer_video::prelude::*;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use v3xctrl_gst_types::{PipelineState, VideoSource};

/// How long teardown waits for the main loop thread to return.
const LOOP_STOP_TIMEOUT: Duration = Duration::from_secs(2);

impl ViewerPipeline {
    /// Build the receive pipeline for `source` and start rendering into `window`.
    pub fn start(
        source: &VideoSource,
        window: Box<dyn WindowHandle>,
        config: &PipelineConfig,
        events: EventBroadcaster,
    ) -> Result<Self, ViewerError> {
        let port = source.port();
        info!("Creating video receiver pipeline on port {}", port);

        let description = describe(source, config);
        let pipeline = Self::launch(&description, port, window, events)?;

        info!(
            "Pipeline started successfully, waiting for video on port {}",
            port
        );
        Ok(pipeline)
    }

    /// Parse `description`, bind `window` to its `videosink` and set it PLAYING.
    ///
    /// On failure everything created so far is torn down and the window released.
    pub fn launch(
        description: &str,
        port: u16,
        window: Box<dyn WindowHandle>,
        events: EventBroadcaster,
    ) -> Result<Self, ViewerError> {
        info!("Pipeline: {}", description);

        let element = gst::parse::launch(description).map_err(|e| {
            error!("Pipeline parse error: {}", e);
            ViewerError::Parse(e.to_string())
        })?;
        let pipeline = element.downcast::<gst::Pipeline>().map_err(|element| {
            error!("Pipeline parse error: '{}' is not a pipeline", element.name());
            ViewerError::Parse(format!(
                "description produced a single '{}' element instead of a pipeline",
                element.name()
            ))
        })?;

        let video_sink = pipeline.by_name(VIDEO_SINK_NAME);
        match &video_sink {
            Some(sink) => bind_window(sink, &*window),
            None => warn!(
                "Pipeline has no '{}' element, video will not be shown",
                VIDEO_SINK_NAME
            ),
        }

        let mut viewer_pipeline = Self {
            port,
            pipeline,
            video_sink,
            main_loop: glib::MainLoop::new(Some(&glib::MainContext::new()), false),
            loop_thread: None,
            events,
            bus_handlers: Vec::new(),
            cached_state: Arc::new(RwLock::new(PipelineState::Null)),
            window: Some(window),
            torn_down: false,
        };

        // From here on, dropping `viewer_pipeline` on error tears everything down
        viewer_pipeline.setup_bus_watch()?;
        viewer_pipeline.set_playing()?;
        viewer_pipeline.spawn_main_loop()?;

        Ok(viewer_pipeline)
    }

    /// Stop the pipeline and release the window.
    pub fn stop(mut self) {
        self.teardown();
    }

    fn set_playing(&self) -> Result<(), ViewerError> {
        match self.pipeline.set_state(gst::State::Playing) {
            Ok(gst::StateChangeSuccess::Success) => {
                info!("Pipeline set to PLAYING: Success");
            }
            Ok(gst::StateChangeSuccess::Async) => {
                info!("Pipeline set to PLAYING: Async (state change in progress)");
            }
            Ok(gst::StateChangeSuccess::NoPreroll) => {
                info!("Pipeline set to PLAYING: NoPreroll (live source)");
            }
            Err(e) => {
                error!("Failed to start pipeline - state change failed");
                let reason = self
                    .pop_bus_error()
                    .unwrap_or_else(|| e.to_string());
                return Err(ViewerError::StateChange(reason));
            }
        }
        Ok(())
    }

    /// Take the first pending error off the bus, for a failed state change.
    ///
    /// The main loop is not running yet, so the message has not been
    /// dispatched to the signal watch.
    fn pop_bus_error(&self) -> Option<String> {
        let bus = self.pipeline.bus()?;
        let msg = bus.pop_filtered(&[gst::MessageType::Error])?;
        let gst::MessageView::Error(err) = msg.view() else {
            return None;
        };

        let message = err.error().to_string();
        error!("Pipeline error: {}", message);
        if let Some(debug_info) = err.debug() {
            debug!("Debug: {}", debug_info);
        }
        Some(message)
    }

    fn spawn_main_loop(&mut self) -> Result<(), ViewerError> {
        let main_loop = self.main_loop.clone();
        let thread = std::thread::Builder::new()
            .name("gst-main-loop".to_string())
            .spawn(move || {
                info!("Starting GStreamer main loop");
                main_loop.run();
                info!("GStreamer main loop ended");
            })
            .map_err(|e| ViewerError::LoopThread(e.to_string()))?;

        self.loop_thread = Some(thread);
        Ok(())
    }

    /// Quit the main loop and wait for its thread.
    ///
    /// `quit` is a no-op until `run` has been entered, so it is repeated
    /// until the thread returns.
    fn stop_main_loop(&mut self) {
        let Some(thread) = self.loop_thread.take() else {
            self.main_loop.quit();
            return;
        };

        let deadline = Instant::now() + LOOP_STOP_TIMEOUT;
        while !thread.is_finished() {
            self.main_loop.quit();
            if Instant::now() >= deadline {
                warn!("GStreamer main loop did not stop in time, detaching its thread");
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }

        if thread.join().is_err() {
            error!("GStreamer main loop thread panicked");
        }
    }

    /// Release everything in reverse order of acquisition. Idempotent.
    pub(super) fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        self.stop_main_loop();

        if let Err(e) = self.pipeline.set_state(gst::State::Null) {
            warn!("Failed to set pipeline to NULL: {}", e);
        }
        self.remove_bus_watch();
        *self.cached_state.write() = PipelineState::Null;

        self.video_sink = None;
        // The sink no longer renders, so the window can go
        self.window = None;
        debug!("Pipeline on port {} torn down", self.port);
    }
}

/// Point the sink at the native window, if it can render into one.
fn bind_window(sink: &gst::Element, window: &dyn WindowHandle) {
    let Some(overlay) = sink.dynamic_cast_ref::<gst_video::VideoOverlay>() else {
        warn!(
            "Video sink '{}' does not implement GstVideoOverlay, window not bound",
            sink.name()
        );
        return;
    };

    let handle = window.as_raw();
    debug!("Binding window handle {:#x} to '{}'", handle, sink.name());
    // SAFETY: the window stays alive until after the pipeline is set to NULL
    // in `teardown`, so the sink never draws into a released window.
    unsafe { overlay.set_window_handle(handle) };
}
