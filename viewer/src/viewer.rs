//! Process-wide viewer state driven by the four lifecycle entry points.

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::events::EventBroadcaster;
use crate::gst::ViewerPipeline;
use crate::logging;
use crate::surface::WindowHandle;
use gstreamer as gst;
use parking_lot::{Mutex, MutexGuard};
use std::sync::OnceLock;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use v3xctrl_gst_types::{PipelineState, VideoSource, ViewerEvent};

/// Environment variable GStreamer's GL library reads to pick an API.
const GL_API_ENV: &str = "GST_GL_API";

static VIEWER: OnceLock<Mutex<Viewer>> = OnceLock::new();

/// Lock the process-wide viewer.
///
/// Every entry point goes through this lock, so init, start, stop and
/// finalize never interleave.
pub fn global() -> MutexGuard<'static, Viewer> {
    VIEWER.get_or_init(|| Mutex::new(Viewer::new())).lock()
}

/// What `start` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new pipeline is running
    Started,
    /// A pipeline was already running and was left untouched
    AlreadyRunning,
}

/// Owner of the GStreamer setup and the (at most one) running pipeline.
pub struct Viewer {
    initialized: bool,
    config: ViewerConfig,
    events: EventBroadcaster,
    pipeline: Option<ViewerPipeline>,
}

impl Viewer {
    pub fn new() -> Self {
        Self {
            initialized: false,
            config: ViewerConfig::default(),
            events: EventBroadcaster::default(),
            pipeline: None,
        }
    }

    /// Load configuration, set up logging and initialize GStreamer.
    ///
    /// Calling it again while initialized is a no-op.
    pub fn init(&mut self) -> Result<(), ViewerError> {
        if self.initialized {
            info!("GStreamer already initialized");
            return Ok(());
        }

        let (config, config_error) = match ViewerConfig::load() {
            Ok(config) => (config, None),
            Err(e) => (ViewerConfig::default(), Some(e)),
        };
        self.init_with_config(config)?;
        if let Some(e) = config_error {
            warn!("Using default configuration: {}", e);
        }
        Ok(())
    }

    /// Same as [`Viewer::init`] with an explicit configuration.
    pub fn init_with_config(&mut self, config: ViewerConfig) -> Result<(), ViewerError> {
        if self.initialized {
            info!("GStreamer already initialized");
            return Ok(());
        }

        logging::init(config.log_level.as_deref());
        info!("Initializing GStreamer");

        // Read by the GL library when the first GL element loads, so this has
        // to happen before gst::init and before any pipeline exists
        std::env::set_var(GL_API_ENV, &config.gl_api);

        gst::init()?;
        self.config = config;
        self.initialized = true;
        info!("GStreamer initialized successfully");
        Ok(())
    }

    /// Start rendering the stream for `port` into the window `acquire_window` yields.
    ///
    /// `acquire_window` is only called once the checks passed, so no
    /// window reference is taken when nothing will be started.
    pub fn start<F>(&mut self, port: i32, acquire_window: F) -> Result<StartOutcome, ViewerError>
    where
        F: FnOnce() -> Result<Box<dyn WindowHandle>, ViewerError>,
    {
        if !self.initialized {
            error!("GStreamer not initialized");
            return Err(ViewerError::NotInitialized);
        }

        if self.pipeline.is_some() {
            info!("Pipeline already running");
            return Ok(StartOutcome::AlreadyRunning);
        }

        let source = VideoSource::from_port(port).map_err(|e| {
            error!("{}", e);
            ViewerError::from(e)
        })?;

        let window = acquire_window().inspect_err(|e| error!("{}", e))?;

        let pipeline = ViewerPipeline::start(
            &source,
            window,
            &self.config.pipeline,
            self.events.clone(),
        )?;
        self.pipeline = Some(pipeline);
        self.events.broadcast(ViewerEvent::Started {
            port: source.port(),
        });
        Ok(StartOutcome::Started)
    }

    /// Tear down the running pipeline, if any.
    pub fn stop(&mut self) {
        info!("Stopping pipeline");

        if let Some(pipeline) = self.pipeline.take() {
            pipeline.stop();
            self.events.broadcast(ViewerEvent::Stopped);
        }

        info!("Pipeline stopped");
    }

    /// Stop and forget the initialization; a later `init` starts over.
    pub fn finalize(&mut self) {
        self.stop();
        self.initialized = false;
        info!("GStreamer finalized");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether a pipeline exists and is PLAYING.
    pub fn is_running(&self) -> bool {
        self.state().is_playing()
    }

    /// State of the running pipeline, `Null` when there is none.
    pub fn state(&self) -> PipelineState {
        self.pipeline
            .as_ref()
            .map(ViewerPipeline::state)
            .unwrap_or_default()
    }

    /// Port of the running pipeline.
    pub fn port(&self) -> Option<u16> {
        self.pipeline.as_ref().map(ViewerPipeline::port)
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Receive lifecycle and bus events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ViewerEvent> {
        self.events.subscribe()
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::surface::RawWindowHandle;
    use serial_test::serial;

    fn test_config() -> ViewerConfig {
        ViewerConfig {
            pipeline: PipelineConfig {
                video_sink: "fakesink".to_string(),
                ..PipelineConfig::default()
            },
            ..ViewerConfig::default()
        }
    }

    fn dummy_window() -> Result<Box<dyn WindowHandle>, ViewerError> {
        Ok(Box::new(RawWindowHandle(0)))
    }

    #[test]
    fn test_start_requires_init() {
        let mut viewer = Viewer::new();
        let mut acquired = false;

        let result = viewer.start(0, || {
            acquired = true;
            dummy_window()
        });

        assert!(matches!(result, Err(ViewerError::NotInitialized)));
        assert!(!acquired);
        assert_eq!(viewer.state(), PipelineState::Null);
    }

    #[test]
    #[serial]
    fn test_init_is_idempotent() {
        let mut viewer = Viewer::new();
        viewer.init_with_config(test_config()).unwrap();
        assert!(viewer.is_initialized());
        assert_eq!(std::env::var(GL_API_ENV).unwrap(), "gles2");

        // A second call keeps the first configuration
        let mut other = test_config();
        other.pipeline.latency_ms = 200;
        viewer.init_with_config(other).unwrap();
        assert_eq!(viewer.config().pipeline.latency_ms, 0);
    }

    #[test]
    #[serial]
    fn test_init_falls_back_to_defaults_on_invalid_config() {
        std::env::remove_var("V3XCTRL_GST_CONFIG");
        std::env::set_var("V3XCTRL_GST_PIPELINE__LATENCY_MS", "soon");

        let mut viewer = Viewer::new();
        let result = viewer.init();
        std::env::remove_var("V3XCTRL_GST_PIPELINE__LATENCY_MS");

        assert!(result.is_ok());
        assert!(viewer.is_initialized());
        assert_eq!(viewer.config().pipeline, PipelineConfig::default());
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_rejected() {
        let mut viewer = Viewer::new();
        viewer.init_with_config(test_config()).unwrap();

        let result = viewer.start(70_000, dummy_window);
        assert!(matches!(result, Err(ViewerError::InvalidPort(_))));
        assert!(viewer.port().is_none());
    }

    #[test]
    #[serial]
    fn test_surface_failure_is_reported() {
        let mut viewer = Viewer::new();
        viewer.init_with_config(test_config()).unwrap();

        let result = viewer.start(0, || Err(ViewerError::Surface("null surface".to_string())));
        assert!(matches!(result, Err(ViewerError::Surface(_))));
        assert!(viewer.port().is_none());
    }

    #[test]
    #[serial]
    fn test_lifecycle() {
        let mut viewer = Viewer::new();
        viewer.init_with_config(test_config()).unwrap();
        let mut rx = viewer.subscribe();

        assert_eq!(
            viewer.start(0, dummy_window).unwrap(),
            StartOutcome::Started
        );
        assert_eq!(viewer.port(), Some(0));
        // Bus state changes may arrive first
        assert!(std::iter::from_fn(|| rx.try_recv().ok())
            .any(|event| event == ViewerEvent::Started { port: 0 }));

        // Second start leaves the running pipeline alone and never takes a window
        let outcome = viewer
            .start(6666, || panic!("window acquired while a pipeline is running"))
            .unwrap();
        assert_eq!(outcome, StartOutcome::AlreadyRunning);
        assert_eq!(viewer.port(), Some(0));

        viewer.stop();
        assert!(viewer.port().is_none());
        assert!(!viewer.is_running());

        // Stopping twice is harmless
        viewer.stop();

        viewer.finalize();
        assert!(!viewer.is_initialized());
        assert!(matches!(
            viewer.start(0, dummy_window),
            Err(ViewerError::NotInitialized)
        ));
    }
}
