//! Integration tests driving the viewer the way the Android host does.

use serial_test::serial;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use v3xctrl_gst::{
    viewer, PipelineConfig, PipelineState, RawWindowHandle, StartOutcome, ViewerConfig,
    ViewerError, ViewerEvent, WindowHandle,
};

fn test_config() -> ViewerConfig {
    ViewerConfig {
        pipeline: PipelineConfig {
            video_sink: "fakesink".to_string(),
            ..PipelineConfig::default()
        },
        ..ViewerConfig::default()
    }
}

fn window() -> Result<Box<dyn WindowHandle>, ViewerError> {
    Ok(Box::new(RawWindowHandle(0)))
}

fn wait_for(rx: &mut broadcast::Receiver<ViewerEvent>, expected: &ViewerEvent) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        match rx.try_recv() {
            Ok(event) if &event == expected => return true,
            Ok(_) => {}
            Err(_) => std::thread::sleep(Duration::from_millis(10)),
        }
    }
    false
}

#[test]
#[serial]
fn test_global_viewer_lifecycle() {
    let mut rx = {
        let mut viewer = viewer::global();
        viewer.init_with_config(test_config()).unwrap();
        viewer.subscribe()
    };

    let outcome = viewer::global().start(0, window).unwrap();
    assert_eq!(outcome, StartOutcome::Started);

    assert!(wait_for(
        &mut rx,
        &ViewerEvent::StateChanged {
            old: PipelineState::Paused,
            new: PipelineState::Playing,
        }
    ));
    assert!(viewer::global().is_running());
    assert_eq!(viewer::global().port(), Some(0));

    viewer::global().stop();
    assert!(wait_for(&mut rx, &ViewerEvent::Stopped));
    assert!(!viewer::global().is_running());
    assert_eq!(viewer::global().state(), PipelineState::Null);

    viewer::global().finalize();
    assert!(!viewer::global().is_initialized());
}

#[test]
#[serial]
fn test_restart_after_finalize() {
    for _ in 0..2 {
        let mut viewer = viewer::global();
        viewer.init_with_config(test_config()).unwrap();
        assert_eq!(viewer.start(0, window).unwrap(), StartOutcome::Started);
        viewer.finalize();
        assert!(viewer.port().is_none());
    }
}

#[test]
#[serial]
fn test_stop_without_pipeline() {
    let mut viewer = viewer::global();
    viewer.stop();
    viewer.finalize();
    assert_eq!(viewer.state(), PipelineState::Null);
}
