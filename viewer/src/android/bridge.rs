//! Entry points for `com.v3xctrl.viewer.GstViewer`.
//!
//! `GstViewer` is a Kotlin `object`, so the receiver is its instance rather
//! than the class. Failures are logged and never thrown into the JVM.

use super::NativeWindow;
use crate::surface::WindowHandle;
use crate::viewer;
use jni::objects::JObject;
use jni::sys::{jboolean, jint, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use std::panic::{self, AssertUnwindSafe};
use tracing::error;

/// Run `f`, turning a panic into a log line and `fallback`.
///
/// Unwinding into the JVM is undefined behaviour.
fn guarded<R>(entry_point: &str, fallback: R, f: impl FnOnce() -> R) -> R {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error!("Panic in {}", entry_point);
            fallback
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_v3xctrl_viewer_GstViewer_nativeInit<'local>(
    _env: JNIEnv<'local>,
    _this: JObject<'local>,
) {
    guarded("nativeInit", (), || {
        if let Err(e) = viewer::global().init() {
            error!("Failed to initialize GStreamer: {}", e);
        }
    })
}

#[no_mangle]
pub extern "system" fn Java_com_v3xctrl_viewer_GstViewer_nativeStartPipeline<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
    surface: JObject<'local>,
    port: jint,
) {
    guarded("nativeStartPipeline", (), || {
        let result = viewer::global().start(port, || {
            NativeWindow::from_surface(&mut env, &surface)
                .map(|window| Box::new(window) as Box<dyn WindowHandle>)
        });
        if let Err(e) = result {
            error!("Failed to start pipeline: {}", e);
        }
    })
}

#[no_mangle]
pub extern "system" fn Java_com_v3xctrl_viewer_GstViewer_nativeStopPipeline<'local>(
    _env: JNIEnv<'local>,
    _this: JObject<'local>,
) {
    guarded("nativeStopPipeline", (), || viewer::global().stop())
}

#[no_mangle]
pub extern "system" fn Java_com_v3xctrl_viewer_GstViewer_nativeFinalize<'local>(
    _env: JNIEnv<'local>,
    _this: JObject<'local>,
) {
    guarded("nativeFinalize", (), || viewer::global().finalize())
}

#[no_mangle]
pub extern "system" fn Java_com_v3xctrl_viewer_GstViewer_nativeIsRunning<'local>(
    _env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jboolean {
    guarded("nativeIsRunning", JNI_FALSE, || {
        if viewer::global().is_running() {
            JNI_TRUE
        } else {
            JNI_FALSE
        }
    })
}
