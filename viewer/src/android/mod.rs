//! Android glue: JNI entry points, native windows and logcat output.

mod bridge;
mod logcat;
mod window;

pub(crate) use logcat::LogcatMakeWriter;
pub(crate) use window::NativeWindow;
