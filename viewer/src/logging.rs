//! Tracing subscriber setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Tag under which all output shows up in logcat.
pub const LOG_TAG: &str = "GstViewer";

/// Install the global subscriber.
///
/// `level` overrides `RUST_LOG`; without either, `info` is used. Only the
/// first call installs anything, later calls are ignored.
pub fn init(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    // logcat stamps time and tag itself
    #[cfg(target_os = "android")]
    let result = fmt()
        .with_env_filter(filter)
        .with_writer(crate::android::LogcatMakeWriter::new(LOG_TAG))
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .try_init();

    #[cfg(not(target_os = "android"))]
    let result = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
