//! Configuration management.

use crate::error::ViewerError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix for all settings.
pub const ENV_PREFIX: &str = "V3XCTRL_GST_";

/// Environment variable naming an optional TOML configuration file.
pub const CONFIG_FILE_ENV: &str = "V3XCTRL_GST_CONFIG";

/// Viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Value exported as `GST_GL_API` before GStreamer is initialized
    pub gl_api: String,
    /// Log filter (if set, overrides RUST_LOG)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Settings used to build the pipeline description
    pub pipeline: PipelineConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            // GLES 2.0 works on emulators as well as devices
            gl_api: "gles2".to_string(),
            log_level: None,
            pipeline: PipelineConfig::default(),
        }
    }
}

/// Knobs for the receive pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// `videotestsrc` pattern shown when no port is given
    pub test_pattern: String,
    /// `rtpjitterbuffer` latency in milliseconds
    pub latency_ms: u32,
    /// Drop packets that arrive later than the jitter latency
    pub drop_on_latency: bool,
    /// RTP payload type of the H.264 stream
    pub payload: u8,
    /// RTP clock rate
    pub clock_rate: u32,
    /// H.264 decoder element
    pub decoder: String,
    /// Element that renders into the native window
    pub video_sink: String,
    /// Whether the sink synchronizes on buffer timestamps
    pub sync: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            test_pattern: "smpte".to_string(),
            latency_ms: 0,
            drop_on_latency: true,
            payload: 96,
            clock_rate: 90_000,
            decoder: "avdec_h264".to_string(),
            video_sink: "glimagesink".to_string(),
            sync: false,
        }
    }
}

impl ViewerConfig {
    /// Load configuration with priority: env vars > config file > defaults.
    ///
    /// The config file is only read when `V3XCTRL_GST_CONFIG` names one.
    pub fn load() -> Result<Self, ViewerError> {
        let config_file = std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from);
        Self::from_figment(config_file.as_deref())
    }

    /// Load configuration from an explicit config file path plus the environment.
    pub fn from_figment(config_file: Option<&Path>) -> Result<Self, ViewerError> {
        Ok(Self::figment(config_file).extract()?)
    }

    fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        // V3XCTRL_GST_PIPELINE__LATENCY_MS -> pipeline.latency_ms
        figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn clear_env() {
        for key in [
            "V3XCTRL_GST_GL_API",
            "V3XCTRL_GST_LOG_LEVEL",
            "V3XCTRL_GST_PIPELINE__LATENCY_MS",
            "V3XCTRL_GST_PIPELINE__DECODER",
            CONFIG_FILE_ENV,
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();

        let config = ViewerConfig::load().unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.gl_api, "gles2");
        assert!(config.log_level.is_none());
        assert_eq!(config.pipeline.latency_ms, 0);
        assert!(config.pipeline.drop_on_latency);
        assert_eq!(config.pipeline.payload, 96);
        assert_eq!(config.pipeline.clock_rate, 90_000);
        assert_eq!(config.pipeline.video_sink, "glimagesink");
        assert!(!config.pipeline.sync);
    }

    #[test]
    #[serial]
    fn test_config_file() {
        clear_env();

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("viewer.toml");
        fs::write(
            &path,
            r#"
log_level = "debug"

[pipeline]
latency_ms = 40
decoder = "amcviddec-omxqcomvideodecoderavc"
"#,
        )
        .unwrap();

        std::env::set_var(CONFIG_FILE_ENV, &path);
        let config = ViewerConfig::load().unwrap();
        clear_env();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.pipeline.latency_ms, 40);
        assert_eq!(config.pipeline.decoder, "amcviddec-omxqcomvideodecoderavc");
        // Untouched keys keep their defaults
        assert_eq!(config.gl_api, "gles2");
        assert_eq!(config.pipeline.payload, 96);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_env();

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("viewer.toml");
        fs::write(&path, "[pipeline]\nlatency_ms = 40\n").unwrap();

        std::env::set_var("V3XCTRL_GST_PIPELINE__LATENCY_MS", "120");
        std::env::set_var("V3XCTRL_GST_GL_API", "opengl");
        let config = ViewerConfig::from_figment(Some(&path)).unwrap();
        clear_env();

        assert_eq!(config.pipeline.latency_ms, 120);
        assert_eq!(config.gl_api, "opengl");
    }

    #[test]
    #[serial]
    fn test_invalid_value_is_an_error() {
        clear_env();

        std::env::set_var("V3XCTRL_GST_PIPELINE__LATENCY_MS", "soon");
        let result = ViewerConfig::load();
        clear_env();

        assert!(matches!(result, Err(ViewerError::Config(_))));
    }
}
