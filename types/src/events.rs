//! Events emitted by the viewer while a pipeline is alive.

use crate::PipelineState;
use serde::{Deserialize, Serialize};

/// Notifications forwarded from the pipeline bus and the lifecycle calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ViewerEvent {
    /// A pipeline was created and set to PLAYING
    Started { port: u16 },
    /// The pipeline was torn down
    Stopped,
    /// The top-level pipeline changed state
    StateChanged {
        old: PipelineState,
        new: PipelineState,
    },
    /// An element posted an error; the main loop quits after this
    Error {
        message: String,
        debug: Option<String>,
        source: Option<String>,
    },
    /// An element posted a warning
    Warning {
        message: String,
        debug: Option<String>,
        source: Option<String>,
    },
    /// The stream ended
    Eos,
}

impl ViewerEvent {
    /// Short description for log lines.
    pub fn description(&self) -> String {
        match self {
            Self::Started { port } => format!("started on port {}", port),
            Self::Stopped => "stopped".to_string(),
            Self::StateChanged { old, new } => format!("state {} -> {}", old, new),
            Self::Error {
                message, source, ..
            } => match source {
                Some(source) => format!("error from {}: {}", source, message),
                None => format!("error: {}", message),
            },
            Self::Warning {
                message, source, ..
            } => match source {
                Some(source) => format!("warning from {}: {}", source, message),
                None => format!("warning: {}", message),
            },
            Self::Eos => "end of stream".to_string(),
        }
    }
}
