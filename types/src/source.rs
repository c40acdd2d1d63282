//! Video source selection.

use crate::TEST_PATTERN_PORT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A port number handed in by the host that cannot be bound by `udpsrc`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid video port {0} (expected 0..=65535)")]
pub struct InvalidPort(pub i32);

/// Where the viewer takes its frames from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VideoSource {
    /// Locally generated test pattern, used to check the render path
    /// without a sender.
    TestPattern,
    /// H.264 over RTP received on a UDP port.
    Rtp { port: u16 },
}

impl VideoSource {
    /// Select a source from the port the host passed in.
    ///
    /// Port `0` means "no stream, show the test pattern".
    pub fn from_port(port: i32) -> Result<Self, InvalidPort> {
        let port = u16::try_from(port).map_err(|_| InvalidPort(port))?;
        if port == TEST_PATTERN_PORT {
            Ok(Self::TestPattern)
        } else {
            Ok(Self::Rtp { port })
        }
    }

    /// The UDP port this source listens on, `0` for the test pattern.
    pub fn port(&self) -> u16 {
        match self {
            Self::TestPattern => TEST_PATTERN_PORT,
            Self::Rtp { port } => *port,
        }
    }
}
