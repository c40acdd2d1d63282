//! Pipeline description strings handed to `gst::parse::launch`.

use crate::config::PipelineConfig;
use v3xctrl_gst_types::VideoSource;

/// Name given to the sink that renders into the native window.
pub const VIDEO_SINK_NAME: &str = "videosink";

/// Build the launch description for `source`.
///
/// The chain always ends in the configured sink named [`VIDEO_SINK_NAME`].
pub fn describe(source: &VideoSource, config: &PipelineConfig) -> String {
    match source {
        VideoSource::TestPattern => format!(
            "videotestsrc pattern={} ! videoconvert ! {} name={}",
            config.test_pattern, config.video_sink, VIDEO_SINK_NAME
        ),
        VideoSource::Rtp { port } => format!(
            "udpsrc port={port} caps=\"{caps}\" ! \
             rtpjitterbuffer latency={latency} drop-on-latency={drop} ! \
             rtph264depay ! \
             h264parse ! \
             {decoder} ! \
             videoconvert ! \
             {sink} name={name} sync={sync}",
            caps = rtp_caps(config),
            latency = config.latency_ms,
            drop = config.drop_on_latency,
            decoder = config.decoder,
            sink = config.video_sink,
            name = VIDEO_SINK_NAME,
            sync = config.sync,
        ),
    }
}

fn rtp_caps(config: &PipelineConfig) -> String {
    format!(
        "application/x-rtp,media=video,encoding-name=H264,payload={},clock-rate={}",
        config.payload, config.clock_rate
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_test_pattern() {
        let description = describe(&VideoSource::TestPattern, &PipelineConfig::default());
        assert_eq!(
            description,
            "videotestsrc pattern=smpte ! videoconvert ! glimagesink name=videosink"
        );
    }

    #[test]
    fn test_default_rtp_receiver() {
        let description = describe(
            &VideoSource::Rtp { port: 6666 },
            &PipelineConfig::default(),
        );
        assert_eq!(
            description,
            "udpsrc port=6666 caps=\"application/x-rtp,media=video,encoding-name=H264,payload=96,clock-rate=90000\" ! \
             rtpjitterbuffer latency=0 drop-on-latency=true ! \
             rtph264depay ! h264parse ! avdec_h264 ! videoconvert ! \
             glimagesink name=videosink sync=false"
        );
    }

    #[test]
    fn test_configured_rtp_receiver() {
        let config = PipelineConfig {
            latency_ms: 50,
            drop_on_latency: false,
            payload: 102,
            decoder: "decodebin".to_string(),
            video_sink: "fakesink".to_string(),
            sync: true,
            ..PipelineConfig::default()
        };
        let description = describe(&VideoSource::Rtp { port: 5000 }, &config);

        assert!(description.starts_with("udpsrc port=5000 "));
        assert!(description.contains("payload=102,clock-rate=90000"));
        assert!(description.contains("rtpjitterbuffer latency=50 drop-on-latency=false"));
        assert!(description.contains(" ! decodebin ! "));
        assert!(description.ends_with("fakesink name=videosink sync=true"));
    }

    #[test]
    fn test_pattern_and_sink_are_configurable() {
        let config = PipelineConfig {
            test_pattern: "ball".to_string(),
            video_sink: "autovideosink".to_string(),
            ..PipelineConfig::default()
        };
        assert_eq!(
            describe(&VideoSource::TestPattern, &config),
            "videotestsrc pattern=ball ! videoconvert ! autovideosink name=videosink"
        );
    }
}
