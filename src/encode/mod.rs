//! Video encoders consuming a video's frame sequence and narration tracks.

pub mod encoder;
pub mod ffmpeg;
pub mod keyframes;
pub mod recording;

pub use encoder::{AudioTrack, EncodeJob, EncodedArtifact, VideoEncoder};
pub use ffmpeg::FfmpegEncoder;
pub use keyframes::KeyframeEncoder;
pub use recording::{RecordedJob, RecordingEncoder};
