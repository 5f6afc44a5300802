//! Frame sinks, the raw WebM capture and the MP4 transcode stage.

pub mod capture;
pub mod engine;
pub mod ffmpeg;
pub mod sink;
pub mod transcode;
