//! External codec tool invocation.
//!
//! Decoding, resampling and window extraction are delegated to ffmpeg;
//! stream metadata comes from ffprobe. The `CommandExecutor` seam keeps
//! both fully mockable in tests.

pub mod executor;
pub mod ffmpeg;

pub use executor::{CommandExecutor, SystemCommandExecutor};
pub use ffmpeg::FfmpegCodec;
