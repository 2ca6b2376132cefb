mod ffmpeg_normalizer;
mod pcm_stream;

pub use ffmpeg_normalizer::FfmpegNormalizer;
pub use pcm_stream::{PcmStream, PcmStreamError};
