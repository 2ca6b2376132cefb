mod transcription_pipeline;

pub use transcription_pipeline::{CHUNK_SIZE, TranscriptionPipeline, sanitize_filename};
