mod pcm_profile;
mod transcription_result;

pub use pcm_profile::PcmProfile;
pub use transcription_result::{TranscriptionResult, TranscriptionStatus};
