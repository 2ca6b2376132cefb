mod health;
mod transcribe;

pub use health::health_handler;
pub use transcribe::{FILE_FIELD, transcribe_handler};
