//! Live bout recording.

pub mod recorder;

pub use recorder::{BoutRecorder, TouchCall, DEFAULT_GREEN_NAME, DEFAULT_RED_NAME};
