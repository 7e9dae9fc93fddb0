//! Speech synthesis backend seam.
//!
//! The core never talks to a TTS service itself. A backend implementor
//! receives the complete manifest markup in one call and returns the audio
//! artifact plus, when the service supports it, real per-mark offsets.
//! Retries and timeouts belong to the implementor; a failure here is
//! terminal for the current manifest.

use lingocast_common::error::LingocastError;

use crate::segmenter::MarkTime;

/// Result of one synthesis call.
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    /// Encoded audio bytes (container decided by the backend).
    pub audio: Vec<u8>,

    /// Total audio duration in seconds.
    pub total_duration_secs: f64,

    /// Per-mark time offsets, when the backend reports them. `None` means
    /// the segmenter must estimate.
    pub mark_times: Option<Vec<MarkTime>>,
}

/// Errors from a synthesis backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Synthesis backend failure: {message}")]
    Failure { message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BackendError {
    pub fn failure(msg: impl Into<String>) -> Self {
        Self::Failure {
            message: msg.into(),
        }
    }
}

impl From<BackendError> for LingocastError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Failure { message } => Self::backend(message),
            BackendError::Other(source) => Self::Other(source),
        }
    }
}

/// The external text-to-speech collaborator.
///
/// Issued once per manifest (batched), never per scene.
pub trait SpeechBackend {
    fn synthesize(&self, markup: &str) -> Result<SynthesisOutput, BackendError>;
}
