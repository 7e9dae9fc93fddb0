//! Rendering and muxing seams.
//!
//! Text rasterization and video muxing are external collaborators. The
//! engine hands them fully resolved data (a [`Frame`] with content lines,
//! or a concat list plus an audio track) and treats any failure as terminal
//! for the current manifest.

use std::path::{Path, PathBuf};

use lingocast_common::error::LingocastError;

use crate::sequencer::Frame;

/// Errors from an external renderer or muxer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Render failure for frame {frame_number}: {message}")]
    Frame { frame_number: usize, message: String },

    #[error("Mux failure: {message}")]
    Mux { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<RenderError> for LingocastError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Frame { .. } | RenderError::Mux { .. } => {
                Self::sequencing(err.to_string())
            }
            RenderError::Io(source) => Self::Io(source),
            RenderError::Other(source) => Self::Other(source),
        }
    }
}

/// External raster text renderer: one image per frame.
pub trait FrameRenderer {
    /// Render the frame's content lines and return the written image path
    /// (the frame's `output_path`).
    fn render(&self, frame: &Frame) -> Result<PathBuf, RenderError>;
}

/// External video muxer: image sequence + audio → video file.
pub trait VideoMuxer {
    fn mux(
        &self,
        concat_list: &str,
        audio_path: &Path,
        output_path: &Path,
    ) -> Result<(), RenderError>;
}
