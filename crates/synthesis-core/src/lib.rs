//! Lingocast Synthesis Core
//!
//! Turns validated manifests into speech-synthesis markup and reconciles the
//! resulting timing marks into ordered segments:
//! - **Markup:** Scene → SSML with deterministically named marks
//! - **Segmenter:** Mark extraction, time assignment (reported or estimated),
//!   and advisory consistency checks
//! - **Backend:** The trait seam the external TTS collaborator implements
//!
//! This crate is pure computation; the only I/O is reading and writing the
//! timing artifact file.

pub mod backend;
pub mod markup;
pub mod segmenter;

pub use backend::*;
pub use markup::*;
pub use segmenter::*;
