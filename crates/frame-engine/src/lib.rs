//! Lingocast Frame Engine
//!
//! Derives the ordered visual-frame sequence from a manifest and its timing
//! segments, and emits the artifacts the external collaborators consume:
//!
//! ```text
//! manifest ────┐
//!              ├── Frame Sequencer ──► frames.json
//! timing ──────┘         │
//!                        ├──► concat list ──► external muxer
//!                        └──► FrameRenderer seam ──► PNG sequence
//! ```
//!
//! Rendering and muxing themselves are external; this crate only defines
//! their trait seams.

pub mod backend;
pub mod concat;
pub mod sequencer;

pub use backend::*;
pub use concat::*;
pub use sequencer::*;
