//! Lingocast Manifest Model
//!
//! Defines the core data contracts for Lingocast projects:
//! - **Manifest:** Typed representation of a project and its ordered scenes
//! - **Parser:** JSON ⇄ model conversion with a content-keyed cache
//! - **Validator:** Structural, referential, and business-rule checks
//!
//! Scene order within a manifest is significant: it defines playback order
//! for every downstream consumer.

pub mod manifest;
pub mod parser;
pub mod validator;

pub use manifest::*;
pub use parser::*;
pub use validator::*;
