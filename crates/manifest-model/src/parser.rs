//! Manifest parsing and serialization.
//!
//! Parsing is purely structural: it distinguishes unparsable JSON
//! ([`ParseError::MalformedInput`]) from structurally invalid manifests
//! ([`ParseError::Schema`]) and never runs business validation. Cross-field
//! rules live in [`crate::validator`].

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use lingocast_common::error::LingocastError;
use serde_json::Value;

use crate::manifest::{Manifest, Scene, SceneKind};

/// Errors produced while converting between JSON and [`Manifest`].
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The source is not valid JSON at all.
    #[error("Malformed JSON at line {line}, column {column}: {message}")]
    MalformedInput {
        line: usize,
        column: usize,
        message: String,
    },

    /// The source is valid JSON but does not match the manifest schema.
    #[error("Schema error: {message}")]
    Schema { message: String },

    #[error("Manifest file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

impl From<ParseError> for LingocastError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::MalformedInput {
                line,
                column,
                message,
            } => Self::malformed_input(format!("line {line}, column {column}: {message}")),
            ParseError::Schema { message } => Self::schema("manifest", message),
            ParseError::NotFound { path } => Self::FileNotFound { path },
            ParseError::Io { source, .. } => Self::Io(source),
        }
    }
}

/// Parse a manifest from a JSON file.
pub fn from_path(path: impl AsRef<Path>) -> ParseResult<Manifest> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ParseError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    from_str(&text)
}

/// Parse a manifest from raw JSON text.
///
/// Two-phase so syntax failures and schema failures stay distinguishable:
/// text is first decoded to a generic value, then mapped onto the model.
pub fn from_str(text: &str) -> ParseResult<Manifest> {
    let value: Value = serde_json::from_str(text).map_err(|e| ParseError::MalformedInput {
        line: e.line(),
        column: e.column(),
        message: e.to_string(),
    })?;
    from_value(value)
}

/// Parse a manifest from an already-decoded JSON value.
pub fn from_value(value: Value) -> ParseResult<Manifest> {
    serde_json::from_value(value).map_err(|e| ParseError::Schema {
        message: e.to_string(),
    })
}

/// Serialize a manifest to a JSON value.
pub fn to_value(manifest: &Manifest) -> ParseResult<Value> {
    serde_json::to_value(manifest).map_err(|e| ParseError::Schema {
        message: e.to_string(),
    })
}

/// Serialize a manifest to pretty-printed JSON text.
pub fn to_string(manifest: &Manifest) -> ParseResult<String> {
    serde_json::to_string_pretty(manifest).map_err(|e| ParseError::Schema {
        message: e.to_string(),
    })
}

/// Write a manifest to disk as pretty-printed JSON, creating parent
/// directories as needed.
pub fn save(manifest: &Manifest, path: impl AsRef<Path>) -> ParseResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ParseError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let json = to_string(manifest)?;
    std::fs::write(path, json).map_err(|e| ParseError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Starter manifest with one intro, one conversation, and one ending.
pub fn template(project_name: impl Into<String>) -> Manifest {
    Manifest {
        project_name: project_name.into(),
        resolution: Default::default(),
        default_background: None,
        scenes: vec![
            Scene {
                id: "intro_01".to_string(),
                kind: SceneKind::Intro {
                    full_script: "프로젝트 소개 문구를 입력하세요.".to_string(),
                },
            },
            Scene {
                id: "conversation_01".to_string(),
                kind: SceneKind::Conversation {
                    sequence: 1,
                    native_script: "원어 문장을 입력하세요.".to_string(),
                    learning_script: "학습어 문장을 입력하세요.".to_string(),
                    reading_script: "읽기 문장을 입력하세요.".to_string(),
                },
            },
            Scene {
                id: "ending_01".to_string(),
                kind: SceneKind::Ending {
                    full_script: "마무리 문구를 입력하세요.".to_string(),
                },
            },
        ],
    }
}

/// Explicit content-keyed manifest cache.
///
/// Keys are a hash of the source bytes, so re-parsing identical text is a
/// lookup. Owned by the caller; there is no hidden global cache.
#[derive(Debug, Default)]
pub struct ManifestCache {
    entries: HashMap<u64, Manifest>,
}

impl ManifestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text`, reusing a previously parsed manifest for identical
    /// source bytes.
    pub fn get_or_parse(&mut self, text: &str) -> ParseResult<Manifest> {
        let key = content_key(text.as_bytes());
        if let Some(manifest) = self.entries.get(&key) {
            tracing::debug!(key, "manifest cache hit");
            return Ok(manifest.clone());
        }
        let manifest = from_str(text)?;
        self.entries.insert(key, manifest.clone());
        Ok(manifest)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn content_key(bytes: &[u8]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}
