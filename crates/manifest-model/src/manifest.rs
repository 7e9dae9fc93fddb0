//! Manifest and scene types.
//!
//! A manifest is the top-level container describing one language-learning
//! video: project metadata plus an ordered sequence of scenes. Manifests own
//! their scenes by value; every derived structure (validation reports, timing
//! segments, frames) is computed fresh from a manifest snapshot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Top-level manifest file (`manifest.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Human-readable project name.
    pub project_name: String,

    /// Target output resolution.
    #[serde(default)]
    pub resolution: Resolution,

    /// Default background image path, resolved against declared assets.
    #[serde(default)]
    pub default_background: Option<String>,

    /// Ordered scenes. Order defines playback order.
    pub scenes: Vec<Scene>,
}

/// Output resolution, serialized as the `"WxH"` string the manifest format
/// uses (for example `"1920x1080"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once('x')
            .ok_or_else(|| format!("resolution must be \"WxH\", got {s:?}"))?;
        let width = w
            .parse::<u32>()
            .map_err(|_| format!("invalid resolution width in {s:?}"))?;
        let height = h
            .parse::<u32>()
            .map_err(|_| format!("invalid resolution height in {s:?}"))?;
        Ok(Self { width, height })
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Resolution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One unit of manifest content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Unique identifier within the manifest (lowercase, digits, underscores).
    pub id: String,

    /// The scene payload.
    #[serde(flatten)]
    pub kind: SceneKind,
}

/// Discriminated union of scene types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SceneKind {
    /// Opening narration.
    Intro {
        /// Free-text script, spoken by the native voice.
        full_script: String,
    },

    /// Closing narration.
    Ending {
        full_script: String,
    },

    /// One expression taught across two screens: native-only, then the full
    /// multilingual breakdown.
    Conversation {
        /// Position among conversation scenes; drives mark naming.
        sequence: u32,
        /// Native-language sentence (screen 1 and 2).
        native_script: String,
        /// Learning-language sentence (screen 2).
        learning_script: String,
        /// Phonetic reading of the learning sentence (screen 2).
        reading_script: String,
    },

    /// Free-form dialogue between labelled speakers.
    Dialogue {
        /// Ordered speaker turns.
        script: Vec<DialogueLine>,
    },
}

/// One speaker turn in a dialogue scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueLine {
    /// Speaker label (A, B, C, ...).
    pub speaker: String,

    /// Spoken text.
    pub text: String,
}

impl Scene {
    /// The manifest-format type tag for this scene.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            SceneKind::Intro { .. } => "intro",
            SceneKind::Ending { .. } => "ending",
            SceneKind::Conversation { .. } => "conversation",
            SceneKind::Dialogue { .. } => "dialogue",
        }
    }
}

impl Manifest {
    /// Scenes of a given type tag, in manifest order.
    pub fn scenes_of_type(&self, type_name: &str) -> Vec<&Scene> {
        self.scenes
            .iter()
            .filter(|s| s.type_name() == type_name)
            .collect()
    }

    /// Conversation scenes paired with their sequence numbers, in manifest
    /// order.
    pub fn conversation_scenes(&self) -> Vec<(u32, &Scene)> {
        self.scenes
            .iter()
            .filter_map(|s| match s.kind {
                SceneKind::Conversation { sequence, .. } => Some((sequence, s)),
                _ => None,
            })
            .collect()
    }

    /// Rough length estimate for the rendered video, in seconds.
    ///
    /// Declared heuristic: ten seconds per scene. Used only for the
    /// business-rule duration bound; real timing comes from the synthesis
    /// backend.
    pub fn estimated_duration_secs(&self) -> f64 {
        self.scenes.len() as f64 * 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_manifest() -> Manifest {
        Manifest {
            project_name: "Korean Basics".to_string(),
            resolution: Resolution::default(),
            default_background: None,
            scenes: vec![
                Scene {
                    id: "intro_01".to_string(),
                    kind: SceneKind::Intro {
                        full_script: "오늘의 표현을 배워 봅시다.".to_string(),
                    },
                },
                Scene {
                    id: "conversation_01".to_string(),
                    kind: SceneKind::Conversation {
                        sequence: 1,
                        native_script: "안녕하세요!".to_string(),
                        learning_script: "你好！".to_string(),
                        reading_script: "nǐ hǎo".to_string(),
                    },
                },
                Scene {
                    id: "ending_01".to_string(),
                    kind: SceneKind::Ending {
                        full_script: "다음 시간에 만나요.".to_string(),
                    },
                },
            ],
        }
    }

    #[test]
    fn test_resolution_parses_and_formats() {
        let r: Resolution = "1280x720".parse().unwrap();
        assert_eq!(r, Resolution::new(1280, 720));
        assert_eq!(r.to_string(), "1280x720");
        assert!("1080p".parse::<Resolution>().is_err());
        assert!("x720".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_scene_json_shape_is_flat() {
        let scene = Scene {
            id: "conversation_01".to_string(),
            kind: SceneKind::Conversation {
                sequence: 1,
                native_script: "안녕하세요!".to_string(),
                learning_script: "你好！".to_string(),
                reading_script: "nǐ hǎo".to_string(),
            },
        };
        let value = serde_json::to_value(&scene).unwrap();
        assert_eq!(value["type"], "conversation");
        assert_eq!(value["id"], "conversation_01");
        assert_eq!(value["sequence"], 1);
        assert_eq!(value["native_script"], "안녕하세요!");
    }

    #[test]
    fn test_scenes_of_type_preserves_manifest_order() {
        let manifest = sample_manifest();
        let intros = manifest.scenes_of_type("intro");
        assert_eq!(intros.len(), 1);
        assert_eq!(intros[0].id, "intro_01");
        assert_eq!(manifest.conversation_scenes(), vec![(
            1,
            &manifest.scenes[1]
        )]);
    }

    #[test]
    fn test_estimated_duration_is_ten_seconds_per_scene() {
        let manifest = sample_manifest();
        assert!((manifest.estimated_duration_secs() - 30.0).abs() < 1e-9);
    }
}
