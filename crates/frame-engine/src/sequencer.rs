//! Frame sequencing.
//!
//! One frame per timing segment, in manifest order. Ordering is always taken
//! from the manifest: scenes are walked in playback order and matched to
//! segments by mark prefix, never re-sorted by timestamp, since estimated
//! timestamps can tie.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use lingocast_common::config::OutputDefaults;
use lingocast_manifest_model::{Manifest, SceneKind};
use lingocast_synthesis_core::markup::{
    dialogue_mark_prefix, narration_mark_prefix, screen_mark_prefix, MARK_START_SUFFIX,
};
use lingocast_synthesis_core::segmenter::TimingSegment;

/// Which visual state a frame shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenType {
    /// Conversation screen 1: index + native text.
    Screen1,
    /// Conversation screen 2: index + native + learning + reading text.
    Screen2,
    /// Intro/ending narration.
    Narration,
    /// One dialogue turn.
    Dialogue,
}

/// One rendered visual unit with an exact on-screen duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub frame_number: usize,
    #[serde(rename = "start_time")]
    pub start_secs: f64,
    #[serde(rename = "end_time")]
    pub end_secs: f64,
    #[serde(rename = "duration")]
    pub duration_secs: f64,
    pub scene_id: String,
    pub screen_type: ScreenType,
    /// Ordered text lines to draw.
    pub content: Vec<String>,
    /// Where the rendered image goes, relative to the output directory root.
    pub output_path: String,
}

/// Configuration for frame sequencing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Frames-per-second recorded in the frame manifest for the external
    /// renderer and muxer.
    pub fps: u32,

    /// Directory frame images are written into.
    pub output_dir: PathBuf,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            output_dir: PathBuf::from("frames"),
        }
    }
}

impl FrameConfig {
    pub fn from_output_defaults(defaults: &OutputDefaults, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            fps: defaults.fps,
            output_dir: output_dir.into(),
        }
    }
}

/// Result of sequencing: frames plus advisory warnings.
///
/// Warnings cover degenerate segments and manifest/segment mismatches; they
/// never abort sequencing.
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    pub frames: Vec<Frame>,
    pub warnings: Vec<String>,
}

/// Derive the frame sequence for a manifest from its timing segments.
pub fn sequence(
    manifest: &Manifest,
    segments: &[TimingSegment],
    config: &FrameConfig,
) -> FrameSequence {
    let mut result = FrameSequence::default();

    let mut by_start_mark: HashMap<&str, &TimingSegment> = HashMap::new();
    for segment in segments {
        if by_start_mark
            .insert(segment.start_mark.as_str(), segment)
            .is_some()
        {
            result.warnings.push(format!(
                "duplicate segment for mark {:?}; keeping the later one",
                segment.start_mark
            ));
        }
    }

    for scene in &manifest.scenes {
        for (prefix, screen_type, content) in scene_screens(scene) {
            let start_mark = format!("{prefix}{MARK_START_SUFFIX}");
            let Some(segment) = by_start_mark.remove(start_mark.as_str()) else {
                result.warnings.push(format!(
                    "scene {:?}: no timing segment for mark {start_mark:?}",
                    scene.id
                ));
                continue;
            };

            if segment.duration_secs <= 0.0 {
                result.warnings.push(format!(
                    "scene {:?}: segment {prefix} has non-positive duration {:.3}s",
                    scene.id, segment.duration_secs
                ));
            }

            let frame_number = result.frames.len();
            result.frames.push(Frame {
                frame_number,
                start_secs: segment.start_secs,
                end_secs: segment.end_secs,
                duration_secs: segment.duration_secs,
                scene_id: scene.id.clone(),
                screen_type,
                content,
                output_path: config
                    .output_dir
                    .join(format!("frame_{frame_number:04}.png"))
                    .to_string_lossy()
                    .into_owned(),
            });
        }
    }

    // Segments with no owning scene are reported, not silently dropped.
    for segment in segments {
        if by_start_mark.contains_key(segment.start_mark.as_str()) {
            result.warnings.push(format!(
                "segment {:?} has no owning scene in the manifest",
                segment.start_mark
            ));
        }
    }

    tracing::debug!(
        frames = result.frames.len(),
        warnings = result.warnings.len(),
        "frame sequence built"
    );
    result
}

/// The screens a scene contributes, in playback order: mark prefix, screen
/// type, and content lines per the screen rules.
fn scene_screens(
    scene: &lingocast_manifest_model::Scene,
) -> Vec<(String, ScreenType, Vec<String>)> {
    match &scene.kind {
        SceneKind::Intro { full_script } | SceneKind::Ending { full_script } => vec![(
            narration_mark_prefix(&scene.id),
            ScreenType::Narration,
            vec![full_script.clone()],
        )],
        SceneKind::Conversation {
            sequence,
            native_script,
            learning_script,
            reading_script,
        } => {
            let index = format!("{sequence}.");
            vec![
                (
                    screen_mark_prefix(*sequence, 1),
                    ScreenType::Screen1,
                    vec![index.clone(), native_script.clone()],
                ),
                (
                    screen_mark_prefix(*sequence, 2),
                    ScreenType::Screen2,
                    vec![
                        index,
                        native_script.clone(),
                        learning_script.clone(),
                        reading_script.clone(),
                    ],
                ),
            ]
        }
        SceneKind::Dialogue { script } => script
            .iter()
            .enumerate()
            .map(|(i, line)| {
                (
                    dialogue_mark_prefix(&scene.id, &line.speaker, i),
                    ScreenType::Dialogue,
                    vec![format!("{}: {}", line.speaker, line.text)],
                )
            })
            .collect(),
    }
}

/// On-disk frame manifest (`frames.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameManifest {
    pub total_frames: usize,

    /// Target resolution as "WxH".
    pub resolution: String,

    /// Playback frame rate for the external renderer and muxer.
    pub fps: u32,

    /// RFC 3339 generation timestamp.
    pub generated_at: String,

    pub frames: Vec<Frame>,
}

impl FrameManifest {
    pub fn new(manifest: &Manifest, config: &FrameConfig, frames: Vec<Frame>) -> Self {
        Self {
            total_frames: frames.len(),
            resolution: manifest.resolution.to_string(),
            fps: config.fps,
            generated_at: chrono::Utc::now().to_rfc3339(),
            frames,
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(std::io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingocast_manifest_model::{parser, DialogueLine, Scene};
    use lingocast_synthesis_core::markup::{MarkupBuilder, SynthesisConfig};
    use lingocast_synthesis_core::segmenter::{self, SegmenterConfig, TimingSource};

    fn template_segments(manifest: &Manifest) -> Vec<TimingSegment> {
        let builder = MarkupBuilder::new(SynthesisConfig::default());
        let marks = segmenter::extract_marks(&builder.manifest_markup(manifest));
        segmenter::assign_times(
            &marks,
            &TimingSource::Estimated {
                total_duration_secs: 40.0,
            },
            &SegmenterConfig::default(),
        )
    }

    #[test]
    fn test_one_frame_per_segment_with_matching_times() {
        let manifest = parser::template("t");
        let segments = template_segments(&manifest);
        let result = sequence(&manifest, &segments, &FrameConfig::default());

        assert_eq!(result.frames.len(), segments.len());
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        for (frame, segment) in result.frames.iter().zip(&segments) {
            assert_eq!(frame.start_secs, segment.start_secs);
            assert_eq!(frame.end_secs, segment.end_secs);
            assert_eq!(frame.duration_secs, segment.duration_secs);
        }
    }

    #[test]
    fn test_conversation_scene_emits_exactly_two_frames() {
        let manifest = parser::template("t");
        let segments = template_segments(&manifest);
        let result = sequence(&manifest, &segments, &FrameConfig::default());

        let conversation_frames: Vec<_> = result
            .frames
            .iter()
            .filter(|f| f.scene_id == "conversation_01")
            .collect();
        assert_eq!(conversation_frames.len(), 2);
        assert_eq!(conversation_frames[0].screen_type, ScreenType::Screen1);
        assert_eq!(conversation_frames[1].screen_type, ScreenType::Screen2);
    }

    #[test]
    fn test_screen_content_rules() {
        let mut manifest = parser::template("t");
        if let SceneKind::Conversation {
            native_script,
            learning_script,
            reading_script,
            ..
        } = &mut manifest.scenes[1].kind
        {
            *native_script = "안녕하세요!".to_string();
            *learning_script = "你好！".to_string();
            *reading_script = "nǐ hǎo".to_string();
        }
        let segments = template_segments(&manifest);
        let result = sequence(&manifest, &segments, &FrameConfig::default());

        let screen1 = &result.frames[1];
        assert_eq!(screen1.content, vec!["1.", "안녕하세요!"]);
        let screen2 = &result.frames[2];
        assert_eq!(screen2.content, vec!["1.", "안녕하세요!", "你好！", "nǐ hǎo"]);
    }

    #[test]
    fn test_ordering_comes_from_manifest_even_with_tied_timestamps() {
        let manifest = parser::template("t");
        let mut segments = template_segments(&manifest);
        // Estimated timestamps can tie; collapse everything to zero.
        for s in &mut segments {
            s.start_secs = 0.0;
            s.end_secs = 0.0;
            s.duration_secs = 0.0;
        }
        segments.reverse();

        let result = sequence(&manifest, &segments, &FrameConfig::default());
        let ids: Vec<&str> = result.frames.iter().map(|f| f.scene_id.as_str()).collect();
        assert_eq!(
            ids,
            ["intro_01", "conversation_01", "conversation_01", "ending_01"]
        );
    }

    #[test]
    fn test_dialogue_scene_emits_one_frame_per_turn() {
        let mut manifest = parser::template("t");
        manifest.scenes.push(Scene {
            id: "dialogue_01".to_string(),
            kind: SceneKind::Dialogue {
                script: vec![
                    DialogueLine {
                        speaker: "A".to_string(),
                        text: "밥 먹었어요?".to_string(),
                    },
                    DialogueLine {
                        speaker: "B".to_string(),
                        text: "네, 먹었어요.".to_string(),
                    },
                ],
            },
        });
        let segments = template_segments(&manifest);
        let result = sequence(&manifest, &segments, &FrameConfig::default());
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);

        let dialogue: Vec<_> = result
            .frames
            .iter()
            .filter(|f| f.scene_id == "dialogue_01")
            .collect();
        assert_eq!(dialogue.len(), 2);
        assert!(dialogue
            .iter()
            .all(|f| f.screen_type == ScreenType::Dialogue));
        assert_eq!(dialogue[0].content, vec!["A: 밥 먹었어요?"]);
        assert_eq!(dialogue[1].content, vec!["B: 네, 먹었어요."]);
    }

    #[test]
    fn test_duplicate_start_marks_are_warned_not_dropped_silently() {
        let manifest = parser::template("t");
        let mut segments = template_segments(&manifest);
        segments.push(segments[0].clone());

        let result = sequence(&manifest, &segments, &FrameConfig::default());
        assert_eq!(result.frames.len(), segments.len() - 1);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("duplicate segment")));
    }

    #[test]
    fn test_zero_duration_segment_is_flagged_but_framed() {
        let manifest = parser::template("t");
        let mut segments = template_segments(&manifest);
        segments[0].end_secs = segments[0].start_secs;
        segments[0].duration_secs = 0.0;

        let result = sequence(&manifest, &segments, &FrameConfig::default());
        assert_eq!(result.frames.len(), segments.len());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("non-positive duration")));
    }

    #[test]
    fn test_missing_and_orphan_segments_are_reported() {
        let manifest = parser::template("t");
        let mut segments = template_segments(&manifest);
        segments[0].start_mark = "unknown_start".to_string();

        let result = sequence(&manifest, &segments, &FrameConfig::default());
        assert_eq!(result.frames.len(), segments.len() - 1);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("no timing segment")));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("no owning scene")));
    }

    #[test]
    fn test_output_paths_are_numbered() {
        let manifest = parser::template("t");
        let segments = template_segments(&manifest);
        let config = FrameConfig {
            fps: 30,
            output_dir: PathBuf::from("out"),
        };
        let result = sequence(&manifest, &segments, &config);
        assert!(result.frames[0].output_path.ends_with("frame_0000.png"));
        assert!(result.frames[3].output_path.ends_with("frame_0003.png"));
    }

    #[test]
    fn test_frame_manifest_round_trips() {
        let manifest = parser::template("t");
        let segments = template_segments(&manifest);
        let result = sequence(&manifest, &segments, &FrameConfig::default());

        let fm = FrameManifest::new(&manifest, &FrameConfig::default(), result.frames);
        assert_eq!(fm.total_frames, 4);
        assert_eq!(fm.resolution, "1920x1080");
        assert_eq!(fm.fps, 30);
        let json = serde_json::to_string_pretty(&fm).unwrap();
        let parsed: FrameManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, fm);
    }
}
