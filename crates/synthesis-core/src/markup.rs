//! SSML generation with embedded timing marks.
//!
//! The builder is deterministic and pure: the same scene and configuration
//! always produce the same markup. Mark names are generated by the
//! `*_mark_prefix` functions below; the segmenter pairs marks by the same
//! prefixes, so any change to naming must update both sides atomically.

use lingocast_common::config::SpeechDefaults;
use lingocast_manifest_model::{DialogueLine, Manifest, Scene, SceneKind};

/// Suffix appended to a mark prefix at a segment's opening edge.
pub const MARK_START_SUFFIX: &str = "_start";
/// Suffix appended to a mark prefix at a segment's closing edge.
pub const MARK_END_SUFFIX: &str = "_end";

/// Mark prefix for one screen of a conversation scene:
/// `scene_{sequence}_screen{1|2}`.
pub fn screen_mark_prefix(sequence: u32, screen: u8) -> String {
    format!("scene_{sequence}_screen{screen}")
}

/// Mark prefix for an intro/ending narration: the scene id itself.
pub fn narration_mark_prefix(scene_id: &str) -> String {
    scene_id.to_string()
}

/// Mark prefix for one dialogue turn.
pub fn dialogue_mark_prefix(scene_id: &str, speaker: &str, turn: usize) -> String {
    format!("{scene_id}_speaker_{speaker}_{turn}")
}

/// One synthesis voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSpec {
    /// Backend voice identifier (e.g. "ko-KR-Standard-A").
    pub name: String,

    /// BCP-47 language tag.
    pub language: String,
}

/// Configuration for the markup builder.
///
/// Voice and prosody attributes are per-scene-type configuration, threaded
/// in explicitly; nothing here is read from ambient state.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Voice used for native-language text and narration.
    pub native_voice: VoiceSpec,

    /// Learner voices, one learning-language repetition per entry.
    pub learner_voices: Vec<VoiceSpec>,

    /// Silence between voices and between scenes, in seconds.
    pub silence_secs: f64,

    /// Prosody rate attribute.
    pub rate: String,

    /// Prosody pitch attribute.
    pub pitch: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self::from_speech_defaults(&SpeechDefaults::default())
    }
}

impl SynthesisConfig {
    /// Build a synthesis configuration from the application defaults.
    pub fn from_speech_defaults(defaults: &SpeechDefaults) -> Self {
        Self {
            native_voice: VoiceSpec {
                name: defaults.native_voice.clone(),
                language: defaults.native_language.clone(),
            },
            learner_voices: defaults
                .learner_voices
                .iter()
                .map(|name| VoiceSpec {
                    name: name.clone(),
                    language: defaults.learner_language.clone(),
                })
                .collect(),
            silence_secs: defaults.silence_secs,
            rate: "medium".to_string(),
            pitch: "medium".to_string(),
        }
    }
}

/// Scene → SSML builder.
#[derive(Debug, Clone, Default)]
pub struct MarkupBuilder {
    config: SynthesisConfig,
}

impl MarkupBuilder {
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    /// Markup for a whole manifest: scenes in manifest order inside a single
    /// `<speak>` envelope, separated by the configured silence.
    pub fn manifest_markup(&self, manifest: &Manifest) -> String {
        let bodies: Vec<String> = manifest.scenes.iter().map(|s| self.scene_body(s)).collect();
        tracing::debug!(scenes = bodies.len(), "built manifest markup");
        self.envelope(&bodies.join(&format!("\n{}\n", self.break_tag())))
    }

    /// Markup for a single scene inside its own `<speak>` envelope.
    pub fn scene_markup(&self, scene: &Scene) -> String {
        self.envelope(&self.scene_body(scene))
    }

    fn scene_body(&self, scene: &Scene) -> String {
        match &scene.kind {
            SceneKind::Intro { full_script } | SceneKind::Ending { full_script } => {
                self.narration_body(&scene.id, full_script)
            }
            SceneKind::Conversation {
                sequence,
                native_script,
                learning_script,
                ..
            } => self.conversation_body(*sequence, native_script, learning_script),
            SceneKind::Dialogue { script } => self.dialogue_body(&scene.id, script),
        }
    }

    /// Conversation body: screen 1 (native voice), a silence, then screen 2
    /// (each learner voice in turn with silence between voices).
    fn conversation_body(&self, sequence: u32, native: &str, learning: &str) -> String {
        let mut parts = vec![];
        let screen1 = screen_mark_prefix(sequence, 1);
        let screen2 = screen_mark_prefix(sequence, 2);

        parts.push(format!("<voice name=\"{}\">", self.config.native_voice.name));
        parts.push(format!("<mark name=\"{screen1}{MARK_START_SUFFIX}\"/>"));
        parts.push(self.prosody(native));
        parts.push(format!("<mark name=\"{screen1}{MARK_END_SUFFIX}\"/>"));
        parts.push("</voice>".to_string());
        parts.push(self.break_tag());

        parts.push(format!("<mark name=\"{screen2}{MARK_START_SUFFIX}\"/>"));
        for (i, voice) in self.config.learner_voices.iter().enumerate() {
            parts.push(format!("<voice name=\"{}\">", voice.name));
            parts.push(self.prosody(learning));
            parts.push("</voice>".to_string());
            if i + 1 < self.config.learner_voices.len() {
                parts.push(self.break_tag());
            }
        }
        parts.push(format!("<mark name=\"{screen2}{MARK_END_SUFFIX}\"/>"));

        parts.join("\n")
    }

    fn narration_body(&self, scene_id: &str, script: &str) -> String {
        let prefix = narration_mark_prefix(scene_id);
        [
            format!("<voice name=\"{}\">", self.config.native_voice.name),
            format!("<mark name=\"{prefix}{MARK_START_SUFFIX}\"/>"),
            self.prosody(script),
            format!("<mark name=\"{prefix}{MARK_END_SUFFIX}\"/>"),
            "</voice>".to_string(),
        ]
        .join("\n")
    }

    fn dialogue_body(&self, scene_id: &str, script: &[DialogueLine]) -> String {
        let mut parts = vec![];
        for (i, line) in script.iter().enumerate() {
            let prefix = dialogue_mark_prefix(scene_id, &line.speaker, i);
            parts.push(format!(
                "<voice name=\"{}\">",
                self.speaker_voice(&line.speaker).name
            ));
            parts.push(format!("<mark name=\"{prefix}{MARK_START_SUFFIX}\"/>"));
            parts.push(self.prosody(&line.text));
            parts.push(format!("<mark name=\"{prefix}{MARK_END_SUFFIX}\"/>"));
            parts.push("</voice>".to_string());
            if i + 1 < script.len() {
                parts.push(self.break_tag());
            }
        }
        parts.join("\n")
    }

    /// Speaker label → voice. "A" is the native voice; later labels walk the
    /// learner voices in order and unknown labels fall back to native.
    fn speaker_voice(&self, speaker: &str) -> &VoiceSpec {
        let index = match speaker {
            "A" => return &self.config.native_voice,
            s => s
                .chars()
                .next()
                .filter(char::is_ascii_uppercase)
                .map(|c| (c as usize).wrapping_sub('B' as usize)),
        };
        index
            .and_then(|i| self.config.learner_voices.get(i))
            .unwrap_or(&self.config.native_voice)
    }

    fn prosody(&self, text: &str) -> String {
        format!(
            "<prosody rate=\"{}\" pitch=\"{}\">{}</prosody>",
            self.config.rate,
            self.config.pitch,
            xml_escape(text)
        )
    }

    fn break_tag(&self) -> String {
        format!("<break time=\"{}\"/>", format_break(self.config.silence_secs))
    }

    fn envelope(&self, body: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<speak version=\"1.1\" xmlns=\"http://www.w3.org/2001/10/synthesis\" xml:lang=\"{}\">\n{body}\n</speak>",
            self.config.native_voice.language
        )
    }
}

/// Format a break duration: whole seconds as "Ns", fractions as
/// milliseconds.
fn format_break(secs: f64) -> String {
    let ms = (secs * 1000.0).round() as u64;
    if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{ms}ms")
    }
}

/// Escape text for embedding in SSML element content and attributes.
fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingocast_manifest_model::parser;

    fn two_learner_config() -> SynthesisConfig {
        let mut config = SynthesisConfig::default();
        config.learner_voices.truncate(2);
        config
    }

    fn conversation_scene() -> Scene {
        Scene {
            id: "conversation_01".to_string(),
            kind: SceneKind::Conversation {
                sequence: 1,
                native_script: "안녕하세요!".to_string(),
                learning_script: "你好！".to_string(),
                reading_script: "nǐ hǎo".to_string(),
            },
        }
    }

    #[test]
    fn test_conversation_marks_one_start_one_end_per_screen() {
        let builder = MarkupBuilder::new(two_learner_config());
        let markup = builder.scene_markup(&conversation_scene());

        for name in [
            "scene_1_screen1_start",
            "scene_1_screen1_end",
            "scene_1_screen2_start",
            "scene_1_screen2_end",
        ] {
            let needle = format!("<mark name=\"{name}\"/>");
            assert_eq!(markup.matches(&needle).count(), 1, "missing {name}");
        }
    }

    #[test]
    fn test_conversation_learner_voices_and_silences() {
        let builder = MarkupBuilder::new(two_learner_config());
        let markup = builder.scene_markup(&conversation_scene());

        // Native utterance plus one per learner voice.
        assert_eq!(markup.matches("你好！").count(), 2);
        assert_eq!(markup.matches("안녕하세요!").count(), 1);
        // One break after screen 1, one between the two learner voices.
        assert_eq!(markup.matches("<break time=\"1s\"/>").count(), 2);
    }

    #[test]
    fn test_determinism() {
        let builder = MarkupBuilder::new(two_learner_config());
        let scene = conversation_scene();
        assert_eq!(builder.scene_markup(&scene), builder.scene_markup(&scene));
    }

    #[test]
    fn test_manifest_markup_has_single_envelope_and_scene_order() {
        let builder = MarkupBuilder::new(two_learner_config());
        let manifest = parser::template("t");
        let markup = builder.manifest_markup(&manifest);

        assert_eq!(markup.matches("<speak").count(), 1);
        assert!(markup.ends_with("</speak>"));

        let intro = markup.find("intro_01_start").unwrap();
        let conv = markup.find("scene_1_screen1_start").unwrap();
        let ending = markup.find("ending_01_start").unwrap();
        assert!(intro < conv && conv < ending);
    }

    #[test]
    fn test_intro_and_ending_use_documented_analogous_pair() {
        let builder = MarkupBuilder::new(two_learner_config());
        let scene = Scene {
            id: "intro_01".to_string(),
            kind: SceneKind::Intro {
                full_script: "환영합니다.".to_string(),
            },
        };
        let markup = builder.scene_markup(&scene);
        assert!(markup.contains("<mark name=\"intro_01_start\"/>"));
        assert!(markup.contains("<mark name=\"intro_01_end\"/>"));
    }

    #[test]
    fn test_dialogue_marks_and_speaker_voices() {
        let builder = MarkupBuilder::new(SynthesisConfig::default());
        let scene = Scene {
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
        };
        let markup = builder.scene_markup(&scene);
        assert!(markup.contains("<mark name=\"dialogue_01_speaker_A_0_start\"/>"));
        assert!(markup.contains("<mark name=\"dialogue_01_speaker_B_1_end\"/>"));
        assert!(markup.contains("ko-KR-Standard-A"));
        assert!(markup.contains("cmn-CN-Standard-A"));
    }

    #[test]
    fn test_unknown_speaker_falls_back_to_native_voice() {
        let builder = MarkupBuilder::new(two_learner_config());
        assert_eq!(
            builder.speaker_voice("Z").name,
            builder.config.native_voice.name
        );
        assert_eq!(
            builder.speaker_voice("?").name,
            builder.config.native_voice.name
        );
    }

    #[test]
    fn test_text_is_xml_escaped() {
        let builder = MarkupBuilder::new(two_learner_config());
        let scene = Scene {
            id: "intro_01".to_string(),
            kind: SceneKind::Intro {
                full_script: "A < B & \"C\"".to_string(),
            },
        };
        let markup = builder.scene_markup(&scene);
        assert!(markup.contains("A &lt; B &amp; &quot;C&quot;"));
        assert!(!markup.contains("A < B"));
    }

    #[test]
    fn test_break_formatting() {
        assert_eq!(format_break(1.0), "1s");
        assert_eq!(format_break(2.0), "2s");
        assert_eq!(format_break(0.5), "500ms");
    }
}
