//! Manifest validation.
//!
//! `validate` is a total, side-effect-free function over a parsed manifest:
//! it evaluates every rule tier in one pass, accumulates every violation,
//! and never mutates its input. A manifest that parsed successfully can
//! always be validated; semantic problems are reported, not raised.
//!
//! Rule tiers:
//! 1. **Structural**: required per-variant content is present and sane.
//! 2. **Referential**: ids unique, conversation sequences unique and
//!    strictly increasing in manifest order, background among declared assets.
//! 3. **Business**: template composition (intro/ending/conversation counts)
//!    and estimated duration bounds. Warnings by default, errors under
//!    [`ValidatorConfig::strict_template`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::manifest::{Manifest, Resolution, Scene, SceneKind};

/// Issue severity. Only `Error` affects [`ValidationResult::is_valid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Field path the finding refers to (e.g. `scenes[2].native_script`).
    pub field: String,

    /// Human-readable description.
    pub message: String,

    /// Owning scene id, when the finding is scene-scoped.
    pub scene_id: Option<String>,

    pub severity: Severity,
}

/// Outcome of validating a manifest. Pure function of its input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// All findings, in evaluation order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// True when no error-severity issue was found.
    pub fn is_valid(&self) -> bool {
        !self
            .issues
            .iter()
            .any(|i| i.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    /// Findings for one scene id.
    pub fn issues_for_scene(&self, scene_id: &str) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.scene_id.as_deref() == Some(scene_id))
            .collect()
    }

    fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push(field, message, None, Severity::Error);
    }

    fn warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push(field, message, None, Severity::Warning);
    }

    fn scene_error(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        scene_id: &str,
    ) {
        self.push(field, message, Some(scene_id.to_string()), Severity::Error);
    }

    fn scene_warning(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        scene_id: &str,
    ) {
        self.push(
            field,
            message,
            Some(scene_id.to_string()),
            Severity::Warning,
        );
    }

    fn push(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        scene_id: Option<String>,
        severity: Severity,
    ) {
        self.issues.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
            scene_id,
            severity,
        });
    }
}

/// Configuration for the validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Maximum number of scenes per manifest.
    pub max_scenes: usize,

    /// Maximum length of a single script, in characters.
    pub max_script_chars: usize,

    /// Maximum project name length, in characters.
    pub max_project_name_chars: usize,

    /// Estimated-duration bounds in seconds.
    pub min_duration_secs: f64,
    pub max_duration_secs: f64,

    /// Resolutions the renderer is known to handle; anything else is a
    /// warning, not an error.
    pub supported_resolutions: Vec<Resolution>,

    /// Declared asset paths the manifest may reference. `None` disables
    /// asset checking (the caller has not declared a resource set).
    pub declared_assets: Option<Vec<String>>,

    /// Report business-rule (tier 3) violations as errors instead of
    /// warnings.
    pub strict_template: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_scenes: 100,
            max_script_chars: 1000,
            max_project_name_chars: 100,
            min_duration_secs: 30.0,
            max_duration_secs: 3600.0,
            supported_resolutions: vec![
                Resolution::new(1920, 1080),
                Resolution::new(1280, 720),
                Resolution::new(3840, 2160),
                Resolution::new(1080, 1080),
                Resolution::new(1440, 1440),
                Resolution::new(1080, 1920),
                Resolution::new(720, 1280),
            ],
            declared_assets: None,
            strict_template: false,
        }
    }
}

/// Validate a manifest against every rule tier.
///
/// Never short-circuits: all findings from all tiers are collected in one
/// pass so a caller sees the complete picture at once.
pub fn validate(manifest: &Manifest, config: &ValidatorConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    check_structure(manifest, config, &mut result);
    for (index, scene) in manifest.scenes.iter().enumerate() {
        check_scene(index, scene, config, &mut result);
    }
    check_references(manifest, config, &mut result);
    check_template_rules(manifest, config, &mut result);

    tracing::debug!(
        errors = result.errors().count(),
        warnings = result.warnings().count(),
        "manifest validated"
    );
    result
}

fn check_structure(manifest: &Manifest, config: &ValidatorConfig, result: &mut ValidationResult) {
    if manifest.project_name.trim().is_empty() {
        result.error("project_name", "project name must not be empty");
    } else if manifest.project_name.chars().count() > config.max_project_name_chars {
        result.error(
            "project_name",
            format!(
                "project name exceeds {} characters",
                config.max_project_name_chars
            ),
        );
    }

    if manifest.resolution.width == 0 || manifest.resolution.height == 0 {
        result.error("resolution", "resolution dimensions must be positive");
    } else if !config.supported_resolutions.contains(&manifest.resolution) {
        result.warning(
            "resolution",
            format!("unsupported resolution: {}", manifest.resolution),
        );
    }

    if manifest.scenes.is_empty() {
        result.error("scenes", "manifest must contain at least one scene");
    } else if manifest.scenes.len() > config.max_scenes {
        result.error(
            "scenes",
            format!("too many scenes (maximum {})", config.max_scenes),
        );
    }
}

fn check_scene(
    index: usize,
    scene: &Scene,
    config: &ValidatorConfig,
    result: &mut ValidationResult,
) {
    let field = |name: &str| format!("scenes[{index}].{name}");

    if scene.id.trim().is_empty() {
        result.error(field("id"), format!("scene at position {index} has an empty id"));
    } else if !scene
        .id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        result.scene_error(
            field("id"),
            "scene id may only contain lowercase letters, digits, and underscores",
            &scene.id,
        );
    }

    match &scene.kind {
        SceneKind::Intro { full_script } | SceneKind::Ending { full_script } => {
            check_script(&field("full_script"), full_script, scene, config, result);
        }
        SceneKind::Conversation {
            sequence,
            native_script,
            learning_script,
            reading_script,
        } => {
            if *sequence == 0 {
                result.scene_error(field("sequence"), "sequence must be at least 1", &scene.id);
            }
            check_script(&field("native_script"), native_script, scene, config, result);
            check_script(
                &field("learning_script"),
                learning_script,
                scene,
                config,
                result,
            );
            check_script(
                &field("reading_script"),
                reading_script,
                scene,
                config,
                result,
            );
        }
        SceneKind::Dialogue { script } => {
            if script.is_empty() {
                result.scene_error(
                    field("script"),
                    "dialogue scene requires at least one turn",
                    &scene.id,
                );
            } else if script.len() < 2 {
                result.scene_warning(
                    field("script"),
                    "dialogue scenes usually have at least two turns",
                    &scene.id,
                );
            }
            for (turn, line) in script.iter().enumerate() {
                if line.speaker.trim().is_empty() {
                    result.scene_error(
                        field(&format!("script[{turn}].speaker")),
                        format!("turn {} has an empty speaker", turn + 1),
                        &scene.id,
                    );
                } else if !line
                    .speaker
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    result.scene_error(
                        field(&format!("script[{turn}].speaker")),
                        format!("turn {} speaker must be alphanumeric", turn + 1),
                        &scene.id,
                    );
                }
                if line.text.trim().is_empty() {
                    result.scene_error(
                        field(&format!("script[{turn}].text")),
                        format!("turn {} has empty text", turn + 1),
                        &scene.id,
                    );
                } else if line.text.chars().count() > config.max_script_chars {
                    result.scene_warning(
                        field(&format!("script[{turn}].text")),
                        format!(
                            "turn {} text exceeds {} characters",
                            turn + 1,
                            config.max_script_chars
                        ),
                        &scene.id,
                    );
                }
            }
        }
    }
}

fn check_script(
    field: &str,
    script: &str,
    scene: &Scene,
    config: &ValidatorConfig,
    result: &mut ValidationResult,
) {
    if script.trim().is_empty() {
        result.scene_error(
            field,
            format!("{} scene requires non-empty {field}", scene.type_name()),
            &scene.id,
        );
    } else if script.chars().count() > config.max_script_chars {
        result.scene_warning(
            field,
            format!("script exceeds {} characters", config.max_script_chars),
            &scene.id,
        );
    }
}

fn check_references(manifest: &Manifest, config: &ValidatorConfig, result: &mut ValidationResult) {
    // Duplicate scene ids: one error per duplicated id, naming every position
    // where it occurs.
    let mut positions: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, scene) in manifest.scenes.iter().enumerate() {
        positions.entry(scene.id.as_str()).or_default().push(index);
    }
    let mut reported: Vec<&str> = vec![];
    for scene in &manifest.scenes {
        let occurrences = &positions[scene.id.as_str()];
        if occurrences.len() > 1 && !reported.contains(&scene.id.as_str()) {
            reported.push(&scene.id);
            let list = occurrences
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            result.scene_error(
                "scenes",
                format!(
                    "scene id {:?} is used at positions {list}; ids must be unique",
                    scene.id
                ),
                &scene.id,
            );
        }
    }

    // Conversation sequences must be unique and strictly increasing in
    // manifest order. Gaps are fine; duplicates and inversions are errors.
    let mut last: Option<(u32, &str)> = None;
    for (sequence, scene) in manifest.conversation_scenes() {
        if let Some((prev_seq, prev_id)) = last {
            if sequence == prev_seq {
                result.scene_error(
                    "scenes",
                    format!(
                        "conversation sequence {sequence} in {:?} duplicates {prev_id:?}",
                        scene.id
                    ),
                    &scene.id,
                );
            } else if sequence < prev_seq {
                result.scene_error(
                    "scenes",
                    format!(
                        "conversation sequence {sequence} in {:?} is not increasing (previous was {prev_seq} in {prev_id:?})",
                        scene.id
                    ),
                    &scene.id,
                );
            }
        }
        last = Some((sequence, &scene.id));
    }

    // Background must be a declared resource when a resource set exists.
    if let (Some(background), Some(assets)) =
        (&manifest.default_background, &config.declared_assets)
    {
        if !assets.iter().any(|a| a == background) {
            result.error(
                "default_background",
                format!("background {background:?} is not a declared asset"),
            );
        }
    }
}

fn check_template_rules(
    manifest: &Manifest,
    config: &ValidatorConfig,
    result: &mut ValidationResult,
) {
    let severity = if config.strict_template {
        Severity::Error
    } else {
        Severity::Warning
    };
    let mut report = |field: &str, message: String| {
        result.push(field, message, None, severity);
    };

    let intros = manifest.scenes_of_type("intro").len();
    let endings = manifest.scenes_of_type("ending").len();
    let conversations = manifest.scenes_of_type("conversation").len();

    if intros == 0 {
        report("scenes", "manifest has no intro scene".to_string());
    } else if intros > 1 {
        report("scenes", format!("manifest has {intros} intro scenes"));
    }
    if endings == 0 {
        report("scenes", "manifest has no ending scene".to_string());
    } else if endings > 1 {
        report("scenes", format!("manifest has {endings} ending scenes"));
    }
    if conversations == 0 {
        report("scenes", "manifest has no conversation scenes".to_string());
    }

    let estimated = manifest.estimated_duration_secs();
    if estimated > config.max_duration_secs {
        report(
            "scenes",
            format!(
                "estimated duration {estimated:.0}s exceeds the {:.0}s bound",
                config.max_duration_secs
            ),
        );
    } else if !manifest.scenes.is_empty() && estimated < config.min_duration_secs {
        report(
            "scenes",
            format!(
                "estimated duration {estimated:.0}s is below the {:.0}s bound",
                config.min_duration_secs
            ),
        );
    }
}
