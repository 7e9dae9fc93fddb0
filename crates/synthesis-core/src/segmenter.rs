//! Timing segmentation from markup marks.
//!
//! Marks are extracted from markup in document order; their order is the
//! sole source of truth, independent of how the builder emitted them. Each
//! `…_start` mark is paired with the next `…_end` mark sharing its prefix to
//! form a [`TimingSegment`].
//!
//! When the synthesis backend reports per-mark offsets they are used
//! verbatim. Otherwise times are estimated with a declared heuristic: the
//! total duration is distributed over segments proportionally to their
//! character counts, and segments are laid out in order separated by the
//! configured silence. The estimate is an approximation; downstream
//! consistency checks treat it only within [`SegmenterConfig::gap_tolerance_secs`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::markup::{MARK_END_SUFFIX, MARK_START_SUFFIX};

/// A named breakpoint found in markup.
#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    /// Mark name as emitted by the builder.
    pub name: String,

    /// Byte offset of the mark tag within the markup.
    pub position: usize,

    /// Tag-stripped text between this mark and the next (or the document
    /// end). Drives the estimation heuristic.
    pub text: String,
}

impl Mark {
    /// Prefix shared by this mark's start/end pair, if it has the
    /// conventional suffix.
    pub fn pair_prefix(&self) -> Option<&str> {
        self.name
            .strip_suffix(MARK_START_SUFFIX)
            .or_else(|| self.name.strip_suffix(MARK_END_SUFFIX))
    }

    pub fn is_start(&self) -> bool {
        self.name.ends_with(MARK_START_SUFFIX)
    }

    pub fn is_end(&self) -> bool {
        self.name.ends_with(MARK_END_SUFFIX)
    }
}

/// A per-mark time offset reported by the synthesis backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkTime {
    pub name: String,
    #[serde(rename = "time")]
    pub time_secs: f64,
}

/// Where segment times come from.
#[derive(Debug, Clone)]
pub enum TimingSource {
    /// Real per-mark offsets from the backend, used verbatim.
    Reported(Vec<MarkTime>),

    /// No backend timing available; distribute the total duration over
    /// segments proportionally to text length.
    Estimated { total_duration_secs: f64 },
}

/// A resolved interval between a paired start and end mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingSegment {
    pub start_mark: String,
    pub end_mark: String,
    #[serde(rename = "start")]
    pub start_secs: f64,
    #[serde(rename = "end")]
    pub end_secs: f64,
    #[serde(rename = "duration")]
    pub duration_secs: f64,
}

impl TimingSegment {
    /// The prefix shared by the segment's marks, naming the owning
    /// scene/screen.
    pub fn prefix(&self) -> &str {
        self.start_mark
            .strip_suffix(MARK_START_SUFFIX)
            .unwrap_or(&self.start_mark)
    }
}

/// Configuration for segmentation and consistency checking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Expected silence between segments, in seconds.
    pub silence_secs: f64,

    /// Tolerance when comparing inter-segment gaps against the expected
    /// silence.
    pub gap_tolerance_secs: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            silence_secs: 1.0,
            gap_tolerance_secs: 0.05,
        }
    }
}

/// Extract marks from markup in document order.
pub fn extract_marks(markup: &str) -> Vec<Mark> {
    const NEEDLE: &str = "<mark name=\"";

    let mut found: Vec<(String, usize, usize)> = vec![];
    let mut cursor = 0;
    while let Some(offset) = markup[cursor..].find(NEEDLE) {
        let tag_at = cursor + offset;
        let name_start = tag_at + NEEDLE.len();
        let Some(quote) = markup[name_start..].find('"') else {
            break;
        };
        let name = markup[name_start..name_start + quote].to_string();
        let Some(close) = markup[name_start + quote..].find('>') else {
            break;
        };
        let tag_end = name_start + quote + close + 1;
        found.push((name, tag_at, tag_end));
        cursor = tag_end;
    }

    let mut marks = Vec::with_capacity(found.len());
    for (i, (name, position, tag_end)) in found.iter().enumerate() {
        let until = found.get(i + 1).map_or(markup.len(), |next| next.1);
        marks.push(Mark {
            name: name.clone(),
            position: *position,
            text: strip_tags(&markup[*tag_end..until]),
        });
    }
    marks
}

/// Remove XML tags and collapse whitespace.
fn strip_tags(fragment: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for c in fragment.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pair marks and assign segment times.
///
/// Pairing walks the marks in document order: each `…_start` is matched with
/// the next `…_end` carrying the same prefix. Marks without a partner are
/// skipped here and surface as gaps in consistency checking.
pub fn assign_times(
    marks: &[Mark],
    source: &TimingSource,
    config: &SegmenterConfig,
) -> Vec<TimingSegment> {
    let pairs = pair_marks(marks);

    match source {
        TimingSource::Reported(times) => pairs
            .iter()
            .filter_map(|&(s, e)| {
                let start = lookup_time(times, &marks[s].name)?;
                let end = lookup_time(times, &marks[e].name)?;
                Some(TimingSegment {
                    start_mark: marks[s].name.clone(),
                    end_mark: marks[e].name.clone(),
                    start_secs: start,
                    end_secs: end,
                    duration_secs: end - start,
                })
            })
            .collect(),
        TimingSource::Estimated {
            total_duration_secs,
        } => estimate_times(marks, &pairs, *total_duration_secs, config),
    }
}

fn pair_marks(marks: &[Mark]) -> Vec<(usize, usize)> {
    let mut pairs = vec![];
    for (i, mark) in marks.iter().enumerate() {
        if !mark.is_start() {
            continue;
        }
        let Some(prefix) = mark.pair_prefix() else {
            continue;
        };
        let end = marks[i + 1..].iter().position(|m| {
            m.is_end() && m.pair_prefix() == Some(prefix)
        });
        if let Some(offset) = end {
            pairs.push((i, i + 1 + offset));
        } else {
            tracing::warn!(mark = %mark.name, "start mark has no matching end");
        }
    }
    pairs
}

fn lookup_time(times: &[MarkTime], name: &str) -> Option<f64> {
    times.iter().find(|t| t.name == name).map(|t| t.time_secs)
}

/// Proportional estimation: `total_duration_secs` is treated as the speech
/// budget and split over segments by character count; segments are laid out
/// back-to-back with the configured silence between them.
fn estimate_times(
    marks: &[Mark],
    pairs: &[(usize, usize)],
    total_duration_secs: f64,
    config: &SegmenterConfig,
) -> Vec<TimingSegment> {
    let weights: Vec<f64> = pairs
        .iter()
        .map(|&(s, _)| marks[s].text.chars().count() as f64)
        .collect();
    let total_weight: f64 = weights.iter().sum();

    let mut segments = Vec::with_capacity(pairs.len());
    let mut clock = 0.0;
    for (&(s, e), weight) in pairs.iter().zip(&weights) {
        let share = if total_weight > 0.0 {
            weight / total_weight
        } else {
            1.0 / pairs.len() as f64
        };
        let duration = total_duration_secs * share;
        segments.push(TimingSegment {
            start_mark: marks[s].name.clone(),
            end_mark: marks[e].name.clone(),
            start_secs: clock,
            end_secs: clock + duration,
            duration_secs: duration,
        });
        clock += duration + config.silence_secs;
    }
    segments
}

/// Kinds of timing discrepancies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingIssueKind {
    NegativeDuration,
    ZeroDuration,
    Overlap,
    OutOfOrder,
    UnexpectedGap,
}

/// One advisory timing finding. Reported, never fatal; callers decide
/// whether to regenerate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingIssue {
    pub kind: TimingIssueKind,
    pub message: String,
}

/// Check a segment sequence for internal consistency.
///
/// Segments are expected in manifest order with non-decreasing start times,
/// no overlap, and inter-segment gaps equal to the configured silence within
/// tolerance. Every discrepancy is accumulated; nothing aborts.
pub fn validate_consistency(
    segments: &[TimingSegment],
    config: &SegmenterConfig,
) -> Vec<TimingIssue> {
    let mut issues = vec![];

    for segment in segments {
        if segment.end_secs < segment.start_secs {
            issues.push(TimingIssue {
                kind: TimingIssueKind::NegativeDuration,
                message: format!(
                    "segment {} ends at {:.3}s before it starts at {:.3}s",
                    segment.prefix(),
                    segment.end_secs,
                    segment.start_secs
                ),
            });
        } else if segment.duration_secs == 0.0 {
            issues.push(TimingIssue {
                kind: TimingIssueKind::ZeroDuration,
                message: format!("segment {} has zero duration", segment.prefix()),
            });
        }
    }

    for window in segments.windows(2) {
        let (a, b) = (&window[0], &window[1]);
        if b.start_secs < a.start_secs {
            issues.push(TimingIssue {
                kind: TimingIssueKind::OutOfOrder,
                message: format!(
                    "segment {} starts at {:.3}s, before segment {} at {:.3}s",
                    b.prefix(),
                    b.start_secs,
                    a.prefix(),
                    a.start_secs
                ),
            });
        }
        if b.start_secs < a.end_secs {
            issues.push(TimingIssue {
                kind: TimingIssueKind::Overlap,
                message: format!(
                    "segment {} (ends {:.3}s) overlaps segment {} (starts {:.3}s)",
                    a.prefix(),
                    a.end_secs,
                    b.prefix(),
                    b.start_secs
                ),
            });
        } else {
            let gap = b.start_secs - a.end_secs;
            if (gap - config.silence_secs).abs() > config.gap_tolerance_secs {
                issues.push(TimingIssue {
                    kind: TimingIssueKind::UnexpectedGap,
                    message: format!(
                        "gap of {:.3}s between {} and {} (expected {:.3}s)",
                        gap,
                        a.prefix(),
                        b.prefix(),
                        config.silence_secs
                    ),
                });
            }
        }
    }

    issues
}

/// On-disk timing artifact (`timing.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingArtifact {
    /// Synthesized audio file the timing refers to.
    pub audio_file: String,

    /// Total audio duration in seconds.
    pub total_duration: f64,

    /// RFC 3339 generation timestamp.
    pub generated_at: String,

    /// Raw per-mark offsets (reported or estimated edges).
    pub marks: Vec<MarkTime>,

    /// Resolved segments in manifest order.
    pub segments: Vec<TimingSegment>,
}

impl TimingArtifact {
    /// Assemble an artifact from resolved segments.
    pub fn new(
        audio_file: impl Into<String>,
        total_duration: f64,
        segments: Vec<TimingSegment>,
    ) -> Self {
        let marks = segments
            .iter()
            .flat_map(|s| {
                [
                    MarkTime {
                        name: s.start_mark.clone(),
                        time_secs: s.start_secs,
                    },
                    MarkTime {
                        name: s.end_mark.clone(),
                        time_secs: s.end_secs,
                    },
                ]
            })
            .collect();
        Self {
            audio_file: audio_file.into(),
            total_duration,
            generated_at: chrono::Utc::now().to_rfc3339(),
            marks,
            segments,
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
    use crate::markup::{MarkupBuilder, SynthesisConfig};
    use lingocast_manifest_model::parser;

    fn two_segment_markup() -> &'static str {
        "<speak>\
         <mark name=\"a_start\"/>abcd<mark name=\"a_end\"/>\
         <break time=\"1s\"/>\
         <mark name=\"b_start\"/>abcdef<mark name=\"b_end\"/>\
         </speak>"
    }

    #[test]
    fn test_extract_marks_in_document_order() {
        let marks = extract_marks(two_segment_markup());
        let names: Vec<&str> = marks.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["a_start", "a_end", "b_start", "b_end"]);
        assert!(marks.windows(2).all(|w| w[0].position < w[1].position));
    }

    #[test]
    fn test_mark_text_is_tag_stripped() {
        let marks = extract_marks(two_segment_markup());
        assert_eq!(marks[0].text, "abcd");
        assert_eq!(marks[1].text, ""); // only a break tag before the next mark
        assert_eq!(marks[2].text, "abcdef");
    }

    #[test]
    fn test_extraction_recovers_builder_marks_in_emission_order() {
        let builder = MarkupBuilder::new(SynthesisConfig::default());
        let manifest = parser::template("t");
        let marks = extract_marks(&builder.manifest_markup(&manifest));
        let names: Vec<&str> = marks.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "intro_01_start",
                "intro_01_end",
                "scene_1_screen1_start",
                "scene_1_screen1_end",
                "scene_1_screen2_start",
                "scene_1_screen2_end",
                "ending_01_start",
                "ending_01_end",
            ]
        );
    }

    #[test]
    fn test_proportional_estimate_is_exact() {
        let marks = extract_marks(two_segment_markup());
        let segments = assign_times(
            &marks,
            &TimingSource::Estimated {
                total_duration_secs: 10.0,
            },
            &SegmenterConfig::default(),
        );

        assert_eq!(segments.len(), 2);
        assert!((segments[0].duration_secs - 4.0).abs() < 1e-9);
        assert!((segments[1].duration_secs - 6.0).abs() < 1e-9);
        // Laid out with the configured silence between them.
        assert!((segments[1].start_secs - 5.0).abs() < 1e-9);
        assert!(validate_consistency(&segments, &SegmenterConfig::default()).is_empty());
    }

    #[test]
    fn test_reported_times_used_verbatim() {
        let marks = extract_marks(two_segment_markup());
        let times = vec![
            MarkTime { name: "a_start".into(), time_secs: 0.25 },
            MarkTime { name: "a_end".into(), time_secs: 2.0 },
            MarkTime { name: "b_start".into(), time_secs: 3.0 },
            MarkTime { name: "b_end".into(), time_secs: 5.5 },
        ];
        let segments = assign_times(
            &marks,
            &TimingSource::Reported(times),
            &SegmenterConfig::default(),
        );
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start_secs, 0.25);
        assert_eq!(segments[0].end_secs, 2.0);
        assert!((segments[1].duration_secs - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_durations_are_non_negative_for_estimates() {
        let builder = MarkupBuilder::new(SynthesisConfig::default());
        let manifest = parser::template("t");
        let marks = extract_marks(&builder.manifest_markup(&manifest));
        let segments = assign_times(
            &marks,
            &TimingSource::Estimated {
                total_duration_secs: 42.0,
            },
            &SegmenterConfig::default(),
        );
        assert_eq!(segments.len(), 4);
        assert!(segments.iter().all(|s| s.end_secs >= s.start_secs));
    }

    #[test]
    fn test_unpaired_start_is_skipped() {
        let marks = extract_marks(
            "<mark name=\"a_start\"/>hi<mark name=\"b_start\"/>yo<mark name=\"b_end\"/>",
        );
        let segments = assign_times(
            &marks,
            &TimingSource::Estimated {
                total_duration_secs: 10.0,
            },
            &SegmenterConfig::default(),
        );
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_mark, "b_start");
    }

    #[test]
    fn test_consistency_detects_overlap_and_bad_gap() {
        let config = SegmenterConfig::default();
        let segments = vec![
            TimingSegment {
                start_mark: "a_start".into(),
                end_mark: "a_end".into(),
                start_secs: 0.0,
                end_secs: 4.0,
                duration_secs: 4.0,
            },
            TimingSegment {
                start_mark: "b_start".into(),
                end_mark: "b_end".into(),
                start_secs: 3.5,
                end_secs: 6.0,
                duration_secs: 2.5,
            },
            TimingSegment {
                start_mark: "c_start".into(),
                end_mark: "c_end".into(),
                start_secs: 9.0,
                end_secs: 10.0,
                duration_secs: 1.0,
            },
        ];
        let issues = validate_consistency(&segments, &config);
        assert!(issues.iter().any(|i| i.kind == TimingIssueKind::Overlap));
        assert!(issues
            .iter()
            .any(|i| i.kind == TimingIssueKind::UnexpectedGap));
    }

    #[test]
    fn test_consistency_flags_negative_and_zero_durations() {
        let config = SegmenterConfig::default();
        let segments = vec![
            TimingSegment {
                start_mark: "a_start".into(),
                end_mark: "a_end".into(),
                start_secs: 2.0,
                end_secs: 1.0,
                duration_secs: -1.0,
            },
            TimingSegment {
                start_mark: "b_start".into(),
                end_mark: "b_end".into(),
                start_secs: 2.0,
                end_secs: 2.0,
                duration_secs: 0.0,
            },
        ];
        let issues = validate_consistency(&segments, &config);
        assert!(issues
            .iter()
            .any(|i| i.kind == TimingIssueKind::NegativeDuration));
        assert!(issues
            .iter()
            .any(|i| i.kind == TimingIssueKind::ZeroDuration));
    }

    #[test]
    fn test_artifact_round_trips() {
        let artifact = TimingArtifact::new(
            "audio.wav",
            10.0,
            vec![TimingSegment {
                start_mark: "a_start".into(),
                end_mark: "a_end".into(),
                start_secs: 0.0,
                end_secs: 4.0,
                duration_secs: 4.0,
            }],
        );
        let json = serde_json::to_string(&artifact).unwrap();
        let parsed: TimingArtifact = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, artifact);
        assert_eq!(parsed.marks.len(), 2);
        assert!(json.contains("\"start\":0.0") || json.contains("\"start\": 0.0"));
    }
}
