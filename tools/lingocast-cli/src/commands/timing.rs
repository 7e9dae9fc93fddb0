//! Derive timing segments with the estimation heuristic.
//!
//! When a real synthesis backend has run, its reported mark offsets should
//! be used instead; this command covers the estimation path so the rest of
//! the pipeline can be exercised without a backend.

use std::path::PathBuf;

use lingocast_common::config::AppConfig;
use lingocast_manifest_model::{parser, validator, ValidatorConfig};
use lingocast_synthesis_core::markup::{MarkupBuilder, SynthesisConfig};
use lingocast_synthesis_core::segmenter::{
    self, SegmenterConfig, TimingArtifact, TimingSource,
};

pub fn run(
    manifest_path: PathBuf,
    duration: Option<f64>,
    audio: String,
    output: PathBuf,
) -> anyhow::Result<()> {
    let manifest = parser::from_path(&manifest_path)?;

    let result = validator::validate(&manifest, &ValidatorConfig::default());
    if !result.is_valid() {
        anyhow::bail!(
            "manifest is invalid ({} error(s)); run `lingocast validate` for details",
            result.errors().count()
        );
    }

    let app = AppConfig::load();
    let builder = MarkupBuilder::new(SynthesisConfig::from_speech_defaults(&app.speech));
    let markup = builder.manifest_markup(&manifest);

    let total_duration = duration.unwrap_or_else(|| manifest.estimated_duration_secs());
    let segmenter_config = SegmenterConfig {
        silence_secs: app.speech.silence_secs,
        ..SegmenterConfig::default()
    };

    let marks = segmenter::extract_marks(&markup);
    let segments = segmenter::assign_times(
        &marks,
        &TimingSource::Estimated {
            total_duration_secs: total_duration,
        },
        &segmenter_config,
    );

    let issues = segmenter::validate_consistency(&segments, &segmenter_config);
    for issue in &issues {
        println!("  {:?}: {}", issue.kind, issue.message);
    }

    println!(
        "Derived {} segment(s) from {} mark(s), {} consistency finding(s).",
        segments.len(),
        marks.len(),
        issues.len()
    );

    let artifact = TimingArtifact::new(audio, total_duration, segments);
    artifact.save(&output)?;
    println!("Timing artifact written to {}", output.display());
    Ok(())
}
