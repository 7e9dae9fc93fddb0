//! Derive the frame sequence and muxer concat list.

use std::path::PathBuf;

use lingocast_common::config::AppConfig;
use lingocast_frame_engine::{concat, sequencer, FrameConfig, FrameManifest};
use lingocast_manifest_model::parser;
use lingocast_synthesis_core::segmenter::TimingArtifact;

pub fn run(manifest_path: PathBuf, timing_path: PathBuf, out_dir: PathBuf) -> anyhow::Result<()> {
    let manifest = parser::from_path(&manifest_path)?;
    let timing = TimingArtifact::load(&timing_path)?;

    let app = AppConfig::load();
    let config = FrameConfig::from_output_defaults(&app.output, &out_dir);
    let result = sequencer::sequence(&manifest, &timing.segments, &config);

    for warning in &result.warnings {
        println!("  Warning: {warning}");
    }

    std::fs::create_dir_all(&out_dir)?;
    concat::save_concat_list(&result.frames, out_dir.join("concat.txt"))?;

    let frame_manifest = FrameManifest::new(&manifest, &config, result.frames);
    frame_manifest.save(out_dir.join("frames.json"))?;

    println!(
        "Wrote {} frame(s) to {} ({} warning(s)).",
        frame_manifest.total_frames,
        out_dir.display(),
        result.warnings.len()
    );
    Ok(())
}
