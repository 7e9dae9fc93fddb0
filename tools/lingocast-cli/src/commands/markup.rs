//! Emit speech-synthesis markup for a manifest.

use std::path::PathBuf;

use lingocast_common::config::AppConfig;
use lingocast_manifest_model::{parser, validator, ValidatorConfig};
use lingocast_synthesis_core::markup::{MarkupBuilder, SynthesisConfig};

pub fn run(manifest_path: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
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

    match output {
        Some(path) => {
            std::fs::write(&path, &markup)?;
            tracing::info!(path = %path.display(), "markup written");
        }
        None => println!("{markup}"),
    }
    Ok(())
}
