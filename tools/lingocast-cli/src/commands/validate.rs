//! Validate a manifest file.

use std::path::PathBuf;

use lingocast_manifest_model::{parser, validator, ValidatorConfig};

pub fn run(manifest_path: PathBuf, strict: bool) -> anyhow::Result<()> {
    println!("Validating manifest: {}", manifest_path.display());

    let manifest = parser::from_path(&manifest_path)?;
    let config = ValidatorConfig {
        strict_template: strict,
        ..ValidatorConfig::default()
    };
    let result = validator::validate(&manifest, &config);

    println!("  Project: {}", manifest.project_name);
    println!("  Scenes: {}", manifest.scenes.len());

    for issue in &result.issues {
        let scope = issue
            .scene_id
            .as_deref()
            .map(|id| format!(" [{id}]"))
            .unwrap_or_default();
        println!(
            "  {:?}{scope} {}: {}",
            issue.severity, issue.field, issue.message
        );
    }

    if result.is_valid() {
        println!(
            "\nManifest is valid ({} warning(s)).",
            result.warnings().count()
        );
        Ok(())
    } else {
        anyhow::bail!(
            "manifest is invalid: {} error(s), {} warning(s)",
            result.errors().count(),
            result.warnings().count()
        )
    }
}
