//! Show manifest information.

use std::path::PathBuf;

use lingocast_manifest_model::parser;

pub fn run(manifest_path: PathBuf) -> anyhow::Result<()> {
    let manifest = parser::from_path(&manifest_path)?;

    println!("Project: {}", manifest.project_name);
    println!("  Resolution: {}", manifest.resolution);
    println!(
        "  Background: {}",
        manifest.default_background.as_deref().unwrap_or("(none)")
    );
    println!();

    println!("Scenes: {}", manifest.scenes.len());
    for type_name in ["intro", "conversation", "dialogue", "ending"] {
        let count = manifest.scenes_of_type(type_name).len();
        if count > 0 {
            println!("  {type_name}: {count}");
        }
    }
    println!();

    println!(
        "Estimated duration: {:.0}s",
        manifest.estimated_duration_secs()
    );
    Ok(())
}
