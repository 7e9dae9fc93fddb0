//! Create a new template manifest.

use std::path::PathBuf;

use lingocast_manifest_model::parser;

pub fn run(name: String, output: PathBuf) -> anyhow::Result<()> {
    if output.exists() {
        anyhow::bail!("refusing to overwrite existing file: {}", output.display());
    }

    let manifest = parser::template(name);
    parser::save(&manifest, &output)?;

    println!("Template manifest written to {}", output.display());
    println!("Edit the scene scripts, then run `lingocast validate`.");
    Ok(())
}
