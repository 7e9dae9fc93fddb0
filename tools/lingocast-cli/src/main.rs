//! Lingocast CLI - Command-line interface for the manifest-to-video pipeline.
//!
//! Usage:
//!   lingocast validate <MANIFEST>   Validate a manifest
//!   lingocast markup <MANIFEST>     Emit synthesis markup
//!   lingocast timing <MANIFEST>     Derive timing segments (estimation mode)
//!   lingocast frames <MANIFEST>     Derive the frame sequence and concat list
//!   lingocast info <MANIFEST>       Show manifest information
//!   lingocast init <NAME>           Create a template manifest

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "lingocast",
    about = "Manifest-driven language-learning video generation",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a manifest file
    Validate {
        /// Path to the manifest JSON file
        manifest: PathBuf,

        /// Treat template composition rules as errors
        #[arg(long)]
        strict: bool,
    },

    /// Emit speech-synthesis markup for a manifest
    Markup {
        /// Path to the manifest JSON file
        manifest: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Derive timing segments with the estimation heuristic
    Timing {
        /// Path to the manifest JSON file
        manifest: PathBuf,

        /// Total speech duration to distribute (seconds); defaults to the
        /// manifest's estimate
        #[arg(long)]
        duration: Option<f64>,

        /// Audio file the timing refers to
        #[arg(long, default_value = "audio.wav")]
        audio: String,

        /// Output timing artifact path
        #[arg(short, long, default_value = "timing.json")]
        output: PathBuf,
    },

    /// Derive the frame sequence and muxer concat list
    Frames {
        /// Path to the manifest JSON file
        manifest: PathBuf,

        /// Timing artifact produced by `timing` (or by a real backend)
        #[arg(long, default_value = "timing.json")]
        timing: PathBuf,

        /// Output directory for frames.json and concat.txt
        #[arg(long, default_value = "frames")]
        out_dir: PathBuf,
    },

    /// Show manifest information
    Info {
        /// Path to the manifest JSON file
        manifest: PathBuf,
    },

    /// Create a new template manifest
    Init {
        /// Project name
        name: String,

        /// Output manifest path
        #[arg(short, long, default_value = "manifest.json")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    lingocast_common::logging::init_logging(&lingocast_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Validate { manifest, strict } => commands::validate::run(manifest, strict),
        Commands::Markup { manifest, output } => commands::markup::run(manifest, output),
        Commands::Timing {
            manifest,
            duration,
            audio,
            output,
        } => commands::timing::run(manifest, duration, audio, output),
        Commands::Frames {
            manifest,
            timing,
            out_dir,
        } => commands::frames::run(manifest, timing, out_dir),
        Commands::Info { manifest } => commands::info::run(manifest),
        Commands::Init { name, output } => commands::init::run(name, output),
    }
}
