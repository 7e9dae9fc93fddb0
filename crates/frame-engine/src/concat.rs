//! Concatenation list generation for the external muxer.
//!
//! The list is the textual format the ffmpeg concat demuxer expects: a
//! `file`/`duration` pair per frame, with the final image repeated without a
//! duration (the demuxer ignores the last duration otherwise).

use std::path::Path;

use crate::sequencer::Frame;

/// Render the concatenation list for an ordered frame sequence.
pub fn concat_list(frames: &[Frame]) -> String {
    let mut out = String::new();
    for frame in frames {
        out.push_str(&format!("file '{}'\n", frame.output_path));
        out.push_str(&format!("duration {:.6}\n", frame.duration_secs));
    }
    if let Some(last) = frames.last() {
        out.push_str(&format!("file '{}'\n", last.output_path));
    }
    out
}

/// Write the concatenation list to disk.
pub fn save_concat_list(frames: &[Frame], path: impl AsRef<Path>) -> Result<(), std::io::Error> {
    std::fs::write(path, concat_list(frames))
}
