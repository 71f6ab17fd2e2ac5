//! Loading and saving buffers.

use crate::{TextBuffer, trim_end};
use std::path::Path;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaveOptions {
    /// Strip trailing whitespace from every line and trailing blank lines
    /// from the document; the output then ends with exactly one newline.
    pub strip_trailing_spaces: bool,
}

impl TextBuffer {
    pub fn load(path: &Path) -> std::io::Result<Self> {
        match std::fs::read(path) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                let buf = Self::from_text(&text);
                debug!(target: "io", file = %path.display(), size_bytes = bytes.len(), lines = buf.len(), "file_read_ok");
                Ok(buf)
            }
            Err(e) => {
                error!(target: "io", file = %path.display(), ?e, "file_open_error");
                Err(e)
            }
        }
    }

    /// Text as it would be written to disk.
    pub fn serialize(&self, opts: SaveOptions) -> String {
        if !opts.strip_trailing_spaces {
            return self.to_string();
        }
        let mut out = String::new();
        for (_, line) in self.iter() {
            out.extend(trim_end(line));
            out.push('\n');
        }
        let keep = out.trim_end().len();
        out.truncate(keep);
        out.push('\n');
        out
    }

    /// Write the buffer to `path`, returning the number of bytes written.
    pub fn save(&self, path: &Path, opts: SaveOptions) -> std::io::Result<usize> {
        let text = self.serialize(opts);
        match std::fs::write(path, &text) {
            Ok(()) => {
                debug!(target: "io", file = %path.display(), size_bytes = text.len(), "file_write_ok");
                Ok(text.len())
            }
            Err(e) => {
                error!(target: "io", file = %path.display(), ?e, "file_write_error");
                Err(e)
            }
        }
    }
}
