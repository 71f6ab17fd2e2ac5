//! Configuration loading and parsing.
//!
//! Reads `rivet.toml` (or an override path from the binary). Every section
//! and key is optional; missing keys take their defaults and unknown keys
//! are ignored. A file that fails to parse is logged and replaced by the
//! defaults so a typo never keeps the editor from starting.
//!
//! ```toml
//! [editor]
//! tab_width = 4
//! undo_capacity = 8192
//!
//! [wrap]
//! column = 72
//! when_typing = true
//!
//! [languages.python]
//! indent_spaces = 4
//! ```
//!
//! The wrap column is clamped to the viewport width at application time
//! (`Config::apply_viewport_width`); the raw value is kept so a later resize
//! can re-clamp.

use anyhow::Result;
use core_state::EditSettings;
use core_syntax::{Mode, ProfileOverride, ProfileTable};
use core_text::MotionOptions;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "rivet.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EditorConfig {
    pub tab_width: usize,
    pub scroll_speed: usize,
    pub undo_capacity: usize,
    pub strip_trailing_spaces: bool,
    pub status_timeout_ms: u64,
    pub rainbow_parens: bool,
    /// Moving past either end of a line continues on the neighbouring line.
    pub wrap_to_line: bool,
    pub smart_indent: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            scroll_speed: 10,
            undo_capacity: core_state::DEFAULT_UNDO_CAPACITY,
            strip_trailing_spaces: true,
            status_timeout_ms: 2000,
            rainbow_parens: true,
            wrap_to_line: true,
            smart_indent: false,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct WrapConfig {
    pub column: Option<usize>,
    pub when_typing: bool,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub wrap: WrapConfig,
    /// Keyed by mode name as accepted by `Mode::from_str`.
    #[serde(default)]
    pub languages: BTreeMap<String, ProfileOverride>,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,
    pub file: ConfigFile,
    /// Wrap column after clamping to the viewport.
    pub effective_wrap_column: Option<usize>,
}

/// Best-effort config path: `./rivet.toml` when present, otherwise the
/// platform config directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("rivet").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default().with_raw_column());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", file = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                file,
                effective_wrap_column: None,
            }
            .with_raw_column())
        }
        Err(e) => {
            warn!(target: "config", file = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default().with_raw_column())
        }
    }
}

impl Config {
    fn with_raw_column(mut self) -> Self {
        self.effective_wrap_column = self.file.wrap.column.filter(|c| *c > 0);
        self
    }

    /// Clamp the configured wrap column to `width`. Returns the effective
    /// column.
    pub fn apply_viewport_width(&mut self, width: usize) -> Option<usize> {
        let raw = self.file.wrap.column.filter(|c| *c > 0);
        let clamped = raw.map(|c| c.min(width.max(1)));
        if clamped != raw {
            info!(
                target: "config",
                raw = ?raw,
                clamped = ?clamped,
                viewport_width = width,
                "wrap_column_clamped"
            );
        }
        self.effective_wrap_column = clamped;
        clamped
    }

    /// Recompute the effective wrap column after a resize. `Some` only when
    /// it changed.
    pub fn recompute_after_resize(&mut self, width: usize) -> Option<Option<usize>> {
        let prev = self.effective_wrap_column;
        let current = self.apply_viewport_width(width);
        (current != prev).then_some(current)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_millis(self.file.editor.status_timeout_ms)
    }

    pub fn edit_settings(&self) -> EditSettings {
        let editor = &self.file.editor;
        EditSettings {
            tab_width: editor.tab_width.max(1),
            undo_capacity: editor.undo_capacity,
            wrap_column: self.effective_wrap_column,
            wrap_when_typing: self.file.wrap.when_typing,
            motion: MotionOptions {
                tab_aware: true,
                wrap_to_line: editor.wrap_to_line,
            },
            scroll_speed: editor.scroll_speed.max(1),
            strip_trailing_spaces: editor.strip_trailing_spaces,
            rainbow_parens: editor.rainbow_parens,
            smart_indent: editor.smart_indent,
        }
    }

    /// Built-in language profiles with the `[languages.*]` overrides applied.
    /// Unknown mode names and invalid markers are logged and skipped.
    pub fn profile_table(&self) -> ProfileTable {
        let mut table = ProfileTable::builtin();
        for (name, overrides) in &self.file.languages {
            let mode = match name.parse::<Mode>() {
                Ok(mode) => mode,
                Err(e) => {
                    warn!(target: "config", language = %name, error = %e, "language_unknown");
                    continue;
                }
            };
            if let Err(e) = table.apply_override(mode, overrides) {
                warn!(target: "config", language = %name, error = %e, "language_override_rejected");
            }
        }
        table
    }
}
