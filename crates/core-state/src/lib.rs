//! Editor state: the buffer, the cursor, the undo log and the settings that
//! steer editing.
//!
//! `EditorState` is plain data. All editing goes through `core-model`, which
//! owns one of these and decides when a snapshot is taken. The undo log is a
//! field of the state, constructed with its capacity; there is no process
//! wide history.

use core_syntax::{LanguageProfile, Mode};
use core_text::{MotionOptions, PositionModel, SaveOptions, TextBuffer, Viewport};
use std::path::PathBuf;
use tracing::debug;

pub mod undo;
pub use undo::{DEFAULT_UNDO_CAPACITY, EditSnapshot, UndoError, UndoLog};

/// Knobs consulted by the editing session. Filled from configuration by the
/// binary; `Default` matches the configuration defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSettings {
    pub tab_width: usize,
    pub undo_capacity: usize,
    /// Wrap column used when typing and by reflow. `None` disables wrapping.
    pub wrap_column: Option<usize>,
    pub wrap_when_typing: bool,
    pub motion: MotionOptions,
    /// Lines moved per scroll step.
    pub scroll_speed: usize,
    pub strip_trailing_spaces: bool,
    pub rainbow_parens: bool,
    /// A new line starts with the indentation of the line it was split
    /// from, one unit deeper after an opening bracket or `:`.
    pub smart_indent: bool,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            tab_width: 4,
            undo_capacity: DEFAULT_UNDO_CAPACITY,
            wrap_column: None,
            wrap_when_typing: false,
            motion: MotionOptions::default(),
            scroll_speed: 10,
            strip_trailing_spaces: true,
            rainbow_parens: true,
            smart_indent: false,
        }
    }
}

impl EditSettings {
    /// Wrap column in effect while typing.
    pub fn typing_wrap_column(&self) -> Option<usize> {
        self.wrap_column.filter(|_| self.wrap_when_typing)
    }
}

#[derive(Debug)]
pub struct EditorState {
    pub buffer: TextBuffer,
    pub position: PositionModel,
    pub undo: UndoLog,
    pub viewport: Viewport,
    pub settings: EditSettings,
    pub mode: Mode,
    pub profile: LanguageProfile,
    pub file_name: Option<PathBuf>,
}

impl EditorState {
    pub fn new(buffer: TextBuffer, settings: EditSettings) -> Self {
        Self {
            buffer,
            position: PositionModel::new(settings.tab_width),
            undo: UndoLog::new(settings.undo_capacity),
            viewport: Viewport::new(80, 24),
            settings,
            mode: Mode::Plain,
            profile: LanguageProfile::default(),
            file_name: None,
        }
    }

    pub fn set_language(&mut self, mode: Mode, profile: LanguageProfile) {
        debug!(target: "state", %mode, marker = %profile.single_line_comment(), "language_set");
        self.mode = mode;
        self.profile = profile;
    }

    /// Record the current buffer and cursor before an undoable edit.
    pub fn snapshot(&mut self) {
        self.undo.snapshot(&self.buffer, &self.position);
    }

    /// Put back the most recent snapshot.
    pub fn restore(&mut self) -> Result<(), UndoError> {
        let snap = self.undo.restore()?;
        self.buffer = snap.buffer;
        self.position = snap.position;
        Ok(())
    }

    pub fn save_options(&self) -> SaveOptions {
        SaveOptions {
            strip_trailing_spaces: self.settings.strip_trailing_spaces,
        }
    }

    /// Whether the buffer differs from what was last loaded or saved.
    pub fn dirty(&self) -> bool {
        self.buffer.changed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_uses_settings() {
        let settings = EditSettings {
            tab_width: 8,
            undo_capacity: 16,
            ..EditSettings::default()
        };
        let state = EditorState::new(TextBuffer::new(), settings);
        assert_eq!(state.position.tab_width(), 8);
        assert_eq!(state.undo.capacity(), 16);
        assert_eq!(state.mode, Mode::Plain);
        assert!(!state.dirty());
    }

    #[test]
    fn restore_puts_back_buffer_and_cursor() {
        let mut state = EditorState::new(TextBuffer::from_text("abc"), EditSettings::default());
        state.snapshot();
        state.buffer.set_line(0, "changed");
        state.position.sx = 5;
        state.restore().unwrap();
        assert_eq!(state.buffer.line(0), "abc");
        assert_eq!(state.position.sx, 0);
        assert_eq!(state.restore(), Err(UndoError::NothingToUndo));
    }

    #[test]
    fn typing_wrap_needs_column_and_flag() {
        let mut settings = EditSettings::default();
        assert_eq!(settings.typing_wrap_column(), None);
        settings.wrap_column = Some(72);
        assert_eq!(settings.typing_wrap_column(), None);
        settings.wrap_when_typing = true;
        assert_eq!(settings.typing_wrap_column(), Some(72));
    }
}
