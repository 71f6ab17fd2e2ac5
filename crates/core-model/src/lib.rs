//! The editing session.
//!
//! `EditorModel` is the only mutator of an `EditorState`. Every key handler
//! in the edit loop ends up calling one method here, which edits the buffer
//! (directly or through the wrap engine), moves the cursor and invalidates
//! the lexer cache from the first line that may have changed.
//!
//! Undo is explicit: callers take `snapshot` before an edit they want to be
//! undoable. Motions are never snapshotted.

use core_events::StatusLine;
use core_state::{EditorState, UndoError};
use core_syntax::{BracketMatch, LexCache, LineHighlight, classify_line, find_matching};
use core_text::{
    Boundary, BufferError, DataCursor, MotionOptions, PositionModel, TextBuffer, Viewport,
};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, trace};

pub mod jobs;
pub mod reflow;
pub mod search;
pub mod wrap;

pub use jobs::spawn_save;
pub use reflow::Reflowed;
pub use search::{Direction, SearchHit};
pub use wrap::{InsertOutcome, MAX_MIGRATING_WORD};

#[derive(Error, Debug)]
pub enum EditError {
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Undo(#[from] UndoError),
    #[error(transparent)]
    Boundary(#[from] Boundary),
}

#[derive(Debug)]
pub struct EditorModel {
    state: EditorState,
    cache: LexCache,
}

impl EditorModel {
    pub fn new(state: EditorState) -> Self {
        Self {
            state,
            cache: LexCache::new(),
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Direct access for callers that edit the buffer themselves. The lexer
    /// cache is dropped since any line may change.
    pub fn state_mut(&mut self) -> &mut EditorState {
        self.cache.clear();
        &mut self.state
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.state.buffer
    }

    pub fn position(&self) -> &PositionModel {
        &self.state.position
    }

    pub fn viewport(&self) -> Viewport {
        self.state.viewport
    }

    pub fn cursor(&self) -> DataCursor {
        self.state.position.data_cursor(&self.state.buffer)
    }

    fn motion(&self) -> MotionOptions {
        self.state.settings.motion
    }

    fn edited_from(&mut self, line: usize) {
        self.cache.invalidate_from(line);
    }

    // --- editing ---

    /// Insert `r` at the cursor without wrapping or moving. Returns `false`
    /// when the cursor lies past the end of the line.
    pub fn insert(&mut self, r: char) -> bool {
        let at = self.cursor();
        let inserted = self.state.buffer.insert(at, r);
        self.edited_from(at.y);
        trace!(target: "model.edit", line = at.y, col = at.x, inserted, "insert");
        inserted
    }

    /// Insert a typed rune, wrapping when a typing wrap column is set.
    /// Non-breaking spaces are stored as plain spaces.
    pub fn insert_rune(&mut self, r: char) -> Result<InsertOutcome, EditError> {
        let r = if r == '\u{a0}' { ' ' } else { r };
        let y = self.state.position.data_y();
        if self.state.position.after_line_contents_plus_one(&self.state.buffer) {
            self.end();
        }
        let outcome = match self.state.settings.typing_wrap_column() {
            Some(column) => wrap::insert_wrapped(
                &mut self.state.buffer,
                &mut self.state.position,
                self.state.viewport,
                column,
                r,
            )?,
            None => {
                self.insert(r);
                InsertOutcome::Inserted
            }
        };
        self.edited_from(y);
        Ok(outcome)
    }

    /// Type `text`, advancing past every inserted rune. A `\n` starts a new
    /// line.
    pub fn insert_string_and_move(&mut self, text: &str) -> Result<(), EditError> {
        for r in text.chars() {
            if r == '\n' {
                self.new_line()?;
                continue;
            }
            if self.insert_rune(r)? == InsertOutcome::Inserted {
                self.advance()?;
            }
        }
        Ok(())
    }

    /// Break the line at the cursor and move to the start of the new line,
    /// or past its indentation when smart indent is on.
    pub fn new_line(&mut self) -> Result<(), EditError> {
        let at = self.cursor();
        let indent = if self.state.settings.smart_indent && at.x > 0 {
            self.indent_after(at)
        } else {
            Vec::new()
        };
        let buf = &mut self.state.buffer;
        if !buf.has_line(at.y) {
            buf.set_line(at.y, "");
        }
        if !buf.split_line(at)? {
            if at.x == 0 && buf.line_len(at.y) > 0 {
                buf.insert_line_at(at.y)?;
            } else {
                buf.trim_right(at.y);
                buf.insert_line_below(at.y)?;
            }
        }
        self.edited_from(at.y);
        let viewport = self.state.viewport;
        self.state.position.line_down(&self.state.buffer, viewport)?;
        self.state.position.home();
        if !indent.is_empty() {
            let y = at.y + 1;
            for (x, r) in indent.iter().enumerate() {
                self.state.buffer.insert(DataCursor::new(x, y), *r);
            }
            self.go_to(DataCursor::new(indent.len(), y));
        }
        debug!(target: "model.edit", line = at.y, col = at.x, indent = indent.len(), "new_line");
        Ok(())
    }

    /// Leading whitespace of line `at.y`, one profile indent unit deeper
    /// when the text before `at` ends with an opener.
    fn indent_after(&self, at: DataCursor) -> Vec<char> {
        let line = self.state.buffer.line_chars(at.y);
        let head = &line[..at.x.min(line.len())];
        let mut indent: Vec<char> = head
            .iter()
            .take_while(|r| matches!(**r, ' ' | '\t'))
            .copied()
            .collect();
        let opens = head
            .iter()
            .rev()
            .find(|r| !r.is_whitespace())
            .is_some_and(|r| matches!(*r, '(' | '[' | '{' | ':'));
        if opens {
            indent.extend(self.state.profile.indent.as_string().chars());
        }
        indent
    }

    /// Delete under the cursor. A blank line is removed entirely and the
    /// cursor goes to the start of the line that replaced it.
    pub fn delete(&mut self) -> Result<(), EditError> {
        let at = self.cursor();
        let blank = self
            .state
            .buffer
            .line_chars(at.y)
            .iter()
            .all(|r| r.is_whitespace());
        let before = self.state.buffer.len();
        self.state.buffer.delete(at)?;
        self.edited_from(at.y);
        if blank && self.state.buffer.len() < before {
            self.after_line_removed(at.y);
        }
        trace!(target: "model.edit", line = at.y, col = at.x, "delete");
        Ok(())
    }

    /// Delete the rune before the cursor, joining with the previous line at
    /// the start of a line. An empty line is removed and the cursor goes to
    /// the end of the line above.
    pub fn backspace(&mut self) -> Result<(), EditError> {
        let viewport = self.state.viewport;
        if self.state.position.at_start_of_document() {
            return Err(Boundary::Start.into());
        }
        if self.state.position.empty_line(&self.state.buffer) && self.state.position.data_y() > 0 {
            let y = self.state.position.data_y();
            self.state.buffer.delete_line(y)?;
            self.edited_from(y);
            self.state.position.line_up()?;
            self.end();
            debug!(target: "model.edit", line = y, "empty_line_removed");
            return Ok(());
        }
        if self.state.position.at_start_of_line() {
            self.state.position.line_up()?;
            self.end();
        } else {
            let opts = MotionOptions {
                wrap_to_line: false,
                ..self.motion()
            };
            self.state
                .position
                .prev(&self.state.buffer, viewport, opts)?;
        }
        self.delete()
    }

    pub fn delete_line(&mut self) -> Result<(), EditError> {
        let y = self.state.position.data_y();
        self.state.buffer.delete_line(y)?;
        self.edited_from(y);
        self.after_line_removed(y);
        debug!(target: "model.edit", line = y, "delete_line");
        Ok(())
    }

    fn after_line_removed(&mut self, y: usize) {
        let pos = &mut self.state.position;
        if y >= self.state.buffer.len() && y > 0 && pos.line_up().is_err() {
            trace!(target: "model.edit", "cursor_at_top");
        }
        pos.home();
    }

    // --- motion ---

    pub fn next(&mut self) -> Result<(), Boundary> {
        let viewport = self.state.viewport;
        let opts = self.motion();
        self.state.position.next(&self.state.buffer, viewport, opts)
    }

    /// Step past a rune just typed. The rune is always inside the line, so
    /// this never leaves it, whatever the motion options.
    fn advance(&mut self) -> Result<(), Boundary> {
        let viewport = self.state.viewport;
        let opts = MotionOptions {
            wrap_to_line: true,
            ..self.motion()
        };
        self.state.position.next(&self.state.buffer, viewport, opts)
    }

    pub fn prev(&mut self) -> Result<(), Boundary> {
        let viewport = self.state.viewport;
        let opts = self.motion();
        self.state.position.prev(&self.state.buffer, viewport, opts)
    }

    pub fn home(&mut self) {
        self.state.position.home();
    }

    /// Right-trim the current line, then move one past its last rune.
    pub fn end(&mut self) {
        let y = self.state.position.data_y();
        if self.state.buffer.trim_right(y) {
            self.edited_from(y);
        }
        let viewport = self.state.viewport;
        self.state.position.end(&self.state.buffer, viewport);
    }

    pub fn up(&mut self) -> Result<(), Boundary> {
        self.state.position.line_up()
    }

    pub fn down(&mut self) -> Result<(), Boundary> {
        let viewport = self.state.viewport;
        self.state.position.line_down(&self.state.buffer, viewport)
    }

    pub fn up_end(&mut self) -> Result<(), Boundary> {
        let viewport = self.state.viewport;
        self.state.position.up_end(&self.state.buffer, viewport)
    }

    pub fn down_end(&mut self) -> Result<(), Boundary> {
        let viewport = self.state.viewport;
        self.state.position.down_end(&self.state.buffer, viewport)
    }

    /// Scroll down by the configured scroll speed. `false` means nothing
    /// moved and no redraw is needed.
    pub fn scroll_down(&mut self) -> bool {
        let viewport = self.state.viewport;
        let amount = self.state.settings.scroll_speed;
        self.state
            .position
            .scroll_down(&self.state.buffer, viewport, amount)
    }

    pub fn scroll_up(&mut self) -> bool {
        let amount = self.state.settings.scroll_speed;
        self.state.position.scroll_up(amount)
    }

    pub fn go_to(&mut self, at: DataCursor) {
        let viewport = self.state.viewport;
        self.state.position.go_to(&self.state.buffer, viewport, at);
    }

    /// Keep the cursor on screen after the text area changed size.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.state.viewport = viewport;
        let pos = &mut self.state.position;
        let height = viewport.height.max(1);
        if pos.sy >= height {
            pos.offset_y += pos.sy - (height - 1);
            pos.sy = height - 1;
        }
        let col = pos.column();
        pos.offset_x = 0;
        pos.set_column(col, viewport);
        debug!(target: "model.edit", width = viewport.width, height = viewport.height, "viewport_set");
    }

    // --- undo ---

    pub fn snapshot(&mut self) {
        self.state.snapshot();
    }

    pub fn undo(&mut self) -> Result<(), EditError> {
        self.state.restore()?;
        self.cache.clear();
        Ok(())
    }

    // --- whole-document operations ---

    /// Reflow the document to `width` (the configured wrap column when
    /// `None`). The cursor moves to the start of the line holding the first
    /// word of its previous line. Returns `false` without changes when no
    /// width is available.
    pub fn reflow(&mut self, width: Option<usize>) -> bool {
        let Some(width) = width.or(self.state.settings.wrap_column) else {
            return false;
        };
        let reflowed = reflow::reflow(&self.state.buffer, width, self.state.position.data_y());
        self.state.buffer = reflowed.buffer;
        self.cache.clear();
        self.go_to(DataCursor::new(0, reflowed.cursor_line));
        true
    }

    /// Break every over-long line at `width`. Returns the number of breaks.
    pub fn wrap_all_lines(&mut self, width: usize) -> Result<usize, EditError> {
        let tab_width = self.state.position.tab_width();
        let breaks = reflow::wrap_all_lines(&mut self.state.buffer, width, tab_width)?;
        if breaks > 0 {
            self.cache.clear();
        }
        Ok(breaks)
    }

    /// Move the cursor to the bracket matching the one under it.
    pub fn jump_to_matching(&mut self) -> BracketMatch {
        let at = self.cursor();
        let found = find_matching(&self.state.buffer, &self.state.profile, &mut self.cache, at);
        if let BracketMatch::Found(target) = found {
            self.go_to(target);
        }
        found
    }

    /// Move to the next occurrence of `term` in `dir`, wrapping at the ends
    /// of the document. A miss leaves the cursor alone and says so on the
    /// status line.
    pub fn search(&mut self, term: &str, dir: Direction, status: &StatusLine) -> Option<SearchHit> {
        if term.is_empty() {
            return None;
        }
        let from = self.cursor();
        let Some(hit) = search::find(&self.state.buffer, term, from, dir) else {
            status.set(format!("{term} not found"));
            debug!(target: "model.search", term, ?dir, "search_miss");
            return None;
        };
        if hit.wrapped {
            status.set("search wrapped");
        }
        self.go_to(hit.at);
        debug!(
            target: "model.search",
            term,
            line = hit.at.y,
            col = hit.at.x,
            wrapped = hit.wrapped,
            "search_hit"
        );
        Some(hit)
    }

    pub fn search_forward(&mut self, term: &str, status: &StatusLine) -> Option<SearchHit> {
        self.search(term, Direction::Forward, status)
    }

    pub fn search_backward(&mut self, term: &str, status: &StatusLine) -> Option<SearchHit> {
        self.search(term, Direction::Backward, status)
    }

    /// Lexical classification of line `y`, for drawing.
    pub fn highlight(&mut self, y: usize) -> LineHighlight {
        let profile = &self.state.profile;
        let start = self.cache.state_at(&self.state.buffer, profile, y);
        classify_line(start, profile, self.state.buffer.line_chars(y)).0
    }

    // --- files ---

    /// Replace the buffer with the file at `path`. History and cursor are
    /// reset.
    pub fn load(&mut self, path: &Path) -> Result<(), EditError> {
        let buffer = TextBuffer::load(path)?;
        self.state.buffer = buffer;
        self.state.position = PositionModel::new(self.state.settings.tab_width);
        self.state.undo.clear();
        self.state.file_name = Some(path.to_path_buf());
        self.cache.clear();
        info!(target: "model.edit", file = %path.display(), lines = self.state.buffer.len(), "loaded");
        Ok(())
    }

    /// Write the buffer to `path`, or to the loaded file when `None`.
    pub fn save(&mut self, path: Option<&Path>) -> Result<usize, EditError> {
        let opts = self.state.save_options();
        let target = match path.or(self.state.file_name.as_deref()) {
            Some(p) => p.to_path_buf(),
            None => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no file name",
                )
                .into());
            }
        };
        let bytes = self.state.buffer.save(&target, opts)?;
        self.state.buffer.mark_saved();
        self.state.file_name.get_or_insert(target);
        Ok(bytes)
    }
}

impl fmt::Display for EditorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.state.buffer, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_state::EditSettings;
    use pretty_assertions::assert_eq;

    fn model(text: &str) -> EditorModel {
        EditorModel::new(EditorState::new(TextBuffer::from_text(text), EditSettings::default()))
    }

    #[test]
    fn nbsp_is_stored_as_space() {
        let mut m = model("");
        m.insert_string_and_move("a\u{a0}b").unwrap();
        assert_eq!(m.to_string(), "a b\n");
    }

    #[test]
    fn new_line_splits_and_moves_down() {
        let mut m = model("hello world");
        m.go_to(DataCursor::new(6, 0));
        m.new_line().unwrap();
        assert_eq!(m.to_string(), "hello\nworld\n");
        assert_eq!(m.cursor(), DataCursor::new(0, 1));
    }

    #[test]
    fn new_line_at_end_and_start() {
        let mut m = model("ab");
        m.end();
        m.new_line().unwrap();
        assert_eq!(m.to_string(), "ab\n\n");
        assert_eq!(m.cursor(), DataCursor::new(0, 1));

        let mut m = model("ab");
        m.new_line().unwrap();
        assert_eq!(m.to_string(), "\nab\n");
        assert_eq!(m.cursor(), DataCursor::new(0, 1));
    }

    #[test]
    fn new_line_in_empty_buffer() {
        let mut m = model("");
        m.insert_string_and_move("a\nb").unwrap();
        assert_eq!(m.to_string(), "a\nb\n");
    }

    #[test]
    fn smart_indent_follows_previous_line() {
        let settings = EditSettings {
            smart_indent: true,
            ..EditSettings::default()
        };
        let mut m = EditorModel::new(EditorState::new(TextBuffer::new(), settings));
        m.insert_string_and_move("fn f() {\nlet x = [\n1,\n").unwrap();
        assert_eq!(m.cursor(), DataCursor::new(8, 3));
        m.insert_string_and_move("2").unwrap();
        assert_eq!(m.to_string(), "fn f() {\n    let x = [\n        1,\n        2\n");

        let table = core_syntax::ProfileTable::builtin();
        m.state_mut().set_language(core_syntax::Mode::Go, table.get(core_syntax::Mode::Go).clone());
        m.insert_string_and_move(" {\nz").unwrap();
        assert_eq!(m.buffer().line(4), "        \tz");
    }

    #[test]
    fn smart_indent_is_off_by_default() {
        let mut m = model("");
        m.insert_string_and_move("  a {\nb").unwrap();
        assert_eq!(m.to_string(), "  a {\nb\n");
    }

    #[test]
    fn backspace_joins_lines() {
        let mut m = model("ab\ncd");
        m.go_to(DataCursor::new(0, 1));
        m.backspace().unwrap();
        assert_eq!(m.to_string(), "abcd\n");
        assert_eq!(m.cursor(), DataCursor::new(2, 0));
        m.backspace().unwrap();
        assert_eq!(m.to_string(), "acd\n");
        m.home();
        assert!(matches!(m.backspace(), Err(EditError::Boundary(Boundary::Start))));
    }

    #[test]
    fn backspace_on_empty_line_removes_it() {
        let mut m = model("ab\n\ncd");
        m.go_to(DataCursor::new(0, 1));
        m.backspace().unwrap();
        assert_eq!(m.to_string(), "ab\ncd\n");
        assert_eq!(m.cursor(), DataCursor::new(2, 0));
    }

    #[test]
    fn delete_blank_line_removes_it() {
        let mut m = model("a\n   \nb");
        m.go_to(DataCursor::new(1, 1));
        m.delete().unwrap();
        assert_eq!(m.to_string(), "a\nb\n");
        assert_eq!(m.cursor(), DataCursor::new(0, 1));
    }

    #[test]
    fn delete_line_on_last_line_moves_up() {
        let mut m = model("a\nb");
        m.go_to(DataCursor::new(0, 1));
        m.delete_line().unwrap();
        assert_eq!(m.to_string(), "a\n");
        assert_eq!(m.cursor(), DataCursor::new(0, 0));
    }

    #[test]
    fn end_trims_trailing_spaces() {
        let mut m = model("abc   ");
        m.end();
        assert_eq!(m.position().sx, 3);
        assert_eq!(m.to_string(), "abc\n");
    }

    #[test]
    fn undo_restores_buffer_and_cursor() {
        let mut m = model("abc");
        m.snapshot();
        m.end();
        m.insert_string_and_move("def").unwrap();
        m.undo().unwrap();
        assert_eq!(m.to_string(), "abc\n");
        assert_eq!(m.cursor(), DataCursor::new(0, 0));
        assert!(matches!(m.undo(), Err(EditError::Undo(UndoError::NothingToUndo))));
    }

    #[test]
    fn reflow_uses_configured_column() {
        let mut m = model("aa bb cc");
        assert!(!m.reflow(None));
        m.state_mut().settings.wrap_column = Some(5);
        assert!(m.reflow(None));
        assert_eq!(m.to_string(), "aa bb\ncc\n");
    }

    #[test]
    fn jump_to_matching_moves_cursor() {
        let mut m = model("f(a(b))");
        m.go_to(DataCursor::new(1, 0));
        assert_eq!(m.jump_to_matching(), BracketMatch::Found(DataCursor::new(6, 0)));
        assert_eq!(m.cursor(), DataCursor::new(6, 0));
        m.go_to(DataCursor::new(0, 0));
        assert_eq!(m.jump_to_matching(), BracketMatch::NotABracket);
    }

    #[test]
    fn search_moves_wraps_and_reports_misses() {
        let status = StatusLine::new();
        let mut m = model("fn a() {}\nlet b = a;\nfn c() {}");
        m.go_to(DataCursor::new(0, 1));
        let hit = m.search_forward("fn", &status).unwrap();
        assert_eq!((hit.at, hit.wrapped), (DataCursor::new(0, 2), false));
        assert_eq!(m.cursor(), DataCursor::new(0, 2));

        let hit = m.search_forward("fn", &status).unwrap();
        assert_eq!((hit.at, hit.wrapped), (DataCursor::new(0, 0), true));
        assert_eq!(status.current().as_deref(), Some("search wrapped"));

        let hit = m.search_backward("a", &status).unwrap();
        assert_eq!(hit.at, DataCursor::new(8, 1));
        assert_eq!(m.cursor(), DataCursor::new(8, 1));

        assert_eq!(m.search_forward("zebra", &status), None);
        assert_eq!(m.cursor(), DataCursor::new(8, 1));
        assert_eq!(status.current().as_deref(), Some("zebra not found"));
    }

    #[test]
    fn viewport_shrink_keeps_cursor_visible() {
        let text = (0..50).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let mut m = model(&text);
        m.go_to(DataCursor::new(0, 20));
        m.set_viewport(Viewport::new(80, 5));
        assert!(m.position().sy < 5);
        assert_eq!(m.cursor().y, 20);
    }

    #[test]
    fn save_without_name_is_io_error() {
        let mut m = model("x");
        assert!(matches!(m.save(None), Err(EditError::Io(_))));
    }
}
