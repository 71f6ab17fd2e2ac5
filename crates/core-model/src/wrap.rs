//! Word wrapping while typing.
//!
//! `insert_wrapped` is consulted for every typed rune when a wrap column is
//! active. If the rune still fits it is inserted in place. Otherwise one of
//! four rewrites applies, checked in order:
//!
//! 1. Cursor inside the line: the tail from the cursor moves to a new line
//!    below, led by the new rune. Typed whitespace is dropped there, since
//!    the break already separates the words. At column 0 the rune gets a
//!    line of its own above instead.
//! 2. Cursor at the end, typing a word character right after another one:
//!    when the trailing word is short it migrates to a new line together
//!    with the rune.
//! 3. Cursor at the end, typing whitespace: a new empty line is started and
//!    the whitespace is dropped.
//! 4. Cursor at the end otherwise: the rune starts a new line on its own.
//!
//! The line the cursor came from is right-trimmed in every rewrite.

use core_text::tabs::{self, rune_width};
use core_text::{BufferError, DataCursor, PositionModel, TextBuffer, Viewport};
use tracing::{debug, trace};

/// Longest trailing word that is carried to the next line with the cursor.
pub const MAX_MIGRATING_WORD: usize = 15;

/// Where the cursor ended up after inserting a rune.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The cursor rests on the inserted rune; the caller advances past it.
    Inserted,
    /// A fresh line was started and the cursor already sits where typing
    /// continues.
    LineStarted,
}

/// Insert `r` at the cursor, wrapping at screen column `column`.
pub fn insert_wrapped(
    buf: &mut TextBuffer,
    pos: &mut PositionModel,
    viewport: Viewport,
    column: usize,
    r: char,
) -> Result<InsertOutcome, BufferError> {
    let tab_width = pos.tab_width();
    let at = pos.data_cursor(buf);
    let y = at.y;
    let line = buf.line_chars(y).to_vec();

    if tabs::screen_width(&line, tab_width) + rune_width(r, tab_width) <= column {
        buf.insert(at, r);
        return Ok(InsertOutcome::Inserted);
    }

    if at.x < line.len() {
        if at.x == 0 {
            buf.insert_line_at(y)?;
            buf.set_line(y, &r.to_string());
            pos.home();
            debug!(target: "model.wrap", line = y, "wrap_rune_above");
            return Ok(InsertOutcome::Inserted);
        }
        let mut moved = String::new();
        if !r.is_whitespace() {
            moved.push(r);
        }
        moved.extend(&line[at.x..]);
        buf.delete_rest_of_line(at);
        buf.trim_right(y);
        buf.insert_line_below(y)?;
        buf.set_line(y + 1, &moved);
        cursor_to_line_below(buf, pos, viewport, 0);
        debug!(target: "model.wrap", line = y, col = at.x, "wrap_tail");
        return Ok(if r.is_whitespace() {
            InsertOutcome::LineStarted
        } else {
            InsertOutcome::Inserted
        });
    }

    if r.is_whitespace() {
        buf.trim_right(y);
        buf.insert_line_below(y)?;
        cursor_to_line_below(buf, pos, viewport, 0);
        debug!(target: "model.wrap", line = y, "wrap_line_started");
        return Ok(InsertOutcome::LineStarted);
    }

    if let Some(word_start) = migrating_word(&line, column) {
        let mut moved: String = line[word_start..].iter().collect();
        let word_len = line.len() - word_start;
        moved.push(r);
        buf.delete_rest_of_line(DataCursor::new(word_start, y));
        buf.trim_right(y);
        buf.insert_line_below(y)?;
        buf.set_line(y + 1, &moved);
        cursor_to_line_below(buf, pos, viewport, word_len);
        debug!(target: "model.wrap", line = y, word_len, "wrap_word_migrated");
        return Ok(InsertOutcome::Inserted);
    }

    buf.trim_right(y);
    buf.insert_line_below(y)?;
    buf.set_line(y + 1, &r.to_string());
    cursor_to_line_below(buf, pos, viewport, 0);
    debug!(target: "model.wrap", line = y, "wrap_rune_below");
    Ok(InsertOutcome::Inserted)
}

/// Start index of the trailing word when it may migrate: the line ends in a
/// non-space, a space precedes the word, and the word plus one more rune
/// fits in `column`.
fn migrating_word(line: &[char], column: usize) -> Option<usize> {
    let last = *line.last()?;
    if last.is_whitespace() {
        return None;
    }
    let space = line.iter().rposition(|c| c.is_whitespace())?;
    let word_len = line.len() - space - 1;
    (word_len < MAX_MIGRATING_WORD && word_len < column).then_some(space + 1)
}

fn cursor_to_line_below(buf: &TextBuffer, pos: &mut PositionModel, viewport: Viewport, x: usize) {
    if pos.line_down(buf, viewport).is_err() {
        trace!(target: "model.wrap", "cursor_already_on_last_line");
    }
    pos.home();
    let col = tabs::column_of(buf.line_chars(pos.data_y()), x, pos.tab_width());
    pos.set_column(col, viewport);
}
