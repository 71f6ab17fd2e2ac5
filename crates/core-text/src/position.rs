//! Cursor and scroll state, and the mapping between screen and data
//! coordinates.
//!
//! The screen cursor `(sx, sy)` is relative to the visible text area; the
//! view is scrolled by `(offset_x, offset_y)`. The data line under the cursor
//! is always `offset_y + sy`. The data column is found by walking the line
//! and expanding tabs until screen column `sx + offset_x` is reached.

use crate::tabs::{self, Column};
use crate::{DataCursor, TextBuffer};

/// Size of the visible text area in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// A cell relative to the top-left corner of the visible text area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenPos {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionModel {
    pub sx: usize,
    pub sy: usize,
    pub offset_x: usize,
    pub offset_y: usize,
    /// Sticky column for vertical motion.
    pub saved_x: usize,
    tab_width: usize,
}

impl Default for PositionModel {
    fn default() -> Self {
        Self::new(4)
    }
}

impl PositionModel {
    pub fn new(tab_width: usize) -> Self {
        Self {
            sx: 0,
            sy: 0,
            offset_x: 0,
            offset_y: 0,
            saved_x: 0,
            tab_width: tab_width.max(1),
        }
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Absolute screen column of the cursor (`sx + offset_x`).
    pub fn column(&self) -> usize {
        self.sx + self.offset_x
    }

    pub fn data_y(&self) -> usize {
        self.offset_y + self.sy
    }

    pub fn data_x(&self, buf: &TextBuffer) -> Column {
        tabs::data_column(buf.line_chars(self.data_y()), self.column(), self.tab_width)
    }

    pub fn data_cursor(&self, buf: &TextBuffer) -> DataCursor {
        DataCursor::new(self.data_x(buf).index(), self.data_y())
    }

    /// Rune under the cursor, `None` past the end of the line.
    pub fn rune(&self, buf: &TextBuffer) -> Option<char> {
        match self.data_x(buf) {
            Column::At(i) => buf.line_chars(self.data_y()).get(i).copied(),
            Column::PastEnd(_) => None,
        }
    }

    /// Rune immediately left of the cursor.
    pub fn rune_before(&self, buf: &TextBuffer) -> Option<char> {
        let x = self.data_x(buf).index();
        x.checked_sub(1)
            .and_then(|i| buf.line_chars(self.data_y()).get(i).copied())
    }

    pub fn screen_to_data(&self, buf: &TextBuffer, screen: ScreenPos) -> DataCursor {
        let y = self.offset_y + screen.y;
        let col = self.offset_x + screen.x;
        DataCursor::new(
            tabs::data_column(buf.line_chars(y), col, self.tab_width).index(),
            y,
        )
    }

    /// Screen cell of a data position, `None` when it is scrolled out above
    /// or to the left of the view.
    pub fn data_to_screen(&self, buf: &TextBuffer, at: DataCursor) -> Option<ScreenPos> {
        let col = tabs::column_of(buf.line_chars(at.y), at.x, self.tab_width);
        Some(ScreenPos {
            x: col.checked_sub(self.offset_x)?,
            y: at.y.checked_sub(self.offset_y)?,
        })
    }

    /// Move the cursor to absolute screen column `col` of the current line,
    /// scrolling horizontally to keep it inside the viewport.
    pub fn set_column(&mut self, col: usize, viewport: Viewport) {
        let width = viewport.width.max(1);
        if col < self.offset_x {
            self.offset_x = col;
            self.sx = 0;
            return;
        }
        self.sx = col - self.offset_x;
        if self.sx >= width {
            self.offset_x += self.sx - (width - 1);
            self.sx = width - 1;
        }
    }

    /// Place the cursor on a data position. A line outside the view is
    /// brought to the middle of the screen.
    pub fn go_to(&mut self, buf: &TextBuffer, viewport: Viewport, at: DataCursor) {
        let height = viewport.height.max(1);
        if at.y < self.offset_y || at.y >= self.offset_y + height {
            let max_offset = buf.len().saturating_sub(height);
            self.offset_y = at.y.saturating_sub(height / 2).min(max_offset);
            if at.y >= self.offset_y + height {
                self.offset_y = at.y + 1 - height;
            }
        }
        self.sy = at.y - self.offset_y;
        self.offset_x = 0;
        let col = tabs::column_of(buf.line_chars(at.y), at.x, self.tab_width);
        self.set_column(col, viewport);
    }

    pub fn save_x(&mut self) {
        self.saved_x = self.column();
    }

    // --- predicates ---

    /// The cursor is at or past the end of the line: no rune under it.
    pub fn after_line_contents(&self, buf: &TextBuffer) -> bool {
        self.column() >= self.line_width(buf)
    }

    /// The cursor is beyond the append position of the line.
    pub fn after_line_contents_plus_one(&self, buf: &TextBuffer) -> bool {
        self.column() > self.line_width(buf)
    }

    /// The cursor is on the last rune of the line or after it.
    pub fn at_end_of_line(&self, buf: &TextBuffer) -> bool {
        let line = buf.line_chars(self.data_y());
        match self.data_x(buf) {
            Column::At(i) => i + 1 >= line.len(),
            Column::PastEnd(_) => true,
        }
    }

    pub fn at_start_of_line(&self) -> bool {
        self.column() == 0
    }

    pub fn at_last_line(&self, buf: &TextBuffer) -> bool {
        self.data_y() + 1 >= buf.len()
    }

    pub fn at_start_of_document(&self) -> bool {
        self.data_y() == 0 && self.at_start_of_line()
    }

    pub fn at_end_of_document(&self, buf: &TextBuffer) -> bool {
        self.at_last_line(buf) && self.after_line_contents(buf)
    }

    pub fn empty_line(&self, buf: &TextBuffer) -> bool {
        buf.line_len(self.data_y()) == 0
    }

    pub(crate) fn line_width(&self, buf: &TextBuffer) -> usize {
        tabs::screen_width(buf.line_chars(self.data_y()), self.tab_width)
    }
}
