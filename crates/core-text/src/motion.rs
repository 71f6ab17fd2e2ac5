//! Cursor motion over a `TextBuffer` + `PositionModel` pair.
//!
//! Motions never edit the buffer. Hitting an edge is reported as a
//! `Boundary`, which callers treat as "stay put", never as a failure.

use crate::PositionModel;
use crate::position::Viewport;
use crate::tabs::{self, Column};
use crate::TextBuffer;
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    #[error("already at the top")]
    Top,
    #[error("already at the bottom")]
    Bottom,
    #[error("already at the start")]
    Start,
    #[error("already at the end")]
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionOptions {
    /// Step over a tab in one move (`tab_width` screen columns).
    pub tab_aware: bool,
    /// Moving past either end of a line continues on the neighbouring line.
    pub wrap_to_line: bool,
}

impl Default for MotionOptions {
    fn default() -> Self {
        Self {
            tab_aware: true,
            wrap_to_line: true,
        }
    }
}

impl PositionModel {
    /// One screen row up. Fails only on the first screen row.
    pub fn up(&mut self) -> Result<(), Boundary> {
        if self.sy == 0 {
            return Err(Boundary::Top);
        }
        self.sy -= 1;
        Ok(())
    }

    /// One screen row down. Fails only on the last screen row.
    pub fn down(&mut self, viewport: Viewport) -> Result<(), Boundary> {
        if self.sy + 1 >= viewport.height {
            return Err(Boundary::Bottom);
        }
        self.sy += 1;
        Ok(())
    }

    /// One document line up, scrolling when on the first screen row.
    pub fn line_up(&mut self) -> Result<(), Boundary> {
        if self.up().is_ok() {
            return Ok(());
        }
        if self.offset_y == 0 {
            return Err(Boundary::Top);
        }
        self.offset_y -= 1;
        Ok(())
    }

    /// One document line down, scrolling when on the last screen row.
    /// Fails on the last line of the document.
    pub fn line_down(&mut self, buf: &TextBuffer, viewport: Viewport) -> Result<(), Boundary> {
        if self.at_last_line(buf) {
            return Err(Boundary::Bottom);
        }
        if self.down(viewport).is_err() {
            self.offset_y += 1;
        }
        Ok(())
    }

    pub fn home(&mut self) {
        self.sx = 0;
        self.offset_x = 0;
    }

    /// One past the last screen column of the current line.
    pub fn end(&mut self, buf: &TextBuffer, viewport: Viewport) {
        let width = self.line_width(buf);
        self.offset_x = 0;
        self.set_column(width, viewport);
    }

    /// Advance one data position.
    pub fn next(
        &mut self,
        buf: &TextBuffer,
        viewport: Viewport,
        opts: MotionOptions,
    ) -> Result<(), Boundary> {
        let y = self.data_y();
        let line = buf.line_chars(y);
        let step = match self.data_x(buf) {
            Column::At(i) if opts.tab_aware && line[i] == '\t' => self.tab_width(),
            _ => 1,
        };
        let target = self.column() + step;
        if opts.wrap_to_line {
            if target > tabs::screen_width(line, self.tab_width()) {
                self.line_down(buf, viewport).map_err(|_| Boundary::End)?;
                self.home();
                trace!(target: "text.motion", line = self.data_y(), "next_wrapped_to_line");
                return Ok(());
            }
        } else if target >= viewport.width + self.offset_x {
            return Err(Boundary::End);
        }
        self.set_column(target, viewport);
        Ok(())
    }

    /// Step back one data position.
    pub fn prev(
        &mut self,
        buf: &TextBuffer,
        viewport: Viewport,
        opts: MotionOptions,
    ) -> Result<(), Boundary> {
        let line = buf.line_chars(self.data_y());
        let x = self.data_x(buf).index().min(line.len());
        let step = if opts.tab_aware && x > 0 && line[x - 1] == '\t' {
            self.tab_width()
        } else {
            1
        };
        let col = self.column();
        if col >= step {
            self.set_column(col - step, viewport);
            return Ok(());
        }
        if !opts.wrap_to_line {
            return Err(Boundary::Start);
        }
        self.line_up().map_err(|_| Boundary::Start)?;
        self.end(buf, viewport);
        trace!(target: "text.motion", line = self.data_y(), "prev_wrapped_to_line");
        Ok(())
    }

    /// Down one line keeping the sticky column, snapping to the line end
    /// when the line is shorter.
    pub fn down_end(&mut self, buf: &TextBuffer, viewport: Viewport) -> Result<(), Boundary> {
        let goal = self.saved_x.max(self.column());
        self.line_down(buf, viewport)?;
        self.apply_sticky(buf, viewport, goal);
        Ok(())
    }

    /// Up one line keeping the sticky column.
    pub fn up_end(&mut self, buf: &TextBuffer, viewport: Viewport) -> Result<(), Boundary> {
        let goal = self.saved_x.max(self.column());
        self.line_up()?;
        self.apply_sticky(buf, viewport, goal);
        Ok(())
    }

    fn apply_sticky(&mut self, buf: &TextBuffer, viewport: Viewport, goal: usize) {
        let line = buf.line_chars(self.data_y());
        let col = match tabs::data_column(line, goal, self.tab_width()) {
            Column::At(i) => tabs::column_of(line, i, self.tab_width()),
            Column::PastEnd(_) => tabs::screen_width(line, self.tab_width()),
        };
        self.offset_x = 0;
        self.set_column(col, viewport);
        self.saved_x = goal;
    }

    /// Scroll the view down. Returns `false` when already showing the last
    /// page, so the caller can skip a redraw.
    pub fn scroll_down(&mut self, buf: &TextBuffer, viewport: Viewport, amount: usize) -> bool {
        let max_offset = buf.len().saturating_sub(viewport.height);
        if self.offset_y >= max_offset {
            return false;
        }
        self.offset_y = (self.offset_y + amount).min(max_offset);
        self.offset_x = 0;
        true
    }

    /// Scroll the view up. Returns `false` at the top.
    pub fn scroll_up(&mut self, amount: usize) -> bool {
        if self.offset_y == 0 {
            return false;
        }
        self.offset_y = self.offset_y.saturating_sub(amount);
        self.offset_x = 0;
        true
    }
}
