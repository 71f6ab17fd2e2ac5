//! Render targets.
//!
//! The renderer only ever writes single cells. Turning cells into terminal
//! escape sequences belongs to whoever implements `Canvas` for a real
//! terminal; `MemoryCanvas` keeps them in memory for tests and for the
//! `render` subcommand.

use crate::style::Color;

pub trait Canvas {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Writes outside the canvas are ignored.
    fn write_rune(&mut self, x: usize, y: usize, fg: Color, bg: Color, r: char);
    /// Change the size. Contents are unspecified afterwards until redrawn.
    fn resize(&mut self, width: usize, height: usize);
    fn clear(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub rune: char,
    pub fg: Color,
    pub bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            rune: ' ',
            fg: Color::Default,
            bg: Color::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryCanvas {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl MemoryCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
        }
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x)
    }

    pub fn row(&self, y: usize) -> String {
        let start = (y * self.width).min(self.cells.len());
        let end = (start + self.width).min(self.cells.len());
        let text: String = self.cells[start..end].iter().map(|c| c.rune).collect();
        text.trim_end().to_string()
    }

    /// Every row with trailing blanks removed, joined by `\n`.
    pub fn to_text(&self) -> String {
        (0..self.height)
            .map(|y| self.row(y))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Canvas for MemoryCanvas {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn write_rune(&mut self, x: usize, y: usize, fg: Color, bg: Color, r: char) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.cells[y * self.width + x] = Cell { rune: r, fg, bg };
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells = vec![Cell::default(); width * height];
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }
}
