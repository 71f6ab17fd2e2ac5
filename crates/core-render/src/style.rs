//! Colours and the theme that maps lexical classes onto them.

use core_syntax::{LineClass, RuneClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
    White,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub code: Color,
    pub string: Color,
    pub comment: Color,
    /// Bracket colours by nesting depth, cycled.
    pub rainbow: Vec<Color>,
    pub unmatched: Color,
    pub status_fg: Color,
    pub status_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            code: Color::Default,
            string: Color::Green,
            comment: Color::Gray,
            rainbow: vec![
                Color::Yellow,
                Color::Magenta,
                Color::Cyan,
                Color::Blue,
                Color::Green,
                Color::Red,
            ],
            unmatched: Color::Red,
            status_fg: Color::Black,
            status_bg: Color::White,
        }
    }
}

impl Theme {
    /// Foreground for one rune. With `rainbow` off brackets take the code
    /// colour, but an unmatched closer is still flagged.
    pub fn rune_color(&self, class: RuneClass, rainbow: bool) -> Color {
        match class {
            RuneClass::Code => self.code,
            RuneClass::Str => self.string,
            RuneClass::Comment => self.comment,
            RuneClass::Bracket { depth } if rainbow && !self.rainbow.is_empty() => {
                self.rainbow[depth % self.rainbow.len()]
            }
            RuneClass::Bracket { .. } => self.code,
            RuneClass::Unmatched => self.unmatched,
        }
    }

    /// Colour for the blank cells of a line, which follow the line class.
    pub fn line_color(&self, class: LineClass) -> Color {
        match class {
            LineClass::Code => self.code,
            LineClass::SingleLineComment | LineClass::MultiLineComment => self.comment,
            LineClass::MultiLineString | LineClass::BacktickString => self.string,
        }
    }
}
