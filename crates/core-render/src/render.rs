//! Full-frame drawing of an `EditorModel` onto a `Canvas`.
//!
//! Every draw repaints the whole canvas. The text area occupies the top rows;
//! when the status line is enabled it takes the last row. Tabs expand to
//! `tab_width` blank cells coloured by the line class. Columns left of
//! `offset_x` are skipped and anything past the canvas width is cut.

use crate::canvas::Canvas;
use crate::status::status_text;
use crate::style::{Color, Theme};
use core_model::EditorModel;
use core_syntax::RuneClass;
use core_text::ScreenPos;
use core_text::tabs::rune_width;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct Renderer {
    pub theme: Theme,
    pub show_status: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            show_status: true,
        }
    }
}

impl Renderer {
    pub fn new(theme: Theme, show_status: bool) -> Self {
        Self { theme, show_status }
    }

    /// Rows of a canvas `height` tall that show text.
    pub fn text_rows(&self, height: usize) -> usize {
        if self.show_status {
            height.saturating_sub(1)
        } else {
            height
        }
    }

    /// Redraw everything. Returns the cursor cell relative to the canvas.
    pub fn draw(
        &self,
        model: &mut EditorModel,
        canvas: &mut dyn Canvas,
        message: Option<&str>,
    ) -> ScreenPos {
        canvas.clear();
        let rows = self.text_rows(canvas.height());
        let width = canvas.width();
        let pos = *model.position();
        let tab_width = pos.tab_width();
        let rainbow = model.state().settings.rainbow_parens;

        let mut drawn = 0;
        for row in 0..rows {
            let y = pos.offset_y + row;
            if y >= model.buffer().len() {
                break;
            }
            let highlight = model.highlight(y);
            let line = model.buffer().line_chars(y);
            let mut col = 0;
            'runes: for (i, &r) in line.iter().enumerate() {
                let class = highlight.runes.get(i).copied().unwrap_or(RuneClass::Code);
                let (fg, glyph) = if r == '\t' {
                    (self.theme.line_color(highlight.class), ' ')
                } else {
                    (self.theme.rune_color(class, rainbow), r)
                };
                for _ in 0..rune_width(r, tab_width) {
                    if col >= pos.offset_x {
                        let x = col - pos.offset_x;
                        if x >= width {
                            break 'runes;
                        }
                        canvas.write_rune(x, row, fg, Color::Default, glyph);
                    }
                    col += 1;
                }
            }
            drawn += 1;
        }

        if self.show_status && canvas.height() > 0 {
            self.draw_status(canvas, &status_text(model, message));
        }
        trace!(target: "render", rows = drawn, width, offset_y = pos.offset_y, "frame_drawn");
        ScreenPos { x: pos.sx, y: pos.sy }
    }

    fn draw_status(&self, canvas: &mut dyn Canvas, text: &str) {
        let y = canvas.height() - 1;
        let (fg, bg) = (self.theme.status_fg, self.theme.status_bg);
        let mut runes = text.chars();
        for x in 0..canvas.width() {
            canvas.write_rune(x, y, fg, bg, runes.next().unwrap_or(' '));
        }
    }
}
