//! Whole-document reformatting to a width.

use core_text::tabs::{self, Column};
use core_text::{BufferError, TextBuffer};
use tracing::debug;

/// A reflowed document and the line that now holds the start of the
/// cursor's original line.
#[derive(Debug)]
pub struct Reflowed {
    pub buffer: TextBuffer,
    pub cursor_line: usize,
}

/// Greedily pack the words of every paragraph into lines of at most `width`
/// runes. Runs of blank lines become a single blank line. A word longer than
/// `width` gets a line of its own.
pub fn reflow(buf: &TextBuffer, width: usize, cursor_line: usize) -> Reflowed {
    let width = width.max(1);
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    let mut cursor_out = None;
    let mut in_blank_run = false;

    for y in 0..buf.len() {
        let line = buf.line_chars(y);
        if line.iter().all(|r| r.is_whitespace()) {
            if current_len > 0 {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if !in_blank_run {
                out.push(String::new());
                in_blank_run = true;
            }
            if y == cursor_line {
                cursor_out = Some(out.len() - 1);
            }
            continue;
        }
        in_blank_run = false;
        for (i, word) in line
            .split(|r| r.is_whitespace())
            .filter(|w| !w.is_empty())
            .enumerate()
        {
            if current_len > 0 && current_len + 1 + word.len() > width {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            if i == 0 && y == cursor_line {
                cursor_out = Some(out.len());
            }
            current.extend(word);
            current_len += word.len();
        }
    }
    if current_len > 0 {
        out.push(current);
    }

    let mut buffer = TextBuffer::new();
    for (y, line) in out.iter().enumerate() {
        buffer.set_line(y, line);
    }
    let cursor_line = cursor_out.unwrap_or(out.len().saturating_sub(1));
    debug!(target: "model.wrap", width, lines_in = buf.len(), lines_out = out.len(), cursor_line, "reflow");
    Reflowed {
        buffer,
        cursor_line,
    }
}

/// Break every line wider than `width` screen columns. The break goes at
/// the last space in the second half of the allowed width, or hard at the
/// limit when there is none; the remainder moves to a new line below and is
/// checked in turn. Returns the number of breaks made.
pub fn wrap_all_lines(
    buf: &mut TextBuffer,
    width: usize,
    tab_width: usize,
) -> Result<usize, BufferError> {
    if width == 0 {
        return Ok(0);
    }
    let mut breaks = 0;
    let mut y = 0;
    while y < buf.len() {
        let line = buf.line_chars(y).to_vec();
        if tabs::screen_width(&line, tab_width) <= width {
            y += 1;
            continue;
        }
        let limit = match tabs::data_column(&line, width, tab_width) {
            Column::At(i) => i.max(1),
            Column::PastEnd(len) => len,
        };
        let soft = line[..=limit.min(line.len() - 1)]
            .iter()
            .rposition(|r| *r == ' ')
            .filter(|s| *s >= width / 2 && *s > 0);
        let (left, right): (String, String) = match soft {
            Some(s) => (
                line[..s].iter().collect::<String>().trim_end().to_string(),
                line[s + 1..].iter().collect(),
            ),
            None => (line[..limit].iter().collect(), line[limit..].iter().collect()),
        };
        buf.set_line(y, &left);
        buf.insert_line_below(y)?;
        buf.set_line(y + 1, &right);
        breaks += 1;
        y += 1;
    }
    debug!(target: "model.wrap", width, breaks, "wrap_all_lines");
    Ok(breaks)
}
