//! Case-sensitive literal search over the buffer, wrapping at the ends.

use core_text::{DataCursor, TextBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    pub at: DataCursor,
    /// The scan passed the end (or the start) of the document.
    pub wrapped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

fn matches_at(line: &[char], term: &[char], x: usize) -> bool {
    line.get(x..x + term.len()) == Some(term)
}

/// First or last start column in `lo..hi` where `term` occurs in `line`.
fn scan(line: &[char], term: &[char], lo: usize, hi: usize, dir: Direction) -> Option<usize> {
    let last_start = (line.len() + 1).saturating_sub(term.len());
    let hi = hi.min(last_start);
    if lo >= hi {
        return None;
    }
    match dir {
        Direction::Forward => (lo..hi).find(|&x| matches_at(line, term, x)),
        Direction::Backward => (lo..hi).rev().find(|&x| matches_at(line, term, x)),
    }
}

/// Next occurrence of `term` strictly after (or before) `from`. The line
/// holding `from` is visited again at the end of the pass, so a lone match
/// under the cursor is found after a full wrap.
pub fn find(buf: &TextBuffer, term: &str, from: DataCursor, dir: Direction) -> Option<SearchHit> {
    let term: Vec<char> = term.chars().collect();
    let n = buf.len();
    if term.is_empty() || n == 0 {
        return None;
    }
    let start = from.y.min(n - 1);
    for k in 0..=n {
        let y = match dir {
            Direction::Forward => (start + k) % n,
            Direction::Backward => (start + n - k % n) % n,
        };
        let line = buf.line_chars(y);
        let (lo, hi) = match (dir, k) {
            (Direction::Forward, 0) => (from.x + 1, usize::MAX),
            (Direction::Forward, k) if k == n => (0, from.x + 1),
            (Direction::Backward, 0) => (0, from.x),
            (Direction::Backward, k) if k == n => (from.x, usize::MAX),
            _ => (0, usize::MAX),
        };
        if let Some(x) = scan(line, &term, lo, hi, dir) {
            let wrapped = match dir {
                Direction::Forward => y < start || k == n,
                Direction::Backward => y > start || k == n,
            };
            return Some(SearchHit {
                at: DataCursor::new(x, y),
                wrapped,
            });
        }
    }
    None
}
