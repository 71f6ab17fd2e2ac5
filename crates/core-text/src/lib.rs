//! Sparse, line-indexed text store.
//!
//! `TextBuffer` maps a line index to the runes of that line. Lines carry no
//! trailing newline; `Display` adds one per line. The store is sparse: `set`
//! may address a line far past the end, which leaves the index range with
//! gaps. `verify` reports the first gap as a typed error and
//! `make_consistent` repairs it by inserting empty lines.
//!
//! Invariants:
//! - After any successful structural edit (`delete`, `delete_line`,
//!   `insert_line_at`, `split_line`) or an `insert`, the stored indices are
//!   exactly `0..len()`.
//! - Structural edits refuse to run on a buffer with gaps and leave it
//!   untouched, so a caller can still save what is there.
//! - Lines are shared between clones (`Arc`); only the line being edited is
//!   copied. Undo snapshots rely on this to stay cheap.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

pub mod io;
pub mod motion;
pub mod position;
pub mod tabs;

pub use io::SaveOptions;
pub use motion::{Boundary, MotionOptions};
pub use position::{PositionModel, ScreenPos, Viewport};
pub use tabs::Column;

/// A logical position: rune index `x` within line `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, PartialOrd, Ord)]
pub struct DataCursor {
    pub y: usize,
    pub x: usize,
}

impl DataCursor {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("line {line} is missing (buffer spans {len} lines)")]
    IndexGap { line: usize, len: usize },
}

type Line = Arc<Vec<char>>;

#[derive(Clone, Default)]
pub struct TextBuffer {
    lines: BTreeMap<usize, Line>,
    changed: bool,
}

impl fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBuffer")
            .field("len", &self.len())
            .field("changed", &self.changed)
            .finish()
    }
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a buffer from text. A trailing `\n` does not start an extra
    /// line and `\r\n` endings are normalized.
    pub fn from_text(text: &str) -> Self {
        let mut lines = BTreeMap::new();
        if !text.is_empty() {
            let body = text.strip_suffix('\n').unwrap_or(text);
            for (y, raw) in body.split('\n').enumerate() {
                let raw = raw.strip_suffix('\r').unwrap_or(raw);
                lines.insert(y, Arc::new(raw.chars().collect::<Vec<_>>()));
            }
        }
        Self {
            lines,
            changed: false,
        }
    }

    /// Highest stored line index plus one.
    pub fn len(&self) -> usize {
        self.lines.keys().next_back().map_or(0, |k| k + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn has_line(&self, y: usize) -> bool {
        self.lines.contains_key(&y)
    }

    /// Runes of line `y`; empty for a missing line.
    pub fn line_chars(&self, y: usize) -> &[char] {
        self.lines.get(&y).map_or(&[], |l| l.as_slice())
    }

    pub fn line(&self, y: usize) -> String {
        self.line_chars(y).iter().collect()
    }

    pub fn line_len(&self, y: usize) -> usize {
        self.line_chars(y).len()
    }

    /// Stored lines in index order, gaps skipped.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[char])> {
        self.lines.iter().map(|(y, l)| (*y, l.as_slice()))
    }

    /// Rune at `(x, y)`, or a space beyond the stored content.
    pub fn get(&self, x: usize, y: usize) -> char {
        self.line_chars(y).get(x).copied().unwrap_or(' ')
    }

    /// Overwrite the rune at `(x, y)`, padding the line with spaces when it
    /// is shorter than `x`. Creates the line when missing, which may leave
    /// gaps below it.
    pub fn set(&mut self, x: usize, y: usize, r: char) {
        let line = Arc::make_mut(self.lines.entry(y).or_default());
        if line.len() <= x {
            line.resize(x + 1, ' ');
        }
        line[x] = r;
        self.changed = true;
    }

    /// Replace the content of line `y`.
    pub fn set_line(&mut self, y: usize, text: &str) {
        self.lines.insert(y, Arc::new(text.chars().collect()));
        self.changed = true;
    }

    fn set_line_chars(&mut self, y: usize, runes: Vec<char>) {
        self.lines.insert(y, Arc::new(runes));
        self.changed = true;
    }

    /// Insert `r` before the rune at `at`. A missing line is created holding
    /// just `r`. Returns `false` without changes when `at.x` lies past the end
    /// of an existing line.
    pub fn insert(&mut self, at: DataCursor, r: char) -> bool {
        match self.lines.get_mut(&at.y) {
            None => {
                self.lines.insert(at.y, Arc::new(vec![r]));
            }
            Some(line) => {
                if at.x > line.len() {
                    return false;
                }
                Arc::make_mut(line).insert(at.x, r);
            }
        }
        self.changed = true;
        self.make_consistent();
        true
    }

    /// Delete at `at`.
    ///
    /// A missing, empty or whitespace-only line is removed entirely. At or
    /// past the end of the line the following line is joined onto this one.
    /// Otherwise the rune under the cursor is removed.
    pub fn delete(&mut self, at: DataCursor) -> Result<(), BufferError> {
        self.verify()?;
        let line = self.line_chars(at.y);
        if line.iter().all(|r| r.is_whitespace()) {
            return self.delete_line(at.y);
        }
        if at.x >= line.len() {
            if at.y + 1 >= self.len() {
                return Ok(());
            }
            let next = self.line_chars(at.y + 1).to_vec();
            if let Some(current) = self.lines.get_mut(&at.y) {
                Arc::make_mut(current).extend(next);
            }
            trace!(target: "text.buffer", line = at.y, "join_next_line");
            return self.delete_line(at.y + 1);
        }
        if let Some(current) = self.lines.get_mut(&at.y) {
            Arc::make_mut(current).remove(at.x);
        }
        self.changed = true;
        Ok(())
    }

    /// Remove line `n`; later lines move up by one. No-op past the end.
    pub fn delete_line(&mut self, n: usize) -> Result<(), BufferError> {
        self.verify()?;
        if n >= self.len() {
            return Ok(());
        }
        let tail = self.lines.split_off(&(n + 1));
        self.lines.remove(&n);
        self.lines.extend(tail.into_iter().map(|(k, v)| (k - 1, v)));
        self.changed = true;
        trace!(target: "text.buffer", line = n, len = self.len(), "delete_line");
        Ok(())
    }

    /// Insert an empty line at index `n`, moving lines `n..` down by one.
    /// An `n` past the end appends.
    pub fn insert_line_at(&mut self, n: usize) -> Result<(), BufferError> {
        self.verify()?;
        let n = n.min(self.len());
        let tail = self.lines.split_off(&n);
        self.lines.insert(n, Line::default());
        self.lines.extend(tail.into_iter().map(|(k, v)| (k + 1, v)));
        self.changed = true;
        trace!(target: "text.buffer", line = n, len = self.len(), "insert_line");
        Ok(())
    }

    pub fn insert_line_below(&mut self, y: usize) -> Result<(), BufferError> {
        self.insert_line_at(y + 1)
    }

    /// Split line `at.y` at `at.x`: the right-trimmed left part stays, the
    /// right part moves to a new line below. Returns `Ok(false)` without
    /// changes when the cursor is at or past the end of the line or the line
    /// has fewer than two runes.
    pub fn split_line(&mut self, at: DataCursor) -> Result<bool, BufferError> {
        self.verify()?;
        let line = self.line_chars(at.y);
        if at.x >= line.len() || line.len() < 2 {
            return Ok(false);
        }
        let left = trim_end(&line[..at.x]).to_vec();
        let right = line[at.x..].to_vec();
        self.insert_line_at(at.y + 1)?;
        self.set_line_chars(at.y, left);
        self.set_line_chars(at.y + 1, right);
        Ok(true)
    }

    /// Drop everything from `at.x` to the end of the line.
    pub fn delete_rest_of_line(&mut self, at: DataCursor) {
        if let Some(line) = self.lines.get_mut(&at.y)
            && at.x < line.len()
        {
            Arc::make_mut(line).truncate(at.x);
            self.changed = true;
        }
    }

    /// Remove trailing whitespace from line `y`. Returns whether anything
    /// was removed.
    pub fn trim_right(&mut self, y: usize) -> bool {
        let Some(line) = self.lines.get_mut(&y) else {
            return false;
        };
        let keep = trim_end(line).len();
        if keep == line.len() {
            return false;
        }
        Arc::make_mut(line).truncate(keep);
        self.changed = true;
        true
    }

    pub fn count_rune(&self, y: usize, r: char) -> usize {
        self.line_chars(y).iter().filter(|c| **c == r).count()
    }

    pub fn word_count(&self) -> usize {
        self.lines
            .values()
            .map(|l| {
                l.split(|r| r.is_whitespace())
                    .filter(|w| !w.is_empty())
                    .count()
            })
            .sum()
    }

    /// Fill every gap in `0..len()` with an empty line. Returns the number of
    /// lines inserted.
    pub fn make_consistent(&mut self) -> usize {
        let len = self.len();
        if self.lines.len() == len {
            return 0;
        }
        let mut filled = 0;
        for y in 0..len {
            if !self.lines.contains_key(&y) {
                self.lines.insert(y, Line::default());
                filled += 1;
            }
        }
        debug!(target: "text.buffer", filled, len, "make_consistent");
        filled
    }

    /// Report the first missing line index, if any.
    pub fn verify(&self) -> Result<(), BufferError> {
        if self.lines.len() == self.len() {
            return Ok(());
        }
        let line = self
            .lines
            .keys()
            .enumerate()
            .find(|(i, k)| i != *k)
            .map_or(self.lines.len(), |(i, _)| i);
        Err(BufferError::IndexGap {
            line,
            len: self.len(),
        })
    }

    /// Whether anything was mutated since construction or the last
    /// `mark_saved`.
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn mark_saved(&mut self) {
        self.changed = false;
    }
}

impl fmt::Display for TextBuffer {
    /// Every stored line followed by `\n`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines.values() {
            for r in line.iter() {
                fmt::Write::write_char(f, *r)?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl FromStr for TextBuffer {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_text(s))
    }
}

impl PartialEq for TextBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.lines == other.lines
    }
}

impl Eq for TextBuffer {}

pub(crate) fn trim_end(runes: &[char]) -> &[char] {
    let keep = runes
        .iter()
        .rposition(|r| !r.is_whitespace())
        .map_or(0, |i| i + 1);
    &runes[..keep]
}
