//! Screen width of runes under tab expansion.
//!
//! Every rune occupies one screen column except `\t`, which occupies
//! `tab_width` columns. All screen/data translation in this crate goes
//! through these helpers so the two directions cannot disagree.

/// Result of resolving a screen column to a data index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// The column falls on (or inside the expansion of) the rune at this index.
    At(usize),
    /// The column lies past the last rune; the payload is the line length.
    PastEnd(usize),
}

impl Column {
    /// Data index, using the line length for positions past the end.
    pub fn index(self) -> usize {
        match self {
            Column::At(i) | Column::PastEnd(i) => i,
        }
    }

    pub fn is_past_end(self) -> bool {
        matches!(self, Column::PastEnd(_))
    }
}

#[inline]
pub fn rune_width(r: char, tab_width: usize) -> usize {
    if r == '\t' { tab_width } else { 1 }
}

/// Total screen width of a line.
pub fn screen_width(line: &[char], tab_width: usize) -> usize {
    line.iter().map(|r| rune_width(*r, tab_width)).sum()
}

/// Screen column at which data index `x` starts. `x` may equal the line
/// length (one past the end); larger values count as plain columns.
pub fn column_of(line: &[char], x: usize, tab_width: usize) -> usize {
    let within = x.min(line.len());
    screen_width(&line[..within], tab_width) + (x - within)
}

/// Data index of the rune drawn at screen column `col`. A column inside a
/// tab's expansion resolves to the tab itself.
pub fn data_column(line: &[char], col: usize, tab_width: usize) -> Column {
    let mut start = 0;
    for (i, r) in line.iter().enumerate() {
        let end = start + rune_width(*r, tab_width);
        if col < end {
            return Column::At(i);
        }
        start = end;
    }
    Column::PastEnd(line.len())
}
