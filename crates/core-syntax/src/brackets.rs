//! Bracket matching that skips quotes and comments.
//!
//! Openers scan forward counting depth. Closers need the lexer state at every
//! rune before them, so they are resolved with a forward scan from the top of
//! the document that keeps a stack of openers. A bracket that itself sits in a
//! string or comment is matched by a plain depth scan that ignores lexing.

use crate::cache::LexCache;
use crate::lex::LexState;
use crate::profile::LanguageProfile;
use core_text::{DataCursor, TextBuffer};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketMatch {
    Found(DataCursor),
    /// The scan reached the document boundary without balancing.
    NoMatch,
    /// The rune at the position is not one of `()[]{}`.
    NotABracket,
}

fn pair(r: char) -> Option<(char, char, bool)> {
    match r {
        '(' => Some(('(', ')', true)),
        '[' => Some(('[', ']', true)),
        '{' => Some(('{', '}', true)),
        ')' => Some(('(', ')', false)),
        ']' => Some(('[', ']', false)),
        '}' => Some(('{', '}', false)),
        _ => None,
    }
}

/// Walks runes in document order, reporting whether each one is code.
struct Scanner<'a> {
    buf: &'a TextBuffer,
    profile: &'a LanguageProfile,
    state: LexState,
    next: DataCursor,
    prev: char,
    prev_prev: char,
}

impl<'a> Scanner<'a> {
    fn new(buf: &'a TextBuffer, profile: &'a LanguageProfile, line: usize, state: LexState) -> Self {
        Self {
            buf,
            profile,
            state,
            next: DataCursor::new(0, line),
            prev: '\n',
            prev_prev: '\n',
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = (DataCursor, char, bool);

    fn next(&mut self) -> Option<Self::Item> {
        let buf = self.buf;
        loop {
            if self.next.y >= buf.len() {
                return None;
            }
            if self.next.x == 0 {
                self.state.begin_line();
                self.prev = '\n';
                self.prev_prev = '\n';
            }
            if let Some(&r) = buf.line_chars(self.next.y).get(self.next.x) {
                let neutral = self.state.is_neutral();
                self.state
                    .process_rune(self.profile, r, self.prev, self.prev_prev);
                let code = neutral && !self.state.in_comment();
                let at = self.next;
                self.next.x += 1;
                self.prev_prev = self.prev;
                self.prev = r;
                return Some((at, r, code));
            }
            self.next = DataCursor::new(0, self.next.y + 1);
        }
    }
}

/// Find the bracket matching the one at `at`.
pub fn find_matching(
    buf: &TextBuffer,
    profile: &LanguageProfile,
    cache: &mut LexCache,
    at: DataCursor,
) -> BracketMatch {
    let Some(&r) = buf.line_chars(at.y).get(at.x) else {
        return BracketMatch::NotABracket;
    };
    let Some((open, close, forward)) = pair(r) else {
        return BracketMatch::NotABracket;
    };

    let line_start = cache.state_at(buf, profile, at.y);
    let in_code = Scanner::new(buf, profile, at.y, line_start)
        .find(|(pos, _, _)| *pos == at)
        .is_some_and(|(_, _, code)| code);

    let found = match (in_code, forward) {
        (true, true) => forward_scan(Scanner::new(buf, profile, at.y, line_start), at, open, close),
        (true, false) => backward_scan(Scanner::new(buf, profile, 0, LexState::default()), at, open, close),
        (false, true) => raw_forward(buf, at, open, close),
        (false, false) => raw_backward(buf, at, open, close),
    };
    debug!(target: "syntax.brackets", line = at.y, col = at.x, %r, in_code, found = ?found, "bracket_match");
    found.map_or(BracketMatch::NoMatch, BracketMatch::Found)
}

fn forward_scan(scanner: Scanner<'_>, at: DataCursor, open: char, close: char) -> Option<DataCursor> {
    let mut depth = 0usize;
    for (pos, r, code) in scanner.skip_while(|(pos, _, _)| *pos < at) {
        if !code {
            continue;
        }
        if r == open {
            depth += 1;
        } else if r == close {
            depth -= 1;
            if depth == 0 {
                return Some(pos);
            }
        }
    }
    None
}

fn backward_scan(scanner: Scanner<'_>, at: DataCursor, open: char, close: char) -> Option<DataCursor> {
    let mut stack = Vec::new();
    for (pos, r, code) in scanner {
        if pos > at {
            break;
        }
        if !code {
            continue;
        }
        if r == open {
            stack.push(pos);
        } else if r == close {
            let opener = stack.pop();
            if pos == at {
                return opener;
            }
        }
    }
    None
}

fn raw_forward(buf: &TextBuffer, at: DataCursor, open: char, close: char) -> Option<DataCursor> {
    let mut depth = 0usize;
    for y in at.y..buf.len() {
        let line = buf.line_chars(y);
        let start = if y == at.y { at.x } else { 0 };
        for (x, &r) in line.iter().enumerate().skip(start) {
            if r == open {
                depth += 1;
            } else if r == close {
                depth -= 1;
                if depth == 0 {
                    return Some(DataCursor::new(x, y));
                }
            }
        }
    }
    None
}

fn raw_backward(buf: &TextBuffer, at: DataCursor, open: char, close: char) -> Option<DataCursor> {
    let mut depth = 0usize;
    for y in (0..=at.y).rev() {
        let line = buf.line_chars(y);
        let end = if y == at.y { at.x + 1 } else { line.len() };
        for x in (0..end.min(line.len())).rev() {
            let r = line[x];
            if r == close {
                depth += 1;
            } else if r == open {
                depth -= 1;
                if depth == 0 {
                    return Some(DataCursor::new(x, y));
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Mode, ProfileTable};

    fn matching(mode: Mode, text: &str, x: usize, y: usize) -> BracketMatch {
        let table = ProfileTable::builtin();
        let buf = TextBuffer::from_text(text);
        let mut cache = LexCache::new();
        find_matching(&buf, table.get(mode), &mut cache, DataCursor::new(x, y))
    }

    #[test]
    fn forward_match_across_lines() {
        assert_eq!(
            matching(Mode::C, "f(a,\n  g(b))", 1, 0),
            BracketMatch::Found(DataCursor::new(6, 1))
        );
    }

    #[test]
    fn backward_match_across_lines() {
        assert_eq!(
            matching(Mode::C, "f(a,\n  g(b))", 6, 1),
            BracketMatch::Found(DataCursor::new(1, 0))
        );
        assert_eq!(
            matching(Mode::C, "f(a,\n  g(b))", 5, 1),
            BracketMatch::Found(DataCursor::new(3, 1))
        );
    }

    #[test]
    fn brackets_in_strings_and_comments_are_skipped() {
        let text = "call(\")\", /* ) */ x)";
        assert_eq!(
            matching(Mode::C, text, 4, 0),
            BracketMatch::Found(DataCursor::new(19, 0))
        );
        assert_eq!(
            matching(Mode::C, text, 19, 0),
            BracketMatch::Found(DataCursor::new(4, 0))
        );
    }

    #[test]
    fn bracket_inside_string_matches_raw() {
        assert_eq!(
            matching(Mode::C, "s = \"(a)\";", 5, 0),
            BracketMatch::Found(DataCursor::new(7, 0))
        );
        assert_eq!(
            matching(Mode::C, "s = \"(a)\";", 7, 0),
            BracketMatch::Found(DataCursor::new(5, 0))
        );
    }

    #[test]
    fn unbalanced_reports_no_match() {
        assert_eq!(matching(Mode::C, "((x)", 0, 0), BracketMatch::NoMatch);
        assert_eq!(matching(Mode::C, "x)", 1, 0), BracketMatch::NoMatch);
    }

    #[test]
    fn braces_match() {
        assert_eq!(
            matching(Mode::Rust, "fn f() {\n    {}\n}", 7, 0),
            BracketMatch::Found(DataCursor::new(0, 2))
        );
    }

    #[test]
    fn non_bracket_rune() {
        assert_eq!(matching(Mode::C, "abc", 1, 0), BracketMatch::NotABracket);
        assert_eq!(matching(Mode::C, "abc", 9, 0), BracketMatch::NotABracket);
    }
}
