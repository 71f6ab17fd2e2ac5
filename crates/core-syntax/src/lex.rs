//! Incremental quote/comment/bracket state.
//!
//! `LexState` is fed one rune at a time together with the two runes before
//! it (`'\n'` for both at the start of a line). It is plain `Copy` data; the
//! active `LanguageProfile` is passed to every call, so a state can be cached
//! per line and replayed against the same profile with identical results.
//!
//! Transition order for one rune:
//! 1. single-line comment marker completed while neutral: the rest of the
//!    line is a comment and every open quote is dropped;
//! 2. quote runes (`` ` ``, `"`, `'`) toggle their depth;
//! 3. multi-line comment openers and closers enabled by the profile;
//! 4. `()`, `[]` and `{}` adjust the nesting depths, only while neutral.

use crate::profile::{CommentStyles, LanguageProfile};
use core_text::TextBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct LexState {
    pub single_quote: u32,
    pub double_quote: u32,
    pub backtick: u32,
    pub multi_line_comment: bool,
    /// A multi-line comment was opened on the current line.
    pub started_multi_line_comment: bool,
    /// A multi-line comment was closed on the current line.
    pub stopped_multi_line_comment: bool,
    /// A multi-line comment both opened and closed on the current line.
    pub contains_multi_line_comments: bool,
    /// A backtick or triple-quote string delimiter was seen on the current line.
    pub started_multi_line_string: bool,
    /// Inside a triple-quoted string (docstring profiles only).
    pub multi_line_string: bool,
    pub single_line_comment: bool,
    pub paren_depth: i32,
    pub bracket_depth: i32,
    pub brace_depth: i32,
}

impl LexState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State at the start of line `line`, replayed from the top of the
    /// document.
    pub fn at_line(buf: &TextBuffer, profile: &LanguageProfile, line: usize) -> Self {
        let mut state = Self::default();
        for y in 0..line.min(buf.len()) {
            state.process_line(profile, buf.line_chars(y));
        }
        state
    }

    /// Outside every quote and comment.
    pub fn is_neutral(&self) -> bool {
        self.single_quote == 0
            && self.double_quote == 0
            && self.backtick == 0
            && !self.multi_line_comment
            && !self.single_line_comment
            && !self.multi_line_string
    }

    pub fn in_comment(&self) -> bool {
        self.multi_line_comment || self.single_line_comment
    }

    pub fn in_string(&self) -> bool {
        self.single_quote > 0 || self.double_quote > 0 || self.backtick > 0 || self.multi_line_string
    }

    /// Reset the flags that describe a single line. Single-quoted spans never
    /// continue onto the next line.
    pub fn begin_line(&mut self) {
        self.single_line_comment = false;
        self.started_multi_line_string = false;
        self.started_multi_line_comment = false;
        self.stopped_multi_line_comment = false;
        self.contains_multi_line_comments = false;
        self.single_quote = 0;
    }

    pub fn process_line(&mut self, profile: &LanguageProfile, line: &[char]) {
        self.begin_line();
        let (mut prev, mut prev_prev) = ('\n', '\n');
        for &r in line {
            self.process_rune(profile, r, prev, prev_prev);
            prev_prev = prev;
            prev = r;
        }
    }

    /// Net paren and bracket depth change across one line, leaving `self`
    /// untouched.
    pub fn paren_bracket_count(&self, profile: &LanguageProfile, line: &[char]) -> (i32, i32) {
        let mut scratch = *self;
        scratch.paren_depth = 0;
        scratch.bracket_depth = 0;
        scratch.process_line(profile, line);
        (scratch.paren_depth, scratch.bracket_depth)
    }

    pub fn process_rune(&mut self, profile: &LanguageProfile, r: char, prev: char, prev_prev: char) {
        if self.completes_marker(profile, r, prev, prev_prev) {
            self.single_line_comment = true;
            self.started_multi_line_string = false;
            self.backtick = 0;
            self.double_quote = 0;
            self.single_quote = 0;
            return;
        }

        let styles = profile.comments;
        let neutral = self.is_neutral();
        match r {
            '`' => {
                if neutral {
                    self.backtick += 1;
                    self.started_multi_line_string = true;
                } else {
                    self.backtick = self.backtick.saturating_sub(1);
                }
            }
            '"' => {
                if prev == '"' && prev_prev == '"' {
                    if !self.in_comment() {
                        self.started_multi_line_string = neutral || self.multi_line_string;
                        if profile.docstrings {
                            self.multi_line_string = !self.multi_line_string;
                            self.double_quote = 0;
                        }
                    }
                } else if prev != '\\' {
                    if neutral {
                        self.double_quote += 1;
                    } else {
                        self.double_quote = self.double_quote.saturating_sub(1);
                    }
                }
            }
            '\'' => {
                if prev != '\\' && !profile.ignore_single_quotes {
                    if neutral {
                        self.single_quote += 1;
                    } else {
                        self.single_quote = self.single_quote.saturating_sub(1);
                    }
                }
            }
            '*' if neutral => {
                if styles.contains(CommentStyles::C_BLOCK)
                    && prev == '/'
                    && matches!(prev_prev, '\n' | ' ' | '\t')
                {
                    self.open_comment();
                } else if styles.contains(CommentStyles::ML_BLOCK) && prev == '(' {
                    // the `(` opened a comment, not a group
                    self.paren_depth -= 1;
                    self.open_comment();
                }
            }
            '{' if neutral && styles.contains(CommentStyles::PASCAL_BRACE) => self.open_comment(),
            '-' if neutral => {
                if styles.contains(CommentStyles::HTML_BLOCK) && prev == '!' && prev_prev == '<' {
                    self.open_comment();
                } else if styles.contains(CommentStyles::BRACE_DASH) && prev == '{' {
                    self.brace_depth -= 1;
                    self.open_comment();
                }
            }
            '/' if styles.contains(CommentStyles::C_BLOCK) && prev == '*' => self.close_comment(),
            ')' if styles.contains(CommentStyles::ML_BLOCK) && prev == '*' && self.multi_line_comment => {
                self.close_comment()
            }
            '}' if self.multi_line_comment
                && ((styles.contains(CommentStyles::BRACE_DASH) && prev == '-')
                    || styles.contains(CommentStyles::PASCAL_BRACE)) =>
            {
                self.close_comment()
            }
            '>' if styles.contains(CommentStyles::HTML_BLOCK) && prev == '-' && prev_prev == '-' => {
                self.close_comment()
            }
            '(' if neutral => self.paren_depth += 1,
            ')' if neutral => self.paren_depth -= 1,
            '[' if neutral => self.bracket_depth += 1,
            ']' if neutral => self.bracket_depth -= 1,
            '{' if neutral => self.brace_depth += 1,
            '}' if neutral => self.brace_depth -= 1,
            _ => {}
        }
    }

    fn completes_marker(&self, profile: &LanguageProfile, r: char, prev: char, prev_prev: char) -> bool {
        if !self.is_neutral() || self.started_multi_line_string {
            return false;
        }
        match *profile.marker() {
            [a] => r == a,
            // `://` in a URL is not a comment
            [a, b] => r == b && prev == a && prev_prev != ':',
            [a, b, c] => r == c && prev == b && prev_prev == a,
            _ => false,
        }
    }

    fn open_comment(&mut self) {
        self.multi_line_comment = true;
        self.started_multi_line_comment = true;
    }

    fn close_comment(&mut self) {
        if !self.multi_line_comment {
            return;
        }
        self.multi_line_comment = false;
        self.stopped_multi_line_comment = true;
        if self.started_multi_line_comment {
            self.contains_multi_line_comments = true;
        }
    }
}
