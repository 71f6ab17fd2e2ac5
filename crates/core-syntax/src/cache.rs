//! Per-line cache of lexer states.
//!
//! `starts[i]` is the state at the start of line `i`. It depends only on lines
//! `0..i`, so an edit on line `n` keeps `starts[0..=n]` valid.

use crate::lex::LexState;
use crate::profile::LanguageProfile;
use core_text::TextBuffer;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct LexCache {
    starts: Vec<LexState>,
}

impl Default for LexCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LexCache {
    pub fn new() -> Self {
        Self {
            starts: vec![LexState::default()],
        }
    }

    /// State at the start of `line`, extending the cache as needed.
    pub fn state_at(&mut self, buf: &TextBuffer, profile: &LanguageProfile, line: usize) -> LexState {
        let target = line.min(buf.len());
        if self.starts.len() <= target {
            let from = self.starts.len();
            let mut state = self.starts[from - 1];
            for y in from - 1..target {
                state.process_line(profile, buf.line_chars(y));
                self.starts.push(state);
            }
            trace!(target: "syntax.cache", from, to = target, "lex_cache_extended");
        }
        self.starts[target]
    }

    /// Forget every state that depends on line `line` or later.
    pub fn invalidate_from(&mut self, line: usize) {
        self.starts.truncate(line + 1);
    }

    pub fn clear(&mut self) {
        self.starts.truncate(1);
    }

    /// Number of line-start states held.
    pub fn cached_lines(&self) -> usize {
        self.starts.len()
    }
}
