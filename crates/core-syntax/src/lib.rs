//! Lexical state for syntax colouring and bracket matching.
//!
//! This crate knows nothing about keywords or grammars. It tracks just enough
//! (quotes, comments, bracket nesting) to colour lines and to find matching
//! brackets, driven by a per-language `LanguageProfile`.

pub mod brackets;
pub mod cache;
pub mod classify;
pub mod lex;
pub mod profile;

pub use brackets::{BracketMatch, find_matching};
pub use cache::LexCache;
pub use classify::{LineClass, LineHighlight, RuneClass, classify_line};
pub use lex::LexState;
pub use profile::{
    CommentStyles, IndentUnit, LanguageProfile, Mode, ProfileError, ProfileOverride, ProfileTable,
};
