//! Language profiles: the comment and quote conventions the lexer needs.
//!
//! Every language quirk the lexer knows about is a field or a flag here, so
//! adding a language means adding a table row rather than another branch in
//! the state machine.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Longest single-line comment marker the lexer can recognise.
pub const MAX_MARKER_LEN: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("single line comment marker must be 1 to 3 characters, got {0:?}")]
    InvalidMarker(String),
    #[error("unknown mode: {0}")]
    UnknownMode(String),
}

/// File type as decided by the caller. Detection is not this crate's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    Plain,
    C,
    Cpp,
    Rust,
    Go,
    Java,
    JavaScript,
    Python,
    Shell,
    Make,
    Toml,
    Config,
    Html,
    Xml,
    Markdown,
    Lisp,
    Clojure,
    StandardMl,
    OCaml,
    Haskell,
    Elm,
    Pascal,
    Lua,
    Sql,
    Ada,
    Assembly,
}

impl Mode {
    pub const ALL: [Mode; 26] = [
        Mode::Plain,
        Mode::C,
        Mode::Cpp,
        Mode::Rust,
        Mode::Go,
        Mode::Java,
        Mode::JavaScript,
        Mode::Python,
        Mode::Shell,
        Mode::Make,
        Mode::Toml,
        Mode::Config,
        Mode::Html,
        Mode::Xml,
        Mode::Markdown,
        Mode::Lisp,
        Mode::Clojure,
        Mode::StandardMl,
        Mode::OCaml,
        Mode::Haskell,
        Mode::Elm,
        Mode::Pascal,
        Mode::Lua,
        Mode::Sql,
        Mode::Ada,
        Mode::Assembly,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mode::Plain => "plain",
            Mode::C => "c",
            Mode::Cpp => "cpp",
            Mode::Rust => "rust",
            Mode::Go => "go",
            Mode::Java => "java",
            Mode::JavaScript => "javascript",
            Mode::Python => "python",
            Mode::Shell => "shell",
            Mode::Make => "make",
            Mode::Toml => "toml",
            Mode::Config => "config",
            Mode::Html => "html",
            Mode::Xml => "xml",
            Mode::Markdown => "markdown",
            Mode::Lisp => "lisp",
            Mode::Clojure => "clojure",
            Mode::StandardMl => "standardml",
            Mode::OCaml => "ocaml",
            Mode::Haskell => "haskell",
            Mode::Elm => "elm",
            Mode::Pascal => "pascal",
            Mode::Lua => "lua",
            Mode::Sql => "sql",
            Mode::Ada => "ada",
            Mode::Assembly => "assembly",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if let Some(mode) = Mode::ALL.iter().find(|m| m.name() == lower) {
            return Ok(*mode);
        }
        let alias = match lower.as_str() {
            "text" | "txt" | "" => Mode::Plain,
            "c++" | "cc" | "cxx" => Mode::Cpp,
            "rs" => Mode::Rust,
            "js" | "ts" | "typescript" => Mode::JavaScript,
            "py" => Mode::Python,
            "sh" | "bash" | "zsh" => Mode::Shell,
            "makefile" => Mode::Make,
            "conf" | "ini" => Mode::Config,
            "md" => Mode::Markdown,
            "sml" => Mode::StandardMl,
            "ml" => Mode::OCaml,
            "hs" => Mode::Haskell,
            "pas" | "objectpascal" => Mode::Pascal,
            "asm" => Mode::Assembly,
            _ => return Err(ProfileError::UnknownMode(s.to_string())),
        };
        Ok(alias)
    }
}

bitflags::bitflags! {
    /// Multi-line comment syntaxes a language supports.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct CommentStyles: u8 {
        /// `/* ... */`
        const C_BLOCK      = 0b0000_0001;
        /// `<!-- ... -->`
        const HTML_BLOCK   = 0b0000_0010;
        /// `(* ... *)`
        const ML_BLOCK     = 0b0000_0100;
        /// `{- ... -}`
        const BRACE_DASH   = 0b0000_1000;
        /// `{ ... }`
        const PASCAL_BRACE = 0b0001_0000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentUnit {
    Tabs,
    Spaces(usize),
}

impl IndentUnit {
    pub fn as_string(self) -> String {
        match self {
            IndentUnit::Tabs => "\t".to_string(),
            IndentUnit::Spaces(n) => " ".repeat(n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageProfile {
    marker: Vec<char>,
    pub ignore_single_quotes: bool,
    pub tab_width: usize,
    pub indent: IndentUnit,
    pub comments: CommentStyles,
    /// Triple double quotes delimit strings spanning lines.
    pub docstrings: bool,
}

impl Default for LanguageProfile {
    fn default() -> Self {
        Self {
            marker: vec!['/', '/'],
            ignore_single_quotes: false,
            tab_width: 4,
            indent: IndentUnit::Spaces(4),
            comments: CommentStyles::empty(),
            docstrings: false,
        }
    }
}

impl LanguageProfile {
    pub fn new(single_line_comment: &str) -> Result<Self, ProfileError> {
        let mut profile = Self::default();
        profile.set_single_line_comment(single_line_comment)?;
        Ok(profile)
    }

    pub fn single_line_comment(&self) -> String {
        self.marker.iter().collect()
    }

    pub fn marker(&self) -> &[char] {
        &self.marker
    }

    pub fn set_single_line_comment(&mut self, marker: &str) -> Result<(), ProfileError> {
        let runes: Vec<char> = marker.chars().collect();
        if runes.is_empty() || runes.len() > MAX_MARKER_LEN {
            return Err(ProfileError::InvalidMarker(marker.to_string()));
        }
        self.marker = runes;
        Ok(())
    }

    pub fn with_comments(mut self, comments: CommentStyles) -> Self {
        self.comments = comments;
        self
    }

    /// Apply user overrides; a bad marker leaves the profile unchanged.
    pub fn apply(&mut self, overrides: &ProfileOverride) -> Result<(), ProfileError> {
        if let Some(marker) = overrides.single_line_comment.as_deref() {
            self.set_single_line_comment(marker)?;
        }
        if let Some(ignore) = overrides.ignore_single_quotes {
            self.ignore_single_quotes = ignore;
        }
        if let Some(width) = overrides.tab_width {
            self.tab_width = width.max(1);
        }
        match overrides.indent_spaces {
            Some(0) => self.indent = IndentUnit::Tabs,
            Some(n) => self.indent = IndentUnit::Spaces(n),
            None => {}
        }
        Ok(())
    }
}

/// Per-mode settings read from the configuration file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProfileOverride {
    pub single_line_comment: Option<String>,
    pub ignore_single_quotes: Option<bool>,
    pub tab_width: Option<usize>,
    /// `0` selects tab indentation.
    pub indent_spaces: Option<usize>,
}

struct Row {
    mode: Mode,
    marker: &'static str,
    comments: CommentStyles,
    ignore_single_quotes: bool,
    docstrings: bool,
    indent: IndentUnit,
}

const fn row(mode: Mode, marker: &'static str, comments: CommentStyles) -> Row {
    Row {
        mode,
        marker,
        comments,
        ignore_single_quotes: false,
        docstrings: false,
        indent: IndentUnit::Spaces(4),
    }
}

const NONE: CommentStyles = CommentStyles::empty();
const C: CommentStyles = CommentStyles::C_BLOCK;

const BUILTIN: &[Row] = &[
    row(Mode::Plain, "//", NONE),
    row(Mode::C, "//", C),
    row(Mode::Cpp, "//", C),
    Row {
        ignore_single_quotes: true,
        ..row(Mode::Rust, "//", C)
    },
    Row {
        indent: IndentUnit::Tabs,
        ..row(Mode::Go, "//", C)
    },
    row(Mode::Java, "//", C),
    Row {
        indent: IndentUnit::Spaces(2),
        ..row(Mode::JavaScript, "//", C)
    },
    Row {
        docstrings: true,
        ..row(Mode::Python, "#", NONE)
    },
    Row {
        indent: IndentUnit::Spaces(2),
        ..row(Mode::Shell, "#", NONE)
    },
    Row {
        indent: IndentUnit::Tabs,
        ..row(Mode::Make, "#", NONE)
    },
    row(Mode::Toml, "#", NONE),
    row(Mode::Config, "#", NONE),
    Row {
        indent: IndentUnit::Spaces(2),
        ..row(Mode::Html, "//", CommentStyles::HTML_BLOCK)
    },
    Row {
        indent: IndentUnit::Spaces(2),
        ..row(Mode::Xml, "//", CommentStyles::HTML_BLOCK)
    },
    row(Mode::Markdown, "//", CommentStyles::HTML_BLOCK),
    Row {
        ignore_single_quotes: true,
        indent: IndentUnit::Spaces(2),
        ..row(Mode::Lisp, ";;", NONE)
    },
    Row {
        ignore_single_quotes: true,
        indent: IndentUnit::Spaces(2),
        ..row(Mode::Clojure, ";;", NONE)
    },
    row(Mode::StandardMl, "--", CommentStyles::ML_BLOCK),
    Row {
        indent: IndentUnit::Spaces(2),
        ..row(Mode::OCaml, "--", CommentStyles::ML_BLOCK)
    },
    row(Mode::Haskell, "--", CommentStyles::BRACE_DASH),
    row(Mode::Elm, "--", CommentStyles::BRACE_DASH),
    row(
        Mode::Pascal,
        "//",
        CommentStyles::PASCAL_BRACE.union(CommentStyles::ML_BLOCK),
    ),
    Row {
        indent: IndentUnit::Spaces(2),
        ..row(Mode::Lua, "--", NONE)
    },
    row(Mode::Sql, "--", C),
    Row {
        indent: IndentUnit::Spaces(3),
        ..row(Mode::Ada, "--", NONE)
    },
    Row {
        indent: IndentUnit::Tabs,
        ..row(Mode::Assembly, ";", NONE)
    },
];

/// Profiles for every `Mode`, built-in defaults plus user overrides.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    profiles: HashMap<Mode, LanguageProfile>,
    fallback: LanguageProfile,
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileTable {
    pub fn builtin() -> Self {
        let profiles = BUILTIN
            .iter()
            .map(|r| {
                let profile = LanguageProfile {
                    marker: r.marker.chars().collect(),
                    ignore_single_quotes: r.ignore_single_quotes,
                    tab_width: 4,
                    indent: r.indent,
                    comments: r.comments,
                    docstrings: r.docstrings,
                };
                (r.mode, profile)
            })
            .collect();
        Self {
            profiles,
            fallback: LanguageProfile::default(),
        }
    }

    pub fn get(&self, mode: Mode) -> &LanguageProfile {
        self.profiles.get(&mode).unwrap_or(&self.fallback)
    }

    pub fn insert(&mut self, mode: Mode, profile: LanguageProfile) {
        self.profiles.insert(mode, profile);
    }

    /// Apply an override to one mode, keeping the built-in profile when the
    /// override is invalid.
    pub fn apply_override(
        &mut self,
        mode: Mode,
        overrides: &ProfileOverride,
    ) -> Result<(), ProfileError> {
        let mut profile = self.get(mode).clone();
        profile.apply(overrides)?;
        debug!(target: "syntax.profile", %mode, marker = %profile.single_line_comment(), "profile_override_applied");
        self.profiles.insert(mode, profile);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_has_a_builtin_row() {
        let table = ProfileTable::builtin();
        for mode in Mode::ALL {
            assert!(table.profiles.contains_key(&mode), "missing {mode}");
        }
    }

    #[test]
    fn mode_names_round_trip_through_from_str() {
        for mode in Mode::ALL {
            assert_eq!(mode.name().parse::<Mode>().unwrap(), mode);
        }
        assert_eq!("C++".parse::<Mode>().unwrap(), Mode::Cpp);
        assert_eq!("bash".parse::<Mode>().unwrap(), Mode::Shell);
        assert!(matches!(
            "klingon".parse::<Mode>(),
            Err(ProfileError::UnknownMode(_))
        ));
    }

    #[test]
    fn lisp_family_ignores_single_quotes() {
        let table = ProfileTable::builtin();
        assert!(table.get(Mode::Lisp).ignore_single_quotes);
        assert!(table.get(Mode::Clojure).ignore_single_quotes);
        assert_eq!(table.get(Mode::Clojure).single_line_comment(), ";;");
        assert!(!table.get(Mode::C).ignore_single_quotes);
    }

    #[test]
    fn marker_length_is_validated() {
        assert!(LanguageProfile::new("#").is_ok());
        assert!(LanguageProfile::new("--").is_ok());
        assert_eq!(
            LanguageProfile::new(""),
            Err(ProfileError::InvalidMarker(String::new()))
        );
        assert!(LanguageProfile::new("rem ").is_err());
    }

    #[test]
    fn override_keeps_profile_on_bad_marker() {
        let mut table = ProfileTable::builtin();
        let bad = ProfileOverride {
            single_line_comment: Some(String::new()),
            tab_width: Some(8),
            ..Default::default()
        };
        assert!(table.apply_override(Mode::Python, &bad).is_err());
        assert_eq!(table.get(Mode::Python).tab_width, 4);

        let good = ProfileOverride {
            single_line_comment: Some(";".into()),
            indent_spaces: Some(0),
            ..Default::default()
        };
        table.apply_override(Mode::Python, &good).unwrap();
        assert_eq!(table.get(Mode::Python).single_line_comment(), ";");
        assert_eq!(table.get(Mode::Python).indent, IndentUnit::Tabs);
    }
}
