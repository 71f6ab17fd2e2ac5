//! Line and rune classification for colouring.

use crate::lex::LexState;
use crate::profile::LanguageProfile;

/// What a whole line is, judged from the lexer state around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Code,
    SingleLineComment,
    MultiLineComment,
    MultiLineString,
    /// Continuation of a backtick string opened on an earlier line.
    BacktickString,
}

impl LineClass {
    pub fn label(self) -> &'static str {
        match self {
            LineClass::Code => "code",
            LineClass::SingleLineComment => "comment",
            LineClass::MultiLineComment => "block-comment",
            LineClass::MultiLineString => "multi-line-string",
            LineClass::BacktickString => "backtick-string",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuneClass {
    Code,
    Str,
    Comment,
    /// A bracket in code, with its nesting depth for rainbow colouring.
    Bracket { depth: usize },
    /// A closing bracket with no opener before it.
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineHighlight {
    pub class: LineClass,
    pub runes: Vec<RuneClass>,
}

/// Classify one line given the state at its start. Returns the highlight and
/// the state at the start of the next line.
pub fn classify_line(
    before: LexState,
    profile: &LanguageProfile,
    line: &[char],
) -> (LineHighlight, LexState) {
    let mut state = before;
    state.begin_line();
    let mut runes: Vec<RuneClass> = Vec::with_capacity(line.len());
    let mut depth = [before.paren_depth, before.bracket_depth, before.brace_depth]
        .iter()
        .map(|d| (*d).max(0) as usize)
        .sum::<usize>();
    let (mut prev, mut prev_prev) = ('\n', '\n');

    for &r in line {
        let was = state;
        state.process_rune(profile, r, prev, prev_prev);

        let class = if state.in_comment() || (was.multi_line_comment && !state.multi_line_comment) {
            let opener_tail = if state.single_line_comment && !was.single_line_comment {
                profile.marker().len() - 1
            } else if state.multi_line_comment && !was.multi_line_comment {
                match (r, prev) {
                    ('-', '!') => 3,
                    ('{', _) => 0,
                    _ => 1,
                }
            } else {
                0
            };
            let start = runes.len().saturating_sub(opener_tail);
            for (i, slot) in runes.iter_mut().enumerate().skip(start) {
                if let RuneClass::Bracket { .. } = slot {
                    if matches!(line[i], '(' | '[' | '{') {
                        depth = depth.saturating_sub(1);
                    } else {
                        depth += 1;
                    }
                }
                *slot = RuneClass::Comment;
            }
            RuneClass::Comment
        } else if state.in_string() || was.in_string() {
            RuneClass::Str
        } else if was.is_neutral() {
            match r {
                '(' | '[' | '{' => {
                    depth += 1;
                    RuneClass::Bracket { depth: depth - 1 }
                }
                ')' | ']' | '}' => {
                    if depth == 0 {
                        RuneClass::Unmatched
                    } else {
                        depth -= 1;
                        RuneClass::Bracket { depth }
                    }
                }
                _ => RuneClass::Code,
            }
        } else {
            RuneClass::Code
        };
        runes.push(class);
        prev_prev = prev;
        prev = r;
    }

    let class = if profile.docstrings
        && (before.multi_line_string || state.multi_line_string || state.started_multi_line_string)
    {
        LineClass::MultiLineString
    } else if state.contains_multi_line_comments
        && !before.multi_line_comment
        && !state.multi_line_comment
    {
        LineClass::Code
    } else if before.multi_line_comment || state.multi_line_comment || state.stopped_multi_line_comment {
        LineClass::MultiLineComment
    } else if state.single_line_comment {
        LineClass::SingleLineComment
    } else if !state.started_multi_line_string && state.backtick > 0 {
        LineClass::BacktickString
    } else {
        LineClass::Code
    };

    (LineHighlight { class, runes }, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Mode, ProfileTable};
    use pretty_assertions::assert_eq;
    use RuneClass::*;

    fn classify(mode: Mode, lines: &[&str]) -> Vec<LineHighlight> {
        let table = ProfileTable::builtin();
        let mut state = LexState::new();
        lines
            .iter()
            .map(|l| {
                let runes: Vec<char> = l.chars().collect();
                let (hl, next) = classify_line(state, table.get(mode), &runes);
                state = next;
                hl
            })
            .collect()
    }

    #[test]
    fn single_line_comment_marks_marker_and_rest() {
        let hl = classify(Mode::C, &["a // b"]);
        assert_eq!(hl[0].class, LineClass::SingleLineComment);
        assert_eq!(hl[0].runes, vec![Code, Code, Comment, Comment, Comment, Comment]);
    }

    #[test]
    fn strings_include_their_quotes() {
        let hl = classify(Mode::C, &[r#"x"(""#]);
        assert_eq!(hl[0].runes, vec![Code, Str, Str, Str]);
    }

    #[test]
    fn brackets_nest_and_unmatched_closer_is_flagged() {
        let hl = classify(Mode::C, &["([x])]"]);
        assert_eq!(
            hl[0].runes,
            vec![
                Bracket { depth: 0 },
                Bracket { depth: 1 },
                Code,
                Bracket { depth: 1 },
                Bracket { depth: 0 },
                Unmatched,
            ]
        );
    }

    #[test]
    fn bracket_depth_carries_across_lines() {
        let hl = classify(Mode::C, &["f(", "  g()", ")"]);
        assert_eq!(hl[1].runes[3], Bracket { depth: 1 });
        assert_eq!(hl[2].runes[0], Bracket { depth: 0 });
    }

    #[test]
    fn closing_brace_on_its_own_line_is_matched() {
        let hl = classify(Mode::Rust, &["fn f() {", "    g(1);", "}"]);
        assert_eq!(hl[0].runes[7], Bracket { depth: 0 });
        assert_eq!(hl[1].runes[5], Bracket { depth: 1 });
        assert_eq!(hl[2].runes, vec![Bracket { depth: 0 }]);
    }

    #[test]
    fn block_comment_lines() {
        let hl = classify(Mode::C, &["x /* a", "b", "c */ y", "p /* q */ r"]);
        let classes: Vec<LineClass> = hl.iter().map(|h| h.class).collect();
        assert_eq!(
            classes,
            vec![
                LineClass::MultiLineComment,
                LineClass::MultiLineComment,
                LineClass::MultiLineComment,
                LineClass::Code,
            ]
        );
        assert_eq!(hl[0].runes, vec![Code, Code, Comment, Comment, Comment, Comment]);
        assert_eq!(hl[2].runes, vec![Comment, Comment, Comment, Comment, Code, Code]);
    }

    #[test]
    fn ml_comment_opener_paren_is_not_a_bracket() {
        let hl = classify(Mode::OCaml, &["(* c *) ("]);
        assert_eq!(hl[0].runes[0], Comment);
        assert_eq!(hl[0].runes[8], Bracket { depth: 0 });
    }

    #[test]
    fn python_docstring_lines() {
        let hl = classify(Mode::Python, &["def f():", "    \"\"\"Doc", "    text", "    \"\"\"", "x = 1"]);
        let classes: Vec<LineClass> = hl.iter().map(|h| h.class).collect();
        assert_eq!(
            classes,
            vec![
                LineClass::Code,
                LineClass::MultiLineString,
                LineClass::MultiLineString,
                LineClass::MultiLineString,
                LineClass::Code,
            ]
        );
    }

    #[test]
    fn backtick_continuation_line() {
        let hl = classify(Mode::Go, &["s := `a", "b", "c`"]);
        assert_eq!(hl[1].class, LineClass::BacktickString);
        assert_eq!(hl[1].runes, vec![Str]);
    }
}
