//! Replay determinism and bracket matching against a reference matcher.

use core_syntax::{BracketMatch, LexCache, LexState, Mode, ProfileTable, find_matching};
use core_text::{DataCursor, TextBuffer};
use proptest::prelude::*;

fn source_text() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        Just("x"),
        Just(" "),
        Just("("),
        Just(")"),
        Just("["),
        Just("]"),
        Just("\""),
        Just("'"),
        Just("`"),
        Just("/*"),
        Just("*/"),
        Just("//"),
        Just("#"),
        Just("\n"),
    ];
    proptest::collection::vec(piece, 0..80).prop_map(|p| p.concat())
}

/// Brackets and letters only, so every bracket is code.
fn plain_brackets() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        Just('a'),
        Just('('),
        Just(')'),
        Just('['),
        Just(']'),
        Just('{'),
        Just('}'),
        Just('\n'),
    ];
    proptest::collection::vec(piece, 1..60).prop_map(|p| p.into_iter().collect())
}

fn reference_match(buf: &TextBuffer, at: DataCursor) -> Option<DataCursor> {
    let positions: Vec<(DataCursor, char)> = buf
        .iter()
        .flat_map(|(y, line)| {
            line.iter()
                .enumerate()
                .map(move |(x, r)| (DataCursor::new(x, y), *r))
        })
        .collect();
    let target = positions.iter().position(|(p, _)| *p == at)?;
    let r = positions[target].1;
    let (open, close) = match r {
        '(' | ')' => ('(', ')'),
        '[' | ']' => ('[', ']'),
        _ => ('{', '}'),
    };
    let mut depth = 0i32;
    if r == open {
        for (p, c) in &positions[target..] {
            if *c == open {
                depth += 1;
            } else if *c == close {
                depth -= 1;
                if depth == 0 {
                    return Some(*p);
                }
            }
        }
    } else {
        for (p, c) in positions[..=target].iter().rev() {
            if *c == close {
                depth += 1;
            } else if *c == open {
                depth -= 1;
                if depth == 0 {
                    return Some(*p);
                }
            }
        }
    }
    None
}

proptest! {
    #[test]
    fn forward_scan_equals_replay_for_every_line(text in source_text()) {
        let table = ProfileTable::builtin();
        for mode in [Mode::C, Mode::Python, Mode::Go] {
            let profile = table.get(mode);
            let buf = TextBuffer::from_text(&text);
            let mut running = LexState::new();
            let mut cache = LexCache::new();
            for y in 0..buf.len() {
                prop_assert_eq!(running, LexState::at_line(&buf, profile, y));
                prop_assert_eq!(running, cache.state_at(&buf, profile, y));
                running.process_line(profile, buf.line_chars(y));
            }
        }
    }

    #[test]
    fn paren_bracket_count_never_mutates(text in source_text()) {
        let table = ProfileTable::builtin();
        let profile = table.get(Mode::C);
        let buf = TextBuffer::from_text(&text);
        let mut state = LexState::new();
        for y in 0..buf.len() {
            let before = state;
            let (p, b) = state.paren_bracket_count(profile, buf.line_chars(y));
            prop_assert_eq!(state, before);
            state.process_line(profile, buf.line_chars(y));
            prop_assert_eq!(state.paren_depth - before.paren_depth, p);
            prop_assert_eq!(state.bracket_depth - before.bracket_depth, b);
        }
    }

    #[test]
    fn bracket_match_agrees_with_reference(text in plain_brackets()) {
        let table = ProfileTable::builtin();
        let profile = table.get(Mode::Rust);
        let buf = TextBuffer::from_text(&text);
        let mut cache = LexCache::new();
        for (y, line) in buf.iter() {
            for (x, r) in line.iter().enumerate() {
                let at = DataCursor::new(x, y);
                let got = find_matching(&buf, profile, &mut cache, at);
                if *r == 'a' {
                    prop_assert_eq!(got, BracketMatch::NotABracket);
                    continue;
                }
                let expected = reference_match(&buf, at)
                    .map_or(BracketMatch::NoMatch, BracketMatch::Found);
                prop_assert_eq!(got, expected);
            }
        }
    }
}
