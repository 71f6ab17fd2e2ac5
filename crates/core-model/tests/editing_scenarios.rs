//! Typing scenarios through the editing session, plus properties over
//! random typing and undo.

use core_model::{EditError, EditorModel};
use core_state::{EditSettings, EditorState, UndoError};
use core_text::{DataCursor, TextBuffer, Viewport, tabs};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn session(settings: EditSettings) -> EditorModel {
    let mut model = EditorModel::new(EditorState::new(TextBuffer::new(), settings));
    model.set_viewport(Viewport::new(80, 24));
    model
}

fn plain() -> EditorModel {
    session(EditSettings::default())
}

fn wrapping(column: usize) -> EditorModel {
    session(EditSettings {
        wrap_column: Some(column),
        wrap_when_typing: true,
        ..EditSettings::default()
    })
}

#[test]
fn insert_into_empty_buffer() {
    let mut m = plain();
    m.insert('a');
    assert_eq!(m.to_string(), "a\n");
}

#[test]
fn type_then_prefix_from_home() {
    let mut m = plain();
    m.insert_string_and_move("llo").unwrap();
    m.home();
    m.insert_string_and_move("he").unwrap();
    assert_eq!(m.to_string(), "hello\n");
}

#[test]
fn insert_at_home_then_append_at_end() {
    let mut m = plain();
    m.insert_string_and_move("el").unwrap();
    m.home();
    m.insert('h');
    m.end();
    m.insert_string_and_move("lo").unwrap();
    assert_eq!(m.to_string(), "hello\n");
}

#[test]
fn insert_after_stepping_right() {
    let mut m = plain();
    m.insert_string_and_move("hllo").unwrap();
    m.home();
    m.next().unwrap();
    m.insert('e');
    assert_eq!(m.to_string(), "hello\n");
}

#[test]
fn wrap_while_typing() {
    for (column, expected) in [
        (7, "hello\nthere\n"),
        (5, "hello\nthere\n"),
        (11, "hello there\n"),
        (12, "hello there\n"),
    ] {
        let mut m = wrapping(column);
        m.insert_string_and_move("hello there").unwrap();
        assert_eq!(m.to_string(), expected, "column {column}");
    }
}

#[test]
fn wrap_column_without_typing_flag_does_not_wrap() {
    let mut m = session(EditSettings {
        wrap_column: Some(5),
        ..EditSettings::default()
    });
    m.insert_string_and_move("hello there").unwrap();
    assert_eq!(m.to_string(), "hello there\n");
}

#[test]
fn typing_past_viewport_scrolls_horizontally() {
    let mut m = plain();
    m.set_viewport(Viewport::new(10, 5));
    m.insert_string_and_move("abcdefghijklmno").unwrap();
    assert_eq!(m.to_string(), "abcdefghijklmno\n");
    assert_eq!(m.position().column(), 15);
    assert!(m.position().offset_x > 0);
}

#[test]
fn undo_is_bounded_by_capacity() {
    let mut m = session(EditSettings {
        undo_capacity: 3,
        ..EditSettings::default()
    });
    for word in ["a", "b", "c", "d", "e"] {
        m.snapshot();
        m.insert_string_and_move(word).unwrap();
    }
    for _ in 0..3 {
        m.undo().unwrap();
    }
    assert_eq!(m.to_string(), "ab\n");
    assert!(matches!(m.undo(), Err(EditError::Undo(UndoError::NothingToUndo))));
}

#[test]
fn tabs_advance_by_tab_width() {
    let mut m = plain();
    m.insert_string_and_move("\tx").unwrap();
    assert_eq!(m.position().column(), 5);
    assert_eq!(m.cursor(), DataCursor::new(2, 0));
}

#[derive(Debug, Clone)]
enum Edit {
    Type(String),
    NewLine,
    Backspace,
    Delete,
    Home,
    End,
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        "[a-z ]{1,6}".prop_map(Edit::Type),
        Just(Edit::NewLine),
        Just(Edit::Backspace),
        Just(Edit::Delete),
        Just(Edit::Home),
        Just(Edit::End),
    ]
}

fn apply(m: &mut EditorModel, e: &Edit) {
    let result = match e {
        Edit::Type(s) => m.insert_string_and_move(s),
        Edit::NewLine => m.new_line(),
        Edit::Backspace => m.backspace(),
        Edit::Delete => m.delete(),
        Edit::Home => {
            m.home();
            Ok(())
        }
        Edit::End => {
            m.end();
            Ok(())
        }
    };
    match result {
        Ok(()) | Err(EditError::Boundary(_)) => {}
        Err(other) => panic!("unexpected edit error: {other}"),
    }
}

proptest! {
    #[test]
    fn typed_lines_never_exceed_wrap_column(column in 2usize..20, text in "[a-z ]{0,80}") {
        let mut m = wrapping(column);
        m.insert_string_and_move(&text).unwrap();
        for (_, line) in m.buffer().iter() {
            prop_assert!(tabs::screen_width(line, 4) <= column);
        }
        let typed: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let stored: String = m.to_string().chars().filter(|c| !c.is_whitespace()).collect();
        prop_assert_eq!(stored, typed);
    }

    #[test]
    fn typing_without_wrap_keeps_text(text in "[a-z ]{1,60}") {
        let mut m = plain();
        m.insert_string_and_move(&text).unwrap();
        prop_assert_eq!(m.to_string(), format!("{text}\n"));
    }

    #[test]
    fn undo_everything_restores_original(edits in proptest::collection::vec(edit(), 0..30)) {
        let mut m = plain();
        m.insert_string_and_move("start text").unwrap();
        let original = m.to_string();
        for e in &edits {
            m.snapshot();
            apply(&mut m, e);
            prop_assert!(m.buffer().verify().is_ok());
        }
        for _ in &edits {
            m.undo().unwrap();
        }
        prop_assert_eq!(m.to_string(), original);
    }
}
