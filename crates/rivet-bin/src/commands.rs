//! Subcommand implementations. Each returns the text to print.

use crate::cli::{Command, GlobalArgs};
use anyhow::{Context, Result, bail, ensure};
use core_config::Config;
use core_events::StatusLine;
use core_model::{Direction, EditorModel, spawn_save};
use core_render::{MemoryCanvas, Renderer};
use core_state::EditorState;
use core_syntax::{BracketMatch, Mode};
use core_text::{DataCursor, SaveOptions, TextBuffer, Viewport};
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_WIDTH: usize = 80;
const DEFAULT_HEIGHT: usize = 24;

/// An opened file with configuration applied.
pub struct Session {
    pub model: EditorModel,
    pub config: Config,
}

/// Mode from the file name: `Makefile`, otherwise the extension.
pub fn detect_mode(path: &Path) -> Mode {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    if name.eq_ignore_ascii_case("makefile") || name.eq_ignore_ascii_case("gnumakefile") {
        return Mode::Make;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(|e| e.parse().ok())
        .unwrap_or(Mode::Plain)
}

pub fn open(path: &Path, global: &GlobalArgs, width: usize, height: usize) -> Result<Session> {
    let mut config = core_config::load_from(global.config.clone())?;
    config.apply_viewport_width(width);
    let mode = match &global.mode {
        Some(name) => name
            .parse::<Mode>()
            .with_context(|| format!("invalid --mode {name:?}"))?,
        None => detect_mode(path),
    };
    let profile = config.profile_table().get(mode).clone();
    let mut settings = config.edit_settings();
    if mode != Mode::Plain {
        settings.tab_width = profile.tab_width;
    }

    let mut state = EditorState::new(TextBuffer::new(), settings);
    state.set_language(mode, profile);
    let mut model = EditorModel::new(state);
    model
        .load(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    model.set_viewport(Viewport::new(width, height.saturating_sub(1).max(1)));
    debug!(target: "runtime", file = %path.display(), %mode, "session_opened");
    Ok(Session { model, config })
}

pub async fn run(command: &Command, global: &GlobalArgs) -> Result<String> {
    match command {
        Command::Reflow { file, width, write } => reflow(file, global, *width, *write),
        Command::Wrap { file, width, write } => wrap(file, global, *width, *write),
        Command::Match { file, line, col } => matching(file, global, *line, *col),
        Command::Search {
            file,
            term,
            line,
            col,
            backward,
        } => search(file, global, term, *line, *col, *backward),
        Command::Stats { file } => stats(file, global),
        Command::Classify { file } => classify(file, global),
        Command::Render {
            file,
            width,
            height,
            top,
        } => render(file, global, *width, *height, *top),
        Command::Strip { file } => strip(file, global).await,
    }
}

fn finish(mut session: Session, file: &Path, write: bool) -> Result<String> {
    if !write {
        return Ok(session.model.to_string());
    }
    let bytes = session
        .model
        .save(None)
        .with_context(|| format!("cannot write {}", file.display()))?;
    Ok(format!("wrote {} ({bytes} bytes)", file.display()))
}

pub fn reflow(file: &Path, global: &GlobalArgs, width: usize, write: bool) -> Result<String> {
    ensure!(width > 0, "--width must be at least 1");
    let mut session = open(file, global, DEFAULT_WIDTH.max(width), DEFAULT_HEIGHT)?;
    session.model.reflow(Some(width));
    info!(target: "runtime", width, lines = session.model.buffer().len(), "reflow_applied");
    finish(session, file, write)
}

pub fn wrap(file: &Path, global: &GlobalArgs, width: usize, write: bool) -> Result<String> {
    ensure!(width > 0, "--width must be at least 1");
    let mut session = open(file, global, DEFAULT_WIDTH.max(width), DEFAULT_HEIGHT)?;
    let breaks = session.model.wrap_all_lines(width)?;
    info!(target: "runtime", width, breaks, "wrap_applied");
    finish(session, file, write)
}

pub fn matching(file: &Path, global: &GlobalArgs, line: usize, col: usize) -> Result<String> {
    ensure!(line > 0 && col > 0, "--line and --col are 1-based");
    let mut session = open(file, global, DEFAULT_WIDTH, DEFAULT_HEIGHT)?;
    let model = &mut session.model;
    ensure!(
        line <= model.buffer().len(),
        "line {line} is past the end ({} lines)",
        model.buffer().len()
    );
    model.go_to(DataCursor::new(col - 1, line - 1));
    Ok(match model.jump_to_matching() {
        BracketMatch::Found(at) => format!("{}:{}", at.y + 1, at.x + 1),
        BracketMatch::NoMatch => "no matching bracket".to_string(),
        BracketMatch::NotABracket => format!("no bracket at {line}:{col}"),
    })
}

pub fn search(
    file: &Path,
    global: &GlobalArgs,
    term: &str,
    line: usize,
    col: usize,
    backward: bool,
) -> Result<String> {
    ensure!(line > 0 && col > 0, "--line and --col are 1-based");
    ensure!(!term.is_empty(), "the search term is empty");
    let mut session = open(file, global, DEFAULT_WIDTH, DEFAULT_HEIGHT)?;
    let model = &mut session.model;
    model.go_to(DataCursor::new(col - 1, line - 1));
    let dir = if backward {
        Direction::Backward
    } else {
        Direction::Forward
    };
    let status = StatusLine::new();
    Ok(match model.search(term, dir, &status) {
        Some(hit) => format!("{}:{}", hit.at.y + 1, hit.at.x + 1),
        None => status.current().unwrap_or_default(),
    })
}

pub fn stats(file: &Path, global: &GlobalArgs) -> Result<String> {
    let session = open(file, global, DEFAULT_WIDTH, DEFAULT_HEIGHT)?;
    let buf = session.model.buffer();
    let tabs: usize = (0..buf.len()).map(|y| buf.count_rune(y, '\t')).sum();
    Ok(format!("{} lines, {} words, {tabs} tabs", buf.len(), buf.word_count()))
}

pub fn classify(file: &Path, global: &GlobalArgs) -> Result<String> {
    let mut session = open(file, global, DEFAULT_WIDTH, DEFAULT_HEIGHT)?;
    let model = &mut session.model;
    let mut out = String::new();
    for y in 0..model.buffer().len() {
        let class = model.highlight(y).class;
        let line = format!("{:>4}  {:<17} {}", y + 1, class.label(), model.buffer().line(y));
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(out)
}

pub fn render(
    file: &Path,
    global: &GlobalArgs,
    width: usize,
    height: usize,
    top: usize,
) -> Result<String> {
    ensure!(width > 0 && height > 1, "the screen needs at least one column and two rows");
    let mut session = open(file, global, width, height)?;
    let last = session.model.buffer().len().saturating_sub(1);
    session.model.state_mut().position.offset_y = top.saturating_sub(1).min(last);
    let mut canvas = MemoryCanvas::new(width, height);
    Renderer::default().draw(&mut session.model, &mut canvas, None);
    Ok(canvas.to_text())
}

pub async fn strip(file: &Path, global: &GlobalArgs) -> Result<String> {
    let session = open(file, global, DEFAULT_WIDTH, DEFAULT_HEIGHT)?;
    let report = spawn_save(
        session.model.buffer().clone(),
        file.to_path_buf(),
        SaveOptions {
            strip_trailing_spaces: true,
        },
        StatusLine::new(),
        None,
        session.config.status_timeout(),
    )
    .await
    .context("save job did not finish")?;
    if !report.is_ok() {
        bail!(report.summary());
    }
    Ok(report.summary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn setup(name: &str, text: &str) -> (TempDir, PathBuf, GlobalArgs) {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(name);
        std::fs::write(&file, text).unwrap();
        let global = GlobalArgs {
            config: Some(dir.path().join("absent.toml")),
            mode: None,
        };
        (dir, file, global)
    }

    #[test]
    fn detects_modes_from_names() {
        assert_eq!(detect_mode(Path::new("src/main.rs")), Mode::Rust);
        assert_eq!(detect_mode(Path::new("Makefile")), Mode::Make);
        assert_eq!(detect_mode(Path::new("notes.py")), Mode::Python);
        assert_eq!(detect_mode(Path::new("README")), Mode::Plain);
        assert_eq!(detect_mode(Path::new("data.weird")), Mode::Plain);
    }

    #[test]
    fn reflow_prints_packed_paragraphs() {
        let (_dir, file, global) = setup("a.txt", "aaa bbb ccc\n\n\nddd\n");
        let out = reflow(&file, &global, 7, false).unwrap();
        assert_eq!(out, "aaa bbb\nccc\n\nddd\n");
    }

    #[test]
    fn reflow_write_replaces_file() {
        let (_dir, file, global) = setup("a.txt", "one two three\n");
        let msg = reflow(&file, &global, 8, true).unwrap();
        assert!(msg.starts_with("wrote "));
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "one two\nthree\n");
    }

    #[test]
    fn wrap_splits_long_lines() {
        let (_dir, file, global) = setup("a.txt", "abcdefghij\nok\n");
        let out = wrap(&file, &global, 4, false).unwrap();
        assert_eq!(out, "abcd\nefgh\nij\nok\n");
    }

    #[test]
    fn zero_width_is_rejected() {
        let (_dir, file, global) = setup("a.txt", "x\n");
        assert!(reflow(&file, &global, 0, false).is_err());
    }

    #[test]
    fn matching_reports_one_based_position() {
        let (_dir, file, global) = setup("a.rs", "fn f() {\n    g(1);\n}\n");
        assert_eq!(matching(&file, &global, 1, 8).unwrap(), "3:1");
        assert_eq!(matching(&file, &global, 3, 1).unwrap(), "1:8");
        assert_eq!(matching(&file, &global, 2, 1).unwrap(), "no bracket at 2:1");
        assert!(matching(&file, &global, 9, 1).is_err());
    }

    #[test]
    fn search_reports_hits_and_misses() {
        let (_dir, file, global) = setup("a.txt", "alpha\nbeta\nalpha beta\n");
        assert_eq!(search(&file, &global, "beta", 1, 1, false).unwrap(), "2:1");
        assert_eq!(search(&file, &global, "alpha", 3, 1, false).unwrap(), "1:1");
        assert_eq!(search(&file, &global, "beta", 2, 1, true).unwrap(), "3:7");
        assert_eq!(search(&file, &global, "gamma", 1, 1, false).unwrap(), "gamma not found");
        assert!(search(&file, &global, "", 1, 1, false).is_err());
    }

    #[test]
    fn stats_counts_words_and_tabs() {
        let (_dir, file, global) = setup("a.go", "func f() {\n\treturn\t1\n}\n");
        assert_eq!(stats(&file, &global).unwrap(), "3 lines, 6 words, 2 tabs");
    }

    #[test]
    fn classify_labels_comment_lines() {
        let (_dir, file, global) = setup("a.rs", "let x = 1;\n// note\n");
        let out = classify(&file, &global).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("code"));
        assert!(lines[1].contains("comment"));
        assert!(lines[1].ends_with("// note"));
    }

    #[test]
    fn explicit_mode_overrides_extension() {
        let (_dir, file, mut global) = setup("a.txt", "# hi\n");
        global.mode = Some("python".into());
        let out = classify(&file, &global).unwrap();
        assert!(out.contains("comment"));
        global.mode = Some("klingon".into());
        assert!(classify(&file, &global).is_err());
    }

    #[test]
    fn render_draws_from_top_line() {
        let (_dir, file, global) = setup("a.txt", "one\ntwo\nthree\n");
        let out = render(&file, &global, 20, 3, 2).unwrap();
        let rows: Vec<&str> = out.lines().collect();
        assert_eq!(rows[0], "two");
        assert_eq!(rows[1], "three");
        assert!(rows[2].starts_with("a.txt Ln"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let (dir, _file, global) = setup("a.txt", "");
        let err = classify(&dir.path().join("nope.txt"), &global).unwrap_err();
        assert!(err.to_string().contains("cannot open"));
    }

    #[tokio::test]
    async fn strip_saves_in_background() {
        let (_dir, file, global) = setup("a.txt", "keep  \n\n\n");
        let msg = strip(&file, &global).await.unwrap();
        assert!(msg.starts_with("wrote "));
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "keep\n");
    }
}
