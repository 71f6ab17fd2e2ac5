//! Command line surface.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rivet", version, about = "Rivet text editing core")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Configuration file (overrides discovery of `rivet.toml`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Language mode; detected from the file name when omitted.
    #[arg(long, global = true)]
    pub mode: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Re-pack paragraphs to a width.
    Reflow {
        file: PathBuf,
        #[arg(long)]
        width: usize,
        /// Write the result back instead of printing it.
        #[arg(long)]
        write: bool,
    },
    /// Break over-long lines at a width.
    Wrap {
        file: PathBuf,
        #[arg(long)]
        width: usize,
        #[arg(long)]
        write: bool,
    },
    /// Find the bracket matching the one at a position.
    Match {
        file: PathBuf,
        /// 1-based line.
        #[arg(long)]
        line: usize,
        /// 1-based rune column.
        #[arg(long)]
        col: usize,
    },
    /// Find the next occurrence of a term, wrapping at the ends.
    Search {
        file: PathBuf,
        term: String,
        /// 1-based line to search from.
        #[arg(long, default_value_t = 1)]
        line: usize,
        /// 1-based rune column to search from.
        #[arg(long, default_value_t = 1)]
        col: usize,
        #[arg(long)]
        backward: bool,
    },
    /// Count lines, words and tab characters.
    Stats { file: PathBuf },
    /// Print the lexical class of every line.
    Classify { file: PathBuf },
    /// Draw a screen of the file as plain text.
    Render {
        file: PathBuf,
        #[arg(long, default_value_t = 80)]
        width: usize,
        #[arg(long, default_value_t = 24)]
        height: usize,
        /// 1-based first line shown.
        #[arg(long, default_value_t = 1)]
        top: usize,
    },
    /// Strip trailing whitespace and blank lines, saving in the background.
    Strip { file: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "rivet", "match", "a.rs", "--line", "2", "--col", "5", "--mode", "rust",
        ])
        .unwrap();
        assert_eq!(cli.global.mode.as_deref(), Some("rust"));
        assert!(matches!(cli.command, Command::Match { line: 2, col: 5, .. }));
    }

    #[test]
    fn search_defaults_to_forward_from_top() {
        let cli = Cli::try_parse_from(["rivet", "search", "a.txt", "needle"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Search { line: 1, col: 1, backward: false, ref term, .. } if term == "needle"
        ));
    }

    #[test]
    fn render_defaults() {
        let cli = Cli::try_parse_from(["rivet", "render", "a.txt"]).unwrap();
        match cli.command {
            Command::Render { width, height, top, .. } => assert_eq!((width, height, top), (80, 24, 1)),
            other => panic!("unexpected {other:?}"),
        }
    }
}
