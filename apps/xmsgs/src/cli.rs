//! CLI argument parsing via `clap`.

use crate::config::Overrides;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "xmsgs",
    version,
    about = "Summarize and diff Xilinx ISE .xmsgs build logs",
    long_about = "xmsgs: list, deduplicate, and diff the messages ISE writes to _xmsgs/*.xmsgs.\n\nConfiguration precedence: CLI > xmsgs.toml > defaults.",
    after_help = "Examples:\n  xmsgs print build/_xmsgs\n  xmsgs print build/_xmsgs/xst.xmsgs --types error,severe --by-file\n  xmsgs diff --before old/_xmsgs --after build/_xmsgs --check",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current xmsgs version.")]
    Version,
    /// List the messages of one build
    #[command(
        about = "List deduplicated messages",
        long_about = "Read .xmsgs files (or directories of them), fold repeated messages, and print them with a per-type summary.",
        after_help = "Examples:\n  xmsgs print build/_xmsgs\n  xmsgs print map.xmsgs par.xmsgs --output json"
    )]
    Print {
        #[arg(required = true, help = "Log files or directories containing *.xmsgs")]
        paths: Vec<String>,
        #[command(flatten)]
        opts: CommonOpts,
    },
    /// Compare two builds
    #[command(
        about = "Diff two builds",
        long_about = "Show messages introduced (+) or resolved (-) between a before and an after build. Messages that only moved to another line are unchanged.",
        after_help = "Examples:\n  xmsgs diff --before old/_xmsgs --after build/_xmsgs\n  xmsgs diff --before a.xmsgs --after b.xmsgs --by-file --check"
    )]
    Diff {
        #[arg(long, num_args = 1.., required = true, help = "Logs of the earlier build")]
        before: Vec<String>,
        #[arg(long, num_args = 1.., required = true, help = "Logs of the later build")]
        after: Vec<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero if any message was added")]
        check: bool,
        #[command(flatten)]
        opts: CommonOpts,
    },
}

#[derive(Args, Debug, Default)]
/// Filter and display options shared by `print` and `diff`.
pub struct CommonOpts {
    #[arg(long, help = "Directory to start xmsgs.toml discovery from (default: current dir)")]
    pub root: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Disable ANSI colors")]
    pub no_color: bool,
    #[arg(long, value_delimiter = ',', help = "Message codes to ignore (extends config)")]
    pub ignore: Vec<i64>,
    #[arg(long, value_delimiter = ',', help = "Message types to keep: error,severe,warning,info")]
    pub types: Option<Vec<String>>,
    #[arg(long = "skip-path", help = "Glob of source paths to skip (repeatable)")]
    pub skip_path: Option<Vec<String>>,
    #[arg(long, value_delimiter = ',', help = "Extra message codes to treat as severe warnings")]
    pub severe: Vec<i64>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Do not truncate message text")]
    pub full: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Dump every field of each message")]
    pub everything: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Show source path and line number")]
    pub show_path: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Group messages by source file")]
    pub by_file: bool,
}

impl CommonOpts {
    /// Only flags that were actually given override the config file.
    pub fn overrides(&self) -> Overrides {
        let flag = |b: bool| if b { Some(true) } else { None };
        Overrides {
            no_color: self.no_color,
            ignore: self.ignore.clone(),
            types: self.types.clone(),
            skip_paths: self.skip_path.clone(),
            severe: self.severe.clone(),
            output: self.output.clone(),
            full: flag(self.full),
            everything: flag(self.everything),
            show_path: flag(self.show_path),
            by_file: flag(self.by_file),
        }
    }
}
