//! xmsgs CLI binary entry point.
//! Resolves configuration, runs the engine, and hands results to the printers.

use clap::Parser;
use xmsgs::cli::{Cli, Commands, CommonOpts};
use xmsgs::error::{Result, XmsgsError};
use xmsgs::normalize::Normalizer;
use xmsgs::output::{self, PrintOpts};
use xmsgs::{config, corpus, diff, logging, reader, utils};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let outcome = match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Commands::Print { paths, opts } => run_print(&paths, &opts),
        Commands::Diff {
            before,
            after,
            check,
            opts,
        } => run_diff(&before, &after, check, &opts),
    };
    match outcome {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            std::process::exit(2);
        }
    }
}

/// Resolve config and build the normalizer; all of this happens before any
/// log file is opened.
fn prepare(opts: &CommonOpts) -> Result<(Normalizer, PrintOpts)> {
    let eff = config::resolve_effective(opts.root.as_deref(), &opts.overrides())?;
    if !eff.config_found {
        tracing::info!(root = %eff.root.display(), "no xmsgs.toml found; using defaults");
    }
    let cwd = std::env::current_dir().map_err(|e| {
        XmsgsError::InvalidConfiguration(format!("cannot determine working directory: {e}"))
    })?;
    let print_opts = PrintOpts::from_effective(&eff);
    Ok((Normalizer::new(eff.policy, cwd), print_opts))
}

fn run_print(paths: &[String], opts: &CommonOpts) -> Result<i32> {
    let (normalizer, print_opts) = prepare(opts)?;
    let files = reader::expand_inputs(paths)?;
    let result = corpus::build_corpus(&files, &normalizer)?;
    output::print_corpus(&result, &print_opts);
    Ok(0)
}

fn run_diff(before: &[String], after: &[String], check: bool, opts: &CommonOpts) -> Result<i32> {
    let (normalizer, print_opts) = prepare(opts)?;
    let before = reader::expand_inputs(before)?;
    let after = reader::expand_inputs(after)?;
    let result = diff::run_diff(&before, &after, &normalizer)?;
    output::print_diff(&result, &print_opts);
    // In check mode, exit non-zero when the later build introduced messages
    if check && !result.added.is_empty() {
        return Ok(1);
    }
    Ok(0)
}
