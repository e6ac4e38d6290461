//! Output rendering for `print` and `diff`.
//!
//! Supports `human` (default) and `json` outputs. Rendering is split into
//! pure `render_*`/`compose_*` functions and thin `print_*` wrappers.

use crate::config::Effective;
use crate::models::{CorpusResult, DiagnosticRecord, DiffResult, Severity};
use crate::utils::{paint, strlim, use_colors};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::collections::BTreeMap;

const LINE_WIDTH: usize = 77;
const UNKNOWN_FILE: &str = "<unknown>";

#[derive(Debug, Clone)]
/// Display switches derived from the effective configuration.
pub struct PrintOpts {
    pub output: String,
    pub color: bool,
    pub full: bool,
    pub everything: bool,
    pub show_path: bool,
    pub by_file: bool,
    /// Severities shown in the summary, in display order.
    pub types: Vec<Severity>,
}

impl PrintOpts {
    pub fn from_effective(eff: &Effective) -> Self {
        PrintOpts {
            output: eff.output.clone(),
            color: use_colors(&eff.output, eff.color),
            full: eff.full,
            everything: eff.everything,
            show_path: eff.show_path,
            by_file: eff.by_file,
            types: eff.policy.allowed_types().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    None,
    Add,
    Remove,
}

#[derive(Debug, Default)]
/// Records referring to one source file.
pub struct FileGroup<'a> {
    pub add: Vec<&'a DiagnosticRecord>,
    pub remove: Vec<&'a DiagnosticRecord>,
}

/// Print a single build's messages followed by its summary.
pub fn print_corpus(corpus: &CorpusResult, opts: &PrintOpts) {
    match opts.output.as_str() {
        "json" => println!("{:#}", compose_corpus_json(corpus)),
        _ => print!("{}", render_corpus(corpus, opts)),
    }
}

/// Print added/removed messages followed by the diff summary.
pub fn print_diff(diff: &DiffResult, opts: &PrintOpts) {
    match opts.output.as_str() {
        "json" => println!("{:#}", compose_diff_json(diff)),
        _ => print!("{}", render_diff(diff, opts)),
    }
}

pub fn render_corpus(corpus: &CorpusResult, opts: &PrintOpts) -> String {
    let mut out = String::new();
    let records: Vec<_> = corpus.records().collect();
    if opts.by_file {
        for (file, group) in group_by_file(&records, &[]) {
            out.push_str(&file_header(&file, opts.color));
            push_lines(&mut out, &group.add, Mark::None, opts);
        }
    } else {
        push_lines(&mut out, &records, Mark::None, opts);
    }
    out.push_str(&render_summary(opts, |kind| {
        count_cell(corpus.counts.get(kind), opts.color)
    }));
    out
}

pub fn render_diff(diff: &DiffResult, opts: &PrintOpts) -> String {
    let mut out = String::new();
    let added: Vec<_> = diff.added.iter().collect();
    let removed: Vec<_> = diff.removed.values().collect();
    if opts.by_file {
        for (file, group) in group_by_file(&added, &removed) {
            out.push_str(&file_header(&file, opts.color));
            push_lines(&mut out, &group.add, Mark::Add, opts);
            push_lines(&mut out, &group.remove, Mark::Remove, opts);
        }
    } else {
        push_lines(&mut out, &added, Mark::Add, opts);
        push_lines(&mut out, &removed, Mark::Remove, opts);
    }
    out.push_str(&render_summary(opts, |kind| {
        let c = diff.counts.get(kind);
        let (add, remove) = (format!("+{}", c.add), format!("-{}", c.remove));
        if opts.color {
            format!(
                "{} ({}, {})",
                c.after.to_string().bold(),
                add.green().bold(),
                remove.red().bold()
            )
        } else {
            format!("{} ({}, {})", c.after, add, remove)
        }
    }));
    out
}

/// Group records by referenced source path; pathless ones go under
/// `<unknown>`. Keys are sorted.
pub fn group_by_file<'a>(
    add: &[&'a DiagnosticRecord],
    remove: &[&'a DiagnosticRecord],
) -> BTreeMap<String, FileGroup<'a>> {
    let mut groups: BTreeMap<String, FileGroup<'a>> = BTreeMap::new();
    let key = |r: &DiagnosticRecord| r.path.clone().unwrap_or_else(|| UNKNOWN_FILE.to_string());
    for r in add {
        groups.entry(key(r)).or_default().add.push(r);
    }
    for r in remove {
        groups.entry(key(r)).or_default().remove.push(r);
    }
    groups
}

/// One message as a (possibly multi-line) terminal line.
pub fn format_message(r: &DiagnosticRecord, mark: Mark, opts: &PrintOpts) -> String {
    let source = r.source.as_deref().unwrap_or(UNKNOWN_FILE);
    let mut prefix = format!("{}:{}: ", source, r.code);
    if opts.show_path {
        if let (Some(path), Some(line)) = (r.path.as_deref(), r.line) {
            prefix.push_str(&format!("{path}:{line}\n "));
        }
    }
    let body = if opts.everything {
        let mut body = String::from("\n");
        if let JsonVal::Object(fields) = json!(r) {
            for (k, v) in fields {
                let shown = match v {
                    JsonVal::String(s) => s,
                    other => other.to_string(),
                };
                body.push_str(&format!("\t{k}: {shown}\n"));
            }
        }
        body
    } else if opts.full {
        r.text.clone()
    } else {
        strlim(&r.text, LINE_WIDTH.saturating_sub(prefix.chars().count()))
    };
    let lead = match (mark, opts.color) {
        (Mark::None, _) => String::new(),
        (Mark::Add, true) => "+".black().on_green().bold().to_string(),
        (Mark::Remove, true) => "-".black().on_red().bold().to_string(),
        (Mark::Add, false) => "+".to_string(),
        (Mark::Remove, false) => "-".to_string(),
    };
    format!(
        "{}{}{}",
        lead,
        paint(&prefix, Some(r.kind), true, opts.color),
        paint(&body, Some(r.kind), false, opts.color)
    )
}

fn push_lines(out: &mut String, records: &[&DiagnosticRecord], mark: Mark, opts: &PrintOpts) {
    for r in records {
        out.push_str(&format_message(r, mark, opts));
        out.push('\n');
    }
}

fn file_header(file: &str, color: bool) -> String {
    let header = format!("--- {file}");
    if color {
        format!("{}\n", header.black().on_white().bold())
    } else {
        format!("{header}\n")
    }
}

fn count_cell(n: usize, color: bool) -> String {
    if color {
        n.to_string().bold().to_string()
    } else {
        n.to_string()
    }
}

/// Summary block: a 79-column rule, then one row per shown severity.
pub fn render_summary(opts: &PrintOpts, cell: impl Fn(Severity) -> String) -> String {
    let rule: String = format!("=== Summary {}", "=".repeat(79)).chars().take(79).collect();
    let mut out = format!("\n{rule}\n");
    for kind in &opts.types {
        let name = paint(&format!("{:>20}", kind.label()), Some(*kind), false, opts.color);
        out.push_str(&format!("{}: {}\n", name, cell(*kind)));
    }
    out
}

/// Compose the `print` JSON object (pure) for testing/snapshot purposes.
pub fn compose_corpus_json(corpus: &CorpusResult) -> JsonVal {
    let messages: Vec<_> = corpus.records().collect();
    json!({"messages": messages, "summary": corpus.counts})
}

/// Compose the `diff` JSON object (pure) for testing/snapshot purposes.
pub fn compose_diff_json(diff: &DiffResult) -> JsonVal {
    let removed: Vec<_> = diff.removed.values().collect();
    json!({"added": diff.added, "removed": removed, "summary": diff.counts})
}
