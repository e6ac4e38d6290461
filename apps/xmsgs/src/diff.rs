//! Diff engine: which diagnostics a build introduced or resolved.
//!
//! Both sides are folded into corpora first, so a message repeated in the
//! "after" build is still reported once. Before/after tallies count unique
//! records, which keeps `after = before - remove + add` per severity.

use crate::corpus::build_corpus;
use crate::error::Result;
use crate::models::{CorpusResult, DiffCounts, DiffResult};
use crate::normalize::Normalizer;
use std::collections::BTreeMap;
use std::path::Path;

/// Build both corpora and compare them. Nothing is returned unless every
/// file on both sides was read successfully.
pub fn run_diff<B, A>(before: &[B], after: &[A], normalizer: &Normalizer) -> Result<DiffResult>
where
    B: AsRef<Path>,
    A: AsRef<Path>,
{
    let before = build_corpus(before, normalizer)?;
    let after = build_corpus(after, normalizer)?;
    Ok(diff_corpora(before, after))
}

/// Compare two corpora, moving records into the added/removed sets.
pub fn diff_corpora(before: CorpusResult, after: CorpusResult) -> DiffResult {
    let mut counts = DiffCounts {
        duplicate: before.counts.duplicate + after.counts.duplicate,
        ..Default::default()
    };

    let mut remaining = before.records;
    for record in remaining.values() {
        counts.get_mut(record.kind).before += 1;
    }

    let mut added = Vec::new();
    for (key, record) in after.records {
        counts.get_mut(record.kind).after += 1;
        if remaining.swap_remove(&key).is_none() {
            counts.get_mut(record.kind).add += 1;
            added.push(record);
        }
    }

    let removed: BTreeMap<_, _> = remaining.into_iter().collect();
    for record in removed.values() {
        counts.get_mut(record.kind).remove += 1;
    }

    tracing::debug!(added = added.len(), removed = removed.len(), "diffed builds");
    DiffResult {
        added,
        removed,
        counts,
    }
}
