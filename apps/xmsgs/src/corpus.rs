//! Corpus builder: folds the messages of one build into unique records.
//!
//! Files are read strictly in the order given. The first occurrence of a
//! key stays canonical; later occurrences only bump its `count`.

use crate::error::{Result, XmsgsError};
use crate::models::message::RawMessage;
use crate::models::{CorpusResult, DiagnosticRecord};
use crate::normalize::{MessageError, Normalized, Normalizer};
use crate::reader;
use indexmap::map::Entry;
use std::path::Path;

/// Incrementally accumulates a [`CorpusResult`].
pub struct CorpusBuilder<'a> {
    normalizer: &'a Normalizer,
    corpus: CorpusResult,
}

impl<'a> CorpusBuilder<'a> {
    pub fn new(normalizer: &'a Normalizer) -> Self {
        CorpusBuilder {
            normalizer,
            corpus: CorpusResult::default(),
        }
    }

    /// Read one log file and fold all of its messages in.
    pub fn add_file(&mut self, path: &Path) -> Result<()> {
        let messages = reader::read_messages(path)?;
        tracing::debug!(file = %path.display(), messages = messages.len(), "read log");
        for msg in &messages {
            self.add_message(msg)
                .map_err(|e| XmsgsError::malformed(path, e.to_string()))?;
        }
        Ok(())
    }

    pub fn add_message(&mut self, msg: &RawMessage) -> std::result::Result<(), MessageError> {
        match self.normalizer.normalize(msg)? {
            Normalized::Kept(record) => self.insert(record),
            Normalized::Dropped(reason) => {
                tracing::trace!(?reason, num = ?msg.num, "dropped message");
            }
        }
        Ok(())
    }

    /// Fold an already-normalized record.
    pub fn insert(&mut self, record: DiagnosticRecord) {
        let counts = &mut self.corpus.counts;
        match self.corpus.records.entry(record.key()) {
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                existing.count += 1;
                counts.duplicate += 1;
                // Credit the canonical record so per-type sums match its count
                counts.bump(existing.kind);
            }
            Entry::Vacant(slot) => {
                counts.bump(record.kind);
                slot.insert(record);
            }
        }
    }

    pub fn finish(self) -> CorpusResult {
        self.corpus
    }
}

/// Build a corpus from `files`; any unreadable or malformed file aborts.
pub fn build_corpus<P: AsRef<Path>>(files: &[P], normalizer: &Normalizer) -> Result<CorpusResult> {
    let mut builder = CorpusBuilder::new(normalizer);
    for f in files {
        builder.add_file(f.as_ref())?;
    }
    let corpus = builder.finish();
    tracing::debug!(
        files = files.len(),
        unique = corpus.len(),
        duplicate = corpus.counts.duplicate,
        "built corpus"
    );
    Ok(corpus)
}
