//! Shared data models: severities, canonical records, and the count/result
//! containers handed to the printers.

pub mod message;
pub mod policy;

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Effective message severity. Declaration order is summary display order.
pub enum Severity {
    Error,
    Severe,
    Warning,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Error,
        Severity::Severe,
        Severity::Warning,
        Severity::Info,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Severe => "severe",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    /// Plural heading used by the summary printer.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "Errors",
            Severity::Severe => "Severe Warnings",
            Severity::Warning => "Warnings",
            Severity::Info => "Infos",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Severity::Error),
            "severe" => Ok(Severity::Severe),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            other => Err(format!("unknown message type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
/// Identity of a diagnostic across files and builds.
///
/// Line numbers, codes, and tool names are deliberately absent, so a
/// warning that only moved to another line still compares equal.
pub struct DedupKey {
    pub path: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One canonical diagnostic message.
pub struct DiagnosticRecord {
    #[serde(rename = "type")]
    pub kind: Severity,
    pub code: i64,
    pub source: Option<String>,
    pub delta: Option<String>,
    pub raw_text: String,
    pub text: String,
    pub full_path: Option<String>,
    pub path: Option<String>,
    pub line: Option<u32>,
    pub count: u32,
}

impl DiagnosticRecord {
    pub fn key(&self) -> DedupKey {
        DedupKey {
            path: self.path.clone(),
            text: self.text.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// Occurrence totals for a single build.
pub struct CountSummary {
    pub duplicate: usize,
    pub error: usize,
    pub warning: usize,
    pub severe: usize,
    pub info: usize,
}

impl CountSummary {
    pub fn get(&self, kind: Severity) -> usize {
        match kind {
            Severity::Error => self.error,
            Severity::Severe => self.severe,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }

    pub fn bump(&mut self, kind: Severity) {
        match kind {
            Severity::Error => self.error += 1,
            Severity::Severe => self.severe += 1,
            Severity::Warning => self.warning += 1,
            Severity::Info => self.info += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// Before/after tallies for one severity.
pub struct TypeDiff {
    pub before: usize,
    pub after: usize,
    pub add: usize,
    pub remove: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
/// Per-severity diff tallies plus duplicates seen on either side.
pub struct DiffCounts {
    pub duplicate: usize,
    pub error: TypeDiff,
    pub warning: TypeDiff,
    pub severe: TypeDiff,
    pub info: TypeDiff,
}

impl DiffCounts {
    pub fn get(&self, kind: Severity) -> &TypeDiff {
        match kind {
            Severity::Error => &self.error,
            Severity::Severe => &self.severe,
            Severity::Warning => &self.warning,
            Severity::Info => &self.info,
        }
    }

    pub fn get_mut(&mut self, kind: Severity) -> &mut TypeDiff {
        match kind {
            Severity::Error => &mut self.error,
            Severity::Severe => &mut self.severe,
            Severity::Warning => &mut self.warning,
            Severity::Info => &mut self.info,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Deduplicated messages of one build, in first-seen order.
pub struct CorpusResult {
    pub records: IndexMap<DedupKey, DiagnosticRecord>,
    pub counts: CountSummary,
}

impl CorpusResult {
    pub fn records(&self) -> impl Iterator<Item = &DiagnosticRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Outcome of comparing two builds.
pub struct DiffResult {
    /// Messages only present after, in first-encountered order.
    pub added: Vec<DiagnosticRecord>,
    /// Messages only present before.
    pub removed: BTreeMap<DedupKey, DiagnosticRecord>,
    pub counts: DiffCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse_and_display() {
        for kind in Severity::ALL {
            assert_eq!(kind.as_str().parse::<Severity>(), Ok(kind));
            assert_eq!(kind.to_string(), kind.as_str());
        }
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_dedup_key_sorts_pathless_first() {
        let a = DedupKey {
            path: None,
            text: "z".into(),
        };
        let b = DedupKey {
            path: Some("a.v".into()),
            text: "a".into(),
        };
        assert!(a < b);
    }

    #[test]
    fn test_count_summary_bump() {
        let mut c = CountSummary::default();
        c.bump(Severity::Warning);
        c.bump(Severity::Warning);
        c.bump(Severity::Severe);
        assert_eq!(c.get(Severity::Warning), 2);
        assert_eq!(c.get(Severity::Severe), 1);
        assert_eq!(c.get(Severity::Error), 0);
    }
}
