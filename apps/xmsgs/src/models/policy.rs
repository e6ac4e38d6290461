//! Filter policy applied while normalizing messages.
//!
//! Key components:
//! - `severe`: codes promoted to `severe` regardless of declared type.
//! - `ignored`: codes dropped outright.
//! - `allowed`: severities kept; anything else is dropped.
//! - `skip_paths`: `fnmatch`-style globs matched against the relative path
//!   a message refers to.
//!
//! A policy is built once, validated, and never mutated during a run.

use crate::error::{Result, XmsgsError};
use crate::models::Severity;
use glob::Pattern;
use std::collections::{BTreeSet, HashSet};

/// "N-bit expression truncated into M-bit target"
pub const DEFAULT_SEVERE_CODES: [i64; 1] = [413];

#[derive(Debug, Clone, PartialEq)]
pub struct FilterPolicy {
    severe: HashSet<i64>,
    ignored: HashSet<i64>,
    allowed: BTreeSet<Severity>,
    skip_paths: Vec<Pattern>,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        FilterPolicy {
            severe: DEFAULT_SEVERE_CODES.into_iter().collect(),
            ignored: HashSet::new(),
            allowed: Severity::ALL.into_iter().collect(),
            skip_paths: Vec::new(),
        }
    }
}

impl FilterPolicy {
    /// Build a policy from raw configuration values.
    ///
    /// Type names must be one of `error|warning|severe|info` and every glob
    /// must compile; otherwise `InvalidConfiguration` is returned.
    pub fn new<S, G>(
        severe: impl IntoIterator<Item = i64>,
        ignored: impl IntoIterator<Item = i64>,
        allowed: impl IntoIterator<Item = S>,
        skip_paths: impl IntoIterator<Item = G>,
    ) -> Result<Self>
    where
        S: AsRef<str>,
        G: AsRef<str>,
    {
        let allowed = allowed
            .into_iter()
            .map(|t| {
                t.as_ref()
                    .trim()
                    .parse::<Severity>()
                    .map_err(XmsgsError::InvalidConfiguration)
            })
            .collect::<Result<BTreeSet<_>>>()?;
        let skip_paths = skip_paths
            .into_iter()
            .map(|g| {
                Pattern::new(g.as_ref()).map_err(|e| {
                    XmsgsError::InvalidConfiguration(format!(
                        "bad skip-path glob '{}': {}",
                        g.as_ref(),
                        e
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(FilterPolicy {
            severe: severe.into_iter().collect(),
            ignored: ignored.into_iter().collect(),
            allowed,
            skip_paths,
        })
    }

    /// True when `path` matches any skip-path glob.
    pub fn skips_path(&self, path: &str) -> bool {
        self.skip_paths.iter().any(|p| p.matches(path))
    }

    /// Effective severity for a declared type, after overrides.
    ///
    /// `None` means the declared type is not a known severity.
    pub fn effective_type(&self, code: i64, declared: &str) -> Option<Severity> {
        if self.severe.contains(&code) {
            return Some(Severity::Severe);
        }
        declared.parse().ok()
    }

    pub fn is_ignored(&self, code: i64) -> bool {
        self.ignored.contains(&code)
    }

    pub fn allows(&self, kind: Severity) -> bool {
        self.allowed.contains(&kind)
    }

    /// Allowed severities in display order.
    pub fn allowed_types(&self) -> impl Iterator<Item = Severity> + '_ {
        self.allowed.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_promotes_413() {
        let p = FilterPolicy::default();
        assert_eq!(p.effective_type(413, "warning"), Some(Severity::Severe));
        assert_eq!(p.effective_type(10, "warning"), Some(Severity::Warning));
        assert_eq!(p.effective_type(10, "note"), None);
        assert_eq!(p.allowed_types().count(), 4);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = FilterPolicy::new([], [], ["error", "fatal"], Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, XmsgsError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_bad_glob_is_rejected() {
        let err = FilterPolicy::new([], [], ["error"], ["src/[oops"]).unwrap_err();
        assert!(err.to_string().contains("src/[oops"));
    }

    #[test]
    fn test_skip_path_star_crosses_directories() {
        let p = FilterPolicy::new([], [], ["warning"], ["ipcore_dir/*"]).unwrap();
        assert!(p.skips_path("ipcore_dir/fifo/fifo.v"));
        assert!(!p.skips_path("src/top.v"));
    }

    #[test]
    fn test_allowed_types_display_order() {
        let p = FilterPolicy::new([], [], ["info", "error", "warning"], Vec::<String>::new())
            .unwrap();
        let got: Vec<_> = p.allowed_types().collect();
        assert_eq!(got, vec![Severity::Error, Severity::Warning, Severity::Info]);
    }
}
