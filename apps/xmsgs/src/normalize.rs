//! Message normalization: raw `<msg>` element to canonical record.
//!
//! Extracts the `"<path>" line <N>: ` prefix that ISE puts in front of
//! HDL-related messages, makes the path relative to the working directory,
//! and applies the [`FilterPolicy`]. Filtered messages come back as
//! [`Normalized::Dropped`]; only structurally broken messages are errors.

use crate::models::message::RawMessage;
use crate::models::policy::FilterPolicy;
use crate::models::DiagnosticRecord;
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

fn path_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?s)^"(\S+)" [Ll]ine (\d+): (.+)"#).expect("valid regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Why a message was filtered out.
pub enum DropReason {
    SkippedPath,
    IgnoredCode,
    UnwantedType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Kept(DiagnosticRecord),
    Dropped(DropReason),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// A `<msg>` element that cannot be turned into a record.
pub enum MessageError {
    #[error("message is missing the '{0}' attribute")]
    MissingAttribute(&'static str),
    #[error("message code '{0}' is not an integer")]
    InvalidCode(String),
}

/// Applies a fixed policy relative to a fixed base directory.
#[derive(Debug, Clone)]
pub struct Normalizer {
    policy: FilterPolicy,
    base_dir: PathBuf,
}

impl Normalizer {
    pub fn new(policy: FilterPolicy, base_dir: impl Into<PathBuf>) -> Self {
        Normalizer {
            policy,
            base_dir: base_dir.into(),
        }
    }

    pub fn normalize(&self, msg: &RawMessage) -> Result<Normalized, MessageError> {
        let raw_text = msg.raw_text();
        let mut full_path = None;
        let mut path = None;
        let mut line = None;
        let mut text = raw_text.clone();

        if let Some(caps) = path_ref_re().captures(&raw_text) {
            let rel = relative_to(Path::new(&caps[1]), &self.base_dir);
            if self.policy.skips_path(&rel) {
                return Ok(Normalized::Dropped(DropReason::SkippedPath));
            }
            full_path = Some(caps[1].to_string());
            path = Some(rel);
            // Too large for u32: the path still counts, the line is dropped
            line = caps[2].parse::<u32>().ok();
            text = caps[3].to_string();
        }

        let num = msg
            .num
            .as_deref()
            .ok_or(MessageError::MissingAttribute("num"))?;
        let code = num
            .trim()
            .parse::<i64>()
            .map_err(|_| MessageError::InvalidCode(num.to_string()))?;
        let declared = msg
            .kind
            .as_deref()
            .ok_or(MessageError::MissingAttribute("type"))?;

        if self.policy.is_ignored(code) {
            return Ok(Normalized::Dropped(DropReason::IgnoredCode));
        }
        let kind = match self.policy.effective_type(code, declared) {
            Some(k) if self.policy.allows(k) => k,
            _ => return Ok(Normalized::Dropped(DropReason::UnwantedType)),
        };

        Ok(Normalized::Kept(DiagnosticRecord {
            kind,
            code,
            source: msg.source.clone(),
            delta: msg.delta.clone(),
            raw_text,
            text,
            full_path,
            path,
            line,
            count: 1,
        }))
    }
}

/// `path` relative to `base`, resolving relative inputs against `base` first.
/// `.` and `..` segments are folded so every spelling of a file agrees.
fn relative_to(path: &Path, base: &Path) -> String {
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    let abs = fold_dots(&abs);
    pathdiff::diff_paths(&abs, fold_dots(base))
        .unwrap_or(abs)
        .to_string_lossy()
        .to_string()
}

/// Lexical normalization; symlinks are not resolved.
fn fold_dots(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Fragment;
    use crate::models::Severity;

    fn msg(kind: &str, num: &str, body: &str) -> RawMessage {
        RawMessage {
            kind: Some(kind.into()),
            num: Some(num.into()),
            source: Some("Xst".into()),
            text: body.into(),
            ..Default::default()
        }
    }

    fn default_normalizer() -> Normalizer {
        Normalizer::new(FilterPolicy::default(), "/work")
    }

    fn kept(n: Normalized) -> DiagnosticRecord {
        match n {
            Normalized::Kept(r) => r,
            Normalized::Dropped(why) => panic!("unexpected drop: {why:?}"),
        }
    }

    #[test]
    fn test_extracts_path_reference() {
        let n = default_normalizer();
        let r = kept(
            n.normalize(&msg("warning", "10", "\"src/foo.v\" Line 42: signal X is never used"))
                .unwrap(),
        );
        assert_eq!(r.path.as_deref(), Some("src/foo.v"));
        assert_eq!(r.full_path.as_deref(), Some("src/foo.v"));
        assert_eq!(r.line, Some(42));
        assert_eq!(r.text, "signal X is never used");
        assert_eq!(r.count, 1);
        assert_eq!(r.kind, Severity::Warning);
    }

    #[test]
    fn test_absolute_path_is_made_relative() {
        let n = default_normalizer();
        let r = kept(
            n.normalize(&msg("warning", "10", "\"/work/rtl/top.v\" line 7: x"))
                .unwrap(),
        );
        assert_eq!(r.path.as_deref(), Some("rtl/top.v"));
        assert_eq!(r.full_path.as_deref(), Some("/work/rtl/top.v"));
        let r = kept(
            n.normalize(&msg("warning", "10", "\"/other/top.v\" line 7: x"))
                .unwrap(),
        );
        assert_eq!(r.path.as_deref(), Some("../other/top.v"));
    }

    #[test]
    fn test_remainder_keeps_following_lines() {
        let n = default_normalizer();
        let r = kept(
            n.normalize(&msg("info", "1", "\"a.v\" line 1: first\nsecond"))
                .unwrap(),
        );
        assert_eq!(r.text, "first\nsecond");
    }

    #[test]
    fn test_partial_prefix_falls_through() {
        let n = default_normalizer();
        for body in [
            "\"src/foo.v\" line 42 signal X",
            "\"src/foo.v\" line 42:",
            "note: \"src/foo.v\" line 42: late prefix",
        ] {
            let r = kept(n.normalize(&msg("warning", "10", body)).unwrap());
            assert_eq!(r.path, None);
            assert_eq!(r.line, None);
            assert_eq!(r.text, body);
        }
    }

    #[test]
    fn test_body_from_fragments() {
        let n = default_normalizer();
        let mut m = msg("warning", "10", "  \"");
        m.children = vec![
            Fragment {
                text: "src/a.v".into(),
                tail: "\" line ".into(),
            },
            Fragment {
                text: "3".into(),
                tail: ": unused  ".into(),
            },
        ];
        let r = kept(n.normalize(&m).unwrap());
        assert_eq!(r.raw_text, "\"src/a.v\" line 3: unused");
        assert_eq!(r.text, "unused");
    }

    #[test]
    fn test_empty_body_is_legal() {
        let r = kept(default_normalizer().normalize(&msg("info", "5", "")).unwrap());
        assert_eq!(r.raw_text, "");
        assert_eq!(r.text, "");
    }

    #[test]
    fn test_severity_override() {
        let r = kept(
            default_normalizer()
                .normalize(&msg("warning", "413", "Result of 32-bit expression is truncated"))
                .unwrap(),
        );
        assert_eq!(r.kind, Severity::Severe);
    }

    #[test]
    fn test_filters_drop_messages() {
        let policy = FilterPolicy::new([413], [1499], ["error", "severe"], ["ipcore_dir/*"]).unwrap();
        let n = Normalizer::new(policy, "/work");
        assert_eq!(
            n.normalize(&msg("error", "1", "\"ipcore_dir/fifo.v\" line 2: x")).unwrap(),
            Normalized::Dropped(DropReason::SkippedPath)
        );
        assert_eq!(
            n.normalize(&msg("error", "1499", "x")).unwrap(),
            Normalized::Dropped(DropReason::IgnoredCode)
        );
        assert_eq!(
            n.normalize(&msg("warning", "10", "x")).unwrap(),
            Normalized::Dropped(DropReason::UnwantedType)
        );
        assert_eq!(
            n.normalize(&msg("note", "10", "x")).unwrap(),
            Normalized::Dropped(DropReason::UnwantedType)
        );
        // Promoted codes survive a type filter that excludes their declared type
        assert!(matches!(
            n.normalize(&msg("warning", "413", "x")).unwrap(),
            Normalized::Kept(_)
        ));
    }

    #[test]
    fn test_skipped_path_wins_over_bad_code() {
        let policy = FilterPolicy::new([], [], ["warning"], ["gen/*"]).unwrap();
        let n = Normalizer::new(policy, "/work");
        assert_eq!(
            n.normalize(&msg("warning", "abc", "\"gen/x.v\" line 1: y")).unwrap(),
            Normalized::Dropped(DropReason::SkippedPath)
        );
    }

    #[test]
    fn test_malformed_messages() {
        let n = default_normalizer();
        assert_eq!(
            n.normalize(&msg("warning", "4x", "y")).unwrap_err(),
            MessageError::InvalidCode("4x".into())
        );
        let mut m = msg("warning", "4", "y");
        m.num = None;
        assert_eq!(
            n.normalize(&m).unwrap_err(),
            MessageError::MissingAttribute("num")
        );
        let mut m = msg("warning", "4", "y");
        m.kind = None;
        assert_eq!(
            n.normalize(&m).unwrap_err(),
            MessageError::MissingAttribute("type")
        );
    }

    #[test]
    fn test_dot_segments_fold_into_one_key() {
        let n = default_normalizer();
        let a = kept(n.normalize(&msg("warning", "10", "\"src/../x.v\" line 1: same")).unwrap());
        let b = kept(n.normalize(&msg("warning", "10", "\"x.v\" line 2: same")).unwrap());
        let c = kept(n.normalize(&msg("warning", "10", "\"/work/./rtl/../x.v\" line 3: same")).unwrap());
        assert_eq!(a.path.as_deref(), Some("x.v"));
        assert_eq!(a.full_path.as_deref(), Some("src/../x.v"));
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key(), c.key());
        let up = kept(n.normalize(&msg("warning", "10", "\"../../../x.v\" line 3: y")).unwrap());
        assert_eq!(up.path.as_deref(), Some("../x.v"));
    }

    #[test]
    fn test_skip_glob_sees_folded_path() {
        let policy = FilterPolicy::new([413], [], ["warning"], ["ipcore_dir/*"]).unwrap();
        let n = Normalizer::new(policy, "/work");
        assert_eq!(
            n.normalize(&msg("warning", "10", "\"src/../ipcore_dir/fifo.v\" line 2: x")).unwrap(),
            Normalized::Dropped(DropReason::SkippedPath)
        );
    }

    #[test]
    fn test_oversized_line_keeps_path() {
        let n = default_normalizer();
        let r = kept(
            n.normalize(&msg("warning", "10", "\"src/a.v\" line 99999999999: big"))
                .unwrap(),
        );
        assert_eq!(r.path.as_deref(), Some("src/a.v"));
        assert_eq!(r.line, None);
        assert_eq!(r.text, "big");
    }

    #[test]
    fn test_key_ignores_line_and_code() {
        let n = default_normalizer();
        let a = kept(n.normalize(&msg("warning", "10", "\"a.v\" line 1: same")).unwrap());
        let b = kept(n.normalize(&msg("warning", "11", "\"a.v\" line 9: same")).unwrap());
        let c = kept(n.normalize(&msg("warning", "10", "same")).unwrap());
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
    }
}
