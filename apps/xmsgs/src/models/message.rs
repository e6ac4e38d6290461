//! Raw `<msg>` elements as read from an `.xmsgs` file, before any policy
//! is applied.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Text of one direct child element plus the text that follows it.
pub struct Fragment {
    pub text: String,
    pub tail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// One diagnostic element with its attributes left as strings.
pub struct RawMessage {
    pub kind: Option<String>,
    pub num: Option<String>,
    pub source: Option<String>,
    pub delta: Option<String>,
    /// Text before the first child element.
    pub text: String,
    pub children: Vec<Fragment>,
}

impl RawMessage {
    /// Body text in document order, trimmed.
    pub fn raw_text(&self) -> String {
        let mut raw = self.text.clone();
        for child in &self.children {
            raw.push_str(&child.text);
            raw.push_str(&child.tail);
        }
        raw.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_text_joins_fragments_in_order() {
        let msg = RawMessage {
            text: "\n  \"".into(),
            children: vec![
                Fragment {
                    text: "/work/src/top.v".into(),
                    tail: "\" line ".into(),
                },
                Fragment {
                    text: "12".into(),
                    tail: ": Signal <x> is never used.  \n".into(),
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            msg.raw_text(),
            "\"/work/src/top.v\" line 12: Signal <x> is never used."
        );
    }

    #[test]
    fn test_raw_text_empty_body() {
        assert_eq!(RawMessage::default().raw_text(), "");
    }
}
