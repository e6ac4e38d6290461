//! `.xmsgs` document reader.
//!
//! Walks the XML event stream with `quick-xml` and collects every `<msg>`
//! element as a [`RawMessage`], nested ones included, in document order.
//! Only the message's own text and that of its direct children (plus their
//! trailing text) make up the body. The document encoding comes from the
//! BOM or the XML declaration.

use crate::error::{Result, XmsgsError};
use crate::models::message::{Fragment, RawMessage};
use glob::glob;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::{Path, PathBuf};

const MESSAGE_TAG: &[u8] = b"msg";

/// Read and parse one log file.
pub fn read_messages(path: &Path) -> Result<Vec<RawMessage>> {
    let xml = fs::read(path).map_err(|source| XmsgsError::MissingFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_messages(&xml, path)
}

/// Parse `.xmsgs` content; `origin` is only used for error reporting.
pub fn parse_messages(xml: &[u8], origin: &Path) -> Result<Vec<RawMessage>> {
    let mut reader = Reader::from_reader(xml);
    // Whitespace is part of message bodies; trimming happens on the joined text
    reader.config_mut().trim_text(false);

    let mut messages: Vec<RawMessage> = Vec::new();
    let mut open: Vec<OpenMessage> = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            XmsgsError::malformed(
                origin,
                format!("{} (at byte {})", e, reader.buffer_position()),
            )
        })?;
        let outside_root = depth == 0;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if outside_root && saw_root {
                    return Err(junk_after_root(origin, &reader));
                }
                saw_root = true;
                let elem_depth = depth + 1;
                for m in open.iter_mut() {
                    let index = m.index;
                    m.enter(&mut messages[index], elem_depth);
                }
                let is_msg = e.local_name().as_ref() == MESSAGE_TAG;
                if is_msg {
                    messages.push(read_attributes(e, &reader, origin)?);
                }
                if matches!(event, Event::Start(_)) {
                    depth = elem_depth;
                    if is_msg {
                        open.push(OpenMessage {
                            index: messages.len() - 1,
                            depth,
                            nested: false,
                        });
                    }
                }
            }
            Event::End(_) => {
                if open.last().is_some_and(|m| m.depth == depth) {
                    open.pop();
                }
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| XmsgsError::malformed(origin, "unmatched closing tag"))?;
            }
            Event::Text(e) => {
                let text = e
                    .decode()
                    .map_err(|e| XmsgsError::malformed(origin, e.to_string()))?;
                if outside_root {
                    if !text.trim().is_empty() {
                        return Err(text_outside_root(origin, saw_root, &reader));
                    }
                    continue;
                }
                push_text(&mut open, &mut messages, depth, &text);
            }
            Event::CData(e) => {
                if outside_root {
                    return Err(text_outside_root(origin, saw_root, &reader));
                }
                let text = e
                    .decode()
                    .map_err(|e| XmsgsError::malformed(origin, e.to_string()))?;
                push_text(&mut open, &mut messages, depth, &text);
            }
            Event::GeneralRef(e) => {
                if outside_root {
                    return Err(text_outside_root(origin, saw_root, &reader));
                }
                let name = e
                    .decode()
                    .map_err(|e| XmsgsError::malformed(origin, e.to_string()))?;
                let resolved = resolve_entity(&name)
                    .ok_or_else(|| XmsgsError::malformed(origin, format!("undefined entity '&{name};'")))?;
                push_text(&mut open, &mut messages, depth, &resolved);
            }
            Event::Eof => break,
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    if depth != 0 || !open.is_empty() {
        return Err(XmsgsError::malformed(origin, "unexpected end of document"));
    }
    if !saw_root {
        return Err(XmsgsError::malformed(origin, "no element found"));
    }
    Ok(messages)
}

fn junk_after_root(origin: &Path, reader: &Reader<&[u8]>) -> XmsgsError {
    XmsgsError::malformed(
        origin,
        format!("junk after document element (at byte {})", reader.buffer_position()),
    )
}

fn text_outside_root(origin: &Path, saw_root: bool, reader: &Reader<&[u8]>) -> XmsgsError {
    if saw_root {
        junk_after_root(origin, reader)
    } else {
        XmsgsError::malformed(
            origin,
            format!("text before document element (at byte {})", reader.buffer_position()),
        )
    }
}

/// Every open `<msg>` sees the text; each keeps only what belongs to its body.
fn push_text(open: &mut [OpenMessage], messages: &mut [RawMessage], depth: usize, text: &str) {
    for m in open.iter() {
        m.push_text(&mut messages[m.index], depth, text);
    }
}

/// Expand CLI inputs: directories become their sorted `*.xmsgs` files.
pub fn expand_inputs<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let p = PathBuf::from(input.as_ref());
        if !p.is_dir() {
            files.push(p);
            continue;
        }
        let pattern = format!(
            "{}/*.xmsgs",
            glob::Pattern::escape(input.as_ref().trim_end_matches('/'))
        );
        let entries = glob(&pattern).map_err(|e| {
            XmsgsError::InvalidConfiguration(format!("bad input directory '{}': {}", p.display(), e))
        })?;
        let mut found = entries
            .collect::<std::result::Result<Vec<PathBuf>, _>>()
            .map_err(|e| XmsgsError::MissingFile {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
        found.sort();
        if found.is_empty() {
            tracing::warn!(dir = %p.display(), "no .xmsgs files in directory");
        }
        files.extend(found);
    }
    Ok(files)
}

struct OpenMessage {
    /// Position of the message in the output list.
    index: usize,
    /// Document depth of the `<msg>` element itself.
    depth: usize,
    /// The current direct child already contains an element.
    nested: bool,
}

impl OpenMessage {
    fn enter(&mut self, msg: &mut RawMessage, depth: usize) {
        match depth - self.depth {
            1 => {
                msg.children.push(Fragment::default());
                self.nested = false;
            }
            2 => self.nested = true,
            _ => {}
        }
    }

    fn push_text(&self, msg: &mut RawMessage, depth: usize, text: &str) {
        match depth - self.depth {
            0 => match msg.children.last_mut() {
                Some(child) => child.tail.push_str(text),
                None => msg.text.push_str(text),
            },
            1 if !self.nested => {
                if let Some(child) = msg.children.last_mut() {
                    child.text.push_str(text);
                }
            }
            _ => {}
        }
    }
}

fn read_attributes(e: &BytesStart<'_>, reader: &Reader<&[u8]>, origin: &Path) -> Result<RawMessage> {
    let mut msg = RawMessage::default();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| XmsgsError::malformed(origin, e.to_string()))?;
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|e| XmsgsError::malformed(origin, e.to_string()))?
            .into_owned();
        match attr.key.as_ref() {
            b"type" => msg.kind = Some(value),
            b"num" | b"code" => msg.num = Some(value),
            b"file" | b"source" => msg.source = Some(value),
            b"delta" => msg.delta = Some(value),
            _ => {}
        }
    }
    Ok(msg)
}

/// Resolve a named (`lt`) or numeric (`#10`, `#x09`) entity reference.
fn resolve_entity(raw: &str) -> Option<String> {
    if let Some(resolved) = resolve_xml_entity(raw) {
        return Some(resolved.to_string());
    }
    let rest = raw.strip_prefix('#')?;
    let code = match rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => rest.parse::<u32>().ok()?,
    };
    char::from_u32(code).map(|c| c.to_string())
}
