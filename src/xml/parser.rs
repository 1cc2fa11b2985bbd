//! Event-driven construction of [`XmlNode`] trees.

use std::path::Path;

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use thiserror::Error;

use super::XmlNode;
use crate::error::{Error, Result};

/// Reasons an XML document could not be turned into a tree.
#[derive(Error, Debug)]
pub enum XmlError {
    #[error(transparent)]
    Syntax(#[from] quick_xml::Error),

    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("invalid escape: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    #[error("undefined entity &{0};")]
    UndefinedEntity(String),

    #[error("no root element")]
    NoRoot,

    #[error("unclosed element <{0}>")]
    Unclosed(String),

    #[error("content after the document element")]
    TrailingContent,
}

/// Read `path` as UTF-8 and parse it into a tree rooted at the document element.
pub fn parse_file(path: impl AsRef<Path>) -> Result<XmlNode> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    decode(&bytes)
        .and_then(parse_str)
        .map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Parse an in-memory document into a tree rooted at the document element.
///
/// Text is kept verbatim apart from XML line-ending normalization; nothing
/// is trimmed or collapsed.
pub fn parse_str(content: &str) -> std::result::Result<XmlNode, XmlError> {
    let mut reader = NsReader::from_str(content);
    reader.config_mut().trim_text(false);

    // Open elements, innermost last.
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_resolved_event()? {
            (ns, Event::Start(e)) => {
                if root.is_some() {
                    return Err(XmlError::TrailingContent);
                }
                stack.push(open_element(&ns, &e)?);
            }
            (ns, Event::Empty(e)) => {
                if root.is_some() {
                    return Err(XmlError::TrailingContent);
                }
                let node = open_element(&ns, &e)?;
                close_element(&mut stack, &mut root, node);
            }
            (_, Event::End(_)) => {
                // quick-xml checks end names, so the innermost element is the one closing.
                if let Some(node) = stack.pop() {
                    close_element(&mut stack, &mut root, node);
                }
            }
            (_, Event::Text(e)) => {
                let raw = std::str::from_utf8(e.as_ref())?;
                append_text(&mut stack, &normalize_line_endings(raw))?;
            }
            (_, Event::CData(e)) => {
                let raw = std::str::from_utf8(e.as_ref())?;
                append_text(&mut stack, &normalize_line_endings(raw))?;
            }
            (_, Event::GeneralRef(e)) => {
                let entity = std::str::from_utf8(e.as_ref())?;
                match resolve_entity(entity) {
                    Some(resolved) => append_text(&mut stack, &resolved)?,
                    None => return Err(XmlError::UndefinedEntity(entity.to_string())),
                }
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.tag));
    }
    root.ok_or(XmlError::NoRoot)
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

/// Build a childless node from a start tag, tag in `{uri}local` form when bound.
fn open_element(ns: &ResolveResult<'_>, e: &BytesStart<'_>) -> std::result::Result<XmlNode, XmlError> {
    let tag = match ns {
        ResolveResult::Bound(namespace) => format!(
            "{{{}}}{}",
            std::str::from_utf8(namespace.as_ref())?,
            std::str::from_utf8(e.local_name().as_ref())?
        ),
        _ => std::str::from_utf8(e.name().as_ref())?.to_string(),
    };

    let mut node = XmlNode::new(tag);
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        // Namespace declarations are consumed by the resolver, not exposed.
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let raw = std::str::from_utf8(&attr.value)?;
        let value = quick_xml::escape::unescape(raw)?;
        node.attributes.push((key.to_string(), value.into_owned()));
    }
    Ok(node)
}

/// Attach a finished element to its parent, or make it the document root.
fn close_element(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => *root = Some(node),
    }
}

/// Text goes to the last child's tail if the open element has children,
/// otherwise to the open element's own text.
fn append_text(stack: &mut [XmlNode], text: &str) -> std::result::Result<(), XmlError> {
    match stack.last_mut() {
        Some(node) => match node.children.last_mut() {
            Some(child) => child.tail.push_str(text),
            None => node.text.push_str(text),
        },
        None if text.chars().all(is_xml_whitespace) => {}
        None => return Err(XmlError::TrailingContent),
    }
    Ok(())
}

fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Translate `\r\n` and lone `\r` to `\n`, as an XML processor must.
fn normalize_line_endings(text: &str) -> std::borrow::Cow<'_, str> {
    if !text.contains('\r') {
        return std::borrow::Cow::Borrowed(text);
    }
    std::borrow::Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Strip a UTF-8 BOM and require the remaining bytes to be UTF-8.
fn decode(bytes: &[u8]) -> std::result::Result<&str, XmlError> {
    Ok(std::str::from_utf8(strip_bom(bytes))?)
}

/// Strip UTF-8 BOM if present.
pub fn strip_bom(data: &[u8]) -> &[u8] {
    if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &data[3..]
    } else {
        data
    }
}

/// Resolve XML entity references.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}
