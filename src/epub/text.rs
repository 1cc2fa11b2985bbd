//! Plain text of content documents.

use std::path::Path;

use crate::error::{Error, Result};
use crate::xml::{self, XmlNode};

/// Text of the content document at `path`, taken from its `body`.
///
/// Every text fragment of the body subtree is concatenated in document
/// order with nothing inserted and no whitespace collapsed.
pub fn chapter_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let root = xml::parse_file(path)?;
    let text = body_text(&root).ok_or_else(|| Error::MissingBody {
        path: path.to_path_buf(),
    })?;
    tracing::debug!(chapter = %path.display(), chars = text.chars().count(), "read chapter");
    Ok(text)
}

/// Text of the first `body` element in `root`, or `None` if there is none.
pub fn body_text(root: &XmlNode) -> Option<String> {
    root.find_tag("body").map(XmlNode::text_content)
}
