//! Package document (OPF): manifest, spine, and chapter resolution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::xml::{self, XmlNode, tag_contains, tag_matches_word};

/// Manifest and reading order of a package document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    /// Book title from `dc:title`, if any.
    pub title: Option<String>,
    /// Maps manifest id -> href, first occurrence in document order.
    pub manifest: HashMap<String, String>,
    /// Spine idrefs in reading order. Duplicates are kept.
    pub spine: Vec<String>,
}

/// Chapters resolved from a spine, plus the idrefs that could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpineResolution {
    /// Title of the package the spine came from.
    pub title: Option<String>,
    pub chapters: Vec<PathBuf>,
    pub unresolved: Vec<String>,
}

impl Package {
    /// Extract manifest and spine from a parsed package document.
    ///
    /// Returns `None` if the document has no spine element.
    pub fn from_xml(root: &XmlNode) -> Option<Self> {
        let spine_node = root.find(|node| tag_contains(&node.tag, "spine"))?;

        let mut spine = Vec::with_capacity(spine_node.children.len());
        for item in &spine_node.children {
            match item.attribute("idref") {
                Some(idref) => spine.push(idref.to_string()),
                None => tracing::warn!(tag = %item.tag, "spine entry without idref skipped"),
            }
        }

        // Any element carrying both id and href is a manifest entry.
        let mut manifest = HashMap::new();
        for node in root.iter() {
            if let (Some(id), Some(href)) = (node.attribute("id"), node.attribute("href")) {
                manifest
                    .entry(id.to_string())
                    .or_insert_with(|| href.to_string());
            }
        }

        let title = root
            .find(|node| tag_matches_word(&node.tag, "title"))
            .map(|node| node.text_content().trim().to_string())
            .filter(|title| !title.is_empty());

        Some(Self {
            title,
            manifest,
            spine,
        })
    }

    /// Parse the package document at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let root = xml::parse_file(path)?;
        Self::from_xml(&root).ok_or_else(|| Error::MissingSpine(path.to_path_buf()))
    }

    /// Map each spine idref to its manifest href, resolved against `base_dir`.
    ///
    /// Idrefs missing from the manifest are dropped from `chapters` and listed
    /// in `unresolved`, each with a warning.
    pub fn resolve(&self, base_dir: &Path) -> SpineResolution {
        let mut resolution = SpineResolution {
            title: self.title.clone(),
            ..SpineResolution::default()
        };
        for idref in &self.spine {
            match self.manifest.get(idref) {
                Some(href) => resolution.chapters.push(resolve_href(base_dir, href)),
                None => {
                    tracing::warn!(idref = %idref, "spine item not found in manifest, skipping");
                    resolution.unresolved.push(idref.clone());
                }
            }
        }
        resolution
    }
}

/// Resolve the ordered content documents of the package document at `package_path`.
pub fn resolve_chapters(package_path: impl AsRef<Path>) -> Result<SpineResolution> {
    let package_path = package_path.as_ref();
    let package = Package::open(package_path)?;
    let base_dir = package_path.parent().unwrap_or(Path::new(""));
    Ok(package.resolve(base_dir))
}

/// Join `href` onto `base`, falling back to the percent-decoded href when
/// only that form exists on disk (handles malformed EPUBs).
fn resolve_href(base: &Path, href: &str) -> PathBuf {
    let direct = base.join(href);
    if direct.exists() {
        return direct;
    }

    match percent_encoding::percent_decode_str(href).decode_utf8() {
        Ok(decoded) if decoded != href => {
            let decoded = base.join(&*decoded);
            if decoded.exists() { decoded } else { direct }
        }
        _ => direct,
    }
}
