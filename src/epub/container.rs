//! `META-INF/container.xml`: locating the package document.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::xml::{self, XmlNode};

/// Location of the container descriptor inside an unpacked EPUB.
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Read the container descriptor under `epub_dir` and return the
/// `full-path` of its rootfile, relative to `epub_dir`.
pub fn root_file_path(epub_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let container = xml::parse_file(epub_dir.as_ref().join(CONTAINER_PATH))?;
    root_file(&container)
        .map(PathBuf::from)
        .ok_or(Error::MissingRootFile)
}

/// `full-path` of the first `rootfile` element (not the `rootfiles` wrapper).
pub fn root_file(container: &XmlNode) -> Option<&str> {
    container
        .iter()
        .filter(|node| is_rootfile(node))
        .find_map(|node| node.attribute("full-path"))
}

fn is_rootfile(node: &XmlNode) -> bool {
    let local = node.local_name().to_lowercase();
    local.contains("rootfile") && !local.contains("rootfiles")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_container_xml() {
        let container = xml::parse_str(
            r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#,
        )
        .unwrap();

        assert_eq!(root_file(&container), Some("OEBPS/content.opf"));
    }

    #[test]
    fn test_first_rootfile_wins() {
        let container = xml::parse_str(
            r#"<container><rootfiles>
  <rootfile full-path="first.opf"/>
  <rootfile full-path="second.opf"/>
</rootfiles></container>"#,
        )
        .unwrap();

        assert_eq!(root_file(&container), Some("first.opf"));
    }

    #[test]
    fn test_wrapper_is_not_a_rootfile() {
        // A full-path on the plural wrapper must not be picked up.
        let container = xml::parse_str(
            r#"<container><rootfiles full-path="wrong.opf"><rootfile full-path="right.opf"/></rootfiles></container>"#,
        )
        .unwrap();

        assert_eq!(root_file(&container), Some("right.opf"));
    }

    #[test]
    fn test_missing_rootfile() {
        let container = xml::parse_str("<container><rootfiles/></container>").unwrap();
        assert_eq!(root_file(&container), None);
    }

    #[test]
    fn test_root_file_path_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("META-INF")).unwrap();
        std::fs::write(
            dir.path().join(CONTAINER_PATH),
            r#"<container xmlns="urn:oasis:names:tc:opendocument:xmlns:container"><rootfiles><rootfile full-path="content.opf"/></rootfiles></container>"#,
        )
        .unwrap();

        assert_eq!(root_file_path(dir.path()).unwrap(), PathBuf::from("content.opf"));
    }

    #[test]
    fn test_root_file_path_missing_rootfile_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("META-INF")).unwrap();
        std::fs::write(dir.path().join(CONTAINER_PATH), "<container><rootfiles/></container>").unwrap();

        assert!(matches!(root_file_path(dir.path()), Err(Error::MissingRootFile)));
    }
}
