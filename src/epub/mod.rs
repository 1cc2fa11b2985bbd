//! EPUB structure: container descriptor, package document, content text.

pub mod container;
pub mod package;
pub mod text;

pub use container::{CONTAINER_PATH, root_file_path};
pub use package::{Package, SpineResolution, resolve_chapters};
pub use text::chapter_text;
