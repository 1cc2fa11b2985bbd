//! # epub-narrator
//!
//! Turn an EPUB into a single spoken narration.
//!
//! The crate walks the EPUB structure the way a reading system does:
//! `META-INF/container.xml` points at the package document, the package
//! document's spine gives the reading order, and each spine entry maps
//! through the manifest to a content document whose `body` text is read
//! out. The concatenated text is then handed to a [`SpeechSynthesizer`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use epub_narrator::{EspeakSynthesizer, Narrator, NarratorConfig};
//!
//! let mut narrator = Narrator::new(NarratorConfig::default(), EspeakSynthesizer::default());
//! narrator.narrate(Path::new("book.epub"), Path::new("book.mp3"), |phase| println!("{phase}"))?;
//! # Ok::<(), epub_narrator::Error>(())
//! ```
//!
//! ## Reading text only
//!
//! ```no_run
//! use epub_narrator::{WorkDirLocation, read_book_text};
//!
//! let text = read_book_text("book.epub", &WorkDirLocation::default())?;
//! println!("{} characters", text.chars().count());
//! # Ok::<(), epub_narrator::Error>(())
//! ```

pub mod archive;
pub mod epub;
pub mod error;
pub mod narrate;
pub mod speech;
pub mod xml;

pub use archive::{Archive, WorkDir, WorkDirLocation, extract_epub};
pub use error::{Error, Result};
pub use narrate::{Narrator, NarratorConfig, Phase, book_text, default_output_path, read_book_text};
pub use speech::{EspeakSynthesizer, SpeechConfig, SpeechSynthesizer};
pub use xml::XmlNode;
