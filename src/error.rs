//! Error types for EPUB narration.

use std::path::PathBuf;

use thiserror::Error;

use crate::xml::XmlError;

/// Errors that can occur while reading an EPUB or narrating it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("XML parsing error in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: XmlError,
    },

    #[error("No rootfile found in META-INF/container.xml")]
    MissingRootFile,

    #[error("No spine found in package document {}", .0.display())]
    MissingSpine(PathBuf),

    #[error("No body found in content document {}", path.display())]
    MissingBody { path: PathBuf },

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Speech synthesis failed: {0}")]
    Speech(String),
}

pub type Result<T> = std::result::Result<T, Error>;
