//! Unpacking the EPUB container into a scoped working directory.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Prefix of generated working directories.
pub const WORKDIR_PREFIX: &str = "__epub_to_audio_tmp";

/// A zip container opened for reading.
pub struct Archive<R> {
    zip: ZipArchive<R>,
}

impl Archive<File> {
    /// Open a zip container on disk.
    ///
    /// Fails with [`Error::Archive`] if the file cannot be opened or is not a zip.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path).map_err(zip::result::ZipError::Io)?;
        Self::from_reader(file)
    }
}

impl<R: Read + Seek> Archive<R> {
    /// Open a zip container from any [`Read`] + [`Seek`] source.
    pub fn from_reader(reader: R) -> Result<Self> {
        Ok(Self {
            zip: ZipArchive::new(reader)?,
        })
    }

    /// Entry names in archive order.
    pub fn entry_names(&self) -> Vec<String> {
        (0..self.zip.len())
            .filter_map(|index| self.zip.name_for_index(index))
            .map(str::to_string)
            .collect()
    }

    /// Extract every entry under `dest`, keeping relative paths.
    ///
    /// Entries whose names would land outside `dest` are rejected.
    pub fn extract_to(&mut self, dest: impl AsRef<Path>) -> Result<()> {
        let dest = dest.as_ref();
        tracing::debug!(entries = self.zip.len(), dest = %dest.display(), "extracting archive");
        self.zip.extract(dest)?;
        Ok(())
    }
}

/// Extract the EPUB at `path` into `dest`.
pub fn extract_epub(path: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    Archive::open(path)?.extract_to(dest)
}

/// Where the working directory for a run goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkDirLocation {
    /// A generated, uniquely named directory inside this parent.
    In(PathBuf),
    /// Exactly this path. An existing directory there is only reused if it is
    /// empty or carries the working-directory prefix.
    At(PathBuf),
}

impl Default for WorkDirLocation {
    fn default() -> Self {
        Self::In(PathBuf::from("."))
    }
}

impl WorkDirLocation {
    /// Create the working directory, refusing a fixed location that contains
    /// any of `keep` (the input book, the output file).
    pub fn create_excluding(&self, keep: &[&Path]) -> Result<WorkDir> {
        match self {
            Self::In(parent) => WorkDir::create_in(parent),
            Self::At(path) => {
                let dir = resolved(path);
                if let Some(inside) = keep.iter().find(|kept| resolved(kept).starts_with(&dir)) {
                    return Err(Error::Argument(format!(
                        "working directory {} contains {}",
                        path.display(),
                        inside.display()
                    )));
                }
                WorkDir::at(path.clone())
            }
        }
    }
}

/// Absolute form of `path` with symlinks resolved as far as the path exists.
fn resolved(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => resolved(parent).join(name),
        (Some(_), Some(name)) => resolved(Path::new(".")).join(name),
        _ => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
    }
}

/// A working directory that is removed when dropped.
///
/// Either generated with a unique name (see [`WorkDir::create_in`]) or placed
/// at a caller-chosen path (see [`WorkDir::at`]).
#[derive(Debug)]
pub struct WorkDir {
    inner: Inner,
}

#[derive(Debug)]
enum Inner {
    Generated(TempDir),
    Fixed(PathBuf),
}

impl WorkDir {
    /// Create a fresh directory named `__epub_to_audio_tmp<random>` inside `parent`.
    pub fn create_in(parent: impl AsRef<Path>) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(WORKDIR_PREFIX)
            .tempdir_in(parent)?;
        tracing::debug!(path = %dir.path().display(), "created working directory");
        Ok(Self {
            inner: Inner::Generated(dir),
        })
    }

    /// Use exactly `path`.
    ///
    /// A leftover directory whose name starts with [`WORKDIR_PREFIX`] is deleted
    /// first. Any other existing path must be an empty directory, otherwise
    /// this fails with [`Error::Argument`] and nothing is touched.
    pub fn at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.is_dir() {
            let stale = path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with(WORKDIR_PREFIX));
            if stale {
                tracing::debug!(path = %path.display(), "removing stale working directory");
                std::fs::remove_dir_all(&path)?;
            } else if std::fs::read_dir(&path)?.next().is_some() {
                return Err(Error::Argument(format!(
                    "working directory {} is not empty",
                    path.display()
                )));
            }
        } else if path.exists() {
            return Err(Error::Argument(format!(
                "working directory {} is not a directory",
                path.display()
            )));
        }
        std::fs::create_dir_all(&path)?;
        Ok(Self {
            inner: Inner::Fixed(path),
        })
    }

    pub fn path(&self) -> &Path {
        match &self.inner {
            Inner::Generated(dir) => dir.path(),
            Inner::Fixed(path) => path,
        }
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        // TempDir cleans up after itself.
        if let Inner::Fixed(path) = &self.inner
            && let Err(e) = std::fs::remove_dir_all(path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove working directory");
        }
    }
}
