//! The narration pipeline: unpack, resolve reading order, read text, speak.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::archive::{self, WorkDirLocation};
use crate::epub;
use crate::error::Result;
use crate::speech::{SpeechConfig, SpeechSynthesizer};

/// Major pipeline steps, reported to the caller as they start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Extracting,
    Reading,
    Converting,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Extracting => "Extracting Epub...",
            Phase::Reading => "Reading text...",
            Phase::Converting => "Converting to audio, this may take several minutes.",
        })
    }
}

/// Settings for one narration run.
#[derive(Debug, Clone, Default)]
pub struct NarratorConfig {
    pub workdir: WorkDirLocation,
    pub speech: SpeechConfig,
}

/// Drives the pipeline and hands the book text to a speech engine.
pub struct Narrator<S> {
    config: NarratorConfig,
    synthesizer: S,
}

impl<S: SpeechSynthesizer> Narrator<S> {
    pub fn new(config: NarratorConfig, synthesizer: S) -> Self {
        Self {
            config,
            synthesizer,
        }
    }

    pub fn into_synthesizer(self) -> S {
        self.synthesizer
    }

    /// Unpack `input` and return its book text. The working directory is
    /// removed before returning, whether or not reading succeeded.
    pub fn read_text(&self, input: &Path, on_phase: &mut impl FnMut(Phase)) -> Result<String> {
        self.read_text_keeping(input, &[input], on_phase)
    }

    /// Like [`read_text`](Self::read_text), refusing a working directory that
    /// contains any path in `keep`.
    fn read_text_keeping(
        &self,
        input: &Path,
        keep: &[&Path],
        on_phase: &mut impl FnMut(Phase),
    ) -> Result<String> {
        on_phase(Phase::Extracting);
        let workdir = self.config.workdir.create_excluding(keep)?;
        archive::extract_epub(input, workdir.path())?;

        let package_path = workdir.path().join(epub::root_file_path(workdir.path())?);
        let resolution = epub::resolve_chapters(&package_path)?;
        tracing::info!(
            title = resolution.title.as_deref().unwrap_or("<untitled>"),
            chapters = resolution.chapters.len(),
            unresolved = resolution.unresolved.len(),
            "resolved reading order"
        );

        on_phase(Phase::Reading);
        book_text(&resolution.chapters)
    }

    /// Narrate `input` into `output`.
    ///
    /// The whole book is read before the engine is touched, so a broken
    /// chapter fails the run without producing audio.
    pub fn narrate(
        &mut self,
        input: &Path,
        output: &Path,
        mut on_phase: impl FnMut(Phase),
    ) -> Result<()> {
        let text = self.read_text_keeping(input, &[input, output], &mut on_phase)?;
        if text.trim().is_empty() {
            tracing::warn!(input = %input.display(), "book contains no text");
        }

        on_phase(Phase::Converting);
        self.synthesizer.configure(&self.config.speech)?;
        self.synthesizer.save_to_file(&text, output)?;
        self.synthesizer.run_and_wait()?;
        tracing::info!(output = %output.display(), chars = text.chars().count(), "narration finished");
        Ok(())
    }
}

/// Concatenate the text of every chapter, in order, with no separators.
pub fn book_text(chapters: &[PathBuf]) -> Result<String> {
    let mut text = String::new();
    for chapter in chapters {
        text.push_str(&epub::chapter_text(chapter)?);
    }
    Ok(text)
}

/// Unpack `input` into a working directory at `workdir` and return its book text.
pub fn read_book_text(input: impl AsRef<Path>, workdir: &WorkDirLocation) -> Result<String> {
    let config = NarratorConfig {
        workdir: workdir.clone(),
        ..NarratorConfig::default()
    };
    Narrator::new(config, NullSynthesizer).read_text(input.as_ref(), &mut |_: Phase| {})
}

/// Output path used when none is given: the input with an `.mp3` extension.
pub fn default_output_path(input: impl AsRef<Path>) -> PathBuf {
    input.as_ref().with_extension("mp3")
}

/// Stand-in engine for text-only runs.
struct NullSynthesizer;

impl SpeechSynthesizer for NullSynthesizer {
    fn set_rate(&mut self, _words_per_minute: u32) {}

    fn set_volume(&mut self, _volume: f32) -> Result<()> {
        Ok(())
    }

    fn save_to_file(&mut self, _text: &str, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn run_and_wait(&mut self) -> Result<()> {
        Ok(())
    }
}
