//! Speech synthesis collaborator.
//!
//! The narrator only needs four operations from an engine: set the rate,
//! set the volume, queue text for rendering to a file, and block until the
//! queue is drained. [`EspeakSynthesizer`] provides them by running an
//! `espeak-ng` compatible command.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Default speaking rate in words per minute.
pub const DEFAULT_RATE: u32 = 120;

/// Default playback volume.
pub const DEFAULT_VOLUME: f32 = 0.9;

/// Default synthesis command.
pub const DEFAULT_ENGINE: &str = "espeak-ng";

/// Rate and volume handed to the engine before rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechConfig {
    /// Words per minute.
    pub rate: u32,
    /// 0.0 (silent) to 1.0 (full).
    pub volume: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl SpeechConfig {
    pub fn new(rate: u32, volume: f32) -> Result<Self> {
        if rate == 0 {
            return Err(Error::Argument("speech rate must be positive".into()));
        }
        check_volume(volume)?;
        Ok(Self { rate, volume })
    }
}

fn check_volume(volume: f32) -> Result<()> {
    if (0.0..=1.0).contains(&volume) {
        Ok(())
    } else {
        Err(Error::Argument(format!(
            "volume must be between 0.0 and 1.0, got {volume}"
        )))
    }
}

/// A text-to-speech engine that renders text to audio files.
pub trait SpeechSynthesizer {
    fn set_rate(&mut self, words_per_minute: u32);

    /// Fails with [`Error::Argument`] outside 0.0–1.0.
    fn set_volume(&mut self, volume: f32) -> Result<()>;

    /// Queue `text` to be rendered into `path`. Nothing is written until
    /// [`run_and_wait`](Self::run_and_wait).
    fn save_to_file(&mut self, text: &str, path: &Path) -> Result<()>;

    /// Render every queued request, blocking until all are done.
    fn run_and_wait(&mut self) -> Result<()>;

    fn configure(&mut self, config: &SpeechConfig) -> Result<()> {
        self.set_rate(config.rate);
        self.set_volume(config.volume)
    }
}

/// Runs `espeak-ng` (or a command with the same flags) once per queued file.
#[derive(Debug, Clone)]
pub struct EspeakSynthesizer {
    command: String,
    rate: u32,
    volume: f32,
    pending: Vec<(String, PathBuf)>,
}

impl Default for EspeakSynthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE)
    }
}

impl EspeakSynthesizer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            rate: DEFAULT_RATE,
            volume: DEFAULT_VOLUME,
            pending: Vec::new(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Number of queued requests.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// espeak amplitude runs 0-200 with 100 as the normal level.
    fn amplitude(&self) -> u32 {
        (self.volume * 100.0).round() as u32
    }

    fn render(&self, text: &str, path: &Path) -> Result<()> {
        tracing::debug!(command = %self.command, output = %path.display(), "starting speech engine");

        let mut child = Command::new(&self.command)
            .arg("-s")
            .arg(self.rate.to_string())
            .arg("-a")
            .arg(self.amplitude().to_string())
            .arg("-w")
            .arg(path)
            .arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Speech(format!("could not start {}: {e}", self.command)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| Error::Speech(format!("could not send text to {}: {e}", self.command)))?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Speech(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl SpeechSynthesizer for EspeakSynthesizer {
    fn set_rate(&mut self, words_per_minute: u32) {
        self.rate = words_per_minute;
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        check_volume(volume)?;
        self.volume = volume;
        Ok(())
    }

    fn save_to_file(&mut self, text: &str, path: &Path) -> Result<()> {
        self.pending.push((text.to_string(), path.to_path_buf()));
        Ok(())
    }

    fn run_and_wait(&mut self) -> Result<()> {
        for (text, path) in std::mem::take(&mut self.pending) {
            self.render(&text, &path)?;
        }
        Ok(())
    }
}
