//! epub-to-audio - narrate an EPUB into an audio file

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use epub_narrator::speech::{DEFAULT_ENGINE, DEFAULT_RATE, DEFAULT_VOLUME};
use epub_narrator::{
    EspeakSynthesizer, Narrator, NarratorConfig, SpeechConfig, WorkDirLocation, default_output_path,
};

#[derive(Parser, Debug)]
#[command(name = "epub-to-audio")]
#[command(version, about = "Narrate an EPUB into a single audio file", long_about = None)]
#[command(override_usage = "epub-to-audio [OPTIONS] [-o OUTPUT_FILE] INPUT_FILE")]
#[command(after_help = "EXAMPLES:
    epub-to-audio book.epub                 Narrate into book.mp3
    epub-to-audio -o out.mp3 book.epub      Narrate into out.mp3
    epub-to-audio --rate 160 book.epub      Speak faster")]
struct Cli {
    /// EPUB file to narrate
    #[arg(value_name = "INPUT_FILE")]
    input: PathBuf,

    /// Audio file to write (default: INPUT_FILE with an .mp3 extension)
    #[arg(short = 'o', value_name = "OUTPUT_FILE")]
    output: Option<PathBuf>,

    /// Speaking rate in words per minute
    #[arg(long, value_name = "WPM", default_value_t = DEFAULT_RATE)]
    rate: u32,

    /// Playback volume from 0.0 to 1.0
    #[arg(long, default_value_t = DEFAULT_VOLUME)]
    volume: f32,

    /// Speech engine command (espeak-ng compatible flags)
    #[arg(long, value_name = "COMMAND", default_value = DEFAULT_ENGINE)]
    engine: String,

    /// Unpack into exactly this directory (must be empty, absent, or a leftover working directory)
    #[arg(long, value_name = "DIR")]
    workdir: Option<PathBuf>,

    /// Suppress progress messages
    #[arg(short, long)]
    quiet: bool,

    /// Log more detail (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input))
    }

    fn workdir_location(&self) -> WorkDirLocation {
        match &self.workdir {
            Some(path) => WorkDirLocation::At(path.clone()),
            None => WorkDirLocation::default(),
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(2);
        }
    };

    let speech = match SpeechConfig::new(cli.rate, cli.volume) {
        Ok(speech) => speech,
        Err(e) => {
            eprintln!("error: {e}\n\n{}", Cli::command().render_usage());
            return ExitCode::from(2);
        }
    };

    init_tracing(cli.verbose, cli.quiet);

    match narrate(&cli, speech) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn narrate(cli: &Cli, speech: SpeechConfig) -> epub_narrator::Result<()> {
    let output = cli.output_path();
    let config = NarratorConfig {
        workdir: cli.workdir_location(),
        speech,
    };
    let mut narrator = Narrator::new(config, EspeakSynthesizer::new(cli.engine.as_str()));

    narrator.narrate(&cli.input, &output, |phase| {
        if !cli.quiet {
            println!("{phase}");
        }
    })
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("epub-to-audio").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_output_path() {
        let cli = parse(&["book.epub"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("book.epub"));
        assert_eq!(cli.output_path(), PathBuf::from("book.mp3"));
    }

    #[test]
    fn test_explicit_output_either_order() {
        let cli = parse(&["book.epub", "-o", "out.mp3"]).unwrap();
        assert_eq!(cli.output_path(), PathBuf::from("out.mp3"));

        let cli = parse(&["-o", "out.mp3", "book.epub"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("book.epub"));
        assert_eq!(cli.output_path(), PathBuf::from("out.mp3"));
    }

    #[test]
    fn test_invalid_argument_counts() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["book.epub", "extra"]).is_err());
        assert!(parse(&["book.epub", "-o", "out.mp3", "extra"]).is_err());
    }

    #[test]
    fn test_output_flag_requires_value() {
        assert!(parse(&["book.epub", "-o"]).is_err());
        assert!(parse(&["-o"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["book.epub"]).unwrap();
        assert_eq!(cli.rate, 120);
        assert_eq!(cli.volume, 0.9);
        assert_eq!(cli.engine, "espeak-ng");
        assert_eq!(cli.workdir_location(), WorkDirLocation::default());
    }

    #[test]
    fn test_workdir_is_exact() {
        let cli = parse(&["--workdir", "scratch", "book.epub"]).unwrap();
        assert_eq!(cli.workdir_location(), WorkDirLocation::At(PathBuf::from("scratch")));
    }
}
