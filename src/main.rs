use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ini_archive::{Archive, ArchiveConfig, DefaultFactory, SectionOrder};

/// Read an `.ini` file and print it in canonical form.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// File to read
    input: PathBuf,

    /// Also write the canonical form to this file
    output: Option<PathBuf>,

    /// Print sections in alphabetical order
    #[arg(long)]
    alphabetical: bool,

    /// Characters that start a comment
    #[arg(long, default_value = ArchiveConfig::DEFAULT_COMMENT_DELIMITERS)]
    comments: String,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = ArchiveConfig {
        order: if cli.alphabetical {
            SectionOrder::Alphabetical
        } else {
            SectionOrder::Insertion
        },
        comment_delimiters: cli.comments,
    };
    let mut archive = Archive::with_config(DefaultFactory, config);

    let errors = match archive.read_from_file(&cli.input) {
        Ok(errors) => errors,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    for error in &errors {
        eprintln!("{}: skipped {error}", cli.input.display());
    }

    if let Err(e) = archive.print(&mut io::stdout().lock()) {
        eprintln!("error: failed to print: {e}");
        return ExitCode::FAILURE;
    }

    if let Some(output) = &cli.output {
        if let Err(e) = archive.write_to_file(output) {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
