//! Pulse CLI - Command-line interface for Pulse Decode
//!
//! Commands:
//! - decode: Decode workout events into records (NDJSON in, NDJSON out)
//! - metric: Parse single-value metric events (weight, height, age)
//! - validate: Check that events parse and carry a recognized kind

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use pulse_decode::{
    decode_metric, decode_workout, DecodeError, RawEvent, DECODER_VERSION, KIND_AGE, KIND_HEIGHT,
    KIND_WEIGHT, KIND_WORKOUT,
};

/// Pulse - decode Nostr workout and biometric events
#[derive(Parser)]
#[command(name = "pulse")]
#[command(version = DECODER_VERSION)]
#[command(about = "Decode Nostr workout and biometric events", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode workout events into records
    Decode {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output format (defaults to pretty on a terminal, ndjson otherwise)
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Skip events whose kind is not 1301 instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Parse single-value metric events (weight, height, age)
    Metric {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output format
        #[arg(long)]
        format: Option<OutputFormat>,
    },

    /// Check that events parse and carry a recognized kind
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Ndjson,
    Pretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Decode {
            input,
            format,
            lenient,
        } => decode_command(&input, resolve_format(format), lenient),
        Commands::Metric { input, format } => metric_command(&input, resolve_format(format)),
        Commands::Validate { input } => validate_command(&input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn resolve_format(format: Option<OutputFormat>) -> OutputFormat {
    format.unwrap_or(if atty::is(atty::Stream::Stdout) {
        OutputFormat::Pretty
    } else {
        OutputFormat::Ndjson
    })
}

fn read_lines(input: &PathBuf) -> io::Result<Vec<String>> {
    let raw = if input.as_os_str() == "-" {
        let mut lines = Vec::new();
        for line in io::stdin().lock().lines() {
            lines.push(line?);
        }
        return Ok(non_empty(lines));
    } else {
        fs::read_to_string(input)?
    };
    Ok(non_empty(raw.lines().map(str::to_string).collect()))
}

fn non_empty(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect()
}

fn emit<T: serde::Serialize>(value: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let json = match format {
        OutputFormat::Ndjson => serde_json::to_string(value),
        OutputFormat::Pretty => serde_json::to_string_pretty(value),
    }
    .map_err(io::Error::other)?;
    writeln!(out, "{}", json)
}

fn decode_command(
    input: &PathBuf,
    format: OutputFormat,
    lenient: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    for line in read_lines(input)? {
        let event = RawEvent::from_json(&line)?;
        if let Some(kind) = event.kind {
            if kind != KIND_WORKOUT {
                if lenient {
                    continue;
                }
                return Err(Box::new(DecodeError::KindMismatch {
                    expected: KIND_WORKOUT,
                    actual: kind,
                }));
            }
        }
        emit(&decode_workout(&event), format)?;
    }
    Ok(())
}

fn metric_command(input: &PathBuf, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    for line in read_lines(input)? {
        let event = RawEvent::from_json(&line)?;
        emit(&decode_metric(&event)?, format)?;
    }
    Ok(())
}

fn validate_command(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mut ok = 0usize;
    let mut failed = 0usize;
    for (i, line) in read_lines(input)?.iter().enumerate() {
        match RawEvent::from_json(line) {
            Ok(event) => match event.kind {
                Some(KIND_WORKOUT) | Some(KIND_WEIGHT) | Some(KIND_HEIGHT) | Some(KIND_AGE) => {
                    ok += 1;
                }
                Some(kind) => {
                    failed += 1;
                    eprintln!("line {}: unrecognized kind {}", i + 1, kind);
                }
                None => {
                    failed += 1;
                    eprintln!("line {}: missing kind", i + 1);
                }
            },
            Err(err) => {
                failed += 1;
                eprintln!("line {}: {}", i + 1, err);
            }
        }
    }
    println!("{} valid, {} invalid", ok, failed);
    if failed > 0 {
        return Err(format!("{} events failed validation", failed).into());
    }
    Ok(())
}
