use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use light8080_ucode::listing::build_listing;
use light8080_ucode::{render, AsmConfig, AsmError, Assembler, TieBreak};

/// Exit status for errors in the microcode source.
const EXIT_COMPILE: u8 = 22;
/// Exit status for unreadable input or unwritable output.
const EXIT_IO: u8 = 74;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Vhdl,
    Verilog,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Tie {
    First,
    Reject,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "light8080 microcode assembler")]
struct Opts {
    /// Write listing to FILE
    #[arg(short, long, value_name = "FILE")]
    listing: Option<PathBuf>,
    /// Microcode table format
    #[arg(short, long, value_enum, default_value_t = Format::Vhdl)]
    format: Format,
    /// How to resolve two equally specific __code patterns
    #[arg(long, value_enum, default_value_t = Tie::First)]
    tie_break: Tie,
    #[arg(value_name = "SOURCE")]
    source: PathBuf,
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,
}

enum Failure {
    Compile(AsmError),
    Io(anyhow::Error),
}

impl From<anyhow::Error> for Failure {
    fn from(e: anyhow::Error) -> Self {
        Failure::Io(e)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure::Compile(err)) => {
            report(&opts.source, &err);
            ExitCode::from(EXIT_COMPILE)
        }
        Err(Failure::Io(err)) => {
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_IO)
        }
    }
}

fn run(opts: &Opts) -> Result<(), Failure> {
    let source = std::fs::read_to_string(&opts.source)
        .with_context(|| format!("reading {}", opts.source.display()))?;

    let cfg = AsmConfig {
        tie_break: match opts.tie_break {
            Tie::First => TieBreak::FirstRegistered,
            Tie::Reject => TieBreak::Reject,
        },
    };
    let asm = Assembler::new(cfg).assemble(&source).map_err(Failure::Compile)?;

    let table = match opts.format {
        Format::Vhdl => render::vhdl_package(&asm.program),
        Format::Verilog => render::verilog_include(&asm.program),
        Format::Json => render::json(&asm.program).context("serializing microcode table")?,
    };
    let listing = opts.listing.as_ref().map(|path| (path.as_path(), build_listing(&asm)));
    write_outputs(&opts.output, &table, listing)?;
    Ok(())
}

/// Writes the table, then the listing. If the listing cannot be written the
/// table is removed again, so a failed run leaves no table behind.
fn write_outputs(output: &Path, table: &str, listing: Option<(&Path, String)>) -> Result<()> {
    std::fs::write(output, table).with_context(|| format!("writing {}", output.display()))?;
    if let Some((path, text)) = listing {
        if let Err(err) = std::fs::write(path, text) {
            let _ = std::fs::remove_file(output);
            return Err(err).with_context(|| format!("writing {}", path.display()));
        }
    }
    Ok(())
}

/// Prints diagnostics as `<offending line>` then `file:line:error:message.`
fn report(file: &Path, err: &AsmError) {
    let file = file.display();
    match err {
        AsmError::Source { text, .. } => {
            eprintln!("{text}");
            eprintln!("{file}:{err}");
        }
        AsmError::UndefinedLabels(list) => {
            for u in list {
                eprintln!("{}", u.text);
                eprintln!("{file}:{u}");
            }
            eprintln!("quitting due to previous label error(s)");
        }
        other => eprintln!("{file}:error:{other}."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_listing_write_removes_the_table() {
        let dir = std::env::temp_dir();
        let output = dir.join(format!("_ucode_asm_{}.vhdl", std::process::id()));
        // a directory cannot be written as a file
        let err = write_outputs(&output, "table", Some((dir.as_path(), "listing".to_string())));
        assert!(err.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn table_and_listing_are_written() {
        let dir = std::env::temp_dir();
        let output = dir.join(format!("_ucode_asm_{}_ok.vhdl", std::process::id()));
        let listing = dir.join(format!("_ucode_asm_{}_ok.lst", std::process::id()));
        write_outputs(&output, "table", Some((listing.as_path(), "listing".to_string()))).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "table");
        assert_eq!(std::fs::read_to_string(&listing).unwrap(), "listing");
        let _ = std::fs::remove_file(&output);
        let _ = std::fs::remove_file(&listing);
    }
}
