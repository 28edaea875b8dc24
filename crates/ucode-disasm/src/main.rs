use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::path::PathBuf;

use light8080_ucode::disasm::fmt_word;
use light8080_ucode::{DECODE_BASE, PROGRAM_LEN};

use ucode_disasm::{build_report, decode_entries, load_table, parse_addr, read_word};

#[derive(Parser, Debug)]
#[command(author, version, about = "light8080 microcode table disassembler", long_about=None)]
struct Cli {
    /// Rendered microcode table (VHDL package, Verilog include or JSON)
    #[arg(value_name = "TABLE")]
    input: PathBuf,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Disassemble microaddresses [start, end)
    Range {
        /// Start address (hex or dec)
        start: String,
        /// End address (hex or dec, exclusive)
        end: String,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Print the opcode -> entry address decoding table
    Table,
    /// Summarize entry points and control flow of the authored region
    Analyze {
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write analysis output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

fn main() -> Result<()> {
    let cli = Cli::parse();
    let program = load_table(&cli.input)?;

    match cli.cmd {
        Command::Range { start, end, out } => {
            let start = parse_addr(&start)?;
            let end = parse_addr(&end)?;
            anyhow::ensure!(end >= start, "end must be >= start");
            anyhow::ensure!(end as usize <= PROGRAM_LEN, "end must be <= {PROGRAM_LEN}");
            let mut buf = String::new();
            for addr in start..end {
                let Some(w) = read_word(&program, addr) else { break; };
                let _ = writeln!(buf, "{addr:03x}: {:08x}  {}", w.raw(), fmt_word(&w));
            }
            if let Some(path) = out { std::fs::write(path, buf)?; } else { print!("{}", buf); }
        }
        Command::Table => {
            for (op, entry) in decode_entries(&program).into_iter().enumerate() {
                let addr = DECODE_BASE + op;
                match entry {
                    Some(e) => println!("{addr:03x}: {op:08b} -> {e:03x}"),
                    None => println!("{addr:03x}: {op:08b} -> (unmatched)"),
                }
            }
        }
        Command::Analyze { format, out } => {
            let report = build_report(&program);
            let text = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&report)?,
                OutputFormat::Text => {
                    let mut s = String::new();
                    let _ = writeln!(s, "Analysis summary:");
                    let _ = writeln!(s, "  entries   : {}", report.entries.len());
                    let _ = writeln!(s, "  unmatched : {}", report.unmatched.len());
                    let _ = writeln!(s, "  reachable : {}", report.reachable);
                    let _ = writeln!(s, "  edges     : {}", report.edges.len());
                    let _ = writeln!(s, "Entries:");
                    for e in &report.entries {
                        let _ = writeln!(s, "  {:03x} <- {} opcode(s), first {:#04x}", e.addr, e.opcodes.len(), e.opcodes[0]);
                    }
                    let _ = writeln!(s, "Edges:");
                    for e in &report.edges {
                        let _ = writeln!(s, "  {:03x} -> {:03x} ({})", e.from, e.to, e.kind);
                    }
                    s
                }
            };
            if let Some(path) = out { std::fs::write(path, text)?; } else { print!("{}", text); }
        }
    }

    Ok(())
}
