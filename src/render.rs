//! Textual encodings of the control store, and the reader that turns any of
//! them back into a [`Program`].

use std::fmt::Write as _;

use crate::assembler::{Program, PROGRAM_LEN};
use crate::error::LoadError;
use crate::word::{MicroWord, WORD_BITS};

pub const VHDL_PACKAGE: &str = "light8080_ucode_pkg";

/// VHDL package holding the table as a `t_rom` constant.
pub fn vhdl_package(program: &Program) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "-- {VHDL_PACKAGE}.vhdl -- Microcode table for light8080 CPU core.");
    out.push_str("library ieee;\n");
    out.push_str("use ieee.std_logic_1164.all;\n");
    out.push_str("use ieee.numeric_std.all;\n\n");
    let _ = writeln!(out, "package {VHDL_PACKAGE} is\n");
    let _ = writeln!(
        out,
        "  type t_rom is array (0 to {}) of std_logic_vector({} downto 0);",
        PROGRAM_LEN - 1,
        WORD_BITS - 1
    );
    out.push_str("  constant microcode : t_rom := (\n");
    let last = PROGRAM_LEN - 1;
    for (addr, w) in program.words().iter().enumerate() {
        let sep = if addr < last { ',' } else { ' ' };
        let _ = writeln!(out, "  \"{:032b}\"{sep} -- {addr:03x}", w.raw());
    }
    out.push_str("\n);\n");
    out.push_str("end package;\n");
    out
}

/// Verilog include file initialising a `microcode` memory.
pub fn verilog_include(program: &Program) -> String {
    let mut out = String::new();
    out.push_str("// light8080_ucode.inc.v -- Microcode table for light8080 CPU core.\n");
    let _ = writeln!(
        out,
        "reg [{}:0] microcode [0:{}];\n",
        WORD_BITS - 1,
        PROGRAM_LEN - 1
    );
    out.push_str("initial begin\n");
    for (addr, w) in program.words().iter().enumerate() {
        let _ = writeln!(out, "  microcode[9'h{addr:03x}] = 32'b{:032b};", w.raw());
    }
    out.push_str("end\n");
    out
}

/// Serialized word list, as produced by `serde_json`.
pub fn json(program: &Program) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(program)
}

/// Reads back a table rendered by [`vhdl_package`], [`verilog_include`] or
/// [`json`].
pub fn parse_table(text: &str) -> Result<Program, LoadError> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text).map_err(|e| LoadError::Json(e.to_string()));
    }
    let mut words = Vec::with_capacity(PROGRAM_LEN);
    for (idx, line) in text.lines().enumerate() {
        let code = line
            .split("--")
            .next()
            .unwrap_or_default()
            .split("//")
            .next()
            .unwrap_or_default();
        if let Some(literal) = vhdl_literal(code).or_else(|| verilog_literal(code)) {
            let word = parse_binary(literal).ok_or_else(|| LoadError::BadLiteral {
                line: idx + 1,
                text: literal.to_string(),
            })?;
            words.push(word);
        }
    }
    Program::from_words(words)
}

fn vhdl_literal(code: &str) -> Option<&str> {
    let start = code.find('"')? + 1;
    let len = code[start..].find('"')?;
    Some(&code[start..start + len])
}

fn verilog_literal(code: &str) -> Option<&str> {
    let start = code.find("32'b")? + 4;
    let rest = &code[start..];
    let end = rest.find(|c: char| c == ';' || c.is_whitespace()).unwrap_or(rest.len());
    Some(&rest[..end])
}

fn parse_binary(literal: &str) -> Option<MicroWord> {
    let digits: String = literal.chars().filter(|&c| c != '_').collect();
    if digits.len() != WORD_BITS || !digits.chars().all(|c| c == '0' || c == '1') {
        return None;
    }
    u32::from_str_radix(&digits, 2).ok().map(MicroWord::from_raw)
}
