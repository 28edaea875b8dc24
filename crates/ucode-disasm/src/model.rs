use anyhow::Result;
use std::path::Path;

use light8080_ucode::render::parse_table;
use light8080_ucode::{MicroWord, Program};

/// Loads a table rendered as VHDL, Verilog or JSON.
pub fn load_table(path: &Path) -> Result<Program> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_table(&text)?)
}

pub fn read_word(program: &Program, addr: u32) -> Option<MicroWord> {
    program.get(addr as usize)
}

pub fn parse_addr(s: &str) -> Result<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u32::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u32>()?)
    }
}
