use std::fmt::Write as _;

use crate::assembler::{Assembly, DECODE_BASE, PROGRAM_LEN};

fn banner(out: &mut String, text: &str) {
    let _ = write!(out, "\n\n{:>4}  {:>32}  {}\n", "", "", text);
}

/// Human-readable trace of an assembly: one line per source line, then the
/// padding words, then the decoding table annotated with `__asm` mnemonics.
pub fn build_listing(asm: &Assembly) -> String {
    let words = asm.program.words();
    let mut out = String::new();

    for line in &asm.trace {
        let (addr, obj) = match line.address {
            Some(a) => (
                format!("{a:03x}:"),
                format!("{:032b}", words[a as usize].raw()),
            ),
            None => (String::new(), String::new()),
        };
        let _ = writeln!(out, "{addr:>4}  {obj:>32}  {}", line.text);
    }

    banner(&mut out, "// PADDING INSTRUCTIONS INSERTED AUTOMATICALLY.");
    for (addr, w) in words.iter().enumerate().take(DECODE_BASE).skip(asm.authored) {
        let _ = writeln!(out, "{addr:03x}:  {:032b}  ", w.raw());
    }

    banner(&mut out, "// DECODING TABLE INSERTED AUTOMATICALLY.");
    for addr in DECODE_BASE..PROGRAM_LEN {
        let opcode = (addr - DECODE_BASE) as u8;
        let note = asm
            .decode
            .get(opcode)
            .and_then(|entry| asm.mnemonics.get(&entry))
            .map(|m| format!("// {m}"))
            .unwrap_or_else(|| "//".to_string());
        let _ = writeln!(out, "{addr:03x}:  {:032b}  {note}", words[addr].raw());
    }

    banner(&mut out, "// END OF LISTING.");
    out
}
