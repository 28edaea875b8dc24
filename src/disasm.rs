use crate::vocab::{self, ALU_0ARG, ALU_1ARG, FLAGS};
use crate::word::{ControlLines, InstrClass, MicroWord, ALU_OP, RB_ADDR, RB_ADDR_SEL};

/// Renders a word in source syntax. Jumps print their numeric target since
/// labels are gone by the time the table exists.
pub fn fmt_word(w: &MicroWord) -> String {
    match w.class() {
        InstrClass::Jump(kind) => {
            format!("{} {:#05x}", kind.mnemonic(), w.jump_target().unwrap_or_default())
        }
        InstrClass::Plain => {
            let mut out = format!("{} ; {}", operand(w), alu(w));
            let flags = flags(w);
            if !flags.is_empty() {
                out.push_str(" ; ");
                out.push_str(&flags.join(", "));
            }
            out
        }
    }
}

/// Register read or written through the register bank address fields.
fn bank_register(w: &MicroWord) -> String {
    let select = w.read(RB_ADDR_SEL);
    if select == 0 {
        let index = w.read(RB_ADDR);
        return vocab::register_by_index(index)
            .map(|r| r.name.to_string())
            .unwrap_or_else(|| format!("r{index}"));
    }
    let high = u32::from(w.lines().contains(ControlLines::RB_ADDR_MSB));
    vocab::ir_alias_by_select(select, high)
        .map(|a| a.name.to_string())
        .unwrap_or_else(|| format!("ir{select}"))
}

fn operand(w: &MicroWord) -> String {
    let lines = w.lines();
    let dst = match (
        lines.contains(ControlLines::LD_T1),
        lines.contains(ControlLines::LD_T2),
    ) {
        (false, false) => return "NOP".to_string(),
        (true, false) => "T1",
        (false, true) => "T2",
        (true, true) => "T1 = T2",
    };
    let src = if lines.contains(ControlLines::MUX_IN) {
        bank_register(w)
    } else {
        "DI".to_string()
    };
    format!("{dst} = {src}")
}

fn alu(w: &MicroWord) -> String {
    let lines = w.lines();
    let code = w.read(ALU_OP);
    let dst = if lines.contains(ControlLines::RB_WE) {
        Some(bank_register(w))
    } else if lines.contains(ControlLines::DO_WE) {
        Some("DO".to_string())
    } else {
        None
    };
    match dst {
        Some(dst) => {
            let op = ALU_1ARG
                .iter()
                .find(|op| op.code == code)
                .map(|op| op.mnemonic.to_string())
                .unwrap_or_else(|| format!("{code:#08b}"));
            format!("{dst} = {op}")
        }
        None if code == 0 => "NOP".to_string(),
        None => ALU_0ARG
            .iter()
            .find(|op| op.code == code)
            .map(|op| op.mnemonic.to_string())
            .unwrap_or_else(|| format!("{code:#08b}")),
    }
}

fn flags(w: &MicroWord) -> Vec<&'static str> {
    FLAGS
        .iter()
        .filter(|f| w.read(f.field) == f.value)
        .map(|f| f.token)
        .collect()
}
