//! Line classification and field parsing.
//!
//! Grammar, informally:
//!
//! ```text
//! line      := ':' label
//!            | pragma [params]
//!            | ('JSR' | 'TJSR') label
//!            | operand [';' alu [';' flags]]
//! operand   := 'NOP' | ('T1' | 'T2') '=' (register | ir_alias | 'DI')
//! alu       := 'NOP' | alu_0op | (register | ir_alias | 'DO') '=' alu_op
//! flags     := flag {',' flag}
//! ```
//!
//! `//` starts a comment. Fields are case-insensitive, jump mnemonics are not.

use crate::error::ParseError;
use crate::vocab::{self, JumpKind, Pragma};
use crate::word::{MicroWord, ALU_OP, DO_WE, MUX_IN, RB_ADDR, RB_ADDR_MSB, RB_ADDR_SEL, RB_WE};

const MAX_FIELDS: usize = 3;

/// A classified source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// `:name`, binds `name` to the address of the next instruction.
    Label(String),
    Pragma { pragma: Pragma, params: String },
    /// `JSR`/`TJSR` to a label resolved in pass 2.
    Jump { kind: JumpKind, label: String },
    /// A fully encoded non-jump microinstruction.
    Instr(MicroWord),
}

/// Removes surrounding whitespace and any trailing `//` comment.
pub fn strip_line(raw: &str) -> &str {
    let s = raw.trim();
    match s.find("//") {
        Some(p) => s[..p].trim_end(),
        None => s,
    }
}

/// Classifies and encodes one source line. Blank and comment-only lines
/// yield `None`.
pub fn parse_line(raw: &str) -> Result<Option<Line>, ParseError> {
    let code = strip_line(raw);
    if code.is_empty() {
        return Ok(None);
    }
    let fields: Vec<&str> = code.split(';').map(str::trim).collect();
    if fields.len() > MAX_FIELDS {
        return Err(ParseError::TooManyFields);
    }

    let head = fields[0];
    let line = if let Some(name) = head.strip_prefix(':') {
        if fields.len() > 1 {
            return Err(ParseError::UnexpectedFields("label"));
        }
        if !is_identifier(name) {
            return Err(ParseError::InvalidLabel(name.to_string()));
        }
        Line::Label(name.to_string())
    } else if head.starts_with("__") {
        parse_pragma(&fields)?
    } else if head.starts_with("JSR") || head.starts_with("TJSR") {
        parse_jump(&fields)?
    } else {
        Line::Instr(parse_instruction(&fields)?)
    };
    Ok(Some(line))
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_pragma(fields: &[&str]) -> Result<Line, ParseError> {
    if fields.len() > 1 {
        return Err(ParseError::UnexpectedFields("pragma"));
    }
    let mut parts = fields[0].splitn(2, char::is_whitespace);
    let keyword = parts.next().unwrap_or_default();
    let pragma = Pragma::from_keyword(keyword)
        .ok_or_else(|| ParseError::UnknownPragma(keyword.to_ascii_lowercase()))?;
    let params = parts.next().unwrap_or_default().trim().to_string();
    Ok(Line::Pragma { pragma, params })
}

fn parse_jump(fields: &[&str]) -> Result<Line, ParseError> {
    if fields.len() > 1 {
        return Err(ParseError::UnexpectedFields("JSR/TJSR"));
    }
    let tokens: Vec<&str> = fields[0].split_whitespace().collect();
    let kind = JumpKind::from_mnemonic(tokens[0])
        .ok_or_else(|| ParseError::UnknownMnemonic(tokens[0].to_string()))?;
    match tokens.as_slice() {
        [_] => Err(ParseError::MissingJumpTarget),
        [_, label] if is_identifier(label) => Ok(Line::Jump {
            kind,
            label: label.to_string(),
        }),
        [_, target] => Err(ParseError::InvalidJumpTarget(target.to_string())),
        _ => Err(ParseError::UnexpectedFields("JSR/TJSR")),
    }
}

fn parse_instruction(fields: &[&str]) -> Result<MicroWord, ParseError> {
    let mut word = MicroWord::new();
    operand_stage(&mut word, fields[0])?;
    if let Some(alu) = fields.get(1) {
        alu_stage(&mut word, alu)?;
    }
    if let Some(flags) = fields.get(2) {
        flag_list(&mut word, flags)?;
    }
    Ok(word)
}

fn sides(field: &str) -> Vec<String> {
    field
        .split('=')
        .map(|s| s.trim().to_ascii_lowercase())
        .collect()
}

/// Field 1: what gets loaded into T1/T2.
fn operand_stage(word: &mut MicroWord, field: &str) -> Result<(), ParseError> {
    match sides(field).as_slice() {
        [op] if op == vocab::NOP => Ok(()),
        [dst, src] => {
            let target = vocab::operand_target(dst)
                .ok_or_else(|| ParseError::BadOperandTarget(dst.clone()))?;
            word.write(target, 1)?;
            if let Some(reg) = vocab::register(src) {
                word.write(RB_ADDR_SEL, 0b00)?;
                word.write(RB_ADDR, reg.index)?;
                word.write(MUX_IN, 1)?;
            } else if let Some(alias) = vocab::ir_alias(src) {
                word.write(RB_ADDR_SEL, alias.select)?;
                word.write(RB_ADDR_MSB, alias.high)?;
                word.write(MUX_IN, 1)?;
            } else if src == vocab::DATA_IN {
                word.write(MUX_IN, 0)?;
            } else {
                return Err(ParseError::BadOperandSource(src.clone()));
            }
            Ok(())
        }
        _ => Err(ParseError::MalformedOperand),
    }
}

/// Field 2: ALU operation and where its result goes.
fn alu_stage(word: &mut MicroWord, field: &str) -> Result<(), ParseError> {
    match sides(field).as_slice() {
        [op] if op.is_empty() || op == vocab::NOP => Ok(()),
        [op] => {
            let op = vocab::alu_0arg(op).ok_or_else(|| ParseError::UnknownAluOp(op.clone()))?;
            word.write(ALU_OP, op.code)?;
            Ok(())
        }
        [dst, op] => {
            if let Some(reg) = vocab::register(dst) {
                word.write(RB_ADDR, reg.index)?;
                word.write(RB_WE, 1)?;
            } else if let Some(alias) = vocab::ir_alias(dst) {
                word.write(RB_ADDR_SEL, alias.select)?;
                word.write(RB_ADDR_MSB, alias.high)?;
                word.write(RB_WE, 1)?;
            } else if dst == vocab::DATA_OUT {
                word.write(DO_WE, 1)?;
            } else {
                return Err(ParseError::BadAluTarget(dst.clone()));
            }
            let op = vocab::alu_1arg(op).ok_or_else(|| ParseError::UnknownAluOp(op.clone()))?;
            word.write(ALU_OP, op.code)?;
            Ok(())
        }
        _ => Err(ParseError::MalformedAlu),
    }
}

/// Field 3: comma separated flags. A flag whose field is already nonzero
/// conflicts with an earlier one.
fn flag_list(word: &mut MicroWord, field: &str) -> Result<(), ParseError> {
    if field.is_empty() {
        return Ok(());
    }
    for token in field.split(',').map(|t| t.trim().to_ascii_lowercase()) {
        if token.is_empty() {
            return Err(ParseError::MalformedFlagList);
        }
        let flag = vocab::flag(&token).ok_or_else(|| ParseError::UnknownFlag(token.clone()))?;
        if word.is_set(flag.field) {
            return Err(ParseError::FlagConflict(token));
        }
        word.write(flag.field, flag.value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(is_identifier("fetch_1"));
        assert!(is_identifier("_x"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a-b"));
    }

    #[test]
    fn strip_removes_comment_and_blanks() {
        assert_eq!(strip_line("   T1 = _a ; NOP   // load a  "), "T1 = _a ; NOP");
        assert_eq!(strip_line("// only a comment"), "");
        assert_eq!(strip_line("\t\n"), "");
    }
}
