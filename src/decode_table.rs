//! Opcode decoding table: every CPU opcode byte is mapped to the entry point
//! of the most specific `__code` pattern that matches it.

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EncodingError, ParseError};
use crate::vocab::JumpKind;
use crate::word::MicroWord;

pub const OPCODE_BITS: usize = 8;
pub const OPCODE_COUNT: usize = 1 << OPCODE_BITS;

/// Word emitted for opcodes no pattern matches: a call to microaddress 0.
pub const UNMATCHED_WORD: u32 = 0x0800_0000;

/// What to do when two patterns with the same wildcard count match one opcode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    /// Keep the pattern registered first.
    #[default]
    FirstRegistered,
    /// Fail the assembly.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symbol {
    Zero,
    One,
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodePattern {
    text: String,
    symbols: [Symbol; OPCODE_BITS],
    pub entry: u16,
    pub line: usize,
}

impl OpcodePattern {
    /// Parses an 8-symbol pattern, MSB first. Double quotes are ignored;
    /// `0` and `1` are literal bits, any other character is a wildcard.
    pub fn parse(text: &str, entry: u16, line: usize) -> Result<Self, ParseError> {
        let text: String = text.chars().filter(|&c| c != '"').collect();
        let chars: Vec<char> = text.chars().collect();
        if chars.len() != OPCODE_BITS || chars.iter().any(|c| c.is_whitespace()) {
            return Err(ParseError::InvalidPattern(text));
        }
        let mut symbols = [Symbol::Any; OPCODE_BITS];
        for (s, c) in symbols.iter_mut().zip(&chars) {
            *s = match c {
                '0' => Symbol::Zero,
                '1' => Symbol::One,
                _ => Symbol::Any,
            };
        }
        Ok(Self {
            text,
            symbols,
            entry,
            line,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of wildcards; lower is more specific.
    pub fn cost(&self) -> usize {
        self.symbols.iter().filter(|s| **s == Symbol::Any).count()
    }

    pub fn matches(&self, opcode: u8) -> bool {
        self.symbols
            .iter()
            .zip(opcode.view_bits::<Msb0>())
            .all(|(s, bit)| match s {
                Symbol::Zero => !*bit,
                Symbol::One => *bit,
                Symbol::Any => true,
            })
    }
}

/// Two equally specific patterns matching the same opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    pub opcode: u8,
    pub first: OpcodePattern,
    pub second: OpcodePattern,
}

impl Ambiguity {
    pub fn into_parse_error(self) -> ParseError {
        ParseError::AmbiguousOpcode {
            opcode: self.opcode,
            first: self.first.text,
            first_line: self.first.line,
            second: self.second.text,
        }
    }
}

/// Registered patterns, kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<OpcodePattern>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, pattern: OpcodePattern) -> Result<(), ParseError> {
        if let Some(prev) = self.patterns.iter().find(|p| p.text == pattern.text) {
            return Err(ParseError::DuplicatePattern {
                pattern: pattern.text,
                first_line: prev.line,
            });
        }
        debug!(pattern = %pattern.text, entry = pattern.entry, "opcode pattern registered");
        self.patterns.push(pattern);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    fn matching(&self, opcode: u8) -> impl Iterator<Item = &OpcodePattern> + '_ {
        self.patterns.iter().filter(move |p| p.matches(opcode))
    }

    /// Lowest-cost pattern matching `opcode`. Only patterns sharing that
    /// minimum cost take part in the tie-break.
    pub fn best_match(&self, opcode: u8, tie: TieBreak) -> Result<Option<&OpcodePattern>, Ambiguity> {
        let Some(min) = self.matching(opcode).map(OpcodePattern::cost).min() else {
            return Ok(None);
        };
        let tied: Vec<&OpcodePattern> = self.matching(opcode).filter(|p| p.cost() == min).collect();
        match (tied.as_slice(), tie) {
            ([], _) => Ok(None),
            ([only], _) => Ok(Some(*only)),
            ([first, rest @ ..], TieBreak::FirstRegistered) => {
                for p in rest {
                    warn!(opcode, kept = %first.text, ignored = %p.text, "equally specific opcode patterns");
                }
                Ok(Some(*first))
            }
            ([first, second, ..], TieBreak::Reject) => Err(Ambiguity {
                opcode,
                first: (*first).clone(),
                second: (*second).clone(),
            }),
        }
    }
}

/// Opcode byte -> entry microaddress, `None` when nothing matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeTable {
    entries: Vec<Option<u16>>,
}

impl DecodeTable {
    pub fn get(&self, opcode: u8) -> Option<u16> {
        self.entries[opcode as usize]
    }

    pub fn matched(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, Option<u16>)> + '_ {
        self.entries.iter().enumerate().map(|(op, e)| (op as u8, *e))
    }

    /// One jump per opcode, in opcode order.
    pub fn words(&self) -> Result<Vec<MicroWord>, EncodingError> {
        self.entries
            .iter()
            .map(|e| match e {
                Some(entry) => MicroWord::jump(JumpKind::Call, *entry),
                None => Ok(MicroWord::from_raw(UNMATCHED_WORD)),
            })
            .collect()
    }
}

pub fn synthesize(patterns: &PatternSet, tie: TieBreak) -> Result<DecodeTable, Ambiguity> {
    let mut entries = Vec::with_capacity(OPCODE_COUNT);
    for opcode in 0..=u8::MAX {
        entries.push(patterns.best_match(opcode, tie)?.map(|p| p.entry));
    }
    Ok(DecodeTable { entries })
}
