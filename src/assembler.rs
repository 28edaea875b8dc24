use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::decode_table::{synthesize, DecodeTable, OpcodePattern, PatternSet, TieBreak};
use crate::error::{AsmError, LoadError, ParseError};
use crate::parser::{parse_line, Line};
use crate::resolve::{resolve_jumps, Emitted, LabelTable, PendingJump};
use crate::vocab::Pragma;
use crate::word::{MicroWord, FLAGS2};

/// Total number of microinstructions in the control store.
pub const PROGRAM_LEN: usize = 512;
/// First address of the decoding table; authored code must fit below it.
pub const DECODE_BASE: usize = 256;

/// `NOP ; NOP ; #end`, used to fill the unused authored slots.
pub const PADDING_WORD: u32 = 0b001 << 26;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsmConfig {
    pub tie_break: TieBreak,
}

/// The finished control store: exactly [`PROGRAM_LEN`] words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MicroWord>", into = "Vec<MicroWord>")]
pub struct Program {
    words: Vec<MicroWord>,
}

impl Program {
    pub fn from_words(words: Vec<MicroWord>) -> Result<Self, LoadError> {
        if words.len() != PROGRAM_LEN {
            return Err(LoadError::WrongLength {
                got: words.len(),
                expected: PROGRAM_LEN,
            });
        }
        Ok(Self { words })
    }

    pub fn words(&self) -> &[MicroWord] {
        &self.words
    }

    pub fn get(&self, address: usize) -> Option<MicroWord> {
        self.words.get(address).copied()
    }

    /// The 256 decoding-table words.
    pub fn decode_region(&self) -> &[MicroWord] {
        &self.words[DECODE_BASE..]
    }
}

impl TryFrom<Vec<MicroWord>> for Program {
    type Error = LoadError;

    fn try_from(words: Vec<MicroWord>) -> Result<Self, Self::Error> {
        Self::from_words(words)
    }
}

impl From<Program> for Vec<MicroWord> {
    fn from(p: Program) -> Self {
        p.words
    }
}

/// A source line and the address of the word it produced, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLine {
    pub text: String,
    pub address: Option<u16>,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub program: Program,
    /// Number of authored words (addresses 0..authored).
    pub authored: usize,
    pub labels: LabelTable,
    pub patterns: PatternSet,
    pub decode: DecodeTable,
    /// `__asm` mnemonics by microaddress.
    pub mnemonics: BTreeMap<u16, String>,
    pub trace: Vec<TraceLine>,
}

/// State of one assembly run.
pub struct Assembler {
    cfg: AsmConfig,
    labels: LabelTable,
    patterns: PatternSet,
    mnemonics: BTreeMap<u16, String>,
    mnemonic_lines: HashMap<String, usize>,
    emitted: Vec<Emitted>,
    trace: Vec<TraceLine>,
}

impl Assembler {
    pub fn new(cfg: AsmConfig) -> Self {
        Self {
            cfg,
            labels: LabelTable::new(),
            patterns: PatternSet::new(),
            mnemonics: BTreeMap::new(),
            mnemonic_lines: HashMap::new(),
            emitted: Vec::new(),
            trace: Vec::new(),
        }
    }

    pub fn assemble(mut self, source: &str) -> Result<Assembly, AsmError> {
        let lines: Vec<&str> = source.lines().collect();

        debug!(lines = lines.len(), "pass 1");
        for (idx, raw) in lines.iter().enumerate() {
            let lineno = idx + 1;
            let address = self
                .pass1_line(lineno, raw)
                .map_err(|kind| AsmError::at(lineno, raw, kind))?;
            self.trace.push(TraceLine {
                text: raw.trim_end().to_string(),
                address,
            });
        }
        let authored = self.emitted.len();
        if authored > DECODE_BASE {
            return Err(AsmError::TooManyInstructions { count: authored });
        }

        debug!(jumps = self.emitted.iter().filter(|e| e.pending.is_some()).count(), "pass 2");
        let mut words = resolve_jumps(&self.emitted, &self.labels)?;

        words.resize(DECODE_BASE, MicroWord::from_raw(PADDING_WORD));

        if self.patterns.is_empty() {
            warn!("no __code patterns, every opcode decodes to microaddress 0");
        }
        let decode = synthesize(&self.patterns, self.cfg.tie_break).map_err(|amb| {
            let line = amb.second.line;
            AsmError::at(line, lines[line - 1], amb.into_parse_error())
        })?;
        words.extend(decode.words()?);
        debug_assert_eq!(words.len(), PROGRAM_LEN);
        let program = Program { words };

        info!(
            authored,
            labels = self.labels.len(),
            patterns = self.patterns.len(),
            decoded_opcodes = decode.matched(),
            "microcode assembled"
        );
        Ok(Assembly {
            program,
            authored,
            labels: self.labels,
            patterns: self.patterns,
            decode,
            mnemonics: self.mnemonics,
            trace: self.trace,
        })
    }

    fn next_address(&self) -> u16 {
        self.emitted.len() as u16
    }

    fn pass1_line(&mut self, lineno: usize, raw: &str) -> Result<Option<u16>, ParseError> {
        let Some(line) = parse_line(raw)? else {
            return Ok(None);
        };
        let here = self.next_address();
        match line {
            Line::Label(name) => {
                self.labels.define(&name, here, lineno)?;
                Ok(None)
            }
            Line::Pragma { pragma, params } => {
                self.pragma(pragma, &params, here, lineno)?;
                Ok(None)
            }
            Line::Jump { kind, label } => {
                let mut word = MicroWord::new();
                word.write(FLAGS2, kind.flags2())?;
                self.emit(
                    word,
                    lineno,
                    Some(PendingJump {
                        label,
                        line: lineno,
                        text: raw.trim_end().to_string(),
                    }),
                );
                Ok(Some(here))
            }
            Line::Instr(word) => {
                self.emit(word, lineno, None);
                Ok(Some(here))
            }
        }
    }

    fn emit(&mut self, word: MicroWord, line: usize, pending: Option<PendingJump>) {
        trace!(address = self.emitted.len(), word = %format!("{:032b}", word.raw()), line, "emit");
        self.emitted.push(Emitted {
            word,
            line,
            pending,
        });
    }

    fn pragma(&mut self, pragma: Pragma, params: &str, here: u16, lineno: usize) -> Result<(), ParseError> {
        match pragma {
            Pragma::Code => self
                .patterns
                .register(OpcodePattern::parse(params, here, lineno)?),
            Pragma::Asm => {
                if let Some(first_line) = self.mnemonic_lines.get(params) {
                    return Err(ParseError::DuplicateMnemonic {
                        mnemonic: params.to_string(),
                        first_line: *first_line,
                    });
                }
                self.mnemonic_lines.insert(params.to_string(), lineno);
                self.mnemonics.insert(here, params.to_string());
                Ok(())
            }
            Pragma::Reset | Pragma::Fetch | Pragma::Halt => Ok(()),
        }
    }
}

/// Assembles `source` with the default configuration.
pub fn assemble(source: &str) -> Result<Assembly, AsmError> {
    Assembler::new(AsmConfig::default()).assemble(source)
}

