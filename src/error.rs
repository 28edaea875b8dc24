use std::fmt;

/// Coarse classification of assembly failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    FlagConflict,
    UndefinedLabel,
    EncodingOverflow,
}

/// Failures of the bit packer. These point at a bug in the tables or in the
/// address bookkeeping, never at user input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("BUG! value {value} does not fit in {width} bits")]
    Overflow { value: u32, width: usize },
    #[error("BUG! field {field} is {expected} bits wide, got {got} bits")]
    WidthMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("BUG! jump target written into a non-jump microinstruction")]
    NotAJump,
}

/// Per-line errors raised while classifying and encoding a source line.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line has more than 3 fields")]
    TooManyFields,
    #[error("unexpected fields in {0} line")]
    UnexpectedFields(&'static str),
    #[error("invalid label '{0}'")]
    InvalidLabel(String),
    #[error("label '{label}' already defined in line {first_line}")]
    DuplicateLabel { label: String, first_line: usize },
    #[error("unknown pragma '{0}'")]
    UnknownPragma(String),
    #[error("invalid CPU opcode pattern '{0}'")]
    InvalidPattern(String),
    #[error("CPU opcode '{pattern}' already defined at line {first_line}")]
    DuplicatePattern { pattern: String, first_line: usize },
    #[error("CPU instruction '{mnemonic}' already defined at line {first_line}")]
    DuplicateMnemonic { mnemonic: String, first_line: usize },
    #[error("unknown microinstruction mnemonic '{0}'")]
    UnknownMnemonic(String),
    #[error("missing jump target")]
    MissingJumpTarget,
    #[error("invalid jump target '{0}', only labels are allowed")]
    InvalidJumpTarget(String),
    #[error("malformed operand control field")]
    MalformedOperand,
    #[error("wrong target register '{0}' in operand control field")]
    BadOperandTarget(String),
    #[error("invalid source '{0}' in operand control field")]
    BadOperandSource(String),
    #[error("malformed ALU control field")]
    MalformedAlu,
    #[error("wrong target register '{0}' in ALU control field")]
    BadAluTarget(String),
    #[error("unknown ALU operation '{0}'")]
    UnknownAluOp(String),
    #[error("malformed flag list")]
    MalformedFlagList,
    #[error("unknown flag '{0}'")]
    UnknownFlag(String),
    #[error("flag conflict: '{0}' targets a field that is already set")]
    FlagConflict(String),
    #[error("opcode {opcode:#04x} matched with equal specificity by '{first}' (line {first_line}) and '{second}'")]
    AmbiguousOpcode {
        opcode: u8,
        first: String,
        first_line: usize,
        second: String,
    },
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::FlagConflict(_) => ErrorKind::FlagConflict,
            ParseError::Encoding(_) => ErrorKind::EncodingOverflow,
            _ => ErrorKind::Syntax,
        }
    }
}

/// A jump whose label was never defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedLabel {
    pub line: usize,
    pub label: String,
    pub text: String,
}

impl fmt::Display for UndefinedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:error:undefined label '{}'.", self.line, self.label)
    }
}

/// Error returned by a whole assembly run. Any of these means no table was
/// produced.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("{line}:error:{kind}.")]
    Source {
        line: usize,
        text: String,
        #[source]
        kind: ParseError,
    },
    #[error("{} undefined label(s): {}", .0.len(), undefined_names(.0))]
    UndefinedLabels(Vec<UndefinedLabel>),
    #[error("{count} microinstructions do not fit below the decoding table (max 256)")]
    TooManyInstructions { count: usize },
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

fn undefined_names(list: &[UndefinedLabel]) -> String {
    list.iter()
        .map(|u| format!("'{}' (line {})", u.label, u.line))
        .collect::<Vec<_>>()
        .join(", ")
}

impl AsmError {
    pub(crate) fn at(line: usize, text: &str, kind: ParseError) -> Self {
        AsmError::Source {
            line,
            text: text.trim_end().to_string(),
            kind,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AsmError::Source { kind, .. } => kind.kind(),
            AsmError::UndefinedLabels(_) => ErrorKind::UndefinedLabel,
            AsmError::TooManyInstructions { .. } | AsmError::Encoding(_) => {
                ErrorKind::EncodingOverflow
            }
        }
    }

    /// Source line the error is attributed to, if it has a single one.
    pub fn line(&self) -> Option<usize> {
        match self {
            AsmError::Source { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Errors reading back a rendered microcode table.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("microcode table has {got} words, expected {expected}")]
    WrongLength { got: usize, expected: usize },
    #[error("line {line}: malformed microinstruction literal '{text}'")]
    BadLiteral { line: usize, text: String },
    #[error("malformed JSON table: {0}")]
    Json(String),
}
