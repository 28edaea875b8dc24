pub mod assembler;
pub mod decode_table;
pub mod disasm;
pub mod error;
pub mod listing;
pub mod parser;
pub mod render;
pub mod resolve;
pub mod vocab;
pub mod word;

pub use assembler::{assemble, AsmConfig, Assembler, Assembly, Program, DECODE_BASE, PROGRAM_LEN};
pub use decode_table::TieBreak;
pub use error::{AsmError, ErrorKind, LoadError, ParseError};
pub use word::MicroWord;
