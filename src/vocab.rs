//! Closed vocabularies of the microcode language. Encodings must stay
//! bit-exact with the control unit.

use crate::word::{
    Field, CLR_ACY, FLAGS1, FLAGS2, FP, LD_ADDR, LD_AL, LD_T1, LD_T2,
};

#[derive(Debug, Clone, Copy)]
pub struct RegDesc {
    pub name: &'static str,
    pub index: u32,
}

/// Register bank, addressed directly by the microinstruction.
pub const REGISTERS: &[RegDesc] = &[
    RegDesc { name: "_b", index: 0b0000 },
    RegDesc { name: "_c", index: 0b0001 },
    RegDesc { name: "_d", index: 0b0010 },
    RegDesc { name: "_e", index: 0b0011 },
    RegDesc { name: "_h", index: 0b0100 },
    RegDesc { name: "_l", index: 0b0101 },
    RegDesc { name: "_f", index: 0b0110 },
    RegDesc { name: "_a", index: 0b0111 },
    RegDesc { name: "_ph", index: 0b1000 },
    RegDesc { name: "_pl", index: 0b1001 },
    RegDesc { name: "_x", index: 0b1010 },
    RegDesc { name: "_y", index: 0b1011 },
    RegDesc { name: "_z", index: 0b1100 },
    RegDesc { name: "_w", index: 0b1101 },
    RegDesc { name: "_sh", index: 0b1110 },
    RegDesc { name: "_sl", index: 0b1111 },
];

/// Register whose bank index comes from a field of the instruction register.
#[derive(Debug, Clone, Copy)]
pub struct IrAlias {
    pub name: &'static str,
    /// Value of RB_ADDR_SEL.
    pub select: u32,
    /// Value of RB_ADDR_MSB (upper half of a register pair).
    pub high: u32,
}

pub const IR_ALIASES: &[IrAlias] = &[
    IrAlias { name: "{s}", select: 0b01, high: 0 },
    IrAlias { name: "{d}", select: 0b10, high: 0 },
    IrAlias { name: "{p}0", select: 0b11, high: 0 },
    IrAlias { name: "{p}1", select: 0b11, high: 1 },
];

#[derive(Debug, Clone, Copy)]
pub struct AluOp {
    pub mnemonic: &'static str,
    pub code: u32,
}

/// ALU operations that take no operand and have no destination.
pub const ALU_0ARG: &[AluOp] = &[
    AluOp { mnemonic: "cpc", code: 0b101100 },
    AluOp { mnemonic: "sec", code: 0b101101 },
];

pub const ALU_1ARG: &[AluOp] = &[
    AluOp { mnemonic: "add", code: 0b001100 },
    AluOp { mnemonic: "adc", code: 0b001101 },
    AluOp { mnemonic: "sub", code: 0b001110 },
    AluOp { mnemonic: "sbb", code: 0b001111 },
    AluOp { mnemonic: "and", code: 0b000100 },
    AluOp { mnemonic: "orl", code: 0b000110 },
    AluOp { mnemonic: "not", code: 0b000111 },
    AluOp { mnemonic: "xrl", code: 0b000101 },
    AluOp { mnemonic: "rla", code: 0b000000 },
    AluOp { mnemonic: "rra", code: 0b000001 },
    AluOp { mnemonic: "rlca", code: 0b000010 },
    AluOp { mnemonic: "rrca", code: 0b000011 },
    AluOp { mnemonic: "aaa", code: 0b111000 },
    AluOp { mnemonic: "t1", code: 0b010111 },
    AluOp { mnemonic: "rst", code: 0b011111 },
    AluOp { mnemonic: "daa", code: 0b101000 },
    AluOp { mnemonic: "psw", code: 0b110000 },
];

/// A flag token and the literal it writes into its field. Flags that share a
/// field are mutually exclusive.
#[derive(Debug, Clone, Copy)]
pub struct FlagDesc {
    pub token: &'static str,
    pub field: Field,
    pub value: u32,
}

pub const FLAGS: &[FlagDesc] = &[
    FlagDesc { token: "#ld_al", field: LD_AL, value: 0b1 },
    FlagDesc { token: "#ld_addr", field: LD_ADDR, value: 0b1 },
    FlagDesc { token: "#fp_r", field: FP, value: 0b10 },
    FlagDesc { token: "#fp_c", field: FP, value: 0b01 },
    FlagDesc { token: "#fp_rc", field: FP, value: 0b11 },
    FlagDesc { token: "#clr_acy", field: CLR_ACY, value: 0b1 },
    FlagDesc { token: "#decode", field: FLAGS1, value: 0b001 },
    FlagDesc { token: "#ei", field: FLAGS1, value: 0b011 },
    FlagDesc { token: "#di", field: FLAGS1, value: 0b010 },
    FlagDesc { token: "#io", field: FLAGS1, value: 0b100 },
    FlagDesc { token: "#auxcy", field: FLAGS1, value: 0b101 },
    FlagDesc { token: "#clrt1", field: FLAGS1, value: 0b110 },
    FlagDesc { token: "#halt", field: FLAGS1, value: 0b111 },
    // flags2 = 010 and 100 are JSR and TJSR
    FlagDesc { token: "#end", field: FLAGS2, value: 0b001 },
    FlagDesc { token: "#ret", field: FLAGS2, value: 0b011 },
    FlagDesc { token: "#rd", field: FLAGS2, value: 0b101 },
    FlagDesc { token: "#wr", field: FLAGS2, value: 0b110 },
    FlagDesc { token: "#setacy", field: FLAGS2, value: 0b111 },
];

/// Load-enable bits selected by the operand stage destination.
pub const OPERAND_TARGETS: &[(&str, Field)] = &[("t1", LD_T1), ("t2", LD_T2)];

pub const DATA_IN: &str = "di";
pub const DATA_OUT: &str = "do";
pub const NOP: &str = "nop";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pragma {
    /// `__code <pattern>`: CPU opcode pattern decoded to the current address.
    Code,
    /// `__asm <text>`: CPU instruction mnemonic, for listings.
    Asm,
    Reset,
    Fetch,
    Halt,
}

impl Pragma {
    pub const ALL: &'static [Pragma] = &[
        Pragma::Code,
        Pragma::Asm,
        Pragma::Reset,
        Pragma::Fetch,
        Pragma::Halt,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Pragma::Code => "__code",
            Pragma::Asm => "__asm",
            Pragma::Reset => "__reset",
            Pragma::Fetch => "__fetch",
            Pragma::Halt => "__halt",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = keyword.to_ascii_lowercase();
        Self::ALL.iter().copied().find(|p| p.keyword() == keyword)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JumpKind {
    /// `JSR`: unconditional call, return address saved.
    Call,
    /// `TJSR`: conditional call.
    CondCall,
}

impl JumpKind {
    pub fn mnemonic(self) -> &'static str {
        match self {
            JumpKind::Call => "JSR",
            JumpKind::CondCall => "TJSR",
        }
    }

    /// Mnemonics are case-sensitive.
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        match s {
            "JSR" => Some(JumpKind::Call),
            "TJSR" => Some(JumpKind::CondCall),
            _ => None,
        }
    }

    /// Value of the flags2 field for this jump.
    pub fn flags2(self) -> u32 {
        match self {
            JumpKind::Call => 0b010,
            JumpKind::CondCall => 0b100,
        }
    }

    pub fn from_flags2(value: u32) -> Option<Self> {
        match value {
            0b010 => Some(JumpKind::Call),
            0b100 => Some(JumpKind::CondCall),
            _ => None,
        }
    }
}

pub fn register(name: &str) -> Option<&'static RegDesc> {
    REGISTERS.iter().find(|r| r.name == name)
}

pub fn register_by_index(index: u32) -> Option<&'static RegDesc> {
    REGISTERS.iter().find(|r| r.index == index)
}

pub fn ir_alias(name: &str) -> Option<&'static IrAlias> {
    IR_ALIASES.iter().find(|a| a.name == name)
}

pub fn ir_alias_by_select(select: u32, high: u32) -> Option<&'static IrAlias> {
    IR_ALIASES
        .iter()
        .find(|a| a.select == select && a.high == high)
}

pub fn alu_0arg(mnemonic: &str) -> Option<&'static AluOp> {
    ALU_0ARG.iter().find(|op| op.mnemonic == mnemonic)
}

pub fn alu_1arg(mnemonic: &str) -> Option<&'static AluOp> {
    ALU_1ARG.iter().find(|op| op.mnemonic == mnemonic)
}

pub fn flag(token: &str) -> Option<&'static FlagDesc> {
    FLAGS.iter().find(|f| f.token == token)
}

pub fn operand_target(name: &str) -> Option<Field> {
    OPERAND_TARGETS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, field)| *field)
}
