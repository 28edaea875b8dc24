//! Fixed 32-bit microinstruction word and the bit-level packing primitives.
//!
//! Bits are addressed MSB-first: a [`Field`] names its most significant bit
//! index (31 is the top bit of the word) and its width.

use std::fmt;
use std::ops::Range;

use bitflags::bitflags;
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::EncodingError;
use crate::vocab::JumpKind;

pub const WORD_BITS: usize = 32;

/// Width of a jump target (microaddresses 0..255 inside the authored region).
pub const JUMP_TARGET_BITS: usize = 8;

type Bits = BitArray<[u32; 1], Msb0>;

/// A named bit range inside a microinstruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: &'static str,
    pub msb: u8,
    pub width: u8,
}

impl Field {
    pub const fn new(name: &'static str, msb: u8, width: u8) -> Self {
        assert!((msb as usize) < WORD_BITS, "field msb outside the word");
        assert!(width >= 1 && width <= msb + 1, "field runs past bit 0");
        Self { name, msb, width }
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    /// Index range of the field in MSB-first order.
    pub fn range(&self) -> Range<usize> {
        let start = WORD_BITS - 1 - self.msb as usize;
        start..start + self.width as usize
    }

    pub fn mask(&self) -> u32 {
        let ones = if self.width as usize == WORD_BITS {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        };
        ones << (self.msb + 1 - self.width)
    }
}

// Field layout of the light8080 control word. Some fields alias on purpose:
// ALU_OP and JUMP_DST_L share bits 5..0 (jumps carry no ALU operation), and
// RB_ADDR_MSB is the low bit of RB_ADDR when the address comes from the IR.
pub const FLAGS1: Field = Field::new("flags1", 31, 3);
pub const FLAGS2: Field = Field::new("flags2", 28, 3);
pub const LD_ADDR: Field = Field::new("ld_addr", 25, 1);
pub const LD_AL: Field = Field::new("ld_al", 24, 1);
pub const LD_T1: Field = Field::new("ld_t1", 23, 1);
pub const LD_T2: Field = Field::new("ld_t2", 22, 1);
pub const MUX_IN: Field = Field::new("mux_in", 21, 1);
pub const RB_ADDR_SEL: Field = Field::new("rb_addr_sel", 20, 2);
pub const RB_ADDR: Field = Field::new("rb_addr", 18, 4);
pub const RB_ADDR_MSB: Field = Field::new("rb_addr_msb", 15, 1);
pub const CLR_ACY: Field = Field::new("clr_acy", 14, 1);
pub const JUMP_DST_H: Field = Field::new("jump_dst_h", 11, 2);
pub const FP: Field = Field::new("fp", 9, 2);
pub const DO_WE: Field = Field::new("do_we", 7, 1);
pub const RB_WE: Field = Field::new("rb_we", 6, 1);
pub const ALU_OP: Field = Field::new("alu_op", 5, 6);
pub const JUMP_DST_L: Field = Field::new("jump_dst_l", 5, 6);

bitflags! {
/// Single-bit control lines of a microinstruction, at their word positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlLines: u32 {
const LD_ADDR = 1 << 25;
const LD_AL = 1 << 24;
const LD_T1 = 1 << 23;
const LD_T2 = 1 << 22;
const MUX_IN = 1 << 21;
const RB_ADDR_MSB = 1 << 15;
const CLR_ACY = 1 << 14;
const DO_WE = 1 << 7;
const RB_WE = 1 << 6;
}
}

/// Which of the two mutually exclusive layouts a word uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrClass {
    /// Operand/ALU/flag control; bits 5..0 hold the ALU operation.
    Plain,
    /// JSR or TJSR; bits 11..10 and 5..0 hold the target microaddress.
    Jump(JumpKind),
}

/// One 32-bit microinstruction.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct MicroWord {
    bits: Bits,
}

impl MicroWord {
    pub fn new() -> Self {
        Self::from_raw(0)
    }

    pub fn from_raw(raw: u32) -> Self {
        Self {
            bits: BitArray::new([raw]),
        }
    }

    pub fn raw(&self) -> u32 {
        self.bits.into_inner()[0]
    }

    /// Writes `value` into `field`, failing if it does not fit.
    pub fn write(&mut self, field: Field, value: u32) -> Result<(), EncodingError> {
        let bits = int_to_bits(value, field.width())?;
        set_field(self, field, &bits)
    }

    pub fn read(&self, field: Field) -> u32 {
        read_field(self, field)
    }

    pub fn is_set(&self, field: Field) -> bool {
        is_field_nonzero(self, field)
    }

    pub fn lines(&self) -> ControlLines {
        ControlLines::from_bits_truncate(self.raw())
    }

    /// A jump word with the given target already encoded.
    pub fn jump(kind: JumpKind, target: u16) -> Result<Self, EncodingError> {
        let mut word = Self::new();
        word.write(FLAGS2, kind.flags2())?;
        word.set_jump_target(target)?;
        Ok(word)
    }

    pub fn class(&self) -> InstrClass {
        match JumpKind::from_flags2(self.read(FLAGS2)) {
            Some(kind) => InstrClass::Jump(kind),
            None => InstrClass::Plain,
        }
    }

    /// Patches the target of a jump word. The target is split into the two
    /// high bits (JUMP_DST_H) and six low bits (JUMP_DST_L).
    pub fn set_jump_target(&mut self, target: u16) -> Result<(), EncodingError> {
        if self.class() == InstrClass::Plain {
            return Err(EncodingError::NotAJump);
        }
        let bits = int_to_bits(u32::from(target), JUMP_TARGET_BITS)?;
        let split = JUMP_DST_H.width();
        set_field(self, JUMP_DST_H, &bits[..split])?;
        set_field(self, JUMP_DST_L, &bits[split..])
    }

    pub fn jump_target(&self) -> Option<u16> {
        match self.class() {
            InstrClass::Plain => None,
            InstrClass::Jump(_) => {
                let hi = self.read(JUMP_DST_H);
                let lo = self.read(JUMP_DST_L);
                Some(((hi << JUMP_DST_L.width) | lo) as u16)
            }
        }
    }
}

impl Default for MicroWord {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u32> for MicroWord {
    fn from(raw: u32) -> Self {
        Self::from_raw(raw)
    }
}

impl From<MicroWord> for u32 {
    fn from(word: MicroWord) -> Self {
        word.raw()
    }
}

impl PartialEq for MicroWord {
    fn eq(&self, other: &Self) -> bool {
        self.raw() == other.raw()
    }
}

impl Eq for MicroWord {}

impl std::hash::Hash for MicroWord {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw().hash(state);
    }
}

impl fmt::Debug for MicroWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MicroWord({:032b})", self.raw())
    }
}

impl fmt::Binary for MicroWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.raw(), f)
    }
}

impl fmt::LowerHex for MicroWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.raw(), f)
    }
}

/// Writes `bits` (MSB first) into `field` of `word`.
pub fn set_field(
    word: &mut MicroWord,
    field: Field,
    bits: &BitSlice<u32, Msb0>,
) -> Result<(), EncodingError> {
    if bits.len() != field.width() {
        return Err(EncodingError::WidthMismatch {
            field: field.name,
            expected: field.width(),
            got: bits.len(),
        });
    }
    word.bits[field.range()].copy_from_bitslice(bits);
    Ok(())
}

pub fn is_field_nonzero(word: &MicroWord, field: Field) -> bool {
    word.bits[field.range()].any()
}

pub fn read_field(word: &MicroWord, field: Field) -> u32 {
    word.bits[field.range()].load_be::<u32>()
}

/// Unsigned binary encoding of `value` in exactly `width` bits, MSB first.
pub fn int_to_bits(value: u32, width: usize) -> Result<BitVec<u32, Msb0>, EncodingError> {
    if width == 0 || width > WORD_BITS || (width < WORD_BITS && value >> width != 0) {
        return Err(EncodingError::Overflow { value, width });
    }
    let mut bits = BitVec::<u32, Msb0>::repeat(false, width);
    bits.store_be(value);
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_lines_match_field_layout() {
        let singles = [
            (LD_ADDR, ControlLines::LD_ADDR),
            (LD_AL, ControlLines::LD_AL),
            (LD_T1, ControlLines::LD_T1),
            (LD_T2, ControlLines::LD_T2),
            (MUX_IN, ControlLines::MUX_IN),
            (RB_ADDR_MSB, ControlLines::RB_ADDR_MSB),
            (CLR_ACY, ControlLines::CLR_ACY),
            (DO_WE, ControlLines::DO_WE),
            (RB_WE, ControlLines::RB_WE),
        ];
        for (field, line) in singles {
            assert_eq!(field.mask(), line.bits(), "{}", field.name);
        }
    }

    #[test]
    fn field_range_is_msb_first() {
        assert_eq!(FLAGS1.range(), 0..3);
        assert_eq!(ALU_OP.range(), 26..32);
        assert_eq!(FLAGS2.mask(), 0x1C00_0000);
    }
}
