//! Instruction set encoding shared by the assembler and the emulator.
//!
//! This module is the single source of truth for the vex64 wire format:
//! 1. **Opcodes:** One byte per instruction (`opcodes`).
//! 2. **Registers:** Slot indices and assembly names (`registers`).
//! 3. **Operand forms:** The mode byte packing size, form, and
//!    high-byte selectors for data instructions.
//!
//! Data instructions are `[opcode][mode][operands]`. The mode byte is:
//!
//! ```text
//!   bit 7    unused
//!   bit 6    src operand is a high-byte register (ah..dh)
//!   bit 5    dst operand is a high-byte register
//!   bits 4-2 operand form (FORM_*)
//!   bits 1-0 size code (0/1/2/3 = 1/2/4/8 bytes)
//! ```
//!
//! Register pairs pack as `dst << 4 | src`. Memory operands encode as
//! `[base register byte, 0xFF for none][disp: i64 little-endian]`;
//! symbolic displacements are patched by width-8 absolute relocations.
//! Immediates are operand-sized. Control transfers carry rel32
//! displacements measured from the end of the field.

/// Instruction opcode bytes.
pub mod opcodes;
/// Register slot indices and assembly names.
pub mod registers;

/// Operand size of a data instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Size {
    /// 1 byte.
    Byte = 0,
    /// 2 bytes.
    Word = 1,
    /// 4 bytes.
    Dword = 2,
    /// 8 bytes.
    Qword = 3,
}

impl Size {
    /// Reconstructs a size from its 2-bit code.
    pub fn from_code(code: u8) -> Self {
        match code & 3 {
            0 => Self::Byte,
            1 => Self::Word,
            2 => Self::Dword,
            _ => Self::Qword,
        }
    }

    /// Width in bytes.
    pub fn bytes(self) -> u64 {
        1 << (self as u8)
    }

    /// Width in bits.
    pub fn bits(self) -> u32 {
        8 << (self as u8)
    }

    /// Mask covering the low `bits()` bits of a `u64`.
    pub fn mask(self) -> u64 {
        match self {
            Self::Qword => u64::MAX,
            _ => (1u64 << self.bits()) - 1,
        }
    }

    /// Sign bit of a value at this size.
    pub fn sign_bit(self) -> u64 {
        1u64 << (self.bits() - 1)
    }
}

/// Register-to-register form.
pub const FORM_RR: u8 = 0;
/// Register-destination, immediate-source form.
pub const FORM_RI: u8 = 1;
/// Register-destination, memory-source form.
pub const FORM_RM: u8 = 2;
/// Memory-destination, register-source form.
pub const FORM_MR: u8 = 3;
/// Memory-destination, immediate-source form.
pub const FORM_MI: u8 = 4;

/// Base-register byte marking a memory operand with no base register.
pub const NO_BASE: u8 = 0xFF;

/// Packs a mode byte from its fields.
pub fn pack_mode(form: u8, size: Size, dst_high: bool, src_high: bool) -> u8 {
    (size as u8) | (form << 2) | u8::from(dst_high) << 5 | u8::from(src_high) << 6
}

/// Unpacks a mode byte into `(form, size, dst_high, src_high)`.
pub fn unpack_mode(mode: u8) -> (u8, Size, bool, bool) {
    (
        (mode >> 2) & 0b111,
        Size::from_code(mode),
        mode & (1 << 5) != 0,
        mode & (1 << 6) != 0,
    )
}
