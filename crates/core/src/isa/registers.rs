//! Register slot indices and assembly-name resolution.
//!
//! The machine has 16 general-purpose 64-bit slots. Assembly names
//! follow the familiar x86-64 convention: each slot is addressable at
//! 64/32/16/8 bits, and slots 0-3 additionally expose the high byte of
//! their low word (`ah`..`dh`).

use super::Size;

/// `rax` slot index.
pub const RAX: u8 = 0;
/// `rbx` slot index.
pub const RBX: u8 = 1;
/// `rcx` slot index.
pub const RCX: u8 = 2;
/// `rdx` slot index.
pub const RDX: u8 = 3;
/// `rsi` slot index.
pub const RSI: u8 = 4;
/// `rdi` slot index.
pub const RDI: u8 = 5;
/// `rbp` slot index.
pub const RBP: u8 = 6;
/// `rsp` slot index.
pub const RSP: u8 = 7;
/// `r8` slot index.
pub const R8: u8 = 8;
/// `r15` slot index.
pub const R15: u8 = 15;

/// Number of general-purpose register slots.
pub const NUM_GPRS: usize = 16;

/// A register operand as written in assembly: slot, access size, and
/// whether it names the high byte of the low word (`ah`..`dh`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegOperand {
    /// Slot index (0-15).
    pub index: u8,
    /// Access width.
    pub size: Size,
    /// High-byte view; only valid for slots 0-3 at byte size.
    pub high: bool,
}

/// Resolves an assembly register name to its slot, size, and byte half.
///
/// Returns `None` if the name is not a register.
pub fn lookup(name: &str) -> Option<RegOperand> {
    let (index, size, high) = match name {
        "rax" => (RAX, Size::Qword, false),
        "rbx" => (RBX, Size::Qword, false),
        "rcx" => (RCX, Size::Qword, false),
        "rdx" => (RDX, Size::Qword, false),
        "rsi" => (RSI, Size::Qword, false),
        "rdi" => (RDI, Size::Qword, false),
        "rbp" => (RBP, Size::Qword, false),
        "rsp" => (RSP, Size::Qword, false),
        "eax" => (RAX, Size::Dword, false),
        "ebx" => (RBX, Size::Dword, false),
        "ecx" => (RCX, Size::Dword, false),
        "edx" => (RDX, Size::Dword, false),
        "esi" => (RSI, Size::Dword, false),
        "edi" => (RDI, Size::Dword, false),
        "ebp" => (RBP, Size::Dword, false),
        "esp" => (RSP, Size::Dword, false),
        "ax" => (RAX, Size::Word, false),
        "bx" => (RBX, Size::Word, false),
        "cx" => (RCX, Size::Word, false),
        "dx" => (RDX, Size::Word, false),
        "si" => (RSI, Size::Word, false),
        "di" => (RDI, Size::Word, false),
        "bp" => (RBP, Size::Word, false),
        "sp" => (RSP, Size::Word, false),
        "al" => (RAX, Size::Byte, false),
        "bl" => (RBX, Size::Byte, false),
        "cl" => (RCX, Size::Byte, false),
        "dl" => (RDX, Size::Byte, false),
        "sil" => (RSI, Size::Byte, false),
        "dil" => (RDI, Size::Byte, false),
        "bpl" => (RBP, Size::Byte, false),
        "spl" => (RSP, Size::Byte, false),
        "ah" => (RAX, Size::Byte, true),
        "bh" => (RBX, Size::Byte, true),
        "ch" => (RCX, Size::Byte, true),
        "dh" => (RDX, Size::Byte, true),
        _ => return lookup_numbered(name),
    };
    Some(RegOperand { index, size, high })
}

/// Resolves `r8`..`r15` and their `d`/`w`/`b` sub-views.
fn lookup_numbered(name: &str) -> Option<RegOperand> {
    let rest = name.strip_prefix('r')?;
    let (num, size) = match rest.strip_suffix('d') {
        Some(n) => (n, Size::Dword),
        None => match rest.strip_suffix('w') {
            Some(n) => (n, Size::Word),
            None => match rest.strip_suffix('b') {
                Some(n) => (n, Size::Byte),
                None => (rest, Size::Qword),
            },
        },
    };
    let index: u8 = num.parse().ok()?;
    if (8..=15).contains(&index) {
        Some(RegOperand {
            index,
            size,
            high: false,
        })
    } else {
        None
    }
}
