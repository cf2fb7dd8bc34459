//! Opcode byte assignments.
//!
//! Grouped by function: system, data movement, arithmetic/logic,
//! control transfer, and flag manipulation. Condition-code nibbles for
//! `Jcc` follow the classic signed/unsigned encoding so the assembler
//! and emulator share one table.

/// No operation.
pub const NOP: u8 = 0x00;
/// Halt; privileged. Terminates with `eax` as the exit status.
pub const HLT: u8 = 0x01;
/// System call; number in `rax`.
pub const SYSCALL: u8 = 0x02;
/// Return: pop the instruction pointer.
pub const RET: u8 = 0x03;
/// Push a 64-bit register or immediate.
pub const PUSH: u8 = 0x04;
/// Pop 64 bits into a register.
pub const POP: u8 = 0x05;

/// Move (binary forms).
pub const MOV: u8 = 0x06;
/// Load effective address into a 64-bit register.
pub const LEA: u8 = 0x07;

/// Integer add.
pub const ADD: u8 = 0x10;
/// Integer subtract.
pub const SUB: u8 = 0x11;
/// Compare (subtract, flags only).
pub const CMP: u8 = 0x12;
/// Bitwise and.
pub const AND: u8 = 0x13;
/// Bitwise or.
pub const OR: u8 = 0x14;
/// Bitwise exclusive or.
pub const XOR: u8 = 0x15;
/// Bit test (and, flags only).
pub const TEST: u8 = 0x16;
/// Unsigned multiply.
pub const MUL: u8 = 0x17;
/// Signed multiply.
pub const IMUL: u8 = 0x18;
/// Unsigned divide; faults on a zero divisor.
pub const DIV: u8 = 0x19;
/// Signed divide; faults on a zero divisor or quotient overflow.
pub const IDIV: u8 = 0x1A;

/// Increment by one (carry flag preserved).
pub const INC: u8 = 0x20;
/// Decrement by one (carry flag preserved).
pub const DEC: u8 = 0x21;
/// Two's-complement negate.
pub const NEG: u8 = 0x22;
/// Bitwise complement.
pub const NOT: u8 = 0x23;

/// Shift left.
pub const SHL: u8 = 0x28;
/// Logical shift right.
pub const SHR: u8 = 0x29;
/// Arithmetic shift right.
pub const SAR: u8 = 0x2A;

/// Unconditional jump (rel32).
pub const JMP: u8 = 0x30;
/// Conditional jump (`[cc][rel32]`).
pub const JCC: u8 = 0x31;
/// Call (rel32): push return address, then jump.
pub const CALL: u8 = 0x32;

/// Set carry flag.
pub const STC: u8 = 0x40;
/// Clear carry flag.
pub const CLC: u8 = 0x41;
/// Complement carry flag.
pub const CMC: u8 = 0x42;
/// Set direction flag.
pub const STD: u8 = 0x43;
/// Clear direction flag.
pub const CLD: u8 = 0x44;
/// Set interrupt-enable flag; privileged.
pub const STI: u8 = 0x45;
/// Clear interrupt-enable flag; privileged.
pub const CLI: u8 = 0x46;
/// Push the packed flags word.
pub const PUSHF: u8 = 0x47;
/// Pop the packed flags word; privileged when it would change IF/TF/IOPL.
pub const POPF: u8 = 0x48;

/// Condition-code nibbles used by `JCC`.
pub mod cond {
    /// Overflow.
    pub const O: u8 = 0x0;
    /// No overflow.
    pub const NO: u8 = 0x1;
    /// Below (unsigned).
    pub const B: u8 = 0x2;
    /// Above or equal (unsigned).
    pub const AE: u8 = 0x3;
    /// Equal / zero.
    pub const E: u8 = 0x4;
    /// Not equal / not zero.
    pub const NE: u8 = 0x5;
    /// Below or equal (unsigned).
    pub const BE: u8 = 0x6;
    /// Above (unsigned).
    pub const A: u8 = 0x7;
    /// Sign.
    pub const S: u8 = 0x8;
    /// No sign.
    pub const NS: u8 = 0x9;
    /// Parity even.
    pub const P: u8 = 0xA;
    /// Parity odd.
    pub const NP: u8 = 0xB;
    /// Less (signed).
    pub const L: u8 = 0xC;
    /// Greater or equal (signed).
    pub const GE: u8 = 0xD;
    /// Less or equal (signed).
    pub const LE: u8 = 0xE;
    /// Greater (signed).
    pub const G: u8 = 0xF;
}
