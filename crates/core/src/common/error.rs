//! Error taxonomy for the assembler, linker, loader, and emulator.
//!
//! This module defines the four error families of the toolchain:
//! 1. **`AssemblyError`:** Build-time, carries source line and column.
//! 2. **`LinkError`:** Build-time symbol and relocation failures.
//! 3. **`LoadError`:** Raised by `Emulator::init` before execution.
//! 4. **`Fault`:** Runtime faults; captured as the `Error` terminal
//!    state of the emulator rather than propagated as a panic.
//!
//! Build-time errors are returned synchronously and prevent an invalid
//! `Executable` or emulator image from ever existing. Runtime faults
//! never crash the interpreting process.

use thiserror::Error;

use super::object::SegmentKind;

/// Error produced while assembling a source module.
///
/// Positions are 1-based; `col` points at the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{module}:{line}:{col}: {message}")]
pub struct AssemblyError {
    /// Name of the module being assembled.
    pub module: String,
    /// 1-based source line of the error.
    pub line: u32,
    /// 1-based column of the offending token.
    pub col: u32,
    /// Human-readable description of the problem.
    pub message: String,
}

impl AssemblyError {
    /// Creates an assembly error at the given position.
    ///
    /// The module name is filled in by the assembler driver; parsing
    /// helpers construct errors with an empty module field.
    pub fn new(line: u32, col: u32, message: impl Into<String>) -> Self {
        Self {
            module: String::new(),
            line,
            col,
            message: message.into(),
        }
    }
}

/// Error produced while linking object modules into an executable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The same global symbol is defined by more than one module.
    #[error("duplicate global symbol `{name}` (defined in `{first}` and `{second}`)")]
    DuplicateSymbol {
        /// The clashing symbol name.
        name: String,
        /// Module that defined the symbol first.
        first: String,
        /// Module that defined it again.
        second: String,
    },

    /// An `extern` reference matched no global definition in the input set.
    #[error("unresolved symbol `{name}` referenced by `{module}`")]
    UnresolvedSymbol {
        /// The unresolved symbol name.
        name: String,
        /// Module containing the dangling reference.
        module: String,
    },

    /// A relocation's computed value does not fit in its declared width.
    #[error("relocation against `{symbol}` overflows {width}-byte field (value {value:#x})")]
    RelocationOverflow {
        /// Symbol the relocation targets.
        symbol: String,
        /// Declared patch width in bytes.
        width: u8,
        /// The value that failed to fit.
        value: i128,
    },

    /// The requested entry point could not be resolved.
    #[error("entry symbol `{name}` not found in {segment} segment")]
    BadEntryPoint {
        /// Segment the entry symbol was required to live in.
        segment: SegmentKind,
        /// The entry symbol name.
        name: String,
    },
}

/// Error produced by `Emulator::init` when loading an executable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Segments plus stack/heap reservation exceed the configured address space.
    #[error("image requires {required:#x} bytes but the address space is capped at {limit:#x}")]
    AddressSpaceExceeded {
        /// Total footprint the image would need.
        required: u64,
        /// Configured address-space limit.
        limit: u64,
    },

    /// The executable's entry address does not fall inside its text segment.
    #[error("entry address {entry:#x} lies outside the text segment")]
    EntryOutOfRange {
        /// The offending entry address.
        entry: u64,
    },

    /// The executable's segment layout is internally inconsistent.
    ///
    /// `Executable` has public fields and may be deserialized, so the
    /// loader validates the layout instead of trusting it.
    #[error("malformed executable image: {detail}")]
    MalformedImage {
        /// What the layout validation rejected.
        detail: &'static str,
    },
}

/// Unrecoverable runtime fault raised by guest execution.
///
/// A fault moves the emulator into its `Error` terminal state; the host
/// may still inspect registers, flags, and memory for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// Fetched byte sequence is not a valid instruction encoding.
    #[error("illegal instruction at {addr:#x} (opcode {opcode:#04x})")]
    IllegalInstruction {
        /// Address of the instruction.
        addr: u64,
        /// The rejected opcode byte.
        opcode: u8,
    },

    /// Memory access outside the mapped address space.
    #[error("memory access violation at {addr:#x} ({len} bytes)")]
    MemoryViolation {
        /// Faulting address.
        addr: u64,
        /// Access length in bytes.
        len: u64,
    },

    /// Write into the read-only text region or the null guard.
    #[error("write to read-only memory at {addr:#x}")]
    ReadOnlyViolation {
        /// Faulting address.
        addr: u64,
    },

    /// Instruction fetch from a non-executable address.
    #[error("instruction fetch from non-executable address {addr:#x}")]
    FetchViolation {
        /// Faulting instruction pointer.
        addr: u64,
    },

    /// Stack push below the reserved stack region.
    #[error("stack overflow (rsp would reach {sp:#x})")]
    StackOverflow {
        /// Stack pointer value that crossed the limit.
        sp: u64,
    },

    /// Integer division by zero, or a quotient that cannot be represented.
    #[error("arithmetic fault at {addr:#x}: {reason}")]
    ArithmeticFault {
        /// Address of the faulting instruction.
        addr: u64,
        /// Short description (`divide by zero`, `divide overflow`).
        reason: &'static str,
    },

    /// Privileged operation attempted with insufficient I/O privilege.
    #[error("privilege violation at {addr:#x}: IOPL {iopl} is insufficient")]
    PrivilegeViolation {
        /// Address of the faulting instruction.
        addr: u64,
        /// I/O privilege level at the time of the fault.
        iopl: u8,
    },

    /// System call number with no handler.
    #[error("unknown syscall {number}")]
    UnknownSyscall {
        /// The unrecognized syscall number (`rax`).
        number: u64,
    },
}
