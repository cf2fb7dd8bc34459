//! Assembler, linker, and sandboxed emulator for a 64-bit toy ISA.
//!
//! This crate implements the full build-and-run pipeline:
//! 1. **Assembler:** two-pass translation of Intel-style source into
//!    relocatable object modules with symbol tables.
//! 2. **Linker:** segment layout, global symbol resolution, and
//!    relocation patching into a fixed-address executable image.
//! 3. **Emulator:** cycle-budgeted fetch-decode-execute interpretation
//!    in a private address space with virtualized stdio, aliased
//!    register views, x86-style flags, and an I/O privilege level.
//! 4. **Standard library:** a small embedded object set (`exit`,
//!    `abort`, `putc`, `puts`, `getc`) linked like any other module.

/// Shared data model (object modules, executables, errors, constants).
pub mod common;
/// Machine sizing configuration (address space, stack, heap).
pub mod config;
/// Instruction encoding: opcodes, mode bytes, register names.
pub mod isa;

/// Two-pass assembler and the embedded standard-library objects.
pub mod asm;
/// Object-module linker.
pub mod link;
/// The sandboxed machine emulator.
pub mod exec;

/// Assembles one source module; see [`asm::assemble`].
pub use crate::asm::{assemble, stdlib};
/// Shared error and image types.
pub use crate::common::{
    AssemblyError, Executable, Fault, LinkError, LoadError, ObjectModule, SegmentKind,
};
/// Machine sizing knobs; use `MachineConfig::default()` or deserialize.
pub use crate::config::MachineConfig;
/// The emulator and its observable run states.
pub use crate::exec::{Emulator, ExecMode, ExecutionState, StopReason, VirtStream};
/// Links object modules into an executable; see [`link::link`].
pub use crate::link::link;
