//! Common types shared by the assembler, linker, and emulator.
//!
//! This module holds the data model and error taxonomy of the
//! toolchain:
//! 1. **Object model:** Segments, symbols, relocations, object modules.
//! 2. **Executable model:** The linked image and its layout contract.
//! 3. **Errors:** Build-time errors and runtime faults.
//! 4. **Constants:** Address-space layout shared by linker and emulator.

/// Image layout and address-space constants.
pub mod constants;
/// Error taxonomy (assembly, link, load, runtime fault).
pub mod error;
/// Linked executable image.
pub mod executable;
/// Relocatable object module model.
pub mod object;

pub use error::{AssemblyError, Fault, LinkError, LoadError};
pub use executable::Executable;
pub use object::{ObjectModule, RelocKind, Relocation, SegmentKind, Symbol, Visibility};
