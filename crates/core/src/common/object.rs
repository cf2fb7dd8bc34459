//! Relocatable object module data model.
//!
//! An [`ObjectModule`] is the assembler's output and the linker's input:
//! raw segment bytes plus the symbol table and relocation list needed to
//! place the module at an arbitrary base address. Modules are immutable
//! once produced and serde-serializable so hosts can cache or ship them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The three logical memory regions of a module or image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Executable code. Read-only at run time.
    Text,
    /// Initialized data.
    Data,
    /// Zero-initialized data; occupies no bytes in the object module.
    Bss,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Data => write!(f, "data"),
            Self::Bss => write!(f, "bss"),
        }
    }
}

/// Symbol visibility across module boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    /// Resolvable only within the defining module.
    Local,
    /// Exported; must be unique across the whole link.
    Global,
    /// Imported; must be satisfied by some other module's global.
    Extern,
}

/// A symbol table entry.
///
/// For `Extern` symbols the segment and offset carry no meaning; the
/// defining module supplies them at link time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Segment the symbol is defined in.
    pub segment: SegmentKind,
    /// Offset within that segment, in bytes.
    pub offset: u64,
    /// Cross-module visibility.
    pub visibility: Visibility,
}

/// How a relocation value is computed from the resolved symbol address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelocKind {
    /// Patch with the symbol's absolute address.
    Absolute,
    /// Patch with `symbol - end_of_field`, i.e. a displacement relative
    /// to the address immediately after the patched bytes.
    Relative,
}

/// A pending patch applied exactly once at link time.
///
/// The patch site's existing little-endian contents act as an addend:
/// the linker adds the computed value into the field and range-checks
/// the sum against `width`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    /// Segment containing the patch site.
    pub segment: SegmentKind,
    /// Offset of the patch site within that segment.
    pub offset: u64,
    /// Name of the symbol whose address is patched in.
    pub symbol: String,
    /// Width of the patch site in bytes (1, 2, 4, or 8).
    pub width: u8,
    /// Absolute or relative computation.
    pub kind: RelocKind,
}

/// A relocatable unit of code and data produced by the assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectModule {
    /// Module name, used in link diagnostics.
    pub name: String,
    /// Encoded text (code) bytes.
    pub text: Vec<u8>,
    /// Initialized data bytes.
    pub data: Vec<u8>,
    /// Size of the zero-initialized region in bytes.
    pub bss_len: u64,
    /// Symbol table keyed by name; unique per module by construction.
    pub symbols: BTreeMap<String, Symbol>,
    /// Relocations to apply once final addresses are known.
    pub relocations: Vec<Relocation>,
}

impl ObjectModule {
    /// Creates an empty module with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Vec::new(),
            data: Vec::new(),
            bss_len: 0,
            symbols: BTreeMap::new(),
            relocations: Vec::new(),
        }
    }

    /// Returns the byte length of the given segment within this module.
    pub fn segment_len(&self, segment: SegmentKind) -> u64 {
        match segment {
            SegmentKind::Text => self.text.len() as u64,
            SegmentKind::Data => self.data.len() as u64,
            SegmentKind::Bss => self.bss_len,
        }
    }
}
