//! Linked executable image data model.
//!
//! An [`Executable`] is the linker's output: fully resolved segment
//! bytes placed at fixed absolute bases, an entry address, and an
//! optional debug symbol table. It is immutable and may be shared
//! read-only across any number of emulator instances.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A fully linked, immutable executable image.
///
/// Layout convention (fixed, see `common::constants`): a null guard
/// below `TEXT_BASE`, then text, data, and bss each aligned to
/// `SEGMENT_ALIGN`, in that order. The emulator appends heap and stack
/// beyond `image_end()` in its private copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Executable {
    /// Merged text segment bytes, based at `text_base`.
    pub text: Vec<u8>,
    /// Merged initialized-data bytes, based at `data_base`.
    pub data: Vec<u8>,
    /// Total zero-initialized length, based at `bss_base`.
    pub bss_len: u64,
    /// Absolute base address of the text segment.
    pub text_base: u64,
    /// Absolute base address of the data segment.
    pub data_base: u64,
    /// Absolute base address of the bss segment.
    pub bss_base: u64,
    /// Absolute address execution starts at.
    pub entry: u64,
    /// Optional debug map of every linked symbol to its absolute address.
    pub debug_symbols: Option<BTreeMap<String, u64>>,
}

impl Executable {
    /// First address past the last image-defined byte (end of bss).
    pub fn image_end(&self) -> u64 {
        self.bss_base + self.bss_len
    }

    /// First address past the text segment.
    pub fn text_end(&self) -> u64 {
        self.text_base + self.text.len() as u64
    }
}
