//! Machine configuration for the emulator.
//!
//! This module parameterizes the sandboxed address space. Values are
//! supplied by the host (deserialized from whatever format the binding
//! layer uses) or taken from [`MachineConfig::default`].

use serde::Deserialize;

/// Default machine configuration constants.
mod defaults {
    /// Address-space cap for a single emulator instance (64 MiB).
    ///
    /// `init` fails with a `LoadError` if the image plus stack and heap
    /// reservations would exceed this limit.
    pub const MAX_MEMORY: u64 = 64 * 1024 * 1024;

    /// Stack reservation appended above the heap (2 MiB).
    pub const STACK_SIZE: u64 = 2 * 1024 * 1024;

    /// Heap reservation appended after bss (4 MiB).
    pub const HEAP_SIZE: u64 = 4 * 1024 * 1024;
}

/// Sizing of an emulator instance's private address space.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Hard cap on the total address space, in bytes.
    pub max_memory: u64,
    /// Bytes reserved for the stack (grows down from the top of memory).
    pub stack_size: u64,
    /// Bytes reserved for the heap (placed immediately after bss).
    pub heap_size: u64,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            max_memory: defaults::MAX_MEMORY,
            stack_size: defaults::STACK_SIZE,
            heap_size: defaults::HEAP_SIZE,
        }
    }
}
