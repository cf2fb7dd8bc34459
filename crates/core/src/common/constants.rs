//! Image layout and address-space constants.
//!
//! These values fix the memory layout every linked executable and every
//! emulator instance agree on. They are part of the ABI: changing them
//! invalidates previously linked images.

/// Base address of the text segment in every linked image.
///
/// Everything below this address is a null guard: no access of any kind
/// is permitted there, so dereferencing a null or near-null pointer
/// faults instead of silently reading the image header area.
pub const TEXT_BASE: u64 = 0x1000;

/// Alignment applied between consecutive segments in the linked image.
pub const SEGMENT_ALIGN: u64 = 16;

/// Sentinel address pushed as the return address of the entry function.
///
/// This address is never mapped. When the instruction pointer lands on
/// it (normally via `ret` from the entry function), the emulator
/// terminates with the low 32 bits of `rax` as the exit status.
pub const EXIT_VECTOR: u64 = 0xFFFF_FFFF_FFFF_FF00;

/// Virtual file descriptor of the guest's standard input stream.
pub const FD_STDIN: u64 = 0;

/// Virtual file descriptor of the guest's standard output stream.
pub const FD_STDOUT: u64 = 1;

/// Virtual file descriptor of the guest's standard error stream.
pub const FD_STDERR: u64 = 2;

/// Rounds `value` up to the next multiple of `align` (a power of two).
pub const fn align_up(value: u64, align: u64) -> u64 {
    (value + align - 1) & !(align - 1)
}
