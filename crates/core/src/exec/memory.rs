//! Flat guest address space with segment permission checks.
//!
//! The guest sees one contiguous range starting at the text base:
//!
//! 1. **text**: executable image bytes, readable but never writable.
//! 2. **data + bss**: initialized bytes followed by a zeroed region.
//! 3. **heap**: zeroed scratch space above the image.
//! 4. **stack**: at the top of the range, growing downward.
//!
//! Everything below the text base is unmapped, so null and small
//! pointers fault on any access. Loads are legal anywhere in the
//! mapped range, stores only at or above the data base, and fetches
//! only inside text.

use crate::common::{Executable, Fault, LoadError};
use crate::common::constants::{align_up, EXIT_VECTOR, SEGMENT_ALIGN};
use crate::config::MachineConfig;

/// The emulated address space, sized at load time from an
/// [`Executable`] and a [`MachineConfig`].
#[derive(Debug, Clone)]
pub struct Memory {
    bytes: Vec<u8>,
    text_base: u64,
    text_end: u64,
    data_base: u64,
    heap_base: u64,
    stack_base: u64,
    limit: u64,
}

impl Memory {
    /// Lays out and populates the address space for `exe`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::AddressSpaceExceeded`] when the image plus
    /// the configured heap and stack would not fit in
    /// `config.max_memory`, [`LoadError::EntryOutOfRange`] when the
    /// entry point lies outside the text segment, and
    /// [`LoadError::MalformedImage`] when the segment bases are
    /// inconsistent with the segment contents. `Executable` fields are
    /// public (and deserializable), so nothing here is trusted.
    pub fn load(exe: &Executable, config: &MachineConfig) -> Result<Self, LoadError> {
        const fn malformed(detail: &'static str) -> LoadError {
            LoadError::MalformedImage { detail }
        }

        let text_base = exe.text_base;
        if text_base == 0 {
            return Err(malformed("text base overlaps the null guard"));
        }
        let text_end = text_base
            .checked_add(exe.text.len() as u64)
            .ok_or(malformed("text segment wraps the address space"))?;
        if exe.data_base < text_end {
            return Err(malformed("data segment overlaps text"));
        }
        let data_end = exe
            .data_base
            .checked_add(exe.data.len() as u64)
            .ok_or(malformed("data segment wraps the address space"))?;
        if exe.bss_base < data_end {
            return Err(malformed("bss segment overlaps data"));
        }
        let image_end = exe
            .bss_base
            .checked_add(exe.bss_len)
            .ok_or(malformed("bss segment wraps the address space"))?;

        let limit = image_end
            .checked_add(SEGMENT_ALIGN - 1)
            .map(|v| v & !(SEGMENT_ALIGN - 1))
            .and_then(|heap| heap.checked_add(config.heap_size))
            .and_then(|stack| stack.checked_add(config.stack_size))
            .ok_or(malformed("image layout wraps the address space"))?;
        let heap_base = align_up(image_end, SEGMENT_ALIGN);
        let stack_base = heap_base + config.heap_size;
        if limit > EXIT_VECTOR {
            return Err(malformed("image extends into the exit vector"));
        }

        let required = limit - text_base;
        if required > config.max_memory {
            return Err(LoadError::AddressSpaceExceeded {
                required,
                limit: config.max_memory,
            });
        }
        if exe.entry < text_base || exe.entry >= text_end {
            return Err(LoadError::EntryOutOfRange { entry: exe.entry });
        }

        let mut bytes = vec![0u8; required as usize];
        bytes[..exe.text.len()].copy_from_slice(&exe.text);
        let data_at = (exe.data_base - text_base) as usize;
        bytes[data_at..data_at + exe.data.len()].copy_from_slice(&exe.data);

        Ok(Self {
            bytes,
            text_base,
            text_end,
            data_base: exe.data_base,
            heap_base,
            stack_base,
            limit,
        })
    }

    /// Lowest writable address.
    pub fn data_base(&self) -> u64 {
        self.data_base
    }

    /// First address of the heap region.
    pub fn heap_base(&self) -> u64 {
        self.heap_base
    }

    /// Lowest address the stack may grow down to.
    pub fn stack_base(&self) -> u64 {
        self.stack_base
    }

    /// One past the highest mapped address; the initial stack pointer.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    fn check_read(&self, addr: u64, len: u64) -> Result<usize, Fault> {
        if addr < self.text_base || addr.checked_add(len).is_none_or(|end| end > self.limit) {
            return Err(Fault::MemoryViolation { addr, len });
        }
        Ok((addr - self.text_base) as usize)
    }

    fn check_write(&self, addr: u64, len: u64) -> Result<usize, Fault> {
        if addr >= self.text_base && addr < self.data_base {
            return Err(Fault::ReadOnlyViolation { addr });
        }
        if addr < self.text_base || addr.checked_add(len).is_none_or(|end| end > self.limit) {
            return Err(Fault::MemoryViolation { addr, len });
        }
        Ok((addr - self.text_base) as usize)
    }

    /// Reads `buf.len()` bytes starting at `addr`.
    pub fn read_bytes(&self, addr: u64, buf: &mut [u8]) -> Result<(), Fault> {
        let at = self.check_read(addr, buf.len() as u64)?;
        buf.copy_from_slice(&self.bytes[at..at + buf.len()]);
        Ok(())
    }

    /// Borrows `len` bytes starting at `addr`.
    ///
    /// Bounds are checked before anything is touched, so a hostile
    /// `(addr, len)` pair faults instead of sizing an allocation.
    pub fn read_slice(&self, addr: u64, len: u64) -> Result<&[u8], Fault> {
        let at = self.check_read(addr, len)?;
        Ok(&self.bytes[at..at + len as usize])
    }

    /// Writes `buf` starting at `addr`.
    pub fn write_bytes(&mut self, addr: u64, buf: &[u8]) -> Result<(), Fault> {
        let at = self.check_write(addr, buf.len() as u64)?;
        self.bytes[at..at + buf.len()].copy_from_slice(buf);
        Ok(())
    }

    /// Reads a little-endian unsigned value of `len` bytes (1, 2, 4,
    /// or 8) and zero-extends it to 64 bits.
    pub fn read_uint(&self, addr: u64, len: u64) -> Result<u64, Fault> {
        let at = self.check_read(addr, len)?;
        let mut raw = [0u8; 8];
        raw[..len as usize].copy_from_slice(&self.bytes[at..at + len as usize]);
        Ok(u64::from_le_bytes(raw))
    }

    /// Writes the low `len` bytes of `value` little-endian at `addr`.
    pub fn write_uint(&mut self, addr: u64, len: u64, value: u64) -> Result<(), Fault> {
        let at = self.check_write(addr, len)?;
        self.bytes[at..at + len as usize].copy_from_slice(&value.to_le_bytes()[..len as usize]);
        Ok(())
    }

    /// Writes within the mapped range without permission checks. Only
    /// for constructing the initial image before execution starts.
    pub(crate) fn poke_uint(&mut self, addr: u64, len: u64, value: u64) {
        let at = (addr - self.text_base) as usize;
        self.bytes[at..at + len as usize].copy_from_slice(&value.to_le_bytes()[..len as usize]);
    }

    /// Reads one instruction-stream byte. Unlike a data load this is
    /// only legal inside the text segment.
    pub fn fetch_u8(&self, addr: u64) -> Result<u8, Fault> {
        if addr < self.text_base || addr >= self.text_end {
            return Err(Fault::FetchViolation { addr });
        }
        Ok(self.bytes[(addr - self.text_base) as usize])
    }

    /// Reads `len` instruction-stream bytes, zero-extended, LE.
    pub fn fetch_uint(&self, addr: u64, len: u64) -> Result<u64, Fault> {
        if addr < self.text_base || addr.checked_add(len).is_none_or(|end| end > self.text_end) {
            return Err(Fault::FetchViolation { addr });
        }
        let at = (addr - self.text_base) as usize;
        let mut raw = [0u8; 8];
        raw[..len as usize].copy_from_slice(&self.bytes[at..at + len as usize]);
        Ok(u64::from_le_bytes(raw))
    }
}
