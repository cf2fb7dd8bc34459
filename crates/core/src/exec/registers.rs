//! General-purpose register file with aliased views.
//!
//! Sixteen 64-bit slots, each viewable as 64/32/16/8-bit unsigned,
//! signed, and IEEE-754 floating values over the *same* underlying
//! bits. All reinterpretation goes through `to_bits`/`from_bits` and
//! masking, using defined-behavior primitives, never unchecked punning.
//!
//! Write semantics follow the assembly-visible convention: 64-bit
//! writes replace the slot, 32-bit writes zero-extend, 16- and 8-bit
//! writes merge into the low bits, and `ah`..`dh` address bits 15..8
//! of slots 0-3.

use crate::isa::registers::NUM_GPRS;
use crate::isa::Size;

/// The sixteen general-purpose 64-bit register slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [u64; NUM_GPRS],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! named_views {
    ($($idx:literal : $g64:ident $s64:ident, $g32:ident $s32:ident, $g16:ident $s16:ident, $g8:ident $s8:ident;)*) => {$(
        #[doc = concat!("Reads slot ", stringify!($idx), " as a 64-bit value.")]
        pub fn $g64(&self) -> u64 { self.regs[$idx] }
        #[doc = concat!("Writes slot ", stringify!($idx), " as a 64-bit value.")]
        pub fn $s64(&mut self, value: u64) { self.regs[$idx] = value; }
        #[doc = concat!("Reads the low 32 bits of slot ", stringify!($idx), ".")]
        pub fn $g32(&self) -> u32 { self.regs[$idx] as u32 }
        #[doc = concat!("Writes the low 32 bits of slot ", stringify!($idx), ", zero-extending.")]
        pub fn $s32(&mut self, value: u32) { self.regs[$idx] = u64::from(value); }
        #[doc = concat!("Reads the low 16 bits of slot ", stringify!($idx), ".")]
        pub fn $g16(&self) -> u16 { self.regs[$idx] as u16 }
        #[doc = concat!("Writes the low 16 bits of slot ", stringify!($idx), ", preserving the rest.")]
        pub fn $s16(&mut self, value: u16) {
            self.regs[$idx] = (self.regs[$idx] & !0xFFFF) | u64::from(value);
        }
        #[doc = concat!("Reads the low byte of slot ", stringify!($idx), ".")]
        pub fn $g8(&self) -> u8 { self.regs[$idx] as u8 }
        #[doc = concat!("Writes the low byte of slot ", stringify!($idx), ", preserving the rest.")]
        pub fn $s8(&mut self, value: u8) {
            self.regs[$idx] = (self.regs[$idx] & !0xFF) | u64::from(value);
        }
    )*};
}

macro_rules! high_views {
    ($($idx:literal : $get:ident $set:ident;)*) => {$(
        #[doc = concat!("Reads bits 15..8 of slot ", stringify!($idx), ".")]
        pub fn $get(&self) -> u8 { (self.regs[$idx] >> 8) as u8 }
        #[doc = concat!("Writes bits 15..8 of slot ", stringify!($idx), ", preserving the rest.")]
        pub fn $set(&mut self, value: u8) {
            self.regs[$idx] = (self.regs[$idx] & !0xFF00) | (u64::from(value) << 8);
        }
    )*};
}

impl RegisterFile {
    /// Creates a register file with every slot zeroed.
    pub fn new() -> Self {
        Self { regs: [0; NUM_GPRS] }
    }

    /// Zeroes every slot.
    pub fn reset(&mut self) {
        self.regs = [0; NUM_GPRS];
    }

    /// Reads a slot through a sized view.
    pub fn read(&self, idx: u8, size: Size, high: bool) -> u64 {
        let raw = self.regs[idx as usize];
        if high { (raw >> 8) & 0xFF } else { raw & size.mask() }
    }

    /// Writes a slot through a sized view, applying the zero-extend /
    /// merge rules described in the module docs.
    pub fn write(&mut self, idx: u8, size: Size, high: bool, value: u64) {
        let slot = &mut self.regs[idx as usize];
        if high {
            *slot = (*slot & !0xFF00) | ((value & 0xFF) << 8);
            return;
        }
        *slot = match size {
            Size::Qword => value,
            Size::Dword => value & 0xFFFF_FFFF,
            Size::Word => (*slot & !0xFFFF) | (value & 0xFFFF),
            Size::Byte => (*slot & !0xFF) | (value & 0xFF),
        };
    }

    /// Reads a slot's 64 bits reinterpreted as a signed integer.
    pub fn read_i64(&self, idx: u8) -> i64 {
        self.regs[idx as usize] as i64
    }

    /// Writes a slot from a signed integer's two's-complement bits.
    pub fn write_i64(&mut self, idx: u8, value: i64) {
        self.regs[idx as usize] = value as u64;
    }

    /// Reads a slot's 64 bits reinterpreted as an IEEE-754 double.
    pub fn read_f64(&self, idx: u8) -> f64 {
        f64::from_bits(self.regs[idx as usize])
    }

    /// Writes a slot from a double's IEEE-754 bit pattern.
    pub fn write_f64(&mut self, idx: u8, value: f64) {
        self.regs[idx as usize] = value.to_bits();
    }

    /// Reads a slot's low 32 bits reinterpreted as an IEEE-754 single.
    pub fn read_f32(&self, idx: u8) -> f32 {
        f32::from_bits(self.regs[idx as usize] as u32)
    }

    /// Writes a slot's low 32 bits from a single's bit pattern,
    /// zero-extending like any 32-bit write.
    pub fn write_f32(&mut self, idx: u8, value: f32) {
        self.regs[idx as usize] = u64::from(value.to_bits());
    }

    named_views! {
        0:  get_rax set_rax, get_eax set_eax, get_ax set_ax, get_al set_al;
        1:  get_rbx set_rbx, get_ebx set_ebx, get_bx set_bx, get_bl set_bl;
        2:  get_rcx set_rcx, get_ecx set_ecx, get_cx set_cx, get_cl set_cl;
        3:  get_rdx set_rdx, get_edx set_edx, get_dx set_dx, get_dl set_dl;
        4:  get_rsi set_rsi, get_esi set_esi, get_si set_si, get_sil set_sil;
        5:  get_rdi set_rdi, get_edi set_edi, get_di set_di, get_dil set_dil;
        6:  get_rbp set_rbp, get_ebp set_ebp, get_bp set_bp, get_bpl set_bpl;
        7:  get_rsp set_rsp, get_esp set_esp, get_sp set_sp, get_spl set_spl;
        8:  get_r8 set_r8, get_r8d set_r8d, get_r8w set_r8w, get_r8b set_r8b;
        9:  get_r9 set_r9, get_r9d set_r9d, get_r9w set_r9w, get_r9b set_r9b;
        10: get_r10 set_r10, get_r10d set_r10d, get_r10w set_r10w, get_r10b set_r10b;
        11: get_r11 set_r11, get_r11d set_r11d, get_r11w set_r11w, get_r11b set_r11b;
        12: get_r12 set_r12, get_r12d set_r12d, get_r12w set_r12w, get_r12b set_r12b;
        13: get_r13 set_r13, get_r13d set_r13d, get_r13w set_r13w, get_r13b set_r13b;
        14: get_r14 set_r14, get_r14d set_r14d, get_r14w set_r14w, get_r14b set_r14b;
        15: get_r15 set_r15, get_r15d set_r15d, get_r15w set_r15w, get_r15b set_r15b;
    }

    high_views! {
        0: get_ah set_ah;
        1: get_bh set_bh;
        2: get_ch set_ch;
        3: get_dh set_dh;
    }
}
