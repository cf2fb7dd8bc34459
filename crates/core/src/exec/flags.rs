//! Flags register and condition codes.
//!
//! The flags register is one packed 64-bit word holding the individual
//! status/control bits plus the two-bit I/O privilege level. Condition
//! codes are pure functions of the packed word (no hidden state), so
//! they are independently testable against their truth tables.

use crate::isa::opcodes::cond;
use crate::isa::Size;

/// Carry flag bit.
pub const CF: u64 = 1 << 0;
/// Parity flag bit (set when the low result byte has even parity).
pub const PF: u64 = 1 << 2;
/// Auxiliary-carry flag bit (carry out of bit 3).
pub const AF: u64 = 1 << 4;
/// Zero flag bit.
pub const ZF: u64 = 1 << 6;
/// Sign flag bit.
pub const SF: u64 = 1 << 7;
/// Trap flag bit.
pub const TF: u64 = 1 << 8;
/// Interrupt-enable flag bit.
pub const IF: u64 = 1 << 9;
/// Direction flag bit.
pub const DF: u64 = 1 << 10;
/// Overflow flag bit.
pub const OF: u64 = 1 << 11;
/// Shift of the two-bit I/O privilege level field.
pub const IOPL_SHIFT: u32 = 12;
/// Mask of the I/O privilege level field (in place).
pub const IOPL_MASK: u64 = 0b11 << IOPL_SHIFT;

/// Bits of the flags word that only a privileged `popf` may change.
pub const PRIVILEGED_MASK: u64 = TF | IF | IOPL_MASK;

/// Every architecturally defined bit of the flags word. `popf` keeps
/// only these; undefined bits always read back as zero.
pub const DEFINED_MASK: u64 = CF | PF | AF | ZF | SF | TF | IF | DF | OF | IOPL_MASK;

/// The packed flags word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags(pub u64);

macro_rules! flag_accessors {
    ($($bit:ident => $get:ident, $assign:ident;)*) => {$(
        #[doc = concat!("Reads the ", stringify!($bit), " bit.")]
        pub fn $get(self) -> bool {
            self.0 & $bit != 0
        }

        #[doc = concat!("Writes the ", stringify!($bit), " bit.")]
        pub fn $assign(&mut self, value: bool) {
            if value {
                self.0 |= $bit;
            } else {
                self.0 &= !$bit;
            }
        }
    )*};
}

impl Flags {
    flag_accessors! {
        CF => get_cf, assign_cf;
        PF => get_pf, assign_pf;
        AF => get_af, assign_af;
        ZF => get_zf, assign_zf;
        SF => get_sf, assign_sf;
        TF => get_tf, assign_tf;
        IF => get_if, assign_if;
        DF => get_df, assign_df;
        OF => get_of, assign_of;
    }

    /// Reads the two-bit I/O privilege level.
    pub fn get_iopl(self) -> u8 {
        ((self.0 & IOPL_MASK) >> IOPL_SHIFT) as u8
    }

    /// Writes the I/O privilege level.
    ///
    /// # Errors
    ///
    /// Returns the rejected value if it does not fit in two bits.
    pub fn assign_iopl(&mut self, level: u8) -> Result<(), u8> {
        if level > 3 {
            return Err(level);
        }
        self.0 = (self.0 & !IOPL_MASK) | (u64::from(level) << IOPL_SHIFT);
        Ok(())
    }

    /// "below": CF.
    pub fn condition_b(self) -> bool {
        self.get_cf()
    }

    /// "below or equal": CF or ZF.
    pub fn condition_be(self) -> bool {
        self.get_cf() || self.get_zf()
    }

    /// "above": neither CF nor ZF.
    pub fn condition_a(self) -> bool {
        !self.condition_be()
    }

    /// "above or equal": no CF.
    pub fn condition_ae(self) -> bool {
        !self.get_cf()
    }

    /// "equal": ZF.
    pub fn condition_e(self) -> bool {
        self.get_zf()
    }

    /// "not equal": no ZF.
    pub fn condition_ne(self) -> bool {
        !self.get_zf()
    }

    /// "sign": SF.
    pub fn condition_s(self) -> bool {
        self.get_sf()
    }

    /// "no sign": no SF.
    pub fn condition_ns(self) -> bool {
        !self.get_sf()
    }

    /// "parity even": PF.
    pub fn condition_p(self) -> bool {
        self.get_pf()
    }

    /// "parity odd": no PF.
    pub fn condition_np(self) -> bool {
        !self.get_pf()
    }

    /// "overflow": OF.
    pub fn condition_o(self) -> bool {
        self.get_of()
    }

    /// "no overflow": no OF.
    pub fn condition_no(self) -> bool {
        !self.get_of()
    }

    /// "less" (signed): SF differs from OF.
    pub fn condition_l(self) -> bool {
        self.get_sf() != self.get_of()
    }

    /// "less or equal" (signed): ZF, or SF differs from OF.
    pub fn condition_le(self) -> bool {
        self.get_zf() || self.condition_l()
    }

    /// "greater or equal" (signed): SF equals OF.
    pub fn condition_ge(self) -> bool {
        self.get_sf() == self.get_of()
    }

    /// "greater" (signed): no ZF, and SF equals OF.
    pub fn condition_g(self) -> bool {
        !self.get_zf() && self.condition_ge()
    }

    /// Evaluates a `Jcc` condition nibble against the current flags.
    pub fn condition(self, cc: u8) -> bool {
        match cc {
            cond::O => self.condition_o(),
            cond::NO => self.condition_no(),
            cond::B => self.condition_b(),
            cond::AE => self.condition_ae(),
            cond::E => self.condition_e(),
            cond::NE => self.condition_ne(),
            cond::BE => self.condition_be(),
            cond::A => self.condition_a(),
            cond::S => self.condition_s(),
            cond::NS => self.condition_ns(),
            cond::P => self.condition_p(),
            cond::NP => self.condition_np(),
            cond::L => self.condition_l(),
            cond::GE => self.condition_ge(),
            cond::LE => self.condition_le(),
            _ => self.condition_g(),
        }
    }

    /// Sets SF, ZF, and PF from a result at the given operand size.
    pub fn set_szp(&mut self, result: u64, size: Size) {
        let result = result & size.mask();
        self.assign_zf(result == 0);
        self.assign_sf(result & size.sign_bit() != 0);
        self.assign_pf((result as u8).count_ones() % 2 == 0);
    }
}
