//! Aliased register views: every view reads and writes the same
//! underlying 64 bits.

use proptest::prelude::*;
use vex64_core::exec::RegisterFile;

#[test]
fn signed_view_of_minus_fourteen() {
    let mut regs = RegisterFile::new();
    regs.write_i64(0, -14);
    assert_eq!(regs.get_rax(), 0xFFFF_FFFF_FFFF_FFF2);
    assert_eq!(regs.read_i64(0), -14);
}

#[test]
fn float_view_of_twelve_point_four_three() {
    let mut regs = RegisterFile::new();
    regs.write_f64(0, 12.43);
    assert_eq!(regs.get_rax(), 12.43_f64.to_bits());
    assert_eq!(regs.read_f64(0).to_bits(), 12.43_f64.to_bits());
}

#[test]
fn raw_write_is_visible_through_every_view() {
    let mut regs = RegisterFile::new();
    let bits = 1.5_f64.to_bits();
    regs.set_rdx(bits);
    assert_eq!(regs.read_f64(3), 1.5);
    assert_eq!(regs.read_i64(3), bits as i64);
    assert_eq!(regs.get_edx(), bits as u32);
}

proptest! {
    #[test]
    fn narrow_views_are_low_order_bits(value in any::<u64>()) {
        let mut regs = RegisterFile::new();
        regs.set_rbx(value);
        prop_assert_eq!(u64::from(regs.get_ebx()), value & 0xFFFF_FFFF);
        prop_assert_eq!(u64::from(regs.get_bx()), value & 0xFFFF);
        prop_assert_eq!(u64::from(regs.get_bl()), value & 0xFF);
        prop_assert_eq!(u64::from(regs.get_bh()), (value >> 8) & 0xFF);
    }

    #[test]
    fn dword_writes_zero_extend(old in any::<u64>(), new in any::<u32>()) {
        let mut regs = RegisterFile::new();
        regs.set_rcx(old);
        regs.set_ecx(new);
        prop_assert_eq!(regs.get_rcx(), u64::from(new));
    }

    #[test]
    fn word_and_byte_writes_preserve_upper_bits(old in any::<u64>(), new in any::<u16>()) {
        let mut regs = RegisterFile::new();
        regs.set_rsi(old);
        regs.set_si(new);
        prop_assert_eq!(regs.get_rsi(), (old & !0xFFFF) | u64::from(new));
        regs.set_sil(0x5A);
        prop_assert_eq!(regs.get_rsi() & !0xFF, ((old & !0xFFFF) | u64::from(new)) & !0xFF);
    }

    #[test]
    fn float_round_trips_bit_exactly(bits in any::<u64>()) {
        let mut regs = RegisterFile::new();
        regs.set_r9(bits);
        let through_float = regs.read_f64(9).to_bits();
        // NaN payloads survive because the view is pure bit
        // reinterpretation.
        prop_assert_eq!(through_float, bits);
    }
}
