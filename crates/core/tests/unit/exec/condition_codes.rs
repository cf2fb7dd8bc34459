//! Condition-code truth tables.
//!
//! Every code is a pure function of the flags word; the exhaustive
//! tests sweep all sixteen combinations of carry, zero, sign, and
//! overflow.

use rstest::rstest;
use vex64_core::exec::Flags;

fn flags(cf: bool, zf: bool, sf: bool, of: bool) -> Flags {
    let mut f = Flags::default();
    f.assign_cf(cf);
    f.assign_zf(zf);
    f.assign_sf(sf);
    f.assign_of(of);
    f
}

#[test]
fn unsigned_codes_follow_carry_and_zero() {
    for bits in 0..16u8 {
        let (cf, zf, sf, of) =
            (bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0);
        let f = flags(cf, zf, sf, of);
        assert_eq!(f.condition_b(), cf, "b at {bits:04b}");
        assert_eq!(f.condition_be(), cf || zf, "be at {bits:04b}");
        assert_eq!(f.condition_a(), !cf && !zf, "a at {bits:04b}");
        assert_eq!(f.condition_ae(), !cf, "ae at {bits:04b}");
    }
}

#[test]
fn signed_codes_follow_sign_against_overflow() {
    for bits in 0..16u8 {
        let (cf, zf, sf, of) =
            (bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0);
        let f = flags(cf, zf, sf, of);
        assert_eq!(f.condition_l(), sf != of, "l at {bits:04b}");
        assert_eq!(f.condition_le(), zf || (sf != of), "le at {bits:04b}");
        assert_eq!(f.condition_ge(), sf == of, "ge at {bits:04b}");
        assert_eq!(f.condition_g(), !zf && (sf == of), "g at {bits:04b}");
    }
}

#[test]
fn equality_sign_parity_and_overflow_codes() {
    let mut f = Flags::default();
    f.assign_zf(true);
    assert!(f.condition_e() && !f.condition_ne());

    let mut f = Flags::default();
    f.assign_sf(true);
    assert!(f.condition_s() && !f.condition_ns());

    let mut f = Flags::default();
    f.assign_pf(true);
    assert!(f.condition_p() && !f.condition_np());

    let mut f = Flags::default();
    f.assign_of(true);
    assert!(f.condition_o() && !f.condition_no());
}

#[rstest]
#[case(0x0, false, false, false, true)] // o
#[case(0x2, true, false, false, false)] // b
#[case(0x4, false, true, false, false)] // e
#[case(0x7, false, false, false, false)] // a with all clear
#[case(0xC, false, false, true, false)] // l with SF != OF
#[case(0xF, false, false, false, false)] // g with all clear
fn dispatch_matches_named_predicates(
    #[case] cc: u8,
    #[case] cf: bool,
    #[case] zf: bool,
    #[case] sf: bool,
    #[case] of: bool,
) {
    let f = flags(cf, zf, sf, of);
    assert!(f.condition(cc));
}

#[test]
fn dispatch_agrees_with_named_predicates_everywhere() {
    for bits in 0..16u8 {
        let f = flags(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0);
        let named = [
            f.condition_o(),
            f.condition_no(),
            f.condition_b(),
            f.condition_ae(),
            f.condition_e(),
            f.condition_ne(),
            f.condition_be(),
            f.condition_a(),
            f.condition_s(),
            f.condition_ns(),
            f.condition_p(),
            f.condition_np(),
            f.condition_l(),
            f.condition_ge(),
            f.condition_le(),
            f.condition_g(),
        ];
        for (cc, expected) in named.iter().enumerate() {
            assert_eq!(f.condition(cc as u8), *expected, "cc {cc:#x} at {bits:04b}");
        }
    }
}

#[test]
fn iopl_is_range_checked() {
    let mut f = Flags::default();
    assert_eq!(f.get_iopl(), 0);
    f.assign_iopl(3).unwrap();
    assert_eq!(f.get_iopl(), 3);
    assert_eq!(f.assign_iopl(4), Err(4));
    assert_eq!(f.get_iopl(), 3);
}
