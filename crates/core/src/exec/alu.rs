//! Integer ALU with flag side effects.
//!
//! Every operation works on values already masked to the operand size
//! and returns the size-masked result. Flag updates follow the classic
//! conventions: carry is the unsigned out-of-range indicator, overflow
//! the signed one, and the sign/zero/parity group always reflects the
//! result. Where hardware leaves a flag undefined this implementation
//! clears it, so behavior is deterministic and testable.

use crate::exec::flags::Flags;
use crate::isa::Size;

/// Sign-extends a size-masked value to 64 bits.
pub fn sign_extend(value: u64, size: Size) -> i64 {
    let shift = 64 - size.bits();
    ((value << shift) as i64) >> shift
}

fn set_add_flags(flags: &mut Flags, size: Size, a: u64, b: u64, result: u64, carry: bool) {
    flags.assign_cf(carry);
    flags.assign_af((a & 0xF) + (b & 0xF) > 0xF);
    let sign = size.sign_bit();
    flags.assign_of((a & sign == b & sign) && (a & sign != result & sign));
    flags.set_szp(result, size);
}

/// `a + b`, updating CF/OF/AF/SF/ZF/PF.
pub fn add(flags: &mut Flags, size: Size, a: u64, b: u64) -> u64 {
    let wide = u128::from(a) + u128::from(b);
    let result = (wide as u64) & size.mask();
    set_add_flags(flags, size, a, b, result, wide > u128::from(size.mask()));
    result
}

/// `a - b`, updating CF/OF/AF/SF/ZF/PF. Also serves `cmp`.
pub fn sub(flags: &mut Flags, size: Size, a: u64, b: u64) -> u64 {
    let result = a.wrapping_sub(b) & size.mask();
    flags.assign_cf(a < b);
    flags.assign_af((a & 0xF) < (b & 0xF));
    let sign = size.sign_bit();
    flags.assign_of((a & sign != b & sign) && (b & sign == result & sign));
    flags.set_szp(result, size);
    result
}

fn set_logic_flags(flags: &mut Flags, size: Size, result: u64) {
    flags.assign_cf(false);
    flags.assign_of(false);
    flags.assign_af(false);
    flags.set_szp(result, size);
}

/// `a & b`, clearing CF/OF. Also serves `test`.
pub fn and(flags: &mut Flags, size: Size, a: u64, b: u64) -> u64 {
    let result = a & b;
    set_logic_flags(flags, size, result);
    result
}

/// `a | b`, clearing CF/OF.
pub fn or(flags: &mut Flags, size: Size, a: u64, b: u64) -> u64 {
    let result = a | b;
    set_logic_flags(flags, size, result);
    result
}

/// `a ^ b`, clearing CF/OF.
pub fn xor(flags: &mut Flags, size: Size, a: u64, b: u64) -> u64 {
    let result = a ^ b;
    set_logic_flags(flags, size, result);
    result
}

/// `a + 1` with the carry flag preserved.
pub fn inc(flags: &mut Flags, size: Size, a: u64) -> u64 {
    let saved = flags.get_cf();
    let result = add(flags, size, a, 1);
    flags.assign_cf(saved);
    result
}

/// `a - 1` with the carry flag preserved.
pub fn dec(flags: &mut Flags, size: Size, a: u64) -> u64 {
    let saved = flags.get_cf();
    let result = sub(flags, size, a, 1);
    flags.assign_cf(saved);
    result
}

/// Two's-complement negate; CF is set for any nonzero input.
pub fn neg(flags: &mut Flags, size: Size, a: u64) -> u64 {
    let result = sub(flags, size, 0, a);
    flags.assign_cf(a != 0);
    result
}

/// Left shift. CF is the last bit shifted out; OF is defined only for
/// a count of one (result sign changed) and cleared otherwise.
pub fn shl(flags: &mut Flags, size: Size, a: u64, count: u32) -> u64 {
    let count = count & 63;
    if count == 0 {
        return a & size.mask();
    }
    let wide = u128::from(a & size.mask()) << count;
    let result = (wide as u64) & size.mask();
    let cf = count <= size.bits() && (wide >> size.bits()) & 1 == 1;
    flags.assign_cf(cf);
    flags.assign_of(count == 1 && (result & size.sign_bit() != 0) != cf);
    flags.assign_af(false);
    flags.set_szp(result, size);
    result
}

/// Logical right shift. CF is the last bit shifted out; OF is the
/// original sign bit for a count of one and cleared otherwise.
pub fn shr(flags: &mut Flags, size: Size, a: u64, count: u32) -> u64 {
    let count = count & 63;
    if count == 0 {
        return a & size.mask();
    }
    let a = a & size.mask();
    let result = a >> count;
    flags.assign_cf((a >> (count - 1)) & 1 == 1);
    flags.assign_of(count == 1 && a & size.sign_bit() != 0);
    flags.assign_af(false);
    flags.set_szp(result, size);
    result
}

/// Arithmetic right shift. The sign bit replicates; OF is always
/// cleared.
pub fn sar(flags: &mut Flags, size: Size, a: u64, count: u32) -> u64 {
    let count = count & 63;
    if count == 0 {
        return a & size.mask();
    }
    let extended = sign_extend(a & size.mask(), size);
    let result = (extended >> count) as u64 & size.mask();
    flags.assign_cf((extended >> (count - 1)) & 1 == 1);
    flags.assign_of(false);
    flags.assign_af(false);
    flags.set_szp(result, size);
    result
}

/// Unsigned multiply. CF and OF are set when the full product does not
/// fit in the operand size.
pub fn mul(flags: &mut Flags, size: Size, a: u64, b: u64) -> u64 {
    let wide = u128::from(a) * u128::from(b);
    let result = (wide as u64) & size.mask();
    let overflow = wide > u128::from(size.mask());
    flags.assign_cf(overflow);
    flags.assign_of(overflow);
    flags.assign_af(false);
    flags.set_szp(result, size);
    result
}

/// Signed multiply. CF and OF are set when the full product does not
/// fit in the operand size.
pub fn imul(flags: &mut Flags, size: Size, a: u64, b: u64) -> u64 {
    let wide = i128::from(sign_extend(a, size)) * i128::from(sign_extend(b, size));
    let result = (wide as u64) & size.mask();
    let overflow = wide != i128::from(sign_extend(result, size));
    flags.assign_cf(overflow);
    flags.assign_of(overflow);
    flags.assign_af(false);
    flags.set_szp(result, size);
    result
}

/// Unsigned divide, truncating toward zero.
///
/// # Errors
///
/// Fails on a zero divisor.
pub fn div(flags: &mut Flags, size: Size, a: u64, b: u64) -> Result<u64, &'static str> {
    if b == 0 {
        return Err("divide by zero");
    }
    let result = (a / b) & size.mask();
    flags.assign_cf(false);
    flags.assign_of(false);
    flags.assign_af(false);
    flags.set_szp(result, size);
    Ok(result)
}

/// Signed divide, truncating toward zero.
///
/// # Errors
///
/// Fails on a zero divisor, and on the one quotient that cannot be
/// represented (most-negative value divided by minus one).
pub fn idiv(flags: &mut Flags, size: Size, a: u64, b: u64) -> Result<u64, &'static str> {
    let a = sign_extend(a, size);
    let b = sign_extend(b, size);
    if b == 0 {
        return Err("divide by zero");
    }
    let quotient = a.checked_div(b).ok_or("divide overflow")?;
    if sign_extend(quotient as u64 & size.mask(), size) != quotient {
        return Err("divide overflow");
    }
    let result = quotient as u64 & size.mask();
    flags.assign_cf(false);
    flags.assign_of(false);
    flags.assign_af(false);
    flags.set_szp(result, size);
    Ok(result)
}
