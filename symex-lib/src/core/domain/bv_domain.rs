use std::fmt::Write;

use symex_abs::numeric::{mask, pow2, BigInt, BigUint, traits::{One, Zero}};

use crate::{
  core::{
    domain::tristate::Tristate,
    format::{FormatStyle, Formattable},
  },
  impl_display_debug_for_formattable,
};

/// The abstract domain for a bitvector sort of width `w`.
///
/// Two refinements are carried simultaneously: a bitwise view (masks of bits known to be zero and
/// known to be one) and an unsigned arithmetic interval `[lo, hi]` within `[0, 2^w)`. Every
/// operator updates whichever view it can compute cheaply; `normalize` then lets each view tighten
/// the other, so consumers may read either.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BvDomain {
  width:       u32,
  known_zeros: BigUint,
  known_ones:  BigUint,
  lo:          BigUint,
  hi:          BigUint,
}

impl BvDomain {
  pub fn top(width: u32) -> BvDomain {
    BvDomain {
      width,
      known_zeros: BigUint::zero(),
      known_ones: BigUint::zero(),
      lo: BigUint::zero(),
      hi: mask(width),
    }
  }

  pub fn singleton(width: u32, value: BigUint) -> BvDomain {
    let value = value & mask(width);
    BvDomain {
      width,
      known_zeros: mask(width) ^ &value,
      known_ones: value.clone(),
      lo: value.clone(),
      hi: value,
    }
  }

  /// A domain from an unsigned interval, `lo <= hi < 2^w`.
  pub fn from_range(width: u32, lo: BigUint, hi: BigUint) -> BvDomain {
    debug_assert!(lo <= hi && hi <= mask(width), "bad bitvector range");
    let mut domain = BvDomain {
      width,
      known_zeros: BigUint::zero(),
      known_ones: BigUint::zero(),
      lo,
      hi,
    };
    domain.normalize();
    domain
  }

  /// A domain from known-bit masks.
  pub fn from_bits(width: u32, known_zeros: BigUint, known_ones: BigUint) -> BvDomain {
    debug_assert!((&known_zeros & &known_ones).is_zero(), "contradictory known bits");
    let mut domain = BvDomain {
      width,
      known_zeros,
      known_ones,
      lo: BigUint::zero(),
      hi: mask(width),
    };
    domain.normalize();
    domain
  }

  #[inline(always)]
  pub fn width(&self) -> u32 {
    self.width
  }

  #[inline(always)]
  pub fn unsigned_range(&self) -> (&BigUint, &BigUint) {
    (&self.lo, &self.hi)
  }

  #[inline(always)]
  pub fn known_zeros(&self) -> &BigUint {
    &self.known_zeros
  }

  #[inline(always)]
  pub fn known_ones(&self) -> &BigUint {
    &self.known_ones
  }

  /// Cross-refines the two views. A value is at least its known-one bits and at most the
  /// complement of its known-zero bits; conversely the bits above the highest position where
  /// `lo` and `hi` differ are pinned by the interval.
  fn normalize(&mut self) {
    if self.lo < self.known_ones {
      self.lo = self.known_ones.clone();
    }
    let bit_hi = mask(self.width) ^ &self.known_zeros;
    if self.hi > bit_hi {
      self.hi = bit_hi;
    }
    debug_assert!(self.lo <= self.hi, "inconsistent bitvector domain");

    let differing = &self.lo ^ &self.hi;
    let shared = if differing.is_zero() {
      mask(self.width)
    } else {
      // All bits strictly above the highest differing position are shared.
      mask(self.width) ^ mask(differing.bits() as u32)
    };
    self.known_ones |= &self.lo & &shared;
    self.known_zeros |= (mask(self.width) ^ &self.lo) & shared;
  }

  pub fn as_singleton(&self) -> Option<&BigUint> {
    if self.lo == self.hi {
      Some(&self.lo)
    } else {
      None
    }
  }

  pub fn contains(&self, value: &BigUint) -> bool {
    &self.lo <= value
      && value <= &self.hi
      && (value & &self.known_zeros).is_zero()
      && (value & &self.known_ones) == self.known_ones
  }

  pub fn join(&self, other: &BvDomain) -> BvDomain {
    debug_assert_eq!(self.width, other.width, "width mismatch in join");
    let mut joined = BvDomain {
      width: self.width,
      known_zeros: &self.known_zeros & &other.known_zeros,
      known_ones: &self.known_ones & &other.known_ones,
      lo: self.lo.clone().min(other.lo.clone()),
      hi: self.hi.clone().max(other.hi.clone()),
    };
    joined.normalize();
    joined
  }

  pub fn overlaps(&self, other: &BvDomain) -> bool {
    if self.hi < other.lo || other.hi < self.lo {
      return false;
    }
    // A shared value cannot have a bit both known one here and known zero there.
    (&self.known_ones & &other.known_zeros).is_zero()
      && (&other.known_ones & &self.known_zeros).is_zero()
  }

  pub fn check_eq(&self, other: &BvDomain) -> Tristate {
    if let (Some(a), Some(b)) = (self.as_singleton(), other.as_singleton()) {
      return Tristate::singleton(a == b);
    }
    if !self.overlaps(other) {
      return Tristate::False;
    }
    Tristate::Any
  }

  pub fn check_ult(&self, other: &BvDomain) -> Tristate {
    if self.hi < other.lo {
      return Tristate::True;
    }
    if self.lo >= other.hi {
      return Tristate::False;
    }
    Tristate::Any
  }

  /// The interval reinterpreted under two's complement, `None` when the unsigned interval
  /// straddles the sign boundary.
  pub fn signed_range(&self) -> Option<(BigInt, BigInt)> {
    let sign_bound = pow2(self.width - 1);
    let modulus = BigInt::from(pow2(self.width));
    if self.hi < sign_bound {
      Some((BigInt::from(self.lo.clone()), BigInt::from(self.hi.clone())))
    } else if self.lo >= sign_bound {
      Some((
        BigInt::from(self.lo.clone()) - &modulus,
        BigInt::from(self.hi.clone()) - &modulus,
      ))
    } else {
      None
    }
  }

  pub fn check_slt(&self, other: &BvDomain) -> Tristate {
    match (self.signed_range(), other.signed_range()) {
      (Some((_, a_hi)), Some((b_lo, _))) if a_hi < b_lo => Tristate::True,
      (Some((a_lo, _)), Some((_, b_hi))) if a_lo >= b_hi => Tristate::False,
      _ => Tristate::Any,
    }
  }

  pub fn test_bit(&self, index: u32) -> Tristate {
    let bit = BigUint::one() << index;
    if !(&self.known_ones & &bit).is_zero() {
      Tristate::True
    } else if !(&self.known_zeros & &bit).is_zero() {
      Tristate::False
    } else {
      Tristate::Any
    }
  }

  pub fn add(&self, other: &BvDomain) -> BvDomain {
    debug_assert_eq!(self.width, other.width, "width mismatch in add");
    let hi = &self.hi + &other.hi;
    if hi <= mask(self.width) {
      BvDomain::from_range(self.width, &self.lo + &other.lo, hi)
    } else {
      BvDomain::top(self.width)
    }
  }

  pub fn neg(&self) -> BvDomain {
    if let Some(v) = self.as_singleton() {
      if v.is_zero() {
        return self.clone();
      }
      return BvDomain::singleton(self.width, pow2(self.width) - v);
    }
    if !self.lo.is_zero() {
      let modulus = pow2(self.width);
      return BvDomain::from_range(self.width, &modulus - &self.hi, &modulus - &self.lo);
    }
    BvDomain::top(self.width)
  }

  pub fn scale(&self, factor: &BigUint) -> BvDomain {
    let factor = factor & mask(self.width);
    if factor.is_zero() {
      return BvDomain::singleton(self.width, BigUint::zero());
    }
    if factor.is_one() {
      return self.clone();
    }
    if let Some(v) = self.as_singleton() {
      return BvDomain::singleton(self.width, v * &factor);
    }
    let hi = &self.hi * &factor;
    if hi <= mask(self.width) {
      return BvDomain::from_range(self.width, &self.lo * &factor, hi);
    }
    BvDomain::top(self.width)
  }

  pub fn mul(&self, other: &BvDomain) -> BvDomain {
    if let Some(v) = self.as_singleton() {
      return other.scale(v);
    }
    if let Some(v) = other.as_singleton() {
      return self.scale(v);
    }
    let hi = &self.hi * &other.hi;
    if hi <= mask(self.width) {
      BvDomain::from_range(self.width, &self.lo * &other.lo, hi)
    } else {
      BvDomain::top(self.width)
    }
  }

  pub fn bitand(&self, other: &BvDomain) -> BvDomain {
    debug_assert_eq!(self.width, other.width, "width mismatch in bitand");
    let mut result = BvDomain {
      width: self.width,
      known_zeros: &self.known_zeros | &other.known_zeros,
      known_ones: &self.known_ones & &other.known_ones,
      lo: BigUint::zero(),
      hi: self.hi.clone().min(other.hi.clone()),
    };
    result.normalize();
    result
  }

  pub fn bitor(&self, other: &BvDomain) -> BvDomain {
    debug_assert_eq!(self.width, other.width, "width mismatch in bitor");
    let mut result = BvDomain {
      width: self.width,
      known_zeros: &self.known_zeros & &other.known_zeros,
      known_ones: &self.known_ones | &other.known_ones,
      lo: self.lo.clone().max(other.lo.clone()),
      hi: mask(self.width),
    };
    result.normalize();
    result
  }

  pub fn bitxor(&self, other: &BvDomain) -> BvDomain {
    debug_assert_eq!(self.width, other.width, "width mismatch in bitxor");
    let known_ones = (&self.known_ones & &other.known_zeros) | (&self.known_zeros & &other.known_ones);
    let known_zeros = (&self.known_ones & &other.known_ones) | (&self.known_zeros & &other.known_zeros);
    BvDomain::from_bits(self.width, known_zeros, known_ones)
  }

  /// `value = high * 2^|low| + low`.
  pub fn concat(&self, low: &BvDomain) -> BvDomain {
    let width = self.width + low.width;
    let mut result = BvDomain {
      width,
      known_zeros: (&self.known_zeros << low.width) | &low.known_zeros,
      known_ones: (&self.known_ones << low.width) | &low.known_ones,
      lo: (&self.lo << low.width) + &low.lo,
      hi: (&self.hi << low.width) + &low.hi,
    };
    result.normalize();
    result
  }

  /// The field of `length` bits starting at bit `offset`.
  pub fn extract(&self, offset: u32, length: u32) -> BvDomain {
    debug_assert!(offset + length <= self.width, "extract out of range");
    let field_mask = mask(length);
    if let Some(v) = self.as_singleton() {
      return BvDomain::singleton(length, (v >> offset) & field_mask);
    }
    if offset == 0 && self.hi <= field_mask {
      let mut narrowed = BvDomain {
        width: length,
        known_zeros: &self.known_zeros & &field_mask,
        known_ones: &self.known_ones & &field_mask,
        lo: self.lo.clone(),
        hi: self.hi.clone(),
      };
      narrowed.normalize();
      return narrowed;
    }
    BvDomain::from_bits(
      length,
      (&self.known_zeros >> offset) & &field_mask,
      (&self.known_ones >> offset) & field_mask,
    )
  }

  pub fn zero_extend(&self, extra: u32) -> BvDomain {
    let width = self.width + extra;
    let new_zeros = mask(width) ^ mask(self.width);
    BvDomain {
      width,
      known_zeros: &self.known_zeros | new_zeros,
      known_ones: self.known_ones.clone(),
      lo: self.lo.clone(),
      hi: self.hi.clone(),
    }
  }

  /// Unsigned division. Quotients are monotone in both operands, so a divisor range that
  /// excludes zero gives exact interval bounds; a divisor that may be zero gives `top`, since
  /// the quotient there is unspecified.
  pub fn udiv(&self, divisor: &BvDomain) -> BvDomain {
    debug_assert_eq!(self.width, divisor.width, "width mismatch in udiv");
    let (d_lo, d_hi) = divisor.unsigned_range();
    if d_lo.is_zero() {
      return BvDomain::top(self.width);
    }
    BvDomain::from_range(self.width, &self.lo / d_hi, &self.hi / d_lo)
  }

  /// Unsigned remainder. A singleton divisor whose quotient is the same at both numerator
  /// endpoints is exact; otherwise the result is bounded by the divisor (and the numerator).
  pub fn urem(&self, divisor: &BvDomain) -> BvDomain {
    debug_assert_eq!(self.width, divisor.width, "width mismatch in urem");
    let (d_lo, d_hi) = divisor.unsigned_range();
    if d_lo.is_zero() {
      return BvDomain::top(self.width);
    }
    if let Some(d) = divisor.as_singleton() {
      if &self.lo / d == &self.hi / d {
        return BvDomain::from_range(self.width, &self.lo % d, &self.hi % d);
      }
    }
    let bound = (d_hi - BigUint::one()).min(self.hi.clone());
    BvDomain::from_range(self.width, BigUint::zero(), bound)
  }

  /// Bounds on the number of set bits, as an unsigned interval of the same width.
  pub fn popcount(&self) -> BvDomain {
    let lo = BigUint::from(self.known_ones.count_ones());
    let hi = BigUint::from(self.width as u64 - self.known_zeros.count_ones());
    BvDomain::from_range(self.width, lo, hi)
  }
}

impl Formattable for BvDomain {
  fn repr(&self, out: &mut dyn Write, style: FormatStyle) -> std::fmt::Result {
    if let Some(value) = self.as_singleton() {
      return write!(out, "bv{}{{{value}}}", self.width);
    }
    match style {
      // The bitwise view only matters when chasing propagation internals.
      FormatStyle::Debug => write!(
        out,
        "bv{}{{[{}, {}] ones:{:x} zeros:{:x}}}",
        self.width, self.lo, self.hi, self.known_ones, self.known_zeros
      ),
      _ => write!(out, "bv{}{{[{}, {}]}}", self.width, self.lo, self.hi),
    }
  }
}

impl_display_debug_for_formattable!(BvDomain);

#[cfg(test)]
mod tests {
  use super::*;

  fn u(v: u64) -> BigUint {
    BigUint::from(v)
  }

  #[test]
  fn singleton_pins_every_bit() {
    let d = BvDomain::singleton(8, u(0b1010));
    assert_eq!(d.known_ones(), &u(0b1010));
    assert_eq!(d.known_zeros(), &u(0b1111_0101));
    assert_eq!(d.test_bit(1), Tristate::True);
    assert_eq!(d.test_bit(0), Tristate::False);
  }

  #[test]
  fn interval_pins_shared_high_bits() {
    // [0x80, 0x83]: the top six bits are shared.
    let d = BvDomain::from_range(8, u(0x80), u(0x83));
    assert_eq!(d.test_bit(7), Tristate::True);
    assert_eq!(d.test_bit(2), Tristate::False);
    assert_eq!(d.test_bit(1), Tristate::Any);
  }

  #[test]
  fn join_is_sound() {
    let a = BvDomain::singleton(8, u(3));
    let b = BvDomain::singleton(8, u(5));
    let j = a.join(&b);
    assert!(j.contains(&u(3)));
    assert!(j.contains(&u(5)));
    assert_eq!(j.unsigned_range(), (&u(3), &u(5)));
  }

  #[test]
  fn bitwise_ops() {
    let a = BvDomain::singleton(8, u(0b1100));
    let b = BvDomain::singleton(8, u(0b1010));
    assert_eq!(a.bitand(&b).as_singleton(), Some(&u(0b1000)));
    assert_eq!(a.bitor(&b).as_singleton(), Some(&u(0b1110)));
    assert_eq!(a.bitxor(&b).as_singleton(), Some(&u(0b0110)));
  }

  #[test]
  fn concat_extract() {
    let high = BvDomain::singleton(8, u(0xAB));
    let low = BvDomain::singleton(8, u(0xCD));
    let c = high.concat(&low);
    assert_eq!(c.width(), 16);
    assert_eq!(c.as_singleton(), Some(&u(0xABCD)));
    assert_eq!(c.extract(8, 8).as_singleton(), Some(&u(0xAB)));
    assert_eq!(c.extract(0, 8).as_singleton(), Some(&u(0xCD)));
    assert_eq!(c.extract(4, 8).as_singleton(), Some(&u(0xBC)));
  }

  #[test]
  fn comparisons() {
    let small = BvDomain::from_range(8, u(0), u(10));
    let large = BvDomain::from_range(8, u(11), u(255));
    assert_eq!(small.check_ult(&large), Tristate::True);
    assert_eq!(large.check_ult(&small), Tristate::False);
    assert!(!small.overlaps(&large));
    // 0xFF is -1 signed, 0x01 is 1 signed
    let neg = BvDomain::singleton(8, u(0xFF));
    let pos = BvDomain::singleton(8, u(1));
    assert_eq!(neg.check_slt(&pos), Tristate::True);
    assert_eq!(pos.check_slt(&neg), Tristate::False);
  }

  #[test]
  fn division() {
    let numerator = BvDomain::from_range(16, u(100), u(200));
    let ten = BvDomain::singleton(16, u(10));
    assert_eq!(numerator.udiv(&ten).unsigned_range(), (&u(10), &u(20)));

    let spread = BvDomain::from_range(16, u(8), u(12));
    assert_eq!(numerator.udiv(&spread).unsigned_range(), (&u(8), &u(25)));

    // Same quotient at both numerator endpoints: the remainder interval is exact.
    let r = BvDomain::from_range(16, u(5), u(7)).urem(&BvDomain::singleton(16, u(16)));
    assert_eq!(r.unsigned_range(), (&u(5), &u(7)));
    let bounded = numerator.urem(&spread);
    assert_eq!(bounded.unsigned_range(), (&u(0), &u(11)));

    // A divisor that may be zero yields no information.
    let unknown = numerator.udiv(&BvDomain::from_range(16, u(0), u(3)));
    assert_eq!(unknown.unsigned_range(), (&u(0), &u(0xFFFF)));
  }
}
