/*!

Float constructors. Constants are IEEE-754 bit patterns (the `Float(eb, sb)` family is
parametric, so no native float type fits); the float abstract domain is opaque. Structural
identities (`neg ∘ neg`, `abs ∘ abs`, bits round-trips) and everything decidable by decoding a
literal bit pattern — predicates, ordering, conversion to real — fold; rounding arithmetic does
not fold and always wraps.

*/

use symex_abs::numeric::{mask, pow2, BigInt, BigRational, BigUint, traits::{One, ToPrimitive, Zero}};

use crate::{
  api::builder::ExprBuilder,
  core::{
    sort::Sort,
    term::{FpBinOp, FpTestOp, RoundingMode, TermData, TermId},
  },
};

/// A decoded IEEE-754 literal. Both zeros decode to finite zero.
enum DecodedFloat {
  Nan,
  Infinite { negative: bool },
  Finite { value: BigRational },
}

impl ExprBuilder {
  #[track_caller]
  pub(crate) fn expect_float(&self, id: TermId, op: &str) -> (u32, u32) {
    match self.sort_of(id).float_format() {
      Some(format) => format,
      None => panic!("{op}: expected a float operand, got {}", self.sort_of(id)),
    }
  }

  fn known_float_bits(&self, id: TermId) -> Option<BigUint> {
    match self.data_of(id) {
      TermData::FloatLit(bits) => Some(bits.clone()),
      _ => None,
    }
  }

  /// A float constant from its IEEE-754 bit pattern.
  pub fn fp_lit(&mut self, eb: u32, sb: u32, bits: BigUint) -> TermId {
    let bits = bits & mask(eb + sb);
    self.intern(Sort::float(eb, sb), TermData::FloatLit(bits))
  }

  pub fn fp_pos_zero(&mut self, eb: u32, sb: u32) -> TermId {
    self.fp_lit(eb, sb, BigUint::zero())
  }

  pub fn fp_nan(&mut self, eb: u32, sb: u32) -> TermId {
    // Quiet NaN: exponent all ones, top mantissa bit set.
    let bits = (mask(eb) << (sb - 1)) | (BigUint::one() << (sb - 2));
    self.fp_lit(eb, sb, bits)
  }

  pub fn fp_infinity(&mut self, eb: u32, sb: u32, negative: bool) -> TermId {
    let mut bits = mask(eb) << (sb - 1);
    if negative {
      bits |= BigUint::one() << (eb + sb - 1);
    }
    self.fp_lit(eb, sb, bits)
  }

  pub fn fp_neg(&mut self, x: TermId) -> TermId {
    let (eb, sb) = self.expect_float(x, "fp_neg");
    if let Some(bits) = self.known_float_bits(x) {
      let flipped = bits ^ (BigUint::one() << (eb + sb - 1));
      return self.fp_lit(eb, sb, flipped);
    }
    if let TermData::FpNeg(inner) = self.data_of(x) {
      return *inner;
    }
    self.intern(Sort::float(eb, sb), TermData::FpNeg(x))
  }

  pub fn fp_abs(&mut self, x: TermId) -> TermId {
    let (eb, sb) = self.expect_float(x, "fp_abs");
    if let Some(bits) = self.known_float_bits(x) {
      let cleared = bits & mask(eb + sb - 1);
      return self.fp_lit(eb, sb, cleared);
    }
    match self.data_of(x) {
      TermData::FpAbs(_) => return x,
      TermData::FpNeg(inner) => {
        let inner = *inner;
        return self.fp_abs(inner);
      }
      _ => {}
    }
    self.intern(Sort::float(eb, sb), TermData::FpAbs(x))
  }

  pub fn fp_add(&mut self, rm: RoundingMode, x: TermId, y: TermId) -> TermId {
    self.fp_arith(FpBinOp::Add, rm, x, y)
  }

  pub fn fp_sub(&mut self, rm: RoundingMode, x: TermId, y: TermId) -> TermId {
    self.fp_arith(FpBinOp::Sub, rm, x, y)
  }

  pub fn fp_mul(&mut self, rm: RoundingMode, x: TermId, y: TermId) -> TermId {
    self.fp_arith(FpBinOp::Mul, rm, x, y)
  }

  pub fn fp_div(&mut self, rm: RoundingMode, x: TermId, y: TermId) -> TermId {
    self.fp_arith(FpBinOp::Div, rm, x, y)
  }

  fn fp_arith(&mut self, op: FpBinOp, rm: RoundingMode, lhs: TermId, rhs: TermId) -> TermId {
    let (eb, sb) = self.expect_float(lhs, "fp_arith");
    self.expect_same_sort(lhs, rhs, "fp_arith");
    self.intern(Sort::float(eb, sb), TermData::FpArith { op, rm, lhs, rhs })
  }

  pub fn fp_rem(&mut self, x: TermId, y: TermId) -> TermId {
    let (eb, sb) = self.expect_float(x, "fp_rem");
    self.expect_same_sort(x, y, "fp_rem");
    self.intern(Sort::float(eb, sb), TermData::FpRem(x, y))
  }

  /// Fused multiply-add: `x·y + z` with a single rounding.
  pub fn fp_fma(&mut self, rm: RoundingMode, x: TermId, y: TermId, z: TermId) -> TermId {
    let (eb, sb) = self.expect_float(x, "fp_fma");
    self.expect_same_sort(x, y, "fp_fma");
    self.expect_same_sort(x, z, "fp_fma");
    self.intern(Sort::float(eb, sb), TermData::FpFma { rm, x, y, z })
  }

  pub fn fp_sqrt(&mut self, rm: RoundingMode, x: TermId) -> TermId {
    let (eb, sb) = self.expect_float(x, "fp_sqrt");
    self.intern(Sort::float(eb, sb), TermData::FpSqrt { rm, arg: x })
  }

  pub fn fp_min(&mut self, x: TermId, y: TermId) -> TermId {
    let (eb, sb) = self.expect_float(x, "fp_min");
    self.expect_same_sort(x, y, "fp_min");
    if x == y {
      return x;
    }
    self.intern(Sort::float(eb, sb), TermData::FpMin(x, y))
  }

  pub fn fp_max(&mut self, x: TermId, y: TermId) -> TermId {
    let (eb, sb) = self.expect_float(x, "fp_max");
    self.expect_same_sort(x, y, "fp_max");
    if x == y {
      return x;
    }
    self.intern(Sort::float(eb, sb), TermData::FpMax(x, y))
  }

  /// Round to integral.
  pub fn fp_round(&mut self, rm: RoundingMode, x: TermId) -> TermId {
    let (eb, sb) = self.expect_float(x, "fp_round");
    if let TermData::FpRound { rm: inner_rm, .. } = self.data_of(x) {
      if *inner_rm == rm {
        return x;
      }
    }
    self.intern(Sort::float(eb, sb), TermData::FpRound { rm, arg: x })
  }

  pub fn fp_test(&mut self, op: FpTestOp, x: TermId) -> TermId {
    let (eb, sb) = self.expect_float(x, "fp_test");
    if let Some(bits) = self.known_float_bits(x) {
      let result = test_literal(op, &bits, eb, sb);
      return self.bool_lit(result);
    }
    self.intern(Sort::Bool, TermData::FpTest { op, arg: x })
  }

  /// IEEE `<=`: false whenever either side is NaN.
  pub fn fp_le(&mut self, x: TermId, y: TermId) -> TermId {
    let (eb, sb) = self.expect_float(x, "fp_le");
    self.expect_same_sort(x, y, "fp_le");
    if let (Some(a), Some(b)) = (self.known_float_bits(x), self.known_float_bits(y)) {
      let result = compare_literals(&a, &b, eb, sb).map(|ordering| ordering.is_le()).unwrap_or(false);
      return self.bool_lit(result);
    }
    self.intern(Sort::Bool, TermData::FpLe(x, y))
  }

  pub fn fp_lt(&mut self, x: TermId, y: TermId) -> TermId {
    let (eb, sb) = self.expect_float(x, "fp_lt");
    self.expect_same_sort(x, y, "fp_lt");
    if let (Some(a), Some(b)) = (self.known_float_bits(x), self.known_float_bits(y)) {
      let result = compare_literals(&a, &b, eb, sb).map(|ordering| ordering.is_lt()).unwrap_or(false);
      return self.bool_lit(result);
    }
    self.intern(Sort::Bool, TermData::FpLt(x, y))
  }

  /// Reinterprets a bitvector of width `eb + sb` as a float.
  pub fn fp_from_bits(&mut self, eb: u32, sb: u32, x: TermId) -> TermId {
    self.expect_bv_width(x, eb + sb, "fp_from_bits");
    if let Some(bits) = self.known_bv(x) {
      return self.fp_lit(eb, sb, bits);
    }
    if let TermData::FpToBits(inner) = self.data_of(x) {
      let inner = *inner;
      if self.sort_of(inner).float_format() == Some((eb, sb)) {
        return inner;
      }
    }
    self.intern(Sort::float(eb, sb), TermData::FpFromBits(x))
  }

  pub fn fp_to_bits(&mut self, x: TermId) -> TermId {
    let (eb, sb) = self.expect_float(x, "fp_to_bits");
    if let Some(bits) = self.known_float_bits(x) {
      return self.bv_lit(eb + sb, bits);
    }
    if let TermData::FpFromBits(inner) = self.data_of(x) {
      return *inner;
    }
    self.intern(Sort::bitvec(eb + sb), TermData::FpToBits(x))
  }

  /// The exact real value of a finite float; NaN and infinities yield an unspecified real.
  pub fn fp_to_real(&mut self, x: TermId) -> TermId {
    let (eb, sb) = self.expect_float(x, "fp_to_real");
    if let Some(bits) = self.known_float_bits(x) {
      if let DecodedFloat::Finite { value } = decode(&bits, eb, sb) {
        return self.real_lit(value);
      }
    }
    self.intern(Sort::Real, TermData::FpToReal(x))
  }

  /// Rounds a real into the given float format. Never folds: rounding a rational into a bit
  /// pattern is the solver's business, not the builder's.
  pub fn real_to_fp(&mut self, rm: RoundingMode, eb: u32, sb: u32, x: TermId) -> TermId {
    self.expect_real(x, "real_to_fp");
    self.intern(Sort::float(eb, sb), TermData::RealToFp { rm, arg: x })
  }
}

fn decode(bits: &BigUint, eb: u32, sb: u32) -> DecodedFloat {
  let man_width = sb - 1;
  let negative = !((bits >> (eb + man_width)) & BigUint::one()).is_zero();
  let exponent = (bits >> man_width) & mask(eb);
  let mantissa = bits & mask(man_width);

  if exponent == mask(eb) {
    return if mantissa.is_zero() {
      DecodedFloat::Infinite { negative }
    } else {
      DecodedFloat::Nan
    };
  }

  let bias = BigInt::from(pow2(eb - 1)) - 1;
  let (significand, exponent) = if exponent.is_zero() {
    // Subnormal: no hidden bit, exponent pinned to 1 - bias.
    (mantissa, BigInt::one() - &bias)
  } else {
    (mantissa + pow2(man_width), BigInt::from(exponent) - &bias)
  };

  // value = significand / 2^man_width * 2^exponent
  let shift: BigInt = exponent - BigInt::from(man_width);
  let magnitude = if shift >= BigInt::zero() {
    let power = shift.to_u32().expect("float exponent out of range");
    BigRational::from_integer(BigInt::from(significand) * BigInt::from(pow2(power)))
  } else {
    let power = (-shift).to_u32().expect("float exponent out of range");
    BigRational::new(BigInt::from(significand), BigInt::from(pow2(power)))
  };
  let value = if negative { -magnitude } else { magnitude };
  DecodedFloat::Finite { value }
}

/// IEEE ordering of two literals; `None` when either is NaN. Both zeros compare equal.
fn compare_literals(a: &BigUint, b: &BigUint, eb: u32, sb: u32) -> Option<std::cmp::Ordering> {
  let left = decode(a, eb, sb);
  let right = decode(b, eb, sb);
  use std::cmp::Ordering;
  use DecodedFloat::*;
  match (left, right) {
    (Nan, _) | (_, Nan) => None,
    (Infinite { negative: a }, Infinite { negative: b }) => Some(if a == b {
      Ordering::Equal
    } else if a {
      Ordering::Less
    } else {
      Ordering::Greater
    }),
    (Infinite { negative }, Finite { .. }) => Some(if negative { Ordering::Less } else { Ordering::Greater }),
    (Finite { .. }, Infinite { negative }) => Some(if negative { Ordering::Greater } else { Ordering::Less }),
    (Finite { value: a }, Finite { value: b }) => Some(a.cmp(&b)),
  }
}

fn test_literal(op: FpTestOp, bits: &BigUint, eb: u32, sb: u32) -> bool {
  let man_width = sb - 1;
  let negative = !((bits >> (eb + man_width)) & BigUint::one()).is_zero();
  let exponent = (bits >> man_width) & mask(eb);
  let mantissa = bits & mask(man_width);
  let is_nan = exponent == mask(eb) && !mantissa.is_zero();
  match op {
    FpTestOp::IsNan => is_nan,
    FpTestOp::IsInfinite => exponent == mask(eb) && mantissa.is_zero(),
    FpTestOp::IsZero => exponent.is_zero() && mantissa.is_zero(),
    FpTestOp::IsSubnormal => exponent.is_zero() && !mantissa.is_zero(),
    FpTestOp::IsNegative => negative && !is_nan,
    FpTestOp::IsPositive => !negative && !is_nan,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // IEEE single-precision bit patterns
  const ONE: u32 = 0x3F80_0000;
  const NEG_TWO: u32 = 0xC000_0000;
  const NAN: u32 = 0x7FC0_0000;
  const NEG_ZERO: u32 = 0x8000_0000;

  fn dec(bits: u32) -> DecodedFloat {
    decode(&BigUint::from(bits), 8, 24)
  }

  #[test]
  fn decodes_normals() {
    match dec(ONE) {
      DecodedFloat::Finite { value } => assert_eq!(value, BigRational::from_integer(BigInt::from(1))),
      _ => panic!("expected finite"),
    }
    match dec(NEG_TWO) {
      DecodedFloat::Finite { value } => assert_eq!(value, BigRational::from_integer(BigInt::from(-2))),
      _ => panic!("expected finite"),
    }
  }

  #[test]
  fn decodes_specials() {
    assert!(matches!(dec(NAN), DecodedFloat::Nan));
    assert!(matches!(dec(0x7F80_0000), DecodedFloat::Infinite { negative: false }));
    match dec(NEG_ZERO) {
      DecodedFloat::Finite { value } => assert!(value.numer().is_zero()),
      _ => panic!("expected finite zero"),
    }
  }

  #[test]
  fn ordering_handles_nan_and_zeros() {
    use std::cmp::Ordering;
    let (a, b) = (BigUint::from(ONE), BigUint::from(NEG_TWO));
    assert_eq!(compare_literals(&a, &b, 8, 24), Some(Ordering::Greater));
    assert_eq!(compare_literals(&BigUint::from(NAN), &a, 8, 24), None);
    // -0 == +0
    assert_eq!(
      compare_literals(&BigUint::from(NEG_ZERO), &BigUint::zero(), 8, 24),
      Some(Ordering::Equal)
    );
  }

  #[test]
  fn subnormal_decoding() {
    // Smallest positive subnormal of Float(8, 24): 2^-149
    match dec(1) {
      DecodedFloat::Finite { value } => {
        assert_eq!(value, BigRational::new(BigInt::from(1), BigInt::from(pow2(149))));
      }
      _ => panic!("expected finite"),
    }
  }
}
