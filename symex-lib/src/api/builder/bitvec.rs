/*!

Bitvector constructors.

Arithmetic runs through `BvArithRing` sums (coefficients mod `2^w`); xor runs through the
`BvXorRing`, where a negation is the xor with the all-ones mask — so `¬¬x = x` and `x ⊕ x = 0`
fall out of sum canonicalization rather than being special-cased. N-ary and/or carry the mask
identity laws. Shifts and rotates by concrete amounts lower to extract/concat rewrites, and
`set_bit` is expressed through and/fill/xor so that repeated stores to one bit collapse.

*/

use std::collections::BTreeSet;

use symex_abs::{
  debug,
  numeric::{mask, pow2, BigInt, BigUint, traits::{One, Zero}},
};

use crate::{
  api::builder::ExprBuilder,
  core::{
    domain::Tristate,
    semiring::{BvArithRing, BvXorRing, LinearSum, Semiring},
    sort::Sort,
    term::{TermData, TermId},
  },
};

impl ExprBuilder {
  // region Sum plumbing

  pub(crate) fn to_bv_sum(&self, x: TermId) -> LinearSum<BigUint> {
    match self.data_of(x) {
      TermData::BvSum(sum) => sum.clone(),
      _ => {
        let width = self.sort_of(x).bv_width().expect("bitvector operation on a non-bitvector");
        LinearSum::var(&BvArithRing::new(width), x)
      }
    }
  }

  pub(crate) fn intern_bv_sum(&mut self, width: u32, sum: LinearSum<BigUint>) -> TermId {
    if let Some(x) = sum.as_var(&BvArithRing::new(width)) {
      return x;
    }
    self.intern(Sort::bitvec(width), TermData::BvSum(sum))
  }

  pub(crate) fn to_xor_sum(&self, x: TermId) -> LinearSum<BigUint> {
    let width = self.sort_of(x).bv_width().expect("bitvector operation on a non-bitvector");
    let ring = BvXorRing::new(width);
    match self.data_of(x) {
      TermData::BvXorSum(sum) => sum.clone(),
      _ => match self.known_bv(x) {
        Some(value) => LinearSum::constant(&ring, value),
        None => LinearSum::scaled_var(&ring, ring.one(), x),
      },
    }
  }

  pub(crate) fn intern_bv_xor_sum(&mut self, width: u32, sum: LinearSum<BigUint>) -> TermId {
    let ring = BvXorRing::new(width);
    if let Some(k) = sum.as_constant() {
      return self.bv_lit(width, k.clone());
    }
    if let Some(x) = sum.as_var(&ring) {
      return x;
    }
    self.intern(Sort::bitvec(width), TermData::BvXorSum(sum))
  }

  /// Recognizes `¬x`, i.e. the xor sum `(1…1 & x) ⊕ 1…1`.
  fn as_bv_not(&self, id: TermId) -> Option<TermId> {
    let TermData::BvXorSum(sum) = self.data_of(id) else {
      return None;
    };
    let width = self.sort_of(id).bv_width()?;
    let all_ones = mask(width);
    match sum.as_affine_var() {
      Some((coeff, x, offset)) if *coeff == all_ones && *offset == all_ones => Some(x),
      _ => None,
    }
  }

  // endregion

  // region Constants and arithmetic

  pub fn bv_lit(&mut self, width: u32, value: BigUint) -> TermId {
    let ring = BvArithRing::new(width);
    let sum = LinearSum::constant(&ring, value & mask(width));
    self.intern(Sort::bitvec(width), TermData::BvSum(sum))
  }

  pub fn bv_add(&mut self, x: TermId, y: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_add");
    self.expect_bv_width(y, width, "bv_add");
    let ring = BvArithRing::new(width);
    let sum = self.to_bv_sum(x).add(&ring, &self.to_bv_sum(y));
    self.intern_bv_sum(width, sum)
  }

  pub fn bv_sub(&mut self, x: TermId, y: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_sub");
    self.expect_bv_width(y, width, "bv_sub");
    let ring = BvArithRing::new(width);
    let minus_one = ring.neg(&ring.one());
    let sum = self.to_bv_sum(x).add_scaled(&ring, &minus_one, &self.to_bv_sum(y));
    self.intern_bv_sum(width, sum)
  }

  pub fn bv_neg(&mut self, x: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_neg");
    let ring = BvArithRing::new(width);
    let sum = self.to_bv_sum(x).negate(&ring);
    self.intern_bv_sum(width, sum)
  }

  pub fn bv_mul(&mut self, x: TermId, y: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_mul");
    self.expect_bv_width(y, width, "bv_mul");
    let ring = BvArithRing::new(width);
    if let Some(k) = self.known_bv(x) {
      let sum = self.to_bv_sum(y).scale(&ring, &k);
      return self.intern_bv_sum(width, sum);
    }
    if let Some(k) = self.known_bv(y) {
      let sum = self.to_bv_sum(x).scale(&ring, &k);
      return self.intern_bv_sum(width, sum);
    }
    let prod = self.to_prod(x).mul(&self.to_prod(y), false);
    self.intern_prod(&Sort::bitvec(width), prod)
  }

  // endregion

  // region Bitwise

  pub fn bv_and2(&mut self, x: TermId, y: TermId) -> TermId {
    self.bv_and(&[x, y])
  }

  /// N-ary bitwise and, with `x ∧ 0 = 0` and `x ∧ 1…1 = x`. A residual constant mask over a
  /// single operand becomes an xor-sum entry, the coefficient-as-bitmask form.
  pub fn bv_and(&mut self, items: &[TermId]) -> TermId {
    assert!(!items.is_empty(), "bv_and: empty operand list");
    let width = self.expect_bv(items[0], "bv_and");
    let all_ones = mask(width);

    let mut mask_const = all_ones.clone();
    let mut set: BTreeSet<TermId> = BTreeSet::new();
    let mut pending: Vec<TermId> = items.to_vec();
    while let Some(item) = pending.pop() {
      self.expect_bv_width(item, width, "bv_and");
      if let Some(value) = self.known_bv(item) {
        mask_const &= value;
        continue;
      }
      match self.data_of(item) {
        TermData::BvAnd(children) => pending.extend(children.iter().copied()),
        _ => {
          set.insert(item);
        }
      }
    }

    if mask_const.is_zero() {
      return self.bv_lit(width, BigUint::zero());
    }
    for &item in &set {
      if let Some(inner) = self.as_bv_not(item) {
        if set.contains(&inner) {
          debug!(4, "bvand collapsed to zero on complementary operands");
          return self.bv_lit(width, BigUint::zero());
        }
      }
    }

    match set.len() {
      0 => self.bv_lit(width, mask_const),
      1 => {
        let x = *set.iter().next().unwrap();
        if mask_const == all_ones {
          x
        } else {
          // A residual mask distributes over the operand's xor form.
          let ring = BvXorRing::new(width);
          let masked = self.to_xor_sum(x).scale(&ring, &mask_const);
          self.intern_bv_xor_sum(width, masked)
        }
      }
      _ => {
        if mask_const != all_ones {
          let lit = self.bv_lit(width, mask_const);
          set.insert(lit);
        }
        self.intern(Sort::bitvec(width), TermData::BvAnd(set.into_iter().collect()))
      }
    }
  }

  pub fn bv_or2(&mut self, x: TermId, y: TermId) -> TermId {
    self.bv_or(&[x, y])
  }

  /// N-ary bitwise or, with `x ∨ 0 = x` and `x ∨ 1…1 = 1…1`.
  pub fn bv_or(&mut self, items: &[TermId]) -> TermId {
    assert!(!items.is_empty(), "bv_or: empty operand list");
    let width = self.expect_bv(items[0], "bv_or");
    let all_ones = mask(width);

    let mut or_const = BigUint::zero();
    let mut set: BTreeSet<TermId> = BTreeSet::new();
    let mut pending: Vec<TermId> = items.to_vec();
    while let Some(item) = pending.pop() {
      self.expect_bv_width(item, width, "bv_or");
      if let Some(value) = self.known_bv(item) {
        or_const |= value;
        continue;
      }
      match self.data_of(item) {
        TermData::BvOr(children) => pending.extend(children.iter().copied()),
        _ => {
          set.insert(item);
        }
      }
    }

    if or_const == all_ones {
      return self.bv_lit(width, all_ones);
    }
    for &item in &set {
      if let Some(inner) = self.as_bv_not(item) {
        if set.contains(&inner) {
          return self.bv_lit(width, all_ones);
        }
      }
    }

    match set.len() {
      0 => self.bv_lit(width, or_const),
      1 if or_const.is_zero() => *set.iter().next().unwrap(),
      _ => {
        if !or_const.is_zero() {
          let lit = self.bv_lit(width, or_const);
          set.insert(lit);
        }
        self.intern(Sort::bitvec(width), TermData::BvOr(set.into_iter().collect()))
      }
    }
  }

  pub fn bv_xor(&mut self, x: TermId, y: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_xor");
    self.expect_bv_width(y, width, "bv_xor");
    let ring = BvXorRing::new(width);
    let sum = self.to_xor_sum(x).add(&ring, &self.to_xor_sum(y));
    self.intern_bv_xor_sum(width, sum)
  }

  pub fn bv_not(&mut self, x: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_not");
    let ring = BvXorRing::new(width);
    let sum = self.to_xor_sum(x).add_constant(&ring, &mask(width));
    self.intern_bv_xor_sum(width, sum)
  }

  // endregion

  // region Concat, extract, extensions

  /// `concat(x, y)` with `x` as the high part.
  pub fn bv_concat(&mut self, x: TermId, y: TermId) -> TermId {
    let high_width = self.expect_bv(x, "bv_concat");
    let low_width = self.expect_bv(y, "bv_concat");
    let width = high_width + low_width;

    if let (Some(high), Some(low)) = (self.known_bv(x), self.known_bv(y)) {
      return self.bv_lit(width, (high << low_width) | low);
    }
    // Adjacent slices of one base collapse back into a single slice.
    if let (
      TermData::BvExtract {
        arg: high_arg,
        offset: high_offset,
        ..
      },
      TermData::BvExtract {
        arg: low_arg,
        offset: low_offset,
        length: low_length,
      },
    ) = (self.data_of(x), self.data_of(y))
    {
      if high_arg == low_arg && *high_offset == low_offset + low_length {
        let (arg, offset) = (*high_arg, *low_offset);
        return self.bv_extract(arg, offset, width);
      }
    }
    self.intern(Sort::bitvec(width), TermData::BvConcat(x, y))
  }

  /// The `length`-bit field of `x` starting at bit `offset`.
  pub fn bv_extract(&mut self, x: TermId, offset: u32, length: u32) -> TermId {
    let width = self.expect_bv(x, "bv_extract");
    assert!(length >= 1, "bv_extract: empty slice");
    assert!(
      offset + length <= width,
      "bv_extract: slice [{offset}, {}) exceeds width {width}",
      offset + length
    );
    if length == width {
      return x;
    }
    if let Some(value) = self.known_bv(x) {
      return self.bv_lit(length, (value >> offset) & mask(length));
    }
    match self.data_of(x) {
      // A slice within one side of a concat routes to that side.
      TermData::BvConcat(high, low) => {
        let (high, low) = (*high, *low);
        let low_width = self.expect_bv(low, "bv_extract");
        if offset + length <= low_width {
          return self.bv_extract(low, offset, length);
        }
        if offset >= low_width {
          return self.bv_extract(high, offset - low_width, length);
        }
      }
      // A slice of a slice collapses.
      TermData::BvExtract {
        arg,
        offset: inner_offset,
        ..
      } => {
        let (arg, inner_offset) = (*arg, *inner_offset);
        return self.bv_extract(arg, offset + inner_offset, length);
      }
      _ => {}
    }
    self.intern(Sort::bitvec(length), TermData::BvExtract { arg: x, offset, length })
  }

  pub fn bv_zext(&mut self, x: TermId, new_width: u32) -> TermId {
    let width = self.expect_bv(x, "bv_zext");
    assert!(new_width >= width, "bv_zext: cannot narrow {width} to {new_width}");
    if new_width == width {
      return x;
    }
    if let Some(value) = self.known_bv(x) {
      return self.bv_lit(new_width, value);
    }
    self.intern(Sort::bitvec(new_width), TermData::BvZext(x))
  }

  pub fn bv_sext(&mut self, x: TermId, new_width: u32) -> TermId {
    let width = self.expect_bv(x, "bv_sext");
    assert!(new_width >= width, "bv_sext: cannot narrow {width} to {new_width}");
    if new_width == width {
      return x;
    }
    if let Some(value) = self.known_bv(x) {
      let sign_bit = pow2(width - 1);
      let extended = if value >= sign_bit {
        value | (mask(new_width) ^ mask(width))
      } else {
        value
      };
      return self.bv_lit(new_width, extended);
    }
    self.intern(Sort::bitvec(new_width), TermData::BvSext(x))
  }

  // endregion

  // region Shifts and rotates

  fn shift_amount(&self, amount: TermId, width: u32) -> Option<u32> {
    let value = self.known_bv(amount)?;
    if value >= BigUint::from(width) {
      Some(width)
    } else {
      Some(value.to_u32_digits().first().copied().unwrap_or(0))
    }
  }

  pub fn bv_shl(&mut self, x: TermId, amount: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_shl");
    self.expect_bv_width(amount, width, "bv_shl");
    match self.shift_amount(amount, width) {
      Some(0) => x,
      Some(k) if k >= width => self.bv_lit(width, BigUint::zero()),
      Some(k) => {
        let low = self.bv_extract(x, 0, width - k);
        let zeros = self.bv_lit(k, BigUint::zero());
        self.bv_concat(low, zeros)
      }
      None => self.intern(Sort::bitvec(width), TermData::BvShl(x, amount)),
    }
  }

  pub fn bv_lshr(&mut self, x: TermId, amount: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_lshr");
    self.expect_bv_width(amount, width, "bv_lshr");
    match self.shift_amount(amount, width) {
      Some(0) => x,
      Some(k) if k >= width => self.bv_lit(width, BigUint::zero()),
      Some(k) => {
        let high = self.bv_extract(x, k, width - k);
        self.bv_zext(high, width)
      }
      None => self.intern(Sort::bitvec(width), TermData::BvLshr(x, amount)),
    }
  }

  pub fn bv_ashr(&mut self, x: TermId, amount: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_ashr");
    self.expect_bv_width(amount, width, "bv_ashr");
    match self.shift_amount(amount, width) {
      Some(0) => x,
      Some(k) => {
        // Shifting by the width or more leaves only copies of the sign bit.
        let k = k.min(width - 1);
        let high = self.bv_extract(x, k, width - k);
        self.bv_sext(high, width)
      }
      None => self.intern(Sort::bitvec(width), TermData::BvAshr(x, amount)),
    }
  }

  pub fn bv_rol(&mut self, x: TermId, amount: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_rol");
    self.expect_bv_width(amount, width, "bv_rol");
    if let Some(value) = self.known_bv(amount) {
      let k = (value % BigUint::from(width)).to_u32_digits().first().copied().unwrap_or(0);
      if k == 0 {
        return x;
      }
      let high = self.bv_extract(x, 0, width - k);
      let low = self.bv_extract(x, width - k, k);
      return self.bv_concat(high, low);
    }
    self.intern(Sort::bitvec(width), TermData::BvRol(x, amount))
  }

  pub fn bv_ror(&mut self, x: TermId, amount: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_ror");
    self.expect_bv_width(amount, width, "bv_ror");
    if let Some(value) = self.known_bv(amount) {
      let k = (value % BigUint::from(width)).to_u32_digits().first().copied().unwrap_or(0);
      if k == 0 {
        return x;
      }
      let high = self.bv_extract(x, 0, k);
      let low = self.bv_extract(x, k, width - k);
      return self.bv_concat(high, low);
    }
    self.intern(Sort::bitvec(width), TermData::BvRor(x, amount))
  }

  // endregion

  // region Division

  /// Unsigned division. A zero divisor wraps and denotes an unspecified value; the engine stays
  /// usable.
  pub fn bv_udiv(&mut self, x: TermId, y: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_udiv");
    self.expect_bv_width(y, width, "bv_udiv");
    if let Some(divisor) = self.known_bv(y) {
      if divisor.is_zero() {
        debug!(3, "bv_udiv by zero wraps as an unspecified value");
        return self.intern(Sort::bitvec(width), TermData::BvUdiv(x, y));
      }
      if divisor.is_one() {
        return x;
      }
      if let Some(numerator) = self.known_bv(x) {
        return self.bv_lit(width, numerator / divisor);
      }
    }
    self.intern(Sort::bitvec(width), TermData::BvUdiv(x, y))
  }

  pub fn bv_urem(&mut self, x: TermId, y: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_urem");
    self.expect_bv_width(y, width, "bv_urem");
    if let Some(divisor) = self.known_bv(y) {
      if divisor.is_zero() {
        debug!(3, "bv_urem by zero wraps as an unspecified value");
        return self.intern(Sort::bitvec(width), TermData::BvUrem(x, y));
      }
      if divisor.is_one() {
        return self.bv_lit(width, BigUint::zero());
      }
      if let Some(numerator) = self.known_bv(x) {
        return self.bv_lit(width, numerator % divisor);
      }
    }
    self.intern(Sort::bitvec(width), TermData::BvUrem(x, y))
  }

  /// Signed division truncates toward zero, per SMT-LIB `bvsdiv`.
  pub fn bv_sdiv(&mut self, x: TermId, y: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_sdiv");
    self.expect_bv_width(y, width, "bv_sdiv");
    if let (Some(numerator), Some(divisor)) = (self.known_bv(x), self.known_bv(y)) {
      if !divisor.is_zero() {
        let n = to_signed(&numerator, width);
        let d = to_signed(&divisor, width);
        // BigInt division truncates toward zero, matching bvsdiv.
        return self.bv_lit(width, from_signed(&(&n / &d), width));
      }
    }
    self.intern(Sort::bitvec(width), TermData::BvSdiv(x, y))
  }

  /// Signed remainder takes the sign of the dividend, per SMT-LIB `bvsrem`.
  pub fn bv_srem(&mut self, x: TermId, y: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_srem");
    self.expect_bv_width(y, width, "bv_srem");
    if let (Some(numerator), Some(divisor)) = (self.known_bv(x), self.known_bv(y)) {
      if !divisor.is_zero() {
        let n = to_signed(&numerator, width);
        let d = to_signed(&divisor, width);
        let remainder = &n - (&n / &d) * &d;
        return self.bv_lit(width, from_signed(&remainder, width));
      }
    }
    self.intern(Sort::bitvec(width), TermData::BvSrem(x, y))
  }

  // endregion

  // region Comparisons and bit tests

  pub fn bv_ult(&mut self, x: TermId, y: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_ult");
    self.expect_bv_width(y, width, "bv_ult");
    if x == y {
      return self.false_lit();
    }
    match self.value_of(x).as_bv_domain().check_ult(self.value_of(y).as_bv_domain()) {
      Tristate::True => self.true_lit(),
      Tristate::False => self.false_lit(),
      Tristate::Any => self.intern(Sort::Bool, TermData::BvUlt(x, y)),
    }
  }

  pub fn bv_ule(&mut self, x: TermId, y: TermId) -> TermId {
    let reversed = self.bv_ult(y, x);
    self.not(reversed)
  }

  pub fn bv_slt(&mut self, x: TermId, y: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_slt");
    self.expect_bv_width(y, width, "bv_slt");
    if x == y {
      return self.false_lit();
    }
    match self.value_of(x).as_bv_domain().check_slt(self.value_of(y).as_bv_domain()) {
      Tristate::True => self.true_lit(),
      Tristate::False => self.false_lit(),
      Tristate::Any => self.intern(Sort::Bool, TermData::BvSlt(x, y)),
    }
  }

  pub fn bv_sle(&mut self, x: TermId, y: TermId) -> TermId {
    let reversed = self.bv_slt(y, x);
    self.not(reversed)
  }

  pub fn bv_test_bit(&mut self, x: TermId, index: u32) -> TermId {
    let width = self.expect_bv(x, "bv_test_bit");
    assert!(index < width, "bv_test_bit: bit {index} of a {width}-bit vector");
    match self.value_of(x).as_bv_domain().test_bit(index) {
      Tristate::True => self.true_lit(),
      Tristate::False => self.false_lit(),
      Tristate::Any => self.intern(Sort::Bool, TermData::BvTestBit { arg: x, index }),
    }
  }

  /// All-ones when `cond` holds, all-zeros otherwise.
  pub fn bv_fill(&mut self, width: u32, cond: TermId) -> TermId {
    self.expect_bool(cond, "bv_fill");
    match self.known_bool(cond) {
      Some(true) => self.bv_lit(width, mask(width)),
      Some(false) => self.bv_lit(width, BigUint::zero()),
      None => self.intern(Sort::bitvec(width), TermData::BvFill(cond)),
    }
  }

  /// Stores the predicate `p` into bit `index`: `(v ∧ ¬m) ⊕ (fill(p) ∧ m)`. Repeated stores to
  /// one bit collapse through xor normalization.
  pub fn bv_set_bit(&mut self, v: TermId, index: u32, p: TermId) -> TermId {
    let width = self.expect_bv(v, "bv_set_bit");
    assert!(index < width, "bv_set_bit: bit {index} of a {width}-bit vector");
    let bit = BigUint::one() << index;
    let keep = self.bv_lit(width, mask(width) ^ &bit);
    let store = self.bv_lit(width, bit);
    let cleared = self.bv_and2(v, keep);
    let filled = self.bv_fill(width, p);
    let stored = self.bv_and2(filled, store);
    self.bv_xor(cleared, stored)
  }

  // endregion

  // region Counting

  pub fn bv_popcount(&mut self, x: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_popcount");
    if let Some(value) = self.known_bv(x) {
      return self.bv_lit(width, BigUint::from(value.count_ones()));
    }
    self.intern(Sort::bitvec(width), TermData::BvPopcount(x))
  }

  pub fn bv_count_leading_zeros(&mut self, x: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_count_leading_zeros");
    if let Some(value) = self.known_bv(x) {
      return self.bv_lit(width, BigUint::from(width as u64 - value.bits()));
    }
    self.intern(Sort::bitvec(width), TermData::BvCountLeadingZeros(x))
  }

  pub fn bv_count_trailing_zeros(&mut self, x: TermId) -> TermId {
    let width = self.expect_bv(x, "bv_count_trailing_zeros");
    if let Some(value) = self.known_bv(x) {
      let count = value.trailing_zeros().unwrap_or(width as u64);
      return self.bv_lit(width, BigUint::from(count));
    }
    self.intern(Sort::bitvec(width), TermData::BvCountTrailingZeros(x))
  }

  // endregion

  // region Conversions

  pub fn int_to_bv(&mut self, x: TermId, width: u32) -> TermId {
    self.expect_int(x, "int_to_bv");
    if let Some(value) = self.known_int(x) {
      let reduced = int_to_unsigned_bits(&value, width);
      return self.bv_lit(width, reduced);
    }
    if let TermData::BvToInt { arg, .. } = self.data_of(x) {
      let arg = *arg;
      if self.sort_of(arg).bv_width() == Some(width) {
        return arg;
      }
    }
    self.intern(Sort::bitvec(width), TermData::IntToBv(x))
  }

  pub fn bv_to_int(&mut self, x: TermId, signed: bool) -> TermId {
    let width = self.expect_bv(x, "bv_to_int");
    if let Some(value) = self.known_bv(x) {
      let result = if signed {
        to_signed(&value, width)
      } else {
        BigInt::from(value)
      };
      return self.int_lit(result);
    }
    self.intern(Sort::Integer, TermData::BvToInt { arg: x, signed })
  }

  // endregion
}

/// Reinterprets a `width`-bit pattern under two's complement.
fn to_signed(value: &BigUint, width: u32) -> BigInt {
  if value >= &pow2(width - 1) {
    BigInt::from(value.clone()) - BigInt::from(pow2(width))
  } else {
    BigInt::from(value.clone())
  }
}

fn from_signed(value: &BigInt, width: u32) -> BigUint {
  let modulus = BigInt::from(pow2(width));
  let reduced = ((value % &modulus) + &modulus) % &modulus;
  reduced.magnitude().clone()
}

fn int_to_unsigned_bits(value: &BigInt, width: u32) -> BigUint {
  let modulus = BigInt::from(pow2(width));
  let reduced = ((value % &modulus) + &modulus) % &modulus;
  reduced.magnitude().clone()
}
