use std::collections::BTreeMap;

use symex_abs::numeric::{BigInt, traits::Zero};

use crate::core::{
  semiring::{reduce_coeff_mod, Semiring},
  term::TermId,
};

/// A weighted sum `Σ cᵢ·xᵢ + k` over one of the semirings, stored as an ordered map from term
/// identity to coefficient plus a scalar offset.
///
/// Canonicalization invariant: no stored coefficient is zero. Together with the ordered map this
/// makes structural equality of sums coincide with semantic equality of their canonical forms,
/// and makes the derived hash independent of insertion order.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct LinearSum<C> {
  terms:  BTreeMap<TermId, C>,
  offset: C,
}

impl<C: Clone + Eq> LinearSum<C> {
  pub fn constant<R: Semiring<Coeff = C>>(_ring: &R, k: C) -> Self {
    LinearSum {
      terms: BTreeMap::new(),
      offset: k,
    }
  }

  pub fn zero<R: Semiring<Coeff = C>>(ring: &R) -> Self {
    Self::constant(ring, ring.zero())
  }

  pub fn var<R: Semiring<Coeff = C>>(ring: &R, x: TermId) -> Self {
    Self::scaled_var(ring, ring.one(), x)
  }

  pub fn scaled_var<R: Semiring<Coeff = C>>(ring: &R, coeff: C, x: TermId) -> Self {
    let mut terms = BTreeMap::new();
    if !ring.is_zero(&coeff) {
      terms.insert(x, coeff);
    }
    LinearSum {
      terms,
      offset: ring.zero(),
    }
  }

  pub fn from_terms<R: Semiring<Coeff = C>>(ring: &R, entries: impl IntoIterator<Item = (C, TermId)>) -> Self {
    let mut sum = Self::zero(ring);
    for (coeff, term) in entries {
      sum.insert_term(ring, coeff, term);
    }
    sum
  }

  /// Adds `coeff·term`, removing the entry if the combined coefficient vanishes.
  pub fn insert_term<R: Semiring<Coeff = C>>(&mut self, ring: &R, coeff: C, term: TermId) {
    if ring.is_zero(&coeff) {
      return;
    }
    match self.terms.get(&term) {
      Some(existing) => {
        let combined = ring.add(existing, &coeff);
        if ring.is_zero(&combined) {
          self.terms.remove(&term);
        } else {
          self.terms.insert(term, combined);
        }
      }
      None => {
        self.terms.insert(term, coeff);
      }
    }
  }

  pub fn add<R: Semiring<Coeff = C>>(&self, ring: &R, other: &Self) -> Self {
    let mut result = self.clone();
    for (term, coeff) in &other.terms {
      result.insert_term(ring, coeff.clone(), *term);
    }
    result.offset = ring.add(&self.offset, &other.offset);
    result
  }

  /// `self + factor·other`.
  pub fn add_scaled<R: Semiring<Coeff = C>>(&self, ring: &R, factor: &C, other: &Self) -> Self {
    let mut result = self.clone();
    for (term, coeff) in &other.terms {
      result.insert_term(ring, ring.mul(factor, coeff), *term);
    }
    result.offset = ring.add(&self.offset, &ring.mul(factor, &other.offset));
    result
  }

  pub fn scale<R: Semiring<Coeff = C>>(&self, ring: &R, factor: &C) -> Self {
    if ring.is_zero(factor) {
      return Self::zero(ring);
    }
    let mut terms = BTreeMap::new();
    for (term, coeff) in &self.terms {
      let scaled = ring.mul(factor, coeff);
      if !ring.is_zero(&scaled) {
        terms.insert(*term, scaled);
      }
    }
    LinearSum {
      terms,
      offset: ring.mul(factor, &self.offset),
    }
  }

  pub fn add_constant<R: Semiring<Coeff = C>>(&self, ring: &R, k: &C) -> Self {
    let mut result = self.clone();
    result.offset = ring.add(&self.offset, k);
    result
  }

  pub fn negate<R: Semiring<Coeff = C>>(&self, ring: &R) -> Self {
    let negative_one = ring.neg(&ring.one());
    self.scale(ring, &negative_one)
  }

  // region Recognizers

  /// `Some(k)` iff the term map is empty.
  pub fn as_constant(&self) -> Option<&C> {
    if self.terms.is_empty() {
      Some(&self.offset)
    } else {
      None
    }
  }

  /// `Some(x)` iff the sum is exactly `1·x` with zero offset.
  pub fn as_var<R: Semiring<Coeff = C>>(&self, ring: &R) -> Option<TermId> {
    match self.as_weighted_var(ring) {
      Some((coeff, x)) if *coeff == ring.one() => Some(x),
      _ => None,
    }
  }

  /// `Some((c, x))` iff the sum is exactly `c·x` with zero offset.
  pub fn as_weighted_var<R: Semiring<Coeff = C>>(&self, ring: &R) -> Option<(&C, TermId)> {
    if !ring.is_zero(&self.offset) {
      return None;
    }
    self.as_affine_var().map(|(c, x, _)| (c, x))
  }

  /// `Some((c, x, k))` iff the sum has exactly one entry.
  pub fn as_affine_var(&self) -> Option<(&C, TermId, &C)> {
    if self.terms.len() != 1 {
      return None;
    }
    let (term, coeff) = self.terms.iter().next().unwrap();
    Some((coeff, *term, &self.offset))
  }

  // endregion

  #[inline(always)]
  pub fn offset(&self) -> &C {
    &self.offset
  }

  #[inline(always)]
  pub fn len(&self) -> usize {
    self.terms.len()
  }

  #[inline(always)]
  pub fn is_empty(&self) -> bool {
    self.terms.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (TermId, &C)> + '_ {
    self.terms.iter().map(|(term, coeff)| (*term, coeff))
  }

  /// Splits the shared part out of two sums: returns `(z, x', y')` with `self = z + x'` and
  /// `other = z + y'`, where `z` holds exactly the entries present in both with equal
  /// coefficient, and the offset when both offsets agree. Used to preserve sharing across ITE
  /// branches.
  pub fn extract_common<R: Semiring<Coeff = C>>(&self, ring: &R, other: &Self) -> (Self, Self, Self) {
    let mut common = Self::zero(ring);
    let mut left = self.clone();
    let mut right = other.clone();

    for (term, coeff) in &self.terms {
      if other.terms.get(term) == Some(coeff) {
        common.terms.insert(*term, coeff.clone());
        left.terms.remove(term);
        right.terms.remove(term);
      }
    }
    if self.offset == other.offset {
      common.offset = self.offset.clone();
      left.offset = ring.zero();
      right.offset = ring.zero();
    }

    (common, left, right)
  }

  /// Folds the sum with the supplied operations. A non-zero offset seeds the accumulator with
  /// `const_fn(k)`; otherwise the first entry seeds it with `mul_fn(c₁, x₁)`.
  pub fn eval<A, R: Semiring<Coeff = C>>(
    &self,
    ring: &R,
    mut add_fn: impl FnMut(A, A) -> A,
    mut mul_fn: impl FnMut(&C, TermId) -> A,
    mut const_fn: impl FnMut(&C) -> A,
  ) -> A {
    let mut entries = self.terms.iter();
    let mut acc = if !ring.is_zero(&self.offset) || self.terms.is_empty() {
      const_fn(&self.offset)
    } else {
      let (term, coeff) = entries.next().unwrap();
      mul_fn(coeff, *term)
    };
    for (term, coeff) in entries {
      acc = add_fn(acc, mul_fn(coeff, *term));
    }
    acc
  }
}

impl LinearSum<BigInt> {
  /// Reduces every coefficient and the offset modulo `k`, dropping entries that vanish. Used to
  /// prove divisibility and modular equalities.
  pub fn reduce_mod_k(&self, k: &BigInt) -> LinearSum<BigInt> {
    debug_assert!(!k.is_zero(), "reduce_mod_k: zero modulus");
    let mut terms = BTreeMap::new();
    for (term, coeff) in &self.terms {
      let reduced = reduce_coeff_mod(coeff, k);
      if !reduced.is_zero() {
        terms.insert(*term, reduced);
      }
    }
    LinearSum {
      terms,
      offset: reduce_coeff_mod(&self.offset, k),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::semiring::{BvXorRing, IntRing};
  use symex_abs::numeric::BigUint;

  fn tid(raw: u32) -> TermId {
    TermId::from_raw(raw)
  }

  #[test]
  fn cancellation_removes_entries() {
    let ring = IntRing;
    let x = LinearSum::var(&ring, tid(1));
    let sum = x.add_scaled(&ring, &BigInt::from(-1), &x);
    assert_eq!(sum.as_constant(), Some(&BigInt::zero()));
  }

  #[test]
  fn recognizers() {
    let ring = IntRing;
    let x = LinearSum::var(&ring, tid(1));
    assert_eq!(x.as_var(&ring), Some(tid(1)));

    let weighted = LinearSum::scaled_var(&ring, BigInt::from(3), tid(1));
    assert_eq!(weighted.as_var(&ring), None);
    assert_eq!(weighted.as_weighted_var(&ring), Some((&BigInt::from(3), tid(1))));

    let affine = weighted.add_constant(&ring, &BigInt::from(7));
    assert_eq!(affine.as_weighted_var(&ring), None);
    assert_eq!(affine.as_affine_var(), Some((&BigInt::from(3), tid(1), &BigInt::from(7))));
  }

  #[test]
  fn scale_by_zero_collapses() {
    let ring = IntRing;
    let sum = LinearSum::from_terms(&ring, [(BigInt::from(2), tid(1)), (BigInt::from(5), tid(2))])
      .add_constant(&ring, &BigInt::from(9));
    assert_eq!(sum.scale(&ring, &BigInt::zero()).as_constant(), Some(&BigInt::zero()));
  }

  #[test]
  fn reduce_mod() {
    let ring = IntRing;
    let sum = LinearSum::from_terms(&ring, [(BigInt::from(6), tid(1)), (BigInt::from(7), tid(2))])
      .add_constant(&ring, &BigInt::from(-5));
    let reduced = sum.reduce_mod_k(&BigInt::from(3));
    // 6 ≡ 0 drops, 7 ≡ 1 stays, -5 ≡ 1
    assert_eq!(reduced.len(), 1);
    assert_eq!(reduced.offset(), &BigInt::from(1));
  }

  #[test]
  fn extract_common_shares_entries() {
    let ring = IntRing;
    let a = LinearSum::from_terms(&ring, [(BigInt::from(2), tid(1)), (BigInt::from(3), tid(2))]);
    let b = LinearSum::from_terms(&ring, [(BigInt::from(2), tid(1)), (BigInt::from(4), tid(3))]);
    let (common, left, right) = a.extract_common(&ring, &b);
    assert_eq!(common.as_weighted_var(&ring), Some((&BigInt::from(2), tid(1))));
    assert_eq!(left.as_weighted_var(&ring), Some((&BigInt::from(3), tid(2))));
    assert_eq!(right.as_weighted_var(&ring), Some((&BigInt::from(4), tid(3))));
    assert_eq!(common.add(&ring, &left), a);
    assert_eq!(common.add(&ring, &right), b);
  }

  #[test]
  fn xor_coefficients_cancel() {
    let ring = BvXorRing::new(16);
    let x = LinearSum::var(&ring, tid(1));
    let cancelled = x.add(&ring, &x);
    assert_eq!(cancelled.as_constant(), Some(&BigUint::from(0u32)));
  }

  #[test]
  fn eval_seeds_from_offset_or_first_entry() {
    let ring = IntRing;
    let sum = LinearSum::from_terms(&ring, [(BigInt::from(2), tid(1))]).add_constant(&ring, &BigInt::from(5));
    let total = sum.eval(
      &ring,
      |a, b| a + b,
      |c, t| c * BigInt::from(t.as_raw() as i64 * 10),
      |k| k.clone(),
    );
    // 5 + 2*10
    assert_eq!(total, BigInt::from(25));

    let no_offset = LinearSum::from_terms(&ring, [(BigInt::from(2), tid(1))]);
    let total = no_offset.eval(
      &ring,
      |a, b| a + b,
      |c, t| c * BigInt::from(t.as_raw() as i64 * 10),
      |k| k.clone(),
    );
    assert_eq!(total, BigInt::from(20));
  }
}
