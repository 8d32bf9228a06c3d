use std::fmt::Write;

use symex_abs::numeric::{int_div, BigInt, traits::{Signed, Zero}};

use crate::{
  core::{
    domain::tristate::Tristate,
    format::{FormatStyle, Formattable},
  },
  impl_display_debug_for_formattable,
};

/// An integer interval with optionally absent (infinite) endpoints.
///
/// Covers the shapes `{x}`, `[lo,hi]`, `[lo,inf)`, `(-inf,hi]`, and `(-inf,inf)`. The invariant
/// `lo <= hi` holds whenever both endpoints are present.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct IntRange {
  /// `None` is negative infinity.
  pub lo: Option<BigInt>,
  /// `None` is positive infinity.
  pub hi: Option<BigInt>,
}

impl IntRange {
  pub fn top() -> IntRange {
    IntRange { lo: None, hi: None }
  }

  pub fn singleton(value: BigInt) -> IntRange {
    IntRange {
      lo: Some(value.clone()),
      hi: Some(value),
    }
  }

  pub fn bounded(lo: BigInt, hi: BigInt) -> IntRange {
    debug_assert!(lo <= hi, "empty integer range [{lo}, {hi}]");
    IntRange {
      lo: Some(lo),
      hi: Some(hi),
    }
  }

  pub fn at_least(lo: BigInt) -> IntRange {
    IntRange {
      lo: Some(lo),
      hi: None,
    }
  }

  pub fn at_most(hi: BigInt) -> IntRange {
    IntRange {
      lo: None,
      hi: Some(hi),
    }
  }

  pub fn non_negative() -> IntRange {
    IntRange::at_least(BigInt::zero())
  }

  pub fn as_singleton(&self) -> Option<&BigInt> {
    match (&self.lo, &self.hi) {
      (Some(lo), Some(hi)) if lo == hi => Some(lo),
      _ => None,
    }
  }

  pub fn contains(&self, value: &BigInt) -> bool {
    self.lo.as_ref().is_none_or(|lo| lo <= value) && self.hi.as_ref().is_none_or(|hi| value <= hi)
  }

  pub fn join(&self, other: &IntRange) -> IntRange {
    IntRange {
      lo: match (&self.lo, &other.lo) {
        (Some(a), Some(b)) => Some(a.min(b).clone()),
        _ => None,
      },
      hi: match (&self.hi, &other.hi) {
        (Some(a), Some(b)) => Some(a.max(b).clone()),
        _ => None,
      },
    }
  }

  /// Intersection. Returns `None` when the ranges are disjoint.
  pub fn meet(&self, other: &IntRange) -> Option<IntRange> {
    let lo = match (&self.lo, &other.lo) {
      (Some(a), Some(b)) => Some(a.max(b).clone()),
      (Some(a), None) | (None, Some(a)) => Some(a.clone()),
      (None, None) => None,
    };
    let hi = match (&self.hi, &other.hi) {
      (Some(a), Some(b)) => Some(a.min(b).clone()),
      (Some(a), None) | (None, Some(a)) => Some(a.clone()),
      (None, None) => None,
    };
    if let (Some(lo), Some(hi)) = (&lo, &hi) {
      if lo > hi {
        return None;
      }
    }
    Some(IntRange { lo, hi })
  }

  pub fn overlaps(&self, other: &IntRange) -> bool {
    self.meet(other).is_some()
  }

  pub fn check_eq(&self, other: &IntRange) -> Tristate {
    if let (Some(a), Some(b)) = (self.as_singleton(), other.as_singleton()) {
      return Tristate::singleton(a == b);
    }
    if !self.overlaps(other) {
      return Tristate::False;
    }
    Tristate::Any
  }

  /// `True` when every value of `self` is `<=` every value of `other`, `False` when every value
  /// of `self` is `>` every value of `other`.
  pub fn check_le(&self, other: &IntRange) -> Tristate {
    if let (Some(hi), Some(lo)) = (&self.hi, &other.lo) {
      if hi <= lo {
        return Tristate::True;
      }
    }
    if let (Some(lo), Some(hi)) = (&self.lo, &other.hi) {
      if lo > hi {
        return Tristate::False;
      }
    }
    Tristate::Any
  }

  pub fn add(&self, other: &IntRange) -> IntRange {
    IntRange {
      lo: add_endpoints(&self.lo, &other.lo),
      hi: add_endpoints(&self.hi, &other.hi),
    }
  }

  pub fn neg(&self) -> IntRange {
    IntRange {
      lo: self.hi.as_ref().map(|hi| -hi),
      hi: self.lo.as_ref().map(|lo| -lo),
    }
  }

  pub fn scale(&self, factor: &BigInt) -> IntRange {
    if factor.is_zero() {
      return IntRange::singleton(BigInt::zero());
    }
    let lo = self.lo.as_ref().map(|v| v * factor);
    let hi = self.hi.as_ref().map(|v| v * factor);
    if factor.is_negative() {
      IntRange { lo: hi, hi: lo }
    } else {
      IntRange { lo, hi }
    }
  }

  /// Interval multiplication. Exact for bounded operands; `top` when either side is unbounded
  /// and not a singleton zero.
  pub fn mul(&self, other: &IntRange) -> IntRange {
    if self.as_singleton().is_some_and(|v| v.is_zero()) || other.as_singleton().is_some_and(|v| v.is_zero()) {
      return IntRange::singleton(BigInt::zero());
    }
    if let Some(factor) = self.as_singleton() {
      return other.scale(factor);
    }
    if let Some(factor) = other.as_singleton() {
      return self.scale(factor);
    }
    match (&self.lo, &self.hi, &other.lo, &other.hi) {
      (Some(a), Some(b), Some(c), Some(d)) => {
        let products = [a * c, a * d, b * c, b * d];
        IntRange::bounded(
          products.iter().min().unwrap().clone(),
          products.iter().max().unwrap().clone(),
        )
      }
      _ => IntRange::top(),
    }
  }

  /// SMT-LIB (Euclidean) division of this range by the divisor range.
  ///
  /// When the divisor is strictly positive the result endpoints are the extrema of the floor
  /// quotients of the numerator endpoints by the divisor endpoints. A strictly negative divisor
  /// reduces to the positive case through `x div y = -(x div -y)`. A divisor range that may
  /// contain zero gives an unbounded result.
  pub fn div(&self, divisor: &IntRange) -> IntRange {
    // Strictly negative divisor: flip into the strictly positive case.
    if divisor.hi.as_ref().is_some_and(|hi| hi.is_negative()) {
      return self.div(&divisor.neg()).neg();
    }
    let Some(d_lo) = divisor.lo.as_ref().filter(|lo| lo.is_positive()) else {
      return IntRange::top();
    };

    let quotients = |endpoint: &Option<BigInt>| -> Option<(BigInt, BigInt)> {
      endpoint.as_ref().map(|n| {
        let a = int_div(n, d_lo);
        let b = match &divisor.hi {
          Some(d_hi) => int_div(n, d_hi),
          // Divisor unbounded above: n/d tends to 0 from the side of sign(n).
          None => {
            if n.is_negative() {
              -BigInt::from(1)
            } else {
              BigInt::zero()
            }
          }
        };
        (a.clone().min(b.clone()), a.max(b))
      })
    };

    IntRange {
      lo: quotients(&self.lo).map(|(min, _)| min),
      hi: quotients(&self.hi).map(|(_, max)| max),
    }
  }

  /// SMT-LIB modulus: when the divisor's absolute-value range excludes zero the result lies in
  /// `[0, max|d| - 1]`; otherwise only the non-negativity of `mod` survives.
  pub fn rem(&self, divisor: &IntRange) -> IntRange {
    if !divisor.contains(&BigInt::zero()) {
      if let (Some(d_lo), Some(d_hi)) = (&divisor.lo, &divisor.hi) {
        let bound = d_lo.abs().max(d_hi.abs()) - 1;
        return IntRange::bounded(BigInt::zero(), bound);
      }
    }
    IntRange::non_negative()
  }
}

fn add_endpoints(a: &Option<BigInt>, b: &Option<BigInt>) -> Option<BigInt> {
  match (a, b) {
    (Some(a), Some(b)) => Some(a + b),
    _ => None,
  }
}

impl Formattable for IntRange {
  fn repr(&self, out: &mut dyn Write, _style: FormatStyle) -> std::fmt::Result {
    if let Some(v) = self.as_singleton() {
      return write!(out, "{{{v}}}");
    }
    match &self.lo {
      Some(lo) => write!(out, "[{lo}, ")?,
      None => write!(out, "(-inf, ")?,
    }
    match &self.hi {
      Some(hi) => write!(out, "{hi}]"),
      None => write!(out, "inf)"),
    }
  }
}

impl_display_debug_for_formattable!(IntRange);

#[cfg(test)]
mod tests {
  use super::*;

  fn b(lo: i64, hi: i64) -> IntRange {
    IntRange::bounded(BigInt::from(lo), BigInt::from(hi))
  }

  #[test]
  fn join_and_meet() {
    assert_eq!(b(0, 3).join(&b(5, 9)), b(0, 9));
    assert_eq!(b(0, 3).meet(&b(2, 9)), Some(b(2, 3)));
    assert_eq!(b(0, 3).meet(&b(4, 9)), None);
    assert_eq!(IntRange::at_least(BigInt::zero()).join(&b(-1, 1)).lo, Some(BigInt::from(-1)));
  }

  #[test]
  fn arithmetic() {
    assert_eq!(b(1, 2).add(&b(10, 20)), b(11, 22));
    assert_eq!(b(1, 2).neg(), b(-2, -1));
    assert_eq!(b(1, 2).scale(&BigInt::from(-3)), b(-6, -3));
    assert_eq!(b(-2, 3).mul(&b(-1, 4)), b(-8, 12));
  }

  #[test]
  fn division_by_positive_divisor() {
    assert_eq!(b(10, 21).div(&b(2, 5)), b(2, 10));
    assert_eq!(b(-7, 7).div(&b(2, 2)), b(-4, 3));
    // Divisor straddles zero: unbounded.
    assert_eq!(b(10, 21).div(&b(-1, 1)), IntRange::top());
  }

  #[test]
  fn division_by_negative_divisor() {
    // 7 div -2 = -3, -7 div -2 = 4
    assert_eq!(b(-7, 7).div(&b(-2, -2)), b(-3, 4));
  }

  #[test]
  fn modulus() {
    assert_eq!(b(-100, 100).rem(&b(3, 7)), b(0, 6));
    assert_eq!(b(-100, 100).rem(&b(-7, -3)), b(0, 6));
    assert_eq!(b(-100, 100).rem(&b(-7, 3)), IntRange::non_negative());
  }

  #[test]
  fn comparisons() {
    assert_eq!(b(0, 3).check_le(&b(3, 9)), Tristate::True);
    assert_eq!(b(4, 5).check_le(&b(0, 3)), Tristate::False);
    assert_eq!(b(0, 5).check_le(&b(3, 9)), Tristate::Any);
    assert_eq!(b(2, 2).check_eq(&b(2, 2)), Tristate::True);
    assert_eq!(b(2, 2).check_eq(&b(3, 3)), Tristate::False);
  }
}
