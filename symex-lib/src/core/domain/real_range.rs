use std::fmt::Write;

use symex_abs::numeric::{BigRational, traits::Zero};

use crate::{
  core::{
    domain::tristate::Tristate,
    format::{FormatStyle, Formattable},
  },
  impl_display_debug_for_formattable,
};

/// One endpoint of a rational interval.
#[derive(Clone, PartialEq, Eq, Hash, Default, Debug)]
pub enum Bound {
  #[default]
  Unbounded,
  Inclusive(BigRational),
  Exclusive(BigRational),
}

impl Bound {
  pub fn value(&self) -> Option<&BigRational> {
    match self {
      Bound::Unbounded => None,
      Bound::Inclusive(v) | Bound::Exclusive(v) => Some(v),
    }
  }

  fn is_exclusive(&self) -> bool {
    matches!(self, Bound::Exclusive(_))
  }

  fn map(&self, f: impl FnOnce(&BigRational) -> BigRational) -> Bound {
    match self {
      Bound::Unbounded => Bound::Unbounded,
      Bound::Inclusive(v) => Bound::Inclusive(f(v)),
      Bound::Exclusive(v) => Bound::Exclusive(f(v)),
    }
  }
}

/// The abstract domain for the real sort: a rational interval with open or closed endpoints,
/// together with a tristate tracking whether the value is known to be an integer.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct RealRange {
  pub lo:       Bound,
  pub hi:       Bound,
  pub integral: Tristate,
}

impl RealRange {
  pub fn top() -> RealRange {
    RealRange::default()
  }

  pub fn singleton(value: BigRational) -> RealRange {
    let integral = Tristate::singleton(value.is_integer());
    RealRange {
      lo: Bound::Inclusive(value.clone()),
      hi: Bound::Inclusive(value),
      integral,
    }
  }

  pub fn bounded(lo: BigRational, hi: BigRational) -> RealRange {
    debug_assert!(lo <= hi, "empty real range");
    RealRange {
      lo: Bound::Inclusive(lo),
      hi: Bound::Inclusive(hi),
      integral: Tristate::Any,
    }
  }

  pub fn as_singleton(&self) -> Option<&BigRational> {
    match (&self.lo, &self.hi) {
      (Bound::Inclusive(lo), Bound::Inclusive(hi)) if lo == hi => Some(lo),
      _ => None,
    }
  }

  pub fn contains(&self, value: &BigRational) -> bool {
    let above_lo = match &self.lo {
      Bound::Unbounded => true,
      Bound::Inclusive(lo) => lo <= value,
      Bound::Exclusive(lo) => lo < value,
    };
    let below_hi = match &self.hi {
      Bound::Unbounded => true,
      Bound::Inclusive(hi) => value <= hi,
      Bound::Exclusive(hi) => value < hi,
    };
    above_lo && below_hi && self.integral.contains(value.is_integer())
  }

  pub fn join(&self, other: &RealRange) -> RealRange {
    RealRange {
      lo: join_lo(&self.lo, &other.lo),
      hi: join_hi(&self.hi, &other.hi),
      integral: self.integral.join(other.integral),
    }
  }

  pub fn overlaps(&self, other: &RealRange) -> bool {
    if self.integral.check_eq(other.integral) == Tristate::False {
      return false;
    }
    // Disjoint when one interval ends before the other begins.
    !(ends_before(&self.hi, &other.lo) || ends_before(&other.hi, &self.lo))
  }

  pub fn check_eq(&self, other: &RealRange) -> Tristate {
    if let (Some(a), Some(b)) = (self.as_singleton(), other.as_singleton()) {
      return Tristate::singleton(a == b);
    }
    if !self.overlaps(other) {
      return Tristate::False;
    }
    Tristate::Any
  }

  pub fn check_le(&self, other: &RealRange) -> Tristate {
    if let (Some(hi), Some(lo)) = (self.hi.value(), other.lo.value()) {
      if hi <= lo {
        return Tristate::True;
      }
    }
    if ends_before(&other.hi, &self.lo) {
      return Tristate::False;
    }
    Tristate::Any
  }

  pub fn add(&self, other: &RealRange) -> RealRange {
    RealRange {
      lo: add_bounds(&self.lo, &other.lo),
      hi: add_bounds(&self.hi, &other.hi),
      integral: add_integral(self.integral, other.integral),
    }
  }

  pub fn neg(&self) -> RealRange {
    RealRange {
      lo: self.hi.map(|v| -v),
      hi: self.lo.map(|v| -v),
      integral: self.integral,
    }
  }

  pub fn scale(&self, factor: &BigRational) -> RealRange {
    if factor.is_zero() {
      return RealRange::singleton(BigRational::zero());
    }
    let lo = self.lo.map(|v| v * factor);
    let hi = self.hi.map(|v| v * factor);
    let integral = if factor.is_integer() {
      match self.integral {
        Tristate::True => Tristate::True,
        _ => Tristate::Any,
      }
    } else {
      Tristate::Any
    };
    if factor < &BigRational::zero() {
      RealRange { lo: hi, hi: lo, integral }
    } else {
      RealRange { lo, hi, integral }
    }
  }

  /// Conservative interval multiplication: exact when an operand is a singleton, extrema of the
  /// endpoint products when both operands are closed and bounded, `top` otherwise.
  pub fn mul(&self, other: &RealRange) -> RealRange {
    if let Some(factor) = self.as_singleton() {
      return other.scale(factor);
    }
    if let Some(factor) = other.as_singleton() {
      return self.scale(factor);
    }
    match (&self.lo, &self.hi, &other.lo, &other.hi) {
      (Bound::Inclusive(a), Bound::Inclusive(b), Bound::Inclusive(c), Bound::Inclusive(d)) => {
        let products = [a * c, a * d, b * c, b * d];
        let lo = products.iter().min().unwrap().clone();
        let hi = products.iter().max().unwrap().clone();
        RealRange {
          lo: Bound::Inclusive(lo),
          hi: Bound::Inclusive(hi),
          integral: Tristate::Any,
        }
      }
      _ => RealRange::top(),
    }
  }
}

fn add_integral(a: Tristate, b: Tristate) -> Tristate {
  match (a, b) {
    (Tristate::True, Tristate::True) => Tristate::True,
    // integer + non-integer is never an integer
    (Tristate::True, Tristate::False) | (Tristate::False, Tristate::True) => Tristate::False,
    _ => Tristate::Any,
  }
}

fn add_bounds(a: &Bound, b: &Bound) -> Bound {
  match (a.value(), b.value()) {
    (Some(x), Some(y)) => {
      if a.is_exclusive() || b.is_exclusive() {
        Bound::Exclusive(x + y)
      } else {
        Bound::Inclusive(x + y)
      }
    }
    _ => Bound::Unbounded,
  }
}

fn join_lo(a: &Bound, b: &Bound) -> Bound {
  match (a.value(), b.value()) {
    (Some(x), Some(y)) => {
      if x < y || (x == y && !a.is_exclusive()) {
        a.clone()
      } else {
        b.clone()
      }
    }
    _ => Bound::Unbounded,
  }
}

fn join_hi(a: &Bound, b: &Bound) -> Bound {
  match (a.value(), b.value()) {
    (Some(x), Some(y)) => {
      if x > y || (x == y && !a.is_exclusive()) {
        a.clone()
      } else {
        b.clone()
      }
    }
    _ => Bound::Unbounded,
  }
}

/// Does the interval ending at `hi` lie entirely below the interval starting at `lo`?
fn ends_before(hi: &Bound, lo: &Bound) -> bool {
  match (hi.value(), lo.value()) {
    (Some(h), Some(l)) => h < l || (h == l && (hi.is_exclusive() || lo.is_exclusive())),
    _ => false,
  }
}

impl Formattable for RealRange {
  fn repr(&self, out: &mut dyn Write, _style: FormatStyle) -> std::fmt::Result {
    match &self.lo {
      Bound::Unbounded => write!(out, "(-inf, ")?,
      Bound::Inclusive(v) => write!(out, "[{v}, ")?,
      Bound::Exclusive(v) => write!(out, "({v}, ")?,
    }
    match &self.hi {
      Bound::Unbounded => write!(out, "inf)")?,
      Bound::Inclusive(v) => write!(out, "{v}]")?,
      Bound::Exclusive(v) => write!(out, "{v})")?,
    }
    write!(out, " int:{}", self.integral)
  }
}

impl_display_debug_for_formattable!(RealRange);

#[cfg(test)]
mod tests {
  use super::*;
  use symex_abs::numeric::BigInt;

  fn rat(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
  }

  #[test]
  fn singleton_tracks_integrality() {
    assert_eq!(RealRange::singleton(rat(4, 2)).integral, Tristate::True);
    assert_eq!(RealRange::singleton(rat(1, 2)).integral, Tristate::False);
  }

  #[test]
  fn join_respects_openness() {
    let a = RealRange {
      lo: Bound::Exclusive(rat(0, 1)),
      hi: Bound::Inclusive(rat(1, 1)),
      integral: Tristate::Any,
    };
    let b = RealRange::bounded(rat(0, 1), rat(2, 1));
    let j = a.join(&b);
    assert_eq!(j.lo, Bound::Inclusive(rat(0, 1)));
    assert_eq!(j.hi, Bound::Inclusive(rat(2, 1)));
  }

  #[test]
  fn disjointness() {
    let a = RealRange {
      lo: Bound::Inclusive(rat(0, 1)),
      hi: Bound::Exclusive(rat(1, 1)),
      integral: Tristate::Any,
    };
    let b = RealRange::bounded(rat(1, 1), rat(2, 1));
    assert!(!a.overlaps(&b));
    assert_eq!(a.check_eq(&b), Tristate::False);
    assert_eq!(a.check_le(&b), Tristate::True);
  }

  #[test]
  fn arithmetic() {
    let sum = RealRange::singleton(rat(1, 2)).add(&RealRange::singleton(rat(1, 2)));
    assert_eq!(sum.as_singleton(), Some(&rat(1, 1)));
    // non-integer + integer is known non-integral
    let mixed = RealRange::singleton(rat(1, 2)).add(&RealRange::singleton(rat(3, 1)));
    assert_eq!(mixed.integral, Tristate::False);
    let scaled = RealRange::bounded(rat(1, 1), rat(2, 1)).scale(&rat(-2, 1));
    assert_eq!(scaled.lo.value(), Some(&rat(-4, 1)));
    assert_eq!(scaled.hi.value(), Some(&rat(-2, 1)));
  }
}
