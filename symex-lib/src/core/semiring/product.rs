use std::collections::BTreeMap;

use crate::core::term::TermId;

/// A product `Πᵢ xᵢ^nᵢ` stored as an ordered map from term identity to positive occurrence
/// count.
///
/// Over the idempotent `BvXor` semiring (where the product operation is bitwise and), counts
/// normalize to one at every merge; over the other semirings counts compose by addition.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct PowerProduct {
  factors: BTreeMap<TermId, u32>,
}

impl PowerProduct {
  /// The empty product, the multiplicative identity.
  pub fn identity() -> PowerProduct {
    PowerProduct {
      factors: BTreeMap::new(),
    }
  }

  /// The singleton product `x^1`.
  pub fn var(x: TermId) -> PowerProduct {
    let mut factors = BTreeMap::new();
    factors.insert(x, 1);
    PowerProduct { factors }
  }

  pub fn mul(&self, other: &PowerProduct, idempotent: bool) -> PowerProduct {
    let mut factors = self.factors.clone();
    for (term, count) in &other.factors {
      let entry = factors.entry(*term).or_insert(0);
      *entry += count;
    }
    if idempotent {
      for count in factors.values_mut() {
        *count = 1;
      }
    }
    PowerProduct { factors }
  }

  #[inline(always)]
  pub fn is_identity(&self) -> bool {
    self.factors.is_empty()
  }

  /// `Some(x)` iff the product is exactly `x^1`.
  pub fn as_var(&self) -> Option<TermId> {
    if self.factors.len() != 1 {
      return None;
    }
    let (term, count) = self.factors.iter().next().unwrap();
    if *count == 1 {
      Some(*term)
    } else {
      None
    }
  }

  #[inline(always)]
  pub fn len(&self) -> usize {
    self.factors.len()
  }

  #[inline(always)]
  pub fn is_empty(&self) -> bool {
    self.factors.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (TermId, u32)> + '_ {
    self.factors.iter().map(|(term, count)| (*term, *count))
  }

  /// Total degree, counting multiplicity.
  pub fn degree(&self) -> u64 {
    self.factors.values().map(|count| *count as u64).sum()
  }

  /// Splits the shared factors out of two products: returns `(z, x', y')` with
  /// `self = z · x'` and `other = z · y'`, where `z` holds each factor common to both at the
  /// minimum of its two counts. Used to preserve sharing across ITE branches.
  pub fn extract_common(&self, other: &PowerProduct) -> (PowerProduct, PowerProduct, PowerProduct) {
    let mut common = PowerProduct::identity();
    let mut left = self.factors.clone();
    let mut right = other.factors.clone();

    for (term, count) in &self.factors {
      if let Some(other_count) = other.factors.get(term) {
        let shared = (*count).min(*other_count);
        common.factors.insert(*term, shared);
        prune(&mut left, *term, shared);
        prune(&mut right, *term, shared);
      }
    }

    (common, PowerProduct { factors: left }, PowerProduct { factors: right })
  }

  /// Folds the product with the supplied valuation and multiplication, expanding
  /// multiplicities. `None` for the identity product.
  pub fn eval<A>(&self, mut value_of: impl FnMut(TermId) -> A, mut mul_fn: impl FnMut(A, A) -> A) -> Option<A> {
    let mut acc: Option<A> = None;
    for (term, count) in &self.factors {
      for _ in 0..*count {
        let value = value_of(*term);
        acc = Some(match acc {
          Some(previous) => mul_fn(previous, value),
          None => value,
        });
      }
    }
    acc
  }
}

fn prune(factors: &mut BTreeMap<TermId, u32>, term: TermId, by: u32) {
  match factors.get_mut(&term) {
    Some(count) if *count > by => *count -= by,
    Some(_) => {
      factors.remove(&term);
    }
    None => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tid(raw: u32) -> TermId {
    TermId::from_raw(raw)
  }

  #[test]
  fn extract_common_takes_minimum_counts() {
    let x = PowerProduct::var(tid(1));
    let y = PowerProduct::var(tid(2));
    let x2y = x.mul(&x, false).mul(&y, false);
    let xy = x.mul(&y, false);
    let (common, left, right) = x2y.extract_common(&xy);
    assert_eq!(common.iter().collect::<Vec<_>>(), vec![(tid(1), 1), (tid(2), 1)]);
    assert_eq!(left.as_var(), Some(tid(1)));
    assert!(right.is_identity());
  }

  #[test]
  fn counts_compose_by_addition() {
    let x = PowerProduct::var(tid(1));
    let squared = x.mul(&x, false);
    assert_eq!(squared.iter().collect::<Vec<_>>(), vec![(tid(1), 2)]);
    assert_eq!(squared.as_var(), None);
    assert_eq!(squared.degree(), 2);
  }

  #[test]
  fn idempotent_counts_collapse() {
    let x = PowerProduct::var(tid(1));
    let collapsed = x.mul(&x, true);
    assert_eq!(collapsed.as_var(), Some(tid(1)));
  }

  #[test]
  fn identity_recognized() {
    assert!(PowerProduct::identity().is_identity());
    assert!(!PowerProduct::var(tid(1)).is_identity());
    assert_eq!(PowerProduct::identity().eval(|_| 1u64, |a, b| a * b), None);
  }

  #[test]
  fn eval_expands_multiplicity() {
    let x = PowerProduct::var(tid(1));
    let cube = x.mul(&x, false).mul(&x, false);
    assert_eq!(cube.eval(|_| 2u64, |a, b| a * b), Some(8));
  }
}
