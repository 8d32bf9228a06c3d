use std::fmt::Write;

use crate::{
  core::{
    domain::{bv_domain::BvDomain, int_range::IntRange, real_range::RealRange, tristate::Tristate},
    format::{FormatStyle, Formattable},
    sort::Sort,
  },
  impl_display_debug_for_formattable,
};

/// A string's abstract value is an interval bounding its length.
pub type LengthRange = IntRange;

/// The per-sort abstract value attached to every term.
///
/// Soundness invariant: the domain contains every concrete value the term can denote. Operators
/// refine conservatively; joining (across ITE) widens both sides into a common domain.
#[derive(Clone, PartialEq, Eq)]
pub enum AbstractValue {
  Bool(Tristate),
  Int(IntRange),
  Real(RealRange),
  BitVec(BvDomain),
  /// Floats are opaque.
  Float,
  /// Only the length of a string is tracked.
  String(LengthRange),
  Struct(Vec<AbstractValue>),
  /// The abstract value of every element.
  Array(Box<AbstractValue>),
}

impl AbstractValue {
  /// The least informative domain for the given sort.
  pub fn top_for(sort: &Sort) -> AbstractValue {
    match sort {
      Sort::Bool => AbstractValue::Bool(Tristate::Any),
      Sort::Integer => AbstractValue::Int(IntRange::top()),
      Sort::Real => AbstractValue::Real(RealRange::top()),
      Sort::BitVec(w) => AbstractValue::BitVec(BvDomain::top(*w)),
      Sort::Float { .. } => AbstractValue::Float,
      Sort::String(_) => AbstractValue::String(LengthRange::non_negative()),
      Sort::Struct(fields) => AbstractValue::Struct(fields.iter().map(AbstractValue::top_for).collect()),
      Sort::Array { elem, .. } => AbstractValue::Array(Box::new(AbstractValue::top_for(elem))),
    }
  }

  pub fn join(&self, other: &AbstractValue) -> AbstractValue {
    match (self, other) {
      (AbstractValue::Bool(a), AbstractValue::Bool(b)) => AbstractValue::Bool(a.join(*b)),
      (AbstractValue::Int(a), AbstractValue::Int(b)) => AbstractValue::Int(a.join(b)),
      (AbstractValue::Real(a), AbstractValue::Real(b)) => AbstractValue::Real(a.join(b)),
      (AbstractValue::BitVec(a), AbstractValue::BitVec(b)) => AbstractValue::BitVec(a.join(b)),
      (AbstractValue::Float, AbstractValue::Float) => AbstractValue::Float,
      (AbstractValue::String(a), AbstractValue::String(b)) => AbstractValue::String(a.join(b)),
      (AbstractValue::Struct(a), AbstractValue::Struct(b)) => {
        debug_assert_eq!(a.len(), b.len(), "struct arity mismatch in join");
        AbstractValue::Struct(a.iter().zip(b.iter()).map(|(x, y)| x.join(y)).collect())
      }
      (AbstractValue::Array(a), AbstractValue::Array(b)) => AbstractValue::Array(Box::new(a.join(b))),
      _ => panic!("abstract value join across sorts"),
    }
  }

  pub fn overlaps(&self, other: &AbstractValue) -> bool {
    match (self, other) {
      (AbstractValue::Bool(a), AbstractValue::Bool(b)) => a.overlaps(*b),
      (AbstractValue::Int(a), AbstractValue::Int(b)) => a.overlaps(b),
      (AbstractValue::Real(a), AbstractValue::Real(b)) => a.overlaps(b),
      (AbstractValue::BitVec(a), AbstractValue::BitVec(b)) => a.overlaps(b),
      (AbstractValue::Struct(a), AbstractValue::Struct(b)) => {
        a.iter().zip(b.iter()).all(|(x, y)| x.overlaps(y))
      }
      (AbstractValue::Array(a), AbstractValue::Array(b)) => a.overlaps(b),
      // A length mismatch separates strings; equal lengths prove nothing.
      (AbstractValue::String(a), AbstractValue::String(b)) => a.overlaps(b),
      _ => true,
    }
  }

  /// Can the two domains decide equality of their terms?
  pub fn check_eq(&self, other: &AbstractValue) -> Tristate {
    match (self, other) {
      (AbstractValue::Bool(a), AbstractValue::Bool(b)) => a.check_eq(*b),
      (AbstractValue::Int(a), AbstractValue::Int(b)) => a.check_eq(b),
      (AbstractValue::Real(a), AbstractValue::Real(b)) => a.check_eq(b),
      (AbstractValue::BitVec(a), AbstractValue::BitVec(b)) => a.check_eq(b),
      (AbstractValue::String(a), AbstractValue::String(b)) => {
        if a.overlaps(b) {
          Tristate::Any
        } else {
          Tristate::False
        }
      }
      (AbstractValue::Struct(a), AbstractValue::Struct(b)) => {
        let mut all_true = true;
        for (x, y) in a.iter().zip(b.iter()) {
          match x.check_eq(y) {
            Tristate::False => return Tristate::False,
            Tristate::Any => all_true = false,
            Tristate::True => {}
          }
        }
        if all_true {
          Tristate::True
        } else {
          Tristate::Any
        }
      }
      (AbstractValue::Array(a), AbstractValue::Array(b)) => a.check_eq(b),
      _ => Tristate::Any,
    }
  }

  pub fn as_tristate(&self) -> Tristate {
    match self {
      AbstractValue::Bool(t) => *t,
      _ => panic!("expected a boolean abstract value"),
    }
  }

  pub fn as_int_range(&self) -> &IntRange {
    match self {
      AbstractValue::Int(r) => r,
      _ => panic!("expected an integer abstract value"),
    }
  }

  pub fn as_real_range(&self) -> &RealRange {
    match self {
      AbstractValue::Real(r) => r,
      _ => panic!("expected a real abstract value"),
    }
  }

  pub fn as_bv_domain(&self) -> &BvDomain {
    match self {
      AbstractValue::BitVec(d) => d,
      _ => panic!("expected a bitvector abstract value"),
    }
  }

  pub fn as_length_range(&self) -> &LengthRange {
    match self {
      AbstractValue::String(r) => r,
      _ => panic!("expected a string abstract value"),
    }
  }
}

impl Formattable for AbstractValue {
  fn repr(&self, out: &mut dyn Write, style: FormatStyle) -> std::fmt::Result {
    match self {
      AbstractValue::Bool(t) => t.repr(out, style),
      AbstractValue::Int(r) => r.repr(out, style),
      AbstractValue::Real(r) => r.repr(out, style),
      AbstractValue::BitVec(d) => d.repr(out, style),
      AbstractValue::Float => write!(out, "float"),
      AbstractValue::String(r) => {
        write!(out, "len ")?;
        r.repr(out, style)
      }
      AbstractValue::Struct(fields) => {
        write!(out, "(")?;
        for (i, field) in fields.iter().enumerate() {
          if i > 0 {
            write!(out, ", ")?;
          }
          field.repr(out, style)?;
        }
        write!(out, ")")
      }
      AbstractValue::Array(elem) => {
        write!(out, "array of ")?;
        elem.repr(out, style)
      }
    }
  }
}

impl_display_debug_for_formattable!(AbstractValue);

#[cfg(test)]
mod tests {
  use super::*;
  use symex_abs::numeric::BigInt;

  #[test]
  fn top_matches_sort_shape() {
    let sort = Sort::Struct(vec![Sort::Bool, Sort::array(vec![Sort::Integer], Sort::bitvec(8))]);
    match AbstractValue::top_for(&sort) {
      AbstractValue::Struct(fields) => {
        assert!(matches!(fields[0], AbstractValue::Bool(Tristate::Any)));
        assert!(matches!(&fields[1], AbstractValue::Array(elem)
          if matches!(**elem, AbstractValue::BitVec(_))));
      }
      _ => panic!("wrong shape"),
    }
  }

  #[test]
  fn struct_check_eq_combines_fields() {
    let yes = AbstractValue::Int(IntRange::singleton(BigInt::from(1)));
    let no = AbstractValue::Int(IntRange::singleton(BigInt::from(2)));
    let maybe = AbstractValue::Int(IntRange::top());

    let a = AbstractValue::Struct(vec![yes.clone(), yes.clone()]);
    let b = AbstractValue::Struct(vec![yes.clone(), no.clone()]);
    let c = AbstractValue::Struct(vec![yes.clone(), maybe]);
    assert_eq!(a.check_eq(&a), Tristate::True);
    assert_eq!(a.check_eq(&b), Tristate::False);
    assert_eq!(a.check_eq(&c), Tristate::Any);
  }

  #[test]
  fn join_is_commutative_on_ints() {
    let a = AbstractValue::Int(IntRange::singleton(BigInt::from(-4)));
    let b = AbstractValue::Int(IntRange::singleton(BigInt::from(9)));
    assert_eq!(a.join(&b), b.join(&a));
  }
}
