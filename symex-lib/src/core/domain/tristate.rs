use std::fmt::Write;

use crate::{
  core::format::{FormatStyle, Formattable},
  impl_display_debug_for_formattable,
};

/// The abstract domain for the boolean sort: a known truth value or `Any`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Tristate {
  True,
  False,
  #[default]
  Any,
}

impl Tristate {
  #[inline(always)]
  pub fn singleton(value: bool) -> Tristate {
    if value {
      Tristate::True
    } else {
      Tristate::False
    }
  }

  #[inline(always)]
  pub fn as_bool(self) -> Option<bool> {
    match self {
      Tristate::True => Some(true),
      Tristate::False => Some(false),
      Tristate::Any => None,
    }
  }

  pub fn not(self) -> Tristate {
    match self {
      Tristate::True => Tristate::False,
      Tristate::False => Tristate::True,
      Tristate::Any => Tristate::Any,
    }
  }

  pub fn and(self, other: Tristate) -> Tristate {
    match (self, other) {
      (Tristate::False, _) | (_, Tristate::False) => Tristate::False,
      (Tristate::True, x) => x,
      (x, Tristate::True) => x,
      _ => Tristate::Any,
    }
  }

  pub fn or(self, other: Tristate) -> Tristate {
    self.not().and(other.not()).not()
  }

  pub fn xor(self, other: Tristate) -> Tristate {
    match (self.as_bool(), other.as_bool()) {
      (Some(a), Some(b)) => Tristate::singleton(a != b),
      _ => Tristate::Any,
    }
  }

  pub fn join(self, other: Tristate) -> Tristate {
    if self == other {
      self
    } else {
      Tristate::Any
    }
  }

  pub fn overlaps(self, other: Tristate) -> bool {
    match (self.as_bool(), other.as_bool()) {
      (Some(a), Some(b)) => a == b,
      _ => true,
    }
  }

  /// Can the two domains be proven equal or unequal?
  pub fn check_eq(self, other: Tristate) -> Tristate {
    match (self.as_bool(), other.as_bool()) {
      (Some(a), Some(b)) => Tristate::singleton(a == b),
      _ => Tristate::Any,
    }
  }

  #[inline(always)]
  pub fn contains(self, value: bool) -> bool {
    match self {
      Tristate::True => value,
      Tristate::False => !value,
      Tristate::Any => true,
    }
  }
}

impl Formattable for Tristate {
  fn repr(&self, out: &mut dyn Write, _style: FormatStyle) -> std::fmt::Result {
    match self {
      Tristate::True => write!(out, "T"),
      Tristate::False => write!(out, "F"),
      Tristate::Any => write!(out, "?"),
    }
  }
}

impl_display_debug_for_formattable!(Tristate);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn connectives() {
    use Tristate::*;
    assert_eq!(False.and(Any), False);
    assert_eq!(True.and(Any), Any);
    assert_eq!(True.or(Any), True);
    assert_eq!(False.or(Any), Any);
    assert_eq!(True.xor(False), True);
    assert_eq!(Any.not().not(), Any);
  }

  #[test]
  fn lattice() {
    use Tristate::*;
    assert_eq!(True.join(True), True);
    assert_eq!(True.join(False), Any);
    assert!(!True.overlaps(False));
    assert!(Any.overlaps(False));
    assert_eq!(True.check_eq(False), False);
    assert_eq!(True.check_eq(Any), Any);
  }
}
