/*!

The problem-features bitset: which theory features (plus operational flags) a collection of
terms requires of a solver.

*/

use enumflags2::{bitflags, BitFlags};
use symex_abs::NatSet;

use crate::{
  api::{
    builder::{ExprBuilder, FnKind},
    theory::{classify, Theory},
  },
  core::term::{TermData, TermId},
};

#[bitflags]
#[repr(u16)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ProblemFeature {
  LinearArith,
  NonlinearArith,
  ComputableArith,
  Bitvectors,
  Quantifiers,
  Strings,
  Floats,
  Arrays,
  Structs,
  UninterpFns,
  DefinedFns,
  UnsatCores,
  UnsatAssumptions,
}

pub type ProblemFeatures = BitFlags<ProblemFeature>;

/// The feature a single theory demands; pure boolean structure demands none.
pub fn feature_of_theory(theory: Theory) -> Option<ProblemFeature> {
  match theory {
    Theory::Bool => None,
    Theory::LinArith => Some(ProblemFeature::LinearArith),
    Theory::NonlinArith => Some(ProblemFeature::NonlinearArith),
    Theory::ComputableArith => Some(ProblemFeature::ComputableArith),
    Theory::BitVector => Some(ProblemFeature::Bitvectors),
    Theory::Quant => Some(ProblemFeature::Quantifiers),
    Theory::String => Some(ProblemFeature::Strings),
    Theory::Float => Some(ProblemFeature::Floats),
    Theory::Array => Some(ProblemFeature::Arrays),
    Theory::Struct => Some(ProblemFeature::Structs),
    Theory::Fn => Some(ProblemFeature::UninterpFns),
  }
}

/// Folds the classifier over every node reachable from the given roots.
pub fn required_features(builder: &ExprBuilder, roots: impl IntoIterator<Item = TermId>) -> ProblemFeatures {
  let mut features = ProblemFeatures::empty();
  let mut visited = NatSet::new();
  let mut pending: Vec<TermId> = roots.into_iter().collect();

  while let Some(current) = pending.pop() {
    if !visited.insert(current.as_raw() as usize) {
      continue;
    }
    if let Some(feature) = feature_of_theory(classify(builder, current)) {
      features |= feature;
    }
    if let TermData::Apply { func, .. } = builder.data_of(current) {
      features |= match builder.fn_def(*func).kind {
        FnKind::Uninterpreted => ProblemFeature::UninterpFns,
        FnKind::Defined { .. } => ProblemFeature::DefinedFns,
      };
    }
    pending.extend(builder.children(current));
  }

  features
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn union_and_contains() {
    let a = ProblemFeature::LinearArith | ProblemFeature::Arrays;
    let b = ProblemFeature::UnsatCores | ProblemFeature::LinearArith;
    let both = a | b;
    assert!(both.contains(ProblemFeature::Arrays));
    assert!(both.contains(ProblemFeature::UnsatCores));
    assert!(!both.contains(ProblemFeature::Floats));
  }
}
