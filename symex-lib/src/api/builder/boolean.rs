/*!

Boolean constructors: the interned constants, negation, n-ary conjunction, and the connectives
derived from them.

The conjunction normalizer flattens nested conjunctions, drops `true`, short-circuits to `false`,
deduplicates by identity, and detects complementary literals. `or`, `xor`, `implies`, and `iff`
are all expressed through `and`/`not`, so no other boolean node kinds exist.

*/

use std::collections::BTreeSet;

use symex_abs::debug;

use crate::{
  api::builder::ExprBuilder,
  core::{sort::Sort, term::{TermData, TermId}},
};

impl ExprBuilder {
  #[inline(always)]
  pub fn true_lit(&self) -> TermId {
    self.true_term
  }

  #[inline(always)]
  pub fn false_lit(&self) -> TermId {
    self.false_term
  }

  #[inline(always)]
  pub fn bool_lit(&self, value: bool) -> TermId {
    if value {
      self.true_term
    } else {
      self.false_term
    }
  }

  pub fn not(&mut self, x: TermId) -> TermId {
    self.expect_bool(x, "not");
    match self.data_of(x) {
      TermData::BoolLit(b) => self.bool_lit(!*b),
      TermData::Not(inner) => *inner,
      _ => self.intern(Sort::Bool, TermData::Not(x)),
    }
  }

  pub fn and2(&mut self, x: TermId, y: TermId) -> TermId {
    self.and(&[x, y])
  }

  /// N-ary conjunction.
  pub fn and(&mut self, items: &[TermId]) -> TermId {
    let mut set: BTreeSet<TermId> = BTreeSet::new();
    let mut pending: Vec<TermId> = items.to_vec();

    while let Some(item) = pending.pop() {
      self.expect_bool(item, "and");
      match self.data_of(item) {
        TermData::BoolLit(true) => {}
        TermData::BoolLit(false) => return self.false_lit(),
        TermData::And(children) => pending.extend(children.iter().copied()),
        _ => {
          set.insert(item);
        }
      }
    }

    // A conjunct and its negation in one conjunction.
    for &item in &set {
      if let TermData::Not(inner) = self.data_of(item) {
        if set.contains(inner) {
          debug!(4, "conjunction collapsed to false on complementary literals");
          return self.false_lit();
        }
      }
    }

    match set.len() {
      0 => self.true_lit(),
      1 => *set.iter().next().unwrap(),
      _ => self.intern(Sort::Bool, TermData::And(set.into_iter().collect())),
    }
  }

  pub fn or2(&mut self, x: TermId, y: TermId) -> TermId {
    self.or(&[x, y])
  }

  /// N-ary disjunction, expressed through `and`/`not`.
  pub fn or(&mut self, items: &[TermId]) -> TermId {
    let negated: Vec<TermId> = items.iter().map(|&item| self.not(item)).collect();
    let conjunction = self.and(&negated);
    self.not(conjunction)
  }

  pub fn implies(&mut self, x: TermId, y: TermId) -> TermId {
    let not_x = self.not(x);
    self.or2(not_x, y)
  }

  pub fn iff(&mut self, x: TermId, y: TermId) -> TermId {
    let forward = self.implies(x, y);
    let backward = self.implies(y, x);
    self.and2(forward, backward)
  }

  pub fn xor(&mut self, x: TermId, y: TermId) -> TermId {
    let same = self.iff(x, y);
    self.not(same)
  }

  /// ITE on predicates. The literal-arm cases lower to `or`/`and` so no boolean ITE node is
  /// created for them.
  pub(crate) fn ite_bool(&mut self, cond: TermId, then_branch: TermId, else_branch: TermId) -> TermId {
    match self.data_of(then_branch) {
      TermData::BoolLit(true) => return self.or2(cond, else_branch),
      TermData::BoolLit(false) => {
        let not_cond = self.not(cond);
        return self.and2(not_cond, else_branch);
      }
      _ => {}
    }
    match self.data_of(else_branch) {
      TermData::BoolLit(true) => {
        let not_cond = self.not(cond);
        return self.or2(not_cond, then_branch);
      }
      TermData::BoolLit(false) => return self.and2(cond, then_branch),
      _ => {}
    }
    self.intern(
      Sort::Bool,
      TermData::Ite {
        cond,
        then_branch,
        else_branch,
      },
    )
  }
}
