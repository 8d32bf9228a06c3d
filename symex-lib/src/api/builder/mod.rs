/*!

The expression builder: the single entry point through which clients assemble terms.

Every operation family lives in a submodule (`boolean`, `arith`, `bitvec`, `array`, `string`,
`float`, `structure`, `quantifier`), each an `impl` block on `ExprBuilder`. Every constructor
performs constant folding, consults abstract values, applies its structural rewrites, and routes
the result through the interning table, in that order.

A builder owns its arena, identifier counters, configuration, and the optional solver-event
listener. Builders are independent of one another and deterministic: the same call sequence from
a fresh builder produces identical identifiers and terms.

*/

mod arith;
mod array;
mod bitvec;
mod boolean;
mod float;
mod quantifier;
mod string;
mod structure;
mod substitute;

use symex_abs::{numeric::{mask, BigInt, BigRational, BigUint}, IString, SmallVec};

use crate::core::{
  domain::{AbstractValue, BvDomain, IntRange, RealRange, Tristate},
  semiring::{BvArithRing, BvXorRing, IntRing, LinearSum, RealRing, Semiring},
  sort::Sort,
  term::{AnnotationId, Metadata, SourceLocation, TermArena, TermData, TermId, TermNode},
  BuilderConfig, BuilderError, EventListener, SolverEvent,
};

pub use crate::core::term::{RoundingMode, SpecialFn};

/// When an application of a defined function is replaced by its body.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum UnfoldPolicy {
  Never,
  Always,
  /// Unfold only when every argument is a ground term.
  #[default]
  WhenConcrete,
}

pub(crate) enum FnKind {
  Uninterpreted,
  Defined {
    params: Vec<TermId>,
    body:   TermId,
    policy: UnfoldPolicy,
  },
}

/// A declared function symbol: uninterpreted, or defined with a body and an unfold policy.
pub(crate) struct FnDef {
  pub name:   IString,
  pub domain: Vec<Sort>,
  pub range:  Sort,
  pub kind:   FnKind,
}

pub struct ExprBuilder {
  arena:            TermArena,
  config:           BuilderConfig,
  listener:         Option<EventListener>,
  functions:        Vec<FnDef>,
  next_serial:      u64,
  next_annotation:  u64,
  current_location: Option<SourceLocation>,
  true_term:        TermId,
  false_term:       TermId,
}

impl ExprBuilder {
  pub fn new() -> ExprBuilder {
    let mut arena = TermArena::new();
    let true_term = arena.intern(Sort::Bool, TermData::BoolLit(true), Metadata::default());
    let false_term = arena.intern(Sort::Bool, TermData::BoolLit(false), Metadata::default());
    ExprBuilder {
      arena,
      config: BuilderConfig::new(),
      listener: None,
      functions: Vec::new(),
      next_serial: 0,
      next_annotation: 0,
      current_location: None,
      true_term,
      false_term,
    }
  }

  // region Arena access

  #[inline(always)]
  pub fn node(&self, id: TermId) -> &TermNode {
    self.arena.node(id)
  }

  #[inline(always)]
  pub fn sort_of(&self, id: TermId) -> &Sort {
    self.arena.sort(id)
  }

  #[inline(always)]
  pub fn value_of(&self, id: TermId) -> &AbstractValue {
    self.arena.value(id)
  }

  #[inline(always)]
  pub fn data_of(&self, id: TermId) -> &TermData {
    self.arena.data(id)
  }

  /// The children of a node in deterministic order.
  pub fn children(&self, id: TermId) -> SmallVec<[TermId; 4]> {
    self.node(id).children()
  }

  /// The number of interned terms.
  pub fn term_count(&self) -> usize {
    self.arena.len()
  }

  // endregion

  // region Configuration, metadata, events

  pub fn config(&self) -> &BuilderConfig {
    &self.config
  }

  pub fn config_mut(&mut self) -> &mut BuilderConfig {
    &mut self.config
  }

  /// Installs a listener invoked synchronously on every solver event. The listener must not call
  /// back into the builder.
  pub fn set_listener(&mut self, listener: EventListener) {
    self.listener = Some(listener);
  }

  /// Sets the program location attached as metadata to subsequently created nodes.
  pub fn set_current_location(&mut self, location: Option<SourceLocation>) {
    self.current_location = location;
  }

  fn metadata(&self) -> Metadata {
    Metadata {
      location: self.current_location.clone(),
    }
  }

  fn emit(&mut self, event: SolverEvent) {
    if let Some(listener) = self.listener.as_mut() {
      listener(&event);
    }
  }

  // endregion

  // region Interning

  pub(crate) fn intern(&mut self, sort: Sort, data: TermData) -> TermId {
    let before = self.arena.len();
    let metadata = self.metadata();
    let id = self.arena.intern(sort, data, metadata);
    if self.arena.len() > before {
      self.emit(SolverEvent::TermCreated { id });
    }
    id
  }

  pub(crate) fn intern_with_value(&mut self, sort: Sort, data: TermData, value: AbstractValue) -> TermId {
    let before = self.arena.len();
    let metadata = self.metadata();
    let id = self.arena.intern_with_value(sort, data, value, metadata);
    if self.arena.len() > before {
      self.emit(SolverEvent::TermCreated { id });
    }
    id
  }

  // endregion

  // region Sort checks

  #[track_caller]
  pub(crate) fn expect_sort(&self, id: TermId, expected: &Sort, op: &str) {
    let actual = self.sort_of(id);
    if actual != expected {
      panic!("{op}: expected an operand of sort {expected}, got {actual}");
    }
  }

  #[track_caller]
  pub(crate) fn expect_same_sort(&self, a: TermId, b: TermId, op: &str) {
    let (sa, sb) = (self.sort_of(a), self.sort_of(b));
    if sa != sb {
      panic!("{op}: operand sorts differ ({sa} vs {sb})");
    }
  }

  #[track_caller]
  pub(crate) fn expect_bool(&self, id: TermId, op: &str) {
    self.expect_sort(id, &Sort::Bool, op);
  }

  #[track_caller]
  pub(crate) fn expect_int(&self, id: TermId, op: &str) {
    self.expect_sort(id, &Sort::Integer, op);
  }

  #[track_caller]
  pub(crate) fn expect_real(&self, id: TermId, op: &str) {
    self.expect_sort(id, &Sort::Real, op);
  }

  #[track_caller]
  pub(crate) fn expect_bv(&self, id: TermId, op: &str) -> u32 {
    match self.sort_of(id).bv_width() {
      Some(width) => width,
      None => panic!("{op}: expected a bitvector operand, got {}", self.sort_of(id)),
    }
  }

  #[track_caller]
  pub(crate) fn expect_bv_width(&self, id: TermId, width: u32, op: &str) {
    let actual = self.expect_bv(id, op);
    if actual != width {
      panic!("{op}: expected a bitvector of width {width}, got width {actual}");
    }
  }

  // endregion

  // region Known-value recognizers
  //
  // The writer-facing capability: a term whose domain pins a single value is that constant,
  // whether or not it is a literal node.

  pub fn known_bool(&self, id: TermId) -> Option<bool> {
    self.value_of(id).as_tristate().as_bool()
  }

  pub fn known_int(&self, id: TermId) -> Option<BigInt> {
    self.value_of(id).as_int_range().as_singleton().cloned()
  }

  pub fn known_real(&self, id: TermId) -> Option<BigRational> {
    self.value_of(id).as_real_range().as_singleton().cloned()
  }

  pub fn known_bv(&self, id: TermId) -> Option<BigUint> {
    self.value_of(id).as_bv_domain().as_singleton().cloned()
  }

  // endregion

  // region Fresh and bound variables

  fn next_serial(&mut self) -> u64 {
    let serial = self.next_serial;
    self.next_serial += 1;
    serial
  }

  /// A fresh free variable of the given sort. Distinct calls yield distinct terms even under an
  /// equal name.
  pub fn fresh_var(&mut self, name: &str, sort: Sort) -> TermId {
    let serial = self.next_serial();
    self.intern(
      sort,
      TermData::Var {
        name: IString::from(name),
        serial,
      },
    )
  }

  /// A fresh integer variable constrained to `[lo, hi]`.
  pub fn fresh_bounded_int(&mut self, name: &str, lo: BigInt, hi: BigInt) -> Result<TermId, BuilderError> {
    if lo > hi {
      return Err(BuilderError::InvalidRange {
        sort: Sort::Integer,
        lo:   lo.to_string(),
        hi:   hi.to_string(),
      });
    }
    let serial = self.next_serial();
    Ok(self.intern_with_value(
      Sort::Integer,
      TermData::Var {
        name: IString::from(name),
        serial,
      },
      AbstractValue::Int(IntRange::bounded(lo, hi)),
    ))
  }

  /// A fresh natural-number variable: an integer carrying a non-negativity invariant.
  pub fn fresh_nat(&mut self, name: &str) -> TermId {
    let serial = self.next_serial();
    self.intern_with_value(
      Sort::Integer,
      TermData::Var {
        name: IString::from(name),
        serial,
      },
      AbstractValue::Int(IntRange::non_negative()),
    )
  }

  /// A fresh real variable constrained to the closed interval `[lo, hi]`.
  pub fn fresh_bounded_real(&mut self, name: &str, lo: BigRational, hi: BigRational) -> Result<TermId, BuilderError> {
    if lo > hi {
      return Err(BuilderError::InvalidRange {
        sort: Sort::Real,
        lo:   lo.to_string(),
        hi:   hi.to_string(),
      });
    }
    let serial = self.next_serial();
    Ok(self.intern_with_value(
      Sort::Real,
      TermData::Var {
        name: IString::from(name),
        serial,
      },
      AbstractValue::Real(RealRange::bounded(lo, hi)),
    ))
  }

  /// A fresh bitvector variable constrained to the unsigned interval `[lo, hi]`.
  pub fn fresh_bounded_bv(&mut self, name: &str, width: u32, lo: BigUint, hi: BigUint) -> Result<TermId, BuilderError> {
    if lo > hi || hi > mask(width) {
      return Err(BuilderError::InvalidRange {
        sort: Sort::bitvec(width),
        lo:   lo.to_string(),
        hi:   hi.to_string(),
      });
    }
    let serial = self.next_serial();
    Ok(self.intern_with_value(
      Sort::bitvec(width),
      TermData::Var {
        name: IString::from(name),
        serial,
      },
      AbstractValue::BitVec(BvDomain::from_range(width, lo, hi)),
    ))
  }

  /// A variable to be bound by a quantifier or a defined-function signature. Its identity is its
  /// binding site.
  pub fn bound_var(&mut self, name: &str, sort: Sort) -> TermId {
    let serial = self.next_serial();
    self.intern(
      sort,
      TermData::BoundVar {
        name: IString::from(name),
        serial,
      },
    )
  }

  // endregion

  // region Annotation

  /// Returns a fresh annotation id and a term semantically equal to `x` interned at a new
  /// identity. Re-annotating an annotated term returns its existing id.
  pub fn annotate(&mut self, x: TermId) -> (AnnotationId, TermId) {
    if let TermData::Annotated { id, .. } = self.data_of(x) {
      return (*id, x);
    }
    let id = AnnotationId(self.next_annotation);
    self.next_annotation += 1;
    let sort = self.sort_of(x).clone();
    let term = self.intern(sort, TermData::Annotated { inner: x, id });
    self.emit(SolverEvent::AnnotationCreated { id, term });
    (id, term)
  }

  /// The annotation id of an annotated term, if any.
  pub fn annotation_of(&self, x: TermId) -> Option<AnnotationId> {
    match self.data_of(x) {
      TermData::Annotated { id, .. } => Some(*id),
      _ => None,
    }
  }

  // endregion

  // region Equality

  /// Equality on any sort. Dispatches per sort: boolean equality lowers to `iff`, struct
  /// equality conjoins the field equalities, array equality wraps as a primitive node.
  pub fn eq(&mut self, x: TermId, y: TermId) -> TermId {
    self.expect_same_sort(x, y, "eq");
    if x == y {
      return self.true_lit();
    }
    match self.sort_of(x).clone() {
      Sort::Bool => self.iff(x, y),
      Sort::Integer => {
        let ring = IntRing;
        let difference = self.to_int_sum(x).add_scaled(&ring, &ring.neg(&ring.one()), &self.to_int_sum(y));
        if let Some(k) = difference.as_constant() {
          return self.bool_lit(k == &ring.zero());
        }
        self.eq_via_domains(x, y)
      }
      Sort::Real => {
        let ring = RealRing;
        let difference = self.to_real_sum(x).add_scaled(&ring, &ring.neg(&ring.one()), &self.to_real_sum(y));
        if let Some(k) = difference.as_constant() {
          return self.bool_lit(k == &ring.zero());
        }
        self.eq_via_domains(x, y)
      }
      Sort::BitVec(width) => {
        let ring = BvArithRing::new(width);
        let difference = self.to_bv_sum(x).add_scaled(&ring, &ring.neg(&ring.one()), &self.to_bv_sum(y));
        if let Some(k) = difference.as_constant() {
          return self.bool_lit(ring.is_zero(k));
        }
        self.eq_via_domains(x, y)
      }
      Sort::Struct(fields) => {
        match self.value_of(x).check_eq(self.value_of(y)) {
          Tristate::True => return self.true_lit(),
          Tristate::False => return self.false_lit(),
          Tristate::Any => {}
        }
        let conjuncts: Vec<TermId> = (0..fields.len())
          .map(|index| {
            let fx = self.struct_field(x, index as u32);
            let fy = self.struct_field(y, index as u32);
            self.eq(fx, fy)
          })
          .collect();
        self.and(&conjuncts)
      }
      Sort::Array { .. } => {
        match self.value_of(x).check_eq(self.value_of(y)) {
          Tristate::True => return self.true_lit(),
          Tristate::False => return self.false_lit(),
          Tristate::Any => {}
        }
        let (a, b) = if x <= y { (x, y) } else { (y, x) };
        self.intern(Sort::Bool, TermData::ArrayEq(a, b))
      }
      Sort::Float { .. } | Sort::String(_) => self.eq_via_domains(x, y),
    }
  }

  fn eq_via_domains(&mut self, x: TermId, y: TermId) -> TermId {
    match self.value_of(x).check_eq(self.value_of(y)) {
      Tristate::True => self.true_lit(),
      Tristate::False => self.false_lit(),
      Tristate::Any => {
        let (a, b) = if x <= y { (x, y) } else { (y, x) };
        self.intern(Sort::Bool, TermData::Eq(a, b))
      }
    }
  }

  // endregion

  // region If-then-else

  /// ITE over any sort. Constant conditions select an arm; identical arms collapse; sum- and
  /// product-valued arms have their common part hoisted out so term size stays bounded under
  /// nesting; struct arms push the ITE into each field.
  pub fn ite(&mut self, cond: TermId, then_branch: TermId, else_branch: TermId) -> TermId {
    self.expect_bool(cond, "ite");
    self.expect_same_sort(then_branch, else_branch, "ite");

    if let Some(choice) = self.known_bool(cond) {
      return if choice { then_branch } else { else_branch };
    }
    if then_branch == else_branch {
      return then_branch;
    }
    // ite(not p, x, y) = ite(p, y, x)
    if let TermData::Not(inner) = self.data_of(cond) {
      let inner = *inner;
      return self.ite(inner, else_branch, then_branch);
    }

    match self.sort_of(then_branch).clone() {
      Sort::Bool => self.ite_bool(cond, then_branch, else_branch),
      Sort::Integer => {
        let ring = IntRing;
        let then_sum = self.to_int_sum(then_branch);
        let else_sum = self.to_int_sum(else_branch);
        if let Some(result) =
          self.ite_sum_fused(cond, then_sum, else_sum, &ring, Self::to_int_sum, Self::intern_int_sum)
        {
          return result;
        }
        if let Some(result) = self.ite_prod_fused(cond, then_branch, else_branch) {
          return result;
        }
        self.ite_wrap(cond, then_branch, else_branch)
      }
      Sort::Real => {
        let ring = RealRing;
        let then_sum = self.to_real_sum(then_branch);
        let else_sum = self.to_real_sum(else_branch);
        if let Some(result) =
          self.ite_sum_fused(cond, then_sum, else_sum, &ring, Self::to_real_sum, Self::intern_real_sum)
        {
          return result;
        }
        if let Some(result) = self.ite_prod_fused(cond, then_branch, else_branch) {
          return result;
        }
        self.ite_wrap(cond, then_branch, else_branch)
      }
      Sort::BitVec(width) => {
        if let (TermData::BvXorSum(a), TermData::BvXorSum(b)) =
          (self.data_of(then_branch), self.data_of(else_branch))
        {
          let ring = BvXorRing::new(width);
          let (a, b) = (a.clone(), b.clone());
          if let Some(result) = self.ite_xor_sum_fused(cond, a, b, &ring, width) {
            return result;
          }
        }
        let ring = BvArithRing::new(width);
        let then_sum = self.to_bv_sum(then_branch);
        let else_sum = self.to_bv_sum(else_branch);
        if let Some(result) = self.ite_bv_sum_fused(cond, then_sum, else_sum, &ring, width) {
          return result;
        }
        if let Some(result) = self.ite_prod_fused(cond, then_branch, else_branch) {
          return result;
        }
        self.ite_wrap(cond, then_branch, else_branch)
      }
      Sort::Struct(fields) => {
        let pushed: Vec<TermId> = (0..fields.len())
          .map(|index| {
            let t = self.struct_field(then_branch, index as u32);
            let e = self.struct_field(else_branch, index as u32);
            self.ite(cond, t, e)
          })
          .collect();
        self.struct_ctor(&pushed)
      }
      _ => self.ite_wrap(cond, then_branch, else_branch),
    }
  }

  fn ite_wrap(&mut self, cond: TermId, then_branch: TermId, else_branch: TermId) -> TermId {
    let sort = self.sort_of(then_branch).clone();
    self.intern(
      sort,
      TermData::Ite {
        cond,
        then_branch,
        else_branch,
      },
    )
  }

  /// Hoists the shared sub-sum out of both arms: `ite(c, z + t', z + e') = z + ite(c, t', e')`.
  fn ite_sum_fused<R>(
    &mut self,
    cond: TermId,
    then_sum: LinearSum<R::Coeff>,
    else_sum: LinearSum<R::Coeff>,
    ring: &R,
    to_sum: fn(&Self, TermId) -> LinearSum<R::Coeff>,
    intern_sum: fn(&mut Self, LinearSum<R::Coeff>) -> TermId,
  ) -> Option<TermId>
  where
    R: Semiring,
  {
    let (common, left, right) = then_sum.extract_common(ring, &else_sum);
    if common.is_empty() && ring.is_zero(common.offset()) {
      return None;
    }
    let left_term = intern_sum(self, left);
    let right_term = intern_sum(self, right);
    let inner = self.ite(cond, left_term, right_term);
    let inner_sum = to_sum(self, inner);
    let fused = common.add(ring, &inner_sum);
    Some(intern_sum(self, fused))
  }

  fn ite_bv_sum_fused(
    &mut self,
    cond: TermId,
    then_sum: LinearSum<BigUint>,
    else_sum: LinearSum<BigUint>,
    ring: &BvArithRing,
    width: u32,
  ) -> Option<TermId> {
    let (common, left, right) = then_sum.extract_common(ring, &else_sum);
    if common.is_empty() && ring.is_zero(common.offset()) {
      return None;
    }
    let left_term = self.intern_bv_sum(width, left);
    let right_term = self.intern_bv_sum(width, right);
    let inner = self.ite(cond, left_term, right_term);
    let fused = common.add(ring, &self.to_bv_sum(inner));
    Some(self.intern_bv_sum(width, fused))
  }

  fn ite_xor_sum_fused(
    &mut self,
    cond: TermId,
    then_sum: LinearSum<BigUint>,
    else_sum: LinearSum<BigUint>,
    ring: &BvXorRing,
    width: u32,
  ) -> Option<TermId> {
    let (common, left, right) = then_sum.extract_common(ring, &else_sum);
    if common.is_empty() && ring.is_zero(common.offset()) {
      return None;
    }
    let left_term = self.intern_bv_xor_sum(width, left);
    let right_term = self.intern_bv_xor_sum(width, right);
    let inner = self.ite(cond, left_term, right_term);
    let fused = common.add(ring, &self.to_xor_sum(inner));
    Some(self.intern_bv_xor_sum(width, fused))
  }

  /// Hoists shared factors out of product-valued arms.
  fn ite_prod_fused(&mut self, cond: TermId, then_branch: TermId, else_branch: TermId) -> Option<TermId> {
    let (then_prod, else_prod) = match (self.data_of(then_branch), self.data_of(else_branch)) {
      (TermData::IntProd(a), TermData::IntProd(b))
      | (TermData::RealProd(a), TermData::RealProd(b))
      | (TermData::BvProd(a), TermData::BvProd(b)) => (a.clone(), b.clone()),
      _ => return None,
    };
    let (common, left, right) = then_prod.extract_common(&else_prod);
    if common.is_identity() {
      return None;
    }
    let sort = self.sort_of(then_branch).clone();
    let left_term = self.intern_prod(&sort, left);
    let right_term = self.intern_prod(&sort, right);
    let inner = self.ite(cond, left_term, right_term);
    let inner_prod = self.to_prod(inner);
    let fused = common.mul(&inner_prod, false);
    Some(self.intern_prod(&sort, fused))
  }

  // endregion
}

impl Default for ExprBuilder {
  fn default() -> Self {
    ExprBuilder::new()
  }
}
