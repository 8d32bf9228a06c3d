/*!

The theory classifier: a pure, total map from each node to the SMT theory a downstream solver
must support to discharge it.

Linear/nonlinear arithmetic splits on the node alone: a sum is nonlinear exactly when a product
monomial sits in one of its term positions, and `div`/`mod` are linear only for a literal
divisor. The transcendental specials are their own classification, `ComputableArith`.

*/

use std::fmt::Write;

use crate::{
  api::builder::ExprBuilder,
  core::{
    format::{FormatStyle, Formattable},
    semiring::LinearSum,
    sort::Sort,
    term::{TermData, TermId},
  },
  impl_display_debug_for_formattable,
};

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Theory {
  Bool,
  LinArith,
  NonlinArith,
  /// Transcendental specials: decidable only by computable-real reasoning.
  ComputableArith,
  BitVector,
  Quant,
  String,
  Float,
  Array,
  Struct,
  Fn,
}

impl Theory {
  pub fn name_str(self) -> &'static str {
    match self {
      Theory::Bool => "Bool",
      Theory::LinArith => "LinArith",
      Theory::NonlinArith => "NonlinArith",
      Theory::ComputableArith => "ComputableArith",
      Theory::BitVector => "BitVector",
      Theory::Quant => "Quant",
      Theory::String => "String",
      Theory::Float => "Float",
      Theory::Array => "Array",
      Theory::Struct => "Struct",
      Theory::Fn => "Fn",
    }
  }
}

impl Formattable for Theory {
  fn repr(&self, out: &mut dyn Write, _style: FormatStyle) -> std::fmt::Result {
    write!(out, "{}Theory", self.name_str())
  }
}

impl_display_debug_for_formattable!(Theory);

/// The theory of a node whose meaning is fixed by its sort alone (variables, ITE, equality).
fn theory_from_sort(sort: &Sort) -> Theory {
  match sort {
    Sort::Bool => Theory::Bool,
    Sort::Integer | Sort::Real => Theory::LinArith,
    Sort::BitVec(_) => Theory::BitVector,
    Sort::Float { .. } => Theory::Float,
    Sort::String(_) => Theory::String,
    Sort::Struct(_) => Theory::Struct,
    Sort::Array { .. } => Theory::Array,
  }
}

fn sum_theory<C: Clone + Eq>(builder: &ExprBuilder, sum: &LinearSum<C>) -> Theory {
  let nonlinear = sum.iter().any(|(term, _)| {
    matches!(
      builder.data_of(term),
      TermData::IntProd(_) | TermData::RealProd(_)
    )
  });
  if nonlinear {
    Theory::NonlinArith
  } else {
    Theory::LinArith
  }
}

fn division_theory(builder: &ExprBuilder, divisor: TermId) -> Theory {
  let literal = match builder.sort_of(divisor) {
    Sort::Integer => builder.value_of(divisor).as_int_range().as_singleton().is_some(),
    Sort::Real => builder.value_of(divisor).as_real_range().as_singleton().is_some(),
    _ => false,
  };
  if literal {
    Theory::LinArith
  } else {
    Theory::NonlinArith
  }
}

/// Classifies one node. Total over every well-formed node kind.
pub fn classify(builder: &ExprBuilder, id: TermId) -> Theory {
  use TermData::*;
  match builder.data_of(id) {
    BoolLit(_) | Not(_) | And(_) => Theory::Bool,
    Var { .. } | BoundVar { .. } | Ite { .. } => theory_from_sort(builder.sort_of(id)),
    Eq(a, _) => theory_from_sort(builder.sort_of(*a)),
    ArrayEq(..) => Theory::Array,

    IntLe(..) | RealLe(..) | RealIsInt(_) | IntToReal(_) | RealToInt(_) => Theory::LinArith,
    BvUlt(..) | BvSlt(..) | BvTestBit { .. } => Theory::BitVector,

    IntSum(sum) => sum_theory(builder, sum),
    RealSum(sum) => sum_theory(builder, sum),
    IntProd(_) | RealProd(_) => Theory::NonlinArith,
    IntDiv(_, divisor) | IntMod(_, divisor) | RealDiv(_, divisor) => division_theory(builder, *divisor),
    RealSpecial { .. } => Theory::ComputableArith,

    BvSum(_) | BvXorSum(_) | BvProd(_) | BvAnd(_) | BvOr(_) | BvConcat(..) | BvExtract { .. }
    | BvUdiv(..) | BvUrem(..) | BvSdiv(..) | BvSrem(..) | BvShl(..) | BvLshr(..) | BvAshr(..)
    | BvRol(..) | BvRor(..) | BvZext(_) | BvSext(_) | BvPopcount(_) | BvCountLeadingZeros(_)
    | BvCountTrailingZeros(_) | BvFill(_) | IntToBv(_) | BvToInt { .. } => Theory::BitVector,

    FloatLit(_) | FpNeg(_) | FpAbs(_) | FpArith { .. } | FpRem(..) | FpFma { .. } | FpSqrt { .. }
    | FpMin(..) | FpMax(..) | FpRound { .. } | FpTest { .. } | FpLe(..) | FpLt(..)
    | FpFromBits(_) | FpToBits(_) | FpToReal(_) | RealToFp { .. } => Theory::Float,

    StringLit(_) | StrConcat(_) | StrLength(_) | StrContains { .. } | StrIndexOf { .. }
    | StrPrefixOf { .. } | StrSuffixOf { .. } | StrSubstring { .. } => Theory::String,

    ConstArray(_) | ArraySelect { .. } | ArrayUpdate { .. } | ArrayMap { .. } | ArrayCopy { .. }
    | ArraySet { .. } | ArrayRangeEq { .. } => Theory::Array,

    StructCtor(_) | StructField { .. } => Theory::Struct,

    Apply { .. } => Theory::Fn,
    Forall { .. } | Exists { .. } => Theory::Quant,

    Annotated { inner, .. } => classify(builder, *inner),
  }
}
