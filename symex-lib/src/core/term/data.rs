use smallvec::SmallVec;
use symex_abs::{
  numeric::{BigInt, BigRational, BigUint},
  IString,
};

use crate::core::{
  semiring::{LinearSum, PowerProduct},
  term::{AnnotationId, FnId, TermId},
};

/// IEEE-754 rounding modes.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum RoundingMode {
  NearestEven,
  NearestAway,
  TowardPositive,
  TowardNegative,
  TowardZero,
}

/// Transcendental and algebraic specials on the reals.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum SpecialFn {
  Sqrt,
  Exp,
  Log,
  Sin,
  Cos,
  Tan,
  Atan2,
}

impl SpecialFn {
  pub fn arity(self) -> usize {
    match self {
      SpecialFn::Atan2 => 2,
      _ => 1,
    }
  }

  pub fn name_str(self) -> &'static str {
    match self {
      SpecialFn::Sqrt => "sqrt",
      SpecialFn::Exp => "exp",
      SpecialFn::Log => "log",
      SpecialFn::Sin => "sin",
      SpecialFn::Cos => "cos",
      SpecialFn::Tan => "tan",
      SpecialFn::Atan2 => "atan2",
    }
  }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum FpBinOp {
  Add,
  Sub,
  Mul,
  Div,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum FpTestOp {
  IsNan,
  IsInfinite,
  IsZero,
  IsSubnormal,
  IsNegative,
  IsPositive,
}

/// The operator kind and typed children of a node.
///
/// Structural equality of two payloads together with equality of the node sorts defines
/// structural equality of terms; the interning table is keyed on exactly that pair. Embedded
/// sums and products are ordered maps, so the derived `Hash` is independent of the order in
/// which their entries were inserted.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TermData {
  // region Leaves
  BoolLit(bool),
  /// A free variable. The serial makes distinct fresh variables distinct terms.
  Var { name: IString, serial: u64 },
  /// A variable bound by a quantifier or a defined-function signature; its identity is its
  /// binding site.
  BoundVar { name: IString, serial: u64 },
  StringLit(String),
  /// IEEE-754 bit pattern; the format lives in the sort.
  FloatLit(BigUint),
  // endregion

  // region Booleans
  Not(TermId),
  /// N-ary conjunction: flattened, deduplicated, sorted by identity, length >= 2.
  And(Vec<TermId>),
  Ite {
    cond:        TermId,
    then_branch: TermId,
    else_branch: TermId,
  },
  /// Equality on any sort except bool (bool equality lowers to and/not) and arrays.
  Eq(TermId, TermId),
  ArrayEq(TermId, TermId),
  // endregion

  // region Predicates
  IntLe(TermId, TermId),
  RealLe(TermId, TermId),
  BvUlt(TermId, TermId),
  BvSlt(TermId, TermId),
  RealIsInt(TermId),
  BvTestBit { arg: TermId, index: u32 },
  // endregion

  // region Semiring sums and products
  IntSum(LinearSum<BigInt>),
  RealSum(LinearSum<BigRational>),
  /// Affine combination modulo `2^w`.
  BvSum(LinearSum<BigUint>),
  /// `⊕ᵢ (cᵢ & xᵢ) ⊕ k` — coefficients are bitmasks.
  BvXorSum(LinearSum<BigUint>),
  IntProd(PowerProduct),
  RealProd(PowerProduct),
  BvProd(PowerProduct),
  // endregion

  // region Integer/real arithmetic
  IntDiv(TermId, TermId),
  IntMod(TermId, TermId),
  RealDiv(TermId, TermId),
  RealSpecial { func: SpecialFn, args: Vec<TermId> },
  // endregion

  // region Bitvectors
  /// N-ary bitwise and/or: flattened, deduplicated, sorted by identity, length >= 2.
  BvAnd(Vec<TermId>),
  BvOr(Vec<TermId>),
  /// `(first << width(second)) | second`
  BvConcat(TermId, TermId),
  /// The `length`-bit field starting at bit `offset`; `length` equals the node's width.
  BvExtract { arg: TermId, offset: u32, length: u32 },
  BvUdiv(TermId, TermId),
  BvUrem(TermId, TermId),
  BvSdiv(TermId, TermId),
  BvSrem(TermId, TermId),
  BvShl(TermId, TermId),
  BvLshr(TermId, TermId),
  BvAshr(TermId, TermId),
  BvRol(TermId, TermId),
  BvRor(TermId, TermId),
  /// Extensions to the width of the node's sort.
  BvZext(TermId),
  BvSext(TermId),
  BvPopcount(TermId),
  BvCountLeadingZeros(TermId),
  BvCountTrailingZeros(TermId),
  /// All-ones when the boolean argument holds, all-zeros otherwise.
  BvFill(TermId),
  // endregion

  // region Floats
  FpNeg(TermId),
  FpAbs(TermId),
  FpArith {
    op:  FpBinOp,
    rm:  RoundingMode,
    lhs: TermId,
    rhs: TermId,
  },
  FpRem(TermId, TermId),
  FpFma {
    rm: RoundingMode,
    x:  TermId,
    y:  TermId,
    z:  TermId,
  },
  FpSqrt { rm: RoundingMode, arg: TermId },
  FpMin(TermId, TermId),
  FpMax(TermId, TermId),
  /// Round to integral.
  FpRound { rm: RoundingMode, arg: TermId },
  FpTest { op: FpTestOp, arg: TermId },
  FpLe(TermId, TermId),
  FpLt(TermId, TermId),
  FpFromBits(TermId),
  FpToBits(TermId),
  FpToReal(TermId),
  RealToFp { rm: RoundingMode, arg: TermId },
  // endregion

  // region Strings
  /// Flattened, adjacent literals merged, no empty literals, length >= 2.
  StrConcat(Vec<TermId>),
  StrLength(TermId),
  StrContains { haystack: TermId, needle: TermId },
  StrIndexOf {
    haystack: TermId,
    needle:   TermId,
    from:     TermId,
  },
  StrPrefixOf { prefix: TermId, arg: TermId },
  StrSuffixOf { suffix: TermId, arg: TermId },
  StrSubstring {
    arg:    TermId,
    offset: TermId,
    length: TermId,
  },
  // endregion

  // region Arrays
  ConstArray(TermId),
  ArraySelect { array: TermId, indices: Vec<TermId> },
  ArrayUpdate {
    array:   TermId,
    indices: Vec<TermId>,
    value:   TermId,
  },
  ArrayMap { func: FnId, arrays: Vec<TermId> },
  ArrayCopy {
    dest:        TermId,
    dest_offset: TermId,
    src:         TermId,
    src_offset:  TermId,
    length:      TermId,
  },
  ArraySet {
    array:  TermId,
    offset: TermId,
    value:  TermId,
    length: TermId,
  },
  ArrayRangeEq {
    lhs:        TermId,
    lhs_offset: TermId,
    rhs:        TermId,
    rhs_offset: TermId,
    length:     TermId,
  },
  // endregion

  // region Structs
  StructCtor(Vec<TermId>),
  StructField { arg: TermId, index: u32 },
  // endregion

  // region Conversions
  IntToReal(TermId),
  /// Floor conversion, as SMT-LIB `to_int`.
  RealToInt(TermId),
  /// Reduction modulo `2^w`; the width lives in the sort.
  IntToBv(TermId),
  BvToInt { arg: TermId, signed: bool },
  // endregion

  // region Functions and quantifiers
  Apply { func: FnId, args: Vec<TermId> },
  Forall { binders: Vec<TermId>, body: TermId },
  Exists { binders: Vec<TermId>, body: TermId },
  // endregion

  /// Semantically transparent wrapper giving `inner` a fresh identity.
  Annotated { inner: TermId, id: AnnotationId },
}

impl TermData {
  /// The children in deterministic order. Sum and product children are their map keys in
  /// ascending identity order.
  pub fn children(&self) -> SmallVec<[TermId; 4]> {
    use TermData::*;
    match self {
      BoolLit(_) | Var { .. } | BoundVar { .. } | StringLit(_) | FloatLit(_) => SmallVec::new(),

      Not(a)
      | RealIsInt(a)
      | BvTestBit { arg: a, .. }
      | BvExtract { arg: a, .. }
      | BvZext(a)
      | BvSext(a)
      | BvPopcount(a)
      | BvCountLeadingZeros(a)
      | BvCountTrailingZeros(a)
      | BvFill(a)
      | FpNeg(a)
      | FpAbs(a)
      | FpSqrt { arg: a, .. }
      | FpRound { arg: a, .. }
      | FpTest { arg: a, .. }
      | FpFromBits(a)
      | FpToBits(a)
      | FpToReal(a)
      | RealToFp { arg: a, .. }
      | StrLength(a)
      | ConstArray(a)
      | StructField { arg: a, .. }
      | IntToReal(a)
      | RealToInt(a)
      | IntToBv(a)
      | BvToInt { arg: a, .. } => smallvec::smallvec![*a],

      Eq(a, b)
      | ArrayEq(a, b)
      | IntLe(a, b)
      | RealLe(a, b)
      | BvUlt(a, b)
      | BvSlt(a, b)
      | IntDiv(a, b)
      | IntMod(a, b)
      | RealDiv(a, b)
      | BvConcat(a, b)
      | BvUdiv(a, b)
      | BvUrem(a, b)
      | BvSdiv(a, b)
      | BvSrem(a, b)
      | BvShl(a, b)
      | BvLshr(a, b)
      | BvAshr(a, b)
      | BvRol(a, b)
      | BvRor(a, b)
      | FpRem(a, b)
      | FpMin(a, b)
      | FpMax(a, b)
      | FpLe(a, b)
      | FpLt(a, b)
      | FpArith { lhs: a, rhs: b, .. }
      | StrContains { haystack: a, needle: b }
      | StrPrefixOf { prefix: a, arg: b }
      | StrSuffixOf { suffix: a, arg: b } => smallvec::smallvec![*a, *b],

      Ite {
        cond,
        then_branch,
        else_branch,
      } => smallvec::smallvec![*cond, *then_branch, *else_branch],
      FpFma { x, y, z, .. } => smallvec::smallvec![*x, *y, *z],
      StrIndexOf { haystack, needle, from } => smallvec::smallvec![*haystack, *needle, *from],
      StrSubstring { arg, offset, length } => smallvec::smallvec![*arg, *offset, *length],

      And(items) | BvAnd(items) | BvOr(items) | StrConcat(items) | StructCtor(items) => {
        items.iter().copied().collect()
      }
      RealSpecial { args, .. } | ArrayMap { arrays: args, .. } | Apply { args, .. } => {
        args.iter().copied().collect()
      }

      IntSum(sum) => sum.iter().map(|(term, _)| term).collect(),
      RealSum(sum) => sum.iter().map(|(term, _)| term).collect(),
      BvSum(sum) | BvXorSum(sum) => sum.iter().map(|(term, _)| term).collect(),
      IntProd(prod) | RealProd(prod) | BvProd(prod) => prod.iter().map(|(term, _)| term).collect(),

      ArraySelect { array, indices } => {
        let mut out: SmallVec<[TermId; 4]> = smallvec::smallvec![*array];
        out.extend(indices.iter().copied());
        out
      }
      ArrayUpdate { array, indices, value } => {
        let mut out: SmallVec<[TermId; 4]> = smallvec::smallvec![*array];
        out.extend(indices.iter().copied());
        out.push(*value);
        out
      }
      ArrayCopy {
        dest,
        dest_offset,
        src,
        src_offset,
        length,
      } => smallvec::smallvec![*dest, *dest_offset, *src, *src_offset, *length],
      ArraySet {
        array,
        offset,
        value,
        length,
      } => smallvec::smallvec![*array, *offset, *value, *length],
      ArrayRangeEq {
        lhs,
        lhs_offset,
        rhs,
        rhs_offset,
        length,
      } => smallvec::smallvec![*lhs, *lhs_offset, *rhs, *rhs_offset, *length],

      Forall { binders, body } | Exists { binders, body } => {
        let mut out: SmallVec<[TermId; 4]> = binders.iter().copied().collect();
        out.push(*body);
        out
      }

      Annotated { inner, .. } => smallvec::smallvec![*inner],
    }
  }

  /// A short operator name for diagnostics and the term writer.
  pub fn op_name(&self) -> &'static str {
    use TermData::*;
    match self {
      BoolLit(_) => "bool",
      Var { .. } => "var",
      BoundVar { .. } => "bound",
      StringLit(_) => "string",
      FloatLit(_) => "float",
      Not(_) => "not",
      And(_) => "and",
      Ite { .. } => "ite",
      Eq(..) => "=",
      ArrayEq(..) => "array=",
      IntLe(..) | RealLe(..) => "<=",
      BvUlt(..) => "bvult",
      BvSlt(..) => "bvslt",
      RealIsInt(_) => "is-int",
      BvTestBit { .. } => "test-bit",
      IntSum(_) | RealSum(_) | BvSum(_) => "+",
      BvXorSum(_) => "bvxor",
      IntProd(_) | RealProd(_) | BvProd(_) => "*",
      IntDiv(..) => "div",
      IntMod(..) => "mod",
      RealDiv(..) => "/",
      RealSpecial { func, .. } => func.name_str(),
      BvAnd(_) => "bvand",
      BvOr(_) => "bvor",
      BvConcat(..) => "concat",
      BvExtract { .. } => "extract",
      BvUdiv(..) => "bvudiv",
      BvUrem(..) => "bvurem",
      BvSdiv(..) => "bvsdiv",
      BvSrem(..) => "bvsrem",
      BvShl(..) => "bvshl",
      BvLshr(..) => "bvlshr",
      BvAshr(..) => "bvashr",
      BvRol(..) => "bvrol",
      BvRor(..) => "bvror",
      BvZext(_) => "zext",
      BvSext(_) => "sext",
      BvPopcount(_) => "popcount",
      BvCountLeadingZeros(_) => "clz",
      BvCountTrailingZeros(_) => "ctz",
      BvFill(_) => "fill",
      FpNeg(_) => "fp.neg",
      FpAbs(_) => "fp.abs",
      FpArith { .. } => "fp.arith",
      FpRem(..) => "fp.rem",
      FpFma { .. } => "fp.fma",
      FpSqrt { .. } => "fp.sqrt",
      FpMin(..) => "fp.min",
      FpMax(..) => "fp.max",
      FpRound { .. } => "fp.round",
      FpTest { .. } => "fp.test",
      FpLe(..) => "fp.le",
      FpLt(..) => "fp.lt",
      FpFromBits(_) => "fp.from-bits",
      FpToBits(_) => "fp.to-bits",
      FpToReal(_) => "fp.to-real",
      RealToFp { .. } => "fp.from-real",
      StrConcat(_) => "str.++",
      StrLength(_) => "str.len",
      StrContains { .. } => "str.contains",
      StrIndexOf { .. } => "str.indexof",
      StrPrefixOf { .. } => "str.prefixof",
      StrSuffixOf { .. } => "str.suffixof",
      StrSubstring { .. } => "str.substr",
      ConstArray(_) => "const-array",
      ArraySelect { .. } => "select",
      ArrayUpdate { .. } => "update",
      ArrayMap { .. } => "array-map",
      ArrayCopy { .. } => "array-copy",
      ArraySet { .. } => "array-set",
      ArrayRangeEq { .. } => "array-range=",
      StructCtor(_) => "struct",
      StructField { .. } => "field",
      IntToReal(_) => "to-real",
      RealToInt(_) => "to-int",
      IntToBv(_) => "int2bv",
      BvToInt { .. } => "bv2int",
      Apply { .. } => "apply",
      Forall { .. } => "forall",
      Exists { .. } => "exists",
      Annotated { .. } => "annotated",
    }
  }
}
