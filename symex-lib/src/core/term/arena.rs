use symex_abs::{
  numeric::{mask, BigInt, BigRational, BigUint, traits::{One, Signed, Zero}},
  HashMap,
};

use crate::core::{
  domain::{AbstractValue, Bound, BvDomain, IntRange, RealRange, Tristate},
  sort::Sort,
  term::{Metadata, TermData, TermId, TermNode},
};

/// The arena owning every interned node, together with the interning table.
///
/// The table is keyed on the `(sort, payload)` pair; children inside the payload are already
/// interned identities, so structural equality of keys is exactly structural equality of terms.
pub struct TermArena {
  nodes:    Vec<TermNode>,
  interner: HashMap<(Sort, TermData), TermId>,
}

impl TermArena {
  pub fn new() -> TermArena {
    TermArena {
      nodes: Vec::new(),
      interner: HashMap::new(),
    }
  }

  #[inline(always)]
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  #[inline(always)]
  pub fn node(&self, id: TermId) -> &TermNode {
    &self.nodes[id.as_raw() as usize]
  }

  #[inline(always)]
  pub fn sort(&self, id: TermId) -> &Sort {
    self.node(id).sort()
  }

  #[inline(always)]
  pub fn data(&self, id: TermId) -> &TermData {
    self.node(id).data()
  }

  #[inline(always)]
  pub fn value(&self, id: TermId) -> &AbstractValue {
    self.node(id).value()
  }

  /// Interns a node, computing its abstract value on a miss.
  pub fn intern(&mut self, sort: Sort, data: TermData, metadata: Metadata) -> TermId {
    let value = self.compute_value(&sort, &data);
    self.intern_with_value(sort, data, value, metadata)
  }

  /// Interns a node with a caller-supplied abstract value. Used where the value is not derivable
  /// from the payload alone (bounded fresh variables).
  pub fn intern_with_value(&mut self, sort: Sort, data: TermData, value: AbstractValue, metadata: Metadata) -> TermId {
    if let Some(&existing) = self.interner.get(&(sort.clone(), data.clone())) {
      return existing;
    }
    if self.nodes.len() > u32::MAX as usize - 1 {
      panic!("term identifier space exhausted");
    }
    let id = TermId::from_raw(self.nodes.len() as u32);
    self.nodes.push(TermNode::new(id, sort.clone(), data.clone(), value, metadata));
    self.interner.insert((sort, data), id);
    id
  }

  fn tristate(&self, id: TermId) -> Tristate {
    self.value(id).as_tristate()
  }

  fn int_range(&self, id: TermId) -> &IntRange {
    self.value(id).as_int_range()
  }

  fn real_range(&self, id: TermId) -> &RealRange {
    self.value(id).as_real_range()
  }

  fn bv_domain(&self, id: TermId) -> &BvDomain {
    self.value(id).as_bv_domain()
  }

  fn length_range(&self, id: TermId) -> &IntRange {
    self.value(id).as_length_range()
  }

  /// The transfer functions: a sound abstract value for the node from the values of its
  /// children.
  pub fn compute_value(&self, sort: &Sort, data: &TermData) -> AbstractValue {
    use TermData::*;
    match data {
      BoolLit(b) => AbstractValue::Bool(Tristate::singleton(*b)),
      Var { .. } | BoundVar { .. } => AbstractValue::top_for(sort),
      StringLit(s) => AbstractValue::String(IntRange::singleton(BigInt::from(s.chars().count() as u64))),
      FloatLit(_) => AbstractValue::Float,

      Not(a) => AbstractValue::Bool(self.tristate(*a).not()),
      And(items) => {
        let folded = items
          .iter()
          .fold(Tristate::True, |acc, item| acc.and(self.tristate(*item)));
        AbstractValue::Bool(folded)
      }
      Ite {
        cond,
        then_branch,
        else_branch,
      } => match self.tristate(*cond) {
        Tristate::True => self.value(*then_branch).clone(),
        Tristate::False => self.value(*else_branch).clone(),
        Tristate::Any => self.value(*then_branch).join(self.value(*else_branch)),
      },
      Eq(a, b) => AbstractValue::Bool(self.value(*a).check_eq(self.value(*b))),
      ArrayEq(a, b) => AbstractValue::Bool(self.value(*a).check_eq(self.value(*b))),

      IntLe(a, b) => AbstractValue::Bool(self.int_range(*a).check_le(self.int_range(*b))),
      RealLe(a, b) => AbstractValue::Bool(self.real_range(*a).check_le(self.real_range(*b))),
      BvUlt(a, b) => AbstractValue::Bool(self.bv_domain(*a).check_ult(self.bv_domain(*b))),
      BvSlt(a, b) => AbstractValue::Bool(self.bv_domain(*a).check_slt(self.bv_domain(*b))),
      RealIsInt(a) => AbstractValue::Bool(self.real_range(*a).integral),
      BvTestBit { arg, index } => AbstractValue::Bool(self.bv_domain(*arg).test_bit(*index)),

      IntSum(sum) => {
        let mut range = IntRange::singleton(sum.offset().clone());
        for (term, coeff) in sum.iter() {
          range = range.add(&self.int_range(term).scale(coeff));
        }
        AbstractValue::Int(range)
      }
      RealSum(sum) => {
        let mut range = RealRange::singleton(sum.offset().clone());
        for (term, coeff) in sum.iter() {
          range = range.add(&self.real_range(term).scale(coeff));
        }
        AbstractValue::Real(range)
      }
      BvSum(sum) => {
        let width = sort.bv_width().expect("bitvector sum with a non-bitvector sort");
        let mut domain = BvDomain::singleton(width, sum.offset().clone());
        for (term, coeff) in sum.iter() {
          domain = domain.add(&self.bv_domain(term).scale(coeff));
        }
        AbstractValue::BitVec(domain)
      }
      BvXorSum(sum) => {
        let width = sort.bv_width().expect("bitvector xor sum with a non-bitvector sort");
        let mut domain = BvDomain::singleton(width, sum.offset().clone());
        for (term, coeff) in sum.iter() {
          let masked = self.bv_domain(term).bitand(&BvDomain::singleton(width, coeff.clone()));
          domain = domain.bitxor(&masked);
        }
        AbstractValue::BitVec(domain)
      }

      IntProd(prod) => {
        let range = prod
          .eval(|term| self.int_range(term).clone(), |a, b| a.mul(&b))
          .unwrap_or_else(|| IntRange::singleton(BigInt::one()));
        AbstractValue::Int(range)
      }
      RealProd(prod) => {
        let range = prod
          .eval(|term| self.real_range(term).clone(), |a, b| a.mul(&b))
          .unwrap_or_else(|| RealRange::singleton(BigRational::one()));
        AbstractValue::Real(range)
      }
      BvProd(prod) => {
        let width = sort.bv_width().expect("bitvector product with a non-bitvector sort");
        let domain = prod
          .eval(|term| self.bv_domain(term).clone(), |a, b| a.mul(&b))
          .unwrap_or_else(|| BvDomain::singleton(width, BigUint::one()));
        AbstractValue::BitVec(domain)
      }

      IntDiv(a, b) => AbstractValue::Int(self.int_range(*a).div(self.int_range(*b))),
      IntMod(a, b) => AbstractValue::Int(self.int_range(*a).rem(self.int_range(*b))),
      RealDiv(a, b) => {
        let divisor = self.real_range(*b);
        match divisor.as_singleton() {
          Some(d) if !d.is_zero() => AbstractValue::Real(self.real_range(*a).scale(&d.recip())),
          _ => AbstractValue::Real(RealRange::top()),
        }
      }
      RealSpecial { func, .. } => AbstractValue::Real(special_range(*func)),

      BvAnd(items) => {
        let mut iter = items.iter();
        let first = self.bv_domain(*iter.next().expect("empty bvand")).clone();
        AbstractValue::BitVec(iter.fold(first, |acc, item| acc.bitand(self.bv_domain(*item))))
      }
      BvOr(items) => {
        let mut iter = items.iter();
        let first = self.bv_domain(*iter.next().expect("empty bvor")).clone();
        AbstractValue::BitVec(iter.fold(first, |acc, item| acc.bitor(self.bv_domain(*item))))
      }
      BvConcat(high, low) => AbstractValue::BitVec(self.bv_domain(*high).concat(self.bv_domain(*low))),
      BvExtract { arg, offset, length } => {
        AbstractValue::BitVec(self.bv_domain(*arg).extract(*offset, *length))
      }
      BvUdiv(a, b) => AbstractValue::BitVec(self.bv_domain(*a).udiv(self.bv_domain(*b))),
      BvUrem(a, b) => AbstractValue::BitVec(self.bv_domain(*a).urem(self.bv_domain(*b))),
      BvSdiv(..) | BvSrem(..) | BvShl(..) | BvLshr(..) | BvAshr(..) | BvRol(..) | BvRor(..) | BvSext(_) => {
        AbstractValue::top_for(sort)
      }
      BvZext(arg) => {
        let width = sort.bv_width().expect("zext with a non-bitvector sort");
        let arg_width = self.bv_domain(*arg).width();
        AbstractValue::BitVec(self.bv_domain(*arg).zero_extend(width - arg_width))
      }
      BvPopcount(arg) => AbstractValue::BitVec(self.bv_domain(*arg).popcount()),
      BvCountLeadingZeros(arg) | BvCountTrailingZeros(arg) => {
        let width = self.bv_domain(*arg).width();
        AbstractValue::BitVec(BvDomain::from_range(width, BigUint::zero(), BigUint::from(width)))
      }
      BvFill(cond) => {
        let width = sort.bv_width().expect("fill with a non-bitvector sort");
        match self.tristate(*cond) {
          Tristate::True => AbstractValue::BitVec(BvDomain::singleton(width, mask(width))),
          Tristate::False => AbstractValue::BitVec(BvDomain::singleton(width, BigUint::zero())),
          Tristate::Any => AbstractValue::BitVec(BvDomain::top(width)),
        }
      }

      FpNeg(_) | FpAbs(_) | FpArith { .. } | FpRem(..) | FpFma { .. } | FpSqrt { .. } | FpMin(..)
      | FpMax(..) | FpRound { .. } | FpFromBits(_) | RealToFp { .. } => AbstractValue::Float,
      FpTest { .. } | FpLe(..) | FpLt(..) => AbstractValue::Bool(Tristate::Any),
      FpToBits(_) => AbstractValue::top_for(sort),
      FpToReal(_) => AbstractValue::Real(RealRange::top()),

      StrConcat(items) => {
        let mut length = IntRange::singleton(BigInt::zero());
        for item in items {
          length = length.add(self.length_range(*item));
        }
        AbstractValue::String(length)
      }
      StrLength(arg) => AbstractValue::Int(self.length_range(*arg).clone()),
      StrContains { haystack, needle } => {
        AbstractValue::Bool(containment_from_lengths(self.length_range(*haystack), self.length_range(*needle)))
      }
      StrPrefixOf { prefix, arg } => {
        AbstractValue::Bool(containment_from_lengths(self.length_range(*arg), self.length_range(*prefix)))
      }
      StrSuffixOf { suffix, arg } => {
        AbstractValue::Bool(containment_from_lengths(self.length_range(*arg), self.length_range(*suffix)))
      }
      StrIndexOf { .. } => AbstractValue::Int(IntRange::at_least(BigInt::from(-1))),
      StrSubstring { arg, offset, length } => {
        AbstractValue::String(substring_length(
          self.length_range(*arg),
          self.int_range(*offset),
          self.int_range(*length),
        ))
      }

      ConstArray(default) => AbstractValue::Array(Box::new(self.value(*default).clone())),
      ArraySelect { array, .. } => match self.value(*array) {
        AbstractValue::Array(elem) => (**elem).clone(),
        _ => panic!("select from a non-array abstract value"),
      },
      ArrayUpdate { array, value, .. } => match self.value(*array) {
        AbstractValue::Array(elem) => AbstractValue::Array(Box::new(elem.join(self.value(*value)))),
        _ => panic!("update of a non-array abstract value"),
      },
      ArrayMap { .. } | ArrayCopy { .. } | ArraySet { .. } => AbstractValue::top_for(sort),
      ArrayRangeEq { .. } => AbstractValue::Bool(Tristate::Any),

      StructCtor(fields) => AbstractValue::Struct(fields.iter().map(|f| self.value(*f).clone()).collect()),
      StructField { arg, index } => match self.value(*arg) {
        AbstractValue::Struct(fields) => fields[*index as usize].clone(),
        _ => panic!("field access on a non-struct abstract value"),
      },

      IntToReal(arg) => {
        let range = self.int_range(*arg);
        AbstractValue::Real(RealRange {
          lo: int_endpoint_to_bound(&range.lo),
          hi: int_endpoint_to_bound(&range.hi),
          integral: Tristate::True,
        })
      }
      RealToInt(arg) => {
        let range = self.real_range(*arg);
        AbstractValue::Int(IntRange {
          lo: range.lo.value().map(|v| v.floor().to_integer()),
          hi: range.hi.value().map(|v| v.floor().to_integer()),
        })
      }
      IntToBv(arg) => {
        let width = sort.bv_width().expect("int2bv with a non-bitvector sort");
        let range = self.int_range(*arg);
        match (&range.lo, &range.hi) {
          (Some(lo), Some(hi)) if !lo.is_negative() && hi.magnitude() <= &mask(width) => {
            AbstractValue::BitVec(BvDomain::from_range(
              width,
              lo.magnitude().clone(),
              hi.magnitude().clone(),
            ))
          }
          _ => AbstractValue::BitVec(BvDomain::top(width)),
        }
      }
      BvToInt { arg, signed } => {
        let domain = self.bv_domain(*arg);
        if *signed {
          match domain.signed_range() {
            Some((lo, hi)) => AbstractValue::Int(IntRange::bounded(lo, hi)),
            None => {
              let half = BigInt::from(mask(domain.width() - 1) + BigUint::one());
              AbstractValue::Int(IntRange::bounded(-half.clone(), half - 1))
            }
          }
        } else {
          let (lo, hi) = domain.unsigned_range();
          AbstractValue::Int(IntRange::bounded(BigInt::from(lo.clone()), BigInt::from(hi.clone())))
        }
      }

      Apply { .. } => AbstractValue::top_for(sort),
      Forall { body, .. } | Exists { body, .. } => AbstractValue::Bool(self.tristate(*body)),

      Annotated { inner, .. } => self.value(*inner).clone(),
    }
  }
}

impl Default for TermArena {
  fn default() -> Self {
    TermArena::new()
  }
}

fn int_endpoint_to_bound(endpoint: &Option<BigInt>) -> Bound {
  match endpoint {
    Some(v) => Bound::Inclusive(BigRational::from_integer(v.clone())),
    None => Bound::Unbounded,
  }
}

/// `length(substring(s, o, n))` is the intersection of `[0, n]` with `[0, length(s) - o]`,
/// clamped at zero.
fn substring_length(arg_len: &IntRange, offset: &IntRange, requested: &IntRange) -> IntRange {
  let zero = BigInt::zero();
  let available_hi = match (&arg_len.hi, &offset.lo) {
    (Some(len_hi), Some(off_lo)) => Some((len_hi - off_lo).max(zero.clone())),
    _ => None,
  };
  let hi = match (&requested.hi, &available_hi) {
    (Some(a), Some(b)) => Some(a.clone().max(zero.clone()).min(b.clone())),
    (Some(a), None) => Some(a.clone().max(zero.clone())),
    (None, Some(b)) => Some(b.clone()),
    (None, None) => None,
  };
  IntRange { lo: Some(zero), hi }
}

/// Length evidence for `contains`/`prefix`/`suffix`: a needle provably longer than its haystack
/// cannot occur in it.
fn containment_from_lengths(haystack: &IntRange, needle: &IntRange) -> Tristate {
  if let (Some(h_hi), Some(n_lo)) = (&haystack.hi, &needle.lo) {
    if n_lo > h_hi {
      return Tristate::False;
    }
  }
  Tristate::Any
}

fn special_range(func: super::SpecialFn) -> RealRange {
  use super::SpecialFn::*;
  match func {
    Sin | Cos => RealRange::bounded(
      BigRational::from_integer(BigInt::from(-1)),
      BigRational::from_integer(BigInt::from(1)),
    ),
    Exp => RealRange {
      lo: Bound::Exclusive(BigRational::zero()),
      hi: Bound::Unbounded,
      integral: Tristate::Any,
    },
    _ => RealRange::top(),
  }
}
