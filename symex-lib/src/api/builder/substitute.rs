/*!

Capture-free substitution: rebuilds the DAG above the replaced leaves, re-running every
constructor so the usual folding and normalization apply to the instantiated term. Replacement
is keyed on term identity, and bound variables are their own terms, so there is nothing to
alpha-rename.

*/

use symex_abs::{
  numeric::{traits::One, BigInt, BigRational},
  HashMap,
};

use crate::{
  api::builder::ExprBuilder,
  core::{
    semiring::{BvArithRing, BvXorRing, IntRing, LinearSum, RealRing},
    term::{TermData, TermId},
  },
};

impl ExprBuilder {
  /// Replaces every occurrence (by identity) of the map's keys under `root`.
  pub fn substitute(&mut self, root: TermId, map: &HashMap<TermId, TermId>) -> TermId {
    let mut memo: HashMap<TermId, TermId> = HashMap::new();
    self.substitute_memo(root, map, &mut memo)
  }

  fn substitute_memo(
    &mut self,
    id: TermId,
    map: &HashMap<TermId, TermId>,
    memo: &mut HashMap<TermId, TermId>,
  ) -> TermId {
    if let Some(&replacement) = map.get(&id) {
      return replacement;
    }
    if let Some(&done) = memo.get(&id) {
      return done;
    }

    let children = self.children(id);
    let mut rebuilt: HashMap<TermId, TermId> = HashMap::new();
    let mut changed = false;
    for child in children {
      let new_child = self.substitute_memo(child, map, memo);
      if new_child != child {
        changed = true;
      }
      rebuilt.insert(child, new_child);
    }

    let result = if changed { self.rebuild(id, &rebuilt) } else { id };
    memo.insert(id, result);
    result
  }

  /// Reconstructs one node with its children replaced per `m`, routing through the public
  /// constructors so the result is normalized and interned.
  fn rebuild(&mut self, id: TermId, m: &HashMap<TermId, TermId>) -> TermId {
    let get = |x: &TermId| -> TermId { m.get(x).copied().unwrap_or(*x) };
    let data = self.data_of(id).clone();
    let sort = self.sort_of(id).clone();

    use TermData::*;
    match data {
      // Leaves never change.
      BoolLit(_) | Var { .. } | BoundVar { .. } | StringLit(_) | FloatLit(_) => id,

      Not(a) => {
        let a = get(&a);
        self.not(a)
      }
      And(items) => {
        let items: Vec<TermId> = items.iter().map(&get).collect();
        self.and(&items)
      }
      Ite {
        cond,
        then_branch,
        else_branch,
      } => {
        let (c, t, e) = (get(&cond), get(&then_branch), get(&else_branch));
        self.ite(c, t, e)
      }
      Eq(a, b) | ArrayEq(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.eq(a, b)
      }
      IntLe(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.int_le(a, b)
      }
      RealLe(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.real_le(a, b)
      }
      BvUlt(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.bv_ult(a, b)
      }
      BvSlt(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.bv_slt(a, b)
      }
      RealIsInt(a) => {
        let a = get(&a);
        self.real_is_int(a)
      }
      BvTestBit { arg, index } => {
        let arg = get(&arg);
        self.bv_test_bit(arg, index)
      }

      IntSum(sum) => {
        let ring = IntRing;
        let mut acc = LinearSum::constant(&ring, sum.offset().clone());
        for (term, coeff) in sum.iter() {
          let child_sum = self.to_int_sum(get(&term));
          acc = acc.add_scaled(&ring, coeff, &child_sum);
        }
        self.intern_int_sum(acc)
      }
      RealSum(sum) => {
        let ring = RealRing;
        let mut acc = LinearSum::constant(&ring, sum.offset().clone());
        for (term, coeff) in sum.iter() {
          let child_sum = self.to_real_sum(get(&term));
          acc = acc.add_scaled(&ring, coeff, &child_sum);
        }
        self.intern_real_sum(acc)
      }
      BvSum(sum) => {
        let width = sort.bv_width().expect("bitvector sum with a non-bitvector sort");
        let ring = BvArithRing::new(width);
        let mut acc = LinearSum::constant(&ring, sum.offset().clone());
        for (term, coeff) in sum.iter() {
          let child_sum = self.to_bv_sum(get(&term));
          acc = acc.add_scaled(&ring, coeff, &child_sum);
        }
        self.intern_bv_sum(width, acc)
      }
      BvXorSum(sum) => {
        let width = sort.bv_width().expect("bitvector xor sum with a non-bitvector sort");
        let ring = BvXorRing::new(width);
        let mut acc = LinearSum::constant(&ring, sum.offset().clone());
        for (term, coeff) in sum.iter() {
          let child_sum = self.to_xor_sum(get(&term));
          acc = acc.add_scaled(&ring, coeff, &child_sum);
        }
        self.intern_bv_xor_sum(width, acc)
      }

      IntProd(prod) => {
        let one = self.int_lit(BigInt::one());
        prod
          .eval(
            |term| get(&term),
            |a, b| self.int_mul(a, b),
          )
          .unwrap_or(one)
      }
      RealProd(prod) => {
        let one = self.real_lit(BigRational::one());
        prod
          .eval(
            |term| get(&term),
            |a, b| self.real_mul(a, b),
          )
          .unwrap_or(one)
      }
      BvProd(prod) => {
        let width = sort.bv_width().expect("bitvector product with a non-bitvector sort");
        let one = self.bv_lit(width, 1u32.into());
        prod
          .eval(
            |term| get(&term),
            |a, b| self.bv_mul(a, b),
          )
          .unwrap_or(one)
      }

      IntDiv(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.int_div(a, b)
      }
      IntMod(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.int_mod(a, b)
      }
      RealDiv(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.real_div(a, b)
      }
      RealSpecial { func, args } => {
        let args: Vec<TermId> = args.iter().map(&get).collect();
        self.real_special(func, &args)
      }

      BvAnd(items) => {
        let items: Vec<TermId> = items.iter().map(&get).collect();
        self.bv_and(&items)
      }
      BvOr(items) => {
        let items: Vec<TermId> = items.iter().map(&get).collect();
        self.bv_or(&items)
      }
      BvConcat(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.bv_concat(a, b)
      }
      BvExtract { arg, offset, length } => {
        let arg = get(&arg);
        self.bv_extract(arg, offset, length)
      }
      BvUdiv(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.bv_udiv(a, b)
      }
      BvUrem(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.bv_urem(a, b)
      }
      BvSdiv(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.bv_sdiv(a, b)
      }
      BvSrem(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.bv_srem(a, b)
      }
      BvShl(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.bv_shl(a, b)
      }
      BvLshr(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.bv_lshr(a, b)
      }
      BvAshr(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.bv_ashr(a, b)
      }
      BvRol(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.bv_rol(a, b)
      }
      BvRor(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.bv_ror(a, b)
      }
      BvZext(a) => {
        let width = sort.bv_width().expect("zext with a non-bitvector sort");
        let a = get(&a);
        self.bv_zext(a, width)
      }
      BvSext(a) => {
        let width = sort.bv_width().expect("sext with a non-bitvector sort");
        let a = get(&a);
        self.bv_sext(a, width)
      }
      BvPopcount(a) => {
        let a = get(&a);
        self.bv_popcount(a)
      }
      BvCountLeadingZeros(a) => {
        let a = get(&a);
        self.bv_count_leading_zeros(a)
      }
      BvCountTrailingZeros(a) => {
        let a = get(&a);
        self.bv_count_trailing_zeros(a)
      }
      BvFill(cond) => {
        let width = sort.bv_width().expect("fill with a non-bitvector sort");
        let cond = get(&cond);
        self.bv_fill(width, cond)
      }

      FpNeg(a) => {
        let a = get(&a);
        self.fp_neg(a)
      }
      FpAbs(a) => {
        let a = get(&a);
        self.fp_abs(a)
      }
      FpArith { op, rm, lhs, rhs } => {
        use crate::core::term::FpBinOp;
        let (a, b) = (get(&lhs), get(&rhs));
        match op {
          FpBinOp::Add => self.fp_add(rm, a, b),
          FpBinOp::Sub => self.fp_sub(rm, a, b),
          FpBinOp::Mul => self.fp_mul(rm, a, b),
          FpBinOp::Div => self.fp_div(rm, a, b),
        }
      }
      FpRem(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.fp_rem(a, b)
      }
      FpFma { rm, x, y, z } => {
        let (x, y, z) = (get(&x), get(&y), get(&z));
        self.fp_fma(rm, x, y, z)
      }
      FpSqrt { rm, arg } => {
        let arg = get(&arg);
        self.fp_sqrt(rm, arg)
      }
      FpMin(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.fp_min(a, b)
      }
      FpMax(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.fp_max(a, b)
      }
      FpRound { rm, arg } => {
        let arg = get(&arg);
        self.fp_round(rm, arg)
      }
      FpTest { op, arg } => {
        let arg = get(&arg);
        self.fp_test(op, arg)
      }
      FpLe(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.fp_le(a, b)
      }
      FpLt(a, b) => {
        let (a, b) = (get(&a), get(&b));
        self.fp_lt(a, b)
      }
      FpFromBits(a) => {
        let (eb, sb) = sort.float_format().expect("fp_from_bits with a non-float sort");
        let a = get(&a);
        self.fp_from_bits(eb, sb, a)
      }
      FpToBits(a) => {
        let a = get(&a);
        self.fp_to_bits(a)
      }
      FpToReal(a) => {
        let a = get(&a);
        self.fp_to_real(a)
      }
      RealToFp { rm, arg } => {
        let (eb, sb) = sort.float_format().expect("real_to_fp with a non-float sort");
        let arg = get(&arg);
        self.real_to_fp(rm, eb, sb, arg)
      }

      StrConcat(items) => {
        let items: Vec<TermId> = items.iter().map(&get).collect();
        self.str_concat(&items)
      }
      StrLength(a) => {
        let a = get(&a);
        self.str_length(a)
      }
      StrContains { haystack, needle } => {
        let (h, n) = (get(&haystack), get(&needle));
        self.str_contains(h, n)
      }
      StrIndexOf { haystack, needle, from } => {
        let (h, n, f) = (get(&haystack), get(&needle), get(&from));
        self.str_index_of(h, n, f)
      }
      StrPrefixOf { prefix, arg } => {
        let (p, s) = (get(&prefix), get(&arg));
        self.str_prefix_of(p, s)
      }
      StrSuffixOf { suffix, arg } => {
        let (p, s) = (get(&suffix), get(&arg));
        self.str_suffix_of(p, s)
      }
      StrSubstring { arg, offset, length } => {
        let (s, o, n) = (get(&arg), get(&offset), get(&length));
        self.str_substring(s, o, n)
      }

      ConstArray(default) => {
        let (index, _) = sort.array_signature().expect("const array with a non-array sort");
        let index = index.to_vec();
        let default = get(&default);
        self.const_array(index, default)
      }
      ArraySelect { array, indices } => {
        let array = get(&array);
        let indices: Vec<TermId> = indices.iter().map(&get).collect();
        self.array_select(array, &indices)
      }
      ArrayUpdate { array, indices, value } => {
        let array = get(&array);
        let indices: Vec<TermId> = indices.iter().map(&get).collect();
        let value = get(&value);
        self.array_update(array, &indices, value)
      }
      ArrayMap { func, arrays } => {
        let arrays: Vec<TermId> = arrays.iter().map(&get).collect();
        self.array_map(func, &arrays)
      }
      ArrayCopy {
        dest,
        dest_offset,
        src,
        src_offset,
        length,
      } => {
        let (d, doff, s, soff, len) = (get(&dest), get(&dest_offset), get(&src), get(&src_offset), get(&length));
        self.array_copy(d, doff, s, soff, len)
      }
      ArraySet {
        array,
        offset,
        value,
        length,
      } => {
        let (a, o, v, len) = (get(&array), get(&offset), get(&value), get(&length));
        self.array_set(a, o, v, len)
      }
      ArrayRangeEq {
        lhs,
        lhs_offset,
        rhs,
        rhs_offset,
        length,
      } => {
        let (a, ao, b, bo, len) = (get(&lhs), get(&lhs_offset), get(&rhs), get(&rhs_offset), get(&length));
        self.array_range_eq(a, ao, b, bo, len)
      }

      StructCtor(fields) => {
        let fields: Vec<TermId> = fields.iter().map(&get).collect();
        self.struct_ctor(&fields)
      }
      StructField { arg, index } => {
        let arg = get(&arg);
        self.struct_field(arg, index)
      }

      IntToReal(a) => {
        let a = get(&a);
        self.int_to_real(a)
      }
      RealToInt(a) => {
        let a = get(&a);
        self.real_to_int(a)
      }
      IntToBv(a) => {
        let width = sort.bv_width().expect("int2bv with a non-bitvector sort");
        let a = get(&a);
        self.int_to_bv(a, width)
      }
      BvToInt { arg, signed } => {
        let arg = get(&arg);
        self.bv_to_int(arg, signed)
      }

      Apply { func, args } => {
        let args: Vec<TermId> = args.iter().map(&get).collect();
        self.apply(func, &args)
      }
      Forall { binders, body } => {
        let body = get(&body);
        self.forall(&binders, body)
      }
      Exists { binders, body } => {
        let body = get(&body);
        self.exists(&binders, body)
      }

      Annotated { inner, .. } => {
        let inner = get(&inner);
        self.annotate(inner).1
      }
    }
  }
}
