/*!

End-to-end scenarios exercising the builder through its public surface: folding chains,
interning identity, canonicalization, projection round-trips, and the boundary behaviors that
must not abort.

*/

use rand::{seq::SliceRandom, SeedableRng};

use symex_abs::numeric::{BigInt, BigRational, BigUint};

use crate::{
  api::{classify, required_features, ConcreteValue, ProblemFeature},
  core::{
    sort::{Sort, StringEncoding},
    term::TermId,
  },
  ExprBuilder, UnfoldPolicy,
};

fn int(builder: &mut ExprBuilder, value: i64) -> TermId {
  builder.int_lit(BigInt::from(value))
}

fn bv16(builder: &mut ExprBuilder, value: u64) -> TermId {
  builder.bv_lit(16, BigUint::from(value))
}

// region Scenario table

#[test]
fn s1_ite_double_negation() {
  let mut builder = ExprBuilder::new();
  let t = builder.true_lit();
  let n1 = builder.not(t);
  let cond = builder.not(n1);
  let one = int(&mut builder, 1);
  let two = int(&mut builder, 2);
  let result = builder.ite(cond, one, two);
  assert_eq!(builder.concrete(result), Some(ConcreteValue::Int(BigInt::from(1))));
}

#[test]
fn s2_ite_or_on_bitvectors() {
  let mut builder = ExprBuilder::new();
  let f = builder.false_lit();
  let nf = builder.not(f);
  let cond = builder.or2(f, nf);
  let a = bv16(&mut builder, 12890);
  let b = bv16(&mut builder, 8293);
  let result = builder.ite(cond, a, b);
  assert_eq!(
    builder.concrete(result),
    Some(ConcreteValue::BitVec {
      width: 16,
      value: BigUint::from(12890u32)
    })
  );
}

#[test]
fn s3_ite_xor_on_structs() {
  let mut builder = ExprBuilder::new();
  let t = builder.true_lit();
  let f = builder.false_lit();
  let cond = builder.xor(t, f);
  let st = builder.struct_ctor(&[t]);
  let sf = builder.struct_ctor(&[f]);
  let result = builder.ite(cond, st, sf);
  assert_eq!(
    builder.concrete(result),
    Some(ConcreteValue::Struct(vec![ConcreteValue::Bool(true)]))
  );
}

#[test]
fn s4_ite_eq_on_constant_arrays() {
  let mut builder = ExprBuilder::new();
  let t = builder.true_lit();
  let f = builder.false_lit();
  let conj = builder.and2(t, f);
  let cond = builder.eq(conj, f);
  let arr_t = builder.const_array(vec![Sort::Integer], t);
  let arr_f = builder.const_array(vec![Sort::Integer], f);
  let result = builder.ite(cond, arr_t, arr_f);
  assert_eq!(
    builder.concrete(result),
    Some(ConcreteValue::Array {
      index:   vec![Sort::Integer],
      default: Box::new(ConcreteValue::Bool(true)),
    })
  );
}

#[test]
fn s5_sum_cancellation() {
  let mut builder = ExprBuilder::new();
  let x = builder.fresh_var("x", Sort::Integer);
  let three = int(&mut builder, 3);
  let a = builder.int_add(x, three);
  let b = builder.int_sub(a, three);
  assert_eq!(b, x);
  let zero = builder.int_sub(b, x);
  assert_eq!(builder.concrete(zero), Some(ConcreteValue::Int(BigInt::from(0))));
}

#[test]
fn s6_set_bit_xor_cancels() {
  let mut builder = ExprBuilder::new();
  let zero = bv16(&mut builder, 0);
  let t = builder.true_lit();
  let a = builder.bv_set_bit(zero, 3, t);
  let b = builder.bv_set_bit(zero, 3, t);
  assert_eq!(a, b);
  let result = builder.bv_xor(a, b);
  assert_eq!(
    builder.concrete(result),
    Some(ConcreteValue::BitVec {
      width: 16,
      value: BigUint::from(0u32)
    })
  );
}

// endregion

// region Quantified invariants

#[test]
fn interning_is_identity() {
  let mut builder = ExprBuilder::new();
  let x = builder.fresh_var("x", Sort::Integer);
  let y = builder.fresh_var("y", Sort::Integer);
  let a = builder.int_add(x, y);
  let b = builder.int_add(y, x);
  assert_eq!(a, b);

  let p = builder.fresh_var("p", Sort::Bool);
  let q = builder.fresh_var("q", Sort::Bool);
  let c1 = builder.and(&[p, q, p]);
  let c2 = builder.and(&[q, p]);
  assert_eq!(c1, c2);
}

#[test]
fn fresh_variables_are_distinct() {
  let mut builder = ExprBuilder::new();
  let a = builder.fresh_var("v", Sort::Integer);
  let b = builder.fresh_var("v", Sort::Integer);
  assert_ne!(a, b);
}

#[test]
fn ite_laws() {
  let mut builder = ExprBuilder::new();
  let p = builder.fresh_var("p", Sort::Bool);
  let x = builder.fresh_var("x", Sort::Integer);
  let y = builder.fresh_var("y", Sort::Integer);

  assert_eq!(builder.ite(p, x, x), x);
  let t = builder.true_lit();
  let f = builder.false_lit();
  assert_eq!(builder.ite(t, x, y), x);
  assert_eq!(builder.ite(f, x, y), y);

  let np = builder.not(p);
  let flipped = builder.ite(np, x, y);
  let direct = builder.ite(p, y, x);
  assert_eq!(flipped, direct);
}

#[test]
fn ite_hoists_common_sum() {
  let mut builder = ExprBuilder::new();
  let p = builder.fresh_var("p", Sort::Bool);
  let z = builder.fresh_var("z", Sort::Integer);
  let x = builder.fresh_var("x", Sort::Integer);
  let y = builder.fresh_var("y", Sort::Integer);

  let zx = builder.int_add(z, x);
  let zy = builder.int_add(z, y);
  let fused = builder.ite(p, zx, zy);

  let inner = builder.ite(p, x, y);
  let expected = builder.int_add(z, inner);
  assert_eq!(fused, expected);
}

#[test]
fn bv_xor_laws() {
  let mut builder = ExprBuilder::new();
  let x = builder.fresh_var("x", Sort::bitvec(16));
  let zero = bv16(&mut builder, 0);
  let cancelled = builder.bv_xor(x, x);
  assert_eq!(cancelled, zero);
  assert_eq!(builder.bv_xor(x, zero), x);

  let n = builder.bv_not(x);
  let nn = builder.bv_not(n);
  assert_eq!(nn, x);
}

#[test]
fn bv_mask_identity_laws() {
  let mut builder = ExprBuilder::new();
  let x = builder.fresh_var("x", Sort::bitvec(16));
  let zero = bv16(&mut builder, 0);
  let ones = bv16(&mut builder, 0xFFFF);

  assert_eq!(builder.bv_and2(x, zero), zero);
  assert_eq!(builder.bv_and2(x, ones), x);
  assert_eq!(builder.bv_or2(x, zero), x);
  assert_eq!(builder.bv_or2(x, ones), ones);

  let n = builder.bv_not(x);
  assert_eq!(builder.bv_and2(x, n), zero);
  assert_eq!(builder.bv_or2(x, n), ones);
}

#[test]
fn conjunction_with_complement_is_false() {
  let mut builder = ExprBuilder::new();
  let p = builder.fresh_var("p", Sort::Bool);
  let q = builder.fresh_var("q", Sort::Bool);
  let np = builder.not(p);
  assert_eq!(builder.and(&[p, q, np]), builder.false_lit());
}

#[test]
fn concrete_round_trip() {
  let mut builder = ExprBuilder::new();
  let values = vec![
    ConcreteValue::Bool(true),
    ConcreteValue::Int(BigInt::from(-42)),
    ConcreteValue::Real(BigRational::new(BigInt::from(3), BigInt::from(4))),
    ConcreteValue::BitVec {
      width: 8,
      value: BigUint::from(0xA5u32),
    },
    ConcreteValue::Str {
      encoding: StringEncoding::Unicode,
      value:    "hello".to_string(),
    },
    ConcreteValue::Struct(vec![
      ConcreteValue::Bool(false),
      ConcreteValue::Int(BigInt::from(7)),
    ]),
    ConcreteValue::Array {
      index:   vec![Sort::bitvec(8)],
      default: Box::new(ConcreteValue::Bool(true)),
    },
  ];
  for value in values {
    let term = builder.from_concrete(&value);
    assert_eq!(builder.concrete(term), Some(value));
  }
}

#[test]
fn classifier_is_total_over_everything_built() {
  let mut builder = ExprBuilder::new();
  // Touch each theory once.
  let x = builder.fresh_var("x", Sort::Integer);
  let y = builder.fresh_var("y", Sort::Integer);
  let prod = builder.int_mul(x, y);
  let _ = builder.int_le(prod, x);
  let b = builder.fresh_var("b", Sort::bitvec(8));
  let _ = builder.bv_popcount(b);
  let r = builder.fresh_var("r", Sort::Real);
  let _ = builder.real_special(crate::SpecialFn::Sin, &[r]);
  let s = builder.fresh_var("s", Sort::String(StringEncoding::Unicode));
  let _ = builder.str_length(s);
  let arr = builder.const_array(vec![Sort::Integer], x);
  let _ = builder.array_select(arr, &[y]);
  let st = builder.struct_ctor(&[x, b]);
  let _ = builder.struct_field(st, 0);
  let f = builder.fresh_var("f", Sort::float(8, 24));
  let _ = builder.fp_abs(f);
  let v = builder.bound_var("v", Sort::Integer);
  let body = builder.int_le(v, x);
  let _ = builder.forall(&[v], body);
  let g = builder.declare_fn("g", vec![Sort::Integer], Sort::Integer);
  let _ = builder.apply(g, &[x]);

  for raw in 0..builder.term_count() as u32 {
    // Every node classifies; a panic here is a coverage hole.
    let _ = classify(&builder, TermId::from_raw(raw));
  }
}

#[test]
fn abstract_values_join_across_ite() {
  let mut builder = ExprBuilder::new();
  let p = builder.fresh_var("p", Sort::Bool);
  let x = builder
    .fresh_bounded_int("x", BigInt::from(0), BigInt::from(10))
    .unwrap();
  let y = builder
    .fresh_bounded_int("y", BigInt::from(20), BigInt::from(30))
    .unwrap();
  let joined = builder.ite(p, x, y);
  let range = builder.value_of(joined).as_int_range();
  assert!(range.contains(&BigInt::from(0)));
  assert!(range.contains(&BigInt::from(30)));
  assert!(!range.contains(&BigInt::from(-1)));
  assert!(!range.contains(&BigInt::from(31)));
}

#[test]
fn bounded_variables_drive_comparisons() {
  let mut builder = ExprBuilder::new();
  let x = builder
    .fresh_bounded_int("x", BigInt::from(0), BigInt::from(9))
    .unwrap();
  let ten = int(&mut builder, 10);
  assert_eq!(builder.int_le(x, ten), builder.true_lit());
  assert_eq!(builder.int_lt(ten, x), builder.false_lit());

  let b = builder
    .fresh_bounded_bv("b", 8, BigUint::from(1u32), BigUint::from(7u32))
    .unwrap();
  let eight = builder.bv_lit(8, BigUint::from(8u32));
  assert_eq!(builder.bv_ult(b, eight), builder.true_lit());
}

#[test]
fn invalid_ranges_are_recoverable() {
  let mut builder = ExprBuilder::new();
  assert!(builder
    .fresh_bounded_int("x", BigInt::from(5), BigInt::from(1))
    .is_err());
  assert!(builder
    .fresh_bounded_bv("b", 8, BigUint::from(0u32), BigUint::from(256u32))
    .is_err());
  // The builder stays usable after a rejected range.
  let x = builder.fresh_var("x", Sort::Integer);
  assert_eq!(builder.int_sub(x, x), int(&mut builder, 0));
}

// endregion

// region Boundary checks

#[test]
fn division_by_zero_does_not_abort() {
  let mut builder = ExprBuilder::new();
  let x = builder.fresh_var("x", Sort::bitvec(16));
  let zero = bv16(&mut builder, 0);
  let quotient = builder.bv_udiv(x, zero);
  let remainder = builder.bv_urem(x, zero);
  assert_eq!(builder.sort_of(quotient), &Sort::bitvec(16));
  assert_eq!(builder.sort_of(remainder), &Sort::bitvec(16));
  // Still usable afterwards.
  let one = bv16(&mut builder, 1);
  assert_eq!(builder.bv_add(zero, one), one);

  let n = builder.fresh_var("n", Sort::Integer);
  let int_zero = int(&mut builder, 0);
  let q = builder.int_div(n, int_zero);
  assert_eq!(builder.sort_of(q), &Sort::Integer);
}

#[test]
fn vacuous_quantifier_collapses() {
  let mut builder = ExprBuilder::new();
  let v = builder.bound_var("v", Sort::Integer);
  let x = builder.fresh_var("x", Sort::Integer);
  let body = builder.int_le(x, x);
  // body is `true`, which certainly does not mention v
  assert_eq!(builder.forall(&[v], body), body);

  let y = builder.fresh_var("y", Sort::Integer);
  let body = builder.int_le(x, y);
  assert_eq!(builder.exists(&[v], body), body);

  let mentioned = builder.int_le(v, y);
  assert_ne!(builder.forall(&[v], mentioned), mentioned);
}

#[test]
fn annotation_preserves_semantics() {
  let mut builder = ExprBuilder::new();
  let x = int(&mut builder, 17);
  let (id, annotated) = builder.annotate(x);
  assert_ne!(annotated, x);
  assert_eq!(builder.concrete(annotated), builder.concrete(x));
  // Re-annotating returns the existing id.
  let (again, same) = builder.annotate(annotated);
  assert_eq!(again, id);
  assert_eq!(same, annotated);
}

// endregion

// region Rewrites

#[test]
fn select_through_updates() {
  let mut builder = ExprBuilder::new();
  let default = builder.false_lit();
  let array = builder.const_array(vec![Sort::Integer], default);
  let i = builder
    .fresh_bounded_int("i", BigInt::from(0), BigInt::from(4))
    .unwrap();
  let j = int(&mut builder, 10);
  let t = builder.true_lit();

  let updated = builder.array_update(array, &[i], t);
  // Same index: the stored value.
  assert_eq!(builder.array_select(updated, &[i]), t);
  // Disjoint index: reads through to the constant array.
  assert_eq!(builder.array_select(updated, &[j]), default);

  // Updating a constant array with its own default is a no-op.
  assert_eq!(builder.array_update(array, &[i], default), array);

  // A second store at the same index wins.
  let f = builder.false_lit();
  let twice = builder.array_update(updated, &[i], f);
  assert_eq!(builder.array_select(twice, &[i]), f);
}

#[test]
fn extract_concat_rewrites() {
  let mut builder = ExprBuilder::new();
  let hi = builder.fresh_var("hi", Sort::bitvec(8));
  let lo = builder.fresh_var("lo", Sort::bitvec(8));
  let combined = builder.bv_concat(hi, lo);

  assert_eq!(builder.bv_extract(combined, 0, 8), lo);
  assert_eq!(builder.bv_extract(combined, 8, 8), hi);

  // Slice of a slice collapses onto the base.
  let wide = builder.fresh_var("w", Sort::bitvec(32));
  let middle = builder.bv_extract(wide, 8, 16);
  let nibble = builder.bv_extract(middle, 4, 4);
  let direct = builder.bv_extract(wide, 12, 4);
  assert_eq!(nibble, direct);

  // Adjacent slices of one base fuse back together.
  let low_half = builder.bv_extract(wide, 0, 16);
  let high_half = builder.bv_extract(wide, 16, 16);
  assert_eq!(builder.bv_concat(high_half, low_half), wide);
}

#[test]
fn shift_folding() {
  let mut builder = ExprBuilder::new();
  let x = bv16(&mut builder, 0x00FF);
  let four = bv16(&mut builder, 4);
  let sixteen = bv16(&mut builder, 16);

  assert_eq!(builder.bv_shl(x, four), bv16(&mut builder, 0x0FF0));
  assert_eq!(builder.bv_lshr(x, four), bv16(&mut builder, 0x000F));
  assert_eq!(builder.bv_shl(x, sixteen), bv16(&mut builder, 0));
  assert_eq!(builder.bv_rol(x, four), bv16(&mut builder, 0x0FF0));
  assert_eq!(builder.bv_ror(x, four), bv16(&mut builder, 0xF00F));

  let neg = bv16(&mut builder, 0x8000);
  assert_eq!(builder.bv_ashr(neg, four), bv16(&mut builder, 0xF800));
}

#[test]
fn integer_modular_reduction() {
  let mut builder = ExprBuilder::new();
  let a = builder.fresh_var("a", Sort::Integer);
  let four = int(&mut builder, 4);
  let six = int(&mut builder, 6);
  let two = int(&mut builder, 2);
  // (4a + 6) mod 2 = 0 without knowing a
  let scaled = builder.int_mul(four, a);
  let sum = builder.int_add(scaled, six);
  assert_eq!(builder.int_mod(sum, two), int(&mut builder, 0));
}

#[test]
fn string_folding() {
  let mut builder = ExprBuilder::new();
  let enc = StringEncoding::Unicode;
  let hello = builder.str_lit(enc, "hello ");
  let world = builder.str_lit(enc, "world");
  let s = builder.fresh_var("s", Sort::String(enc));

  let greeting = builder.str_concat(&[hello, world]);
  assert_eq!(greeting, builder.str_lit(enc, "hello world"));
  assert_eq!(builder.str_length(greeting), int(&mut builder, 11));

  // Adjacent literals merge around a symbolic piece.
  let mixed = builder.str_concat(&[hello, world, s]);
  assert_eq!(builder.children(mixed).len(), 2);

  let needle = builder.str_lit(enc, "lo wo");
  assert_eq!(builder.str_contains(greeting, needle), builder.true_lit());
  // Length evidence alone refutes containment.
  let long = builder.str_lit(enc, "much longer than the haystack");
  assert_eq!(builder.str_contains(greeting, long), builder.false_lit());

  let six = int(&mut builder, 6);
  let five = int(&mut builder, 5);
  let sub = builder.str_substring(greeting, six, five);
  assert_eq!(sub, world);
}

#[test]
fn defined_functions_unfold_by_policy() {
  let mut builder = ExprBuilder::new();
  let v = builder.bound_var("v", Sort::Integer);
  let one = int(&mut builder, 1);
  let body = builder.int_add(v, one);

  let succ = builder.define_fn("succ", vec![v], body, UnfoldPolicy::WhenConcrete);
  let five = int(&mut builder, 5);
  assert_eq!(builder.apply(succ, &[five]), int(&mut builder, 6));

  // Symbolic argument under WhenConcrete: stays an application.
  let x = builder.fresh_var("x", Sort::Integer);
  let applied = builder.apply(succ, &[x]);
  assert_ne!(applied, builder.int_add(x, one));

  let succ_always = builder.define_fn("succ!", vec![v], body, UnfoldPolicy::Always);
  let unfolded = builder.apply(succ_always, &[x]);
  assert_eq!(unfolded, builder.int_add(x, one));
}

#[test]
fn feature_folding() {
  let mut builder = ExprBuilder::new();
  let x = builder.fresh_var("x", Sort::Integer);
  let y = builder.fresh_var("y", Sort::Integer);
  let sum = builder.int_add(x, y);
  let le = builder.int_le(sum, x);
  let b = builder.fresh_var("b", Sort::bitvec(8));
  let pop = builder.bv_popcount(b);
  let two = builder.bv_lit(8, BigUint::from(2u32));
  let cmp = builder.bv_ult(pop, two);
  let both = builder.and2(le, cmp);

  let features = required_features(&builder, [both]);
  assert!(features.contains(ProblemFeature::LinearArith));
  assert!(features.contains(ProblemFeature::Bitvectors));
  assert!(!features.contains(ProblemFeature::Floats));

  let prod = builder.int_mul(x, y);
  let nonlinear = builder.int_le(prod, x);
  assert!(required_features(&builder, [nonlinear]).contains(ProblemFeature::NonlinearArith));
}

#[test]
fn sum_interning_ignores_construction_order() {
  let mut builder = ExprBuilder::new();
  let variables: Vec<TermId> = (0..8).map(|i| builder.fresh_var(&format!("v{i}"), Sort::Integer)).collect();
  let coefficients: Vec<i64> = vec![3, -1, 7, 2, -9, 4, 11, -5];

  let mut rng = rand::rngs::StdRng::seed_from_u64(0xDECAF);
  let mut reference: Option<TermId> = None;
  for _ in 0..16 {
    let mut order: Vec<usize> = (0..variables.len()).collect();
    order.shuffle(&mut rng);
    let mut acc = int(&mut builder, 5);
    for &position in &order {
      let coefficient = int(&mut builder, coefficients[position]);
      let scaled = builder.int_mul(coefficient, variables[position]);
      acc = builder.int_add(acc, scaled);
    }
    match reference {
      None => reference = Some(acc),
      Some(expected) => assert_eq!(acc, expected),
    }
  }
}

// endregion
