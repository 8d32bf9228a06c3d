/*!

Integer and real arithmetic. Everything additive builds weighted sums; `mul` scales when a side
is constant and otherwise forms a product monomial. Division and modulus fold under SMT-LIB
(Euclidean) semantics and wrap otherwise — division by zero wraps too, yielding an unspecified
value of the correct sort rather than an error.

*/

use symex_abs::{
  debug,
  numeric::{int_div, int_mod, BigInt, BigRational, traits::{One, Signed, Zero}},
};

use crate::{
  api::builder::ExprBuilder,
  core::{
    domain::Tristate,
    semiring::{IntRing, LinearSum, PowerProduct, RealRing},
    sort::Sort,
    term::{SpecialFn, TermData, TermId},
  },
};

impl ExprBuilder {
  // region Sum and product plumbing

  /// Views any integer term as a weighted sum.
  pub(crate) fn to_int_sum(&self, x: TermId) -> LinearSum<BigInt> {
    match self.data_of(x) {
      TermData::IntSum(sum) => sum.clone(),
      _ => LinearSum::var(&IntRing, x),
    }
  }

  pub(crate) fn to_real_sum(&self, x: TermId) -> LinearSum<BigRational> {
    match self.data_of(x) {
      TermData::RealSum(sum) => sum.clone(),
      _ => LinearSum::var(&RealRing, x),
    }
  }

  /// Interns a canonical integer sum, collapsing the `1·x` form to `x` itself.
  pub(crate) fn intern_int_sum(&mut self, sum: LinearSum<BigInt>) -> TermId {
    if let Some(x) = sum.as_var(&IntRing) {
      return x;
    }
    self.intern(Sort::Integer, TermData::IntSum(sum))
  }

  pub(crate) fn intern_real_sum(&mut self, sum: LinearSum<BigRational>) -> TermId {
    if let Some(x) = sum.as_var(&RealRing) {
      return x;
    }
    self.intern(Sort::Real, TermData::RealSum(sum))
  }

  /// Views any term of a semiring sort as a product form.
  pub(crate) fn to_prod(&self, x: TermId) -> PowerProduct {
    match self.data_of(x) {
      TermData::IntProd(prod) | TermData::RealProd(prod) | TermData::BvProd(prod) => prod.clone(),
      _ => PowerProduct::var(x),
    }
  }

  /// Interns a canonical product for the given sort, collapsing identity and `x^1`.
  pub(crate) fn intern_prod(&mut self, sort: &Sort, prod: PowerProduct) -> TermId {
    if let Some(x) = prod.as_var() {
      return x;
    }
    if prod.is_identity() {
      return match sort {
        Sort::Integer => self.int_lit(BigInt::one()),
        Sort::Real => self.real_lit(BigRational::one()),
        Sort::BitVec(width) => self.bv_lit(*width, 1u32.into()),
        _ => panic!("product form over a non-semiring sort {sort}"),
      };
    }
    match sort {
      Sort::Integer => self.intern(Sort::Integer, TermData::IntProd(prod)),
      Sort::Real => self.intern(Sort::Real, TermData::RealProd(prod)),
      Sort::BitVec(width) => self.intern(Sort::bitvec(*width), TermData::BvProd(prod)),
      _ => panic!("product form over a non-semiring sort {sort}"),
    }
  }

  // endregion

  // region Integers

  pub fn int_lit(&mut self, value: BigInt) -> TermId {
    let sum = LinearSum::constant(&IntRing, value);
    self.intern(Sort::Integer, TermData::IntSum(sum))
  }

  pub fn int_add(&mut self, x: TermId, y: TermId) -> TermId {
    self.expect_int(x, "int_add");
    self.expect_int(y, "int_add");
    let sum = self.to_int_sum(x).add(&IntRing, &self.to_int_sum(y));
    self.intern_int_sum(sum)
  }

  pub fn int_sub(&mut self, x: TermId, y: TermId) -> TermId {
    self.expect_int(x, "int_sub");
    self.expect_int(y, "int_sub");
    let minus_one = -BigInt::one();
    let sum = self.to_int_sum(x).add_scaled(&IntRing, &minus_one, &self.to_int_sum(y));
    self.intern_int_sum(sum)
  }

  pub fn int_neg(&mut self, x: TermId) -> TermId {
    self.expect_int(x, "int_neg");
    let sum = self.to_int_sum(x).negate(&IntRing);
    self.intern_int_sum(sum)
  }

  pub fn int_mul(&mut self, x: TermId, y: TermId) -> TermId {
    self.expect_int(x, "int_mul");
    self.expect_int(y, "int_mul");
    if let Some(k) = self.known_int(x) {
      let sum = self.to_int_sum(y).scale(&IntRing, &k);
      return self.intern_int_sum(sum);
    }
    if let Some(k) = self.known_int(y) {
      let sum = self.to_int_sum(x).scale(&IntRing, &k);
      return self.intern_int_sum(sum);
    }
    let prod = self.to_prod(x).mul(&self.to_prod(y), false);
    self.intern_prod(&Sort::Integer, prod)
  }

  /// SMT-LIB integer division: `y·(x div y) + (x mod y) = x` with `0 <= x mod y < |y|`.
  /// Division by zero wraps as a node and denotes an unspecified integer.
  pub fn int_div(&mut self, x: TermId, y: TermId) -> TermId {
    self.expect_int(x, "int_div");
    self.expect_int(y, "int_div");
    if let Some(divisor) = self.known_int(y) {
      if divisor.is_zero() {
        debug!(3, "int_div by zero wraps as an unspecified value");
        return self.intern(Sort::Integer, TermData::IntDiv(x, y));
      }
      if let Some(numerator) = self.known_int(x) {
        return self.int_lit(int_div(&numerator, &divisor));
      }
      if divisor.is_one() {
        return x;
      }
      if divisor == -BigInt::one() {
        return self.int_neg(x);
      }
    }
    self.intern(Sort::Integer, TermData::IntDiv(x, y))
  }

  /// SMT-LIB modulus. A constant modulus also reduces the numerator's sum coefficients, which
  /// proves divisibility facts such as `(4a + 6) mod 2 = 0`.
  pub fn int_mod(&mut self, x: TermId, y: TermId) -> TermId {
    self.expect_int(x, "int_mod");
    self.expect_int(y, "int_mod");
    if let Some(divisor) = self.known_int(y) {
      if divisor.is_zero() {
        debug!(3, "int_mod by zero wraps as an unspecified value");
        return self.intern(Sort::Integer, TermData::IntMod(x, y));
      }
      if let Some(numerator) = self.known_int(x) {
        return self.int_lit(int_mod(&numerator, &divisor));
      }
      if divisor.abs() == BigInt::one() {
        return self.int_lit(BigInt::zero());
      }
      let reduced = self.to_int_sum(x).reduce_mod_k(&divisor.abs());
      if let Some(k) = reduced.as_constant() {
        return self.int_lit(k.clone());
      }
    }
    self.intern(Sort::Integer, TermData::IntMod(x, y))
  }

  pub fn int_abs(&mut self, x: TermId) -> TermId {
    self.expect_int(x, "int_abs");
    let zero = self.int_lit(BigInt::zero());
    let non_negative = self.int_le(zero, x);
    let negated = self.int_neg(x);
    self.ite(non_negative, x, negated)
  }

  pub fn int_le(&mut self, x: TermId, y: TermId) -> TermId {
    self.expect_int(x, "int_le");
    self.expect_int(y, "int_le");
    if x == y {
      return self.true_lit();
    }
    match self.value_of(x).as_int_range().check_le(self.value_of(y).as_int_range()) {
      Tristate::True => return self.true_lit(),
      Tristate::False => return self.false_lit(),
      Tristate::Any => {}
    }
    // x <= y iff 0 <= y - x; a constant difference decides it.
    let minus_one = -BigInt::one();
    let difference = self.to_int_sum(y).add_scaled(&IntRing, &minus_one, &self.to_int_sum(x));
    if let Some(k) = difference.as_constant() {
      return self.bool_lit(!k.is_negative());
    }
    self.intern(Sort::Bool, TermData::IntLe(x, y))
  }

  pub fn int_lt(&mut self, x: TermId, y: TermId) -> TermId {
    let reversed = self.int_le(y, x);
    self.not(reversed)
  }

  pub fn int_min(&mut self, x: TermId, y: TermId) -> TermId {
    let le = self.int_le(x, y);
    self.ite(le, x, y)
  }

  pub fn int_max(&mut self, x: TermId, y: TermId) -> TermId {
    let le = self.int_le(x, y);
    self.ite(le, y, x)
  }

  // endregion

  // region Reals

  pub fn real_lit(&mut self, value: BigRational) -> TermId {
    let sum = LinearSum::constant(&RealRing, value);
    self.intern(Sort::Real, TermData::RealSum(sum))
  }

  pub fn real_add(&mut self, x: TermId, y: TermId) -> TermId {
    self.expect_real(x, "real_add");
    self.expect_real(y, "real_add");
    let sum = self.to_real_sum(x).add(&RealRing, &self.to_real_sum(y));
    self.intern_real_sum(sum)
  }

  pub fn real_sub(&mut self, x: TermId, y: TermId) -> TermId {
    self.expect_real(x, "real_sub");
    self.expect_real(y, "real_sub");
    let minus_one = -BigRational::one();
    let sum = self.to_real_sum(x).add_scaled(&RealRing, &minus_one, &self.to_real_sum(y));
    self.intern_real_sum(sum)
  }

  pub fn real_neg(&mut self, x: TermId) -> TermId {
    self.expect_real(x, "real_neg");
    let sum = self.to_real_sum(x).negate(&RealRing);
    self.intern_real_sum(sum)
  }

  pub fn real_mul(&mut self, x: TermId, y: TermId) -> TermId {
    self.expect_real(x, "real_mul");
    self.expect_real(y, "real_mul");
    if let Some(k) = self.known_real(x) {
      let sum = self.to_real_sum(y).scale(&RealRing, &k);
      return self.intern_real_sum(sum);
    }
    if let Some(k) = self.known_real(y) {
      let sum = self.to_real_sum(x).scale(&RealRing, &k);
      return self.intern_real_sum(sum);
    }
    let prod = self.to_prod(x).mul(&self.to_prod(y), false);
    self.intern_prod(&Sort::Real, prod)
  }

  /// Real division. A constant non-zero divisor becomes a scale; division by zero wraps and
  /// denotes an unspecified real.
  pub fn real_div(&mut self, x: TermId, y: TermId) -> TermId {
    self.expect_real(x, "real_div");
    self.expect_real(y, "real_div");
    if let Some(divisor) = self.known_real(y) {
      if !divisor.is_zero() {
        let sum = self.to_real_sum(x).scale(&RealRing, &divisor.recip());
        return self.intern_real_sum(sum);
      }
      debug!(3, "real_div by zero wraps as an unspecified value");
    }
    self.intern(Sort::Real, TermData::RealDiv(x, y))
  }

  pub fn real_le(&mut self, x: TermId, y: TermId) -> TermId {
    self.expect_real(x, "real_le");
    self.expect_real(y, "real_le");
    if x == y {
      return self.true_lit();
    }
    match self.value_of(x).as_real_range().check_le(self.value_of(y).as_real_range()) {
      Tristate::True => return self.true_lit(),
      Tristate::False => return self.false_lit(),
      Tristate::Any => {}
    }
    let minus_one = -BigRational::one();
    let difference = self.to_real_sum(y).add_scaled(&RealRing, &minus_one, &self.to_real_sum(x));
    if let Some(k) = difference.as_constant() {
      return self.bool_lit(!k.is_negative());
    }
    self.intern(Sort::Bool, TermData::RealLe(x, y))
  }

  pub fn real_lt(&mut self, x: TermId, y: TermId) -> TermId {
    let reversed = self.real_le(y, x);
    self.not(reversed)
  }

  pub fn real_min(&mut self, x: TermId, y: TermId) -> TermId {
    let le = self.real_le(x, y);
    self.ite(le, x, y)
  }

  pub fn real_max(&mut self, x: TermId, y: TermId) -> TermId {
    let le = self.real_le(x, y);
    self.ite(le, y, x)
  }

  /// Is the real an integer?
  pub fn real_is_int(&mut self, x: TermId) -> TermId {
    self.expect_real(x, "real_is_int");
    match self.value_of(x).as_real_range().integral {
      Tristate::True => return self.true_lit(),
      Tristate::False => return self.false_lit(),
      Tristate::Any => {}
    }
    self.intern(Sort::Bool, TermData::RealIsInt(x))
  }

  /// A transcendental or algebraic special on the reals. Out-of-domain arguments (`sqrt` of a
  /// negative, `log` of a non-positive, `tan` at a discontinuity) yield an unspecified real; no
  /// error is raised.
  pub fn real_special(&mut self, func: SpecialFn, args: &[TermId]) -> TermId {
    if args.len() != func.arity() {
      panic!("{}: expected {} arguments, got {}", func.name_str(), func.arity(), args.len());
    }
    for &arg in args {
      self.expect_real(arg, func.name_str());
    }
    self.intern(
      Sort::Real,
      TermData::RealSpecial {
        func,
        args: args.to_vec(),
      },
    )
  }

  // endregion

  // region Conversions

  pub fn int_to_real(&mut self, x: TermId) -> TermId {
    self.expect_int(x, "int_to_real");
    if let Some(value) = self.known_int(x) {
      return self.real_lit(BigRational::from_integer(value));
    }
    self.intern(Sort::Real, TermData::IntToReal(x))
  }

  /// SMT-LIB `to_int`: the floor of the real.
  pub fn real_to_int(&mut self, x: TermId) -> TermId {
    self.expect_real(x, "real_to_int");
    if let Some(value) = self.known_real(x) {
      return self.int_lit(value.floor().to_integer());
    }
    if let TermData::IntToReal(inner) = self.data_of(x) {
      return *inner;
    }
    self.intern(Sort::Integer, TermData::RealToInt(x))
  }

  // endregion
}
