/*!

Numeric backing types for the engine's sorts and abstract domains.

`BigInt` carries mathematical-integer constants and interval endpoints, `BigUint` carries
bitvector payloads and bit masks, and `BigRational` backs the real sort. The Euclidean
`int_div`/`int_mod` pair implements SMT-LIB integer division (`0 <= x mod y < |y|`), which none
of the backing crates provide under that contract; `pow2`/`mask` build the `2^w` constants the
bitvector code reaches for constantly.

*/

pub use num_bigint::{BigInt, BigUint};
pub use num_rational::BigRational;

pub use num_traits as traits;

use num_traits::{One, Signed, Zero};

/// SMT-LIB integer division: the unique `q` with `x = q*y + r` and `0 <= r < |y|`.
///
/// The divisor must be nonzero. Callers treat division by zero as an undefined
/// operation and never reach this function with `y == 0`.
pub fn int_div(x: &BigInt, y: &BigInt) -> BigInt {
  debug_assert!(!y.is_zero(), "int_div: zero divisor");
  let r = int_mod(x, y);
  (x - r) / y
}

/// SMT-LIB integer modulus: the unique `r` with `x = q*y + r` and `0 <= r < |y|`.
pub fn int_mod(x: &BigInt, y: &BigInt) -> BigInt {
  debug_assert!(!y.is_zero(), "int_mod: zero divisor");
  let r = x % y;
  if r.is_negative() {
    r + y.abs()
  } else {
    r
  }
}

/// `2^w` as an unsigned bignum.
pub fn pow2(width: u32) -> BigUint {
  BigUint::one() << width
}

/// The all-ones bitmask of the given width, `2^w - 1`.
pub fn mask(width: u32) -> BigUint {
  pow2(width) - BigUint::one()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn euclidean_div_mod() {
    let cases: [(i64, i64, i64, i64); 6] = [
      (7, 2, 3, 1),
      (-7, 2, -4, 1),
      (7, -2, -3, 1),
      (-7, -2, 4, 1),
      (12, 4, 3, 0),
      (-12, 5, -3, 3),
    ];
    for (x, y, q, r) in cases {
      let (x, y) = (BigInt::from(x), BigInt::from(y));
      assert_eq!(int_div(&x, &y), BigInt::from(q), "{x} div {y}");
      assert_eq!(int_mod(&x, &y), BigInt::from(r), "{x} mod {y}");
      assert_eq!(&y * int_div(&x, &y) + int_mod(&x, &y), x);
    }
  }

  #[test]
  fn masks() {
    assert_eq!(mask(1), BigUint::from(1u32));
    assert_eq!(mask(16), BigUint::from(0xFFFFu32));
    assert_eq!(pow2(8), BigUint::from(256u32));
  }
}
