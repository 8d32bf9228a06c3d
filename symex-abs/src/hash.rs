/*!

Structural hashing helpers.

Interned nodes need a structural fingerprint that is cheap to combine incrementally. Ordered
children combine with an FNV-1a fold; unordered collections (conjunction sets, sum maps before
canonical ordering) combine with a commutative fold so that the fingerprint is independent of
insertion order.

*/

pub type HashType = u64;

const FNV_OFFSET: HashType = 0xcbf29ce484222325;
const FNV_PRIME: HashType = 0x100000001b3;

/// FNV-1a fold of one 64-bit value into a running hash.
#[inline(always)]
pub fn hash_combine(acc: HashType, value: HashType) -> HashType {
  let mut h = acc;
  for byte in value.to_le_bytes() {
    h ^= byte as HashType;
    h = h.wrapping_mul(FNV_PRIME);
  }
  h
}

/// FNV-1a hash of a byte slice.
pub fn hash_bytes(bytes: &[u8]) -> HashType {
  let mut h = FNV_OFFSET;
  for &byte in bytes {
    h ^= byte as HashType;
    h = h.wrapping_mul(FNV_PRIME);
  }
  h
}

/// Hash of an ordered sequence of already-hashed parts.
pub fn hash_sequence(parts: impl IntoIterator<Item = HashType>) -> HashType {
  parts.into_iter().fold(FNV_OFFSET, hash_combine)
}

/// Order-independent hash of an unordered collection of already-hashed parts.
///
/// Each part is scrambled through one FNV round before the wrapping-add fold so that
/// `{a, b}` and `{a ^ b, 0}` do not collide trivially.
pub fn commutative_hash(parts: impl IntoIterator<Item = HashType>) -> HashType {
  parts
    .into_iter()
    .fold(0, |acc, p| acc.wrapping_add(hash_combine(FNV_OFFSET, p)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sequence_hash_is_order_sensitive() {
    assert_ne!(hash_sequence([1, 2, 3]), hash_sequence([3, 2, 1]));
  }

  #[test]
  fn commutative_hash_is_order_insensitive() {
    assert_eq!(commutative_hash([1, 2, 3]), commutative_hash([3, 2, 1]));
    assert_ne!(commutative_hash([1, 2]), commutative_hash([1, 3]));
  }
}
