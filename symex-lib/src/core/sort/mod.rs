/*!

Sorts are the types of the multi-sorted logic: a closed family of base sorts, some of them
parameterized (bitvector width, float format, string encoding, struct fields, array index and
element sorts).

Two sorts are equal exactly when they are structurally identical. Every term carries its sort as a
first-class, inspectable attribute; the builder checks argument sorts at operation entry and
treats a mismatch as a programmer error.

Unlike a subsort lattice there is no ordering between distinct sorts here; the lattice structure
of this engine lives in the per-sort abstract value domains instead (see
[`domain`](crate::core::domain)).

*/

mod sort;

pub use sort::{Sort, StringEncoding};
