/*!

Per-sort abstract value lattices.

Every interned term carries an element of the domain of its sort: a tristate for booleans,
intervals for integers and reals, a combined known-bits/interval domain for bitvectors, a length
interval for strings, and structural products for structs and arrays. Floats are opaque.

Domains are sound (they contain every concrete value the term can take) and monotone (operators
never produce a domain excluding a value producible by the concrete operation). They are joined
only across ITE, never in a fixpoint loop, so no widening is required.

*/

mod bv_domain;
mod int_range;
mod real_range;
mod tristate;
mod value;

pub use bv_domain::BvDomain;
pub use int_range::IntRange;
pub use real_range::{Bound, RealRange};
pub use tristate::Tristate;
pub use value::{AbstractValue, LengthRange};
