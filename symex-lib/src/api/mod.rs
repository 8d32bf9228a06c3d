/*!

The public API of the library: the expression builder, the theory classifier, the
problem-features bitset, and the concrete projection.

*/

pub mod builder;
pub mod concrete;
pub mod features;
pub mod theory;
mod writer;

pub use builder::{ExprBuilder, RoundingMode, SpecialFn, UnfoldPolicy};
pub use concrete::ConcreteValue;
pub use features::{feature_of_theory, required_features, ProblemFeature, ProblemFeatures};
pub use theory::{classify, Theory};
