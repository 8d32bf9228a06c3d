/*!

A hash-consed symbolic expression engine for SMT-driven tools.

Clients construct terms of a multi-sorted logic through an [`ExprBuilder`]; the builder folds
constants, normalizes boolean conjunctions and semiring sums/products, fuses if-then-else over
shared structure, and interns every node so that structural equality is identity. Every term
carries a sound abstract value of its sort that the simplifiers consult.

```
use symex_lib::ExprBuilder;
use symex_abs::numeric::BigInt;

let mut builder = ExprBuilder::new();
let x = builder.fresh_var("x", symex_lib::Sort::Integer);
let three = builder.int_lit(BigInt::from(3));
let sum = builder.int_add(x, three);
let back = builder.int_sub(sum, three);
// x + 3 - 3 is x again, by identity
assert_eq!(back, x);
```

*/

pub mod api;
pub mod core;

#[cfg(test)]
mod tests;

pub use api::{
  classify, feature_of_theory, required_features, ConcreteValue, ExprBuilder, ProblemFeature,
  ProblemFeatures, RoundingMode, SpecialFn, Theory, UnfoldPolicy,
};
pub use core::{
  domain::{AbstractValue, BvDomain, IntRange, LengthRange, RealRange, Tristate},
  sort::{Sort, StringEncoding},
  term::{AnnotationId, FnId, FpTestOp, SourceLocation, TermId},
  BuilderConfig, BuilderError, OptionValue, SolverEvent,
};
