/*!

The term representation: immutable, hash-consed nodes owned by a single arena.

Every node carries its sort, a stable identifier, its operator payload (`TermData`), the abstract
value computed once at construction, and optional metadata. Identifiers are allocated from a
monotonically increasing counter and are unique within one arena; they serve as map keys and as
the tiebreaker in total orderings of terms.

Interning guarantee: two structurally equal nodes (same operator, identity-equal children,
including the ordered-map structure of embedded sums and products) share one identifier.
Identity implies semantic equality, but not vice versa.

*/

mod arena;
mod data;

use symex_abs::IString;

use crate::core::{domain::AbstractValue, sort::Sort};

pub use arena::TermArena;
pub use data::{FpBinOp, FpTestOp, RoundingMode, SpecialFn, TermData};

/// Stable identity of an interned term within its builder.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TermId(u32);

impl TermId {
  #[inline(always)]
  pub(crate) fn from_raw(raw: u32) -> TermId {
    TermId(raw)
  }

  #[inline(always)]
  pub fn as_raw(self) -> u32 {
    self.0
  }
}

/// Identity of an annotation attached via `annotate`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct AnnotationId(pub(crate) u64);

/// Identity of a declared (uninterpreted or defined) function.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FnId(pub(crate) u32);

/// A source position carried as metadata; never affects identity or semantics.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SourceLocation {
  pub file:   IString,
  pub line:   u32,
  pub column: u32,
}

#[derive(Clone, Default, Debug)]
pub struct Metadata {
  pub location: Option<SourceLocation>,
}

/// One interned node. Nodes are never mutated or freed individually; they live as long as the
/// owning arena.
pub struct TermNode {
  id:       TermId,
  sort:     Sort,
  data:     TermData,
  value:    AbstractValue,
  metadata: Metadata,
}

impl TermNode {
  pub(crate) fn new(id: TermId, sort: Sort, data: TermData, value: AbstractValue, metadata: Metadata) -> TermNode {
    TermNode {
      id,
      sort,
      data,
      value,
      metadata,
    }
  }

  #[inline(always)]
  pub fn id(&self) -> TermId {
    self.id
  }

  #[inline(always)]
  pub fn sort(&self) -> &Sort {
    &self.sort
  }

  #[inline(always)]
  pub fn data(&self) -> &TermData {
    &self.data
  }

  #[inline(always)]
  pub fn value(&self) -> &AbstractValue {
    &self.value
  }

  #[inline(always)]
  pub fn metadata(&self) -> &Metadata {
    &self.metadata
  }

  /// The children in deterministic order, sufficient to drive any external traversal.
  pub fn children(&self) -> smallvec::SmallVec<[TermId; 4]> {
    self.data.children()
  }
}
