/*!

Styled text rendering for the engine's value-like types.

Sorts, abstract values, and concrete values get printed in more than one context: compact
diagnostics in log lines, solver-facing atoms that should scan as SMT-LIB, and verbose dumps
that expose internal detail such as known-bit masks or endpoint openness. `std::fmt::Display`
offers no way to thread that context down through nested fields, so these types implement
[`Formattable`], whose `repr` takes a [`FormatStyle`] and passes it along when rendering
children. `Display` and `Debug` are then derived from the one `repr` with
[`impl_display_debug_for_formattable!`], which pins `Display` to the compact style and `Debug`
to the verbose one.

```rust
# use symex_lib::core::format::{Formattable, FormatStyle, impl_display_debug_for_formattable};
struct Width(u32);

impl Formattable for Width {
  fn repr(&self, out: &mut dyn std::fmt::Write, style: FormatStyle) -> std::fmt::Result {
    match style {
      FormatStyle::Solver => write!(out, "(_ BitVec {})", self.0),
      _ => write!(out, "bv{}", self.0),
    }
  }
}
impl_display_debug_for_formattable!(Width);

assert_eq!(Width(8).to_string(), "bv8");
```

*/

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum FormatStyle {
  /// Compact rendering for diagnostics and log lines.
  #[default]
  Default,
  /// Solver-facing rendering; atoms scan as SMT-LIB where the type has a counterpart.
  Solver,
  /// Verbose rendering exposing internal detail.
  Debug,
}

pub trait Formattable {
  /// Writes a text representation of `self` in the requested style. Implementations forward
  /// `style` when rendering nested parts.
  fn repr(&self, out: &mut dyn std::fmt::Write, style: FormatStyle) -> std::fmt::Result;
}

/// Derives `Display` (compact style) and `Debug` (verbose style) from a [`Formattable`]
/// implementation.
#[macro_export]
macro_rules! impl_display_debug_for_formattable {
  ($t:ty) => {
    impl std::fmt::Display for $t {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        $crate::core::format::Formattable::repr(self, f, $crate::core::format::FormatStyle::Default)
      }
    }

    impl std::fmt::Debug for $t {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        $crate::core::format::Formattable::repr(self, f, $crate::core::format::FormatStyle::Debug)
      }
    }
  };
}
pub use impl_display_debug_for_formattable;
