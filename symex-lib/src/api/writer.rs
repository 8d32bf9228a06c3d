/*!

A deterministic s-expression renderer for terms.

SMT writers drive their own traversals through `children()`; this renderer exists for
diagnostics and logging, and guarantees the property they rely on: identical terms print
identically, and traversal order is the deterministic child order.

*/

use std::fmt::Write;

use crate::{
  api::builder::ExprBuilder,
  core::term::{TermData, TermId},
};

impl ExprBuilder {
  /// Renders the term as an s-expression.
  pub fn render(&self, id: TermId) -> String {
    let mut out = String::new();
    self.render_into(id, &mut out).expect("string writer cannot fail");
    out
  }

  fn render_into(&self, id: TermId, out: &mut String) -> std::fmt::Result {
    use TermData::*;
    match self.data_of(id) {
      BoolLit(b) => write!(out, "{b}"),
      Var { name, serial } => write!(out, "{name}!{serial}"),
      BoundVar { name, serial } => write!(out, "?{name}!{serial}"),
      StringLit(text) => write!(out, "{text:?}"),
      FloatLit(bits) => write!(out, "fp<{bits:x}>"),

      IntSum(sum) => {
        if let Some(k) = sum.as_constant() {
          return write!(out, "{k}");
        }
        write!(out, "(+ {}", sum.offset())?;
        for (term, coeff) in sum.iter() {
          write!(out, " (* {coeff} ")?;
          self.render_into(term, out)?;
          write!(out, ")")?;
        }
        write!(out, ")")
      }
      RealSum(sum) => {
        if let Some(k) = sum.as_constant() {
          return write!(out, "{k}");
        }
        write!(out, "(+ {}", sum.offset())?;
        for (term, coeff) in sum.iter() {
          write!(out, " (* {coeff} ")?;
          self.render_into(term, out)?;
          write!(out, ")")?;
        }
        write!(out, ")")
      }
      BvSum(sum) => {
        if let Some(k) = sum.as_constant() {
          return write!(out, "{k:#x}");
        }
        write!(out, "(bvadd {:#x}", sum.offset())?;
        for (term, coeff) in sum.iter() {
          write!(out, " (bvmul {coeff:#x} ")?;
          self.render_into(term, out)?;
          write!(out, ")")?;
        }
        write!(out, ")")
      }
      BvXorSum(sum) => {
        write!(out, "(bvxor {:#x}", sum.offset())?;
        for (term, coeff) in sum.iter() {
          write!(out, " (bvand {coeff:#x} ")?;
          self.render_into(term, out)?;
          write!(out, ")")?;
        }
        write!(out, ")")
      }
      IntProd(prod) | RealProd(prod) | BvProd(prod) => {
        write!(out, "(*")?;
        for (term, count) in prod.iter() {
          for _ in 0..count {
            write!(out, " ")?;
            self.render_into(term, out)?;
          }
        }
        write!(out, ")")
      }

      Apply { func, args } => {
        write!(out, "({}", self.fn_name(*func))?;
        for &argument in args {
          write!(out, " ")?;
          self.render_into(argument, out)?;
        }
        write!(out, ")")
      }

      data => {
        let children = data.children();
        if children.is_empty() {
          return write!(out, "{}", data.op_name());
        }
        write!(out, "({}", data.op_name())?;
        for child in children {
          write!(out, " ")?;
          self.render_into(child, out)?;
        }
        write!(out, ")")
      }
    }
  }
}
