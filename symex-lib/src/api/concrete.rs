/*!

Concrete projection: `concrete(t)` is `Some(v)` exactly when `t` is constant at every leaf — a
struct when all its fields are, a constant array when its default is, an annotation when its
wrapped term is. `from_concrete(v)` is the inverse, rebuilding an interned term so that
`concrete(from_concrete(v)) == Some(v)`.

*/

use std::fmt::Write;

use symex_abs::numeric::{BigInt, BigRational, BigUint};

use crate::{
  api::builder::ExprBuilder,
  core::{
    format::{FormatStyle, Formattable},
    sort::{Sort, StringEncoding},
    term::{TermData, TermId},
  },
  impl_display_debug_for_formattable,
};

/// A ground value of some sort.
#[derive(Clone, PartialEq, Eq)]
pub enum ConcreteValue {
  Bool(bool),
  Int(BigInt),
  Real(BigRational),
  BitVec { width: u32, value: BigUint },
  Float { eb: u32, sb: u32, bits: BigUint },
  Str { encoding: StringEncoding, value: String },
  Struct(Vec<ConcreteValue>),
  /// A constant array: its default at every index.
  Array {
    index:   Vec<Sort>,
    default: Box<ConcreteValue>,
  },
}

impl ConcreteValue {
  pub fn sort(&self) -> Sort {
    match self {
      ConcreteValue::Bool(_) => Sort::Bool,
      ConcreteValue::Int(_) => Sort::Integer,
      ConcreteValue::Real(_) => Sort::Real,
      ConcreteValue::BitVec { width, .. } => Sort::BitVec(*width),
      ConcreteValue::Float { eb, sb, .. } => Sort::Float { eb: *eb, sb: *sb },
      ConcreteValue::Str { encoding, .. } => Sort::String(*encoding),
      ConcreteValue::Struct(fields) => Sort::Struct(fields.iter().map(ConcreteValue::sort).collect()),
      ConcreteValue::Array { index, default } => Sort::array(index.clone(), default.sort()),
    }
  }
}

impl Formattable for ConcreteValue {
  fn repr(&self, out: &mut dyn Write, style: FormatStyle) -> std::fmt::Result {
    match self {
      ConcreteValue::Bool(b) => write!(out, "{b}"),
      ConcreteValue::Int(v) => write!(out, "{v}"),
      ConcreteValue::Real(v) => write!(out, "{v}"),
      ConcreteValue::BitVec { width, value } => write!(out, "#b{value:0>width$b}", width = *width as usize),
      ConcreteValue::Float { bits, .. } => write!(out, "fp<{bits:x}>"),
      ConcreteValue::Str { value, .. } => write!(out, "{value:?}"),
      ConcreteValue::Struct(fields) => {
        write!(out, "(")?;
        for (i, field) in fields.iter().enumerate() {
          if i > 0 {
            write!(out, ", ")?;
          }
          field.repr(out, style)?;
        }
        write!(out, ")")
      }
      ConcreteValue::Array { default, .. } => {
        write!(out, "[default: ")?;
        default.repr(out, style)?;
        write!(out, "]")
      }
    }
  }
}

impl_display_debug_for_formattable!(ConcreteValue);

impl ExprBuilder {
  /// The concrete value of a ground term, `None` when any leaf is symbolic.
  pub fn concrete(&self, id: TermId) -> Option<ConcreteValue> {
    if let TermData::Annotated { inner, .. } = self.data_of(id) {
      return self.concrete(*inner);
    }
    match self.sort_of(id).clone() {
      Sort::Bool => self.known_bool(id).map(ConcreteValue::Bool),
      Sort::Integer => self.known_int(id).map(ConcreteValue::Int),
      Sort::Real => self.known_real(id).map(ConcreteValue::Real),
      Sort::BitVec(width) => self.known_bv(id).map(|value| ConcreteValue::BitVec { width, value }),
      Sort::Float { eb, sb } => match self.data_of(id) {
        TermData::FloatLit(bits) => Some(ConcreteValue::Float {
          eb,
          sb,
          bits: bits.clone(),
        }),
        _ => None,
      },
      Sort::String(encoding) => match self.data_of(id) {
        TermData::StringLit(value) => Some(ConcreteValue::Str {
          encoding,
          value: value.clone(),
        }),
        _ => None,
      },
      Sort::Struct(_) => match self.data_of(id) {
        TermData::StructCtor(fields) => {
          let values: Option<Vec<ConcreteValue>> = fields.iter().map(|&field| self.concrete(field)).collect();
          values.map(ConcreteValue::Struct)
        }
        _ => None,
      },
      Sort::Array { index, .. } => match self.data_of(id) {
        TermData::ConstArray(default) => self.concrete(*default).map(|value| ConcreteValue::Array {
          index,
          default: Box::new(value),
        }),
        _ => None,
      },
    }
  }

  /// Is every leaf of the term a constant?
  pub fn is_ground(&self, id: TermId) -> bool {
    self.concrete(id).is_some()
  }

  /// Lifts a ground value back into an interned term.
  pub fn from_concrete(&mut self, value: &ConcreteValue) -> TermId {
    match value {
      ConcreteValue::Bool(b) => self.bool_lit(*b),
      ConcreteValue::Int(v) => self.int_lit(v.clone()),
      ConcreteValue::Real(v) => self.real_lit(v.clone()),
      ConcreteValue::BitVec { width, value } => self.bv_lit(*width, value.clone()),
      ConcreteValue::Float { eb, sb, bits } => self.fp_lit(*eb, *sb, bits.clone()),
      ConcreteValue::Str { encoding, value } => self.str_lit(*encoding, value),
      ConcreteValue::Struct(fields) => {
        let terms: Vec<TermId> = fields.iter().map(|field| self.from_concrete(field)).collect();
        self.struct_ctor(&terms)
      }
      ConcreteValue::Array { index, default } => {
        let default = self.from_concrete(default);
        self.const_array(index.clone(), default)
      }
    }
  }
}
