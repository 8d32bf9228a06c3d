/*!

Struct constructors: tupling and field projection. Projecting a constructed struct returns the
field directly, and rebuilding a struct from all of its own projections returns the original
term.

*/

use crate::{
  api::builder::ExprBuilder,
  core::{
    sort::Sort,
    term::{TermData, TermId},
  },
};

impl ExprBuilder {
  pub fn struct_ctor(&mut self, fields: &[TermId]) -> TermId {
    let sort = Sort::Struct(fields.iter().map(|&field| self.sort_of(field).clone()).collect());

    // struct(field(s, 0), …, field(s, n-1)) is s itself.
    if let Some(TermData::StructField { arg: first, index: 0 }) = fields.first().map(|&f| self.data_of(f)) {
      let source = *first;
      let eta = fields.iter().enumerate().all(|(position, &field)| {
        matches!(
          self.data_of(field),
          TermData::StructField { arg, index } if *arg == source && *index as usize == position
        )
      });
      if eta && self.sort_of(source) == &sort {
        return source;
      }
    }

    self.intern(sort, TermData::StructCtor(fields.to_vec()))
  }

  pub fn struct_field(&mut self, arg: TermId, index: u32) -> TermId {
    let field_sorts = match self.sort_of(arg) {
      Sort::Struct(fields) => fields.clone(),
      other => panic!("struct_field: expected a struct operand, got {other}"),
    };
    if index as usize >= field_sorts.len() {
      panic!(
        "struct_field: field {index} of a {}-field struct",
        field_sorts.len()
      );
    }
    if let TermData::StructCtor(fields) = self.data_of(arg) {
      return fields[index as usize];
    }
    self.intern(field_sorts[index as usize].clone(), TermData::StructField { arg, index })
  }
}
