/*!

Array constructors. `const_array` is interned and answers every lookup with its default;
`update` chains collapse at equal indices (last store wins); `select` pushes through updates by
identity or by abstract disjointness of the indices. `copy`, `set`, and `range_eq` are primitive
nodes.

*/

use crate::{
  api::builder::ExprBuilder,
  core::{
    domain::Tristate,
    sort::Sort,
    term::{FnId, TermData, TermId},
  },
};

impl ExprBuilder {
  #[track_caller]
  fn expect_array(&self, id: TermId, op: &str) -> (Vec<Sort>, Sort) {
    match self.sort_of(id).array_signature() {
      Some((index, elem)) => (index.to_vec(), elem.clone()),
      None => panic!("{op}: expected an array operand, got {}", self.sort_of(id)),
    }
  }

  #[track_caller]
  fn expect_indices(&self, indices: &[TermId], index_sorts: &[Sort], op: &str) {
    if indices.len() != index_sorts.len() {
      panic!(
        "{op}: expected {} index operands, got {}",
        index_sorts.len(),
        indices.len()
      );
    }
    for (index, sort) in indices.iter().zip(index_sorts.iter()) {
      self.expect_sort(*index, sort, op);
    }
  }

  /// The constant array answering every lookup with `default`.
  pub fn const_array(&mut self, index_sorts: Vec<Sort>, default: TermId) -> TermId {
    let sort = Sort::array(index_sorts, self.sort_of(default).clone());
    self.intern(sort, TermData::ConstArray(default))
  }

  pub fn array_select(&mut self, array: TermId, indices: &[TermId]) -> TermId {
    let (index_sorts, _) = self.expect_array(array, "array_select");
    self.expect_indices(indices, &index_sorts, "array_select");

    match self.data_of(array) {
      TermData::ConstArray(default) => *default,
      TermData::ArrayUpdate {
        array: base,
        indices: stored,
        value,
      } => {
        let (base, stored, value) = (*base, stored.clone(), *value);
        match self.compare_index_tuples(indices, &stored) {
          Tristate::True => value,
          Tristate::False => self.array_select(base, indices),
          Tristate::Any => self.intern_select(array, indices),
        }
      }
      _ => self.intern_select(array, indices),
    }
  }

  fn intern_select(&mut self, array: TermId, indices: &[TermId]) -> TermId {
    let (_, elem) = self.expect_array(array, "array_select");
    self.intern(
      elem,
      TermData::ArraySelect {
        array,
        indices: indices.to_vec(),
      },
    )
  }

  /// Identity-equal tuples are equal; a provably disjoint component separates them; anything
  /// else is undecided.
  fn compare_index_tuples(&self, left: &[TermId], right: &[TermId]) -> Tristate {
    let mut all_equal = true;
    for (a, b) in left.iter().zip(right.iter()) {
      if a == b {
        continue;
      }
      all_equal = false;
      if !self.value_of(*a).overlaps(self.value_of(*b)) {
        return Tristate::False;
      }
    }
    if all_equal {
      Tristate::True
    } else {
      Tristate::Any
    }
  }

  pub fn array_update(&mut self, array: TermId, indices: &[TermId], value: TermId) -> TermId {
    let (index_sorts, elem) = self.expect_array(array, "array_update");
    self.expect_indices(indices, &index_sorts, "array_update");
    self.expect_sort(value, &elem, "array_update");

    match self.data_of(array) {
      // Storing what the constant array already holds is a no-op.
      TermData::ConstArray(default) => {
        let default = *default;
        if value == default
          || self.value_of(value).check_eq(self.value_of(default)) == Tristate::True
        {
          return array;
        }
      }
      // Two stores at the same indices: the later one wins.
      TermData::ArrayUpdate {
        array: base,
        indices: stored,
        ..
      } => {
        if stored.as_slice() == indices {
          let base = *base;
          let sort = self.sort_of(array).clone();
          return self.intern(
            sort,
            TermData::ArrayUpdate {
              array: base,
              indices: indices.to_vec(),
              value,
            },
          );
        }
      }
      _ => {}
    }
    let sort = self.sort_of(array).clone();
    self.intern(
      sort,
      TermData::ArrayUpdate {
        array,
        indices: indices.to_vec(),
        value,
      },
    )
  }

  /// Maps a declared function over one or more arrays of matching index sorts.
  pub fn array_map(&mut self, func: FnId, arrays: &[TermId]) -> TermId {
    assert!(!arrays.is_empty(), "array_map: no array operands");
    let (index_sorts, _) = self.expect_array(arrays[0], "array_map");
    let domain = self.fn_domain(func).to_vec();
    if domain.len() != arrays.len() {
      panic!("array_map: function arity {} against {} arrays", domain.len(), arrays.len());
    }
    for (array, expected_elem) in arrays.iter().zip(domain.iter()) {
      let (idx, elem) = self.expect_array(*array, "array_map");
      if idx != index_sorts {
        panic!("array_map: index sorts differ across operands");
      }
      if &elem != expected_elem {
        panic!("array_map: element sort {elem} does not match parameter sort {expected_elem}");
      }
    }
    let sort = Sort::array(index_sorts, self.fn_range(func).clone());
    self.intern(
      sort,
      TermData::ArrayMap {
        func,
        arrays: arrays.to_vec(),
      },
    )
  }

  /// `copy(dest, dest_offset, src, src_offset, length)` over single-index arrays.
  pub fn array_copy(
    &mut self,
    dest: TermId,
    dest_offset: TermId,
    src: TermId,
    src_offset: TermId,
    length: TermId,
  ) -> TermId {
    let (index_sorts, _) = self.expect_array(dest, "array_copy");
    self.expect_same_sort(dest, src, "array_copy");
    assert!(index_sorts.len() == 1, "array_copy: requires a single-index array");
    self.expect_sort(dest_offset, &index_sorts[0], "array_copy");
    self.expect_sort(src_offset, &index_sorts[0], "array_copy");
    self.expect_sort(length, &index_sorts[0], "array_copy");
    let sort = self.sort_of(dest).clone();
    self.intern(
      sort,
      TermData::ArrayCopy {
        dest,
        dest_offset,
        src,
        src_offset,
        length,
      },
    )
  }

  /// `set(array, offset, value, length)`: a block store over a single-index array.
  pub fn array_set(&mut self, array: TermId, offset: TermId, value: TermId, length: TermId) -> TermId {
    let (index_sorts, elem) = self.expect_array(array, "array_set");
    assert!(index_sorts.len() == 1, "array_set: requires a single-index array");
    self.expect_sort(offset, &index_sorts[0], "array_set");
    self.expect_sort(length, &index_sorts[0], "array_set");
    self.expect_sort(value, &elem, "array_set");
    let sort = self.sort_of(array).clone();
    self.intern(
      sort,
      TermData::ArraySet {
        array,
        offset,
        value,
        length,
      },
    )
  }

  /// Equality of two ranges of single-index arrays.
  pub fn array_range_eq(
    &mut self,
    lhs: TermId,
    lhs_offset: TermId,
    rhs: TermId,
    rhs_offset: TermId,
    length: TermId,
  ) -> TermId {
    let (index_sorts, _) = self.expect_array(lhs, "array_range_eq");
    self.expect_same_sort(lhs, rhs, "array_range_eq");
    assert!(index_sorts.len() == 1, "array_range_eq: requires a single-index array");
    self.expect_sort(lhs_offset, &index_sorts[0], "array_range_eq");
    self.expect_sort(rhs_offset, &index_sorts[0], "array_range_eq");
    self.expect_sort(length, &index_sorts[0], "array_range_eq");
    self.intern(
      Sort::Bool,
      TermData::ArrayRangeEq {
        lhs,
        lhs_offset,
        rhs,
        rhs_offset,
        length,
      },
    )
  }
}
