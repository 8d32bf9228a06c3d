/*!

String constructors. Concatenation flattens and merges adjacent literals; the empty string is
the unit. Every string node tracks a length interval, and the containment predicates consult it:
a needle provably longer than its haystack folds to false without looking at a single character.

*/

use symex_abs::numeric::{BigInt, traits::{Signed, ToPrimitive}};

use crate::{
  api::builder::ExprBuilder,
  core::{
    domain::Tristate,
    sort::{Sort, StringEncoding},
    term::{TermData, TermId},
  },
};

impl ExprBuilder {
  #[track_caller]
  pub(crate) fn expect_string(&self, id: TermId, op: &str) -> StringEncoding {
    match self.sort_of(id) {
      Sort::String(encoding) => *encoding,
      other => panic!("{op}: expected a string operand, got {other}"),
    }
  }

  pub fn str_lit(&mut self, encoding: StringEncoding, value: &str) -> TermId {
    self.intern(Sort::String(encoding), TermData::StringLit(value.to_string()))
  }

  pub fn str_concat2(&mut self, x: TermId, y: TermId) -> TermId {
    self.str_concat(&[x, y])
  }

  /// N-ary concatenation: flattens nested concatenations, drops empty literals, and merges
  /// adjacent literals.
  pub fn str_concat(&mut self, items: &[TermId]) -> TermId {
    assert!(!items.is_empty(), "str_concat: empty operand list");
    let encoding = self.expect_string(items[0], "str_concat");

    let mut flattened: Vec<TermId> = Vec::new();
    let mut pending: Vec<TermId> = items.iter().rev().copied().collect();
    while let Some(item) = pending.pop() {
      let found = self.expect_string(item, "str_concat");
      if found != encoding {
        panic!("str_concat: mixed string encodings");
      }
      match self.data_of(item) {
        TermData::StrConcat(children) => {
          for &child in children.iter().rev() {
            pending.push(child);
          }
        }
        TermData::StringLit(text) if text.is_empty() => {}
        _ => flattened.push(item),
      }
    }

    // Merge adjacent literals.
    let mut merged: Vec<TermId> = Vec::new();
    let mut pending_literal = String::new();
    for item in flattened {
      if let TermData::StringLit(text) = self.data_of(item) {
        pending_literal.push_str(text);
      } else {
        if !pending_literal.is_empty() {
          let literal = self.str_lit(encoding, &std::mem::take(&mut pending_literal));
          merged.push(literal);
        }
        merged.push(item);
      }
    }
    if !pending_literal.is_empty() {
      let literal = self.str_lit(encoding, &pending_literal);
      merged.push(literal);
    }

    match merged.len() {
      0 => self.str_lit(encoding, ""),
      1 => merged[0],
      _ => self.intern(Sort::String(encoding), TermData::StrConcat(merged)),
    }
  }

  pub fn str_length(&mut self, s: TermId) -> TermId {
    self.expect_string(s, "str_length");
    if let Some(length) = self.value_of(s).as_length_range().as_singleton() {
      let length = length.clone();
      return self.int_lit(length);
    }
    self.intern(Sort::Integer, TermData::StrLength(s))
  }

  pub fn str_contains(&mut self, haystack: TermId, needle: TermId) -> TermId {
    self.expect_string(haystack, "str_contains");
    self.expect_string(needle, "str_contains");
    if haystack == needle {
      return self.true_lit();
    }
    if let (TermData::StringLit(h), TermData::StringLit(n)) = (self.data_of(haystack), self.data_of(needle)) {
      let result = h.contains(n.as_str());
      return self.bool_lit(result);
    }
    if let TermData::StringLit(n) = self.data_of(needle) {
      if n.is_empty() {
        return self.true_lit();
      }
    }
    match self.length_evidence(haystack, needle) {
      Tristate::False => self.false_lit(),
      _ => self.intern(
        Sort::Bool,
        TermData::StrContains { haystack, needle },
      ),
    }
  }

  pub fn str_prefix_of(&mut self, prefix: TermId, arg: TermId) -> TermId {
    self.expect_string(prefix, "str_prefix_of");
    self.expect_string(arg, "str_prefix_of");
    if prefix == arg {
      return self.true_lit();
    }
    if let (TermData::StringLit(p), TermData::StringLit(s)) = (self.data_of(prefix), self.data_of(arg)) {
      let result = s.starts_with(p.as_str());
      return self.bool_lit(result);
    }
    if let TermData::StringLit(p) = self.data_of(prefix) {
      if p.is_empty() {
        return self.true_lit();
      }
    }
    match self.length_evidence(arg, prefix) {
      Tristate::False => self.false_lit(),
      _ => self.intern(Sort::Bool, TermData::StrPrefixOf { prefix, arg }),
    }
  }

  pub fn str_suffix_of(&mut self, suffix: TermId, arg: TermId) -> TermId {
    self.expect_string(suffix, "str_suffix_of");
    self.expect_string(arg, "str_suffix_of");
    if suffix == arg {
      return self.true_lit();
    }
    if let (TermData::StringLit(p), TermData::StringLit(s)) = (self.data_of(suffix), self.data_of(arg)) {
      let result = s.ends_with(p.as_str());
      return self.bool_lit(result);
    }
    if let TermData::StringLit(p) = self.data_of(suffix) {
      if p.is_empty() {
        return self.true_lit();
      }
    }
    match self.length_evidence(arg, suffix) {
      Tristate::False => self.false_lit(),
      _ => self.intern(Sort::Bool, TermData::StrSuffixOf { suffix, arg }),
    }
  }

  /// The index of the first occurrence of `needle` in `haystack` at or after `from`, `-1` when
  /// there is none.
  pub fn str_index_of(&mut self, haystack: TermId, needle: TermId, from: TermId) -> TermId {
    self.expect_string(haystack, "str_index_of");
    self.expect_string(needle, "str_index_of");
    self.expect_int(from, "str_index_of");

    if let (TermData::StringLit(h), TermData::StringLit(n)) = (self.data_of(haystack), self.data_of(needle)) {
      if let Some(start) = self.known_int(from) {
        let result = literal_index_of(h, n, &start);
        return self.int_lit(result);
      }
    }
    self.intern(
      Sort::Integer,
      TermData::StrIndexOf {
        haystack,
        needle,
        from,
      },
    )
  }

  /// `substring(s, offset, length)` with SMT-LIB clamping: out-of-range offsets give the empty
  /// string, and the result is truncated to the characters available.
  pub fn str_substring(&mut self, s: TermId, offset: TermId, length: TermId) -> TermId {
    let encoding = self.expect_string(s, "str_substring");
    self.expect_int(offset, "str_substring");
    self.expect_int(length, "str_substring");

    if let TermData::StringLit(text) = self.data_of(s) {
      if let (Some(off), Some(len)) = (self.known_int(offset), self.known_int(length)) {
        let result = literal_substring(text, &off, &len);
        return self.str_lit(encoding, &result);
      }
    }
    self.intern(
      Sort::String(encoding),
      TermData::StrSubstring {
        arg: s,
        offset,
        length,
      },
    )
  }

  fn length_evidence(&self, container: TermId, contained: TermId) -> Tristate {
    let container_len = self.value_of(container).as_length_range();
    let contained_len = self.value_of(contained).as_length_range();
    if let (Some(hi), Some(lo)) = (&container_len.hi, &contained_len.lo) {
      if lo > hi {
        return Tristate::False;
      }
    }
    Tristate::Any
  }
}

fn literal_index_of(haystack: &str, needle: &str, from: &BigInt) -> BigInt {
  if from.is_negative() {
    return BigInt::from(-1);
  }
  let chars: Vec<char> = haystack.chars().collect();
  let start = match from.to_usize() {
    Some(start) if start <= chars.len() => start,
    _ => return BigInt::from(-1),
  };
  let needle_chars: Vec<char> = needle.chars().collect();
  if start + needle_chars.len() > chars.len() {
    return BigInt::from(-1);
  }
  for position in start..=chars.len() - needle_chars.len() {
    if chars[position..position + needle_chars.len()] == needle_chars[..] {
      return BigInt::from(position as u64);
    }
  }
  BigInt::from(-1)
}

fn literal_substring(text: &str, offset: &BigInt, length: &BigInt) -> String {
  if offset.is_negative() || length.is_negative() {
    return String::new();
  }
  let chars: Vec<char> = text.chars().collect();
  let start = match offset.to_usize() {
    Some(start) if start < chars.len() => start,
    _ => return String::new(),
  };
  let take = length.to_usize().unwrap_or(usize::MAX).min(chars.len() - start);
  chars[start..start + take].iter().collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use symex_abs::numeric::traits::Zero;

  #[test]
  fn literal_helpers() {
    assert_eq!(literal_index_of("hello", "l", &BigInt::zero()), BigInt::from(2));
    assert_eq!(literal_index_of("hello", "l", &BigInt::from(3)), BigInt::from(3));
    assert_eq!(literal_index_of("hello", "z", &BigInt::zero()), BigInt::from(-1));
    assert_eq!(literal_index_of("hello", "", &BigInt::from(2)), BigInt::from(2));
    assert_eq!(literal_substring("hello", &BigInt::from(1), &BigInt::from(3)), "ell");
    assert_eq!(literal_substring("hello", &BigInt::from(4), &BigInt::from(9)), "o");
    assert_eq!(literal_substring("hello", &BigInt::from(9), &BigInt::from(1)), "");
    assert_eq!(literal_substring("hello", &BigInt::from(-1), &BigInt::from(1)), "");
  }
}
