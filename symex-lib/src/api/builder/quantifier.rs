/*!

Quantifiers and function symbols.

Bound variables are ordinary terms whose identity is their binding site, so the vacuous-binder
test is an identity-based occurrence check over the body's DAG. Defined functions carry an
`UnfoldPolicy`; applications substitute the body capture-free when the policy (or its
configuration override) says so.

*/

use symex_abs::{IString, NatSet};

use crate::{
  api::builder::{ExprBuilder, FnDef, FnKind, UnfoldPolicy},
  core::{
    sort::Sort,
    term::{FnId, TermData, TermId},
  },
};

impl ExprBuilder {
  pub(crate) fn fn_def(&self, func: FnId) -> &FnDef {
    &self.functions[func.0 as usize]
  }

  pub(crate) fn fn_domain(&self, func: FnId) -> &[Sort] {
    &self.fn_def(func).domain
  }

  pub(crate) fn fn_range(&self, func: FnId) -> &Sort {
    &self.fn_def(func).range
  }

  pub fn fn_name(&self, func: FnId) -> &IString {
    &self.fn_def(func).name
  }

  /// Declares an uninterpreted function symbol.
  pub fn declare_fn(&mut self, name: &str, domain: Vec<Sort>, range: Sort) -> FnId {
    let id = FnId(self.functions.len() as u32);
    self.functions.push(FnDef {
      name: IString::from(name),
      domain,
      range,
      kind: FnKind::Uninterpreted,
    });
    id
  }

  /// Defines a function by a body over bound-variable parameters.
  pub fn define_fn(&mut self, name: &str, params: Vec<TermId>, body: TermId, policy: UnfoldPolicy) -> FnId {
    for &param in &params {
      if !matches!(self.data_of(param), TermData::BoundVar { .. }) {
        panic!("define_fn: parameter {} is not a bound variable", param.as_raw());
      }
    }
    let domain = params.iter().map(|&param| self.sort_of(param).clone()).collect();
    let range = self.sort_of(body).clone();
    let id = FnId(self.functions.len() as u32);
    self.functions.push(FnDef {
      name: IString::from(name),
      domain,
      range,
      kind: FnKind::Defined { params, body, policy },
    });
    id
  }

  /// Applies a function symbol. Defined functions unfold according to their policy, subject to
  /// the configuration override; `WhenConcrete` demands every argument be ground.
  pub fn apply(&mut self, func: FnId, args: &[TermId]) -> TermId {
    let def = self.fn_def(func);
    if def.domain.len() != args.len() {
      panic!(
        "apply: {} expects {} arguments, got {}",
        def.name,
        def.domain.len(),
        args.len()
      );
    }
    let domain = def.domain.clone();
    let range = def.range.clone();
    for (argument, expected) in args.iter().zip(domain.iter()) {
      self.expect_sort(*argument, expected, "apply");
    }

    if let FnKind::Defined { params, body, policy } = &self.fn_def(func).kind {
      let (params, body, policy) = (params.clone(), *body, *policy);
      let effective = self.config().unfold_override().unwrap_or(policy);
      let unfold = match effective {
        UnfoldPolicy::Always => true,
        UnfoldPolicy::Never => false,
        UnfoldPolicy::WhenConcrete => args.iter().all(|&argument| self.is_ground(argument)),
      };
      if unfold {
        let map = params.iter().copied().zip(args.iter().copied()).collect();
        return self.substitute(body, &map);
      }
    }

    self.intern(
      range,
      TermData::Apply {
        func,
        args: args.to_vec(),
      },
    )
  }

  pub fn forall(&mut self, binders: &[TermId], body: TermId) -> TermId {
    self.quantify(binders, body, true)
  }

  pub fn exists(&mut self, binders: &[TermId], body: TermId) -> TermId {
    self.quantify(binders, body, false)
  }

  fn quantify(&mut self, binders: &[TermId], body: TermId, universal: bool) -> TermId {
    assert!(!binders.is_empty(), "quantifier with no binders");
    self.expect_bool(body, "quantifier");
    for &binder in binders {
      if !matches!(self.data_of(binder), TermData::BoundVar { .. }) {
        panic!("quantifier binder {} is not a bound variable", binder.as_raw());
      }
    }

    // A quantifier over a body that never mentions its binders is the body.
    if !self.occurs_in(binders, body) {
      return body;
    }

    let data = if universal {
      TermData::Forall {
        binders: binders.to_vec(),
        body,
      }
    } else {
      TermData::Exists {
        binders: binders.to_vec(),
        body,
      }
    };
    self.intern(Sort::Bool, data)
  }

  /// Does any of `needles` occur in the DAG rooted at `root`?
  pub(crate) fn occurs_in(&self, needles: &[TermId], root: TermId) -> bool {
    let mut visited = NatSet::new();
    let mut pending = vec![root];
    while let Some(current) = pending.pop() {
      if !visited.insert(current.as_raw() as usize) {
        continue;
      }
      if needles.contains(&current) {
        return true;
      }
      pending.extend(self.children(current));
    }
    false
  }
}
