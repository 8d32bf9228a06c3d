/*!

The builder's configuration store: an opaque key/value map consulted at operation time.

External frontends write options through `set_option`; the builder reads them when it has a
decision to make, currently whether to override the per-function unfold policy.

*/

use symex_abs::{HashMap, IString};

use once_cell::sync::Lazy;

use crate::api::builder::UnfoldPolicy;

/// The key overriding every defined function's unfold policy.
pub static OPT_DEFINED_FN_UNFOLD: Lazy<IString> = Lazy::new(|| IString::from("defined-fn-unfold"));

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum OptionValue {
  Bool(bool),
  Int(i64),
  Text(IString),
}

#[derive(Default)]
pub struct BuilderConfig {
  options: HashMap<IString, OptionValue>,
}

impl BuilderConfig {
  pub fn new() -> BuilderConfig {
    BuilderConfig::default()
  }

  pub fn get_option(&self, key: &IString) -> Option<&OptionValue> {
    self.options.get(key)
  }

  pub fn set_option(&mut self, key: IString, value: OptionValue) {
    self.options.insert(key, value);
  }

  /// The unfold-policy override, when one is configured and parses.
  pub fn unfold_override(&self) -> Option<UnfoldPolicy> {
    match self.get_option(&OPT_DEFINED_FN_UNFOLD)? {
      OptionValue::Text(text) => match text.as_ref() {
        "never" => Some(UnfoldPolicy::Never),
        "always" => Some(UnfoldPolicy::Always),
        "when-concrete" => Some(UnfoldPolicy::WhenConcrete),
        _ => None,
      },
      _ => None,
    }
  }
}
