/*!

Engine internals: sorts, abstract value domains, the semiring algebra, the node arena and
interning table, configuration, and events.

*/

mod config;
mod error;
mod event;
pub mod domain;
pub mod format;
pub mod semiring;
pub mod sort;
pub mod term;

// Reexports to flatten some of the smaller modules
pub use config::{BuilderConfig, OptionValue, OPT_DEFINED_FN_UNFOLD};
pub use error::BuilderError;
pub use event::{EventListener, SolverEvent};
