/*!

Solver events dispatched synchronously to an installed listener.

The listener must not call back into the builder; it observes construction, nothing more.

*/

use crate::core::term::{AnnotationId, TermId};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SolverEvent {
  /// A node was interned for the first time.
  TermCreated { id: TermId },
  /// A fresh annotation identity was attached to a term.
  AnnotationCreated { id: AnnotationId, term: TermId },
}

pub type EventListener = Box<dyn FnMut(&SolverEvent)>;
