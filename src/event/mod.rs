//! Event system: input events, sequences, handler storage.

pub mod handler;
pub mod input;

pub use handler::{HandlerId, HandlerList, Propagation};
pub use input::{Event, EventKind, InputSource, ModifierState, SequenceId};
