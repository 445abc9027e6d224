//! Gesture dispatch: routes input events through a widget tree to the
//! recognizers attached to it.
//!
//! - [`engine`]: the [`Dispatcher`], recognizer registry, handlers and the
//!   per-recognizer point tracking
//! - `propagate`: capture / target / legacy / bubble delivery
//! - `claim`: sequence states, claim and deny handling, groups
//! - `grab`: input grabs

pub mod engine;

mod claim;
mod grab;
mod propagate;

pub use engine::{Dispatcher, GestureHandler, LegacyHandler};
