//! Gesture recognizers: per-sequence claim state, point tracking and the
//! concrete multi-press and rotate gestures.
//!
//! Recognizers live in a [`Dispatcher`](crate::dispatch::Dispatcher), which
//! feeds them events and emits their signals.

pub mod core;
pub mod multipress;
pub mod recognizer;
pub mod rotate;
pub mod signal;
pub mod single;
pub mod state;

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a recognizer registered with a dispatcher.
    pub struct GestureId;

    /// Handle to a group of synchronized recognizers.
    pub struct GroupId;
}

pub use self::core::{GestureCore, PointData};
pub use multipress::MultiPress;
pub use recognizer::{Effect, EventFilter, Recognizer};
pub use rotate::Rotate;
pub use signal::{GestureSignal, SignalKind};
pub use single::SingleFilter;
pub use state::{PropagationPhase, SequenceState};
