//! The [`Recognizer`] trait: the hooks a concrete gesture plugs into the
//! generic point tracking.
//!
//! Hooks never emit signals themselves. They return [`Effect`]s which the
//! dispatcher emits in order once the hook returns, so a handler reacting to
//! one of them may freely call back into the dispatcher.

use std::any::Any;

use crate::config::Settings;
use crate::event::{Event, SequenceId};

use super::core::GestureCore;
use super::signal::GestureSignal;

/// Follow-up work requested by a recognizer hook.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Emit a signal on the recognizer.
    Signal(GestureSignal),
    /// Re-evaluate recognition for the last updated sequence.
    Recheck,
}

impl From<GestureSignal> for Effect {
    fn from(signal: GestureSignal) -> Self {
        Effect::Signal(signal)
    }
}

/// Verdict of [`Recognizer::filter_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    /// Feed the event to point tracking.
    Accept,
    /// Drop the event silently.
    Ignore,
    /// Drop the event and reset the recognizer if it is active.
    Reset,
}

/// A concrete gesture.
///
/// The default hooks describe a plain recognizer: every event is accepted,
/// recognition happens when exactly [`n_points`](Recognizer::n_points)
/// sequences are active, and no extra signals are emitted.
pub trait Recognizer: Any {
    /// Short type name for diagnostics.
    fn type_name(&self) -> &'static str;

    /// Number of sequences the gesture needs.
    fn n_points(&self) -> usize {
        1
    }

    /// Decide whether `event` reaches point tracking.
    fn filter_event(&mut self, _core: &GestureCore, _event: &Event, _settings: &Settings) -> EventFilter {
        EventFilter::Accept
    }

    /// Called after point tracking processed an accepted event.
    fn event_handled(&mut self, _core: &GestureCore, _event: &Event) {}

    /// Extra recognition condition, evaluated once the point count matches.
    fn check(&self, core: &GestureCore) -> bool {
        core.n_active_points() == core.n_points()
    }

    fn begin(&mut self, _core: &GestureCore, _settings: &Settings, _sequence: SequenceId) -> Vec<Effect> {
        Vec::new()
    }

    fn update(&mut self, _core: &GestureCore, _settings: &Settings, _sequence: SequenceId) -> Vec<Effect> {
        Vec::new()
    }

    fn end(&mut self, _core: &GestureCore, _settings: &Settings, _sequence: SequenceId) -> Vec<Effect> {
        Vec::new()
    }

    fn cancel(&mut self, _core: &GestureCore, _settings: &Settings, _sequence: SequenceId) -> Vec<Effect> {
        Vec::new()
    }

    /// Runs before every tracked sequence is cancelled by a reset.
    fn reset(&mut self, _core: &GestureCore) -> Vec<Effect> {
        Vec::new()
    }

    /// Timers that ran out by `now` (milliseconds).
    fn expire(&mut self, _core: &GestureCore, _now: u32) -> Vec<Effect> {
        Vec::new()
    }

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
