//! Signals a recognizer emits, and their kinds for handler registration.

use crate::event::SequenceId;

use super::state::SequenceState;

/// Kind of a [`GestureSignal`], used as the registration key for handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Begin,
    Update,
    End,
    Cancel,
    SequenceStateChanged,
    Pressed,
    Released,
    Stopped,
    AngleChanged,
}

/// A signal emitted by a recognizer.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureSignal {
    /// The recognizer recognized its gesture, triggered by `sequence`.
    Begin(SequenceId),
    /// A tracked sequence moved while recognized.
    Update(SequenceId),
    /// Recognition was lost, triggered by `sequence`.
    End(SequenceId),
    /// `sequence` was taken away from the recognizer.
    Cancel(SequenceId),
    /// The claim state of `sequence` changed.
    SequenceStateChanged(SequenceId, SequenceState),
    /// Multi-press: the `n_press`th press of a series.
    Pressed { n_press: u32, x: f64, y: f64 },
    /// Multi-press: release of the `n_press`th press.
    Released { n_press: u32, x: f64, y: f64 },
    /// Multi-press: the press series ended.
    Stopped,
    /// Rotate: current angle and delta from the angle at begin, in radians.
    AngleChanged { angle: f64, delta: f64 },
}

impl GestureSignal {
    pub fn kind(&self) -> SignalKind {
        match self {
            GestureSignal::Begin(_) => SignalKind::Begin,
            GestureSignal::Update(_) => SignalKind::Update,
            GestureSignal::End(_) => SignalKind::End,
            GestureSignal::Cancel(_) => SignalKind::Cancel,
            GestureSignal::SequenceStateChanged(..) => SignalKind::SequenceStateChanged,
            GestureSignal::Pressed { .. } => SignalKind::Pressed,
            GestureSignal::Released { .. } => SignalKind::Released,
            GestureSignal::Stopped => SignalKind::Stopped,
            GestureSignal::AngleChanged { .. } => SignalKind::AngleChanged,
        }
    }

    /// The sequence the signal is about, for sequence-bound signals.
    pub fn sequence(&self) -> Option<SequenceId> {
        match *self {
            GestureSignal::Begin(seq)
            | GestureSignal::Update(seq)
            | GestureSignal::End(seq)
            | GestureSignal::Cancel(seq)
            | GestureSignal::SequenceStateChanged(seq, _) => Some(seq),
            _ => None,
        }
    }
}
