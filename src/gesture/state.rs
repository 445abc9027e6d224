//! Per-sequence claim state and propagation phases.

use std::fmt;

// ---------------------------------------------------------------------------
// SequenceState
// ---------------------------------------------------------------------------

/// Claim state of one (recognizer, sequence) pair.
///
/// Every pair starts at `None`. `Denied` is terminal and nothing returns to
/// `None` once a decision was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SequenceState {
    /// Still evaluating.
    #[default]
    None,
    /// Exclusive owner of the sequence.
    Claimed,
    /// Receives no further events for the sequence.
    Denied,
}

impl SequenceState {
    /// Whether moving from `self` to `next` is allowed.
    pub fn can_become(self, next: SequenceState) -> bool {
        match (self, next) {
            (current, next) if current == next => false,
            (SequenceState::Denied, _) => false,
            (_, SequenceState::None) => false,
            _ => true,
        }
    }

    /// Lowercase nick, as used in traces.
    pub fn nick(self) -> &'static str {
        match self {
            SequenceState::None => "none",
            SequenceState::Claimed => "claimed",
            SequenceState::Denied => "denied",
        }
    }
}

impl fmt::Display for SequenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nick())
    }
}

// ---------------------------------------------------------------------------
// PropagationPhase
// ---------------------------------------------------------------------------

/// When a recognizer runs relative to the dispatch walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PropagationPhase {
    /// Never run by propagation; events must be fed by hand.
    None,
    /// Root to target, before the target.
    Capture,
    /// The target widget only.
    Target,
    /// Target back up to the root.
    #[default]
    Bubble,
}

impl PropagationPhase {
    pub fn nick(self) -> &'static str {
        match self {
            PropagationPhase::None => "none",
            PropagationPhase::Capture => "capture",
            PropagationPhase::Target => "target",
            PropagationPhase::Bubble => "bubble",
        }
    }
}

impl fmt::Display for PropagationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nick())
    }
}
