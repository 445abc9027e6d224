//! Recognizer state shared by every gesture: the point table and the
//! recognition flag.
//!
//! [`GestureCore`] only stores and answers questions. Emitting signals when
//! the table changes is the dispatcher's job, since signal handlers may
//! re-enter it.

use crate::dom::WidgetId;
use crate::event::{Event, SequenceId};
use crate::geometry::{Point, Rect};

use super::state::{PropagationPhase, SequenceState};

// ---------------------------------------------------------------------------
// PointData
// ---------------------------------------------------------------------------

/// What a recognizer knows about one tracked sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct PointData {
    pub state: SequenceState,
    /// The last event seen for the sequence.
    pub event: Event,
    /// The press of this sequence was consumed by an early claim.
    pub press_handled: bool,
}

impl PointData {
    fn new(event: Event) -> Self {
        Self {
            state: SequenceState::None,
            event,
            press_handled: false,
        }
    }

    /// Not denied and not yet released.
    pub fn is_active(&self) -> bool {
        self.state != SequenceState::Denied && !self.event.kind.ends_sequence()
    }

    pub fn position(&self) -> Point {
        Point::new(self.event.x, self.event.y)
    }
}

// ---------------------------------------------------------------------------
// GestureCore
// ---------------------------------------------------------------------------

/// Point table and recognition state of one recognizer.
#[derive(Debug, Clone)]
pub struct GestureCore {
    widget: WidgetId,
    phase: PropagationPhase,
    n_points: usize,
    /// Insertion ordered.
    points: Vec<(SequenceId, PointData)>,
    recognized: bool,
    last_sequence: Option<SequenceId>,
}

impl GestureCore {
    /// A core for a recognizer on `widget` that needs `n_points` sequences.
    ///
    /// # Panics
    ///
    /// Panics if `n_points` is zero.
    pub fn new(widget: WidgetId, n_points: usize) -> Self {
        assert!(n_points > 0, "a gesture needs at least one point");
        Self {
            widget,
            phase: PropagationPhase::default(),
            n_points,
            points: Vec::new(),
            recognized: false,
            last_sequence: None,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    pub fn phase(&self) -> PropagationPhase {
        self.phase
    }

    pub fn n_points(&self) -> usize {
        self.n_points
    }

    pub fn is_recognized(&self) -> bool {
        self.recognized
    }

    /// Whether some tracked sequence is still active.
    pub fn is_active(&self) -> bool {
        self.n_active_points() != 0
    }

    /// State of `sequence`; untracked sequences report `None`.
    pub fn sequence_state(&self, sequence: SequenceId) -> SequenceState {
        self.point_data(sequence)
            .map_or(SequenceState::None, |data| data.state)
    }

    /// Whether `sequence` is tracked and not denied.
    pub fn handles_sequence(&self, sequence: SequenceId) -> bool {
        self.point_data(sequence)
            .is_some_and(|data| data.state != SequenceState::Denied)
    }

    /// Active sequences, in the order they were first seen.
    pub fn sequences(&self) -> Vec<SequenceId> {
        self.points
            .iter()
            .filter(|(_, data)| data.is_active())
            .map(|(seq, _)| *seq)
            .collect()
    }

    /// Every tracked sequence, denied and released ones included.
    pub fn tracked_sequences(&self) -> Vec<SequenceId> {
        self.points.iter().map(|(seq, _)| *seq).collect()
    }

    /// The sequence of the last event that was not for a denied sequence.
    pub fn last_updated_sequence(&self) -> Option<SequenceId> {
        self.last_sequence
    }

    /// The last event seen for `sequence`.
    pub fn last_event(&self, sequence: SequenceId) -> Option<&Event> {
        self.point_data(sequence).map(|data| &data.event)
    }

    /// Position of `sequence` at its last event.
    pub fn point(&self, sequence: SequenceId) -> Option<Point> {
        self.point_data(sequence).map(PointData::position)
    }

    pub fn point_data(&self, sequence: SequenceId) -> Option<&PointData> {
        self.points
            .iter()
            .find(|(seq, _)| *seq == sequence)
            .map(|(_, data)| data)
    }

    /// Rectangle enclosing every active point.
    pub fn bounding_box(&self) -> Option<Rect> {
        Rect::enclosing(
            self.points
                .iter()
                .filter(|(_, data)| data.is_active())
                .map(|(_, data)| data.position()),
        )
    }

    pub fn bounding_box_center(&self) -> Option<Point> {
        self.bounding_box().map(Rect::center)
    }

    /// Whether the press of `sequence` was consumed by an early claim.
    pub fn handled_sequence_press(&self, sequence: SequenceId) -> bool {
        self.point_data(sequence).is_some_and(|data| data.press_handled)
    }

    pub fn n_active_points(&self) -> usize {
        self.points.iter().filter(|(_, data)| data.is_active()).count()
    }

    pub fn n_current_points(&self) -> usize {
        self.points.len()
    }

    /// Exactly `n_points` sequences are tracked and all of them are active.
    pub fn has_matching_points(&self) -> bool {
        self.n_active_points() == self.n_points && self.n_current_points() == self.n_points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    // -----------------------------------------------------------------------
    // Mutation (dispatcher only)
    // -----------------------------------------------------------------------

    pub(crate) fn set_phase(&mut self, phase: PropagationPhase) {
        self.phase = phase;
    }

    pub(crate) fn set_last_sequence(&mut self, sequence: SequenceId) {
        self.last_sequence = Some(sequence);
    }

    /// Store `event` for its sequence. Returns `true` if the sequence was
    /// not tracked before.
    pub(crate) fn insert_point(&mut self, event: &Event) -> bool {
        match self.point_data_mut(event.sequence) {
            Some(data) => {
                data.event = event.clone();
                false
            }
            None => {
                self.points.push((event.sequence, PointData::new(event.clone())));
                true
            }
        }
    }

    /// Refresh the event of a tracked sequence. `false` if untracked.
    pub(crate) fn update_point(&mut self, event: &Event) -> bool {
        match self.point_data_mut(event.sequence) {
            Some(data) => {
                data.event = event.clone();
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove_point(&mut self, sequence: SequenceId) -> bool {
        let before = self.points.len();
        self.points.retain(|(seq, _)| *seq != sequence);
        self.points.len() != before
    }

    /// Apply a state transition. `false` if untracked or not allowed.
    pub(crate) fn set_point_state(&mut self, sequence: SequenceId, state: SequenceState) -> bool {
        match self.point_data_mut(sequence) {
            Some(data) if data.state.can_become(state) => {
                data.state = state;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn set_press_handled(&mut self, sequence: SequenceId) {
        if let Some(data) = self.point_data_mut(sequence) {
            data.press_handled = true;
        }
    }

    /// Returns `true` if the flag changed.
    pub(crate) fn set_recognized(&mut self, recognized: bool) -> bool {
        let changed = self.recognized != recognized;
        self.recognized = recognized;
        changed
    }

    fn point_data_mut(&mut self, sequence: SequenceId) -> Option<&mut PointData> {
        self.points
            .iter_mut()
            .find(|(seq, _)| *seq == sequence)
            .map(|(_, data)| data)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn widget() -> WidgetId {
        WidgetId::from(KeyData::from_ffi(1))
    }

    fn touch(id: u32, x: f64, y: f64) -> Event {
        Event::touch_begin(widget(), SequenceId::touch(id), x, y)
    }

    #[test]
    fn insertion_order_is_kept() {
        let mut core = GestureCore::new(widget(), 2);
        assert!(core.insert_point(&touch(2, 0.0, 0.0)));
        assert!(core.insert_point(&touch(1, 0.0, 0.0)));
        assert!(!core.insert_point(&touch(2, 5.0, 5.0)));
        assert_eq!(core.sequences(), vec![SequenceId::touch(2), SequenceId::touch(1)]);
        assert_eq!(core.point(SequenceId::touch(2)), Some(Point::new(5.0, 5.0)));
    }

    #[test]
    fn matching_points() {
        let mut core = GestureCore::new(widget(), 2);
        core.insert_point(&touch(1, 0.0, 0.0));
        assert!(!core.has_matching_points());
        core.insert_point(&touch(2, 0.0, 0.0));
        assert!(core.has_matching_points());
        core.insert_point(&touch(3, 0.0, 0.0));
        core.set_point_state(SequenceId::touch(3), SequenceState::Denied);
        // Denied points still count as current.
        assert_eq!(core.n_active_points(), 2);
        assert!(!core.has_matching_points());
    }

    #[test]
    fn released_points_are_inactive() {
        let mut core = GestureCore::new(widget(), 1);
        let seq = SequenceId::touch(1);
        core.insert_point(&touch(1, 0.0, 0.0));
        assert!(core.is_active());
        core.update_point(&Event::touch_end(widget(), seq, 0.0, 0.0));
        assert!(!core.is_active());
        assert!(core.handles_sequence(seq));
        assert!(core.sequences().is_empty());
    }

    #[test]
    fn state_rules() {
        let mut core = GestureCore::new(widget(), 1);
        let seq = SequenceId::touch(1);
        assert!(!core.set_point_state(seq, SequenceState::Claimed), "untracked");
        core.insert_point(&touch(1, 0.0, 0.0));
        assert!(core.set_point_state(seq, SequenceState::Claimed));
        assert!(!core.set_point_state(seq, SequenceState::None));
        assert!(core.set_point_state(seq, SequenceState::Denied));
        assert!(!core.set_point_state(seq, SequenceState::Claimed));
        assert!(!core.handles_sequence(seq));
        assert_eq!(core.sequence_state(seq), SequenceState::Denied);
        assert_eq!(core.sequence_state(SequenceId::touch(9)), SequenceState::None);
    }

    #[test]
    fn bounding_box_over_active_points() {
        let mut core = GestureCore::new(widget(), 3);
        core.insert_point(&touch(1, 10.0, 10.0));
        core.insert_point(&touch(2, 30.0, 20.0));
        core.insert_point(&touch(3, 100.0, 100.0));
        core.set_point_state(SequenceId::touch(3), SequenceState::Denied);
        assert_eq!(core.bounding_box(), Some(Rect::new(10.0, 10.0, 20.0, 10.0)));
        assert_eq!(core.bounding_box_center(), Some(Point::new(20.0, 15.0)));
    }

    #[test]
    fn remove_and_press_handled() {
        let mut core = GestureCore::new(widget(), 1);
        let seq = SequenceId::touch(1);
        core.insert_point(&touch(1, 0.0, 0.0));
        core.set_press_handled(seq);
        assert!(core.handled_sequence_press(seq));
        assert!(core.remove_point(seq));
        assert!(!core.remove_point(seq));
        assert!(!core.handled_sequence_press(seq));
        assert!(core.is_empty());
    }

    #[test]
    #[should_panic(expected = "at least one point")]
    fn zero_points_panics() {
        GestureCore::new(widget(), 0);
    }
}
