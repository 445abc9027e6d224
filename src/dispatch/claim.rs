//! Sequence claiming: per-recognizer state changes, the widget-level
//! reaction to them, and recognizer groups.
//!
//! When a recognizer changes the state of a sequence, the other recognizers
//! of the same widget follow:
//!
//! - group members mirror the new state,
//! - on a claim, every other recognizer that had claimed the sequence is
//!   denied,
//! - a claim cancels the sequence for every widget between the event target
//!   and the claiming widget, and denies it for claiming ancestors,
//! - a denial of a press that was consumed in the capture phase replays the
//!   press to the widgets beneath.

use tracing::debug;

use crate::dom::{WidgetId, WidgetTree};
use crate::event::{Event, SequenceId};
use crate::gesture::{GestureCore, GestureId, GestureSignal, PropagationPhase, SequenceState};

use super::engine::Dispatcher;

impl<T: WidgetTree + 'static> Dispatcher<T> {
    // -----------------------------------------------------------------------
    // State changes
    // -----------------------------------------------------------------------

    /// Change the state of `sequence` for `gesture`.
    ///
    /// Returns `false` if the sequence is not tracked or the transition is
    /// not allowed: denied sequences stay denied and nothing returns to
    /// [`SequenceState::None`].
    pub fn set_sequence_state(
        &mut self,
        gesture: GestureId,
        sequence: SequenceId,
        state: SequenceState,
    ) -> bool {
        let changed = self
            .gestures
            .get_mut(gesture)
            .is_some_and(|entry| entry.core.set_point_state(sequence, state));
        if !changed {
            return false;
        }
        debug!(message = "gesture.sequence_state", ?gesture, %sequence, %state);
        self.emit(gesture, GestureSignal::SequenceStateChanged(sequence, state));
        if state == SequenceState::Denied {
            self.check_recognized(gesture, sequence);
        }
        true
    }

    /// Apply `state` to every sequence `gesture` tracks, in the order they
    /// were first seen. Returns whether any sequence changed.
    pub fn set_state(&mut self, gesture: GestureId, state: SequenceState) -> bool {
        let sequences = self
            .gesture(gesture)
            .map(GestureCore::tracked_sequences)
            .unwrap_or_default();
        let mut changed = false;
        for sequence in sequences {
            changed |= self.set_sequence_state(gesture, sequence, state);
        }
        changed
    }

    /// Widget-level reaction, run before the connected handlers see the
    /// change.
    pub(crate) fn sequence_state_changed(
        &mut self,
        emitter: GestureId,
        sequence: SequenceId,
        state: SequenceState,
    ) {
        let Some(entry) = self.gestures.get(emitter) else {
            return;
        };
        if entry.reaction_blocked > 0 {
            return;
        }
        let widget = entry.core.widget();
        let last_event = entry.core.last_event(sequence).cloned();
        let mut press_handled = entry.core.handled_sequence_press(sequence);
        let members = self.group_members(emitter);

        for other in self.gestures(widget).into_iter().rev() {
            if other == emitter {
                continue;
            }
            let next = if members.contains(&other) {
                state
            } else if state == SequenceState::Claimed
                && self.sequence_state(other, sequence) == SequenceState::Claimed
            {
                SequenceState::Denied
            } else {
                continue;
            };
            let changed = self.with_reaction_blocked(other, |d| d.set_sequence_state(other, sequence, next));
            if changed {
                press_handled |= self
                    .gesture(other)
                    .is_some_and(|core| core.handled_sequence_press(sequence));
            }
        }

        let Some(event) = last_event else {
            return;
        };
        match state {
            SequenceState::Denied if press_handled => {
                if !self.press_still_consumed(widget, sequence) {
                    self.replay_press(widget, &event);
                }
            }
            SequenceState::Claimed => self.cancel_on_hierarchy(widget, sequence, &event),
            _ => {}
        }
    }

    fn with_reaction_blocked<R>(&mut self, gesture: GestureId, f: impl FnOnce(&mut Self) -> R) -> R {
        if let Some(entry) = self.gestures.get_mut(gesture) {
            entry.reaction_blocked += 1;
        }
        let result = f(self);
        if let Some(entry) = self.gestures.get_mut(gesture) {
            entry.reaction_blocked = entry.reaction_blocked.saturating_sub(1);
        }
        result
    }

    /// Some capture-phase recognizer of `widget` still holds a consumed
    /// press for `sequence`.
    fn press_still_consumed(&self, widget: WidgetId, sequence: SequenceId) -> bool {
        self.gestures_in_phase(widget, PropagationPhase::Capture)
            .into_iter()
            .filter_map(|g| self.gesture(g))
            .any(|core| core.handles_sequence(sequence) && core.handled_sequence_press(sequence))
    }

    /// Deliver the press of `event`'s sequence to the widgets below `widget`.
    fn replay_press(&mut self, widget: WidgetId, event: &Event) {
        let Some(press) = event.as_press() else {
            return;
        };
        if press.target == widget || !self.tree.is_inside(press.target, widget) {
            return;
        }
        let path = self.tree.path_to_root(press.target);
        let Some(index) = path.iter().position(|&w| w == widget) else {
            return;
        };
        let Some(&topmost) = index.checked_sub(1).and_then(|i| path.get(i)) else {
            return;
        };
        debug!(message = "dispatch.replay_press", ?widget, ?topmost, sequence = %press.sequence);
        self.propagate(&press, Some(topmost));
    }

    /// `widget` claimed `sequence`: cancel it below, deny it above.
    fn cancel_on_hierarchy(&mut self, widget: WidgetId, sequence: SequenceId, event: &Event) {
        for w in self.tree.path_to_root(event.target) {
            if w == widget {
                continue;
            }
            if self.tree.is_inside(w, widget) {
                for g in self.gestures(w).into_iter().rev() {
                    if self.gesture(g).is_some_and(|core| core.handles_sequence(sequence)) {
                        self.cancel_sequence(g, sequence);
                    }
                }
            } else {
                for g in self.gestures(w) {
                    if self.sequence_state(g, sequence) == SequenceState::Claimed {
                        self.with_reaction_blocked(g, |d| {
                            d.set_sequence_state(g, sequence, SequenceState::Denied)
                        });
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Groups
    // -----------------------------------------------------------------------

    /// Put `gesture` in the group of `with`, right after it. A gesture
    /// belongs to one group at a time.
    ///
    /// # Panics
    ///
    /// Panics if the two recognizers are attached to different widgets.
    pub fn group(&mut self, gesture: GestureId, with: GestureId) {
        let (Some(a), Some(b)) = (self.gesture(gesture), self.gesture(with)) else {
            return;
        };
        assert!(
            a.widget() == b.widget(),
            "grouped gestures must share a widget"
        );
        if gesture == with || self.is_grouped_with(gesture, with) {
            return;
        }
        self.ungroup(gesture);

        let group = match self.gestures.get(with).and_then(|e| e.group) {
            Some(group) => group,
            None => {
                let group = self.groups.insert(vec![with]);
                if let Some(entry) = self.gestures.get_mut(with) {
                    entry.group = Some(group);
                }
                group
            }
        };
        if let Some(members) = self.groups.get_mut(group) {
            let at = members.iter().position(|&g| g == with).map_or(members.len(), |i| i + 1);
            members.insert(at, gesture);
        }
        if let Some(entry) = self.gestures.get_mut(gesture) {
            entry.group = Some(group);
        }
        debug!(message = "gesture.group", ?gesture, ?with, ?group);
    }

    /// Take `gesture` out of its group. A group left with one member is
    /// dissolved.
    pub fn ungroup(&mut self, gesture: GestureId) {
        let Some(group) = self.gestures.get_mut(gesture).and_then(|e| e.group.take()) else {
            return;
        };
        let Some(members) = self.groups.get_mut(group) else {
            return;
        };
        members.retain(|&g| g != gesture);
        if members.len() <= 1 {
            if let Some(rest) = self.groups.remove(group) {
                for g in rest {
                    if let Some(entry) = self.gestures.get_mut(g) {
                        entry.group = None;
                    }
                }
            }
        }
    }

    /// Members of the group of `gesture`, itself included.
    pub fn group_members(&self, gesture: GestureId) -> Vec<GestureId> {
        match self.gestures.get(gesture).and_then(|e| e.group) {
            Some(group) => self.groups.get(group).cloned().unwrap_or_default(),
            None if self.gestures.contains_key(gesture) => vec![gesture],
            None => Vec::new(),
        }
    }

    pub fn is_grouped_with(&self, gesture: GestureId, other: GestureId) -> bool {
        let group_of = |g: GestureId| self.gestures.get(g).and_then(|e| e.group);
        group_of(gesture).is_some() && group_of(gesture) == group_of(other)
    }

    /// State another group member holds for `sequence`, for a point the
    /// gesture starts tracking.
    pub(crate) fn group_state(&self, gesture: GestureId, sequence: SequenceId) -> SequenceState {
        self.group_members(gesture)
            .into_iter()
            .filter(|&g| g != gesture)
            .filter_map(|g| self.gesture(g))
            .find(|core| core.handles_sequence(sequence))
            .map_or(SequenceState::None, |core| core.sequence_state(sequence))
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Dom, WidgetData};
    use crate::gesture::MultiPress;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> (Dispatcher, WidgetId, WidgetId) {
        let mut dom = Dom::new();
        let a = dom.insert(WidgetData::new("window").with_name("A"));
        let b = dom.insert_child(a, WidgetData::new("box").with_name("B"));
        (Dispatcher::new(dom), a, b)
    }

    fn press(d: &mut Dispatcher, target: WidgetId) {
        d.dispatch_event(&Event::button_press(target, 1, 5.0, 5.0));
    }

    #[test]
    fn transitions_follow_state_rules() {
        let (mut d, _, b) = setup();
        let g = d.create_gesture(b, PropagationPhase::Bubble, MultiPress::new());
        let seq = SequenceId::POINTER;
        assert!(!d.set_sequence_state(g, seq, SequenceState::Claimed), "not tracked yet");

        press(&mut d, b);
        assert!(d.set_sequence_state(g, seq, SequenceState::Claimed));
        assert!(!d.set_sequence_state(g, seq, SequenceState::Claimed));
        assert!(!d.set_sequence_state(g, seq, SequenceState::None));
        assert!(d.set_sequence_state(g, seq, SequenceState::Denied));
        assert!(!d.set_sequence_state(g, seq, SequenceState::Claimed));
        assert_eq!(d.sequence_state(g, seq), SequenceState::Denied);
    }

    #[test]
    fn claim_denies_other_claimers_on_widget() {
        let (mut d, _, b) = setup();
        let first = d.create_gesture(b, PropagationPhase::Bubble, MultiPress::new());
        let second = d.create_gesture(b, PropagationPhase::Bubble, MultiPress::new());
        press(&mut d, b);
        let seq = SequenceId::POINTER;

        d.set_sequence_state(first, seq, SequenceState::Claimed);
        d.set_sequence_state(second, seq, SequenceState::Claimed);
        assert_eq!(d.sequence_state(first, seq), SequenceState::Denied);
        assert_eq!(d.sequence_state(second, seq), SequenceState::Claimed);
    }

    #[test]
    fn group_members_mirror_state() {
        let (mut d, _, b) = setup();
        let g1 = d.create_gesture(b, PropagationPhase::Bubble, MultiPress::new());
        let g2 = d.create_gesture(b, PropagationPhase::Bubble, MultiPress::new());
        d.group(g2, g1);
        press(&mut d, b);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        d.connect_sequence_state_changed(g2, move |_, _, _, state| log.borrow_mut().push(state));

        d.set_sequence_state(g1, SequenceId::POINTER, SequenceState::Claimed);
        assert_eq!(d.sequence_state(g2, SequenceId::POINTER), SequenceState::Claimed);
        assert_eq!(*seen.borrow(), vec![SequenceState::Claimed]);
    }

    #[test]
    fn claim_cancels_descendants() {
        let (mut d, a, b) = setup();
        let inner = d.create_gesture(b, PropagationPhase::Bubble, MultiPress::new());
        let outer = d.create_gesture(a, PropagationPhase::Bubble, MultiPress::new());
        press(&mut d, b);

        let cancelled = Rc::new(RefCell::new(0));
        let count = cancelled.clone();
        d.connect_cancel(inner, move |_, _, _| *count.borrow_mut() += 1);

        d.set_sequence_state(outer, SequenceId::POINTER, SequenceState::Claimed);
        assert_eq!(*cancelled.borrow(), 1);
        assert!(d.gesture(inner).is_some_and(GestureCore::is_empty));
    }

    #[test]
    fn claim_keeps_undecided_ancestors_tracking() {
        let (mut d, a, b) = setup();
        let outer = d.create_gesture(a, PropagationPhase::Capture, MultiPress::new());
        let inner = d.create_gesture(b, PropagationPhase::Bubble, MultiPress::new());
        press(&mut d, b);
        let seq = SequenceId::POINTER;

        d.set_sequence_state(inner, seq, SequenceState::Claimed);
        assert_eq!(d.sequence_state(outer, seq), SequenceState::None);
        assert!(d.gesture(outer).is_some_and(|core| core.handles_sequence(seq)));

        // A late claim from the capture phase still wins.
        d.set_sequence_state(outer, seq, SequenceState::Claimed);
        assert!(d.gesture(inner).is_some_and(GestureCore::is_empty));
    }

    #[test]
    fn grouping_rules() {
        let (mut d, _, b) = setup();
        let g1 = d.create_gesture(b, PropagationPhase::Bubble, MultiPress::new());
        let g2 = d.create_gesture(b, PropagationPhase::Bubble, MultiPress::new());
        let g3 = d.create_gesture(b, PropagationPhase::Bubble, MultiPress::new());
        assert_eq!(d.group_members(g1), vec![g1]);
        assert!(!d.is_grouped_with(g1, g1));

        d.group(g2, g1);
        d.group(g3, g1);
        assert_eq!(d.group_members(g2), vec![g1, g3, g2]);
        assert!(d.is_grouped_with(g3, g2));

        d.ungroup(g3);
        assert_eq!(d.group_members(g1), vec![g1, g2]);
        d.ungroup(g1);
        assert_eq!(d.group_members(g2), vec![g2]);
        assert!(!d.is_grouped_with(g1, g2));
    }

    #[test]
    #[should_panic(expected = "share a widget")]
    fn cross_widget_group_panics() {
        let (mut d, a, b) = setup();
        let g1 = d.create_gesture(b, PropagationPhase::Bubble, MultiPress::new());
        let g2 = d.create_gesture(a, PropagationPhase::Bubble, MultiPress::new());
        d.group(g2, g1);
    }
}
