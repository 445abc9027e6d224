//! Event propagation: capture, target, legacy handlers and bubble.
//!
//! ```text
//!   A  capture ──┐             ┌── legacy A, bubble A
//!   B  capture ──┤             ├── legacy B, bubble B
//!   C  capture ──┴── target C ─┴── legacy C, bubble C
//! ```
//!
//! Recognizers of one widget run in reverse registration order and all of
//! them see the event; propagation stops after the first widget where one of
//! them reports the event as handled.

use tracing::{debug, trace};

use crate::dom::{WidgetId, WidgetTree};
use crate::event::Event;
use crate::gesture::{PropagationPhase, SequenceState};

use super::engine::Dispatcher;

impl<T: WidgetTree + 'static> Dispatcher<T> {
    /// Route one input event through the tree. Returns whether some
    /// recognizer or legacy handler consumed it.
    ///
    /// Pending timeouts up to the event's timestamp fire first. While a grab
    /// is active, events for widgets outside of it are delivered to the grab
    /// widget, and events inside it do not reach the grab widget's ancestors.
    pub fn dispatch_event(&mut self, event: &Event) -> bool {
        self.expire_timeouts(event.time);
        if !self.tree.contains(event.target) {
            debug!(message = "dispatch.stale_target", target = ?event.target);
            return false;
        }

        let (event, topmost) = match self.grabs.last().copied() {
            Some(grab) if self.tree.is_inside(event.target, grab) => (event.clone(), Some(grab)),
            Some(grab) => (event.retargeted(grab), Some(grab)),
            None => (event.clone(), None),
        };
        debug!(
            message = "dispatch.event",
            kind = ?event.kind,
            target = ?event.target,
            sequence = %event.sequence,
            ?topmost,
        );
        self.propagate(&event, topmost)
    }

    /// Propagate along the path from `event.target` up to `topmost`
    /// (the toplevel when `None`).
    pub(crate) fn propagate(&mut self, event: &Event, topmost: Option<WidgetId>) -> bool {
        let mut path = self.tree.path_to_root(event.target);
        if let Some(top) = topmost {
            if let Some(index) = path.iter().position(|&w| w == top) {
                path.truncate(index + 1);
            }
        }

        for &widget in path.iter().rev() {
            if !self.tree.contains(widget) {
                continue;
            }
            if !self.tree.is_sensitive(widget) || !self.tree.is_visible(widget) {
                trace!(message = "dispatch.absorbed", ?widget);
                return true;
            }
            if self.run_phase(widget, PropagationPhase::Capture, event) {
                return true;
            }
        }

        for (depth, &widget) in path.iter().enumerate() {
            if !self.tree.contains(widget) {
                continue;
            }
            if depth == 0 && self.run_phase(widget, PropagationPhase::Target, event) {
                return true;
            }
            if self.run_legacy(widget, event) {
                return true;
            }
            if self.run_phase(widget, PropagationPhase::Bubble, event) {
                return true;
            }
        }
        false
    }

    fn run_phase(&mut self, widget: WidgetId, phase: PropagationPhase, event: &Event) -> bool {
        let mut handled = false;
        for gesture in self.gestures(widget).into_iter().rev() {
            // Earlier handlers may have removed or moved it.
            let Some(core) = self.gesture(gesture) else {
                continue;
            };
            if core.widget() != widget || core.phase() != phase {
                continue;
            }
            if core.sequence_state(event.sequence) == SequenceState::Denied {
                if event.kind.is_terminal() {
                    self.drop_denied_point(gesture, event);
                }
                continue;
            }
            trace!(message = "dispatch.deliver", ?gesture, ?widget, %phase);
            handled |= self.handle_gesture_event(gesture, event);
        }
        handled
    }

    fn run_legacy(&mut self, widget: WidgetId, event: &Event) -> bool {
        for id in self.legacy.ids_for(widget) {
            let Some(mut handler) = self.legacy.take(id) else {
                continue;
            };
            let result = handler(self, widget, event);
            self.legacy.restore(id, handler);
            if result.is_stop() {
                return true;
            }
        }
        false
    }
}

// ===========================================================================
// Tests
// ===========================================================================
