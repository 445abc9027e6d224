//! Input grabs.
//!
//! The innermost grab limits event delivery to its subtree. Adding a grab
//! resets every recognizer that just lost the ability to receive events.

use tracing::debug;

use crate::dom::{WidgetId, WidgetTree};

use super::engine::Dispatcher;

impl<T: WidgetTree + 'static> Dispatcher<T> {
    /// Push a grab on `widget`.
    ///
    /// Recognizers of widgets that were reachable before and are outside
    /// `widget` now are reset, children before parents.
    pub fn grab_add(&mut self, widget: WidgetId) {
        if !self.tree.contains(widget) {
            return;
        }
        let previous = self.grabs.last().copied();
        self.grabs.push(widget);
        debug!(message = "dispatch.grab_add", ?widget, ?previous);

        for w in self.tree.post_order() {
            let was_reachable = previous.map_or(true, |grab| self.tree.is_inside(w, grab));
            if was_reachable && !self.tree.is_inside(w, widget) {
                for gesture in self.gestures(w) {
                    self.reset(gesture);
                }
            }
        }
    }

    /// Drop the innermost grab on `widget`. Recognizers are not touched.
    pub fn grab_remove(&mut self, widget: WidgetId) -> bool {
        match self.grabs.iter().rposition(|&w| w == widget) {
            Some(index) => {
                self.grabs.remove(index);
                debug!(message = "dispatch.grab_remove", ?widget);
                true
            }
            None => false,
        }
    }

    /// The innermost grab.
    pub fn current_grab(&self) -> Option<WidgetId> {
        self.grabs.last().copied()
    }

    pub fn has_grab(&self, widget: WidgetId) -> bool {
        self.grabs.contains(&widget)
    }
}
