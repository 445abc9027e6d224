//! Pilot: programmatic input for a headless [`Dispatcher`].
//!
//! The `Pilot` owns a dispatcher over a [`Dom`] and simulates a mouse and up
//! to ten touch points, each remembering where it went down and what it
//! holds. Recognizers added through it log their signals to a shared
//! [`Trace`], so whole interactions can be asserted as one string.

use std::fmt::Write as _;

use crate::dispatch::Dispatcher;
use crate::dom::{Dom, WidgetId, WidgetTree};
use crate::event::{Event, EventKind, ModifierState, Propagation, SequenceId};
use crate::gesture::{GestureCore, GestureId, MultiPress, PropagationPhase, Rotate, SequenceState};

use super::trace::Trace;

/// Number of simulated touch points.
pub const MAX_TOUCHES: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
struct PointState {
    widget: Option<WidgetId>,
    x: f64,
    y: f64,
    state: ModifierState,
}

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless input driver for testing.
///
/// Touch point `i` uses sequence `i + 1`. Touch point 0 also drives the
/// pointer, so use it first.
///
/// # Examples
///
/// ```
/// use ctk_core::dom::{Dom, WidgetData};
/// use ctk_core::gesture::{PropagationPhase, SequenceState};
/// use ctk_core::testing::Pilot;
///
/// let mut dom = Dom::new();
/// let window = dom.insert(WidgetData::new("window").with_name("A"));
///
/// let mut pilot = Pilot::new(dom);
/// pilot.add_gesture(window, "a1", PropagationPhase::Bubble, SequenceState::None);
/// pilot.mouse_move(window, 10.0, 10.0);
/// pilot.mouse_press(window, 1);
/// assert_eq!(pilot.take_trace(), "bubble a1");
/// ```
pub struct Pilot {
    dispatcher: Dispatcher,
    trace: Trace,
    mouse: PointState,
    touches: [PointState; MAX_TOUCHES],
    time: u32,
}

impl Pilot {
    /// Drive a dispatcher over `dom`.
    pub fn new(dom: Dom) -> Self {
        Self::with_dispatcher(Dispatcher::new(dom))
    }

    /// Drive an already configured dispatcher.
    pub fn with_dispatcher(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            trace: Trace::new(),
            mouse: PointState::default(),
            touches: [PointState::default(); MAX_TOUCHES],
            time: 0,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Return the trace so far and start a new one.
    pub fn take_trace(&self) -> String {
        self.trace.take()
    }

    /// First widget named `name`, in post-order.
    pub fn widget(&self, name: &str) -> Option<WidgetId> {
        let tree = self.dispatcher.tree();
        tree.post_order()
            .into_iter()
            .find(|&w| tree.name(w) == Some(name))
    }

    // ── Recognizers ──────────────────────────────────────────────────

    /// Attach a button-1 [`MultiPress`] logging as `name`.
    ///
    /// Logs `"{phase} {name}"` on press (plus the touch sequence),
    /// `"{name} cancelled"`, `"{name} updated"` and `"{name} state {state}"`.
    /// When `state` is not `None`, the press handler sets it on every
    /// sequence.
    pub fn add_gesture(
        &mut self,
        widget: WidgetId,
        name: &str,
        phase: PropagationPhase,
        state: SequenceState,
    ) -> GestureId {
        let gesture = self.dispatcher.create_gesture(widget, phase, MultiPress::new());

        let (trace, label) = (self.trace.clone(), name.to_owned());
        self.dispatcher.connect_pressed(gesture, move |d, g, _, _, _| {
            let Some(core) = d.gesture(g) else {
                return;
            };
            let mut entry = format!("{} {label}", core.phase());
            push_sequence(&mut entry, core.last_updated_sequence());
            trace.push(entry);
            if state != SequenceState::None {
                d.set_state(g, state);
            }
        });
        self.log_common(gesture, name);
        gesture
    }

    /// Attach a [`Rotate`] logging as `name`.
    ///
    /// Logs `"{name} began"`, `"{name} updated"`, `"{name} ended"` and state
    /// changes. When `state` is not `None`, the begin handler sets it.
    pub fn add_mt_gesture(
        &mut self,
        widget: WidgetId,
        name: &str,
        phase: PropagationPhase,
        state: SequenceState,
    ) -> GestureId {
        let gesture = self.dispatcher.create_gesture(widget, phase, Rotate::new());

        let (trace, label) = (self.trace.clone(), name.to_owned());
        self.dispatcher.connect_begin(gesture, move |d, g, _| {
            trace.push(format!("{label} began"));
            if state != SequenceState::None {
                d.set_state(g, state);
            }
        });
        let (trace, label) = (self.trace.clone(), name.to_owned());
        self.dispatcher
            .connect_end(gesture, move |_, _, _| trace.push(format!("{label} ended")));
        self.log_common(gesture, name);
        gesture
    }

    /// Connect a legacy handler on `widget` that logs `"legacy {name}"` for
    /// button presses and answers `exit`.
    pub fn add_legacy(&mut self, widget: WidgetId, exit: Propagation) {
        let trace = self.trace.clone();
        self.dispatcher.connect_event(widget, move |d, w, event| {
            if event.kind != EventKind::ButtonPress {
                return Propagation::Proceed;
            }
            trace.push(format!("legacy {}", d.tree().name(w).unwrap_or_default()));
            exit
        });
    }

    fn log_common(&mut self, gesture: GestureId, name: &str) {
        let (trace, label) = (self.trace.clone(), name.to_owned());
        self.dispatcher
            .connect_cancel(gesture, move |_, _, _| trace.push(format!("{label} cancelled")));

        let (trace, label) = (self.trace.clone(), name.to_owned());
        self.dispatcher
            .connect_update(gesture, move |_, _, _| trace.push(format!("{label} updated")));

        let (trace, label) = (self.trace.clone(), name.to_owned());
        self.dispatcher
            .connect_sequence_state_changed(gesture, move |_, _, sequence, state| {
                let mut entry = format!("{label} state {state}");
                push_sequence(&mut entry, Some(sequence));
                trace.push(entry);
            });
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Move the mouse over `widget`, reporting the buttons it holds.
    pub fn mouse_move(&mut self, widget: WidgetId, x: f64, y: f64) -> bool {
        self.mouse.x = x;
        self.mouse.y = y;
        let event = Event::motion(widget, x, y, self.mouse.state);
        self.send(event)
    }

    /// Press `button` over `widget` at the current mouse position.
    pub fn mouse_press(&mut self, widget: WidgetId, button: u32) -> bool {
        let event = Event::button_press(widget, button, self.mouse.x, self.mouse.y)
            .with_state(self.mouse.state);
        self.mouse.state |= ModifierState::button_mask(button);
        self.mouse.widget = Some(widget);
        self.send(event)
    }

    /// Release `button` on the widget it was pressed on. Nothing happens if
    /// the button is not held.
    pub fn mouse_release(&mut self, button: u32) -> bool {
        let mask = ModifierState::button_mask(button);
        let Some(widget) = self.mouse.widget else {
            return false;
        };
        if !self.mouse.state.contains(mask) {
            return false;
        }
        let event = Event::button_release(widget, button, self.mouse.x, self.mouse.y)
            .with_state(self.mouse.state);
        self.mouse.state -= mask;
        self.send(event)
    }

    /// Put touch point `index` down on `widget` at its current position.
    pub fn touch_press(&mut self, index: usize, widget: WidgetId) -> bool {
        let point = &mut self.touches[index];
        point.widget = Some(widget);
        let event = Event::touch_begin(widget, touch_sequence(index), point.x, point.y)
            .emulating_pointer(index == 0);
        self.send(event)
    }

    /// Position touch point `index`. Sends an update if it is down on
    /// `widget`.
    pub fn touch_move(&mut self, index: usize, widget: WidgetId, x: f64, y: f64) -> bool {
        let point = &mut self.touches[index];
        point.x = x;
        point.y = y;
        if point.widget != Some(widget) {
            return false;
        }
        let event = Event::touch_update(widget, touch_sequence(index), x, y)
            .emulating_pointer(index == 0);
        self.send(event)
    }

    /// Lift touch point `index`.
    pub fn touch_release(&mut self, index: usize) -> bool {
        let point = self.touches[index];
        let Some(widget) = point.widget else {
            return false;
        };
        let event = Event::touch_end(widget, touch_sequence(index), point.x, point.y)
            .emulating_pointer(index == 0);
        self.send(event)
    }

    /// Let `millis` pass before the next event.
    pub fn advance(&mut self, millis: u32) {
        self.time = self.time.saturating_add(millis);
        self.dispatcher.expire_timeouts(self.time);
    }

    fn send(&mut self, event: Event) -> bool {
        let event = event.with_time(self.time);
        self.dispatcher.dispatch_event(&event)
    }

    // ── Query ────────────────────────────────────────────────────────

    /// Point table of `gesture`.
    pub fn gesture(&self, gesture: GestureId) -> Option<&GestureCore> {
        self.dispatcher.gesture(gesture)
    }

    pub fn state(&self, gesture: GestureId, sequence: SequenceId) -> SequenceState {
        self.dispatcher.sequence_state(gesture, sequence)
    }
}

/// Sequence of touch point `index`.
pub fn touch_sequence(index: usize) -> SequenceId {
    SequenceId::touch(index as u32 + 1)
}

fn push_sequence(entry: &mut String, sequence: Option<SequenceId>) {
    if let Some(sequence) = sequence.filter(|s| !s.is_pointer()) {
        let _ = write!(entry, " ({sequence})");
    }
}

// ============================================================================
// Tests
// ============================================================================
