//! Input event types: pointer and touch events anchored at a target widget.
//!
//! Defines [`Event`], [`EventKind`], [`SequenceId`] and supporting types. The
//! platform event source builds these and hands them to
//! [`Dispatcher::dispatch_event`](crate::dispatch::Dispatcher::dispatch_event).

use std::fmt;

use bitflags::bitflags;

use crate::dom::WidgetId;

// ---------------------------------------------------------------------------
// SequenceId
// ---------------------------------------------------------------------------

/// Identifies one physical contact for its lifetime.
///
/// The mouse has a single implicit sequence, [`SequenceId::POINTER`]. Each
/// touch point gets a nonzero id that is unique among live touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceId(u32);

impl SequenceId {
    /// The implicit pointer sequence.
    pub const POINTER: SequenceId = SequenceId(0);

    /// A touch sequence.
    ///
    /// # Panics
    ///
    /// Panics if `id` is zero, which is reserved for the pointer.
    pub fn touch(id: u32) -> Self {
        assert!(id != 0, "touch sequence ids start at 1");
        SequenceId(id)
    }

    /// Whether this is the implicit pointer sequence.
    pub fn is_pointer(self) -> bool {
        self.0 == 0
    }

    /// The raw id (0 for the pointer).
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_pointer() {
            f.write_str("pointer")
        } else {
            write!(f, "{:x}", self.0)
        }
    }
}

// ---------------------------------------------------------------------------
// ModifierState
// ---------------------------------------------------------------------------

bitflags! {
    /// Keyboard modifiers and held pointer buttons at the time of an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierState: u32 {
        const SHIFT = 1 << 0;
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        const ALT = 1 << 3;
        const BUTTON1 = 1 << 8;
        const BUTTON2 = 1 << 9;
        const BUTTON3 = 1 << 10;
        const BUTTON4 = 1 << 11;
        const BUTTON5 = 1 << 12;
        /// Buttons that keep a pointer sequence alive during motion.
        const BUTTONS = Self::BUTTON1.bits() | Self::BUTTON2.bits() | Self::BUTTON3.bits();
    }
}

impl ModifierState {
    /// The mask bit for pointer button `button` (1-5). Empty for other values.
    pub fn button_mask(button: u32) -> ModifierState {
        match button {
            1..=5 => ModifierState::from_bits_truncate(ModifierState::BUTTON1.bits() << (button - 1)),
            _ => ModifierState::empty(),
        }
    }

    /// The lowest held button among 1-3, if any.
    pub fn first_button(self) -> Option<u32> {
        (1..=3).find(|&b| self.contains(ModifierState::button_mask(b)))
    }
}

// ---------------------------------------------------------------------------
// InputSource / EventKind
// ---------------------------------------------------------------------------

/// Device class an event originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Mouse,
    Pen,
    Touchscreen,
}

/// Kind of input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ButtonPress,
    ButtonRelease,
    Motion,
    TouchBegin,
    TouchUpdate,
    TouchEnd,
    TouchCancel,
}

impl EventKind {
    /// Press or touch begin: starts a sequence.
    pub fn begins_sequence(self) -> bool {
        matches!(self, EventKind::ButtonPress | EventKind::TouchBegin)
    }

    /// Release or touch end: finishes a sequence normally.
    pub fn ends_sequence(self) -> bool {
        matches!(self, EventKind::ButtonRelease | EventKind::TouchEnd)
    }

    /// Motion or touch update.
    pub fn updates_sequence(self) -> bool {
        matches!(self, EventKind::Motion | EventKind::TouchUpdate)
    }

    /// Whether this kind belongs to a touch sequence.
    pub fn is_touch(self) -> bool {
        matches!(
            self,
            EventKind::TouchBegin
                | EventKind::TouchUpdate
                | EventKind::TouchEnd
                | EventKind::TouchCancel
        )
    }

    /// Whether no further events follow for the sequence.
    pub fn is_terminal(self) -> bool {
        self.ends_sequence() || self == EventKind::TouchCancel
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// One physical input event, anchored at the widget it was targeted to.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    /// The widget the platform resolved the event to.
    pub target: WidgetId,
    pub x: f64,
    pub y: f64,
    /// Timestamp in milliseconds.
    pub time: u32,
    /// Pointer button for press/release, 0 otherwise.
    pub button: u32,
    pub state: ModifierState,
    pub sequence: SequenceId,
    /// Touch events that also drive the pointer.
    pub emulating_pointer: bool,
    pub source: InputSource,
}

impl Event {
    fn pointer(kind: EventKind, target: WidgetId, x: f64, y: f64) -> Self {
        Self {
            kind,
            target,
            x,
            y,
            time: 0,
            button: 0,
            state: ModifierState::empty(),
            sequence: SequenceId::POINTER,
            emulating_pointer: false,
            source: InputSource::Mouse,
        }
    }

    fn touch(kind: EventKind, target: WidgetId, sequence: SequenceId, x: f64, y: f64) -> Self {
        Self {
            sequence,
            source: InputSource::Touchscreen,
            ..Self::pointer(kind, target, x, y)
        }
    }

    /// A button press.
    pub fn button_press(target: WidgetId, button: u32, x: f64, y: f64) -> Self {
        Self {
            button,
            ..Self::pointer(EventKind::ButtonPress, target, x, y)
        }
    }

    /// A button release.
    pub fn button_release(target: WidgetId, button: u32, x: f64, y: f64) -> Self {
        Self {
            button,
            ..Self::pointer(EventKind::ButtonRelease, target, x, y)
        }
    }

    /// Pointer motion. `state` carries the held buttons.
    pub fn motion(target: WidgetId, x: f64, y: f64, state: ModifierState) -> Self {
        Self {
            state,
            ..Self::pointer(EventKind::Motion, target, x, y)
        }
    }

    /// A touch point going down.
    pub fn touch_begin(target: WidgetId, sequence: SequenceId, x: f64, y: f64) -> Self {
        Self::touch(EventKind::TouchBegin, target, sequence, x, y)
    }

    /// A touch point moving.
    pub fn touch_update(target: WidgetId, sequence: SequenceId, x: f64, y: f64) -> Self {
        Self::touch(EventKind::TouchUpdate, target, sequence, x, y)
    }

    /// A touch point lifting.
    pub fn touch_end(target: WidgetId, sequence: SequenceId, x: f64, y: f64) -> Self {
        Self::touch(EventKind::TouchEnd, target, sequence, x, y)
    }

    /// A touch point taken away by the system.
    pub fn touch_cancel(target: WidgetId, sequence: SequenceId, x: f64, y: f64) -> Self {
        Self::touch(EventKind::TouchCancel, target, sequence, x, y)
    }

    /// Set the timestamp (builder).
    pub fn with_time(mut self, time: u32) -> Self {
        self.time = time;
        self
    }

    /// Set the modifier/button state (builder).
    pub fn with_state(mut self, state: ModifierState) -> Self {
        self.state = state;
        self
    }

    /// Set the input source (builder).
    pub fn with_source(mut self, source: InputSource) -> Self {
        self.source = source;
        self
    }

    /// Mark a touch event as driving the pointer (builder).
    pub fn emulating_pointer(mut self, emulating: bool) -> Self {
        self.emulating_pointer = emulating;
        self
    }

    /// Copy of this event aimed at another widget.
    pub fn retargeted(&self, target: WidgetId) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }

    /// A press synthesized from this event, used when a press must be
    /// replayed to widgets that did not see it. `None` for kinds that have
    /// no press counterpart.
    pub fn as_press(&self) -> Option<Event> {
        let mut press = self.clone();
        match self.kind {
            EventKind::TouchBegin | EventKind::TouchUpdate | EventKind::TouchEnd => {
                press.kind = EventKind::TouchBegin;
            }
            EventKind::ButtonPress | EventKind::ButtonRelease => {
                press.kind = EventKind::ButtonPress;
            }
            EventKind::Motion => {
                press.kind = EventKind::ButtonPress;
                press.button = self.state.first_button()?;
                press.state -= ModifierState::button_mask(press.button);
            }
            EventKind::TouchCancel => return None,
        }
        Some(press)
    }
}
