//! Single-sequence filtering shared by button-driven gestures.
//!
//! A [`SingleFilter`] restricts a recognizer to one pointer button (or any
//! button with `0`), optionally to touch input only, and remembers which
//! sequence and button drive the current interaction.

use crate::config::Settings;
use crate::event::{Event, EventKind, InputSource, ModifierState, SequenceId};

use super::core::GestureCore;
use super::recognizer::EventFilter;

/// Button and device filter plus current sequence tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleFilter {
    button: u32,
    touch_only: bool,
    exclusive: bool,
    current_button: u32,
    current_sequence: Option<SequenceId>,
}

impl Default for SingleFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SingleFilter {
    /// Button 1, mouse and touch, not exclusive.
    pub fn new() -> Self {
        Self {
            button: 1,
            touch_only: false,
            exclusive: false,
            current_button: 0,
            current_sequence: None,
        }
    }

    /// Accept only `button`; `0` accepts any button (builder).
    pub fn with_button(mut self, button: u32) -> Self {
        self.button = button;
        self
    }

    /// Ignore pointer devices other than touchscreens (builder).
    pub fn with_touch_only(mut self, touch_only: bool) -> Self {
        self.touch_only = touch_only;
        self
    }

    /// Only accept touches that emulate the pointer (builder).
    pub fn with_exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    pub fn button(&self) -> u32 {
        self.button
    }

    pub fn set_button(&mut self, button: u32) {
        self.button = button;
    }

    pub fn touch_only(&self) -> bool {
        self.touch_only
    }

    pub fn set_touch_only(&mut self, touch_only: bool) {
        self.touch_only = touch_only;
    }

    pub fn exclusive(&self) -> bool {
        self.exclusive
    }

    pub fn set_exclusive(&mut self, exclusive: bool) {
        self.exclusive = exclusive;
    }

    /// Button driving the current interaction, `0` when idle.
    pub fn current_button(&self) -> u32 {
        self.current_button
    }

    /// Sequence driving the current interaction.
    pub fn current_sequence(&self) -> Option<SequenceId> {
        self.current_sequence
    }

    fn rejects_device(&self, event: &Event, settings: &Settings) -> bool {
        self.touch_only
            && !settings.simulate_touchscreen
            && event.source != InputSource::Touchscreen
    }

    /// Filter `event` and record the current sequence and button.
    pub fn filter(&mut self, core: &GestureCore, event: &Event, settings: &Settings) -> EventFilter {
        let button = match event.kind {
            EventKind::TouchBegin | EventKind::TouchUpdate | EventKind::TouchEnd => {
                if self.exclusive && !event.emulating_pointer {
                    return EventFilter::Ignore;
                }
                1
            }
            EventKind::ButtonPress | EventKind::ButtonRelease => {
                if self.rejects_device(event, settings) {
                    return EventFilter::Ignore;
                }
                event.button
            }
            EventKind::Motion => {
                if !core.handles_sequence(event.sequence) || self.rejects_device(event, settings) {
                    return EventFilter::Ignore;
                }
                let held = ModifierState::button_mask(self.current_button);
                if self.current_button > 0 && !held.is_empty() && event.state.contains(held) {
                    self.current_button
                } else if self.current_button == 0 {
                    event.state.first_button().unwrap_or(0)
                } else {
                    0
                }
            }
            EventKind::TouchCancel => return EventFilter::Accept,
        };

        if button == 0
            || (self.button != 0 && self.button != button)
            || (self.current_button != 0 && self.current_button != button)
        {
            return EventFilter::Reset;
        }

        if event.kind.begins_sequence() || event.kind.updates_sequence() {
            if !core.is_active() {
                self.current_sequence = Some(event.sequence);
            }
            self.current_button = button;
        }
        EventFilter::Accept
    }

    /// Bookkeeping once point tracking processed `event`.
    pub fn event_handled(&mut self, core: &GestureCore, event: &Event) {
        let current = self.current_sequence == Some(event.sequence);
        if current && event.kind.ends_sequence() {
            self.current_button = 0;
        } else if current && !core.handles_sequence(event.sequence) {
            match event.kind {
                EventKind::ButtonPress if event.button == self.current_button => {
                    self.current_button = 0;
                }
                EventKind::TouchBegin => self.current_sequence = None,
                _ => {}
            }
        }
    }

    /// `sequence` was cancelled.
    pub fn cancel(&mut self, sequence: SequenceId) {
        if self.current_sequence == Some(sequence) {
            self.current_button = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::WidgetId;
    use slotmap::KeyData;

    fn widget() -> WidgetId {
        WidgetId::from(KeyData::from_ffi(1))
    }

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    fn press_records_button_and_sequence() {
        let core = GestureCore::new(widget(), 1);
        let mut filter = SingleFilter::new();
        let press = Event::button_press(widget(), 1, 0.0, 0.0);
        assert_eq!(filter.filter(&core, &press, &settings()), EventFilter::Accept);
        assert_eq!(filter.current_button(), 1);
        assert_eq!(filter.current_sequence(), Some(SequenceId::POINTER));
    }

    #[test]
    fn wrong_button_resets() {
        let core = GestureCore::new(widget(), 1);
        let mut filter = SingleFilter::new();
        let press = Event::button_press(widget(), 3, 0.0, 0.0);
        assert_eq!(filter.filter(&core, &press, &settings()), EventFilter::Reset);
        assert_eq!(filter.current_button(), 0);
    }

    #[test]
    fn any_button() {
        let core = GestureCore::new(widget(), 1);
        let mut filter = SingleFilter::new().with_button(0);
        let press = Event::button_press(widget(), 3, 0.0, 0.0);
        assert_eq!(filter.filter(&core, &press, &settings()), EventFilter::Accept);
        assert_eq!(filter.current_button(), 3);
    }

    #[test]
    fn touch_only_ignores_mouse_unless_simulated() {
        let core = GestureCore::new(widget(), 1);
        let mut filter = SingleFilter::new().with_touch_only(true);
        let press = Event::button_press(widget(), 1, 0.0, 0.0);
        assert_eq!(filter.filter(&core, &press, &settings()), EventFilter::Ignore);
        let simulated = Settings::default().with_simulate_touchscreen(true);
        assert_eq!(filter.filter(&core, &press, &simulated), EventFilter::Accept);
    }

    #[test]
    fn exclusive_ignores_non_emulating_touches() {
        let core = GestureCore::new(widget(), 1);
        let mut filter = SingleFilter::new().with_exclusive(true);
        let touch = Event::touch_begin(widget(), SequenceId::touch(2), 0.0, 0.0);
        assert_eq!(filter.filter(&core, &touch, &settings()), EventFilter::Ignore);
        let emulating = touch.emulating_pointer(true);
        assert_eq!(filter.filter(&core, &emulating, &settings()), EventFilter::Accept);
    }

    #[test]
    fn motion_needs_tracked_sequence() {
        let mut core = GestureCore::new(widget(), 1);
        let mut filter = SingleFilter::new();
        let motion = Event::motion(widget(), 0.0, 0.0, ModifierState::BUTTON1);
        assert_eq!(filter.filter(&core, &motion, &settings()), EventFilter::Ignore);

        core.insert_point(&Event::button_press(widget(), 1, 0.0, 0.0));
        assert_eq!(filter.filter(&core, &motion, &settings()), EventFilter::Accept);
        assert_eq!(filter.current_button(), 1);

        let other = Event::motion(widget(), 0.0, 0.0, ModifierState::BUTTON2);
        assert_eq!(filter.filter(&core, &other, &settings()), EventFilter::Reset);
    }

    #[test]
    fn release_clears_current_button() {
        let mut core = GestureCore::new(widget(), 1);
        let mut filter = SingleFilter::new();
        let press = Event::button_press(widget(), 1, 0.0, 0.0);
        filter.filter(&core, &press, &settings());
        core.insert_point(&press);
        let release = Event::button_release(widget(), 1, 0.0, 0.0);
        assert_eq!(filter.filter(&core, &release, &settings()), EventFilter::Accept);
        filter.event_handled(&core, &release);
        assert_eq!(filter.current_button(), 0);
    }

    #[test]
    fn cancel_of_current_sequence() {
        let core = GestureCore::new(widget(), 1);
        let mut filter = SingleFilter::new();
        filter.filter(&core, &Event::button_press(widget(), 1, 0.0, 0.0), &settings());
        filter.cancel(SequenceId::touch(4));
        assert_eq!(filter.current_button(), 1);
        filter.cancel(SequenceId::POINTER);
        assert_eq!(filter.current_button(), 0);
    }
}
