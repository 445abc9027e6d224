//! Multi-press recognizer: single, double, triple... clicks and taps.
//!
//! Each press of a series emits `pressed(n_press, x, y)`; the series stops
//! (emitting `stopped`) when the button or device changes, a press or motion
//! leaves the double-click distance or area, or the double-click time runs
//! out without a new press.

use std::any::Any;

use crate::config::Settings;
use crate::event::{Event, EventKind, InputSource, SequenceId};
use crate::geometry::{Point, Rect};

use super::core::GestureCore;
use super::recognizer::{Effect, EventFilter, Recognizer};
use super::signal::GestureSignal;
use super::single::SingleFilter;
use super::state::SequenceState;

#[derive(Debug, Clone, PartialEq)]
pub struct MultiPress {
    single: SingleFilter,
    n_presses: u32,
    n_release: u32,
    current_button: u32,
    current_source: Option<InputSource>,
    initial: Point,
    /// Time at which the double-click timeout fires.
    deadline: Option<u32>,
    area: Option<Rect>,
}

impl Default for MultiPress {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiPress {
    pub fn new() -> Self {
        Self {
            single: SingleFilter::new(),
            n_presses: 0,
            n_release: 0,
            current_button: 0,
            current_source: None,
            initial: Point::default(),
            deadline: None,
            area: None,
        }
    }

    /// Use `filter` for button and device filtering (builder).
    pub fn with_filter(mut self, filter: SingleFilter) -> Self {
        self.single = filter;
        self
    }

    /// Restrict the presses of a series to `area` (builder).
    pub fn with_area(mut self, area: Rect) -> Self {
        self.area = Some(area);
        self
    }

    pub fn single(&self) -> &SingleFilter {
        &self.single
    }

    pub fn single_mut(&mut self) -> &mut SingleFilter {
        &mut self.single
    }

    pub fn area(&self) -> Option<Rect> {
        self.area
    }

    pub fn set_area(&mut self, area: Option<Rect>) {
        self.area = area;
    }

    /// Presses counted in the current series.
    pub fn n_presses(&self) -> u32 {
        self.n_presses
    }

    pub fn is_timeout_pending(&self) -> bool {
        self.deadline.is_some()
    }

    fn within_threshold(&self, point: Point, settings: &Settings) -> bool {
        if self.n_presses == 0 {
            return true;
        }
        if !self.initial.within(point, f64::from(settings.double_click_distance)) {
            return false;
        }
        self.area.map_or(true, |area| {
            point.x >= area.x && point.x < area.right() && point.y >= area.y && point.y < area.bottom()
        })
    }

    fn current_point(&self, core: &GestureCore, fallback: SequenceId) -> Point {
        self.single
            .current_sequence()
            .and_then(|seq| core.point(seq))
            .or_else(|| core.point(fallback))
            .unwrap_or_default()
    }

    fn stop(&mut self, effects: &mut Vec<Effect>) {
        if self.n_presses == 0 {
            return;
        }
        self.current_source = None;
        self.current_button = 0;
        self.n_presses = 0;
        effects.push(GestureSignal::Stopped.into());
        effects.push(Effect::Recheck);
    }
}

impl Recognizer for MultiPress {
    fn type_name(&self) -> &'static str {
        "MultiPress"
    }

    fn filter_event(&mut self, core: &GestureCore, event: &Event, settings: &Settings) -> EventFilter {
        self.single.filter(core, event, settings)
    }

    fn event_handled(&mut self, core: &GestureCore, event: &Event) {
        self.single.event_handled(core, event);
    }

    fn check(&self, core: &GestureCore) -> bool {
        core.sequences().len() == 1 || self.deadline.is_some()
    }

    fn begin(&mut self, core: &GestureCore, settings: &Settings, sequence: SequenceId) -> Vec<Effect> {
        if !core.handles_sequence(sequence) {
            return Vec::new();
        }
        let Some(event) = core.last_event(sequence) else {
            return Vec::new();
        };
        let button = match event.kind {
            EventKind::ButtonPress => event.button,
            EventKind::TouchBegin => 1,
            _ => return Vec::new(),
        };

        let mut effects = Vec::new();
        if self.n_presses > 0 && self.current_button != button {
            self.stop(&mut effects);
        }
        if self.current_source.is_some_and(|source| source != event.source) {
            self.stop(&mut effects);
        }
        self.current_source = Some(event.source);
        self.current_button = button;
        self.deadline = Some(event.time.saturating_add(settings.double_click_time));

        let point = self.current_point(core, sequence);
        if !self.within_threshold(point, settings) {
            self.stop(&mut effects);
        }

        let n_press = self.n_presses + 1;
        self.n_release = n_press;
        effects.push(
            GestureSignal::Pressed {
                n_press,
                x: point.x,
                y: point.y,
            }
            .into(),
        );
        if self.n_presses == 0 {
            self.initial = point;
        }
        self.n_presses += 1;
        effects
    }

    fn update(&mut self, core: &GestureCore, settings: &Settings, sequence: SequenceId) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.within_threshold(self.current_point(core, sequence), settings) {
            self.stop(&mut effects);
        }
        effects
    }

    fn end(&mut self, core: &GestureCore, _settings: &Settings, _sequence: SequenceId) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(current) = self.single.current_sequence() {
            if let Some(point) = core.point(current) {
                if core.sequence_state(current) != SequenceState::Denied {
                    effects.push(
                        GestureSignal::Released {
                            n_press: self.n_release,
                            x: point.x,
                            y: point.y,
                        }
                        .into(),
                    );
                }
            }
        }
        self.n_release = 0;
        effects
    }

    fn cancel(&mut self, _core: &GestureCore, _settings: &Settings, sequence: SequenceId) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.stop(&mut effects);
        self.single.cancel(sequence);
        effects
    }

    fn reset(&mut self, _core: &GestureCore) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.stop(&mut effects);
        effects
    }

    fn expire(&mut self, _core: &GestureCore, now: u32) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.deadline.is_some_and(|deadline| now >= deadline) {
            self.deadline = None;
            self.stop(&mut effects);
        }
        effects
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
