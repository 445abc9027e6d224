//! The dispatcher: recognizer registry, handler tables and the per-recognizer
//! event pipeline.
//!
//! A [`Dispatcher`] owns the widget tree, the [`Settings`], every recognizer
//! and every connected handler. Handlers receive `&mut Dispatcher`, so they
//! may claim or deny sequences, connect more handlers, mutate the tree or
//! add grabs while an event is being dispatched.

use slotmap::{SecondaryMap, SlotMap};
use tracing::{debug, trace};

use crate::config::Settings;
use crate::dom::{Dom, WidgetId, WidgetTree};
use crate::event::{Event, EventKind, HandlerId, HandlerList, ModifierState, Propagation, SequenceId};
use crate::gesture::{
    Effect, EventFilter, GestureCore, GestureId, GestureSignal, GroupId, PropagationPhase,
    Recognizer, SequenceState, SignalKind,
};

/// Callback connected to a recognizer signal.
pub type GestureHandler<T> = Box<dyn FnMut(&mut Dispatcher<T>, GestureId, &GestureSignal)>;

/// Per-widget event callback running between the target and bubble phases.
pub type LegacyHandler<T> = Box<dyn FnMut(&mut Dispatcher<T>, WidgetId, &Event) -> Propagation>;

pub(crate) struct GestureEntry {
    pub(crate) core: GestureCore,
    pub(crate) recognizer: Box<dyn Recognizer>,
    pub(crate) group: Option<GroupId>,
    /// While nonzero, state changes of this recognizer do not trigger the
    /// widget-level claim handling.
    pub(crate) reaction_blocked: u32,
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Routes input events through a widget tree to gesture recognizers.
pub struct Dispatcher<T: WidgetTree = Dom> {
    pub(crate) tree: T,
    pub(crate) settings: Settings,
    pub(crate) gestures: SlotMap<GestureId, GestureEntry>,
    /// Recognizers per widget, in registration order.
    pub(crate) by_widget: SecondaryMap<WidgetId, Vec<GestureId>>,
    pub(crate) groups: SlotMap<GroupId, Vec<GestureId>>,
    pub(crate) handlers: HandlerList<(GestureId, SignalKind), GestureHandler<T>>,
    pub(crate) legacy: HandlerList<WidgetId, LegacyHandler<T>>,
    /// Grab stack, innermost last.
    pub(crate) grabs: Vec<WidgetId>,
}

impl<T: WidgetTree> std::fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("gestures", &self.gestures.len())
            .field("groups", &self.groups.len())
            .field("handlers", &self.handlers.len())
            .field("legacy", &self.legacy.len())
            .field("grabs", &self.grabs)
            .finish()
    }
}

impl<T: WidgetTree + 'static> Dispatcher<T> {
    /// Create a dispatcher over `tree` with default settings.
    pub fn new(tree: T) -> Self {
        Self {
            tree,
            settings: Settings::default(),
            gestures: SlotMap::with_key(),
            by_widget: SecondaryMap::new(),
            groups: SlotMap::with_key(),
            handlers: HandlerList::new(),
            legacy: HandlerList::new(),
            grabs: Vec::new(),
        }
    }

    /// Replace the settings (builder).
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Mutable access to the tree. Destroyed widgets are skipped by
    /// dispatch; call [`prune`](Self::prune) to drop their recognizers.
    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Attach `recognizer` to `widget`, running in `phase`.
    ///
    /// # Panics
    ///
    /// Panics if `widget` is not part of the tree.
    pub fn create_gesture(
        &mut self,
        widget: WidgetId,
        phase: PropagationPhase,
        recognizer: impl Recognizer,
    ) -> GestureId {
        assert!(self.tree.contains(widget), "gesture attached to a missing widget");
        let mut core = GestureCore::new(widget, recognizer.n_points());
        core.set_phase(phase);
        let type_name = recognizer.type_name();
        let id = self.gestures.insert(GestureEntry {
            core,
            recognizer: Box::new(recognizer),
            group: None,
            reaction_blocked: 0,
        });
        match self.by_widget.get_mut(widget) {
            Some(list) => list.push(id),
            None => {
                self.by_widget.insert(widget, vec![id]);
            }
        }
        debug!(message = "gesture.create", gesture = ?id, ?widget, %phase, type_name);
        id
    }

    /// Detach a recognizer, dropping its handlers and group membership.
    /// Returns `false` if it was already gone.
    pub fn remove_gesture(&mut self, gesture: GestureId) -> bool {
        self.ungroup(gesture);
        let Some(entry) = self.gestures.remove(gesture) else {
            return false;
        };
        let widget = entry.core.widget();
        if let Some(list) = self.by_widget.get_mut(widget) {
            list.retain(|&g| g != gesture);
            if list.is_empty() {
                self.by_widget.remove(widget);
            }
        }
        self.handlers.retain(|(g, _)| g != gesture);
        debug!(message = "gesture.remove", ?gesture, ?widget);
        true
    }

    /// Recognizers of `widget`, in registration order.
    pub fn gestures(&self, widget: WidgetId) -> Vec<GestureId> {
        self.by_widget.get(widget).cloned().unwrap_or_default()
    }

    /// Recognizers of `widget` running in `phase`, in registration order.
    pub fn gestures_in_phase(&self, widget: WidgetId, phase: PropagationPhase) -> Vec<GestureId> {
        self.gestures(widget)
            .into_iter()
            .filter(|&g| self.gestures.get(g).is_some_and(|e| e.core.phase() == phase))
            .collect()
    }

    /// Point table and recognition state of `gesture`.
    pub fn gesture(&self, gesture: GestureId) -> Option<&GestureCore> {
        self.gestures.get(gesture).map(|e| &e.core)
    }

    /// The concrete recognizer behind `gesture`.
    pub fn recognizer<R: Recognizer>(&self, gesture: GestureId) -> Option<&R> {
        self.gestures
            .get(gesture)
            .and_then(|e| e.recognizer.as_any().downcast_ref::<R>())
    }

    pub fn recognizer_mut<R: Recognizer>(&mut self, gesture: GestureId) -> Option<&mut R> {
        self.gestures
            .get_mut(gesture)
            .and_then(|e| e.recognizer.as_any_mut().downcast_mut::<R>())
    }

    pub fn set_propagation_phase(&mut self, gesture: GestureId, phase: PropagationPhase) {
        if let Some(entry) = self.gestures.get_mut(gesture) {
            entry.core.set_phase(phase);
        }
    }

    /// State of `sequence` for `gesture`; `None` for stale handles.
    pub fn sequence_state(&self, gesture: GestureId, sequence: SequenceId) -> SequenceState {
        self.gesture(gesture)
            .map_or(SequenceState::None, |core| core.sequence_state(sequence))
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    /// Connect a raw handler for signals of `kind` on `gesture`.
    pub fn connect(
        &mut self,
        gesture: GestureId,
        kind: SignalKind,
        handler: impl FnMut(&mut Self, GestureId, &GestureSignal) + 'static,
    ) -> HandlerId {
        self.handlers.add((gesture, kind), Box::new(handler))
    }

    pub fn connect_begin(
        &mut self,
        gesture: GestureId,
        mut f: impl FnMut(&mut Self, GestureId, SequenceId) + 'static,
    ) -> HandlerId {
        self.connect(gesture, SignalKind::Begin, move |d, g, signal| {
            if let GestureSignal::Begin(seq) = *signal {
                f(d, g, seq);
            }
        })
    }

    pub fn connect_update(
        &mut self,
        gesture: GestureId,
        mut f: impl FnMut(&mut Self, GestureId, SequenceId) + 'static,
    ) -> HandlerId {
        self.connect(gesture, SignalKind::Update, move |d, g, signal| {
            if let GestureSignal::Update(seq) = *signal {
                f(d, g, seq);
            }
        })
    }

    pub fn connect_end(
        &mut self,
        gesture: GestureId,
        mut f: impl FnMut(&mut Self, GestureId, SequenceId) + 'static,
    ) -> HandlerId {
        self.connect(gesture, SignalKind::End, move |d, g, signal| {
            if let GestureSignal::End(seq) = *signal {
                f(d, g, seq);
            }
        })
    }

    pub fn connect_cancel(
        &mut self,
        gesture: GestureId,
        mut f: impl FnMut(&mut Self, GestureId, SequenceId) + 'static,
    ) -> HandlerId {
        self.connect(gesture, SignalKind::Cancel, move |d, g, signal| {
            if let GestureSignal::Cancel(seq) = *signal {
                f(d, g, seq);
            }
        })
    }

    /// Runs after the widget-level claim handling for the change.
    pub fn connect_sequence_state_changed(
        &mut self,
        gesture: GestureId,
        mut f: impl FnMut(&mut Self, GestureId, SequenceId, SequenceState) + 'static,
    ) -> HandlerId {
        self.connect(gesture, SignalKind::SequenceStateChanged, move |d, g, signal| {
            if let GestureSignal::SequenceStateChanged(seq, state) = *signal {
                f(d, g, seq, state);
            }
        })
    }

    pub fn connect_pressed(
        &mut self,
        gesture: GestureId,
        mut f: impl FnMut(&mut Self, GestureId, u32, f64, f64) + 'static,
    ) -> HandlerId {
        self.connect(gesture, SignalKind::Pressed, move |d, g, signal| {
            if let GestureSignal::Pressed { n_press, x, y } = *signal {
                f(d, g, n_press, x, y);
            }
        })
    }

    pub fn connect_released(
        &mut self,
        gesture: GestureId,
        mut f: impl FnMut(&mut Self, GestureId, u32, f64, f64) + 'static,
    ) -> HandlerId {
        self.connect(gesture, SignalKind::Released, move |d, g, signal| {
            if let GestureSignal::Released { n_press, x, y } = *signal {
                f(d, g, n_press, x, y);
            }
        })
    }

    pub fn connect_stopped(
        &mut self,
        gesture: GestureId,
        mut f: impl FnMut(&mut Self, GestureId) + 'static,
    ) -> HandlerId {
        self.connect(gesture, SignalKind::Stopped, move |d, g, _| f(d, g))
    }

    pub fn connect_angle_changed(
        &mut self,
        gesture: GestureId,
        mut f: impl FnMut(&mut Self, GestureId, f64, f64) + 'static,
    ) -> HandlerId {
        self.connect(gesture, SignalKind::AngleChanged, move |d, g, signal| {
            if let GestureSignal::AngleChanged { angle, delta } = *signal {
                f(d, g, angle, delta);
            }
        })
    }

    /// Disconnect a recognizer signal handler.
    pub fn disconnect(&mut self, handler: HandlerId) -> bool {
        self.handlers.remove(handler)
    }

    /// Connect a legacy event handler on `widget`. Handlers of a widget run
    /// in connection order until one returns [`Propagation::Stop`].
    pub fn connect_event(
        &mut self,
        widget: WidgetId,
        handler: impl FnMut(&mut Self, WidgetId, &Event) -> Propagation + 'static,
    ) -> HandlerId {
        self.legacy.add(widget, Box::new(handler))
    }

    pub fn disconnect_event(&mut self, handler: HandlerId) -> bool {
        self.legacy.remove(handler)
    }

    /// Drop recognizers, legacy handlers and grabs of destroyed widgets.
    pub fn prune(&mut self) {
        let stale: Vec<GestureId> = self
            .gestures
            .iter()
            .filter(|(_, e)| !self.tree.contains(e.core.widget()))
            .map(|(id, _)| id)
            .collect();
        for gesture in &stale {
            self.remove_gesture(*gesture);
        }
        let tree = &self.tree;
        self.legacy.retain(|widget| tree.contains(widget));
        self.grabs.retain(|&widget| tree.contains(widget));
        debug!(message = "dispatch.prune", gestures = stale.len());
    }

    /// Fire timers (double-click timeouts) that ran out by `now`.
    pub fn expire_timeouts(&mut self, now: u32) {
        let ids: Vec<GestureId> = self.gestures.keys().collect();
        for gesture in ids {
            let effects = match self.gestures.get_mut(gesture) {
                Some(entry) => entry.recognizer.expire(&entry.core, now),
                None => continue,
            };
            self.apply_effects(gesture, effects);
        }
    }

    // -----------------------------------------------------------------------
    // Emission
    // -----------------------------------------------------------------------

    /// Emit `signal` on `gesture`: widget-level handling (state changes
    /// only), then connected handlers, then the recognizer's own hook.
    pub(crate) fn emit(&mut self, gesture: GestureId, signal: GestureSignal) {
        if !self.gestures.contains_key(gesture) {
            return;
        }
        trace!(message = "gesture.signal", ?gesture, kind = ?signal.kind());

        if let GestureSignal::SequenceStateChanged(sequence, state) = signal {
            self.sequence_state_changed(gesture, sequence, state);
        }

        for id in self.handlers.ids_for((gesture, signal.kind())) {
            if let Some(mut handler) = self.handlers.take(id) {
                handler(self, gesture, &signal);
                self.handlers.restore(id, handler);
            }
        }

        let effects = match self.gestures.get_mut(gesture) {
            Some(entry) => {
                let core = &entry.core;
                let settings = &self.settings;
                match signal {
                    GestureSignal::Begin(seq) => entry.recognizer.begin(core, settings, seq),
                    GestureSignal::Update(seq) => entry.recognizer.update(core, settings, seq),
                    GestureSignal::End(seq) => entry.recognizer.end(core, settings, seq),
                    GestureSignal::Cancel(seq) => entry.recognizer.cancel(core, settings, seq),
                    _ => Vec::new(),
                }
            }
            None => return,
        };
        self.apply_effects(gesture, effects);
    }

    pub(crate) fn apply_effects(&mut self, gesture: GestureId, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Signal(signal) => self.emit(gesture, signal),
                Effect::Recheck => {
                    let Some(core) = self.gesture(gesture) else {
                        return;
                    };
                    let sequence = core.last_updated_sequence().unwrap_or(SequenceId::POINTER);
                    self.check_recognized(gesture, sequence);
                }
            }
        }
    }

    /// Re-evaluate recognition, emitting `begin` or `end` on a change.
    /// Returns whether the gesture is recognized afterwards.
    pub(crate) fn check_recognized(&mut self, gesture: GestureId, sequence: SequenceId) -> bool {
        let Some(entry) = self.gestures.get_mut(gesture) else {
            return false;
        };
        let matching = entry.core.has_matching_points();
        if entry.core.is_recognized() && !matching {
            entry.core.set_recognized(false);
            self.emit(gesture, GestureSignal::End(sequence));
        } else if !entry.core.is_recognized() && matching && entry.recognizer.check(&entry.core) {
            entry.core.set_recognized(true);
            self.emit(gesture, GestureSignal::Begin(sequence));
        }
        self.gesture(gesture).is_some_and(GestureCore::is_recognized)
    }

    // -----------------------------------------------------------------------
    // Per-recognizer event handling
    // -----------------------------------------------------------------------

    /// Feed `event` to one recognizer. Returns whether it consumed the event.
    pub(crate) fn handle_gesture_event(&mut self, gesture: GestureId, event: &Event) -> bool {
        let filter = match self.gestures.get_mut(gesture) {
            Some(entry) => entry.recognizer.filter_event(&entry.core, event, &self.settings),
            None => return false,
        };
        match filter {
            EventFilter::Ignore => return false,
            EventFilter::Reset => {
                if self.gesture(gesture).is_some_and(GestureCore::is_active) {
                    self.reset(gesture);
                }
                return false;
            }
            EventFilter::Accept => {}
        }

        let handled = self.track_points(gesture, event);
        if let Some(entry) = self.gestures.get_mut(gesture) {
            entry.recognizer.event_handled(&entry.core, event);
        }
        handled
    }

    /// End-of-sequence event for a recognizer that was denied the sequence:
    /// forget the point without any signal.
    pub(crate) fn drop_denied_point(&mut self, gesture: GestureId, event: &Event) {
        if let Some(entry) = self.gestures.get_mut(gesture) {
            entry.core.remove_point(event.sequence);
            entry.recognizer.event_handled(&entry.core, event);
        }
    }

    fn track_points(&mut self, gesture: GestureId, event: &Event) -> bool {
        let sequence = event.sequence;
        let was_recognized = match self.gestures.get_mut(gesture) {
            Some(entry) => {
                if entry.core.sequence_state(sequence) != SequenceState::Denied {
                    entry.core.set_last_sequence(sequence);
                }
                entry.core.is_recognized()
            }
            None => return false,
        };

        match event.kind {
            EventKind::ButtonPress | EventKind::TouchBegin => {
                if self.add_point(gesture, event) {
                    let triggered = !was_recognized
                        && self.gesture(gesture).is_some_and(GestureCore::has_matching_points);
                    if self.check_recognized(gesture, sequence) {
                        if let Some(entry) = self.gestures.get_mut(gesture) {
                            // Claimed early: the press itself is consumed.
                            if entry.core.sequence_state(sequence) == SequenceState::Claimed {
                                entry.core.set_press_handled(sequence);
                            }
                        }
                    } else if triggered && self.gesture(gesture).is_some_and(GestureCore::is_empty) {
                        // Reset from within `begin`, but recognition did happen.
                        return true;
                    }
                }
            }
            EventKind::ButtonRelease | EventKind::TouchEnd => {
                let updated = self
                    .gestures
                    .get_mut(gesture)
                    .is_some_and(|e| e.core.update_point(event));
                if updated {
                    if was_recognized && self.check_recognized(gesture, sequence) {
                        self.emit(gesture, GestureSignal::Update(sequence));
                    }
                    if let Some(entry) = self.gestures.get_mut(gesture) {
                        entry.core.remove_point(sequence);
                    }
                }
            }
            EventKind::Motion | EventKind::TouchUpdate => {
                if event.kind == EventKind::Motion && !event.state.intersects(ModifierState::BUTTONS) {
                    return false;
                }
                let updated = self
                    .gestures
                    .get_mut(gesture)
                    .is_some_and(|e| e.core.update_point(event));
                if updated && self.check_recognized(gesture, sequence) {
                    self.emit(gesture, GestureSignal::Update(sequence));
                }
            }
            EventKind::TouchCancel => {
                self.cancel_sequence(gesture, sequence);
            }
        }

        self.gesture(gesture).is_some_and(|core| {
            core.sequence_state(sequence) == SequenceState::Claimed && core.is_recognized()
        })
    }

    /// Track a pressed sequence. New sequences take the state of their group
    /// and are denied right away when they exceed the point count.
    fn add_point(&mut self, gesture: GestureId, event: &Event) -> bool {
        let sequence = event.sequence;
        let added = match self.gestures.get_mut(gesture) {
            Some(entry) => entry.core.insert_point(event),
            None => return false,
        };
        if added {
            let group_state = self.group_state(gesture, sequence);
            self.set_sequence_state(gesture, sequence, group_state);

            let exceeded = self
                .gesture(gesture)
                .is_some_and(|core| core.n_current_points() > core.n_points());
            if exceeded {
                self.set_sequence_state(gesture, sequence, SequenceState::Denied);
            }
        }
        true
    }

    /// Emit `cancel` for `sequence`, forget it and re-check recognition.
    /// Returns `false` if the sequence was not tracked.
    pub fn cancel_sequence(&mut self, gesture: GestureId, sequence: SequenceId) -> bool {
        if !self
            .gesture(gesture)
            .is_some_and(|core| core.point_data(sequence).is_some())
        {
            return false;
        }
        debug!(message = "gesture.cancel", ?gesture, %sequence);
        self.emit(gesture, GestureSignal::Cancel(sequence));
        if let Some(entry) = self.gestures.get_mut(gesture) {
            entry.core.remove_point(sequence);
        }
        self.check_recognized(gesture, sequence);
        true
    }

    /// Cancel every tracked sequence of `gesture`.
    pub fn reset(&mut self, gesture: GestureId) {
        let effects = match self.gestures.get_mut(gesture) {
            Some(entry) => entry.recognizer.reset(&entry.core),
            None => return,
        };
        debug!(message = "gesture.reset", ?gesture);
        self.apply_effects(gesture, effects);

        let sequences = self
            .gesture(gesture)
            .map(GestureCore::tracked_sequences)
            .unwrap_or_default();
        for sequence in sequences {
            self.cancel_sequence(gesture, sequence);
        }
    }
}
