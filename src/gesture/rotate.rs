//! Two-finger rotation.

use std::any::Any;
use std::f64::consts::PI;

use crate::config::Settings;
use crate::event::SequenceId;

use super::core::GestureCore;
use super::recognizer::{Effect, Recognizer};
use super::signal::GestureSignal;

/// Recognizes two active sequences and reports the angle of the line
/// between them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rotate {
    initial_angle: f64,
}

impl Rotate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Angle in radians, in `[0, 2π)`, of the first two active sequences.
    pub fn angle(core: &GestureCore) -> Option<f64> {
        let sequences = core.sequences();
        if sequences.len() != 2 {
            return None;
        }
        let p1 = core.point(sequences[0])?;
        let p2 = core.point(sequences[1])?;
        let angle = 2.0 * PI - (p1.x - p2.x).atan2(p1.y - p2.y);
        Some(angle % (2.0 * PI))
    }

    /// Angle change since recognition began, in `[0, 2π)`.
    pub fn angle_delta(&self, core: &GestureCore) -> Option<f64> {
        let mut delta = Self::angle(core)? - self.initial_angle;
        if delta < 0.0 {
            delta += 2.0 * PI;
        }
        Some(delta)
    }

    fn angle_changed(&self, core: &GestureCore) -> Vec<Effect> {
        match (Self::angle(core), self.angle_delta(core)) {
            (Some(angle), Some(delta)) => vec![GestureSignal::AngleChanged { angle, delta }.into()],
            _ => Vec::new(),
        }
    }
}

impl Recognizer for Rotate {
    fn type_name(&self) -> &'static str {
        "Rotate"
    }

    fn n_points(&self) -> usize {
        2
    }

    fn begin(&mut self, core: &GestureCore, _settings: &Settings, _sequence: SequenceId) -> Vec<Effect> {
        if let Some(angle) = Self::angle(core) {
            self.initial_angle = angle;
        }
        self.angle_changed(core)
    }

    fn update(&mut self, core: &GestureCore, _settings: &Settings, _sequence: SequenceId) -> Vec<Effect> {
        self.angle_changed(core)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::WidgetId;
    use crate::event::Event;
    use slotmap::KeyData;

    fn widget() -> WidgetId {
        WidgetId::from(KeyData::from_ffi(1))
    }

    fn two_fingers(x2: f64, y2: f64) -> GestureCore {
        let mut core = GestureCore::new(widget(), 2);
        core.insert_point(&Event::touch_begin(widget(), SequenceId::touch(1), 0.0, 0.0));
        core.insert_point(&Event::touch_begin(widget(), SequenceId::touch(2), x2, y2));
        core
    }

    fn angle_of(effects: &[Effect]) -> (f64, f64) {
        match effects {
            [Effect::Signal(GestureSignal::AngleChanged { angle, delta })] => (*angle, *delta),
            other => panic!("unexpected effects {other:?}"),
        }
    }

    #[test]
    fn needs_two_points() {
        let mut core = GestureCore::new(widget(), 2);
        core.insert_point(&Event::touch_begin(widget(), SequenceId::touch(1), 0.0, 0.0));
        assert_eq!(Rotate::angle(&core), None);
        assert!(Rotate::new().begin(&core, &Settings::default(), SequenceId::touch(1)).is_empty());
    }

    #[test]
    fn finger_below_is_half_turn() {
        let core = two_fingers(0.0, 10.0);
        let angle = Rotate::angle(&core).unwrap();
        assert!((angle - PI).abs() < 1e-9, "{angle}");
    }

    #[test]
    fn begin_then_quarter_turn() {
        let mut rotate = Rotate::new();
        let settings = Settings::default();
        let mut core = two_fingers(10.0, 0.0);
        let (angle, delta) = angle_of(&rotate.begin(&core, &settings, SequenceId::touch(2)));
        assert!((angle - PI / 2.0).abs() < 1e-9, "{angle}");
        assert_eq!(delta, 0.0);

        core.update_point(&Event::touch_update(widget(), SequenceId::touch(2), 0.0, 10.0));
        let (angle, delta) = angle_of(&rotate.update(&core, &settings, SequenceId::touch(2)));
        assert!((angle - PI).abs() < 1e-9, "{angle}");
        assert!((delta - PI / 2.0).abs() < 1e-9, "{delta}");
    }

    #[test]
    fn delta_wraps_positive() {
        let mut rotate = Rotate::new();
        let settings = Settings::default();
        let mut core = two_fingers(0.0, 10.0);
        rotate.begin(&core, &settings, SequenceId::touch(2));
        core.update_point(&Event::touch_update(widget(), SequenceId::touch(2), 10.0, 0.0));
        let delta = rotate.angle_delta(&core).unwrap();
        assert!((delta - 3.0 * PI / 2.0).abs() < 1e-9, "{delta}");
    }
}
