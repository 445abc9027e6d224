//! Computed styles and the transitions running on top of them.

use std::rc::Rc;

use crate::css::styles::{Styles, TRANSITIONABLE};

use super::change::CssChange;

/// A numeric property moving linearly from `from` to `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub property: &'static str,
    pub from: f32,
    pub to: f32,
    /// Start time in milliseconds.
    pub start: u64,
    /// Duration in milliseconds. Always nonzero.
    pub duration: u32,
}

impl Transition {
    pub fn end(&self) -> u64 {
        self.start + u64::from(self.duration)
    }

    pub fn is_finished(&self, now: u64) -> bool {
        now >= self.end()
    }

    /// Value at `now`, clamped to the endpoints.
    pub fn value_at(&self, now: u64) -> f32 {
        if now <= self.start {
            return self.from;
        }
        if self.is_finished(now) {
            return self.to;
        }
        let progress = (now - self.start) as f32 / self.duration as f32;
        self.from + (self.to - self.from) * progress
    }
}

/// The style of a node: the cascaded static values plus any transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    values: Rc<Styles>,
    /// What the static values depend on.
    change: CssChange,
    transitions: Vec<Transition>,
}

impl ComputedStyle {
    /// A style without transitions.
    pub fn new(values: Styles, change: CssChange) -> Self {
        Self {
            values: Rc::new(values),
            change,
            transitions: Vec::new(),
        }
    }

    /// A style that transitions from `previous` as seen at `timestamp`.
    ///
    /// Only properties listed by the new `transition-property` and holding a
    /// pixel or plain number on both sides animate.
    pub fn with_transitions(
        values: Styles,
        change: CssChange,
        previous: &ComputedStyle,
        timestamp: u64,
    ) -> Self {
        let duration = values.transition_duration.unwrap_or(0);
        let mut transitions = Vec::new();
        if duration > 0 {
            for property in TRANSITIONABLE {
                if !values.transitions(property) {
                    continue;
                }
                let (Some(from), Some(to)) =
                    (previous.value_at(property, timestamp), values.numeric(property))
                else {
                    continue;
                };
                if from != to {
                    transitions.push(Transition {
                        property,
                        from,
                        to,
                        start: timestamp,
                        duration,
                    });
                }
            }
        }
        Self {
            values: Rc::new(values),
            change,
            transitions,
        }
    }

    /// Static (end state) values.
    pub fn values(&self) -> &Styles {
        &self.values
    }

    pub fn change(&self) -> CssChange {
        self.change
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn has_transitions(&self) -> bool {
        !self.transitions.is_empty()
    }

    /// Whether some transition is still running at `now`.
    pub fn is_animating(&self, now: u64) -> bool {
        self.transitions.iter().any(|t| !t.is_finished(now))
    }

    /// Numeric value of `property` at `now`, including running transitions.
    pub fn value_at(&self, property: &str, now: u64) -> Option<f32> {
        match self.transitions.iter().find(|t| t.property == property) {
            Some(transition) => Some(transition.value_at(now)),
            None => self.values.numeric(property),
        }
    }

    /// The same style at `now`: finished transitions are dropped, static
    /// values are shared.
    pub fn advance(&self, now: u64) -> ComputedStyle {
        Self {
            values: Rc::clone(&self.values),
            change: self.change,
            transitions: self
                .transitions
                .iter()
                .filter(|t| !t.is_finished(now))
                .cloned()
                .collect(),
        }
    }

    /// Whether both styles share the same static values.
    pub fn same_static(&self, other: &ComputedStyle) -> bool {
        Rc::ptr_eq(&self.values, &other.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::length::Length;

    fn styles(opacity: f32, duration: Option<u32>) -> Styles {
        let mut s = Styles::new();
        s.opacity = Some(opacity);
        s.transition_duration = duration;
        s
    }

    #[test]
    fn transition_interpolates() {
        let old = ComputedStyle::new(styles(0.0, None), CssChange::empty());
        let new = ComputedStyle::with_transitions(styles(1.0, Some(100)), CssChange::empty(), &old, 1000);
        assert!(new.is_animating(1000));
        assert_eq!(new.value_at("opacity", 1000), Some(0.0));
        assert_eq!(new.value_at("opacity", 1050), Some(0.5));
        assert_eq!(new.value_at("opacity", 1100), Some(1.0));
        assert!(!new.is_animating(1100));
    }

    #[test]
    fn no_duration_no_transition() {
        let old = ComputedStyle::new(styles(0.0, None), CssChange::empty());
        let new = ComputedStyle::with_transitions(styles(1.0, None), CssChange::empty(), &old, 10);
        assert!(!new.has_transitions());
        assert_eq!(new.value_at("opacity", 10), Some(1.0));
    }

    #[test]
    fn property_filter_and_units() {
        let mut old_values = styles(0.0, None);
        old_values.min_width = Some(Length::px(10.0));
        old_values.min_height = Some(Length::em(1.0));
        let mut new_values = styles(1.0, Some(200));
        new_values.min_width = Some(Length::px(20.0));
        new_values.min_height = Some(Length::em(2.0));
        new_values.transition_property = Some(vec!["min-width".into(), "min-height".into()]);

        let old = ComputedStyle::new(old_values, CssChange::empty());
        let new = ComputedStyle::with_transitions(new_values, CssChange::empty(), &old, 0);
        let props: Vec<_> = new.transitions().iter().map(|t| t.property).collect();
        assert_eq!(props, vec!["min-width"]);
    }

    #[test]
    fn retarget_from_current_value() {
        let a = ComputedStyle::new(styles(0.0, None), CssChange::empty());
        let b = ComputedStyle::with_transitions(styles(1.0, Some(100)), CssChange::empty(), &a, 0);
        let c = ComputedStyle::with_transitions(styles(0.0, Some(100)), CssChange::empty(), &b, 50);
        assert_eq!(c.transitions()[0].from, 0.5);
    }

    #[test]
    fn advance_drops_finished() {
        let a = ComputedStyle::new(styles(0.0, None), CssChange::empty());
        let b = ComputedStyle::with_transitions(styles(1.0, Some(100)), CssChange::empty(), &a, 0);
        let mid = b.advance(50);
        assert!(mid.has_transitions());
        assert!(mid.same_static(&b));
        assert!(!b.advance(100).has_transitions());
    }
}
