//! CSS lengths (px, em, %) and four-sided boxes.

use std::fmt;

/// Length unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Unit {
    /// Device pixels. Bare numbers parse as pixels.
    Px,
    /// Multiple of the element's font size.
    Em,
    /// Percentage of the reference dimension.
    Percent,
}

/// A number with a unit, e.g. `4px`, `1.5em`, `50%`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f32,
    pub unit: Unit,
}

impl Length {
    pub fn px(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Px,
        }
    }

    pub fn em(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Em,
        }
    }

    pub fn percent(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Percent,
        }
    }

    /// The value in pixels, if it does not depend on context.
    pub fn as_px(&self) -> Option<f32> {
        (self.unit == Unit::Px).then_some(self.value)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.unit {
            Unit::Px => "px",
            Unit::Em => "em",
            Unit::Percent => "%",
        };
        if self.value.fract() == 0.0 {
            write!(f, "{}{suffix}", self.value as i64)
        } else {
            write!(f, "{}{suffix}", self.value)
        }
    }
}

/// Four-sided lengths (top, right, bottom, left) for margin and padding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sides {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl Sides {
    /// Same length on every side.
    pub fn all(v: Length) -> Self {
        Self::new(v, v, v, v)
    }

    pub fn symmetric(vertical: Length, horizontal: Length) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    pub fn new(top: Length, right: Length, bottom: Length, left: Length) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}
