//! Styles struct with typed `Option<T>` fields for every supported property.
//!
//! `None` means "not set": the value is inherited (for inherited properties)
//! or falls back to the default.

use crate::css::length::{Length, Sides};

/// Properties whose numeric value can be transitioned.
pub const TRANSITIONABLE: [&str; 4] = ["opacity", "font-size", "min-width", "min-height"];

/// All properties of a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Styles {
    // Colors (inherited: color)
    pub color: Option<String>,
    pub background_color: Option<String>,
    pub opacity: Option<f32>,

    // Text (inherited)
    pub font_size: Option<Length>,

    // Box
    pub margin: Option<Sides>,
    pub padding: Option<Sides>,
    pub min_width: Option<Length>,
    pub min_height: Option<Length>,

    // Transitions
    /// Milliseconds.
    pub transition_duration: Option<u32>,
    /// Property names, or `all`.
    pub transition_property: Option<Vec<String>>,
}

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `other` on top of `self`: every property `other` sets wins.
    /// `self` is the lower-specificity side of the cascade.
    pub fn merge(&self, other: &Styles) -> Styles {
        fn merge_opt<T: Clone>(base: &Option<T>, other: &Option<T>) -> Option<T> {
            other.as_ref().or(base.as_ref()).cloned()
        }

        Styles {
            color: merge_opt(&self.color, &other.color),
            background_color: merge_opt(&self.background_color, &other.background_color),
            opacity: merge_opt(&self.opacity, &other.opacity),
            font_size: merge_opt(&self.font_size, &other.font_size),
            margin: merge_opt(&self.margin, &other.margin),
            padding: merge_opt(&self.padding, &other.padding),
            min_width: merge_opt(&self.min_width, &other.min_width),
            min_height: merge_opt(&self.min_height, &other.min_height),
            transition_duration: merge_opt(&self.transition_duration, &other.transition_duration),
            transition_property: merge_opt(&self.transition_property, &other.transition_property),
        }
    }

    /// Fill unset inherited properties (color, font-size) from `parent`.
    pub fn inherit_from(&self, parent: &Styles) -> Styles {
        let mut out = self.clone();
        if out.color.is_none() {
            out.color = parent.color.clone();
        }
        if out.font_size.is_none() {
            out.font_size = parent.font_size;
        }
        out
    }

    /// Returns `true` if no property is set.
    pub fn is_empty(&self) -> bool {
        *self == Styles::default()
    }

    /// Current numeric value of a transitionable property, in pixels for
    /// lengths. `None` if unset or not pixel-valued.
    pub fn numeric(&self, property: &str) -> Option<f32> {
        match property {
            "opacity" => self.opacity,
            "font-size" => self.font_size.and_then(|l| l.as_px()),
            "min-width" => self.min_width.and_then(|l| l.as_px()),
            "min-height" => self.min_height.and_then(|l| l.as_px()),
            _ => None,
        }
    }

    /// Whether changes of `property` should be transitioned.
    pub fn transitions(&self, property: &str) -> bool {
        match &self.transition_property {
            None => true,
            Some(list) => list.iter().any(|p| p == "all" || p == property),
        }
    }
}
