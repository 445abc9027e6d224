//! 6-tuple CSS specificity calculation and comparison.
//!
//! ```text
//! (priority, important, id_count, class_count, name_count, source_order)
//! ```
//!
//! Fields are ordered so that the derived `Ord` gives the cascade order:
//! - A higher provider priority beats any selector of a lower one
//! - `!important` beats normal within one priority
//! - More IDs beat fewer IDs
//! - More classes and pseudo-classes beat fewer
//! - More element names beat fewer
//! - Later source order wins as tie-breaker

use crate::css::model::{Selector, SelectorComponent, SelectorPart};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity {
    /// Priority of the provider the rule came from.
    pub priority: u32,
    /// 1 if `!important`, 0 otherwise.
    pub important: u8,
    /// `#id` selectors.
    pub id_count: u16,
    /// `.class`, state and structural pseudo-classes.
    pub class_count: u16,
    /// Element name selectors.
    pub name_count: u16,
    pub source_order: u32,
}

impl Specificity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute specificity from a parsed selector.
    pub fn from_selector(
        selector: &Selector,
        source_order: u32,
        priority: u32,
        important: bool,
    ) -> Self {
        let mut spec = Self {
            priority,
            important: u8::from(important),
            source_order,
            ..Self::default()
        };

        let components = selector.parts.iter().filter_map(|part| match part {
            SelectorPart::Compound(compound) => Some(&compound.components),
            SelectorPart::Combinator(_) => None,
        });
        for component in components.flatten() {
            match component {
                SelectorComponent::Id(_) => spec.id_count += 1,
                SelectorComponent::Class(_)
                | SelectorComponent::State(_)
                | SelectorComponent::FirstChild
                | SelectorComponent::LastChild => spec.class_count += 1,
                SelectorComponent::Name(_) => spec.name_count += 1,
                SelectorComponent::Universal => {}
            }
        }

        spec
    }
}
