//! CSS AST: Selector, RuleSet, Declaration.

use crate::style::StateFlags;

/// A single simple selector.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Element selector: matches the node name or, when unnamed, the widget
    /// type (e.g. `button`).
    Name(String),
    /// Universal selector: `*`.
    Universal,
    /// Class selector: `.classname`.
    Class(String),
    /// ID selector: `#id`.
    Id(String),
    /// State pseudo-class: `:hover`, `:disabled`, `:dir(rtl)`, ...
    State(StateFlags),
    /// `:first-child`
    FirstChild,
    /// `:last-child`
    LastChild,
}

/// A combinator between compound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant combinator (whitespace): `A B`.
    Descendant,
    /// Child combinator: `A > B`.
    Child,
}

/// A sequence of simple selectors without combinators, e.g.
/// `button.flat:hover`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

impl CompoundSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, component: SelectorComponent) {
        self.components.push(component);
    }

    /// Returns `true` if this selector is the universal selector `*` alone.
    pub fn is_universal(&self) -> bool {
        self.components.len() == 1
            && matches!(self.components[0], SelectorComponent::Universal)
    }
}

/// One element in a selector chain: either a compound selector or a combinator.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorPart {
    Compound(CompoundSelector),
    Combinator(Combinator),
}

/// A full selector: compound selectors joined by combinators.
///
/// `box > button.flat:hover` has parts
/// `[Compound(box), Combinator(Child), Compound(button.flat:hover)]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selector {
    /// Always starts and ends with a `SelectorPart::Compound`.
    pub parts: Vec<SelectorPart>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The compound that must match the styled element itself.
    pub fn subject(&self) -> Option<&CompoundSelector> {
        match self.parts.last() {
            Some(SelectorPart::Compound(c)) => Some(c),
            _ => None,
        }
    }

    /// Compounds that must match ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &CompoundSelector> {
        self.parts.iter().rev().skip(1).filter_map(|part| match part {
            SelectorPart::Compound(c) => Some(c),
            SelectorPart::Combinator(_) => None,
        })
    }
}

/// A value token within a CSS declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationValue {
    /// An identifier like `red`, `all`.
    Ident(String),
    /// A bare number like `10`, `0.5`.
    Number(f32),
    /// A number with a unit suffix like `4px`, `50%`, `200ms`.
    Dimension(f32, String),
    /// A hex color string (without the `#` prefix), e.g. `"ff00aa"`.
    Color(String),
    /// A quoted string value.
    String(String),
}

/// A single property declaration, e.g. `color: red` or `margin: 1px 2px`.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub values: Vec<DeclarationValue>,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: String, values: Vec<DeclarationValue>, important: bool) -> Self {
        Self {
            property,
            values,
            important,
        }
    }
}

/// One or more selectors paired with declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    /// Comma-separated selectors.
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

/// A parsed stylesheet.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    pub rules: Vec<RuleSet>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }
}
