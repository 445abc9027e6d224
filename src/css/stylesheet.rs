//! Compiled stylesheets: selector matching against widget paths and
//! cascade resolution.

use tracing::warn;

use crate::css::model::{
    Combinator, CompoundSelector, Declaration, Selector, SelectorComponent, SelectorPart,
    StyleSheet,
};
use crate::css::properties::apply_declaration;
use crate::css::specificity::Specificity;
use crate::css::styles::Styles;
use crate::style::{CssChange, PathElement, WidgetPath};

/// A declaration that matched, with the specificity it applies at.
pub type Match<'a> = (Specificity, &'a Declaration);

/// A stylesheet ready for matching.
#[derive(Debug, Default)]
pub struct CompiledStylesheet {
    rules: Vec<CompiledRule>,
    /// Categories any selector of this sheet depends on.
    change: CssChange,
    priority: u32,
}

#[derive(Debug)]
struct CompiledRule {
    selectors: Vec<Selector>,
    declarations: Vec<Declaration>,
    source_order: u32,
}

impl CompiledStylesheet {
    /// Compile a parsed [`StyleSheet`]. `priority` ranks the sheet against
    /// other providers of the same cascade.
    pub fn compile(stylesheet: &StyleSheet, priority: u32) -> Self {
        let mut change = CssChange::empty();
        let rules = stylesheet
            .rules
            .iter()
            .enumerate()
            .map(|(i, rule)| {
                for selector in &rule.selectors {
                    change |= selector_change(selector);
                }
                CompiledRule {
                    selectors: rule.selectors.clone(),
                    declarations: rule.declarations.clone(),
                    source_order: i as u32,
                }
            })
            .collect();

        CompiledStylesheet {
            rules,
            change,
            priority,
        }
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Categories whose change can alter what this sheet matches.
    pub fn change(&self) -> CssChange {
        self.change
    }

    /// Append every declaration matching the leaf of `path`.
    pub fn collect_matches<'a>(&'a self, path: &WidgetPath, out: &mut Vec<Match<'a>>) {
        for rule in &self.rules {
            let best = rule
                .selectors
                .iter()
                .filter(|sel| matches_selector(sel, path))
                .map(|sel| Specificity::from_selector(sel, rule.source_order, self.priority, false))
                .max();
            let Some(spec) = best else { continue };
            for decl in &rule.declarations {
                let spec = Specificity {
                    important: u8::from(decl.important),
                    ..spec
                };
                out.push((spec, decl));
            }
        }
    }

    /// Compute styles for the leaf of `path` from this sheet alone.
    pub fn compute_styles(&self, path: &WidgetPath) -> Styles {
        let mut matches = Vec::new();
        self.collect_matches(path, &mut matches);
        apply_matches(matches)
    }
}

/// Apply matches lowest specificity first, so the highest wins.
/// Invalid declarations are skipped with a warning.
pub fn apply_matches(mut matches: Vec<Match<'_>>) -> Styles {
    matches.sort_by_key(|(spec, _)| *spec);

    let mut result = Styles::new();
    for (_, decl) in matches {
        if let Err(err) = apply_declaration(&mut result, &decl.property, &decl.values) {
            warn!(message = "css.declaration_ignored", property = %decl.property, %err);
        }
    }
    result
}

fn component_change(component: &SelectorComponent) -> CssChange {
    match component {
        SelectorComponent::Name(_) => CssChange::NAME,
        SelectorComponent::Class(_) => CssChange::CLASS,
        SelectorComponent::Id(_) => CssChange::ID,
        SelectorComponent::State(_) => CssChange::STATE,
        SelectorComponent::FirstChild => CssChange::FIRST_CHILD,
        SelectorComponent::LastChild => CssChange::LAST_CHILD,
        SelectorComponent::Universal => CssChange::empty(),
    }
}

/// Categories a selector depends on: its subject's own inputs plus its
/// ancestors' inputs seen from below.
fn selector_change(selector: &Selector) -> CssChange {
    let compound_change = |c: &CompoundSelector| {
        c.components
            .iter()
            .fold(CssChange::empty(), |acc, comp| acc | component_change(comp))
    };

    let mut change = selector.subject().map(compound_change).unwrap_or_default();
    for ancestor in selector.ancestors() {
        change |= compound_change(ancestor).for_child();
    }
    change
}

/// Check whether a full selector matches the leaf of `path`.
///
/// Walks the selector right to left. A descendant combinator tries every
/// matching ancestor before giving up.
fn matches_selector(selector: &Selector, path: &WidgetPath) -> bool {
    let elements = path.elements();
    let (Some(leaf), Some(SelectorPart::Compound(subject))) =
        (elements.len().checked_sub(1), selector.parts.last())
    else {
        return false;
    };
    matches_compound(subject, &elements[leaf])
        && matches_ancestors(&selector.parts[..selector.parts.len() - 1], elements, leaf)
}

/// Match the `(combinator, compound)` pairs left in `parts` against the
/// ancestors of `elements[idx]`.
fn matches_ancestors(parts: &[SelectorPart], elements: &[PathElement], idx: usize) -> bool {
    let [head @ .., SelectorPart::Compound(compound), SelectorPart::Combinator(combinator)] = parts
    else {
        return parts.is_empty();
    };
    match combinator {
        Combinator::Child => idx.checked_sub(1).is_some_and(|parent| {
            matches_compound(compound, &elements[parent])
                && matches_ancestors(head, elements, parent)
        }),
        Combinator::Descendant => (0..idx).rev().any(|j| {
            matches_compound(compound, &elements[j]) && matches_ancestors(head, elements, j)
        }),
    }
}

fn matches_compound(compound: &CompoundSelector, elem: &PathElement) -> bool {
    compound.components.iter().all(|component| match component {
        SelectorComponent::Name(name) => {
            elem.element_name() == name || elem.widget_type() == name
        }
        SelectorComponent::Class(name) => elem.has_class(name),
        SelectorComponent::Id(name) => elem.id() == Some(name.as_str()),
        SelectorComponent::State(flags) => elem.state().contains(*flags),
        SelectorComponent::FirstChild => elem.is_first_child(),
        SelectorComponent::LastChild => elem.is_last_child(),
        SelectorComponent::Universal => true,
    })
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::css::length::Length;
    use crate::css::parser::parse_css;
    use crate::style::{NodeDeclaration, StateFlags};

    /// ```text
    /// window#main
    ///    |
    /// box.linked
    ///    |
    /// button.flat:hover   (first of two children)
    /// ```
    fn button_path() -> WidgetPath {
        let mut path = WidgetPath::new();
        path.append(Rc::new(NodeDeclaration::new("CtkWindow").with_name("window").with_id("main")));
        path.append(Rc::new(NodeDeclaration::new("CtkBox").with_name("box").with_class("linked")));
        path.append_positioned(
            Rc::new(
                NodeDeclaration::new("CtkButton")
                    .with_name("button")
                    .with_class("flat")
                    .with_state(StateFlags::PRELIGHT),
            ),
            true,
            false,
        );
        path
    }

    fn compute(css: &str) -> Styles {
        let sheet = parse_css(css).unwrap();
        CompiledStylesheet::compile(&sheet, 600).compute_styles(&button_path())
    }

    // ── Simple selectors ─────────────────────────────────────────────

    #[test]
    fn match_name_and_type() {
        assert_eq!(compute("button { color: red; }").color, Some("red".into()));
        assert_eq!(compute("CtkButton { color: red; }").color, Some("red".into()));
        assert!(compute("label { color: red; }").color.is_none());
    }

    #[test]
    fn match_class_id_universal() {
        assert_eq!(compute(".flat { color: blue; }").color, Some("blue".into()));
        assert_eq!(compute("* { color: white; }").color, Some("white".into()));
        assert!(compute("#main { color: green; }").color.is_none());
    }

    #[test]
    fn match_state_pseudo_class() {
        assert_eq!(compute("button:hover { opacity: 0.5; }").opacity, Some(0.5));
        assert!(compute("button:active { opacity: 0.5; }").opacity.is_none());
    }

    #[test]
    fn match_structural_pseudo_class() {
        assert_eq!(compute("button:first-child { opacity: 1; }").opacity, Some(1.0));
        assert!(compute("button:last-child { opacity: 1; }").opacity.is_none());
    }

    // ── Combinators ──────────────────────────────────────────────────

    #[test]
    fn match_descendant_skips_intermediate() {
        assert_eq!(compute("window button { color: red; }").color, Some("red".into()));
        assert_eq!(compute("#main .flat { color: red; }").color, Some("red".into()));
        assert!(compute("label button { color: red; }").color.is_none());
    }

    #[test]
    fn match_child_combinator() {
        assert_eq!(compute("box > button { color: red; }").color, Some("red".into()));
        assert!(compute("window > button { color: red; }").color.is_none());
    }

    #[test]
    fn match_descendant_retries_farther_ancestors() {
        // box.x box.y box box.y label.z
        let mut path = WidgetPath::new();
        for class in ["x", "y", "", "y"] {
            let mut decl = NodeDeclaration::new("CtkBox").with_name("box");
            if !class.is_empty() {
                decl = decl.with_class(class);
            }
            path.append(Rc::new(decl));
        }
        path.append(Rc::new(NodeDeclaration::new("CtkLabel").with_name("label").with_class("z")));

        let sheet = parse_css(".x > .y .z { background-color: red; }").unwrap();
        let styles = CompiledStylesheet::compile(&sheet, 600).compute_styles(&path);
        assert_eq!(styles.background_color.as_deref(), Some("red"));
    }

    // ── Cascade order ────────────────────────────────────────────────

    #[test]
    fn higher_specificity_wins() {
        let styles = compute(".flat { color: blue; } button { color: red; }");
        assert_eq!(styles.color, Some("blue".into()));
    }

    #[test]
    fn later_rule_wins_at_same_specificity() {
        let styles = compute("button { color: red; } button { color: green; }");
        assert_eq!(styles.color, Some("green".into()));
    }

    #[test]
    fn important_declaration_wins() {
        let styles = compute("button { color: red !important; } button.flat { color: blue; }");
        assert_eq!(styles.color, Some("red".into()));
    }

    #[test]
    fn different_properties_merge() {
        let styles = compute("button { color: red; } .flat { min-width: 20px; }");
        assert_eq!(styles.color, Some("red".into()));
        assert_eq!(styles.min_width, Some(Length::px(20.0)));
    }

    #[test]
    fn invalid_declaration_is_skipped() {
        let styles = compute("button { color: red blue; opacity: 0.3; }");
        assert!(styles.color.is_none());
        assert_eq!(styles.opacity, Some(0.3));
    }

    #[test]
    fn empty_stylesheet_produces_empty_styles() {
        assert!(compute("").is_empty());
    }

    #[test]
    fn empty_path_matches_nothing() {
        let sheet = parse_css("* { color: red; }").unwrap();
        let compiled = CompiledStylesheet::compile(&sheet, 0);
        assert!(compiled.compute_styles(&WidgetPath::new()).is_empty());
    }

    // ── Change tracking ──────────────────────────────────────────────

    #[test]
    fn change_mask_covers_selectors() {
        let sheet = parse_css("box.linked > button:hover { color: red; } #x { color: red; }").unwrap();
        let compiled = CompiledStylesheet::compile(&sheet, 0);
        assert_eq!(
            compiled.change(),
            CssChange::NAME
                | CssChange::STATE
                | CssChange::ID
                | CssChange::PARENT_NAME
                | CssChange::PARENT_CLASS
        );
        assert_eq!(compiled.len(), 2);
    }
}
