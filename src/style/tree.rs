//! The style node tree: incremental restyling of a widget hierarchy.
//!
//! Every node carries a shared [`NodeDeclaration`] and a lazily computed
//! [`ComputedStyle`]. Changes are recorded as [`CssChange`] masks on the node
//! they happen to and only pushed to children and following siblings when a
//! style is next needed (see [`StyleTree::style`] and [`StyleTree::validate`]).
//!
//! Two flags drive the lazy pass:
//! - `style_is_invalid`: this node's style must be recomputed.
//! - `invalid`: this node or a visible descendant needs a validation pass.
//!   It is propagated to the parent, so a root tells whether anything
//!   below it is stale.

use std::fmt::Write as _;
use std::rc::Rc;

use slotmap::{SecondaryMap, SlotMap};
use tracing::{debug, trace};

use crate::config::Settings;
use crate::css::stylesheet::CompiledStylesheet;
use crate::css::Styles;

use super::cascade::{ProviderId, StyleCascade, StyleError};
use super::change::CssChange;
use super::computed::ComputedStyle;
use super::declaration::NodeDeclaration;
use super::path::WidgetPath;
use super::state::StateFlags;
use super::StyleNodeId;

const NO_CHILDREN: &[StyleNodeId] = &[];

/// What a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A node that lives as long as its widget.
    Normal,
    /// A short-lived node for a generated element. Shares its parent's
    /// declaration and never runs transitions.
    Transient,
}

#[derive(Debug)]
struct StyleNode {
    kind: NodeKind,
    decl: Rc<NodeDeclaration>,
    /// Transient nodes read their parent's declaration until one of their
    /// own setters detaches them.
    shares_parent_decl: bool,
    visible: bool,
    style: Option<Rc<ComputedStyle>>,
    pending: CssChange,
    style_is_invalid: bool,
    invalid: bool,
    needs_propagation: bool,
}

impl StyleNode {
    fn new(kind: NodeKind, decl: Rc<NodeDeclaration>, visible: bool) -> Self {
        Self {
            kind,
            decl,
            shares_parent_decl: kind == NodeKind::Transient,
            visible,
            style: None,
            pending: CssChange::empty(),
            style_is_invalid: false,
            invalid: false,
            needs_propagation: false,
        }
    }
}

/// Arena of style nodes plus the cascade they are styled from.
pub struct StyleTree {
    nodes: SlotMap<StyleNodeId, StyleNode>,
    parent: SecondaryMap<StyleNodeId, StyleNodeId>,
    children: SecondaryMap<StyleNodeId, Vec<StyleNodeId>>,
    cascade: StyleCascade,
    settings: Settings,
    /// Frame time of the last [`StyleTree::validate`], in milliseconds.
    timestamp: u64,
    changed: Vec<StyleNodeId>,
}

impl StyleTree {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            parent: SecondaryMap::new(),
            children: SecondaryMap::new(),
            cascade: StyleCascade::new(),
            settings,
            timestamp: 0,
            changed: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings. Disabling animations takes effect on the next
    /// restyle.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn cascade(&self) -> &StyleCascade {
        &self.cascade
    }

    /// Time of the last validation pass.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    // -----------------------------------------------------------------------
    // Providers
    // -----------------------------------------------------------------------

    /// Add a compiled stylesheet and restyle every node.
    pub fn add_provider(&mut self, sheet: CompiledStylesheet) -> ProviderId {
        let id = self.cascade.add(sheet);
        self.invalidate_all_sources();
        id
    }

    /// Parse `css` and add it at `priority`.
    pub fn add_provider_from_str(&mut self, css: &str, priority: u32) -> Result<ProviderId, StyleError> {
        let id = self.cascade.add_css(css, priority)?;
        self.invalidate_all_sources();
        Ok(id)
    }

    /// Remove a provider. Returns `false` if it was not present.
    pub fn remove_provider(&mut self, id: ProviderId) -> bool {
        if !self.cascade.remove(id) {
            return false;
        }
        self.invalidate_all_sources();
        true
    }

    fn invalidate_all_sources(&mut self) {
        for root in self.roots() {
            self.invalidate_style_provider(root);
        }
    }

    fn invalidate_style_provider(&mut self, node: StyleNodeId) {
        self.invalidate(node, CssChange::SOURCE);
        for child in self.children(node).to_vec() {
            self.invalidate_style_provider(child);
        }
    }

    // -----------------------------------------------------------------------
    // Structure
    // -----------------------------------------------------------------------

    /// Create a visible root node.
    pub fn create_node(&mut self, decl: NodeDeclaration) -> StyleNodeId {
        let id = self
            .nodes
            .insert(StyleNode::new(NodeKind::Normal, Rc::new(decl), true));
        self.children.insert(id, Vec::new());
        self.invalidate(id, CssChange::ANY_SELF | CssChange::SOURCE);
        id
    }

    /// Create an invisible node appended to `parent` that borrows the
    /// parent's declaration.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not exist.
    pub fn create_transient_node(&mut self, parent: StyleNodeId) -> StyleNodeId {
        assert!(
            self.nodes.contains_key(parent),
            "transient node parent does not exist"
        );
        let decl = Rc::clone(self.effective_decl(parent));
        let id = self
            .nodes
            .insert(StyleNode::new(NodeKind::Transient, decl, false));
        self.children.insert(id, Vec::new());
        self.reposition(id, Some(parent), self.last_child(parent));
        id
    }

    /// Unlink and drop a node.
    ///
    /// # Panics
    ///
    /// Panics if the node still has children.
    pub fn destroy_node(&mut self, node: StyleNodeId) {
        if !self.nodes.contains_key(node) {
            return;
        }
        assert!(
            self.children(node).is_empty(),
            "style node destroyed while it has children"
        );
        if self.parent.contains_key(node) {
            self.reposition(node, None, None);
        }
        self.nodes.remove(node);
        self.children.remove(node);
        self.changed.retain(|&id| id != node);
    }

    /// Move `node` to the end of `parent`'s children, or make it a root.
    /// Unknown nodes and parents are ignored.
    pub fn set_parent(&mut self, node: StyleNodeId, parent: Option<StyleNodeId>) {
        if !self.nodes.contains_key(node) || self.parent(node) == parent {
            return;
        }
        if parent.is_some_and(|p| !self.nodes.contains_key(p)) {
            return;
        }
        let previous = parent.and_then(|p| self.last_child(p));
        self.reposition(node, parent, previous);
    }

    /// Insert `node` into `parent` right after `previous`, or first if
    /// `previous` is `None`.
    pub fn insert_after(
        &mut self,
        parent: StyleNodeId,
        node: StyleNodeId,
        previous: Option<StyleNodeId>,
    ) {
        debug_assert!(previous.map_or(true, |p| self.parent(p) == Some(parent)));
        if node == parent || Some(node) == previous || !self.nodes.contains_key(node) {
            return;
        }
        if !self.nodes.contains_key(parent) {
            return;
        }
        if self.parent(node) == Some(parent) && self.previous_sibling(node) == previous {
            return;
        }
        self.reposition(node, Some(parent), previous);
    }

    /// Insert `node` into `parent` right before `next`, or last if `next` is
    /// `None`.
    pub fn insert_before(&mut self, parent: StyleNodeId, node: StyleNodeId, next: Option<StyleNodeId>) {
        debug_assert!(next.map_or(true, |n| self.parent(n) == Some(parent)));
        if Some(node) == next || !self.nodes.contains_key(node) || !self.nodes.contains_key(parent) {
            return;
        }
        if self.parent(node) == Some(parent) && self.next_sibling(node) == next {
            return;
        }
        let previous = match next {
            Some(next) => self.previous_sibling(next),
            None => self.last_child(parent),
        };
        self.reposition(node, Some(parent), previous);
    }

    fn reposition(
        &mut self,
        node: StyleNodeId,
        new_parent: Option<StyleNodeId>,
        previous: Option<StyleNodeId>,
    ) {
        debug_assert!(new_parent.is_some() || previous.is_none());
        if new_parent.is_none() {
            self.detach_decl(node);
        }
        let visible = self.nodes[node].visible;
        let old_parent = self.parent(node);

        // Siblings at the old position.
        if visible {
            if let Some(next) = self.next_sibling(node) {
                let mut change = CssChange::ANY_SIBLING | CssChange::NTH_CHILD;
                if self.previous_sibling(node).is_none() {
                    change |= CssChange::FIRST_CHILD;
                }
                self.invalidate(next, change);
            } else if let Some(prev) = self.previous_sibling(node) {
                self.invalidate(prev, CssChange::LAST_CHILD);
            }
        }

        if let Some(old) = old_parent {
            self.unlink(node);
            if visible {
                if let Some(first) = self.first_child(old) {
                    self.invalidate(first, CssChange::NTH_LAST_CHILD);
                }
            }
        }

        if old_parent != new_parent {
            self.invalidate_style_provider(node);
            self.invalidate(node, CssChange::TIMESTAMP | CssChange::ANIMATIONS);

            if let Some(parent) = new_parent {
                if !self.nodes[node].pending.is_empty() {
                    self.nodes[parent].needs_propagation = true;
                }
                if self.nodes[node].invalid && visible {
                    self.set_invalid(parent, true);
                }
            }
        }

        if let Some(parent) = new_parent {
            self.link(node, parent, previous);
            if visible {
                if let Some(first) = self.first_child(parent) {
                    self.invalidate(first, CssChange::NTH_LAST_CHILD);
                }
            }
        }

        // Siblings at the new position.
        let prev = self.previous_sibling(node);
        let next = self.next_sibling(node);
        if visible {
            if let Some(next) = next {
                if prev.is_none() {
                    self.invalidate(next, CssChange::FIRST_CHILD);
                } else {
                    self.invalidate_style(next);
                }
            } else if let Some(prev) = prev {
                self.invalidate(prev, CssChange::LAST_CHILD);
            }
        } else if let Some(next) = next {
            self.invalidate_style(next);
        }

        let mut change = CssChange::ANY_PARENT | CssChange::ANY_SIBLING | CssChange::NTH_CHILD;
        if prev.is_none() {
            change |= CssChange::FIRST_CHILD;
        }
        if next.is_none() {
            change |= CssChange::LAST_CHILD;
        }
        self.invalidate(node, change);
    }

    fn unlink(&mut self, node: StyleNodeId) {
        if let Some(parent) = self.parent.remove(node) {
            if let Some(siblings) = self.children.get_mut(parent) {
                siblings.retain(|&c| c != node);
            }
        }
    }

    fn link(&mut self, node: StyleNodeId, parent: StyleNodeId, previous: Option<StyleNodeId>) {
        self.parent.insert(node, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            let pos = previous
                .and_then(|p| siblings.iter().position(|&c| c == p))
                .map_or(0, |i| i + 1);
            siblings.insert(pos, node);
        }
    }

    /// Show or hide a node. Hidden nodes do not count for `:first-child`
    /// and `:last-child` and are skipped by validation.
    pub fn set_visible(&mut self, node: StyleNodeId, visible: bool) {
        match self.nodes.get_mut(node) {
            Some(data) if data.visible != visible => data.visible = visible,
            _ => return,
        }

        if self.nodes[node].invalid && visible {
            if let Some(parent) = self.parent(node) {
                self.set_invalid(parent, true);
            }
        }

        if let Some(next) = self.next_sibling(node) {
            self.invalidate(next, CssChange::ANY_SIBLING | CssChange::NTH_CHILD);
            if self.is_first_child(node) {
                let mut iter = Some(next);
                while let Some(sibling) = iter {
                    self.invalidate(sibling, CssChange::FIRST_CHILD);
                    if self.nodes[sibling].visible {
                        break;
                    }
                    iter = self.next_sibling(sibling);
                }
            }
        }

        if let Some(prev) = self.previous_sibling(node) {
            if self.is_last_child(node) {
                let mut iter = Some(prev);
                while let Some(sibling) = iter {
                    self.invalidate(sibling, CssChange::LAST_CHILD);
                    if self.nodes[sibling].visible {
                        break;
                    }
                    iter = self.previous_sibling(sibling);
                }
            }
            if let Some(first) = self.parent(node).and_then(|p| self.first_child(p)) {
                self.invalidate(first, CssChange::NTH_LAST_CHILD);
            }
        }
    }

    pub fn is_visible(&self, node: StyleNodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.visible)
    }

    pub fn contains(&self, node: StyleNodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, node: StyleNodeId) -> Option<NodeKind> {
        self.nodes.get(node).map(|n| n.kind)
    }

    pub fn parent(&self, node: StyleNodeId) -> Option<StyleNodeId> {
        self.parent.get(node).copied()
    }

    pub fn children(&self, node: StyleNodeId) -> &[StyleNodeId] {
        self.children
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(NO_CHILDREN)
    }

    pub fn first_child(&self, node: StyleNodeId) -> Option<StyleNodeId> {
        self.children(node).first().copied()
    }

    pub fn last_child(&self, node: StyleNodeId) -> Option<StyleNodeId> {
        self.children(node).last().copied()
    }

    fn sibling_index(&self, node: StyleNodeId) -> Option<(StyleNodeId, usize)> {
        let parent = self.parent(node)?;
        let index = self.children(parent).iter().position(|&c| c == node)?;
        Some((parent, index))
    }

    pub fn previous_sibling(&self, node: StyleNodeId) -> Option<StyleNodeId> {
        let (parent, index) = self.sibling_index(node)?;
        index.checked_sub(1).map(|i| self.children(parent)[i])
    }

    pub fn next_sibling(&self, node: StyleNodeId) -> Option<StyleNodeId> {
        let (parent, index) = self.sibling_index(node)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Nodes without a parent.
    pub fn roots(&self) -> Vec<StyleNodeId> {
        self.nodes
            .keys()
            .filter(|&id| !self.parent.contains_key(id))
            .collect()
    }

    /// No visible node precedes `node` among its siblings.
    fn is_first_child(&self, node: StyleNodeId) -> bool {
        let Some((parent, index)) = self.sibling_index(node) else {
            return true;
        };
        !self.children(parent)[..index]
            .iter()
            .any(|&s| self.nodes[s].visible)
    }

    /// No visible node follows `node` among its siblings.
    fn is_last_child(&self, node: StyleNodeId) -> bool {
        let Some((parent, index)) = self.sibling_index(node) else {
            return true;
        };
        !self.children(parent)[index + 1..]
            .iter()
            .any(|&s| self.nodes[s].visible)
    }

    // -----------------------------------------------------------------------
    // Declaration
    // -----------------------------------------------------------------------

    pub fn declaration(&self, node: StyleNodeId) -> Option<&NodeDeclaration> {
        self.nodes
            .contains_key(node)
            .then(|| self.effective_decl(node).as_ref())
    }

    /// The declaration `node` is matched with, following shared transient
    /// declarations up to their owner.
    fn effective_decl(&self, node: StyleNodeId) -> &Rc<NodeDeclaration> {
        let data = &self.nodes[node];
        match self.parent(node) {
            Some(parent) if data.shares_parent_decl => self.effective_decl(parent),
            _ => &data.decl,
        }
    }

    /// Give a sharing transient node its own copy of the declaration it
    /// currently reads.
    fn detach_decl(&mut self, node: StyleNodeId) {
        if self.nodes[node].shares_parent_decl {
            let decl = Rc::clone(self.effective_decl(node));
            self.nodes[node].decl = decl;
        }
    }

    /// Replace the whole declaration, invalidating only what differs.
    pub fn set_declaration(&mut self, node: StyleNodeId, decl: NodeDeclaration) {
        if !self.nodes.contains_key(node) {
            return;
        }
        let old = self.effective_decl(node);
        let mut change = CssChange::empty();
        if old.widget_type() != decl.widget_type() || old.name() != decl.name() {
            change |= CssChange::NAME;
        }
        if old.id() != decl.id() {
            change |= CssChange::ID;
        }
        if old.state() != decl.state() {
            change |= CssChange::STATE;
        }
        if old.classes() != decl.classes() {
            change |= CssChange::CLASS;
        }
        if change.is_empty() {
            return;
        }
        let data = &mut self.nodes[node];
        data.decl = Rc::new(decl);
        data.shares_parent_decl = false;
        self.invalidate(node, change);
    }

    fn update_declaration(
        &mut self,
        node: StyleNodeId,
        change: CssChange,
        update: impl FnOnce(&mut Rc<NodeDeclaration>) -> bool,
    ) {
        if !self.nodes.contains_key(node) {
            return;
        }
        self.detach_decl(node);
        let data = &mut self.nodes[node];
        if update(&mut data.decl) {
            data.shares_parent_decl = false;
            self.invalidate(node, change);
        }
    }

    pub fn set_widget_type(&mut self, node: StyleNodeId, widget_type: &str) {
        self.update_declaration(node, CssChange::NAME, |d| {
            NodeDeclaration::set_widget_type(d, widget_type)
        });
    }

    pub fn set_name(&mut self, node: StyleNodeId, name: Option<&str>) {
        self.update_declaration(node, CssChange::NAME, |d| NodeDeclaration::set_name(d, name));
    }

    pub fn set_id(&mut self, node: StyleNodeId, id: Option<&str>) {
        self.update_declaration(node, CssChange::ID, |d| NodeDeclaration::set_id(d, id));
    }

    pub fn set_state(&mut self, node: StyleNodeId, state: StateFlags) {
        self.update_declaration(node, CssChange::STATE, |d| NodeDeclaration::set_state(d, state));
    }

    pub fn state(&self, node: StyleNodeId) -> StateFlags {
        self.declaration(node)
            .map(NodeDeclaration::state)
            .unwrap_or_default()
    }

    pub fn add_class(&mut self, node: StyleNodeId, class: &str) {
        self.update_declaration(node, CssChange::CLASS, |d| NodeDeclaration::add_class(d, class));
    }

    pub fn remove_class(&mut self, node: StyleNodeId, class: &str) {
        self.update_declaration(node, CssChange::CLASS, |d| {
            NodeDeclaration::remove_class(d, class)
        });
    }

    pub fn clear_classes(&mut self, node: StyleNodeId) {
        self.update_declaration(node, CssChange::CLASS, NodeDeclaration::clear_classes);
    }

    // -----------------------------------------------------------------------
    // Invalidation
    // -----------------------------------------------------------------------

    /// Record that `change` happened to `node`.
    ///
    /// Timestamp changes only matter to nodes already awaiting validation.
    pub fn invalidate(&mut self, node: StyleNodeId, change: CssChange) {
        let Some(data) = self.nodes.get_mut(node) else {
            return;
        };
        let mut change = change;
        if !data.invalid {
            change.remove(CssChange::TIMESTAMP);
        }
        if change.is_empty() {
            return;
        }
        data.pending |= change;

        if let Some(parent) = self.parent(node) {
            self.nodes[parent].needs_propagation = true;
        }
        self.invalidate_style(node);

        let own = change & CssChange::ANY_SELF;
        if own.is_empty() {
            return;
        }
        let sharing: Vec<_> = self
            .children(node)
            .iter()
            .copied()
            .filter(|&child| self.nodes[child].shares_parent_decl)
            .collect();
        for child in sharing {
            self.invalidate(child, own);
        }
    }

    /// Mark `node`, its descendants and its following siblings as needing a
    /// new style. Stops at nodes already marked.
    fn invalidate_style(&mut self, node: StyleNodeId) {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.nodes[id].style_is_invalid {
                return;
            }
            self.nodes[id].style_is_invalid = true;
            self.set_invalid(id, true);
            if let Some(first) = self.first_child(id) {
                self.invalidate_style(first);
            }
            current = self.next_sibling(id);
        }
    }

    fn set_invalid(&mut self, node: StyleNodeId, invalid: bool) {
        let mut current = node;
        loop {
            let data = &mut self.nodes[current];
            if data.invalid == invalid {
                return;
            }
            data.invalid = invalid;
            if !(invalid && data.visible) {
                return;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return,
            }
        }
    }

    /// Whether the node or a visible descendant awaits validation.
    pub fn is_invalid(&self, node: StyleNodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.invalid)
    }

    /// Changes recorded on `node` and not yet applied.
    pub fn pending_changes(&self, node: StyleNodeId) -> CssChange {
        self.nodes
            .get(node)
            .map(|n| n.pending)
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Styles
    // -----------------------------------------------------------------------

    /// The up-to-date style of `node`, recomputing what is stale.
    pub fn style(&mut self, node: StyleNodeId) -> Option<Rc<ComputedStyle>> {
        if !self.nodes.contains_key(node) {
            return None;
        }
        self.ensure_style(node, self.timestamp);
        self.nodes[node].style.clone()
    }

    /// The last computed style, without recomputing.
    pub fn cached_style(&self, node: StyleNodeId) -> Option<Rc<ComputedStyle>> {
        self.nodes.get(node).and_then(|n| n.style.clone())
    }

    /// Whether the node's style has a transition running at the current
    /// timestamp.
    pub fn is_animating(&self, node: StyleNodeId) -> bool {
        self.nodes
            .get(node)
            .and_then(|n| n.style.as_ref())
            .is_some_and(|s| s.is_animating(self.timestamp))
    }

    /// Nodes whose style changed since the last call.
    pub fn take_style_changes(&mut self) -> Vec<StyleNodeId> {
        std::mem::take(&mut self.changed)
    }

    fn needs_new_style(&self, node: StyleNodeId) -> bool {
        let data = &self.nodes[node];
        data.style_is_invalid || data.needs_propagation
    }

    fn ensure_style(&mut self, node: StyleNodeId, now: u64) {
        if !self.needs_new_style(node) {
            return;
        }
        if let Some(parent) = self.parent(node) {
            self.ensure_style(parent, now);
        }

        let mut changed = false;
        if self.nodes[node].style_is_invalid {
            if let Some(prev) = self.previous_sibling(node) {
                self.ensure_style(prev, now);
            }
            let pending = self.nodes[node].pending;
            if let Some(style) = self.update_style(node, pending, now) {
                changed = self.set_style(node, style);
            }
        }

        self.propagate_pending_changes(node, changed);

        let data = &mut self.nodes[node];
        data.pending = CssChange::empty();
        data.style_is_invalid = false;
    }

    fn set_style(&mut self, node: StyleNodeId, style: Rc<ComputedStyle>) -> bool {
        let now = self.timestamp;
        let animating = style.is_animating(now);
        let data = &mut self.nodes[node];
        let changed = match &data.style {
            None => true,
            Some(old) if Rc::ptr_eq(old, &style) => false,
            Some(old) => **old != *style || animating,
        };
        if changed {
            data.style = Some(style);
            if !self.changed.contains(&node) {
                self.changed.push(node);
            }
        }
        if animating {
            self.set_invalid(node, true);
        }
        changed
    }

    fn propagate_pending_changes(&mut self, node: StyleNodeId, style_changed: bool) {
        let mut change = self.nodes[node].pending.for_child();
        if style_changed {
            change |= CssChange::PARENT_STYLE;
        }
        if !self.nodes[node].needs_propagation && change.is_empty() {
            return;
        }

        for child in self.children(node).to_vec() {
            let child_pending = self.nodes[child].pending;
            self.invalidate(child, change);
            if self.nodes[child].visible {
                change |= child_pending.for_sibling();
            }
        }

        self.nodes[node].needs_propagation = false;
    }

    /// Compute the style `node` would get for `change` at `timestamp`,
    /// without storing it.
    ///
    /// The cascade is rerun when the change can affect selector matching.
    /// Transitions start only from an existing style, at a nonzero
    /// timestamp, with animations enabled. Transient nodes always compute
    /// at timestamp zero.
    pub fn update_style(
        &self,
        node: StyleNodeId,
        change: CssChange,
        timestamp: u64,
    ) -> Option<Rc<ComputedStyle>> {
        let data = self.nodes.get(node)?;
        let timestamp = match data.kind {
            NodeKind::Transient => 0,
            NodeKind::Normal => timestamp,
        };
        let previous = data.style.as_ref();

        let recreate = previous.map_or(true, |style| {
            change.intersects(CssChange::RADICAL) || style.change().intersects(change)
        });

        let style = match previous {
            Some(prev) if !recreate && !change.contains(CssChange::ANIMATIONS) => {
                if prev.has_transitions() && change.contains(CssChange::TIMESTAMP) {
                    Rc::new(prev.advance(timestamp))
                } else {
                    Rc::clone(prev)
                }
            }
            _ => {
                let (values, static_change) = match previous {
                    Some(prev) if !recreate => (prev.values().clone(), prev.change()),
                    _ => (self.compute_values(node), self.cascade.change()),
                };
                let animate = timestamp != 0
                    && !change.contains(CssChange::ANIMATIONS)
                    && self.settings.animations_enabled
                    && values.transition_duration.unwrap_or(0) > 0;
                trace!(message = "style.update", ?node, ?change, recreate, animate);
                match previous {
                    Some(prev) if animate => Rc::new(ComputedStyle::with_transitions(
                        values,
                        static_change,
                        prev,
                        timestamp,
                    )),
                    _ => Rc::new(ComputedStyle::new(values, static_change)),
                }
            }
        };
        Some(style)
    }

    fn compute_values(&self, node: StyleNodeId) -> Styles {
        let path = self.create_widget_path(node);
        let cascaded = self.cascade.compute(&path);
        match self.parent(node).and_then(|p| self.nodes[p].style.as_ref()) {
            Some(parent) => cascaded.inherit_from(parent.values()),
            None => cascaded,
        }
    }

    /// Bring every visible tree up to date at frame time `now`.
    pub fn validate(&mut self, now: u64) {
        self.timestamp = now;
        for root in self.roots() {
            if !self.nodes[root].visible || !self.nodes[root].invalid {
                continue;
            }
            debug!(message = "style.validate", ?root, now);
            self.invalidate_timestamp(root);
            self.validate_internal(root, now);
        }
    }

    fn invalidate_timestamp(&mut self, node: StyleNodeId) {
        if !self.nodes[node].invalid {
            return;
        }
        let animated = self.nodes[node]
            .style
            .as_ref()
            .is_some_and(|s| s.has_transitions());
        if animated {
            self.invalidate(node, CssChange::TIMESTAMP);
        }
        for child in self.children(node).to_vec() {
            self.invalidate_timestamp(child);
        }
    }

    fn validate_internal(&mut self, node: StyleNodeId, now: u64) {
        if !self.nodes[node].invalid {
            return;
        }
        self.ensure_style(node, now);

        self.set_invalid(node, false);
        let animating = self.nodes[node]
            .style
            .as_ref()
            .is_some_and(|s| s.is_animating(now));
        if animating {
            self.set_invalid(node, true);
        }

        for child in self.children(node).to_vec() {
            if self.nodes[child].visible {
                self.validate_internal(child, now);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Widget paths
    // -----------------------------------------------------------------------

    /// The selector chain from the root down to `node`.
    ///
    /// A transient node reports its parent's path.
    pub fn widget_path(&self, node: StyleNodeId) -> WidgetPath {
        let Some(data) = self.nodes.get(node) else {
            return WidgetPath::new();
        };
        let mut path = match self.parent(node) {
            Some(parent) => self.widget_path(parent),
            None => WidgetPath::new(),
        };
        if data.kind == NodeKind::Normal {
            path.append_positioned(
                Rc::clone(self.effective_decl(node)),
                self.is_first_child(node),
                self.is_last_child(node),
            );
        }
        path
    }

    /// The path styles are matched against. A transient node adds its own
    /// element once one of its setters gave it a declaration of its own.
    pub fn create_widget_path(&self, node: StyleNodeId) -> WidgetPath {
        let Some(data) = self.nodes.get(node) else {
            return WidgetPath::new();
        };
        let parent = self.parent(node);
        let mut path = match parent {
            Some(parent) => self.create_widget_path(parent),
            None => WidgetPath::new(),
        };
        let shared = data.kind == NodeKind::Transient && data.shares_parent_decl;
        let own = parent.is_none() || !shared;
        if own {
            path.append_positioned(
                Rc::clone(self.effective_decl(node)),
                self.is_first_child(node),
                self.is_last_child(node),
            );
        }
        path
    }

    /// Indented dump of the subtree at `node`. Hidden nodes are bracketed.
    pub fn print(&self, node: StyleNodeId) -> String {
        let mut out = String::new();
        self.print_node(node, 0, &mut out);
        out
    }

    fn print_node(&self, node: StyleNodeId, indent: usize, out: &mut String) {
        let Some(data) = self.nodes.get(node) else {
            return;
        };
        let _ = write!(out, "{:indent$}", "");
        let decl = self.effective_decl(node);
        if data.visible {
            let _ = writeln!(out, "{decl}");
        } else {
            let _ = writeln!(out, "[{decl}]");
        }
        for &child in self.children(node) {
            self.print_node(child, indent + 2, out);
        }
    }
}

impl Default for StyleTree {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::length::Length;
    use crate::style::cascade::PRIORITY_APPLICATION;
    use pretty_assertions::assert_eq;

    fn decl(name: &str) -> NodeDeclaration {
        NodeDeclaration::new(format!("Ctk{name}")).with_name(name)
    }

    /// ```text
    ///     window#main
    ///      /       \
    ///   label     button.flat
    /// ```
    fn build_tree() -> (StyleTree, StyleNodeId, StyleNodeId, StyleNodeId) {
        let mut tree = StyleTree::new();
        let window = tree.create_node(decl("window").with_id("main"));
        let label = tree.create_node(decl("label"));
        let button = tree.create_node(decl("button").with_class("flat"));
        tree.set_parent(label, Some(window));
        tree.set_parent(button, Some(window));
        (tree, window, label, button)
    }

    fn color(tree: &mut StyleTree, node: StyleNodeId) -> Option<String> {
        tree.style(node).and_then(|s| s.values().color.clone())
    }

    // ── Structure ────────────────────────────────────────────────────

    #[test]
    fn structure_and_siblings() {
        let (tree, window, label, button) = build_tree();
        assert_eq!(tree.children(window), &[label, button]);
        assert_eq!(tree.parent(label), Some(window));
        assert_eq!(tree.next_sibling(label), Some(button));
        assert_eq!(tree.previous_sibling(button), Some(label));
        assert_eq!(tree.roots(), vec![window]);
        assert_eq!(tree.kind(label), Some(NodeKind::Normal));
    }

    #[test]
    fn insert_after_and_before() {
        let (mut tree, window, label, button) = build_tree();
        let image = tree.create_node(decl("image"));
        tree.insert_after(window, image, None);
        assert_eq!(tree.children(window), &[image, label, button]);
        tree.insert_before(window, image, None);
        assert_eq!(tree.children(window), &[label, button, image]);
        tree.insert_before(window, image, Some(button));
        assert_eq!(tree.children(window), &[label, image, button]);
        tree.insert_after(window, label, Some(button));
        assert_eq!(tree.children(window), &[image, button, label]);
    }

    #[test]
    fn destroyed_parent_is_ignored() {
        let (mut tree, window, label, button) = build_tree();
        let image = tree.create_node(decl("image"));
        tree.destroy_node(label);
        tree.set_parent(image, Some(label));
        tree.insert_after(label, image, None);
        tree.insert_before(label, button, None);
        assert_eq!(tree.parent(image), None);
        assert_eq!(tree.parent(button), Some(window));
        assert_eq!(tree.children(window), &[button]);
    }

    #[test]
    fn destroy_leaf() {
        let (mut tree, window, label, button) = build_tree();
        tree.destroy_node(label);
        assert!(!tree.contains(label));
        assert_eq!(tree.children(window), &[button]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    #[should_panic(expected = "has children")]
    fn destroy_with_children_panics() {
        let (mut tree, window, _, _) = build_tree();
        tree.destroy_node(window);
    }

    #[test]
    fn print_marks_hidden_nodes() {
        let (mut tree, window, label, _) = build_tree();
        tree.set_visible(label, false);
        tree.set_state(window, StateFlags::BACKDROP);
        insta::assert_snapshot!(tree.print(window).trim_end(), @r"
        window#main:backdrop
          [label]
          button.flat
        ");
    }

    // ── Widget paths ─────────────────────────────────────────────────

    #[test]
    fn widget_path_positions() {
        let (tree, _, label, button) = build_tree();
        let path = tree.widget_path(button);
        assert_eq!(path.len(), 2);
        let leaf = path.leaf().unwrap();
        assert!(!leaf.is_first_child());
        assert!(leaf.is_last_child());
        assert!(tree.widget_path(label).leaf().unwrap().is_first_child());
        insta::assert_snapshot!(path.to_string(), @"window(main) button.flat");
    }

    #[test]
    fn hidden_siblings_do_not_count_for_position() {
        let (mut tree, _, label, button) = build_tree();
        tree.set_visible(label, false);
        assert!(tree.widget_path(button).leaf().unwrap().is_first_child());
    }

    #[test]
    fn transient_node_reports_parent_path() {
        let (mut tree, _, _, button) = build_tree();
        let transient = tree.create_transient_node(button);
        assert_eq!(tree.kind(transient), Some(NodeKind::Transient));
        assert!(!tree.is_visible(transient));
        assert_eq!(tree.widget_path(transient), tree.widget_path(button));
        assert_eq!(tree.create_widget_path(transient), tree.create_widget_path(button));
    }

    #[test]
    fn transient_detaches_on_own_change() {
        let (mut tree, _, _, button) = build_tree();
        let transient = tree.create_transient_node(button);
        tree.add_class(transient, "arrow");
        assert!(tree.declaration(transient).unwrap().has_class("arrow"));
        assert!(!tree.declaration(button).unwrap().has_class("arrow"));
        assert_eq!(tree.create_widget_path(transient).len(), 3);
        assert_eq!(tree.widget_path(transient).len(), 2);
    }

    #[test]
    fn transient_follows_parent_changes() {
        let (mut tree, _, _, button) = build_tree();
        tree.add_provider_from_str("button:hover { background-color: red; }", PRIORITY_APPLICATION)
            .unwrap();
        let transient = tree.create_transient_node(button);
        assert_eq!(tree.style(transient).unwrap().values().background_color, None);

        tree.set_state(button, StateFlags::PRELIGHT);
        assert_eq!(tree.state(transient), StateFlags::PRELIGHT);
        assert_eq!(tree.create_widget_path(transient), tree.create_widget_path(button));
        assert_eq!(
            tree.style(transient).unwrap().values().background_color.as_deref(),
            Some("red")
        );

        // Once detached, parent changes no longer leak in.
        tree.add_class(transient, "arrow");
        tree.set_state(button, StateFlags::empty());
        assert_eq!(tree.state(transient), StateFlags::PRELIGHT);
        assert_eq!(tree.create_widget_path(transient).len(), 3);
    }

    #[test]
    #[should_panic(expected = "parent does not exist")]
    fn transient_needs_parent() {
        let (mut tree, _, label, _) = build_tree();
        tree.destroy_node(label);
        tree.create_transient_node(label);
    }

    // ── Cascade ──────────────────────────────────────────────────────

    #[test]
    fn style_from_provider_with_inheritance() {
        let (mut tree, window, label, button) = build_tree();
        tree.add_provider_from_str("window { color: black; } .flat { color: blue; }", PRIORITY_APPLICATION)
            .unwrap();
        assert_eq!(color(&mut tree, window), Some("black".into()));
        assert_eq!(color(&mut tree, label), Some("black".into()));
        assert_eq!(color(&mut tree, button), Some("blue".into()));
    }

    #[test]
    fn class_change_restyles() {
        let (mut tree, _, label, _) = build_tree();
        tree.add_provider_from_str(".title { color: red; }", PRIORITY_APPLICATION).unwrap();
        assert_eq!(color(&mut tree, label), None);
        tree.add_class(label, "title");
        assert_eq!(tree.pending_changes(label), CssChange::CLASS);
        assert_eq!(color(&mut tree, label), Some("red".into()));
        tree.remove_class(label, "title");
        assert_eq!(color(&mut tree, label), None);
    }

    #[test]
    fn state_change_reaches_descendant_selectors() {
        let (mut tree, window, label, _) = build_tree();
        tree.add_provider_from_str("window:backdrop label { color: gray; }", PRIORITY_APPLICATION)
            .unwrap();
        assert_eq!(color(&mut tree, label), None);
        tree.set_state(window, StateFlags::BACKDROP);
        assert_eq!(color(&mut tree, label), Some("gray".into()));
    }

    #[test]
    fn position_change_restyles_siblings() {
        let (mut tree, _, label, button) = build_tree();
        tree.add_provider_from_str("*:first-child { background-color: red; }", PRIORITY_APPLICATION)
            .unwrap();
        let background = |tree: &mut StyleTree, node| {
            tree.style(node).and_then(|s| s.values().background_color.clone())
        };
        assert_eq!(background(&mut tree, label), Some("red".into()));
        assert_eq!(background(&mut tree, button), None);
        tree.set_visible(label, false);
        assert_eq!(background(&mut tree, button), Some("red".into()));
    }

    #[test]
    fn removing_provider_restyles() {
        let (mut tree, window, _, _) = build_tree();
        let id = tree
            .add_provider_from_str("#main { color: red; }", PRIORITY_APPLICATION)
            .unwrap();
        assert_eq!(color(&mut tree, window), Some("red".into()));
        assert!(tree.remove_provider(id));
        assert_eq!(color(&mut tree, window), None);
        assert!(!tree.remove_provider(id));
    }

    #[test]
    fn set_declaration_diffs_fields() {
        let (mut tree, _, label, _) = build_tree();
        tree.validate(0);
        tree.set_declaration(label, decl("label").with_id("x"));
        assert_eq!(tree.pending_changes(label), CssChange::ID);
        tree.validate(0);
        tree.set_declaration(label, decl("label").with_id("x"));
        assert_eq!(tree.pending_changes(label), CssChange::empty());
    }

    // ── Validation and change reporting ──────────────────────────────

    #[test]
    fn validate_clears_invalid_flags() {
        let (mut tree, window, label, button) = build_tree();
        assert!(tree.is_invalid(window));
        tree.validate(16);
        for node in [window, label, button] {
            assert!(!tree.is_invalid(node));
            assert!(tree.cached_style(node).is_some());
        }
        assert_eq!(tree.timestamp(), 16);
    }

    #[test]
    fn take_style_changes_reports_restyled_nodes() {
        let (mut tree, _, label, button) = build_tree();
        tree.add_provider_from_str(".title { color: red; }", PRIORITY_APPLICATION).unwrap();
        tree.validate(0);
        assert_eq!(tree.take_style_changes().len(), 3);

        tree.add_class(label, "title");
        tree.validate(0);
        assert_eq!(tree.take_style_changes(), vec![label]);
        assert!(tree.take_style_changes().is_empty());
        assert!(!tree.is_invalid(button));
    }

    #[test]
    fn invalidation_stops_at_hidden_node() {
        let (mut tree, window, _, button) = build_tree();
        tree.validate(0);
        tree.set_visible(button, false);
        tree.validate(0);
        assert!(!tree.is_invalid(window));
        tree.add_class(button, "x");
        assert!(tree.is_invalid(button));
        assert!(!tree.is_invalid(window));
    }

    // ── Transitions ──────────────────────────────────────────────────

    fn animated_tree(settings: Settings) -> (StyleTree, StyleNodeId) {
        let mut tree = StyleTree::with_settings(settings);
        tree.add_provider_from_str(
            "button { opacity: 0; transition: opacity 100ms; } button:hover { opacity: 1; }",
            PRIORITY_APPLICATION,
        )
        .unwrap();
        let button = tree.create_node(decl("button"));
        tree.validate(1000);
        (tree, button)
    }

    #[test]
    fn state_change_starts_transition() {
        let (mut tree, button) = animated_tree(Settings::default());
        tree.set_state(button, StateFlags::PRELIGHT);
        tree.validate(2000);
        assert!(tree.is_animating(button));
        assert!(tree.is_invalid(button));
        let style = tree.cached_style(button).unwrap();
        assert_eq!(style.value_at("opacity", 2050), Some(0.5));

        tree.validate(2100);
        assert!(!tree.is_animating(button));
        assert!(!tree.is_invalid(button));
        let style = tree.cached_style(button).unwrap();
        assert!(!style.has_transitions());
        assert_eq!(style.values().opacity, Some(1.0));
    }

    #[test]
    fn disabled_animations_skip_transitions() {
        let (mut tree, button) = animated_tree(Settings::default().with_animations(false));
        tree.set_state(button, StateFlags::PRELIGHT);
        tree.validate(2000);
        assert!(!tree.is_animating(button));
    }

    #[test]
    fn transient_node_never_animates() {
        let (mut tree, button) = animated_tree(Settings::default());
        let transient = tree.create_transient_node(button);
        tree.style(transient);
        tree.set_state(transient, StateFlags::PRELIGHT);
        tree.set_state(button, StateFlags::PRELIGHT);
        tree.validate(2000);
        assert!(tree.is_animating(button));
        let style = tree.style(transient).unwrap();
        assert!(!style.has_transitions());
    }

    #[test]
    fn inherited_font_size() {
        let (mut tree, window, label, _) = build_tree();
        tree.add_provider_from_str("window { font-size: 12px; }", PRIORITY_APPLICATION)
            .unwrap();
        let style = tree.style(label).unwrap();
        assert_eq!(style.values().font_size, Some(Length::px(12.0)));
        assert!(tree.style(window).is_some());
    }
}
