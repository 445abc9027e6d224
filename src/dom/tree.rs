//! Tree operations: insert, remove, reparent, walk.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::node::{WidgetData, WidgetId};

/// Empty slice constant for returning when a widget has no children.
const EMPTY_CHILDREN: &[WidgetId] = &[];

/// The widget tree, backed by a slotmap arena.
///
/// All widgets live in a single `SlotMap`. Parent/child relationships are
/// stored in secondary maps so that removal is O(subtree size) and lookup is
/// O(1). Parentless widgets are toplevels, kept in creation order.
pub struct Dom {
    pub(crate) nodes: SlotMap<WidgetId, WidgetData>,
    children: SecondaryMap<WidgetId, Vec<WidgetId>>,
    parent: SecondaryMap<WidgetId, WidgetId>,
    toplevels: Vec<WidgetId>,
}

impl Dom {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            toplevels: Vec::new(),
        }
    }

    /// Insert a toplevel widget (no parent).
    pub fn insert(&mut self, data: WidgetData) -> WidgetId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        self.toplevels.push(id);
        id
    }

    /// Insert a widget as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: WidgetId, data: WidgetData) -> WidgetId {
        debug_assert!(
            self.nodes.contains_key(parent),
            "parent widget does not exist"
        );
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(id);
        }
        id
    }

    /// Remove a widget and all its descendants.
    ///
    /// Returns the `WidgetData` for the removed widget, or `None` if it didn't exist.
    pub fn remove(&mut self, id: WidgetId) -> Option<WidgetData> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        self.detach(id);

        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        let mut removed_data = None;

        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                to_remove.extend(kids);
            }
            self.parent.remove(current);
            let data = self.nodes.remove(current);
            if current == id {
                removed_data = data;
            }
        }

        removed_data
    }

    /// Move `node` to become the last child of `new_parent`.
    ///
    /// The widget keeps its subtree intact.
    ///
    /// # Panics
    ///
    /// Panics (debug) if either widget does not exist, or if `new_parent`
    /// lies inside the subtree of `node`.
    pub fn reparent(&mut self, node: WidgetId, new_parent: WidgetId) {
        debug_assert!(self.nodes.contains_key(node), "widget does not exist");
        debug_assert!(
            self.nodes.contains_key(new_parent),
            "new_parent does not exist"
        );
        debug_assert!(
            node != new_parent && !self.is_ancestor(node, new_parent),
            "cannot reparent a widget into its own subtree"
        );

        self.detach(node);
        self.parent.insert(node, new_parent);
        if let Some(siblings) = self.children.get_mut(new_parent) {
            siblings.push(node);
        }
    }

    fn detach(&mut self, node: WidgetId) {
        match self.parent.remove(node) {
            Some(old_parent) => {
                if let Some(siblings) = self.children.get_mut(old_parent) {
                    siblings.retain(|&child| child != node);
                }
            }
            None => self.toplevels.retain(|&top| top != node),
        }
    }

    /// Get the parent of a widget, if it has one.
    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a widget. Returns an empty slice if the widget has
    /// no children or does not exist.
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to its toplevel, collecting ancestor ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the toplevel.
    pub fn ancestors(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            if p == ancestor {
                return true;
            }
            current = p;
        }
        false
    }

    /// Parentless widgets, in creation order.
    pub fn toplevels(&self) -> &[WidgetId] {
        &self.toplevels
    }

    /// Immutable access to a widget's data.
    pub fn get(&self, id: WidgetId) -> Option<&WidgetData> {
        self.nodes.get(id)
    }

    /// Mutable access to a widget's data.
    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut WidgetData> {
        self.nodes.get_mut(id)
    }

    /// Show or hide a widget. No-op for unknown ids.
    pub fn set_visible(&mut self, id: WidgetId, visible: bool) {
        if let Some(data) = self.nodes.get_mut(id) {
            data.visible = visible;
        }
    }

    /// Make a widget (in)sensitive. No-op for unknown ids.
    pub fn set_sensitive(&mut self, id: WidgetId, sensitive: bool) {
        if let Some(data) = self.nodes.get_mut(id) {
            data.sensitive = sensitive;
        }
    }

    /// Number of widgets in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the tree contains a widget with the given id.
    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: WidgetId) -> Vec<WidgetId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Reverse so the first child is visited first.
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Post-order traversal starting from `start`: children before parents.
    pub fn walk_post_order(&self, start: WidgetId) -> Vec<WidgetId> {
        let mut result = Vec::new();
        if !self.nodes.contains_key(start) {
            return result;
        }
        let mut stack = vec![(start, false)];
        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                result.push(current);
                continue;
            }
            stack.push((current, true));
            for &child in self.children(current).iter().rev() {
                stack.push((child, false));
            }
        }
        result
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a small test tree:
    /// ```text
    ///      window
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (Dom, WidgetId, WidgetId, WidgetId, WidgetId, WidgetId) {
        let mut dom = Dom::new();
        let root = dom.insert(WidgetData::new("window").with_name("root"));
        let a = dom.insert_child(root, WidgetData::new("box").with_name("a"));
        let b = dom.insert_child(root, WidgetData::new("box").with_name("b"));
        let c = dom.insert_child(a, WidgetData::new("button").with_name("c"));
        let d = dom.insert_child(a, WidgetData::new("label").with_name("d"));
        (dom, root, a, b, c, d)
    }

    #[test]
    fn insert_registers_toplevel() {
        let mut dom = Dom::new();
        let first = dom.insert(WidgetData::new("window"));
        let second = dom.insert(WidgetData::new("window"));
        assert_eq!(dom.toplevels(), &[first, second]);
    }

    #[test]
    fn insert_child_parent_relationship() {
        let (dom, root, a, _b, c, _d) = build_tree();
        assert_eq!(dom.parent(a), Some(root));
        assert_eq!(dom.parent(c), Some(a));
        assert_eq!(dom.parent(root), None);
        assert_eq!(dom.toplevels(), &[root]);
    }

    #[test]
    fn children_list() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.children(root), &[a, b]);
        assert_eq!(dom.children(a), &[c, d]);
        assert!(dom.children(c).is_empty());
    }

    #[test]
    fn ancestors() {
        let (dom, root, a, _b, c, _d) = build_tree();
        assert_eq!(dom.ancestors(c), vec![a, root]);
        assert_eq!(dom.ancestors(a), vec![root]);
        assert!(dom.ancestors(root).is_empty());
    }

    #[test]
    fn is_ancestor() {
        let (dom, root, a, b, c, _d) = build_tree();
        assert!(dom.is_ancestor(root, c));
        assert!(dom.is_ancestor(a, c));
        assert!(!dom.is_ancestor(b, c));
        assert!(!dom.is_ancestor(c, c));
    }

    #[test]
    fn get_and_get_mut() {
        let (mut dom, _root, a, ..) = build_tree();
        assert_eq!(dom.get(a).unwrap().widget_type, "box");
        dom.get_mut(a).unwrap().widget_type = "grid".to_string();
        assert_eq!(dom.get(a).unwrap().widget_type, "grid");
    }

    #[test]
    fn visibility_and_sensitivity() {
        let (mut dom, _root, a, ..) = build_tree();
        dom.set_visible(a, false);
        dom.set_sensitive(a, false);
        let data = dom.get(a).unwrap();
        assert!(!data.visible);
        assert!(!data.sensitive);
    }

    #[test]
    fn len_and_is_empty() {
        let (dom, ..) = build_tree();
        assert_eq!(dom.len(), 5);
        assert!(!dom.is_empty());
        assert!(Dom::new().is_empty());
    }

    #[test]
    fn remove_leaf() {
        let (mut dom, _root, a, _b, c, d) = build_tree();
        let removed = dom.remove(c);
        assert_eq!(removed.unwrap().widget_type, "button");
        assert!(!dom.contains(c));
        assert_eq!(dom.children(a), &[d]);
        assert_eq!(dom.len(), 4);
    }

    #[test]
    fn remove_subtree() {
        let (mut dom, root, a, b, c, d) = build_tree();
        dom.remove(a);
        assert!(!dom.contains(a));
        assert!(!dom.contains(c));
        assert!(!dom.contains(d));
        assert!(dom.contains(b));
        assert_eq!(dom.children(root), &[b]);
        assert_eq!(dom.len(), 2);
    }

    #[test]
    fn remove_toplevel() {
        let (mut dom, root, ..) = build_tree();
        dom.remove(root);
        assert!(dom.is_empty());
        assert!(dom.toplevels().is_empty());
    }

    #[test]
    fn remove_nonexistent() {
        let mut dom = Dom::new();
        let id = dom.insert(WidgetData::new("window"));
        dom.remove(id);
        assert!(dom.remove(id).is_none());
    }

    #[test]
    fn reparent() {
        let (mut dom, root, a, b, c, _d) = build_tree();
        dom.reparent(c, b);
        assert_eq!(dom.parent(c), Some(b));
        assert!(!dom.children(a).contains(&c));
        assert_eq!(dom.ancestors(c), vec![b, root]);
    }

    #[test]
    fn reparent_toplevel_leaves_toplevel_list() {
        let (mut dom, root, ..) = build_tree();
        let popup = dom.insert(WidgetData::new("window"));
        dom.reparent(popup, root);
        assert_eq!(dom.toplevels(), &[root]);
    }

    #[test]
    fn walk_depth_first() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.walk_depth_first(root), vec![root, a, c, d, b]);
        assert_eq!(dom.walk_depth_first(a), vec![a, c, d]);
    }

    #[test]
    fn walk_post_order() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.walk_post_order(root), vec![c, d, a, b, root]);
    }

    #[test]
    fn walk_post_order_stale_start() {
        let (mut dom, _root, a, ..) = build_tree();
        dom.remove(a);
        assert!(dom.walk_post_order(a).is_empty());
    }

    #[test]
    fn default_impl() {
        let dom = Dom::default();
        assert!(dom.is_empty());
        assert!(dom.toplevels().is_empty());
    }
}
