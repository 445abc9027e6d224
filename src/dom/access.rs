//! The capability interface the dispatcher consumes from a widget layer.

use super::node::WidgetId;
use super::tree::Dom;
use crate::style::StyleNodeId;

/// Read-only view of a widget hierarchy.
///
/// The gesture engine only walks the tree and asks about liveness, visibility
/// and sensitivity. It never mutates it; callbacks that destroy widgets do so
/// through [`Dispatcher::tree_mut`](crate::dispatch::Dispatcher::tree_mut).
pub trait WidgetTree {
    /// Parent of `widget`, `None` for toplevels and stale ids.
    fn parent(&self, widget: WidgetId) -> Option<WidgetId>;

    /// Ordered children of `widget`.
    fn children(&self, widget: WidgetId) -> Vec<WidgetId>;

    /// Whether `widget` is still alive.
    fn contains(&self, widget: WidgetId) -> bool;

    /// Whether `widget` is shown.
    fn is_visible(&self, widget: WidgetId) -> bool;

    /// Whether `widget` accepts input.
    fn is_sensitive(&self, widget: WidgetId) -> bool;

    /// Parentless widgets, in creation order.
    fn toplevels(&self) -> Vec<WidgetId>;

    /// The style node mirroring `widget`.
    fn style_node(&self, widget: WidgetId) -> Option<StyleNodeId>;

    /// Widget name for diagnostics.
    fn name(&self, widget: WidgetId) -> Option<&str>;

    /// Whether `ancestor` is `widget` itself or one of its ancestors.
    fn is_inside(&self, widget: WidgetId, ancestor: WidgetId) -> bool {
        let mut current = Some(widget);
        while let Some(w) = current {
            if w == ancestor {
                return true;
            }
            current = self.parent(w);
        }
        false
    }

    /// `[widget, parent, ..., toplevel]`, empty for stale ids.
    fn path_to_root(&self, widget: WidgetId) -> Vec<WidgetId> {
        if !self.contains(widget) {
            return Vec::new();
        }
        let mut path = vec![widget];
        let mut current = widget;
        while let Some(p) = self.parent(current) {
            path.push(p);
            current = p;
        }
        path
    }

    /// Post-order traversal of every toplevel: children before parents.
    fn post_order(&self) -> Vec<WidgetId> {
        fn visit<T: WidgetTree + ?Sized>(tree: &T, widget: WidgetId, out: &mut Vec<WidgetId>) {
            for child in tree.children(widget) {
                visit(tree, child, out);
            }
            out.push(widget);
        }

        let mut out = Vec::new();
        for top in self.toplevels() {
            visit(self, top, &mut out);
        }
        out
    }
}

impl WidgetTree for Dom {
    fn parent(&self, widget: WidgetId) -> Option<WidgetId> {
        Dom::parent(self, widget)
    }

    fn children(&self, widget: WidgetId) -> Vec<WidgetId> {
        Dom::children(self, widget).to_vec()
    }

    fn contains(&self, widget: WidgetId) -> bool {
        Dom::contains(self, widget)
    }

    fn is_visible(&self, widget: WidgetId) -> bool {
        self.get(widget).is_some_and(|data| data.visible)
    }

    fn is_sensitive(&self, widget: WidgetId) -> bool {
        self.get(widget).is_some_and(|data| data.sensitive)
    }

    fn toplevels(&self) -> Vec<WidgetId> {
        Dom::toplevels(self).to_vec()
    }

    fn style_node(&self, widget: WidgetId) -> Option<StyleNodeId> {
        self.get(widget).and_then(|data| data.style_node)
    }

    fn name(&self, widget: WidgetId) -> Option<&str> {
        self.get(widget).and_then(|data| data.name.as_deref())
    }
}
