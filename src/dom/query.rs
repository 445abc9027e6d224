//! Widget queries: by name, by type, by predicate.

use super::node::{WidgetData, WidgetId};
use super::tree::Dom;

impl Dom {
    /// Find the first widget whose name matches.
    ///
    /// Iterates all widgets in the arena, including detached toplevels.
    pub fn query_by_name(&self, name: &str) -> Option<WidgetId> {
        self.nodes
            .iter()
            .find(|(_, data)| data.name.as_deref() == Some(name))
            .map(|(id, _)| id)
    }

    /// Find all widgets of the given type.
    pub fn query_by_type(&self, widget_type: &str) -> Vec<WidgetId> {
        self.query_all(|data| data.widget_type == widget_type)
    }

    /// Find all widgets matching an arbitrary predicate.
    ///
    /// Results follow slotmap order, which is deterministic but not tree order.
    pub fn query_all(&self, predicate: impl Fn(&WidgetData) -> bool) -> Vec<WidgetId> {
        self.nodes
            .iter()
            .filter(|(_, data)| predicate(data))
            .map(|(id, _)| id)
            .collect()
    }
}
