//! Widget types: WidgetId, WidgetData.

use slotmap::new_key_type;

use crate::style::StyleNodeId;

new_key_type! {
    /// Unique identifier for a widget. Copy, lightweight (u64).
    pub struct WidgetId;
}

/// Data associated with a single widget.
#[derive(Debug, Clone)]
pub struct WidgetData {
    /// Widget type name (e.g. "window", "box", "eventbox").
    pub widget_type: String,
    /// Optional widget name, used by `#name` lookups and trace output.
    pub name: Option<String>,
    /// Whether this widget is shown.
    pub visible: bool,
    /// Whether this widget accepts input.
    pub sensitive: bool,
    /// The style node mirroring this widget, if any.
    pub style_node: Option<StyleNodeId>,
}

impl WidgetData {
    /// Create a new `WidgetData` with the given widget type and sensible defaults.
    pub fn new(widget_type: impl Into<String>) -> Self {
        Self {
            widget_type: widget_type.into(),
            name: None,
            visible: true,
            sensitive: true,
            style_node: None,
        }
    }

    /// Set the widget name (builder).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set whether the widget is shown (builder).
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set whether the widget accepts input (builder).
    pub fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    /// Attach a style node (builder).
    pub fn with_style_node(mut self, node: StyleNodeId) -> Self {
        self.style_node = Some(node);
        self
    }

    /// The widget name, or the empty string.
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}
