//! Node declarations: the selector-relevant facts about one style node.
//!
//! Declarations are immutable once shared. Every setter takes the owning
//! `Rc` and copies the declaration first if anyone else holds it, so a
//! transient node that borrowed its parent's declaration detaches on its
//! first own change.

use std::fmt;
use std::rc::Rc;

use super::state::StateFlags;

/// Type, name, id, state and classes of a style node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodeDeclaration {
    widget_type: String,
    name: Option<String>,
    id: Option<String>,
    state: StateFlags,
    /// Kept sorted and deduplicated.
    classes: Vec<String>,
}

impl NodeDeclaration {
    /// A declaration for a node of `widget_type`.
    pub fn new(widget_type: impl Into<String>) -> Self {
        Self {
            widget_type: widget_type.into(),
            ..Self::default()
        }
    }

    /// Set the element name (builder).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the state (builder).
    pub fn with_state(mut self, state: StateFlags) -> Self {
        self.state = state;
        self
    }

    /// Add a class (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.insert_class(class.into());
        self
    }

    fn insert_class(&mut self, class: String) -> bool {
        match self.classes.binary_search(&class) {
            Ok(_) => false,
            Err(pos) => {
                self.classes.insert(pos, class);
                true
            }
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn widget_type(&self) -> &str {
        &self.widget_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The name if set, the widget type otherwise.
    pub fn element_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.widget_type)
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn state(&self) -> StateFlags {
        self.state
    }

    /// Classes in sorted order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(class))
            .is_ok()
    }

    // -----------------------------------------------------------------------
    // Copy-on-write setters
    // -----------------------------------------------------------------------

    /// Set the widget type. Returns whether the declaration changed.
    pub fn set_widget_type(decl: &mut Rc<Self>, widget_type: &str) -> bool {
        if decl.widget_type == widget_type {
            return false;
        }
        Rc::make_mut(decl).widget_type = widget_type.to_string();
        true
    }

    /// Set or clear the element name.
    pub fn set_name(decl: &mut Rc<Self>, name: Option<&str>) -> bool {
        if decl.name.as_deref() == name {
            return false;
        }
        Rc::make_mut(decl).name = name.map(str::to_string);
        true
    }

    /// Set or clear the id.
    pub fn set_id(decl: &mut Rc<Self>, id: Option<&str>) -> bool {
        if decl.id.as_deref() == id {
            return false;
        }
        Rc::make_mut(decl).id = id.map(str::to_string);
        true
    }

    pub fn set_state(decl: &mut Rc<Self>, state: StateFlags) -> bool {
        if decl.state == state {
            return false;
        }
        Rc::make_mut(decl).state = state;
        true
    }

    pub fn add_class(decl: &mut Rc<Self>, class: &str) -> bool {
        if decl.has_class(class) {
            return false;
        }
        Rc::make_mut(decl).insert_class(class.to_string())
    }

    pub fn remove_class(decl: &mut Rc<Self>, class: &str) -> bool {
        let Ok(pos) = decl.classes.binary_search_by(|c| c.as_str().cmp(class)) else {
            return false;
        };
        Rc::make_mut(decl).classes.remove(pos);
        true
    }

    pub fn clear_classes(decl: &mut Rc<Self>) -> bool {
        if decl.classes.is_empty() {
            return false;
        }
        Rc::make_mut(decl).classes.clear();
        true
    }
}

/// Prints `name#id.class:pseudo`, the form used by style tree dumps.
impl fmt::Display for NodeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())?;
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        for pseudo in self.state.pseudo_classes() {
            write!(f, ":{pseudo}")?;
        }
        Ok(())
    }
}
