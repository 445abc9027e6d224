//! Widget paths: the ordered selector chain from a root node down to one node.

use std::fmt;
use std::rc::Rc;

use super::declaration::NodeDeclaration;
use super::state::StateFlags;

/// One step of a [`WidgetPath`].
#[derive(Debug, Clone, PartialEq)]
pub struct PathElement {
    declaration: Rc<NodeDeclaration>,
    first_child: bool,
    last_child: bool,
}

impl PathElement {
    pub fn declaration(&self) -> &NodeDeclaration {
        &self.declaration
    }

    pub fn element_name(&self) -> &str {
        self.declaration.element_name()
    }

    pub fn widget_type(&self) -> &str {
        self.declaration.widget_type()
    }

    pub fn id(&self) -> Option<&str> {
        self.declaration.id()
    }

    pub fn state(&self) -> StateFlags {
        self.declaration.state()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.declaration.has_class(class)
    }

    /// First visible child of its parent.
    pub fn is_first_child(&self) -> bool {
        self.first_child
    }

    /// Last visible child of its parent.
    pub fn is_last_child(&self) -> bool {
        self.last_child
    }
}

/// Root-first chain of declarations used for selector matching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetPath {
    elements: Vec<PathElement>,
}

impl WidgetPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element that is the only child of its parent.
    pub fn append(&mut self, declaration: Rc<NodeDeclaration>) -> usize {
        self.append_positioned(declaration, true, true)
    }

    /// Append an element with explicit sibling position.
    pub fn append_positioned(
        &mut self,
        declaration: Rc<NodeDeclaration>,
        first_child: bool,
        last_child: bool,
    ) -> usize {
        self.elements.push(PathElement {
            declaration,
            first_child,
            last_child,
        });
        self.elements.len() - 1
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    /// The element the path describes (the last one).
    pub fn leaf(&self) -> Option<&PathElement> {
        self.elements.last()
    }
}

/// `name(id):state.class` per element, separated by spaces.
impl fmt::Display for WidgetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, elem) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(elem.element_name())?;
            if let Some(id) = elem.id() {
                write!(f, "({id})")?;
            }
            for nick in elem.state().nicks() {
                write!(f, ":{nick}")?;
            }
            for class in elem.declaration.classes() {
                write!(f, ".{class}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path() {
        let path = WidgetPath::new();
        assert!(path.is_empty());
        assert!(path.leaf().is_none());
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn display_elements() {
        let mut path = WidgetPath::new();
        path.append(Rc::new(NodeDeclaration::new("window").with_id("main")));
        path.append(Rc::new(
            NodeDeclaration::new("CtkButton")
                .with_name("button")
                .with_class("flat")
                .with_state(StateFlags::PRELIGHT),
        ));
        assert_eq!(path.to_string(), "window(main) button:prelight.flat");
        assert_eq!(path.leaf().unwrap().widget_type(), "CtkButton");
    }

    #[test]
    fn positions_are_recorded() {
        let mut path = WidgetPath::new();
        let idx = path.append_positioned(Rc::new(NodeDeclaration::new("row")), false, true);
        assert_eq!(idx, 0);
        assert!(!path.elements()[0].is_first_child());
        assert!(path.elements()[0].is_last_child());
    }
}
