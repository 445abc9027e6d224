//! Style nodes: declarations, change tracking, widget paths and the
//! incrementally restyled node tree.

pub mod cascade;
pub mod change;
pub mod computed;
pub mod declaration;
pub mod path;
pub mod state;
pub mod tree;

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a node of a [`StyleTree`].
    pub struct StyleNodeId;
}

pub use cascade::{
    ProviderId, StyleCascade, StyleError, PRIORITY_APPLICATION, PRIORITY_FALLBACK,
    PRIORITY_SETTINGS, PRIORITY_THEME, PRIORITY_USER,
};
pub use change::CssChange;
pub use computed::{ComputedStyle, Transition};
pub use declaration::NodeDeclaration;
pub use path::{PathElement, WidgetPath};
pub use state::StateFlags;
pub use tree::{NodeKind, StyleTree};
