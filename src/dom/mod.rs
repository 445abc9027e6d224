//! Widget tree: slotmap-backed arena plus the capability trait the
//! dispatcher walks.

pub mod access;
pub mod node;
pub mod query;
pub mod tree;

pub use access::WidgetTree;
pub use node::{WidgetData, WidgetId};
pub use tree::Dom;
