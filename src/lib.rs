//! # ctk-core
//!
//! The input and styling core of the CTK widget toolkit: a gesture dispatch
//! engine and the CSS style-node tree.
//!
//! Input events are routed through a widget tree in capture, target and
//! bubble phases to gesture recognizers. Recognizers track touch and pointer
//! sequences and claim or deny them, which cancels competing recognizers
//! along the widget hierarchy. The style side keeps one style node per
//! widget, matches stylesheets against node paths and recomputes styles
//! incrementally when nodes change.
//!
//! ## Core Systems
//!
//! - **[`dispatch`]**: event propagation, sequence claiming, groups and grabs
//! - **[`gesture`]**: recognizer state, the multi-press and rotate gestures
//! - **[`event`]**: input events, sequences, handler storage
//! - **[`dom`]**: slotmap-backed widget tree and the [`WidgetTree`] trait
//! - **[`style`]**: style nodes, widget paths, cascade and change tracking
//! - **[`css`]**: tokenizer, parser, selectors and specificity
//! - **[`config`]**: toolkit settings (double-click time and distance)
//! - **[`geometry`]**: points and rectangles
//! - **[`testing`]**: headless input pilot and event traces

// Foundation
pub mod config;
pub mod geometry;

// Widgets and styling
pub mod css;
pub mod dom;
pub mod style;

// Input
pub mod dispatch;
pub mod event;
pub mod gesture;

// Test support
pub mod testing;

pub use config::Settings;
pub use dispatch::Dispatcher;
pub use dom::{Dom, WidgetId, WidgetTree};
pub use event::{Event, Propagation, SequenceId};
pub use gesture::{GestureId, PropagationPhase, SequenceState};
pub use style::{StyleNodeId, StyleTree};

// Proc macros (feature-gated)
#[cfg(feature = "macros")]
pub use ctk_core_macros::css;
