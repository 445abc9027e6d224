//! Headless testing helpers: the input [`Pilot`] and the shared [`Trace`].
//!
//! Use the [`Pilot`] to drive a [`Dispatcher`](crate::dispatch::Dispatcher)
//! with simulated mouse and touch input, and assert on the [`Trace`] its
//! recognizers write.

pub mod pilot;
pub mod trace;

pub use pilot::{touch_sequence, Pilot, MAX_TOUCHES};
pub use trace::Trace;
