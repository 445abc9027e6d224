//! A shared, comma-separated event log.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Log shared between a test and the handlers it connects.
///
/// Entries are joined with `", "`, so a whole interaction can be compared
/// against one string.
#[derive(Clone, Default)]
pub struct Trace(Rc<RefCell<String>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry.
    pub fn push(&self, entry: impl AsRef<str>) {
        let mut log = self.0.borrow_mut();
        if !log.is_empty() {
            log.push_str(", ");
        }
        log.push_str(entry.as_ref());
    }

    /// The log so far, leaving it untouched.
    pub fn contents(&self) -> String {
        self.0.borrow().clone()
    }

    /// Return the log and start a new one.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

impl fmt::Debug for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Trace").field(&*self.0.borrow()).finish()
    }
}
