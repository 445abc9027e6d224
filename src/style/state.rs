//! Widget state flags and their CSS pseudo-class names.

use bitflags::bitflags;

bitflags! {
    /// Interaction state of a widget, matched by state pseudo-classes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StateFlags: u32 {
        const ACTIVE = 1 << 0;
        const PRELIGHT = 1 << 1;
        const SELECTED = 1 << 2;
        const INSENSITIVE = 1 << 3;
        const INCONSISTENT = 1 << 4;
        const FOCUSED = 1 << 5;
        const BACKDROP = 1 << 6;
        const DIR_LTR = 1 << 7;
        const DIR_RTL = 1 << 8;
        const LINK = 1 << 9;
        const VISITED = 1 << 10;
        const CHECKED = 1 << 11;
        const DROP_ACTIVE = 1 << 12;
    }
}

/// `(flag, nick, pseudo-class)` in bit order.
const STATE_NAMES: [(StateFlags, &str, &str); 13] = [
    (StateFlags::ACTIVE, "active", "active"),
    (StateFlags::PRELIGHT, "prelight", "hover"),
    (StateFlags::SELECTED, "selected", "selected"),
    (StateFlags::INSENSITIVE, "insensitive", "disabled"),
    (StateFlags::INCONSISTENT, "inconsistent", "indeterminate"),
    (StateFlags::FOCUSED, "focused", "focus"),
    (StateFlags::BACKDROP, "backdrop", "backdrop"),
    (StateFlags::DIR_LTR, "dir-ltr", "dir(ltr)"),
    (StateFlags::DIR_RTL, "dir-rtl", "dir(rtl)"),
    (StateFlags::LINK, "link", "link"),
    (StateFlags::VISITED, "visited", "visited"),
    (StateFlags::CHECKED, "checked", "checked"),
    (StateFlags::DROP_ACTIVE, "drop-active", "drop(active)"),
];

impl StateFlags {
    /// Look up the flag for a pseudo-class name (without the leading `:`).
    pub fn from_pseudo_class(name: &str) -> Option<StateFlags> {
        STATE_NAMES
            .iter()
            .find(|(_, _, pseudo)| *pseudo == name)
            .map(|(flag, _, _)| *flag)
    }

    /// Nick names of the set flags, in bit order. Used by widget-path dumps.
    pub fn nicks(self) -> impl Iterator<Item = &'static str> {
        STATE_NAMES
            .iter()
            .filter(move |(flag, _, _)| self.contains(*flag))
            .map(|(_, nick, _)| *nick)
    }

    /// Pseudo-class names of the set flags, in bit order. Used by
    /// declaration dumps.
    pub fn pseudo_classes(self) -> impl Iterator<Item = &'static str> {
        STATE_NAMES
            .iter()
            .filter(move |(flag, _, _)| self.contains(*flag))
            .map(|(_, _, pseudo)| *pseudo)
    }
}
