//! Change categories: which inputs of a style match may have changed.
//!
//! The low byte describes the node itself. The next byte is the same set
//! for preceding siblings, and the following two bytes describe the parent
//! (itself and its siblings). Structural changes on a node are handed to
//! children with [`CssChange::for_child`] and to following siblings with
//! [`CssChange::for_sibling`].

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CssChange: u64 {
        const CLASS = 1 << 0;
        const NAME = 1 << 1;
        const ID = 1 << 2;
        const FIRST_CHILD = 1 << 3;
        const LAST_CHILD = 1 << 4;
        const NTH_CHILD = 1 << 5;
        const NTH_LAST_CHILD = 1 << 6;
        const STATE = 1 << 7;

        const SIBLING_CLASS = 1 << 8;
        const SIBLING_NAME = 1 << 9;
        const SIBLING_ID = 1 << 10;
        const SIBLING_FIRST_CHILD = 1 << 11;
        const SIBLING_LAST_CHILD = 1 << 12;
        const SIBLING_NTH_CHILD = 1 << 13;
        const SIBLING_NTH_LAST_CHILD = 1 << 14;
        const SIBLING_STATE = 1 << 15;

        const PARENT_CLASS = 1 << 16;
        const PARENT_NAME = 1 << 17;
        const PARENT_ID = 1 << 18;
        const PARENT_FIRST_CHILD = 1 << 19;
        const PARENT_LAST_CHILD = 1 << 20;
        const PARENT_NTH_CHILD = 1 << 21;
        const PARENT_NTH_LAST_CHILD = 1 << 22;
        const PARENT_STATE = 1 << 23;

        const PARENT_SIBLING_CLASS = 1 << 24;
        const PARENT_SIBLING_NAME = 1 << 25;
        const PARENT_SIBLING_ID = 1 << 26;
        const PARENT_SIBLING_FIRST_CHILD = 1 << 27;
        const PARENT_SIBLING_LAST_CHILD = 1 << 28;
        const PARENT_SIBLING_NTH_CHILD = 1 << 29;
        const PARENT_SIBLING_NTH_LAST_CHILD = 1 << 30;
        const PARENT_SIBLING_STATE = 1 << 31;

        /// The set of style providers changed.
        const SOURCE = 1 << 32;
        /// The parent's computed style changed.
        const PARENT_STYLE = 1 << 33;
        /// Time advanced; running transitions must be stepped.
        const TIMESTAMP = 1 << 34;
        /// Animation state must be rebuilt without carrying transitions.
        const ANIMATIONS = 1 << 35;

        const POSITION = Self::FIRST_CHILD.bits()
            | Self::LAST_CHILD.bits()
            | Self::NTH_CHILD.bits()
            | Self::NTH_LAST_CHILD.bits();
        const ANY_SELF = (1 << 8) - 1;
        const ANY_SIBLING = ((1 << 8) - 1) << 8;
        const ANY_PARENT = ((1 << 16) - 1) << 16;
        /// Changes that always force a fresh cascade.
        const RADICAL = Self::CLASS.bits()
            | Self::NAME.bits()
            | Self::ID.bits()
            | Self::SOURCE.bits()
            | Self::PARENT_STYLE.bits();
    }
}

const SIBLING_SHIFT: u32 = 8;
const PARENT_SHIFT: u32 = 16;

impl CssChange {
    /// The change as seen by the following siblings of the changed node.
    pub fn for_sibling(self) -> CssChange {
        let base = CssChange::ANY_SELF;
        let keep = !(base | CssChange::SOURCE | CssChange::PARENT_STYLE);
        (self & keep) | CssChange::from_bits_retain((self & base).bits() << SIBLING_SHIFT)
    }

    /// The change as seen by the children of the changed node.
    pub fn for_child(self) -> CssChange {
        let base = CssChange::ANY_SELF | CssChange::ANY_SIBLING;
        let keep = !(base | CssChange::SOURCE | CssChange::PARENT_STYLE);
        (self & keep) | CssChange::from_bits_retain((self & base).bits() << PARENT_SHIFT)
    }
}
