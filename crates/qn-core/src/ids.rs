//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  `NodeId` and `EdgeType` are chosen
//! by the caller when declaring a topology; `EdgeId` and `AgentKey` are dense
//! indices handed out by the simulator itself.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// Caller-chosen identifier of a queue node.
    pub struct NodeId(u32);
}

typed_id! {
    /// Position of a directed edge in the topology's sorted edge table.
    pub struct EdgeId(u32);
}

typed_id! {
    /// Edge type label.  Distinct types between the same pair of nodes model
    /// distinct classes of flow; the open set passed to `initialize` is a set
    /// of edge types.
    pub struct EdgeType(u32);
}

typed_id! {
    /// Dense index of an agent in the simulator's agent store.  Events carry
    /// this instead of the full (origin, sequence, class) identity.
    pub struct AgentKey(u32);
}
