//! Records that keep their identity while their contents change.
//!
//! A product keeps its id through renames and stock moves; a sale keeps its id when its
//! items are replaced.

pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> &Self::Id;

    /// Same record, possibly in a different state.
    fn same_identity_as(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
