use derive_more::{Deref, DerefMut, IntoIterator};
use std::collections::BTreeSet;

///
/// IdSet
///
/// Ordered set of entity ids collected from a lookup; iteration order is id
/// order.
///

#[derive(Clone, Debug, Default, Deref, DerefMut, Eq, IntoIterator, PartialEq)]
pub struct IdSet(#[into_iterator(owned, ref)] BTreeSet<String>);

impl IdSet {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }
}

impl FromIterator<String> for IdSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeSet<String>> for IdSet {
    fn from(ids: BTreeSet<String>) -> Self {
        Self(ids)
    }
}
