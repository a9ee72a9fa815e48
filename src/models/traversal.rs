/// Everything one walk of a directory sub-tree discovered.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Traversal {
    /// Fully-qualified leaf paths, in no particular order.
    pub leaves: Vec<String>,
    /// Directories skipped because listing them was forbidden.
    pub forbidden: Vec<String>,
}

impl Traversal {
    pub fn merge(&mut self, other: Traversal) {
        self.leaves.extend(other.leaves);
        self.forbidden.extend(other.forbidden);
    }

    pub fn into_sorted_leaves(mut self) -> Vec<String> {
        self.leaves.sort_unstable();
        self.leaves
    }
}
