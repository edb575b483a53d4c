//! Parent/child derivation from a flat, indented line sequence.
//!
//! A node's parent is the nearest preceding node with a strictly smaller
//! indent. This is computed in a single forward pass with an explicit stack of
//! candidate ancestors: entries whose indent is greater than or equal to the
//! current node's are popped, the remaining top (if any) is the parent, and
//! the current node is pushed.
//!
//! Skipped levels are accepted as-is: a depth-3 node directly after a depth-1
//! node becomes that node's child.

/// Derived relationships for a sequence of nodes, keyed by 1-based position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
}

impl Hierarchy {
    /// Builds the hierarchy for nodes with the given indents, in sequence
    /// order.
    pub fn build<I>(indents: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let indents = indents.into_iter();
        let (capacity, _) = indents.size_hint();
        let mut parents = Vec::with_capacity(capacity);
        let mut children: Vec<Vec<usize>> = Vec::with_capacity(capacity);

        // (position, indent) of candidate ancestors
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for (index, indent) in indents.enumerate() {
            let position = index + 1;

            while stack.last().is_some_and(|&(_, top)| top >= indent) {
                stack.pop();
            }

            let parent = stack.last().map(|&(parent, _)| parent);
            if let Some(parent) = parent {
                children[parent - 1].push(position);
            }

            parents.push(parent);
            children.push(Vec::new());
            stack.push((position, indent));
        }

        Self { parents, children }
    }

    /// Number of nodes covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.parents.len()
    }

    /// Whether the hierarchy covers no nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// The parent position of the node at `position`.
    ///
    /// Returns `None` for root nodes and for out-of-range positions.
    #[must_use]
    pub fn parent(&self, position: usize) -> Option<usize> {
        position
            .checked_sub(1)
            .and_then(|index| self.parents.get(index).copied().flatten())
    }

    /// The child positions of the node at `position`, in document order.
    ///
    /// Out-of-range positions have no children.
    #[must_use]
    pub fn children(&self, position: usize) -> &[usize] {
        position
            .checked_sub(1)
            .and_then(|index| self.children.get(index))
            .map_or(&[], Vec::as_slice)
    }

    /// Positions of all root nodes, in document order.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.parents
            .iter()
            .enumerate()
            .filter(|(_, parent)| parent.is_none())
            .map(|(index, _)| index + 1)
    }
}
