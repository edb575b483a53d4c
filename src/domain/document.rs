//! The editable requirement document.
//!
//! A [`Document`] owns the ordered node sequence, which is the only source of
//! truth. Positions, parents and children are derived from (order, indent) by
//! [`Hierarchy::build`] and are rebuilt after every structural change rather
//! than patched by hand.
//!
//! All editing operations address nodes by their current 1-based position and
//! either apply completely or return an [`EditError`] without touching the
//! document.

use std::{collections::BTreeMap, fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use tracing::instrument;

use crate::domain::{EditError, Hierarchy, ItemId, Kind, Node, NodeView};

/// Title given to freshly created documents.
pub const DEFAULT_TITLE: &str = "New Requirement Document";

static MODIFIED_STAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Modified:[^<]*").expect("static pattern is valid"));

/// Where an inserted or moved node lands relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Immediately before the target, as its sibling.
    Before,
    /// After the target and all of its descendants, as its sibling.
    After,
    /// Immediately after the target, as its first child.
    Under,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Before => "before",
            Self::After => "after",
            Self::Under => "under",
        })
    }
}

/// Error returned when a string names no placement.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid position '{0}' (expected before, after or under)")]
pub struct InvalidPlacementError(String);

impl FromStr for Placement {
    type Err = InvalidPlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "before" => Ok(Self::Before),
            "after" => Ok(Self::After),
            "under" => Ok(Self::Under),
            _ => Err(InvalidPlacementError(s.to_string())),
        }
    }
}

/// What happens to the descendants of a deleted node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteMode {
    /// Remove the node together with its whole subtree.
    #[default]
    Cascade,
    /// Remove only the node; its children move up to the node's own parent.
    KeepChildren,
}

/// An ordered requirement document with derived structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
    hierarchy: Hierarchy,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document from nodes in sequence order.
    #[must_use]
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let mut document = Self {
            nodes,
            hierarchy: Hierarchy::default(),
        };
        document.rebuild();
        document
    }

    /// Creates the starting document for a new project: a title followed by a
    /// data attribute recording creation and modification time.
    #[must_use]
    pub fn with_template(title: &str, timestamp: &str) -> Self {
        Self::from_nodes(vec![
            Node::title(title),
            Node::new(
                Kind::Dattr,
                1,
                Some(ItemId::FLOOR),
                format!("Created: {timestamp}<br>Modified: {timestamp}"),
            ),
        ])
    }

    /// Number of nodes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document has no nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The nodes in sequence order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Consumes the document, returning its nodes.
    #[must_use]
    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    /// A view of the node at `position`.
    #[must_use]
    pub fn node(&self, position: usize) -> Option<NodeView<'_>> {
        let node = self.nodes.get(position.checked_sub(1)?)?;
        Some(NodeView {
            position,
            node,
            parent: self.hierarchy.parent(position),
            children: self.hierarchy.children(position),
        })
    }

    /// Views of every node, in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = NodeView<'_>> + '_ {
        (1..=self.len()).filter_map(|position| self.node(position))
    }

    /// The parent position of the node at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NotFound`] if `position` is out of range.
    pub fn parent(&self, position: usize) -> Result<Option<usize>, EditError> {
        self.index_of(position)?;
        Ok(self.hierarchy.parent(position))
    }

    /// The child positions of the node at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NotFound`] if `position` is out of range.
    pub fn children(&self, position: usize) -> Result<&[usize], EditError> {
        self.index_of(position)?;
        Ok(self.hierarchy.children(position))
    }

    /// Positions of the root nodes.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.hierarchy.roots()
    }

    /// The last position covered by the subtree rooted at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NotFound`] if `position` is out of range.
    pub fn subtree_end(&self, position: usize) -> Result<usize, EditError> {
        let index = self.index_of(position)?;
        Ok(subtree_end(&self.nodes, index))
    }

    /// Number of nodes of each kind.
    #[must_use]
    pub fn count_by_kind(&self) -> BTreeMap<Kind, usize> {
        let mut counts = BTreeMap::new();
        for node in &self.nodes {
            *counts.entry(node.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Position of the first node carrying `id`, optionally restricted to one
    /// kind.
    #[must_use]
    pub fn find_by_id(&self, id: ItemId, kind: Option<Kind>) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| node.id == Some(id) && kind.is_none_or(|kind| node.kind == kind))
            .map(|index| index + 1)
    }

    /// Positions of all nodes whose text contains `pattern`.
    #[must_use]
    pub fn find_by_text(&self, pattern: &str, case_sensitive: bool) -> Vec<usize> {
        let needle = if case_sensitive {
            pattern.to_string()
        } else {
            pattern.to_lowercase()
        };

        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| {
                if case_sensitive {
                    node.text.contains(&needle)
                } else {
                    node.text.to_lowercase().contains(&needle)
                }
            })
            .map(|(index, _)| index + 1)
            .collect()
    }

    /// The smallest id at or above [`ItemId::FLOOR`] not used by any node.
    ///
    /// Computed from the current nodes on every call.
    #[must_use]
    pub fn allocate_next_id(&self) -> ItemId {
        ItemId::smallest_unused(self.nodes.iter().filter_map(|node| node.id))
    }

    /// Inserts a new node relative to `target` and returns its position.
    ///
    /// - [`Placement::Before`] inserts a sibling directly before the target.
    /// - [`Placement::After`] inserts a sibling after the target's last
    ///   descendant, so the target keeps its children.
    /// - [`Placement::Under`] inserts the first child of the target, one level
    ///   deeper. Existing children reached through skipped indent levels are
    ///   adopted by the new node.
    ///
    /// If `kind` carries an id and none is given, the next free id is
    /// allocated.
    ///
    /// # Errors
    ///
    /// - [`EditError::NotFound`] if `target` is out of range
    /// - [`EditError::InvalidId`] if `id` is already in use
    /// - [`EditError::IdNotAllowed`] if `id` is given for a kind without ids
    /// - [`EditError::TitleNotRoot`] if a title would land below indent 0
    /// - [`EditError::MultilineText`] if `text` contains a line break
    ///
    /// Surrounding whitespace is trimmed from `text`, as it would be on reload.
    #[instrument(level = "debug", skip(self, text))]
    pub fn add(
        &mut self,
        placement: Placement,
        target: usize,
        kind: Kind,
        text: &str,
        id: Option<ItemId>,
    ) -> Result<usize, EditError> {
        let index = self.index_of(target)?;
        let target_indent = self.nodes[index].indent;

        let (indent, insert_at) = match placement {
            Placement::Before => (target_indent, index),
            Placement::After => (target_indent, subtree_end(&self.nodes, index)),
            Placement::Under => (target_indent + 1, index + 1),
        };
        let position = insert_at + 1;

        if kind == Kind::Title && indent != 0 {
            return Err(EditError::TitleNotRoot { position, indent });
        }
        let text = normalize_text(text, position)?;
        let id = self.resolve_id(kind, id, None)?;

        self.nodes
            .insert(insert_at, Node::new(kind, indent, id, text));
        self.rebuild();

        tracing::debug!("Inserted {kind} at line {position}");
        Ok(position)
    }

    /// Inserts a sibling directly before `target`. See [`Document::add`].
    ///
    /// # Errors
    ///
    /// See [`Document::add`].
    pub fn add_before(
        &mut self,
        target: usize,
        kind: Kind,
        text: &str,
        id: Option<ItemId>,
    ) -> Result<usize, EditError> {
        self.add(Placement::Before, target, kind, text, id)
    }

    /// Inserts a sibling after `target`'s subtree. See [`Document::add`].
    ///
    /// # Errors
    ///
    /// See [`Document::add`].
    pub fn add_after(
        &mut self,
        target: usize,
        kind: Kind,
        text: &str,
        id: Option<ItemId>,
    ) -> Result<usize, EditError> {
        self.add(Placement::After, target, kind, text, id)
    }

    /// Inserts the first child of `target`. See [`Document::add`].
    ///
    /// # Errors
    ///
    /// See [`Document::add`].
    pub fn add_under(
        &mut self,
        target: usize,
        kind: Kind,
        text: &str,
        id: Option<ItemId>,
    ) -> Result<usize, EditError> {
        self.add(Placement::Under, target, kind, text, id)
    }

    /// Moves the node at `source` together with its subtree and returns the
    /// block root's new position.
    ///
    /// The block is placed as for [`Document::add`] (`Under` makes it the first
    /// child of the target). Every node in the block has its indent shifted by
    /// the same amount, so relative depth inside the block is preserved.
    ///
    /// # Errors
    ///
    /// - [`EditError::NotFound`] if either position is out of range
    /// - [`EditError::InvalidTarget`] if `target` is inside the moved block
    /// - [`EditError::TitleNotRoot`] if a title would land below indent 0
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(
        &mut self,
        source: usize,
        placement: Placement,
        target: usize,
    ) -> Result<usize, EditError> {
        let source_index = self.index_of(source)?;
        let target_index = self.index_of(target)?;
        let block_end = subtree_end(&self.nodes, source_index);

        if (source_index..block_end).contains(&target_index) {
            return Err(EditError::InvalidTarget {
                source_position: source,
                target,
                placement,
            });
        }

        let old_root_indent = self.nodes[source_index].indent;
        let target_indent = self.nodes[target_index].indent;
        let new_root_indent = match placement {
            Placement::Before | Placement::After => target_indent,
            Placement::Under => target_indent + 1,
        };

        if self.nodes[source_index].kind == Kind::Title && new_root_indent != 0 {
            return Err(EditError::TitleNotRoot {
                position: source,
                indent: new_root_indent,
            });
        }

        let mut block: Vec<Node> = self.nodes.drain(source_index..block_end).collect();
        for node in &mut block {
            node.indent = node.indent - old_root_indent + new_root_indent;
        }

        let target_index = if target_index > source_index {
            target_index - block.len()
        } else {
            target_index
        };
        let insert_at = match placement {
            Placement::Before => target_index,
            Placement::After => subtree_end(&self.nodes, target_index),
            Placement::Under => target_index + 1,
        };

        self.nodes.splice(insert_at..insert_at, block);
        self.rebuild();

        let position = insert_at + 1;
        tracing::debug!("Moved line {source} {placement} line {target}, now at line {position}");
        Ok(position)
    }

    /// Moves `source` and its subtree directly before `target`.
    ///
    /// # Errors
    ///
    /// See [`Document::move_node`].
    pub fn move_before(&mut self, source: usize, target: usize) -> Result<usize, EditError> {
        self.move_node(source, Placement::Before, target)
    }

    /// Moves `source` and its subtree after `target`'s subtree.
    ///
    /// # Errors
    ///
    /// See [`Document::move_node`].
    pub fn move_after(&mut self, source: usize, target: usize) -> Result<usize, EditError> {
        self.move_node(source, Placement::After, target)
    }

    /// Moves `source` and its subtree to become `target`'s first child.
    ///
    /// # Errors
    ///
    /// See [`Document::move_node`].
    pub fn move_under(&mut self, source: usize, target: usize) -> Result<usize, EditError> {
        self.move_node(source, Placement::Under, target)
    }

    /// Deletes the node at `position` and returns the removed nodes in
    /// sequence order.
    ///
    /// With [`DeleteMode::KeepChildren`] the descendants stay in place and each
    /// direct child's subtree is lifted so that the child takes the deleted
    /// node's indent. The children therefore become children of the deleted
    /// node's parent (or roots). For regularly nested documents this is a
    /// shift of one level.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NotFound`] if `position` is out of range.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&mut self, position: usize, mode: DeleteMode) -> Result<Vec<Node>, EditError> {
        let index = self.index_of(position)?;
        let end = subtree_end(&self.nodes, index);

        let removed: Vec<Node> = match mode {
            DeleteMode::Cascade => self.nodes.drain(index..end).collect(),
            DeleteMode::KeepChildren => {
                let removed = self.nodes.remove(index);
                let descendants_end = end - 1;

                let mut child = index;
                while child < descendants_end {
                    let child_end = subtree_end(&self.nodes, child);
                    let lift = self.nodes[child].indent - removed.indent;
                    for node in &mut self.nodes[child..child_end] {
                        node.indent -= lift;
                    }
                    child = child_end;
                }

                vec![removed]
            }
        };
        self.rebuild();

        tracing::debug!("Deleted {} line(s) starting at line {position}", removed.len());
        Ok(removed)
    }

    /// Replaces the text of the node at `position`. Surrounding whitespace is
    /// trimmed.
    ///
    /// # Errors
    ///
    /// - [`EditError::NotFound`] if `position` is out of range
    /// - [`EditError::ReadOnly`] if the node is a data attribute
    /// - [`EditError::MultilineText`] if `text` contains a line break
    #[instrument(level = "debug", skip(self, text))]
    pub fn edit_text(&mut self, position: usize, text: &str) -> Result<(), EditError> {
        let index = self.index_of(position)?;
        let kind = self.nodes[index].kind;

        if kind.is_read_only() {
            tracing::debug!("Rejected edit of read-only {kind} at line {position}");
            return Err(EditError::ReadOnly { position, kind });
        }
        let text = normalize_text(text, position)?;

        self.nodes[index].text = text.to_string();
        Ok(())
    }

    /// Replaces the text of the node at `position` on behalf of the system,
    /// bypassing the read-only check that applies to user edits.
    ///
    /// # Errors
    ///
    /// - [`EditError::NotFound`] if `position` is out of range
    /// - [`EditError::MultilineText`] if `text` contains a line break
    pub fn set_system_text(&mut self, position: usize, text: &str) -> Result<(), EditError> {
        let index = self.index_of(position)?;
        let text = normalize_text(text, position)?;
        self.nodes[index].text = text.to_string();
        Ok(())
    }

    /// Rewrites the `Modified:` value of every data attribute to `timestamp`.
    ///
    /// Returns the number of nodes updated.
    pub fn stamp_modified(&mut self, timestamp: &str) -> usize {
        let replacement = format!("Modified: {timestamp}");
        let mut updated = 0;

        for node in self.nodes.iter_mut().filter(|node| node.kind == Kind::Dattr) {
            if MODIFIED_STAMP.is_match(&node.text) {
                node.text = MODIFIED_STAMP
                    .replace_all(&node.text, regex::NoExpand(&replacement))
                    .into_owned();
                updated += 1;
            }
        }

        if updated > 0 {
            tracing::debug!("Stamped modification time on {updated} data attribute(s)");
        }
        updated
    }

    /// Changes the kind of the node at `position` and returns its resulting
    /// id.
    ///
    /// When the new kind carries an id, an explicit `id` wins, otherwise an
    /// existing id is kept, otherwise a new one is allocated. Kinds without ids
    /// drop any existing id.
    ///
    /// Data attributes cannot be retyped, and no node can be retyped into a
    /// data attribute, since their text is maintained by the system.
    ///
    /// # Errors
    ///
    /// - [`EditError::NotFound`] if `position` is out of range
    /// - [`EditError::KindChange`] for changes into or out of [`Kind::Dattr`]
    /// - [`EditError::TitleNotRoot`] when retyping an indented node to a title
    /// - [`EditError::InvalidId`] if `id` is used by another node
    /// - [`EditError::IdNotAllowed`] if `id` is given for a kind without ids
    #[instrument(level = "debug", skip(self))]
    pub fn retype(
        &mut self,
        position: usize,
        kind: Kind,
        id: Option<ItemId>,
    ) -> Result<Option<ItemId>, EditError> {
        let index = self.index_of(position)?;
        let node = &self.nodes[index];

        if (node.kind == Kind::Dattr) != (kind == Kind::Dattr) {
            return Err(EditError::KindChange {
                position,
                from: node.kind,
                to: kind,
            });
        }
        if kind == Kind::Title && node.indent != 0 {
            return Err(EditError::TitleNotRoot {
                position,
                indent: node.indent,
            });
        }

        let id = match (kind.has_id(), id, node.id) {
            (true, None, Some(existing)) => Some(existing),
            _ => self.resolve_id(kind, id, Some(index))?,
        };

        let node = &mut self.nodes[index];
        node.kind = kind;
        node.id = id;

        tracing::debug!("Line {position} is now {kind}");
        Ok(id)
    }

    fn index_of(&self, position: usize) -> Result<usize, EditError> {
        match position.checked_sub(1) {
            Some(index) if index < self.nodes.len() => Ok(index),
            _ => Err(EditError::NotFound {
                position,
                len: self.nodes.len(),
            }),
        }
    }

    /// Validates or allocates the id for a node of `kind`, ignoring the node
    /// at `exclude` when checking for collisions.
    fn resolve_id(
        &self,
        kind: Kind,
        id: Option<ItemId>,
        exclude: Option<usize>,
    ) -> Result<Option<ItemId>, EditError> {
        if !kind.has_id() {
            return match id {
                Some(_) => Err(EditError::IdNotAllowed { kind }),
                None => Ok(None),
            };
        }

        let Some(id) = id else {
            let id = self.allocate_next_id();
            tracing::debug!("Allocated id {id}");
            return Ok(Some(id));
        };

        let collision = self
            .nodes
            .iter()
            .enumerate()
            .find(|&(index, node)| Some(index) != exclude && node.id == Some(id));

        match collision {
            Some((index, _)) => Err(EditError::InvalidId {
                id,
                position: index + 1,
            }),
            None => Ok(Some(id)),
        }
    }

    fn rebuild(&mut self) {
        self.hierarchy = Hierarchy::build(self.nodes.iter().map(|node| node.indent));
    }
}

/// Exclusive end index of the subtree rooted at `index`: the first following
/// node that is not deeper than the root.
fn subtree_end(nodes: &[Node], index: usize) -> usize {
    let indent = nodes[index].indent;
    nodes[index + 1..]
        .iter()
        .position(|node| node.indent <= indent)
        .map_or(nodes.len(), |offset| index + 1 + offset)
}

/// Text as it will read back from the markdown file: one line, trimmed.
fn normalize_text(text: &str, position: usize) -> Result<&str, EditError> {
    if text.contains(['\n', '\r']) {
        return Err(EditError::MultilineText { position });
    }
    Ok(text.trim())
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn req(indent: usize, id: u32, text: &str) -> Node {
        Node::new(Kind::Requirement, indent, Some(ItemId::new(id)), text)
    }

    fn sub(indent: usize, text: &str) -> Node {
        Node::new(Kind::Subtitle, indent, None, text)
    }

    fn summary(document: &Document) -> Vec<(usize, &str)> {
        document
            .nodes()
            .iter()
            .map(|node| (node.indent, node.text.as_str()))
            .collect()
    }

    /// 1 Doc
    /// 2   Section A
    /// 3     a1
    /// 4       a1.1
    /// 5     a2
    /// 6   Section B
    /// 7     b1
    fn sample() -> Document {
        Document::from_nodes(vec![
            Node::title("Doc"),
            sub(1, "Section A"),
            req(2, 1000, "a1"),
            req(3, 1001, "a1.1"),
            req(2, 1002, "a2"),
            sub(1, "Section B"),
            req(2, 1003, "b1"),
        ])
    }

    /// Checks the structural invariants against a from-scratch computation.
    fn assert_consistent(document: &Document) {
        let indents: Vec<_> = document.nodes().iter().map(|n| n.indent).collect();
        let positions: Vec<_> = document.iter().map(|view| view.position).collect();
        assert_eq!(positions, (1..=document.len()).collect::<Vec<_>>());

        for view in document.iter() {
            let expected = (1..view.position)
                .rev()
                .find(|&p| indents[p - 1] < view.indent());
            assert_eq!(view.parent, expected, "parent of line {}", view.position);
            if let Some(parent) = view.parent {
                assert!(document.node(parent).unwrap().children.contains(&view.position));
            }
            if view.kind() == Kind::Title {
                assert_eq!(view.indent(), 0);
            }
        }
    }

    #[test]
    fn add_under_title_creates_first_child_with_allocated_id() {
        let mut document = Document::from_nodes(vec![Node::title("Doc")]);

        let position = document
            .add_under(1, Kind::Requirement, "New req", None)
            .unwrap();

        assert_eq!(position, 2);
        let view = document.node(2).unwrap();
        assert_eq!(view.indent(), 1);
        assert_eq!(view.id(), Some(ItemId::new(1000)));
        assert_eq!(view.parent, Some(1));
        assert_consistent(&document);
    }

    #[test]
    fn add_under_becomes_first_child() {
        let mut document = sample();

        let position = document.add_under(2, Kind::Comment, "note", None).unwrap();

        assert_eq!(position, 3);
        assert_eq!(document.children(2).unwrap(), &[3, 4, 6]);
        assert_consistent(&document);
    }

    #[test]
    fn add_after_skips_the_target_subtree() {
        let mut document = sample();

        let position = document
            .add_after(3, Kind::Requirement, "after a1", None)
            .unwrap();

        assert_eq!(position, 5);
        assert_eq!(document.node(5).unwrap().indent(), 2);
        // a1 keeps its child
        assert_eq!(document.children(3).unwrap(), &[4]);
        assert_eq!(document.children(2).unwrap(), &[3, 5, 6]);
        assert_consistent(&document);
    }

    #[test]
    fn add_before_inserts_sibling() {
        let mut document = sample();

        let position = document.add_before(6, Kind::Subtitle, "Section A2", None).unwrap();

        assert_eq!(position, 6);
        assert_eq!(document.node(6).unwrap().id(), None);
        assert_eq!(document.node(7).unwrap().text(), "Section B");
        assert_eq!(document.children(1).unwrap(), &[2, 6, 7]);
        assert_consistent(&document);
    }

    #[test]
    fn add_allocates_smallest_free_id() {
        let mut document = sample();
        document.delete(4, DeleteMode::Cascade).unwrap();

        document.add_after(3, Kind::Comment, "reuse", None).unwrap();

        assert_eq!(document.find_by_id(ItemId::new(1001), None), Some(4));
    }

    #[test]
    fn add_with_explicit_duplicate_id_is_rejected() {
        let mut document = sample();
        let before = document.clone();

        let error = document
            .add_after(3, Kind::Comment, "dup", Some(ItemId::new(1003)))
            .unwrap_err();

        assert_eq!(
            error,
            EditError::InvalidId {
                id: ItemId::new(1003),
                position: 7
            }
        );
        assert_eq!(document, before);
    }

    #[test]
    fn add_with_explicit_legacy_id() {
        let mut document = sample();
        let position = document
            .add_under(1, Kind::Requirement, "legacy", Some(ItemId::new(7)))
            .unwrap();
        assert_eq!(document.node(position).unwrap().id(), Some(ItemId::new(7)));
    }

    #[test]
    fn add_id_for_kind_without_id_is_rejected() {
        let mut document = sample();
        let error = document
            .add_after(2, Kind::Subtitle, "x", Some(ItemId::new(5000)))
            .unwrap_err();
        assert_eq!(
            error,
            EditError::IdNotAllowed {
                kind: Kind::Subtitle
            }
        );
    }

    #[test]
    fn add_title_below_root_is_rejected() {
        let mut document = sample();
        let error = document.add_under(1, Kind::Title, "nested", None).unwrap_err();
        assert!(matches!(error, EditError::TitleNotRoot { indent: 1, .. }));
        assert_eq!(document, sample());
    }

    #[test_case(0; "zero")]
    #[test_case(8; "past the end")]
    fn add_with_bad_target_is_not_found(target: usize) {
        let mut document = sample();
        let error = document
            .add_after(target, Kind::Requirement, "x", None)
            .unwrap_err();
        assert_eq!(error, EditError::NotFound { position: target, len: 7 });
    }

    #[test]
    fn add_rejects_line_breaks() {
        let mut document = sample();
        let error = document
            .add_after(3, Kind::Requirement, "two\nlines", None)
            .unwrap_err();
        assert_eq!(error, EditError::MultilineText { position: 5 });
    }

    #[test]
    fn text_is_trimmed_on_the_way_in() {
        let mut document = sample();

        let position = document
            .add_under(1, Kind::Requirement, "  padded  ", None)
            .unwrap();
        assert_eq!(document.node(position).unwrap().text(), "padded");

        document.edit_text(3, "\tre-worded ").unwrap();
        assert_eq!(document.node(3).unwrap().text(), "re-worded");

        document.set_system_text(4, " system ").unwrap();
        assert_eq!(document.node(4).unwrap().text(), "system");
    }

    #[test]
    fn move_under_relocates_whole_block_and_shifts_indent() {
        // 1 Doc, 2 Section (1), 3 r (2), 4 Other (0), 5 block (0), 6 c1 (1), 7 c2 (2)
        let mut document = Document::from_nodes(vec![
            Node::title("Doc"),
            sub(1, "Section"),
            req(2, 1000, "r"),
            Node::new(Kind::Unknown, 0, None, "Other"),
            req(0, 1001, "block"),
            req(1, 1002, "c1"),
            req(2, 1003, "c2"),
        ]);

        let position = document.move_under(5, 2).unwrap();

        assert_eq!(position, 3);
        assert_eq!(
            summary(&document),
            vec![
                (0, "Doc"),
                (1, "Section"),
                (2, "block"),
                (3, "c1"),
                (4, "c2"),
                (2, "r"),
                (0, "Other"),
            ]
        );
        assert_eq!(document.parent(3).unwrap(), Some(2));
        assert_eq!(document.children(2).unwrap(), &[3, 6]);
        assert_consistent(&document);
    }

    #[test]
    fn move_after_places_block_after_target_subtree() {
        let mut document = sample();

        // move b1 after a1 (which has a child)
        let position = document.move_after(7, 3).unwrap();

        assert_eq!(position, 5);
        assert_eq!(
            summary(&document),
            vec![
                (0, "Doc"),
                (1, "Section A"),
                (2, "a1"),
                (3, "a1.1"),
                (2, "b1"),
                (2, "a2"),
                (1, "Section B"),
            ]
        );
        assert_consistent(&document);
    }

    #[test]
    fn move_before_earlier_target() {
        let mut document = sample();

        let position = document.move_before(6, 2).unwrap();

        assert_eq!(position, 2);
        assert_eq!(
            summary(&document),
            vec![
                (0, "Doc"),
                (1, "Section B"),
                (2, "b1"),
                (1, "Section A"),
                (2, "a1"),
                (3, "a1.1"),
                (2, "a2"),
            ]
        );
        assert_consistent(&document);
    }

    #[test]
    fn move_block_forward_accounts_for_removed_lines() {
        let mut document = sample();

        // Section A (with 3 descendants) after Section B
        let position = document.move_after(2, 6).unwrap();

        assert_eq!(position, 4);
        assert_eq!(
            summary(&document),
            vec![
                (0, "Doc"),
                (1, "Section B"),
                (2, "b1"),
                (1, "Section A"),
                (2, "a1"),
                (3, "a1.1"),
                (2, "a2"),
            ]
        );
        assert_consistent(&document);
    }

    #[test_case(2, 2; "onto itself")]
    #[test_case(2, 4; "into own subtree")]
    #[test_case(1, 7; "title into its descendants")]
    fn move_into_own_block_is_invalid(source: usize, target: usize) {
        let mut document = sample();

        let error = document.move_under(source, target).unwrap_err();

        assert!(matches!(error, EditError::InvalidTarget { .. }));
        assert_eq!(document, sample());
    }

    #[test]
    fn move_title_under_node_is_rejected() {
        let mut document = Document::from_nodes(vec![
            Node::title("One"),
            Node::title("Two"),
        ]);
        let error = document.move_under(2, 1).unwrap_err();
        assert_eq!(
            error,
            EditError::TitleNotRoot {
                position: 2,
                indent: 1
            }
        );
    }

    #[test]
    fn move_out_of_range_is_not_found() {
        let mut document = sample();
        assert!(matches!(
            document.move_before(9, 1),
            Err(EditError::NotFound { position: 9, .. })
        ));
        assert!(matches!(
            document.move_before(1, 9),
            Err(EditError::NotFound { position: 9, .. })
        ));
    }

    #[test]
    fn cascade_delete_removes_exactly_the_subtree() {
        let mut document = sample();

        let removed = document.delete(2, DeleteMode::Cascade).unwrap();

        let removed: Vec<_> = removed.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(removed, vec!["Section A", "a1", "a1.1", "a2"]);
        assert_eq!(
            summary(&document),
            vec![(0, "Doc"), (1, "Section B"), (2, "b1")]
        );
        assert_consistent(&document);
    }

    #[test]
    fn delete_keeping_children_reparents_them() {
        let mut document = sample();

        let removed = document.delete(2, DeleteMode::KeepChildren).unwrap();

        assert_eq!(removed.len(), 1);
        assert_eq!(
            summary(&document),
            vec![
                (0, "Doc"),
                (1, "a1"),
                (2, "a1.1"),
                (1, "a2"),
                (1, "Section B"),
                (2, "b1"),
            ]
        );
        assert_eq!(document.children(1).unwrap(), &[2, 4, 5]);
        assert_consistent(&document);
    }

    #[test]
    fn delete_keeping_children_with_skipped_levels() {
        // 1 root (0), 2 x (1), 3 deep (4), 4 deeper (5), 5 shallow (2), 6 y (1)
        let mut document = Document::from_nodes(vec![
            Node::title("root"),
            sub(1, "x"),
            req(4, 1, "deep"),
            req(5, 2, "deeper"),
            req(2, 3, "shallow"),
            sub(1, "y"),
        ]);

        document.delete(2, DeleteMode::KeepChildren).unwrap();

        assert_eq!(
            summary(&document),
            vec![
                (0, "root"),
                (1, "deep"),
                (2, "deeper"),
                (1, "shallow"),
                (1, "y"),
            ]
        );
        assert_eq!(document.children(1).unwrap(), &[2, 4, 5]);
        assert_consistent(&document);
    }

    #[test]
    fn delete_root_keeping_children_promotes_them_to_roots() {
        let mut document = Document::from_nodes(vec![
            Node::title("Doc"),
            req(1, 1000, "a"),
            req(2, 1001, "b"),
        ]);

        document.delete(1, DeleteMode::KeepChildren).unwrap();

        assert_eq!(summary(&document), vec![(0, "a"), (1, "b")]);
        assert_eq!(document.roots().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn delete_leaf_and_out_of_range() {
        let mut document = sample();
        assert_eq!(document.delete(7, DeleteMode::Cascade).unwrap().len(), 1);
        assert_eq!(document.len(), 6);
        assert!(matches!(
            document.delete(7, DeleteMode::Cascade),
            Err(EditError::NotFound { position: 7, len: 6 })
        ));
    }

    #[test]
    fn legacy_ids_are_not_reused_after_deletion() {
        let mut document = Document::from_nodes(vec![
            Node::title("Legacy"),
            req(1, 1, "one"),
            req(1, 2, "two"),
        ]);

        document.delete(2, DeleteMode::Cascade).unwrap();
        let position = document
            .add_after(2, Kind::Requirement, "three", None)
            .unwrap();

        assert_eq!(document.node(position).unwrap().id(), Some(ItemId::FLOOR));
        assert_eq!(document.find_by_id(ItemId::new(2), None), Some(2));
    }

    #[test]
    fn edit_text_replaces_description() {
        let mut document = sample();
        document.edit_text(3, "updated").unwrap();
        assert_eq!(document.node(3).unwrap().text(), "updated");
    }

    #[test]
    fn edit_text_on_data_attribute_is_read_only() {
        let mut document = Document::with_template("Doc", "2025-07-09 14:40");

        let error = document.edit_text(2, "tampered").unwrap_err();

        assert_eq!(
            error,
            EditError::ReadOnly {
                position: 2,
                kind: Kind::Dattr
            }
        );
        assert_eq!(
            document.node(2).unwrap().text(),
            "Created: 2025-07-09 14:40<br>Modified: 2025-07-09 14:40"
        );
    }

    #[test]
    fn system_text_bypasses_read_only() {
        let mut document = Document::with_template("Doc", "2025-07-09 14:40");
        document.set_system_text(2, "Created: now").unwrap();
        assert_eq!(document.node(2).unwrap().text(), "Created: now");
    }

    #[test]
    fn stamp_modified_only_touches_modified_value() {
        let mut document = Document::with_template("Doc", "2025-07-09 14:40");
        document.add_under(1, Kind::Requirement, "Modified: not a stamp", None).unwrap();

        let updated = document.stamp_modified("2025-07-10 09:05");

        assert_eq!(updated, 1);
        assert_eq!(
            document.find_by_text("Created: 2025-07-09 14:40<br>Modified: 2025-07-10 09:05", true),
            vec![3]
        );
        assert_eq!(document.node(2).unwrap().text(), "Modified: not a stamp");
    }

    #[test]
    fn retype_to_kind_with_id_keeps_existing_id() {
        let mut document = sample();
        let id = document.retype(3, Kind::Comment, None).unwrap();
        assert_eq!(id, Some(ItemId::new(1000)));
        assert_eq!(document.node(3).unwrap().kind(), Kind::Comment);
    }

    #[test]
    fn retype_allocates_and_clears_ids() {
        let mut document = sample();

        let id = document.retype(2, Kind::Requirement, None).unwrap();
        assert_eq!(id, Some(ItemId::new(1004)));

        let id = document.retype(2, Kind::Unknown, None).unwrap();
        assert_eq!(id, None);
        assert_eq!(document.node(2).unwrap().id(), None);
    }

    #[test]
    fn retype_with_own_id_is_not_a_collision() {
        let mut document = sample();
        let id = document
            .retype(3, Kind::Comment, Some(ItemId::new(1000)))
            .unwrap();
        assert_eq!(id, Some(ItemId::new(1000)));
    }

    #[test]
    fn retype_with_colliding_id_is_rejected() {
        let mut document = sample();
        let error = document
            .retype(3, Kind::Comment, Some(ItemId::new(1003)))
            .unwrap_err();
        assert_eq!(
            error,
            EditError::InvalidId {
                id: ItemId::new(1003),
                position: 7
            }
        );
        assert_eq!(document, sample());
    }

    #[test]
    fn retype_into_and_out_of_data_attribute_is_rejected() {
        let mut document = Document::with_template("Doc", "2025-07-09 14:40");
        document.add_after(2, Kind::Requirement, "r", None).unwrap();

        assert!(matches!(
            document.retype(2, Kind::Requirement, None),
            Err(EditError::KindChange { from: Kind::Dattr, .. })
        ));
        assert!(matches!(
            document.retype(3, Kind::Dattr, None),
            Err(EditError::KindChange { to: Kind::Dattr, .. })
        ));
    }

    #[test]
    fn retype_indented_node_to_title_is_rejected() {
        let mut document = sample();
        assert!(matches!(
            document.retype(2, Kind::Title, None),
            Err(EditError::TitleNotRoot { position: 2, indent: 1 })
        ));
    }

    #[test]
    fn find_by_id_with_kind_filter() {
        let mut document = sample();
        document.retype(5, Kind::Comment, None).unwrap();

        assert_eq!(document.find_by_id(ItemId::new(1002), None), Some(5));
        assert_eq!(
            document.find_by_id(ItemId::new(1002), Some(Kind::Comment)),
            Some(5)
        );
        assert_eq!(
            document.find_by_id(ItemId::new(1002), Some(Kind::Requirement)),
            None
        );
        assert_eq!(document.find_by_id(ItemId::new(42), None), None);
    }

    #[test]
    fn find_by_text_case_handling() {
        let document = sample();
        assert_eq!(document.find_by_text("section", false), vec![2, 6]);
        assert!(document.find_by_text("section", true).is_empty());
        assert_eq!(document.find_by_text("A1", false), vec![3, 4]);
    }

    #[test]
    fn count_by_kind() {
        let counts = sample().count_by_kind();
        assert_eq!(counts.get(&Kind::Title), Some(&1));
        assert_eq!(counts.get(&Kind::Subtitle), Some(&2));
        assert_eq!(counts.get(&Kind::Requirement), Some(&4));
        assert_eq!(counts.get(&Kind::Comment), None);
    }

    #[test]
    fn mutation_sequence_keeps_invariants() {
        let mut document = sample();

        document.add_under(3, Kind::Comment, "c", None).unwrap();
        assert_consistent(&document);
        document.move_under(8, 4).unwrap();
        assert_consistent(&document);
        document.delete(2, DeleteMode::KeepChildren).unwrap();
        assert_consistent(&document);
        document.move_before(document.len(), 1).unwrap();
        assert_consistent(&document);
        document.delete(1, DeleteMode::Cascade).unwrap();
        assert_consistent(&document);
    }

    #[test]
    fn placement_parsing() {
        assert_eq!("Under".parse::<Placement>().unwrap(), Placement::Under);
        assert!("beside".parse::<Placement>().is_err());
    }
}
