//! The XDOM: a mutable, navigable block tree.
//!
//! # Storage
//!
//!     Nodes live in an arena owned by the [`Document`] and are addressed by [`BlockId`]. Each
//!     node owns its ordered list of child ids; a child appears in exactly one such list. The
//!     parent link stored on every node is a plain id used for upward navigation only: it never
//!     keeps anything alive, and removing a subtree frees its slots regardless of parent links.
//!
//!     Ids of removed nodes are never reused, so a stale id simply resolves to `None`. The
//!     freed slots stay in the arena: each transformation pass grows it by the size of the macro
//!     output it splices in, and [`Document::compact`] drops them once no ids are held anymore.
//!
//! # Traversal
//!
//!     [`Document::walk`] is a depth-first pre-order walk. The visitor decides per node whether
//!     to continue, skip the node's subtree, or stop altogether; the transformation engine uses
//!     the skip signal to avoid descending into macro blocks.
//!
//! # Mutation
//!
//!     New content is attached from owned [`BlockNode`] subtrees, which guarantees that children
//!     are never shared between trees. [`Document::replace`] splices a node out and a list of
//!     subtrees in at the same position, which is how macro output lands in the tree.

use crate::error::DocumentError;
use crate::ir::nodes::{Block, BlockKind, BlockNode};
use crate::parameters::Parameters;
use crate::syntax::Syntax;
use std::fmt;
use thiserror::Error;

/// Handle of a node inside a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(usize);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors raised by tree mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("block {0} does not exist in this document")]
    UnknownBlock(BlockId),
    #[error("the document root cannot be moved or replaced")]
    RootBlock,
    #[error("block {0} cannot have children")]
    NotAContainer(BlockId),
    #[error("a {0:?} block cannot have children")]
    LeafWithChildren(BlockKind),
    #[error("the root of a document tree must be a document block")]
    NotADocument,
}

/// Visitor decision during [`Document::walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Continue,
    /// Do not descend into the current node's children.
    SkipChildren,
    Stop,
}

#[derive(Debug, Clone)]
struct Node {
    block: Block,
    parent: Option<BlockId>,
    children: Vec<BlockId>,
}

/// A document tree plus its document-level metadata.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Option<Node>>,
    root: BlockId,
    syntax: Option<Syntax>,
    errors: Vec<DocumentError>,
}

impl Document {
    /// Creates a document holding only its root block.
    pub fn new(parameters: Parameters) -> Self {
        Self {
            nodes: vec![Some(Node {
                block: Block::Document { parameters },
                parent: None,
                children: Vec::new(),
            })],
            root: BlockId(0),
            syntax: None,
            errors: Vec::new(),
        }
    }

    /// Builds a document from an owned tree whose root is a document block.
    pub fn from_node(node: BlockNode) -> Result<Self, TreeError> {
        check_shape(std::slice::from_ref(&node))?;
        let BlockNode { block, children } = node;
        let Block::Document { parameters } = block else {
            return Err(TreeError::NotADocument);
        };
        let mut doc = Document::new(parameters);
        let root = doc.root;
        for child in children {
            doc.graft_last(root, child)?;
        }
        Ok(doc)
    }

    pub fn root(&self) -> BlockId {
        self.root
    }

    /// Syntax the document was parsed from, when known.
    pub fn syntax(&self) -> Option<&Syntax> {
        self.syntax.as_ref()
    }

    pub fn set_syntax(&mut self, syntax: Option<Syntax>) {
        self.syntax = syntax;
    }

    /// Non-fatal errors collected while parsing and transforming.
    pub fn errors(&self) -> &[DocumentError] {
        &self.errors
    }

    pub fn record_error(&mut self, error: DocumentError) {
        self.errors.push(error);
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// True when the root has no children.
    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    fn node(&self, id: BlockId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: BlockId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn require(&self, id: BlockId) -> Result<&Node, TreeError> {
        self.node(id).ok_or(TreeError::UnknownBlock(id))
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.node(id).is_some()
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.node(id).map(|node| &node.block)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.node_mut(id).map(|node| &mut node.block)
    }

    // Navigation

    pub fn parent(&self, id: BlockId) -> Option<BlockId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: BlockId) -> &[BlockId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Position of `id` in its parent's child list.
    pub fn index_in_parent(&self, id: BlockId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    pub fn next_sibling(&self, id: BlockId) -> Option<BlockId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: BlockId) -> Option<BlockId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|previous| self.children(parent).get(previous).copied())
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: BlockId) -> Vec<BlockId> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            ancestors.push(ancestor);
            current = self.parent(ancestor);
        }
        ancestors
    }

    /// Distance from the root; the root is at depth 0.
    pub fn depth(&self, id: BlockId) -> usize {
        self.ancestors(id).len()
    }

    // Traversal

    /// Depth-first pre-order walk starting at (and including) `start`.
    pub fn walk<F>(&self, start: BlockId, mut visitor: F)
    where
        F: FnMut(BlockId, &Block) -> Walk,
    {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            match visitor(id, &node.block) {
                Walk::Stop => return,
                Walk::SkipChildren => {}
                Walk::Continue => stack.extend(node.children.iter().rev().copied()),
            }
        }
    }

    /// Ids of the blocks under `start` (inclusive) in pre-order, optionally filtered by kind.
    pub fn find(&self, start: BlockId, kind: Option<BlockKind>) -> Vec<BlockId> {
        let mut found = Vec::new();
        self.walk(start, |id, block| {
            if kind.map_or(true, |kind| block.kind() == kind) {
                found.push(id);
            }
            Walk::Continue
        });
        found
    }

    /// Ids of the blocks under `start` (inclusive) in pre-order.
    pub fn descendants(&self, start: BlockId) -> Vec<BlockId> {
        self.find(start, None)
    }

    // Mutation

    fn alloc(&mut self, block: Block, parent: BlockId) -> BlockId {
        let id = BlockId(self.nodes.len());
        self.nodes.push(Some(Node {
            block,
            parent: Some(parent),
            children: Vec::new(),
        }));
        id
    }

    fn check_container(&self, id: BlockId) -> Result<(), TreeError> {
        if self.require(id)?.block.is_container() {
            Ok(())
        } else {
            Err(TreeError::NotAContainer(id))
        }
    }

    /// Appends a block as the last child of `parent`.
    pub fn append_child(&mut self, parent: BlockId, block: Block) -> Result<BlockId, TreeError> {
        let index = self.children(parent).len();
        self.insert_child(parent, index, block)
    }

    /// Inserts a block at `index` among `parent`'s children (clamped to the end).
    pub fn insert_child(
        &mut self,
        parent: BlockId,
        index: usize,
        block: Block,
    ) -> Result<BlockId, TreeError> {
        self.check_container(parent)?;
        let id = self.alloc(block, parent);
        let children = &mut self
            .node_mut(parent)
            .ok_or(TreeError::UnknownBlock(parent))?
            .children;
        let index = index.min(children.len());
        children.insert(index, id);
        Ok(id)
    }

    /// Attaches an owned subtree at `index` among `parent`'s children.
    pub fn graft(
        &mut self,
        parent: BlockId,
        index: usize,
        node: BlockNode,
    ) -> Result<BlockId, TreeError> {
        let BlockNode { block, children } = node;
        let id = self.insert_child(parent, index, block)?;
        for child in children {
            self.graft_last(id, child)?;
        }
        Ok(id)
    }

    fn graft_last(&mut self, parent: BlockId, node: BlockNode) -> Result<BlockId, TreeError> {
        let index = self.children(parent).len();
        self.graft(parent, index, node)
    }

    /// Copies the subtree rooted at `id` out as an owned tree.
    pub fn detach(&self, id: BlockId) -> Option<BlockNode> {
        let node = self.node(id)?;
        let children = node
            .children
            .iter()
            .filter_map(|child| self.detach(*child))
            .collect();
        Some(BlockNode::with_children(node.block.clone(), children))
    }

    /// Owned copy of the whole tree.
    pub fn to_root_node(&self) -> BlockNode {
        self.detach(self.root)
            .unwrap_or_else(|| BlockNode::new(Block::Document {
                parameters: Parameters::new(),
            }))
    }

    /// Rebuilds the arena without freed slots.
    ///
    /// Every id handed out before the call is invalidated; the tree itself is unchanged.
    pub fn compact(&mut self) {
        if self.nodes.iter().all(Option::is_some) {
            return;
        }
        let mut nodes = Vec::with_capacity(self.len());
        self.copy_into(self.root, None, &mut nodes);
        self.nodes = nodes;
        self.root = BlockId(0);
    }

    fn copy_into(
        &self,
        id: BlockId,
        parent: Option<BlockId>,
        nodes: &mut Vec<Option<Node>>,
    ) -> Option<BlockId> {
        let node = self.node(id)?;
        let copy = BlockId(nodes.len());
        nodes.push(Some(Node {
            block: node.block.clone(),
            parent,
            children: Vec::new(),
        }));
        let children = node
            .children
            .iter()
            .filter_map(|child| self.copy_into(*child, Some(copy), nodes))
            .collect();
        if let Some(Some(slot)) = nodes.get_mut(copy.0) {
            slot.children = children;
        }
        Some(copy)
    }

    fn free(&mut self, id: BlockId) {
        if let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) {
            for child in node.children {
                self.free(child);
            }
        }
    }

    /// Removes `id` and its subtree, returning them as an owned tree.
    pub fn remove(&mut self, id: BlockId) -> Result<BlockNode, TreeError> {
        let removed = self.replace_with(id, Vec::new())?.0;
        Ok(removed)
    }

    /// Replaces `id` in its parent by `nodes`, keeping sibling order.
    ///
    /// An empty list just removes the block. Returns the ids of the inserted roots. On error
    /// the tree is left untouched.
    pub fn replace(&mut self, id: BlockId, nodes: Vec<BlockNode>) -> Result<Vec<BlockId>, TreeError> {
        Ok(self.replace_with(id, nodes)?.1)
    }

    fn replace_with(
        &mut self,
        id: BlockId,
        nodes: Vec<BlockNode>,
    ) -> Result<(BlockNode, Vec<BlockId>), TreeError> {
        if id == self.root {
            return Err(TreeError::RootBlock);
        }
        let parent = self.require(id)?.parent.ok_or(TreeError::RootBlock)?;
        let index = self
            .index_in_parent(id)
            .ok_or(TreeError::UnknownBlock(id))?;
        check_shape(&nodes)?;

        let removed = self.detach(id).ok_or(TreeError::UnknownBlock(id))?;
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.remove(index);
        }
        self.free(id);

        let mut inserted = Vec::with_capacity(nodes.len());
        for (offset, node) in nodes.into_iter().enumerate() {
            inserted.push(self.graft(parent, index + offset, node)?);
        }
        Ok((removed, inserted))
    }
}

/// Rejects subtrees that would fail halfway through grafting.
fn check_shape(nodes: &[BlockNode]) -> Result<(), TreeError> {
    match nodes.iter().find_map(BlockNode::misplaced_children) {
        Some(kind) => Err(TreeError::LeafWithChildren(kind)),
        None => Ok(()),
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Parameters::new())
    }
}

/// Structural equality: same tree shape and payloads, same syntax, same recorded errors.
/// Arena layout (ids, freed slots) is irrelevant.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.syntax == other.syntax
            && self.errors == other.errors
            && self.to_root_node() == other.to_root_node()
    }
}
