//! Raw content filtering.
//!
//!     Macros may produce raw blocks whose content bypasses every dialect (e.g. HTML written by
//!     the `html` macro). When a [`RawContentFilter`] is installed on the engine, every raw block
//!     a macro produced is shown to it before the output is spliced into the tree, including raw
//!     blocks nested deep inside the produced subtrees.

use crate::ir::nodes::{Block, BlockNode};
use crate::syntax::Syntax;

/// One raw block about to enter the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawContentEvent<'a> {
    /// Id of the macro that produced the block.
    pub macro_id: &'a str,
    pub syntax: &'a Syntax,
    pub content: &'a str,
}

/// What happens to a raw block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDecision {
    Allow,
    /// Drop the block.
    Suppress,
    /// Keep the block with different content.
    Replace(String),
}

/// Synchronous hook deciding the fate of macro-produced raw content.
pub trait RawContentFilter: Send + Sync {
    fn filter(&self, event: &RawContentEvent<'_>) -> RawDecision;
}

impl<F> RawContentFilter for F
where
    F: Fn(&RawContentEvent<'_>) -> RawDecision + Send + Sync,
{
    fn filter(&self, event: &RawContentEvent<'_>) -> RawDecision {
        self(event)
    }
}

/// Applies `filter` to every raw block in `nodes`, returning how many blocks it changed.
pub(crate) fn apply(
    filter: &dyn RawContentFilter,
    macro_id: &str,
    nodes: Vec<BlockNode>,
) -> (Vec<BlockNode>, usize) {
    let mut changed = 0;
    let nodes = filter_nodes(filter, macro_id, nodes, &mut changed);
    (nodes, changed)
}

fn filter_nodes(
    filter: &dyn RawContentFilter,
    macro_id: &str,
    nodes: Vec<BlockNode>,
    changed: &mut usize,
) -> Vec<BlockNode> {
    let mut kept = Vec::with_capacity(nodes.len());
    for BlockNode { block, children } in nodes {
        match block {
            Block::Raw { syntax, content } => {
                let decision = filter.filter(&RawContentEvent {
                    macro_id,
                    syntax: &syntax,
                    content: &content,
                });
                match decision {
                    RawDecision::Allow => kept.push(BlockNode::new(Block::Raw { syntax, content })),
                    RawDecision::Suppress => *changed += 1,
                    RawDecision::Replace(content) => {
                        *changed += 1;
                        kept.push(BlockNode::new(Block::Raw { syntax, content }));
                    }
                }
            }
            block => {
                let children = filter_nodes(filter, macro_id, children, changed);
                kept.push(BlockNode::with_children(block, children));
            }
        }
    }
    kept
}
