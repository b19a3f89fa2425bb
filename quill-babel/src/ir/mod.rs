//! Intermediate Representation (IR) shared by every dialect.
//!
//! Two faces of the same document:
//!
//! - [`events`]: the push-style event grammar parsers emit and renderers consume.
//! - [`document`] / [`nodes`]: the XDOM, a mutable block tree materialized from events so it can
//!   be transformed (macro expansion) before rendering.
//!
//! The mapping between both faces lives in [`crate::mappings`] and is lossless: a well-formed
//! event stream built into a tree and flattened again yields the same events.
//!
//! Lossless does not mean every dialect round-trips byte for byte; only event-sequence
//! equivalence is guaranteed.

pub mod document;
pub mod events;
pub mod nodes;

pub use document::{BlockId, Document, TreeError, Walk};
pub use events::{Event, ListKind, Listener, Style, Styles};
pub use nodes::{
    Block, BlockKind, BlockNode, ContentSourceReference, ErrorBlock, ImageBlock, LinkBlock,
    MacroBlock, MacroContent,
};
