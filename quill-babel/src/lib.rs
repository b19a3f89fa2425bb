//! Document conversion core for Quill
//!
//!     This crate holds everything dialects share: the event grammar parsers emit, the XDOM
//!     block tree built from it, the macro transformation engine that rewrites the tree, the
//!     typed resource references links and images point with, and the parser/renderer
//!     contracts with their registry.
//!
//! Architecture
//!
//!     raw text → Parser → events → TreeBuilder → Document → MacroTransformation → flatten →
//!     Renderer → Printer
//!
//!     Streaming mode skips the tree: the parser pushes straight into the renderer's listener.
//!
//!     This is a pure lib, that is, it powers quill-cli but is shell agnostic: no code here
//!     supposes a shell environment, be it stdout, env vars or a logging subscriber.
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # FormatError, ParseError, DocumentError
//!     ├── syntax.rs               # `type/version` identifiers
//!     ├── parameters.rs           # ordered string parameters
//!     ├── ir
//!     │   ├── events.rs           # Event grammar and Listener
//!     │   ├── nodes.rs            # Block payloads and owned subtrees
//!     │   └── document.rs         # the arena-backed XDOM
//!     ├── mappings                # events ⇄ tree
//!     ├── reference               # typed resource references
//!     ├── transform               # macro engine, macro contract, content sources, raw filter
//!     ├── macros                  # built-in macros
//!     ├── format.rs               # Parser / Renderer traits
//!     ├── printer.rs              # output buffering
//!     ├── registry.rs             # SyntaxRegistry
//!     ├── convert.rs              # renderer dispatch, tree and streaming mode
//!     └── formats                 # built-in syntaxes: event, plain, xdom+json
//!
//! Testing
//!
//!     tests
//!     ├── tree_roundtrip.rs       # property tests of the events ⇄ tree mapping
//!     ├── references.rs           # parse/serialize tables and the round-trip law
//!     ├── transform.rs            # engine scenarios
//!     └── rendering.rs            # snapshots of built-in renderers
//!
//! Logging
//!
//!     The crate logs through `tracing` (`debug!` per pass and macro, `warn!` for every recorded
//!     error) and never installs a subscriber.

pub mod convert;
pub mod error;
pub mod format;
pub mod formats;
pub mod macros;
pub mod parameters;
pub mod printer;
pub mod reference;
pub mod registry;
pub mod syntax;
pub mod transform;

pub mod ir;
pub mod mappings;

pub use convert::{convert, Conversion, ConvertRequest};
pub use error::{DocumentError, FormatError, ParseError};
pub use format::{ParseOutcome, Parser, Renderer};
pub use ir::{Block, BlockId, BlockNode, Document, Event, Listener};
pub use mappings::{build_tree, flatten};
pub use parameters::Parameters;
pub use reference::{ReferenceContext, ResourceReference, ResourceReferenceParser, ResourceType};
pub use registry::SyntaxRegistry;
pub use syntax::Syntax;
pub use transform::macros::{Macro, MacroContext, MacroRegistry};
pub use transform::{MacroTransformation, PriorityScope, TransformConfig, TransformReport};
