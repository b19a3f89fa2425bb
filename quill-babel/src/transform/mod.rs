//! Macro transformation engine
//!
//! # The High-Level Concept
//!
//!     A parsed document may contain macro calls: [`Block::Macro`] nodes naming a macro, its
//!     parameters and optional content. Transforming the document replaces every call by the
//!     blocks its macro produces. Macro output may itself contain macro calls, so the engine runs
//!     in passes until nothing is left to expand.
//!
//! # The Algorithm
//!
//!     Each pass:
//!
//!     1. **Discover:** walk the tree in pre-order and collect macro blocks with their depth and
//!        document order. The walk does not descend into macro blocks: whatever sits under a
//!        call is its previous output and is replaced along with it.
//!     2. **Order:** sort by the macro's declared priority (lower first), ties by document
//!        order. With [`PriorityScope::Global`] only the lowest priority group of the discovery
//!        runs; the others wait for the next pass.
//!     3. **Resolve and execute:** look the id up, check inline support, load the content, run
//!        the macro. Panics are caught.
//!     4. **Filter and splice:** raw blocks in the output go through the [`RawContentFilter`] if
//!        one is set, then the output replaces the call in its parent.
//!
//!     Passes stop when a discovery finds nothing. When `max_passes` passes have run and macros
//!     are still pending, each of them is turned into an error block.
//!
//! # Failure Isolation
//!
//!     Nothing a single macro does can abort the run. Unknown ids, inline misuse, missing
//!     content, execution errors and panics all replace that one call by an inert
//!     [`ErrorBlock`], record a [`DocumentError`] on the document and log a warning. The only
//!     error [`MacroTransformation::transform`] returns is cancellation.

pub mod content;
pub mod filter;
pub mod macros;

use crate::error::DocumentError;
use crate::ir::document::{BlockId, Document, Walk};
use crate::ir::nodes::{Block, BlockNode, ErrorBlock, MacroBlock, MacroContent};
use crate::registry::SyntaxRegistry;
use crate::syntax::Syntax;
use content::{ContentNotFoundError, ContentSource};
use filter::RawContentFilter;
use macros::{Macro, MacroContext, MacroRegistry};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

pub use content::StaticContentSource;
pub use filter::{RawContentEvent, RawDecision};
pub use macros::{MacroDescriptor, MacroExecutionError};

pub const DEFAULT_MAX_PASSES: usize = 32;

/// The run was stopped before reaching a fixpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("transformation cancelled after {passes} passes")]
    Cancelled { passes: usize },
}

/// How far macro priorities reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityScope {
    /// Priorities order the macros of one pass; everything discovered runs.
    #[default]
    PerPass,
    /// Only the lowest priority group of each discovery runs.
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub max_passes: usize,
    pub priority_scope: PriorityScope,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            priority_scope: PriorityScope::default(),
        }
    }
}

/// Cooperative cancellation flag shared with whoever may stop the run.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformReport {
    pub passes: usize,
    /// Macro calls replaced by their output.
    pub executed: usize,
    /// Raw blocks suppressed or rewritten by the raw content filter.
    pub filtered: usize,
    pub errors: Vec<DocumentError>,
}

struct Pending {
    id: BlockId,
    call: MacroBlock,
    depth: usize,
    order: usize,
    priority: i32,
}

/// The macro transformation, configured once and applied to any number of documents.
pub struct MacroTransformation<'a> {
    macros: &'a MacroRegistry,
    config: TransformConfig,
    content_source: Option<&'a dyn ContentSource>,
    raw_filter: Option<&'a dyn RawContentFilter>,
    syntaxes: Option<&'a SyntaxRegistry>,
    cancellation: Option<CancellationToken>,
}

impl<'a> MacroTransformation<'a> {
    pub fn new(macros: &'a MacroRegistry) -> Self {
        Self {
            macros,
            config: TransformConfig::default(),
            content_source: None,
            raw_filter: None,
            syntaxes: None,
            cancellation: None,
        }
    }

    pub fn with_config(mut self, config: TransformConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_content_source(mut self, source: &'a dyn ContentSource) -> Self {
        self.content_source = Some(source);
        self
    }

    pub fn with_raw_filter(mut self, filter: &'a dyn RawContentFilter) -> Self {
        self.raw_filter = Some(filter);
        self
    }

    /// Parsers macros may use to parse their content in the document's syntax.
    pub fn with_syntaxes(mut self, syntaxes: &'a SyntaxRegistry) -> Self {
        self.syntaxes = Some(syntaxes);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    fn check_cancelled(&self, passes: usize) -> Result<(), TransformError> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => {
                tracing::debug!(passes, "Transformation cancelled");
                Err(TransformError::Cancelled { passes })
            }
            _ => Ok(()),
        }
    }

    /// Expands every macro call in `doc`.
    pub fn transform(&self, doc: &mut Document) -> Result<TransformReport, TransformError> {
        let mut report = TransformReport::default();
        let syntax = doc.syntax().cloned();

        loop {
            self.check_cancelled(report.passes)?;
            let mut pending = self.discover(doc);
            if pending.is_empty() {
                break;
            }
            if report.passes >= self.config.max_passes {
                tracing::debug!(
                    pending = pending.len(),
                    limit = self.config.max_passes,
                    "Pass limit reached"
                );
                for item in pending {
                    let error = DocumentError::RecursionLimit {
                        id: item.call.id.clone(),
                        limit: self.config.max_passes,
                    };
                    fail(doc, &item, error, &mut report);
                }
                break;
            }

            report.passes += 1;
            pending.sort_by_key(|item| (item.priority, item.order));
            if self.config.priority_scope == PriorityScope::Global {
                let lowest = pending[0].priority;
                pending.retain(|item| item.priority == lowest);
            }
            tracing::debug!(pass = report.passes, macros = pending.len(), "Running pass");

            for item in pending {
                self.check_cancelled(report.passes)?;
                if doc.contains(item.id) {
                    self.run(doc, item, syntax.as_ref(), report.passes, &mut report);
                }
            }
        }

        Ok(report)
    }

    fn discover(&self, doc: &Document) -> Vec<Pending> {
        let mut found = Vec::new();
        doc.walk(doc.root(), |id, block| match block {
            Block::Macro(call) => {
                let priority = self.macros.get(&call.id).map_or(0, |m| m.priority());
                found.push(Pending {
                    id,
                    call: call.clone(),
                    depth: 0,
                    order: found.len(),
                    priority,
                });
                Walk::SkipChildren
            }
            _ => Walk::Continue,
        });
        for item in &mut found {
            item.depth = doc.depth(item.id);
        }
        found
    }

    fn run(
        &self,
        doc: &mut Document,
        item: Pending,
        syntax: Option<&Syntax>,
        pass: usize,
        report: &mut TransformReport,
    ) {
        let Some(macro_impl) = self.macros.get(&item.call.id) else {
            let error = DocumentError::UnresolvedMacro {
                id: item.call.id.clone(),
            };
            return fail(doc, &item, error, report);
        };
        if item.call.inline && !macro_impl.supports_inline() {
            let error = DocumentError::InlineNotSupported {
                id: item.call.id.clone(),
            };
            return fail(doc, &item, error, report);
        }

        let content = match self.load_content(&item.call) {
            Ok(content) => content,
            Err(cause) => {
                let error = DocumentError::ContentNotFound {
                    id: item.call.id.clone(),
                    cause,
                };
                return fail(doc, &item, error, report);
            }
        };

        let context = MacroContext {
            call: &item.call,
            syntax,
            syntaxes: self.syntaxes,
            pass,
            depth: item.depth,
        };
        tracing::debug!(
            macro_id = %item.call.id,
            depth = item.depth,
            pass,
            "Executing macro"
        );
        let output = execute(macro_impl, &item.call, content.as_deref(), &context);

        let nodes = match output {
            Ok(nodes) => nodes,
            Err(message) => {
                let error = DocumentError::MacroExecution {
                    id: item.call.id.clone(),
                    message,
                };
                return fail(doc, &item, error, report);
            }
        };
        let nodes = match self.raw_filter {
            Some(raw_filter) => {
                let (nodes, changed) = filter::apply(raw_filter, &item.call.id, nodes);
                report.filtered += changed;
                nodes
            }
            None => nodes,
        };

        match doc.replace(item.id, nodes) {
            Ok(_) => report.executed += 1,
            Err(err) => {
                let error = DocumentError::MacroExecution {
                    id: item.call.id.clone(),
                    message: err.to_string(),
                };
                fail(doc, &item, error, report);
            }
        }
    }

    fn load_content(&self, call: &MacroBlock) -> Result<Option<String>, ContentNotFoundError> {
        match &call.content {
            None => Ok(None),
            Some(MacroContent::Text(text)) => Ok(Some(text.clone())),
            Some(MacroContent::Source(reference)) => match self.content_source {
                Some(source) => source.resolve(reference).map(Some),
                None => Err(ContentNotFoundError::UnknownSource(reference.source.clone())),
            },
        }
    }
}

/// Runs the macro, turning both errors and panics into a message.
fn execute(
    macro_impl: &dyn Macro,
    call: &MacroBlock,
    content: Option<&str>,
    context: &MacroContext<'_>,
) -> Result<Vec<BlockNode>, String> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        macro_impl.execute(&call.parameters, content, context)
    }));
    match outcome {
        Ok(Ok(nodes)) => Ok(nodes),
        Ok(Err(err)) => Err(err.to_string()),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Replaces the call by an error block and records the error.
fn fail(doc: &mut Document, item: &Pending, error: DocumentError, report: &mut TransformReport) {
    tracing::warn!(macro_id = %item.call.id, %error, "Macro failed");
    let block = ErrorBlock {
        description: error.to_string(),
        syntax: None,
        inline: item.call.inline,
    };
    if let Err(err) = doc.replace(item.id, vec![BlockNode::new(Block::Error(block))]) {
        tracing::warn!(macro_id = %item.call.id, %err, "Could not replace failed macro");
    }
    doc.record_error(error.clone());
    report.errors.push(error);
}
