//! Macro transformation scenarios
//!
//! Documents are built directly as block trees, transformed with a registry mixing the
//! built-in macros and small test macros, and compared structurally.

use quill_babel::error::DocumentError;
use quill_babel::ir::{Block, BlockNode, ContentSourceReference, Document, ErrorBlock, MacroBlock};
use quill_babel::parameters::{parameters, Parameters};
use quill_babel::transform::content::ContentNotFoundError;
use quill_babel::transform::{
    CancellationToken, MacroExecutionError, PriorityScope, RawContentEvent, RawDecision,
    StaticContentSource, TransformConfig, TransformError,
};
use quill_babel::{Macro, MacroContext, MacroRegistry, MacroTransformation, Syntax, SyntaxRegistry};
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

/// Records its id when executed and returns a fixed output.
struct Recorder {
    id: &'static str,
    priority: i32,
    output: Vec<BlockNode>,
    log: Log,
}

impl Recorder {
    fn new(id: &'static str, log: &Log) -> Self {
        Self {
            id,
            priority: 0,
            output: Vec::new(),
            log: Arc::clone(log),
        }
    }

    fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    fn with_output(mut self, output: Vec<BlockNode>) -> Self {
        self.output = output;
        self
    }
}

impl Macro for Recorder {
    fn id(&self) -> &str {
        self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn execute(
        &self,
        _parameters: &Parameters,
        _content: Option<&str>,
        _context: &MacroContext<'_>,
    ) -> Result<Vec<BlockNode>, MacroExecutionError> {
        self.log.lock().unwrap().push(self.id.to_string());
        Ok(self.output.clone())
    }
}

struct Failing;

impl Macro for Failing {
    fn id(&self) -> &str {
        "boom"
    }

    fn execute(
        &self,
        _parameters: &Parameters,
        _content: Option<&str>,
        _context: &MacroContext<'_>,
    ) -> Result<Vec<BlockNode>, MacroExecutionError> {
        Err(MacroExecutionError::Failed("boom".to_string()))
    }
}

struct Panicking;

impl Macro for Panicking {
    fn id(&self) -> &str {
        "panic"
    }

    fn execute(
        &self,
        _parameters: &Parameters,
        _content: Option<&str>,
        _context: &MacroContext<'_>,
    ) -> Result<Vec<BlockNode>, MacroExecutionError> {
        panic!("kaboom")
    }
}

/// Cancels the run it belongs to.
struct Stop(CancellationToken);

impl Macro for Stop {
    fn id(&self) -> &str {
        "stop"
    }

    fn execute(
        &self,
        _parameters: &Parameters,
        _content: Option<&str>,
        _context: &MacroContext<'_>,
    ) -> Result<Vec<BlockNode>, MacroExecutionError> {
        self.0.cancel();
        Ok(vec![BlockNode::word("stopped")])
    }
}

fn document(children: Vec<BlockNode>) -> Document {
    Document::from_node(BlockNode::with_children(
        Block::Document {
            parameters: Parameters::new(),
        },
        children,
    ))
    .unwrap()
}

fn top(doc: &Document) -> Vec<BlockNode> {
    doc.to_root_node().children
}

fn call(id: &str) -> BlockNode {
    BlockNode::macro_call(MacroBlock::new(id))
}

fn error_description(node: &BlockNode) -> &str {
    match &node.block {
        Block::Error(ErrorBlock { description, .. }) => description,
        other => panic!("Expected an error block, got {:?}", other),
    }
}

#[test]
fn comment_is_removed() {
    let macros = MacroRegistry::with_defaults();
    let mut doc = document(vec![
        BlockNode::paragraph(vec![BlockNode::word("before")]),
        BlockNode::macro_call(MacroBlock::new("comment").with_content("hidden")),
        BlockNode::paragraph(vec![BlockNode::word("after")]),
    ]);

    let report = MacroTransformation::new(&macros).transform(&mut doc).unwrap();

    assert_eq!(
        top(&doc),
        vec![
            BlockNode::paragraph(vec![BlockNode::word("before")]),
            BlockNode::paragraph(vec![BlockNode::word("after")]),
        ]
    );
    assert_eq!(report.passes, 1);
    assert_eq!(report.executed, 1);
    assert!(report.errors.is_empty());
    assert!(doc.errors().is_empty());
}

#[test]
fn failing_calls_do_not_stop_their_siblings() {
    let mut macros = MacroRegistry::with_defaults();
    macros.register(Failing);
    let mut doc = document(vec![
        call("nosuch"),
        call("boom"),
        BlockNode::macro_call(MacroBlock::new("info").with_content("All good")),
    ]);

    let report = MacroTransformation::new(&macros).transform(&mut doc).unwrap();
    let children = top(&doc);

    assert_eq!(children.len(), 3);
    assert_eq!(error_description(&children[0]), "unknown macro [nosuch]");
    assert_eq!(error_description(&children[1]), "macro [boom] failed: boom");
    assert_eq!(
        children[2].block,
        Block::group(parameters([("class", "box infomessage")]))
    );
    assert_eq!(
        report.errors,
        vec![
            DocumentError::UnresolvedMacro {
                id: "nosuch".to_string()
            },
            DocumentError::MacroExecution {
                id: "boom".to_string(),
                message: "boom".to_string()
            },
        ]
    );
    assert_eq!(doc.errors(), report.errors.as_slice());
    assert_eq!(report.executed, 1);
}

#[test]
fn malformed_output_becomes_a_single_error_marker() {
    let log = Log::default();
    let mut macros = MacroRegistry::new();
    let malformed = BlockNode::with_children(Block::word("leaf"), vec![BlockNode::word("child")]);
    macros.register(
        Recorder::new("bad", &log).with_output(vec![BlockNode::word("partial"), malformed]),
    );
    let mut doc = document(vec![BlockNode::word("before"), call("bad"), BlockNode::word("after")]);

    let report = MacroTransformation::new(&macros).transform(&mut doc).unwrap();
    let children = top(&doc);

    assert_eq!(children.len(), 3);
    assert_eq!(children[0], BlockNode::word("before"));
    assert_eq!(
        error_description(&children[1]),
        "macro [bad] failed: a Word block cannot have children"
    );
    assert_eq!(children[2], BlockNode::word("after"));
    assert_eq!(report.executed, 0);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(doc.errors(), report.errors.as_slice());
}

#[test]
fn panicking_macro_is_isolated() {
    let mut macros = MacroRegistry::with_defaults();
    macros.register(Panicking);
    let mut doc = document(vec![call("panic"), call("comment")]);

    let report = MacroTransformation::new(&macros).transform(&mut doc).unwrap();
    let children = top(&doc);

    assert_eq!(children.len(), 1);
    let description = error_description(&children[0]);
    assert!(description.contains("panicked: kaboom"), "{}", description);
    assert_eq!(report.executed, 1);
}

#[test]
fn self_reproducing_macro_stops_at_pass_limit() {
    let log = Log::default();
    let mut macros = MacroRegistry::new();
    macros.register(Recorder::new("echo", &log).with_output(vec![call("echo")]));
    let mut doc = document(vec![call("echo")]);

    let config = TransformConfig {
        max_passes: 3,
        ..TransformConfig::default()
    };
    let report = MacroTransformation::new(&macros)
        .with_config(config)
        .transform(&mut doc)
        .unwrap();

    assert_eq!(report.passes, 3);
    assert_eq!(report.executed, 3);
    assert_eq!(
        report.errors,
        vec![DocumentError::RecursionLimit {
            id: "echo".to_string(),
            limit: 3
        }]
    );
    assert!(matches!(top(&doc)[0].block, Block::Error(_)));
}

#[test]
fn macro_output_is_expanded_in_a_later_pass() {
    let log = Log::default();
    let mut macros = MacroRegistry::with_defaults();
    let inner = BlockNode::macro_call(MacroBlock::new("info").with_content("nested"));
    macros.register(Recorder::new("outer", &log).with_output(vec![inner]));
    let mut doc = document(vec![call("outer")]);

    let report = MacroTransformation::new(&macros).transform(&mut doc).unwrap();

    assert_eq!(report.passes, 2);
    assert_eq!(report.executed, 2);
    let children = top(&doc);
    assert_eq!(
        children[0].block,
        Block::group(parameters([("class", "box infomessage")]))
    );
    assert_eq!(
        children[0].children,
        vec![BlockNode::paragraph(vec![BlockNode::word("nested")])]
    );
}

fn priority_registry(log: &Log) -> MacroRegistry {
    let mut macros = MacroRegistry::new();
    macros.register(Recorder::new("late", log).with_priority(10));
    macros.register(
        Recorder::new("early", log)
            .with_priority(-1)
            .with_output(vec![call("mid")]),
    );
    macros.register(Recorder::new("mid", log));
    macros
}

#[test]
fn priorities_order_each_pass() {
    let log = Log::default();
    let macros = priority_registry(&log);
    let mut doc = document(vec![call("late"), call("early")]);

    let report = MacroTransformation::new(&macros).transform(&mut doc).unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["early", "late", "mid"]);
    assert_eq!(report.passes, 2);
}

#[test]
fn global_priorities_hold_back_later_groups() {
    let log = Log::default();
    let macros = priority_registry(&log);
    let mut doc = document(vec![call("late"), call("early")]);

    let config = TransformConfig {
        priority_scope: PriorityScope::Global,
        ..TransformConfig::default()
    };
    let report = MacroTransformation::new(&macros)
        .with_config(config)
        .transform(&mut doc)
        .unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["early", "mid", "late"]);
    assert_eq!(report.passes, 3);
    assert!(top(&doc).is_empty());
}

#[test]
fn raw_filter_suppresses_scripts() {
    let macros = MacroRegistry::with_defaults();
    let mut doc = document(vec![
        BlockNode::macro_call(MacroBlock::new("html").with_content("<script>alert(1)</script>")),
        BlockNode::macro_call(MacroBlock::new("html").with_content("<b>ok</b>")),
    ]);
    let seen = Log::default();
    let filter = {
        let seen = Arc::clone(&seen);
        move |event: &RawContentEvent<'_>| {
            seen.lock().unwrap().push(event.macro_id.to_string());
            if event.content.contains("<script") {
                RawDecision::Suppress
            } else {
                RawDecision::Allow
            }
        }
    };

    let report = MacroTransformation::new(&macros)
        .with_raw_filter(&filter)
        .transform(&mut doc)
        .unwrap();

    assert_eq!(
        top(&doc),
        vec![BlockNode::new(Block::raw(Syntax::html_5_0(), "<b>ok</b>"))]
    );
    assert_eq!(report.filtered, 1);
    assert_eq!(report.executed, 2);
    assert_eq!(*seen.lock().unwrap(), vec!["html", "html"]);
}

#[test]
fn raw_filter_can_rewrite_content() {
    let macros = MacroRegistry::with_defaults();
    let mut doc = document(vec![BlockNode::macro_call(
        MacroBlock::new("html").with_content("<iframe src=x>"),
    )]);
    let filter = |_: &RawContentEvent<'_>| RawDecision::Replace("<!-- removed -->".to_string());

    let report = MacroTransformation::new(&macros)
        .with_raw_filter(&filter)
        .transform(&mut doc)
        .unwrap();

    assert_eq!(
        top(&doc),
        vec![BlockNode::new(Block::raw(
            Syntax::html_5_0(),
            "<!-- removed -->"
        ))]
    );
    assert_eq!(report.filtered, 1);
}

#[test]
fn content_is_loaded_from_the_content_source() {
    let macros = MacroRegistry::with_defaults();
    let source = StaticContentSource::new().with_entry("attachment", "note.txt", "Stored note");
    let mut doc = document(vec![
        BlockNode::macro_call(
            MacroBlock::new("warning")
                .with_content_source(ContentSourceReference::new("attachment", "note.txt")),
        ),
        BlockNode::macro_call(
            MacroBlock::new("info")
                .with_content_source(ContentSourceReference::new("attachment", "gone.txt")),
        ),
    ]);

    let report = MacroTransformation::new(&macros)
        .with_content_source(&source)
        .transform(&mut doc)
        .unwrap();
    let children = top(&doc);

    assert_eq!(
        children[0].children,
        vec![BlockNode::paragraph(BlockNode::words("Stored note"))]
    );
    assert!(matches!(
        &report.errors[..],
        [DocumentError::ContentNotFound {
            id,
            cause: ContentNotFoundError::Missing { .. },
        }] if id == "info"
    ));
    assert!(matches!(children[1].block, Block::Error(_)));
}

#[test]
fn content_is_parsed_in_the_document_syntax() {
    let syntaxes = SyntaxRegistry::with_defaults();
    let macros = MacroRegistry::with_defaults();
    let content = serde_json::json!({
        "type": "document",
        "children": [{ "type": "horizontal-line" }]
    })
    .to_string();
    let source = serde_json::json!({
        "type": "document",
        "children": [{ "type": "macro", "id": "info", "content": { "text": content } }]
    })
    .to_string();
    let mut doc = syntaxes.parse(&source, &Syntax::xdom_json_1_0()).unwrap();

    MacroTransformation::new(&macros)
        .with_syntaxes(&syntaxes)
        .transform(&mut doc)
        .unwrap();

    assert_eq!(
        top(&doc)[0].children,
        vec![BlockNode::new(Block::HorizontalLine {
            parameters: Parameters::new()
        })]
    );
}

#[test]
fn inline_call_of_block_macro_is_rejected() {
    let log = Log::default();
    let mut macros = MacroRegistry::new();
    macros.register(Recorder::new("toc", &log));
    let mut doc = document(vec![BlockNode::paragraph(vec![
        BlockNode::word("see"),
        BlockNode::space(),
        BlockNode::macro_call(MacroBlock::new("toc").inline(true)),
    ])]);

    let report = MacroTransformation::new(&macros).transform(&mut doc).unwrap();

    assert!(log.lock().unwrap().is_empty());
    assert_eq!(
        report.errors,
        vec![DocumentError::InlineNotSupported {
            id: "toc".to_string()
        }]
    );
    let paragraph = &top(&doc)[0];
    match &paragraph.children[2].block {
        Block::Error(error) => assert!(error.inline),
        other => panic!("Expected an error block, got {:?}", other),
    }
}

#[test]
fn cancellation_between_macros_keeps_the_tree_consistent() {
    let token = CancellationToken::new();
    let mut macros = MacroRegistry::with_defaults();
    macros.register(Stop(token.clone()));
    let mut doc = document(vec![call("stop"), call("comment")]);

    let result = MacroTransformation::new(&macros)
        .with_cancellation(token)
        .transform(&mut doc);

    assert_eq!(result, Err(TransformError::Cancelled { passes: 1 }));
    assert_eq!(top(&doc), vec![BlockNode::word("stopped"), call("comment")]);
}

#[test]
fn transformation_is_reusable() {
    let macros = MacroRegistry::with_defaults();
    let transformation = MacroTransformation::new(&macros);

    for _ in 0..2 {
        let mut doc = document(vec![call("comment")]);
        let report = transformation.transform(&mut doc).unwrap();
        assert_eq!(report.executed, 1);
        assert!(top(&doc).is_empty());
    }
}
