//! Property-based tests for the events ⇄ tree mapping
//!
//! Random well-formed trees covering every block type are flattened into events, rebuilt, and
//! compared:
//! - building a tree from a flattened tree yields the same tree and the same events
//! - the JSON interchange keeps the event sequence intact
//! - events survive their own JSON form

use proptest::collection::{btree_set, vec};
use proptest::prelude::*;
use quill_babel::format::{Parser, Renderer};
use quill_babel::formats::{JsonParser, JsonRenderer};
use quill_babel::ir::{
    Block, BlockNode, ErrorBlock, Event, ImageBlock, LinkBlock, ListKind, MacroBlock, Style,
    Styles,
};
use quill_babel::mappings::{build_tree, flatten, node_to_events};
use quill_babel::parameters::{parameters, Parameters};
use quill_babel::reference::{ResourceReference, ResourceType};
use quill_babel::Syntax;

fn params() -> impl Strategy<Value = Parameters> {
    vec(("[a-z]{1,5}", "[a-z0-9 ]{0,6}"), 0..3).prop_map(parameters)
}

fn syntax() -> impl Strategy<Value = Syntax> {
    prop::sample::select(vec![
        Syntax::html_5_0(),
        Syntax::plain_1_0(),
        Syntax::new("markdown", "1.2"),
    ])
}

fn reference() -> impl Strategy<Value = ResourceReference> {
    let types = vec![
        ResourceType::URL,
        ResourceType::DOCUMENT,
        ResourceType::ATTACHMENT,
        ResourceType::UNKNOWN,
    ];
    (prop::sample::select(types), "[a-zA-Z0-9.:/]{0,12}", any::<bool>(), params()).prop_map(
        |(resource_type, reference, typed, parameters)| ResourceReference {
            resource_type,
            reference,
            typed,
            parameters,
        },
    )
}

fn text_leaf() -> impl Strategy<Value = BlockNode> {
    prop_oneof![
        "[a-zA-Z0-9]{1,8}".prop_map(BlockNode::word),
        Just(BlockNode::space()),
        Just(BlockNode::new(Block::NewLine)),
        any::<char>().prop_map(|symbol| BlockNode::new(Block::SpecialSymbol { symbol })),
        (1usize..4).prop_map(|count| BlockNode::new(Block::EmptyLines { count })),
        ("\\PC{0,12}", any::<bool>(), params()).prop_map(|(content, inline, parameters)| {
            BlockNode::new(Block::Verbatim {
                content,
                inline,
                parameters,
            })
        }),
    ]
}

fn rich_leaf() -> impl Strategy<Value = BlockNode> {
    prop_oneof![
        params().prop_map(|parameters| BlockNode::new(Block::HorizontalLine { parameters })),
        (syntax(), "[a-z<>/ ]{0,12}")
            .prop_map(|(syntax, content)| BlockNode::new(Block::Raw { syntax, content })),
        (reference(), proptest::option::of("[a-z ]{1,8}"), any::<bool>()).prop_map(
            |(reference, label, freestanding)| {
                BlockNode::new(Block::Link(LinkBlock {
                    reference,
                    label,
                    freestanding,
                }))
            }
        ),
        (reference(), any::<bool>(), params()).prop_map(|(reference, freestanding, parameters)| {
            BlockNode::new(Block::Image(ImageBlock {
                reference,
                freestanding,
                parameters,
            }))
        }),
        ("[a-z ]{1,10}", proptest::option::of(syntax()), any::<bool>()).prop_map(
            |(description, syntax, inline)| {
                BlockNode::new(Block::Error(ErrorBlock {
                    description,
                    syntax,
                    inline,
                }))
            }
        ),
    ]
}

fn leaf() -> impl Strategy<Value = BlockNode> {
    prop_oneof![3 => text_leaf(), 1 => rich_leaf()]
}

fn styles() -> impl Strategy<Value = Styles> {
    let all = vec![
        Style::Bold,
        Style::Italic,
        Style::Underlined,
        Style::Strikedout,
        Style::Superscript,
        Style::Subscript,
        Style::Monospace,
    ];
    btree_set(prop::sample::select(all), 0..3)
}

/// Containers that accept any children.
fn wrapper() -> impl Strategy<Value = Block> {
    prop_oneof![
        params().prop_map(|parameters| Block::Paragraph { parameters }),
        params().prop_map(Block::group),
        (1usize..6, params()).prop_map(|(level, parameters)| Block::Section { level, parameters }),
        (1usize..6, proptest::option::of("H[a-z]{1,6}"), params())
            .prop_map(|(level, id, parameters)| Block::Header {
                level,
                id,
                parameters,
            }),
        params().prop_map(|parameters| Block::Quotation { parameters }),
        (styles(), params()).prop_map(|(styles, parameters)| Block::Format { styles, parameters }),
        params().prop_map(|metadata| Block::MetaData { metadata }),
        ("[a-z]{1,6}", params(), proptest::option::of("[a-z ]{0,8}"), any::<bool>()).prop_map(
            |(id, parameters, content, inline)| {
                let mut call = MacroBlock::new(id).inline(inline);
                call.parameters = parameters;
                if let Some(content) = content {
                    call = call.with_content(content);
                }
                Block::Macro(call)
            }
        ),
    ]
}

fn tree() -> impl Strategy<Value = BlockNode> {
    leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            (wrapper(), vec(inner.clone(), 0..6))
                .prop_map(|(block, children)| BlockNode::with_children(block, children)),
            (any::<bool>(), params(), vec(inner.clone(), 1..4)).prop_map(
                |(numbered, parameters, items)| {
                    let kind = if numbered {
                        ListKind::Numbered
                    } else {
                        ListKind::Bulleted
                    };
                    let items = items
                        .into_iter()
                        .map(|item| {
                            BlockNode::with_children(
                                Block::ListItem {
                                    parameters: Parameters::new(),
                                },
                                vec![item],
                            )
                        })
                        .collect();
                    BlockNode::with_children(Block::List { kind, parameters }, items)
                }
            ),
            (params(), vec((inner.clone(), inner.clone()), 1..3)).prop_map(
                |(parameters, entries)| {
                    let mut children = Vec::new();
                    for (term, description) in entries {
                        children.push(BlockNode::with_children(
                            Block::DefinitionTerm {
                                parameters: Parameters::new(),
                            },
                            vec![term],
                        ));
                        children.push(BlockNode::with_children(
                            Block::DefinitionDescription {
                                parameters: Parameters::new(),
                            },
                            vec![description],
                        ));
                    }
                    BlockNode::with_children(Block::DefinitionList { parameters }, children)
                }
            ),
            (params(), vec(vec((any::<bool>(), inner), 1..3), 1..3)).prop_map(
                |(parameters, rows)| {
                    let rows = rows
                        .into_iter()
                        .map(|cells| {
                            let cells = cells
                                .into_iter()
                                .map(|(header, content)| {
                                    BlockNode::with_children(
                                        Block::TableCell {
                                            header,
                                            parameters: Parameters::new(),
                                        },
                                        vec![content],
                                    )
                                })
                                .collect();
                            BlockNode::with_children(
                                Block::TableRow {
                                    parameters: Parameters::new(),
                                },
                                cells,
                            )
                        })
                        .collect();
                    BlockNode::with_children(Block::Table { parameters }, rows)
                }
            ),
        ]
    })
}

fn document() -> impl Strategy<Value = BlockNode> {
    (params(), vec(tree(), 0..5)).prop_map(|(parameters, children)| {
        BlockNode::with_children(Block::Document { parameters }, children)
    })
}

proptest! {
    #[test]
    fn flatten_inverts_build_tree(root in document()) {
        let events = node_to_events(&root);
        let doc = build_tree(events.clone()).unwrap();
        prop_assert_eq!(flatten(&doc), events);
        prop_assert_eq!(doc.to_root_node(), root);
    }

    #[test]
    fn json_interchange_is_lossless(root in document()) {
        let events = node_to_events(&root);
        let json = JsonRenderer.render(&events).unwrap();
        let doc = JsonParser.parse_document(&json).unwrap();
        prop_assert_eq!(flatten(&doc), events);
    }

    #[test]
    fn event_json_keeps_every_payload(root in document()) {
        let events = node_to_events(&root);
        let json = serde_json::to_string(&events).unwrap();
        let decoded: Vec<Event> = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded, events);
    }

    #[test]
    fn stream_without_end_document_is_rejected(root in document()) {
        let events = node_to_events(&root);
        let cut = events.len() - 1;
        prop_assert!(build_tree(events[..cut].to_vec()).is_err());
    }
}

#[test]
fn empty_stream_builds_empty_document() {
    let doc = build_tree(Vec::new()).unwrap();
    assert!(doc.children(doc.root()).is_empty());
    assert!(doc.errors().is_empty());
}
