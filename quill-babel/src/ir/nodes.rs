//! Block payloads of the XDOM tree.
//!
//!     A [`Block`] is the data held by one tree node, without its children. Container blocks
//!     correspond to a `Begin*`/`End*` event pair, leaf blocks to a single event. The owning
//!     tree lives in [`Document`](crate::ir::document::Document); [`BlockNode`] is the detached,
//!     owned form of a subtree used for macro output and for interchange.

use crate::ir::events::{ListKind, Styles};
use crate::parameters::Parameters;
use crate::reference::ResourceReference;
use crate::syntax::Syntax;
use serde::{Deserialize, Serialize};

/// Points at macro content stored outside the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentSourceReference {
    /// Which content source to ask (e.g. `attachment`, `file`).
    pub source: String,
    pub reference: String,
}

impl ContentSourceReference {
    pub fn new(source: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            reference: reference.into(),
        }
    }
}

/// Macro content, either written inline or stored elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MacroContent {
    Text(String),
    Source(ContentSourceReference),
}

/// A macro call awaiting execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroBlock {
    pub id: String,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub content: Option<MacroContent>,
    #[serde(default)]
    pub inline: bool,
}

impl MacroBlock {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parameters: Parameters::new(),
            content: None,
            inline: false,
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(MacroContent::Text(content.into()));
        self
    }

    pub fn with_content_source(mut self, source: ContentSourceReference) -> Self {
        self.content = Some(MacroContent::Source(source));
        self
    }

    pub fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkBlock {
    pub reference: ResourceReference,
    #[serde(default)]
    pub label: Option<String>,
    /// Written as a bare reference in the source (e.g. an autolinked URL).
    #[serde(default)]
    pub freestanding: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub reference: ResourceReference,
    #[serde(default)]
    pub freestanding: bool,
    #[serde(default)]
    pub parameters: Parameters,
}

/// Inert marker left where something could not be parsed or transformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBlock {
    pub description: String,
    #[serde(default)]
    pub syntax: Option<Syntax>,
    #[serde(default)]
    pub inline: bool,
}

impl ErrorBlock {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            syntax: None,
            inline: false,
        }
    }
}

/// Data held by a single tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Block {
    Document {
        #[serde(default)]
        parameters: Parameters,
    },
    Section {
        level: usize,
        #[serde(default)]
        parameters: Parameters,
    },
    Header {
        level: usize,
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        parameters: Parameters,
    },
    Paragraph {
        #[serde(default)]
        parameters: Parameters,
    },
    List {
        kind: ListKind,
        #[serde(default)]
        parameters: Parameters,
    },
    ListItem {
        #[serde(default)]
        parameters: Parameters,
    },
    DefinitionList {
        #[serde(default)]
        parameters: Parameters,
    },
    DefinitionTerm {
        #[serde(default)]
        parameters: Parameters,
    },
    DefinitionDescription {
        #[serde(default)]
        parameters: Parameters,
    },
    Table {
        #[serde(default)]
        parameters: Parameters,
    },
    TableRow {
        #[serde(default)]
        parameters: Parameters,
    },
    TableCell {
        #[serde(default)]
        header: bool,
        #[serde(default)]
        parameters: Parameters,
    },
    Quotation {
        #[serde(default)]
        parameters: Parameters,
    },
    Group {
        #[serde(default)]
        parameters: Parameters,
    },
    Format {
        #[serde(default)]
        styles: Styles,
        #[serde(default)]
        parameters: Parameters,
    },
    Macro(MacroBlock),
    MetaData {
        #[serde(default)]
        metadata: Parameters,
    },
    Word {
        text: String,
    },
    Space,
    SpecialSymbol {
        symbol: char,
    },
    NewLine,
    EmptyLines {
        count: usize,
    },
    HorizontalLine {
        #[serde(default)]
        parameters: Parameters,
    },
    Verbatim {
        content: String,
        #[serde(default)]
        inline: bool,
        #[serde(default)]
        parameters: Parameters,
    },
    Raw {
        syntax: Syntax,
        content: String,
    },
    Link(LinkBlock),
    Image(ImageBlock),
    Error(ErrorBlock),
}

/// Discriminant of [`Block`], used as a traversal filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Document,
    Section,
    Header,
    Paragraph,
    List,
    ListItem,
    DefinitionList,
    DefinitionTerm,
    DefinitionDescription,
    Table,
    TableRow,
    TableCell,
    Quotation,
    Group,
    Format,
    Macro,
    MetaData,
    Word,
    Space,
    SpecialSymbol,
    NewLine,
    EmptyLines,
    HorizontalLine,
    Verbatim,
    Raw,
    Link,
    Image,
    Error,
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Document { .. } => BlockKind::Document,
            Block::Section { .. } => BlockKind::Section,
            Block::Header { .. } => BlockKind::Header,
            Block::Paragraph { .. } => BlockKind::Paragraph,
            Block::List { .. } => BlockKind::List,
            Block::ListItem { .. } => BlockKind::ListItem,
            Block::DefinitionList { .. } => BlockKind::DefinitionList,
            Block::DefinitionTerm { .. } => BlockKind::DefinitionTerm,
            Block::DefinitionDescription { .. } => BlockKind::DefinitionDescription,
            Block::Table { .. } => BlockKind::Table,
            Block::TableRow { .. } => BlockKind::TableRow,
            Block::TableCell { .. } => BlockKind::TableCell,
            Block::Quotation { .. } => BlockKind::Quotation,
            Block::Group { .. } => BlockKind::Group,
            Block::Format { .. } => BlockKind::Format,
            Block::Macro(_) => BlockKind::Macro,
            Block::MetaData { .. } => BlockKind::MetaData,
            Block::Word { .. } => BlockKind::Word,
            Block::Space => BlockKind::Space,
            Block::SpecialSymbol { .. } => BlockKind::SpecialSymbol,
            Block::NewLine => BlockKind::NewLine,
            Block::EmptyLines { .. } => BlockKind::EmptyLines,
            Block::HorizontalLine { .. } => BlockKind::HorizontalLine,
            Block::Verbatim { .. } => BlockKind::Verbatim,
            Block::Raw { .. } => BlockKind::Raw,
            Block::Link(_) => BlockKind::Link,
            Block::Image(_) => BlockKind::Image,
            Block::Error(_) => BlockKind::Error,
        }
    }

    /// Whether this block is written as a `Begin*`/`End*` pair.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Block::Document { .. }
                | Block::Section { .. }
                | Block::Header { .. }
                | Block::Paragraph { .. }
                | Block::List { .. }
                | Block::ListItem { .. }
                | Block::DefinitionList { .. }
                | Block::DefinitionTerm { .. }
                | Block::DefinitionDescription { .. }
                | Block::Table { .. }
                | Block::TableRow { .. }
                | Block::TableCell { .. }
                | Block::Quotation { .. }
                | Block::Group { .. }
                | Block::Format { .. }
                | Block::Macro(_)
                | Block::MetaData { .. }
        )
    }

    pub fn paragraph() -> Self {
        Block::Paragraph {
            parameters: Parameters::new(),
        }
    }

    pub fn word(text: impl Into<String>) -> Self {
        Block::Word { text: text.into() }
    }

    pub fn group(parameters: Parameters) -> Self {
        Block::Group { parameters }
    }

    pub fn raw(syntax: Syntax, content: impl Into<String>) -> Self {
        Block::Raw {
            syntax,
            content: content.into(),
        }
    }
}

/// A detached subtree: a block and the blocks it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockNode {
    #[serde(flatten)]
    pub block: Block,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BlockNode>,
}

impl BlockNode {
    pub fn new(block: Block) -> Self {
        Self {
            block,
            children: Vec::new(),
        }
    }

    pub fn with_children(block: Block, children: Vec<BlockNode>) -> Self {
        Self { block, children }
    }

    pub fn paragraph(children: Vec<BlockNode>) -> Self {
        Self::with_children(Block::paragraph(), children)
    }

    pub fn word(text: impl Into<String>) -> Self {
        Self::new(Block::word(text))
    }

    pub fn space() -> Self {
        Self::new(Block::Space)
    }

    pub fn macro_call(call: MacroBlock) -> Self {
        Self::new(Block::Macro(call))
    }

    /// Splits `text` on spaces into word and space nodes.
    pub fn words(text: &str) -> Vec<BlockNode> {
        let mut nodes = Vec::new();
        for (index, word) in text.split(' ').enumerate() {
            if index > 0 {
                nodes.push(Self::space());
            }
            if !word.is_empty() {
                nodes.push(Self::word(word));
            }
        }
        nodes
    }

    /// Kind of the first block in this subtree that has children without being a container.
    pub fn misplaced_children(&self) -> Option<BlockKind> {
        if !self.children.is_empty() && !self.block.is_container() {
            return Some(self.block.kind());
        }
        self.children.iter().find_map(BlockNode::misplaced_children)
    }

    /// Number of nodes in this subtree, itself included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(BlockNode::size).sum::<usize>()
    }
}
