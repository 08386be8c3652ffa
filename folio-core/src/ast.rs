//! Document tree.
//!
//! Nodes are immutable once built and shared as [`NodeRef`]. Facts computed
//! after parsing (locations, anchors, resolved citations) live in the
//! [`PropertyStore`](crate::property::PropertyStore), keyed by node identity,
//! so the tree never changes shape. The only interior mutability is the
//! compute-once children cell of a [`FunctionCallNode`].

use crate::bibliography::BibliographyEntry;
use crate::error::Span;
use crate::function::FunctionCall;
use once_cell::unsync::OnceCell;
use std::rc::Rc;

pub type NodeRef = Rc<Node>;

/// Document tree element
#[derive(Debug)]
pub enum Node {
    // Block nodes
    Root {
        children: Vec<NodeRef>,
    },
    Heading {
        depth: usize,
        decorative: bool,
        id: Option<String>,
        children: Vec<NodeRef>,
    },
    Paragraph {
        children: Vec<NodeRef>,
    },
    Code {
        language: Option<String>,
        content: String,
        caption: Option<String>,
        id: Option<String>,
    },
    Math {
        expression: String,
        id: Option<String>,
    },
    BlockQuote {
        children: Vec<NodeRef>,
    },
    List {
        ordered: bool,
        children: Vec<NodeRef>,
    },
    ListItem {
        children: Vec<NodeRef>,
    },
    HorizontalRule,
    PageBreak,
    LinkDefinition {
        label: String,
        url: String,
        title: Option<String>,
    },
    TableOfContentsView {
        title: Option<String>,
        max_depth: usize,
    },
    BibliographyView {
        title: Option<String>,
        entries: Vec<BibliographyEntry>,
    },
    SubdocumentLink {
        name: String,
        children: Vec<NodeRef>,
    },

    // Inline nodes
    Text(String),
    Emphasis {
        children: Vec<NodeRef>,
    },
    Strong {
        children: Vec<NodeRef>,
    },
    CodeSpan(String),
    InlineMath(String),
    Link {
        url: String,
        title: Option<String>,
        children: Vec<NodeRef>,
    },
    /// `[text][label]`; `label` is empty for `[text][]`
    ReferenceLink {
        label: String,
        source: String,
        children: Vec<NodeRef>,
    },
    Image {
        url: String,
        alt: String,
        title: Option<String>,
    },
    LineBreak,
    Citation {
        key: String,
    },
    CrossReference {
        id: String,
    },

    // Structural
    Container {
        children: Vec<NodeRef>,
    },
    FunctionCall(FunctionCallNode),
    Error {
        message: String,
        span: Span,
    },
    Empty,
}

/// Payload-free tag of a [`Node`] variant, used to route iterator callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Heading,
    Paragraph,
    Code,
    Math,
    BlockQuote,
    List,
    ListItem,
    HorizontalRule,
    PageBreak,
    LinkDefinition,
    TableOfContentsView,
    BibliographyView,
    SubdocumentLink,
    Text,
    Emphasis,
    Strong,
    CodeSpan,
    InlineMath,
    Link,
    ReferenceLink,
    Image,
    LineBreak,
    Citation,
    CrossReference,
    Container,
    FunctionCall,
    Error,
    Empty,
}

/// Kind of element that receives a number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberedKind {
    Heading,
    Code,
    Math,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Root { .. } => NodeKind::Root,
            Node::Heading { .. } => NodeKind::Heading,
            Node::Paragraph { .. } => NodeKind::Paragraph,
            Node::Code { .. } => NodeKind::Code,
            Node::Math { .. } => NodeKind::Math,
            Node::BlockQuote { .. } => NodeKind::BlockQuote,
            Node::List { .. } => NodeKind::List,
            Node::ListItem { .. } => NodeKind::ListItem,
            Node::HorizontalRule => NodeKind::HorizontalRule,
            Node::PageBreak => NodeKind::PageBreak,
            Node::LinkDefinition { .. } => NodeKind::LinkDefinition,
            Node::TableOfContentsView { .. } => NodeKind::TableOfContentsView,
            Node::BibliographyView { .. } => NodeKind::BibliographyView,
            Node::SubdocumentLink { .. } => NodeKind::SubdocumentLink,
            Node::Text(_) => NodeKind::Text,
            Node::Emphasis { .. } => NodeKind::Emphasis,
            Node::Strong { .. } => NodeKind::Strong,
            Node::CodeSpan(_) => NodeKind::CodeSpan,
            Node::InlineMath(_) => NodeKind::InlineMath,
            Node::Link { .. } => NodeKind::Link,
            Node::ReferenceLink { .. } => NodeKind::ReferenceLink,
            Node::Image { .. } => NodeKind::Image,
            Node::LineBreak => NodeKind::LineBreak,
            Node::Citation { .. } => NodeKind::Citation,
            Node::CrossReference { .. } => NodeKind::CrossReference,
            Node::Container { .. } => NodeKind::Container,
            Node::FunctionCall(_) => NodeKind::FunctionCall,
            Node::Error { .. } => NodeKind::Error,
            Node::Empty => NodeKind::Empty,
        }
    }

    /// Ordered children of nestable nodes; empty for leaves and for
    /// function calls that have not been evaluated
    pub fn children(&self) -> &[NodeRef] {
        match self {
            Node::Root { children }
            | Node::Heading { children, .. }
            | Node::Paragraph { children }
            | Node::BlockQuote { children }
            | Node::List { children, .. }
            | Node::ListItem { children }
            | Node::SubdocumentLink { children, .. }
            | Node::Emphasis { children }
            | Node::Strong { children }
            | Node::Link { children, .. }
            | Node::ReferenceLink { children, .. }
            | Node::Container { children } => children,
            Node::FunctionCall(call) => call.children(),
            _ => &[],
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Node::Root { .. }
                | Node::Heading { .. }
                | Node::Paragraph { .. }
                | Node::Code { .. }
                | Node::Math { .. }
                | Node::BlockQuote { .. }
                | Node::List { .. }
                | Node::ListItem { .. }
                | Node::HorizontalRule
                | Node::PageBreak
                | Node::LinkDefinition { .. }
                | Node::TableOfContentsView { .. }
                | Node::BibliographyView { .. }
                | Node::SubdocumentLink { .. }
        )
    }

    pub fn numbered_kind(&self) -> Option<NumberedKind> {
        match self {
            Node::Heading {
                decorative: false, ..
            } => Some(NumberedKind::Heading),
            Node::Code { caption, id, .. } if caption.is_some() || id.is_some() => {
                Some(NumberedKind::Code)
            }
            Node::Math { id: Some(_), .. } => Some(NumberedKind::Math),
            _ => None,
        }
    }

    /// Whether the location hook assigns this node a location
    pub fn is_location_trackable(&self) -> bool {
        self.numbered_kind().is_some()
    }

    /// Explicit `{#id}` of a referenceable node
    pub fn reference_id(&self) -> Option<&str> {
        match self {
            Node::Heading { id, .. } | Node::Code { id, .. } | Node::Math { id, .. } => id.as_deref(),
            _ => None,
        }
    }

    pub fn function_call(&self) -> Option<&FunctionCallNode> {
        match self {
            Node::FunctionCall(call) => Some(call),
            _ => None,
        }
    }

    /// Concatenated text content, markup stripped
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) | Node::CodeSpan(text) | Node::InlineMath(text) => out.push_str(text),
            Node::Image { alt, .. } => out.push_str(alt),
            Node::LineBreak => out.push(' '),
            Node::Code { content, .. } => out.push_str(content),
            Node::Math { expression, .. } => out.push_str(expression),
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }

    // Constructors

    pub fn text(text: impl Into<String>) -> NodeRef {
        Rc::new(Node::Text(text.into()))
    }

    pub fn paragraph(children: Vec<NodeRef>) -> NodeRef {
        Rc::new(Node::Paragraph { children })
    }

    pub fn container(children: Vec<NodeRef>) -> NodeRef {
        Rc::new(Node::Container { children })
    }

    pub fn empty() -> NodeRef {
        Rc::new(Node::Empty)
    }

    pub fn error(message: impl Into<String>, span: Span) -> NodeRef {
        Rc::new(Node::Error {
            message: message.into(),
            span,
        })
    }
}

/// Pointer identity of a node, the key of the property store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey(*const Node);

impl NodeKey {
    pub fn of(node: &NodeRef) -> Self {
        NodeKey(Rc::as_ptr(node))
    }
}

/// A function call site awaiting evaluation.
///
/// The children cell is filled exactly once; see
/// [`evaluate_calls`](crate::function::evaluate_calls).
#[derive(Debug)]
pub struct FunctionCallNode {
    pub call: FunctionCall,
    children: OnceCell<Vec<NodeRef>>,
}

impl FunctionCallNode {
    pub fn new(call: FunctionCall) -> Self {
        Self {
            call,
            children: OnceCell::new(),
        }
    }

    pub fn children(&self) -> &[NodeRef] {
        self.children.get().map(|c| c.as_slice()).unwrap_or(&[])
    }

    pub fn is_evaluated(&self) -> bool {
        self.children.get().is_some()
    }

    /// Store the evaluation output. Returns `false`, leaving the stored
    /// children untouched, when the node was already evaluated.
    pub fn set_children(&self, children: Vec<NodeRef>) -> bool {
        self.children.set(children).is_ok()
    }
}
