//! Tokens to document tree.
//!
//! Block tokens are turned into block nodes here; inline content (paragraph
//! text, heading titles, link labels) is tokenized again with the inline
//! tokenizer by [`parse_inline`]. Function-call tokens become unevaluated
//! [`FunctionCallNode`](crate::ast::FunctionCallNode)s.

pub mod call;
pub mod inline;

use crate::ast::{Node, NodeRef};
use crate::context::Context;
use crate::function::call::shared;
use crate::lexer::{Token, TokenKind};
use std::rc::Rc;
use tracing::debug;

pub use call::{argument_expression, build_call};
pub use inline::parse_inline;

/// Builds nodes from source within a context
pub trait ParserFactory {
    /// Root of a whole document, from its block tokens
    fn document(&self, tokens: &[Token], ctx: &mut Context) -> NodeRef;

    fn blocks(&self, source: &str, offset: usize, ctx: &mut Context) -> Vec<NodeRef>;

    fn inline(&self, source: &str, offset: usize, ctx: &mut Context) -> Vec<NodeRef>;
}

/// Parser of the default grammar
#[derive(Debug, Clone, Copy, Default)]
pub struct FolioParser;

impl ParserFactory for FolioParser {
    fn document(&self, tokens: &[Token], ctx: &mut Context) -> NodeRef {
        parse_tokens(tokens, ctx)
    }

    fn blocks(&self, source: &str, offset: usize, ctx: &mut Context) -> Vec<NodeRef> {
        parse_blocks(source, offset, ctx)
    }

    fn inline(&self, source: &str, offset: usize, ctx: &mut Context) -> Vec<NodeRef> {
        parse_inline(source, offset, ctx)
    }
}

/// Build the root of a document from its block tokens
pub fn parse_tokens(tokens: &[Token], ctx: &mut Context) -> NodeRef {
    let children = blocks(tokens, 0, ctx);
    debug!("Parsed {} top-level blocks", children.len());
    Rc::new(Node::Root { children })
}

/// Tokenize and parse `source` as block content. `offset` is its position
/// in the document, for spans.
pub fn parse_blocks(source: &str, offset: usize, ctx: &mut Context) -> Vec<NodeRef> {
    let flavor = ctx.flavor();
    let tokens = flavor.lexer().block().tokenize(source);
    blocks(&tokens, offset, ctx)
}

fn blocks(tokens: &[Token], offset: usize, ctx: &mut Context) -> Vec<NodeRef> {
    tokens
        .iter()
        .filter_map(|token| block(token, offset, ctx))
        .collect()
}

fn block(token: &Token, offset: usize, ctx: &mut Context) -> Option<NodeRef> {
    let start = offset + token.span.start;
    let group = |name: &str| token.group(name).map(str::to_string);

    let node = match token.kind {
        TokenKind::Newline => return None,
        TokenKind::FencedCode => {
            let content = token.group("code").unwrap_or("");
            Node::Code {
                language: group("lang").filter(|l| !l.is_empty()),
                content: content.strip_suffix('\n').unwrap_or(content).to_string(),
                caption: group("caption"),
                id: group("code_id").map(|id| id.trim().to_string()),
            }
        }
        TokenKind::MathBlock => Node::Math {
            expression: token.group("math").unwrap_or("").trim().to_string(),
            id: group("math_id").map(|id| id.trim().to_string()),
        },
        TokenKind::FunctionCall => {
            let call = token.call().and_then(|walked| build_call(walked, true, offset, ctx));
            return match call {
                Some(call) => Some(shared(call)),
                None => Some(Node::paragraph(parse_inline(&token.text, start, ctx))),
            };
        }
        TokenKind::Heading => {
            let text = token.group("heading").unwrap_or("");
            let text_offset = start + token.text.find(text).unwrap_or(0);
            Node::Heading {
                depth: token.group("hashes").map(str::len).unwrap_or(1),
                decorative: token.group("decorative").is_some(),
                id: group("heading_id").map(|id| id.trim().to_string()),
                children: parse_inline(text, text_offset, ctx),
            }
        }
        TokenKind::LinkDefinition => {
            let label = token.group("def_label").unwrap_or("");
            let url = token.group("def_url").unwrap_or("");
            let title = token.group("def_title");
            ctx.register_link_definition(label, url, title);
            Node::LinkDefinition {
                label: label.to_string(),
                url: url.to_string(),
                title: title.map(String::from),
            }
        }
        TokenKind::HorizontalRule => Node::HorizontalRule,
        TokenKind::PageBreak => Node::PageBreak,
        TokenKind::BlockQuote => {
            let inner: Vec<&str> = token
                .text
                .lines()
                .map(|line| {
                    let line = line.strip_prefix('>').unwrap_or(line);
                    line.strip_prefix(' ').unwrap_or(line)
                })
                .collect();
            Node::BlockQuote {
                children: parse_blocks(&inner.join("\n"), start, ctx),
            }
        }
        TokenKind::List => list(token, start, ctx),
        TokenKind::Paragraph => Node::Paragraph {
            children: parse_inline(token.text.trim_end(), start, ctx),
        },
        _ => Node::Paragraph {
            children: parse_inline(&token.text, start, ctx),
        },
    };

    Some(Rc::new(node))
}

fn list(token: &Token, start: usize, ctx: &mut Context) -> Node {
    let flavor = ctx.flavor();
    let items = flavor.lexer().list().tokenize(&token.text);

    let ordered = items
        .iter()
        .find_map(|item| item.group("marker"))
        .is_some_and(|marker| marker.ends_with('.'));

    let children = items
        .iter()
        .filter(|item| item.kind == TokenKind::ListItem)
        .map(|item| {
            let body = dedent_continuation(item.group("item").unwrap_or(""));
            Rc::new(Node::ListItem {
                children: parse_blocks(&body, start + item.span.start, ctx),
            })
        })
        .collect();

    Node::List { ordered, children }
}

/// Strip the common indentation of the lines after the first
fn dedent_continuation(item: &str) -> String {
    let mut lines = item.lines();
    let first = lines.next().unwrap_or("");
    let rest: Vec<&str> = lines.collect();

    let indent = rest
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out = first.to_string();
    for line in rest {
        out.push('\n');
        out.push_str(line.get(indent..).unwrap_or(line.trim_start()));
    }
    out
}
