//! Inline content.

use super::call::build_call;
use crate::ast::{Node, NodeRef};
use crate::context::Context;
use crate::function::call::shared;
use crate::lexer::{Token, TokenKind};
use std::rc::Rc;

/// Tokenize and parse `source` as inline content. Adjacent text runs are
/// merged into one text node.
pub fn parse_inline(source: &str, offset: usize, ctx: &mut Context) -> Vec<NodeRef> {
    let flavor = ctx.flavor();
    let tokens = flavor.lexer().inline().tokenize(source);

    let mut nodes: Vec<NodeRef> = Vec::with_capacity(tokens.len());
    let mut text = String::new();

    for token in &tokens {
        match token.kind {
            TokenKind::Text => text.push_str(&token.text),
            TokenKind::Escape => text.push_str(token.group("escaped").unwrap_or("")),
            _ => {
                if !text.is_empty() {
                    nodes.push(Node::text(std::mem::take(&mut text)));
                }
                match inline(token, offset, ctx) {
                    Some(node) => nodes.push(node),
                    None => text.push_str(&token.text),
                }
            }
        }
    }
    if !text.is_empty() {
        nodes.push(Node::text(text));
    }
    nodes
}

fn inline(token: &Token, offset: usize, ctx: &mut Context) -> Option<NodeRef> {
    let start = offset + token.span.start;
    let group = |name: &str| token.group(name).map(str::to_string);

    let node = match token.kind {
        TokenKind::CodeSpan => Node::CodeSpan(group("code_span")?),
        TokenKind::InlineMath => Node::InlineMath(group("inline_math")?),
        TokenKind::FunctionCall => {
            let walked = token.call()?;
            return build_call(walked, false, offset, ctx).map(shared);
        }
        TokenKind::Image => Node::Image {
            url: group("image_url")?,
            alt: group("image_alt").unwrap_or_default(),
            title: group("image_title"),
        },
        TokenKind::Citation => Node::Citation { key: group("cite")? },
        TokenKind::Link => {
            let text = token.group("link_text")?;
            Node::Link {
                url: group("link_url")?,
                title: group("link_title"),
                children: parse_inline(text, start + 1, ctx),
            }
        }
        TokenKind::ReferenceLink => {
            let text = token.group("ref_text")?;
            Node::ReferenceLink {
                label: group("ref_label").unwrap_or_default(),
                source: token.text.clone(),
                children: parse_inline(text, start + 1, ctx),
            }
        }
        TokenKind::Strong => {
            let inner = token.group("strong").or_else(|| token.group("strong_alt"))?;
            Node::Strong {
                children: parse_inline(inner, start + 2, ctx),
            }
        }
        TokenKind::Emphasis => {
            let inner = token.group("emphasis").or_else(|| token.group("emphasis_alt"))?;
            Node::Emphasis {
                children: parse_inline(inner, start + 1, ctx),
            }
        }
        TokenKind::LineBreak => Node::LineBreak,
        _ => return None,
    };

    Some(Rc::new(node))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Vec<NodeRef> {
        let mut ctx = Context::default();
        parse_inline(source, 0, &mut ctx)
    }

    #[test]
    fn test_nested_markup() {
        let nodes = parse("a **b _c_** d");
        assert_eq!(nodes.len(), 3);
        match nodes[1].as_ref() {
            Node::Strong { children } => {
                assert!(matches!(children[1].as_ref(), Node::Emphasis { .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_escape_merges_into_text() {
        let nodes = parse(r"1\*2\*3");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].plain_text(), "1*2*3");
    }

    #[test]
    fn test_inline_call_is_unevaluated_node() {
        let nodes = parse("sum: .sum {1} {2}!");
        let call = nodes[1].function_call().unwrap();
        assert_eq!(call.call.name, "sum");
        assert!(!call.call.is_block);
        assert_eq!(call.call.span.start, 5);
        assert_eq!(nodes[2].plain_text(), "!");
    }

    #[test]
    fn test_links_and_citations() {
        let nodes = parse("[docs][] and [site](https://x.org) [@knuth]");
        assert!(matches!(nodes[0].as_ref(), Node::ReferenceLink { label, .. } if label.is_empty()));
        assert!(matches!(nodes[2].as_ref(), Node::Link { url, .. } if url == "https://x.org"));
        assert!(matches!(nodes[4].as_ref(), Node::Citation { key } if key == "knuth"));
    }
}
