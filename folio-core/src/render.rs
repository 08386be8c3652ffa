//! Output rendering.
//!
//! Renderers read the resolved tree together with the context's property
//! store: numbers, anchors and resolved references are properties, not
//! part of the nodes.

use crate::ast::{Node, NodeRef};
use crate::context::Context;
use crate::error::Result;
use crate::property::{
    CitationEntryProperty, CrossReferenceTargetProperty, FormattedLocationProperty, ResolvedLinkProperty,
};

pub trait Renderer {
    fn render(&self, root: &NodeRef, ctx: &Context) -> Result<String>;

    /// Frame rendered content as a complete document
    fn wrap(&self, content: String, ctx: &Context) -> Result<String>;
}

/// Renders a readable plain-text version of a document
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl Renderer for PlainTextRenderer {
    fn render(&self, root: &NodeRef, ctx: &Context) -> Result<String> {
        Ok(self.blocks(root.children(), ctx).join("\n\n"))
    }

    fn wrap(&self, content: String, ctx: &Context) -> Result<String> {
        let Some(name) = &ctx.document.name else {
            return Ok(content);
        };
        let rule = "=".repeat(name.chars().count());
        Ok(format!("{}\n{}\n\n{}\n", name, rule, content))
    }
}

impl PlainTextRenderer {
    /// Rendered blocks of `nodes`, splicing containers and call outputs
    fn blocks(&self, nodes: &[NodeRef], ctx: &Context) -> Vec<String> {
        let mut out = Vec::new();
        for node in nodes {
            match node.as_ref() {
                Node::Container { children } => out.extend(self.blocks(children, ctx)),
                Node::FunctionCall(call) => out.extend(self.blocks(call.children(), ctx)),
                Node::Empty | Node::LinkDefinition { .. } => {}
                _ if node.is_block() => out.push(self.block(node, ctx)),
                _ => out.push(self.inline(node, ctx)),
            }
        }
        out.retain(|block| !block.is_empty());
        out
    }

    fn block(&self, node: &NodeRef, ctx: &Context) -> String {
        let number = ctx.properties.value::<FormattedLocationProperty>(node);

        match node.as_ref() {
            Node::Heading { depth, children, .. } => {
                let marker = "#".repeat(*depth);
                let text = self.inlines(children, ctx);
                match number {
                    Some(number) => format!("{} {} {}", marker, number, text),
                    None => format!("{} {}", marker, text),
                }
            }
            Node::Paragraph { children } => self.inlines(children, ctx),
            Node::Code {
                language,
                content,
                caption,
                ..
            } => {
                let mut out = format!("```{}\n{}\n```", language.as_deref().unwrap_or(""), content);
                let label = match (number, caption) {
                    (Some(number), Some(caption)) => Some(format!("{}: {}", number, caption)),
                    (Some(number), None) => Some(number.clone()),
                    (None, Some(caption)) => Some(caption.clone()),
                    (None, None) => None,
                };
                if let Some(label) = label {
                    out.push('\n');
                    out.push_str(&label);
                }
                out
            }
            Node::Math { expression, .. } => match number {
                Some(number) => format!("$$ {} $$ {}", expression, number),
                None => format!("$$ {} $$", expression),
            },
            Node::BlockQuote { children } => self
                .blocks(children, ctx)
                .join("\n\n")
                .lines()
                .map(|line| format!("> {}", line).trim_end().to_string())
                .collect::<Vec<_>>()
                .join("\n"),
            Node::List { ordered, children } => children
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let marker = if *ordered {
                        format!("{}.", i + 1)
                    } else {
                        "-".to_string()
                    };
                    let body = self.blocks(item.children(), ctx).join("\n\n");
                    let indent = " ".repeat(marker.len() + 1);
                    let mut lines = body.lines();
                    let mut out = format!("{} {}", marker, lines.next().unwrap_or(""));
                    for line in lines {
                        out.push('\n');
                        if !line.is_empty() {
                            out.push_str(&indent);
                            out.push_str(line);
                        }
                    }
                    out
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Node::ListItem { children } => self.blocks(children, ctx).join("\n\n"),
            Node::HorizontalRule => "---".to_string(),
            Node::PageBreak => "<<<".to_string(),
            Node::TableOfContentsView { title, max_depth } => self.table_of_contents(title.as_deref(), *max_depth, ctx),
            Node::BibliographyView { title, entries } => {
                let mut lines = Vec::new();
                let title = title
                    .clone()
                    .or_else(|| ctx.localize("std:bibliography").ok());
                if let Some(title) = title {
                    lines.push(title);
                }
                for (i, entry) in entries.iter().enumerate() {
                    lines.push(format!("[{}] {}", i + 1, entry.format()));
                }
                lines.join("\n")
            }
            Node::SubdocumentLink { name, children } => {
                let text = self.inlines(children, ctx);
                if text.is_empty() {
                    format!("-> {}", name)
                } else {
                    format!("-> {} ({})", text, name)
                }
            }
            _ => self.inline(node, ctx),
        }
    }

    fn table_of_contents(&self, title: Option<&str>, max_depth: usize, ctx: &Context) -> String {
        let mut lines = Vec::new();
        match title {
            Some(title) => lines.push(title.to_string()),
            None => lines.extend(ctx.localize("std:tableofcontents").ok()),
        }
        if let Some(toc) = &ctx.attributes.table_of_contents {
            for (level, item) in toc.flatten() {
                if item.depth > max_depth || item.decorative {
                    continue;
                }
                let number = ctx.properties.value::<FormattedLocationProperty>(&item.target);
                let indent = "  ".repeat(level);
                match number {
                    Some(number) => lines.push(format!("{}- {} {}", indent, number, item.text)),
                    None => lines.push(format!("{}- {}", indent, item.text)),
                }
            }
        }
        lines.join("\n")
    }

    fn inlines(&self, nodes: &[NodeRef], ctx: &Context) -> String {
        nodes.iter().map(|node| self.inline(node, ctx)).collect()
    }

    fn inline(&self, node: &NodeRef, ctx: &Context) -> String {
        match node.as_ref() {
            Node::Text(text) => text.clone(),
            Node::Emphasis { children } => format!("_{}_", self.inlines(children, ctx)),
            Node::Strong { children } => format!("**{}**", self.inlines(children, ctx)),
            Node::CodeSpan(code) => format!("`{}`", code),
            Node::InlineMath(math) => format!("${}$", math),
            Node::Link { url, children, .. } => format!("{} <{}>", self.inlines(children, ctx), url),
            Node::ReferenceLink { source, children, .. } => {
                match ctx.properties.value::<ResolvedLinkProperty>(node) {
                    Some(link) => format!("{} <{}>", self.inlines(children, ctx), link.url),
                    None => source.clone(),
                }
            }
            Node::Image { url, alt, .. } => format!("[image: {}] <{}>", alt, url),
            Node::LineBreak => "\n".to_string(),
            Node::Citation { key } => match ctx.properties.value::<CitationEntryProperty>(node) {
                Some(resolved) => format!("[{}]", resolved.number),
                None => format!("[?{}]", key),
            },
            Node::CrossReference { id } => {
                let target = ctx.properties.value::<CrossReferenceTargetProperty>(node);
                let number = target.and_then(|t| ctx.properties.value::<FormattedLocationProperty>(t));
                match (target, number) {
                    (_, Some(number)) => number.clone(),
                    (Some(target), None) => target.plain_text(),
                    (None, None) => format!("[??{}]", id),
                }
            }
            Node::Container { children } => self.mixed(children, ctx),
            Node::FunctionCall(call) => self.mixed(call.children(), ctx),
            Node::Error { message, .. } => format!("[{}]", message),
            Node::Empty | Node::LinkDefinition { .. } => String::new(),
            _ => self.block(node, ctx),
        }
    }

    /// Call output inside inline content may hold blocks, which are joined
    fn mixed(&self, nodes: &[NodeRef], ctx: &Context) -> String {
        if nodes.iter().any(|n| n.is_block()) {
            self.blocks(nodes, ctx).join("\n\n")
        } else {
            self.inlines(nodes, ctx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterator;
    use crate::parser;

    fn render(source: &str) -> String {
        let mut ctx = Context::default();
        let nodes = parser::parse_blocks(source, 0, &mut ctx);
        let root = std::rc::Rc::new(Node::Root { children: nodes });
        iterator::run_default(&root, &mut ctx);
        PlainTextRenderer.render(&root, &ctx).unwrap()
    }

    #[test]
    fn test_blocks_separated_by_blank_lines() {
        insta::assert_snapshot!(render("# Title\n\nSome *text* here.\n\n- a\n- b\n"), @r###"
        # Title

        Some _text_ here.

        - a
        - b
        "###);
    }

    #[test]
    fn test_reference_link_resolution() {
        let out = render("[Docs]: https://docs.example\n\nSee [the docs][docs] or [missing][nope].\n");
        assert_eq!(out, "See the docs <https://docs.example> or [missing][nope].");
    }

    #[test]
    fn test_wrap_uses_document_name() {
        let mut ctx = Context::default();
        ctx.document.name = Some("Notes".into());
        let wrapped = PlainTextRenderer.wrap("body".into(), &ctx).unwrap();
        assert_eq!(wrapped, "Notes\n=====\n\nbody\n");
    }
}
