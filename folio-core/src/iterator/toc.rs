//! Table of contents and heading anchors.

use super::{AstIterator, AstIteratorHook};
use crate::ast::{Node, NodeKind, NodeRef};
use crate::property::AnchorProperty;
use crate::slug::AnchorRegistry;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct TocItem {
    pub text: String,
    pub target: NodeRef,
    pub depth: usize,
    pub decorative: bool,
    pub sub_items: Vec<TocItem>,
}

/// Headings folded into a tree by depth
#[derive(Debug, Clone, Default)]
pub struct TableOfContents {
    pub items: Vec<TocItem>,
}

impl TableOfContents {
    /// Fold headings in document order. A heading deeper than the last
    /// item at a level nests under it; otherwise it is a sibling there.
    pub fn fold(headings: impl IntoIterator<Item = TocItem>) -> Self {
        let mut items = Vec::new();
        for item in headings {
            insert(&mut items, item);
        }
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in document order with their nesting level
    pub fn flatten(&self) -> Vec<(usize, &TocItem)> {
        fn walk<'a>(items: &'a [TocItem], level: usize, out: &mut Vec<(usize, &'a TocItem)>) {
            for item in items {
                out.push((level, item));
                walk(&item.sub_items, level + 1, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.items, 0, &mut out);
        out
    }
}

fn insert(items: &mut Vec<TocItem>, item: TocItem) {
    match items.last_mut() {
        Some(last) if item.depth > last.depth => insert(&mut last.sub_items, item),
        _ => items.push(item),
    }
}

/// Collects headings, gives each an anchor and stores the table of
/// contents in the context attributes
pub struct TableOfContentsHook;

impl AstIteratorHook for TableOfContentsHook {
    fn attach(&self, iterator: &mut AstIterator) {
        let headings: Rc<RefCell<Vec<NodeRef>>> = Rc::default();

        let collected = headings.clone();
        iterator.register(NodeKind::Heading, move |node, _| {
            collected.borrow_mut().push(node.clone());
        });

        iterator.register_finished(move |ctx| {
            let mut anchors = AnchorRegistry::new();
            let mut items = Vec::new();

            for heading in headings.borrow().iter() {
                let Node::Heading { depth, decorative, id, .. } = heading.as_ref() else {
                    continue;
                };
                let text = heading.plain_text();
                let anchor = match id {
                    Some(id) => id.clone(),
                    None => anchors.unique(&text),
                };
                ctx.properties.of(heading).set::<AnchorProperty>(anchor);

                items.push(TocItem {
                    text,
                    target: heading.clone(),
                    depth: *depth,
                    decorative: *decorative,
                    sub_items: Vec::new(),
                });
            }

            ctx.attributes.table_of_contents = Some(TableOfContents::fold(items));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(depth: usize, text: &str) -> TocItem {
        TocItem {
            text: text.to_string(),
            target: Node::text(text),
            depth,
            decorative: false,
            sub_items: Vec::new(),
        }
    }

    fn shape(items: &[TocItem]) -> String {
        items
            .iter()
            .map(|i| {
                if i.sub_items.is_empty() {
                    i.text.clone()
                } else {
                    format!("{}({})", i.text, shape(&i.sub_items))
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_fold_by_depth() {
        let toc = TableOfContents::fold(vec![
            item(1, "a"),
            item(2, "b"),
            item(3, "c"),
            item(2, "d"),
            item(1, "e"),
            item(3, "f"),
        ]);
        assert_eq!(shape(&toc.items), "a(b(c) d) e(f)");
    }

    #[test]
    fn test_fold_siblings_and_return_to_top() {
        let depths = [1, 2, 2, 3, 2, 1];
        let names = ["a", "b", "c", "d", "e", "f"];
        let toc = TableOfContents::fold(depths.iter().zip(names).map(|(&depth, name)| item(depth, name)));
        assert_eq!(shape(&toc.items), "a(b c(d) e) f");

        let levels: Vec<usize> = toc.flatten().into_iter().map(|(level, _)| level).collect();
        assert_eq!(levels, vec![0, 1, 1, 2, 1, 0]);
    }

    #[test]
    fn test_shallower_first_item_does_not_nest() {
        let toc = TableOfContents::fold(vec![item(2, "a"), item(1, "b"), item(2, "c")]);
        assert_eq!(shape(&toc.items), "a b(c)");
    }

    #[test]
    fn test_flatten_levels() {
        let toc = TableOfContents::fold(vec![item(1, "a"), item(2, "b"), item(1, "c")]);
        let levels: Vec<(usize, &str)> = toc
            .flatten()
            .into_iter()
            .map(|(level, item)| (level, item.text.as_str()))
            .collect();
        assert_eq!(levels, vec![(0, "a"), (1, "b"), (0, "c")]);
    }
}
