//! Resolution of citations, cross references and reference links.

use super::{AstIterator, AstIteratorHook};
use crate::ast::{Node, NodeKind, NodeRef};
use crate::property::{
    AnchorProperty, CitationEntryProperty, CrossReferenceTargetProperty, ResolvedCitation, ResolvedLinkProperty,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

#[derive(Default)]
struct Collected {
    references: Vec<NodeRef>,
    targets: Vec<NodeRef>,
}

/// Attaches to each citation the first matching entry among the
/// bibliographies of the document, searched in document order
pub struct BibliographyHook;

impl AstIteratorHook for BibliographyHook {
    fn attach(&self, iterator: &mut AstIterator) {
        let collected: Rc<RefCell<Collected>> = Rc::default();

        let citations = collected.clone();
        iterator.register(NodeKind::Citation, move |node, _| {
            citations.borrow_mut().references.push(node.clone());
        });
        let views = collected.clone();
        iterator.register(NodeKind::BibliographyView, move |node, _| {
            views.borrow_mut().targets.push(node.clone());
        });

        iterator.register_finished(move |ctx| {
            let collected = collected.borrow();
            for citation in &collected.references {
                let Node::Citation { key } = citation.as_ref() else {
                    continue;
                };
                let resolved = collected.targets.iter().find_map(|view| match view.as_ref() {
                    Node::BibliographyView { entries, .. } => entries
                        .iter()
                        .position(|e| &e.key == key)
                        .map(|i| ResolvedCitation {
                            entry: entries[i].clone(),
                            number: i + 1,
                        }),
                    _ => None,
                });

                match resolved {
                    Some(resolved) => ctx.properties.of(citation).set::<CitationEntryProperty>(resolved),
                    None => warn!("Unresolved citation: {}", key),
                }
            }
        });
    }
}

/// Points each cross reference at the first element in document order
/// carrying its id, either an explicit `{#id}` or a heading anchor
pub struct CrossReferenceHook;

impl AstIteratorHook for CrossReferenceHook {
    fn attach(&self, iterator: &mut AstIterator) {
        let collected: Rc<RefCell<Collected>> = Rc::default();

        let references = collected.clone();
        iterator.register(NodeKind::CrossReference, move |node, _| {
            references.borrow_mut().references.push(node.clone());
        });
        for kind in [NodeKind::Heading, NodeKind::Code, NodeKind::Math] {
            let targets = collected.clone();
            iterator.register(kind, move |node, _| {
                targets.borrow_mut().targets.push(node.clone());
            });
        }

        // Heading anchors are assigned by the table of contents hook, whose
        // finish callback runs first
        iterator.register_finished(move |ctx| {
            let collected = collected.borrow();
            for reference in &collected.references {
                let Node::CrossReference { id } = reference.as_ref() else {
                    continue;
                };
                let target = collected.targets.iter().find(|target| {
                    target.reference_id() == Some(id.as_str())
                        || ctx.properties.value::<AnchorProperty>(target) == Some(id)
                });

                match target.cloned() {
                    Some(target) => ctx
                        .properties
                        .of(reference)
                        .set::<CrossReferenceTargetProperty>(target),
                    None => warn!("Unresolved cross reference: {}", id),
                }
            }
        });
    }
}

/// Resolves `[text][label]` links against the document's link
/// definitions; `[text][]` uses the text as label
pub struct LinkDefinitionHook;

impl AstIteratorHook for LinkDefinitionHook {
    fn attach(&self, iterator: &mut AstIterator) {
        iterator.register(NodeKind::ReferenceLink, |node, ctx| {
            let Node::ReferenceLink { label, .. } = node.as_ref() else {
                return;
            };
            let label = if label.trim().is_empty() {
                node.plain_text()
            } else {
                label.clone()
            };
            match ctx.link_definition(&label).cloned() {
                Some(link) => ctx.properties.of(node).set::<ResolvedLinkProperty>(link),
                None => warn!("No link definition for [{}]", label),
            }
        });
    }
}
