//! Locations of headings and numbered elements.

use super::{AstIterator, AstIteratorHook};
use crate::ast::{NodeKind, NodeRef, NumberedKind};
use crate::numbering::Location;
use crate::property::{FormattedLocationProperty, LocationProperty};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Default)]
struct Counters {
    /// Current count per heading level
    sections: Vec<usize>,
    /// Count per element kind within the current section
    elements: HashMap<NumberedKind, usize>,
    tracked: Vec<(NodeRef, NumberedKind)>,
}

/// Assigns level-index locations in document order.
///
/// A heading of depth `d` gets the first `d` section counters. A numbered
/// element gets the section counters up to its kind's element depth plus
/// its own counter, which restarts with every heading at or above that
/// depth. Decorative headings are not counted. When the walk finishes,
/// every location is formatted with the document's numbering formats.
pub struct LocationHook;

impl LocationHook {
    fn track(counters: &mut Counters, node: &NodeRef, element_depth: impl Fn(NumberedKind) -> usize) -> Option<Location> {
        let kind = node.numbered_kind()?;
        let location = match kind {
            NumberedKind::Heading => {
                let depth = match node.as_ref() {
                    crate::ast::Node::Heading { depth, .. } => (*depth).max(1),
                    _ => return None,
                };
                counters.sections.resize(depth, 0);
                counters.sections[depth - 1] += 1;

                for element in [NumberedKind::Code, NumberedKind::Math] {
                    if depth <= element_depth(element) {
                        counters.elements.insert(element, 0);
                    }
                }
                Location(counters.sections.clone())
            }
            element => {
                let depth = element_depth(element);
                let mut levels: Vec<usize> = (0..depth)
                    .map(|i| counters.sections.get(i).copied().unwrap_or(0))
                    .collect();
                let count = counters.elements.entry(element).or_insert(0);
                *count += 1;
                levels.push(*count);
                Location(levels)
            }
        };
        counters.tracked.push((node.clone(), kind));
        Some(location)
    }
}

impl AstIteratorHook for LocationHook {
    fn attach(&self, iterator: &mut AstIterator) {
        let counters: Rc<RefCell<Counters>> = Rc::default();

        for kind in [NodeKind::Heading, NodeKind::Code, NodeKind::Math] {
            let counters = counters.clone();
            iterator.register(kind, move |node, ctx| {
                let numbering = ctx.numbering();
                let location = Self::track(&mut counters.borrow_mut(), node, |k| numbering.element_depth(k));
                if let Some(location) = location {
                    ctx.properties.of(node).set::<LocationProperty>(location);
                }
            });
        }

        iterator.register_finished(move |ctx| {
            let numbering = ctx.numbering();
            for (node, kind) in &counters.borrow().tracked {
                let Some(format) = numbering.for_kind(*kind) else {
                    continue;
                };
                let Some(location) = ctx.properties.value::<LocationProperty>(node) else {
                    continue;
                };
                let formatted = format.format(location);
                ctx.properties.of(node).set::<FormattedLocationProperty>(formatted);
            }
        });
    }
}
