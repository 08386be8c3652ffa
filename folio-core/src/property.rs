//! Node-identity keyed property store.
//!
//! Later stages attach computed facts to nodes without changing the tree:
//! `ctx.properties.of(&node).set::<LocationProperty>(location)`. Each node
//! gets at most one container, created on first access, and each container
//! holds at most one value per property type.

use crate::ast::{NodeKey, NodeRef};
use crate::bibliography::BibliographyEntry;
use crate::numbering::Location;
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// A typed key of a [`PropertyContainer`]
pub trait Property: 'static {
    type Value: Any;
}

/// Properties attached to one node
#[derive(Default)]
pub struct PropertyContainer {
    values: HashMap<TypeId, Box<dyn Any>>,
}

impl PropertyContainer {
    /// Store a value, replacing any previous value of the same property
    pub fn set<P: Property>(&mut self, value: P::Value) {
        self.values.insert(TypeId::of::<P>(), Box::new(value));
    }

    pub fn get<P: Property>(&self) -> Option<&P::Value> {
        self.values
            .get(&TypeId::of::<P>())
            .and_then(|v| v.downcast_ref::<P::Value>())
    }

    pub fn contains<P: Property>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<P>())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for PropertyContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyContainer")
            .field("len", &self.values.len())
            .finish()
    }
}

/// Map from node identity to its container
#[derive(Debug, Default)]
pub struct PropertyStore {
    // The node is retained so its address cannot be reused while keyed
    containers: HashMap<NodeKey, (NodeRef, PropertyContainer)>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Container of `node`, created empty on first access
    pub fn of(&mut self, node: &NodeRef) -> &mut PropertyContainer {
        &mut self
            .containers
            .entry(NodeKey::of(node))
            .or_insert_with(|| (node.clone(), PropertyContainer::default()))
            .1
    }

    /// Container of `node` if one was created
    pub fn get(&self, node: &NodeRef) -> Option<&PropertyContainer> {
        self.containers.get(&NodeKey::of(node)).map(|(_, c)| c)
    }

    /// Shorthand for reading one property of a node
    pub fn value<P: Property>(&self, node: &NodeRef) -> Option<&P::Value> {
        self.get(node).and_then(|c| c.get::<P>())
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn clear(&mut self) {
        self.containers.clear();
    }
}

/// Level-index location of a heading or numbered element
pub struct LocationProperty;

impl Property for LocationProperty {
    type Value = Location;
}

/// Location rendered with the document's numbering format
pub struct FormattedLocationProperty;

impl Property for FormattedLocationProperty {
    type Value = String;
}

/// Anchor slug of a heading
pub struct AnchorProperty;

impl Property for AnchorProperty {
    type Value = String;
}

/// Bibliography entry a citation resolved to, with its number in the view
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCitation {
    pub entry: BibliographyEntry,
    pub number: usize,
}

pub struct CitationEntryProperty;

impl Property for CitationEntryProperty {
    type Value = ResolvedCitation;
}

/// Node a cross reference points to
pub struct CrossReferenceTargetProperty;

impl Property for CrossReferenceTargetProperty {
    type Value = NodeRef;
}

/// Link definition a reference link resolved to
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLink {
    pub url: String,
    pub title: Option<String>,
}

pub struct ResolvedLinkProperty;

impl Property for ResolvedLinkProperty {
    type Value = ResolvedLink;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;

    #[test]
    fn test_container_created_once_per_identity() {
        let mut store = PropertyStore::new();
        let node = Node::text("a");

        let first = store.of(&node) as *const PropertyContainer;
        let second = store.of(&node) as *const PropertyContainer;
        assert_eq!(first, second);

        store.of(&node).set::<AnchorProperty>("a".into());
        assert_eq!(store.of(&node).get::<AnchorProperty>().map(String::as_str), Some("a"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_distinct_identities_do_not_share() {
        let mut store = PropertyStore::new();
        let a = Node::text("same");
        let b = Node::text("same");

        store.of(&a).set::<AnchorProperty>("a".into());
        assert!(store.of(&b).get::<AnchorProperty>().is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_set_overwrites_same_key() {
        let mut store = PropertyStore::new();
        let node = Node::text("x");
        store.of(&node).set::<FormattedLocationProperty>("1".into());
        store.of(&node).set::<FormattedLocationProperty>("2".into());
        store.of(&node).set::<AnchorProperty>("x".into());

        let container = store.get(&node).unwrap();
        assert_eq!(container.get::<FormattedLocationProperty>().map(String::as_str), Some("2"));
        assert_eq!(container.len(), 2);
    }

    #[test]
    fn test_store_keeps_node_alive() {
        let mut store = PropertyStore::new();
        let node = Node::text("x");
        let key = NodeKey::of(&node);
        store.of(&node).set::<AnchorProperty>("x".into());
        drop(node);

        let replacement = Node::text("y");
        assert_ne!(NodeKey::of(&replacement), key);
        assert!(store.get(&replacement).is_none());
    }
}
