//! Tree traversal with per-kind callbacks.
//!
//! One pre-order walk of the evaluated tree fans out to every registered
//! callback, then the finish callbacks run in registration order. Hooks
//! collect during the walk and resolve when it finishes, which lets a
//! citation resolve against a bibliography that appears after it.

pub mod location;
pub mod presence;
pub mod reference;
pub mod toc;

use crate::ast::{NodeKind, NodeRef};
use crate::context::Context;
use tracing::debug;

pub use location::LocationHook;
pub use presence::PresenceHook;
pub use reference::{BibliographyHook, CrossReferenceHook, LinkDefinitionHook};
pub use toc::{TableOfContents, TableOfContentsHook, TocItem};

type NodeCallback = Box<dyn FnMut(&NodeRef, &mut Context)>;
type FinishCallback = Box<dyn FnMut(&mut Context)>;

/// Registers callbacks on an iterator
pub trait AstIteratorHook {
    fn attach(&self, iterator: &mut AstIterator);
}

#[derive(Default)]
pub struct AstIterator {
    callbacks: Vec<(NodeKind, NodeCallback)>,
    finishers: Vec<FinishCallback>,
}

impl AstIterator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `callback` for every node of kind `kind`
    pub fn on(mut self, kind: NodeKind, callback: impl FnMut(&NodeRef, &mut Context) + 'static) -> Self {
        self.callbacks.push((kind, Box::new(callback)));
        self
    }

    /// Call `callback` once the walk is over
    pub fn on_finished(mut self, callback: impl FnMut(&mut Context) + 'static) -> Self {
        self.finishers.push(Box::new(callback));
        self
    }

    pub fn attach(mut self, hook: &dyn AstIteratorHook) -> Self {
        hook.attach(&mut self);
        self
    }

    // Hooks register through a `&mut` borrow
    pub fn register(&mut self, kind: NodeKind, callback: impl FnMut(&NodeRef, &mut Context) + 'static) {
        self.callbacks.push((kind, Box::new(callback)));
    }

    pub fn register_finished(&mut self, callback: impl FnMut(&mut Context) + 'static) {
        self.finishers.push(Box::new(callback));
    }

    /// Walk `root` pre-order, then run the finish callbacks
    pub fn run(mut self, root: &NodeRef, ctx: &mut Context) {
        let mut visited = 0;
        self.visit(root, ctx, &mut visited);
        debug!("Iterated {} nodes", visited);

        for finish in &mut self.finishers {
            finish(ctx);
        }
    }

    fn visit(&mut self, node: &NodeRef, ctx: &mut Context, visited: &mut usize) {
        *visited += 1;
        let kind = node.kind();
        for (filter, callback) in &mut self.callbacks {
            if *filter == kind {
                callback(node, ctx);
            }
        }
        // Unevaluated calls have no children yet
        for child in node.children() {
            self.visit(child, ctx, visited);
        }
    }
}

/// Run the standard hook set over an evaluated tree
pub fn run_default(root: &NodeRef, ctx: &mut Context) {
    AstIterator::new()
        .attach(&TableOfContentsHook)
        .attach(&LocationHook)
        .attach(&BibliographyHook)
        .attach(&CrossReferenceHook)
        .attach(&LinkDefinitionHook)
        .attach(&PresenceHook)
        .run(root, ctx);
}
