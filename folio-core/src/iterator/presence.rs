//! Presence flags for renderers that load optional resources.

use super::{AstIterator, AstIteratorHook};
use crate::ast::{Node, NodeKind};

/// Sets `has_math`, `has_code` and `has_diagrams` (mermaid code blocks)
pub struct PresenceHook;

impl AstIteratorHook for PresenceHook {
    fn attach(&self, iterator: &mut AstIterator) {
        for kind in [NodeKind::Math, NodeKind::InlineMath] {
            iterator.register(kind, |_, ctx| ctx.attributes.has_math = true);
        }
        iterator.register(NodeKind::Code, |node, ctx| {
            if let Node::Code { language, .. } = node.as_ref() {
                if language.as_deref() == Some("mermaid") {
                    ctx.attributes.has_diagrams = true;
                } else {
                    ctx.attributes.has_code = true;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use std::rc::Rc;

    #[test]
    fn test_flags() {
        let root = Rc::new(Node::Root {
            children: vec![
                Node::paragraph(vec![Rc::new(Node::InlineMath("x".into()))]),
                Rc::new(Node::Code {
                    language: Some("mermaid".into()),
                    content: "graph TD".into(),
                    caption: None,
                    id: None,
                }),
            ],
        });
        let mut ctx = Context::default();
        AstIterator::new().attach(&PresenceHook).run(&root, &mut ctx);

        assert!(ctx.attributes.has_math);
        assert!(ctx.attributes.has_diagrams);
        assert!(!ctx.attributes.has_code);
    }
}
