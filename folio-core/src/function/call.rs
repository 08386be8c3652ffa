//! Call sites, invocation and output conversion.

use super::{bind, CallEnv};
use crate::ast::{Node, NodeRef};
use crate::context::Context;
use crate::error::{FolioError, Result, Span};
use crate::expression::Expression;
use crate::value::Value;
use std::rc::Rc;
use tracing::debug;

/// A function call as written in the source
#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Vec<FunctionCallArgument>,
    pub is_block: bool,
    pub span: Span,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, arguments: Vec<FunctionCallArgument>, is_block: bool, span: Span) -> Self {
        Self {
            name: name.into(),
            arguments,
            is_block,
            span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionCallArgument {
    pub name: Option<String>,
    pub expression: Expression,
    /// The indented body of a block call
    pub is_body: bool,
    /// Unparsed source of the argument, used by markup and lambda parameters
    pub raw: Option<String>,
    pub span: Span,
}

impl FunctionCallArgument {
    /// Positional argument of an already built expression
    pub fn positional(expression: Expression) -> Self {
        Self {
            name: None,
            expression,
            is_body: false,
            raw: None,
            span: Span::default(),
        }
    }

    pub fn named(name: impl Into<String>, expression: Expression) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::positional(expression)
        }
    }
}

/// Look up, bind, validate and invoke a call
pub fn invoke(call: &FunctionCall, ctx: &mut Context) -> Result<Value> {
    let function = ctx
        .lookup(&call.name)
        .ok_or_else(|| FolioError::UnresolvedReference {
            name: call.name.clone(),
        })?;

    let bound = bind(&function, call, ctx)?;

    for validator in &function.validators {
        validator(ctx, call).map_err(|reason| FolioError::invalid_call(&function.name, reason))?;
    }

    debug!("Invoking .{}", function.name);
    (function.invoke)(&mut CallEnv { ctx, call }, &bound)
}

/// Convert a function result into a node for a block or inline call site
pub fn to_node(value: Value, is_block: bool) -> NodeRef {
    match value {
        Value::None | Value::Lambda(_) => Node::empty(),
        Value::Node(node) => node,
        Value::Content(mut nodes) => {
            if nodes.len() == 1 {
                nodes.remove(0)
            } else {
                Node::container(nodes)
            }
        }
        Value::Iterable(items) => Node::container(items.into_iter().map(|v| to_node(v, is_block)).collect()),
        scalar => {
            let text = Node::text(scalar.to_string());
            if is_block {
                Node::paragraph(vec![text])
            } else {
                text
            }
        }
    }
}

/// Evaluate every unevaluated function call under `root`, in document
/// order. Errors go through the context's error handler: a substitute node
/// is stored at the call site, or the error aborts the walk.
pub fn evaluate_calls(root: &NodeRef, ctx: &mut Context) -> Result<()> {
    if let Node::FunctionCall(call_node) = root.as_ref() {
        if !call_node.is_evaluated() {
            let call = &call_node.call;
            let output = match invoke(call, ctx) {
                Ok(value) => to_node(value, call.is_block),
                Err(error) => match ctx.error_handler().handle(error, call) {
                    Ok(marker) => marker,
                    Err(error) => {
                        ctx.record_failure(call.span);
                        return Err(error);
                    }
                },
            };
            call_node.set_children(vec![output]);
        }
    }

    for child in root.children() {
        evaluate_calls(child, ctx)?;
    }
    Ok(())
}

/// Evaluate a freshly parsed node list, for markup arguments and lambdas
pub fn evaluate_all(nodes: &[NodeRef], ctx: &mut Context) -> Result<()> {
    nodes.iter().try_for_each(|node| evaluate_calls(node, ctx))
}

/// Text of a node list that evaluated to a single run of plain text,
/// possibly wrapped in one paragraph
pub fn plain_text_of(nodes: &[NodeRef]) -> Option<String> {
    fn text_only(node: &Node, paragraphs: &mut usize) -> bool {
        match node {
            Node::Text(_) | Node::Empty => true,
            Node::Paragraph { children } => {
                *paragraphs += 1;
                *paragraphs == 1 && children.iter().all(|c| text_only(c, paragraphs))
            }
            Node::Container { children } => children.iter().all(|c| text_only(c, paragraphs)),
            Node::FunctionCall(call) => call.children().iter().all(|c| text_only(c, paragraphs)),
            _ => false,
        }
    }

    let mut paragraphs = 0;
    if nodes.iter().all(|n| text_only(n, &mut paragraphs)) {
        Some(nodes.iter().map(|n| n.plain_text()).collect())
    } else {
        None
    }
}

pub(crate) fn shared(call: FunctionCall) -> NodeRef {
    Rc::new(Node::FunctionCall(crate::ast::FunctionCallNode::new(call)))
}
