//! Function calls from walked token payloads.

use crate::context::Context;
use crate::error::Span;
use crate::expression::{Expression, SafeExpression};
use crate::function::{FunctionCall, FunctionCallArgument};
use crate::lexer::{TokenKind, WalkedCall};

/// Build the call a function-call token walked.
///
/// In a chain `.a {x}::b {y}` each segment's call becomes the first
/// positional argument of the next, so the result is the call to `b`. The
/// body of a block call goes to the last segment. `offset` is the position
/// of the tokenized source inside the document.
pub fn build_call(walked: &WalkedCall, is_block: bool, offset: usize, ctx: &Context) -> Option<FunctionCall> {
    let first = walked.segments.first()?;
    let last = walked.segments.len() - 1;
    let mut previous: Option<FunctionCall> = None;

    for (i, segment) in walked.segments.iter().enumerate() {
        let mut arguments = Vec::with_capacity(segment.arguments.len() + 1);

        if let Some(receiver) = previous.take() {
            let span = receiver.span;
            arguments.push(FunctionCallArgument {
                span,
                ..FunctionCallArgument::positional(Expression::Call(receiver))
            });
        }

        for argument in &segment.arguments {
            arguments.push(argument_of(
                argument.name.clone(),
                &argument.raw,
                offset + argument.offset,
                false,
                ctx,
            ));
        }

        if i == last {
            if let Some(body) = &walked.body {
                arguments.push(argument_of(None, body, offset + walked.body_offset, true, ctx));
            }
        }

        let span = Span::new(first.span.start, segment.span.end).offset(offset);
        previous = Some(FunctionCall::new(&segment.name, arguments, is_block, span));
    }

    previous
}

fn argument_of(name: Option<String>, raw: &str, offset: usize, is_body: bool, ctx: &Context) -> FunctionCallArgument {
    // An argument that fails to evaluate as an expression binds as ""
    let expression = Expression::Safe(SafeExpression::or_empty(argument_expression(raw, offset, ctx)));
    FunctionCallArgument {
        name,
        expression,
        is_body,
        raw: Some(raw.to_string()),
        span: Span::new(offset, offset + raw.len()),
    }
}

/// Expression of an argument's source: text and escapes become literals,
/// nested calls stay deferred.
///
/// `{}` yields an empty composition, which fails to evaluate.
pub fn argument_expression(raw: &str, offset: usize, ctx: &Context) -> Expression {
    let flavor = ctx.flavor();
    let mut parts: Vec<Expression> = Vec::new();

    for token in flavor.lexer().argument().tokenize(raw) {
        let call = match token.kind {
            TokenKind::FunctionCall => token
                .call()
                .and_then(|walked| build_call(walked, false, offset, ctx)),
            _ => None,
        };

        match (call, token.kind) {
            (Some(call), _) => parts.push(Expression::Call(call)),
            (None, TokenKind::Escape) => push_text(&mut parts, token.group("escaped").unwrap_or("")),
            (None, _) => push_text(&mut parts, &token.text),
        }
    }

    if parts.len() == 1 {
        parts.remove(0)
    } else {
        Expression::Composed(parts)
    }
}

fn push_text(parts: &mut Vec<Expression>, text: &str) {
    if let Some(Expression::Literal(crate::value::Value::String(previous))) = parts.last_mut() {
        previous.push_str(text);
    } else {
        parts.push(Expression::literal(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::Function;
    use crate::lexer::{FunctionCallWalker, Walked, Walker};
    use crate::value::Value;

    fn walk(source: &str, block: bool) -> WalkedCall {
        let walker = if block {
            FunctionCallWalker::block()
        } else {
            FunctionCallWalker::inline()
        };
        match walker.walk(source, 0, 2).and_then(|r| r.payload) {
            Some(Walked::Call(call)) => call,
            None => panic!("no call walked from {:?}", source),
        }
    }

    #[test]
    fn test_arguments_keep_raw_and_offsets() {
        let ctx = Context::default();
        let call = build_call(&walk(".f {a} key:{b}", false), false, 100, &ctx).unwrap();
        assert_eq!(call.name, "f");
        assert_eq!(call.arguments.len(), 2);
        assert_eq!(call.arguments[0].raw.as_deref(), Some("a"));
        assert_eq!(call.arguments[0].span, Span::new(104, 105));
        assert_eq!(call.arguments[1].name.as_deref(), Some("key"));
        assert_eq!(call.span.start, 100);
    }

    #[test]
    fn test_chain_passes_receiver_first() {
        let ctx = Context::default();
        let call = build_call(&walk(".a {x}::b {y}", false), false, 0, &ctx).unwrap();
        assert_eq!(call.name, "b");
        assert_eq!(call.arguments.len(), 2);
        match &call.arguments[0].expression {
            Expression::Call(receiver) => assert_eq!(receiver.name, "a"),
            other => panic!("expected receiver call, got {:?}", other),
        }
        assert_eq!(call.arguments[1].raw.as_deref(), Some("y"));
    }

    #[test]
    fn test_body_is_last_argument() {
        let ctx = Context::default();
        let call = build_call(&walk(".box {t}\n  inside\n", true), true, 0, &ctx).unwrap();
        let body = call.arguments.last().unwrap();
        assert!(body.is_body);
        assert_eq!(body.raw.as_deref(), Some("inside"));
    }

    #[test]
    fn test_empty_argument_evaluates_to_empty_string() {
        let mut ctx = Context::default();
        let call = build_call(&walk(".f {}", false), false, 0, &ctx).unwrap();
        assert_eq!(call.arguments[0].expression.eval(&mut ctx).unwrap(), Value::from(""));
    }

    #[test]
    fn test_nested_call_and_escapes_compose() {
        let mut ctx = Context::default();
        ctx.declare(Function::constant("who", Value::from("Ann")));
        let expr = argument_expression(r"Hi \{.who\}", 0, &ctx);
        assert_eq!(expr.eval(&mut ctx).unwrap(), Value::from("Hi {Ann}"));
    }
}
