//! Evaluatable units of function-call arguments.

use crate::context::Context;
use crate::error::{FolioError, Result};
use crate::function::{self, FunctionCall};
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum Expression {
    Literal(Value),
    /// Sub-expressions folded with [`Value::append`]
    Composed(Vec<Expression>),
    /// Callee looked up by name when evaluated, so forward references work
    Call(FunctionCall),
    Safe(SafeExpression),
}

impl Expression {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    pub fn eval(&self, ctx: &mut Context) -> Result<Value> {
        match self {
            Expression::Literal(value) => Ok(value.clone()),
            Expression::Composed(parts) => {
                let (first, rest) = parts
                    .split_first()
                    .ok_or_else(|| FolioError::invalid_expression("empty composed expression"))?;
                let mut value = first.eval(ctx)?;
                for part in rest {
                    value = value.append(part.eval(ctx)?);
                }
                Ok(value)
            }
            Expression::Call(call) => function::invoke(call, ctx),
            Expression::Safe(safe) => safe.eval(ctx),
        }
    }
}

/// Primary expression with a lazily built fallback.
///
/// The fallback is built and evaluated only when the primary fails with
/// [`FolioError::InvalidExpression`]; other errors propagate.
#[derive(Clone)]
pub struct SafeExpression {
    primary: Box<Expression>,
    fallback: Rc<dyn Fn() -> Expression>,
}

impl SafeExpression {
    pub fn new(primary: Expression, fallback: impl Fn() -> Expression + 'static) -> Self {
        Self {
            primary: Box::new(primary),
            fallback: Rc::new(fallback),
        }
    }

    /// Falls back to the empty string
    pub fn or_empty(primary: Expression) -> Self {
        Self::new(primary, || Expression::literal(""))
    }

    pub fn primary(&self) -> &Expression {
        &self.primary
    }

    pub fn eval(&self, ctx: &mut Context) -> Result<Value> {
        match self.primary.eval(ctx) {
            Err(FolioError::InvalidExpression { .. }) => (self.fallback)().eval(ctx),
            other => other,
        }
    }
}

impl fmt::Debug for SafeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeExpression")
            .field("primary", &self.primary)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Span;
    use crate::function::Function;
    use std::cell::Cell;

    fn call(name: &str) -> FunctionCall {
        FunctionCall::new(name, Vec::new(), false, Span::default())
    }

    fn context_with_b() -> Context {
        let mut ctx = Context::default();
        ctx.declare(Function::builder("b").build(|_, _| Ok(Value::from("b"))));
        ctx
    }

    #[test]
    fn test_empty_composed_fails() {
        let mut ctx = Context::default();
        let err = Expression::Composed(vec![]).eval(&mut ctx).unwrap_err();
        assert!(matches!(err, FolioError::InvalidExpression { .. }));
    }

    #[test]
    fn test_composed_with_call() {
        let mut ctx = context_with_b();
        let expr = Expression::Composed(vec![Expression::literal("a"), Expression::Call(call("b"))]);
        assert_eq!(expr.eval(&mut ctx).unwrap(), Value::from("ab"));
    }

    #[test]
    fn test_unresolved_reference_names_callee() {
        let mut ctx = Context::default();
        let err = Expression::Call(call("later")).eval(&mut ctx).unwrap_err();
        match err {
            FolioError::UnresolvedReference { name } => assert_eq!(name, "later"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_forward_reference_resolves_at_eval_time() {
        let mut ctx = Context::default();
        let expr = Expression::Call(call("b"));
        ctx.declare(Function::builder("b").build(|_, _| Ok(Value::from("late"))));
        assert_eq!(expr.eval(&mut ctx).unwrap(), Value::from("late"));
    }

    #[test]
    fn test_safe_fallback_built_once_on_invalid_expression() {
        let built = Rc::new(Cell::new(0));
        let counter = built.clone();
        let safe = SafeExpression::new(Expression::Composed(vec![]), move || {
            counter.set(counter.get() + 1);
            Expression::literal("fallback")
        });

        let mut ctx = Context::default();
        assert_eq!(safe.eval(&mut ctx).unwrap(), Value::from("fallback"));
        assert_eq!(built.get(), 1);
    }

    #[test]
    fn test_safe_other_errors_skip_fallback() {
        let built = Rc::new(Cell::new(0));
        let counter = built.clone();
        let safe = SafeExpression::new(Expression::Call(call("missing")), move || {
            counter.set(counter.get() + 1);
            Expression::literal("fallback")
        });

        let mut ctx = Context::default();
        let err = safe.eval(&mut ctx).unwrap_err();
        assert!(matches!(err, FolioError::UnresolvedReference { .. }));
        assert_eq!(built.get(), 0);
    }

    #[test]
    fn test_safe_primary_success_skips_fallback() {
        let built = Rc::new(Cell::new(0));
        let counter = built.clone();
        let safe = SafeExpression::new(Expression::literal("x"), move || {
            counter.set(counter.get() + 1);
            Expression::literal("fallback")
        });
        let mut ctx = Context::default();
        assert_eq!(safe.eval(&mut ctx).unwrap(), Value::from("x"));
        assert_eq!(built.get(), 0);
    }
}
