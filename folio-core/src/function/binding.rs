//! Argument binding against a function's parameter table.

use super::{BoundArguments, Function, FunctionCall, FunctionCallArgument};
use crate::context::Context;
use crate::error::{FolioError, Result};
use crate::value::{Value, ValueFactory};

/// Bind `call`'s arguments to `function`'s parameters and convert them.
///
/// Named arguments bind first, then positional ones fill the remaining
/// non-injected parameters left to right, then the body argument takes the
/// last non-injected parameter. Omitted parameters take their default,
/// `Value::None` when nullable, or fail when required.
pub fn bind(function: &Function, call: &FunctionCall, ctx: &mut Context) -> Result<BoundArguments> {
    let params = &function.parameters;
    let mut slots: Vec<Option<&FunctionCallArgument>> = vec![None; params.len()];
    let error = |reason: String| FolioError::invalid_call(&function.name, reason);

    for argument in call.arguments.iter().filter(|a| !a.is_body) {
        let Some(name) = &argument.name else {
            continue;
        };
        let index = params
            .iter()
            .position(|p| &p.name == name)
            .ok_or_else(|| error(format!("unknown parameter '{}'", name)))?;
        if params[index].injected.is_some() {
            return Err(error(format!("parameter '{}' cannot be supplied", name)));
        }
        if slots[index].is_some() {
            return Err(error(format!("parameter '{}' bound twice", name)));
        }
        slots[index] = Some(argument);
    }

    for argument in call.arguments.iter().filter(|a| !a.is_body && a.name.is_none()) {
        let index = (0..params.len())
            .find(|&i| params[i].injected.is_none() && slots[i].is_none())
            .ok_or_else(|| {
                error(format!(
                    "too many arguments (expected at most {})",
                    params.iter().filter(|p| p.injected.is_none()).count()
                ))
            })?;
        slots[index] = Some(argument);
    }

    if let Some(body) = call.arguments.iter().find(|a| a.is_body) {
        let index = params
            .iter()
            .rposition(|p| p.injected.is_none())
            .ok_or_else(|| error("does not accept a body".to_string()))?;
        if slots[index].is_some() {
            return Err(error(format!(
                "body conflicts with argument for parameter '{}'",
                params[index].name
            )));
        }
        slots[index] = Some(body);
    }

    let mut values = Vec::with_capacity(params.len());
    for (param, slot) in params.iter().zip(slots) {
        let value = match (param.injected, slot) {
            (Some(injector), _) => injector(ctx, call),
            (None, Some(argument)) => ValueFactory::convert(argument, param, call.is_block, ctx)?,
            (None, None) => match &param.default {
                Some(default) => default.clone(),
                None if param.nullable => Value::None,
                None => return Err(error(format!("missing argument for parameter '{}'", param.name))),
            },
        };
        values.push((param.name.clone(), value));
    }

    Ok(BoundArguments::new(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Span;
    use crate::expression::Expression;
    use crate::function::ParamType;

    fn injected_name(_: &Context, call: &FunctionCall) -> Value {
        Value::from(format!("from {}", call.name))
    }

    fn signature() -> Function {
        Function::builder("f")
            .param("a", ParamType::Number)
            .optional("b", ParamType::Number, 0.0)
            .injected("c", ParamType::String, injected_name)
            .build(|_, _| Ok(Value::None))
    }

    fn call(arguments: Vec<FunctionCallArgument>) -> FunctionCall {
        FunctionCall::new("f", arguments, false, Span::default())
    }

    fn lit(s: &str) -> Expression {
        Expression::literal(s)
    }

    #[test]
    fn test_positional_with_default_and_injection() {
        let mut ctx = Context::default();
        let bound = bind(
            &signature(),
            &call(vec![FunctionCallArgument::positional(lit("5"))]),
            &mut ctx,
        )
        .unwrap();
        assert_eq!(bound.number("a"), Some(5.0));
        assert_eq!(bound.number("b"), Some(0.0));
        assert_eq!(bound.get("c"), &Value::from("from f"));
    }

    #[test]
    fn test_named_in_reverse_order() {
        let mut ctx = Context::default();
        let bound = bind(
            &signature(),
            &call(vec![
                FunctionCallArgument::named("b", lit("2")),
                FunctionCallArgument::named("a", lit("1")),
            ]),
            &mut ctx,
        )
        .unwrap();
        assert_eq!(bound.number("a"), Some(1.0));
        assert_eq!(bound.number("b"), Some(2.0));
    }

    #[test]
    fn test_unknown_named_argument() {
        let mut ctx = Context::default();
        let err = bind(
            &signature(),
            &call(vec![FunctionCallArgument::named("zzz", lit("1"))]),
            &mut ctx,
        )
        .unwrap_err();
        assert!(matches!(err, FolioError::InvalidFunctionCall { .. }));
    }

    #[test]
    fn test_injected_parameter_not_suppliable() {
        let mut ctx = Context::default();
        let err = bind(
            &signature(),
            &call(vec![
                FunctionCallArgument::positional(lit("1")),
                FunctionCallArgument::named("c", lit("x")),
            ]),
            &mut ctx,
        )
        .unwrap_err();
        assert!(matches!(err, FolioError::InvalidFunctionCall { .. }));
    }

    #[test]
    fn test_non_numeric_names_parameter() {
        let mut ctx = Context::default();
        let err = bind(
            &signature(),
            &call(vec![FunctionCallArgument::positional(lit("abc"))]),
            &mut ctx,
        )
        .unwrap_err();
        match err {
            FolioError::IllegalTypeConversion { parameter, expected, .. } => {
                assert_eq!(parameter, "a");
                assert_eq!(expected, "number");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_excess_and_missing_arguments() {
        let mut ctx = Context::default();
        let excess = bind(
            &signature(),
            &call(vec![
                FunctionCallArgument::positional(lit("1")),
                FunctionCallArgument::positional(lit("2")),
                FunctionCallArgument::positional(lit("3")),
            ]),
            &mut ctx,
        );
        assert!(matches!(excess, Err(FolioError::InvalidFunctionCall { .. })));

        let missing = bind(&signature(), &call(vec![]), &mut ctx);
        assert!(matches!(missing, Err(FolioError::InvalidFunctionCall { .. })));
    }

    #[test]
    fn test_body_binds_last_parameter() {
        let function = Function::builder("g")
            .param("head", ParamType::String)
            .param("body", ParamType::String)
            .build(|_, _| Ok(Value::None));
        let mut body = FunctionCallArgument::positional(lit("inside"));
        body.is_body = true;

        let mut ctx = Context::default();
        let bound = bind(
            &function,
            &FunctionCall::new(
                "g",
                vec![FunctionCallArgument::positional(lit("top")), body.clone()],
                true,
                Span::default(),
            ),
            &mut ctx,
        )
        .unwrap();
        assert_eq!(bound.string("body").as_deref(), Some("inside"));

        let conflict = bind(
            &function,
            &FunctionCall::new(
                "g",
                vec![
                    FunctionCallArgument::positional(lit("top")),
                    FunctionCallArgument::positional(lit("also")),
                    body,
                ],
                true,
                Span::default(),
            ),
            &mut ctx,
        );
        assert!(matches!(conflict, Err(FolioError::InvalidFunctionCall { .. })));
    }
}
