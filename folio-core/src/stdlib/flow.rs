//! Variables, user functions, conditionals and loops.
//!
//! Bodies are lambda parameters, so they are parsed and evaluated only when
//! a branch is taken or an iteration runs.

use crate::error::FolioError;
use crate::function::{Function, ParamType};
use crate::value::{Lambda, Value, MAX_RANGE_LEN};
use std::rc::Rc;
use tracing::debug;

pub(super) fn functions() -> Vec<Function> {
    vec![
        var(),
        function(),
        let_(),
        conditional("if", true),
        conditional("ifnot", false),
        foreach(),
        repeat(),
    ]
}

/// `.var {name} {value}` declares `.name`, replacing an earlier value
fn var() -> Function {
    Function::builder("var")
        .param("name", ParamType::String)
        .param("value", ParamType::Dynamic)
        .build(|env, args| {
            let name = args.string("name").unwrap_or_default().trim().to_string();
            if name.is_empty() {
                return Err(FolioError::invalid_call("var", "variable name is empty"));
            }
            env.ctx.declare(Function::constant(name, args.get("value").clone()));
            Ok(Value::None)
        })
}

/// `.function {name}` with a lambda body; the lambda's parameters become
/// the function's, all required
fn function() -> Function {
    Function::builder("function")
        .param("name", ParamType::String)
        .param("body", ParamType::Lambda)
        .build(|env, args| {
            let name = args.string("name").unwrap_or_default().trim().to_string();
            let Some(lambda) = args.lambda("body") else {
                return Err(FolioError::invalid_call("function", "missing body"));
            };
            debug!("Declaring .{}({})", name, lambda.parameters.join(", "));
            env.ctx.declare(user_function(name, lambda));
            Ok(Value::None)
        })
}

fn user_function(name: String, lambda: Rc<Lambda>) -> Function {
    let mut builder = Function::builder(name);
    for parameter in &lambda.parameters {
        builder = builder.param(parameter, ParamType::Dynamic);
    }
    builder.build(move |env, args| lambda.invoke(env.ctx, args.values().cloned().collect()))
}

/// `.let {value}` binds the value to the body's single parameter
fn let_() -> Function {
    Function::builder("let")
        .param("value", ParamType::Dynamic)
        .param("body", ParamType::Lambda)
        .build(|env, args| match args.lambda("body") {
            Some(body) => body.invoke(env.ctx, vec![args.get("value").clone()]),
            None => Ok(Value::None),
        })
}

fn conditional(name: &'static str, expected: bool) -> Function {
    Function::builder(name)
        .param("condition", ParamType::Boolean)
        .param("body", ParamType::Lambda)
        .build(move |env, args| {
            if args.boolean("condition") != Some(expected) {
                return Ok(Value::None);
            }
            match args.lambda("body") {
                Some(body) => body.invoke(env.ctx, Vec::new()),
                None => Ok(Value::None),
            }
        })
}

/// `.foreach {iterable}` invokes the body once per item
fn foreach() -> Function {
    Function::builder("foreach")
        .param("iterable", ParamType::Iterable)
        .param("body", ParamType::Lambda)
        .build(|env, args| {
            let Some(body) = args.lambda("body") else {
                return Ok(Value::None);
            };
            let results = args
                .items("iterable")
                .into_iter()
                .map(|item| body.invoke(env.ctx, vec![item]))
                .collect::<crate::error::Result<Vec<_>>>()?;
            Ok(Value::Iterable(results))
        })
}

/// `.repeat {n}` invokes the body with `1` through `n`
fn repeat() -> Function {
    Function::builder("repeat")
        .param("times", ParamType::Integer)
        .param("body", ParamType::Lambda)
        .build(|env, args| {
            let times = args.integer("times").unwrap_or(0);
            if times < 0 || times as u64 > MAX_RANGE_LEN {
                return Err(FolioError::runtime("repeat", format!("cannot repeat {} times", times)));
            }
            let Some(body) = args.lambda("body") else {
                return Ok(Value::None);
            };
            let results = (1..=times)
                .map(|i| body.invoke(env.ctx, vec![Value::Number(i as f64)]))
                .collect::<crate::error::Result<Vec<_>>>()?;
            Ok(Value::Iterable(results))
        })
}

#[cfg(test)]
mod tests {
    use crate::error::FolioError;
    use crate::tests::{compile, compile_strict};

    #[test]
    fn test_variable_declared_then_read() {
        assert_eq!(compile(".var {who} {world}\n\nHello .who!"), "Hello world!");
    }

    #[test]
    fn test_user_function_with_named_parameters() {
        let source = ".function {greet}\n  name:\n  Hello, .name!\n\n.greet {Ada}\n\n.greet name:{Grace}\n";
        assert_eq!(compile(source), "Hello, Ada!\n\nHello, Grace!");
    }

    #[test]
    fn test_user_function_arity() {
        let source = ".function {pair}\n  a b:\n  .a and .b\n\n.pair {x}\n";
        let err = compile_strict(source).unwrap_err();
        assert!(matches!(err, FolioError::InvalidFunctionCall { ref function, .. } if function == "pair"));
    }

    #[test]
    fn test_let_binds_evaluated_value() {
        let source = ".let {.sum {2} {3}}\n  total:\n  Total is .total\n";
        assert_eq!(compile(source), "Total is 5");
    }

    #[test]
    fn test_conditionals_skip_untaken_body() {
        let source = ".if {yes}\n  shown\n\n.if {no}\n  .nosuchfunction\n\n.ifnot {false}\n  also shown\n";
        assert_eq!(compile_strict(source).unwrap(), "shown\n\nalso shown");
    }

    #[test]
    fn test_body_blank_line_may_hold_unicode_spaces() {
        let source = ".if {yes}\n  a\n \u{a0}\n  b\n";
        assert_eq!(compile_strict(source).unwrap(), "a\n\nb");
    }

    #[test]
    fn test_foreach_over_range_and_list() {
        let source = ".foreach {1..3}\n  n:\n  Item .n\n";
        assert_eq!(compile(source), "Item 1\n\nItem 2\n\nItem 3");

        let source = "Letters: .foreach {a, b, c} {[.1]}";
        assert_eq!(compile(source), "Letters: [a][b][c]");
    }

    #[test]
    fn test_repeat_binds_iteration_number() {
        assert_eq!(compile(".repeat {3} {.1}"), "1\n\n2\n\n3");
    }

    #[test]
    fn test_repeat_rejects_negative_count() {
        let err = compile_strict(".repeat {-1} {x}\n").unwrap_err();
        assert!(matches!(err, FolioError::Runtime { .. }));
    }

    #[test]
    fn test_oversized_loops_fail_instead_of_expanding() {
        let err = compile_strict(".repeat {10000000000} {x}\n").unwrap_err();
        assert!(matches!(err, FolioError::Runtime { ref function, .. } if function == "repeat"));

        let err = compile_strict(".foreach {1..10000000000}\n  n:\n  .n\n").unwrap_err();
        assert!(matches!(err, FolioError::IllegalTypeConversion { .. }));

        let out = compile("Before\n\n.foreach {1..10000000000} {.1}\n\nAfter\n");
        assert!(out.contains("[Illegal type conversion:"), "{}", out);
        assert!(out.ends_with("After"), "{}", out);
    }
}
