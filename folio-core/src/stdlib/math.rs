//! Arithmetic, comparison and logic.

use crate::error::FolioError;
use crate::function::{Function, ParamType};
use crate::value::literal::{classify, Literal};
use crate::value::{Range, Value};

pub(super) fn functions() -> Vec<Function> {
    vec![
        binary("sum", |a, b| a + b),
        binary("subtract", |a, b| a - b),
        binary("multiply", |a, b| a * b),
        divide(),
        pow(),
        iseven(),
        equals(),
        not(),
        range(),
    ]
}

fn binary(name: &'static str, op: fn(f64, f64) -> f64) -> Function {
    Function::builder(name)
        .param("a", ParamType::Number)
        .param("b", ParamType::Number)
        .build(move |_, args| {
            let (a, b) = (args.number("a").unwrap_or(0.0), args.number("b").unwrap_or(0.0));
            Ok(Value::Number(op(a, b)))
        })
}

fn divide() -> Function {
    Function::builder("divide")
        .param("a", ParamType::Number)
        .param("b", ParamType::Number)
        .build(|_, args| {
            let (a, b) = (args.number("a").unwrap_or(0.0), args.number("b").unwrap_or(0.0));
            if b == 0.0 {
                return Err(FolioError::runtime("divide", "division by zero"));
            }
            Ok(Value::Number(a / b))
        })
}

fn pow() -> Function {
    Function::builder("pow")
        .param("base", ParamType::Number)
        .param("exponent", ParamType::Number)
        .build(|_, args| {
            let base = args.number("base").unwrap_or(0.0);
            let exponent = args.number("exponent").unwrap_or(1.0);
            Ok(Value::Number(base.powf(exponent)))
        })
}

fn iseven() -> Function {
    Function::builder("iseven")
        .param("n", ParamType::Integer)
        .build(|_, args| Ok(Value::Boolean(args.integer("n").unwrap_or(0) % 2 == 0)))
}

/// Numbers compare by value (`2` equals `2.0`), anything else by its text
fn equals() -> Function {
    Function::builder("equals")
        .param("a", ParamType::Dynamic)
        .param("b", ParamType::Dynamic)
        .build(|_, args| {
            let (a, b) = (args.get("a"), args.get("b"));
            let equal = match (numeric(a), numeric(b)) {
                (Some(a), Some(b)) => a == b,
                _ => a.to_string().trim() == b.to_string().trim(),
            };
            Ok(Value::Boolean(equal))
        })
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::String(s) => match classify(s) {
            Some(Literal::Number(n)) => Some(n),
            _ => None,
        },
        _ => None,
    }
}

fn not() -> Function {
    Function::builder("not")
        .param("value", ParamType::Boolean)
        .build(|_, args| Ok(Value::Boolean(!args.boolean("value").unwrap_or(false))))
}

/// `.range {start} {end}`, either bound may be left out
fn range() -> Function {
    Function::builder("range")
        .nullable("start", ParamType::Integer)
        .nullable("end", ParamType::Integer)
        .build(|_, args| {
            let range = Range {
                start: args.integer("start"),
                end: args.integer("end"),
            };
            if let (Some(start), Some(end)) = (range.start, range.end) {
                if start > end {
                    return Err(FolioError::runtime("range", format!("{} is after {}", start, end)));
                }
            }
            Ok(Value::Range(range))
        })
}
