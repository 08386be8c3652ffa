//! Conversion of argument values to declared parameter types.

use super::literal::{classify, Literal};
use super::{Lambda, Value};
use crate::context::Context;
use crate::error::{FolioError, Result};
use crate::function::{evaluate_all, FunctionCallArgument, FunctionParameter, ParamType};
use std::rc::Rc;

/// Named set of enum variants; lookups ignore case and word separators
#[derive(Debug, PartialEq)]
pub struct EnumSpec {
    pub name: &'static str,
    pub variants: &'static [&'static str],
}

impl EnumSpec {
    /// Canonical variant matching `input`: `top-left`, `TOP_LEFT` and
    /// `Top Left` all match `topleft`
    pub fn lookup(&self, input: &str) -> Option<&'static str> {
        let wanted = normalize(input);
        self.variants.iter().copied().find(|v| normalize(v) == wanted)
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Converters from evaluated values to each [`ParamType`]
pub struct ValueFactory;

impl ValueFactory {
    /// Evaluate and convert one bound argument
    pub fn convert(
        argument: &FunctionCallArgument,
        param: &FunctionParameter,
        is_block_call: bool,
        ctx: &mut Context,
    ) -> Result<Value> {
        // Markup and lambdas are parsed from the argument source, so their
        // calls are evaluated in the right scope
        if let Some(raw) = &argument.raw {
            let offset = argument.span.start;
            match param.ty {
                ParamType::InlineMarkup => return Self::markup(raw, offset, false, ctx),
                ParamType::BlockMarkup => return Self::markup(raw, offset, true, ctx),
                ParamType::Lambda => {
                    let block = argument.is_body || (is_block_call && raw.contains('\n'));
                    return Ok(Value::Lambda(Rc::new(Lambda::parse(raw, block, offset))));
                }
                _ => {}
            }
        }

        let value = argument.expression.eval(ctx)?;
        Self::coerce(value, param, ctx)
    }

    /// Convert an already evaluated value
    pub fn coerce(value: Value, param: &FunctionParameter, ctx: &mut Context) -> Result<Value> {
        if param.nullable && matches!(&value, Value::String(s) if s.trim().is_empty()) {
            return Ok(Value::None);
        }

        let illegal = |value: &Value| {
            tracing::debug!(
                "Rejected {} value for parameter '{}' ({})",
                value.type_name(),
                param.name,
                param.ty.name()
            );
            FolioError::IllegalTypeConversion {
                parameter: param.name.clone(),
                expected: param.ty.name().to_string(),
                value: value.to_string(),
            }
        };

        match param.ty {
            ParamType::Dynamic => Ok(value),
            ParamType::String => Ok(match value {
                Value::String(_) => value,
                other => Value::String(other.to_string()),
            }),
            ParamType::Number => match &value {
                Value::Number(_) => Ok(value),
                _ => match classify(&value.to_string()) {
                    Some(Literal::Number(n)) => Ok(Value::Number(n)),
                    _ => Err(illegal(&value)),
                },
            },
            ParamType::Integer => {
                let number = match &value {
                    Value::Number(n) => Some(*n),
                    _ => match classify(&value.to_string()) {
                        Some(Literal::Number(n)) => Some(n),
                        _ => None,
                    },
                };
                match number {
                    Some(n) if n.fract() == 0.0 => Ok(Value::Number(n)),
                    _ => Err(illegal(&value)),
                }
            }
            ParamType::Boolean => match &value {
                Value::Boolean(_) => Ok(value),
                _ => match classify(&value.to_string()) {
                    Some(Literal::True) => Ok(Value::Boolean(true)),
                    Some(Literal::False) => Ok(Value::Boolean(false)),
                    _ => Err(illegal(&value)),
                },
            },
            ParamType::Enum(spec) => {
                let text = value.to_string();
                spec.lookup(&text)
                    .map(|v| Value::Enum(v.to_string()))
                    .ok_or_else(|| FolioError::NoSuchElement {
                        element: text.trim().to_string(),
                        candidates: spec.variants.join(", "),
                    })
            }
            ParamType::Size => match &value {
                Value::Size(_) => Ok(value),
                _ => match classify(&value.to_string()) {
                    Some(Literal::Size(size)) => Ok(Value::Size(size)),
                    _ => Err(illegal(&value)),
                },
            },
            ParamType::Range => match &value {
                Value::Range(_) => Ok(value),
                _ => match classify(&value.to_string()) {
                    Some(Literal::Range(range)) => Ok(Value::Range(range)),
                    _ => Err(illegal(&value)),
                },
            },
            ParamType::Iterable => {
                let shown = match &value {
                    Value::Range(_) | Value::String(_) => value.clone(),
                    _ => Value::None,
                };
                Self::iterable(value).ok_or_else(|| illegal(&shown))
            }
            ParamType::Dictionary => match value {
                Value::Dictionary(_) => Ok(value),
                Value::String(ref text) => Self::dictionary(text).ok_or_else(|| illegal(&value)),
                other => Err(illegal(&other)),
            },
            ParamType::InlineMarkup | ParamType::BlockMarkup => match value {
                Value::Content(_) | Value::Node(_) => Ok(value),
                other => {
                    let block = param.ty == ParamType::BlockMarkup;
                    Self::markup(&other.to_string(), 0, block, ctx)
                }
            },
            ParamType::Lambda => match value {
                Value::Lambda(_) => Ok(value),
                Value::String(text) => Ok(Value::Lambda(Rc::new(Lambda::parse(&text, false, 0)))),
                other => Err(illegal(&other)),
            },
        }
    }

    fn markup(source: &str, offset: usize, block: bool, ctx: &mut Context) -> Result<Value> {
        let flavor = ctx.flavor();
        let nodes = if block {
            flavor.parser().blocks(source, offset, ctx)
        } else {
            flavor.parser().inline(source, offset, ctx)
        };
        evaluate_all(&nodes, ctx)?;
        Ok(Value::Content(nodes))
    }

    fn iterable(value: Value) -> Option<Value> {
        match value {
            Value::Iterable(_) => Some(value),
            Value::Range(range) => range
                .values()
                .map(|values| Value::Iterable(values.into_iter().map(|n| Value::Number(n as f64)).collect())),
            Value::Content(nodes) => Some(Value::Iterable(nodes.into_iter().map(Value::Node).collect())),
            Value::Dictionary(entries) => Some(Value::Iterable(
                entries
                    .into_iter()
                    .map(|(k, v)| Value::Dictionary(vec![(k, v)]))
                    .collect(),
            )),
            Value::None => Some(Value::Iterable(Vec::new())),
            other => {
                let text = other.to_string();
                if let Some(Literal::Range(range)) = classify(&text) {
                    return Self::iterable(Value::Range(range));
                }
                Some(Value::Iterable(split_items(&text).into_iter().map(Value::String).collect()))
            }
        }
    }

    fn dictionary(text: &str) -> Option<Value> {
        let mut entries = Vec::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let line = line.strip_prefix("- ").unwrap_or(line);
            let (key, value) = line.split_once(':')?;
            entries.push((key.trim().to_string(), Value::String(value.trim().to_string())));
        }
        Some(Value::Dictionary(entries))
    }
}

/// Items of `- ` list lines, or else of a comma separated list
fn split_items(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if !lines.is_empty() && lines.iter().all(|l| l.starts_with("- ")) {
        return lines.iter().map(|l| l[2..].trim().to_string()).collect();
    }
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
