//! Iterables and dictionaries.

use crate::error::FolioError;
use crate::function::{Function, ParamType};
use crate::value::Value;

pub(super) fn functions() -> Vec<Function> {
    vec![getat(), size(), first(), last(), reversed(), dictionary(), get()]
}

/// `.getat {iterable} {index}`, 1-based
fn getat() -> Function {
    Function::builder("getat")
        .param("iterable", ParamType::Iterable)
        .param("index", ParamType::Integer)
        .build(|_, args| {
            let items = args.items("iterable");
            let index = args.integer("index").unwrap_or(0);
            usize::try_from(index)
                .ok()
                .and_then(|i| i.checked_sub(1))
                .and_then(|i| items.get(i).cloned())
                .ok_or_else(|| FolioError::NoSuchElement {
                    element: index.to_string(),
                    candidates: if items.is_empty() {
                        "nothing, the collection is empty".to_string()
                    } else {
                        format!("1..{}", items.len())
                    },
                })
        })
}

fn size() -> Function {
    Function::builder("size")
        .param("iterable", ParamType::Iterable)
        .build(|_, args| Ok(Value::Number(args.items("iterable").len() as f64)))
}

fn first() -> Function {
    Function::builder("first")
        .param("iterable", ParamType::Iterable)
        .build(|_, args| Ok(args.items("iterable").into_iter().next().unwrap_or(Value::None)))
}

fn last() -> Function {
    Function::builder("last")
        .param("iterable", ParamType::Iterable)
        .build(|_, args| Ok(args.items("iterable").pop().unwrap_or(Value::None)))
}

fn reversed() -> Function {
    Function::builder("reversed")
        .param("iterable", ParamType::Iterable)
        .build(|_, args| {
            let mut items = args.items("iterable");
            items.reverse();
            Ok(Value::Iterable(items))
        })
}

/// Passes a dictionary through, so `key: value` lines become one value
fn dictionary() -> Function {
    Function::builder("dictionary")
        .param("entries", ParamType::Dictionary)
        .build(|_, args| Ok(args.get("entries").clone()))
}

fn get() -> Function {
    Function::builder("get")
        .param("dictionary", ParamType::Dictionary)
        .param("key", ParamType::String)
        .build(|_, args| {
            let key = args.string("key").unwrap_or_default();
            let key = key.trim();
            let Value::Dictionary(entries) = args.get("dictionary") else {
                return Ok(Value::None);
            };
            entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| FolioError::NoSuchElement {
                    element: key.to_string(),
                    candidates: entries.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>().join(", "),
                })
        })
}
