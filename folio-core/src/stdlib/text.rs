//! String manipulation and localization lookups.

use crate::function::{Function, ParamType};
use crate::value::Value;
use unicode_segmentation::UnicodeSegmentation;

pub(super) fn functions() -> Vec<Function> {
    vec![
        unary("uppercase", |s| s.to_uppercase()),
        unary("lowercase", |s| s.to_lowercase()),
        unary("capitalize", capitalize),
        concatenate(),
        length(),
        localize(),
    ]
}

fn unary(name: &'static str, op: fn(&str) -> String) -> Function {
    Function::builder(name)
        .param("text", ParamType::String)
        .build(move |_, args| Ok(Value::String(op(&args.string("text").unwrap_or_default()))))
}

fn capitalize(text: &str) -> String {
    let mut graphemes = text.graphemes(true);
    match graphemes.next() {
        Some(first) => first.to_uppercase() + graphemes.as_str(),
        None => String::new(),
    }
}

fn concatenate() -> Function {
    Function::builder("concatenate")
        .param("a", ParamType::String)
        .param("b", ParamType::String)
        .build(|_, args| {
            let (a, b) = (args.string("a").unwrap_or_default(), args.string("b").unwrap_or_default());
            Ok(Value::String(a + &b))
        })
}

/// Length in user-perceived characters
fn length() -> Function {
    Function::builder("length")
        .param("text", ParamType::String)
        .build(|_, args| {
            let text = args.string("text").unwrap_or_default();
            Ok(Value::Number(text.graphemes(true).count() as f64))
        })
}

/// `.localize {table:key}`, or a bare key of the built-in table
fn localize() -> Function {
    Function::builder("localize")
        .param("key", ParamType::String)
        .build(|env, args| {
            let key = args.string("key").unwrap_or_default();
            env.ctx.localize(&key).map(Value::String)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FolioError;
    use crate::tests::{compile, compile_strict};

    #[test]
    fn test_case_functions() {
        assert_eq!(compile("A .uppercase {loud} and .lowercase {QUIET} word"), "A LOUD and quiet word");
        assert_eq!(compile(".capitalize {élan vital}"), "Élan vital");
    }

    #[test]
    fn test_capitalize_keeps_combining_marks() {
        assert_eq!(capitalize("e\u{301}te\u{301}"), "E\u{301}te\u{301}");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_concatenate_and_length() {
        assert_eq!(compile(".concatenate {foo} {bar}"), "foobar");
        assert_eq!(compile(".length {naïve}"), "5");
        assert_eq!(compile(".length {🇮🇹🇫🇷}"), "2");
    }

    #[test]
    fn test_localize_builtin_table() {
        assert_eq!(compile(".doclang {de}\n\n.localize {bibliography}\n"), "Literaturverzeichnis");
    }

    #[test]
    fn test_localize_without_locale() {
        let err = compile_strict(".localize {std:figure}\n").unwrap_err();
        assert!(matches!(err, FolioError::Localization { .. }));
        assert_eq!(err.exit_code(), 30);
    }

    #[test]
    fn test_localize_missing_table() {
        let err = compile_strict(".doclang {en}\n\n.localize {nope:figure}\n").unwrap_err();
        assert!(matches!(err, FolioError::Localization { ref message } if message.contains("nope")));
    }
}
