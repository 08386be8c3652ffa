//! Lambdas: markup bodies with named or implicit parameters.

use super::Value;
use crate::context::Context;
use crate::error::{FolioError, Result};
use crate::function::{evaluate_all, plain_text_of, Function};
use std::collections::HashMap;

/// A deferred body invoked with positional values.
///
/// An explicit header line `a b:` of lowercase names binds the parameters.
/// Without one, the values are bound to `1`, `2`, ... in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub parameters: Vec<String>,
    pub body: String,
    pub explicit: bool,
    pub is_block: bool,
    pub offset: usize,
}

impl Lambda {
    /// Split an optional parameter header off `source`
    pub fn parse(source: &str, is_block: bool, offset: usize) -> Self {
        let trimmed = source.trim_start_matches(['\n', '\r']);
        let (first, rest) = match trimmed.split_once('\n') {
            Some((first, rest)) => (first, Some(rest)),
            None => (trimmed, None),
        };

        if let Some(header) = first.trim().strip_suffix(':') {
            let names: Vec<String> = header.split_whitespace().map(String::from).collect();
            if !names.is_empty() && names.iter().all(|n| is_parameter_name(n)) {
                return Self {
                    parameters: names,
                    body: rest.unwrap_or("").to_string(),
                    explicit: true,
                    is_block,
                    offset,
                };
            }
        }

        Self {
            parameters: Vec::new(),
            body: source.to_string(),
            explicit: false,
            is_block,
            offset,
        }
    }

    /// Bind `arguments`, evaluate the body and unbind.
    ///
    /// Returns the plain string when the body is a single text run,
    /// otherwise its content.
    pub fn invoke(&self, ctx: &mut Context, arguments: Vec<Value>) -> Result<Value> {
        if self.explicit && arguments.len() != self.parameters.len() {
            return Err(FolioError::invalid_call(
                "lambda",
                format!(
                    "expected {} argument(s) ({}), got {}",
                    self.parameters.len(),
                    self.parameters.join(", "),
                    arguments.len()
                ),
            ));
        }

        let frame: HashMap<String, Function> = arguments
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                let name = match self.parameters.get(i) {
                    Some(name) => name.clone(),
                    None => (i + 1).to_string(),
                };
                (name.clone(), Function::constant(name, value))
            })
            .collect();

        ctx.push_scope(frame);
        let result = self.evaluate(ctx);
        ctx.pop_scope();
        result
    }

    fn evaluate(&self, ctx: &mut Context) -> Result<Value> {
        let flavor = ctx.flavor();
        let nodes = if self.is_block {
            flavor.parser().blocks(&self.body, self.offset, ctx)
        } else {
            flavor.parser().inline(self.body.trim(), self.offset, ctx)
        };
        evaluate_all(&nodes, ctx)?;

        Ok(match plain_text_of(&nodes) {
            Some(text) => Value::String(text),
            None => Value::Content(nodes),
        })
    }
}

fn is_parameter_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_names_parameters() {
        let lambda = Lambda::parse("item index:\nbody .item", true, 0);
        assert!(lambda.explicit);
        assert_eq!(lambda.parameters, vec!["item", "index"]);
        assert_eq!(lambda.body, "body .item");
    }

    #[test]
    fn test_prose_first_line_is_not_a_header() {
        let lambda = Lambda::parse("Note that:\nthis is prose", true, 0);
        assert!(!lambda.explicit);
        assert_eq!(lambda.body, "Note that:\nthis is prose");
    }

    #[test]
    fn test_implicit_parameters() {
        let mut ctx = Context::default();
        let lambda = Lambda::parse("<.1|.2>", false, 0);
        let value = lambda
            .invoke(&mut ctx, vec![Value::from("a"), Value::Number(2.0)])
            .unwrap();
        assert_eq!(value, Value::from("<a|2>"));
    }

    #[test]
    fn test_arity_mismatch() {
        let mut ctx = Context::default();
        let lambda = Lambda::parse("x:\n.x", true, 0);
        let err = lambda.invoke(&mut ctx, vec![]).unwrap_err();
        assert!(matches!(err, FolioError::InvalidFunctionCall { .. }));
    }

    #[test]
    fn test_scope_popped_after_invoke() {
        let mut ctx = Context::default();
        let lambda = Lambda::parse("x:\n.x", true, 0);
        assert_eq!(lambda.invoke(&mut ctx, vec![Value::from("v")]).unwrap(), Value::from("v"));
        assert!(ctx.lookup("x").is_none());
    }
}
