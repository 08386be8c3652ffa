//! Runtime values produced by expressions and functions.

pub mod factory;
pub mod lambda;
pub mod literal;

use crate::ast::{Node, NodeRef};
use std::fmt;
use std::rc::Rc;

pub use factory::{EnumSpec, ValueFactory};
pub use lambda::Lambda;

/// Length unit of a [`Size`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Pixels,
    Points,
    Centimeters,
    Millimeters,
    Inches,
    Em,
    Percent,
}

impl SizeUnit {
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "px" => Some(SizeUnit::Pixels),
            "pt" => Some(SizeUnit::Points),
            "cm" => Some(SizeUnit::Centimeters),
            "mm" => Some(SizeUnit::Millimeters),
            "in" => Some(SizeUnit::Inches),
            "em" => Some(SizeUnit::Em),
            "%" => Some(SizeUnit::Percent),
            _ => None,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            SizeUnit::Pixels => "px",
            SizeUnit::Points => "pt",
            SizeUnit::Centimeters => "cm",
            SizeUnit::Millimeters => "mm",
            SizeUnit::Inches => "in",
            SizeUnit::Em => "em",
            SizeUnit::Percent => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub value: f64,
    pub unit: SizeUnit,
}

/// Largest range that expands into an iterable
pub const MAX_RANGE_LEN: u64 = 1_000_000;

/// Inclusive integer range, either bound may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl Range {
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Number of values, `None` when the end is open; an open start counts from 1
    pub fn len(&self) -> Option<u64> {
        let end = i128::from(self.end?);
        let start = i128::from(self.start.unwrap_or(1));
        u64::try_from((end - start + 1).max(0)).ok()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Values of a range with a finite end of at most [`MAX_RANGE_LEN`] values
    pub fn values(&self) -> Option<Vec<i64>> {
        if self.len()? > MAX_RANGE_LEN {
            return None;
        }
        let end = self.end?;
        let start = self.start.unwrap_or(1);
        Some((start..=end).collect())
    }
}

/// A value flowing through expressions, arguments and function results
#[derive(Debug, Clone)]
pub enum Value {
    None,
    String(String),
    Number(f64),
    Boolean(bool),
    Size(Size),
    Range(Range),
    /// Canonical variant name of an enum parameter
    Enum(String),
    Iterable(Vec<Value>),
    Dictionary(Vec<(String, Value)>),
    Content(Vec<NodeRef>),
    Node(NodeRef),
    Lambda(Rc<Lambda>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Size(_) => "size",
            Value::Range(_) => "range",
            Value::Enum(_) => "enum",
            Value::Iterable(_) => "iterable",
            Value::Dictionary(_) => "dictionary",
            Value::Content(_) => "content",
            Value::Node(_) => "node",
            Value::Lambda(_) => "lambda",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    fn is_content(&self) -> bool {
        matches!(self, Value::Content(_) | Value::Node(_))
    }

    /// Fold `other` after `self`.
    ///
    /// Scalars concatenate as strings; content on either side makes the
    /// result content, with strings becoming text nodes; sequences splice.
    pub fn append(self, other: Value) -> Value {
        match (self, other) {
            (Value::None, other) => other,
            (this, Value::None) => this,
            (this, other) if this.is_content() || other.is_content() => {
                let mut nodes = this.into_nodes();
                nodes.extend(other.into_nodes());
                Value::Content(nodes)
            }
            (Value::Iterable(mut items), Value::Iterable(more)) => {
                items.extend(more);
                Value::Iterable(items)
            }
            (Value::Iterable(mut items), other) => {
                items.push(other);
                Value::Iterable(items)
            }
            (this, other) => Value::String(format!("{}{}", this, other)),
        }
    }

    /// Nodes representing this value inside content
    pub fn into_nodes(self) -> Vec<NodeRef> {
        match self {
            Value::None | Value::Lambda(_) => Vec::new(),
            Value::Content(nodes) => nodes,
            Value::Node(node) => vec![node],
            Value::Iterable(items) => items.into_iter().flat_map(Value::into_nodes).collect(),
            other => vec![Node::text(other.to_string())],
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Size(a), Value::Size(b)) => a == b,
            (Value::Range(a), Value::Range(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Iterable(a), Value::Iterable(b)) => a == b,
            (Value::Dictionary(a), Value::Dictionary(b)) => a == b,
            (Value::Node(a), Value::Node(b)) => Rc::ptr_eq(a, b),
            (Value::Content(a), Value::Content(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Rc::ptr_eq(x, y))
            }
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Numbers without a fractional part print as integers
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => Ok(()),
            Value::String(s) | Value::Enum(s) => f.write_str(s),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Size(size) => write!(f, "{}{}", format_number(size.value), size.unit.suffix()),
            Value::Range(range) => {
                if let Some(start) = range.start {
                    write!(f, "{}", start)?;
                }
                f.write_str("..")?;
                if let Some(end) = range.end {
                    write!(f, "{}", end)?;
                }
                Ok(())
            }
            Value::Iterable(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                f.write_str(&parts.join(", "))
            }
            Value::Dictionary(entries) => {
                let parts: Vec<String> = entries.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                f.write_str(&parts.join(", "))
            }
            Value::Content(nodes) => {
                for node in nodes {
                    f.write_str(&node.plain_text())?;
                }
                Ok(())
            }
            Value::Node(node) => f.write_str(&node.plain_text()),
            Value::Lambda(lambda) => write!(f, "<lambda/{}>", lambda.parameters.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_strings_and_numbers() {
        let v = Value::from("a").append(Value::Number(2.0)).append(Value::Boolean(true));
        assert_eq!(v, Value::from("a2true"));
    }

    #[test]
    fn test_append_content_splices() {
        let node = Node::text("b");
        let v = Value::from("a").append(Value::Node(node.clone()));
        match v {
            Value::Content(nodes) => {
                assert_eq!(nodes.len(), 2);
                assert_eq!(nodes[0].plain_text(), "a");
                assert!(Rc::ptr_eq(&nodes[1], &node));
            }
            other => panic!("expected content, got {:?}", other),
        }
    }

    #[test]
    fn test_append_none_is_identity() {
        assert_eq!(Value::None.append(Value::Number(1.0)), Value::Number(1.0));
    }

    #[test]
    fn test_display_numbers() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_range_values() {
        assert_eq!(Range::new(2, 4).values(), Some(vec![2, 3, 4]));
        let open = Range {
            start: None,
            end: Some(2),
        };
        assert_eq!(open.values(), Some(vec![1, 2]));
        let unbounded = Range {
            start: Some(1),
            end: None,
        };
        assert_eq!(unbounded.values(), None);
    }

    #[test]
    fn test_range_too_long_to_expand() {
        let huge = Range::new(1, i64::MAX);
        assert_eq!(huge.len(), Some(i64::MAX as u64));
        assert_eq!(huge.values(), None);

        let widest = Range::new(i64::MIN, i64::MAX);
        assert_eq!(widest.len(), None);
        assert_eq!(widest.values(), None);

        let capped = Range::new(1, MAX_RANGE_LEN as i64);
        assert_eq!(capped.values().map(|v| v.len()), Some(MAX_RANGE_LEN as usize));
        assert!(Range::new(5, 2).is_empty());
    }
}
