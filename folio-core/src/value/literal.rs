//! Literal classification of argument text.

use super::{Range, Size, SizeUnit};
use logos::{Lexer, Logos};

/// Scalar literal shapes recognized in argument text
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Literal {
    #[token("true", ignore(ascii_case))]
    #[token("yes", ignore(ascii_case))]
    True,
    #[token("false", ignore(ascii_case))]
    #[token("no", ignore(ascii_case))]
    False,

    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[regex(r"-?[0-9]+(\.[0-9]+)?(px|pt|cm|mm|in|em|%)", size)]
    Size(Size),

    #[regex(r"-?[0-9]+\.\.(-?[0-9]+)?", range)]
    #[regex(r"\.\.-?[0-9]+", range)]
    Range(Range),
}

fn size(lex: &mut Lexer<Literal>) -> Option<Size> {
    let slice = lex.slice();
    let split = slice
        .find(|c: char| c.is_ascii_alphabetic() || c == '%')
        .unwrap_or(slice.len());
    let value = slice[..split].parse::<f64>().ok()?;
    let unit = SizeUnit::from_suffix(&slice[split..])?;
    Some(Size { value, unit })
}

fn range(lex: &mut Lexer<Literal>) -> Option<Range> {
    let (start, end) = lex.slice().split_once("..")?;
    let bound = |s: &str| -> Option<Option<i64>> {
        if s.is_empty() {
            Some(None)
        } else {
            s.parse::<i64>().ok().map(Some)
        }
    };
    Some(Range {
        start: bound(start)?,
        end: bound(end)?,
    })
}

/// Classify `text` as a single literal, or `None` when it is anything else
pub fn classify(text: &str) -> Option<Literal> {
    let mut lexer = Literal::lexer(text.trim());
    let first = lexer.next()?.ok()?;
    if lexer.next().is_some() {
        return None;
    }
    Some(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(classify(" 42 "), Some(Literal::Number(42.0)));
        assert_eq!(classify("-2.5"), Some(Literal::Number(-2.5)));
        assert_eq!(classify("4 2"), None);
    }

    #[test]
    fn test_booleans_ignore_case() {
        assert_eq!(classify("Yes"), Some(Literal::True));
        assert_eq!(classify("FALSE"), Some(Literal::False));
        assert_eq!(classify("maybe"), None);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(
            classify("2.5cm"),
            Some(Literal::Size(Size {
                value: 2.5,
                unit: SizeUnit::Centimeters
            }))
        );
        assert_eq!(
            classify("50%"),
            Some(Literal::Size(Size {
                value: 50.0,
                unit: SizeUnit::Percent
            }))
        );
    }

    #[test]
    fn test_ranges() {
        assert_eq!(
            classify("1..5"),
            Some(Literal::Range(Range {
                start: Some(1),
                end: Some(5)
            }))
        );
        assert_eq!(
            classify("..5"),
            Some(Literal::Range(Range {
                start: None,
                end: Some(5)
            }))
        );
        assert_eq!(
            classify("2.."),
            Some(Literal::Range(Range {
                start: Some(2),
                end: None
            }))
        );
    }
}
