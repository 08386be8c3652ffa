//! Numbering formats for headings and numbered elements.
//!
//! A format string mixes counting symbols with fixed text. `1` is decimal,
//! `a`/`A` alphabetic (bijective base 26), `i`/`I` roman; any other
//! character is a fixed separator. `1.A.i` formats `[2, 1, 3]` as `2.A.iii`.

use crate::ast::NumberedKind;
use crate::config::{ConfigError, NumberingDefaults};
use folio_types::DocumentType;
use std::fmt;

/// Level-index list, outermost level first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location(pub Vec<usize>);

impl Location {
    pub fn levels(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|n| n.to_string()).collect();
        f.write_str(&parts.join("."))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Counter {
    Decimal,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
}

impl Counter {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '1' => Some(Counter::Decimal),
            'a' => Some(Counter::LowerAlpha),
            'A' => Some(Counter::UpperAlpha),
            'i' => Some(Counter::LowerRoman),
            'I' => Some(Counter::UpperRoman),
            _ => None,
        }
    }

    fn render(self, n: usize) -> String {
        match self {
            Counter::Decimal => n.to_string(),
            Counter::LowerAlpha => alphabetic(n),
            Counter::UpperAlpha => alphabetic(n).to_uppercase(),
            Counter::LowerRoman => roman(n),
            Counter::UpperRoman => roman(n).to_uppercase(),
        }
    }
}

/// Parsed numbering format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingFormat {
    source: String,
    // (fixed text before the counter, counter)
    levels: Vec<(String, Counter)>,
    suffix: String,
}

impl NumberingFormat {
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let mut levels = Vec::new();
        let mut fixed = String::new();

        for c in source.chars() {
            match Counter::from_char(c) {
                Some(counter) => levels.push((std::mem::take(&mut fixed), counter)),
                None => fixed.push(c),
            }
        }

        if levels.is_empty() {
            return Err(ConfigError::InvalidNumbering(
                source.to_string(),
                "no counting symbol (1, a, A, i, I)".to_string(),
            ));
        }

        Ok(Self {
            source: source.to_string(),
            levels,
            suffix: fixed,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of counting symbols
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Render a location. Levels beyond the format are dropped; the suffix
    /// is only written when every level of the format was rendered.
    pub fn format(&self, location: &Location) -> String {
        let mut out = String::new();
        let values = location.levels();

        for (i, (fixed, counter)) in self.levels.iter().enumerate() {
            let Some(&value) = values.get(i) else {
                return out;
            };
            out.push_str(fixed);
            out.push_str(&counter.render(value));
        }

        out.push_str(&self.suffix);
        out
    }
}

impl fmt::Display for NumberingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Numbering formats of a document, per numbered element kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberingConfig {
    pub headings: Option<NumberingFormat>,
    pub code: Option<NumberingFormat>,
    pub math: Option<NumberingFormat>,
}

impl NumberingConfig {
    /// Defaults for a document type: paged documents and slides number
    /// their headings and elements, plain documents do not
    pub fn default_for(doc_type: DocumentType) -> Self {
        match doc_type {
            DocumentType::Plain => Self::default(),
            DocumentType::Paged | DocumentType::Slides => Self {
                headings: NumberingFormat::parse("1.1.1").ok(),
                code: NumberingFormat::parse("1.1").ok(),
                math: NumberingFormat::parse("(1.1)").ok(),
            },
        }
    }

    /// Apply configured overrides on top of the type defaults
    pub fn from_defaults(doc_type: DocumentType, defaults: &NumberingDefaults) -> Result<Self, ConfigError> {
        let mut config = Self::default_for(doc_type);
        if let Some(headings) = &defaults.headings {
            config.headings = Some(NumberingFormat::parse(headings)?);
        }
        if let Some(code) = &defaults.code {
            config.code = Some(NumberingFormat::parse(code)?);
        }
        if let Some(math) = &defaults.math {
            config.math = Some(NumberingFormat::parse(math)?);
        }
        Ok(config)
    }

    /// Formats of `overrides` replace those of `self` where set
    pub fn overlay(&self, overrides: &NumberingConfig) -> Self {
        Self {
            headings: overrides.headings.clone().or_else(|| self.headings.clone()),
            code: overrides.code.clone().or_else(|| self.code.clone()),
            math: overrides.math.clone().or_else(|| self.math.clone()),
        }
    }

    pub fn for_kind(&self, kind: NumberedKind) -> Option<&NumberingFormat> {
        match kind {
            NumberedKind::Heading => self.headings.as_ref(),
            NumberedKind::Code => self.code.as_ref(),
            NumberedKind::Math => self.math.as_ref(),
        }
    }

    /// Section levels carried in the location of a numbered element: the
    /// format's depth minus the element's own counter
    pub fn element_depth(&self, kind: NumberedKind) -> usize {
        self.for_kind(kind)
            .map(|f| f.depth().saturating_sub(1))
            .unwrap_or(1)
    }
}

/// Bijective base-26: 1 is `a`, 26 is `z`, 27 is `aa`
fn alphabetic(mut n: usize) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'a' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

fn roman(mut n: usize) -> String {
    const TABLE: [(usize, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    if n == 0 {
        return "0".to_string();
    }
    let mut out = String::new();
    for (value, symbol) in TABLE {
        while n >= value {
            out.push_str(symbol);
            n -= value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(pattern: &str, levels: &[usize]) -> String {
        NumberingFormat::parse(pattern)
            .unwrap()
            .format(&Location(levels.to_vec()))
    }

    #[test]
    fn test_mixed_symbols() {
        assert_eq!(format("1.A.i", &[2, 1, 3]), "2.A.iii");
        assert_eq!(format("I-a", &[4, 28]), "IV-ab");
    }

    #[test]
    fn test_extra_levels_dropped() {
        assert_eq!(format("1.1", &[1, 2, 3]), "1.2");
    }

    #[test]
    fn test_missing_levels_stop_rendering() {
        assert_eq!(format("1.A.i", &[3]), "3");
        assert_eq!(format("(1)", &[7]), "(7)");
        assert_eq!(format("(1.1)", &[7]), "(7");
    }

    #[test]
    fn test_alphabetic_is_bijective() {
        assert_eq!(alphabetic(1), "a");
        assert_eq!(alphabetic(26), "z");
        assert_eq!(alphabetic(27), "aa");
        assert_eq!(alphabetic(52), "az");
    }

    #[test]
    fn test_roman() {
        assert_eq!(roman(1994), "mcmxciv");
        assert_eq!(roman(9), "ix");
    }

    #[test]
    fn test_format_without_counter_is_rejected() {
        assert!(matches!(
            NumberingFormat::parse("--"),
            Err(ConfigError::InvalidNumbering(_, _))
        ));
    }

    #[test]
    fn test_element_depth_from_format() {
        let config = NumberingConfig::from_defaults(
            DocumentType::Plain,
            &NumberingDefaults {
                headings: Some("1.1".into()),
                code: Some("1.1.a".into()),
                math: None,
            },
        )
        .unwrap();
        assert_eq!(config.element_depth(NumberedKind::Code), 2);
        assert!(config.math.is_none());
    }
}
