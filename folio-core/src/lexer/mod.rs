//! Pattern-driven tokenizer.
//!
//! A [`Tokenizer`] combines an ordered list of [`TokenPattern`]s into a single
//! alternation regex with one named group per pattern, so one left-to-right
//! scan decides which pattern fired at each match. List order is priority:
//! the `regex` crate uses leftmost-first semantics, so at a given start
//! position the earlier pattern wins.
//!
//! Patterns whose extent a regex cannot bound (balanced braces, indented
//! bodies) carry a [`Walker`], which is run from the match start and returns
//! the real end index plus an optional nested-parse payload. A walker may
//! also reject the match, in which case scanning retries the same position
//! with the patterns that follow the rejecting one.
//!
//! Separate tokenizers exist per lexical scope; see [`patterns`].

pub mod patterns;
pub mod walker;

use crate::error::{FolioError, Result, Span};
use regex::{Captures, Regex, RegexBuilder};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

pub use patterns::{FolioLexer, TokenizerFactory};
pub use walker::{FunctionCallWalker, ParagraphWalker, WalkedArgument, WalkedCall, WalkedSegment};

/// Token type tags across all lexical scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Block scope
    Newline,
    FencedCode,
    MathBlock,
    FunctionCall,
    Heading,
    LinkDefinition,
    HorizontalRule,
    PageBreak,
    BlockQuote,
    List,
    Paragraph,

    // List scope
    ListItem,

    // Inline and argument scopes
    Escape,
    CodeSpan,
    InlineMath,
    Image,
    Citation,
    Link,
    ReferenceLink,
    Strong,
    Emphasis,
    LineBreak,
    Text,
}

/// Nested-parse result attached to a token by its walker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Walked {
    /// A function call with its arguments, chain and body
    Call(WalkedCall),
}

/// Outcome of a successful walk: where the outer scan resumes
#[derive(Debug, Clone, PartialEq)]
pub struct WalkResult {
    pub end: usize,
    pub payload: Option<Walked>,
}

/// Secondary bounded sub-parser for a pattern the regex cannot delimit
pub trait Walker: Send + Sync {
    /// Walk `source` from `start`, the start of the regex match, which ended
    /// at `matched_end`. Returning `None` rejects the match.
    fn walk(&self, source: &str, start: usize, matched_end: usize) -> Option<WalkResult>;
}

/// A named pattern in a tokenizer's pattern set
pub struct TokenPattern {
    pub name: &'static str,
    pub kind: TokenKind,
    pub regex: String,
    pub walker: Option<Box<dyn Walker>>,
}

impl TokenPattern {
    pub fn new(name: &'static str, kind: TokenKind, regex: impl Into<String>) -> Self {
        Self {
            name,
            kind,
            regex: regex.into(),
            walker: None,
        }
    }

    pub fn with_walker(mut self, walker: impl Walker + 'static) -> Self {
        self.walker = Some(Box::new(walker));
        self
    }
}

impl fmt::Debug for TokenPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPattern")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("regex", &self.regex)
            .field("walker", &self.walker.is_some())
            .finish()
    }
}

/// A lexeme with its source span and capture groups
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    /// Positional groups of the pattern that produced this token
    pub groups: Vec<Option<String>>,
    /// Named groups of the pattern that produced this token
    pub named: HashMap<String, String>,
    pub walked: Option<Walked>,
}

impl Token {
    fn fill(kind: TokenKind, source: &str, start: usize, end: usize) -> Self {
        Self {
            kind,
            text: source[start..end].to_string(),
            span: Span::new(start, end),
            groups: Vec::new(),
            named: HashMap::new(),
            walked: None,
        }
    }

    /// Named capture group, if it participated in the match
    pub fn group(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(|s| s.as_str())
    }

    pub fn call(&self) -> Option<&WalkedCall> {
        match &self.walked {
            Some(Walked::Call(call)) => Some(call),
            None => None,
        }
    }
}

/// Tokenizer-wide settings
#[derive(Debug, Clone, Copy)]
pub struct TokenizerConfig {
    /// Applied to the whole combined pattern, not per pattern
    pub case_sensitive: bool,
    /// Kind of the token filling unmatched spans; unmatched text is dropped
    /// when unset
    pub fill: Option<TokenKind>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            fill: None,
        }
    }
}

/// Group layout of one pattern inside a combined regex
#[derive(Debug)]
struct Slot {
    pattern: usize,
    group: String,
    first_inner: usize,
    inner_len: usize,
    names: Vec<String>,
}

/// Alternation of a suffix of the pattern list
#[derive(Debug)]
struct Combined {
    regex: Regex,
    slots: Vec<Slot>,
}

impl Combined {
    fn build(patterns: &[TokenPattern], from: usize, case_sensitive: bool) -> Result<Option<Self>> {
        if from >= patterns.len() {
            return Ok(None);
        }

        let mut source = String::new();
        let mut slots = Vec::new();
        // Group 0 is the whole match
        let mut next_group = 1;

        for (index, pattern) in patterns.iter().enumerate().skip(from) {
            let alone = Regex::new(&pattern.regex).map_err(|e| {
                FolioError::pipeline(format!("invalid pattern '{}': {}", pattern.name, e))
            })?;
            let inner_len = alone.captures_len() - 1;
            let names = alone.capture_names().flatten().map(String::from).collect();
            let group = format!("p{}", index);

            if !source.is_empty() {
                source.push('|');
            }
            source.push_str(&format!("(?P<{}>{})", group, pattern.regex));

            slots.push(Slot {
                pattern: index,
                group,
                first_inner: next_group + 1,
                inner_len,
                names,
            });
            next_group += 1 + inner_len;
        }

        let regex = RegexBuilder::new(&source)
            .multi_line(true)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|e| FolioError::pipeline(format!("invalid pattern set: {}", e)))?;

        Ok(Some(Self { regex, slots }))
    }

    fn fired<'c>(&self, caps: &Captures<'c>) -> Option<&Slot> {
        self.slots.iter().find(|slot| caps.name(&slot.group).is_some())
    }
}

/// A match accepted by the scanner
struct Accepted {
    pattern: usize,
    start: usize,
    end: usize,
    groups: Vec<Option<String>>,
    named: HashMap<String, String>,
    walked: Option<Walked>,
}

/// Scanner over one lexical scope's pattern set
#[derive(Debug)]
pub struct Tokenizer {
    patterns: Vec<TokenPattern>,
    primary: Option<Combined>,
    /// For patterns with a walker: the alternation of the patterns after it
    fallbacks: Vec<Option<Combined>>,
    config: TokenizerConfig,
}

impl Tokenizer {
    pub fn new(patterns: Vec<TokenPattern>, config: TokenizerConfig) -> Result<Self> {
        let primary = Combined::build(&patterns, 0, config.case_sensitive)?;
        let mut fallbacks = Vec::with_capacity(patterns.len());
        for (index, pattern) in patterns.iter().enumerate() {
            if pattern.walker.is_some() {
                fallbacks.push(Combined::build(&patterns, index + 1, config.case_sensitive)?);
            } else {
                fallbacks.push(None);
            }
        }

        Ok(Self {
            patterns,
            primary,
            fallbacks,
            config,
        })
    }

    pub fn patterns(&self) -> &[TokenPattern] {
        &self.patterns
    }

    /// Tokenize `source` into an ordered token list
    pub fn tokenize(&self, source: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let Some(primary) = &self.primary else {
            self.push_fill(&mut tokens, source, 0, source.len());
            return tokens;
        };

        let mut pos = 0;
        let mut last_end = 0;

        while pos <= source.len() {
            let Some(caps) = primary.regex.captures_at(source, pos) else {
                break;
            };
            let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((pos, pos));

            match self.accept(primary, &caps, source) {
                Some(accepted) if accepted.end > accepted.start => {
                    self.push_fill(&mut tokens, source, last_end, accepted.start);
                    last_end = accepted.end;
                    pos = accepted.end;
                    tokens.push(self.token(source, accepted));
                }
                _ => {
                    // Rejected or zero-width: leave this character to the fill
                    pos = next_char_boundary(source, whole.0);
                }
            }
        }

        self.push_fill(&mut tokens, source, last_end, source.len());
        tokens
    }

    /// Resolve a primary match, following walker rejections into fallbacks
    /// anchored at the same position.
    fn accept(&self, combined: &Combined, caps: &Captures<'_>, source: &str) -> Option<Accepted> {
        let slot = combined.fired(caps)?;
        let whole = caps.get(0)?;
        let pattern = &self.patterns[slot.pattern];

        let (end, walked) = match &pattern.walker {
            Some(walker) => match walker.walk(source, whole.start(), whole.end()) {
                Some(result) => (result.end, result.payload),
                None => {
                    let fallback = self.fallbacks[slot.pattern].as_ref()?;
                    let caps = fallback.regex.captures_at(source, whole.start())?;
                    if caps.get(0)?.start() != whole.start() {
                        return None;
                    }
                    return self.accept(fallback, &caps, source);
                }
            },
            None => (whole.end(), None),
        };

        let groups = (slot.first_inner..slot.first_inner + slot.inner_len)
            .map(|i| caps.get(i).map(|m| m.as_str().to_string()))
            .collect();
        let named = slot
            .names
            .iter()
            .filter_map(|name| caps.name(name).map(|m| (name.clone(), m.as_str().to_string())))
            .collect();

        Some(Accepted {
            pattern: slot.pattern,
            start: whole.start(),
            end,
            groups,
            named,
            walked,
        })
    }

    fn token(&self, source: &str, accepted: Accepted) -> Token {
        Token {
            kind: self.patterns[accepted.pattern].kind,
            text: source[accepted.start..accepted.end].to_string(),
            span: Span::new(accepted.start, accepted.end),
            groups: accepted.groups,
            named: accepted.named,
            walked: accepted.walked,
        }
    }

    fn push_fill(&self, tokens: &mut Vec<Token>, source: &str, start: usize, end: usize) {
        if end <= start {
            return;
        }
        if let Some(kind) = self.config.fill {
            tokens.push(Token::fill(kind, source, start, end));
        }
    }
}

fn next_char_boundary(source: &str, pos: usize) -> usize {
    match source[pos..].chars().next() {
        Some(c) => pos + c.len_utf8(),
        None => pos + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_tokenizer(fill: Option<TokenKind>) -> Tokenizer {
        Tokenizer::new(
            vec![
                TokenPattern::new("strong", TokenKind::Strong, r"\*\*(?P<strong>[a-z]+)\*\*"),
                TokenPattern::new("emphasis", TokenKind::Emphasis, r"\*(?P<em>[a-z]+)\*"),
            ],
            TokenizerConfig {
                case_sensitive: true,
                fill,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert!(word_tokenizer(Some(TokenKind::Text)).tokenize("").is_empty());
    }

    #[test]
    fn test_fill_tokens_cover_gaps() {
        let tokens = word_tokenizer(Some(TokenKind::Text)).tokenize("a *b* c");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Text, TokenKind::Emphasis, TokenKind::Text]);
        assert_eq!(tokens[1].group("em"), Some("b"));
        assert_eq!(tokens[1].groups, vec![Some("b".to_string())]);
    }

    #[test]
    fn test_no_fill_drops_gaps() {
        let tokens = word_tokenizer(None).tokenize("a *b* c");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].span, Span::new(2, 5));
    }

    #[test]
    fn test_positional_groups_are_per_pattern() {
        let tokens = word_tokenizer(None).tokenize("**x** *y*");
        assert_eq!(tokens[0].groups, vec![Some("x".to_string())]);
        assert_eq!(tokens[1].groups, vec![Some("y".to_string())]);
        assert!(tokens[1].group("strong").is_none());
    }

    #[test]
    fn test_case_insensitive_flag_applies_to_all_patterns() {
        let tokenizer = Tokenizer::new(
            vec![
                TokenPattern::new("a", TokenKind::Strong, "abc"),
                TokenPattern::new("b", TokenKind::Emphasis, "xyz"),
            ],
            TokenizerConfig {
                case_sensitive: false,
                fill: None,
            },
        )
        .unwrap();
        let tokens = tokenizer.tokenize("ABC XyZ");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind, TokenKind::Emphasis);
    }

    struct RejectAll;

    impl Walker for RejectAll {
        fn walk(&self, _: &str, _: usize, _: usize) -> Option<WalkResult> {
            None
        }
    }

    struct ToEnd;

    impl Walker for ToEnd {
        fn walk(&self, source: &str, _: usize, _: usize) -> Option<WalkResult> {
            Some(WalkResult {
                end: source.len(),
                payload: None,
            })
        }
    }

    #[test]
    fn test_walker_extends_match() {
        let tokenizer = Tokenizer::new(
            vec![TokenPattern::new("rest", TokenKind::Paragraph, "@").with_walker(ToEnd)],
            TokenizerConfig {
                case_sensitive: true,
                fill: Some(TokenKind::Text),
            },
        )
        .unwrap();
        let tokens = tokenizer.tokenize("ab@cd@ef");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].text, "@cd@ef");
    }

    #[test]
    fn test_walker_rejection_falls_back_to_later_patterns() {
        let tokenizer = Tokenizer::new(
            vec![
                TokenPattern::new("picky", TokenKind::FunctionCall, r"\.[a-z]+").with_walker(RejectAll),
                TokenPattern::new("word", TokenKind::Text, r"\.[a-z]+"),
            ],
            TokenizerConfig::default(),
        )
        .unwrap();
        let tokens = tokenizer.tokenize(".abc");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Text);
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let result = Tokenizer::new(
            vec![TokenPattern::new("bad", TokenKind::Text, "(")],
            TokenizerConfig::default(),
        );
        assert!(result.is_err());
    }
}
