//! Pattern sets of the default flavor, one per lexical scope.

use super::{FunctionCallWalker, ParagraphWalker, TokenKind, TokenPattern, Tokenizer, TokenizerConfig};
use once_cell::sync::Lazy;

/// Supplies the tokenizer for each lexical scope of a flavor
pub trait TokenizerFactory {
    fn block(&self) -> &Tokenizer;
    fn inline(&self) -> &Tokenizer;
    fn list(&self) -> &Tokenizer;
    fn argument(&self) -> &Tokenizer;
}

/// Tokenizers of the default folio grammar
#[derive(Debug, Clone, Copy, Default)]
pub struct FolioLexer;

impl TokenizerFactory for FolioLexer {
    fn block(&self) -> &Tokenizer {
        &BLOCK
    }

    fn inline(&self) -> &Tokenizer {
        &INLINE
    }

    fn list(&self) -> &Tokenizer {
        &LIST
    }

    fn argument(&self) -> &Tokenizer {
        &ARGUMENT
    }
}

static BLOCK: Lazy<Tokenizer> = Lazy::new(|| {
    Tokenizer::new(block_patterns(), TokenizerConfig::default()).expect("valid block patterns")
});

static INLINE: Lazy<Tokenizer> = Lazy::new(|| {
    Tokenizer::new(
        inline_patterns(),
        TokenizerConfig {
            case_sensitive: true,
            fill: Some(TokenKind::Text),
        },
    )
    .expect("valid inline patterns")
});

static LIST: Lazy<Tokenizer> = Lazy::new(|| {
    Tokenizer::new(list_patterns(), TokenizerConfig::default()).expect("valid list patterns")
});

static ARGUMENT: Lazy<Tokenizer> = Lazy::new(|| {
    Tokenizer::new(
        argument_patterns(),
        TokenizerConfig {
            case_sensitive: true,
            fill: Some(TokenKind::Text),
        },
    )
    .expect("valid argument patterns")
});

const ID: &str = r"(?:\{#(?P<ID>[^}\n]+)\})?";

fn with_id(pattern: &str, group: &str) -> String {
    pattern.replace("{ID}", &ID.replace("ID", group))
}

pub fn block_patterns() -> Vec<TokenPattern> {
    vec![
        TokenPattern::new("newline", TokenKind::Newline, r"[ \t]*\n"),
        TokenPattern::new(
            "fenced_code",
            TokenKind::FencedCode,
            with_id(
                r#"^```(?P<lang>[A-Za-z0-9_+-]*)[ \t]*{ID}[ \t]*(?:"(?P<caption>[^"\n]*)")?[ \t]*\n(?P<code>(?s:.*?))^```[ \t]*$"#,
                "code_id",
            ),
        ),
        TokenPattern::new(
            "math_block",
            TokenKind::MathBlock,
            with_id(
                r"^\$\$[ \t]*\n?(?P<math>(?s:.*?))\$\$[ \t]*{ID}[ \t]*$",
                "math_id",
            ),
        ),
        TokenPattern::new("function_call", TokenKind::FunctionCall, r"^\.[A-Za-z0-9_]")
            .with_walker(FunctionCallWalker::block()),
        TokenPattern::new(
            "heading",
            TokenKind::Heading,
            with_id(
                r"^(?P<hashes>#{1,6})(?P<decorative>!)?[ \t]+(?P<heading>[^\n]*?)[ \t]*{ID}[ \t]*$",
                "heading_id",
            ),
        ),
        TokenPattern::new(
            "link_definition",
            TokenKind::LinkDefinition,
            r#"^\[(?P<def_label>[^\]\n]+)\]:[ \t]+(?P<def_url>\S+)(?:[ \t]+"(?P<def_title>[^"\n]*)")?[ \t]*$"#,
        ),
        TokenPattern::new(
            "horizontal_rule",
            TokenKind::HorizontalRule,
            r"^(?:---+|\*\*\*+)[ \t]*$",
        ),
        TokenPattern::new("page_break", TokenKind::PageBreak, r"^<<<[ \t]*$"),
        TokenPattern::new("block_quote", TokenKind::BlockQuote, r"^>[^\n]*(?:\n>[^\n]*)*"),
        TokenPattern::new(
            "list",
            TokenKind::List,
            r"^(?:[-*+]|\d+\.)[ \t]+[^\n]*(?:\n(?:(?:[-*+]|\d+\.)[ \t]+|[ \t]+\S)[^\n]*)*",
        ),
        TokenPattern::new("paragraph", TokenKind::Paragraph, r"^[^\n]+").with_walker(ParagraphWalker),
    ]
}

pub fn list_patterns() -> Vec<TokenPattern> {
    vec![
        TokenPattern::new(
            "list_item",
            TokenKind::ListItem,
            r"^[ \t]*(?P<marker>[-*+]|\d+\.)[ \t]+(?P<item>[^\n]*(?:\n[ \t]+\S[^\n]*)*)",
        ),
        TokenPattern::new("newline", TokenKind::Newline, r"\n"),
    ]
}

pub fn inline_patterns() -> Vec<TokenPattern> {
    vec![
        TokenPattern::new(
            "escape",
            TokenKind::Escape,
            r"\\(?P<escaped>[\\`*_{}\[\]()#+\-.!$<>:|~])",
        ),
        TokenPattern::new("code_span", TokenKind::CodeSpan, r"`(?P<code_span>[^`\n]+)`"),
        TokenPattern::new(
            "inline_math",
            TokenKind::InlineMath,
            r"\$(?P<inline_math>[^$\s](?:[^$\n]*[^$\s])?)\$",
        ),
        TokenPattern::new("function_call", TokenKind::FunctionCall, r"\.[A-Za-z0-9_]")
            .with_walker(FunctionCallWalker::inline()),
        TokenPattern::new(
            "image",
            TokenKind::Image,
            r#"!\[(?P<image_alt>[^\]\n]*)\]\((?P<image_url>[^)\s]+)(?:[ \t]+"(?P<image_title>[^"\n]*)")?\)"#,
        ),
        TokenPattern::new("citation", TokenKind::Citation, r"\[@(?P<cite>[^\]\s]+)\]"),
        TokenPattern::new(
            "link",
            TokenKind::Link,
            r#"\[(?P<link_text>[^\]\n]+)\]\((?P<link_url>[^)\s]+)(?:[ \t]+"(?P<link_title>[^"\n]*)")?\)"#,
        ),
        TokenPattern::new(
            "reference_link",
            TokenKind::ReferenceLink,
            r"\[(?P<ref_text>[^\]\n]+)\]\[(?P<ref_label>[^\]\n]*)\]",
        ),
        TokenPattern::new(
            "strong",
            TokenKind::Strong,
            r"\*\*(?P<strong>\S(?:[^\n]*?\S)?)\*\*|__(?P<strong_alt>\S(?:[^\n]*?\S)?)__",
        ),
        TokenPattern::new(
            "emphasis",
            TokenKind::Emphasis,
            r"\*(?P<emphasis>[^*\s](?:[^*\n]*?[^*\s])?)\*|\b_(?P<emphasis_alt>[^_\s](?:[^_\n]*?[^_\s])?)_\b",
        ),
        TokenPattern::new("line_break", TokenKind::LineBreak, r"[ ]{2,}\n|\\\n"),
    ]
}

pub fn argument_patterns() -> Vec<TokenPattern> {
    vec![
        TokenPattern::new("escape", TokenKind::Escape, r"\\(?P<escaped>[{}\\])"),
        TokenPattern::new("function_call", TokenKind::FunctionCall, r"\.[A-Za-z0-9_]")
            .with_walker(FunctionCallWalker::inline()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Token;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_block_constructs() {
        let source = "# Title {#top}\n\nSome text\nmore text\n\n---\n<<<\n> quoted\n- a\n- b\n";
        let tokens = FolioLexer.block().tokenize(source);
        let significant: Vec<TokenKind> = kinds(&tokens)
            .into_iter()
            .filter(|k| *k != TokenKind::Newline)
            .collect();
        assert_eq!(
            significant,
            vec![
                TokenKind::Heading,
                TokenKind::Paragraph,
                TokenKind::HorizontalRule,
                TokenKind::PageBreak,
                TokenKind::BlockQuote,
                TokenKind::List,
            ]
        );
        assert_eq!(tokens[0].group("heading"), Some("Title"));
        assert_eq!(tokens[0].group("heading_id"), Some("top"));
    }

    #[test]
    fn test_fenced_code_groups() {
        let source = "```rust {#listing} \"Main loop\"\nfn main() {}\n```\n";
        let tokens = FolioLexer.block().tokenize(source);
        assert_eq!(tokens[0].kind, TokenKind::FencedCode);
        assert_eq!(tokens[0].group("lang"), Some("rust"));
        assert_eq!(tokens[0].group("code_id"), Some("listing"));
        assert_eq!(tokens[0].group("caption"), Some("Main loop"));
        assert_eq!(tokens[0].group("code"), Some("fn main() {}\n"));
    }

    #[test]
    fn test_block_call_outranks_paragraph() {
        let tokens = FolioLexer.block().tokenize(".docname {Report}\n");
        assert_eq!(tokens[0].kind, TokenKind::FunctionCall);
        assert!(tokens[0].call().is_some());
    }

    #[test]
    fn test_rejected_block_call_becomes_paragraph() {
        let tokens = FolioLexer.block().tokenize(".sum {1} {2} is three\n");
        assert_eq!(tokens[0].kind, TokenKind::Paragraph);
        assert_eq!(tokens[0].text, ".sum {1} {2} is three");
    }

    #[test]
    fn test_strong_outranks_emphasis() {
        let tokens = FolioLexer.inline().tokenize("**bold** and *it*");
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Strong, TokenKind::Text, TokenKind::Emphasis]
        );
    }

    #[test]
    fn test_image_outranks_link() {
        let tokens = FolioLexer.inline().tokenize("![alt](a.png)");
        assert_eq!(kinds(&tokens), vec![TokenKind::Image]);
        assert_eq!(tokens[0].group("image_url"), Some("a.png"));
    }

    #[test]
    fn test_inline_fill_reconstructs_source() {
        let source = "Hi *you*, see [docs](x.html) and `code` or $x^2$ .uppercase {loud} e.g. done\\*";
        let tokens = FolioLexer.inline().tokenize(source);
        let rebuilt: String = tokens.iter().map(|t| &source[t.span.start..t.span.end]).collect();
        assert_eq!(rebuilt, source);
        for pair in tokens.windows(2) {
            assert_eq!(pair[0].span.end, pair[1].span.start);
        }
    }

    #[test]
    fn test_citation_outranks_link() {
        let tokens = FolioLexer.inline().tokenize("as shown [@knuth1984].");
        assert_eq!(tokens[1].kind, TokenKind::Citation);
        assert_eq!(tokens[1].group("cite"), Some("knuth1984"));
    }

    #[test]
    fn test_dot_inside_word_is_text() {
        let tokens = FolioLexer.inline().tokenize("see file.txt");
        assert_eq!(kinds(&tokens), vec![TokenKind::Text]);
    }

    #[test]
    fn test_list_items() {
        let tokens = FolioLexer.list().tokenize("- one\n  continued\n- two");
        let items: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::ListItem)
            .filter_map(|t| t.group("item"))
            .collect();
        assert_eq!(items, vec!["one\n  continued", "two"]);
    }

    #[test]
    fn test_argument_scope() {
        let tokens = FolioLexer.argument().tokenize(r"a \{ .sum {1} {2}");
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Text, TokenKind::Escape, TokenKind::Text, TokenKind::FunctionCall]
        );
    }
}
