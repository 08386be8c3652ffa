//! Walkers for constructs a regex cannot bound.

use super::{WalkResult, Walked, Walker};
use crate::error::Span;
use serde::Serialize;

/// An argument captured between balanced braces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkedArgument {
    pub name: Option<String>,
    /// Source between the braces, escapes left in place
    pub raw: String,
    /// Byte offset of `raw` in the walked source
    pub offset: usize,
}

/// One `.name {args}` link of a call chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkedSegment {
    pub name: String,
    pub arguments: Vec<WalkedArgument>,
    pub span: Span,
}

/// Nested parse of a function call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalkedCall {
    pub segments: Vec<WalkedSegment>,
    /// Dedented body of a block call
    pub body: Option<String>,
    pub body_offset: usize,
}

/// Walks `.name {arg} key:{arg} ::next {arg}` plus, at block level, an
/// indented body.
#[derive(Debug, Clone, Copy)]
pub struct FunctionCallWalker {
    pub block: bool,
}

impl FunctionCallWalker {
    pub fn block() -> Self {
        Self { block: true }
    }

    pub fn inline() -> Self {
        Self { block: false }
    }
}

impl Walker for FunctionCallWalker {
    fn walk(&self, source: &str, start: usize, _matched_end: usize) -> Option<WalkResult> {
        if !self.block {
            // `e.g`, `2.5` and the `..` of a range are not calls
            let preceded_by_word = source[..start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric() || c == '.');
            if preceded_by_word {
                return None;
            }
        }

        let bytes = source.as_bytes();
        if bytes.get(start) != Some(&b'.') {
            return None;
        }

        let mut segments = Vec::new();
        let mut pos = start;
        loop {
            let segment_start = pos;
            let name_end = identifier_end(source, pos + 1)?;
            let name = source[pos + 1..name_end].to_string();
            pos = name_end;

            let mut arguments = Vec::new();
            while let Some((argument, end)) = argument_at(source, pos) {
                arguments.push(argument);
                pos = end;
            }

            segments.push(WalkedSegment {
                name,
                arguments,
                span: Span::new(segment_start, pos),
            });

            // `::next` continues the chain, possibly after spaces
            let after_space = skip_inline_space(source, pos);
            if source[after_space..].starts_with("::") && identifier_end(source, after_space + 2).is_some() {
                // Reuse the segment parser by pointing at the char before the name
                pos = after_space + 1;
                continue;
            }
            break;
        }

        // Chain segments start at `::`; the parser only needs the name
        for segment in segments.iter_mut().skip(1) {
            segment.span.start = segment.span.start.saturating_sub(1);
        }

        if !self.block {
            return Some(WalkResult {
                end: pos,
                payload: Some(Walked::Call(WalkedCall {
                    segments,
                    body: None,
                    body_offset: pos,
                })),
            });
        }

        // Block calls own the rest of their line
        let line_rest = skip_inline_space(source, pos);
        let mut end = match bytes.get(line_rest) {
            None => line_rest,
            Some(b'\n') => line_rest + 1,
            Some(_) => return None,
        };

        let body_offset = end;
        let (body, body_end) = indented_body(source, end);
        if body.is_some() {
            end = body_end;
        }

        Some(WalkResult {
            end,
            payload: Some(Walked::Call(WalkedCall {
                segments,
                body,
                body_offset,
            })),
        })
    }
}

/// Extends a paragraph line by line until a blank line or a line that
/// starts another block construct.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphWalker;

impl Walker for ParagraphWalker {
    fn walk(&self, source: &str, start: usize, matched_end: usize) -> Option<WalkResult> {
        let mut end = matched_end.max(line_end(source, start));
        while end < source.len() {
            let next = end + 1;
            if next >= source.len() {
                break;
            }
            let line = &source[next..line_end(source, next)];
            if line.trim().is_empty() || starts_block(line) {
                break;
            }
            if FunctionCallWalker::block().walk(source, next, next).is_some() {
                break;
            }
            end = line_end(source, next);
        }

        Some(WalkResult { end, payload: None })
    }
}

fn starts_block(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.len() != line.len() {
        return false;
    }
    line.starts_with('#')
        || line.starts_with("```")
        || line.starts_with("$$")
        || line.starts_with('>')
        || line.starts_with("<<<")
        || line.starts_with("---")
        || line.starts_with("***")
        || is_list_marker(line)
}

fn is_list_marker(line: &str) -> bool {
    let mut chars = line.chars();
    match chars.next() {
        Some('-' | '*' | '+') => chars.next() == Some(' '),
        Some(c) if c.is_ascii_digit() => {
            let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
            line[digits..].starts_with(". ")
        }
        _ => false,
    }
}

fn line_end(source: &str, pos: usize) -> usize {
    source[pos..].find('\n').map(|i| pos + i).unwrap_or(source.len())
}

fn identifier_end(source: &str, pos: usize) -> Option<usize> {
    let rest = source.get(pos..)?;
    let mut chars = rest.char_indices();
    let numeric = match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => false,
        // Implicit lambda parameters are named `1`, `2`, ...
        Some((_, c)) if c.is_ascii_digit() => true,
        _ => return None,
    };
    let len = chars
        .find(|(_, c)| {
            if numeric {
                !c.is_ascii_digit()
            } else {
                !(c.is_ascii_alphanumeric() || *c == '_')
            }
        })
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    Some(pos + len)
}

fn skip_inline_space(source: &str, pos: usize) -> usize {
    let bytes = source.as_bytes();
    let mut pos = pos;
    while matches!(bytes.get(pos), Some(b' ' | b'\t')) {
        pos += 1;
    }
    pos
}

/// Parse `{...}` or `name:{...}` after optional spaces
fn argument_at(source: &str, pos: usize) -> Option<(WalkedArgument, usize)> {
    let start = skip_inline_space(source, pos);
    let bytes = source.as_bytes();

    let (name, open) = match bytes.get(start) {
        Some(b'{') => (None, start),
        _ => {
            let name_end = identifier_end(source, start)?;
            if bytes.get(name_end) != Some(&b':') || bytes.get(name_end + 1) != Some(&b'{') {
                return None;
            }
            (Some(source[start..name_end].to_string()), name_end + 1)
        }
    };

    let close = balanced_end(source, open)?;
    Some((
        WalkedArgument {
            name,
            raw: source[open + 1..close].to_string(),
            offset: open + 1,
        },
        close + 1,
    ))
}

/// Index of the brace closing the one at `open`
fn balanced_end(source: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in source[open..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Lines indented by two spaces or a tab, blank lines allowed in between
fn indented_body(source: &str, start: usize) -> (Option<String>, usize) {
    let mut lines = Vec::new();
    let mut pos = start;
    let mut end = start;
    let mut last_content = 0;

    while pos < source.len() {
        let eol = line_end(source, pos);
        let line = &source[pos..eol];
        let next = (eol + 1).min(source.len());

        if line.trim().is_empty() {
            lines.push(line);
        } else if line.starts_with("  ") || line.starts_with('\t') {
            lines.push(line);
            last_content = lines.len();
            end = next;
        } else {
            break;
        }
        pos = next;
        if eol == source.len() {
            break;
        }
    }

    lines.truncate(last_content);
    if lines.is_empty() {
        return (None, start);
    }

    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    let body = lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                ""
            } else {
                l.get(indent..).unwrap_or("")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    (Some(body), end)
}
