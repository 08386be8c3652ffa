//! Flavors: the dialect a pipeline compiles.

use crate::lexer::{FolioLexer, TokenizerFactory};
use crate::parser::{FolioParser, ParserFactory};
use crate::render::{PlainTextRenderer, Renderer};
use std::rc::Rc;

/// A markup dialect: the tokenizer of each lexical scope, the parser
/// building nodes from their tokens and the default renderer
pub trait Flavor {
    fn name(&self) -> &str;

    fn lexer(&self) -> &dyn TokenizerFactory;

    fn parser(&self) -> &dyn ParserFactory;

    /// Renderer of a fresh context, until `Pipeline::with_renderer` replaces it
    fn renderer(&self) -> Rc<dyn Renderer>;
}

/// The default folio dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct FolioFlavor;

impl Flavor for FolioFlavor {
    fn name(&self) -> &str {
        "folio"
    }

    fn lexer(&self) -> &dyn TokenizerFactory {
        &FolioLexer
    }

    fn parser(&self) -> &dyn ParserFactory {
        &FolioParser
    }

    fn renderer(&self) -> Rc<dyn Renderer> {
        Rc::new(PlainTextRenderer)
    }
}
