//! # folio-core
//!
//! Compilation engine for folio, a Markdown dialect with embedded function
//! calls.
//!
//! A document goes through a fixed pipeline: the flavor's tokenizer splits
//! it into block tokens, the parser builds a tree with a node per function
//! call, every call is evaluated once against the [`Context`], tree hooks
//! resolve numbering, references and the table of contents, and a
//! [`Renderer`] produces the output.
//!
//! ## Example
//!
//! ```
//! let doc = folio_core::compile(".var {name} {folio}\n\nHello from .uppercase {.name}!").unwrap();
//! assert_eq!(doc.output, "Hello from FOLIO!");
//! ```

pub mod ast;
pub mod bibliography;
pub mod config;
pub mod context;
pub mod error;
pub mod expression;
pub mod flavor;
pub mod function;
pub mod iterator;
pub mod lexer;
pub mod localization;
pub mod numbering;
pub mod parser;
pub mod pipeline;
pub mod property;
pub mod render;
pub mod slug;
pub mod stdlib;
pub mod subdocument;
pub mod value;

#[cfg(test)]
mod tests;

use std::rc::Rc;

// Re-export key types
pub use ast::{Node, NodeKind, NodeRef};
pub use config::{ConfigError, ErrorPolicy, PipelineOptions};
pub use context::{Attributes, Context, DocumentInfo};
pub use error::{ErrorContext, FolioError, Result};
pub use expression::{Expression, SafeExpression};
pub use flavor::{Flavor, FolioFlavor};
pub use function::{Function, FunctionCall, FunctionCallArgument, FunctionParameter, Library, ParamType};
pub use iterator::{AstIterator, AstIteratorHook, TableOfContents};
pub use lexer::{Token, TokenKind, Tokenizer, TokenizerFactory};
pub use parser::{FolioParser, ParserFactory};
pub use pipeline::{CompiledDocument, ErrorHandler, Pipeline, PipelineHooks, PipelineStage};
pub use property::{Property, PropertyStore};
pub use render::{PlainTextRenderer, Renderer};
pub use slug::slugify;
pub use subdocument::{Graph, Subdocument};
pub use value::{Lambda, Value};

// Re-export shared types from folio-types
pub use folio_types::{DocumentType, Span};

/// Compile `source` with default options and the standard library
pub fn compile(source: &str) -> Result<CompiledDocument> {
    compile_with(PipelineOptions::default(), source)
}

pub fn compile_with(options: PipelineOptions, source: &str) -> Result<CompiledDocument> {
    let mut pipeline = Pipeline::new(options, Rc::new(FolioFlavor))?;
    pipeline.execute(source)
}
