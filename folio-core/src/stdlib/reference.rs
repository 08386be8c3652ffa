//! Tables of contents, bibliographies, citations, cross references and
//! subdocuments.

use crate::ast::Node;
use crate::bibliography::load_bibliography;
use crate::error::FolioError;
use crate::function::{Function, ParamType};
use crate::pipeline::{compile_subdocument, PipelineHooks};
use crate::subdocument::Subdocument;
use crate::value::Value;
use std::path::Path;
use std::rc::Rc;

pub(super) fn functions() -> Vec<Function> {
    vec![tableofcontents(), bibliography(), cite(), reference(), subdocument()]
}

fn tableofcontents() -> Function {
    Function::builder("tableofcontents")
        .nullable("title", ParamType::String)
        .optional("maxdepth", ParamType::Integer, Value::Number(3.0))
        .build(|_, args| {
            let max_depth = args.integer("maxdepth").unwrap_or(3);
            if max_depth < 1 {
                return Err(FolioError::invalid_call("tableofcontents", "maxdepth must be at least 1"));
            }
            Ok(Value::Node(Rc::new(Node::TableOfContentsView {
                title: args.string("title"),
                max_depth: max_depth as usize,
            })))
        })
}

/// `.bibliography {refs.bib}`, relative to the working directory
fn bibliography() -> Function {
    Function::builder("bibliography")
        .param("path", ParamType::String)
        .nullable("title", ParamType::String)
        .build(|env, args| {
            let path = args.string("path").unwrap_or_default();
            let path = env.ctx.options().resolve_path(Path::new(path.trim()));
            let entries = load_bibliography(&path)?;
            Ok(Value::Node(Rc::new(Node::BibliographyView {
                title: args.string("title"),
                entries,
            })))
        })
}

fn cite() -> Function {
    Function::builder("cite")
        .param("key", ParamType::String)
        .build(|_, args| {
            let key = args.string("key").unwrap_or_default().trim().to_string();
            Ok(Value::Node(Rc::new(Node::Citation { key })))
        })
}

fn reference() -> Function {
    Function::builder("ref")
        .param("id", ParamType::String)
        .build(|_, args| {
            let id = args.string("id").unwrap_or_default().trim().to_string();
            Ok(Value::Node(Rc::new(Node::CrossReference { id })))
        })
}

/// `.subdocument {chapter.fo}` compiles the file once per project and
/// links to it
fn subdocument() -> Function {
    Function::builder("subdocument")
        .param("path", ParamType::String)
        .nullable("label", ParamType::InlineMarkup)
        .build(|env, args| {
            let path = args.string("path").unwrap_or_default();
            let path = env.ctx.options().resolve_path(Path::new(path.trim()));
            let subdocument = Subdocument::from_file(&path);
            let name = subdocument.name.clone();

            compile_subdocument(env.ctx, subdocument, &PipelineHooks::default())?;

            let children = match args.get("label") {
                Value::Content(nodes) => nodes.clone(),
                _ => Vec::new(),
            };
            Ok(Value::Node(Rc::new(Node::SubdocumentLink { name, children })))
        })
}
