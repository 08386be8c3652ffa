//! Document metadata: name, type, locale, numbering and localization tables.

use crate::ast::Node;
use crate::function::{Function, ParamType};
use crate::numbering::NumberingFormat;
use crate::value::{EnumSpec, Value};
use folio_types::DocumentType;
use std::rc::Rc;
use tracing::debug;

static DOCUMENT_TYPES: EnumSpec = EnumSpec {
    name: "document type",
    variants: &["plain", "paged", "slides"],
};

pub(super) fn functions() -> Vec<Function> {
    vec![docname(), doctype(), doclang(), numbering(), pagebreak(), localization()]
}

/// `.docname {name}` sets the name; without an argument it returns it
fn docname() -> Function {
    Function::builder("docname")
        .nullable("name", ParamType::String)
        .build(|env, args| match args.string("name") {
            Some(name) => {
                env.ctx.document.name = Some(name.trim().to_string());
                Ok(Value::None)
            }
            None => Ok(env.ctx.document.name.clone().map(Value::String).unwrap_or(Value::None)),
        })
}

fn doctype() -> Function {
    Function::builder("doctype")
        .nullable("type", ParamType::Enum(&DOCUMENT_TYPES))
        .build(|env, args| {
            let Some(name) = args.string("type") else {
                return Ok(Value::Enum(env.ctx.document.doc_type.as_str().to_string()));
            };
            if let Some(doc_type) = DocumentType::from_str(&name) {
                debug!("Document type: {}", doc_type);
                env.ctx.document.doc_type = doc_type;
            }
            Ok(Value::None)
        })
}

fn doclang() -> Function {
    Function::builder("doclang")
        .nullable("locale", ParamType::String)
        .build(|env, args| match args.string("locale") {
            Some(locale) => {
                env.ctx.document.locale = Some(locale.trim().to_string());
                Ok(Value::None)
            }
            None => Ok(env.ctx.document.locale.clone().map(Value::String).unwrap_or(Value::None)),
        })
}

/// `.numbering headings:{1.1} code:{1.a} math:{(1)}`; omitted kinds keep
/// their current format
fn numbering() -> Function {
    Function::builder("numbering")
        .nullable("headings", ParamType::String)
        .nullable("code", ParamType::String)
        .nullable("math", ParamType::String)
        .build(|env, args| {
            let parse = |name: &str| -> crate::error::Result<Option<NumberingFormat>> {
                match args.string(name) {
                    Some(format) => Ok(Some(NumberingFormat::parse(format.trim())?)),
                    None => Ok(None),
                }
            };

            let numbering = &mut env.ctx.document.numbering;
            if let Some(format) = parse("headings")? {
                numbering.headings = Some(format);
            }
            if let Some(format) = parse("code")? {
                numbering.code = Some(format);
            }
            if let Some(format) = parse("math")? {
                numbering.math = Some(format);
            }
            Ok(Value::None)
        })
}

fn pagebreak() -> Function {
    Function::builder("pagebreak")
        .validate(|ctx, _| match ctx.document.doc_type {
            DocumentType::Paged | DocumentType::Slides => Ok(()),
            DocumentType::Plain => Err("page breaks require a paged or slides document".to_string()),
        })
        .build(|_, _| Ok(Value::Node(Rc::new(Node::PageBreak))))
}

/// `.localization {table} {locale}` with a `key: text` body
fn localization() -> Function {
    Function::builder("localization")
        .param("table", ParamType::String)
        .param("locale", ParamType::String)
        .param("entries", ParamType::Dictionary)
        .build(|env, args| {
            let table = args.string("table").unwrap_or_default();
            let locale = args.string("locale").unwrap_or_default();
            let entries: Vec<(String, String)> = match args.get("entries") {
                Value::Dictionary(entries) => entries.iter().map(|(k, v)| (k.clone(), v.to_string())).collect(),
                _ => Vec::new(),
            };
            debug!("Localization table {} ({}): {} entries", table, locale, entries.len());
            env.ctx
                .localization
                .table_mut(table.trim())
                .insert(locale.trim(), entries);
            Ok(Value::None)
        })
}
