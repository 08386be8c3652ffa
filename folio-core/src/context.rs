//! Compilation context.
//!
//! The [`Context`] is the single mutable state of a compilation: function
//! lookup (lambda scopes, user declarations, libraries), link definitions,
//! the property store, document information and the attributes collected
//! while resolving the tree. There are no global registries; everything a
//! function or hook can observe goes through here.

use crate::config::PipelineOptions;
use crate::error::Result;
use crate::flavor::{Flavor, FolioFlavor};
use crate::function::{Function, Library};
use crate::iterator::TableOfContents;
use crate::localization::LocalizationTables;
use crate::numbering::NumberingConfig;
use crate::pipeline::{error_handler_for, ErrorHandler};
use crate::property::{PropertyStore, ResolvedLink};
use crate::render::Renderer;
use crate::subdocument::{Subdocument, SubdocumentsData};
use folio_types::{DocumentType, Span};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// Document-level information set by the configuration or by document
/// functions such as `.docname` and `.doctype`
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub name: Option<String>,
    pub doc_type: DocumentType,
    pub locale: Option<String>,
    /// Formats set explicitly, on top of the defaults of `doc_type`
    pub numbering: NumberingConfig,
}

/// Facts collected by the tree iterator hooks
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    pub table_of_contents: Option<TableOfContents>,
    pub has_math: bool,
    pub has_code: bool,
    pub has_diagrams: bool,
}

pub struct Context {
    flavor: Rc<dyn Flavor>,
    renderer: Rc<dyn Renderer>,
    error_handler: Rc<dyn ErrorHandler>,
    options: Rc<PipelineOptions>,

    libraries: Vec<Library>,
    declarations: HashMap<String, Function>,
    scopes: Vec<HashMap<String, Function>>,

    /// Lowercased label to target
    pub link_definitions: HashMap<String, ResolvedLink>,
    pub properties: PropertyStore,
    pub document: DocumentInfo,
    pub localization: LocalizationTables,
    pub attributes: Attributes,

    subdocuments: Rc<RefCell<SubdocumentsData>>,
    subdocument: Subdocument,

    /// Span of the outermost call that aborted the last execution
    failed_at: Option<Span>,
}

impl Context {
    pub fn new(options: PipelineOptions, flavor: Rc<dyn Flavor>) -> Result<Self> {
        // Plain documents have no default formats, leaving only the
        // configured ones
        let numbering = NumberingConfig::from_defaults(DocumentType::Plain, &options.numbering)?;
        let document = DocumentInfo {
            name: options.document.name.clone(),
            doc_type: options.document.doc_type,
            locale: options.document.locale.clone(),
            numbering,
        };

        let root = Subdocument::root(document.name.as_deref().unwrap_or("main"));
        let subdocuments = SubdocumentsData::new(root.clone());

        Ok(Self {
            renderer: flavor.renderer(),
            flavor,
            error_handler: error_handler_for(options.policy),
            options: Rc::new(options),
            libraries: Vec::new(),
            declarations: HashMap::new(),
            scopes: Vec::new(),
            link_definitions: HashMap::new(),
            properties: PropertyStore::new(),
            document,
            localization: LocalizationTables::default(),
            attributes: Attributes::default(),
            subdocuments: Rc::new(RefCell::new(subdocuments)),
            subdocument: root,
            failed_at: None,
        })
    }

    pub fn flavor(&self) -> Rc<dyn Flavor> {
        self.flavor.clone()
    }

    pub fn renderer(&self) -> Rc<dyn Renderer> {
        self.renderer.clone()
    }

    pub fn set_renderer(&mut self, renderer: Rc<dyn Renderer>) {
        self.renderer = renderer;
    }

    pub fn error_handler(&self) -> Rc<dyn ErrorHandler> {
        self.error_handler.clone()
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    // Function lookup

    /// Register a library unless one with the same name is present,
    /// running its on-load action. Returns whether it was added.
    pub fn register_library(&mut self, library: Library) -> Result<bool> {
        if self.libraries.iter().any(|l| l.name == library.name) {
            return Ok(false);
        }
        debug!(
            "Registering library {} ({} functions)",
            library.name,
            library.functions.len()
        );
        let on_load = library.on_load.clone();
        self.libraries.push(library);
        if let Some(on_load) = on_load {
            on_load(self)?;
        }
        Ok(true)
    }

    pub fn libraries(&self) -> &[Library] {
        &self.libraries
    }

    /// Declare a user function or variable, replacing any previous
    /// declaration of the same name
    pub fn declare(&mut self, function: Function) {
        self.declarations.insert(function.name.clone(), function);
    }

    pub fn push_scope(&mut self, frame: HashMap<String, Function>) {
        self.scopes.push(frame);
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Resolve a function name: innermost lambda scope first, then user
    /// declarations, then libraries in registration order
    pub fn lookup(&self, name: &str) -> Option<Function> {
        self.scopes
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .or_else(|| self.declarations.get(name))
            .or_else(|| self.libraries.iter().find_map(|l| l.function(name)))
            .cloned()
    }

    // Document

    /// Numbering formats in effect: explicit formats over the defaults of
    /// the document type
    pub fn numbering(&self) -> NumberingConfig {
        NumberingConfig::default_for(self.document.doc_type).overlay(&self.document.numbering)
    }

    pub fn register_link_definition(&mut self, label: &str, url: &str, title: Option<&str>) {
        self.link_definitions.insert(
            label.trim().to_lowercase(),
            ResolvedLink {
                url: url.to_string(),
                title: title.map(String::from),
            },
        );
    }

    pub fn link_definition(&self, label: &str) -> Option<&ResolvedLink> {
        self.link_definitions.get(&label.trim().to_lowercase())
    }

    /// Localize a `table:key` reference in the document locale
    pub fn localize(&self, reference: &str) -> Result<String> {
        self.localization
            .resolve(reference, self.document.locale.as_deref())
    }

    // Subdocuments

    pub fn subdocuments(&self) -> Rc<RefCell<SubdocumentsData>> {
        self.subdocuments.clone()
    }

    /// The subdocument this context compiles
    pub fn subdocument(&self) -> &Subdocument {
        &self.subdocument
    }

    /// Child context compiling `subdocument`. Libraries, declarations, link
    /// definitions, document settings and the subdocument graph carry over;
    /// per-document state starts empty.
    pub fn fork_for_subdocument(&self, subdocument: Subdocument) -> Context {
        let mut document = self.document.clone();
        document.name = Some(subdocument.name.clone());

        Context {
            flavor: self.flavor.clone(),
            renderer: self.renderer.clone(),
            error_handler: self.error_handler.clone(),
            options: self.options.clone(),
            libraries: self.libraries.clone(),
            declarations: self.declarations.clone(),
            scopes: Vec::new(),
            link_definitions: self.link_definitions.clone(),
            properties: PropertyStore::new(),
            document,
            localization: self.localization.clone(),
            attributes: Attributes::default(),
            subdocuments: self.subdocuments.clone(),
            subdocument,
            failed_at: None,
        }
    }

    /// Clear the state owned by a single execution. Libraries, declarations,
    /// link definitions and document information persist.
    pub fn reset_for_execution(&mut self) {
        self.properties.clear();
        self.attributes = Attributes::default();
        self.scopes.clear();
        self.failed_at = None;
    }

    pub(crate) fn record_failure(&mut self, span: Span) {
        self.failed_at = Some(span);
    }

    /// Where the last execution was aborted, for diagnostics against the
    /// top-level source
    pub fn failed_at(&self) -> Option<Span> {
        self.failed_at
    }
}

impl Default for Context {
    /// Lenient context of the default flavor with no libraries
    fn default() -> Self {
        let options = PipelineOptions::default();
        let root = Subdocument::root("main");
        Context {
            flavor: Rc::new(FolioFlavor),
            renderer: FolioFlavor.renderer(),
            error_handler: error_handler_for(options.policy),
            options: Rc::new(options),
            libraries: Vec::new(),
            declarations: HashMap::new(),
            scopes: Vec::new(),
            link_definitions: HashMap::new(),
            properties: PropertyStore::new(),
            document: DocumentInfo::default(),
            localization: LocalizationTables::default(),
            attributes: Attributes::default(),
            subdocuments: Rc::new(RefCell::new(SubdocumentsData::new(root.clone()))),
            subdocument: root,
            failed_at: None,
        }
    }
}
