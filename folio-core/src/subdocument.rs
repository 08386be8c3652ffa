//! Subdocuments and the graph binding them into a project.

use crate::ast::NodeRef;
use crate::error::{FolioError, Result};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Persistent directed graph.
///
/// `with_vertex` and `with_edge` return a new graph and leave `self`
/// untouched. Clones share their maps until one of them is extended.
#[derive(Debug)]
pub struct Graph<T> {
    vertices: Rc<Vec<T>>,
    edges: Rc<HashMap<T, Vec<T>>>,
}

impl<T> Clone for Graph<T> {
    fn clone(&self) -> Self {
        Self {
            vertices: self.vertices.clone(),
            edges: self.edges.clone(),
        }
    }
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Self {
            vertices: Rc::new(Vec::new()),
            edges: Rc::new(HashMap::new()),
        }
    }
}

impl<T: Clone + Eq + Hash> Graph<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vertex(&self, vertex: T) -> Self {
        if self.contains(&vertex) {
            return self.clone();
        }
        let mut next = self.clone();
        Rc::make_mut(&mut next.vertices).push(vertex);
        next
    }

    /// Edge `from -> to`, adding missing vertices
    pub fn with_edge(&self, from: T, to: T) -> Self {
        let mut next = self.with_vertex(from.clone()).with_vertex(to.clone());
        let targets = Rc::make_mut(&mut next.edges).entry(from).or_default();
        if !targets.contains(&to) {
            targets.push(to);
        }
        next
    }

    pub fn contains(&self, vertex: &T) -> bool {
        self.vertices.contains(vertex)
    }

    /// Vertices in insertion order
    pub fn vertices(&self) -> &[T] {
        &self.vertices
    }

    pub fn neighbors(&self, vertex: &T) -> &[T] {
        self.edges.get(vertex).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}

type ContentSupplier = Rc<dyn Fn() -> Result<String>>;

/// A named unit of a project with a lazily read source.
///
/// Identity is the name.
#[derive(Clone)]
pub struct Subdocument {
    pub name: String,
    pub path: Option<PathBuf>,
    content: ContentSupplier,
}

impl Subdocument {
    /// The document a pipeline compiles directly
    pub fn root(name: impl Into<String>) -> Self {
        Self::from_source(name, "")
    }

    pub fn from_source(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source: String = source.into();
        Self {
            name: name.into(),
            path: None,
            content: Rc::new(move || Ok(source.clone())),
        }
    }

    /// A subdocument read from `path` when its content is requested; named
    /// after the file stem
    pub fn from_file(path: &Path) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let owned = path.to_path_buf();
        Self {
            name,
            path: Some(path.to_path_buf()),
            content: Rc::new(move || {
                std::fs::read_to_string(&owned).map_err(|source| FolioError::Io {
                    path: owned.clone(),
                    source,
                })
            }),
        }
    }

    pub fn content(&self) -> Result<String> {
        (self.content)()
    }
}

impl PartialEq for Subdocument {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Subdocument {}

impl Hash for Subdocument {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for Subdocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subdocument")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}

/// Result of compiling a subdocument
#[derive(Debug, Clone)]
pub struct SubdocumentSummary {
    pub root: NodeRef,
    pub output: String,
}

/// Project-wide subdocument state, shared by every context of a compilation
#[derive(Debug)]
pub struct SubdocumentsData {
    pub graph: Graph<Subdocument>,
    pub summaries: HashMap<String, SubdocumentSummary>,
    /// The root document and the subdocuments being compiled below it
    compiling: Vec<String>,
}

impl SubdocumentsData {
    pub fn new(root: Subdocument) -> Self {
        Self {
            compiling: vec![root.name.clone()],
            graph: Graph::new().with_vertex(root),
            summaries: HashMap::new(),
        }
    }

    /// Whether `name` is on the current include chain
    pub fn is_compiling(&self, name: &str) -> bool {
        self.compiling.iter().any(|n| n == name)
    }

    pub(crate) fn begin(&mut self, name: &str) {
        self.compiling.push(name.to_string());
    }

    pub(crate) fn end(&mut self, name: &str) {
        if let Some(pos) = self.compiling.iter().rposition(|n| n == name) {
            self.compiling.remove(pos);
        }
    }

    pub fn add_edge(&mut self, from: &Subdocument, to: &Subdocument) {
        self.graph = self.graph.with_edge(from.clone(), to.clone());
    }

    pub fn summary(&self, name: &str) -> Option<&SubdocumentSummary> {
        self.summaries.get(name)
    }
}
