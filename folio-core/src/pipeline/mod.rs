//! Compilation pipeline.
//!
//! A [`Pipeline`] owns a long-lived [`Context`] and runs the stages in a
//! fixed order: register libraries, tokenize, parse, evaluate calls,
//! resolve (iterator hooks), render. Hooks observe the output of each
//! stage. Errors raised at call sites go through the context's
//! [`ErrorHandler`]; any other error fails the run.

pub mod error_handler;

use crate::ast::NodeRef;
use crate::config::PipelineOptions;
use crate::context::Context;
use crate::error::{FolioError, Result};
use crate::flavor::Flavor;
use crate::function::{evaluate_calls, Library};
use crate::iterator;
use crate::lexer::Token;
use crate::render::Renderer;
use crate::stdlib;
use crate::subdocument::{Subdocument, SubdocumentSummary};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

pub use error_handler::{error_handler_for, ErrorHandler, LenientErrorHandler, StrictErrorHandler};

/// Progress of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    Idle,
    Tokenized,
    Parsed,
    Evaluated,
    Resolved,
    Rendered,
    Done,
    Failed,
}

type ContextHook = Rc<dyn Fn(&Context)>;
type TokensHook = Rc<dyn Fn(&Context, &[Token])>;
type TreeHook = Rc<dyn Fn(&Context, &NodeRef)>;
type OutputHook = Rc<dyn Fn(&Context, &str)>;

/// Observers of stage outputs
#[derive(Clone, Default)]
pub struct PipelineHooks {
    pub after_registering_libraries: Option<ContextHook>,
    pub after_lexing: Option<TokensHook>,
    pub after_parsing: Option<TreeHook>,
    pub after_rendering: Option<OutputHook>,
}

impl PipelineHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn after_registering_libraries(mut self, hook: impl Fn(&Context) + 'static) -> Self {
        self.after_registering_libraries = Some(Rc::new(hook));
        self
    }

    pub fn after_lexing(mut self, hook: impl Fn(&Context, &[Token]) + 'static) -> Self {
        self.after_lexing = Some(Rc::new(hook));
        self
    }

    pub fn after_parsing(mut self, hook: impl Fn(&Context, &NodeRef) + 'static) -> Self {
        self.after_parsing = Some(Rc::new(hook));
        self
    }

    pub fn after_rendering(mut self, hook: impl Fn(&Context, &str) + 'static) -> Self {
        self.after_rendering = Some(Rc::new(hook));
        self
    }

    /// Hooks running `self` and then `other` at every stage
    pub fn merge(self, other: PipelineHooks) -> Self {
        fn chain<F: ?Sized>(a: Option<Rc<F>>, b: Option<Rc<F>>, both: impl FnOnce(Rc<F>, Rc<F>) -> Rc<F>) -> Option<Rc<F>> {
            match (a, b) {
                (Some(a), Some(b)) => Some(both(a, b)),
                (a, b) => a.or(b),
            }
        }

        Self {
            after_registering_libraries: chain(
                self.after_registering_libraries,
                other.after_registering_libraries,
                |a, b| {
                    Rc::new(move |ctx: &Context| {
                        a(ctx);
                        b(ctx);
                    })
                },
            ),
            after_lexing: chain(self.after_lexing, other.after_lexing, |a, b| {
                Rc::new(move |ctx: &Context, tokens: &[Token]| {
                    a(ctx, tokens);
                    b(ctx, tokens);
                })
            }),
            after_parsing: chain(self.after_parsing, other.after_parsing, |a, b| {
                Rc::new(move |ctx: &Context, root: &NodeRef| {
                    a(ctx, root);
                    b(ctx, root);
                })
            }),
            after_rendering: chain(self.after_rendering, other.after_rendering, |a, b| {
                Rc::new(move |ctx: &Context, output: &str| {
                    a(ctx, output);
                    b(ctx, output);
                })
            }),
        }
    }

    /// Hooks logging every stage at debug level, tokens as JSON
    pub fn tracing() -> Self {
        Self::new()
            .after_registering_libraries(|ctx| {
                let names: Vec<&str> = ctx.libraries().iter().map(|l| l.name.as_str()).collect();
                debug!("Libraries: {}", names.join(", "));
            })
            .after_lexing(|_, tokens| match serde_json::to_string(tokens) {
                Ok(json) => debug!("Tokens ({}): {}", tokens.len(), json),
                Err(err) => debug!("Tokens ({}), not serializable: {}", tokens.len(), err),
            })
            .after_parsing(|_, root| debug!("Parsed {} blocks", root.children().len()))
            .after_rendering(|_, output| debug!("Rendered {} bytes", output.len()))
    }
}

impl fmt::Debug for PipelineHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineHooks")
            .field("after_registering_libraries", &self.after_registering_libraries.is_some())
            .field("after_lexing", &self.after_lexing.is_some())
            .field("after_parsing", &self.after_parsing.is_some())
            .field("after_rendering", &self.after_rendering.is_some())
            .finish()
    }
}

/// Output of a successful run
#[derive(Debug, Clone)]
pub struct CompiledDocument {
    pub root: NodeRef,
    pub output: String,
    pub stage: PipelineStage,
}

pub struct Pipeline {
    ctx: Context,
    pending: Vec<Library>,
    hooks: PipelineHooks,
    stage: PipelineStage,
}

impl Pipeline {
    /// A pipeline with the standard library
    pub fn new(options: PipelineOptions, flavor: Rc<dyn Flavor>) -> Result<Self> {
        Ok(Self {
            ctx: Context::new(options, flavor)?,
            pending: vec![stdlib::library()],
            hooks: PipelineHooks::default(),
            stage: PipelineStage::Idle,
        })
    }

    /// Register `library` before the next run
    pub fn with_library(mut self, library: Library) -> Self {
        self.pending.push(library);
        self
    }

    pub fn with_hooks(mut self, hooks: PipelineHooks) -> Self {
        self.hooks = self.hooks.merge(hooks);
        self
    }

    pub fn with_renderer(mut self, renderer: Rc<dyn Renderer>) -> Self {
        self.ctx.set_renderer(renderer);
        self
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    /// Compile `source`. Calling it again keeps libraries, declarations,
    /// link definitions and document information; properties, attributes
    /// and lambda scopes start over.
    pub fn execute(&mut self, source: &str) -> Result<CompiledDocument> {
        self.stage = PipelineStage::Idle;
        self.ctx.reset_for_execution();

        if let Err(err) = self.register_pending() {
            self.stage = PipelineStage::Failed;
            return Err(err);
        }

        let result = run_stages(source, &mut self.ctx, &self.hooks, &mut self.stage);
        if result.is_err() {
            self.stage = PipelineStage::Failed;
        }
        result
    }

    /// Compile `subdocument` in a child context sharing this pipeline's
    /// subdocument graph, recording an edge from the current document
    pub fn execute_subdocument(&mut self, subdocument: Subdocument) -> Result<CompiledDocument> {
        self.register_pending()?;
        compile_subdocument(&self.ctx, subdocument, &self.hooks)
    }

    fn register_pending(&mut self) -> Result<()> {
        for library in std::mem::take(&mut self.pending) {
            let hooks = library.hooks.clone();
            if self.ctx.register_library(library)? {
                if let Some(hooks) = hooks {
                    self.hooks = std::mem::take(&mut self.hooks).merge(hooks);
                }
            }
        }
        if let Some(hook) = &self.hooks.after_registering_libraries {
            hook(&self.ctx);
        }
        Ok(())
    }
}

/// Run tokenize through render on `ctx`, advancing `stage`
pub fn run_stages(
    source: &str,
    ctx: &mut Context,
    hooks: &PipelineHooks,
    stage: &mut PipelineStage,
) -> Result<CompiledDocument> {
    let flavor = ctx.flavor();
    let tokens = flavor.lexer().block().tokenize(source);
    *stage = PipelineStage::Tokenized;
    debug!("Tokenized {} block tokens", tokens.len());
    if let Some(hook) = &hooks.after_lexing {
        hook(ctx, &tokens);
    }

    let root = flavor.parser().document(&tokens, ctx);
    *stage = PipelineStage::Parsed;
    if let Some(hook) = &hooks.after_parsing {
        hook(ctx, &root);
    }

    evaluate_calls(&root, ctx)?;
    *stage = PipelineStage::Evaluated;

    iterator::run_default(&root, ctx);
    *stage = PipelineStage::Resolved;

    let renderer = ctx.renderer();
    let mut output = renderer.render(&root, ctx)?;
    if ctx.options().render.wrap {
        output = renderer.wrap(output, ctx)?;
    }
    *stage = PipelineStage::Rendered;
    if let Some(hook) = &hooks.after_rendering {
        hook(ctx, &output);
    }

    *stage = PipelineStage::Done;
    Ok(CompiledDocument {
        root,
        output,
        stage: *stage,
    })
}

/// Compile `subdocument` from `parent`, reusing an earlier compilation of
/// the same subdocument. Including a subdocument that is still being
/// compiled further up the include chain is a cycle and fails.
pub fn compile_subdocument(
    parent: &Context,
    subdocument: Subdocument,
    hooks: &PipelineHooks,
) -> Result<CompiledDocument> {
    let data = parent.subdocuments();
    {
        let mut data = data.borrow_mut();
        data.add_edge(parent.subdocument(), &subdocument);
        if let Some(summary) = data.summary(&subdocument.name) {
            return Ok(CompiledDocument {
                root: summary.root.clone(),
                output: summary.output.clone(),
                stage: PipelineStage::Done,
            });
        }
        if data.is_compiling(&subdocument.name) {
            return Err(FolioError::pipeline(format!(
                "subdocument '{}' includes itself",
                subdocument.name
            )));
        }
        data.begin(&subdocument.name);
    }

    debug!("Compiling subdocument {}", subdocument.name);
    let compiled = subdocument.content().and_then(|source| {
        let mut child = parent.fork_for_subdocument(subdocument.clone());
        let mut stage = PipelineStage::Idle;
        run_stages(&source, &mut child, hooks, &mut stage)
    });

    let mut data = data.borrow_mut();
    data.end(&subdocument.name);
    let compiled = compiled?;
    data.summaries.insert(
        subdocument.name.clone(),
        SubdocumentSummary {
            root: compiled.root.clone(),
            output: compiled.output.clone(),
        },
    );
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flavor::FolioFlavor;
    use std::cell::RefCell;

    fn pipeline() -> Pipeline {
        Pipeline::new(PipelineOptions::default(), Rc::new(FolioFlavor)).unwrap()
    }

    #[test]
    fn test_stages_reach_done() {
        let mut pipeline = pipeline();
        assert_eq!(pipeline.stage(), PipelineStage::Idle);
        let doc = pipeline.execute("Hello").unwrap();
        assert_eq!(doc.stage, PipelineStage::Done);
        assert_eq!(doc.output, "Hello");
    }

    #[test]
    fn test_hooks_observe_every_stage_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());
        let hooks = PipelineHooks::new()
            .after_registering_libraries(move |_| a.borrow_mut().push("libraries".to_string()))
            .after_lexing(move |_, tokens| b.borrow_mut().push(format!("tokens {}", !tokens.is_empty())))
            .after_parsing(move |_, _| c.borrow_mut().push("parsed".to_string()))
            .after_rendering(move |_, out| d.borrow_mut().push(format!("rendered {}", out)));

        let mut pipeline = pipeline().with_hooks(hooks);
        pipeline.execute("# A\n").unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["libraries", "tokens true", "parsed", "rendered # A"]
        );
    }

    #[test]
    fn test_merged_hooks_both_run() {
        let count = Rc::new(RefCell::new(0));
        let (a, b) = (count.clone(), count.clone());
        let hooks = PipelineHooks::new()
            .after_parsing(move |_, _| *a.borrow_mut() += 1)
            .merge(PipelineHooks::new().after_parsing(move |_, _| *b.borrow_mut() += 10));

        let mut pipeline = pipeline().with_hooks(hooks);
        pipeline.execute("x").unwrap();
        assert_eq!(*count.borrow(), 11);
    }

    #[test]
    fn test_strict_failure_marks_failed_stage() {
        let mut pipeline = Pipeline::new(PipelineOptions::strict(), Rc::new(FolioFlavor)).unwrap();
        let err = pipeline.execute(".nosuchfunction\n").unwrap_err();
        assert_eq!(err.exit_code(), 10);
        assert_eq!(pipeline.stage(), PipelineStage::Failed);
    }

    #[test]
    fn test_library_hooks_merged_on_registration() {
        let seen = Rc::new(RefCell::new(false));
        let flag = seen.clone();
        let library = Library::new("observer", vec![])
            .with_hooks(PipelineHooks::new().after_parsing(move |_, _| *flag.borrow_mut() = true));

        let mut pipeline = pipeline().with_library(library);
        pipeline.execute("text").unwrap();
        assert!(*seen.borrow());
    }
}
