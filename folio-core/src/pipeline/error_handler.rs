//! Handling of errors raised at function call sites.

use crate::ast::{Node, NodeRef};
use crate::config::ErrorPolicy;
use crate::error::{FolioError, Result};
use crate::function::FunctionCall;
use std::rc::Rc;

/// Decides what a failing call site turns into
pub trait ErrorHandler {
    /// Either a node to store in place of the call's output, or the error
    /// to abort the compilation with
    fn handle(&self, error: FolioError, call: &FunctionCall) -> Result<NodeRef>;
}

/// Logs the error and substitutes an in-document error marker
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientErrorHandler;

impl ErrorHandler for LenientErrorHandler {
    fn handle(&self, error: FolioError, call: &FunctionCall) -> Result<NodeRef> {
        tracing::warn!(
            "Error in .{} at {}..{}: {}",
            call.name,
            call.span.start,
            call.span.end,
            error
        );
        Ok(Node::error(error.rich_message(), call.span))
    }
}

/// Logs the error and aborts
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictErrorHandler;

impl ErrorHandler for StrictErrorHandler {
    fn handle(&self, error: FolioError, call: &FunctionCall) -> Result<NodeRef> {
        tracing::error!(
            "Error in .{} at {}..{}: {}",
            call.name,
            call.span.start,
            call.span.end,
            error
        );
        Err(error)
    }
}

pub fn error_handler_for(policy: ErrorPolicy) -> Rc<dyn ErrorHandler> {
    match policy {
        ErrorPolicy::Lenient => Rc::new(LenientErrorHandler),
        ErrorPolicy::Strict => Rc::new(StrictErrorHandler),
    }
}
