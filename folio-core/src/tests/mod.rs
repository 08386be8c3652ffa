//! Cross-module behavior, exercised through the pipeline.

mod subdocument_tests;

use crate::config::PipelineOptions;
use crate::error::Result;
use crate::flavor::FolioFlavor;
use crate::pipeline::Pipeline;
use std::path::Path;
use std::rc::Rc;

pub(crate) fn pipeline() -> Pipeline {
    pipeline_with(PipelineOptions::default())
}

pub(crate) fn pipeline_with(options: PipelineOptions) -> Pipeline {
    Pipeline::new(options, Rc::new(FolioFlavor)).unwrap()
}

/// Lenient compilation output
pub(crate) fn compile(source: &str) -> String {
    compile_with(PipelineOptions::default(), source).unwrap()
}

pub(crate) fn compile_strict(source: &str) -> Result<String> {
    compile_with(PipelineOptions::strict(), source)
}

pub(crate) fn compile_with(options: PipelineOptions, source: &str) -> Result<String> {
    pipeline_with(options).execute(source).map(|doc| doc.output)
}

pub(crate) fn options_in(dir: &Path) -> PipelineOptions {
    PipelineOptions::default().with_working_dir(dir)
}
