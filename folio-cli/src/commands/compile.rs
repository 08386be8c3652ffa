//! Compile command implementation.

use anyhow::{Context, Result};
use folio_core::{ErrorContext, FolioError, Pipeline, PipelineOptions};
use std::fs;
use std::path::Path;
use std::rc::Rc;

/// Compile `file`, writing the output to `output` or stdout
pub fn compile_file(mut options: PipelineOptions, file: &Path, output: Option<&Path>) -> Result<()> {
    let source = fs::read_to_string(file).with_context(|| format!("Failed to read {:?}", file))?;

    // Files referenced from the document resolve next to it
    if options.working_dir.is_none() {
        if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
            options.working_dir = Some(parent.to_path_buf());
        }
    }

    let mut pipeline = Pipeline::new(options, Rc::new(folio_core::FolioFlavor))?;
    let doc = match pipeline.execute(&source) {
        Ok(doc) => doc,
        Err(err) => return Err(report(&source, err, pipeline.context().failed_at())),
    };
    tracing::debug!("Compiled {:?} ({} bytes)", file, doc.output.len());

    match output {
        Some(path) => {
            fs::write(path, &doc.output).with_context(|| format!("Failed to write {:?}", path))?;
            tracing::info!("Wrote {:?}", path);
        }
        None => println!("{}", doc.output),
    }
    Ok(())
}

/// Print the failing call site, if known, and title the error
pub(crate) fn report(source: &str, err: FolioError, span: Option<folio_types::Span>) -> anyhow::Error {
    if let Some(span) = span {
        eprint!("{}", ErrorContext::new(source, &err, span));
    }
    let title = err.title();
    anyhow::Error::new(err).context(title)
}
