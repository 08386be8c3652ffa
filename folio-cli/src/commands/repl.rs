//! Read-eval-print loop over one long-lived pipeline.

use super::compile::report;
use anyhow::{Context, Result};
use folio_core::{Pipeline, PipelineOptions};
use std::io::{BufRead, Write};
use std::rc::Rc;

/// Line that submits the input read so far
pub const SUBMIT: &str = ";;";

/// Compile each input from `input` in turn, printing outputs to `out`.
///
/// Declarations, link definitions and document settings carry over from
/// one input to the next. A failing input is reported and the session goes
/// on.
pub fn run_repl(options: PipelineOptions, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    let mut pipeline = Pipeline::new(options, Rc::new(folio_core::FolioFlavor))?;
    let mut buffer = String::new();
    let mut inputs = 0;

    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        if line.trim_end() == SUBMIT {
            evaluate(&mut pipeline, &buffer, out)?;
            buffer.clear();
            inputs += 1;
        } else {
            buffer.push_str(&line);
            buffer.push('\n');
        }
    }

    if !buffer.trim().is_empty() {
        evaluate(&mut pipeline, &buffer, out)?;
        inputs += 1;
    }
    tracing::debug!("REPL finished after {} inputs", inputs);
    Ok(())
}

fn evaluate(pipeline: &mut Pipeline, source: &str, out: &mut impl Write) -> Result<()> {
    match pipeline.execute(source) {
        Ok(doc) => writeln!(out, "{}", doc.output)?,
        Err(err) => {
            let err = report(source, err, pipeline.context().failed_at());
            eprintln!("Error: {:#}", err);
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::ErrorPolicy;

    fn session(options: PipelineOptions, input: &str) -> String {
        let mut out = Vec::new();
        run_repl(options, input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_declarations_carry_over() {
        let out = session(
            PipelineOptions::default(),
            ".var {name} {Ada}\n;;\nHello .name\n;;\n",
        );
        assert_eq!(out, "\nHello Ada\n");
    }

    #[test]
    fn test_trailing_input_without_submit() {
        let out = session(PipelineOptions::default(), "# Title\n\nBody");
        assert_eq!(out, "# Title\n\nBody\n");
    }

    #[test]
    fn test_strict_failure_keeps_session() {
        let options = PipelineOptions::default().with_policy(ErrorPolicy::Strict);
        let out = session(options, ".nothing\n;;\n.sum {2} {3}\n;;\n");
        assert_eq!(out, "5\n");
    }
}
