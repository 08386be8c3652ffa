//! # folio CLI
//!
//! Command-line driver for the folio markup compiler.

mod commands;

use clap::{Parser, Subcommand};
use folio_core::{ErrorPolicy, FolioError, PipelineOptions};
use folio_types::DocumentType;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "folio.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a document
    Compile {
        /// Source file
        file: PathBuf,

        /// Abort on the first error, exiting with its code
        #[arg(long)]
        strict: bool,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the document type (plain, paged, slides)
        #[arg(long, value_parser = parse_document_type)]
        doctype: Option<DocumentType>,
    },

    /// Read documents from stdin, one per `;;`-terminated input, keeping
    /// declarations between inputs
    Repl {
        /// Abort each input on its first error
        #[arg(long)]
        strict: bool,
    },
}

fn parse_document_type(s: &str) -> Result<DocumentType, String> {
    DocumentType::from_str(s).ok_or_else(|| format!("unknown document type '{}'", s))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr, output to stdout
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::WARN.into()
            }),
        )
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install logger: {}", err);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let code = err
                .downcast_ref::<FolioError>()
                .map_or(1, FolioError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let options = load_options(&cli.config)?;

    match cli.command {
        Commands::Compile {
            file,
            strict,
            output,
            doctype,
        } => {
            let mut options = with_strict(options, strict);
            if let Some(doctype) = doctype {
                options.document.doc_type = doctype;
            }
            commands::compile_file(options, &file, output.as_deref())
        }
        Commands::Repl { strict } => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            commands::run_repl(with_strict(options, strict), stdin.lock(), &mut stdout.lock())
        }
    }
}

/// Options from `path`, or the defaults when there is no such file
fn load_options(path: &Path) -> anyhow::Result<PipelineOptions> {
    if !path.exists() {
        tracing::debug!("No config at {:?}, using defaults", path);
        return Ok(PipelineOptions::default());
    }

    tracing::debug!("Loading config from {:?}", path);
    PipelineOptions::from_file(path)
        .map_err(FolioError::from)
        .map_err(|err| anyhow::Error::new(err).context("Failed to load configuration"))
}

fn with_strict(options: PipelineOptions, strict: bool) -> PipelineOptions {
    if strict {
        options.with_policy(ErrorPolicy::Strict)
    } else {
        options
    }
}
