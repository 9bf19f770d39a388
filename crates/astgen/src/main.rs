//! The AST-definition compiler CLI (§6).
//!
//! ```text
//! astgen [--output PREFIX] (--generate_h | --generate_cpp)
//!        (--generate_nodes | --generate_debug) ASTFILE
//! ```

use std::path::PathBuf;
use std::process;

use ariadne::{Label, Report, ReportKind, Source};
use clap::Parser;

use astgen_codegen::backends::{debug_header, debug_impl, nodes_header, nodes_impl};
use astgen_common::diagnostics::Diagnostic;

#[derive(Parser)]
#[command(name = "astgen", version, about = "The AST-definition compiler")]
struct Cli {
    /// Output path prefix. Writes to standard output if absent.
    #[arg(long)]
    output: Option<String>,

    /// Emit the header (`.h`) file kind.
    #[arg(long = "generate_h")]
    generate_h: bool,

    /// Emit the implementation (`.cpp`) file kind.
    #[arg(long = "generate_cpp")]
    generate_cpp: bool,

    /// Select the nodes backend.
    #[arg(long = "generate_nodes")]
    generate_nodes: bool,

    /// Select the debug-printer backend.
    #[arg(long = "generate_debug")]
    generate_debug: bool,

    /// Path to the `.ast` source file.
    astfile: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    if let Err(code) = run(&cli) {
        process::exit(code);
    }
}

fn run(cli: &Cli) -> Result<(), i32> {
    if !cli.generate_h && !cli.generate_cpp {
        println!("error: at least one of --generate_h or --generate_cpp is required");
        return Err(1);
    }
    if cli.generate_nodes == cli.generate_debug {
        println!("error: exactly one of --generate_nodes or --generate_debug is required");
        return Err(1);
    }

    let source = std::fs::read_to_string(&cli.astfile).map_err(|e| {
        println!("error: failed to read '{}': {e}", cli.astfile.display());
        1
    })?;
    let file_name = cli.astfile.display().to_string();

    let raw = astgen_parser::parse(&source).map_err(|e| {
        report(&e, &file_name, &source);
        1
    })?;
    let resolved = astgen_resolve::resolve(raw).map_err(|e| {
        report(&e, &file_name, &source);
        1
    })?;

    let basename = cli.output.clone().unwrap_or_else(|| "ast".to_string());
    let backend_suffix = if cli.generate_debug { "_debug" } else { "" };

    let mut artifacts = Vec::new();
    if cli.generate_h {
        let text = if cli.generate_debug {
            debug_header::generate(&resolved, &basename)
        } else {
            nodes_header::generate(&resolved, &basename)
        }
        .map_err(|e| {
            report(&e, &file_name, &source);
            1
        })?;
        artifacts.push((format!("{basename}{backend_suffix}.h"), text));
    }
    if cli.generate_cpp {
        let text = if cli.generate_debug {
            debug_impl::generate(&resolved, &basename)
        } else {
            nodes_impl::generate(&resolved, &basename)
        }
        .map_err(|e| {
            report(&e, &file_name, &source);
            1
        })?;
        artifacts.push((format!("{basename}{backend_suffix}.cpp"), text));
    }

    match &cli.output {
        Some(_) => {
            for (path, text) in &artifacts {
                std::fs::write(path, text).map_err(|e| {
                    println!("error: failed to write '{path}': {e}");
                    1
                })?;
            }
        }
        None => {
            // §10.5: no `--output` and (potentially) two artifacts in one
            // invocation both go to stdout, each preceded by a banner
            // naming it so the concatenated stream stays unambiguous.
            for (name, text) in &artifacts {
                println!("// ==== {name} ====");
                println!("{text}");
            }
        }
    }
    Ok(())
}

/// Renders a pipeline error to standard output (§6: error messages go to
/// standard output, not standard error).
fn report<E: Diagnostic>(err: &E, file_name: &str, source: &str) {
    let Some(span) = err.span() else {
        println!("error: {}", err.message());
        return;
    };

    let range = span.range();
    let range = if range.end <= range.start {
        range.start..range.start + 1
    } else {
        range
    };

    let _ = Report::<(String, std::ops::Range<usize>)>::build(ReportKind::Error, (file_name.to_string(), range.clone()))
        .with_message(err.message())
        .with_label(Label::new((file_name.to_string(), range)).with_message(err.message()))
        .finish()
        .print((file_name.to_string(), Source::from(source)));
}
