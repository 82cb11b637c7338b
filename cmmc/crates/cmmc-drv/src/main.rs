//! cmmc - Command-line front end for the CMM toolchain.
//!
//! One subcommand per pipeline mode. The source comes from a file
//! argument or from standard input; diagnostics go to standard
//! error and the process exits with status 1 on any failure.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use cmmc_drv::{Mode, Pipeline, PipelineError};

/// Compiler and interpreter for the CMM teaching language.
#[derive(Parser, Debug)]
#[command(name = "cmmc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiler and interpreter for the CMM language", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Pipeline modes.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenize and print the token listing
    Lexer(ModeArgs),

    /// Parse and print the syntax tree
    Parser(ModeArgs),

    /// Run semantic analysis and print the scope tree
    Semantic(ModeArgs),

    /// Compile and print the intermediate code listing
    Compile(ModeArgs),

    /// Compile and execute the program
    Execute(ModeArgs),
}

#[derive(Args, Debug)]
struct ModeArgs {
    /// Source file; standard input is read when omitted
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let (mode, args) = match &cli.command {
        Commands::Lexer(args) => (Mode::Lexer, args),
        Commands::Parser(args) => (Mode::Parser, args),
        Commands::Semantic(args) => (Mode::Semantic, args),
        Commands::Compile(args) => (Mode::Compile, args),
        Commands::Execute(args) => (Mode::Execute, args),
    };

    let source = match read_source(args) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    match Pipeline::new(source, mode).run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(PipelineError::Io(err)) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
        // stage errors were already rendered to the error stream
        Err(_) => ExitCode::FAILURE,
    }
}

/// Read the source text from the file argument or standard input.
fn read_source(args: &ModeArgs) -> anyhow::Result<String> {
    match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display())),
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("cannot read standard input")?;
            Ok(source)
        }
    }
}
