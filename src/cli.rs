//! `wyncc` command-line surface (spec.md §6, "CLI").
//!
//! `compiler`, `run`, `build`, and `cross` are the core driver entry points;
//! everything else spec.md §6 lists (`fmt`, `doc`, `repl`, `lsp`, `debug`,
//! `pkg`, `test`, `clean`, `init`, `help`) is dispatched here but is
//! explicitly "not part of the core" compiler this crate implements, so
//! those just print a notice and exit 0 rather than pretend to do
//! something they don't. `version` is the one passthrough name that *is*
//! real: it reports the crate version (SPEC_FULL §F).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use wync_compile::diagnostic;
use wync_compile::driver::{self, CompileError, CompileOptions, CrossTarget, ProgramSelect};
use wync_compile::optimize::OptLevel;

#[derive(Parser)]
#[command(name = "wyncc")]
#[command(about = "Whole-program compiler for the Wyn language", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a source file to a native executable.
    Compiler(CompileArgs),
    /// Compile a source file and immediately run the result.
    Run(CompileArgs),
    /// Concatenate every source file in a directory and compile it as one unit.
    Build(BuildArgs),
    /// Compile for a specific host target (`linux`, `macos`, or `windows`).
    Cross {
        target: String,
        #[command(flatten)]
        args: CompileArgs,
    },
    /// Report the compiler version.
    Version,
    /// Not part of the core compiler.
    Fmt,
    /// Not part of the core compiler.
    Doc,
    /// Not part of the core compiler.
    Repl,
    /// Not part of the core compiler.
    Lsp,
    /// Not part of the core compiler.
    Debug,
    /// Not part of the core compiler.
    Pkg,
    /// Not part of the core compiler.
    Test,
    /// Not part of the core compiler.
    Clean,
    /// Not part of the core compiler.
    Init,
    /// Not part of the core compiler.
    Help,
}

#[derive(clap::Args)]
struct CompileArgs {
    file: PathBuf,

    /// Optimization level.
    #[arg(short = 'O', value_parser = clap::value_parser!(u8).range(0..=2), default_value = "0")]
    opt: u8,

    /// Output file name; defaults to the source file's stem.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit accumulated parse/check diagnostics as a JSON array instead of
    /// human-readable text (SPEC_FULL §F).
    #[arg(long)]
    json_errors: bool,

    /// Run every top-level `test` block instead of `main` (SPEC_FULL §F,
    /// "`wyn test` block execution"). Not the same as the passthrough
    /// `test` subcommand spec.md §6 reserves for an external tool.
    #[arg(long = "tests")]
    run_tests: bool,
}

#[derive(clap::Args)]
struct BuildArgs {
    dir: PathBuf,

    #[arg(short = 'O', value_parser = clap::value_parser!(u8).range(0..=2), default_value = "0")]
    opt: u8,

    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long)]
    json_errors: bool,
}

/// Returns the process exit status (spec.md §6, "Exit status is 0 on
/// success, nonzero on any stage failure").
pub fn run() -> i32 {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compiler(args) => run_compiler(args, None),
        Commands::Run(args) => run_run(args),
        Commands::Build(args) => run_build(args),
        Commands::Cross { target, args } => match CrossTarget::parse(&target) {
            Some(t) => run_compiler(args, Some(t)),
            None => {
                eprintln!("error: unknown cross target '{}' (expected linux, macos, or windows)", target);
                1
            }
        },
        Commands::Version => {
            println!("wyncc {}", env!("CARGO_PKG_VERSION"));
            0
        }
        Commands::Fmt => passthrough_notice("fmt"),
        Commands::Doc => passthrough_notice("doc"),
        Commands::Repl => passthrough_notice("repl"),
        Commands::Lsp => passthrough_notice("lsp"),
        Commands::Debug => passthrough_notice("debug"),
        Commands::Pkg => passthrough_notice("pkg"),
        Commands::Test => passthrough_notice("test"),
        Commands::Clean => passthrough_notice("clean"),
        Commands::Init => passthrough_notice("init"),
        Commands::Help => passthrough_notice("help"),
    }
}

fn passthrough_notice(name: &str) -> i32 {
    println!("'{}' is not part of the core compiler", name);
    0
}

fn wyn_root() -> PathBuf {
    std::env::var_os("WYN_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn opts_from(args: &CompileArgs, cross_target: Option<CrossTarget>) -> CompileOptions {
    CompileOptions {
        opt_level: opt_level_from(args.opt),
        output: args.output.clone(),
        wyn_root: wyn_root(),
        program_select: if args.run_tests { ProgramSelect::Tests } else { ProgramSelect::Normal },
        cross_target,
        json_errors: args.json_errors,
    }
}

fn opt_level_from(level: u8) -> OptLevel {
    match level {
        0 => OptLevel::O0,
        1 => OptLevel::O1,
        _ => OptLevel::O2,
    }
}

fn run_compiler(args: CompileArgs, cross_target: Option<CrossTarget>) -> i32 {
    let json_errors = args.json_errors;
    let file = args.file.clone();
    let opts = opts_from(&args, cross_target);

    match driver::compile_file(&file, &opts) {
        Ok(outcome) => {
            log::info!("wrote {}", outcome.executable_path.display());
            0
        }
        Err(e) => report_compile_error(&file, json_errors, e),
    }
}

fn run_run(args: CompileArgs) -> i32 {
    let json_errors = args.json_errors;
    let file = args.file.clone();
    let opts = opts_from(&args, None);

    match driver::compile_and_run(&file, &opts) {
        Ok(code) => code,
        Err(e) => report_compile_error(&file, json_errors, e),
    }
}

fn run_build(args: BuildArgs) -> i32 {
    let dir = args.dir.clone();
    let opts = CompileOptions {
        opt_level: opt_level_from(args.opt),
        output: args.output.clone(),
        wyn_root: wyn_root(),
        program_select: ProgramSelect::Normal,
        cross_target: None,
        json_errors: args.json_errors,
    };

    match driver::compile_dir(&dir, &opts) {
        Ok(outcome) => {
            log::info!("wrote {}", outcome.executable_path.display());
            0
        }
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    }
}

/// On a compile failure, re-runs parsing/checking in diagnostics-collecting
/// mode when `--json-errors` was requested so the caller gets every
/// accumulated diagnostic instead of just the first `CompileError` (SPEC_FULL
/// §F, "Diagnostics-as-JSON").
fn report_compile_error(file: &std::path::Path, json_errors: bool, err: CompileError) -> i32 {
    if json_errors {
        if let Ok(source) = std::fs::read_to_string(file) {
            let diags = driver::collect_diagnostics(&source);
            eprintln!("{}", diagnostic::to_json(&diags));
            return 1;
        }
    }
    eprintln!("{}", err);
    1
}
