//! The compilation driver (spec.md §4.6).
//!
//! Wires lexer → parser → checker → closure lifter → C (or LLVM) emitter,
//! then shells out to a host C compiler with a fixed link line. Mirrors the
//! teacher workspace's `compile_and_run`/`compile_to_dir` shape
//! (`Command::new` + captured exit status) rather than anything more
//! elaborate — the driver itself stays a thin, synchronous pipeline
//! (spec.md §5, "The compiler itself is single-threaded and synchronous").

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use wync_lang::error::ParseError;

use crate::analysis::check_program;
use crate::closures::lift_closures;
use crate::codegen_c::{codegen_program, CodegenInput, EntryMode};
use crate::diagnostic::Diagnostic;
use crate::error::CheckError;
use crate::loader::{resolve_imports, LoaderError};
use crate::optimize::{optimize, OptLevel};
use crate::spawn::find_spawns;

/// `cross linux|macos|windows` target selection (SPEC_FULL §F). Only
/// changes which host compiler binary/link flags the driver invokes; the
/// pipeline up to emission is identical for every target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossTarget {
    Linux,
    MacOs,
    Windows,
}

impl CrossTarget {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "linux" => Some(CrossTarget::Linux),
            "macos" => Some(CrossTarget::MacOs),
            "windows" => Some(CrossTarget::Windows),
            _ => None,
        }
    }

    /// Host compiler binary and any extra link flags for this target
    /// (SPEC_FULL §F, "`cross <target>` dispatch"). A real cross-compile
    /// toolchain is an external concern; this only changes the argv the
    /// driver invokes, matching the spec's framing of `cross` as "the same
    /// driver pipeline" with a different host-side compiler.
    fn compiler_and_flags(self) -> (&'static str, Vec<&'static str>) {
        match self {
            CrossTarget::Linux => ("cc", vec![]),
            CrossTarget::MacOs => ("clang", vec![]),
            CrossTarget::Windows => ("x86_64-w64-mingw32-gcc", vec!["-static"]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramSelect {
    /// Emit an ordinary `main` that calls the source program's `main`.
    Normal,
    /// Emit a synthetic `main` that runs every top-level `test` block
    /// (SPEC_FULL §F, "`wyn test` block execution").
    Tests,
}

pub struct CompileOptions {
    pub opt_level: OptLevel,
    /// `-o <name>` (spec.md §6). Defaults to the source file's stem.
    pub output: Option<PathBuf>,
    /// `WYN_ROOT` (spec.md §6): directory containing the runtime support
    /// units and the `import` search path.
    pub wyn_root: PathBuf,
    pub program_select: ProgramSelect,
    pub cross_target: Option<CrossTarget>,
    /// `--json-errors` (SPEC_FULL §F).
    pub json_errors: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            opt_level: OptLevel::O0,
            output: None,
            wyn_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            program_select: ProgramSelect::Normal,
            cross_target: None,
            json_errors: false,
        }
    }
}

#[derive(Debug)]
pub enum CompileError {
    Parse(Vec<ParseError>),
    Check(Vec<CheckError>),
    Io(std::io::Error),
    Loader(LoaderError),
    /// The host C compiler ran but returned a nonzero exit status.
    HostToolchain { status: Option<i32>, stderr: String },
    /// The host compiler exited 0 but the expected output file is absent
    /// (spec.md §7, "Driver").
    MissingOutput(PathBuf),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Parse(errs) => {
                writeln!(f, "parse error(s):")?;
                for e in errs {
                    writeln!(f, "  {}", e)?;
                }
                Ok(())
            }
            CompileError::Check(errs) => {
                writeln!(f, "check error(s):")?;
                for e in errs {
                    writeln!(f, "  {}", e)?;
                }
                Ok(())
            }
            CompileError::Io(e) => write!(f, "I/O error: {}", e),
            CompileError::Loader(e) => write!(f, "import resolution failed: {}", e),
            CompileError::HostToolchain { status, stderr } => {
                write!(f, "host C compiler failed (status {:?}): {}", status, stderr)
            }
            CompileError::MissingOutput(path) => {
                write!(f, "host C compiler exited 0 but {} was not produced", path.display())
            }
        }
    }
}

impl std::error::Error for CompileError {}

impl From<std::io::Error> for CompileError {
    fn from(e: std::io::Error) -> Self {
        CompileError::Io(e)
    }
}

/// What a successful compilation produced.
pub struct CompileOutcome {
    pub emitted_c_path: PathBuf,
    pub executable_path: PathBuf,
}

/// Runs the full pipeline on `source` and emits the `.c` file at
/// `emitted_c_path`, but does not invoke the host compiler. Used by driver
/// tests (no host `cc` in the sandbox) and by [`compile_file`]/
/// [`compile_and_link`] internally.
pub fn emit_c(source: &str, opts: &CompileOptions) -> Result<String, CompileError> {
    let (mut program, mut interner, parse_errors, had_parse_error) = wync_lang::parse(source);
    if had_parse_error {
        return Err(CompileError::Parse(parse_errors));
    }

    let check_output = check_program(&mut program, &mut interner, source);
    if !check_output.errors.is_empty() {
        return Err(CompileError::Check(check_output.errors));
    }

    let closures = lift_closures(&mut program, &mut interner);
    let spawns = find_spawns(&program);
    let optimize_output = optimize(&mut program, opts.opt_level);

    let entry = match opts.program_select {
        ProgramSelect::Normal => EntryMode::Program,
        ProgramSelect::Tests => EntryMode::Tests,
    };

    let input = CodegenInput {
        program: &program,
        interner: &interner,
        source,
        types: &check_output.types,
        generics: &check_output.generics,
        closures: &closures,
        spawns: &spawns,
        optimize: &optimize_output,
        entry,
    };
    Ok(codegen_program(input))
}

/// Collects JSON-serializable diagnostics for `source` without stopping at
/// the first stage that fails (SPEC_FULL §F, "Diagnostics-as-JSON"). Used
/// by `--json-errors` instead of [`emit_c`]'s early-return.
pub fn collect_diagnostics(source: &str) -> Vec<Diagnostic> {
    let (mut program, mut interner, parse_errors, had_parse_error) = wync_lang::parse(source);
    let mut diagnostics: Vec<Diagnostic> =
        parse_errors.iter().map(Diagnostic::from_parse_error).collect();
    if had_parse_error {
        return diagnostics;
    }
    let check_output = check_program(&mut program, &mut interner, source);
    diagnostics.extend(
        check_output
            .errors
            .iter()
            .map(|e| Diagnostic::from_check_error(e, source)),
    );
    diagnostics
}

/// Reads `path`, resolves its imports against `opts.wyn_root`, and compiles
/// it end to end: parse → check → lower → host C compiler → linked
/// executable (spec.md §4.6 steps 1–9).
pub fn compile_file(path: &Path, opts: &CompileOptions) -> Result<CompileOutcome, CompileError> {
    let raw_source = fs::read_to_string(path)?;
    let combined_source =
        resolve_imports(&raw_source, &opts.wyn_root).map_err(CompileError::Loader)?;

    let c_text = emit_c(&combined_source, opts)?;

    let c_path = sibling_c_path(path);
    fs::write(&c_path, &c_text)?;

    let output_path = output_path_for(path, opts);
    run_host_compiler(&c_path, &output_path, opts)?;

    if !output_path.exists() {
        return Err(CompileError::MissingOutput(output_path));
    }

    Ok(CompileOutcome {
        emitted_c_path: c_path,
        executable_path: output_path,
    })
}

fn sibling_c_path(source_path: &Path) -> PathBuf {
    source_path.with_extension("c")
}

fn output_path_for(source_path: &Path, opts: &CompileOptions) -> PathBuf {
    opts.output.clone().unwrap_or_else(|| {
        source_path
            .with_extension("")
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("a.out"))
    })
}

/// The runtime support units every emitted translation unit links against
/// (spec.md §6, "Compilation command (default)"). Looked up under
/// `<WYN_ROOT>/src`.
const RUNTIME_UNITS: &[&str] = &["wyn_wrapper.c", "wyn_interface.c"];

fn run_host_compiler(c_path: &Path, output_path: &Path, opts: &CompileOptions) -> Result<(), CompileError> {
    let (compiler, extra_flags) = match opts.cross_target {
        Some(target) => target.compiler_and_flags(),
        None => ("cc", vec![]),
    };

    let opt_flag = match opts.opt_level {
        OptLevel::O0 => "-O0",
        OptLevel::O1 => "-O1",
        OptLevel::O2 => "-O2",
    };

    let runtime_src_dir = opts.wyn_root.join("src");
    let mut cmd = Command::new(compiler);
    cmd.arg(opt_flag)
        .arg("-I")
        .arg(&runtime_src_dir)
        .arg("-o")
        .arg(output_path)
        .arg(c_path);
    for unit in RUNTIME_UNITS {
        let unit_path = runtime_src_dir.join(unit);
        if unit_path.exists() {
            cmd.arg(unit_path);
        }
    }
    for flag in extra_flags {
        cmd.arg(flag);
    }
    cmd.arg("-lm");

    let output = cmd.output()?;
    if !output.status.success() {
        return Err(CompileError::HostToolchain {
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}

/// `run <file>`: compile, then execute the produced binary, returning its
/// exit status as-is (spec.md §8, "Driver exit status").
pub fn compile_and_run(path: &Path, opts: &CompileOptions) -> Result<i32, CompileError> {
    let outcome = compile_file(path, opts)?;
    let status = Command::new(&outcome.executable_path).status()?;
    Ok(status.code().unwrap_or(1))
}

/// `build <dir>`: concatenates every `.wyn` source file in `dir` (sorted by
/// file name, for determinism) and compiles the combined buffer as a
/// single translation unit (spec.md §6, "`build <dir>`").
pub fn compile_dir(dir: &Path, opts: &CompileOptions) -> Result<CompileOutcome, CompileError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("wyn"))
        .collect();
    entries.sort();

    let mut combined = String::new();
    for entry in &entries {
        combined.push_str(&fs::read_to_string(entry)?);
        combined.push('\n');
    }
    let combined = resolve_imports(&combined, &opts.wyn_root).map_err(CompileError::Loader)?;

    let c_text = emit_c(&combined, opts)?;
    let c_path = dir.join("build.c");
    fs::write(&c_path, &c_text)?;

    let stem = dir.file_name().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("a.out"));
    let output_path = opts.output.clone().unwrap_or(stem);
    run_host_compiler(&c_path, &output_path, opts)?;

    if !output_path.exists() {
        return Err(CompileError::MissingOutput(output_path));
    }
    Ok(CompileOutcome {
        emitted_c_path: c_path,
        executable_path: output_path,
    })
}

/// `compile_to_string` equivalent used by unit/integration tests that
/// assert on emitted C shape without a host toolchain (SPEC_FULL §E).
pub fn compile_source(source: &str, opts: &CompileOptions) -> Result<String, CompileError> {
    emit_c(source, opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_c_reports_parse_errors() {
        let opts = CompileOptions::default();
        let result = emit_c("fn main( {", &opts);
        assert!(matches!(result, Err(CompileError::Parse(_))));
    }

    #[test]
    fn emit_c_reports_check_errors() {
        let opts = CompileOptions::default();
        let result = emit_c("fn main() -> int { return undefined_name; }", &opts);
        assert!(matches!(result, Err(CompileError::Check(_))));
    }

    #[test]
    fn emit_c_succeeds_on_hello_world() {
        let opts = CompileOptions::default();
        let c = emit_c(
            r#"fn main() -> int { print("hello"); return 0 }"#,
            &opts,
        )
        .unwrap();
        assert!(c.contains("int main(int argc, char **argv)"));
    }

    #[test]
    fn collect_diagnostics_does_not_stop_at_first_parse_error() {
        let diags = collect_diagnostics("fn main() -> int { return undefined_name; }");
        assert!(!diags.is_empty());
    }

    #[test]
    fn compile_file_roundtrips_through_a_temp_directory() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let src_path = dir.path().join("hello.wyn");
        let mut f = fs::File::create(&src_path).unwrap();
        writeln!(f, r#"fn main() -> int {{ print("hello"); return 0 }}"#).unwrap();

        let mut opts = CompileOptions::default();
        opts.wyn_root = dir.path().to_path_buf();

        // No host `cc`/runtime units are guaranteed to exist in a test
        // sandbox, so only exercise the stages before the host toolchain
        // invocation here; `run_host_compiler` is covered by `/verify`-style
        // manual runs documented in DESIGN.md.
        let raw = fs::read_to_string(&src_path).unwrap();
        let combined = resolve_imports(&raw, &opts.wyn_root).unwrap();
        let c_text = emit_c(&combined, &opts).unwrap();
        assert!(c_text.contains("hello"));
    }
}
