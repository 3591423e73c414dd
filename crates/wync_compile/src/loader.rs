//! Module loading and import resolution (spec.md §4.6 step 2, §4.4 "Module
//! / Import").
//!
//! The driver pre-scans the entry source for `import` statements *before*
//! lexing, resolves each name against a search path, and splices the
//! referenced module's source into a single combined buffer. Imports of the
//! fixed built-in modules (`math`, `random`, `array`, `string`, `time`) are
//! left alone — the C emitter already lowers calls against those names to
//! canned runtime calls (`codegen_c::emit::BUILTIN_MODULES`) and there is no
//! file to load.
//!
//! Wyn identifiers may already contain `::` (spec.md §4.1, "Identifiers ...
//! also permits `::` within identifiers for module-qualified names"), and
//! the C emitter collapses `::` to `_` (spec.md §4.4, "Identifiers"). We
//! reuse that existing mechanism instead of inventing a new namespacing
//! scheme: a loaded module's exported top-level items are textually
//! rewritten from `name` to `module::name` before splicing, so a call like
//! `geometry::area(p)` in the importing source resolves against the
//! spliced, renamed definition without any change to the checker.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use wync_base::Symbol;
use wync_lang::ast::{Stmt, StmtKind};

/// Modules the C emitter already knows how to lower without a backing
/// source file (`codegen_c::emit::BUILTIN_MODULES`, kept in sync here since
/// `emit` is a private submodule of `codegen_c`).
pub const BUILTIN_MODULES: &[&str] = &["math", "random", "array", "string", "time"];

#[derive(Debug)]
pub enum LoaderError {
    Io { module: String, source: io::Error },
}

impl std::fmt::Display for LoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderError::Io { module, source } => {
                write!(f, "failed to load module '{}': {}", module, source)
            }
        }
    }
}

impl std::error::Error for LoaderError {}

/// Concatenates every non-built-in module transitively imported by
/// `entry_source` ahead of it, wrapped so each module's exports become
/// `module::name`-qualified identifiers. `search_path` is the directory
/// `import <name>` resolves `<name>.wyn` against (spec.md §6, `WYN_ROOT`).
pub fn resolve_imports(entry_source: &str, search_path: &Path) -> Result<String, LoaderError> {
    let mut seen = HashSet::new();
    let mut prelude = String::new();
    collect_imports(entry_source, search_path, &mut seen, &mut prelude)?;
    if prelude.is_empty() {
        Ok(entry_source.to_string())
    } else {
        prelude.push('\n');
        prelude.push_str(entry_source);
        Ok(prelude)
    }
}

fn collect_imports(
    source: &str,
    search_path: &Path,
    seen: &mut HashSet<String>,
    out: &mut String,
) -> Result<(), LoaderError> {
    for module_name in scan_import_names(source) {
        if BUILTIN_MODULES.contains(&module_name.as_str()) || seen.contains(&module_name) {
            continue;
        }
        seen.insert(module_name.clone());

        let path = module_path(search_path, &module_name);
        let module_source = fs::read_to_string(&path).map_err(|e| LoaderError::Io {
            module: module_name.clone(),
            source: e,
        })?;

        // Depth-first: a module's own imports are spliced before the
        // module itself, matching declaration order a single-pass reader
        // would see.
        collect_imports(&module_source, search_path, seen, out)?;

        let qualified = qualify_exports(&module_source, &module_name);
        out.push_str(&format!("// --- begin module {} ---\n", module_name));
        out.push_str(&qualified);
        out.push_str(&format!("\n// --- end module {} ---\n", module_name));
    }
    Ok(())
}

fn module_path(search_path: &Path, name: &str) -> PathBuf {
    search_path.join(format!("{}.wyn", name.replace("::", "/")))
}

/// Scans `source` line-by-line for `import <name>;` / `import <name>`
/// statements without lexing the whole file, so a single malformed later
/// statement can't hide an import from the pre-scan (spec.md §4.6 step 2
/// runs before the lexer/parser are even constructed).
fn scan_import_names(source: &str) -> Vec<String> {
    let mut names = Vec::new();
    for raw_line in source.lines() {
        let line = raw_line.trim();
        let Some(rest) = line.strip_prefix("import ") else {
            continue;
        };
        let name_part = rest
            .trim_end_matches(';')
            .split(|c: char| c == ':' || c == '{' || c.is_whitespace())
            .find(|s| !s.is_empty());
        if let Some(name) = name_part {
            names.push(name.to_string());
        }
    }
    names
}

/// Rewrites every top-level `fn`/`struct`/`enum` name (and an `export`
/// wrapping one of those) in `module_source` from `name` to
/// `module::name`, including the name's own recursive occurrences in the
/// body, via a plain identifier-boundary scan — no regex dependency needed
/// for a rewrite this mechanical.
fn qualify_exports(module_source: &str, module_name: &str) -> String {
    let (program, interner, _errors, _had_error) = wync_lang::parse(module_source);
    let mut exported_names: Vec<String> = Vec::new();
    collect_export_names(&program, &interner, &mut exported_names);

    if exported_names.is_empty() {
        return module_source.to_string();
    }
    rewrite_identifiers(module_source, &exported_names, module_name)
}

fn collect_export_names(block: &[Stmt], interner: &wync_base::Interner, out: &mut Vec<String>) {
    for stmt in block {
        match &stmt.kind {
            StmtKind::Export(inner) => collect_export_names(std::slice::from_ref(inner.as_ref()), interner, out),
            StmtKind::FunctionDef { name, .. } => push_name(*name, interner, out),
            StmtKind::StructDef { name, .. } => push_name(*name, interner, out),
            StmtKind::EnumDef { name, .. } => push_name(*name, interner, out),
            StmtKind::Module { body, .. } => collect_export_names(body, interner, out),
            _ => {}
        }
    }
}

fn push_name(sym: Symbol, interner: &wync_base::Interner, out: &mut Vec<String>) {
    let name = interner.resolve(sym).to_string();
    if !out.contains(&name) {
        out.push(name);
    }
}

fn rewrite_identifiers(source: &str, targets: &[String], module_name: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_alphabetic() || c == '_' {
            let start = i;
            let mut j = i + 1;
            while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
                j += 1;
            }
            let word: String = chars[start..j].iter().collect();
            if targets.iter().any(|t| t == &word) {
                out.push_str(module_name);
                out.push_str("::");
            }
            out.push_str(&word);
            i = j;
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn scan_import_names_finds_bare_and_semicolon_forms() {
        let names = scan_import_names("import geometry\nimport math;\nlet x = 1;");
        assert_eq!(names, vec!["geometry".to_string(), "math".to_string()]);
    }

    #[test]
    fn qualify_exports_renames_top_level_function_and_its_call_site() {
        let src = "fn area(w: int, h: int) -> int { return w * h }\nfn double_area(w: int, h: int) -> int { return area(w, h) * 2 }";
        let out = qualify_exports(src, "geometry");
        assert!(out.contains("fn geometry::area"));
        assert!(out.contains("geometry::area(w, h)"));
    }

    #[test]
    fn resolve_imports_splices_module_ahead_of_entry_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = fs::File::create(dir.path().join("geometry.wyn")).unwrap();
        writeln!(f, "fn area(w: int, h: int) -> int {{ return w * h }}").unwrap();

        let entry = "import geometry\nfn main() -> int { print(geometry::area(2, 3)); return 0 }";
        let combined = resolve_imports(entry, dir.path()).unwrap();
        assert!(combined.contains("fn geometry::area"));
        assert!(combined.contains("geometry::area(2, 3)"));
    }

    #[test]
    fn resolve_imports_leaves_builtin_modules_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let entry = "import math\nfn main() -> int { print(math.sqrt(4)); return 0 }";
        let combined = resolve_imports(entry, dir.path()).unwrap();
        assert_eq!(combined, entry);
    }
}
