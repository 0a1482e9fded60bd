//! CLI entry point for the architecture lint.
//!
//! Lints `<workspace>/backend` by default; pass a crate directory as the
//! first argument to lint another checkout.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let outcome = resolve_backend_dir().and_then(|backend_dir| {
        architecture_lint::lint_backend_sources(&backend_dir)
            .map(|()| backend_dir)
            .map_err(|err| err.to_string())
    });

    match outcome {
        Ok(backend_dir) => {
            let _ = writeln!(
                io::stdout().lock(),
                "architecture lint passed for {}",
                backend_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(message) => {
            let _ = writeln!(io::stderr().lock(), "{message}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_backend_dir() -> Result<PathBuf, String> {
    if let Some(dir) = env::args_os().nth(1) {
        return Ok(PathBuf::from(dir));
    }

    let candidates = [
        env::var_os("CARGO_WORKSPACE_DIR").map(PathBuf::from),
        env::current_dir().ok(),
        Some(PathBuf::from(env!("CARGO_MANIFEST_DIR"))),
    ];
    candidates
        .iter()
        .flatten()
        .find_map(|start| workspace_root(start))
        .map(|root| root.join("backend"))
        .ok_or_else(|| "no Cargo.toml declaring [workspace] found above the working directory".to_owned())
}

fn workspace_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| {
            fs::read_to_string(dir.join("Cargo.toml"))
                .is_ok_and(|manifest| manifest.contains("[workspace]"))
        })
        .map(Path::to_path_buf)
}
