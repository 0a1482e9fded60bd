//! Hexagonal boundary checks for the user directory backend.
//!
//! The backend splits into three layers under `backend/src`:
//!
//! - `domain`: entities, schema validation, ports and the directory service
//! - `inbound`: HTTP handlers that translate requests into service calls
//! - `outbound`: the Diesel and in-memory user gateways
//!
//! Every `use` item and path expression in a layer is resolved to either a
//! sibling layer or an external crate and checked against [`RULES`]. Only the
//! outbound layer may touch the datastore crates, and only the inbound layer
//! may touch the web framework.
//!
//! Run it with `cargo run -p architecture-lint` from the workspace root.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use syn::visit::Visit;

/// Library crate name used in absolute paths such as `user_directory::domain`.
const CRATE_NAME: &str = "user_directory";

const DATASTORE_CRATES: &[&str] = &[
    "bb8",
    "diesel",
    "diesel_async",
    "diesel_migrations",
    "pg_embedded_setup_unpriv",
    "postgres",
];

const WEB_CRATES: &[&str] = &["actix", "actix_web", "utoipa", "utoipa_swagger_ui"];

/// An architectural layer, named after its top-level module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    /// Entities, ports and services.
    Domain,
    /// Driving adapters.
    Inbound,
    /// Driven adapters.
    Outbound,
}

impl Layer {
    const ALL: [Self; 3] = [Self::Domain, Self::Inbound, Self::Outbound];

    /// Module name of the layer.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layer| layer.name() == segment)
    }

    /// Layer owning a file path relative to `backend/src`.
    #[must_use]
    pub fn of_file(relative_path: &Path) -> Option<Self> {
        let first = relative_path.components().next()?;
        Self::from_segment(first.as_os_str().to_str()?)
    }
}

/// Dependencies a layer may not take.
#[derive(Debug)]
pub struct Rule {
    /// Layer the rule applies to.
    pub layer: Layer,
    /// Sibling layers it must not import.
    pub forbidden_layers: &'static [Layer],
    /// Groups of external crates it must not import.
    pub forbidden_crates: &'static [&'static [&'static str]],
}

impl Rule {
    fn forbids_crate(&self, name: &str) -> bool {
        self.forbidden_crates
            .iter()
            .any(|group| group.contains(&name))
    }

    fn check(&self, dependency: &Dependency) -> Option<String> {
        let layer = self.layer.name();
        match dependency {
            Dependency::Layer(target) if self.forbidden_layers.contains(target) => Some(format!(
                "{layer} module must not depend on crate::{}",
                target.name()
            )),
            Dependency::Crate(name) if self.forbids_crate(name) => Some(format!(
                "{layer} module must not depend on external crate `{name}`"
            )),
            _ => None,
        }
    }
}

/// Boundary rules, one per layer.
pub static RULES: [Rule; 3] = [
    Rule {
        layer: Layer::Domain,
        forbidden_layers: &[Layer::Inbound, Layer::Outbound],
        forbidden_crates: &[DATASTORE_CRATES, WEB_CRATES],
    },
    Rule {
        layer: Layer::Inbound,
        forbidden_layers: &[Layer::Outbound],
        forbidden_crates: &[DATASTORE_CRATES],
    },
    Rule {
        layer: Layer::Outbound,
        forbidden_layers: &[Layer::Inbound],
        forbidden_crates: &[WEB_CRATES],
    },
];

fn rule_for(layer: Layer) -> &'static Rule {
    match layer {
        Layer::Domain => &RULES[0],
        Layer::Inbound => &RULES[1],
        Layer::Outbound => &RULES[2],
    }
}

/// A single boundary violation discovered by the linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `backend/src`.
    pub file: PathBuf,
    /// Human-readable description of the violated rule.
    pub message: String,
    /// First offending path, joined with `::`.
    pub path: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (via `{}`)",
            self.file.display(),
            self.message,
            self.path
        )
    }
}

/// Failure modes returned by the architecture lint.
#[derive(Debug)]
pub enum ArchitectureLintError {
    /// Filesystem traversal or reading failed.
    Io(io::Error),
    /// A file could not be parsed or placed in a layer.
    Parse { file: PathBuf, message: String },
    /// One or more boundary violations were found.
    Violations(Vec<Violation>),
}

impl fmt::Display for ArchitectureLintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "architecture lint could not read sources: {err}"),
            Self::Parse { file, message } => {
                write!(f, "architecture lint rejected {}: {message}", file.display())
            }
            Self::Violations(violations) => {
                writeln!(f, "{} architecture boundary violation(s):", violations.len())?;
                violations
                    .iter()
                    .try_for_each(|violation| writeln!(f, "  {violation}"))
            }
        }
    }
}

impl std::error::Error for ArchitectureLintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::Io(err) = self {
            Some(err)
        } else {
            None
        }
    }
}

impl From<io::Error> for ArchitectureLintError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `backend/src`.
    pub file: PathBuf,
    pub contents: String,
}

/// Lint the layered modules under `backend_dir/src`.
///
/// # Errors
/// Returns [`ArchitectureLintError::Violations`] when any rule is broken, or
/// an I/O or parse error when a source cannot be read.
pub fn lint_backend_sources(backend_dir: &Path) -> Result<(), ArchitectureLintError> {
    let src_dir = backend_dir.join("src");
    let mut sources = Vec::new();
    for layer in Layer::ALL {
        let dir = src_dir.join(layer.name());
        if dir.is_dir() {
            read_sources(&src_dir, &dir, &mut sources)?;
        }
    }
    lint_sources(&sources)
}

/// Lint in-memory sources whose paths are relative to `backend/src`.
///
/// # Errors
/// See [`lint_backend_sources`].
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();
    for source in sources {
        violations.extend(lint_source(source)?);
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

fn lint_source(source: &LintSource) -> Result<Vec<Violation>, ArchitectureLintError> {
    let parse_error = |message: String| ArchitectureLintError::Parse {
        file: source.file.clone(),
        message,
    };
    let layer = Layer::of_file(&source.file)
        .ok_or_else(|| parse_error("file is outside the domain, inbound and outbound layers".to_owned()))?;
    let parsed = syn::parse_file(&source.contents).map_err(|err| parse_error(err.to_string()))?;

    let mut collector = PathCollector::default();
    collector.visit_file(&parsed);

    let rule = rule_for(layer);
    let mut first_offender: BTreeMap<String, String> = BTreeMap::new();
    for segments in collector.paths {
        if let Some(message) = rule.check(&Dependency::classify(&segments)) {
            first_offender
                .entry(message)
                .or_insert_with(|| segments.join("::"));
        }
    }

    Ok(first_offender
        .into_iter()
        .map(|(message, path)| Violation {
            file: source.file.clone(),
            message,
            path,
        })
        .collect())
}

/// What a path resolves to from inside the backend crate.
#[derive(Debug, PartialEq, Eq)]
enum Dependency {
    Layer(Layer),
    Crate(String),
    Unresolved,
}

impl Dependency {
    fn classify(segments: &[String]) -> Self {
        let mut rest = segments.iter().map(String::as_str);
        let Some(first) = rest.next() else {
            return Self::Unresolved;
        };
        if let Some(layer) = Layer::from_segment(first) {
            return Self::Layer(layer);
        }
        if first == CRATE_NAME || is_relative(first) {
            return rest
                .find(|segment| !is_relative(segment))
                .and_then(Layer::from_segment)
                .map_or(Self::Unresolved, Self::Layer);
        }
        Self::Crate(first.to_owned())
    }
}

fn is_relative(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super")
}

/// Gathers every path mentioned by `use` items and expressions.
#[derive(Default)]
struct PathCollector {
    paths: Vec<Vec<String>>,
}

impl PathCollector {
    fn flatten_use(&mut self, root: &syn::UseTree) {
        let mut pending = vec![(Vec::new(), root)];
        while let Some((mut prefix, tree)) = pending.pop() {
            match tree {
                syn::UseTree::Path(path) => {
                    prefix.push(path.ident.to_string());
                    pending.push((prefix, &*path.tree));
                }
                syn::UseTree::Name(syn::UseName { ident })
                | syn::UseTree::Rename(syn::UseRename { ident, .. }) => {
                    prefix.push(ident.to_string());
                    self.paths.push(prefix);
                }
                syn::UseTree::Glob(_) => {
                    prefix.push("*".to_owned());
                    self.paths.push(prefix);
                }
                syn::UseTree::Group(group) => {
                    pending.extend(group.items.iter().map(|item| (prefix.clone(), item)));
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for PathCollector {
    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.flatten_use(&node.tree);
    }

    fn visit_path(&mut self, node: &'ast syn::Path) {
        if !node.segments.is_empty() {
            self.paths
                .push(node.segments.iter().map(|s| s.ident.to_string()).collect());
        }
        syn::visit::visit_path(self, node);
    }
}

fn read_sources(
    src_root: &Path,
    dir: &Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            read_sources(src_root, &path, sources)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            let file = path
                .strip_prefix(src_root)
                .map_err(|err| ArchitectureLintError::Parse {
                    file: path.clone(),
                    message: err.to_string(),
                })?
                .to_path_buf();
            let contents = fs::read_to_string(&path)?;
            sources.push(LintSource { file, contents });
        }
    }
    Ok(())
}
