//! Schema annotation: canonical GIDs and documentation merge for generated
//! JSON Schemas.
//!
//! `annotate` is the one-call entry point: it loads the document into a
//! `SchemaGraph`, walks it with a `Walker`, and re-emits the document with
//! every reachable node named and documented, plus the flat page registry a
//! renderer consumes.

pub mod config;
pub mod docs;
pub mod error;
pub mod gid;
pub mod pages;
pub mod schema;
pub mod schema_loader;
pub mod walker;

pub use config::AnnotateConfig;
pub use docs::{DocExample, DocumentationEntry, DocumentationStore};
pub use error::AnnotateError;
pub use gid::{Segment, gid_of, slugify};
pub use pages::PageRecord;
pub use schema::{Annotation, NodeId, NodeKind, SchemaGraph};
pub use schema_loader::CompiledSchema;
pub use walker::{WalkOutcome, Walker};

use anyhow::{Result, bail};
use serde_json::Value;
use std::collections::BTreeSet;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::info;

/// Conventional documentation directory, relative to a project root.
pub const DOCS_SUBDIR: &str = "docs/schema";
const ENV_DOCS_DIR: &str = "SCHEMADOC_DOCS_DIR";

/// An annotated document and what the walk learned about it.
#[derive(Debug)]
pub struct Annotated {
    pub schema: Value,
    pub pages: Vec<PageRecord>,
    /// GIDs that matched a documentation record.
    pub documented: BTreeSet<String>,
}

impl Annotated {
    /// Documentation records no node claimed.
    pub fn orphans<'a>(&self, store: &'a DocumentationStore) -> Vec<&'a str> {
        store.orphans(&self.documented)
    }
}

/// Name every reachable node of `document` and merge `store` into it.
///
/// The input is left untouched; the annotated copy is returned.
pub fn annotate(
    document: &Value,
    store: &DocumentationStore,
    config: &AnnotateConfig,
) -> Result<Annotated, AnnotateError> {
    let graph = SchemaGraph::from_value(document)?;
    let outcome = Walker::new(&graph, store, config).walk()?;
    info!(
        nodes = graph.len(),
        pages = outcome.pages.len(),
        documented = outcome.documented.len(),
        "annotated schema"
    );
    Ok(Annotated {
        schema: graph.to_value(&outcome.annotations),
        pages: outcome.pages,
        documented: outcome.documented,
    })
}

fn docs_dir_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !hint_path.is_dir() {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        let candidate = dir.join(DOCS_SUBDIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the documentation directory.
///
/// Order: `SCHEMADOC_DOCS_DIR`, a `docs/schema` directory at or above the
/// working directory, then the build-time `SCHEMADOC_DOCS_DIR_HINT`.
pub fn find_docs_dir() -> Result<PathBuf> {
    if let Ok(env_dir) = env::var(ENV_DOCS_DIR) {
        if let Some(dir) = docs_dir_from_hint(&env_dir) {
            return Ok(dir);
        }
        bail!("{ENV_DOCS_DIR} points at {env_dir}, which is not a directory");
    }

    if let Ok(cwd) = env::current_dir() {
        if let Some(dir) = search_upwards(&cwd) {
            return Ok(dir);
        }
    }

    if let Some(hint) = option_env!("SCHEMADOC_DOCS_DIR_HINT") {
        if let Some(dir) = docs_dir_from_hint(hint) {
            return Ok(dir);
        }
    }

    bail!(
        "Unable to locate a documentation directory. Pass --docs or set {ENV_DOCS_DIR}."
    );
}
