#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use schemadoc::pages::find_by_gid;
use schemadoc::{AnnotateConfig, Annotated, DocumentationStore, PageRecord, annotate};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// Documentation directory populated per test and removed on drop.
pub struct DocsDir {
    dir: TempDir,
}

impl DocsDir {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new().context("allocating documentation dir")?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    pub fn store(&self) -> Result<DocumentationStore> {
        DocumentationStore::load_dir(self.dir.path())
    }
}

pub fn annotate_with(document: &Value, docs: &DocsDir) -> Result<Annotated> {
    let store = docs.store()?;
    Ok(annotate(document, &store, &AnnotateConfig::default())?)
}

pub fn annotate_bare(document: &Value) -> Result<Annotated> {
    Ok(annotate(
        document,
        &DocumentationStore::default(),
        &AnnotateConfig::default(),
    )?)
}

pub fn page<'a>(pages: &'a [PageRecord], gid: &str) -> &'a PageRecord {
    find_by_gid(pages, gid).unwrap_or_else(|| panic!("no page for gid {gid:?}"))
}

pub fn page_gids(pages: &[PageRecord]) -> Vec<&str> {
    pages.iter().map(|page| page.gid.as_str()).collect()
}

pub fn schemadoc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_schemadoc"))
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to spawn {:?}", cmd.get_program()))?;
    if !output.status.success() {
        bail!(
            "command {:?} failed: stdout={}, stderr={}",
            cmd.get_program(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}
