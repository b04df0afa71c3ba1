//! Documentation store: authored titles, descriptions and examples keyed by GID.
//!
//! Records live one per file under a documentation directory (`*.yaml`,
//! `*.yml` or `*.json`). A record may declare its `gid`; otherwise the file
//! stem is used, so `docs/schema/settings.*.yaml` documents `settings.*`. The
//! store is loaded wholesale before a walk and never changes during one.

pub mod merge;

use crate::error::AnnotateError;
use crate::schema_loader::CompiledSchema;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const RECORD_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];
const INLINE_SOURCE: &str = "<inline>";

/// Shape every documentation record must satisfy before it is accepted.
const RECORD_CONTRACT: &str = r#"{
  "type": "object",
  "additionalProperties": false,
  "properties": {
    "gid": {"type": "string"},
    "title": {"type": "string"},
    "description": {"type": "string"},
    "examples": {
      "type": "array",
      "items": {
        "type": "object",
        "additionalProperties": false,
        "required": ["code"],
        "properties": {
          "description": {"type": "string"},
          "code": {"type": "string"},
          "language": {"type": "string"}
        }
      }
    }
  }
}"#;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<DocExample>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocExample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Clone, Debug)]
struct StoredEntry {
    entry: DocumentationEntry,
    source: PathBuf,
}

#[derive(Clone, Debug, Default)]
pub struct DocumentationStore {
    entries: BTreeMap<String, StoredEntry>,
}

impl DocumentationStore {
    /// Load every record under `dir`, validating each against the record
    /// contract. Two records claiming one GID abort the load.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            bail!("documentation directory {} does not exist", dir.display());
        }
        let contract = record_contract()?;
        let mut store = Self::default();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry =
                entry.with_context(|| format!("walking documentation directory {}", dir.display()))?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_record_file(path) {
                continue;
            }
            let raw = read_record(path)?;
            contract
                .validate(&raw)
                .with_context(|| format!("documentation record {} is malformed", path.display()))?;
            let record: DocumentationEntry = serde_json::from_value(raw)
                .with_context(|| format!("decoding documentation record {}", path.display()))?;
            let gid = match &record.gid {
                Some(gid) => gid.clone(),
                None => file_stem(path)?,
            };
            store.insert(gid, record, path.to_path_buf())?;
        }

        debug!(dir = %dir.display(), records = store.len(), "loaded documentation store");
        Ok(store)
    }

    /// Build a store from in-memory records; every record must carry a `gid`.
    pub fn from_entries(
        entries: impl IntoIterator<Item = DocumentationEntry>,
    ) -> Result<Self, AnnotateError> {
        let mut store = Self::default();
        for entry in entries {
            let gid = entry
                .gid
                .clone()
                .ok_or_else(|| AnnotateError::UntargetedRecord {
                    source_name: INLINE_SOURCE.to_string(),
                })?;
            store.insert(gid, entry, PathBuf::from(INLINE_SOURCE))?;
        }
        Ok(store)
    }

    fn insert(
        &mut self,
        gid: String,
        entry: DocumentationEntry,
        source: PathBuf,
    ) -> Result<(), AnnotateError> {
        if let Some(existing) = self.entries.get(&gid) {
            return Err(AnnotateError::DuplicateDocumentation {
                gid,
                first: existing.source.clone(),
                second: source,
            });
        }
        self.entries.insert(gid, StoredEntry { entry, source });
        Ok(())
    }

    pub fn get(&self, gid: &str) -> Option<&DocumentationEntry> {
        self.entries.get(gid).map(|stored| &stored.entry)
    }

    /// File a record was loaded from.
    pub fn source(&self, gid: &str) -> Option<&Path> {
        self.entries.get(gid).map(|stored| stored.source.as_path())
    }

    pub fn gids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Records whose GID no walked node carried.
    pub fn orphans<'a>(&'a self, used: &BTreeSet<String>) -> Vec<&'a str> {
        self.gids().filter(|gid| !used.contains(*gid)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn record_contract() -> Result<CompiledSchema> {
    let contract: Value =
        serde_json::from_str(RECORD_CONTRACT).context("parsing documentation record contract")?;
    CompiledSchema::compile(&contract)
}

fn is_record_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| RECORD_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

fn read_record(path: &Path) -> Result<Value> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading documentation record {}", path.display()))?;
    let is_json = path.extension().and_then(|ext| ext.to_str()) == Some("json");
    if is_json {
        serde_json::from_str(&data)
            .with_context(|| format!("parsing documentation record {}", path.display()))
    } else {
        serde_yaml::from_str(&data)
            .with_context(|| format!("parsing documentation record {}", path.display()))
    }
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .with_context(|| format!("documentation record {} has no usable file name", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn loads_yaml_and_json_records() {
        let temp = TempDocs::new();
        temp.write(
            "color.yaml",
            "title: Color\nexamples:\n  - code: \"#ff0000\"\n    language: yaml\n",
        );
        temp.write("nested/settings.*.json", r#"{"description": "Free-form settings."}"#);
        temp.write("notes.txt", "ignored");

        let store = DocumentationStore::load_dir(&temp.root).unwrap();
        assert_eq!(store.len(), 2);
        let color = store.get("color").unwrap();
        assert_eq!(color.title.as_deref(), Some("Color"));
        assert_eq!(color.examples[0].code, "#ff0000");
        assert_eq!(
            store.get("settings.*").unwrap().description.as_deref(),
            Some("Free-form settings.")
        );
    }

    #[test]
    fn declared_gid_overrides_file_stem() {
        let temp = TempDocs::new();
        temp.write("anything.yaml", "gid: sources.*.tls\ntitle: TLS\n");
        let store = DocumentationStore::load_dir(&temp.root).unwrap();
        assert!(store.get("anything").is_none());
        assert_eq!(store.get("sources.*.tls").unwrap().title.as_deref(), Some("TLS"));
    }

    #[test]
    fn duplicate_gid_is_a_hard_stop() {
        let temp = TempDocs::new();
        temp.write("color.yaml", "title: One\n");
        temp.write("other.yaml", "gid: color\ntitle: Two\n");
        let err = DocumentationStore::load_dir(&temp.root).unwrap_err();
        let err = err.downcast_ref::<AnnotateError>().expect("typed error");
        assert_eq!(err.gid(), "color");
    }

    #[test]
    fn contract_rejects_unknown_fields() {
        let temp = TempDocs::new();
        temp.write("color.yaml", "titel: Typo\n");
        let err = DocumentationStore::load_dir(&temp.root).unwrap_err();
        assert!(format!("{err:#}").contains("malformed"), "{err:#}");
    }

    #[test]
    fn orphans_are_unused_records() {
        let store = DocumentationStore::from_entries([
            DocumentationEntry {
                gid: Some("a".into()),
                ..Default::default()
            },
            DocumentationEntry {
                gid: Some("b".into()),
                ..Default::default()
            },
        ])
        .unwrap();
        let used = BTreeSet::from(["a".to_string()]);
        assert_eq!(store.orphans(&used), vec!["b"]);
    }

    #[test]
    fn inline_record_needs_a_gid() {
        let err = DocumentationStore::from_entries([DocumentationEntry {
            title: Some("Nowhere".into()),
            ..Default::default()
        }])
        .unwrap_err();
        assert!(matches!(err, AnnotateError::UntargetedRecord { .. }));
        assert_eq!(err.to_string(), "documentation record from <inline> declares no gid");
    }

    struct TempDocs {
        root: PathBuf,
    }

    impl TempDocs {
        fn new() -> Self {
            static COUNTER: AtomicUsize = AtomicUsize::new(0);
            let mut dir = std::env::temp_dir();
            dir.push(format!(
                "schemadoc-store-test-{}-{}",
                std::process::id(),
                COUNTER.fetch_add(1, Ordering::SeqCst)
            ));
            fs::create_dir_all(&dir).unwrap();
            Self { root: dir }
        }

        fn write(&self, relative: &str, contents: &str) {
            let path = self.root.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, contents).unwrap();
        }
    }

    impl Drop for TempDocs {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.root);
        }
    }
}
