//! Depth-first walk that names every reachable node and merges documentation.
//!
//! At each node the walker resolves cross-references, consults the visited
//! set, assigns the node's path and GID, merges documentation, records a page
//! and descends into `items`, `properties`, `additionalProperties` and the
//! union keywords, in that order. The visited set is keyed by `NodeId`, so a
//! shared definition reached from many places is expanded exactly once and
//! self-referential types terminate. The graph itself is never mutated; the
//! walk returns annotations for `SchemaGraph::to_value` to apply.

use crate::config::AnnotateConfig;
use crate::docs::DocumentationStore;
use crate::docs::merge::merge;
use crate::error::AnnotateError;
use crate::gid::{Segment, assign_path, gid_of, page_url, slugify, trailing_label};
use crate::pages::PageRecord;
use crate::schema::{Additional, Annotation, Items, NodeId, SchemaGraph};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, trace, warn};

#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub annotations: BTreeMap<NodeId, Annotation>,
    /// Pages in the order nodes were first expanded.
    pub pages: Vec<PageRecord>,
    /// GIDs that matched a documentation record.
    pub documented: BTreeSet<String>,
}

#[derive(Default)]
struct WalkState {
    visited: HashSet<NodeId>,
    owners: HashMap<String, NodeId>,
    outcome: WalkOutcome,
}

/// Where a child was reached from.
struct Parent {
    path: Vec<Segment>,
    url: String,
    key: String,
    gid: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LabelSource {
    /// Title, then index. Tuple positions.
    Position,
    /// Title, type name, then schema type, then index. Variants and branches.
    Variant,
}

impl LabelSource {
    fn markers(self) -> (char, char) {
        match self {
            LabelSource::Position => ('[', ']'),
            LabelSource::Variant => ('(', ')'),
        }
    }
}

pub struct Walker<'a> {
    graph: &'a SchemaGraph,
    store: &'a DocumentationStore,
    config: &'a AnnotateConfig,
}

impl<'a> Walker<'a> {
    pub fn new(
        graph: &'a SchemaGraph,
        store: &'a DocumentationStore,
        config: &'a AnnotateConfig,
    ) -> Self {
        Self {
            graph,
            store,
            config,
        }
    }

    pub fn walk(&self) -> Result<WalkOutcome, AnnotateError> {
        let mut state = WalkState::default();
        let root = self.graph.resolve(self.graph.root(), "")?;
        let root_node = self.graph.node(root);

        // The root collapses onto its primary named type so the two never
        // surface as separate pages with duplicate content.
        let primary = self
            .config
            .primary_type
            .clone()
            .or_else(|| root_node.kind.name().map(str::to_string));
        let path = match &primary {
            Some(name) => vec![Segment::Named(name.clone())],
            None => assign_path(&[], None, &root_node.kind),
        };

        if let Some(name) = &self.config.primary_type {
            match self.graph.definition(name) {
                Some(definition) => {
                    let definition = self.graph.resolve(definition, name)?;
                    if definition != root {
                        debug!(primary = %name, "root stands in for primary type definition");
                        state.visited.insert(definition);
                    }
                }
                None => warn!(primary = %name, "primary type has no definition"),
            }
        }

        self.expand(&mut state, root, path, primary.unwrap_or_default(), None, false)?;
        Ok(state.outcome)
    }

    fn visit(
        &self,
        state: &mut WalkState,
        site: NodeId,
        parent: &Parent,
        step: Segment,
        required: bool,
    ) -> Result<(), AnnotateError> {
        let mut site_path = parent.path.clone();
        site_path.push(step.clone());
        let id = self.graph.resolve(site, &gid_of(&site_path))?;
        if state.visited.contains(&id) {
            trace!(site = %gid_of(&site_path), "already expanded");
            return Ok(());
        }
        let path = assign_path(&parent.path, Some(&step), &self.graph.node(id).kind);
        self.expand(state, id, path, step.render(), Some(parent), required)
    }

    fn expand(
        &self,
        state: &mut WalkState,
        id: NodeId,
        path: Vec<Segment>,
        key: String,
        parent: Option<&Parent>,
        required: bool,
    ) -> Result<(), AnnotateError> {
        let node = self.graph.node(id);
        state.visited.insert(id);

        // A node documented by a previous run keeps the name it was given.
        let carried = node.documented && node.stored_gid.is_some();
        let gid = match (&node.stored_gid, carried) {
            (Some(stored), true) => stored.clone(),
            _ => gid_of(&path),
        };

        match state.owners.get(&gid) {
            Some(owner) if *owner != id => {
                return Err(AnnotateError::DuplicateGid { gid });
            }
            Some(_) => {}
            None => {
                state.owners.insert(gid.clone(), id);
            }
        }

        let annotation = if carried {
            if self.store.get(&gid).is_some() {
                state.outcome.documented.insert(gid.clone());
            }
            Annotation {
                gid: gid.clone(),
                title: node.title.clone(),
                description: node.description.clone(),
                examples: None,
            }
        } else {
            let merged = merge(node, &gid, &path, self.store, self.config);
            if merged.matched {
                state.outcome.documented.insert(gid.clone());
            }
            merged.annotation
        };

        let url = page_url(&self.config.url_prefix, &path);
        debug!(gid = %gid, url = %url, "page");
        state.outcome.pages.push(PageRecord {
            gid: gid.clone(),
            url: url.clone(),
            key: key.clone(),
            parent_url: parent.map(|p| p.url.clone()),
            parent_key: parent.map(|p| p.key.clone()),
            required,
            title: annotation.title.clone(),
        });
        state.outcome.annotations.insert(id, annotation);

        let at_root = parent.is_none();
        let here = Parent {
            path,
            url,
            key,
            gid,
        };

        match &node.items {
            Some(Items::Single(child)) => {
                self.visit(state, *child, &here, Segment::Item, false)?;
            }
            Some(Items::Tuple(children)) => {
                let labels = self.labels(children, &here.gid, LabelSource::Position)?;
                for (child, label) in children.iter().zip(labels) {
                    self.visit(state, *child, &here, Segment::Tuple(label), false)?;
                }
            }
            None => {}
        }

        for (name, child) in &node.properties {
            let required = node.required.contains(name);
            self.visit(state, *child, &here, Segment::Property(name.clone()), required)?;
        }

        match &node.additional {
            Some(Additional::Single(child)) => {
                self.visit(state, *child, &here, Segment::Wildcard, false)?;
            }
            Some(Additional::Alternatives(children)) => {
                let labels = self.labels(children, &here.gid, LabelSource::Variant)?;
                for (child, label) in children.iter().zip(labels) {
                    self.visit(state, *child, &here, Segment::Variant(label), false)?;
                }
            }
            Some(Additional::Allowed(_)) | None => {}
        }

        // Branches of every union keyword share one label namespace.
        let mut branches = Vec::new();
        for members in node.unions.values() {
            branches.extend(self.graph.flatten_union(members, &here.gid)?);
        }
        let labels = self.labels(&branches, &here.gid, LabelSource::Variant)?;
        for (branch, label) in branches.iter().zip(labels) {
            let target = self.graph.resolve(*branch, &here.gid)?;
            let step = match self.graph.node(target).kind.name() {
                Some(name) if at_root => Segment::Named(name.to_string()),
                _ => Segment::Branch(label),
            };
            self.visit(state, *branch, &here, step, false)?;
        }

        Ok(())
    }

    /// Distinguishing labels for sibling alternatives, unique within `ids`.
    ///
    /// A node documented by a previous run reuses the label of its stored GID.
    fn labels(
        &self,
        ids: &[NodeId],
        gid: &str,
        source: LabelSource,
    ) -> Result<Vec<String>, AnnotateError> {
        let mut used = HashSet::new();
        let mut labels = Vec::with_capacity(ids.len());
        for (idx, id) in ids.iter().enumerate() {
            let node = self.graph.node(self.graph.resolve(*id, gid)?);
            let (open, close) = source.markers();
            let carried = node
                .stored_gid
                .as_deref()
                .filter(|_| node.documented)
                .and_then(|stored| trailing_label(stored, open, close));
            if let Some(label) = carried {
                used.insert(label.to_string());
                labels.push(label.to_string());
                continue;
            }
            let mut base = node.title.as_deref().and_then(slugify);
            if source == LabelSource::Variant {
                base = base
                    .or_else(|| node.kind.name().and_then(slugify))
                    .or_else(|| node.schema_type().and_then(slugify));
            }
            let base = base.unwrap_or_else(|| idx.to_string());
            let label = if used.contains(&base) {
                format!("{base}-{idx}")
            } else {
                base
            };
            used.insert(label.clone());
            labels.push(label);
        }
        Ok(labels)
    }
}
