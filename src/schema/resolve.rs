//! Cross-reference resolution and union flattening.

use super::{NodeId, SchemaGraph};
use crate::error::AnnotateError;
use std::collections::BTreeSet;

const POINTER_PREFIXES: [&str; 2] = ["#/$defs/", "#/definitions/"];

impl SchemaGraph {
    /// Definition a pointer names, if any.
    pub fn lookup(&self, pointer: &str) -> Option<NodeId> {
        let name = POINTER_PREFIXES
            .iter()
            .find_map(|prefix| pointer.strip_prefix(prefix))
            .unwrap_or(pointer);
        let name = name.replace("~1", "/").replace("~0", "~");
        self.definition(&name)
    }

    /// Follow `$ref` pointers from `id` until a concrete node is reached.
    ///
    /// `gid` names the arrival site for error reporting.
    pub fn resolve(&self, id: NodeId, gid: &str) -> Result<NodeId, AnnotateError> {
        let mut current = id;
        let mut seen = BTreeSet::new();
        while let Some(pointer) = self.node(current).reference.as_deref() {
            if !seen.insert(current) {
                return Err(AnnotateError::ReferenceCycle {
                    gid: gid.to_string(),
                    pointer: pointer.to_string(),
                });
            }
            current = self
                .lookup(pointer)
                .ok_or_else(|| AnnotateError::UnresolvedReference {
                    gid: gid.to_string(),
                    pointer: pointer.to_string(),
                })?;
        }
        Ok(current)
    }

    /// Lift the branches of wrapper unions into the parent union.
    ///
    /// A branch that resolves to an anonymous node holding nothing but another
    /// union would otherwise surface as an undocumentable page of its own.
    pub fn flatten_union(&self, branches: &[NodeId], gid: &str) -> Result<Vec<NodeId>, AnnotateError> {
        let mut out = Vec::with_capacity(branches.len());
        let mut expanding = BTreeSet::new();
        self.flatten_into(branches, gid, &mut expanding, &mut out)?;
        Ok(out)
    }

    fn flatten_into(
        &self,
        branches: &[NodeId],
        gid: &str,
        expanding: &mut BTreeSet<NodeId>,
        out: &mut Vec<NodeId>,
    ) -> Result<(), AnnotateError> {
        for &branch in branches {
            let target = self.resolve(branch, gid)?;
            match self.node(target).wrapped_union() {
                Some(inner) if expanding.insert(target) => {
                    self.flatten_into(inner, gid, expanding, out)?;
                    expanding.remove(&target);
                }
                _ => out.push(branch),
            }
        }
        Ok(())
    }
}
