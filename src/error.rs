//! Hard-stop failures raised while annotating a schema.
//!
//! Everything else (missing documentation, missing titles) degrades to a
//! synthesized fallback and never reaches this type.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AnnotateError {
    /// Two documentation records claim the same GID.
    #[error("duplicate documentation for gid '{gid}': {} and {}", .first.display(), .second.display())]
    DuplicateDocumentation {
        gid: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// An in-memory documentation record names no GID to attach to.
    #[error("documentation record from {source_name} declares no gid")]
    UntargetedRecord { source_name: String },

    /// A `$ref` pointer names nothing in the definitions table.
    #[error("unresolved reference '{pointer}' at gid '{gid}'")]
    UnresolvedReference { gid: String, pointer: String },

    /// A chain of `$ref` pointers loops without reaching a concrete node.
    #[error("reference cycle through '{pointer}' at gid '{gid}'")]
    ReferenceCycle { gid: String, pointer: String },

    /// Two structurally distinct nodes computed the same GID.
    #[error("gid '{gid}' assigned to two distinct schema nodes")]
    DuplicateGid { gid: String },

    /// The document is not shaped like a schema at all.
    #[error("invalid schema at '{location}': {message}")]
    InvalidSchema { location: String, message: String },
}

impl AnnotateError {
    pub fn invalid_schema(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            location: location.into(),
            message: message.into(),
        }
    }

    /// GID (or JSON location) the failure is attributed to; empty when the
    /// failure has no position.
    pub fn gid(&self) -> &str {
        match self {
            Self::DuplicateDocumentation { gid, .. }
            | Self::UnresolvedReference { gid, .. }
            | Self::ReferenceCycle { gid, .. }
            | Self::DuplicateGid { gid } => gid,
            Self::InvalidSchema { location, .. } => location,
            Self::UntargetedRecord { .. } => "",
        }
    }
}
