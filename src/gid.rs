//! Canonical identifiers (GIDs) for schema nodes.
//!
//! A node's path is a list of structural steps from the document root. The
//! GID is that path rendered as dot-separated segments, with the joining dot
//! dropped in front of bracketed array markers and parenthesized variant
//! markers (`foo.[*]` renders as `foo[*]`). Documentation authors target
//! records by this exact string, so the rendering must stay stable.

use crate::schema::NodeKind;

/// One structural step on the way from the root to a node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A standalone named type; resets the path.
    Named(String),
    Property(String),
    /// The single item schema of an array.
    Item,
    /// A tuple position, labelled by index or title slug.
    Tuple(String),
    /// The single `additionalProperties` schema of a map.
    Wildcard,
    /// One of several `additionalProperties` alternatives.
    Variant(String),
    /// One branch of `anyOf`/`oneOf`/`allOf`.
    Branch(String),
}

impl Segment {
    pub fn render(&self) -> String {
        match self {
            Segment::Named(name) | Segment::Property(name) => name.clone(),
            Segment::Item => "[*]".to_string(),
            Segment::Tuple(label) => format!("[{label}]"),
            Segment::Wildcard => "*".to_string(),
            Segment::Variant(slug) | Segment::Branch(slug) => format!("({slug})"),
        }
    }

    /// Plain segments name something; markers only describe how it was reached.
    pub fn is_marker(&self) -> bool {
        !matches!(self, Segment::Named(_) | Segment::Property(_))
    }

    fn url_part(&self) -> String {
        match self {
            Segment::Named(name) | Segment::Property(name) => name.replace('/', "-"),
            Segment::Item => "items".to_string(),
            Segment::Tuple(label) => format!("item-{label}"),
            Segment::Wildcard => "any".to_string(),
            Segment::Variant(slug) | Segment::Branch(slug) => slug.clone(),
        }
    }
}

/// Compute the path of a node from its arrival context.
///
/// A named type detaches from wherever it was reached; otherwise the step is
/// appended to the parent path, or the parent path is reused unchanged when no
/// step was supplied (the root).
pub fn assign_path(parent: &[Segment], step: Option<&Segment>, kind: &NodeKind) -> Vec<Segment> {
    if let NodeKind::NamedType(name) = kind {
        return vec![Segment::Named(name.clone())];
    }
    let mut path = parent.to_vec();
    if let Some(step) = step {
        path.push(step.clone());
    }
    path
}

pub fn gid_of(path: &[Segment]) -> String {
    let mut gid = String::new();
    for (idx, segment) in path.iter().enumerate() {
        let rendered = segment.render();
        if idx > 0 && !rendered.starts_with('[') && !rendered.starts_with('(') {
            gid.push('.');
        }
        gid.push_str(&rendered);
    }
    gid
}

/// Title for a node nobody documented: the GID tail starting at the last
/// plain segment, so a wildcard entry reads `settings.*` rather than `*`.
pub fn synthesize_title(path: &[Segment]) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let start = path
        .iter()
        .rposition(|segment| !segment.is_marker())
        .unwrap_or(0);
    Some(gid_of(&path[start..]))
}

pub fn page_url(prefix: &str, path: &[Segment]) -> String {
    let mut url = prefix.trim_end_matches('/').to_string();
    if path.is_empty() {
        url.push('/');
        return url;
    }
    for segment in path {
        url.push('/');
        url.push_str(&segment.url_part());
    }
    url
}

/// Label inside the trailing `open`..`close` marker of a GID, so `x(string)`
/// yields `string` and `pair[0]` yields `0`.
pub fn trailing_label(gid: &str, open: char, close: char) -> Option<&str> {
    let inner = gid.strip_suffix(close)?;
    let start = inner.rfind(open)?;
    let label = &inner[start + open.len_utf8()..];
    (!label.is_empty()).then_some(label)
}

/// Lowercase, dash-joined runs of ASCII alphanumerics. `None` when nothing
/// usable remains.
pub fn slugify(raw: &str) -> Option<String> {
    let slug = raw
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() { None } else { Some(slug) }
}
