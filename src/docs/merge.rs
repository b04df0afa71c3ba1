//! Overlay authored documentation onto a schema node.

use super::{DocExample, DocumentationStore};
use crate::config::AnnotateConfig;
use crate::gid::{Segment, synthesize_title};
use crate::schema::{Annotation, SchemaNode};
use serde_json::{Map, Value};

const INTERNAL_LINK: &str = "](/documentation/";
const EXAMPLES_HEADING: &str = "## Examples";

/// Result of merging one node.
#[derive(Clone, Debug, PartialEq)]
pub struct Merged {
    pub annotation: Annotation,
    /// Whether a documentation record matched the GID.
    pub matched: bool,
}

/// Compute the annotation for `node` reached at `path` under `gid`.
///
/// A matching record overwrites title and description when it provides them
/// and appends its rendered examples. Without a record, an untitled node gets
/// a title synthesized from its path.
pub fn merge(
    node: &SchemaNode,
    gid: &str,
    path: &[Segment],
    store: &DocumentationStore,
    config: &AnnotateConfig,
) -> Merged {
    let Some(entry) = store.get(gid) else {
        let title = node.title.clone().or_else(|| synthesize_title(path));
        return Merged {
            annotation: Annotation {
                gid: gid.to_string(),
                title,
                description: node.description.clone(),
                examples: None,
            },
            matched: false,
        };
    };

    let title = entry
        .title
        .clone()
        .or_else(|| node.title.clone())
        .or_else(|| synthesize_title(path));

    let mut description = entry
        .description
        .as_deref()
        .map(|text| rewrite_links(text, config))
        .or_else(|| node.description.clone());

    if !entry.examples.is_empty() {
        let section = render_examples(&entry.examples, config);
        description = Some(match description {
            Some(text) if !text.trim().is_empty() => {
                format!("{}\n\n{section}", text.trim_end())
            }
            _ => section,
        });
    }

    let examples = if config.keep_structured_examples && !entry.examples.is_empty() {
        Some(structured_examples(&entry.examples))
    } else {
        None
    };

    Merged {
        annotation: Annotation {
            gid: gid.to_string(),
            title,
            description,
            examples,
        },
        matched: true,
    }
}

/// Point internal documentation links at the published site.
pub fn rewrite_links(text: &str, config: &AnnotateConfig) -> String {
    text.replace(
        INTERNAL_LINK,
        &format!("]({}/documentation/", config.site_base()),
    )
}

/// Render examples as prose followed by fenced code blocks.
pub fn render_examples(examples: &[DocExample], config: &AnnotateConfig) -> String {
    let mut blocks = vec![EXAMPLES_HEADING.to_string()];
    for example in examples {
        if let Some(blurb) = example.description.as_deref().map(str::trim) {
            if !blurb.is_empty() {
                blocks.push(rewrite_links(blurb, config));
            }
        }
        let language = example
            .language
            .as_deref()
            .unwrap_or(&config.default_language);
        blocks.push(format!(
            "```{language}\n{}\n```",
            example.code.trim_end_matches('\n')
        ));
    }
    blocks.join("\n\n")
}

/// Examples as data, for renderers that style them separately.
fn structured_examples(examples: &[DocExample]) -> Value {
    let entries = examples.iter().map(|example| {
        let mut fields = Map::new();
        if let Some(description) = &example.description {
            fields.insert("description".to_string(), Value::String(description.clone()));
        }
        fields.insert("code".to_string(), Value::String(example.code.clone()));
        if let Some(language) = &example.language {
            fields.insert("language".to_string(), Value::String(language.clone()));
        }
        Value::Object(fields)
    });
    Value::Array(entries.collect())
}
