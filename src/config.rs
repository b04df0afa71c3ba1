//! Annotation settings.
//!
//! Defaults suit the common case; the CLI overlays flags on top of the
//! `SCHEMADOC_*` environment variables read by `AnnotateConfig::from_env`.

use std::env;
use std::env::VarError;

pub const DEFAULT_SITE_URL: &str = "https://example.com";
pub const DEFAULT_EXAMPLE_LANGUAGE: &str = "yaml";

const ENV_SITE_URL: &str = "SCHEMADOC_SITE_URL";
const ENV_PRIMARY_TYPE: &str = "SCHEMADOC_PRIMARY_TYPE";
const ENV_URL_PREFIX: &str = "SCHEMADOC_URL_PREFIX";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotateConfig {
    /// Base that `](/documentation/...)` links are rewritten against.
    pub site_url: String,
    /// Named type the document root collapses onto.
    pub primary_type: Option<String>,
    /// Fence tag for examples that do not declare a language.
    pub default_language: String,
    /// Keep the structured example list on the node beside the rendered prose.
    pub keep_structured_examples: bool,
    /// Prepended to every page URL.
    pub url_prefix: String,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            primary_type: None,
            default_language: DEFAULT_EXAMPLE_LANGUAGE.to_string(),
            keep_structured_examples: false,
            url_prefix: String::new(),
        }
    }
}

impl AnnotateConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = env_non_empty(ENV_SITE_URL) {
            config.site_url = url;
        }
        config.primary_type = env_non_empty(ENV_PRIMARY_TYPE);
        if let Some(prefix) = env_non_empty(ENV_URL_PREFIX) {
            config.url_prefix = prefix;
        }
        config
    }

    pub(crate) fn site_base(&self) -> &str {
        self.site_url.trim_end_matches('/')
    }
}

pub(crate) fn env_non_empty(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Some(value),
        Ok(_) => None,
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(os)) => Some(os.to_string_lossy().into_owned()),
    }
}
