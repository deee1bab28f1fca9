//! Options accepted by the `bootstrap` export.

use pagefx_core::PageConfig;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;

use crate::console::parse_level;

/// What `bootstrap` sets up. Every field is optional on the JS side.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BootstrapOptions {
    #[serde(flatten)]
    pub page: PageConfig,
    /// `"trace"` … `"error"` or `"off"`.
    pub log_level: Option<String>,
    pub waves: bool,
    pub marquees: bool,
    pub hover: bool,
    /// Rescale the root font size on window resize.
    pub root_font: bool,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            log_level: None,
            waves: true,
            marquees: true,
            hover: true,
            root_font: true,
        }
    }
}

impl BootstrapOptions {
    /// Requested log level; unknown names fall back to `INFO`.
    #[must_use]
    pub fn max_level(&self) -> LevelFilter {
        self.log_level
            .as_deref()
            .and_then(parse_level)
            .unwrap_or(LevelFilter::INFO)
    }
}
