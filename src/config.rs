use serde::{Deserialize, Serialize};

use crate::script::DEFAULT_SCRIPT_LANG;

/// Largest `from + size` the engine serves by default
pub const DEFAULT_MAX_WINDOW: u64 = 10_000;

/// Defaults applied when assembling request bodies
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestSettings {
    /// Page size given to new builders, if any
    #[serde(default)]
    pub default_size: Option<u64>,
    /// Upper limit for `from + size`
    #[serde(default = "default_max_window")]
    pub max_window: u64,
    /// Language for scripts built from these settings
    #[serde(default = "default_script_lang")]
    pub script_lang: String,
    /// Render JSON with indentation
    #[serde(default)]
    pub pretty: bool,
}

fn default_max_window() -> u64 {
    DEFAULT_MAX_WINDOW
}

fn default_script_lang() -> String {
    DEFAULT_SCRIPT_LANG.to_string()
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            default_size: None,
            max_window: DEFAULT_MAX_WINDOW,
            script_lang: DEFAULT_SCRIPT_LANG.to_string(),
            pretty: false,
        }
    }
}

impl RequestSettings {
    /// Set the default page size
    pub fn with_default_size(mut self, size: u64) -> Self {
        self.default_size = Some(size);
        self
    }

    /// Set the result window limit
    pub fn with_max_window(mut self, max_window: u64) -> Self {
        self.max_window = max_window;
        self
    }

    /// Set the script language
    pub fn with_script_lang(mut self, lang: impl Into<String>) -> Self {
        self.script_lang = lang.into();
        self
    }

    /// Enable or disable pretty printing
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}
