//! Script value object shared by aggregations that run computations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::config::RequestSettings;

/// Script language used when none is given
pub const DEFAULT_SCRIPT_LANG: &str = "painless";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct ScriptSpec {
    source: String,
    lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Map<String, Value>>,
}

/// A named computation: source code, language and parameters
///
/// Scripts are immutable. Cloning shares the underlying data; the `with_*`
/// methods return a new value without touching other holders of the same
/// script.
///
/// # Example
///
/// ```rust
/// use queryforge::Script;
/// use serde_json::json;
///
/// let script = Script::new("doc['duration'].value / 1000");
/// assert_eq!(script.lang(), "painless");
/// assert_eq!(
///     script.to_dsl(),
///     json!({"source": "doc['duration'].value / 1000", "lang": "painless"})
/// );
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Script {
    spec: Arc<ScriptSpec>,
}

impl Script {
    /// Create a script in the default language
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            spec: Arc::new(ScriptSpec {
                source: source.into(),
                lang: DEFAULT_SCRIPT_LANG.to_string(),
                params: None,
            }),
        }
    }

    /// Create a script in the language configured by `settings`
    pub fn with_settings(source: impl Into<String>, settings: &RequestSettings) -> Self {
        Self::new(source).with_lang(settings.script_lang.clone())
    }

    /// Copy of this script in another language
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.spec).lang = lang.into();
        self
    }

    /// Copy of this script with `params`; the map is owned by the script from here on
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        Arc::make_mut(&mut self.spec).params = Some(params);
        self
    }

    pub fn source(&self) -> &str {
        &self.spec.source
    }

    pub fn lang(&self) -> &str {
        &self.spec.lang
    }

    pub fn params(&self) -> Option<&Map<String, Value>> {
        self.spec.params.as_ref()
    }

    /// Check whether two scripts share the same underlying data
    pub fn ptr_eq(&self, other: &Script) -> bool {
        Arc::ptr_eq(&self.spec, &other.spec)
    }

    /// Serialize as `{"source", "lang", "params"?}`
    pub fn to_dsl(&self) -> Value {
        let mut map = Map::new();
        map.insert("source".to_string(), Value::from(self.spec.source.as_str()));
        map.insert("lang".to_string(), Value::from(self.spec.lang.as_str()));
        if let Some(params) = &self.spec.params {
            map.insert("params".to_string(), Value::Object(params.clone()));
        }
        Value::Object(map)
    }
}

impl From<&str> for Script {
    fn from(source: &str) -> Self {
        Script::new(source)
    }
}

impl From<String> for Script {
    fn from(source: String) -> Self {
        Script::new(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_lang() {
        let script = Script::new("return 1");
        assert_eq!(script.lang(), DEFAULT_SCRIPT_LANG);
        assert!(script.params().is_none());
    }

    #[test]
    fn test_params_serialized() {
        let mut params = Map::new();
        params.insert("threshold".to_string(), json!(10));
        let script = Script::new("params.threshold < 5").with_params(params);

        assert_eq!(
            script.to_dsl(),
            json!({
                "source": "params.threshold < 5",
                "lang": "painless",
                "params": {"threshold": 10}
            })
        );
    }

    #[test]
    fn test_params_owned_by_script() {
        let mut params = Map::new();
        params.insert("factor".to_string(), json!(2));
        let script = Script::new("x").with_params(params.clone());

        params.insert("factor".to_string(), json!(99));
        assert_eq!(script.params().unwrap()["factor"], json!(2));
    }

    #[test]
    fn test_clone_shares_and_with_copies() {
        let script = Script::new("x");
        let shared = script.clone();
        assert!(script.ptr_eq(&shared));

        let expression = shared.with_lang("expression");
        assert_eq!(script.lang(), "painless");
        assert_eq!(expression.lang(), "expression");
    }

    #[test]
    fn test_with_settings() {
        let settings = RequestSettings::default().with_script_lang("mustache");
        assert_eq!(Script::with_settings("{{x}}", &settings).lang(), "mustache");
    }
}
