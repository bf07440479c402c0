//! Shared types used across the build phases.
//!
//! An instance moves through three shapes, each the only input of the next
//! phase:
//!
//! ```text
//! InstanceSeed    (expand)      key, locale, params, optional data
//! LoadedInstance  (load data)   + data from the route's loader
//! RouteInstance   (resolve)     + permalink and output path
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Value of one URL parameter.
///
/// Single placeholders (`[slug]`) take a [`ParamValue::Single`]; catch-all
/// placeholders (`[...path]`) take the ordered [`ParamValue::Segments`] they
/// expand to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    Segments(Vec<String>),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Single(value) => f.write_str(value),
            ParamValue::Segments(segments) => f.write_str(&segments.join("/")),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(segments: Vec<String>) -> Self {
        ParamValue::Segments(segments)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(segments: Vec<&str>) -> Self {
        ParamValue::Segments(segments.into_iter().map(String::from).collect())
    }
}

/// Placeholder name → value.
pub type Params = BTreeMap<String, ParamValue>;

/// One instance a route should produce, as returned by an instance provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSeed {
    /// Logical page identity shared by the locale variants of one page.
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default)]
    pub params: Params,
    /// Data known up front; the default loader passes it through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl InstanceSeed {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            locale: None,
            params: Params::new(),
            data: None,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// A seed whose data has been loaded. Permalinks are computed from this.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedInstance {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub params: Params,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl LoadedInstance {
    /// Attach loaded data to a seed, replacing whatever data it carried.
    pub fn from_seed(seed: InstanceSeed, data: Option<Value>) -> Self {
        Self {
            key: seed.key,
            locale: seed.locale,
            params: seed.params,
            data,
        }
    }
}

/// A fully resolved rendering unit of a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteInstance {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub params: Params,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// User-facing URL, e.g. `/es/blog/hello/`.
    pub permalink: String,
    /// Output path relative to the output directory, e.g. `/es/blog/hello/index.html`.
    pub output: String,
}

impl RouteInstance {
    pub fn new(loaded: LoadedInstance, permalink: String, output: String) -> Self {
        Self {
            key: loaded.key,
            locale: loaded.locale,
            params: loaded.params,
            data: loaded.data,
            permalink,
            output,
        }
    }

    /// String field of the instance data, e.g. `title`.
    pub fn data_str(&self, field: &str) -> Option<&str> {
        self.data.as_ref()?.get(field)?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn param_value_display() {
        assert_eq!(ParamValue::from("hello").to_string(), "hello");
        assert_eq!(ParamValue::from(vec!["a", "b", "c"]).to_string(), "a/b/c");
    }

    #[test]
    fn param_value_deserializes_untagged() {
        let params: Params = toml::from_str(
            r#"
slug = "hello"
path = ["guides", "install"]
"#,
        )
        .unwrap();
        assert_eq!(params["slug"], ParamValue::Single("hello".into()));
        assert_eq!(
            params["path"],
            ParamValue::Segments(vec!["guides".into(), "install".into()])
        );
    }

    #[test]
    fn seed_builder_methods() {
        let seed = InstanceSeed::new("post")
            .with_locale("es")
            .with_param("slug", "hola")
            .with_data(json!({"title": "Hola"}));
        assert_eq!(seed.key, "post");
        assert_eq!(seed.locale.as_deref(), Some("es"));
        assert_eq!(seed.params["slug"], ParamValue::from("hola"));
        assert_eq!(seed.data, Some(json!({"title": "Hola"})));
    }

    #[test]
    fn seed_deserializes_with_defaults() {
        let seed: InstanceSeed = serde_json::from_value(json!({"key": "home"})).unwrap();
        assert_eq!(seed, InstanceSeed::new("home"));
    }

    #[test]
    fn loaded_instance_replaces_seed_data() {
        let seed = InstanceSeed::new("k").with_data(json!(1));
        let loaded = LoadedInstance::from_seed(seed, Some(json!(2)));
        assert_eq!(loaded.data, Some(json!(2)));
    }

    #[test]
    fn route_instance_data_str() {
        let loaded = LoadedInstance::from_seed(
            InstanceSeed::new("k").with_data(json!({"title": "Hi", "n": 1})),
            Some(json!({"title": "Hi", "n": 1})),
        );
        let instance = RouteInstance::new(loaded, "/".into(), "/index.html".into());
        assert_eq!(instance.data_str("title"), Some("Hi"));
        assert_eq!(instance.data_str("n"), None);
        assert_eq!(instance.data_str("missing"), None);
    }
}
