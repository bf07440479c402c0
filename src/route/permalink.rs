//! Permalink and output path resolution.
//!
//! ```text
//! PermalinkSpec ──select──▶ template ──substitute──▶ /blog/hello/
//!                                    ──locale prefix──▶ /es/blog/hello/
//!                                    ──index file──▶ /es/blog/hello/index.html
//! ```
//!
//! Everything here is a pure function of the route definition, the instance
//! and the configuration.

use super::definition::RouteDefinition;
use super::error::RouteError;
use super::params::{ParamError, substitute};
use crate::config::{I18nConfig, I18nStrategy, SiteConfig};
use crate::types::{LoadedInstance, RouteInstance};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Function computing a permalink template from an instance and its data.
pub type PermalinkFn = dyn Fn(&LoadedInstance) -> String + Send + Sync;

/// Where a route's permalink template comes from.
#[derive(Clone)]
pub enum PermalinkSpec {
    /// The same template for every instance, e.g. `/articles/[slug]`.
    Literal(String),
    /// One template per locale. Locales without an entry use the route's
    /// canonical URL.
    PerLocale(BTreeMap<String, String>),
    /// Computed per instance, after its data is loaded.
    Computed(Arc<PermalinkFn>),
}

impl PermalinkSpec {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&LoadedInstance) -> String + Send + Sync + 'static,
    {
        PermalinkSpec::Computed(Arc::new(f))
    }
}

impl fmt::Debug for PermalinkSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermalinkSpec::Literal(template) => f.debug_tuple("Literal").field(template).finish(),
            PermalinkSpec::PerLocale(map) => f.debug_tuple("PerLocale").field(map).finish(),
            PermalinkSpec::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Pick the permalink template for an instance.
pub fn select_template<'a>(
    spec: &'a PermalinkSpec,
    canonical_url: &'a str,
    instance: &LoadedInstance,
) -> Cow<'a, str> {
    match spec {
        PermalinkSpec::Literal(template) => Cow::Borrowed(template),
        PermalinkSpec::Computed(f) => Cow::Owned(f(instance)),
        PermalinkSpec::PerLocale(map) => instance
            .locale
            .as_ref()
            .and_then(|locale| map.get(locale))
            .map(|template| Cow::Borrowed(template.as_str()))
            .unwrap_or(Cow::Borrowed(canonical_url)),
    }
}

/// Prefix `url` with `/{locale}` according to the strategy.
pub fn prepend_locale(url: &str, i18n: &I18nConfig, locale: Option<&str>) -> String {
    match locale {
        Some(locale)
            if i18n.strategy == I18nStrategy::Always || locale != i18n.default_locale =>
        {
            format!("/{locale}{url}")
        }
        _ => url.to_string(),
    }
}

/// Extension of the last path segment, ignoring trailing slashes.
///
/// `/feed.xml` → `xml`, `/about.html/` → `html`, `/about/` → none,
/// `/.well-known` → none, `/v1.` → none.
pub fn url_extension(url: &str) -> Option<&str> {
    let segment = url.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    match segment.rfind('.') {
        None | Some(0) => None,
        Some(dot) => Some(&segment[dot + 1..]).filter(|ext| !ext.is_empty()),
    }
}

/// Add a trailing `/` unless the URL already has one or names a file.
pub fn add_trailing_slash(url: &str) -> String {
    if url_extension(url).is_none() && !url.ends_with('/') {
        format!("{url}/")
    } else {
        url.to_string()
    }
}

/// Turn a permalink into the path of a concrete file.
///
/// Directory-like permalinks (no extension, a trailing `/`, or a last segment
/// that is still an unfilled catch-all) get `/{index_file}` appended; file
/// permalinks are returned as-is. Applying it twice changes nothing.
pub fn append_index_file(path: &str, index_file: &str) -> String {
    let extension = url_extension(path);
    let unfilled_catch_all = extension.is_some_and(|ext| ext.ends_with(']'));
    if extension.is_none() || path.ends_with('/') || unfilled_catch_all {
        format!("{}/{}", path.trim_end_matches('/'), index_file)
    } else {
        path.to_string()
    }
}

/// Compute the permalink of an instance of `route`.
pub fn permalink_for(
    config: &SiteConfig,
    route: &RouteDefinition,
    instance: &LoadedInstance,
) -> Result<String, ParamError> {
    let template = select_template(route.permalink(), route.pattern().canonical_url(), instance);
    let url = substitute(&template, &instance.params, route.param_defaults())?;
    let url = if route.i18n_enabled() {
        prepend_locale(&url, &config.i18n, instance.locale.as_deref())
    } else {
        url
    };
    Ok(add_trailing_slash(&url))
}

/// Output file path for a permalink.
pub fn output_for(config: &SiteConfig, permalink: &str) -> String {
    append_index_file(permalink, &config.output.index_file)
}

/// Resolve a loaded instance into its final permalink and output path.
pub fn resolve_instance(
    config: &SiteConfig,
    route: &RouteDefinition,
    loaded: LoadedInstance,
) -> Result<RouteInstance, RouteError> {
    let permalink = permalink_for(config, route, &loaded).map_err(|source| RouteError::Params {
        route: route.name().to_string(),
        key: loaded.key.clone(),
        source,
    })?;
    let output = output_for(config, &permalink);
    Ok(RouteInstance::new(loaded, permalink, output))
}
