//! Helpers available to renderers while a page is being rendered.
//!
//! - [`has_locale`]: does the current page exist in another locale?
//! - [`locale_url`]: permalink of the current page in another locale
//! - [`url_for`]: permalink of any route by name
//! - [`translate`]: look up a string in `[i18n.translations.<locale>]`
//!
//! [`crate::generate::RenderContext`] exposes all of them bound to the page
//! being rendered.

use crate::config::SiteConfig;
use crate::route::permalink::permalink_for;
use crate::route::{ParamError, ResolvedRoute, RouteCollection};
use crate::types::{LoadedInstance, Params};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("No route named \"{0}\"")]
    UnknownRoute(String),
    #[error("Cannot build a URL for route \"{route}\": {source}")]
    Params {
        route: String,
        #[source]
        source: ParamError,
    },
}

/// Whether the page `key` of `route` has a `locale` variant.
pub fn has_locale(route: &ResolvedRoute, key: &str, locale: &str) -> bool {
    route.locales.has_locale(key, locale)
}

/// Permalink of the `locale` variant of page `key`, or `None` when the page
/// does not exist in that locale.
pub fn locale_url(
    config: &SiteConfig,
    route: &ResolvedRoute,
    key: &str,
    locale: &str,
) -> Result<Option<String>, ViewError> {
    let Some(sibling) = route.locales.get(key, locale) else {
        return Ok(None);
    };
    permalink_for(config, &route.definition, sibling)
        .map(Some)
        .map_err(|source| ViewError::Params {
            route: route.name().to_string(),
            source,
        })
}

/// Permalink of route `name` for the given params and locale.
///
/// The permalink is computed without instance data, so routes whose
/// permalink depends on loaded data should be linked through their resolved
/// instances instead.
pub fn url_for(
    config: &SiteConfig,
    routes: &RouteCollection,
    name: &str,
    params: Params,
    locale: Option<&str>,
) -> Result<String, ViewError> {
    let route = routes
        .get(name)
        .ok_or_else(|| ViewError::UnknownRoute(name.to_string()))?;
    let instance = LoadedInstance {
        key: name.to_string(),
        locale: locale.map(String::from),
        params,
        data: None,
    };
    permalink_for(config, &route.definition, &instance).map_err(|source| ViewError::Params {
        route: name.to_string(),
        source,
    })
}

/// Find the string at dotted `key` (`nav.home`) in a translation table.
///
/// Only leaves count: a key naming a table, or anything that is not a
/// string, is a miss.
pub fn lookup_translation<'a>(table: &'a toml::Table, key: &str) -> Option<&'a str> {
    let (path, leaf) = match key.rsplit_once('.') {
        Some((path, leaf)) => (Some(path), leaf),
        None => (None, key),
    };
    let mut current = table;
    if let Some(path) = path {
        for part in path.split('.') {
            current = current.get(part)?.as_table()?;
        }
    }
    current.get(leaf)?.as_str()
}

/// Translate `key` for `locale`, replacing every `{{name}}` with its value
/// from `replacements`.
///
/// Returns `key` unchanged when there is no locale, no table for it, or no
/// string at that key.
pub fn translate(
    key: &str,
    replacements: &[(&str, &str)],
    translations: &BTreeMap<String, toml::Table>,
    locale: Option<&str>,
) -> String {
    let Some(found) = locale
        .and_then(|locale| translations.get(locale))
        .and_then(|table| lookup_translation(table, key))
    else {
        return key.to_string();
    };
    replacements
        .iter()
        .fold(found.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{{{name}}}}}"), value)
        })
}
