//! Parameter substitution with trailing-default elision.
//!
//! Placeholders are filled right to left. While every value seen so far equals
//! the route's declared default, the placeholder is replaced with nothing; the
//! first value that differs (or has no default) stops elision for every
//! placeholder to its left. With `page = "1"` as default:
//!
//! ```text
//! /list/[page]            page=1  → /list/
//! /list/[page]            page=2  → /list/2/
//! /[tag]/[page]           tag=rust page=1 → /rust/
//! ```

use super::permalink::add_trailing_slash;
use crate::naming::{Placeholder, find_placeholders};
use crate::types::{ParamValue, Params};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// Every placeholder without a value, in template order.
    #[error("Unmatched param(s): {}", .0.join(", "))]
    Unmatched(Vec<String>),
    #[error("Param \"{0}\" fills a single segment but was given a list")]
    ExpectedSingle(String),
    /// Empty, `.` or `..` segments, `?` anywhere, or `/` in a single-segment value.
    #[error("Param \"{name}\" has an invalid value \"{value}\"")]
    InvalidValue { name: String, value: String },
}

/// Replace every placeholder in `template` with its value from `params`.
///
/// Catch-all values are joined with `/`. Every value is checked, elided or
/// not (see [`ParamError::InvalidValue`]). Runs of `/` left behind by elision
/// are collapsed, a leading `/` is ensured, and a trailing `/` is added unless
/// the last segment has a file extension.
pub fn substitute(template: &str, params: &Params, defaults: &Params) -> Result<String, ParamError> {
    let placeholders = find_placeholders(template);

    let missing: Vec<String> = placeholders
        .iter()
        .filter(|p| !params.contains_key(p.name))
        .map(|p| p.name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ParamError::Unmatched(missing));
    }

    let mut replacements = vec![String::new(); placeholders.len()];
    let mut eliding = true;
    for (idx, placeholder) in placeholders.iter().enumerate().rev() {
        let rendered = render_value(placeholder, &params[placeholder.name])?;
        let is_default = defaults
            .get(placeholder.name)
            .is_some_and(|default| default.to_string() == rendered);
        if eliding && is_default {
            continue;
        }
        eliding = false;
        replacements[idx] = rendered;
    }

    let mut url = String::with_capacity(template.len());
    let mut last = 0;
    for (placeholder, replacement) in placeholders.iter().zip(&replacements) {
        url.push_str(&template[last..placeholder.span.start]);
        url.push_str(replacement);
        last = placeholder.span.end;
    }
    url.push_str(&template[last..]);

    Ok(add_trailing_slash(&normalize_slashes(&url)))
}

fn render_value(placeholder: &Placeholder<'_>, value: &ParamValue) -> Result<String, ParamError> {
    let rendered = match value {
        ParamValue::Single(value) => value.clone(),
        ParamValue::Segments(segments) if placeholder.catch_all => segments.join("/"),
        ParamValue::Segments(segments) => match segments.as_slice() {
            [single] => single.clone(),
            _ => return Err(ParamError::ExpectedSingle(placeholder.name.to_string())),
        },
    };

    let valid = if placeholder.catch_all {
        rendered.split('/').all(is_valid_segment)
    } else {
        is_valid_segment(&rendered)
    };
    if !valid {
        return Err(ParamError::InvalidValue {
            name: placeholder.name.to_string(),
            value: rendered,
        });
    }
    Ok(rendered)
}

/// A value the route regex can match back and that stays inside its directory.
fn is_valid_segment(segment: &str) -> bool {
    !matches!(segment, "" | "." | "..") && !segment.contains(['/', '?'])
}

/// Collapse repeated `/` and make sure the URL starts with one.
pub fn normalize_slashes(url: &str) -> String {
    let mut out = String::with_capacity(url.len() + 1);
    if !url.starts_with('/') {
        out.push('/');
    }
    for c in url.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}
