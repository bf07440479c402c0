//! Route pattern parsing: file path → canonical URL, name and matching regex.

use crate::naming::{self, find_placeholders, is_valid_param_name};
use crate::types::{ParamValue, Params};
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatternError {
    #[error("Unbalanced bracket in \"{0}\"")]
    UnbalancedBracket(String),
    #[error("Invalid parameter name \"{0}\" (use ASCII letters, digits or `_`)")]
    InvalidParamName(String),
    #[error("Parameter \"{0}\" is used more than once")]
    DuplicateParam(String),
    #[error("Invalid route regex: {0}")]
    Regex(#[from] regex::Error),
}

/// A parsed route file path.
///
/// Immutable once built: the regex is derived from the canonical URL and the
/// two are only ever constructed together by [`RoutePattern::parse`].
#[derive(Debug, Clone)]
pub struct RoutePattern {
    name: String,
    source_path: String,
    canonical_url: String,
    regex: Regex,
    is_catch_all: bool,
    is_dynamic: bool,
}

impl RoutePattern {
    /// Parse a route file path relative to the routes directory, e.g.
    /// `/blog/[slug].toml`. `extension` is the route-file extension to strip.
    pub fn parse(file: &str, extension: &str) -> Result<Self, PatternError> {
        let canonical_url = naming::route_url(file, extension);
        let regex = Regex::new(&regex_source(&canonical_url)?)?;
        let placeholders = find_placeholders(&canonical_url);

        Ok(Self {
            name: naming::route_name(file, extension),
            source_path: file.to_string(),
            is_catch_all: placeholders.iter().any(|p| p.catch_all),
            is_dynamic: !placeholders.is_empty(),
            canonical_url,
            regex,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// URL template with `[name]` / `[...name]` placeholders, e.g. `/blog/[slug]`.
    pub fn canonical_url(&self) -> &str {
        &self.canonical_url
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn is_catch_all(&self) -> bool {
        self.is_catch_all
    }

    pub fn is_dynamic(&self) -> bool {
        self.is_dynamic
    }

    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }

    /// Extract the parameters a concrete URL binds, or `None` if it doesn't match.
    ///
    /// Catch-all captures are split back into their segments.
    pub fn captures(&self, url: &str) -> Option<Params> {
        let caps = self.regex.captures(url)?;
        let params = find_placeholders(&self.canonical_url)
            .into_iter()
            .filter_map(|p| {
                let text = caps.name(p.name)?.as_str();
                let value = if p.catch_all {
                    ParamValue::Segments(text.split('/').map(String::from).collect())
                } else {
                    ParamValue::Single(text.to_string())
                };
                Some((p.name.to_string(), value))
            })
            .collect();
        Some(params)
    }
}

/// Build the anchored regex source for a canonical URL.
///
/// `[name]` matches one or more characters other than `/` and `?`;
/// `[...name]` matches one or more characters other than `?`. Literal text is
/// escaped.
///
/// `"/blog/[year]/[slug]"` → `^/blog/(?<year>[^?/]+)/(?<slug>[^?/]+)$`
pub fn regex_source(canonical_url: &str) -> Result<String, PatternError> {
    let mut source = String::from("^");
    let mut seen: Vec<&str> = Vec::new();
    let mut last = 0;

    for placeholder in find_placeholders(canonical_url) {
        push_literal(&mut source, &canonical_url[last..placeholder.span.start])?;
        if !is_valid_param_name(placeholder.name) {
            return Err(PatternError::InvalidParamName(placeholder.name.to_string()));
        }
        if seen.contains(&placeholder.name) {
            return Err(PatternError::DuplicateParam(placeholder.name.to_string()));
        }
        seen.push(placeholder.name);

        let class = if placeholder.catch_all { "[^?]+" } else { "[^?/]+" };
        source.push_str(&format!("(?<{}>{})", placeholder.name, class));
        last = placeholder.span.end;
    }

    push_literal(&mut source, &canonical_url[last..])?;
    source.push('$');
    Ok(source)
}

fn push_literal(source: &mut String, text: &str) -> Result<(), PatternError> {
    if text.contains(['[', ']']) {
        return Err(PatternError::UnbalancedBracket(text.to_string()));
    }
    source.push_str(&regex::escape(text));
    Ok(())
}
