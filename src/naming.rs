//! Centralized parsing for the route file-naming convention.
//!
//! A route file's path relative to the routes directory is its URL:
//!
//! - `index.toml` → `/`
//! - `us/about.toml` → `/us/about`
//! - `blog/index.toml` → `/blog` (a final `index` segment is dropped)
//! - `blog/[slug].toml` → `/blog/[slug]`, where `[slug]` fills one segment
//! - `docs/[...path].toml` → `/docs/[...path]`, where `[...path]` fills one or
//!   more trailing segments
//!
//! Permalink templates use the same placeholder syntax (`/articles/[slug]`),
//! so the route regex and parameter substitution both go through
//! [`find_placeholders`] and can never disagree about what a placeholder is.

use std::ops::Range;

/// A `[name]` or `[...name]` placeholder found in a URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Name between the brackets, without the `...` marker.
    pub name: &'a str,
    /// `true` for `[...name]`.
    pub catch_all: bool,
    /// Byte range of the whole placeholder, brackets included.
    pub span: Range<usize>,
}

/// Find every placeholder in `template`, left to right.
///
/// A `[` without a matching `]` is not a placeholder; the scan stops there.
///
/// - `"/blog/[year]/[slug]"` → `year`, `slug`
/// - `"/docs/[...path]"` → `path` (catch-all)
/// - `"/about"` → nothing
pub fn find_placeholders(template: &str) -> Vec<Placeholder<'_>> {
    let mut found = Vec::new();
    let mut cursor = 0;
    while let Some(open) = template[cursor..].find('[') {
        let start = cursor + open;
        let Some(close) = template[start..].find(']') else {
            break;
        };
        let end = start + close + 1;
        let inner = &template[start + 1..end - 1];
        let (name, catch_all) = match inner.strip_prefix("...") {
            Some(name) => (name, true),
            None => (inner, false),
        };
        found.push(Placeholder {
            name,
            catch_all,
            span: start..end,
        });
        cursor = end;
    }
    found
}

/// Placeholder names become regex capture-group names, so they are limited
/// to ASCII letters, digits and `_`.
pub fn is_valid_param_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strip `.{extension}` from the end of a route file path, if present.
fn strip_extension<'a>(file: &'a str, extension: &str) -> &'a str {
    let extension = extension.trim_start_matches('.');
    file.strip_suffix(extension)
        .and_then(|stem| stem.strip_suffix('.'))
        .unwrap_or(file)
}

/// Canonical URL of a route file.
///
/// Strips the file extension, a final `index` segment and any leading or
/// trailing slashes, then re-prefixes a single `/`.
///
/// - `"/index.toml"` → `"/"`
/// - `"/us/about.toml"` → `"/us/about"`
/// - `"/blog/index.toml"` → `"/blog"`
/// - `"/blog/[...all].toml"` → `"/blog/[...all]"`
pub fn route_url(file: &str, extension: &str) -> String {
    let stem = strip_extension(file, extension).trim_matches('/');
    let stem = match stem.rsplit_once('/') {
        Some((parent, "index")) => parent,
        None if stem == "index" => "",
        _ => stem,
    };
    format!("/{}", stem.trim_matches('/'))
}

/// Route name derived from a route file path.
///
/// Segments have `[`, `]` and `.` removed and are joined with `-`. Unlike
/// [`route_url`], a final `index` segment is kept so `/blog/index.toml` and
/// `/blog.toml` stay distinguishable.
///
/// - `"/index.toml"` → `"index"`
/// - `"/blog/index.toml"` → `"blog-index"`
/// - `"/blog/[year]/[month]/[slug].toml"` → `"blog-year-month-slug"`
/// - `"/blog/[...all].toml"` → `"blog-all"`
pub fn route_name(file: &str, extension: &str) -> String {
    strip_extension(file.trim_start_matches('/'), extension)
        .split('/')
        .map(|part| {
            part.chars()
                .filter(|c| !matches!(c, '[' | ']' | '.'))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("-")
}
