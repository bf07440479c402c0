//! Ambiguity detection across the whole route set.
//!
//! Every route's canonical URL is tested against every route's regex, itself
//! included. A route whose URL is matched by more than one pattern lives in an
//! ambiguous part of the URL space: usually a catch-all shadowing more
//! specific routes, or two catch-alls overlapping.
//!
//! All-pairs on purpose: route sets are small and this runs once per build.

use super::pattern::RoutePattern;
use serde::Serialize;

/// A route whose canonical URL is matched by other routes too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteIssue {
    pub name: String,
    /// Every matching route name, the route itself included, in test order.
    pub matches: Vec<String>,
}

/// Collect every ambiguity. Issues follow discovery order.
///
/// An empty result means the route set is unambiguous; a non-empty one must
/// abort the build.
pub fn detect_conflicts<'a>(patterns: impl IntoIterator<Item = &'a RoutePattern>) -> Vec<RouteIssue> {
    let patterns: Vec<&RoutePattern> = patterns.into_iter().collect();

    patterns
        .iter()
        .filter_map(|route| {
            let matches: Vec<String> = patterns
                .iter()
                .filter(|other| other.matches(route.canonical_url()))
                .map(|other| other.name().to_string())
                .collect();
            (matches.len() > 1).then(|| RouteIssue {
                name: route.name().to_string(),
                matches,
            })
        })
        .collect()
}
