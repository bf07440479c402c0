//! CLI output formatting for every command.
//!
//! # Route-First Display
//!
//! Output is organised by route, in resolution order. Each route gets a header
//! line (positional index, name and canonical URL) followed by indented
//! context lines: the source file and one line per instance.
//!
//! # Output Format
//!
//! ## Routes
//!
//! ```text
//! 001 about → /about (2 instances)
//!     Source: /about.toml
//!     about [en] → /about/
//!     about [es] → /es/sobre-nosotros/
//! 002 robotstxt → /robots.txt (1 instance)
//!     Source: /robots.txt.toml
//!     robotstxt → /robots.txt
//!
//! 2 routes, 3 instances
//! ```
//!
//! ## Ambiguous routes
//!
//! ```text
//! Ambiguous routes
//! blog-all
//!     Matched by: blog-all, blog-params
//! ```
//!
//! ## Build
//!
//! ```text
//! about [en] → about/index.html
//! about [es] → es/sobre-nosotros/index.html
//!
//! Generated 2 pages
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::generate::GeneratedPage;
use crate::route::{RouteCollection, RouteIssue};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// `key [locale]`, or just `key` for instances without locale.
fn instance_label(key: &str, locale: Option<&str>) -> String {
    match locale {
        Some(locale) => format!("{key} [{locale}]"),
        None => key.to_string(),
    }
}

// ============================================================================
// Routes
// ============================================================================

pub fn format_routes_output(routes: &RouteCollection) -> Vec<String> {
    let mut lines = Vec::new();
    let mut total = 0;
    for (idx, route) in routes.iter().enumerate() {
        let pattern = route.definition.pattern();
        lines.push(format!(
            "{} {} → {} ({})",
            format_index(idx + 1),
            route.name(),
            pattern.canonical_url(),
            plural(route.instances.len(), "instance")
        ));
        lines.push(format!("{}Source: {}", indent(1), pattern.source_path()));
        for instance in &route.instances {
            lines.push(format!(
                "{}{} → {}",
                indent(1),
                instance_label(&instance.key, instance.locale.as_deref()),
                instance.permalink
            ));
        }
        total += route.instances.len();
    }
    lines.push(String::new());
    lines.push(format!(
        "{}, {}",
        plural(routes.len(), "route"),
        plural(total, "instance")
    ));
    lines
}

pub fn print_routes_output(routes: &RouteCollection) {
    for line in format_routes_output(routes) {
        println!("{}", line);
    }
}

// ============================================================================
// Conflicts
// ============================================================================

pub fn format_issues(issues: &[RouteIssue]) -> Vec<String> {
    if issues.is_empty() {
        return vec!["No ambiguous routes".to_string()];
    }
    let mut lines = vec!["Ambiguous routes".to_string()];
    for issue in issues {
        lines.push(issue.name.clone());
        lines.push(format!("{}Matched by: {}", indent(1), issue.matches.join(", ")));
    }
    lines
}

pub fn print_issues(issues: &[RouteIssue]) {
    for line in format_issues(issues) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_generate_output(pages: &[GeneratedPage]) -> Vec<String> {
    let mut lines: Vec<String> = pages
        .iter()
        .map(|page| {
            format!(
                "{} → {}",
                instance_label(&page.key, page.locale.as_deref()),
                page.output.trim_start_matches('/')
            )
        })
        .collect();
    lines.push(String::new());
    lines.push(format!("Generated {}", plural(pages.len(), "page")));
    lines
}

pub fn print_generate_output(pages: &[GeneratedPage]) {
    for line in format_generate_output(pages) {
        println!("{}", line);
    }
}
