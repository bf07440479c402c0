use super::conflict::RouteIssue;
use super::params::ParamError;
use super::pattern::PatternError;
use thiserror::Error;

/// Error returned by an external collaborator (instance provider, data
/// loader, renderer). Propagated verbatim as the `source` of a [`RouteError`].
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Invalid route file {file}: {source}")]
    Pattern {
        file: String,
        #[source]
        source: PatternError,
    },
    #[error("Route \"{0}\" is dynamic but declares no instance provider")]
    MissingInstanceProvider(String),
    #[error(
        "Route \"{0}\" has i18n disabled but its permalink is a per-locale map; use a single permalink instead"
    )]
    InvalidPermalinkShape(String),
    #[error("Route \"{route}\" instance \"{key}\": {source}")]
    Params {
        route: String,
        key: String,
        #[source]
        source: ParamError,
    },
    #[error(
        "Route \"{route}\" instance \"{key}\" has no locale; set one in its instances or disable i18n for the route"
    )]
    MissingLocale { route: String, key: String },
    #[error("Instance provider of route \"{route}\" failed: {source}")]
    Provider {
        route: String,
        #[source]
        source: CollaboratorError,
    },
    #[error("Data loader of route \"{route}\" failed for instance \"{key}\": {source}")]
    DataLoader {
        route: String,
        key: String,
        #[source]
        source: CollaboratorError,
    },
    #[error("Output {output} is produced by both \"{first}\" and \"{second}\"")]
    DuplicateOutput {
        output: String,
        first: String,
        second: String,
    },
    #[error("{} ambiguous route(s): {}", .0.len(), format_issues(.0))]
    Ambiguous(Vec<RouteIssue>),
}

fn format_issues(issues: &[RouteIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{} (matched by {})", issue.name, issue.matches.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}
