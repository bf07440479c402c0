//! Route discovery.
//!
//! First stage of a build: loads `config.toml`, walks the routes directory and
//! turns every route file into a [`RouteDefinition`].
//!
//! ## Directory Structure
//!
//! ```text
//! my-site/
//! ├── config.toml                  # Site configuration (optional)
//! └── routes/
//!     ├── index.toml               # /
//!     ├── about.toml               # /about/, /es/about/
//!     ├── robots.txt.toml          # /robots.txt
//!     └── blog/
//!         ├── [slug].toml          # /blog/hello/, /es/blog/hola/
//!         └── page/
//!             └── [page].toml      # paginates blog-slug
//! ```
//!
//! ## Route Files
//!
//! Every key is optional:
//!
//! ```toml
//! i18n = true                        # one instance per locale
//! priority = 0                       # lower resolves first
//! permalink = "/articles/[slug]"     # or a table: [permalink] es = "/articulos/[slug]"
//! data = { title = "About" }         # used by instances without data of their own
//!
//! [defaults]                         # param values elided from the end of permalinks
//! page = "1"
//!
//! [[instances]]                      # key defaults to the route name
//! key = "hello"
//! locale = "en"
//! params = { slug = "hello-world" }
//! data = { title = "Hello", body = "# Hello" }
//!
//! [paginate]                         # instead of [[instances]]
//! route = "blog-slug"
//! page_size = 10
//! filter = { param = "tag", field = "tags", values = ["rust"] }
//! ```
//!
//! Files are discovered sorted by file name. That order is the tie-breaker of
//! the priority sort and the order conflicts are reported in.

use crate::config::{self, SiteConfig};
use crate::presets::pagination::{self, Pagination};
use crate::route::permalink::PermalinkSpec;
use crate::route::{RouteDefinition, RouteError, RouteOptions, StaticData, StaticInstances};
use crate::types::{InstanceSeed, Params};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Routes directory not found: {0}")]
    NotADirectory(PathBuf),
    #[error("Invalid route file {file}: {source}")]
    Toml {
        file: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Route file {0} declares both [[instances]] and [paginate]")]
    ConflictingProviders(PathBuf),
    #[error(transparent)]
    Route(#[from] RouteError),
}

/// Result of the scan stage.
#[derive(Debug)]
pub struct Site {
    pub config: SiteConfig,
    /// Route definitions in discovery order.
    pub routes: Vec<RouteDefinition>,
}

/// `permalink` of a route file: one template, or one per locale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PermalinkEntry {
    Single(String),
    PerLocale(BTreeMap<String, String>),
}

/// One `[[instances]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceEntry {
    pub key: Option<String>,
    pub locale: Option<String>,
    #[serde(default)]
    pub params: Params,
    pub data: Option<Value>,
}

/// Contents of a route file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteFile {
    pub i18n: Option<bool>,
    pub priority: Option<i32>,
    pub permalink: Option<PermalinkEntry>,
    pub data: Option<Value>,
    pub defaults: Params,
    pub instances: Option<Vec<InstanceEntry>>,
    pub paginate: Option<Pagination>,
}

impl RouteFile {
    /// Route options described by this file. `name` is the route name, used as
    /// the key of instances that declare none.
    pub fn into_options(self, name: &str) -> RouteOptions {
        let mut options = RouteOptions {
            i18n: self.i18n.unwrap_or(true),
            permalink: self.permalink.map(|permalink| match permalink {
                PermalinkEntry::Single(template) => PermalinkSpec::Literal(template),
                PermalinkEntry::PerLocale(map) => PermalinkSpec::PerLocale(map),
            }),
            priority: self.priority.unwrap_or_default(),
            ..Default::default()
        };

        if let Some(paginate) = self.paginate {
            options.priority = self.priority.unwrap_or(pagination::DEFAULT_PRIORITY);
            options.param_defaults = Pagination::param_defaults();
            options.provider = Some(Arc::new(paginate));
        }
        options.param_defaults.extend(self.defaults);

        if let Some(instances) = self.instances {
            let seeds = instances
                .into_iter()
                .map(|entry| InstanceSeed {
                    key: entry.key.unwrap_or_else(|| name.to_string()),
                    locale: entry.locale,
                    params: entry.params,
                    data: entry.data,
                })
                .collect();
            options.provider = Some(Arc::new(StaticInstances(seeds)));
        }
        if let Some(data) = self.data {
            options.loader = Some(Arc::new(StaticData(data)));
        }
        options
    }
}

/// Parse a route file from disk.
pub fn parse_route_file(path: &Path) -> Result<RouteFile, ScanError> {
    let content = fs::read_to_string(path)?;
    let file: RouteFile = toml::from_str(&content).map_err(|source| ScanError::Toml {
        file: path.to_path_buf(),
        source,
    })?;
    if file.instances.is_some() && file.paginate.is_some() {
        return Err(ScanError::ConflictingProviders(path.to_path_buf()));
    }
    Ok(file)
}

/// Every route file under `routes_dir`, as `/`-separated paths relative to
/// it (`/blog/[slug].toml`), sorted by file name at each level.
pub fn discover(routes_dir: &Path, extension: &str) -> Result<Vec<String>, ScanError> {
    if !routes_dir.is_dir() {
        return Err(ScanError::NotADirectory(routes_dir.to_path_buf()));
    }
    let extension = extension.trim_start_matches('.');

    let mut files = Vec::new();
    for entry in WalkDir::new(routes_dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if path.extension().is_none_or(|ext| ext != extension) {
            continue;
        }
        let Ok(relative) = path.strip_prefix(routes_dir) else {
            continue;
        };
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        files.push(format!("/{}", segments.join("/")));
    }
    Ok(files)
}

/// Load the config and every route definition of the site at `root`.
pub fn scan(root: &Path) -> Result<Site, ScanError> {
    let config = config::load_config(root)?;
    let routes = scan_routes(root, &config)?;
    Ok(Site { config, routes })
}

/// Route definitions of the site at `root`, in discovery order.
pub fn scan_routes(root: &Path, config: &SiteConfig) -> Result<Vec<RouteDefinition>, ScanError> {
    let routes_dir = root.join(&config.routes_dir);
    let mut routes = Vec::new();
    for file in discover(&routes_dir, &config.route_extension)? {
        let file_path = routes_dir.join(file.trim_start_matches('/'));
        let route_file = parse_route_file(&file_path)?;
        let name = crate::naming::route_name(&file, &config.route_extension);
        let route = RouteDefinition::from_file(
            &file,
            &config.route_extension,
            route_file.into_options(&name),
        )?;
        debug!(
            file = file.as_str(),
            route = route.name(),
            url = route.pattern().canonical_url(),
            "discovered route"
        );
        routes.push(route);
    }
    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::resolve_routes;
    use crate::test_helpers::{setup_fixtures, site_config, write_file};
    use tempfile::TempDir;

    fn names(routes: &[RouteDefinition]) -> Vec<&str> {
        routes.iter().map(|r| r.name()).collect()
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    #[test]
    fn discover_sorted_by_file_name() {
        let tmp = TempDir::new().unwrap();
        let routes = tmp.path().join("routes");
        write_file(&routes, "index.toml", "");
        write_file(&routes, "about.toml", "");
        write_file(&routes, "blog/[slug].toml", "");
        write_file(&routes, "blog/archive.toml", "");
        write_file(&routes, "notes.md", "");

        let files = discover(&routes, "toml").unwrap();
        assert_eq!(
            files,
            vec![
                "/about.toml",
                "/blog/[slug].toml",
                "/blog/archive.toml",
                "/index.toml"
            ]
        );
    }

    #[test]
    fn discover_accepts_dotted_extension() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "a.route", "");
        write_file(tmp.path(), "b.toml", "");
        assert_eq!(discover(tmp.path(), ".route").unwrap(), vec!["/a.route"]);
    }

    #[test]
    fn missing_routes_dir_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = discover(&tmp.path().join("routes"), "toml").unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory(_)));
    }

    // =========================================================================
    // Route files
    // =========================================================================

    #[test]
    fn empty_route_file_uses_defaults() {
        let file: RouteFile = toml::from_str("").unwrap();
        let options = file.into_options("about");
        assert!(options.i18n);
        assert_eq!(options.priority, 0);
        assert!(options.permalink.is_none());
        assert!(options.provider.is_none());
        assert!(options.loader.is_none());
    }

    #[test]
    fn route_file_permalink_shapes() {
        let single: RouteFile = toml::from_str(r#"permalink = "/who""#).unwrap();
        assert_eq!(single.permalink, Some(PermalinkEntry::Single("/who".into())));

        let per_locale: RouteFile = toml::from_str(
            r#"
[permalink]
es = "/quienes"
"#,
        )
        .unwrap();
        assert!(matches!(per_locale.permalink, Some(PermalinkEntry::PerLocale(map)) if map["es"] == "/quienes"));
    }

    #[test]
    fn instances_default_their_key_to_the_route_name() {
        let file: RouteFile = toml::from_str(
            r#"
data = { title = "Route" }

[[instances]]
locale = "en"

[[instances]]
key = "other"
locale = "es"
data = { title = "Own" }
"#,
        )
        .unwrap();
        let config = site_config(&["en", "es"], "en");
        let route =
            RouteDefinition::from_file("/about.toml", "toml", file.into_options("about")).unwrap();
        let routes = resolve_routes(vec![route], &config).unwrap();
        let instances = &routes.get("about").unwrap().instances;
        assert_eq!(instances[0].key, "about");
        assert_eq!(instances[0].data_str("title"), Some("Route"));
        assert_eq!(instances[1].key, "other");
        assert_eq!(instances[1].data_str("title"), Some("Own"));
    }

    #[test]
    fn paginate_sets_priority_and_page_default() {
        let file: RouteFile = toml::from_str(
            r#"
[paginate]
route = "blog-slug"
"#,
        )
        .unwrap();
        let options = file.into_options("blog-page-page");
        assert_eq!(options.priority, pagination::DEFAULT_PRIORITY);
        assert_eq!(options.param_defaults["page"].to_string(), "1");
        assert!(options.provider.is_some());
    }

    #[test]
    fn explicit_priority_wins_over_pagination_default() {
        let file: RouteFile = toml::from_str(
            r#"
priority = 50

[paginate]
route = "blog-slug"
"#,
        )
        .unwrap();
        assert_eq!(file.into_options("x").priority, 50);
    }

    #[test]
    fn unknown_route_file_key_rejected() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "a.toml", "prio = 1\n");
        let err = parse_route_file(&tmp.path().join("a.toml")).unwrap_err();
        assert!(matches!(err, ScanError::Toml { .. }));
    }

    #[test]
    fn instances_and_paginate_are_exclusive() {
        let tmp = TempDir::new().unwrap();
        write_file(
            tmp.path(),
            "a.toml",
            r#"
[[instances]]
locale = "en"

[paginate]
route = "b"
"#,
        );
        let err = parse_route_file(&tmp.path().join("a.toml")).unwrap_err();
        assert!(matches!(err, ScanError::ConflictingProviders(_)));
    }

    #[test]
    fn dynamic_route_file_without_instances_is_error() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "routes/blog/[slug].toml", "");
        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            ScanError::Route(RouteError::MissingInstanceProvider(name)) if name == "blog-slug"
        ));
    }

    // =========================================================================
    // Fixture site
    // =========================================================================

    #[test]
    fn scan_fixture_site() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();
        assert_eq!(site.config.i18n.locales, vec!["en", "es"]);
        assert_eq!(
            names(&site.routes),
            vec![
                "about",
                "blog-slug",
                "blog-page-page",
                "blog-tags-tag-page",
                "index",
                "robotstxt"
            ]
        );
    }

    #[test]
    fn scan_fixture_route_options() {
        let tmp = setup_fixtures();
        let site = scan(tmp.path()).unwrap();
        let find = |name: &str| site.routes.iter().find(|r| r.name() == name).unwrap();

        assert!(matches!(find("about").permalink(), PermalinkSpec::PerLocale(_)));
        assert!(!find("robotstxt").i18n_enabled());
        assert_eq!(find("blog-page-page").priority(), pagination::DEFAULT_PRIORITY);
        assert!(find("blog-slug").pattern().is_dynamic());
    }

    #[test]
    fn scan_uses_configured_routes_dir() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "config.toml", "routes_dir = \"pages\"\n");
        write_file(tmp.path(), "pages/index.toml", "");
        let site = scan(tmp.path()).unwrap();
        assert_eq!(names(&site.routes), vec!["index"]);
    }
}
