//! # sitemill
//!
//! A static site builder where the filesystem defines the routes. Every file
//! under `routes/` is a route; its path is its URL, and bracketed segments are
//! parameters filled by the route's instances.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! ```text
//! 1. Scan      routes/           →  [RouteDefinition]   (files → validated definitions)
//! 2. Resolve   [RouteDefinition] →  RouteCollection     (instances, permalinks, outputs)
//! 3. Generate  RouteCollection   →  dist/               (rendered pages)
//! ```
//!
//! Resolution is where the work is. For every route, lowest priority first:
//!
//! ```text
//! expand     one instance per locale, or whatever the route's provider returns
//! load       data of every instance, in parallel
//! i18n       key → locale → instance table, for "switch locale" links
//! resolve    permalink (template, params, default elision, locale prefix)
//!            and output path (index file appended to directory-like permalinks)
//! ```
//!
//! Resolution is a pure function of the definitions and the config: the same
//! input always yields the same instances, in the same order.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: loads `config.toml`, discovers and parses route files |
//! | [`route`] | Stage 2: patterns, conflicts, expansion, permalinks, the route collection |
//! | [`generate`] | Stage 3: renders every instance with Maud and writes output files |
//! | [`config`] | `config.toml` loading, validation and merging over stock defaults |
//! | [`types`] | Instance records shared by every phase (`InstanceSeed` → `RouteInstance`) |
//! | [`naming`] | Route file-naming grammar: `[name]`, `[...name]`, `index` stripping |
//! | [`presets`] | Ready-made instance providers (pagination) |
//! | [`view`] | Renderer helpers: locale switching, URL building, translations |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Route Files Are Data
//!
//! A route file is declarative TOML: locale handling, permalink, priority,
//! parameter defaults, and either a list of instances or a pagination preset.
//! Programmatic routes use the same [`route::RouteOptions`] record with closures
//! for providers, loaders, permalinks and renderers.
//!
//! ## One Placeholder Grammar
//!
//! File paths, canonical URLs and permalink templates all use `[name]` and
//! `[...name]`. Matching regexes and parameter substitution are both built from
//! [`naming::find_placeholders`], so they cannot disagree.
//!
//! ## Priority Instead of Dependencies
//!
//! Routes resolve one at a time in ascending priority. A route that lists other
//! routes' instances (an index, a paginated archive) simply sorts after them;
//! paginated routes default to priority 900 for that reason.
//!
//! ## Maud Over Template Engines
//!
//! The default layout is generated with [Maud](https://maud.lambda.xyz/), a
//! compile-time HTML macro system. Routes needing more supply their own
//! [`generate::Render`] implementation.

pub mod config;
pub mod generate;
pub mod naming;
pub mod output;
pub mod presets;
pub mod route;
pub mod scan;
pub mod types;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;
