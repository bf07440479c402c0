//! Route resolution engine.
//!
//! Turns route definitions (one per route file) into the ordered set of
//! concrete pages a build produces: every instance with its locale, params,
//! data, permalink and output path.
//!
//! ```text
//! route file ──parse──▶ RoutePattern ──validate──▶ RouteDefinition
//!
//! [RouteDefinition] ──conflicts──▶ sort by priority ──per route──▶ RouteCollection
//!                                                     expand
//!                                                     load data (parallel)
//!                                                     locale table
//!                                                     permalinks + outputs
//! ```
//!
//! | Module | Role |
//! |--------|------|
//! | [`pattern`] | Canonical URL, name and matching regex of a route file |
//! | [`params`] | Placeholder substitution with default elision |
//! | [`conflict`] | Ambiguity detection across the route set |
//! | [`definition`] | Route options and the provider/loader interfaces |
//! | [`expand`] | Instance expansion and parallel data loading |
//! | [`i18n`] | Per-route locale lookup table |
//! | [`permalink`] | Permalink templates, locale prefixes and output paths |
//! | [`collection`] | Priority-ordered resolution of the whole route set |

pub mod collection;
pub mod conflict;
pub mod definition;
pub mod error;
pub mod expand;
pub mod i18n;
pub mod params;
pub mod pattern;
pub mod permalink;

pub use collection::{ResolvedRoute, RouteCollection, resolve_routes};
pub use conflict::{RouteIssue, detect_conflicts};
pub use definition::{
    DataLoader, InstanceProvider, ProviderContext, RouteDefinition, RouteOptions, StaticData,
    StaticInstances, loader, provider,
};
pub use error::{CollaboratorError, RouteError};
pub use i18n::LocaleTable;
pub use params::{ParamError, substitute};
pub use pattern::{PatternError, RoutePattern};
pub use permalink::{PermalinkSpec, append_index_file, prepend_locale};
