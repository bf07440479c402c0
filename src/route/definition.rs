//! Route definitions and the collaborator interfaces they carry.

use super::collection::RouteCollection;
use super::error::{CollaboratorError, RouteError};
use super::pattern::RoutePattern;
use super::permalink::PermalinkSpec;
use crate::config::SiteConfig;
use crate::generate::Render;
use crate::types::{InstanceSeed, Params};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// What an instance provider gets to look at.
pub struct ProviderContext<'a> {
    pub config: &'a SiteConfig,
    /// The route being expanded.
    pub route: &'a RouteDefinition,
    /// Routes resolved so far, i.e. every route with a lower priority.
    pub routes: &'a RouteCollection,
}

/// Produces the instances of a route (dynamic params, custom keys, data).
pub trait InstanceProvider: Send + Sync {
    fn instances(&self, ctx: &ProviderContext<'_>) -> Result<Vec<InstanceSeed>, CollaboratorError>;
}

impl<F> InstanceProvider for F
where
    F: Fn(&ProviderContext<'_>) -> Result<Vec<InstanceSeed>, CollaboratorError> + Send + Sync,
{
    fn instances(&self, ctx: &ProviderContext<'_>) -> Result<Vec<InstanceSeed>, CollaboratorError> {
        self(ctx)
    }
}

/// Loads the data of one instance before its permalink is computed.
///
/// Loaders run in parallel across the instances of a route.
pub trait DataLoader: Send + Sync {
    fn load(&self, seed: &InstanceSeed) -> Result<Option<Value>, CollaboratorError>;
}

impl<F> DataLoader for F
where
    F: Fn(&InstanceSeed) -> Result<Option<Value>, CollaboratorError> + Send + Sync,
{
    fn load(&self, seed: &InstanceSeed) -> Result<Option<Value>, CollaboratorError> {
        self(seed)
    }
}

/// Wrap a closure as a shareable instance provider.
pub fn provider<F>(f: F) -> Arc<dyn InstanceProvider>
where
    F: Fn(&ProviderContext<'_>) -> Result<Vec<InstanceSeed>, CollaboratorError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Wrap a closure as a shareable data loader.
pub fn loader<F>(f: F) -> Arc<dyn DataLoader>
where
    F: Fn(&InstanceSeed) -> Result<Option<Value>, CollaboratorError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Fixed list of instances, e.g. the `[[instances]]` of a route file.
#[derive(Debug, Clone)]
pub struct StaticInstances(pub Vec<InstanceSeed>);

impl InstanceProvider for StaticInstances {
    fn instances(&self, _ctx: &ProviderContext<'_>) -> Result<Vec<InstanceSeed>, CollaboratorError> {
        Ok(self.0.clone())
    }
}

/// Route-level data: instances carrying their own data keep it, the rest get
/// a copy of the route's.
#[derive(Debug, Clone)]
pub struct StaticData(pub Value);

impl DataLoader for StaticData {
    fn load(&self, seed: &InstanceSeed) -> Result<Option<Value>, CollaboratorError> {
        Ok(Some(seed.data.clone().unwrap_or_else(|| self.0.clone())))
    }
}

/// Per-route configuration, assembled once when the route is loaded.
#[derive(Clone)]
pub struct RouteOptions {
    /// One instance per configured locale, and locale-prefixed permalinks.
    pub i18n: bool,
    /// Defaults to the route's canonical URL.
    pub permalink: Option<PermalinkSpec>,
    /// Lower resolves first. Routes reading other routes' instances must
    /// sort after them.
    pub priority: i32,
    /// Values elided from the end of permalinks.
    pub param_defaults: Params,
    pub provider: Option<Arc<dyn InstanceProvider>>,
    pub loader: Option<Arc<dyn DataLoader>>,
    pub renderer: Option<Arc<dyn Render>>,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            i18n: true,
            permalink: None,
            priority: 0,
            param_defaults: Params::new(),
            provider: None,
            loader: None,
            renderer: None,
        }
    }
}

impl fmt::Debug for RouteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteOptions")
            .field("i18n", &self.i18n)
            .field("permalink", &self.permalink)
            .field("priority", &self.priority)
            .field("param_defaults", &self.param_defaults)
            .field("provider", &self.provider.is_some())
            .field("loader", &self.loader.is_some())
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}

/// A route pattern plus its validated options.
#[derive(Clone)]
pub struct RouteDefinition {
    pattern: RoutePattern,
    permalink: PermalinkSpec,
    options: RouteOptions,
}

impl RouteDefinition {
    /// Validate `options` against `pattern`.
    ///
    /// Fails when a dynamic route has no instance provider (nothing could
    /// supply its parameter values) or when a route without i18n declares a
    /// per-locale permalink (no locale would ever select a branch).
    pub fn new(pattern: RoutePattern, mut options: RouteOptions) -> Result<Self, RouteError> {
        if pattern.is_dynamic() && options.provider.is_none() {
            return Err(RouteError::MissingInstanceProvider(pattern.name().to_string()));
        }
        if !options.i18n && matches!(options.permalink, Some(PermalinkSpec::PerLocale(_))) {
            return Err(RouteError::InvalidPermalinkShape(pattern.name().to_string()));
        }
        let permalink = options
            .permalink
            .take()
            .unwrap_or_else(|| PermalinkSpec::Literal(pattern.canonical_url().to_string()));
        Ok(Self {
            pattern,
            permalink,
            options,
        })
    }

    /// Parse `file` and validate `options` in one step.
    pub fn from_file(file: &str, extension: &str, options: RouteOptions) -> Result<Self, RouteError> {
        let pattern = RoutePattern::parse(file, extension).map_err(|source| RouteError::Pattern {
            file: file.to_string(),
            source,
        })?;
        Self::new(pattern, options)
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn name(&self) -> &str {
        self.pattern.name()
    }

    pub fn permalink(&self) -> &PermalinkSpec {
        &self.permalink
    }

    pub fn i18n_enabled(&self) -> bool {
        self.options.i18n
    }

    pub fn priority(&self) -> i32 {
        self.options.priority
    }

    pub fn param_defaults(&self) -> &Params {
        &self.options.param_defaults
    }

    pub fn provider(&self) -> Option<&dyn InstanceProvider> {
        self.options.provider.as_deref()
    }

    pub fn loader(&self) -> Option<&dyn DataLoader> {
        self.options.loader.as_deref()
    }

    pub fn renderer(&self) -> Option<&dyn Render> {
        self.options.renderer.as_deref()
    }
}

impl fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("pattern", &self.pattern)
            .field("permalink", &self.permalink)
            .field("options", &self.options)
            .finish()
    }
}
