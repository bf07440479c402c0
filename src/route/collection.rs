//! The resolved route set, in priority order.
//!
//! Routes are resolved one at a time, lowest priority first. Each route goes
//! through every phase before the next route starts:
//!
//! ```text
//! expand → load data → locale table → permalinks/outputs
//! ```
//!
//! so a provider can read the instances and locale tables of every route
//! resolved before its own.

use super::conflict::detect_conflicts;
use super::definition::{ProviderContext, RouteDefinition};
use super::error::RouteError;
use super::expand::{expand, load_data};
use super::i18n::LocaleTable;
use super::permalink::resolve_instance;
use crate::config::SiteConfig;
use crate::types::RouteInstance;
use std::collections::HashMap;
use tracing::{debug, warn};

/// A route with every instance resolved.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    pub definition: RouteDefinition,
    pub instances: Vec<RouteInstance>,
    pub locales: LocaleTable,
}

impl ResolvedRoute {
    pub fn name(&self) -> &str {
        self.definition.name()
    }
}

/// Resolved routes in evaluation order.
#[derive(Debug, Clone, Default)]
pub struct RouteCollection {
    routes: Vec<ResolvedRoute>,
}

impl RouteCollection {
    pub fn get(&self, name: &str) -> Option<&ResolvedRoute> {
        self.routes.iter().find(|route| route.name() == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedRoute> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Every instance of every route, in evaluation order.
    pub fn instances(&self) -> impl Iterator<Item = (&ResolvedRoute, &RouteInstance)> {
        self.routes
            .iter()
            .flat_map(|route| route.instances.iter().map(move |instance| (route, instance)))
    }
}

impl<'a> IntoIterator for &'a RouteCollection {
    type Item = &'a ResolvedRoute;
    type IntoIter = std::slice::Iter<'a, ResolvedRoute>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Stable sort by ascending priority; equal priorities keep discovery order.
pub fn sort_by_priority(definitions: &mut [RouteDefinition]) {
    definitions.sort_by_key(|route| route.priority());
}

/// Resolve a single route against the routes resolved before it.
pub fn resolve_route(
    definition: RouteDefinition,
    config: &SiteConfig,
    routes: &RouteCollection,
) -> Result<ResolvedRoute, RouteError> {
    let seeds = expand(&ProviderContext {
        config,
        route: &definition,
        routes,
    })?;

    if definition.i18n_enabled() {
        for seed in &seeds {
            match &seed.locale {
                None => {
                    return Err(RouteError::MissingLocale {
                        route: definition.name().to_string(),
                        key: seed.key.clone(),
                    });
                }
                Some(locale) if !config.i18n.locales.contains(locale) => {
                    warn!(
                        route = definition.name(),
                        key = seed.key.as_str(),
                        locale = locale.as_str(),
                        "instance locale is not listed in i18n.locales"
                    );
                }
                Some(_) => {}
            }
        }
    }

    let loaded = load_data(&definition, seeds)?;
    let locales = LocaleTable::build(&loaded);
    let instances = loaded
        .into_iter()
        .map(|instance| resolve_instance(config, &definition, instance))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        route = definition.name(),
        instances = instances.len(),
        "resolved route"
    );

    Ok(ResolvedRoute {
        definition,
        instances,
        locales,
    })
}

/// Resolve every route definition into a [`RouteCollection`].
///
/// Aborts on ambiguous routes before anything is expanded, and on two
/// instances writing the same output file after everything is resolved.
pub fn resolve_routes(
    mut definitions: Vec<RouteDefinition>,
    config: &SiteConfig,
) -> Result<RouteCollection, RouteError> {
    let issues = detect_conflicts(definitions.iter().map(RouteDefinition::pattern));
    if !issues.is_empty() {
        return Err(RouteError::Ambiguous(issues));
    }

    sort_by_priority(&mut definitions);

    let mut collection = RouteCollection::default();
    for definition in definitions {
        let resolved = resolve_route(definition, config, &collection)?;
        collection.routes.push(resolved);
    }

    check_unique_outputs(&collection)?;
    Ok(collection)
}

fn check_unique_outputs(collection: &RouteCollection) -> Result<(), RouteError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for (route, instance) in collection.instances() {
        if let Some(first) = seen.insert(&instance.output, route.name()) {
            return Err(RouteError::DuplicateOutput {
                output: instance.output.clone(),
                first: first.to_string(),
                second: route.name().to_string(),
            });
        }
    }
    Ok(())
}
