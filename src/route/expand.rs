//! Instance expansion and data loading.

use super::definition::{ProviderContext, RouteDefinition};
use super::error::RouteError;
use crate::config::I18nConfig;
use crate::types::{InstanceSeed, LoadedInstance};
use rayon::prelude::*;

/// Instances of a route that declares no provider: one per configured locale
/// when i18n is enabled, otherwise a single instance without locale. The key
/// is always the route name and params are empty.
pub fn default_instances(route: &RouteDefinition, i18n: &I18nConfig) -> Vec<InstanceSeed> {
    if route.i18n_enabled() {
        i18n.locales
            .iter()
            .map(|locale| InstanceSeed::new(route.name()).with_locale(locale.as_str()))
            .collect()
    } else {
        vec![InstanceSeed::new(route.name())]
    }
}

/// Expand the route in `ctx` into instance seeds.
///
/// A declared provider's result is used verbatim.
pub fn expand(ctx: &ProviderContext<'_>) -> Result<Vec<InstanceSeed>, RouteError> {
    let route = ctx.route;
    match route.provider() {
        Some(provider) => provider.instances(ctx).map_err(|source| RouteError::Provider {
            route: route.name().to_string(),
            source,
        }),
        None if route.pattern().is_dynamic() => {
            Err(RouteError::MissingInstanceProvider(route.name().to_string()))
        }
        None => Ok(default_instances(route, &ctx.config.i18n)),
    }
}

/// Load the data of every seed, in parallel. Order is preserved and the first
/// failure aborts.
///
/// Without a loader, the data already attached to the seed is used.
pub fn load_data(
    route: &RouteDefinition,
    seeds: Vec<InstanceSeed>,
) -> Result<Vec<LoadedInstance>, RouteError> {
    seeds
        .into_par_iter()
        .map(|seed| {
            let data = match route.loader() {
                Some(loader) => loader.load(&seed).map_err(|source| RouteError::DataLoader {
                    route: route.name().to_string(),
                    key: seed.key.clone(),
                    source,
                })?,
                None => seed.data.clone(),
            };
            Ok::<_, RouteError>(LoadedInstance::from_seed(seed, data))
        })
        .collect()
}
