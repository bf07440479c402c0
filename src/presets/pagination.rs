//! Paginate the instances of another route.
//!
//! A paginating route lists the resolved instances of a target route, split
//! into pages, once per locale and, optionally, once per filter value:
//!
//! ```text
//! routes/blog/[slug].toml              target, 25 posts per locale
//! routes/blog/page/[page].toml         [paginate] route = "blog-slug"
//!
//! /blog/page/   /blog/page/2/   /blog/page/3/   /es/blog/page/ ...
//! ```
//!
//! With `filter = { param = "tag", field = "tags", values = ["rust"] }` only
//! instances whose `data.tags` is `"rust"` or contains `"rust"` are listed,
//! and every page also gets `tag = "rust"` as a param.
//!
//! The paginating route must sort after its target, hence the default
//! priority of [`DEFAULT_PRIORITY`].

use crate::route::permalink::permalink_for;
use crate::route::{CollaboratorError, InstanceProvider, ProviderContext};
use crate::types::{InstanceSeed, LoadedInstance, ParamValue, Params, RouteInstance};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Priority given to paginating routes that declare none.
pub const DEFAULT_PRIORITY: i32 = 900;

/// Page size used when none is given.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Name of the page number param. Page 1 is its default, so the first page
/// lives at the route's bare URL.
pub const PAGE_PARAM: &str = "page";

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Split the target's instances by the value of a data field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaginationFilter {
    /// Param that carries the filter value into the permalink.
    pub param: String,
    /// Data field of the target's instances to compare against.
    pub field: String,
    pub values: Vec<String>,
}

impl PaginationFilter {
    fn accepts(&self, instance: &RouteInstance, value: &str) -> bool {
        match instance.data.as_ref().and_then(|data| data.get(&self.field)) {
            Some(Value::String(s)) => s == value,
            Some(Value::Array(items)) => items.iter().any(|item| item.as_str() == Some(value)),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pagination {
    /// Name of the route whose instances are listed.
    pub route: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub filter: Option<PaginationFilter>,
}

impl Pagination {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            page_size: DEFAULT_PAGE_SIZE,
            filter: None,
        }
    }

    /// Param defaults a paginating route needs.
    pub fn param_defaults() -> Params {
        Params::from([(PAGE_PARAM.to_string(), ParamValue::from("1"))])
    }
}

fn page_key(page: usize, filter: Option<&str>) -> String {
    match filter {
        Some(filter) => format!("{page}-{filter}"),
        None => page.to_string(),
    }
}

fn page_params(page: usize, filter: Option<(&str, &str)>) -> Params {
    let mut params = Params::from([(PAGE_PARAM.to_string(), ParamValue::from(page.to_string()))]);
    if let Some((param, value)) = filter {
        params.insert(param.to_string(), ParamValue::from(value));
    }
    params
}

impl InstanceProvider for Pagination {
    fn instances(&self, ctx: &ProviderContext<'_>) -> Result<Vec<InstanceSeed>, CollaboratorError> {
        if self.page_size == 0 {
            return Err(format!("route \"{}\": page_size must be at least 1", ctx.route.name()).into());
        }
        let target = ctx.routes.get(&self.route).ok_or_else(|| {
            format!(
                "route \"{}\" paginates \"{}\", which does not exist or has not been resolved yet; \
                 give it a lower priority",
                ctx.route.name(),
                self.route
            )
        })?;

        let locales: Vec<Option<&str>> = if target.definition.i18n_enabled() {
            ctx.config.i18n.locales.iter().map(|l| Some(l.as_str())).collect()
        } else {
            vec![None]
        };
        let filters: Vec<Option<&str>> = match &self.filter {
            Some(filter) => filter.values.iter().map(|v| Some(v.as_str())).collect(),
            None => vec![None],
        };

        let mut seeds = Vec::new();
        for locale in &locales {
            let in_locale: Vec<&RouteInstance> = target
                .instances
                .iter()
                .filter(|i| locale.is_none() || i.locale.as_deref() == *locale)
                .collect();

            for filter_value in &filters {
                let filter_param = self
                    .filter
                    .as_ref()
                    .zip(*filter_value)
                    .map(|(filter, value)| (filter.param.as_str(), value));
                let items: Vec<&RouteInstance> = match (&self.filter, filter_value) {
                    (Some(filter), Some(value)) => in_locale
                        .iter()
                        .copied()
                        .filter(|i| filter.accepts(i, value))
                        .collect(),
                    _ => in_locale.clone(),
                };

                let pages = items.len().div_ceil(self.page_size);
                let url = |page: usize| -> Result<String, CollaboratorError> {
                    let instance = LoadedInstance {
                        key: page_key(page, *filter_value),
                        locale: locale.map(String::from),
                        params: page_params(page, filter_param),
                        data: None,
                    };
                    Ok(permalink_for(ctx.config, ctx.route, &instance)?)
                };

                for (page_idx, chunk) in items.chunks(self.page_size).enumerate() {
                    let page = page_idx + 1;
                    let has_prev = page_idx > 0;
                    let has_next = page < pages;
                    let prev_url = if has_prev { url(page - 1)? } else { String::new() };
                    let next_url = if has_next { url(page + 1)? } else { String::new() };

                    let mut seed = InstanceSeed::new(page_key(page, *filter_value)).with_data(json!({
                        "items": chunk,
                        "page_idx": page_idx,
                        "page": page,
                        "pages": pages,
                        "has_prev": has_prev,
                        "prev_url": prev_url,
                        "has_next": has_next,
                        "next_url": next_url,
                    }));
                    seed.params = page_params(page, filter_param);
                    seed.locale = locale.map(String::from);
                    seeds.push(seed);
                }
            }
        }
        Ok(seeds)
    }
}
