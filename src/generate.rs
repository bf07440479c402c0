//! Page rendering and output writing.
//!
//! The last stage of a build. Every instance of every resolved route is
//! rendered by its route's renderer (or [`DefaultRenderer`]) and written to
//! its output path under the output directory:
//!
//! ```text
//! RouteInstance { output: "/es/blog/hola/index.html" }  →  dist/es/blog/hola/index.html
//! ```
//!
//! Rendering runs in parallel; writing happens afterwards in route order, so a
//! failed render leaves the output directory untouched.
//!
//! ## Default layout
//!
//! The default renderer reads a few conventional fields of the instance data:
//!
//! - `title`: page title, followed by the site title
//! - `body`: markdown, converted to HTML
//! - `content`: emitted verbatim instead of the HTML layout (feeds, robots.txt)
//! - `items`, `prev_url`, `next_url`: pagination pages (see [`crate::presets`])
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.

use crate::config::SiteConfig;
use crate::route::{CollaboratorError, ResolvedRoute, RouteCollection};
use crate::types::{Params, RouteInstance};
use crate::view::{self, ViewError};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Component, Path};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Rendering route \"{route}\" instance \"{key}\" failed: {source}")]
    Render {
        route: String,
        key: String,
        #[source]
        source: CollaboratorError,
    },
    #[error("Output path \"{0}\" leaves the output directory")]
    OutsideOutputDir(String),
}

/// Renders one instance to the full contents of its output file.
pub trait Render: Send + Sync {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String, CollaboratorError>;
}

impl<F> Render for F
where
    F: Fn(&RenderContext<'_>) -> Result<String, CollaboratorError> + Send + Sync,
{
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String, CollaboratorError> {
        self(ctx)
    }
}

/// Wrap a closure as a shareable renderer.
pub fn renderer<F>(f: F) -> Arc<dyn Render>
where
    F: Fn(&RenderContext<'_>) -> Result<String, CollaboratorError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Everything a renderer can see, plus the template hooks bound to the page
/// being rendered.
pub struct RenderContext<'a> {
    pub config: &'a SiteConfig,
    pub routes: &'a RouteCollection,
    pub route: &'a ResolvedRoute,
    pub instance: &'a RouteInstance,
}

impl RenderContext<'_> {
    pub fn locale(&self) -> Option<&str> {
        self.instance.locale.as_deref()
    }

    pub fn params(&self) -> &Params {
        &self.instance.params
    }

    pub fn data(&self) -> Option<&Value> {
        self.instance.data.as_ref()
    }

    /// Whether the current page exists in `locale`.
    pub fn has_locale(&self, locale: &str) -> bool {
        view::has_locale(self.route, &self.instance.key, locale)
    }

    /// Permalink of the current page in `locale`, if it exists.
    pub fn locale_url(&self, locale: &str) -> Result<Option<String>, ViewError> {
        view::locale_url(self.config, self.route, &self.instance.key, locale)
    }

    /// Permalink of route `name`. Without a `locale`, the current page's is used.
    pub fn url_for(&self, name: &str, params: Params, locale: Option<&str>) -> Result<String, ViewError> {
        view::url_for(self.config, self.routes, name, params, locale.or(self.locale()))
    }

    pub fn translate(&self, key: &str, replacements: &[(&str, &str)]) -> String {
        view::translate(key, replacements, &self.config.i18n.translations, self.locale())
    }
}

/// A page written by [`generate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedPage {
    pub route: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub permalink: String,
    pub output: String,
}

/// Render every instance and write it under `output_dir`.
pub fn generate(
    routes: &RouteCollection,
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<Vec<GeneratedPage>, GenerateError> {
    let rendered = render_all(routes, config)?;

    fs::create_dir_all(output_dir)?;
    let mut pages = Vec::with_capacity(rendered.len());
    for (page, contents) in rendered {
        let path = output_dir.join(page.output.trim_start_matches('/'));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        debug!(output = page.output.as_str(), "wrote page");
        pages.push(page);
    }

    info!(
        pages = pages.len(),
        output = %output_dir.display(),
        "site generated"
    );
    Ok(pages)
}

/// Render every instance without writing anything. Order follows the route
/// collection.
pub fn render_all(
    routes: &RouteCollection,
    config: &SiteConfig,
) -> Result<Vec<(GeneratedPage, String)>, GenerateError> {
    let work: Vec<(&ResolvedRoute, &RouteInstance)> = routes.instances().collect();
    work.into_par_iter()
        .map(|(route, instance)| {
            if !stays_inside(&instance.output) {
                return Err(GenerateError::OutsideOutputDir(instance.output.clone()));
            }
            let ctx = RenderContext {
                config,
                routes,
                route,
                instance,
            };
            let renderer = route.definition.renderer().unwrap_or(&DefaultRenderer);
            let contents = renderer.render(&ctx).map_err(|source| GenerateError::Render {
                route: route.name().to_string(),
                key: instance.key.clone(),
                source,
            })?;
            let page = GeneratedPage {
                route: route.name().to_string(),
                key: instance.key.clone(),
                locale: instance.locale.clone(),
                permalink: instance.permalink.clone(),
                output: instance.output.clone(),
            };
            Ok::<_, GenerateError>((page, contents))
        })
        .collect()
}

/// Only plain names: no `.`, `..` or root components once the leading `/` is
/// dropped.
fn stays_inside(output: &str) -> bool {
    let relative = Path::new(output.trim_start_matches('/'));
    relative.as_os_str().len() > 0
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

// ============================================================================
// Default renderer
// ============================================================================

/// Fixed HTML layout used by routes without a renderer of their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRenderer;

impl Render for DefaultRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<String, CollaboratorError> {
        if let Some(content) = ctx.instance.data_str("content") {
            return Ok(content.to_string());
        }
        Ok(render_page(ctx)?.into_string())
    }
}

/// Links to every locale variant of the current page, in configured order.
fn alternates(ctx: &RenderContext<'_>) -> Result<Vec<(String, String)>, ViewError> {
    let mut links = Vec::new();
    for locale in &ctx.config.i18n.locales {
        if let Some(url) = ctx.locale_url(locale)? {
            links.push((locale.clone(), url));
        }
    }
    Ok(links)
}

fn page_title(ctx: &RenderContext<'_>) -> String {
    let site = ctx.config.title.as_str();
    match (ctx.instance.data_str("title"), site.is_empty()) {
        (Some(title), true) => title.to_string(),
        (Some(title), false) => format!("{title} | {site}"),
        (None, false) => site.to_string(),
        (None, true) => ctx.route.name().to_string(),
    }
}

fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);
    body_html
}

fn render_page(ctx: &RenderContext<'_>) -> Result<Markup, ViewError> {
    let alternates = alternates(ctx)?;
    let lang = ctx
        .locale()
        .unwrap_or(&ctx.config.i18n.default_locale)
        .to_string();
    let title = page_title(ctx);
    let heading = ctx.instance.data_str("title");
    let body = ctx.instance.data_str("body").map(markdown_to_html);

    let content = html! {
        (site_header(ctx, &alternates))
        main {
            @if let Some(heading) = heading {
                h1 { (heading) }
            }
            @if let Some(body) = body {
                article { (PreEscaped(body)) }
            }
            @if let Some(data) = ctx.data() {
                (render_listing(ctx, data))
            }
        }
    };

    Ok(base_document(&lang, &title, &alternates, content))
}

/// Renders the base HTML document structure
fn base_document(lang: &str, title: &str, alternates: &[(String, String)], content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @for (locale, url) in alternates {
                    link rel="alternate" hreflang=(locale) href=(url);
                }
            }
            body {
                (content)
            }
        }
    }
}

/// Site title and the locale switcher
fn site_header(ctx: &RenderContext<'_>, alternates: &[(String, String)]) -> Markup {
    let current = ctx.locale();
    html! {
        header.site-header {
            @if !ctx.config.title.is_empty() {
                a.site-title href="/" { (ctx.config.title) }
            }
            @if alternates.len() > 1 {
                nav.locale-switcher {
                    ul {
                        @for (locale, url) in alternates {
                            @let is_current = current == Some(locale.as_str());
                            li class=[is_current.then_some("current")] {
                                a href=(url) hreflang=(locale) { (locale) }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Item list and prev/next links of a pagination page
fn render_listing(ctx: &RenderContext<'_>, data: &Value) -> Markup {
    let items = data.get("items").and_then(Value::as_array);
    let link = |field: &str| {
        data.get(field)
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    };
    let prev = link("prev_url");
    let next = link("next_url");

    html! {
        @if let Some(items) = items {
            ul.items {
                @for item in items {
                    @let href = item.get("permalink").and_then(Value::as_str).unwrap_or("#");
                    @let label = item
                        .pointer("/data/title")
                        .and_then(Value::as_str)
                        .or_else(|| item.get("key").and_then(Value::as_str))
                        .unwrap_or(href);
                    li { a href=(href) { (label) } }
                }
            }
        }
        @if prev.is_some() || next.is_some() {
            nav.pagination {
                @if let Some(prev) = &prev {
                    a rel="prev" href=(prev) { (ctx.translate("pagination.prev", &[])) }
                }
                @if let Some(next) = &next {
                    a rel="next" href=(next) { (ctx.translate("pagination.next", &[])) }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
