//! Site generation.
//!
//! The [`Generator`] façade turns a [`Project`] into a static site. Given
//! the project's pages, each an ordered list of block instances, it:
//!
//! 1. resolves the theme (studio `[theme]` with the project's branding layered on top),
//! 2. orders each page's visible blocks by `order` and looks up a renderer by `blockId`,
//! 3. renders every block, on a rayon pool when `options.parallel` is set,
//! 4. stitches the fragments back into page order and wraps each page in a document,
//! 5. de-duplicates static assets into one stylesheet and one script,
//! 6. minifies, scores and (unless `dry_run`) writes the files.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html              # First page of the project
//! ├── services/index.html     # Every other page under its slug
//! ├── assets/
//! │   ├── site.css            # Theme variables, each block stylesheet once, scoped rules
//! │   └── site.js             # Each block script once
//! ├── sitemap.xml
//! ├── robots.txt
//! └── .studio-cache.json      # Write manifest (when options.cache is on)
//! ```
//!
//! ## Failure handling
//!
//! Generation degrades per block, never per site. A block whose `blockId`
//! has no renderer is skipped with a warning. A block whose data fails
//! validation is reported in `errors` (code `VALIDATION_ERROR`) and its
//! error fragment still takes its place on the page. Only an empty project
//! or a failed write makes `success` false.
//!
//! Page bodies carry no timestamps, so generating the same project twice
//! produces byte-identical files.

use crate::assets::{self, AssetId, AssetKind};
use crate::blocks::{BlockRegistry, BlockType, pricing};
use crate::cache::{self, RenderMemo, WriteManifest};
use crate::config::{self, Environment, StudioConfig, ThemeConfig};
use crate::escape::escape_html;
use crate::logging::Logger;
use crate::minify;
use crate::naming;
use crate::project::{BlockInstance, PerformanceConfig, Project};
use crate::render::{BlockFailure, BlockRenderer, RenderContext, RenderResult};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

pub const SITE_CSS_PATH: &str = "assets/site.css";
pub const SITE_JS_PATH: &str = "assets/site.js";
/// In-memory log dump written when `generator.debug` is on.
pub const LOG_FILENAME: &str = "studio-log.json";

const TARGET: &str = "generate";

/// Header navigation holds at most this many links.
const MAX_NAV_LINKS: usize = 8;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("project has no pages")]
    EmptyProject,
    #[error("IO error writing {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenerateError {
    pub fn code(&self) -> &'static str {
        match self {
            GenerateError::EmptyProject => "EMPTY_PROJECT",
            GenerateError::Write { .. } => "WRITE_ERROR",
            GenerateError::Json(_) => "SERIALIZE_ERROR",
        }
    }
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> GenerateError + use<> {
    let path = path.display().to_string();
    move |source| GenerateError::Write { path, source }
}

// ============================================================================
// Result types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    pub output_path: String,
    pub files: Vec<GeneratedFile>,
    pub pages: Vec<GeneratedPage>,
    pub metrics: Metrics,
    pub warnings: Vec<String>,
    pub errors: Vec<GenerationError>,
}

impl GenerationResult {
    fn new(output_path: String) -> Self {
        Self {
            success: true,
            output_path,
            files: Vec::new(),
            pages: Vec::new(),
            metrics: Metrics::default(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn fail(&mut self, error: GenerateError) {
        self.success = false;
        let stack = std::error::Error::source(&error).map(|s| s.to_string());
        self.errors.push(GenerationError {
            code: error.code().to_string(),
            message: error.to_string(),
            stack,
        });
    }

    /// Look up a generated file by its output-relative path.
    pub fn file(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFile {
    /// Relative to the output directory, `/`-separated.
    pub path: String,
    /// Bytes as written.
    pub size: u64,
    /// Minified before writing.
    pub optimized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPage {
    pub name: String,
    pub slug: String,
    pub path: String,
    /// Blocks placed on the page, error fragments included.
    pub blocks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub files_generated: usize,
    pub pages_generated: usize,
    /// Bytes before minification.
    pub total_size: u64,
    /// Bytes after minification.
    pub compressed_size: u64,
    pub performance_score: u8,
    pub seo_score: u8,
    pub blocks_rendered: usize,
    /// Hidden blocks and blocks without a renderer.
    pub blocks_skipped: usize,
    /// Blocks replaced by an error fragment.
    pub blocks_failed: usize,
    pub cache_hits: u32,
    /// Files left untouched because their content did not change.
    pub files_unchanged: usize,
    pub duration_ms: u64,
}

// ============================================================================
// Generator
// ============================================================================

/// One file of the generated site, before it is written.
#[derive(Debug, Clone)]
struct OutputFile {
    path: String,
    content: String,
    original_size: u64,
    optimized: bool,
}

impl OutputFile {
    fn new(path: impl Into<String>, content: String, minifier: Option<fn(&str) -> String>) -> Self {
        let original_size = content.len() as u64;
        match minifier {
            Some(minify) => Self {
                path: path.into(),
                content: minify(&content),
                original_size,
                optimized: true,
            },
            None => Self {
                path: path.into(),
                content,
                original_size,
                optimized: false,
            },
        }
    }
}

/// A placed block waiting to be rendered.
struct Job<'a> {
    page: usize,
    instance: &'a BlockInstance,
    /// Site-unique key the block's DOM id is built from.
    key: String,
    renderer: Arc<dyn BlockRenderer>,
    data: Value,
}

/// Where a page lands in the output.
#[derive(Debug, Clone, PartialEq)]
struct PagePlan {
    slug: String,
    path: String,
    href: String,
}

pub struct Generator {
    config: StudioConfig,
    registry: BlockRegistry,
    logger: Arc<dyn Logger>,
    memo: RenderMemo,
}

impl Generator {
    /// A generator with every built-in block registered.
    pub fn new(config: StudioConfig, logger: Arc<dyn Logger>) -> Self {
        Self {
            registry: BlockRegistry::builtin(Arc::clone(&logger)),
            config,
            logger,
            memo: RenderMemo::new(),
        }
    }

    /// Replace the block registry (custom or test renderers).
    pub fn with_registry(mut self, registry: BlockRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.generator.output_path)
    }

    /// Generate the site for `project`.
    ///
    /// Never panics and never returns early with an error: every outcome
    /// is described by the returned [`GenerationResult`].
    pub fn generate(&self, project: &Project) -> GenerationResult {
        let started = Instant::now();
        let output_dir = self.output_dir();
        let options = &self.config.options;
        let mut result = GenerationResult::new(output_dir.display().to_string());
        let memo_before = self.memo.stats();

        self.logger.info(
            TARGET,
            &format!(
                "generating {} ({} pages) into {}",
                project.id,
                project.pages.len(),
                output_dir.display()
            ),
        );

        match self.build(project, &mut result) {
            Ok((files, scripts)) => {
                result.metrics.files_generated = files.len();
                result.metrics.total_size = files.iter().map(|f| f.original_size).sum();
                result.metrics.compressed_size =
                    files.iter().map(|f| f.content.len() as u64).sum();
                result.files = files
                    .iter()
                    .map(|f| GeneratedFile {
                        path: f.path.clone(),
                        size: f.content.len() as u64,
                        optimized: f.optimized,
                    })
                    .collect();
                result.metrics.performance_score = performance_score(
                    &project.performance,
                    result.metrics.compressed_size,
                    scripts,
                );

                if options.dry_run {
                    self.logger.info(
                        TARGET,
                        &format!("dry run: {} files not written", files.len()),
                    );
                } else {
                    match self.write(&files, &output_dir) {
                        Ok(unchanged) => result.metrics.files_unchanged = unchanged,
                        Err(e) => {
                            self.logger.error(TARGET, &e.to_string());
                            result.fail(e);
                        }
                    }
                }
            }
            Err(e) => {
                self.logger.error(TARGET, &e.to_string());
                result.fail(e);
            }
        }

        result.metrics.cache_hits = self.memo.stats().since(memo_before).hits;
        result.metrics.duration_ms = started.elapsed().as_millis() as u64;
        self.logger.info(
            TARGET,
            &format!(
                "finished in {} ms: {} files, {} warnings, {} errors",
                result.metrics.duration_ms,
                result.files.len(),
                result.warnings.len(),
                result.errors.len()
            ),
        );

        if self.config.generator.debug
            && !options.dry_run
            && let Err(e) = self.dump_log(&output_dir)
        {
            result.warnings.push(format!("debug log not written: {e}"));
        }
        result
    }

    /// Everything short of writing: render, assemble, minify, score.
    /// Also returns how many scripts went into the bundle.
    fn build(
        &self,
        project: &Project,
        result: &mut GenerationResult,
    ) -> Result<(Vec<OutputFile>, usize), GenerateError> {
        if project.pages.is_empty() {
            return Err(GenerateError::EmptyProject);
        }

        let theme = self.resolve_theme(project, &mut result.warnings);
        let ctx = RenderContext {
            theme,
            lazy_images: project.performance.lazy_load_images,
        };
        let plans = plan_pages(project);
        let nav: Vec<(String, String)> = project
            .pages
            .iter()
            .zip(&plans)
            .filter(|(page, _)| !page.name.trim().is_empty())
            .map(|(page, plan)| (page.name.trim().to_string(), plan.href.clone()))
            .collect();

        // Collect jobs in page order, blocks in `order`.
        let mut jobs: Vec<Job<'_>> = Vec::new();
        let mut block_keys: BTreeSet<String> = BTreeSet::new();
        for (page_index, page) in project.pages.iter().enumerate() {
            let ordered = page.ordered_blocks();
            result.metrics.blocks_skipped += page.blocks.len() - ordered.len();
            for instance in ordered {
                let Some(renderer) = self.registry.get(&instance.block_id) else {
                    let message = format!(
                        "{}: no renderer for block type '{}', block skipped",
                        location(&page.name, instance),
                        instance.block_id
                    );
                    self.logger.warn(TARGET, &message);
                    result.warnings.push(message);
                    result.metrics.blocks_skipped += 1;
                    continue;
                };
                let key =
                    naming::claim_block_key(&instance.id, &instance.block_id, &mut block_keys);
                jobs.push(Job {
                    page: page_index,
                    instance,
                    key,
                    renderer: Arc::clone(renderer),
                    data: prepare_data(instance, project, &nav),
                });
            }
        }

        self.memo.begin_run();
        let rendered = self.render_all(&jobs, &ctx);
        let evicted = self.memo.end_run();
        if evicted > 0 {
            self.logger
                .debug(TARGET, &format!("dropped {evicted} stale renders from the memo"));
        }

        // Stitch fragments back into their pages.
        let mut bodies: Vec<String> = vec![String::new(); project.pages.len()];
        let mut block_counts: Vec<usize> = vec![0; project.pages.len()];
        let mut site_assets: Vec<AssetId> = Vec::new();
        let mut scoped_rules: Vec<String> = Vec::new();
        for (job, render) in jobs.iter().zip(rendered) {
            let page = &project.pages[job.page];
            let loc = location(&page.name, job.instance);
            bodies[job.page].push_str(&render.html);
            block_counts[job.page] += 1;

            for id in &render.assets {
                assets::push_unique(&mut site_assets, *id);
            }
            if !render.custom_css.trim().is_empty() {
                scoped_rules.push(render.custom_css.clone());
            }
            result
                .warnings
                .extend(render.warnings.iter().map(|w| format!("{loc}: {w}")));

            match &render.failure {
                None => result.metrics.blocks_rendered += 1,
                Some(failure) => {
                    result.metrics.blocks_failed += 1;
                    let (code, what) = match failure {
                        BlockFailure::Validation(_) => ("VALIDATION_ERROR", "invalid block data"),
                        BlockFailure::Render(_) => ("RENDER_ERROR", "block could not be rendered"),
                    };
                    let message = format!(
                        "{loc} ({}): {what}: {}",
                        job.instance.block_id,
                        render.errors.join("; ")
                    );
                    self.logger.warn(TARGET, &message);
                    result.errors.push(GenerationError {
                        code: code.to_string(),
                        message,
                        stack: None,
                    });
                }
            }
        }

        let perf = &project.performance;
        let site_css = [
            config::generate_theme_css(&ctx.theme),
            assets::bundle(&site_assets, AssetKind::Css),
            scoped_rules.join("\n"),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
        let site_js = assets::bundle(&site_assets, AssetKind::Js);
        let has_js = !site_js.trim().is_empty();

        let base_url = self.config.generator.base_url();
        let indexable =
            project.seo.index && self.config.generator.environment == Environment::Production;

        let mut files = Vec::new();
        for (i, page) in project.pages.iter().enumerate() {
            let plan = &plans[i];
            let meta = PageMeta::new(project, i, plan, base_url, indexable);
            let document = page_document(&meta, &bodies[i], has_js).into_string();
            files.push(OutputFile::new(
                plan.path.clone(),
                document,
                perf.minify_html.then_some(minify::minify_html as fn(&str) -> String),
            ));
            result.pages.push(GeneratedPage {
                name: page.name.clone(),
                slug: plan.slug.clone(),
                path: plan.path.clone(),
                blocks: block_counts[i],
            });
        }
        result.metrics.pages_generated = project.pages.len();

        files.push(OutputFile::new(
            SITE_CSS_PATH,
            site_css,
            perf.minify_css.then_some(minify::minify_css as fn(&str) -> String),
        ));
        files.push(OutputFile::new(
            SITE_JS_PATH,
            site_js,
            perf.minify_js.then_some(minify::minify_js as fn(&str) -> String),
        ));
        let hrefs: Vec<&str> = plans.iter().map(|p| p.href.as_str()).collect();
        files.push(OutputFile::new("sitemap.xml", sitemap_xml(base_url, &hrefs), None));
        files.push(OutputFile::new("robots.txt", robots_txt(base_url, indexable), None));

        result.metrics.seo_score = seo_score(project, &bodies);
        let scripts = site_assets
            .iter()
            .filter(|id| assets::get(**id).is_some_and(|a| a.kind == AssetKind::Js))
            .count();
        Ok((files, scripts))
    }

    /// Studio theme with the project's branding on top. Unusable branding
    /// is reported and ignored.
    fn resolve_theme(&self, project: &Project, warnings: &mut Vec<String>) -> ThemeConfig {
        let studio = &self.config.theme;
        let Some(branding) = &project.branding else {
            return studio.clone();
        };
        let themed = match studio.with_overrides(branding) {
            Ok(theme) => theme,
            Err(e) => {
                let message = format!("branding ignored: {e}");
                self.logger.warn(TARGET, &message);
                warnings.push(message);
                return studio.clone();
            }
        };
        let invalid = themed.invalid_values();
        if invalid.is_empty() {
            return themed;
        }
        for (key, value) in invalid {
            let message =
                format!("branding ignored: {key} = {value:?} is not a safe CSS value");
            self.logger.warn(TARGET, &message);
            warnings.push(message);
        }
        studio.clone()
    }

    /// Render every job, results in job order.
    fn render_all(&self, jobs: &[Job<'_>], ctx: &RenderContext) -> Vec<RenderResult> {
        let options = &self.config.options;
        if options.parallel && jobs.len() > 1 {
            let threads = config::effective_threads(options.workers);
            match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => {
                    self.logger.debug(
                        TARGET,
                        &format!("rendering {} blocks on {threads} workers", jobs.len()),
                    );
                    return pool.install(|| {
                        jobs.par_iter().map(|job| self.render_job(job, ctx)).collect()
                    });
                }
                Err(e) => self
                    .logger
                    .warn(TARGET, &format!("worker pool unavailable, rendering sequentially: {e}")),
            }
        }
        jobs.iter().map(|job| self.render_job(job, ctx)).collect()
    }

    fn render_job(&self, job: &Job<'_>, ctx: &RenderContext) -> RenderResult {
        let instance = job.instance;
        if self.config.options.verbose {
            self.logger
                .info(TARGET, &format!("rendering {} ({})", instance.id, instance.block_id));
        }
        let render = || job.renderer.render_instance(&job.data, ctx, &job.key);
        if self.config.options.cache {
            let key = RenderMemo::key(&instance.block_id, &job.key, &job.data, ctx);
            self.memo.get_or_render(&key, render)
        } else {
            render()
        }
    }

    /// Write `files` under `output_dir`. Returns how many were unchanged.
    fn write(&self, files: &[OutputFile], output_dir: &Path) -> Result<usize, GenerateError> {
        let use_cache = self.config.options.cache;
        fs::create_dir_all(output_dir).map_err(write_error(output_dir))?;
        let mut manifest = if use_cache {
            WriteManifest::load(output_dir)
        } else {
            WriteManifest::empty()
        };

        let mut unchanged = 0;
        for file in files {
            let hash = cache::hash_bytes(file.content.as_bytes());
            if use_cache && manifest.is_current(&file.path, &hash, output_dir) {
                unchanged += 1;
                continue;
            }
            let target = output_dir.join(&file.path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(write_error(parent))?;
            }
            fs::write(&target, &file.content).map_err(write_error(&target))?;
            manifest.insert(file.path.clone(), hash);
            self.logger.debug(TARGET, &format!("wrote {}", file.path));
        }

        if use_cache {
            let paths: BTreeSet<String> = files.iter().map(|f| f.path.clone()).collect();
            manifest.retain_paths(&paths);
            let path = cache::manifest_path(output_dir);
            manifest.save(output_dir).map_err(write_error(&path))?;
        }
        Ok(unchanged)
    }

    fn dump_log(&self, output_dir: &Path) -> Result<(), GenerateError> {
        let path = output_dir.join(LOG_FILENAME);
        fs::create_dir_all(output_dir).map_err(write_error(output_dir))?;
        let json = serde_json::to_string_pretty(&self.logger.snapshot())?;
        fs::write(&path, json).map_err(write_error(&path))
    }
}

/// `Page › block-id` for messages.
fn location(page: &str, instance: &BlockInstance) -> String {
    let block = if instance.id.is_empty() {
        instance.block_id.as_str()
    } else {
        instance.id.as_str()
    };
    format!("{page} › {block}")
}

/// Slugs and paths for every page. The first page is home; repeated slugs
/// get a numeric suffix.
fn plan_pages(project: &Project) -> Vec<PagePlan> {
    let mut taken: BTreeSet<String> = BTreeSet::new();
    project
        .pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let base = naming::page_slug(&page.slug, &page.name, i);
            let mut slug = base.clone();
            let mut n = 2;
            // `assets` is reserved for the bundles.
            while taken.contains(&slug) || slug == "assets" {
                slug = format!("{base}-{n}");
                n += 1;
            }
            taken.insert(slug.clone());
            let is_home = i == 0;
            PagePlan {
                path: naming::page_output_path(&slug, is_home),
                href: naming::page_href(&slug, is_home),
                slug,
            }
        })
        .collect()
}

/// Fill site-wide defaults into block data the editor left out, and map
/// the flat pricing shape onto the nested one.
fn prepare_data(instance: &BlockInstance, project: &Project, nav: &[(String, String)]) -> Value {
    let mut data = instance.data.clone();
    let Some(map) = data.as_object_mut() else {
        return data;
    };
    let business = project.business_info.name.trim();
    match instance.block_id.parse::<BlockType>() {
        Ok(BlockType::Header) => {
            if !map.contains_key("nav") {
                let links: Vec<Value> = nav
                    .iter()
                    .take(MAX_NAV_LINKS)
                    .map(|(label, href)| serde_json::json!({ "label": label, "href": href }))
                    .collect();
                map.insert("nav".into(), Value::Array(links));
            }
            if !map.contains_key("logo") && !business.is_empty() {
                map.insert("logo".into(), serde_json::json!({ "text": truncate(business, 60) }));
            }
        }
        Ok(BlockType::Footer) => {
            if !map.contains_key("brand") && !business.is_empty() {
                map.insert("brand".into(), Value::from(truncate(business, 60)));
            }
        }
        Ok(BlockType::Pricing) if pricing::is_flat(map) => {
            return pricing::from_flat(map);
        }
        _ => {}
    }
    data
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

// ============================================================================
// Documents
// ============================================================================

/// `<head>` content of one page.
struct PageMeta<'a> {
    lang: &'a str,
    title: String,
    description: String,
    keywords: String,
    canonical: String,
    site_name: &'a str,
    og_image: Option<String>,
    twitter_handle: &'a str,
    indexable: bool,
}

impl<'a> PageMeta<'a> {
    fn new(
        project: &'a Project,
        index: usize,
        plan: &PagePlan,
        base_url: &str,
        indexable: bool,
    ) -> Self {
        let page = &project.pages[index];
        let site = project.site_title();
        let title = if !page.title.trim().is_empty() {
            page.title.clone()
        } else if index == 0 || page.name.trim().is_empty() {
            site.to_string()
        } else {
            format!("{} | {site}", page.name)
        };
        let fallback = if project.seo.description.trim().is_empty() {
            project.business_info.description.as_str()
        } else {
            project.seo.description.as_str()
        };
        let description = page
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(fallback)
            .to_string();
        let og_image = (!project.seo.og_image.is_empty()).then(|| {
            let image = &project.seo.og_image;
            if image.starts_with("http://") || image.starts_with("https://") {
                image.clone()
            } else {
                format!("{base_url}/{}", image.trim_start_matches('/'))
            }
        });
        Self {
            lang: &project.seo.language,
            title,
            description,
            keywords: project.seo.keywords.join(", "),
            canonical: format!("{base_url}{}", plan.href),
            site_name: site,
            og_image,
            twitter_handle: &project.seo.twitter_handle,
            indexable,
        }
    }
}

/// Renders the base HTML document structure around the page's blocks.
fn page_document(meta: &PageMeta<'_>, body: &str, has_js: bool) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(meta.lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (meta.title) }
                @if !meta.description.is_empty() {
                    meta name="description" content=(meta.description);
                }
                @if !meta.keywords.is_empty() {
                    meta name="keywords" content=(meta.keywords);
                }
                @if !meta.indexable {
                    meta name="robots" content="noindex, nofollow";
                }
                link rel="canonical" href=(meta.canonical);
                meta property="og:type" content="website";
                meta property="og:title" content=(meta.title);
                meta property="og:url" content=(meta.canonical);
                meta property="og:site_name" content=(meta.site_name);
                @if !meta.description.is_empty() {
                    meta property="og:description" content=(meta.description);
                }
                @if let Some(image) = &meta.og_image {
                    meta property="og:image" content=(image);
                    meta name="twitter:card" content="summary_large_image";
                }
                @if !meta.twitter_handle.is_empty() {
                    meta name="twitter:site" content=(meta.twitter_handle);
                }
                link rel="stylesheet" href={ "/" (SITE_CSS_PATH) };
                @if has_js {
                    script src={ "/" (SITE_JS_PATH) } defer {}
                }
            }
            body {
                (PreEscaped(body))
            }
        }
    }
}

pub fn sitemap_xml(base_url: &str, hrefs: &[&str]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for (i, href) in hrefs.iter().enumerate() {
        let priority = if i == 0 { "1.0" } else { "0.8" };
        xml.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <priority>{priority}</priority>\n  </url>\n",
            escape_html(&format!("{base_url}{href}"))
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Crawlable sites point at the sitemap; everything else is closed.
pub fn robots_txt(base_url: &str, indexable: bool) -> String {
    if indexable {
        format!("User-agent: *\nAllow: /\n\nSitemap: {base_url}/sitemap.xml\n")
    } else {
        "User-agent: *\nDisallow: /\n".to_string()
    }
}

// ============================================================================
// Scores
// ============================================================================

/// Naive 0–100 performance estimate from build switches and payload size.
pub fn performance_score(perf: &PerformanceConfig, bytes: u64, scripts: usize) -> u8 {
    let mut score: i64 = 100;
    if !perf.minify_html {
        score -= 10;
    }
    if !perf.minify_css {
        score -= 5;
    }
    if !perf.minify_js {
        score -= 5;
    }
    if !perf.lazy_load_images {
        score -= 10;
    }
    let kib = bytes / 1024;
    if kib > 250 {
        score -= (((kib - 250) / 100 + 1) * 5).min(40) as i64;
    }
    score -= 2 * scripts.saturating_sub(4) as i64;
    score.clamp(0, 100) as u8
}

/// Naive 0–100 SEO estimate from project metadata and page headings.
pub fn seo_score(project: &Project, page_bodies: &[String]) -> u8 {
    let mut score: i64 = 100;
    if project.seo.title.trim().is_empty() {
        score -= 10;
        if project.business_info.name.trim().is_empty() {
            score -= 10;
        }
    }
    if project.seo.description.trim().is_empty()
        && project.business_info.description.trim().is_empty()
    {
        score -= 20;
    }
    if project.seo.keywords.is_empty() {
        score -= 10;
    }
    if project.seo.og_image.trim().is_empty() {
        score -= 10;
    }
    if !project.seo.index {
        score -= 20;
    }
    let without_h1 = page_bodies.iter().filter(|b| !b.contains("<h1")).count() as i64;
    score -= (without_h1 * 10).min(30);
    score.clamp(0, 100) as u8
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use crate::logging::LogEntry;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn empty_project_fails() {
        let tmp = TempDir::new().unwrap();
        let result = quiet_generator(tmp.path()).generate(&project(json!([])));
        assert!(!result.success);
        assert_eq!(result.errors[0].code, "EMPTY_PROJECT");
        assert!(result.files.is_empty());
    }

    #[test]
    fn first_page_is_index_others_use_slug() {
        let tmp = TempDir::new().unwrap();
        let result = quiet_generator(tmp.path()).generate(&project(json!([
            { "name": "Home", "blocks": [hero("h")] },
            { "name": "About Us", "blocks": [hero("a")] }
        ])));
        assert!(result.success, "{:?}", result.errors);
        let paths: Vec<&str> = result.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "index.html",
                "about-us/index.html",
                SITE_CSS_PATH,
                SITE_JS_PATH,
                "sitemap.xml",
                "robots.txt"
            ]
        );
        assert!(tmp.path().join("about-us/index.html").exists());
    }

    #[test]
    fn repeated_slugs_get_suffix() {
        let p = project(json!([
            { "name": "Home" },
            { "name": "Team" },
            { "name": "team" },
            { "name": "Assets" }
        ]));
        let slugs: Vec<String> = plan_pages(&p).into_iter().map(|p| p.slug).collect();
        assert_eq!(slugs, vec!["home", "team", "team-2", "assets-2"]);
    }

    #[test]
    fn blocks_follow_order_field() {
        let tmp = TempDir::new().unwrap();
        let result = quiet_generator(tmp.path()).generate(&project(json!([{
            "name": "Home",
            "blocks": [
                { "id": "second", "blockId": "cta", "order": 2, "data": { "title": "Second" } },
                { "id": "first", "blockId": "cta", "order": 1, "data": { "title": "First" } }
            ]
        }])));
        let html = read_output(tmp.path(), "index.html");
        assert_in_order(&html, &["blk-first", "blk-second"]);
        assert_eq!(result.pages[0].blocks, 2);
    }

    #[test]
    fn missing_renderer_warns_and_skips() {
        let tmp = TempDir::new().unwrap();
        let result = quiet_generator(tmp.path()).generate(&project(json!([{
            "name": "Home",
            "blocks": [
                { "id": "x", "blockId": "testimonials", "order": 1 },
                hero("h")
            ]
        }])));
        assert!(result.success);
        assert_eq!(
            result.warnings,
            vec!["Home › x: no renderer for block type 'testimonials', block skipped"]
        );
        assert_eq!(result.metrics.blocks_skipped, 1);
        assert_eq!(result.metrics.blocks_rendered, 1);
    }

    #[test]
    fn custom_registry_resolves_extra_keys() {
        let tmp = TempDir::new().unwrap();
        let logger: Arc<dyn Logger> = Arc::new(crate::logging::NullLogger);
        let mut registry = BlockRegistry::builtin(Arc::clone(&logger));
        registry.register("promo", BlockType::Cta.renderer(logger));
        let generator = quiet_generator(tmp.path()).with_registry(registry);
        assert!(generator.registry().get("promo").is_some());

        let result = generator.generate(&project(json!([{
            "name": "Home",
            "blocks": [{ "id": "p", "blockId": "promo", "order": 1, "data": { "title": "Spring sale" } }]
        }])));
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        assert!(read_output(tmp.path(), "index.html").contains("Spring sale"));
    }

    #[test]
    fn hidden_blocks_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let result = quiet_generator(tmp.path()).generate(&project(json!([{
            "name": "Home",
            "blocks": [
                hero("h"),
                { "id": "secret", "blockId": "cta", "order": 5, "visible": false, "data": { "title": "Hidden" } }
            ]
        }])));
        assert_eq!(result.metrics.blocks_skipped, 1);
        assert!(!read_output(tmp.path(), "index.html").contains("Hidden"));
    }

    #[test]
    fn invalid_block_is_reported_and_generation_continues() {
        let tmp = TempDir::new().unwrap();
        let result = quiet_generator(tmp.path()).generate(&project(json!([{
            "name": "Home",
            "blocks": [
                { "id": "broken", "blockId": "hero", "order": 1, "data": { "variant": "diagonal" } },
                { "id": "ok", "blockId": "cta", "order": 2, "data": { "title": "Still here" } }
            ]
        }])));
        assert!(result.success);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "VALIDATION_ERROR");
        assert!(result.errors[0].message.starts_with("Home › broken (hero): invalid block data: "));
        assert!(result.errors[0].message.contains("variant:"));
        assert_eq!(result.metrics.blocks_failed, 1);

        let html = read_output(tmp.path(), "index.html");
        assert!(html.contains("blk-error"));
        assert!(html.contains("Still here"));
    }

    #[test]
    fn assets_are_emitted_once() {
        let tmp = TempDir::new().unwrap();
        let mut p = project(json!([
            { "name": "Home", "blocks": [cta("a", 1), cta("b", 2)] },
            { "name": "More", "blocks": [cta("c", 1)] }
        ]));
        p.performance.minify_css = false;
        quiet_generator(tmp.path()).generate(&p);
        let css = read_output(tmp.path(), SITE_CSS_PATH);
        assert!(css.starts_with(":root {"));
        assert_eq!(css.matches("/* cta.css */").count(), 1);
        assert_eq!(css.matches("/* base.css */").count(), 1);
    }

    #[test]
    fn same_instance_id_on_two_pages_keeps_each_background() {
        let tmp = TempDir::new().unwrap();
        let block = |color: &str| {
            json!({ "id": "cta-1", "blockId": "cta", "order": 1, "data": {
                "title": "Talk to us",
                "background": { "type": "solid", "color": color }
            }})
        };
        let mut p = project(json!([
            { "name": "Home", "blocks": [block("#ff0000")] },
            { "name": "Contact", "blocks": [block("#0000ff")] }
        ]));
        p.performance.minify_css = false;
        quiet_generator(tmp.path()).generate(&p);

        let css = read_output(tmp.path(), SITE_CSS_PATH);
        let rule = |selector: &str| {
            css.lines()
                .find(|l| l.starts_with(selector))
                .unwrap_or_else(|| panic!("no rule for {selector}"))
                .to_string()
        };
        assert!(rule("#blk-cta-1 {").contains("--blk-bg: #ff0000"));
        assert!(rule("#blk-cta-1-2 {").contains("--blk-bg: #0000ff"));
        assert!(read_output(tmp.path(), "index.html").contains("id=\"blk-cta-1\""));
        assert!(read_output(tmp.path(), "contact/index.html").contains("id=\"blk-cta-1-2\""));
    }

    #[test]
    fn every_block_gets_a_unique_dom_id() {
        let tmp = TempDir::new().unwrap();
        let anonymous =
            |order: i64| json!({ "blockId": "cta", "order": order, "data": { "title": "Hi" } });
        let result = quiet_generator(tmp.path()).generate(&project(json!([
            { "name": "Home", "blocks": [anonymous(1), anonymous(2), cta("x", 3)] },
            { "name": "More", "blocks": [cta("x", 1), anonymous(2), hero("x")] }
        ])));
        assert!(result.success);

        let mut ids: Vec<String> = Vec::new();
        for page in &result.pages {
            let html = read_output(tmp.path(), &page.path);
            ids.extend(
                html.split(" id=\"")
                    .skip(1)
                    .filter_map(|rest| rest.split('"').next())
                    .filter(|id| id.starts_with("blk-"))
                    .map(str::to_string),
            );
        }
        assert_eq!(ids.len(), 6, "{ids:?}");
        let unique: BTreeSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len(), "duplicate DOM ids: {ids:?}");
        assert!(ids.contains(&"blk-cta-2".to_string()));
        assert!(ids.contains(&"blk-x-3".to_string()));
    }

    #[test]
    fn script_tag_only_when_scripts_exist() {
        let tmp = TempDir::new().unwrap();
        quiet_generator(tmp.path()).generate(&project(json!([
            { "name": "Home", "blocks": [hero("h")] }
        ])));
        assert!(!read_output(tmp.path(), "index.html").contains("site.js"));

        let tmp = TempDir::new().unwrap();
        quiet_generator(tmp.path()).generate(&project(json!([
            { "name": "Home", "blocks": [{ "id": "f", "blockId": "faq", "order": 1, "data": {
                "items": [{ "question": "Q?", "answer": "A." }]
            }}] }
        ])));
        let html = read_output(tmp.path(), "index.html");
        assert!(html.contains("<script src=\"/assets/site.js\" defer></script>"));
    }

    #[test]
    fn header_gets_page_links_and_business_name() {
        let tmp = TempDir::new().unwrap();
        quiet_generator(tmp.path()).generate(&project(json!([
            { "name": "Home", "blocks": [{ "id": "top", "blockId": "header", "order": 0 }] },
            { "name": "Contact", "blocks": [] }
        ])));
        let html = read_output(tmp.path(), "index.html");
        assert!(html.contains("href=\"/contact/\""));
        assert!(html.contains("Acme"));
    }

    #[test]
    fn explicit_header_nav_is_kept() {
        let p = project(json!([{ "name": "Home" }, { "name": "Contact" }]));
        let instance: BlockInstance = serde_json::from_value(json!({
            "id": "top", "blockId": "header", "data": { "nav": [] }
        }))
        .unwrap();
        let data = prepare_data(&instance, &p, &[("Home".into(), "/".into())]);
        assert_eq!(data["nav"], json!([]));
    }

    #[test]
    fn flat_pricing_is_adapted() {
        let tmp = TempDir::new().unwrap();
        let result = quiet_generator(tmp.path()).generate(&project(json!([{
            "name": "Home",
            "blocks": [hero("h"), { "id": "p", "blockId": "pricing", "order": 2, "data": {
                "plan1_name": "Starter", "plan1_price": "$9",
                "plan2_name": "Pro", "plan2_price": "$29"
            }}]
        }])));
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let html = read_output(tmp.path(), "index.html");
        assert_in_order(&html, &["Starter", "Pro"]);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        let result = generator_with(&out, |c| c.options.dry_run = true)
            .generate(&project(json!([{ "name": "Home", "blocks": [hero("h")] }])));
        assert!(result.success);
        assert_eq!(result.metrics.files_generated, 5);
        assert!(!out.exists());
    }

    #[test]
    fn generation_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let p = load_fixture_project("tech-solutions.json");
        let generator = quiet_generator(tmp.path());
        let first = generator.generate(&p);
        let html_first = read_output(tmp.path(), "index.html");
        let second = generator.generate(&p);
        assert_eq!(first.files, second.files);
        assert_eq!(html_first, read_output(tmp.path(), "index.html"));
        assert_eq!(second.metrics.files_unchanged, second.files.len());
        assert!(second.metrics.cache_hits > 0);
    }

    #[test]
    fn regenerating_after_an_edit_forgets_the_old_render() {
        let tmp = TempDir::new().unwrap();
        let generator = quiet_generator(tmp.path());
        let mut p = project(json!([{ "name": "Home", "blocks": [hero("h"), cta("c", 2)] }]));
        generator.generate(&p);
        assert_eq!(generator.memo.len(), 2);

        p.pages[0].blocks[1].data = json!({ "title": "Edited" });
        let second = generator.generate(&p);
        assert_eq!(second.metrics.cache_hits, 1);
        assert_eq!(generator.memo.len(), 2);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let p = load_fixture_project("tech-solutions.json");
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let parallel = generator_with(a.path(), |c| {
            c.options.parallel = true;
            c.options.workers = Some(4);
        })
        .generate(&p);
        let sequential = generator_with(b.path(), |c| c.options.parallel = false).generate(&p);
        assert_eq!(parallel.files, sequential.files);
        assert_eq!(
            read_output(a.path(), "index.html"),
            read_output(b.path(), "index.html")
        );
    }

    #[test]
    fn minification_shrinks_output() {
        let tmp = TempDir::new().unwrap();
        let result = quiet_generator(tmp.path()).generate(&load_fixture_project("tech-solutions.json"));
        assert!(result.metrics.compressed_size < result.metrics.total_size);
        assert!(find_file(&result, SITE_CSS_PATH).optimized);
        assert!(!find_file(&result, "robots.txt").optimized);
    }

    #[test]
    fn unsafe_branding_falls_back_to_studio_theme() {
        let tmp = TempDir::new().unwrap();
        let mut p = project(json!([{ "name": "Home", "blocks": [hero("h")] }]));
        p.branding = Some(json!({ "colors": { "primary": "red;}body{display:none" } }));
        let result = quiet_generator(tmp.path()).generate(&p);
        assert!(result.warnings.iter().any(|w| w.contains("colors.primary")));
        let css = read_output(tmp.path(), SITE_CSS_PATH);
        assert!(!css.contains("red;}body"));
    }

    #[test]
    fn branding_colors_reach_the_stylesheet() {
        let tmp = TempDir::new().unwrap();
        let mut p = project(json!([{ "name": "Home", "blocks": [hero("h")] }]));
        p.branding = Some(json!({ "colors": { "primary": "#0f766e" } }));
        quiet_generator(tmp.path()).generate(&p);
        assert!(read_output(tmp.path(), SITE_CSS_PATH).contains("--color-primary:#0f766e"));
    }

    #[test]
    fn staging_sites_are_not_indexed() {
        let tmp = TempDir::new().unwrap();
        generator_with(tmp.path(), |c| c.generator.environment = Environment::Staging)
            .generate(&project(json!([{ "name": "Home", "blocks": [hero("h")] }])));
        assert_eq!(read_output(tmp.path(), "robots.txt"), "User-agent: *\nDisallow: /\n");
        assert!(read_output(tmp.path(), "index.html").contains("noindex"));
    }

    #[test]
    fn debug_writes_log_dump() {
        let tmp = TempDir::new().unwrap();
        let (generator, _) = recording_generator(tmp.path(), |c| c.generator.debug = true);
        generator.generate(&project(json!([{ "name": "Home", "blocks": [hero("h")] }])));
        let log: Vec<LogEntry> =
            serde_json::from_str(&read_output(tmp.path(), LOG_FILENAME)).unwrap();
        assert!(log.iter().any(|e| e.target == "generate"));
    }

    #[test]
    fn write_failure_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("dist");
        fs::write(&blocker, "a file where the output directory should be").unwrap();
        let result = quiet_generator(&blocker)
            .generate(&project(json!([{ "name": "Home", "blocks": [hero("h")] }])));
        assert!(!result.success);
        assert_eq!(result.errors.last().unwrap().code, "WRITE_ERROR");
        assert!(result.errors.last().unwrap().stack.is_some());
    }

    #[test]
    fn sitemap_lists_every_page() {
        let xml = sitemap_xml("https://acme.example", &["/", "/about/"]);
        assert!(xml.contains("<loc>https://acme.example/</loc>"));
        assert!(xml.contains("<loc>https://acme.example/about/</loc>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert!(!xml.contains("lastmod"));
    }

    #[test]
    fn robots_points_to_sitemap() {
        assert_eq!(
            robots_txt("https://acme.example", true),
            "User-agent: *\nAllow: /\n\nSitemap: https://acme.example/sitemap.xml\n"
        );
    }

    #[test]
    fn performance_score_penalizes_switches_and_size() {
        let perf = PerformanceConfig::default();
        assert_eq!(performance_score(&perf, 10_000, 2), 100);
        let slow = PerformanceConfig {
            minify_html: false,
            lazy_load_images: false,
            ..PerformanceConfig::default()
        };
        assert_eq!(performance_score(&slow, 10_000, 2), 80);
        assert_eq!(performance_score(&perf, 400 * 1024, 6), 86);
    }

    #[test]
    fn seo_score_rewards_metadata() {
        let mut p = project(json!([{ "name": "Home" }]));
        let bare = seo_score(&p, &["<h1>Hi</h1>".to_string()]);
        p.seo.title = "Acme".into();
        p.seo.description = "We build things".into();
        p.seo.keywords = vec!["acme".into()];
        p.seo.og_image = "/og.png".into();
        assert_eq!(seo_score(&p, &["<h1>Hi</h1>".to_string()]), 100);
        assert!(bare < 100);
        assert_eq!(seo_score(&p, &["<p>no heading</p>".to_string()]), 90);
    }
}
