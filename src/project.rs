//! Project description consumed by the generator.
//!
//! A project is produced upstream (the onboarding wizard plus the content
//! service that turns its answers into pages) and arrives here as JSON
//! with camelCase keys:
//!
//! ```json
//! {
//!   "id": "proj_001",
//!   "domain": "techsolutions.example",
//!   "businessInfo": { "name": "Tech Solutions Inc", "industry": "technology" },
//!   "pages": [{
//!     "name": "Home",
//!     "slug": "home",
//!     "blocks": [
//!       { "id": "hero-1", "blockId": "hero", "order": 1, "data": { "title": "…" } }
//!     ]
//!   }]
//! }
//! ```
//!
//! Block `data` stays untyped JSON until the block's renderer validates it;
//! the project itself only needs to be structurally sound.

use serde::{Deserialize, Serialize};
use std::path::Path;
use strum::{Display, EnumString};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub domain: String,
    pub business_info: BusinessInfo,
    /// Sparse theme overrides (same shape as `[theme]` in `studio.toml`),
    /// layered over the studio theme.
    #[serde(default)]
    pub branding: Option<serde_json::Value>,
    /// Name of the template the pages were composed from.
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub seo: SeoConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub status: ProjectStatus,
}

impl Project {
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Page title falling back to the business name.
    pub fn site_title(&self) -> &str {
        if self.seo.title.trim().is_empty() {
            &self.business_info.name
        } else {
            &self.seo.title
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BusinessInfo {
    pub name: String,
    pub description: String,
    pub industry: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    /// `<title>` of the page; falls back to `name`.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub blocks: Vec<BlockInstance>,
}

impl Page {
    /// Visible blocks sorted by their `order` field.
    ///
    /// The sort is stable, so blocks sharing an order keep their array
    /// position relative to each other.
    pub fn ordered_blocks(&self) -> Vec<&BlockInstance> {
        let mut blocks: Vec<&BlockInstance> = self.blocks.iter().filter(|b| b.visible).collect();
        blocks.sort_by_key(|b| b.order);
        blocks
    }
}

/// One placed block on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInstance {
    #[serde(default)]
    pub id: String,
    /// Renderer key, e.g. `"hero"` or `"pricing"`.
    pub block_id: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
    #[serde(default = "default_true")]
    pub visible: bool,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeoConfig {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub og_image: String,
    pub twitter_handle: String,
    /// Allow search engines to index the site.
    pub index: bool,
    pub language: String,
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            keywords: Vec::new(),
            og_image: String::new(),
            twitter_handle: String::new(),
            index: true,
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PerformanceConfig {
    pub minify_html: bool,
    pub minify_css: bool,
    pub minify_js: bool,
    pub lazy_load_images: bool,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            minify_html: true,
            minify_css: true,
            minify_js: true,
            lazy_load_images: true,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Generating,
    Published,
    Archived,
}
