//! Static presentation assets, stored once.
//!
//! Every CSS and JS string a block can need is registered here under an
//! [`AssetId`] and embedded at compile time from `static/`. Variant
//! templates name the assets they depend on; render results carry those
//! ids, and the generator emits each id once per site no matter how many
//! block instances reference it.
//!
//! ```text
//! static/
//! ├── base.css                  # page reset, layout primitives, buttons
//! ├── animate.js                # scroll-reveal for blocks with animation on
//! └── blocks/
//!     ├── cta.css               # base + all CTA variants
//!     ├── gallery-carousel.css  # carousel-only rules
//!     ├── gallery-lightbox.js   # only when display.lightbox is on
//!     └── ...
//! ```
//!
//! All scripts are self-contained IIFEs that bail out when `window` or
//! `document` is missing, so the bundle is safe to evaluate anywhere.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Css,
    Js,
}

/// Key into the asset registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(&'static str);

impl AssetId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for AssetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

#[derive(Debug)]
pub struct Asset {
    pub id: AssetId,
    pub kind: AssetKind,
    pub content: &'static str,
}

pub const BASE_CSS: AssetId = AssetId::new("base.css");
pub const ANIMATE_JS: AssetId = AssetId::new("animate.js");
pub const ERROR_CSS: AssetId = AssetId::new("error.css");

pub const HEADER_CSS: AssetId = AssetId::new("header.css");
pub const HEADER_JS: AssetId = AssetId::new("header.js");
pub const HERO_CSS: AssetId = AssetId::new("hero.css");
pub const HERO_FULLSCREEN_CSS: AssetId = AssetId::new("hero-fullscreen.css");
pub const FEATURES_CSS: AssetId = AssetId::new("features.css");
pub const CTA_CSS: AssetId = AssetId::new("cta.css");
pub const CTA_NEWSLETTER_JS: AssetId = AssetId::new("cta-newsletter.js");
pub const GALLERY_CSS: AssetId = AssetId::new("gallery.css");
pub const GALLERY_CAROUSEL_CSS: AssetId = AssetId::new("gallery-carousel.css");
pub const GALLERY_CAROUSEL_JS: AssetId = AssetId::new("gallery-carousel.js");
pub const GALLERY_LIGHTBOX_JS: AssetId = AssetId::new("gallery-lightbox.js");
pub const GALLERY_FILTER_JS: AssetId = AssetId::new("gallery-filter.js");
pub const PRICING_CSS: AssetId = AssetId::new("pricing.css");
pub const PRICING_TABLE_CSS: AssetId = AssetId::new("pricing-table.css");
pub const PRICING_TOGGLE_JS: AssetId = AssetId::new("pricing-toggle.js");
pub const FAQ_CSS: AssetId = AssetId::new("faq.css");
pub const FAQ_JS: AssetId = AssetId::new("faq.js");
pub const FOOTER_CSS: AssetId = AssetId::new("footer.css");
pub const FOOTER_TOP_JS: AssetId = AssetId::new("footer-top.js");

static REGISTRY: &[Asset] = &[
    css(BASE_CSS, include_str!("../static/base.css")),
    js(ANIMATE_JS, include_str!("../static/animate.js")),
    css(ERROR_CSS, include_str!("../static/error.css")),
    css(HEADER_CSS, include_str!("../static/blocks/header.css")),
    js(HEADER_JS, include_str!("../static/blocks/header.js")),
    css(HERO_CSS, include_str!("../static/blocks/hero.css")),
    css(
        HERO_FULLSCREEN_CSS,
        include_str!("../static/blocks/hero-fullscreen.css"),
    ),
    css(FEATURES_CSS, include_str!("../static/blocks/features.css")),
    css(CTA_CSS, include_str!("../static/blocks/cta.css")),
    js(
        CTA_NEWSLETTER_JS,
        include_str!("../static/blocks/cta-newsletter.js"),
    ),
    css(GALLERY_CSS, include_str!("../static/blocks/gallery.css")),
    css(
        GALLERY_CAROUSEL_CSS,
        include_str!("../static/blocks/gallery-carousel.css"),
    ),
    js(
        GALLERY_CAROUSEL_JS,
        include_str!("../static/blocks/gallery-carousel.js"),
    ),
    js(
        GALLERY_LIGHTBOX_JS,
        include_str!("../static/blocks/gallery-lightbox.js"),
    ),
    js(
        GALLERY_FILTER_JS,
        include_str!("../static/blocks/gallery-filter.js"),
    ),
    css(PRICING_CSS, include_str!("../static/blocks/pricing.css")),
    css(
        PRICING_TABLE_CSS,
        include_str!("../static/blocks/pricing-table.css"),
    ),
    js(
        PRICING_TOGGLE_JS,
        include_str!("../static/blocks/pricing-toggle.js"),
    ),
    css(FAQ_CSS, include_str!("../static/blocks/faq.css")),
    js(FAQ_JS, include_str!("../static/blocks/faq.js")),
    css(FOOTER_CSS, include_str!("../static/blocks/footer.css")),
    js(FOOTER_TOP_JS, include_str!("../static/blocks/footer-top.js")),
];

const fn css(id: AssetId, content: &'static str) -> Asset {
    Asset {
        id,
        kind: AssetKind::Css,
        content,
    }
}

const fn js(id: AssetId, content: &'static str) -> Asset {
    Asset {
        id,
        kind: AssetKind::Js,
        content,
    }
}

/// Look up a registered asset.
pub fn get(id: AssetId) -> Option<&'static Asset> {
    REGISTRY.iter().find(|a| a.id == id)
}

pub fn all() -> &'static [Asset] {
    REGISTRY
}

/// Concatenate the assets of `kind` among `ids`, each at most once, in
/// first-seen order. Unknown ids are skipped.
pub fn bundle(ids: &[AssetId], kind: AssetKind) -> String {
    let mut seen: Vec<AssetId> = Vec::new();
    let mut parts: Vec<String> = Vec::new();
    for id in ids {
        if seen.contains(id) {
            continue;
        }
        seen.push(*id);
        if let Some(asset) = get(*id).filter(|a| a.kind == kind) {
            parts.push(format!("/* {} */\n{}", asset.id, asset.content.trim_end()));
        }
    }
    parts.join("\n\n")
}

/// Push `id` onto `list` unless already present.
pub fn push_unique(list: &mut Vec<AssetId>, id: AssetId) {
    if !list.contains(&id) {
        list.push(id);
    }
}
