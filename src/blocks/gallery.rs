//! Image gallery with optional lightbox, category filter, and carousel.

use super::BlockType;
use super::common::{
    self, ANIMATION, Animation, BACKGROUND, Background, Frame, IMAGE, Image, LAYOUT, Layout, STYLE,
    VisualStyle,
};
use crate::assets::{
    AssetId, GALLERY_CAROUSEL_CSS, GALLERY_CAROUSEL_JS, GALLERY_CSS, GALLERY_FILTER_JS,
    GALLERY_LIGHTBOX_JS,
};
use crate::naming;
use crate::render::{Block, RenderContext, RenderError, VariantTemplate};
use crate::schema::{Field, Rule, TEXT};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, VariantNames};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GalleryVariant {
    #[default]
    Grid,
    Masonry,
    Carousel,
    Justified,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryItem {
    pub id: String,
    pub image: Image,
    /// Full-size image opened by the lightbox; defaults to `image.src`.
    pub full: String,
    pub caption: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Display {
    pub columns: u8,
    pub lightbox: bool,
    pub captions: bool,
    /// Category filter bar above the items.
    pub filter: bool,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            columns: 3,
            lightbox: true,
            captions: true,
            filter: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Carousel {
    /// Autoplay interval in milliseconds; 0 disables autoplay.
    pub autoplay: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryData {
    pub variant: GalleryVariant,
    pub style: VisualStyle,
    pub layout: Layout,
    pub background: Background,
    pub animation: Animation,
    pub title: String,
    pub subtitle: String,
    pub items: Vec<GalleryItem>,
    pub display: Display,
    pub carousel: Carousel,
}

impl GalleryData {
    /// Distinct non-empty categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for item in &self.items {
            let category = item.category.trim();
            if !category.is_empty() && !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }

    fn show_filter(&self) -> bool {
        self.display.filter && !self.categories().is_empty()
    }
}

const ITEM_FIELDS: &[Field] = &[
    Field::optional("id", TEXT),
    Field::required("image", IMAGE),
    Field::optional("full", TEXT),
    Field::optional(
        "caption",
        Rule::Str {
            min: 0,
            max: Some(200),
        },
    ),
    Field::optional(
        "category",
        Rule::Str {
            min: 0,
            max: Some(40),
        },
    ),
];

const DISPLAY_FIELDS: &[Field] = &[
    Field::optional(
        "columns",
        Rule::Int {
            min: Some(1),
            max: Some(6),
        },
    ),
    Field::optional("lightbox", Rule::Bool),
    Field::optional("captions", Rule::Bool),
    Field::optional("filter", Rule::Bool),
];

const CAROUSEL_FIELDS: &[Field] = &[Field::optional(
    "autoplay",
    Rule::Int {
        min: Some(0),
        max: Some(20_000),
    },
)];

const FIELDS: &[Field] = &[
    Field::optional("variant", Rule::Enum(GalleryVariant::VARIANTS)),
    Field::optional("style", STYLE),
    Field::optional("layout", LAYOUT),
    Field::optional("background", BACKGROUND),
    Field::optional("animation", ANIMATION),
    Field::optional(
        "title",
        Rule::Str {
            min: 0,
            max: Some(120),
        },
    ),
    Field::optional(
        "subtitle",
        Rule::Str {
            min: 0,
            max: Some(300),
        },
    ),
    Field::required(
        "items",
        Rule::Array {
            item: &Rule::Object(ITEM_FIELDS),
            min: 1,
            max: Some(60),
        },
    ),
    Field::optional("display", Rule::Object(DISPLAY_FIELDS)),
    Field::optional("carousel", Rule::Object(CAROUSEL_FIELDS)),
];

static GRID: VariantTemplate<GalleryData> = VariantTemplate {
    name: "grid",
    build: wall,
    assets: &[],
};

static MASONRY: VariantTemplate<GalleryData> = VariantTemplate {
    name: "masonry",
    build: wall,
    assets: &[],
};

static CAROUSEL: VariantTemplate<GalleryData> = VariantTemplate {
    name: "carousel",
    build: carousel,
    assets: &[GALLERY_CAROUSEL_CSS, GALLERY_CAROUSEL_JS],
};

static JUSTIFIED: VariantTemplate<GalleryData> = VariantTemplate {
    name: "justified",
    build: wall,
    assets: &[],
};

pub struct Gallery;

impl Block for Gallery {
    type Data = GalleryData;

    const TYPE: BlockType = BlockType::Gallery;
    const FIELDS: &'static [Field] = FIELDS;
    const VARIANTS: &'static [&'static str] = GalleryVariant::VARIANTS;
    const BASE_ASSETS: &'static [AssetId] = &[GALLERY_CSS];

    fn default_data() -> GalleryData {
        let item = |n: u32, category: &str| GalleryItem {
            id: common::new_id(),
            image: Image::new(
                &format!("/images/gallery-{n}.jpg"),
                &format!("Sample photo {n}"),
            ),
            full: String::new(),
            caption: format!("Project {n}"),
            category: category.to_string(),
        };
        GalleryData {
            title: "Our work".to_string(),
            items: vec![
                item(1, "Web"),
                item(2, "Brand"),
                item(3, "Web"),
                item(4, "Print"),
                item(5, "Brand"),
                item(6, "Web"),
            ],
            ..GalleryData::default()
        }
    }

    fn normalize(data: &mut GalleryData) {
        common::fill_positional_ids(data.items.iter_mut().map(|i| &mut i.id), "image");
    }

    fn template(data: &GalleryData) -> &'static VariantTemplate<GalleryData> {
        match data.variant {
            GalleryVariant::Grid => &GRID,
            GalleryVariant::Masonry => &MASONRY,
            GalleryVariant::Carousel => &CAROUSEL,
            GalleryVariant::Justified => &JUSTIFIED,
        }
    }

    fn frame(data: &GalleryData) -> Frame<'_> {
        Frame::new(data.style, &data.layout, &data.background, &data.animation)
    }

    fn feature_assets(data: &GalleryData) -> Vec<AssetId> {
        let mut ids = Vec::new();
        if data.display.lightbox {
            ids.push(GALLERY_LIGHTBOX_JS);
        }
        if data.show_filter() {
            ids.push(GALLERY_FILTER_JS);
        }
        ids
    }

    fn warnings(data: &GalleryData) -> Vec<String> {
        let paths: Vec<String> = (0..data.items.len())
            .map(|i| format!("items.{i}.image"))
            .collect();
        let mut warnings = common::missing_alt(
            paths
                .iter()
                .map(String::as_str)
                .zip(data.items.iter().map(|i| &i.image)),
        );
        if data.display.filter && data.categories().is_empty() {
            warnings.push("display.filter: no item has a category, filter bar omitted".to_string());
        }
        warnings
    }
}

fn filter_bar(data: &GalleryData) -> Markup {
    html! {
        @if data.show_filter() {
            div.gal-filters role="group" aria-label="Filter images" {
                button.gal-filter.is-active type="button" data-filter="*" aria-pressed="true" { "All" }
                @for category in data.categories() {
                    button.gal-filter type="button" data-filter=(category) aria-pressed="false" {
                        (category)
                    }
                }
            }
        }
    }
}

fn items(data: &GalleryData, ctx: &RenderContext, dom_id: &str) -> Markup {
    let lightbox = data.display.lightbox;
    html! {
        ul.gal-items data-lightbox[lightbox] {
            @for item in &data.items {
                @let category = item.category.trim();
                li.gal-item id={ (dom_id) "-" (naming::slugify(&item.id)) }
                    data-category=[(!category.is_empty()).then_some(category)] data-stagger-item {
                    @if lightbox {
                        @let full = if item.full.trim().is_empty() { &item.image.src } else { &item.full };
                        a href=(common::safe_href(full)) {
                            (common::image(&item.image, ctx.lazy_images, None))
                        }
                    } @else {
                        (common::image(&item.image, ctx.lazy_images, None))
                    }
                    @if data.display.captions && !item.caption.is_empty() {
                        p.gal-caption { (item.caption) }
                    }
                }
            }
        }
    }
}

/// Grid, masonry and justified differ only in CSS.
fn wall(data: &GalleryData, ctx: &RenderContext, dom_id: &str) -> Result<Markup, RenderError> {
    Ok(html! {
        (common::heading(&data.title, &data.subtitle))
        (filter_bar(data))
        div.gal style={ "--gal-columns: " (data.display.columns) } {
            (items(data, ctx, dom_id))
        }
    })
}

fn carousel(data: &GalleryData, ctx: &RenderContext, dom_id: &str) -> Result<Markup, RenderError> {
    Ok(html! {
        (common::heading(&data.title, &data.subtitle))
        (filter_bar(data))
        div.gal style={ "--gal-columns: " (data.display.columns) } {
            div.gal-viewport data-carousel data-autoplay=(data.carousel.autoplay)
                data-columns=(data.display.columns) aria-roledescription="carousel" {
                (items(data, ctx, dom_id))
            }
            div.gal-nav {
                button.gal-prev type="button" aria-label="Previous images" { "‹" }
                button.gal-next type="button" aria-label="Next images" { "›" }
            }
        }
    })
}
