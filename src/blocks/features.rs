//! Features: a set of service or product highlights.

use super::BlockType;
use super::common::{
    self, ANIMATION, Animation, BACKGROUND, Background, Frame, IMAGE, Image, LAYOUT, LINK, Layout,
    Link, STYLE, VisualStyle,
};
use crate::assets::{AssetId, FEATURES_CSS};
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
pub enum FeaturesVariant {
    #[default]
    Grid,
    List,
    Alternating,
    Cards,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureItem {
    pub id: String,
    /// Short glyph shown in the icon badge (an emoji or a letter).
    pub icon: String,
    pub title: String,
    pub description: String,
    pub link: Option<Link>,
    pub image: Option<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesData {
    pub variant: FeaturesVariant,
    pub style: VisualStyle,
    pub layout: Layout,
    pub background: Background,
    pub animation: Animation,
    pub title: String,
    pub subtitle: String,
    pub columns: u8,
    pub items: Vec<FeatureItem>,
}

impl Default for FeaturesData {
    fn default() -> Self {
        Self {
            variant: FeaturesVariant::Grid,
            style: VisualStyle::Modern,
            layout: Layout::default(),
            background: Background::default(),
            animation: Animation::default(),
            title: String::new(),
            subtitle: String::new(),
            columns: 3,
            items: Vec::new(),
        }
    }
}

const ITEM_FIELDS: &[Field] = &[
    Field::optional("id", TEXT),
    Field::optional(
        "icon",
        Rule::Str {
            min: 0,
            max: Some(8),
        },
    ),
    Field::required(
        "title",
        Rule::Str {
            min: 1,
            max: Some(80),
        },
    ),
    Field::optional(
        "description",
        Rule::Str {
            min: 0,
            max: Some(400),
        },
    ),
    Field::optional("link", Rule::Nullable(&LINK)),
    Field::optional("image", Rule::Nullable(&IMAGE)),
];

const FIELDS: &[Field] = &[
    Field::optional("variant", Rule::Enum(FeaturesVariant::VARIANTS)),
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
    Field::optional(
        "columns",
        Rule::Int {
            min: Some(1),
            max: Some(4),
        },
    ),
    Field::required(
        "items",
        Rule::Array {
            item: &Rule::Object(ITEM_FIELDS),
            min: 1,
            max: Some(12),
        },
    ),
];

static GRID: VariantTemplate<FeaturesData> = VariantTemplate {
    name: "grid",
    build: grid,
    assets: &[],
};

static LIST: VariantTemplate<FeaturesData> = VariantTemplate {
    name: "list",
    build: grid,
    assets: &[],
};

static ALTERNATING: VariantTemplate<FeaturesData> = VariantTemplate {
    name: "alternating",
    build: alternating,
    assets: &[],
};

static CARDS: VariantTemplate<FeaturesData> = VariantTemplate {
    name: "cards",
    build: grid,
    assets: &[],
};

pub struct Features;

impl Block for Features {
    type Data = FeaturesData;

    const TYPE: BlockType = BlockType::Features;
    const FIELDS: &'static [Field] = FIELDS;
    const VARIANTS: &'static [&'static str] = FeaturesVariant::VARIANTS;
    const BASE_ASSETS: &'static [AssetId] = &[FEATURES_CSS];

    fn default_data() -> FeaturesData {
        let item = |icon: &str, title: &str, description: &str| FeatureItem {
            id: common::new_id(),
            icon: icon.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            link: None,
            image: None,
        };
        FeaturesData {
            title: "What we do".to_string(),
            subtitle: "Everything you need, nothing you don't.".to_string(),
            items: vec![
                item("⚡", "Fast", "Pages that load before your visitors blink."),
                item("🔒", "Secure", "Sensible defaults that keep your data safe."),
                item("📈", "Scalable", "Grows with your business, not against it."),
            ],
            ..FeaturesData::default()
        }
    }

    fn normalize(data: &mut FeaturesData) {
        common::fill_positional_ids(data.items.iter_mut().map(|i| &mut i.id), "feature");
    }

    fn template(data: &FeaturesData) -> &'static VariantTemplate<FeaturesData> {
        match data.variant {
            FeaturesVariant::Grid => &GRID,
            FeaturesVariant::List => &LIST,
            FeaturesVariant::Alternating => &ALTERNATING,
            FeaturesVariant::Cards => &CARDS,
        }
    }

    fn frame(data: &FeaturesData) -> Frame<'_> {
        Frame::new(data.style, &data.layout, &data.background, &data.animation)
    }

    fn warnings(data: &FeaturesData) -> Vec<String> {
        let paths: Vec<String> = (0..data.items.len())
            .map(|i| format!("items.{i}.image"))
            .collect();
        let mut warnings = common::missing_alt(
            data.items
                .iter()
                .zip(&paths)
                .filter_map(|(item, path)| item.image.as_ref().map(|img| (path.as_str(), img))),
        );
        if data.variant == FeaturesVariant::Alternating {
            for (i, item) in data.items.iter().enumerate() {
                if item.image.is_none() {
                    warnings.push(format!("items.{i}.image: alternating layout item has no image"));
                }
            }
        }
        warnings
    }
}

fn item_id(dom_id: &str, item: &FeatureItem) -> String {
    format!("{dom_id}-{}", naming::slugify(&item.id))
}

fn body(item: &FeatureItem) -> Markup {
    html! {
        div.feat-body {
            h3.feat-title { (item.title) }
            @if !item.description.is_empty() {
                p.feat-desc { (item.description) }
            }
            @if let Some(link) = &item.link {
                a.feat-link href=(common::safe_href(&link.href)) { (link.label) " →" }
            }
        }
    }
}

/// Grid, list and cards differ only in CSS.
fn grid(data: &FeaturesData, _ctx: &RenderContext, dom_id: &str) -> Result<Markup, RenderError> {
    Ok(html! {
        (common::heading(&data.title, &data.subtitle))
        ul.feat-grid style={ "--feat-columns: " (data.columns) } {
            @for item in &data.items {
                li.feat-item id=(item_id(dom_id, item)) data-stagger-item {
                    @if !item.icon.is_empty() {
                        span.feat-icon aria-hidden="true" { (item.icon) }
                    }
                    (body(item))
                }
            }
        }
    })
}

fn alternating(data: &FeaturesData, ctx: &RenderContext, dom_id: &str) -> Result<Markup, RenderError> {
    Ok(html! {
        (common::heading(&data.title, &data.subtitle))
        ul.feat-grid {
            @for item in &data.items {
                li.feat-item id=(item_id(dom_id, item)) data-stagger-item {
                    div.feat-media {
                        @if let Some(img) = &item.image {
                            (common::image(img, ctx.lazy_images, None))
                        } @else if !item.icon.is_empty() {
                            span.feat-icon aria-hidden="true" { (item.icon) }
                        }
                    }
                    (body(item))
                }
            }
        }
    })
}
