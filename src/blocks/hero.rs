//! Hero: the headline section at the top of a page.

use super::BlockType;
use super::common::{
    self, ANIMATION, Animation, BACKGROUND, BUTTON, Background, BackgroundKind, Button,
    ButtonStyle, Frame, IMAGE, Image, LAYOUT, Layout, STYLE, VisualStyle,
};
use crate::assets::{AssetId, HERO_CSS, HERO_FULLSCREEN_CSS};
use crate::render::{Block, RenderContext, RenderError, VariantTemplate};
use crate::schema::{Field, Rule};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, VariantNames};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum HeroVariant {
    #[default]
    Centered,
    SplitImage,
    Fullscreen,
    Minimal,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MediaPosition {
    Left,
    #[default]
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stat {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroData {
    pub variant: HeroVariant,
    pub style: VisualStyle,
    pub layout: Layout,
    pub background: Background,
    pub animation: Animation,
    pub eyebrow: String,
    pub title: String,
    pub subtitle: String,
    pub primary_button: Option<Button>,
    pub secondary_button: Option<Button>,
    pub image: Option<Image>,
    pub media_position: MediaPosition,
    pub stats: Vec<Stat>,
    pub scroll_hint: bool,
}

const STAT_FIELDS: &[Field] = &[
    Field::required(
        "value",
        Rule::Str {
            min: 1,
            max: Some(20),
        },
    ),
    Field::required(
        "label",
        Rule::Str {
            min: 1,
            max: Some(40),
        },
    ),
];

const FIELDS: &[Field] = &[
    Field::optional("variant", Rule::Enum(HeroVariant::VARIANTS)),
    Field::optional("style", STYLE),
    Field::optional("layout", LAYOUT),
    Field::optional("background", BACKGROUND),
    Field::optional("animation", ANIMATION),
    Field::optional(
        "eyebrow",
        Rule::Str {
            min: 0,
            max: Some(60),
        },
    ),
    Field::required(
        "title",
        Rule::Str {
            min: 1,
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
    Field::optional("primaryButton", Rule::Nullable(&BUTTON)),
    Field::optional("secondaryButton", Rule::Nullable(&BUTTON)),
    Field::optional("image", Rule::Nullable(&IMAGE)),
    Field::optional("mediaPosition", Rule::Enum(MediaPosition::VARIANTS)),
    Field::optional(
        "stats",
        Rule::Array {
            item: &Rule::Object(STAT_FIELDS),
            min: 0,
            max: Some(4),
        },
    ),
    Field::optional("scrollHint", Rule::Bool),
];

static CENTERED: VariantTemplate<HeroData> = VariantTemplate {
    name: "centered",
    build: stacked,
    assets: &[],
};

static SPLIT_IMAGE: VariantTemplate<HeroData> = VariantTemplate {
    name: "split-image",
    build: split_image,
    assets: &[],
};

static FULLSCREEN: VariantTemplate<HeroData> = VariantTemplate {
    name: "fullscreen",
    build: fullscreen,
    assets: &[HERO_FULLSCREEN_CSS],
};

static MINIMAL: VariantTemplate<HeroData> = VariantTemplate {
    name: "minimal",
    build: stacked,
    assets: &[],
};

pub struct Hero;

impl Block for Hero {
    type Data = HeroData;

    const TYPE: BlockType = BlockType::Hero;
    const FIELDS: &'static [Field] = FIELDS;
    const VARIANTS: &'static [&'static str] = HeroVariant::VARIANTS;
    const BASE_ASSETS: &'static [AssetId] = &[HERO_CSS];

    fn default_data() -> HeroData {
        HeroData {
            eyebrow: "Welcome".to_string(),
            title: "Build something people remember".to_string(),
            subtitle: "We help growing businesses look as good online as they are in person."
                .to_string(),
            primary_button: Some(Button::new(
                "Get started",
                "#contact",
                ButtonStyle::Primary,
            )),
            secondary_button: Some(Button::new(
                "Learn more",
                "#features",
                ButtonStyle::Outline,
            )),
            layout: Layout {
                padding: common::Spacing::Large,
                ..Layout::default()
            },
            ..HeroData::default()
        }
    }

    fn template(data: &HeroData) -> &'static VariantTemplate<HeroData> {
        match data.variant {
            HeroVariant::Centered => &CENTERED,
            HeroVariant::SplitImage => &SPLIT_IMAGE,
            HeroVariant::Fullscreen => &FULLSCREEN,
            HeroVariant::Minimal => &MINIMAL,
        }
    }

    fn frame(data: &HeroData) -> Frame<'_> {
        Frame::new(data.style, &data.layout, &data.background, &data.animation).with_modifier(
            "hero--media-left",
            data.variant == HeroVariant::SplitImage && data.media_position == MediaPosition::Left,
        )
    }

    fn warnings(data: &HeroData) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(img) = &data.image {
            warnings.extend(common::missing_alt([("image", img)]));
        }
        if data.variant == HeroVariant::SplitImage && data.image.is_none() {
            warnings.push("image: split-image hero has no image".to_string());
        }
        if data.variant == HeroVariant::Fullscreen
            && matches!(
                data.background.kind,
                BackgroundKind::None | BackgroundKind::Solid
            )
        {
            warnings
                .push("background: fullscreen hero reads best over an image or gradient".to_string());
        }
        warnings
    }
}

fn content(data: &HeroData, minimal: bool) -> Markup {
    html! {
        div.hero-content {
            @if !data.eyebrow.is_empty() && !minimal {
                span.hero-eyebrow { (data.eyebrow) }
            }
            h1.hero-title { (data.title) }
            @if !data.subtitle.is_empty() {
                p.hero-subtitle { (data.subtitle) }
            }
            @if minimal {
                (common::button_row(&[data.primary_button.as_ref()]))
            } @else {
                (common::button_row(&[data.primary_button.as_ref(), data.secondary_button.as_ref()]))
            }
            @if !data.stats.is_empty() && !minimal {
                ul.hero-stats {
                    @for stat in &data.stats {
                        li data-stagger-item {
                            span.hero-stat-value { (stat.value) }
                            span.hero-stat-label { (stat.label) }
                        }
                    }
                }
            }
        }
    }
}

fn stacked(data: &HeroData, _ctx: &RenderContext, _dom_id: &str) -> Result<Markup, RenderError> {
    Ok(html! {
        div.hero {
            (content(data, data.variant == HeroVariant::Minimal))
        }
    })
}

fn split_image(data: &HeroData, _ctx: &RenderContext, _dom_id: &str) -> Result<Markup, RenderError> {
    Ok(html! {
        div.hero {
            (content(data, false))
            @if let Some(img) = &data.image {
                div.hero-media {
                    // Above the fold: never lazy.
                    (common::image(img, false, None))
                }
            }
        }
    })
}

fn fullscreen(data: &HeroData, _ctx: &RenderContext, _dom_id: &str) -> Result<Markup, RenderError> {
    Ok(html! {
        div.hero {
            (content(data, false))
        }
        @if data.scroll_hint {
            span.hero-scroll-hint aria-hidden="true" {}
        }
    })
}
