//! Site header: logo, main navigation, optional call-to-action button.

use super::BlockType;
use super::common::{
    self, ANIMATION, BACKGROUND, BUTTON, Button, ButtonStyle, Frame, IMAGE, Image, LAYOUT, LINK,
    Layout, Link, STYLE, SectionTag, VisualStyle,
};
use crate::assets::{AssetId, HEADER_CSS, HEADER_JS};
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
pub enum HeaderVariant {
    #[default]
    Classic,
    Centered,
    Split,
    Minimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Logo {
    pub text: String,
    pub image: Option<Image>,
    pub href: String,
}

impl Default for Logo {
    fn default() -> Self {
        Self {
            text: String::new(),
            image: None,
            href: "/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderData {
    pub variant: HeaderVariant,
    pub style: VisualStyle,
    pub layout: Layout,
    pub background: common::Background,
    pub animation: common::Animation,
    pub logo: Logo,
    pub nav: Vec<Link>,
    pub cta: Option<Button>,
    pub sticky: bool,
    pub transparent: bool,
    pub mobile_menu: bool,
}

impl Default for HeaderData {
    fn default() -> Self {
        Self {
            variant: HeaderVariant::Classic,
            style: VisualStyle::Modern,
            layout: Layout {
                container: common::ContainerWidth::Wide,
                padding: common::Spacing::None,
                align: common::Alignment::Left,
            },
            background: common::Background::default(),
            animation: common::Animation::default(),
            logo: Logo::default(),
            nav: Vec::new(),
            cta: None,
            sticky: true,
            transparent: false,
            mobile_menu: true,
        }
    }
}

const LOGO_FIELDS: &[Field] = &[
    Field::optional(
        "text",
        Rule::Str {
            min: 0,
            max: Some(60),
        },
    ),
    Field::optional("image", Rule::Nullable(&IMAGE)),
    Field::optional("href", TEXT),
];

const FIELDS: &[Field] = &[
    Field::optional("variant", Rule::Enum(HeaderVariant::VARIANTS)),
    Field::optional("style", STYLE),
    Field::optional("layout", LAYOUT),
    Field::optional("background", BACKGROUND),
    Field::optional("animation", ANIMATION),
    Field::optional("logo", Rule::Object(LOGO_FIELDS)),
    Field::optional(
        "nav",
        Rule::Array {
            item: &LINK,
            min: 0,
            max: Some(8),
        },
    ),
    Field::optional("cta", Rule::Nullable(&BUTTON)),
    Field::optional("sticky", Rule::Bool),
    Field::optional("transparent", Rule::Bool),
    Field::optional("mobileMenu", Rule::Bool),
];

const ASSETS: &[AssetId] = &[HEADER_CSS, HEADER_JS];

static CLASSIC: VariantTemplate<HeaderData> = VariantTemplate {
    name: "classic",
    build: bar,
    assets: &[],
};

static CENTERED: VariantTemplate<HeaderData> = VariantTemplate {
    name: "centered",
    build: bar,
    assets: &[],
};

static SPLIT: VariantTemplate<HeaderData> = VariantTemplate {
    name: "split",
    build: bar,
    assets: &[],
};

static MINIMAL: VariantTemplate<HeaderData> = VariantTemplate {
    name: "minimal",
    build: minimal,
    assets: &[],
};

pub struct Header;

impl Block for Header {
    type Data = HeaderData;

    const TYPE: BlockType = BlockType::Header;
    const TAG: SectionTag = SectionTag::Header;
    const FIELDS: &'static [Field] = FIELDS;
    const VARIANTS: &'static [&'static str] = HeaderVariant::VARIANTS;
    const BASE_ASSETS: &'static [AssetId] = ASSETS;

    fn default_data() -> HeaderData {
        HeaderData {
            logo: Logo {
                text: "Your Company".to_string(),
                ..Logo::default()
            },
            nav: vec![
                Link::new("Home", "/"),
                Link::new("Services", "#services"),
                Link::new("About", "#about"),
                Link::new("Contact", "#contact"),
            ],
            cta: Some(Button::new("Get in touch", "#contact", ButtonStyle::Primary)),
            ..HeaderData::default()
        }
    }

    fn template(data: &HeaderData) -> &'static VariantTemplate<HeaderData> {
        match data.variant {
            HeaderVariant::Classic => &CLASSIC,
            HeaderVariant::Centered => &CENTERED,
            HeaderVariant::Split => &SPLIT,
            HeaderVariant::Minimal => &MINIMAL,
        }
    }

    fn frame(data: &HeaderData) -> Frame<'_> {
        Frame::new(data.style, &data.layout, &data.background, &data.animation)
            .with_modifier("hdr--sticky", data.sticky && !data.transparent)
            .with_modifier("hdr--transparent", data.transparent)
    }

    fn warnings(data: &HeaderData) -> Vec<String> {
        let mut warnings = Vec::new();
        if data.logo.text.trim().is_empty() && data.logo.image.is_none() {
            warnings.push("logo: header has neither logo text nor image".to_string());
        }
        if let Some(img) = &data.logo.image {
            warnings.extend(common::missing_alt([("logo.image", img)]));
        }
        warnings
    }
}

fn logo(data: &HeaderData) -> Markup {
    html! {
        a.hdr-logo href=(common::safe_href(&data.logo.href)) {
            @if let Some(img) = &data.logo.image {
                (common::image(img, false, None))
            }
            @if !data.logo.text.is_empty() {
                span { (data.logo.text) }
            }
        }
    }
}

fn toggle(dom_id: &str) -> Markup {
    html! {
        button.hdr-toggle type="button" aria-expanded="false"
            aria-controls={ (dom_id) "-nav" } aria-label="Toggle navigation" {
            span.hdr-toggle-bar {}
            span.hdr-toggle-bar {}
            span.hdr-toggle-bar {}
        }
    }
}

fn nav(data: &HeaderData, dom_id: &str) -> Markup {
    html! {
        @if !data.nav.is_empty() {
            nav.hdr-nav id={ (dom_id) "-nav" } aria-label="Main" {
                ul {
                    @for link in &data.nav {
                        li { a href=(common::safe_href(&link.href)) { (link.label) } }
                    }
                }
            }
        }
    }
}

fn cta(data: &HeaderData) -> Markup {
    html! {
        @if let Some(button) = &data.cta {
            div.hdr-cta { (common::button(button)) }
        }
    }
}

/// Classic, centered and split share one markup; CSS arranges it.
fn bar(data: &HeaderData, _ctx: &RenderContext, dom_id: &str) -> Result<Markup, RenderError> {
    Ok(html! {
        div.hdr {
            (logo(data))
            @if data.mobile_menu && !data.nav.is_empty() {
                (toggle(dom_id))
            }
            (nav(data, dom_id))
            (cta(data))
        }
    })
}

/// Logo plus a drawer toggle at every width.
fn minimal(data: &HeaderData, _ctx: &RenderContext, dom_id: &str) -> Result<Markup, RenderError> {
    Ok(html! {
        div.hdr {
            (logo(data))
            @if !data.nav.is_empty() {
                (toggle(dom_id))
            }
            (nav(data, dom_id))
        }
    })
}
