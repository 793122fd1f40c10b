//! Footer: brand, link columns, social links and the copyright line.

use super::BlockType;
use super::common::{
    self, ANIMATION, Animation, BACKGROUND, Background, Frame, IMAGE, Image, LAYOUT, LINK, Layout,
    Link, STYLE, SectionTag, Spacing, VisualStyle,
};
use crate::assets::{AssetId, FOOTER_CSS, FOOTER_TOP_JS};
use crate::render::{Block, RenderContext, RenderError, VariantTemplate};
use crate::schema::{Field, Rule};
use chrono::Datelike;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, VariantNames};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FooterVariant {
    #[default]
    Simple,
    Columns,
    Centered,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterColumn {
    pub title: String,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FooterData {
    pub variant: FooterVariant,
    pub style: VisualStyle,
    pub layout: Layout,
    pub background: Background,
    pub animation: Animation,
    pub brand: String,
    pub tagline: String,
    pub logo: Option<Image>,
    /// Used by the columns variant.
    pub columns: Vec<FooterColumn>,
    /// Flat link row used by the simple and centered variants.
    pub links: Vec<Link>,
    pub social: Vec<Link>,
    /// Empty means `© {year} {brand}. All rights reserved.`
    pub copyright: String,
    pub back_to_top: bool,
}

impl Default for FooterData {
    fn default() -> Self {
        Self {
            variant: FooterVariant::Simple,
            style: VisualStyle::Modern,
            layout: Layout {
                padding: Spacing::Large,
                ..Layout::default()
            },
            background: Background::default(),
            animation: Animation::default(),
            brand: String::new(),
            tagline: String::new(),
            logo: None,
            columns: Vec::new(),
            links: Vec::new(),
            social: Vec::new(),
            copyright: String::new(),
            back_to_top: false,
        }
    }
}

impl FooterData {
    fn copyright_line(&self) -> String {
        if !self.copyright.trim().is_empty() {
            return self.copyright.clone();
        }
        let year = chrono::Local::now().year();
        if self.brand.is_empty() {
            format!("© {year}. All rights reserved.")
        } else {
            format!("© {year} {}. All rights reserved.", self.brand)
        }
    }
}

const COLUMN_FIELDS: &[Field] = &[
    Field::required(
        "title",
        Rule::Str {
            min: 1,
            max: Some(40),
        },
    ),
    Field::optional(
        "links",
        Rule::Array {
            item: &LINK,
            min: 0,
            max: Some(8),
        },
    ),
];

const FIELDS: &[Field] = &[
    Field::optional("variant", Rule::Enum(FooterVariant::VARIANTS)),
    Field::optional("style", STYLE),
    Field::optional("layout", LAYOUT),
    Field::optional("background", BACKGROUND),
    Field::optional("animation", ANIMATION),
    Field::optional(
        "brand",
        Rule::Str {
            min: 0,
            max: Some(60),
        },
    ),
    Field::optional(
        "tagline",
        Rule::Str {
            min: 0,
            max: Some(200),
        },
    ),
    Field::optional("logo", Rule::Nullable(&IMAGE)),
    Field::optional(
        "columns",
        Rule::Array {
            item: &Rule::Object(COLUMN_FIELDS),
            min: 0,
            max: Some(4),
        },
    ),
    Field::optional(
        "links",
        Rule::Array {
            item: &LINK,
            min: 0,
            max: Some(10),
        },
    ),
    Field::optional(
        "social",
        Rule::Array {
            item: &LINK,
            min: 0,
            max: Some(6),
        },
    ),
    Field::optional(
        "copyright",
        Rule::Str {
            min: 0,
            max: Some(200),
        },
    ),
    Field::optional("backToTop", Rule::Bool),
];

static SIMPLE: VariantTemplate<FooterData> = VariantTemplate {
    name: "simple",
    build: row,
    assets: &[],
};

static COLUMNS: VariantTemplate<FooterData> = VariantTemplate {
    name: "columns",
    build: columns,
    assets: &[],
};

static CENTERED: VariantTemplate<FooterData> = VariantTemplate {
    name: "centered",
    build: row,
    assets: &[],
};

pub struct Footer;

impl Block for Footer {
    type Data = FooterData;

    const TYPE: BlockType = BlockType::Footer;
    const TAG: SectionTag = SectionTag::Footer;
    const FIELDS: &'static [Field] = FIELDS;
    const VARIANTS: &'static [&'static str] = FooterVariant::VARIANTS;
    const BASE_ASSETS: &'static [AssetId] = &[FOOTER_CSS];

    fn default_data() -> FooterData {
        let links = |pairs: &[(&str, &str)]| -> Vec<Link> {
            pairs.iter().map(|(label, href)| Link::new(label, href)).collect()
        };
        FooterData {
            brand: "Your Company".to_string(),
            tagline: "Websites that work as hard as you do.".to_string(),
            columns: vec![
                FooterColumn {
                    title: "Company".to_string(),
                    links: links(&[("About", "/about/"), ("Contact", "/contact/")]),
                },
                FooterColumn {
                    title: "Services".to_string(),
                    links: links(&[("Design", "/services/"), ("Pricing", "/pricing/")]),
                },
            ],
            links: links(&[("Privacy", "/privacy/"), ("Terms", "/terms/")]),
            back_to_top: true,
            ..FooterData::default()
        }
    }

    fn template(data: &FooterData) -> &'static VariantTemplate<FooterData> {
        match data.variant {
            FooterVariant::Simple => &SIMPLE,
            FooterVariant::Columns => &COLUMNS,
            FooterVariant::Centered => &CENTERED,
        }
    }

    fn frame(data: &FooterData) -> Frame<'_> {
        Frame::new(data.style, &data.layout, &data.background, &data.animation)
    }

    fn feature_assets(data: &FooterData) -> Vec<AssetId> {
        if data.back_to_top {
            vec![FOOTER_TOP_JS]
        } else {
            Vec::new()
        }
    }

    fn warnings(data: &FooterData) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(logo) = &data.logo {
            warnings.extend(common::missing_alt([("logo", logo)]));
        }
        if data.variant == FooterVariant::Columns && data.columns.is_empty() {
            warnings.push("columns: columns footer has no link columns".to_string());
        }
        warnings
    }
}

fn brand(data: &FooterData, ctx: &RenderContext) -> Markup {
    html! {
        @if data.logo.is_some() || !data.brand.is_empty() || !data.tagline.is_empty() {
            div.ftr-about {
                @if let Some(logo) = &data.logo {
                    (common::image(logo, ctx.lazy_images, Some("ftr-logo")))
                } @else if !data.brand.is_empty() {
                    p.ftr-brand { (data.brand) }
                }
                @if !data.tagline.is_empty() {
                    p.ftr-tagline { (data.tagline) }
                }
            }
        }
    }
}

fn social(data: &FooterData) -> Markup {
    html! {
        @if !data.social.is_empty() {
            ul.ftr-social {
                @for link in &data.social {
                    li {
                        a href=(common::safe_href(&link.href)) target="_blank"
                            rel="noopener noreferrer" { (link.label) }
                    }
                }
            }
        }
    }
}

fn bottom(data: &FooterData) -> Markup {
    html! {
        div.ftr-bottom {
            p.ftr-copyright { (data.copyright_line()) }
            @if data.back_to_top {
                button.ftr-top type="button" { "Back to top ↑" }
            }
        }
    }
}

/// Simple and centered: brand, one link row, social, bottom line.
fn row(data: &FooterData, ctx: &RenderContext, _dom_id: &str) -> Result<Markup, RenderError> {
    Ok(html! {
        div.ftr {
            (brand(data, ctx))
            @if !data.links.is_empty() {
                nav aria-label="Footer" {
                    ul.ftr-links {
                        @for link in &data.links {
                            li { a href=(common::safe_href(&link.href)) { (link.label) } }
                        }
                    }
                }
            }
            (social(data))
            (bottom(data))
        }
    })
}

fn columns(data: &FooterData, ctx: &RenderContext, _dom_id: &str) -> Result<Markup, RenderError> {
    Ok(html! {
        div.ftr {
            div.ftr-columns style={ "--ftr-columns: " (data.columns.len().max(1)) } {
                div.ftr-col {
                    (brand(data, ctx))
                    (social(data))
                }
                @for column in &data.columns {
                    nav.ftr-col aria-label=(column.title) data-stagger-item {
                        h3 { (column.title) }
                        ul {
                            @for link in &column.links {
                                li { a href=(common::safe_href(&link.href)) { (link.label) } }
                            }
                        }
                    }
                }
            }
            (bottom(data))
        }
    })
}
