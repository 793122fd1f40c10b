//! Call to action: a headline with buttons or a newsletter sign-up form.

use super::BlockType;
use super::common::{
    self, ANIMATION, Animation, BACKGROUND, BUTTON, Background, Button, ButtonStyle, Frame, IMAGE,
    Image, LAYOUT, Layout, STYLE, VisualStyle,
};
use crate::assets::{AssetId, CTA_CSS, CTA_NEWSLETTER_JS};
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
pub enum CtaVariant {
    #[default]
    Simple,
    Split,
    Banner,
    Newsletter,
    Card,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Newsletter {
    pub placeholder: String,
    pub button_text: String,
    /// Form action. Empty keeps the form client-side only.
    pub action: String,
    pub disclaimer: String,
    pub success_message: String,
}

impl Default for Newsletter {
    fn default() -> Self {
        Self {
            placeholder: "you@example.com".to_string(),
            button_text: "Subscribe".to_string(),
            action: String::new(),
            disclaimer: String::new(),
            success_message: "Thanks! You're on the list.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CtaData {
    pub variant: CtaVariant,
    pub style: VisualStyle,
    pub layout: Layout,
    pub background: Background,
    pub animation: Animation,
    pub title: String,
    pub subtitle: String,
    pub primary_button: Option<Button>,
    pub secondary_button: Option<Button>,
    pub image: Option<Image>,
    /// Short reassurance lines under the buttons ("No credit card required").
    pub badges: Vec<String>,
    pub newsletter: Newsletter,
}

const NEWSLETTER_FIELDS: &[Field] = &[
    Field::optional(
        "placeholder",
        Rule::Str {
            min: 0,
            max: Some(60),
        },
    ),
    Field::optional(
        "buttonText",
        Rule::Str {
            min: 1,
            max: Some(40),
        },
    ),
    Field::optional("action", TEXT),
    Field::optional(
        "disclaimer",
        Rule::Str {
            min: 0,
            max: Some(200),
        },
    ),
    Field::optional(
        "successMessage",
        Rule::Str {
            min: 0,
            max: Some(200),
        },
    ),
];

const FIELDS: &[Field] = &[
    Field::optional("variant", Rule::Enum(CtaVariant::VARIANTS)),
    Field::optional("style", STYLE),
    Field::optional("layout", LAYOUT),
    Field::optional("background", BACKGROUND),
    Field::optional("animation", ANIMATION),
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
    Field::optional(
        "badges",
        Rule::Array {
            item: &Rule::Str {
                min: 1,
                max: Some(60),
            },
            min: 0,
            max: Some(4),
        },
    ),
    Field::optional("newsletter", Rule::Object(NEWSLETTER_FIELDS)),
];

static SIMPLE: VariantTemplate<CtaData> = VariantTemplate {
    name: "simple",
    build: stacked,
    assets: &[],
};

static SPLIT: VariantTemplate<CtaData> = VariantTemplate {
    name: "split",
    build: split,
    assets: &[],
};

static BANNER: VariantTemplate<CtaData> = VariantTemplate {
    name: "banner",
    build: banner,
    assets: &[],
};

static NEWSLETTER: VariantTemplate<CtaData> = VariantTemplate {
    name: "newsletter",
    build: newsletter,
    assets: &[CTA_NEWSLETTER_JS],
};

static CARD: VariantTemplate<CtaData> = VariantTemplate {
    name: "card",
    build: stacked,
    assets: &[],
};

pub struct Cta;

impl Block for Cta {
    type Data = CtaData;

    const TYPE: BlockType = BlockType::Cta;
    const FIELDS: &'static [Field] = FIELDS;
    const VARIANTS: &'static [&'static str] = CtaVariant::VARIANTS;
    const BASE_ASSETS: &'static [AssetId] = &[CTA_CSS];

    fn default_data() -> CtaData {
        CtaData {
            title: "Ready to get started?".to_string(),
            subtitle: "Tell us about your project and we'll get back to you within a day."
                .to_string(),
            primary_button: Some(Button::new(
                "Contact us",
                "#contact",
                ButtonStyle::Primary,
            )),
            ..CtaData::default()
        }
    }

    fn template(data: &CtaData) -> &'static VariantTemplate<CtaData> {
        match data.variant {
            CtaVariant::Simple => &SIMPLE,
            CtaVariant::Split => &SPLIT,
            CtaVariant::Banner => &BANNER,
            CtaVariant::Newsletter => &NEWSLETTER,
            CtaVariant::Card => &CARD,
        }
    }

    fn frame(data: &CtaData) -> Frame<'_> {
        Frame::new(data.style, &data.layout, &data.background, &data.animation)
    }

    fn warnings(data: &CtaData) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(img) = &data.image {
            warnings.extend(common::missing_alt([("image", img)]));
        }
        let has_button = data.primary_button.is_some() || data.secondary_button.is_some();
        if data.variant != CtaVariant::Newsletter && !has_button {
            warnings.push("primaryButton: call to action has no button".to_string());
        }
        warnings
    }
}

fn text(data: &CtaData) -> Markup {
    html! {
        h2.cta-title { (data.title) }
        @if !data.subtitle.is_empty() {
            p.cta-subtitle { (data.subtitle) }
        }
    }
}

fn buttons(data: &CtaData) -> Markup {
    common::button_row(&[data.primary_button.as_ref(), data.secondary_button.as_ref()])
}

fn badges(data: &CtaData) -> Markup {
    html! {
        @if !data.badges.is_empty() {
            ul.cta-badges {
                @for badge in &data.badges {
                    li { (badge) }
                }
            }
        }
    }
}

/// Simple and card share markup; the card variant is boxed by CSS.
fn stacked(data: &CtaData, _ctx: &RenderContext, _dom_id: &str) -> Result<Markup, RenderError> {
    Ok(html! {
        div.cta {
            (text(data))
            (buttons(data))
            (badges(data))
        }
    })
}

fn split(data: &CtaData, ctx: &RenderContext, _dom_id: &str) -> Result<Markup, RenderError> {
    Ok(html! {
        div.cta {
            div.cta-body {
                (text(data))
                (buttons(data))
                (badges(data))
            }
            @if let Some(img) = &data.image {
                div.cta-media {
                    (common::image(img, ctx.lazy_images, None))
                }
            }
        }
    })
}

fn banner(data: &CtaData, _ctx: &RenderContext, _dom_id: &str) -> Result<Markup, RenderError> {
    Ok(html! {
        div.cta {
            div.cta-body {
                (text(data))
            }
            (buttons(data))
        }
    })
}

fn newsletter(data: &CtaData, _ctx: &RenderContext, dom_id: &str) -> Result<Markup, RenderError> {
    let form = &data.newsletter;
    let input_id = format!("{dom_id}-email");
    let action = (!form.action.trim().is_empty()).then(|| common::safe_href(&form.action));
    Ok(html! {
        div.cta {
            (text(data))
            form.cta-form method="post" action=[action] novalidate {
                label.visually-hidden for=(input_id) { "Email address" }
                input id=(input_id) type="email" name="email" required
                    placeholder=(form.placeholder) autocomplete="email";
                button.btn.btn--primary type="submit" { (form.button_text) }
            }
            @if !form.success_message.is_empty() {
                p.cta-success role="status" { (form.success_message) }
            }
            @if !form.disclaimer.is_empty() {
                p.cta-disclaimer { (form.disclaimer) }
            }
            (badges(data))
        }
    })
}
