//! Option groups shared by every block type.
//!
//! Each block's data carries the same four presentation groups next to its
//! content payload:
//!
//! ```json
//! {
//!   "style": "modern",
//!   "layout": { "container": "normal", "padding": "medium", "align": "center" },
//!   "background": { "type": "image", "image": "/img/team.jpg", "overlayOpacity": 0.4 },
//!   "animation": { "enabled": true, "effect": "slide-up", "duration": 600 }
//! }
//! ```
//!
//! Every group is optional and every member has a default, so `{}` is a
//! valid group. The [`Frame`] built from these groups becomes the outer
//! `<section>` of the rendered block and its scoped custom-property rule.

use crate::config::ThemeConfig;
use crate::escape::{css_url, is_safe_css_value};
use crate::render::RenderError;
use crate::schema::{Field, Rule, TEXT};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, VariantNames};

// ============================================================================
// Enumerations
// ============================================================================

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum VisualStyle {
    #[default]
    Modern,
    Minimal,
    Bold,
    Elegant,
    Playful,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ContainerWidth {
    Narrow,
    #[default]
    Normal,
    Wide,
    Full,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Spacing {
    None,
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BackgroundKind {
    #[default]
    None,
    Solid,
    Gradient,
    Image,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AnimationEffect {
    #[default]
    Fade,
    SlideUp,
    Zoom,
    None,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ButtonStyle {
    #[default]
    Primary,
    Secondary,
    Outline,
    Ghost,
}

// ============================================================================
// Option groups
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub container: ContainerWidth,
    pub padding: Spacing,
    pub align: Alignment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Background {
    #[serde(rename = "type")]
    pub kind: BackgroundKind,
    /// Solid fill; empty means the theme background.
    pub color: String,
    /// Gradient stops; empty means the theme primary/secondary.
    pub gradient_from: String,
    pub gradient_to: String,
    pub gradient_angle: u32,
    pub image: String,
    pub overlay_opacity: f64,
    pub text_color: String,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            kind: BackgroundKind::None,
            color: String::new(),
            gradient_from: String::new(),
            gradient_to: String::new(),
            gradient_angle: 135,
            image: String::new(),
            overlay_opacity: 0.4,
            text_color: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Animation {
    pub enabled: bool,
    pub effect: AnimationEffect,
    /// Transition duration in milliseconds.
    pub duration: u32,
    /// Delay children marked `data-stagger-item` one after another.
    pub stagger: bool,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            enabled: false,
            effect: AnimationEffect::Fade,
            duration: 600,
            stagger: false,
        }
    }
}

impl Animation {
    pub fn active(&self) -> bool {
        self.enabled && self.effect != AnimationEffect::None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Button {
    pub text: String,
    pub href: String,
    pub style: ButtonStyle,
    pub new_tab: bool,
}

impl Default for Button {
    fn default() -> Self {
        Self {
            text: String::new(),
            href: "#".to_string(),
            style: ButtonStyle::Primary,
            new_tab: false,
        }
    }
}

impl Button {
    pub fn new(text: &str, href: &str, style: ButtonStyle) -> Self {
        Self {
            text: text.to_string(),
            href: href.to_string(),
            style,
            new_tab: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub src: String,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Image {
    pub fn new(src: &str, alt: &str) -> Self {
        Self {
            src: src.to_string(),
            alt: alt.to_string(),
            width: None,
            height: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub label: String,
    pub href: String,
}

impl Link {
    pub fn new(label: &str, href: &str) -> Self {
        Self {
            label: label.to_string(),
            href: href.to_string(),
        }
    }
}

// ============================================================================
// Rules
// ============================================================================

pub const STYLE: Rule = Rule::Enum(VisualStyle::VARIANTS);

const LAYOUT_FIELDS: &[Field] = &[
    Field::optional("container", Rule::Enum(ContainerWidth::VARIANTS)),
    Field::optional("padding", Rule::Enum(Spacing::VARIANTS)),
    Field::optional("align", Rule::Enum(Alignment::VARIANTS)),
];
pub const LAYOUT: Rule = Rule::Object(LAYOUT_FIELDS);

const BACKGROUND_FIELDS: &[Field] = &[
    Field::optional("type", Rule::Enum(BackgroundKind::VARIANTS)),
    Field::optional("color", TEXT),
    Field::optional("gradientFrom", TEXT),
    Field::optional("gradientTo", TEXT),
    Field::optional(
        "gradientAngle",
        Rule::Int {
            min: Some(0),
            max: Some(360),
        },
    ),
    Field::optional("image", TEXT),
    Field::optional(
        "overlayOpacity",
        Rule::Number {
            min: Some(0.0),
            max: Some(1.0),
        },
    ),
    Field::optional("textColor", TEXT),
];
pub const BACKGROUND: Rule = Rule::Object(BACKGROUND_FIELDS);

const ANIMATION_FIELDS: &[Field] = &[
    Field::optional("enabled", Rule::Bool),
    Field::optional("effect", Rule::Enum(AnimationEffect::VARIANTS)),
    Field::optional(
        "duration",
        Rule::Int {
            min: Some(100),
            max: Some(3000),
        },
    ),
    Field::optional("stagger", Rule::Bool),
];
pub const ANIMATION: Rule = Rule::Object(ANIMATION_FIELDS);

const BUTTON_FIELDS: &[Field] = &[
    Field::required(
        "text",
        Rule::Str {
            min: 1,
            max: Some(60),
        },
    ),
    Field::optional("href", TEXT),
    Field::optional("style", Rule::Enum(ButtonStyle::VARIANTS)),
    Field::optional("newTab", Rule::Bool),
];
pub const BUTTON: Rule = Rule::Object(BUTTON_FIELDS);

const IMAGE_FIELDS: &[Field] = &[
    Field::required("src", Rule::Str { min: 1, max: None }),
    Field::optional("alt", TEXT),
    Field::optional(
        "width",
        Rule::Int {
            min: Some(1),
            max: None,
        },
    ),
    Field::optional(
        "height",
        Rule::Int {
            min: Some(1),
            max: None,
        },
    ),
];
pub const IMAGE: Rule = Rule::Object(IMAGE_FIELDS);

const LINK_FIELDS: &[Field] = &[
    Field::required("label", Rule::Str { min: 1, max: None }),
    Field::optional("href", TEXT),
];
pub const LINK: Rule = Rule::Object(LINK_FIELDS);

// ============================================================================
// Frame
// ============================================================================

/// Outer element of a rendered block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionTag {
    Section,
    Header,
    Footer,
}

/// Presentation groups of one block instance, borrowed from its data.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub style: VisualStyle,
    pub layout: &'a Layout,
    pub background: &'a Background,
    pub animation: &'a Animation,
    /// Extra classes on the outer element (`hdr--sticky`, …).
    pub modifiers: Vec<&'static str>,
}

impl<'a> Frame<'a> {
    pub fn new(
        style: VisualStyle,
        layout: &'a Layout,
        background: &'a Background,
        animation: &'a Animation,
    ) -> Self {
        Self {
            style,
            layout,
            background,
            animation,
            modifiers: Vec::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: &'static str, on: bool) -> Self {
        if on {
            self.modifiers.push(modifier);
        }
        self
    }

    fn has_overlay(&self) -> bool {
        self.background.kind == BackgroundKind::Image && self.background.overlay_opacity > 0.0
    }
}

/// Wrap a variant's inner markup in the block's outer element.
pub fn section(
    tag: SectionTag,
    block: &str,
    variant: &str,
    frame: &Frame<'_>,
    dom_id: &str,
    inner: Markup,
) -> Markup {
    let mut class = format!(
        "blk blk-{block} blk-{block}--{variant} blk-style--{} blk-pad--{} blk-align--{}",
        frame.style.as_ref(),
        frame.layout.padding.as_ref(),
        frame.layout.align.as_ref(),
    );
    for modifier in &frame.modifiers {
        class.push(' ');
        class.push_str(modifier);
    }
    let animate = frame
        .animation
        .active()
        .then(|| frame.animation.effect.as_ref());
    let stagger = frame.animation.active() && frame.animation.stagger;
    let body = html! {
        @if frame.has_overlay() {
            div.blk-overlay aria-hidden="true" {}
        }
        div class={ "blk-container blk-container--" (frame.layout.container.as_ref()) } {
            (inner)
        }
    };
    match tag {
        SectionTag::Header => html! {
            header id=(dom_id) class=(class) data-block=(block) data-variant=(variant)
                data-animate=[animate] data-animate-stagger[stagger] { (body) }
        },
        SectionTag::Footer => html! {
            footer id=(dom_id) class=(class) data-block=(block) data-variant=(variant)
                data-animate=[animate] data-animate-stagger[stagger] { (body) }
        },
        SectionTag::Section => html! {
            section id=(dom_id) class=(class) data-block=(block) data-variant=(variant)
                data-animate=[animate] data-animate-stagger[stagger] { (body) }
        },
    }
}

/// Scoped custom-property rule for one block instance.
///
/// Theme values are checked first: a theme that cannot be embedded in CSS
/// is a [`RenderError::MalformedTheme`], which the renderer answers by
/// retrying with the default theme.
pub fn scoped_css(
    dom_id: &str,
    frame: &Frame<'_>,
    theme: &ThemeConfig,
) -> Result<String, RenderError> {
    if let Some((key, value)) = theme.invalid_values().into_iter().next() {
        return Err(RenderError::MalformedTheme { key, value });
    }
    let colors = &theme.colors;
    let bg = frame.background;
    let mut decls = vec![format!("--blk-accent: {}", colors.primary)];

    match bg.kind {
        BackgroundKind::None => {}
        BackgroundKind::Solid => {
            let color = or_theme(&bg.color, &colors.background);
            decls.push(format!(
                "--blk-bg: {}",
                css_value("background.color", color)?
            ));
        }
        BackgroundKind::Gradient => {
            let from = css_value(
                "background.gradientFrom",
                or_theme(&bg.gradient_from, &colors.primary),
            )?;
            let to = css_value(
                "background.gradientTo",
                or_theme(&bg.gradient_to, &colors.secondary),
            )?;
            decls.push(format!(
                "--blk-bg: linear-gradient({}deg, {from}, {to})",
                bg.gradient_angle
            ));
        }
        BackgroundKind::Image => {
            let url = css_url(&bg.image).ok_or_else(|| RenderError::UnsafeValue {
                field: "background.image",
                value: bg.image.clone(),
            })?;
            decls.push(format!("--blk-bg: {url}"));
        }
    }
    if !bg.text_color.is_empty() {
        decls.push(format!(
            "--blk-text: {}",
            css_value("background.textColor", &bg.text_color)?
        ));
    }
    if frame.animation.active() {
        decls.push(format!(
            "--blk-anim-duration: {}ms",
            frame.animation.duration
        ));
    }

    let mut css = format!("#{dom_id} {{ {}; }}", decls.join("; "));
    if frame.has_overlay() {
        css.push_str(&format!(
            "\n#{dom_id} .blk-overlay {{ opacity: {}; }}",
            bg.overlay_opacity
        ));
    }
    Ok(css)
}

fn or_theme<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn css_value<'a>(field: &'static str, value: &'a str) -> Result<&'a str, RenderError> {
    if is_safe_css_value(value) {
        Ok(value)
    } else {
        Err(RenderError::UnsafeValue {
            field,
            value: value.to_string(),
        })
    }
}

// ============================================================================
// Markup helpers
// ============================================================================

/// `href`/`src` with script-bearing schemes replaced by `#`.
pub fn safe_href(href: &str) -> &str {
    let trimmed = href.trim();
    let lower = trimmed.to_ascii_lowercase();
    if trimmed.is_empty()
        || lower.starts_with("javascript:")
        || lower.starts_with("vbscript:")
        || lower.starts_with("data:text")
    {
        "#"
    } else {
        trimmed
    }
}

/// Block heading and subtitle; either may be empty.
pub fn heading(title: &str, subtitle: &str) -> Markup {
    html! {
        @if !title.is_empty() {
            h2.blk-heading { (title) }
        }
        @if !subtitle.is_empty() {
            p.blk-subtitle { (subtitle) }
        }
    }
}

pub fn button(button: &Button) -> Markup {
    html! {
        a class={ "btn btn--" (button.style.as_ref()) } href=(safe_href(&button.href))
            target=[button.new_tab.then_some("_blank")]
            rel=[button.new_tab.then_some("noopener noreferrer")] {
            (button.text)
        }
    }
}

/// A row of the buttons that are present. Renders nothing when none are.
pub fn button_row(buttons: &[Option<&Button>]) -> Markup {
    let present: Vec<&Button> = buttons
        .iter()
        .flatten()
        .copied()
        .filter(|b| !b.text.trim().is_empty())
        .collect();
    html! {
        @if !present.is_empty() {
            div.btn-row {
                @for b in present {
                    (button(b))
                }
            }
        }
    }
}

pub fn image(img: &Image, lazy: bool, class: Option<&str>) -> Markup {
    html! {
        img class=[class] src=(safe_href(&img.src)) alt=(img.alt)
            width=[img.width] height=[img.height]
            loading=[lazy.then_some("lazy")] decoding="async";
    }
}

/// Warning text for every image without alt text.
pub fn missing_alt<'a>(images: impl IntoIterator<Item = (&'a str, &'a Image)>) -> Vec<String> {
    images
        .into_iter()
        .filter(|(_, img)| img.alt.trim().is_empty())
        .map(|(path, img)| format!("{path}: image {} has no alt text", img.src))
        .collect()
}

/// Give every empty id a positional one (`plan-1`, `plan-2`, …).
///
/// Supplied data never gets random ids, so rendering it twice yields the
/// same markup.
pub fn fill_positional_ids<'a>(ids: impl IntoIterator<Item = &'a mut String>, prefix: &str) {
    for (i, id) in ids.into_iter().enumerate() {
        if id.trim().is_empty() {
            *id = format!("{prefix}-{}", i + 1);
        }
    }
}

/// Fresh id for default data.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::check;
    use serde_json::json;

    const FRAME_ONLY: &[Field] = &[
        Field::optional("style", STYLE),
        Field::optional("layout", LAYOUT),
        Field::optional("background", BACKGROUND),
        Field::optional("animation", ANIMATION),
    ];

    #[test]
    fn enum_rules_use_kebab_case_names() {
        assert!(check(FRAME_ONLY, &json!({"animation": {"effect": "slide-up"}})).is_empty());
        let errors = check(FRAME_ONLY, &json!({"animation": {"effect": "slideUp"}}));
        assert_eq!(errors[0].path, "animation.effect");
    }

    #[test]
    fn empty_groups_take_defaults() {
        let bg: Background = serde_json::from_value(json!({})).unwrap();
        assert_eq!(bg, Background::default());
        let layout: Layout = serde_json::from_value(json!({"align": "left"})).unwrap();
        assert_eq!(layout.align, Alignment::Left);
        assert_eq!(layout.container, ContainerWidth::Normal);
    }

    #[test]
    fn background_type_key_is_renamed() {
        let bg: Background =
            serde_json::from_value(json!({"type": "gradient", "gradientAngle": 90})).unwrap();
        assert_eq!(bg.kind, BackgroundKind::Gradient);
        assert_eq!(bg.gradient_angle, 90);
    }

    fn frame_parts() -> (Layout, Background, Animation) {
        (Layout::default(), Background::default(), Animation::default())
    }

    #[test]
    fn section_carries_classes_and_ids() {
        let (layout, bg, anim) = frame_parts();
        let frame = Frame::new(VisualStyle::Bold, &layout, &bg, &anim);
        let html = section(
            SectionTag::Section,
            "cta",
            "split",
            &frame,
            "blk-cta-1",
            html! { p { "x" } },
        )
        .into_string();
        assert!(html.starts_with("<section id=\"blk-cta-1\""));
        assert!(html.contains("blk-cta--split"));
        assert!(html.contains("blk-style--bold"));
        assert!(html.contains("blk-container--normal"));
        assert!(!html.contains("data-animate"));
    }

    #[test]
    fn section_marks_animation_when_enabled() {
        let (layout, bg, mut anim) = frame_parts();
        anim.enabled = true;
        anim.effect = AnimationEffect::Zoom;
        anim.stagger = true;
        let frame = Frame::new(VisualStyle::Modern, &layout, &bg, &anim);
        let html = section(SectionTag::Footer, "footer", "simple", &frame, "f", html! {})
            .into_string();
        assert!(html.starts_with("<footer"));
        assert!(html.contains("data-animate=\"zoom\""));
        assert!(html.contains("data-animate-stagger"));
    }

    #[test]
    fn modifiers_are_appended_to_class() {
        let (layout, bg, anim) = frame_parts();
        let frame = Frame::new(VisualStyle::Modern, &layout, &bg, &anim)
            .with_modifier("hdr--sticky", true)
            .with_modifier("hdr--transparent", false);
        let html = section(SectionTag::Header, "header", "classic", &frame, "h", html! {})
            .into_string();
        assert!(html.contains("hdr--sticky"));
        assert!(!html.contains("hdr--transparent"));
    }

    #[test]
    fn scoped_css_uses_theme_accent() {
        let (layout, bg, anim) = frame_parts();
        let frame = Frame::new(VisualStyle::Modern, &layout, &bg, &anim);
        let css = scoped_css("blk-x", &frame, &ThemeConfig::default()).unwrap();
        assert_eq!(css, "#blk-x { --blk-accent: #2563eb; }");
    }

    #[test]
    fn scoped_css_gradient_falls_back_to_theme_stops() {
        let (layout, mut bg, anim) = frame_parts();
        bg.kind = BackgroundKind::Gradient;
        let frame = Frame::new(VisualStyle::Modern, &layout, &bg, &anim);
        let css = scoped_css("b", &frame, &ThemeConfig::default()).unwrap();
        assert!(css.contains("linear-gradient(135deg, #2563eb, #7c3aed)"));
    }

    #[test]
    fn scoped_css_image_adds_overlay_rule() {
        let (layout, mut bg, anim) = frame_parts();
        bg.kind = BackgroundKind::Image;
        bg.image = "/img/a.jpg".into();
        let frame = Frame::new(VisualStyle::Modern, &layout, &bg, &anim);
        let css = scoped_css("b", &frame, &ThemeConfig::default()).unwrap();
        assert!(css.contains("--blk-bg: url(\"/img/a.jpg\")"));
        assert!(css.contains("#b .blk-overlay { opacity: 0.4; }"));
    }

    #[test]
    fn scoped_css_rejects_malformed_theme() {
        let (layout, bg, anim) = frame_parts();
        let frame = Frame::new(VisualStyle::Modern, &layout, &bg, &anim);
        let mut theme = ThemeConfig::default();
        theme.colors.primary = "red; }".into();
        let err = scoped_css("b", &frame, &theme).unwrap_err();
        assert!(matches!(
            err,
            RenderError::MalformedTheme {
                key: "colors.primary",
                ..
            }
        ));
    }

    #[test]
    fn scoped_css_rejects_unsafe_background_color() {
        let (layout, mut bg, anim) = frame_parts();
        bg.kind = BackgroundKind::Solid;
        bg.color = "red</style>".into();
        let frame = Frame::new(VisualStyle::Modern, &layout, &bg, &anim);
        assert!(scoped_css("b", &frame, &ThemeConfig::default()).is_err());
    }

    #[test]
    fn safe_href_blocks_script_schemes() {
        assert_eq!(safe_href("JavaScript:alert(1)"), "#");
        assert_eq!(safe_href(""), "#");
        assert_eq!(safe_href(" /contact "), "/contact");
    }

    #[test]
    fn button_row_skips_missing_buttons() {
        let primary = Button::new("Go", "/go", ButtonStyle::Primary);
        let html = button_row(&[Some(&primary), None]).into_string();
        assert_eq!(html.matches("class=\"btn ").count(), 1);
        assert!(button_row(&[None]).into_string().is_empty());
    }

    #[test]
    fn new_tab_buttons_get_rel() {
        let mut b = Button::new("Docs", "https://example.com", ButtonStyle::Ghost);
        b.new_tab = true;
        let html = button(&b).into_string();
        assert!(html.contains("target=\"_blank\""));
        assert!(html.contains("noopener"));
    }

    #[test]
    fn positional_ids_fill_only_blanks() {
        let mut ids = vec!["".to_string(), "keep".to_string(), " ".to_string()];
        fill_positional_ids(ids.iter_mut(), "item");
        assert_eq!(ids, vec!["item-1", "keep", "item-3"]);
    }

    #[test]
    fn missing_alt_reports_path() {
        let img = Image::new("/a.jpg", "");
        let warnings = missing_alt([("items.0.image", &img)]);
        assert_eq!(warnings, vec!["items.0.image: image /a.jpg has no alt text"]);
    }
}
