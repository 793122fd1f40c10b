//! FAQ: questions with Markdown answers, shown as an accordion or open list.

use super::BlockType;
use super::common::{
    self, ANIMATION, Animation, BACKGROUND, Background, Frame, LAYOUT, Layout, STYLE, VisualStyle,
};
use crate::assets::{AssetId, FAQ_CSS, FAQ_JS};
use crate::naming;
use crate::render::{Block, RenderContext, RenderError, VariantTemplate};
use crate::schema::{Field, Rule, TEXT};
use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html as md_html};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, VariantNames};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FaqVariant {
    #[default]
    Accordion,
    TwoColumn,
    Simple,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqItem {
    pub id: String,
    pub question: String,
    /// Markdown. Raw HTML inside it is shown as text.
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaqData {
    pub variant: FaqVariant,
    pub style: VisualStyle,
    pub layout: Layout,
    pub background: Background,
    pub animation: Animation,
    pub title: String,
    pub subtitle: String,
    pub items: Vec<FaqItem>,
    pub searchable: bool,
    pub search_placeholder: String,
    pub empty_message: String,
    /// Accordion only: several answers may be open at once.
    pub allow_multiple: bool,
    pub open_first: bool,
}

impl Default for FaqData {
    fn default() -> Self {
        Self {
            variant: FaqVariant::Accordion,
            style: VisualStyle::Modern,
            layout: Layout::default(),
            background: Background::default(),
            animation: Animation::default(),
            title: String::new(),
            subtitle: String::new(),
            items: Vec::new(),
            searchable: false,
            search_placeholder: "Search questions".to_string(),
            empty_message: "No matching questions.".to_string(),
            allow_multiple: false,
            open_first: false,
        }
    }
}

impl FaqData {
    fn toggles(&self) -> bool {
        self.variant != FaqVariant::Simple
    }
}

const ITEM_FIELDS: &[Field] = &[
    Field::optional("id", TEXT),
    Field::required(
        "question",
        Rule::Str {
            min: 1,
            max: Some(200),
        },
    ),
    Field::required(
        "answer",
        Rule::Str {
            min: 1,
            max: Some(2000),
        },
    ),
];

const FIELDS: &[Field] = &[
    Field::optional("variant", Rule::Enum(FaqVariant::VARIANTS)),
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
            max: Some(30),
        },
    ),
    Field::optional("searchable", Rule::Bool),
    Field::optional(
        "searchPlaceholder",
        Rule::Str {
            min: 0,
            max: Some(60),
        },
    ),
    Field::optional(
        "emptyMessage",
        Rule::Str {
            min: 0,
            max: Some(120),
        },
    ),
    Field::optional("allowMultiple", Rule::Bool),
    Field::optional("openFirst", Rule::Bool),
];

static ACCORDION: VariantTemplate<FaqData> = VariantTemplate {
    name: "accordion",
    build: faq,
    assets: &[FAQ_JS],
};

static TWO_COLUMN: VariantTemplate<FaqData> = VariantTemplate {
    name: "two-column",
    build: faq,
    assets: &[FAQ_JS],
};

static SIMPLE: VariantTemplate<FaqData> = VariantTemplate {
    name: "simple",
    build: faq,
    assets: &[],
};

pub struct Faq;

impl Block for Faq {
    type Data = FaqData;

    const TYPE: BlockType = BlockType::Faq;
    const FIELDS: &'static [Field] = FIELDS;
    const VARIANTS: &'static [&'static str] = FaqVariant::VARIANTS;
    const BASE_ASSETS: &'static [AssetId] = &[FAQ_CSS];

    fn default_data() -> FaqData {
        let item = |question: &str, answer: &str| FaqItem {
            id: common::new_id(),
            question: question.to_string(),
            answer: answer.to_string(),
        };
        FaqData {
            title: "Frequently asked questions".to_string(),
            items: vec![
                item(
                    "How long does a project take?",
                    "Most sites launch within **two to four weeks**.",
                ),
                item(
                    "Can I update the content myself?",
                    "Yes. Every block is editable without touching code.",
                ),
                item(
                    "Do you offer support after launch?",
                    "Every plan includes 30 days of support. See [pricing](#pricing) for more.",
                ),
            ],
            ..FaqData::default()
        }
    }

    fn normalize(data: &mut FaqData) {
        common::fill_positional_ids(data.items.iter_mut().map(|i| &mut i.id), "faq");
    }

    fn template(data: &FaqData) -> &'static VariantTemplate<FaqData> {
        match data.variant {
            FaqVariant::Accordion => &ACCORDION,
            FaqVariant::TwoColumn => &TWO_COLUMN,
            FaqVariant::Simple => &SIMPLE,
        }
    }

    fn frame(data: &FaqData) -> Frame<'_> {
        Frame::new(data.style, &data.layout, &data.background, &data.animation)
    }

    fn feature_assets(data: &FaqData) -> Vec<AssetId> {
        if data.searchable {
            vec![FAQ_JS]
        } else {
            Vec::new()
        }
    }

    fn warnings(data: &FaqData) -> Vec<String> {
        let mut warnings = Vec::new();
        for (i, item) in data.items.iter().enumerate() {
            let duplicate = data.items[..i]
                .iter()
                .position(|other| other.question.trim() == item.question.trim());
            if let Some(first) = duplicate {
                warnings.push(format!("items.{i}.question: repeats items.{first}.question"));
            }
        }
        warnings
    }
}

/// Render an answer's Markdown. Raw HTML becomes escaped text and link or
/// image destinations with script schemes become `#`.
pub fn answer_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link { link_type, dest_url, title, id }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_dest(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image { link_type, dest_url, title, id }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_dest(dest_url),
            title,
            id,
        }),
        other => other,
    });
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

fn safe_dest(dest: CowStr<'_>) -> CowStr<'_> {
    CowStr::from(common::safe_href(&dest).to_string())
}

fn faq(data: &FaqData, _ctx: &RenderContext, dom_id: &str) -> Result<Markup, RenderError> {
    let toggles = data.toggles();
    let search_id = format!("{dom_id}-search");
    Ok(html! {
        (common::heading(&data.title, &data.subtitle))
        @if data.searchable {
            div.faq-search {
                label.visually-hidden for=(search_id) { (data.search_placeholder) }
                input id=(search_id) type="search" placeholder=(data.search_placeholder) autocomplete="off";
            }
        }
        div.faq-list data-multiple[toggles && data.allow_multiple] {
            @for (i, item) in data.items.iter().enumerate() {
                @let item_id = format!("{dom_id}-{}", naming::slugify(&item.id));
                @let answer_id = format!("{item_id}-answer");
                @let open = data.open_first && i == 0;
                div.faq-item id=(item_id) data-stagger-item {
                    @if toggles {
                        h3 {
                            button.faq-question type="button"
                                aria-expanded=(if open { "true" } else { "false" })
                                aria-controls=(answer_id) {
                                span.faq-question-text { (item.question) }
                            }
                        }
                        div.faq-answer id=(answer_id) role="region" hidden[!open] {
                            (PreEscaped(answer_html(&item.answer)))
                        }
                    } @else {
                        h3.faq-question-text { (item.question) }
                        div.faq-answer id=(answer_id) {
                            (PreEscaped(answer_html(&item.answer)))
                        }
                    }
                }
            }
        }
        @if data.searchable {
            p.faq-empty hidden { (data.empty_message) }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NullLogger;
    use crate::render::{BlockRenderer, RenderResult, Renderer};
    use serde_json::json;
    use std::sync::Arc;

    fn renderer() -> Renderer<Faq> {
        Renderer::new(Arc::new(NullLogger))
    }

    fn render(data: serde_json::Value) -> RenderResult {
        renderer().render(&data, &RenderContext::default())
    }

    fn one(extra: serde_json::Value) -> serde_json::Value {
        let mut data = json!({"items": [{"question": "Why?", "answer": "Because."}]});
        if let (Some(target), Some(extra)) = (data.as_object_mut(), extra.as_object()) {
            target.extend(extra.clone());
        }
        data
    }

    #[test]
    fn markdown_answers_render() {
        assert_eq!(
            answer_html("Use **bold** and [links](/x)."),
            "<p>Use <strong>bold</strong> and <a href=\"/x\">links</a>.</p>\n"
        );
    }

    #[test]
    fn raw_html_in_answers_is_escaped() {
        let html = answer_html("Hi <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn script_links_in_answers_are_neutralized() {
        assert_eq!(
            answer_html("[click](javascript:alert(1))"),
            "<p><a href=\"#\">click</a></p>\n"
        );
        let html = answer_html("![x](JAVASCRIPT:alert(1)) [ok](https://example.com)");
        assert!(!html.to_ascii_lowercase().contains("javascript:"));
        assert!(html.contains("href=\"https://example.com\""));
    }

    #[test]
    fn accordion_wires_aria() {
        let result = render(one(json!({})));
        assert!(result.html.contains("aria-expanded=\"false\""));
        assert!(result.html.contains("aria-controls=\"blk-faq-faq-1-answer\""));
        assert!(result.html.contains("id=\"blk-faq-faq-1-answer\""));
        assert!(result.html.contains(" hidden"));
        assert!(result.assets.contains(&FAQ_JS));
    }

    #[test]
    fn open_first_expands_first_item() {
        let result = render(one(json!({"openFirst": true})));
        assert!(result.html.contains("aria-expanded=\"true\""));
        assert!(!result.html.contains(" hidden"));
    }

    #[test]
    fn allow_multiple_marks_list() {
        let result = render(one(json!({"allowMultiple": true})));
        assert!(result.html.contains("data-multiple"));
        let result = render(one(json!({"allowMultiple": true, "variant": "simple"})));
        assert!(!result.html.contains("data-multiple"));
    }

    #[test]
    fn simple_variant_has_no_toggles_or_script() {
        let result = render(one(json!({"variant": "simple"})));
        assert!(!result.html.contains("<button"));
        assert!(result.html.contains("faq-question-text"));
        assert!(result.js.is_empty());
    }

    #[test]
    fn search_adds_input_and_empty_state() {
        let result = render(one(json!({"variant": "simple", "searchable": true})));
        assert!(result.html.contains("type=\"search\""));
        assert!(result.html.contains("No matching questions."));
        assert!(result.assets.contains(&FAQ_JS));
    }

    #[test]
    fn answer_is_required() {
        let errors = renderer()
            .validate(&json!({"items": [{"question": "Why?"}]}))
            .unwrap_err();
        assert_eq!(errors.errors[0].path, "items.0.answer");
        assert_eq!(errors.errors[0].message, "Required");
    }

    #[test]
    fn repeated_question_warns() {
        let result = render(json!({"items": [
            {"question": "Why?", "answer": "A"},
            {"question": "Why? ", "answer": "B"}
        ]}));
        assert_eq!(result.warnings, vec!["items.1.question: repeats items.0.question"]);
    }
}
