//! Pricing plans: cards, comparison table, or a minimal list.
//!
//! The canonical data is a nested `plans` array (1 to 5 plans). Some editor
//! front-ends store plans as flat numbered fields instead:
//!
//! ```json
//! { "plan1_name": "Starter", "plan1_price": "$9", "plan1_features": "1 site\n-Custom domain" }
//! ```
//!
//! [`from_flat`] maps that shape onto the nested one at the boundary, so
//! validation and rendering only ever see `plans`.

use super::BlockType;
use super::common::{
    self, ANIMATION, Animation, BACKGROUND, BUTTON, Background, Button, ButtonStyle, Frame, LAYOUT,
    Layout, STYLE, VisualStyle,
};
use crate::assets::{AssetId, PRICING_CSS, PRICING_TABLE_CSS, PRICING_TOGGLE_JS};
use crate::naming;
use crate::render::{Block, RenderContext, RenderError, VariantTemplate};
use crate::schema::{Field, Rule, TEXT};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, VariantNames};

/// Highest plan number the flat adapter reads (`plan1_*` … `plan5_*`).
pub const MAX_PLANS: usize = 5;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PricingVariant {
    #[default]
    Cards,
    Table,
    Minimal,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Billing {
    #[default]
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanFeature {
    pub text: String,
    pub included: bool,
}

impl Default for PlanFeature {
    fn default() -> Self {
        Self {
            text: String::new(),
            included: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PricingPlan {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Monthly price.
    pub price: f64,
    /// Price per year; derived from `price` and the yearly discount when absent.
    pub yearly_price: Option<f64>,
    pub features: Vec<PlanFeature>,
    pub button: Option<Button>,
    pub highlighted: bool,
    pub badge: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PricingData {
    pub variant: PricingVariant,
    pub style: VisualStyle,
    pub layout: Layout,
    pub background: Background,
    pub animation: Animation,
    pub title: String,
    pub subtitle: String,
    pub currency: String,
    pub plans: Vec<PricingPlan>,
    /// Monthly/yearly switch above the plans.
    pub billing_toggle: bool,
    pub default_billing: Billing,
    /// Percent off twelve monthly payments when paying yearly.
    pub yearly_discount: u8,
}

impl Default for PricingData {
    fn default() -> Self {
        Self {
            variant: PricingVariant::Cards,
            style: VisualStyle::Modern,
            layout: Layout::default(),
            background: Background::default(),
            animation: Animation::default(),
            title: String::new(),
            subtitle: String::new(),
            currency: "$".to_string(),
            plans: Vec::new(),
            billing_toggle: false,
            default_billing: Billing::Monthly,
            yearly_discount: 20,
        }
    }
}

impl PricingData {
    fn yearly(&self, plan: &PricingPlan) -> f64 {
        plan.yearly_price.unwrap_or_else(|| {
            let full = plan.price * 12.0;
            (full * f64::from(100 - self.yearly_discount.min(100)) / 100.0).round()
        })
    }

    fn shows_yearly(&self) -> bool {
        self.billing_toggle && self.default_billing == Billing::Yearly
    }

    /// Feature texts across all plans, first-seen order.
    fn feature_rows(&self) -> Vec<&str> {
        let mut rows: Vec<&str> = Vec::new();
        for plan in &self.plans {
            for feature in &plan.features {
                if !rows.contains(&feature.text.as_str()) {
                    rows.push(&feature.text);
                }
            }
        }
        rows
    }
}

const FEATURE_FIELDS: &[Field] = &[
    Field::required(
        "text",
        Rule::Str {
            min: 1,
            max: Some(120),
        },
    ),
    Field::optional("included", Rule::Bool),
];

const PLAN_FIELDS: &[Field] = &[
    Field::optional("id", TEXT),
    Field::required(
        "name",
        Rule::Str {
            min: 1,
            max: Some(60),
        },
    ),
    Field::optional(
        "description",
        Rule::Str {
            min: 0,
            max: Some(200),
        },
    ),
    Field::required(
        "price",
        Rule::Number {
            min: Some(0.0),
            max: None,
        },
    ),
    Field::optional(
        "yearlyPrice",
        Rule::Nullable(&Rule::Number {
            min: Some(0.0),
            max: None,
        }),
    ),
    Field::optional(
        "features",
        Rule::Array {
            item: &Rule::Object(FEATURE_FIELDS),
            min: 0,
            max: Some(20),
        },
    ),
    Field::optional("button", Rule::Nullable(&BUTTON)),
    Field::optional("highlighted", Rule::Bool),
    Field::optional(
        "badge",
        Rule::Str {
            min: 0,
            max: Some(30),
        },
    ),
];

const FIELDS: &[Field] = &[
    Field::optional("variant", Rule::Enum(PricingVariant::VARIANTS)),
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
        "currency",
        Rule::Str {
            min: 0,
            max: Some(4),
        },
    ),
    Field::required(
        "plans",
        Rule::Array {
            item: &Rule::Object(PLAN_FIELDS),
            min: 1,
            max: Some(MAX_PLANS),
        },
    ),
    Field::optional("billingToggle", Rule::Bool),
    Field::optional("defaultBilling", Rule::Enum(Billing::VARIANTS)),
    Field::optional(
        "yearlyDiscount",
        Rule::Int {
            min: Some(0),
            max: Some(90),
        },
    ),
];

static CARDS: VariantTemplate<PricingData> = VariantTemplate {
    name: "cards",
    build: cards,
    assets: &[],
};

static TABLE: VariantTemplate<PricingData> = VariantTemplate {
    name: "table",
    build: table,
    assets: &[PRICING_TABLE_CSS],
};

static MINIMAL: VariantTemplate<PricingData> = VariantTemplate {
    name: "minimal",
    build: cards,
    assets: &[],
};

pub struct Pricing;

impl Block for Pricing {
    type Data = PricingData;

    const TYPE: BlockType = BlockType::Pricing;
    const FIELDS: &'static [Field] = FIELDS;
    const VARIANTS: &'static [&'static str] = PricingVariant::VARIANTS;
    const BASE_ASSETS: &'static [AssetId] = &[PRICING_CSS];

    fn default_data() -> PricingData {
        let feature = |text: &str, included: bool| PlanFeature {
            text: text.to_string(),
            included,
        };
        let plan = |name: &str, price: f64, highlighted: bool, features: Vec<PlanFeature>| {
            PricingPlan {
                id: common::new_id(),
                name: name.to_string(),
                price,
                features,
                highlighted,
                badge: if highlighted {
                    "Most popular".to_string()
                } else {
                    String::new()
                },
                button: Some(Button::new(
                    "Choose plan",
                    "#contact",
                    if highlighted {
                        ButtonStyle::Primary
                    } else {
                        ButtonStyle::Outline
                    },
                )),
                ..PricingPlan::default()
            }
        };
        PricingData {
            title: "Simple, transparent pricing".to_string(),
            subtitle: "No hidden fees. Cancel anytime.".to_string(),
            billing_toggle: true,
            plans: vec![
                plan(
                    "Starter",
                    9.0,
                    false,
                    vec![
                        feature("1 website", true),
                        feature("Custom domain", false),
                        feature("Priority support", false),
                    ],
                ),
                plan(
                    "Business",
                    29.0,
                    true,
                    vec![
                        feature("1 website", true),
                        feature("Custom domain", true),
                        feature("Priority support", false),
                    ],
                ),
                plan(
                    "Agency",
                    99.0,
                    false,
                    vec![
                        feature("1 website", true),
                        feature("Custom domain", true),
                        feature("Priority support", true),
                    ],
                ),
            ],
            ..PricingData::default()
        }
    }

    fn normalize(data: &mut PricingData) {
        common::fill_positional_ids(data.plans.iter_mut().map(|p| &mut p.id), "plan");
    }

    fn template(data: &PricingData) -> &'static VariantTemplate<PricingData> {
        match data.variant {
            PricingVariant::Cards => &CARDS,
            PricingVariant::Table => &TABLE,
            PricingVariant::Minimal => &MINIMAL,
        }
    }

    fn frame(data: &PricingData) -> Frame<'_> {
        Frame::new(data.style, &data.layout, &data.background, &data.animation)
    }

    fn feature_assets(data: &PricingData) -> Vec<AssetId> {
        if data.billing_toggle {
            vec![PRICING_TOGGLE_JS]
        } else {
            Vec::new()
        }
    }

    fn warnings(data: &PricingData) -> Vec<String> {
        let mut warnings = Vec::new();
        let highlighted = data.plans.iter().filter(|p| p.highlighted).count();
        if highlighted > 1 {
            warnings.push(format!(
                "plans: {highlighted} plans are highlighted, at most one is recommended"
            ));
        }
        if data.variant == PricingVariant::Table {
            let rows = data.feature_rows().len();
            for (i, plan) in data.plans.iter().enumerate() {
                if plan.features.len() < rows {
                    warnings.push(format!(
                        "plans.{i}.features: {} of {rows} rows listed, the rest show as not included",
                        plan.features.len()
                    ));
                }
            }
        }
        warnings
    }
}

/// `29` for whole amounts, `29.50` otherwise.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn toggle(data: &PricingData) -> Markup {
    let yearly = data.shows_yearly();
    html! {
        @if data.billing_toggle {
            div.price-toggle role="group" aria-label="Billing period" {
                button type="button" data-billing="monthly"
                    aria-pressed=(if yearly { "false" } else { "true" }) { "Monthly" }
                button type="button" data-billing="yearly"
                    aria-pressed=(if yearly { "true" } else { "false" }) {
                    "Yearly"
                    @if data.yearly_discount > 0 {
                        span.price-save { "Save " (data.yearly_discount) "%" }
                    }
                }
            }
        }
    }
}

fn amount(data: &PricingData, plan: &PricingPlan) -> Markup {
    let monthly = format_amount(plan.price);
    if !data.billing_toggle {
        return html! {
            div.price-amount {
                span.price-currency { (data.currency) }
                span.price-value { (monthly) }
                span.price-period { "/month" }
            }
        };
    }
    let yearly = format_amount(data.yearly(plan));
    let show_yearly = data.shows_yearly();
    html! {
        div.price-amount {
            span.price-currency { (data.currency) }
            span.price-value data-monthly=(monthly) data-yearly=(yearly) {
                (if show_yearly { &yearly } else { &monthly })
            }
            span.price-period data-monthly="/month" data-yearly="/year" {
                (if show_yearly { "/year" } else { "/month" })
            }
        }
    }
}

fn plan_button(plan: &PricingPlan) -> Markup {
    html! {
        @if let Some(button) = &plan.button {
            (common::button(button))
        }
    }
}

fn plan_id(dom_id: &str, plan: &PricingPlan) -> String {
    format!("{dom_id}-{}", naming::slugify(&plan.id))
}

/// Cards and minimal; minimal leaves the feature lists out.
fn cards(data: &PricingData, _ctx: &RenderContext, dom_id: &str) -> Result<Markup, RenderError> {
    let with_features = data.variant != PricingVariant::Minimal;
    Ok(html! {
        (common::heading(&data.title, &data.subtitle))
        (toggle(data))
        ul.price-plans style={ "--price-columns: " (data.plans.len()) } {
            @for plan in &data.plans {
                li.price-plan.is-highlighted[plan.highlighted] id=(plan_id(dom_id, plan)) data-stagger-item {
                    @if !plan.badge.is_empty() {
                        span.price-badge { (plan.badge) }
                    }
                    h3.price-name { (plan.name) }
                    @if !plan.description.is_empty() {
                        p.price-desc { (plan.description) }
                    }
                    (amount(data, plan))
                    @if with_features && !plan.features.is_empty() {
                        ul.price-features {
                            @for feature in &plan.features {
                                @if feature.included {
                                    li.is-included { (feature.text) }
                                } @else {
                                    li.is-excluded {
                                        span.visually-hidden { "Not included: " }
                                        (feature.text)
                                    }
                                }
                            }
                        }
                    }
                    (plan_button(plan))
                }
            }
        }
    })
}

fn table(data: &PricingData, _ctx: &RenderContext, dom_id: &str) -> Result<Markup, RenderError> {
    let rows = data.feature_rows();
    Ok(html! {
        (common::heading(&data.title, &data.subtitle))
        (toggle(data))
        div.price-table-wrap {
            table.price-table {
                thead {
                    tr {
                        th scope="col" { span.visually-hidden { "Feature" } }
                        @for plan in &data.plans {
                            th.is-highlighted[plan.highlighted] scope="col" id=(plan_id(dom_id, plan)) {
                                span.price-name { (plan.name) }
                                (amount(data, plan))
                            }
                        }
                    }
                }
                tbody {
                    @for row in &rows {
                        tr {
                            th scope="row" { (row) }
                            @for plan in &data.plans {
                                @let included = plan.features.iter().any(|f| f.text == *row && f.included);
                                td.is-highlighted[plan.highlighted] {
                                    @if included {
                                        span.price-check aria-label="Included" { "✓" }
                                    } @else {
                                        span.price-cross aria-label="Not included" { "—" }
                                    }
                                }
                            }
                        }
                    }
                }
                tfoot {
                    tr {
                        td {}
                        @for plan in &data.plans {
                            td { (plan_button(plan)) }
                        }
                    }
                }
            }
        }
    })
}

// ============================================================================
// Flat adapter
// ============================================================================

/// Map flat `planN_*` editor fields onto nested `plans`.
///
/// Recognized per-plan keys: `name`, `description`, `price`, `yearly_price`,
/// `features`, `highlighted`, `badge`, `button_text`, `button_href`.
/// `features` is newline-separated text; a leading `-` marks a feature as
/// not included, a leading `+` is dropped. Plans without a name are
/// skipped, as are numbers above [`MAX_PLANS`]. Every other key is copied
/// through, except an unknown `variant`, which is dropped so the default
/// applies.
pub fn from_flat(flat: &Map<String, Value>) -> Value {
    let mut out = Map::new();
    for (key, value) in flat {
        if plan_key(key).is_some() {
            continue;
        }
        if key == "variant"
            && !value
                .as_str()
                .is_some_and(|v| PricingVariant::VARIANTS.contains(&v))
        {
            continue;
        }
        out.insert(key.clone(), value.clone());
    }

    let mut plans = Vec::new();
    for n in 1..=MAX_PLANS {
        let get = |field: &str| flat.get(&format!("plan{n}_{field}"));
        let Some(name) = get("name").and_then(Value::as_str).map(str::trim) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }

        let mut plan = Map::new();
        plan.insert("name".into(), Value::from(name));
        if let Some(description) = get("description") {
            plan.insert("description".into(), description.clone());
        }
        if let Some(price) = get("price") {
            plan.insert("price".into(), flat_price(price));
        }
        if let Some(yearly) = get("yearly_price") {
            plan.insert("yearlyPrice".into(), flat_price(yearly));
        }
        if let Some(features) = get("features") {
            plan.insert("features".into(), flat_features(features));
        }
        if let Some(highlighted) = get("highlighted") {
            plan.insert("highlighted".into(), Value::Bool(flat_bool(highlighted)));
        }
        if let Some(badge) = get("badge") {
            plan.insert("badge".into(), badge.clone());
        }
        if let Some(text) = get("button_text").and_then(Value::as_str)
            && !text.trim().is_empty()
        {
            let mut button = Map::new();
            button.insert("text".into(), Value::from(text.trim()));
            if let Some(href) = get("button_href") {
                button.insert("href".into(), href.clone());
            }
            plan.insert("button".into(), Value::Object(button));
        }
        plans.push(Value::Object(plan));
    }
    if !plans.is_empty() || !out.contains_key("plans") {
        out.insert("plans".into(), Value::Array(plans));
    }
    Value::Object(out)
}

/// Data in the flat editor shape: numbered plan fields and no `plans`.
pub fn is_flat(data: &Map<String, Value>) -> bool {
    !data.contains_key("plans") && data.keys().any(|k| plan_key(k).is_some())
}

/// Plan number of a `planN_field` key.
fn plan_key(key: &str) -> Option<usize> {
    let rest = key.strip_prefix("plan")?;
    let (number, field) = rest.split_once('_')?;
    if field.is_empty() || number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    number.parse().ok()
}

/// `"$29.99"` → `29.99`. Unparseable input is passed through so validation
/// reports it at the plan's `price` path.
fn flat_price(value: &Value) -> Value {
    let Some(text) = value.as_str() else {
        return value.clone();
    };
    // A sign before the first digit survives so `min 0` can reject it.
    let first_digit = text.find(|c: char| c.is_ascii_digit()).unwrap_or(text.len());
    let sign = if text[..first_digit].contains('-') { "-" } else { "" };
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    format!("{sign}{digits}")
        .parse::<f64>()
        .ok()
        .and_then(|n| serde_json::Number::from_f64(n).map(Value::Number))
        .unwrap_or_else(|| value.clone())
}

fn flat_features(value: &Value) -> Value {
    let lines: Vec<&str> = match value {
        Value::String(text) => text.lines().collect(),
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        other => return other.clone(),
    };
    let features: Vec<Value> = lines
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (text, included) = match line.strip_prefix('-') {
                Some(rest) => (rest.trim(), false),
                None => (line.strip_prefix('+').unwrap_or(line).trim(), true),
            };
            serde_json::json!({ "text": text, "included": included })
        })
        .collect();
    Value::Array(features)
}

fn flat_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}
