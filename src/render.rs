//! Block rendering contract.
//!
//! A block type implements [`Block`]: its typed data, its schema, its
//! default data, and one [`VariantTemplate`] per visual variant. The
//! generic [`Renderer`] turns any `Block` into the object-safe
//! [`BlockRenderer`] the generator drives:
//!
//! ```text
//! JSON ─► check + normalize ─► template(variant).build ─► frame + scoped CSS ─► RenderResult
//!               │                          │
//!               ▼                          ▼ RenderError
//!         error fragment         retry with the default theme ─► error fragment
//! ```
//!
//! `render` never fails and never panics: every outcome, invalid data
//! included, is a [`RenderResult`] whose `errors` say what went wrong.
//! Static CSS/JS is referenced by [`AssetId`]; the bundled `css`/`js`
//! strings are only a convenience for rendering a block on its own.

use crate::assets::{self, ANIMATE_JS, AssetId, AssetKind, BASE_CSS, ERROR_CSS};
use crate::blocks::BlockType;
use crate::blocks::common::{self, Frame, SectionTag};
use crate::config::ThemeConfig;
use crate::logging::Logger;
use crate::naming;
use crate::schema::{self, Field, ValidationErrors};
use maud::{Markup, html};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("theme value {key} = {value:?} is not a safe CSS value")]
    MalformedTheme { key: &'static str, value: String },
    #[error("{field} = {value:?} cannot be embedded safely")]
    UnsafeValue { field: &'static str, value: String },
}

/// Everything a render needs besides the block data.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub theme: ThemeConfig,
    /// Emit `loading="lazy"` on images.
    pub lazy_images: bool,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            theme: ThemeConfig::default(),
            lazy_images: true,
        }
    }
}

/// Why a render produced an error fragment instead of the block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockFailure {
    Validation(ValidationErrors),
    Render(RenderError),
}

impl BlockFailure {
    pub fn messages(&self) -> Vec<String> {
        match self {
            BlockFailure::Validation(e) => e.errors.iter().map(|f| f.to_string()).collect(),
            BlockFailure::Render(e) => vec![e.to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderResult {
    pub html: String,
    /// Bundled static CSS of `assets` followed by `custom_css`.
    pub css: String,
    pub js: String,
    /// Static assets this fragment depends on, in first-use order.
    pub assets: Vec<AssetId>,
    /// Scoped per-instance rule derived from theme and background.
    pub custom_css: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip)]
    pub failure: Option<BlockFailure>,
}

impl RenderResult {
    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }
}

/// Builds the inner markup of one variant. Receives the block's DOM id so
/// templates can derive stable ids for ARIA wiring.
pub type BuildFn<D> = fn(&D, &RenderContext, &str) -> Result<Markup, RenderError>;

/// One visual variant: its markup builder and the static assets it needs.
pub struct VariantTemplate<D: 'static> {
    pub name: &'static str,
    pub build: BuildFn<D>,
    pub assets: &'static [AssetId],
}

/// A block type.
pub trait Block: Send + Sync + 'static {
    type Data: DeserializeOwned + Serialize + Send + Sync;

    const TYPE: BlockType;
    const TAG: SectionTag = SectionTag::Section;
    const FIELDS: &'static [Field];
    const VARIANTS: &'static [&'static str];
    /// Assets every variant needs, also shipped with the error fragment.
    const BASE_ASSETS: &'static [AssetId];

    fn default_data() -> Self::Data;

    /// Post-validation fix-ups (positional ids and the like).
    fn normalize(_data: &mut Self::Data) {}

    fn template(data: &Self::Data) -> &'static VariantTemplate<Self::Data>;

    fn frame(data: &Self::Data) -> Frame<'_>;

    /// Assets switched on by data flags rather than by the variant.
    fn feature_assets(_data: &Self::Data) -> Vec<AssetId> {
        Vec::new()
    }

    /// Non-fatal issues worth surfacing to the editor.
    fn warnings(_data: &Self::Data) -> Vec<String> {
        Vec::new()
    }
}

/// Object-safe face of a block type, keyed by `blockId` in the registry.
pub trait BlockRenderer: Send + Sync {
    fn block_type(&self) -> BlockType;

    fn variants(&self) -> &'static [&'static str];

    fn default_data(&self) -> Value;

    /// Validated data with defaults applied.
    fn validate(&self, data: &Value) -> Result<Value, ValidationErrors>;

    fn render_instance(&self, data: &Value, ctx: &RenderContext, instance_id: &str)
    -> RenderResult;

    fn render(&self, data: &Value, ctx: &RenderContext) -> RenderResult {
        self.render_instance(data, ctx, "")
    }
}

pub struct Renderer<B: Block> {
    logger: Arc<dyn Logger>,
    block: PhantomData<fn() -> B>,
}

impl<B: Block> Renderer<B> {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            logger,
            block: PhantomData,
        }
    }

    pub fn validate_data(&self, data: &Value) -> Result<B::Data, ValidationErrors> {
        schema::validate_logged(self.logger.as_ref(), B::TYPE.as_ref(), || {
            let mut parsed: B::Data = schema::validate(B::FIELDS, data)?;
            B::normalize(&mut parsed);
            Ok(parsed)
        })
    }

    fn build(
        &self,
        data: &B::Data,
        ctx: &RenderContext,
        dom_id: &str,
    ) -> Result<RenderResult, RenderError> {
        let template = B::template(data);
        let frame = B::frame(data);
        let custom_css = common::scoped_css(dom_id, &frame, &ctx.theme)?;
        let inner = (template.build)(data, ctx, dom_id)?;
        let html = common::section(
            B::TAG,
            B::TYPE.as_ref(),
            template.name,
            &frame,
            dom_id,
            inner,
        )
        .into_string();

        let mut ids: Vec<AssetId> = vec![BASE_CSS];
        let feature = B::feature_assets(data);
        for id in B::BASE_ASSETS
            .iter()
            .chain(template.assets)
            .chain(feature.iter())
        {
            assets::push_unique(&mut ids, *id);
        }
        if frame.animation.active() {
            assets::push_unique(&mut ids, ANIMATE_JS);
        }

        let mut css = assets::bundle(&ids, AssetKind::Css);
        css.push_str("\n\n");
        css.push_str(&custom_css);

        Ok(RenderResult {
            html,
            css,
            js: assets::bundle(&ids, AssetKind::Js),
            assets: ids,
            custom_css,
            errors: Vec::new(),
            warnings: B::warnings(data),
            failure: None,
        })
    }
}

impl<B: Block> BlockRenderer for Renderer<B> {
    fn block_type(&self) -> BlockType {
        B::TYPE
    }

    fn variants(&self) -> &'static [&'static str] {
        B::VARIANTS
    }

    fn default_data(&self) -> Value {
        serde_json::to_value(B::default_data()).unwrap_or_else(|_| Value::Object(Default::default()))
    }

    fn validate(&self, data: &Value) -> Result<Value, ValidationErrors> {
        let parsed = self.validate_data(data)?;
        serde_json::to_value(parsed).map_err(|e| ValidationErrors::single("", e.to_string()))
    }

    fn render_instance(
        &self,
        data: &Value,
        ctx: &RenderContext,
        instance_id: &str,
    ) -> RenderResult {
        let target = format!("render.{}", B::TYPE);
        let dom_id = naming::block_dom_id(instance_id, B::TYPE.as_ref());

        let parsed = match self.validate_data(data) {
            Ok(parsed) => parsed,
            Err(errors) => {
                return error_fragment(
                    B::TYPE,
                    &dom_id,
                    BlockFailure::Validation(errors),
                    B::BASE_ASSETS,
                );
            }
        };

        match self.build(&parsed, ctx, &dom_id) {
            Ok(result) => {
                self.logger.debug(&target, &format!("rendered {dom_id}"));
                result
            }
            Err(first) => {
                self.logger.error(
                    &target,
                    &format!("render of {dom_id} failed: {first}; retrying with default theme"),
                );
                let fallback = RenderContext {
                    theme: ThemeConfig::default(),
                    ..ctx.clone()
                };
                match self.build(&parsed, &fallback, &dom_id) {
                    Ok(mut result) => {
                        result
                            .warnings
                            .push(format!("rendered with the default theme: {first}"));
                        result
                    }
                    Err(second) => {
                        self.logger
                            .error(&target, &format!("fallback render of {dom_id} failed: {second}"));
                        error_fragment(
                            B::TYPE,
                            &dom_id,
                            BlockFailure::Render(second),
                            B::BASE_ASSETS,
                        )
                    }
                }
            }
        }
    }
}

/// Visible stand-in for a block that could not be rendered.
pub fn error_fragment(
    block: BlockType,
    dom_id: &str,
    failure: BlockFailure,
    base_assets: &[AssetId],
) -> RenderResult {
    let messages = failure.messages();
    let html = html! {
        section.blk.blk-error id=(dom_id) data-block=(block.as_ref()) role="alert" {
            h2 { "The " (block.as_ref()) " block could not be rendered" }
            ul {
                @for message in &messages {
                    li { (message) }
                }
            }
        }
    }
    .into_string();

    let mut ids = vec![BASE_CSS, ERROR_CSS];
    for id in base_assets {
        assets::push_unique(&mut ids, *id);
    }
    RenderResult {
        html,
        css: assets::bundle(&ids, AssetKind::Css),
        js: assets::bundle(&ids, AssetKind::Js),
        assets: ids,
        custom_css: String::new(),
        errors: messages,
        warnings: Vec::new(),
        failure: Some(failure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::cta::Cta;
    use crate::logging::{LogLevel, RingBufferLogger};
    use serde_json::json;

    fn renderer() -> (Arc<RingBufferLogger>, Renderer<Cta>) {
        let logger = Arc::new(RingBufferLogger::new(100, LogLevel::Debug));
        (logger.clone(), Renderer::new(logger))
    }

    #[test]
    fn invalid_data_yields_error_fragment() {
        let (_, r) = renderer();
        let result = r.render(&json!({"variant": "diagonal"}), &RenderContext::default());
        assert!(!result.is_ok());
        assert!(result.html.contains("blk-error"));
        assert!(result.errors.iter().any(|e| e.starts_with("variant:")));
        assert!(result.assets.contains(&ERROR_CSS));
        assert!(result.css.contains("/* cta.css */"));
    }

    #[test]
    fn error_fragment_escapes_messages() {
        let failure = BlockFailure::Validation(ValidationErrors::single("title", "<b>bad</b>"));
        let result = error_fragment(BlockType::Cta, "blk-cta", failure, &[]);
        assert!(result.html.contains("&lt;b&gt;bad&lt;/b&gt;"));
        assert!(!result.html.contains("<b>"));
    }

    #[test]
    fn malformed_theme_falls_back_with_warning() {
        let (logger, r) = renderer();
        let mut ctx = RenderContext::default();
        ctx.theme.colors.primary = "red; } body { display: none".into();
        let result = r.render(&r.default_data(), &ctx);
        assert!(result.is_ok());
        assert!(result.custom_css.contains("#2563eb"));
        assert!(result.warnings.iter().any(|w| w.contains("default theme")));
        assert!(
            logger
                .entries()
                .iter()
                .any(|e| e.level == LogLevel::Error && e.target == "render.cta")
        );
    }

    #[test]
    fn unsafe_data_fails_both_attempts() {
        let (_, r) = renderer();
        let data = json!({
            "title": "x",
            "background": { "type": "solid", "color": "red;}" }
        });
        let result = r.render(&data, &RenderContext::default());
        assert!(matches!(
            result.failure,
            Some(BlockFailure::Render(RenderError::UnsafeValue { .. }))
        ));
        assert!(result.html.contains("blk-error"));
    }

    #[test]
    fn validation_is_logged_under_schema_target() {
        let (logger, r) = renderer();
        r.render(&json!({"title": 5}), &RenderContext::default());
        assert!(
            logger
                .entries()
                .iter()
                .any(|e| e.target == "schema.cta" && e.level == LogLevel::Warn)
        );
    }

    #[test]
    fn instance_id_sets_dom_id() {
        let (_, r) = renderer();
        let result = r.render_instance(&r.default_data(), &RenderContext::default(), "CTA 2");
        assert!(result.html.contains("id=\"blk-cta-2\""));
        assert!(result.custom_css.starts_with("#blk-cta-2 "));
    }

    #[test]
    fn animation_pulls_in_animate_script() {
        let (_, r) = renderer();
        let data = json!({"title": "x", "animation": {"enabled": true}});
        let result = r.render(&data, &RenderContext::default());
        assert!(result.assets.contains(&ANIMATE_JS));
        assert!(result.js.contains("/* animate.js */"));
    }
}
