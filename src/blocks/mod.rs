//! Block catalog.
//!
//! | Block | Variants | Notes |
//! |-------|----------|-------|
//! | [`header`] | classic, centered, split, minimal | sticky/transparent, mobile drawer |
//! | [`hero`] | centered, split-image, fullscreen, minimal | eyebrow, stats row |
//! | [`features`] | grid, list, alternating, cards | 1–12 items, 1–4 columns |
//! | [`cta`] | simple, split, banner, newsletter, card | newsletter form |
//! | [`gallery`] | grid, masonry, carousel, justified | lightbox, category filter |
//! | [`pricing`] | cards, table, minimal | 1–5 plans, monthly/yearly toggle |
//! | [`faq`] | accordion, two-column, simple | markdown answers, search |
//! | [`footer`] | simple, columns, centered | link columns, social links |
//!
//! Projects refer to a block by its `blockId`, which is the kebab-case
//! [`BlockType`] name. [`BlockRegistry::builtin`] maps every built-in type
//! to its renderer; extra renderers can be registered under any key.

pub mod common;
pub mod cta;
pub mod faq;
pub mod features;
pub mod footer;
pub mod gallery;
pub mod header;
pub mod hero;
pub mod pricing;

use crate::logging::Logger;
use crate::render::{BlockRenderer, Renderer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, VariantNames};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BlockType {
    Header,
    Hero,
    Features,
    Cta,
    Gallery,
    Pricing,
    Faq,
    Footer,
}

impl BlockType {
    /// Built-in renderer for this type.
    pub fn renderer(self, logger: Arc<dyn Logger>) -> Arc<dyn BlockRenderer> {
        match self {
            BlockType::Header => Arc::new(Renderer::<header::Header>::new(logger)),
            BlockType::Hero => Arc::new(Renderer::<hero::Hero>::new(logger)),
            BlockType::Features => Arc::new(Renderer::<features::Features>::new(logger)),
            BlockType::Cta => Arc::new(Renderer::<cta::Cta>::new(logger)),
            BlockType::Gallery => Arc::new(Renderer::<gallery::Gallery>::new(logger)),
            BlockType::Pricing => Arc::new(Renderer::<pricing::Pricing>::new(logger)),
            BlockType::Faq => Arc::new(Renderer::<faq::Faq>::new(logger)),
            BlockType::Footer => Arc::new(Renderer::<footer::Footer>::new(logger)),
        }
    }
}

/// Renderers keyed by `blockId`.
#[derive(Default, Clone)]
pub struct BlockRegistry {
    renderers: BTreeMap<String, Arc<dyn BlockRenderer>>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in block type under its kebab-case name.
    pub fn builtin(logger: Arc<dyn Logger>) -> Self {
        let mut registry = Self::new();
        for block_type in BlockType::iter() {
            registry.register(block_type.as_ref(), block_type.renderer(logger.clone()));
        }
        registry
    }

    pub fn register(&mut self, block_id: impl Into<String>, renderer: Arc<dyn BlockRenderer>) {
        self.renderers.insert(block_id.into(), renderer);
    }

    pub fn get(&self, block_id: &str) -> Option<&Arc<dyn BlockRenderer>> {
        self.renderers.get(block_id)
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.renderers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}
