//! # Site Studio
//!
//! A block-based static website generator. A project is a list of pages;
//! each page is an ordered list of block instances (header, hero, features,
//! pricing and so on) whose data was filled in by an editor or a wizard.
//! Site Studio validates that data, renders every block with its chosen
//! variant, and writes a complete static site.
//!
//! # Architecture
//!
//! ```text
//! project.json ──► validate ──► render blocks ──► assemble pages ──► dist/
//!                  (schema)     (blocks, render)   (generate)
//! ```
//!
//! Rendering a block is a pure function from `(data, theme)` to a fragment,
//! so blocks can be rendered in parallel and memoized, and unit tests can
//! exercise every variant without touching the filesystem.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`schema`] | Declarative field rules and validation with path-qualified errors |
//! | [`blocks`] | The eight block types: data, defaults, variants and templates |
//! | [`render`] | `Block` trait, the object-safe `BlockRenderer`, render results and error fragments |
//! | [`assets`] | Static CSS/JS assets, keyed by id and bundled once per site |
//! | [`generate`] | Generator façade: pages, documents, assets, sitemap, metrics |
//! | [`cache`] | Render memo and the write manifest that skips unchanged files |
//! | [`minify`] | Conservative HTML, CSS and JS minification |
//! | [`project`] | Project, page and block-instance types as produced upstream |
//! | [`config`] | Layered `studio.toml` loading, validation and theme CSS |
//! | [`logging`] | Injectable `Logger` with a bounded in-memory implementation |
//! | [`naming`] | Slugs, output paths and DOM ids |
//! | [`escape`] | HTML escaping for text built outside Maud |
//! | [`output`] | CLI output formatting of generation and validation results |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Engines
//!
//! Block templates are [Maud](https://maud.lambda.xyz/) macros rather than
//! Handlebars or Tera:
//!
//! - **Compile-time checking**: malformed HTML is a build error.
//! - **XSS-safe by default**: every interpolated editor string is escaped.
//! - **Zero runtime files**: nothing to ship besides the binary.
//!
//! ## Typed Block Data
//!
//! Block data arrives as JSON. It is checked against the block's field
//! rules first (so every problem is reported with its path, not just the
//! first one serde hits) and then deserialized into the block's own data
//! struct. Templates only ever see typed, validated data.
//!
//! ## Degrade Per Block
//!
//! A broken block never breaks the site. Invalid data renders a visible
//! error fragment in the block's place and is reported in the generation
//! result; only an empty project or a failed write is fatal.
//!
//! ## Injected Logging
//!
//! Renderers and the generator log through an `Arc<dyn Logger>` handed to
//! them at construction. The CLI uses a ring buffer that also forwards to
//! `tracing`; tests use [`logging::NullLogger`] or inspect the buffer.

pub mod assets;
pub mod blocks;
pub mod cache;
pub mod config;
pub mod escape;
pub mod generate;
pub mod logging;
pub mod minify;
pub mod naming;
pub mod output;
pub mod project;
pub mod render;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_helpers;
