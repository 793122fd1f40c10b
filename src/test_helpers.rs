//! Shared test utilities for the site-studio test suite.
//!
//! Provides project builders, generators wired to a temp output directory,
//! and lookups over generation results.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let result = quiet_generator(tmp.path()).generate(&project(json!([
//!     { "name": "Home", "blocks": [hero("intro")] },
//! ])));
//!
//! let html = read_output(tmp.path(), "index.html");
//! assert_in_order(&html, &["<header", "blk-intro"]);
//! assert!(find_file(&result, "sitemap.xml").size > 0);
//! ```

use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;

use crate::config::StudioConfig;
use crate::generate::{GeneratedFile, GenerationResult, Generator};
use crate::logging::{LogLevel, NullLogger, RingBufferLogger};
use crate::project::Project;

// =========================================================================
// Projects
// =========================================================================

/// Load `fixtures/<name>`. Panics if missing or malformed.
pub fn load_fixture_project(name: &str) -> Project {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name);
    Project::load(&path).unwrap_or_else(|e| panic!("fixture {}: {e}", path.display()))
}

/// A project for "Acme" with the given pages JSON.
pub fn project(pages: Value) -> Project {
    serde_json::from_value(json!({
        "id": "proj_test",
        "businessInfo": { "name": "Acme", "description": "Tools for everyone" },
        "pages": pages
    }))
    .unwrap()
}

/// A hero block instance with a valid title.
pub fn hero(id: &str) -> Value {
    json!({ "id": id, "blockId": "hero", "order": 1, "data": { "title": "Welcome" } })
}

/// A CTA block instance titled after its id.
pub fn cta(id: &str, order: i64) -> Value {
    json!({ "id": id, "blockId": "cta", "order": order, "data": { "title": format!("Call {id}") } })
}

// =========================================================================
// Generators
// =========================================================================

/// Stock config writing to `output`.
pub fn test_config(output: &Path) -> StudioConfig {
    let mut config = StudioConfig::default();
    config.generator.output_path = output.display().to_string();
    config
}

/// Generator with stock options and no log output.
pub fn quiet_generator(output: &Path) -> Generator {
    generator_with(output, |_| {})
}

/// Generator with config tweaks applied.
pub fn generator_with(output: &Path, tweak: impl FnOnce(&mut StudioConfig)) -> Generator {
    let mut config = test_config(output);
    tweak(&mut config);
    Generator::new(config, Arc::new(NullLogger))
}

/// Generator whose log is kept for inspection.
pub fn recording_generator(
    output: &Path,
    tweak: impl FnOnce(&mut StudioConfig),
) -> (Generator, Arc<RingBufferLogger>) {
    let mut config = test_config(output);
    tweak(&mut config);
    let logger = Arc::new(RingBufferLogger::new(500, LogLevel::Debug));
    (Generator::new(config, logger.clone()), logger)
}

// =========================================================================
// Lookups (panic with a clear message on miss)
// =========================================================================

/// Find a generated file by path. Panics if not found.
pub fn find_file<'a>(result: &'a GenerationResult, path: &str) -> &'a GeneratedFile {
    result.file(path).unwrap_or_else(|| {
        let paths: Vec<&str> = result.files.iter().map(|f| f.path.as_str()).collect();
        panic!("file '{path}' not generated. Available: {paths:?}")
    })
}

/// Read a written output file. Panics if missing.
pub fn read_output(output: &Path, path: &str) -> String {
    std::fs::read_to_string(output.join(path))
        .unwrap_or_else(|e| panic!("reading {path} from {}: {e}", output.display()))
}

/// Assert that every needle occurs in `haystack`, in the given order.
pub fn assert_in_order(haystack: &str, needles: &[&str]) {
    let mut from = 0;
    for needle in needles {
        match haystack[from..].find(needle) {
            Some(at) => from += at + needle.len(),
            None => panic!("'{needle}' not found after byte {from} (expected order {needles:?})"),
        }
    }
}
