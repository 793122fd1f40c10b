//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every page is its positional index and name, with the output path as
//! secondary context after an arrow. Files, warnings and errors follow as
//! indented sections, and a one-line summary closes the report.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! 001 Home → index.html (7 blocks)
//! 002 Services → services/index.html (4 blocks)
//!
//! Files
//!     index.html                 14.2 KB  minified
//!     assets/site.css             9.8 KB  minified
//!     sitemap.xml                  312 B
//!
//! Warnings
//!     Home › hero-1: image.alt: image has no alt text
//!
//! Generated 2 pages, 6 files (41.0 KB → 30.7 KB) in 84 ms
//!     Blocks: 11 rendered, 1 skipped, 0 failed, 4 cached
//!     Scores: performance 100, SEO 90
//! ```
//!
//! ## Blocks
//!
//! ```text
//! 001 header: classic, centered, split, minimal
//! 002 hero: centered, split-image, fullscreen, minimal
//! ```
//!
//! ## Validate
//!
//! ```text
//! pricing: 2 errors
//!     plans.0.price: Expected number, received string
//!     plans.1.name: Required
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::blocks::BlockRegistry;
use crate::generate::GenerationResult;
use crate::schema::ValidationErrors;
use serde_json::Value;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte size.
///
/// ```text
/// 312 B
/// 14.2 KB
/// 1.3 MB
/// ```
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Titled section of indented lines, preceded by a blank line.
fn section(lines: &mut Vec<String>, title: &str, items: impl IntoIterator<Item = String>) {
    let mut items = items.into_iter().peekable();
    if items.peek().is_none() {
        return;
    }
    lines.push(String::new());
    lines.push(title.to_string());
    lines.extend(items.map(|item| format!("{}{item}", indent(1))));
}

// ============================================================================
// Generate
// ============================================================================

/// Format a generation result as display lines.
pub fn format_generation_result(result: &GenerationResult) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, page) in result.pages.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {} ({})",
            format_index(i + 1),
            page.name,
            page.path,
            plural(page.blocks, "block", "blocks")
        ));
    }

    let width = result.files.iter().map(|f| f.path.len()).max().unwrap_or(0);
    section(
        &mut lines,
        "Files",
        result.files.iter().map(|f| {
            let size = format!("{:>9}", format_size(f.size));
            if f.optimized {
                format!("{:<width$}  {size}  minified", f.path)
            } else {
                format!("{:<width$}  {size}", f.path)
            }
        }),
    );
    section(&mut lines, "Warnings", result.warnings.iter().cloned());
    section(
        &mut lines,
        "Errors",
        result.errors.iter().map(|e| match &e.stack {
            Some(cause) => format!("{} {} ({cause})", e.code, e.message),
            None => format!("{} {}", e.code, e.message),
        }),
    );

    let m = &result.metrics;
    lines.push(String::new());
    if !result.success {
        lines.push(format!(
            "Generation failed after {} ms with {}",
            m.duration_ms,
            plural(result.errors.len(), "error", "errors")
        ));
        return lines;
    }
    lines.push(format!(
        "Generated {}, {} ({} \u{2192} {}) in {} ms",
        plural(m.pages_generated, "page", "pages"),
        plural(m.files_generated, "file", "files"),
        format_size(m.total_size),
        format_size(m.compressed_size),
        m.duration_ms
    ));
    lines.push(format!(
        "{}Blocks: {} rendered, {} skipped, {} failed, {} cached",
        indent(1),
        m.blocks_rendered,
        m.blocks_skipped,
        m.blocks_failed,
        m.cache_hits
    ));
    if m.files_unchanged > 0 {
        lines.push(format!(
            "{}Unchanged: {}",
            indent(1),
            plural(m.files_unchanged, "file", "files")
        ));
    }
    lines.push(format!(
        "{}Scores: performance {}, SEO {}",
        indent(1),
        m.performance_score,
        m.seo_score
    ));
    lines
}

/// Print a generation result to stdout.
pub fn print_generation_result(result: &GenerationResult) {
    for line in format_generation_result(result) {
        println!("{}", line);
    }
}

// ============================================================================
// Blocks
// ============================================================================

/// One line per registered block: key and variants.
pub fn format_block_list(registry: &BlockRegistry) -> Vec<String> {
    registry
        .keys()
        .enumerate()
        .filter_map(|(i, key)| {
            let renderer = registry.get(key)?;
            Some(format!(
                "{} {key}: {}",
                format_index(i + 1),
                renderer.variants().join(", ")
            ))
        })
        .collect()
}

/// Print the block catalog to stdout.
pub fn print_block_list(registry: &BlockRegistry) {
    for line in format_block_list(registry) {
        println!("{}", line);
    }
}

// ============================================================================
// Validate
// ============================================================================

/// Validation report for one block's data.
pub fn format_validation(block_id: &str, result: &Result<Value, ValidationErrors>) -> Vec<String> {
    match result {
        Ok(_) => vec![format!("{block_id}: valid")],
        Err(errors) => {
            let mut lines = vec![format!(
                "{block_id}: {}",
                plural(errors.errors.len(), "error", "errors")
            )];
            lines.extend(errors.errors.iter().map(|e| format!("{}{e}", indent(1))));
            lines
        }
    }
}

/// Print a validation report to stdout.
pub fn print_validation(block_id: &str, result: &Result<Value, ValidationErrors>) {
    for line in format_validation(block_id, result) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
