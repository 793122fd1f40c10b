//! End-to-end generation of the `fixtures/tech-solutions.json` project
//! through the library API.
//!
//! Run with: cargo test --test site_generation

use pretty_assertions::assert_eq;
use serde_json::Value;
use site_studio::blocks::BlockRegistry;
use site_studio::cache::MANIFEST_FILENAME;
use site_studio::config::StudioConfig;
use site_studio::generate::{GenerationResult, Generator};
use site_studio::logging::{LogLevel, NullLogger, RingBufferLogger};
use site_studio::project::Project;
use site_studio::render::RenderContext;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use walkdir::WalkDir;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/tech-solutions.json")
}

fn fixture() -> Project {
    Project::load(&fixture_path()).expect("fixture loads")
}

fn config_for(output: &Path) -> StudioConfig {
    let mut config = StudioConfig::default();
    config.generator.output_path = output.display().to_string();
    config.generator.base_url = "https://techsolutions.example/".to_string();
    config
}

fn generate_into(output: &Path, project: &Project) -> GenerationResult {
    Generator::new(config_for(output), Arc::new(NullLogger)).generate(project)
}

fn read(output: &Path, path: &str) -> String {
    std::fs::read_to_string(output.join(path))
        .unwrap_or_else(|e| panic!("reading {path}: {e}"))
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("'{needle}' not found"))
}

#[test]
fn tech_solutions_site_is_generated() {
    let tmp = TempDir::new().unwrap();
    let result = generate_into(tmp.path(), &fixture());

    assert!(result.success, "errors: {:?}", result.errors);
    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);

    let pages: Vec<(&str, &str)> = result
        .pages
        .iter()
        .map(|p| (p.name.as_str(), p.path.as_str()))
        .collect();
    assert_eq!(
        pages,
        vec![
            ("Home", "index.html"),
            ("Services", "services/index.html"),
            ("Contact", "contact/index.html"),
        ]
    );

    let m = &result.metrics;
    assert_eq!(m.pages_generated, 3);
    assert_eq!(m.files_generated, 7);
    assert_eq!(m.blocks_rendered, 16);
    assert_eq!(m.blocks_skipped, 2);
    assert_eq!(m.blocks_failed, 0);
    assert!(m.compressed_size <= m.total_size);
    assert!(m.seo_score > 0 && m.seo_score <= 100);
    assert!(m.performance_score > 0 && m.performance_score <= 100);

    assert!(
        result
            .warnings
            .iter()
            .any(|w| w.contains("no renderer for block type 'testimonials'")),
        "warnings: {:?}",
        result.warnings
    );

    for file in &result.files {
        let on_disk = std::fs::metadata(tmp.path().join(&file.path)).unwrap();
        assert_eq!(on_disk.len(), file.size, "{}", file.path);
    }

    let mut written: Vec<String> = WalkDir::new(tmp.path())
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(tmp.path()).unwrap();
            rel.to_string_lossy().replace('\\', "/")
        })
        .filter(|p| p != MANIFEST_FILENAME)
        .collect();
    written.sort();
    let mut reported: Vec<String> = result.files.iter().map(|f| f.path.clone()).collect();
    reported.sort();
    assert_eq!(written, reported);
}

#[test]
fn home_page_keeps_block_order() {
    let tmp = TempDir::new().unwrap();
    generate_into(tmp.path(), &fixture());
    let html = read(tmp.path(), "index.html");

    let ids = [
        "blk-site-header",
        "blk-hero-main",
        "blk-services-overview",
        "blk-plans",
        "blk-questions",
        "blk-contact-cta",
        "blk-site-footer",
    ];
    let positions: Vec<usize> = ids.iter().map(|id| position(&html, id)).collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
}

#[test]
fn block_array_order_does_not_matter() {
    let project = fixture();
    let mut shuffled = project.clone();
    for page in &mut shuffled.pages {
        page.blocks.reverse();
    }

    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    generate_into(a.path(), &project);
    generate_into(b.path(), &shuffled);
    for path in ["index.html", "services/index.html", "contact/index.html"] {
        assert_eq!(read(a.path(), path), read(b.path(), path), "{path}");
    }
}

#[test]
fn generation_is_idempotent() {
    let project = fixture();
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    let first = generate_into(a.path(), &project);
    let second = generate_into(b.path(), &project);

    assert_eq!(first.files, second.files);
    for file in &first.files {
        assert_eq!(read(a.path(), &file.path), read(b.path(), &file.path), "{}", file.path);
    }
}

#[test]
fn site_wide_data_reaches_blocks() {
    let tmp = TempDir::new().unwrap();
    generate_into(tmp.path(), &fixture());
    let services = read(tmp.path(), "services/index.html");

    // Header nav and logo come from the project.
    assert!(services.contains("href=\"/contact/\""));
    assert!(services.contains("Tech Solutions Inc"));

    // Flat pricing fields become plans.
    assert!(position(&services, "Audit") < position(&services, "Build"));

    let contact = read(tmp.path(), "contact/index.html");
    assert!(!contact.contains("Spring offer"));
    assert!(contact.contains("<form"));
}

#[test]
fn assets_and_seo_files() {
    let tmp = TempDir::new().unwrap();
    generate_into(tmp.path(), &fixture());

    let css = read(tmp.path(), "assets/site.css");
    assert!(css.contains("--color-primary:#0f766e"));
    assert!(css.contains("--color-accent:#f97316"));

    let html = read(tmp.path(), "index.html");
    assert!(html.contains("<link rel=\"stylesheet\" href=\"/assets/site.css\">"));
    assert!(html.contains("<script src=\"/assets/site.js\" defer></script>"));
    assert!(html.contains("<title>Tech Solutions Inc</title>"));
    assert!(html.contains("https://techsolutions.example/images/og.jpg"));

    let services = read(tmp.path(), "services/index.html");
    assert!(services.contains("<title>Services | Tech Solutions Inc</title>"));
    assert!(services.contains("Custom software, cloud migration and managed IT support."));

    let sitemap = read(tmp.path(), "sitemap.xml");
    for url in [
        "https://techsolutions.example/",
        "https://techsolutions.example/services/",
        "https://techsolutions.example/contact/",
    ] {
        assert!(sitemap.contains(&format!("<loc>{url}</loc>")), "{url}");
    }
    assert!(
        read(tmp.path(), "robots.txt").contains("Sitemap: https://techsolutions.example/sitemap.xml")
    );
}

#[test]
fn result_serializes_camel_case() {
    let tmp = TempDir::new().unwrap();
    let result = generate_into(tmp.path(), &fixture());
    let json: Value = serde_json::to_value(&result).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["metrics"]["pagesGenerated"], 3);
    assert!(json["metrics"]["performanceScore"].is_u64());
    assert!(json["outputPath"].is_string());
    assert_eq!(json["pages"][1]["slug"], "services");
}

#[test]
fn every_block_renders_its_defaults() {
    let registry = BlockRegistry::builtin(Arc::new(NullLogger));
    let ctx = RenderContext::default();
    for key in registry.keys() {
        let renderer = registry.get(key).unwrap();
        let defaults = renderer.default_data();
        let first = renderer.render(&defaults, &ctx);
        assert!(first.is_ok(), "{key}: {:?}", first.errors);
        assert!(!first.html.is_empty(), "{key}");
        assert!(!first.css.is_empty(), "{key}");

        let second = renderer.render(&defaults, &ctx);
        assert_eq!(first.html, second.html, "{key} renders deterministically");
    }
}

#[test]
fn logger_sees_generation() {
    let tmp = TempDir::new().unwrap();
    let logger = Arc::new(RingBufferLogger::new(20, LogLevel::Info));
    Generator::new(config_for(tmp.path()), logger.clone()).generate(&fixture());

    let entries = logger.entries();
    assert!(entries.len() <= 20);
    assert!(entries.iter().all(|e| e.level >= LogLevel::Info));
    assert!(
        entries
            .iter()
            .any(|e| e.message.starts_with("finished in"))
    );
}
