//! Caching for repeated generation runs.
//!
//! Two independent layers, both switched by `options.cache`:
//!
//! ## Render memo
//!
//! [`RenderMemo`] remembers the [`RenderResult`] of every block render for
//! the lifetime of a [`Generator`](crate::generate::Generator). Rendering is
//! deterministic, so a render is fully identified by
//!
//! - the renderer key (`blockId`),
//! - the site-unique block key (it becomes the DOM id),
//! - the block data, serialized canonically (`serde_json` maps are sorted),
//! - the render context: theme and the lazy-image switch.
//!
//! These are hashed with SHA-256 into the memo key. A studio that
//! regenerates a project after editing one block re-renders only that block.
//! Each run is bracketed by [`RenderMemo::begin_run`] and
//! [`RenderMemo::end_run`]; renders the run did not ask for are dropped, so
//! a long-lived generator holds at most one site's worth of fragments.
//!
//! ## Write manifest
//!
//! [`WriteManifest`] records the SHA-256 of every file written to the output
//! directory in `<output_dir>/.studio-cache.json`. A file whose content hash
//! matches its entry, and which still exists on disk, is not rewritten, so
//! unchanged pages keep their modification time and deploy tools that sync
//! by mtime upload only what changed.
//!
//! A missing, corrupt or outdated manifest simply yields an empty one:
//! every file is written again.

use crate::render::{RenderContext, RenderResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// Name of the write manifest within the output directory.
pub const MANIFEST_FILENAME: &str = ".studio-cache.json";

/// Version of the manifest format. Bump this to invalidate all existing
/// manifests when the format or hashing changes.
const MANIFEST_VERSION: u32 = 1;

// ============================================================================
// Render memo
// ============================================================================

#[derive(Debug)]
struct MemoEntry {
    result: RenderResult,
    /// Asked for since the last `begin_run`.
    used: bool,
}

/// Thread-safe memo of block renders, shared by the render workers.
#[derive(Debug, Default)]
pub struct RenderMemo {
    entries: Mutex<HashMap<String, MemoEntry>>,
    hits: AtomicU32,
    misses: AtomicU32,
}

impl RenderMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memo key of one render.
    pub fn key(
        block_id: &str,
        instance_id: &str,
        data: &serde_json::Value,
        ctx: &RenderContext,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(block_id.as_bytes());
        hasher.update(b"\0");
        hasher.update(instance_id.as_bytes());
        hasher.update(b"\0");
        hasher.update(data.to_string().as_bytes());
        hasher.update(b"\0");
        hasher.update(serde_json::to_string(&ctx.theme).unwrap_or_default().as_bytes());
        hasher.update([u8::from(ctx.lazy_images)]);
        format!("{:x}", hasher.finalize())
    }

    /// Return the memoized result for `key`, or run `render` and remember it.
    ///
    /// The lock is not held while rendering, so two workers racing on the
    /// same key both render; the results are identical.
    pub fn get_or_render(&self, key: &str, render: impl FnOnce() -> RenderResult) -> RenderResult {
        if let Some(hit) = self.lock().get_mut(key) {
            hit.used = true;
            self.hits.fetch_add(1, Ordering::Relaxed);
            return hit.result.clone();
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let result = render();
        self.lock().insert(
            key.to_string(),
            MemoEntry {
                result: result.clone(),
                used: true,
            },
        );
        result
    }

    /// Start a generation run: every entry counts as unused until asked for.
    pub fn begin_run(&self) {
        for entry in self.lock().values_mut() {
            entry.used = false;
        }
    }

    /// Finish a run, dropping entries it never asked for. Returns how many
    /// were dropped.
    pub fn end_run(&self) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.used);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Hits and misses since the memo was created.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, MemoEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Summary of render memo performance.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }

    /// Counts accumulated since `earlier` was taken.
    pub fn since(&self, earlier: CacheStats) -> CacheStats {
        CacheStats {
            hits: self.hits.saturating_sub(earlier.hits),
            misses: self.misses.saturating_sub(earlier.misses),
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} rendered ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} rendered", self.misses)
        }
    }
}

// ============================================================================
// Write manifest
// ============================================================================

/// On-disk record of what was written: output path → content hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WriteManifest {
    pub version: u32,
    pub entries: HashMap<String, String>,
}

impl WriteManifest {
    /// Create an empty manifest (cache disabled, or first run).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the output directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(output_dir: &Path) -> Self {
        let content = match std::fs::read_to_string(manifest_path(output_dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(m) if m.version == MANIFEST_VERSION => m,
            _ => Self::empty(),
        }
    }

    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(manifest_path(output_dir), json)
    }

    /// True when `path` was last written with `content_hash` and the file
    /// is still on disk.
    pub fn is_current(&self, path: &str, content_hash: &str, output_dir: &Path) -> bool {
        self.entries.get(path).is_some_and(|h| h == content_hash)
            && output_dir.join(path).exists()
    }

    pub fn insert(&mut self, path: String, content_hash: String) {
        self.entries.insert(path, content_hash);
    }

    /// Forget entries for files this run did not produce.
    pub fn retain_paths(&mut self, paths: &BTreeSet<String>) {
        self.entries.retain(|path, _| paths.contains(path));
    }
}

/// SHA-256 of `bytes` as a hex string.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Resolve the write manifest path for an output directory.
pub fn manifest_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MANIFEST_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn result(html: &str) -> RenderResult {
        RenderResult {
            html: html.to_string(),
            ..RenderResult::default()
        }
    }

    // =========================================================================
    // RenderMemo
    // =========================================================================

    #[test]
    fn memo_renders_once_per_key() {
        let memo = RenderMemo::new();
        let mut calls = 0;
        let first = memo.get_or_render("k", || {
            calls += 1;
            result("<p>a</p>")
        });
        let second = memo.get_or_render("k", || {
            calls += 1;
            result("<p>b</p>")
        });
        assert_eq!(calls, 1);
        assert_eq!(first.html, second.html);
        assert_eq!(memo.stats(), CacheStats { hits: 1, misses: 1 });
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn memo_key_is_stable() {
        let ctx = RenderContext::default();
        let data = json!({"title": "x", "items": [1, 2]});
        assert_eq!(
            RenderMemo::key("cta", "cta-1", &data, &ctx),
            RenderMemo::key("cta", "cta-1", &data, &ctx)
        );
    }

    #[test]
    fn memo_key_varies_with_inputs() {
        let ctx = RenderContext::default();
        let data = json!({"title": "x"});
        let base = RenderMemo::key("cta", "cta-1", &data, &ctx);
        assert_ne!(base, RenderMemo::key("hero", "cta-1", &data, &ctx));
        assert_ne!(base, RenderMemo::key("cta", "cta-2", &data, &ctx));
        assert_ne!(base, RenderMemo::key("cta", "cta-1", &json!({"title": "y"}), &ctx));

        let mut themed = ctx.clone();
        themed.theme.colors.primary = "#000000".into();
        assert_ne!(base, RenderMemo::key("cta", "cta-1", &data, &themed));

        let eager = RenderContext {
            lazy_images: false,
            ..ctx
        };
        assert_ne!(base, RenderMemo::key("cta", "cta-1", &data, &eager));
    }

    #[test]
    fn memo_key_ignores_key_order() {
        let ctx = RenderContext::default();
        let a: serde_json::Value = serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();
        assert_eq!(
            RenderMemo::key("faq", "f", &a, &ctx),
            RenderMemo::key("faq", "f", &b, &ctx)
        );
    }

    #[test]
    fn memo_clear_forgets_entries() {
        let memo = RenderMemo::new();
        memo.get_or_render("k", || result("x"));
        memo.clear();
        assert!(memo.is_empty());
    }

    #[test]
    fn memo_end_run_drops_untouched_entries() {
        let memo = RenderMemo::new();
        memo.get_or_render("old", || result("old"));
        memo.get_or_render("kept", || result("kept"));

        memo.begin_run();
        memo.get_or_render("kept", || result("kept"));
        memo.get_or_render("new", || result("new"));
        assert_eq!(memo.end_run(), 1);
        assert_eq!(memo.len(), 2);

        let mut rendered = false;
        memo.get_or_render("old", || {
            rendered = true;
            result("old")
        });
        assert!(rendered);
    }

    // =========================================================================
    // CacheStats
    // =========================================================================

    #[test]
    fn cache_stats_display_with_hits() {
        let s = CacheStats { hits: 5, misses: 2 };
        assert_eq!(s.to_string(), "5 cached, 2 rendered (7 total)");
    }

    #[test]
    fn cache_stats_display_no_hits() {
        let s = CacheStats { hits: 0, misses: 3 };
        assert_eq!(s.to_string(), "3 rendered");
    }

    #[test]
    fn cache_stats_since_subtracts() {
        let now = CacheStats { hits: 7, misses: 4 };
        let before = CacheStats { hits: 2, misses: 4 };
        assert_eq!(now.since(before), CacheStats { hits: 5, misses: 0 });
    }

    // =========================================================================
    // WriteManifest
    // =========================================================================

    #[test]
    fn current_requires_matching_hash_and_file() {
        let tmp = TempDir::new().unwrap();
        let mut m = WriteManifest::empty();
        m.insert("index.html".into(), "h1".into());
        assert!(!m.is_current("index.html", "h1", tmp.path()));

        fs::write(tmp.path().join("index.html"), "x").unwrap();
        assert!(m.is_current("index.html", "h1", tmp.path()));
        assert!(!m.is_current("index.html", "h2", tmp.path()));
        assert!(!m.is_current("about/index.html", "h1", tmp.path()));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let mut m = WriteManifest::empty();
        m.insert("index.html".into(), "a".into());
        m.insert("assets/site.css".into(), "b".into());
        m.save(tmp.path()).unwrap();

        assert_eq!(WriteManifest::load(tmp.path()), m);
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(WriteManifest::load(tmp.path()).entries.is_empty());
    }

    #[test]
    fn load_corrupt_json_returns_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(manifest_path(tmp.path()), "not json").unwrap();
        assert!(WriteManifest::load(tmp.path()).entries.is_empty());
    }

    #[test]
    fn load_wrong_version_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let json = format!(
            r#"{{"version": {}, "entries": {{"index.html": "h"}}}}"#,
            MANIFEST_VERSION + 1
        );
        fs::write(manifest_path(tmp.path()), json).unwrap();
        assert!(WriteManifest::load(tmp.path()).entries.is_empty());
    }

    #[test]
    fn retain_paths_drops_stale_entries() {
        let mut m = WriteManifest::empty();
        m.insert("index.html".into(), "a".into());
        m.insert("old/index.html".into(), "b".into());
        let keep: BTreeSet<String> = ["index.html".to_string()].into();
        m.retain_paths(&keep);
        assert_eq!(m.entries.len(), 1);
        assert!(m.entries.contains_key("index.html"));
    }

    #[test]
    fn hash_bytes_is_sha256_hex() {
        let h = hash_bytes(b"hello world");
        assert_eq!(h.len(), 64);
        assert_eq!(h, hash_bytes(b"hello world"));
        assert_ne!(h, hash_bytes(b"hello world!"));
    }
}
