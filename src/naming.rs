//! Centralized naming rules for pages, blocks, and output paths.
//!
//! Page names and block instance ids come from editors and the wizard, so
//! they can be anything: `"About Us"`, `"Services & Pricing"`, `"hero_1"`.
//! This module turns them into the stable forms the generator needs:
//!
//! - `"About Us"` → slug `about-us` → output `about-us/index.html`
//! - `"Services & Pricing"` → slug `services-pricing`
//! - block instance `"Hero 1"` → DOM id `blk-hero-1`
//!
//! The first page of a project is always the home page and lands at
//! `index.html` regardless of its slug.

use std::collections::BTreeSet;

/// Lowercase, ASCII-alphanumeric words joined by single dashes.
///
/// Returns an empty string when nothing usable remains (e.g. `"!!!"`).
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Slug for a page: explicit slug first, then the page name, then `page-N`.
pub fn page_slug(explicit: &str, name: &str, index: usize) -> String {
    let from_explicit = slugify(explicit);
    if !from_explicit.is_empty() {
        return from_explicit;
    }
    let from_name = slugify(name);
    if !from_name.is_empty() {
        return from_name;
    }
    format!("page-{}", index + 1)
}

/// Output path of a page relative to the output root.
pub fn page_output_path(slug: &str, is_home: bool) -> String {
    if is_home {
        "index.html".to_string()
    } else {
        format!("{slug}/index.html")
    }
}

/// Link to a page from anywhere in the site.
pub fn page_href(slug: &str, is_home: bool) -> String {
    if is_home {
        "/".to_string()
    } else {
        format!("/{slug}/")
    }
}

/// DOM id for a block instance. Stable for a given instance id.
pub fn block_dom_id(instance_id: &str, block_type: &str) -> String {
    let slug = slugify(instance_id);
    if slug.is_empty() {
        format!("blk-{block_type}")
    } else {
        format!("blk-{slug}")
    }
}

/// Claim a site-unique block key for an instance.
///
/// The key is the slugged instance id, or the block type when the id is
/// blank; repeats get `-2`, `-3`, … Passing the key to [`block_dom_id`]
/// yields an id no other block on the site has, so per-block CSS rules in
/// the shared stylesheet never target two blocks.
pub fn claim_block_key(
    instance_id: &str,
    block_type: &str,
    taken: &mut BTreeSet<String>,
) -> String {
    let slug = slugify(instance_id);
    let base = if slug.is_empty() { slugify(block_type) } else { slug };
    let mut key = base.clone();
    let mut n = 2;
    while taken.contains(&key) {
        key = format!("{base}-{n}");
        n += 1;
    }
    taken.insert(key.clone());
    key
}
