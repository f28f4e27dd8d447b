//! Branch slug rules.
//!
//! Valid slugs:
//! - Must be non-empty and at most 64 characters
//! - Contain only lowercase ASCII letters, digits and `-`
//! - Must not start or end with `-`
//! - Must not contain consecutive dashes (`--`)

use crate::error::TypeError;

const MAX_SLUG_LEN: usize = 64;

/// Validate a branch slug, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use glossa_types::slug::validate_slug;
///
/// assert!(validate_slug("main").is_ok());
/// assert!(validate_slug("release-2024").is_ok());
/// assert!(validate_slug("").is_err());
/// assert!(validate_slug("Bad Slug").is_err());
/// ```
pub fn validate_slug(slug: &str) -> Result<(), TypeError> {
    let reject = |reason: &str| {
        Err(TypeError::InvalidSlug {
            slug: slug.to_string(),
            reason: reason.to_string(),
        })
    };

    if slug.is_empty() {
        return reject("slug must not be empty");
    }
    if slug.len() > MAX_SLUG_LEN {
        return reject("slug is longer than 64 characters");
    }
    if let Some(ch) = slug
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return reject(&format!("contains forbidden character: {ch:?}"));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return reject("must not start or end with '-'");
    }
    if slug.contains("--") {
        return reject("must not contain consecutive dashes");
    }
    Ok(())
}

/// Derive a slug from a display name.
///
/// ASCII letters and digits are kept (lowercased); every other run of
/// characters collapses into a single `-`. The result may still be invalid
/// (for example when the name has no ASCII alphanumerics), so callers validate
/// it with [`validate_slug`].
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug.truncate(MAX_SLUG_LEN);
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
