//! Slug generation for catalog entries.
//!
//! ## Summary
//! Categories and products carry a URL-safe slug derived from their name so
//! the storefront can build readable links. Slugs are lowercase ASCII
//! alphanumerics joined by single hyphens.

/// Longest slug ever produced, in bytes.
pub const MAX_SLUG_LEN: usize = 80;

/// Slug used when a name has no ASCII alphanumerics at all.
pub const FALLBACK_SLUG: &str = "item";

/// Generate a URL-safe slug from a catalog name.
///
/// Converts to lowercase, replaces everything that is not an ASCII
/// alphanumeric with a hyphen, collapses runs of hyphens and trims them from
/// the edges. The result is cut to [`MAX_SLUG_LEN`] on a word boundary when
/// possible.
///
/// Examples:
/// - "Garden Tools" -> "garden-tools"
/// - "Kid's Shoes (EU)" -> "kid-s-shoes-eu"
/// - "!!!" -> "item"
#[must_use]
pub fn generate_slug(name: &str) -> String {
    let joined = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let slug = truncate_on_hyphen(&joined);

    if slug.is_empty() {
        return FALLBACK_SLUG.to_string();
    }

    // A slug that parses as a UUID would be ambiguous next to id-based routes
    if uuid::Uuid::parse_str(slug).is_ok() {
        format!("{FALLBACK_SLUG}-{slug}")
    } else {
        slug.to_string()
    }
}

fn truncate_on_hyphen(slug: &str) -> &str {
    if slug.len() <= MAX_SLUG_LEN {
        return slug;
    }

    // Slug is pure ASCII here, so byte indices are char boundaries
    let head = &slug[..MAX_SLUG_LEN];
    match head.rfind('-') {
        Some(cut) if cut > 0 => &head[..cut],
        _ => head,
    }
}
