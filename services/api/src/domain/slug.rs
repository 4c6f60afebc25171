//! URL slugs.

use unicode_normalization::UnicodeNormalization;

/// Derive a slug from a display name.
///
/// NFKD-decomposes, drops anything non-ASCII, lower-cases, removes characters other than
/// alphanumerics, `_`, `-` and whitespace, then collapses whitespace and hyphen runs into a
/// single `-`. Returns `None` when nothing usable remains.
pub fn slugify(name: &str) -> Option<String> {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| c.to_ascii_lowercase())
        .filter(|&c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-') || c.is_ascii_whitespace())
        .collect();

    let slug = ascii
        .split(|c: char| c == '-' || c.is_ascii_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let slug = slug.trim_matches(|c: char| c == '-' || c == '_');

    (!slug.is_empty()).then(|| slug.to_owned())
}

/// True if `s` is already a slug: non-empty ASCII letters, digits, `-` and `_`.
pub fn is_slug(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
}
