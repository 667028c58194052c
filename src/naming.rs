//! Canonical storage names for entity types and their fields.
//!
//! The same canonical form is written into the `entity` and `field` columns,
//! so it has to be stable across releases: changing it orphans stored rows.

/// Convert a `CamelCase` identifier into `snake_case`.
///
/// An underscore is inserted before an uppercase letter when the previous
/// character is not uppercase, or when the next character is lowercase.
/// Consecutive capitals therefore stay together as one acronym, except that
/// the last capital splits off when a lowercase word follows it:
///
/// ```
/// use entity_i18n::naming::canonicalize;
///
/// assert_eq!(canonicalize("AIRecommends"), "ai_recommends");
/// assert_eq!(canonicalize("AICRecommends"), "aic_recommends");
/// assert_eq!(canonicalize("SomeField"), "some_field");
/// ```
///
/// Identifiers that are already `snake_case` pass through unchanged.
pub fn canonicalize(identifier: &str) -> String {
    let chars: Vec<char> = identifier.chars().collect();
    let mut result = String::with_capacity(identifier.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev != '_' && (!prev.is_uppercase() || next_is_lower) {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }

    result
}
