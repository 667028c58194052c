//! Locale registry: code lookup table for all supported locales.
//!
//! The registry merges the canonical code table with the alias table into a
//! single map. It can be constructed directly (useful for tests that need an
//! isolated table) or accessed through the process-wide instance, which is
//! built once with `OnceLock` and never mutated afterwards.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::i18n::locale::{LocaleInfo, ALIASES, LOCALES};
use crate::i18n::Locale;

/// Immutable code → locale lookup.
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    locales: Vec<LocaleInfo>,
    by_code: HashMap<String, Locale>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Build a registry from the built-in locale and alias tables.
    pub fn new() -> Self {
        Self::with_aliases(LOCALES, ALIASES)
    }

    /// Build a registry from explicit tables.
    ///
    /// # Arguments
    /// * `locales` - Canonical locale metadata; each code maps to its locale
    /// * `aliases` - Extra tags folded onto a base locale (e.g., "pt-br" → PT)
    ///
    /// Codes and aliases are stored lowercased. An alias that collides with a
    /// canonical code wins, since it is inserted last.
    pub fn with_aliases(locales: &[LocaleInfo], aliases: &[(&str, Locale)]) -> Self {
        let mut by_code = HashMap::with_capacity(locales.len() + aliases.len());
        for info in locales {
            by_code.insert(info.code.to_lowercase(), info.locale);
        }
        for (alias, locale) in aliases {
            by_code.insert(alias.to_lowercase(), *locale);
        }

        Self {
            locales: locales.to_vec(),
            by_code,
        }
    }

    /// Get the global locale registry instance.
    ///
    /// This method initializes the registry on first call and returns a reference
    /// to the singleton instance on subsequent calls.
    pub fn global() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(LocaleRegistry::new)
    }

    /// Look up a locale by code or alias.
    ///
    /// # Returns
    /// * `Some(Locale)` if the trimmed, lowercased code is registered
    /// * `None` otherwise, including for the empty string
    pub fn parse(&self, code: &str) -> Option<Locale> {
        let code = code.trim().to_lowercase();
        if code.is_empty() {
            return None;
        }
        self.by_code.get(&code).copied()
    }

    /// Lenient lookup: unknown codes map to `Locale::None`.
    pub fn parse_or_none(&self, code: &str) -> Locale {
        self.parse(code).unwrap_or(Locale::None)
    }

    /// Parse a comma-separated list such as `"en,ru,uk"`.
    ///
    /// Unknown tokens are dropped silently. Order of appearance is preserved and
    /// duplicates are kept.
    pub fn parse_list(&self, list: &str) -> Vec<Locale> {
        list.split(',').filter_map(|token| self.parse(token)).collect()
    }

    /// Metadata for a locale, if it is registered here.
    pub fn info(&self, locale: Locale) -> Option<&LocaleInfo> {
        self.locales.iter().find(|info| info.locale == locale)
    }

    /// Registered code, or an empty string for unregistered values.
    pub fn code(&self, locale: Locale) -> &str {
        self.info(locale).map(|info| info.code).unwrap_or("")
    }

    /// Registered display name, or an empty string for unregistered values.
    pub fn name(&self, locale: Locale) -> &str {
        self.info(locale).map(|info| info.name).unwrap_or("")
    }

    pub fn list_all(&self) -> &[LocaleInfo] {
        &self.locales
    }
}

impl Default for LocaleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
