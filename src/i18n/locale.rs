//! Locale type: small, closed enumeration of supported languages.
//!
//! Locales are compared and stored in memory as integers. The lowercase
//! ISO 639-1 code is only needed at the storage boundary, so `code()` and
//! `name()` resolve through a static table instead of the registry.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::i18n::LocaleRegistry;

/// A supported language.
///
/// `Locale::None` is the "unset" sentinel: it has no code and no name, and is
/// what unknown codes map to when a lenient parse is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(i16)]
pub enum Locale {
    #[default]
    None = 0,
    Sq,
    Ar,
    Az,
    Bs,
    Bg,
    Zh,
    Hr,
    Cs,
    Da,
    Nl,
    En,
    Et,
    Fi,
    Fr,
    Ka,
    De,
    El,
    He,
    Hu,
    Id,
    Ja,
    Kk,
    Ko,
    Lv,
    Lt,
    Mk,
    No,
    Pl,
    Pt,
    Ro,
    Ru,
    Sr,
    Sk,
    Sl,
    Es,
    Sv,
    Th,
    Tr,
    Uk,
    Vi,
    It,
}

/// Static metadata for a registered locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocaleInfo {
    pub locale: Locale,
    /// ISO 639-1 code (e.g., "en", "ru")
    pub code: &'static str,
    /// English display name (e.g., "English", "Russian")
    pub name: &'static str,
}

const fn info(locale: Locale, code: &'static str, name: &'static str) -> LocaleInfo {
    LocaleInfo { locale, code, name }
}

/// Every registered locale, in enum order. `Locale::None` is deliberately absent.
pub(crate) const LOCALES: &[LocaleInfo] = &[
    info(Locale::Sq, "sq", "Albanian"),
    info(Locale::Ar, "ar", "Arabic"),
    info(Locale::Az, "az", "Azerbaijani"),
    info(Locale::Bs, "bs", "Bosnian"),
    info(Locale::Bg, "bg", "Bulgarian"),
    info(Locale::Zh, "zh", "Chinese"),
    info(Locale::Hr, "hr", "Croatian"),
    info(Locale::Cs, "cs", "Czech"),
    info(Locale::Da, "da", "Danish"),
    info(Locale::Nl, "nl", "Dutch"),
    info(Locale::En, "en", "English"),
    info(Locale::Et, "et", "Estonian"),
    info(Locale::Fi, "fi", "Finnish"),
    info(Locale::Fr, "fr", "French"),
    info(Locale::Ka, "ka", "Georgian"),
    info(Locale::De, "de", "German"),
    info(Locale::El, "el", "Greek"),
    info(Locale::He, "he", "Hebrew"),
    info(Locale::Hu, "hu", "Hungarian"),
    info(Locale::Id, "id", "Indonesian"),
    info(Locale::Ja, "ja", "Japanese"),
    info(Locale::Kk, "kk", "Kazakh"),
    info(Locale::Ko, "ko", "Korean"),
    info(Locale::Lv, "lv", "Latvian"),
    info(Locale::Lt, "lt", "Lithuanian"),
    info(Locale::Mk, "mk", "Macedonian"),
    info(Locale::No, "no", "Norwegian"),
    info(Locale::Pl, "pl", "Polish"),
    info(Locale::Pt, "pt", "Portuguese"),
    info(Locale::Ro, "ro", "Romanian"),
    info(Locale::Ru, "ru", "Russian"),
    info(Locale::Sr, "sr", "Serbian"),
    info(Locale::Sk, "sk", "Slovak"),
    info(Locale::Sl, "sl", "Slovenian"),
    info(Locale::Es, "es", "Spanish"),
    info(Locale::Sv, "sv", "Swedish"),
    info(Locale::Th, "th", "Thai"),
    info(Locale::Tr, "tr", "Turkish"),
    info(Locale::Uk, "uk", "Ukrainian"),
    info(Locale::Vi, "vi", "Vietnamese"),
    info(Locale::It, "it", "Italian"),
];

/// Extended tags accepted on input and folded onto their base language.
pub(crate) const ALIASES: &[(&str, Locale)] = &[
    ("zh-hant", Locale::Zh),
    ("zh-hans", Locale::Zh),
    ("sr-latn", Locale::Sr),
    ("pt-br", Locale::Pt),
];

/// Error returned by `Locale::from_str` for unknown codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown locale code: '{0}'")]
pub struct ParseLocaleError(pub String);

impl Locale {
    /// Parse a code against the global registry.
    ///
    /// Case-insensitive and whitespace-trimmed. Returns `None` for unknown
    /// input, including the empty string.
    pub fn parse(code: &str) -> Option<Locale> {
        LocaleRegistry::global().parse(code)
    }

    /// Static metadata for this locale, or `None` for the sentinel.
    pub fn info(self) -> Option<&'static LocaleInfo> {
        LOCALES.iter().find(|info| info.locale == self)
    }

    /// ISO 639-1 code, or an empty string for `Locale::None`.
    pub fn code(self) -> &'static str {
        self.info().map(|info| info.code).unwrap_or("")
    }

    /// English display name, or an empty string for `Locale::None`.
    pub fn name(self) -> &'static str {
        self.info().map(|info| info.name).unwrap_or("")
    }

    pub fn is_none(self) -> bool {
        self == Locale::None
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = ParseLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::parse(s).ok_or_else(|| ParseLocaleError(s.to_string()))
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Locale::parse(&code).unwrap_or(Locale::None))
    }
}
