//! Locale support.
//!
//! # Architecture
//!
//! - `locale`: The `Locale` enumeration and its static code/name table
//! - `registry`: Code and alias lookup, built once per process or per test
//!
//! # Example
//!
//! ```rust
//! use entity_i18n::i18n::{Locale, LocaleRegistry};
//!
//! let registry = LocaleRegistry::global();
//! assert_eq!(registry.parse("pt-br"), Some(Locale::Pt));
//! assert_eq!(registry.parse_list("en,ru,xx"), vec![Locale::En, Locale::Ru]);
//! ```

mod locale;
mod registry;

pub use locale::{Locale, LocaleInfo, ParseLocaleError};
pub use registry::LocaleRegistry;
