//! Store translatable entity fields in a flat per-locale translation table.
//!
//! An entity type registers its translatable fields once (see
//! [`translatable_entity!`]). A [`Translator`] then flattens those fields into
//! [`Translation`] records on save, and merges stored records back on load,
//! against any [`TranslationRepository`].
//!
//! ```
//! use std::sync::Arc;
//! use entity_i18n::entity::TranslateField;
//! use entity_i18n::i18n::Locale;
//! use entity_i18n::repository::InMemoryTranslationRepository;
//! use entity_i18n::{translatable_entity, Translator};
//!
//! #[derive(Default)]
//! struct Product {
//!     id: i64,
//!     title: TranslateField,
//! }
//!
//! translatable_entity!(Product { id: id, fields: [title] });
//!
//! # tokio_test_block(async {
//! let translator = Translator::<Product>::new(Arc::new(InMemoryTranslationRepository::new()));
//!
//! let mut product = Product { id: 7, ..Default::default() };
//! product.title.set(Locale::En, "Kettle");
//! translator.save_translations(&[product]).await?;
//!
//! let loaded = translator
//!     .load_translations(&[Locale::En], vec![Product { id: 7, ..Default::default() }])
//!     .await?;
//! assert_eq!(loaded[0].title.get(Locale::En), Some("Kettle"));
//! # Ok::<(), entity_i18n::TranslationError>(())
//! # }).unwrap();
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod i18n;
pub mod mapping;
pub mod metrics;
pub mod naming;
pub mod repository;
pub mod translator;

pub use entity::{TranslatableEntity, TranslateField, Translation};
pub use error::TranslationError;
pub use i18n::{Locale, LocaleRegistry};
pub use repository::TranslationRepository;
pub use translator::Translator;
