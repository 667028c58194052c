//! Storage contract for translation records.
//!
//! A backend implements batched fetch, insert and delete. Create-or-update is
//! provided on top of those as a delete-then-insert reconciliation; backends
//! that can make the pair atomic (see `postgres`) override it.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::debug;

use crate::entity::Translation;
use crate::i18n::Locale;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryTranslationRepository;
pub use postgres::{PgRepositoryOptions, PgTranslationRepository};

/// Ids per fetch round-trip.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Backend(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait TranslationRepository: Send + Sync {
    /// All records of `entity` whose id is in `entity_ids` and locale in `locales`.
    ///
    /// Implementations chunk `entity_ids` to respect query-size limits. Result
    /// order is not guaranteed.
    async fn get_translations(
        &self,
        locales: &[Locale],
        entity: &str,
        entity_ids: &[i64],
    ) -> RepositoryResult<Vec<Translation>>;

    /// Unconditional batch insert. No uniqueness check is performed.
    async fn mass_create(&self, translations: &[Translation]) -> RepositoryResult<()>;

    /// Delete records of `entity`, narrowed by each non-empty axis.
    ///
    /// An empty slice leaves that axis unconstrained, so passing only `entity`
    /// wipes every translation stored for it.
    async fn mass_delete(
        &self,
        entity: &str,
        entity_ids: &[i64],
        fields: &[String],
        locales: &[Locale],
    ) -> RepositoryResult<()>;

    /// Replace records with delete-then-insert.
    ///
    /// For every entity in the batch one `mass_delete` runs with the union of
    /// the ids, fields and locales it touches, then the whole batch is
    /// inserted.
    async fn mass_create_or_update(&self, translations: &[Translation]) -> RepositoryResult<()> {
        if translations.is_empty() {
            return Ok(());
        }

        for (entity, scope) in ReconcilePlan::from_translations(translations).iter() {
            self.mass_delete(entity, &scope.entity_ids, &scope.fields, &scope.locales)
                .await?;
        }
        self.mass_create(translations).await
    }
}

/// Union of the keys one entity's records touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteScope {
    pub entity_ids: Vec<i64>,
    pub fields: Vec<String>,
    pub locales: Vec<Locale>,
}

/// Per-entity delete scopes for a create-or-update batch.
///
/// Entities, and the values inside each scope, come out sorted so the
/// statements a backend issues are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    scopes: BTreeMap<String, DeleteScope>,
}

impl ReconcilePlan {
    pub fn from_translations(translations: &[Translation]) -> Self {
        #[derive(Default)]
        struct Touched {
            ids: BTreeSet<i64>,
            fields: BTreeSet<String>,
            locales: BTreeSet<Locale>,
        }

        let mut touched: BTreeMap<&str, Touched> = BTreeMap::new();
        for t in translations {
            let entry = touched.entry(t.entity.as_str()).or_default();
            entry.ids.insert(t.entity_id);
            entry.fields.insert(t.field.clone());
            entry.locales.insert(t.locale);
        }

        let scopes = touched
            .into_iter()
            .map(|(entity, t)| {
                (
                    entity.to_string(),
                    DeleteScope {
                        entity_ids: t.ids.into_iter().collect(),
                        fields: t.fields.into_iter().collect(),
                        locales: t.locales.into_iter().collect(),
                    },
                )
            })
            .collect();

        let plan = Self { scopes };
        debug!(
            "Reconcile plan: {} record(s) across {} entity type(s)",
            translations.len(),
            plan.scopes.len()
        );
        plan
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DeleteScope)> + '_ {
        self.scopes.iter().map(|(entity, scope)| (entity.as_str(), scope))
    }

    pub fn scope(&self, entity: &str) -> Option<&DeleteScope> {
        self.scopes.get(entity)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

/// Split ids into round-trip sized batches. A zero size is treated as one.
pub fn chunk_ids(entity_ids: &[i64], batch_size: usize) -> impl Iterator<Item = &[i64]> {
    entity_ids.chunks(batch_size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== chunk_ids Tests ====================

    #[test]
    fn test_chunk_ids_default_batch() {
        let ids: Vec<i64> = (0..2500).collect();
        let sizes: Vec<usize> = chunk_ids(&ids, DEFAULT_BATCH_SIZE).map(<[i64]>::len).collect();
        assert_eq!(sizes, vec![1000, 1000, 500]);
    }

    #[test]
    fn test_chunk_ids_empty() {
        assert_eq!(chunk_ids(&[], DEFAULT_BATCH_SIZE).count(), 0);
    }

    #[test]
    fn test_chunk_ids_zero_batch_size() {
        assert_eq!(chunk_ids(&[1, 2, 3], 0).count(), 3);
    }

    // ==================== ReconcilePlan Tests ====================

    #[test]
    fn test_plan_unions_per_entity() {
        let translations = vec![
            Translation::new("parameter", 2, "name", Locale::Ru, "b"),
            Translation::new("parameter", 1, "name", Locale::En, "a"),
            Translation::new("parameter", 1, "description", Locale::En, "c"),
            Translation::new("category", 9, "title", Locale::De, "d"),
        ];

        let plan = ReconcilePlan::from_translations(&translations);

        assert_eq!(plan.len(), 2);
        assert_eq!(
            plan.scope("parameter"),
            Some(&DeleteScope {
                entity_ids: vec![1, 2],
                fields: vec!["description".to_string(), "name".to_string()],
                locales: vec![Locale::En, Locale::Ru],
            })
        );
        assert_eq!(
            plan.scope("category"),
            Some(&DeleteScope {
                entity_ids: vec![9],
                fields: vec!["title".to_string()],
                locales: vec![Locale::De],
            })
        );
    }

    #[test]
    fn test_plan_is_sorted_by_entity() {
        let translations = vec![
            Translation::new("zeta", 1, "f", Locale::En, "v"),
            Translation::new("alpha", 1, "f", Locale::En, "v"),
        ];
        let plan = ReconcilePlan::from_translations(&translations);
        let entities: Vec<&str> = plan.iter().map(|(entity, _)| entity).collect();
        assert_eq!(entities, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_plan_empty() {
        assert!(ReconcilePlan::from_translations(&[]).is_empty());
    }

    // ==================== Error Display Tests ====================

    #[test]
    fn test_backend_error_display() {
        let err = RepositoryError::Backend("connection reset".to_string());
        assert_eq!(err.to_string(), "connection reset");
    }
}
