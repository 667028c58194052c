//! In-process translation table.
//!
//! Behaves like the relational backend: rows get a surrogate id, inserts do
//! not check uniqueness, and deletes follow the same empty-axis rules. Call
//! counters make it easy to assert how many round-trips an operation made.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::entity::Translation;
use crate::i18n::Locale;
use crate::repository::{
    chunk_ids, RepositoryError, RepositoryResult, TranslationRepository, DEFAULT_BATCH_SIZE,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTranslation {
    pub id: i64,
    pub translation: Translation,
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<StoredTranslation>,
    next_id: i64,
}

#[derive(Debug)]
pub struct InMemoryTranslationRepository {
    table: RwLock<Table>,
    batch_size: usize,
    failure: RwLock<Option<String>>,
    fetch_calls: AtomicUsize,
    create_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl InMemoryTranslationRepository {
    pub fn new() -> Self {
        Self::with_batch_size(DEFAULT_BATCH_SIZE)
    }

    /// Create a repository that fetches at most `batch_size` ids per round-trip.
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            table: RwLock::new(Table {
                rows: Vec::new(),
                next_id: 1,
            }),
            batch_size: batch_size.max(1),
            failure: RwLock::new(None),
            fetch_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    /// Make every following operation fail with `message`, or clear it with `None`.
    pub async fn set_failure(&self, message: Option<&str>) {
        *self.failure.write().await = message.map(str::to_string);
    }

    /// Snapshot of every stored row, in insertion order.
    pub async fn rows(&self) -> Vec<StoredTranslation> {
        self.table.read().await.rows.clone()
    }

    /// Snapshot of every stored record, in insertion order.
    pub async fn translations(&self) -> Vec<Translation> {
        self.table
            .read()
            .await
            .rows
            .iter()
            .map(|row| row.translation.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Fetch round-trips so far (one per id batch).
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::Relaxed)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::Relaxed)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::Relaxed)
    }

    async fn check_failure(&self) -> RepositoryResult<()> {
        match self.failure.read().await.as_ref() {
            Some(message) => Err(RepositoryError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryTranslationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranslationRepository for InMemoryTranslationRepository {
    async fn get_translations(
        &self,
        locales: &[Locale],
        entity: &str,
        entity_ids: &[i64],
    ) -> RepositoryResult<Vec<Translation>> {
        self.check_failure().await?;
        if locales.is_empty() {
            return Ok(Vec::new());
        }

        let table = self.table.read().await;
        let mut results = Vec::new();
        for batch in chunk_ids(entity_ids, self.batch_size) {
            self.fetch_calls.fetch_add(1, Ordering::Relaxed);
            results.extend(
                table
                    .rows
                    .iter()
                    .map(|row| &row.translation)
                    .filter(|t| {
                        t.entity == entity
                            && locales.contains(&t.locale)
                            && batch.contains(&t.entity_id)
                    })
                    .cloned(),
            );
        }

        Ok(results)
    }

    async fn mass_create(&self, translations: &[Translation]) -> RepositoryResult<()> {
        self.check_failure().await?;
        if translations.is_empty() {
            return Ok(());
        }
        self.create_calls.fetch_add(1, Ordering::Relaxed);

        let mut table = self.table.write().await;
        for translation in translations {
            let id = table.next_id;
            table.next_id += 1;
            table.rows.push(StoredTranslation {
                id,
                translation: translation.clone(),
            });
        }
        Ok(())
    }

    async fn mass_delete(
        &self,
        entity: &str,
        entity_ids: &[i64],
        fields: &[String],
        locales: &[Locale],
    ) -> RepositoryResult<()> {
        self.check_failure().await?;
        self.delete_calls.fetch_add(1, Ordering::Relaxed);

        let mut table = self.table.write().await;
        table.rows.retain(|row| {
            let t = &row.translation;
            let matches = t.entity == entity
                && (entity_ids.is_empty() || entity_ids.contains(&t.entity_id))
                && (fields.is_empty() || fields.contains(&t.field))
                && (locales.is_empty() || locales.contains(&t.locale));
            !matches
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, field: &str, locale: Locale, value: &str) -> Translation {
        Translation::new("parameter", id, field, locale, value)
    }

    async fn seeded() -> InMemoryTranslationRepository {
        let repo = InMemoryTranslationRepository::new();
        repo.mass_create(&[
            record(1, "name", Locale::En, "Name EN"),
            record(1, "name", Locale::Ru, "Имя RU"),
            record(1, "description", Locale::En, "Desc EN"),
            record(1, "description", Locale::Ru, "Описание RU"),
            record(2, "name", Locale::En, "Other"),
            Translation::new("category", 1, "name", Locale::En, "Category"),
        ])
        .await
        .expect("Should insert");
        repo
    }

    // ==================== get_translations Tests ====================

    #[tokio::test]
    async fn test_get_filters_entity_ids_and_locales() {
        let repo = seeded().await;

        let mut found = repo
            .get_translations(&[Locale::Ru], "parameter", &[1])
            .await
            .expect("Should fetch");
        found.sort_by(|a, b| a.field.cmp(&b.field));

        assert_eq!(
            found,
            vec![
                record(1, "description", Locale::Ru, "Описание RU"),
                record(1, "name", Locale::Ru, "Имя RU"),
            ]
        );
    }

    #[tokio::test]
    async fn test_get_chunks_ids() {
        let repo = InMemoryTranslationRepository::with_batch_size(2);
        repo.mass_create(&[record(5, "name", Locale::En, "five")])
            .await
            .expect("Should insert");

        let found = repo
            .get_translations(&[Locale::En], "parameter", &[1, 2, 3, 4, 5])
            .await
            .expect("Should fetch");

        assert_eq!(found.len(), 1);
        assert_eq!(repo.fetch_calls(), 3);
    }

    #[tokio::test]
    async fn test_get_with_empty_sets_returns_nothing() {
        let repo = seeded().await;
        let none = repo
            .get_translations(&[], "parameter", &[1])
            .await
            .expect("Should fetch");
        assert!(none.is_empty());

        let none = repo
            .get_translations(&[Locale::En], "parameter", &[])
            .await
            .expect("Should fetch");
        assert!(none.is_empty());
        assert_eq!(repo.fetch_calls(), 0);
    }

    // ==================== mass_create Tests ====================

    #[tokio::test]
    async fn test_create_assigns_surrogate_ids_without_uniqueness() {
        let repo = InMemoryTranslationRepository::new();
        let r = record(1, "name", Locale::En, "dup");
        repo.mass_create(&[r.clone(), r.clone()])
            .await
            .expect("Should insert");

        let rows = repo.rows().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[1].id, 2);
    }

    #[tokio::test]
    async fn test_create_empty_is_noop() {
        let repo = InMemoryTranslationRepository::new();
        repo.mass_create(&[]).await.expect("Should succeed");
        assert_eq!(repo.create_calls(), 0);
    }

    // ==================== mass_delete Tests ====================

    #[tokio::test]
    async fn test_delete_all_axes() {
        let repo = seeded().await;
        repo.mass_delete(
            "parameter",
            &[1],
            &["name".to_string(), "description".to_string()],
            &[Locale::En, Locale::Ru],
        )
        .await
        .expect("Should delete");

        let left = repo.translations().await;
        assert_eq!(left.len(), 2);
        assert!(left.iter().all(|t| t.entity_id != 1 || t.entity != "parameter"));
    }

    #[tokio::test]
    async fn test_delete_empty_axis_is_unconstrained() {
        let repo = seeded().await;
        repo.mass_delete("parameter", &[1], &[], &[Locale::Ru])
            .await
            .expect("Should delete");
        assert_eq!(repo.len().await, 4);

        repo.mass_delete("parameter", &[], &[], &[])
            .await
            .expect("Should delete");
        let left = repo.translations().await;
        assert_eq!(left, vec![Translation::new("category", 1, "name", Locale::En, "Category")]);
    }

    // ==================== mass_create_or_update Tests ====================

    #[tokio::test]
    async fn test_create_or_update_replaces() {
        let repo = seeded().await;
        repo.mass_create_or_update(&[record(1, "name", Locale::En, "Renamed")])
            .await
            .expect("Should reconcile");

        let names: Vec<_> = repo
            .translations()
            .await
            .into_iter()
            .filter(|t| t.entity == "parameter" && t.entity_id == 1 && t.field == "name")
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&record(1, "name", Locale::En, "Renamed")));
        assert!(names.contains(&record(1, "name", Locale::Ru, "Имя RU")));
    }

    #[tokio::test]
    async fn test_create_or_update_is_idempotent() {
        let repo = InMemoryTranslationRepository::new();
        let batch = vec![
            record(1, "name", Locale::En, "a"),
            record(1, "name", Locale::Ru, "b"),
        ];
        repo.mass_create_or_update(&batch).await.expect("first");
        repo.mass_create_or_update(&batch).await.expect("second");
        assert_eq!(repo.translations().await, batch);
    }

    #[tokio::test]
    async fn test_create_or_update_deletes_by_union() {
        let repo = InMemoryTranslationRepository::new();
        repo.mass_create(&[record(1, "description", Locale::En, "kept?")])
            .await
            .expect("Should insert");

        // Touches id 1, fields {name, description}, locales {en, ru}: the
        // stored (description, en) row falls inside that union.
        repo.mass_create_or_update(&[
            record(1, "name", Locale::En, "n"),
            record(1, "description", Locale::Ru, "d"),
        ])
        .await
        .expect("Should reconcile");

        let left = repo.translations().await;
        assert_eq!(left.len(), 2);
        assert!(!left.iter().any(|t| t.value == "kept?"));
    }

    // ==================== Failure Tests ====================

    #[tokio::test]
    async fn test_failure_is_surfaced() {
        let repo = InMemoryTranslationRepository::new();
        repo.set_failure(Some("disk full")).await;

        let err = repo
            .mass_create(&[record(1, "name", Locale::En, "x")])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "disk full");

        repo.set_failure(None).await;
        assert!(repo.mass_delete("parameter", &[], &[], &[]).await.is_ok());
    }
}
