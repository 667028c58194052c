//! Batched load/save/delete of entity translations.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::entity::{TranslatableEntity, Translation};
use crate::error::{Result, TranslationError};
use crate::i18n::Locale;
use crate::mapping::{apply_translations, extract_translations};
use crate::metrics::TranslatorMetrics;
use crate::repository::TranslationRepository;

const OP_LOAD: &str = "translator.load_translations";
const OP_SAVE: &str = "translator.save_translations";
const OP_DELETE: &str = "translator.delete_translations";

/// Translation facade for one entity type.
///
/// Holds no state besides the repository handle and its counters, so clones
/// are cheap and calls are independent. Dropping a returned future cancels
/// the backend call in flight; no timeout or retry is applied here.
pub struct Translator<T> {
    repository: Arc<dyn TranslationRepository>,
    metrics: Arc<TranslatorMetrics>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: TranslatableEntity> Translator<T> {
    pub fn new(repository: Arc<dyn TranslationRepository>) -> Self {
        Self {
            repository,
            metrics: Arc::new(TranslatorMetrics::new()),
            _entity: PhantomData,
        }
    }

    /// Canonical entity name records of `T` are stored under.
    pub fn entity_name(&self) -> &'static str {
        T::descriptor().name()
    }

    pub fn metrics(&self) -> &TranslatorMetrics {
        &self.metrics
    }

    /// Hydrate entities with stored translations for `locales`.
    ///
    /// Returns the same entities with their translatable fields populated.
    /// Empty input returns an empty vector without touching the repository.
    pub async fn load_translations(&self, locales: &[Locale], mut entities: Vec<T>) -> Result<Vec<T>> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }
        self.load_into(locales, &mut entities).await?;
        Ok(entities)
    }

    /// Hydrate entities in place.
    pub async fn load_into(&self, locales: &[Locale], entities: &mut [T]) -> Result<()> {
        if entities.is_empty() {
            return Ok(());
        }

        let entity = self.entity_name();
        let mut entity_ids: Vec<i64> = entities.iter().map(T::translation_entity_id).collect();
        entity_ids.sort_unstable();
        entity_ids.dedup();

        let translations = self
            .repository
            .get_translations(locales, entity, &entity_ids)
            .await
            .map_err(|e| self.fail(OP_LOAD, e))?;

        let applied: usize = entities
            .iter_mut()
            .map(|e| apply_translations(e, &translations))
            .sum();

        debug!(
            "Loaded {} record(s) for {} '{}' entit(ies), applied {}",
            translations.len(),
            entities.len(),
            entity,
            applied
        );
        self.metrics.record_load(translations.len());
        Ok(())
    }

    /// Persist every translatable field of `entities`.
    ///
    /// All records go to the repository in one create-or-update call. Entities
    /// with no populated fields produce no repository call at all.
    pub async fn save_translations(&self, entities: &[T]) -> Result<()> {
        let translations: Vec<Translation> = entities.iter().flat_map(extract_translations).collect();

        if translations.is_empty() {
            self.metrics.record_save(0);
            return Ok(());
        }

        self.repository
            .mass_create_or_update(&translations)
            .await
            .map_err(|e| self.fail(OP_SAVE, e))?;

        debug!(
            "Saved {} record(s) for {} '{}' entit(ies)",
            translations.len(),
            entities.len(),
            self.entity_name()
        );
        self.metrics.record_save(translations.len());
        Ok(())
    }

    /// Delete stored translations, passing the filter through unchanged.
    ///
    /// An empty slice on any axis means "no filter on that axis", so an empty
    /// `entity_ids`, `fields` and `locales` together remove every translation
    /// of `entity`.
    pub async fn delete_translations(
        &self,
        entity: &str,
        entity_ids: &[i64],
        fields: &[String],
        locales: &[Locale],
    ) -> Result<()> {
        self.repository
            .mass_delete(entity, entity_ids, fields, locales)
            .await
            .map_err(|e| self.fail(OP_DELETE, e))?;

        self.metrics.record_delete();
        Ok(())
    }

    /// Delete every translation of the given `T` instances.
    ///
    /// Does nothing for an empty id list rather than wiping the whole type.
    pub async fn delete_entity_translations(&self, entity_ids: &[i64]) -> Result<()> {
        if entity_ids.is_empty() {
            return Ok(());
        }
        self.delete_translations(self.entity_name(), entity_ids, &[], &[])
            .await
    }

    fn fail(&self, op: &'static str, source: crate::repository::RepositoryError) -> TranslationError {
        warn!("{} failed: {}", op, source);
        self.metrics.record_failure();
        TranslationError::repository(op)(source)
    }
}

impl<T> Clone for Translator<T> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            metrics: Arc::clone(&self.metrics),
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Translator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("entity", &std::any::type_name::<T>())
            .field("metrics", &self.metrics)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::TranslateField;
    use crate::repository::InMemoryTranslationRepository;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Parameter {
        id: i64,
        name: TranslateField,
        description: TranslateField,
    }

    crate::translatable_entity!(Parameter { id: id, fields: [name, description] });

    fn setup() -> (Arc<InMemoryTranslationRepository>, Translator<Parameter>) {
        let repo = Arc::new(InMemoryTranslationRepository::new());
        let translator = Translator::<Parameter>::new(repo.clone());
        (repo, translator)
    }

    fn translated(id: i64) -> Parameter {
        Parameter {
            id,
            name: TranslateField::from([(Locale::En, "New Name EN"), (Locale::Ru, "Новое имя RU")]),
            description: TranslateField::from([(Locale::En, "Desc EN"), (Locale::Ru, "Описание RU")]),
        }
    }

    // ==================== load_translations Tests ====================

    #[tokio::test]
    async fn test_load_empty_input_skips_repository() {
        let (repo, translator) = setup();
        let loaded = translator
            .load_translations(&[Locale::En], Vec::new())
            .await
            .expect("Should succeed");

        assert!(loaded.is_empty());
        assert_eq!(repo.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_load_hydrates_entities() {
        let (repo, translator) = setup();
        repo.mass_create(&[
            Translation::new("parameter", 1, "name", Locale::En, "Example Name EN"),
            Translation::new("parameter", 1, "name", Locale::Ru, "Пример имени RU"),
            Translation::new("parameter", 2, "name", Locale::En, "Second"),
        ])
        .await
        .expect("Should seed");

        let loaded = translator
            .load_translations(
                &[Locale::En, Locale::Ru],
                vec![Parameter { id: 1, ..Default::default() }, Parameter { id: 2, ..Default::default() }],
            )
            .await
            .expect("Should load");

        assert_eq!(loaded[0].name.get(Locale::En), Some("Example Name EN"));
        assert_eq!(loaded[0].name.get(Locale::Ru), Some("Пример имени RU"));
        assert_eq!(loaded[1].name.get(Locale::En), Some("Second"));
        assert_eq!(loaded[1].name.get(Locale::Ru), None);
        assert_eq!(repo.fetch_calls(), 1);
        assert_eq!(translator.metrics().records_fetched(), 3);
    }

    #[tokio::test]
    async fn test_load_only_requested_locales() {
        let (repo, translator) = setup();
        translator
            .save_translations(&[translated(1)])
            .await
            .expect("Should save");

        let loaded = translator
            .load_translations(&[Locale::Ru], vec![Parameter { id: 1, ..Default::default() }])
            .await
            .expect("Should load");

        assert_eq!(loaded[0].name.locales().collect::<Vec<_>>(), vec![Locale::Ru]);
        assert_eq!(repo.len().await, 4);
    }

    #[tokio::test]
    async fn test_load_into_slice() {
        let (_repo, translator) = setup();
        translator
            .save_translations(&[translated(5)])
            .await
            .expect("Should save");

        let mut entities = [Parameter { id: 5, ..Default::default() }];
        translator
            .load_into(&[Locale::En], &mut entities)
            .await
            .expect("Should load");
        assert_eq!(entities[0].description.get(Locale::En), Some("Desc EN"));
    }

    // ==================== save_translations Tests ====================

    #[tokio::test]
    async fn test_save_writes_all_records() {
        let (repo, translator) = setup();
        translator
            .save_translations(&[translated(1)])
            .await
            .expect("Should save");

        let saved = repo.translations().await;
        assert_eq!(saved.len(), 4);
        assert!(saved.contains(&Translation::new("parameter", 1, "name", Locale::En, "New Name EN")));
        assert!(saved.contains(&Translation::new("parameter", 1, "name", Locale::Ru, "Новое имя RU")));
        assert!(saved.contains(&Translation::new("parameter", 1, "description", Locale::En, "Desc EN")));
        assert!(saved.contains(&Translation::new("parameter", 1, "description", Locale::Ru, "Описание RU")));
        assert_eq!(repo.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_save_untranslated_skips_repository() {
        let (repo, translator) = setup();
        translator
            .save_translations(&[Parameter { id: 1, ..Default::default() }])
            .await
            .expect("Should succeed");

        assert_eq!(repo.create_calls(), 0);
        assert_eq!(repo.delete_calls(), 0);
    }

    // ==================== delete_translations Tests ====================

    #[tokio::test]
    async fn test_delete_passes_filter_through() {
        let (repo, translator) = setup();
        translator
            .save_translations(&[translated(1), translated(2)])
            .await
            .expect("Should save");

        translator
            .delete_translations("parameter", &[1], &["name".to_string()], &[Locale::En])
            .await
            .expect("Should delete");

        assert_eq!(repo.len().await, 7);
    }

    #[tokio::test]
    async fn test_delete_entity_translations() {
        let (repo, translator) = setup();
        translator
            .save_translations(&[translated(1), translated(2)])
            .await
            .expect("Should save");

        translator
            .delete_entity_translations(&[2])
            .await
            .expect("Should delete");
        assert!(repo.translations().await.iter().all(|t| t.entity_id == 1));

        translator
            .delete_entity_translations(&[])
            .await
            .expect("Should be a no-op");
        assert_eq!(repo.len().await, 4);
    }

    // ==================== Error Tests ====================

    #[tokio::test]
    async fn test_errors_are_wrapped_with_operation() {
        let (repo, translator) = setup();
        repo.set_failure(Some("connection refused")).await;

        let err = translator
            .load_translations(&[Locale::En], vec![Parameter { id: 1, ..Default::default() }])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "translator.load_translations: connection refused");

        let err = translator
            .save_translations(&[translated(1)])
            .await
            .unwrap_err();
        assert_eq!(err.op(), "translator.save_translations");

        let err = translator
            .delete_translations("parameter", &[1], &[], &[])
            .await
            .unwrap_err();
        assert_eq!(err.op(), "translator.delete_translations");

        assert_eq!(translator.metrics().failures(), 3);
    }

    #[test]
    fn test_entity_name_and_clone() {
        let (_repo, translator) = setup();
        let cloned = translator.clone();
        assert_eq!(cloned.entity_name(), "parameter");
        assert!(format!("{:?}", cloned).contains("Translator"));
    }
}
