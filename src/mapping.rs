//! Conversion between an entity's translatable fields and flat records.

use crate::entity::{TranslatableEntity, Translation};

/// Flatten an entity's translatable fields into records.
///
/// Emits one record per (locale, value) entry of every registered field,
/// stamped with the entity's canonical name and identity. Empty fields emit
/// nothing.
pub fn extract_translations<T: TranslatableEntity>(entity: &T) -> Vec<Translation> {
    let descriptor = T::descriptor();
    let entity_id = entity.translation_entity_id();

    descriptor
        .fields()
        .iter()
        .flat_map(|binding| {
            binding.get(entity).iter().map(move |(locale, value)| Translation {
                entity: descriptor.name().to_string(),
                entity_id,
                field: binding.name().to_string(),
                locale,
                value: value.to_string(),
            })
        })
        .collect()
}

/// Merge records into an entity in place.
///
/// Records for another entity type or another instance are ignored, so a
/// caller may pass the whole result of a multi-instance fetch. Records naming
/// a field that is not registered on `T` are skipped. For a repeated
/// (field, locale) pair the last record wins.
///
/// # Returns
/// The number of records applied.
pub fn apply_translations<T: TranslatableEntity>(entity: &mut T, translations: &[Translation]) -> usize {
    let descriptor = T::descriptor();
    let entity_id = entity.translation_entity_id();
    let mut applied = 0;

    for translation in translations
        .iter()
        .filter(|t| t.entity == descriptor.name() && t.entity_id == entity_id)
    {
        let Some(binding) = descriptor.field(&translation.field) else {
            continue;
        };
        binding
            .get_mut(entity)
            .set(translation.locale, translation.value.clone());
        applied += 1;
    }

    applied
}
