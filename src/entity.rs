//! Translatable entities and the translation record they are flattened into.
//!
//! Host types opt in by implementing [`TranslatableEntity`]: an integer identity
//! plus a static [`EntityDescriptor`] listing the fields that hold a
//! [`TranslateField`]. The descriptor is the capability table the mapper walks;
//! the container type is enforced by the accessor signatures, so a field of
//! any other type simply cannot be registered.

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::warn;

use crate::i18n::Locale;
use crate::naming::canonicalize;

/// Locale-keyed text held by an entity field.
///
/// Empty when no translations are present. Entries iterate in locale order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslateField(BTreeMap<Locale, String>);

impl TranslateField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text for a locale, if present.
    pub fn get(&self, locale: Locale) -> Option<&str> {
        self.0.get(&locale).map(String::as_str)
    }

    /// Set the text for a locale, returning the previous value.
    pub fn set(&mut self, locale: Locale, value: impl Into<String>) -> Option<String> {
        self.0.insert(locale, value.into())
    }

    pub fn remove(&mut self, locale: Locale) -> Option<String> {
        self.0.remove(&locale)
    }

    pub fn contains(&self, locale: Locale) -> bool {
        self.0.contains_key(&locale)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn locales(&self) -> impl Iterator<Item = Locale> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Locale, &str)> + '_ {
        self.0.iter().map(|(locale, value)| (*locale, value.as_str()))
    }
}

impl<S: Into<String>> FromIterator<(Locale, S)> for TranslateField {
    fn from_iter<I: IntoIterator<Item = (Locale, S)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(locale, value)| (locale, value.into()))
                .collect(),
        )
    }
}

impl<S: Into<String>, const N: usize> From<[(Locale, S); N]> for TranslateField {
    fn from(entries: [(Locale, S); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl IntoIterator for TranslateField {
    type Item = (Locale, String);
    type IntoIter = btree_map::IntoIter<Locale, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// One stored piece of text: (entity type, entity instance, field, locale).
///
/// At most one live record exists per `(entity, entity_id, field, locale)` key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Translation {
    /// Canonical entity type name (e.g., "parameter")
    pub entity: String,
    pub entity_id: i64,
    /// Canonical field name (e.g., "short_description")
    pub field: String,
    pub locale: Locale,
    pub value: String,
}

impl Translation {
    pub fn new(
        entity: impl Into<String>,
        entity_id: i64,
        field: impl Into<String>,
        locale: Locale,
        value: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            entity_id,
            field: field.into(),
            locale,
            value: value.into(),
        }
    }
}

/// A host type whose fields can be stored as translation records.
///
/// Most implementations are generated with [`translatable_entity!`](crate::translatable_entity).
pub trait TranslatableEntity: Sized + Send + Sync + 'static {
    /// Stable integer identity of this instance.
    fn translation_entity_id(&self) -> i64;

    /// Capability table for this type, built once per type.
    fn descriptor() -> &'static EntityDescriptor<Self>;
}

/// Accessors for one translatable field.
pub struct FieldBinding<T> {
    name: String,
    get: fn(&T) -> &TranslateField,
    get_mut: fn(&mut T) -> &mut TranslateField,
}

impl<T> FieldBinding<T> {
    /// Canonical field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get<'a>(&self, entity: &'a T) -> &'a TranslateField {
        (self.get)(entity)
    }

    pub fn get_mut<'a>(&self, entity: &'a mut T) -> &'a mut TranslateField {
        (self.get_mut)(entity)
    }
}

impl<T> fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("name", &self.name)
            .finish()
    }
}

/// Canonical entity name plus the ordered translatable fields of `T`.
///
/// Holds both lookups the mapper needs: position → name through `fields()`,
/// and name → position through `position()`.
pub struct EntityDescriptor<T> {
    name: String,
    fields: Vec<FieldBinding<T>>,
    positions: HashMap<String, usize>,
}

impl<T> EntityDescriptor<T> {
    /// Start a descriptor for a type identifier such as `"AIRecommends"`.
    pub fn builder(type_identifier: &str) -> EntityDescriptorBuilder<T> {
        EntityDescriptorBuilder {
            descriptor: EntityDescriptor {
                name: canonicalize(type_identifier),
                fields: Vec::new(),
                positions: HashMap::new(),
            },
        }
    }

    /// Canonical entity name written to the `entity` column.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldBinding<T>] {
        &self.fields
    }

    /// Position of a field by canonical name.
    pub fn position(&self, field: &str) -> Option<usize> {
        self.positions.get(field).copied()
    }

    /// Binding for a field by canonical name.
    pub fn field(&self, field: &str) -> Option<&FieldBinding<T>> {
        self.position(field).map(|i| &self.fields[i])
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

impl<T> fmt::Debug for EntityDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("name", &self.name)
            .field("fields", &self.field_names())
            .finish()
    }
}

pub struct EntityDescriptorBuilder<T> {
    descriptor: EntityDescriptor<T>,
}

impl<T> EntityDescriptorBuilder<T> {
    /// Register a translatable field.
    ///
    /// The identifier is canonicalized. A field whose canonical name is already
    /// registered is skipped with a warning, because both would be written
    /// under the same storage key.
    pub fn field(
        mut self,
        identifier: &str,
        get: fn(&T) -> &TranslateField,
        get_mut: fn(&mut T) -> &mut TranslateField,
    ) -> Self {
        let name = canonicalize(identifier);
        if self.descriptor.positions.contains_key(&name) {
            warn!(
                entity = %self.descriptor.name,
                field = %name,
                "Duplicate canonical field name, skipping '{}'",
                identifier
            );
            return self;
        }

        let position = self.descriptor.fields.len();
        self.descriptor.positions.insert(name.clone(), position);
        self.descriptor.fields.push(FieldBinding { name, get, get_mut });
        self
    }

    pub fn build(self) -> EntityDescriptor<T> {
        self.descriptor
    }
}

/// Implement [`TranslatableEntity`] for a struct.
///
/// ```
/// use entity_i18n::entity::{TranslatableEntity, TranslateField};
/// use entity_i18n::translatable_entity;
///
/// #[derive(Default)]
/// struct Parameter {
///     id: i64,
///     name: TranslateField,
///     description: TranslateField,
/// }
///
/// translatable_entity!(Parameter { id: id, fields: [name, description] });
///
/// assert_eq!(Parameter::descriptor().name(), "parameter");
/// assert_eq!(Parameter::descriptor().field_names(), vec!["name", "description"]);
/// ```
#[macro_export]
macro_rules! translatable_entity {
    ($ty:ident { id: $id:ident, fields: [$($field:ident),* $(,)?] $(,)? }) => {
        impl $crate::entity::TranslatableEntity for $ty {
            fn translation_entity_id(&self) -> i64 {
                self.$id as i64
            }

            fn descriptor() -> &'static $crate::entity::EntityDescriptor<Self> {
                static DESCRIPTOR: ::std::sync::OnceLock<$crate::entity::EntityDescriptor<$ty>> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    $crate::entity::EntityDescriptor::<$ty>::builder(stringify!($ty))
                        $(.field(
                            stringify!($field),
                            |e: &$ty| &e.$field,
                            |e: &mut $ty| &mut e.$field,
                        ))*
                        .build()
                })
            }
        }
    };
}
