//! PostgreSQL translation table accessed through `sqlx`.
//!
//! Schema (created by `ensure_schema`):
//!
//! ```sql
//! CREATE TABLE translations (
//!     id BIGSERIAL PRIMARY KEY,
//!     entity TEXT NOT NULL,
//!     entity_id BIGINT NOT NULL,
//!     field TEXT NOT NULL,
//!     locale TEXT NOT NULL,
//!     value TEXT NOT NULL
//! );
//! ```
//!
//! There is no unique constraint on (entity, entity_id, field, locale);
//! `mass_create_or_update` keeps keys unique by deleting before inserting,
//! inside one transaction.

use async_trait::async_trait;
use futures::future::try_join_all;
use regex::Regex;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, QueryBuilder};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::entity::Translation;
use crate::i18n::{Locale, LocaleRegistry};
use crate::repository::{
    chunk_ids, ReconcilePlan, RepositoryError, RepositoryResult, TranslationRepository,
    DEFAULT_BATCH_SIZE,
};

pub const DEFAULT_TABLE: &str = "translations";

/// Postgres caps a statement at 65535 bind parameters; each row binds 5.
const MAX_INSERT_ROWS: usize = 65535 / 5;

/// Check that a table name is a plain SQL identifier (optionally schema-qualified).
pub fn is_valid_table_name(table: &str) -> bool {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT
        .get_or_init(|| {
            Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}(\.[A-Za-z_][A-Za-z0-9_]{0,62})?$")
                .expect("identifier regex is valid")
        })
        .is_match(table)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgRepositoryOptions {
    table: String,
    batch_size: usize,
}

impl PgRepositoryOptions {
    /// # Errors
    /// Returns `RepositoryError::Backend` if `table` is not a plain identifier,
    /// since it is interpolated into every statement.
    pub fn new(table: &str, batch_size: usize) -> RepositoryResult<Self> {
        if !is_valid_table_name(table) {
            return Err(RepositoryError::Backend(format!(
                "invalid translations table name: '{}'",
                table
            )));
        }
        Ok(Self {
            table: table.to_string(),
            batch_size: batch_size.max(1),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl Default for PgRepositoryOptions {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// A row as stored, including the surrogate key.
#[derive(Debug, Clone, FromRow)]
pub struct TranslationRow {
    pub id: i64,
    pub entity: String,
    pub entity_id: i64,
    pub field: String,
    pub locale: String,
    pub value: String,
}

impl TranslationRow {
    /// Convert to a record. Unknown locale codes become `Locale::None` so one
    /// corrupt row does not fail the whole fetch.
    pub fn into_translation(self, registry: &LocaleRegistry) -> Translation {
        let locale = registry.parse(&self.locale).unwrap_or_else(|| {
            warn!(
                row_id = self.id,
                entity = %self.entity,
                "Unknown locale code '{}' in stored translation",
                self.locale
            );
            Locale::None
        });

        Translation {
            entity: self.entity,
            entity_id: self.entity_id,
            field: self.field,
            locale,
            value: self.value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgTranslationRepository {
    pool: PgPool,
    options: PgRepositoryOptions,
}

impl PgTranslationRepository {
    pub fn new(pool: PgPool, options: PgRepositoryOptions) -> Self {
        Self { pool, options }
    }

    /// Open a pool and wrap it.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        options: PgRepositoryOptions,
    ) -> RepositoryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool, options))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn options(&self) -> &PgRepositoryOptions {
        &self.options
    }

    /// Create the translations table and its lookup index if missing.
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        let table = self.options.table();
        let create_table = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id BIGSERIAL PRIMARY KEY,
                entity TEXT NOT NULL,
                entity_id BIGINT NOT NULL,
                field TEXT NOT NULL,
                locale TEXT NOT NULL,
                value TEXT NOT NULL
            )"
        );
        sqlx::query(&create_table).execute(&self.pool).await?;

        let index_name = format!("{}_lookup_idx", table.replace('.', "_"));
        let create_index = format!(
            "CREATE INDEX IF NOT EXISTS {index_name} ON {table} (entity, entity_id, locale)"
        );
        sqlx::query(&create_index).execute(&self.pool).await?;

        info!("Translations table '{}' is ready", table);
        Ok(())
    }

    async fn insert_in(
        &self,
        conn: &mut PgConnection,
        translations: &[Translation],
    ) -> RepositoryResult<()> {
        let rows_per_statement = self.options.batch_size().min(MAX_INSERT_ROWS);
        for batch in translations.chunks(rows_per_statement) {
            insert_query(self.options.table(), batch)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }

    async fn delete_in(
        &self,
        conn: &mut PgConnection,
        entity: &str,
        entity_ids: &[i64],
        fields: &[String],
        locales: &[Locale],
    ) -> RepositoryResult<u64> {
        let result = delete_query(self.options.table(), entity, entity_ids, fields, locales)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}

fn select_query(
    table: &str,
    locales: &[Locale],
    entity: &str,
    entity_ids: &[i64],
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT id, entity, entity_id, field, locale, value FROM {table} WHERE entity = "
    ));
    builder.push_bind(entity.to_string());
    builder.push(" AND locale = ANY(");
    builder.push_bind(locale_codes(locales));
    builder.push(") AND entity_id = ANY(");
    builder.push_bind(entity_ids.to_vec());
    builder.push(")");
    builder
}

fn insert_query(table: &str, translations: &[Translation]) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {table} (entity, entity_id, field, locale, value) "
    ));
    builder.push_values(translations, |mut row, t| {
        row.push_bind(t.entity.clone())
            .push_bind(t.entity_id)
            .push_bind(t.field.clone())
            .push_bind(t.locale.code())
            .push_bind(t.value.clone());
    });
    builder
}

fn delete_query(
    table: &str,
    entity: &str,
    entity_ids: &[i64],
    fields: &[String],
    locales: &[Locale],
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("DELETE FROM {table} WHERE entity = "));
    builder.push_bind(entity.to_string());

    if !entity_ids.is_empty() {
        builder.push(" AND entity_id = ANY(");
        builder.push_bind(entity_ids.to_vec());
        builder.push(")");
    }
    if !fields.is_empty() {
        builder.push(" AND field = ANY(");
        builder.push_bind(fields.to_vec());
        builder.push(")");
    }
    if !locales.is_empty() {
        builder.push(" AND locale = ANY(");
        builder.push_bind(locale_codes(locales));
        builder.push(")");
    }
    builder
}

fn locale_codes(locales: &[Locale]) -> Vec<String> {
    locales.iter().map(|l| l.code().to_string()).collect()
}

#[async_trait]
impl TranslationRepository for PgTranslationRepository {
    async fn get_translations(
        &self,
        locales: &[Locale],
        entity: &str,
        entity_ids: &[i64],
    ) -> RepositoryResult<Vec<Translation>> {
        if locales.is_empty() || entity_ids.is_empty() {
            return Ok(Vec::new());
        }

        let table = self.options.table();
        let batches = chunk_ids(entity_ids, self.options.batch_size()).map(|batch| async move {
            select_query(table, locales, entity, batch)
                .build_query_as::<TranslationRow>()
                .fetch_all(&self.pool)
                .await
        });
        let rows: Vec<TranslationRow> = try_join_all(batches).await?.into_iter().flatten().collect();

        debug!(
            "Fetched {} translation row(s) for '{}' ({} id(s))",
            rows.len(),
            entity,
            entity_ids.len()
        );

        let registry = LocaleRegistry::global();
        Ok(rows
            .into_iter()
            .map(|row| row.into_translation(registry))
            .collect())
    }

    async fn mass_create(&self, translations: &[Translation]) -> RepositoryResult<()> {
        if translations.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.acquire().await?;
        self.insert_in(&mut conn, translations).await?;
        debug!("Inserted {} translation row(s)", translations.len());
        Ok(())
    }

    async fn mass_delete(
        &self,
        entity: &str,
        entity_ids: &[i64],
        fields: &[String],
        locales: &[Locale],
    ) -> RepositoryResult<()> {
        let mut conn = self.pool.acquire().await?;
        let deleted = self
            .delete_in(&mut conn, entity, entity_ids, fields, locales)
            .await?;
        debug!("Deleted {} translation row(s) for '{}'", deleted, entity);
        Ok(())
    }

    async fn mass_create_or_update(&self, translations: &[Translation]) -> RepositoryResult<()> {
        if translations.is_empty() {
            return Ok(());
        }

        let plan = ReconcilePlan::from_translations(translations);
        let mut tx = self.pool.begin().await?;

        for (entity, scope) in plan.iter() {
            let deleted = self
                .delete_in(&mut tx, entity, &scope.entity_ids, &scope.fields, &scope.locales)
                .await?;
            debug!("Reconcile: removed {} row(s) for '{}'", deleted, entity);
        }
        self.insert_in(&mut tx, translations).await?;

        tx.commit().await?;
        debug!("Reconcile: wrote {} translation row(s)", translations.len());
        Ok(())
    }
}
