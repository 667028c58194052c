use anyhow::{bail, Context, Result};

use crate::repository::postgres::{is_valid_table_name, PgRepositoryOptions, DEFAULT_TABLE};
use crate::repository::DEFAULT_BATCH_SIZE;

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Translations table
    pub translations_table: String,
    pub batch_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            // Database
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL not set")?,
            database_max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),

            // Translations table
            translations_table: std::env::var("TRANSLATIONS_TABLE")
                .unwrap_or_else(|_| DEFAULT_TABLE.to_string()),
            batch_size: std::env::var("TRANSLATION_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_BATCH_SIZE),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !is_valid_table_name(&self.translations_table) {
            bail!(
                "TRANSLATIONS_TABLE must be a plain SQL identifier, got '{}'",
                self.translations_table
            );
        }
        if self.batch_size == 0 {
            bail!("TRANSLATION_BATCH_SIZE must be at least 1");
        }
        if self.database_max_connections == 0 {
            bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }
        Ok(())
    }

    pub fn repository_options(&self) -> Result<PgRepositoryOptions> {
        PgRepositoryOptions::new(&self.translations_table, self.batch_size)
            .context("Invalid translations repository options")
    }
}
