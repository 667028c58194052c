//! Admin binary for the translations table.
//!
//! Usage:
//!   cargo run -- migrate
//!   cargo run -- locales
//!   cargo run -- delete parameter --ids 1,2 --fields name --locales en,ru
//!
//! Required environment variables (except for `locales`):
//! - DATABASE_URL
//!
//! Optional:
//! - DATABASE_MAX_CONNECTIONS (defaults to 5)
//! - TRANSLATIONS_TABLE (defaults to translations)
//! - TRANSLATION_BATCH_SIZE (defaults to 1000)

use anyhow::{bail, Context, Result};
use entity_i18n::config::Config;
use entity_i18n::i18n::{Locale, LocaleRegistry};
use entity_i18n::repository::{PgTranslationRepository, TranslationRepository};
use tracing::info;

fn print_usage() {
    println!(
        r#"
Manage the entity translations table

USAGE:
    entity-i18n <COMMAND>

COMMANDS:
    migrate    Create the translations table and index if missing
    locales    Print the supported locales as JSON
    delete     Delete stored translations for one entity type

DELETE OPTIONS:
    delete <ENTITY> [--ids 1,2] [--fields name,description] [--locales en,ru] [--all]

    Every omitted filter matches everything. Without --ids, --fields or
    --locales the command refuses to run unless --all is given.
"#
    );
}

#[derive(Debug, Default, PartialEq)]
struct DeleteArgs {
    entity: String,
    entity_ids: Vec<i64>,
    fields: Vec<String>,
    locales: Vec<Locale>,
    all: bool,
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_delete_args(args: &[String]) -> Result<DeleteArgs> {
    let mut iter = args.iter();
    let entity = iter
        .next()
        .filter(|e| !e.starts_with("--"))
        .context("delete requires an entity name")?;

    let mut parsed = DeleteArgs {
        entity: entity.clone(),
        ..Default::default()
    };

    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--all" => parsed.all = true,
            "--ids" | "--fields" | "--locales" => {
                let value = iter
                    .next()
                    .with_context(|| format!("{} requires a value", flag))?;
                match flag.as_str() {
                    "--ids" => {
                        for id in split_list(value) {
                            parsed
                                .entity_ids
                                .push(id.parse().with_context(|| format!("Invalid id '{}'", id))?);
                        }
                    }
                    "--fields" => parsed.fields.extend(split_list(value).map(str::to_string)),
                    _ => {
                        let locales = LocaleRegistry::global().parse_list(value);
                        if locales.is_empty() {
                            bail!("No known locale in '{}'", value);
                        }
                        parsed.locales = locales;
                    }
                }
            }
            other => bail!("Unknown option: {}", other),
        }
    }

    let unfiltered =
        parsed.entity_ids.is_empty() && parsed.fields.is_empty() && parsed.locales.is_empty();
    if unfiltered && !parsed.all {
        bail!(
            "Refusing to delete every translation of '{}' without --all",
            parsed.entity
        );
    }

    Ok(parsed)
}

async fn connect(config: &Config) -> Result<PgTranslationRepository> {
    PgTranslationRepository::connect(
        &config.database_url,
        config.database_max_connections,
        config.repository_options()?,
    )
    .await
    .context("Failed to connect to database")
}

async fn migrate_command() -> Result<()> {
    let config = Config::from_env()?;
    let repository = connect(&config).await?;
    repository
        .ensure_schema()
        .await
        .context("Failed to create translations schema")?;
    Ok(())
}

fn locales_command() -> Result<()> {
    let json = serde_json::to_string_pretty(LocaleRegistry::global().list_all())?;
    println!("{}", json);
    Ok(())
}

async fn delete_command(args: &[String]) -> Result<()> {
    let delete = parse_delete_args(args)?;
    let config = Config::from_env()?;
    let repository = connect(&config).await?;

    repository
        .mass_delete(
            &delete.entity,
            &delete.entity_ids,
            &delete.fields,
            &delete.locales,
        )
        .await
        .context("Failed to delete translations")?;

    info!(
        entity = %delete.entity,
        ids = delete.entity_ids.len(),
        fields = delete.fields.len(),
        locales = delete.locales.len(),
        "Deleted translations"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("entity_i18n=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    match args[1].as_str() {
        "migrate" => migrate_command().await,
        "locales" => locales_command(),
        "delete" => delete_command(&args[2..]).await,
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        command => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            std::process::exit(1);
        }
    }
}
