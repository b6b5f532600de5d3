//! Subcommand implementations.
//!
//! Each command returns the text to print on stdout; progress goes through tracing.

use crate::config::{ImportArgs, MigrateArgs, ParseArgs};
use crate::error::Error;
use donorbase_core::{AddressParser, MigrationRunner, RegionMatchPolicy, Summary, TracingLogger};
use donorbase_store::{with_store, StoreConfig};
use std::fs::File;
use std::io::BufReader;

/// Run one migration pass and render its summary.
pub fn migrate(store_config: &StoreConfig, args: MigrateArgs) -> Result<String, Error> {
    let dry_run = args.dry_run;
    let json = args.json;
    let config = args.into_config();

    // Reject bad field names before the store is opened.
    config.validate()?;
    tracing::info!(
        store = %store_config.path.display(),
        temporary = store_config.temporary,
        "opening document store"
    );

    let summary = with_store(store_config, |store| -> Result<Summary, Error> {
        Ok(MigrationRunner::new(store, TracingLogger, &config).run(dry_run)?)
    })?;

    render_summary(&summary, json)
}

/// Parse a single address and render it as JSON.
pub fn parse(args: ParseArgs) -> Result<String, Error> {
    let policy = if args.strict_regions {
        RegionMatchPolicy::Exact
    } else {
        RegionMatchPolicy::Containment
    };
    let parser = AddressParser::default()
        .with_policy(policy)
        .with_country(args.country);

    let address = parser.parse(Some(args.address.as_str()));
    Ok(serde_json::to_string_pretty(&address)?)
}

/// Import a JSON-lines file into a collection.
pub fn import(store_config: &StoreConfig, args: ImportArgs) -> Result<String, Error> {
    let file = File::open(&args.file)?;
    let reader = BufReader::new(file);

    let imported = with_store(store_config, |store| -> Result<usize, Error> {
        Ok(store.import_json_lines(&args.collection, reader)?)
    })?;

    Ok(format!(
        "imported {} documents into '{}'",
        imported, args.collection
    ))
}

fn render_summary(summary: &Summary, json: bool) -> Result<String, Error> {
    if json {
        Ok(serde_json::to_string_pretty(summary)?)
    } else {
        Ok(summary.to_log_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Cli, Command};
    use clap::Parser;
    use donorbase_store::DocumentStore;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    const DONORS: &str = r#"{"address": "12 MG Road, Pune, Maharashtra - 411001"}
{"address": "Behind post office"}

{"address": "Shop 9, Baner, MH"}
"#;

    fn command(args: &[&str]) -> Command {
        let mut argv = vec!["donor-address-migrate"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    fn migrate_args(args: &[&str]) -> MigrateArgs {
        let mut argv = vec!["migrate"];
        argv.extend_from_slice(args);
        match command(&argv) {
            Command::Migrate(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn seeded() -> (tempfile::TempDir, StoreConfig) {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("donors.jsonl");
        std::fs::write(&file, DONORS).unwrap();
        let config = StoreConfig::new(dir.path().join("store"));

        let Command::Import(args) = command(&["import", file.to_str().unwrap()]) else {
            panic!("expected import");
        };
        let output = import(&config, args).unwrap();
        assert_eq!(output, "imported 3 documents into 'donors'");

        (dir, config)
    }

    #[test]
    fn test_parse_command() {
        let Command::Parse(args) = command(&["parse", "Shop 9, Baner, MH"]) else {
            panic!("expected parse");
        };
        let output: Value = serde_json::from_str(&parse(args).unwrap()).unwrap();
        assert_eq!(
            output,
            serde_json::json!({
                "line": "Shop 9",
                "city": "Baner",
                "state": "MH",
                "country": "India",
                "pincode": "",
            })
        );
    }

    #[test]
    fn test_dry_run_then_migrate() {
        let (_dir, config) = seeded();

        let preview = migrate(&config, migrate_args(&["--dry-run"])).unwrap();
        assert_eq!(
            preview,
            "[DRY RUN] SUMMARY migrated=2 skipped=1 errors=0 total=3"
        );

        let output = migrate(&config, migrate_args(&["--json"])).unwrap();
        let summary: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(summary["migrated"], 2);
        assert_eq!(summary["dry_run"], false);

        let again = migrate(&config, migrate_args(&[])).unwrap();
        assert_eq!(again, "SUMMARY migrated=0 skipped=1 errors=0 total=1");

        let store = DocumentStore::open(&config).unwrap();
        assert_eq!(store.count("donors"), 3);
    }

    #[test]
    fn test_migrate_rejects_overlapping_fields() {
        let (_dir, config) = seeded();
        let err = migrate(&config, migrate_args(&["--structured-field", "address"])).unwrap_err();
        assert!(matches!(err, Error::Migration(_)));
    }

    #[test]
    fn test_import_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let Command::Import(args) = command(&["import", "/nonexistent/donors.jsonl"]) else {
            panic!("expected import");
        };
        let err = import(&StoreConfig::new(dir.path()), args).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
