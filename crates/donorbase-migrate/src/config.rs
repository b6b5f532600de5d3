//! Command-line configuration.

use crate::error::Error;
use clap::{Args, Parser, Subcommand};
use donorbase_core::eligibility::{
    DEFAULT_COLLECTION, DEFAULT_LEGACY_FIELD, DEFAULT_STRUCTURED_FIELD,
};
use donorbase_core::{MigrationConfig, RegionMatchPolicy, DEFAULT_COUNTRY};
use donorbase_store::StoreConfig;
use std::path::PathBuf;

/// Environment variable holding the store connection string.
pub const STORE_URL_VAR: &str = "DONORBASE_STORE_URL";

/// Fallback environment variable for the connection string.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str =
    "donorbase_migrate=info,donorbase_core=info,donorbase_store=info";

/// Legacy donor address migration.
#[derive(Parser, Debug)]
#[command(name = "donor-address-migrate")]
#[command(version, about = "Migrate legacy donor addresses to structured form", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse and persist structured addresses for every eligible donor.
    Migrate(MigrateArgs),

    /// Print the structured form of one address without touching the store.
    Parse(ParseArgs),

    /// Load newline-delimited JSON donor documents into a collection.
    Import(ImportArgs),
}

/// Arguments for `migrate`.
#[derive(Args, Debug, Clone)]
pub struct MigrateArgs {
    /// Log what would change without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Collection holding donor records.
    #[arg(long, default_value = DEFAULT_COLLECTION)]
    pub collection: String,

    /// Field holding the free-text address.
    #[arg(long, default_value = DEFAULT_LEGACY_FIELD)]
    pub legacy_field: String,

    /// Field the structured address is written to.
    #[arg(long, default_value = DEFAULT_STRUCTURED_FIELD)]
    pub structured_field: String,

    /// Country assigned to every parsed address.
    #[arg(long, default_value = DEFAULT_COUNTRY)]
    pub country: String,

    /// Only accept segments that name a region exactly.
    #[arg(long)]
    pub strict_regions: bool,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

impl MigrateArgs {
    /// Convert command-line arguments to a migration configuration.
    pub fn into_config(self) -> MigrationConfig {
        let match_policy = if self.strict_regions {
            RegionMatchPolicy::Exact
        } else {
            RegionMatchPolicy::Containment
        };

        MigrationConfig {
            collection: self.collection,
            legacy_field: self.legacy_field,
            structured_field: self.structured_field,
            country: self.country,
            match_policy,
        }
    }
}

/// Arguments for `parse`.
#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// The legacy address string.
    pub address: String,

    /// Country assigned to the parsed address.
    #[arg(long, default_value = DEFAULT_COUNTRY)]
    pub country: String,

    /// Only accept segments that name a region exactly.
    #[arg(long)]
    pub strict_regions: bool,
}

/// Arguments for `import`.
#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// File with one JSON object per line.
    pub file: PathBuf,

    /// Collection to import into.
    #[arg(long, default_value = DEFAULT_COLLECTION)]
    pub collection: String,
}

/// Resolve the store connection string, preferring `DONORBASE_STORE_URL` over
/// `DATABASE_URL`. Empty values count as unset.
pub fn resolve_connection_string(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, Error> {
    [STORE_URL_VAR, DATABASE_URL_VAR]
        .into_iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            Error::Config(format!(
                "no store connection string: set {STORE_URL_VAR} or {DATABASE_URL_VAR}"
            ))
        })
}

/// Store configuration from the process environment.
pub fn store_config_from_env() -> Result<StoreConfig, Error> {
    let url = resolve_connection_string(|name| std::env::var(name).ok())?;
    Ok(StoreConfig::from_connection_string(&url)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_store_url_preferred() {
        let lookup = env(&[(STORE_URL_VAR, "sled:///a"), (DATABASE_URL_VAR, "sled:///b")]);
        assert_eq!(resolve_connection_string(lookup).unwrap(), "sled:///a");
    }

    #[test]
    fn test_database_url_fallback() {
        let lookup = env(&[(STORE_URL_VAR, "  "), (DATABASE_URL_VAR, "./data")]);
        assert_eq!(resolve_connection_string(lookup).unwrap(), "./data");
    }

    #[test]
    fn test_missing_connection_string() {
        let err = resolve_connection_string(env(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains(STORE_URL_VAR));
    }

    #[test]
    fn test_migrate_defaults() {
        let cli = Cli::try_parse_from(["donor-address-migrate", "migrate"]).unwrap();
        let Command::Migrate(args) = cli.command else {
            panic!("expected migrate");
        };
        assert!(!args.dry_run);
        assert!(!args.json);
        assert_eq!(args.into_config(), MigrationConfig::default());
    }

    #[test]
    fn test_migrate_flags() {
        let cli = Cli::try_parse_from([
            "donor-address-migrate",
            "migrate",
            "--dry-run",
            "--collection",
            "supporters",
            "--structured-field",
            "postal",
            "--country",
            "Nepal",
            "--strict-regions",
        ])
        .unwrap();
        let Command::Migrate(args) = cli.command else {
            panic!("expected migrate");
        };
        assert!(args.dry_run);

        let config = args.into_config();
        assert_eq!(config.collection, "supporters");
        assert_eq!(config.legacy_field, DEFAULT_LEGACY_FIELD);
        assert_eq!(config.structured_field, "postal");
        assert_eq!(config.country, "Nepal");
        assert_eq!(config.match_policy, RegionMatchPolicy::Exact);
    }

    #[test]
    fn test_parse_requires_address() {
        assert!(Cli::try_parse_from(["donor-address-migrate", "parse"]).is_err());
    }
}
