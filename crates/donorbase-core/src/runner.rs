//! Address migration runner.
//!
//! Loads the eligible set once, then walks it sequentially:
//!
//! | Parse result | Dry run | Action | Outcome |
//! |--------------|---------|--------|---------|
//! | no city, state or pincode | any | none | `Skipped` |
//! | equal to the stored value | any | none | `Skipped` |
//! | anything else | yes | none, logged as a preview | `Migrated` |
//! | anything else | no | single-field update | `Migrated` |
//! | update failed | no | none | `Error` |
//!
//! A failing record never stops the batch. Records that gain a city drop out of the
//! selection. Records without one stay eligible, but once their parse result is stored
//! a rerun finds nothing new and skips them, so a second pass writes nothing.

use crate::address::StructuredAddress;
use crate::config::MigrationConfig;
use crate::eligibility::{EligibilitySelector, EligibleRecord};
use crate::error::{Error, StoreError};
use crate::gazetteer::Gazetteer;
use crate::logger::{MigrationLogger, RecordEvent, DRY_RUN_MARKER};
use crate::parser::AddressParser;
use crate::store::RecordStore;
use serde::Serialize;
use std::sync::Arc;

/// Classification of one record in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// Structured address written (or would be, in a dry run).
    Migrated,
    /// Nothing usable was extracted; record left untouched.
    Skipped,
    /// Processing failed; record left untouched.
    Error,
}

impl std::fmt::Display for MigrationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationOutcome::Migrated => write!(f, "migrated"),
            MigrationOutcome::Skipped => write!(f, "skipped"),
            MigrationOutcome::Error => write!(f, "error"),
        }
    }
}

/// Aggregate counts of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Records migrated (or that would be, in a dry run).
    pub migrated: u64,
    /// Records skipped for lack of signal.
    pub skipped: u64,
    /// Records that failed.
    pub errors: u64,
    /// Records processed.
    pub total: u64,
    /// Whether the run was a preview.
    pub dry_run: bool,
}

impl Summary {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Count one processed record.
    pub fn record(&mut self, outcome: MigrationOutcome) {
        match outcome {
            MigrationOutcome::Migrated => self.migrated += 1,
            MigrationOutcome::Skipped => self.skipped += 1,
            MigrationOutcome::Error => self.errors += 1,
        }
        self.total += 1;
    }

    /// Format the summary as a single log line.
    pub fn to_log_line(&self) -> String {
        let prefix = if self.dry_run {
            format!("{} ", DRY_RUN_MARKER)
        } else {
            String::new()
        };
        format!(
            "{}SUMMARY migrated={} skipped={} errors={} total={}",
            prefix, self.migrated, self.skipped, self.errors, self.total
        )
    }
}

/// Sequential, failure-isolated address migration over a record store.
pub struct MigrationRunner<S, L> {
    store: S,
    logger: L,
    parser: AddressParser,
    config: MigrationConfig,
    selector: EligibilitySelector,
}

impl<S: RecordStore, L: MigrationLogger> MigrationRunner<S, L> {
    /// Create a runner using the built-in gazetteer.
    pub fn new(store: S, logger: L, config: &MigrationConfig) -> Self {
        Self::with_gazetteer(store, logger, config, Arc::new(Gazetteer::india()))
    }

    /// Create a runner over a specific gazetteer.
    pub fn with_gazetteer(
        store: S,
        logger: L,
        config: &MigrationConfig,
        gazetteer: Arc<Gazetteer>,
    ) -> Self {
        let parser = AddressParser::new(gazetteer)
            .with_policy(config.match_policy)
            .with_country(config.country.as_str());

        Self {
            store,
            logger,
            parser,
            config: config.clone(),
            selector: config.selector(),
        }
    }

    /// Run one pass over the eligible set.
    ///
    /// Fails only on an invalid configuration or when the eligible set cannot be
    /// loaded. Per-record failures are counted in the summary.
    pub fn run(&self, dry_run: bool) -> Result<Summary, Error> {
        self.config.validate()?;

        let span = tracing::info_span!(
            "address_migration",
            collection = %self.selector.collection,
            dry_run
        );
        let _enter = span.enter();

        let records = self.store.eligible_records(&self.selector)?;
        tracing::info!(eligible = records.len(), "loaded eligible records");

        let mut summary = Summary::new(dry_run);
        for record in &records {
            let event = self.process(record, dry_run);
            summary.record(event.outcome);
            self.logger.record(&event);
        }

        self.logger.summary(&summary);
        Ok(summary)
    }

    /// Parse, classify and (on live runs) persist one record.
    fn process(&self, record: &EligibleRecord, dry_run: bool) -> RecordEvent {
        let parsed = self.parser.parse(record.legacy_address.as_deref());

        let (outcome, error) = match self.apply(record, &parsed, dry_run) {
            Ok(outcome) => (outcome, None),
            Err(e) => {
                tracing::debug!(id = %record.id, error = %e, "record failed");
                (MigrationOutcome::Error, Some(e.to_string()))
            }
        };

        RecordEvent {
            id: record.id.clone(),
            original: record.legacy_address.clone(),
            parsed: Some(parsed),
            outcome,
            dry_run,
            error,
        }
    }

    fn apply(
        &self,
        record: &EligibleRecord,
        parsed: &StructuredAddress,
        dry_run: bool,
    ) -> Result<MigrationOutcome, StoreError> {
        if parsed.is_low_confidence() {
            return Ok(MigrationOutcome::Skipped);
        }
        // Already written by an earlier run; the record is only eligible for lack of a city.
        if record.structured.as_ref() == Some(parsed) {
            return Ok(MigrationOutcome::Skipped);
        }
        if dry_run {
            return Ok(MigrationOutcome::Migrated);
        }

        self.store
            .set_structured_address(&self.selector, &record.id, parsed)?;
        Ok(MigrationOutcome::Migrated)
    }
}
