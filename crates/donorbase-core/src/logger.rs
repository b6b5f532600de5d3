//! Migration outcome logging.
//!
//! The runner reports every record decision and the final summary through a
//! [`MigrationLogger`]. Loggers cannot fail: a sink that has trouble writing must
//! swallow it, so logging never aborts a batch.

use crate::address::StructuredAddress;
use crate::eligibility::RecordId;
use crate::runner::{MigrationOutcome, Summary};
use parking_lot::Mutex;

/// Prefix marking preview output.
pub const DRY_RUN_MARKER: &str = "[DRY RUN]";

/// Decision taken for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEvent {
    /// Record identifier.
    pub id: RecordId,
    /// The legacy address as stored.
    pub original: Option<String>,
    /// Parser output, when parsing ran.
    pub parsed: Option<StructuredAddress>,
    /// Classification.
    pub outcome: MigrationOutcome,
    /// Whether the run is a preview.
    pub dry_run: bool,
    /// Failure reason for [`MigrationOutcome::Error`].
    pub error: Option<String>,
}

impl RecordEvent {
    /// Format the event as a single log line.
    pub fn to_log_line(&self) -> String {
        let mut line = String::new();
        if self.dry_run {
            line.push_str(DRY_RUN_MARKER);
            line.push(' ');
        }

        let verb = match (self.outcome, self.dry_run) {
            (MigrationOutcome::Migrated, true) => "WOULD_MIGRATE",
            (MigrationOutcome::Migrated, false) => "MIGRATED",
            (MigrationOutcome::Skipped, _) => "SKIPPED",
            (MigrationOutcome::Error, _) => "ERROR",
        };
        line.push_str(&format!("{} id={} original={:?}", verb, self.id, self.original));

        if let Some(parsed) = &self.parsed {
            line.push_str(&format!(
                " line={:?} city={:?} state={:?} country={:?} pincode={:?}",
                parsed.line, parsed.city, parsed.state, parsed.country, parsed.pincode
            ));
        }
        if let Some(error) = &self.error {
            line.push_str(&format!(" error={:?}", error));
        }

        line
    }
}

/// Sink for migration outcomes.
pub trait MigrationLogger {
    /// Report the decision taken for one record.
    fn record(&self, event: &RecordEvent);

    /// Report the final counts of a run.
    fn summary(&self, summary: &Summary);
}

impl<L: MigrationLogger + ?Sized> MigrationLogger for &L {
    fn record(&self, event: &RecordEvent) {
        (**self).record(event)
    }

    fn summary(&self, summary: &Summary) {
        (**self).summary(summary)
    }
}

/// Logger that writes through `tracing`.
#[derive(Debug, Default)]
pub struct TracingLogger;

impl MigrationLogger for TracingLogger {
    fn record(&self, event: &RecordEvent) {
        match event.outcome {
            MigrationOutcome::Error => tracing::warn!("{}", event.to_log_line()),
            _ => tracing::info!("{}", event.to_log_line()),
        }
    }

    fn summary(&self, summary: &Summary) {
        tracing::info!(
            migrated = summary.migrated,
            skipped = summary.skipped,
            errors = summary.errors,
            total = summary.total,
            "{}",
            summary.to_log_line()
        );
    }
}

/// In-memory logger for testing.
#[derive(Debug, Default)]
pub struct MemoryMigrationLogger {
    events: Mutex<Vec<RecordEvent>>,
    summaries: Mutex<Vec<Summary>>,
}

impl MemoryMigrationLogger {
    /// Create a new memory logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all logged record events.
    pub fn events(&self) -> Vec<RecordEvent> {
        self.events.lock().clone()
    }

    /// Get all logged summaries.
    pub fn summaries(&self) -> Vec<Summary> {
        self.summaries.lock().clone()
    }

    /// Clear everything.
    pub fn clear(&self) {
        self.events.lock().clear();
        self.summaries.lock().clear();
    }

    /// Get event count.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl MigrationLogger for MemoryMigrationLogger {
    fn record(&self, event: &RecordEvent) {
        self.events.lock().push(event.clone());
    }

    fn summary(&self, summary: &Summary) {
        self.summaries.lock().push(summary.clone());
    }
}

/// Logger that discards everything.
#[derive(Debug, Default)]
pub struct NullMigrationLogger;

impl MigrationLogger for NullMigrationLogger {
    fn record(&self, _event: &RecordEvent) {}

    fn summary(&self, _summary: &Summary) {}
}
