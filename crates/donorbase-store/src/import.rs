//! JSON-lines import into a collection.

use crate::engine::{json_kind, DocumentStore};
use crate::error::Error;
use serde_json::Value;
use std::io::BufRead;

impl DocumentStore {
    /// Insert one document per non-blank line of `reader`.
    ///
    /// Stops at the first line that is not a JSON object. Documents from earlier
    /// lines stay inserted. Returns the number of documents written.
    pub fn import_json_lines(&self, collection: &str, reader: impl BufRead) -> Result<usize, Error> {
        let mut imported = 0;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            let value: Value = serde_json::from_str(&line).map_err(|e| {
                Error::Deserialization(format!("line {line_number}: {e}"))
            })?;
            if !value.is_object() {
                return Err(Error::InvalidDocument(format!(
                    "line {line_number}: expected an object, found {}",
                    json_kind(&value)
                )));
            }

            self.insert(collection, &value)?;
            imported += 1;
        }

        tracing::info!(collection, imported, "import complete");
        Ok(imported)
    }
}
