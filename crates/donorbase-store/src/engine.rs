//! Document store implementation.

use crate::config::StoreConfig;
use crate::error::Error;
use crate::id::{DocumentId, DOCUMENT_ID_SIZE};
use crate::key::VersionedKey;
use crate::record::Record;
use serde_json::{Map, Value};
use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionalTree};
use sled::{Db, Transactional, Tree};

/// Tree name for document versions.
const DATA_TREE: &str = "data";

/// Tree name for metadata (latest versions).
const META_TREE: &str = "meta";

/// Tree name for the collection index.
const COLLECTION_INDEX_TREE: &str = "index:collection";

/// Prefix for latest version pointers in the meta tree.
const LATEST_PREFIX: &[u8] = b"latest:";

/// Latest version of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document identifier.
    pub id: DocumentId,
    /// Collection it belongs to.
    pub collection: String,
    /// Version of this body.
    pub version: u64,
    /// JSON object body.
    pub body: Map<String, Value>,
}

impl Document {
    fn from_record(id: DocumentId, version: u64, record: Record) -> Result<Self, Error> {
        let body = match record.json()? {
            Value::Object(body) => body,
            other => {
                return Err(Error::InvalidDocument(format!(
                    "{id}: body is {}, expected an object",
                    json_kind(&other)
                )))
            }
        };

        Ok(Self {
            id,
            collection: record.collection,
            version,
            body,
        })
    }
}

/// Embedded, versioned JSON document store over sled.
pub struct DocumentStore {
    /// The underlying sled database.
    db: Db,

    /// Document versions keyed by [`VersionedKey`].
    data_tree: Tree,

    /// Latest version pointers.
    meta_tree: Tree,

    /// Collection index (collection + 0 + document id -> empty).
    collection_index_tree: Tree,
}

impl DocumentStore {
    /// Open or create a store with the given configuration.
    pub fn open(config: &StoreConfig) -> Result<Self, Error> {
        let db = config.to_sled_config().open()?;
        let data_tree = db.open_tree(DATA_TREE)?;
        let meta_tree = db.open_tree(META_TREE)?;
        let collection_index_tree = db.open_tree(COLLECTION_INDEX_TREE)?;

        tracing::debug!(
            path = %config.path.display(),
            temporary = config.temporary,
            recovered = db.was_recovered(),
            "document store opened"
        );

        Ok(Self {
            db,
            data_tree,
            meta_tree,
            collection_index_tree,
        })
    }

    /// Insert a new document into `collection`. The body must be a JSON object.
    pub fn insert(&self, collection: &str, body: &Value) -> Result<DocumentId, Error> {
        if !body.is_object() {
            return Err(Error::InvalidDocument(format!(
                "body is {}, expected an object",
                json_kind(body)
            )));
        }

        let id = DocumentId::generate();
        let key = VersionedKey::next(id, None);
        let record = Record::new(collection, body)?;
        let record_bytes = record.to_bytes()?;
        let index_key = collection_index_key(collection, &id);

        let result: Result<(), TransactionError<Error>> =
            (&self.data_tree, &self.meta_tree, &self.collection_index_tree).transaction(
                |(data_tx, meta_tx, index_tx)| {
                    put_version(data_tx, meta_tx, &key, &record_bytes)?;
                    index_tx.insert(index_key.as_slice(), &[] as &[u8])?;
                    Ok(())
                },
            );
        unwrap_transaction(result)?;

        Ok(id)
    }

    /// Get the latest version of a document.
    pub fn get(&self, id: &DocumentId) -> Result<Option<Document>, Error> {
        let Some(version) = self.latest_version(id)? else {
            return Ok(None);
        };

        let key = VersionedKey::new(*id, version);
        match self.data_tree.get(key.encode())? {
            Some(bytes) => {
                let record = Record::from_bytes(&bytes)?;
                Ok(Some(Document::from_record(*id, version, record)?))
            }
            None => Ok(None),
        }
    }

    /// Set one top-level field of a document, writing a new version.
    ///
    /// The read of the current body and the write of the new version happen in one
    /// sled transaction, so the update is atomic. Returns the new version.
    pub fn set_field(
        &self,
        collection: &str,
        id: &DocumentId,
        field: &str,
        value: Value,
    ) -> Result<u64, Error> {
        let result: Result<u64, TransactionError<Error>> = (&self.data_tree, &self.meta_tree)
            .transaction(|(data_tx, meta_tx)| {
                let previous = match meta_tx.get(latest_key(id))? {
                    Some(bytes) => decode_version(&bytes).map_err(abort)?,
                    None => return Err(abort(Error::NotFound(id.to_string()))),
                };

                let current_key = VersionedKey::new(*id, previous);
                let bytes = data_tx
                    .get(current_key.encode())?
                    .ok_or_else(|| abort(Error::NotFound(id.to_string())))?;
                let current = Record::from_bytes(&bytes).map_err(abort)?;

                if current.collection != collection {
                    return Err(abort(Error::NotFound(format!(
                        "{id} in collection '{collection}'"
                    ))));
                }

                let mut body = match current.json().map_err(abort)? {
                    Value::Object(body) => body,
                    other => {
                        return Err(abort(Error::InvalidDocument(format!(
                            "{id}: body is {}, expected an object",
                            json_kind(&other)
                        ))))
                    }
                };
                body.insert(field.to_string(), value.clone());

                let key = VersionedKey::next(*id, Some(previous));
                let record = Record::new(collection, &Value::Object(body)).map_err(abort)?;
                let record_bytes = record.to_bytes().map_err(abort)?;
                put_version(data_tx, meta_tx, &key, &record_bytes)?;

                Ok(key.version)
            });

        unwrap_transaction(result)
    }

    /// Scan the latest version of every document in `collection`, in id order.
    pub fn scan(&self, collection: &str) -> impl Iterator<Item = Result<Document, Error>> + '_ {
        let prefix = collection_index_prefix(collection);
        let prefix_len = prefix.len();

        self.collection_index_tree
            .scan_prefix(prefix)
            .filter_map(move |result| {
                let key = match result {
                    Ok((key, _)) => key,
                    Err(e) => return Some(Err(e.into())),
                };
                if key.len() != prefix_len + DOCUMENT_ID_SIZE {
                    return Some(Err(Error::InvalidKey));
                }
                let id = DocumentId::from_slice(&key[prefix_len..])?;

                // A document whose latest version vanished is skipped.
                self.get(&id).transpose()
            })
    }

    /// Every version of a document, oldest first.
    pub fn versions(&self, id: &DocumentId) -> Result<Vec<(u64, Value)>, Error> {
        let min = VersionedKey::min_for(*id).encode();
        let max = VersionedKey::max_for(*id).encode();

        self.data_tree
            .range(min..=max)
            .map(|result| -> Result<(u64, Value), Error> {
                let (key_bytes, value_bytes) = result?;
                let key = VersionedKey::decode(&key_bytes).ok_or(Error::InvalidKey)?;
                let record = Record::from_bytes(&value_bytes)?;
                Ok((key.version, record.json()?))
            })
            .collect()
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.collection_index_tree
            .scan_prefix(collection_index_prefix(collection))
            .count()
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.db.flush()?;
        Ok(())
    }

    fn latest_version(&self, id: &DocumentId) -> Result<Option<u64>, Error> {
        match self.meta_tree.get(latest_key(id))? {
            Some(bytes) => Ok(Some(decode_version(&bytes)?)),
            None => Ok(None),
        }
    }
}

/// Open a store, run `f` against it, then flush and close it.
///
/// The store is released on every path out of `f`. A flush failure is reported
/// only when `f` itself succeeded.
///
/// The store is opened without a background flusher, so no sled thread outlives the
/// call holding the database lock and the same path can be reopened right away.
pub fn with_store<T, E, F>(config: &StoreConfig, f: F) -> Result<T, E>
where
    E: From<Error>,
    F: FnOnce(&DocumentStore) -> Result<T, E>,
{
    let config = config.clone().with_flush_every_ms(None);
    let store = DocumentStore::open(&config)?;
    let result = f(&store);

    match (result, store.flush()) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), flushed) => {
            if let Err(flush_err) = flushed {
                tracing::warn!(error = %flush_err, "flush failed while closing store");
            }
            Err(e)
        }
    }
}

fn put_version(
    data_tx: &TransactionalTree,
    meta_tx: &TransactionalTree,
    key: &VersionedKey,
    record_bytes: &[u8],
) -> Result<(), ConflictableTransactionError<Error>> {
    data_tx.insert(&key.encode()[..], record_bytes)?;
    meta_tx.insert(latest_key(&key.document_id), &key.version.to_be_bytes()[..])?;
    Ok(())
}

fn abort(err: Error) -> ConflictableTransactionError<Error> {
    ConflictableTransactionError::Abort(err)
}

fn unwrap_transaction<T>(result: Result<T, TransactionError<Error>>) -> Result<T, Error> {
    match result {
        Ok(value) => Ok(value),
        Err(TransactionError::Abort(e)) => Err(e),
        Err(TransactionError::Storage(e)) => Err(Error::Storage(e)),
    }
}

fn decode_version(bytes: &[u8]) -> Result<u64, Error> {
    let bytes: [u8; 8] = bytes.try_into().map_err(|_| Error::InvalidKey)?;
    Ok(u64::from_be_bytes(bytes))
}

fn latest_key(id: &DocumentId) -> Vec<u8> {
    let mut key = Vec::with_capacity(LATEST_PREFIX.len() + DOCUMENT_ID_SIZE);
    key.extend_from_slice(LATEST_PREFIX);
    key.extend_from_slice(id.as_bytes());
    key
}

fn collection_index_key(collection: &str, id: &DocumentId) -> Vec<u8> {
    let mut key = collection_index_prefix(collection);
    key.extend_from_slice(id.as_bytes());
    key
}

fn collection_index_prefix(collection: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(collection.len() + 1);
    prefix.extend_from_slice(collection.as_bytes());
    prefix.push(0); // Null separator
    prefix
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
