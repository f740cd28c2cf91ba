use std::sync::{Arc, Mutex};

use arkv_batch::{decode_batch, encode_batch};
use arkv_query::{Row, find_equal};
use arkv_result::{Error, Result};
use arkv_storage::KvStore;
use arkv_types::{BatchBuilder, RecordBatch};
use arrow::datatypes::Schema;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use crate::config::IngestOptions;
use crate::json::{field_for, json_to_cell, parse_rows};

/// Outcome of one [`CollectionStore::upsert`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub total_rows: usize,
    /// Fields created by this call, in first-seen order.
    pub added_fields: Vec<String>,
}

/// Collections over a KV engine, keyed by the UTF-8 bytes of their names.
///
/// Upserts of one name are serialized so that the load / merge / rewrite
/// cycle never interleaves. Different names proceed in parallel.
pub struct CollectionStore<S: KvStore> {
    store: Arc<S>,
    options: IngestOptions,
    locks: Mutex<FxHashMap<String, Arc<Mutex<()>>>>,
}

impl<S: KvStore> CollectionStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_options(store, IngestOptions::default())
    }

    pub fn with_options(store: Arc<S>, options: IngestOptions) -> Self {
        Self {
            store,
            options,
            locks: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    fn name_lock(&self, name: &str) -> Result<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| Error::Internal("collection lock table poisoned".into()))?;
        Ok(Arc::clone(locks.entry(name.to_owned()).or_default()))
    }

    /// Run `f` while holding the lock of `name`, then drop the table entry
    /// unless another caller is queued on it.
    fn with_name_lock<T>(&self, name: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = self.name_lock(name)?;
        let outcome = {
            let _guard = lock
                .lock()
                .map_err(|_| Error::Internal(format!("collection {name} lock poisoned")))?;
            f()
        };
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| Error::Internal("collection lock table poisoned".into()))?;
        // One reference in the table, one here.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(name);
        }
        outcome
    }

    fn load_optional(&self, name: &str) -> Result<Option<RecordBatch>> {
        match self.store.find(name.as_bytes())? {
            Some(blob) => Ok(Some(decode_batch(blob.as_ref())?)),
            None => Ok(None),
        }
    }

    /// Current contents of `name`.
    pub fn load(&self, name: &str) -> Result<RecordBatch> {
        self.load_optional(name)?
            .ok_or_else(|| Error::NotFound(format!("collection {name}")))
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.store.find(name.as_bytes())?.is_some())
    }

    /// Remove `name`. Returns whether it existed.
    pub fn delete(&self, name: &str) -> Result<bool> {
        self.with_name_lock(name, || {
            let existed = self.store.delete(name.as_bytes())?;
            tracing::debug!(collection = name, existed, "deleted collection");
            Ok(existed)
        })
    }

    /// Merge `rows` into `name`, creating it if absent.
    ///
    /// Row `i` lands at index `existing_rows + i`. A field's column type is
    /// fixed by the first value seen for it; a later value of another type
    /// fails the whole call and leaves the stored collection untouched.
    pub fn upsert(&self, name: &str, rows: &[Map<String, Value>]) -> Result<UpsertSummary> {
        self.with_name_lock(name, || self.upsert_locked(name, rows))
    }

    fn upsert_locked(&self, name: &str, rows: &[Map<String, Value>]) -> Result<UpsertSummary> {
        let (mut builder, base) = match self.load_optional(name)? {
            Some(batch) => (BatchBuilder::from_batch(&batch)?, batch.num_rows()),
            None => (BatchBuilder::new(&Arc::new(Schema::empty()))?, 0),
        };
        if rows.is_empty() {
            return Ok(UpsertSummary {
                inserted: 0,
                total_rows: base,
                added_fields: Vec::new(),
            });
        }

        let mut added_fields = Vec::new();
        for (offset, row) in rows.iter().enumerate() {
            let index = base + offset;
            for (field, value) in row {
                let Some(cell) = json_to_cell(value).map_err(|err| in_field(field, err))? else {
                    continue;
                };
                let column = match builder.field_index(field) {
                    Some(_) => builder.column_mut(field)?,
                    None => {
                        added_fields.push(field.clone());
                        builder.add_column(field_for(field, &cell, &self.options))?
                    }
                };
                column.set(index, cell).map_err(|err| in_field(field, err))?;
            }
        }

        let total_rows = base + rows.len();
        let batch = builder.finish(total_rows)?;
        let bytes = encode_batch(&batch)?;
        self.store.save(name.as_bytes(), &bytes)?;
        self.store.flush()?;

        tracing::debug!(
            collection = name,
            inserted = rows.len(),
            total_rows,
            columns = batch.num_columns(),
            bytes = bytes.len(),
            "upserted collection"
        );
        Ok(UpsertSummary {
            inserted: rows.len(),
            total_rows,
            added_fields,
        })
    }

    /// [`upsert`](Self::upsert) from JSON text (an array of objects).
    pub fn upsert_json(&self, name: &str, json: &str) -> Result<UpsertSummary> {
        let rows = parse_rows(json)?;
        self.upsert(name, &rows)
    }

    /// Rows of `name` whose Utf8 field `field` equals `value`.
    pub fn find(&self, name: &str, field: &str, value: &str) -> Result<Vec<Row>> {
        let batch = self.load(name)?;
        find_equal(&batch, field, value.as_bytes())
    }
}

fn in_field(field: &str, err: Error) -> Error {
    match err {
        Error::UnsupportedType(msg) => Error::UnsupportedType(format!("field `{field}`: {msg}")),
        Error::InvalidArgumentError(msg) => {
            Error::InvalidArgumentError(format!("field `{field}`: {msg}"))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arkv_storage::MemKvStore;
    use std::thread;

    fn lock_entries<S: KvStore>(store: &CollectionStore<S>) -> usize {
        store.locks.lock().unwrap().len()
    }

    #[test]
    fn lock_table_is_emptied_after_each_call() {
        let store = CollectionStore::new(Arc::new(MemKvStore::new()));
        store.upsert_json("a", r#"[{"x": 1}]"#).unwrap();
        assert_eq!(lock_entries(&store), 0);

        assert!(!store.delete("missing").unwrap());
        assert!(store.delete("a").unwrap());
        assert_eq!(lock_entries(&store), 0);

        assert!(store.upsert_json("a", r#"[{"x": [1]}]"#).is_err());
        assert_eq!(lock_entries(&store), 0);
    }

    #[test]
    fn lock_table_drains_after_concurrent_upserts() {
        let store = Arc::new(CollectionStore::new(Arc::new(MemKvStore::new())));
        thread::scope(|scope| {
            for t in 0..8 {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    let name = if t % 2 == 0 { "even" } else { "odd" };
                    for i in 0..10 {
                        store
                            .upsert_json(name, &format!(r#"[{{"n": {i}}}]"#))
                            .unwrap();
                    }
                });
            }
        });
        assert_eq!(lock_entries(&store), 0);
        assert_eq!(store.load("even").unwrap().num_rows(), 40);
        assert_eq!(store.load("odd").unwrap().num_rows(), 40);
    }
}
