//! Named, ordered collections of JSON records over a key-value store
//!
//! Collections are newest-first and stored as a JSON array. A payload that is
//! not JSON, or not an array, reads back as an empty collection. Inside an
//! array each record is decoded on its own: records that do not decode are
//! left out of the typed view but stay in storage, and fields the record type
//! does not know about are carried through rewrites.

use std::marker::PhantomData;
use std::sync::Arc;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::db::KeyValueStore;
use crate::error::StorageError;
use crate::models::{FavoriteRecord, OrderRecord};

/// Key holding the favorites gallery
pub const FAVORITES_COLLECTION: &str = "komal-jewellery-favorites";

/// Key holding the order ledger
pub const LEDGER_COLLECTION: &str = "komal-jewellery-ledger";

/// Read/write access to one named collection.
pub struct CollectionStore<T> {
    backend: Arc<dyn KeyValueStore>,
    name: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for CollectionStore<T> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            name: self.name.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> CollectionStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(backend: Arc<dyn KeyValueStore>, name: impl Into<String>) -> Self {
        Self {
            backend,
            name: name.into(),
            _record: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored records as JSON values, undecoded.
    pub fn read_raw(&self) -> Vec<Value> {
        let raw = match self.backend.get(&self.name) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("[CollectionStore::read_raw] {}: backend read failed: {}", self.name, e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(values)) => values,
            Ok(_) => {
                warn!("[CollectionStore::read_raw] {}: payload is not an array", self.name);
                Vec::new()
            }
            Err(e) => {
                warn!(
                    "[CollectionStore::read_raw] {}: discarding undecodable payload: {}",
                    self.name, e
                );
                Vec::new()
            }
        }
    }

    /// Replaces the stored payload with `values` as-is.
    pub fn write_raw(&self, values: &[Value]) -> Result<(), StorageError> {
        let payload =
            serde_json::to_string(values).map_err(|e| StorageError::Serialize(e.to_string()))?;
        self.backend.set(&self.name, &payload)?;
        debug!("[CollectionStore::write_raw] {}: {} records", self.name, values.len());
        Ok(())
    }

    /// Returns the stored records that decode as `T`.
    pub fn read(&self) -> Vec<T> {
        self.decode_all(self.read_raw())
    }

    /// Replaces the collection with `items`.
    ///
    /// A stored record with the same `id` as an item lends it any fields `T`
    /// does not serialize, and stored records that do not decode as `T` keep
    /// their positions. `write(&read())` therefore leaves the payload as it was.
    pub fn write(&self, items: &[T]) -> Result<(), StorageError> {
        let stored = self.read_raw();
        let mut values = items
            .iter()
            .map(|item| -> Result<Value, StorageError> {
                let mut value = encode(item)?;
                carry_unknown_fields(&mut value, &stored);
                Ok(value)
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (index, value) in stored.into_iter().enumerate() {
            if self.decode(&value).is_none() {
                values.insert(index.min(values.len()), value);
            }
        }
        self.write_raw(&values)
    }

    /// Prepends `item` and persists; returns the new collection.
    pub fn append(&self, item: T) -> Result<Vec<T>, StorageError> {
        let mut values = self.read_raw();
        values.insert(0, encode(&item)?);
        self.write_raw(&values)?;
        Ok(self.decode_all(values))
    }

    /// Drops every record matching `predicate` and persists; returns the new collection.
    ///
    /// Records that do not decode as `T` never match.
    pub fn remove_where<F>(&self, predicate: F) -> Result<Vec<T>, StorageError>
    where
        F: Fn(&T) -> bool,
    {
        let mut values = self.read_raw();
        values.retain(|value| match self.decode(value) {
            Some(item) => !predicate(&item),
            None => true,
        });
        self.write_raw(&values)?;
        Ok(self.decode_all(values))
    }

    fn decode(&self, value: &Value) -> Option<T> {
        <T as serde::Deserialize>::deserialize(value).ok()
    }

    fn decode_all(&self, values: Vec<Value>) -> Vec<T> {
        values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(
                        "[CollectionStore::read] {}: skipping record {}: {}",
                        self.name, index, e
                    );
                    None
                }
            })
            .collect()
    }
}

fn encode<T: Serialize>(item: &T) -> Result<Value, StorageError> {
    serde_json::to_value(item).map_err(|e| StorageError::Serialize(e.to_string()))
}

/// Copies fields missing from `value` off the stored record sharing its `id`.
fn carry_unknown_fields(value: &mut Value, stored: &[Value]) {
    let Value::Object(fields) = value else {
        return;
    };
    let Some(id) = fields.get("id") else {
        return;
    };
    let previous = stored.iter().find_map(|candidate| match candidate {
        Value::Object(candidate) if candidate.get("id") == Some(id) => Some(candidate),
        _ => None,
    });
    if let Some(previous) = previous {
        for (key, extra) in previous {
            if !fields.contains_key(key) {
                fields.insert(key.clone(), extra.clone());
            }
        }
    }
}

/// Favorites gallery over `backend`
pub fn favorites_store(backend: Arc<dyn KeyValueStore>) -> CollectionStore<FavoriteRecord> {
    CollectionStore::new(backend, FAVORITES_COLLECTION)
}

/// Order ledger over `backend`
pub fn ledger_store(backend: Arc<dyn KeyValueStore>) -> CollectionStore<OrderRecord> {
    CollectionStore::new(backend, LEDGER_COLLECTION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryKeyValueStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: u32,
        text: String,
    }

    fn note(id: u32) -> Note {
        Note {
            id,
            text: format!("note {}", id),
        }
    }

    fn notes() -> (Arc<MemoryKeyValueStore>, CollectionStore<Note>) {
        let backend = Arc::new(MemoryKeyValueStore::new());
        let store = CollectionStore::new(backend.clone(), "notes");
        (backend, store)
    }

    /// Backend whose writes always fail
    struct FullDisk;

    impl KeyValueStore for FullDisk {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _payload: &str) -> Result<(), StorageError> {
            Err(StorageError::Io("quota exceeded".to_string()))
        }
    }

    #[test]
    fn empty_when_nothing_stored() {
        let (_, store) = notes();
        assert!(store.read().is_empty());
    }

    #[test]
    fn append_prepends() {
        let (_, store) = notes();
        store.append(note(1)).unwrap();
        let items = store.append(note(2)).unwrap();

        assert_eq!(items, vec![note(2), note(1)]);
        assert_eq!(store.read(), vec![note(2), note(1)]);
    }

    #[test]
    fn remove_where_filters_and_persists() {
        let (_, store) = notes();
        store.write(&[note(3), note(2), note(1)]).unwrap();

        let items = store.remove_where(|n| n.id == 2).unwrap();
        assert_eq!(items, vec![note(3), note(1)]);
        assert_eq!(store.read(), items);
    }

    #[test]
    fn write_of_read_keeps_content() {
        let (backend, store) = notes();
        store.write(&[note(2), note(1)]).unwrap();
        let before = backend.get("notes").unwrap();

        store.write(&store.read()).unwrap();

        assert_eq!(backend.get("notes").unwrap(), before);
        assert_eq!(store.read(), vec![note(2), note(1)]);
    }

    #[test]
    fn invalid_json_reads_empty() {
        let (backend, store) = notes();
        backend.set("notes", "{not json").unwrap();
        assert!(store.read().is_empty());
    }

    #[test]
    fn object_payload_reads_empty() {
        let (backend, store) = notes();
        backend.set("notes", r#"{"id": 1, "text": "x"}"#).unwrap();
        assert!(store.read().is_empty());
    }

    #[test]
    fn bad_record_is_skipped_not_fatal() {
        let (backend, store) = notes();
        backend
            .set("notes", r#"[{"id": 2, "text": "b"}, {"id": "x"}, {"id": 1, "text": "a"}]"#)
            .unwrap();

        let items = store.read();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, 2);
        assert_eq!(items[1].id, 1);
        assert_eq!(store.read_raw().len(), 3);
    }

    #[test]
    fn append_keeps_records_it_cannot_decode() {
        let (backend, store) = notes();
        backend.set("notes", r#"[{"id": 1, "text": "a"}, {"id": "x"}]"#).unwrap();

        let items = store.append(note(2)).unwrap();

        assert_eq!(items, vec![note(2), Note { id: 1, text: "a".to_string() }]);
        let raw = store.read_raw();
        assert_eq!(raw.len(), 3);
        assert_eq!(raw[2], serde_json::json!({"id": "x"}));
    }

    #[test]
    fn remove_where_keeps_records_it_cannot_decode() {
        let (backend, store) = notes();
        backend.set("notes", r#"[{"id": 1, "text": "a"}, {"text": "no id"}]"#).unwrap();

        let items = store.remove_where(|_| true).unwrap();

        assert!(items.is_empty());
        assert_eq!(store.read_raw(), vec![serde_json::json!({"text": "no id"})]);
    }

    #[test]
    fn write_of_read_keeps_unknown_fields_and_bad_records() {
        let (backend, store) = notes();
        let payload = r#"[{"id":2,"text":"b","pinned":true},{"id":"x"},{"id":1,"text":"a"}]"#;
        backend.set("notes", payload).unwrap();

        store.write(&store.read()).unwrap();

        let after: Value = serde_json::from_str(&backend.get("notes").unwrap().unwrap()).unwrap();
        let before: Value = serde_json::from_str(payload).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn write_replaces_decodable_records() {
        let (_, store) = notes();
        store.write(&[note(2), note(1)]).unwrap();
        store.write(&[note(3)]).unwrap();
        assert_eq!(store.read(), vec![note(3)]);
    }

    #[test]
    fn append_over_corrupt_payload_resets() {
        let (backend, store) = notes();
        backend.set("notes", "42").unwrap();

        let items = store.append(note(7)).unwrap();
        assert_eq!(items, vec![note(7)]);
    }

    #[test]
    fn write_failure_is_reported() {
        let store: CollectionStore<Note> = CollectionStore::new(Arc::new(FullDisk), "notes");
        let err = store.append(note(1)).unwrap_err();
        assert_eq!(err, StorageError::Io("quota exceeded".to_string()));
    }

    #[test]
    fn collections_are_isolated() {
        let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        let a: CollectionStore<Note> = CollectionStore::new(backend.clone(), "a");
        let b: CollectionStore<Note> = CollectionStore::new(backend, "b");

        a.append(note(1)).unwrap();
        assert!(b.read().is_empty());
    }
}
