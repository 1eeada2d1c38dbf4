//! An in-memory entity store.
//!
//! [`MemoryStore`] gives models an identity: [`MemoryStore::put`] checks
//! required properties, allocates a key on first store and keeps a snapshot of
//! the model's values. It backs tests and demos; there is no persistence.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::error::DbError;
use crate::key::Key;
use crate::model::Model;
use crate::value::ValueMap;

#[derive(Debug, Default)]
struct StoreState {
    entities: HashMap<Key, ValueMap>,
    next_ids: HashMap<&'static str, i64>,
}

/// A thread-safe, in-memory collection of entities.
///
/// # Examples
///
/// ```
/// use formbind_db::store::MemoryStore;
/// # use std::sync::LazyLock;
/// # use formbind_db::{error::DbError, key::Key, model::{Model, ModelMeta}, value::Value};
/// # #[derive(Default)]
/// # struct Note { key: Option<Key> }
/// # impl Model for Note {
/// #     fn meta() -> &'static ModelMeta {
/// #         static META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta::new("Note", vec![]));
/// #         &META
/// #     }
/// #     fn key(&self) -> Option<&Key> { self.key.as_ref() }
/// #     fn set_key(&mut self, key: Key) { self.key = Some(key); }
/// #     fn get(&self, _: &str) -> Option<Value> { None }
/// #     fn set_raw(&mut self, name: &str, _: Value) -> Result<(), DbError> {
/// #         Err(Self::unknown_property(name))
/// #     }
/// # }
///
/// let store = MemoryStore::new();
/// let mut note = Note::default();
/// let key = store.put(&mut note).unwrap();
/// assert_eq!(key.id(), 1);
/// assert_eq!(note.key(), Some(&key));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `model`, assigning it a key if it has none yet.
    pub fn put<M: Model>(&self, model: &mut M) -> Result<Key, DbError> {
        model.check_required()?;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let key = if let Some(key) = model.key() {
            key.clone()
        } else {
            let kind = M::meta().kind;
            let next = state.next_ids.entry(kind).or_insert(0);
            *next += 1;
            let key = Key::new(kind, *next)?;
            model.set_key(key.clone());
            key
        };

        tracing::debug!(%key, "Storing entity");
        state.entities.insert(key.clone(), model.to_dict(None));
        drop(state);
        Ok(key)
    }

    /// Loads the entity stored under `key`.
    pub fn get<M: Model + Default>(&self, key: &Key) -> Result<Option<M>, DbError> {
        let values = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            state.entities.get(key).cloned()
        };
        let Some(values) = values else {
            return Ok(None);
        };
        if key.kind() != M::meta().kind {
            return Err(DbError::InvalidKey(format!(
                "{key} does not belong to {}",
                M::meta().kind
            )));
        }
        let mut model = M::from_values(values)?;
        model.set_key(key.clone());
        Ok(Some(model))
    }

    /// Removes the entity stored under `key`. Returns whether it existed.
    pub fn delete(&self, key: &Key) -> bool {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entities
            .remove(key)
            .is_some()
    }

    /// The number of stored entities.
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entities
            .len()
    }

    /// Returns `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
