// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Thread-safe object store with named secondary indices
//!
//! Items are held as `Arc<K>` in a map ordered by key, so listings come back
//! sorted. Each registered index maps an index value to the set of keys whose
//! objects produced that value, and is kept up to date on every mutation.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use kube::Resource;
use parking_lot::RwLock;
use tracing::{debug, trace};

use super::{IndexFunc, Indexer, Indexers, KeyFunc, meta_namespace_key};
use crate::error::{Error, Result};

/// Index value -> keys of the objects carrying it
type Index = HashMap<String, BTreeSet<String>>;

struct Inner<K> {
    items: BTreeMap<String, Arc<K>>,
    indexers: Indexers<K>,
    indices: HashMap<String, Index>,
}

impl<K> Inner<K> {
    /// Run every index function over an object
    fn index_values(&self, obj: &K) -> Result<HashMap<String, Vec<String>>> {
        self.indexers
            .iter()
            .map(|(name, func)| Ok((name.clone(), func(obj)?)))
            .collect()
    }

    fn unindex(&mut self, key: &str, values: &HashMap<String, Vec<String>>) {
        for (name, index_values) in values {
            let Some(index) = self.indices.get_mut(name) else {
                continue;
            };
            for value in index_values {
                if let Some(keys) = index.get_mut(value) {
                    keys.remove(key);
                    if keys.is_empty() {
                        index.remove(value);
                    }
                }
            }
        }
    }

    fn index(&mut self, key: &str, values: HashMap<String, Vec<String>>) {
        for (name, index_values) in values {
            let index = self.indices.entry(name).or_default();
            for value in index_values {
                index.entry(value).or_default().insert(key.to_string());
            }
        }
    }

    fn put(&mut self, key: String, obj: Arc<K>) -> Result<()> {
        // Compute everything fallible before touching state
        let new_values = self.index_values(&obj)?;
        let old_values = match self.items.get(&key) {
            Some(old) => Some(self.index_values(old)?),
            None => None,
        };

        if let Some(old_values) = old_values {
            self.unindex(&key, &old_values);
        }
        self.index(&key, new_values);
        self.items.insert(key, obj);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let Some(old) = self.items.get(key) else {
            return Ok(());
        };
        let old_values = self.index_values(old)?;
        self.unindex(key, &old_values);
        self.items.remove(key);
        Ok(())
    }

    fn objects_for_keys<'a>(&self, keys: impl IntoIterator<Item = &'a String>) -> Vec<Arc<K>> {
        keys.into_iter()
            .filter_map(|key| self.items.get(key).cloned())
            .collect()
    }
}

/// In-process indexed cache
pub struct Store<K> {
    inner: RwLock<Inner<K>>,
    key_func: KeyFunc<K>,
}

impl<K: Resource + 'static> Store<K> {
    /// Create an empty store keyed by `namespace/name`
    pub fn new() -> Self {
        Self::with_key_func(Arc::new(|obj: &K| meta_namespace_key(obj)))
    }

    /// Create an empty store keyed by `namespace/name` with the given indexers
    pub fn with_indexers(indexers: Indexers<K>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.write();
            inner.indices = indexers.keys().map(|n| (n.clone(), Index::new())).collect();
            inner.indexers = indexers;
        }
        store
    }
}

impl<K: Resource + 'static> Default for Store<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Store<K> {
    /// Create an empty store with a custom key function
    pub fn with_key_func(key_func: KeyFunc<K>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                items: BTreeMap::new(),
                indexers: HashMap::new(),
                indices: HashMap::new(),
            }),
            key_func,
        }
    }

    /// Register additional indexers and index the objects already stored
    ///
    /// Fails without registering anything if a name is already taken.
    pub fn add_indexers(&self, new_indexers: Indexers<K>) -> Result<()> {
        let mut inner = self.inner.write();

        let mut conflicts: Vec<&str> = new_indexers
            .keys()
            .filter(|name| inner.indexers.contains_key(*name))
            .map(String::as_str)
            .collect();
        if !conflicts.is_empty() {
            conflicts.sort_unstable();
            return Err(Error::IndexerConflict(format!(
                "indexer(s) already registered: {}",
                conflicts.join(", ")
            )));
        }

        let mut built: HashMap<String, Index> = HashMap::new();
        for (name, func) in &new_indexers {
            let index = built.entry(name.clone()).or_default();
            for (key, obj) in &inner.items {
                for value in func(obj.as_ref())? {
                    index.entry(value).or_default().insert(key.clone());
                }
            }
        }

        debug!(
            indexers = ?new_indexers.keys().collect::<Vec<_>>(),
            items = inner.items.len(),
            "Registered indexers"
        );

        inner.indices.extend(built);
        inner.indexers.extend(new_indexers);
        Ok(())
    }

    /// Insert or replace an object
    pub fn add(&self, obj: K) -> Result<()> {
        let key = (self.key_func)(&obj)?;
        trace!(key = %key, "Store add");
        self.inner.write().put(key, Arc::new(obj))
    }

    /// Same as [`Store::add`]
    pub fn update(&self, obj: K) -> Result<()> {
        self.add(obj)
    }

    /// Remove an object; removing an absent object is not an error
    pub fn delete(&self, obj: &K) -> Result<()> {
        let key = (self.key_func)(obj)?;
        trace!(key = %key, "Store delete");
        self.inner.write().remove(&key)
    }

    /// Remove an object by key
    pub fn delete_by_key(&self, key: &str) -> Result<()> {
        self.inner.write().remove(key)
    }

    /// Replace the whole content of the store
    ///
    /// All keys and index values are computed before the swap, so a failing
    /// object leaves the previous content in place.
    pub fn replace(&self, objects: Vec<K>) -> Result<()> {
        let mut items = BTreeMap::new();
        for obj in objects {
            let key = (self.key_func)(&obj)?;
            items.insert(key, Arc::new(obj));
        }

        let mut inner = self.inner.write();
        let mut indices: HashMap<String, Index> = inner
            .indexers
            .keys()
            .map(|name| (name.clone(), Index::new()))
            .collect();
        for (key, obj) in &items {
            for (name, values) in inner.index_values(obj)? {
                let index = indices.entry(name).or_default();
                for value in values {
                    index.entry(value).or_default().insert(key.clone());
                }
            }
        }

        debug!(items = items.len(), "Store replaced");
        inner.items = items;
        inner.indices = indices;
        Ok(())
    }

    /// Look up the stored version of an object
    pub fn get(&self, obj: &K) -> Result<Option<Arc<K>>> {
        let key = (self.key_func)(obj)?;
        Ok(self.inner.read().items.get(&key).cloned())
    }

    /// Objects sharing at least one index value with `obj` in the named index
    pub fn index(&self, index_name: &str, obj: &K) -> Result<Vec<Arc<K>>> {
        let inner = self.inner.read();
        let func: &IndexFunc<K> = inner
            .indexers
            .get(index_name)
            .ok_or_else(|| Error::IndexNotFound(index_name.to_string()))?;
        let values = func(obj)?;
        let Some(index) = inner.indices.get(index_name) else {
            return Ok(Vec::new());
        };
        let keys: BTreeSet<&String> = values
            .iter()
            .filter_map(|value| index.get(value))
            .flatten()
            .collect();
        Ok(inner.objects_for_keys(keys))
    }

    pub fn len(&self) -> usize {
        self.inner.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().items.is_empty()
    }
}

impl<K: Send + Sync> Indexer<K> for Store<K> {
    fn list(&self) -> Vec<Arc<K>> {
        self.inner.read().items.values().cloned().collect()
    }

    fn list_keys(&self) -> Vec<String> {
        self.inner.read().items.keys().cloned().collect()
    }

    fn get_by_key(&self, key: &str) -> Result<Option<Arc<K>>> {
        Ok(self.inner.read().items.get(key).cloned())
    }

    fn has_index(&self, index_name: &str) -> bool {
        self.inner.read().indexers.contains_key(index_name)
    }

    fn by_index(&self, index_name: &str, indexed_value: &str) -> Result<Vec<Arc<K>>> {
        let inner = self.inner.read();
        if !inner.indexers.contains_key(index_name) {
            return Err(Error::IndexNotFound(index_name.to_string()));
        }
        let keys = inner
            .indices
            .get(index_name)
            .and_then(|index| index.get(indexed_value));
        Ok(keys
            .map(|keys| inner.objects_for_keys(keys))
            .unwrap_or_default())
    }

    fn index_keys(&self, index_name: &str, indexed_value: &str) -> Result<Vec<String>> {
        let inner = self.inner.read();
        if !inner.indexers.contains_key(index_name) {
            return Err(Error::IndexNotFound(index_name.to_string()));
        }
        Ok(inner
            .indices
            .get(index_name)
            .and_then(|index| index.get(indexed_value))
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn list_index_func_values(&self, index_name: &str) -> Vec<String> {
        let inner = self.inner.read();
        let mut values: Vec<String> = inner
            .indices
            .get(index_name)
            .map(|index| index.keys().cloned().collect())
            .unwrap_or_default();
        values.sort_unstable();
        values
    }
}
