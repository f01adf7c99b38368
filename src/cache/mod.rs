// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Indexed object caches
//!
//! [`Indexer`] is the read interface listers are built on. Two
//! implementations are provided:
//! - [`Store`]: an in-process, thread-safe store with named secondary indices
//! - [`ReflectorIndexer`]: a view over a `kube` runtime reflector store
//!
//! Objects are keyed by `namespace/name`, or just `name` for cluster-scoped
//! resources.

mod reflector;
mod store;

use std::collections::HashMap;
use std::sync::Arc;

use kube::Resource;

use crate::error::{Error, Result};

pub use reflector::ReflectorIndexer;
pub use store::Store;

/// Name of the index that groups objects by namespace
pub const NAMESPACE_INDEX: &str = "namespace";

/// Computes the key an object is stored under
pub type KeyFunc<K> = Arc<dyn Fn(&K) -> Result<String> + Send + Sync>;

/// Computes the values an object is indexed under for one index
pub type IndexFunc<K> = Arc<dyn Fn(&K) -> Result<Vec<String>> + Send + Sync>;

/// Index name -> index function
pub type Indexers<K> = HashMap<String, IndexFunc<K>>;

/// Read access to an indexed cache of objects
///
/// Returned objects are shared with the cache and must be treated as read-only.
pub trait Indexer<K>: Send + Sync {
    /// All cached objects
    fn list(&self) -> Vec<Arc<K>>;

    /// Keys of all cached objects
    fn list_keys(&self) -> Vec<String>;

    /// Look up an object by its key
    fn get_by_key(&self, key: &str) -> Result<Option<Arc<K>>>;

    /// Whether an index with this name is registered
    fn has_index(&self, index_name: &str) -> bool;

    /// Objects whose index function produced `indexed_value` for the named index
    fn by_index(&self, index_name: &str, indexed_value: &str) -> Result<Vec<Arc<K>>>;

    /// Keys of the objects returned by [`Indexer::by_index`]
    fn index_keys(&self, index_name: &str, indexed_value: &str) -> Result<Vec<String>>;

    /// All values currently present in the named index
    fn list_index_func_values(&self, index_name: &str) -> Vec<String>;
}

/// Key an object by `namespace/name`, or `name` when it has no namespace
pub fn meta_namespace_key<K: Resource>(obj: &K) -> Result<String> {
    let meta = obj.meta();
    let name = meta
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::KeyFunc("object has no name".to_string()))?;
    match meta.namespace.as_deref() {
        Some(ns) if !ns.is_empty() => Ok(format!("{}/{}", ns, name)),
        _ => Ok(name.to_string()),
    }
}

/// Split a key produced by [`meta_namespace_key`] into namespace and name
pub fn split_meta_namespace_key(key: &str) -> Result<(Option<&str>, &str)> {
    let mut parts = key.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), None, None) => Ok((None, name)),
        (Some(ns), Some(name), None) => Ok((Some(ns).filter(|ns| !ns.is_empty()), name)),
        _ => Err(Error::KeyFunc(format!("unexpected key format: {:?}", key))),
    }
}

/// Index objects by namespace; cluster-scoped objects index under ""
pub fn namespace_index_func<K: Resource>(obj: &K) -> Result<Vec<String>> {
    Ok(vec![obj.meta().namespace.clone().unwrap_or_default()])
}

/// The default indexers: just the namespace index
pub fn namespace_indexers<K: Resource + 'static>() -> Indexers<K> {
    let mut indexers: Indexers<K> = HashMap::new();
    indexers.insert(
        NAMESPACE_INDEX.to_string(),
        Arc::new(|obj: &K| namespace_index_func(obj)),
    );
    indexers
}
