// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! [`Indexer`] view over a `kube` runtime reflector store
//!
//! The reflector is driven elsewhere (by a watcher stream the caller owns);
//! this adapter only reads from it. Reflector stores carry no secondary
//! indices, so index lookups report [`Error::IndexNotFound`].

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use kube::Resource;
use kube::runtime::reflector::{ObjectRef, Store as ReflectorStore};
use tracing::trace;

use super::{Indexer, meta_namespace_key, split_meta_namespace_key};
use crate::error::{Error, Result};

/// Read-only indexer backed by a reflector [`kube::runtime::reflector::Store`]
#[derive(Clone)]
pub struct ReflectorIndexer<K>
where
    K: Resource + 'static,
    K::DynamicType: Eq + Hash + Clone,
{
    store: ReflectorStore<K>,
}

impl<K> ReflectorIndexer<K>
where
    K: Resource + 'static,
    K::DynamicType: Eq + Hash + Clone,
{
    pub fn new(store: ReflectorStore<K>) -> Self {
        Self { store }
    }
}

impl<K> Indexer<K> for ReflectorIndexer<K>
where
    K: Resource + Clone + Debug + Send + Sync + 'static,
    K::DynamicType: Eq + Hash + Clone + Default + Send + Sync,
{
    fn list(&self) -> Vec<Arc<K>> {
        let mut objects = self.store.state();
        objects.sort_by_cached_key(|obj| meta_namespace_key(obj.as_ref()).unwrap_or_default());
        objects
    }

    fn list_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .store
            .state()
            .iter()
            .filter_map(|obj| meta_namespace_key(obj.as_ref()).ok())
            .collect();
        keys.sort_unstable();
        keys
    }

    fn get_by_key(&self, key: &str) -> Result<Option<Arc<K>>> {
        let (namespace, name) = split_meta_namespace_key(key)?;
        let mut obj_ref = ObjectRef::<K>::new(name);
        if let Some(ns) = namespace {
            obj_ref = obj_ref.within(ns);
        }
        trace!(key = %key, "Reflector lookup");
        Ok(self.store.get(&obj_ref))
    }

    fn has_index(&self, _index_name: &str) -> bool {
        false
    }

    fn by_index(&self, index_name: &str, _indexed_value: &str) -> Result<Vec<Arc<K>>> {
        Err(Error::IndexNotFound(index_name.to_string()))
    }

    fn index_keys(&self, index_name: &str, _indexed_value: &str) -> Result<Vec<String>> {
        Err(Error::IndexNotFound(index_name.to_string()))
    }

    fn list_index_func_values(&self, _index_name: &str) -> Vec<String> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::ConfigMap;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use kube::runtime::reflector::store::Writer;
    use kube::runtime::watcher;

    fn config_map(namespace: &str, name: &str) -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn indexer_with(objects: Vec<ConfigMap>) -> ReflectorIndexer<ConfigMap> {
        let mut writer: Writer<ConfigMap> = Writer::default();
        for obj in objects {
            writer.apply_watcher_event(&watcher::Event::Apply(obj));
        }
        ReflectorIndexer::new(writer.as_reader())
    }

    #[test]
    fn test_reflector_list_and_get() {
        let indexer = indexer_with(vec![
            config_map("kube-system", "b"),
            config_map("default", "a"),
        ]);

        assert_eq!(indexer.list_keys(), vec!["default/a", "kube-system/b"]);
        let listed: Vec<_> = indexer
            .list()
            .iter()
            .map(|o| o.metadata.name.clone().unwrap_or_default())
            .collect();
        assert_eq!(listed, vec!["a", "b"]);

        let got = indexer.get_by_key("default/a").unwrap();
        assert_eq!(got.unwrap().metadata.name.as_deref(), Some("a"));
        assert!(indexer.get_by_key("kube-system/a").unwrap().is_none());
        assert!(indexer.get_by_key("a/b/c").is_err());
    }

    #[test]
    fn test_reflector_has_no_indices() {
        let indexer = indexer_with(vec![config_map("default", "a")]);
        assert!(!indexer.has_index("namespace"));
        assert!(matches!(
            indexer.by_index("namespace", "default"),
            Err(Error::IndexNotFound(_))
        ));
        assert!(indexer.index_keys("namespace", "default").is_err());
        assert!(indexer.list_index_func_values("namespace").is_empty());
    }
}
