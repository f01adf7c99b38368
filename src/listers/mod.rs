// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Typed, read-only listers over an [`Indexer`]
//!
//! [`ResourceIndexer`] implements `list` and `get` once for every resource
//! type; per-resource listers such as
//! [`HostEndpointLister`](projectcalico::v3::HostEndpointLister) are thin
//! wrappers that fix the type and the resource tag.

pub mod projectcalico;

use std::fmt;
use std::sync::Arc;

use kube::{Resource, ResourceExt};
use tracing::trace;

use crate::cache::{Indexer, NAMESPACE_INDEX};
use crate::error::{Error, Result};
use crate::labels::Selector;

/// API group plus resource name, used to tag not-found errors
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupResource {
    pub group: String,
    pub resource: String,
}

impl GroupResource {
    pub fn new(group: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            resource: resource.into(),
        }
    }
}

impl fmt::Display for GroupResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            f.write_str(&self.resource)
        } else {
            write!(f, "{}.{}", self.resource, self.group)
        }
    }
}

/// Generic lister for one resource type
///
/// Objects returned here are shared with the indexer and must be treated as
/// read-only.
pub struct ResourceIndexer<K> {
    indexer: Arc<dyn Indexer<K>>,
    resource: GroupResource,
    namespace: Option<String>,
}

impl<K> Clone for ResourceIndexer<K> {
    fn clone(&self) -> Self {
        Self {
            indexer: Arc::clone(&self.indexer),
            resource: self.resource.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

impl<K: Resource> ResourceIndexer<K> {
    /// Wrap an indexer, tagging errors with `resource`
    pub fn new(indexer: Arc<dyn Indexer<K>>, resource: GroupResource) -> Self {
        Self {
            indexer,
            resource,
            namespace: None,
        }
    }

    /// A view restricted to one namespace
    pub fn by_namespace(&self, namespace: &str) -> Self {
        Self {
            indexer: Arc::clone(&self.indexer),
            resource: self.resource.clone(),
            namespace: Some(namespace.to_string()),
        }
    }

    pub fn resource(&self) -> &GroupResource {
        &self.resource
    }

    pub fn indexer(&self) -> &Arc<dyn Indexer<K>> {
        &self.indexer
    }

    /// All objects whose labels match `selector`
    pub fn list(&self, selector: &Selector) -> Result<Vec<Arc<K>>> {
        let candidates = match self.namespace.as_deref() {
            None => self.indexer.list(),
            Some(ns) if self.indexer.has_index(NAMESPACE_INDEX) => {
                self.indexer.by_index(NAMESPACE_INDEX, ns)?
            }
            Some(ns) => self
                .indexer
                .list()
                .into_iter()
                .filter(|obj| obj.meta().namespace.as_deref() == Some(ns))
                .collect(),
        };

        if selector.is_everything() {
            return Ok(candidates);
        }

        let matched: Vec<Arc<K>> = candidates
            .into_iter()
            .filter(|obj| selector.matches(obj.labels()))
            .collect();

        trace!(
            resource = %self.resource,
            namespace = ?self.namespace,
            selector = %selector,
            matched = matched.len(),
            "Listed from indexer"
        );
        Ok(matched)
    }

    /// The object with the given name, or a not-found error
    pub fn get(&self, name: &str) -> Result<Arc<K>> {
        let key = match self.namespace.as_deref() {
            Some(ns) => format!("{}/{}", ns, name),
            None => name.to_string(),
        };
        self.indexer
            .get_by_key(&key)?
            .ok_or_else(|| Error::not_found(self.resource.clone(), name))
    }
}
