// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use std::sync::Arc;

use crate::apis::projectcalico::v3::{HostEndpoint, resource};
use crate::cache::Indexer;
use crate::error::Result;
use crate::labels::Selector;
use crate::listers::ResourceIndexer;

use super::HostEndpointListerExpansion;

/// Lists HostEndpoints.
/// All objects returned here must be treated as read-only.
pub trait HostEndpointLister: HostEndpointListerExpansion + Send + Sync {
    /// Lists all HostEndpoints in the indexer.
    /// Objects returned here must be treated as read-only.
    fn list(&self, selector: &Selector) -> Result<Vec<Arc<HostEndpoint>>>;

    /// Retrieves the HostEndpoint from the index for a given name.
    /// Objects returned here must be treated as read-only.
    fn get(&self, name: &str) -> Result<Arc<HostEndpoint>>;
}

pub(super) struct HostEndpointListerImpl {
    pub(super) inner: ResourceIndexer<HostEndpoint>,
}

impl HostEndpointLister for HostEndpointListerImpl {
    fn list(&self, selector: &Selector) -> Result<Vec<Arc<HostEndpoint>>> {
        self.inner.list(selector)
    }

    fn get(&self, name: &str) -> Result<Arc<HostEndpoint>> {
        self.inner.get(name)
    }
}

/// Returns a new HostEndpointLister.
pub fn new_host_endpoint_lister(
    indexer: Arc<dyn Indexer<HostEndpoint>>,
) -> Arc<dyn HostEndpointLister> {
    Arc::new(HostEndpointListerImpl {
        inner: ResourceIndexer::new(indexer, resource("hostendpoint")),
    })
}
