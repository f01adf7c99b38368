// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Hand-written additions to the generated listers

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::apis::projectcalico::v3::HostEndpoint;
use crate::cache::Indexers;
use crate::error::Result;

use super::hostendpoint::HostEndpointListerImpl;

/// Index of host endpoints by `spec.node`
pub const HOST_ENDPOINT_NODE_INDEX: &str = "node";

/// Index function for [`HOST_ENDPOINT_NODE_INDEX`]
pub fn host_endpoint_node_index_func(hep: &HostEndpoint) -> Result<Vec<String>> {
    Ok(vec![hep.spec.node.clone()])
}

/// Indexers worth registering on a HostEndpoint store
pub fn host_endpoint_indexers() -> Indexers<HostEndpoint> {
    let mut indexers: Indexers<HostEndpoint> = HashMap::new();
    indexers.insert(
        HOST_ENDPOINT_NODE_INDEX.to_string(),
        Arc::new(host_endpoint_node_index_func),
    );
    indexers
}

/// Extra methods on [`HostEndpointLister`](super::HostEndpointLister)
pub trait HostEndpointListerExpansion {
    /// Host endpoints whose `spec.node` is `node`.
    /// Objects returned here must be treated as read-only.
    fn list_by_node(&self, node: &str) -> Result<Vec<Arc<HostEndpoint>>>;
}

impl HostEndpointListerExpansion for HostEndpointListerImpl {
    fn list_by_node(&self, node: &str) -> Result<Vec<Arc<HostEndpoint>>> {
        let indexer = self.inner.indexer();
        if indexer.has_index(HOST_ENDPOINT_NODE_INDEX) {
            return indexer.by_index(HOST_ENDPOINT_NODE_INDEX, node);
        }

        debug!(node = %node, "No node index registered, scanning");
        Ok(indexer
            .list()
            .into_iter()
            .filter(|hep| hep.spec.node == node)
            .collect())
    }
}
