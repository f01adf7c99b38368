// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Listers for the `projectcalico.org/v3` API group

mod expansion;
mod hostendpoint;

pub use expansion::{
    HOST_ENDPOINT_NODE_INDEX, HostEndpointListerExpansion, host_endpoint_indexers,
    host_endpoint_node_index_func,
};
pub use hostendpoint::{HostEndpointLister, new_host_endpoint_lister};
