// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Cache-backed, read-only listers for Calico `HostEndpoint` resources.
//!
//! The typed [`HostEndpointLister`] sits on top of the generic
//! [`listers::ResourceIndexer`], which in turn reads from any
//! [`cache::Indexer`]: either the in-process [`cache::Store`] or a `kube`
//! reflector store wrapped in [`cache::ReflectorIndexer`].

pub mod apis;
pub mod cache;
mod error;
pub mod labels;
pub mod listers;
pub mod manifest;

pub use apis::projectcalico::v3::{HostEndpoint, HostEndpointSpec};
pub use error::{Error, Result};
pub use labels::Selector;
pub use listers::projectcalico::v3::{
    HostEndpointLister, HostEndpointListerExpansion, new_host_endpoint_lister,
};
