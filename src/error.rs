// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use thiserror::Error;

use crate::labels::SelectorError;
use crate::listers::GroupResource;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the cache and the listers built on it
#[derive(Debug, Error)]
pub enum Error {
    #[error("{resource} \"{name}\" not found")]
    NotFound { resource: GroupResource, name: String },

    #[error("index with name {0} does not exist")]
    IndexNotFound(String),

    #[error("indexer conflict: {0}")]
    IndexerConflict(String),

    #[error("couldn't get key for object: {0}")]
    KeyFunc(String),

    #[error(transparent)]
    Selector(#[from] SelectorError),
}

impl Error {
    pub fn not_found(resource: GroupResource, name: impl Into<String>) -> Self {
        Error::NotFound {
            resource,
            name: name.into(),
        }
    }

    /// True when the error reports a missing object
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
