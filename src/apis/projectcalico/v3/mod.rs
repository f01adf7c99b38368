// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! `projectcalico.org/v3` API group

mod hostendpoint;

pub use hostendpoint::{EndpointPort, HostEndpoint, HostEndpointSpec, Protocol};

use crate::listers::GroupResource;

/// API group name
pub const GROUP_NAME: &str = "projectcalico.org";

/// API version within the group
pub const VERSION: &str = "v3";

/// Tag a resource name with this API group
pub fn resource(resource: &str) -> GroupResource {
    GroupResource::new(GROUP_NAME, resource)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource() {
        let gr = resource("hostendpoint");
        assert_eq!(gr.group, "projectcalico.org");
        assert_eq!(gr.resource, "hostendpoint");
        assert_eq!(gr.to_string(), "hostendpoint.projectcalico.org");
    }
}
