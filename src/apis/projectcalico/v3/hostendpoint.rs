// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! The `HostEndpoint` resource
//!
//! A host endpoint represents one or more network interfaces of a host that
//! Calico policy applies to. It is cluster scoped.

use std::fmt;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "projectcalico.org",
    version = "v3",
    kind = "HostEndpoint",
    plural = "hostendpoints"
)]
#[serde(rename_all = "camelCase")]
pub struct HostEndpointSpec {
    /// Name of the node the endpoint lives on
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub node: String,

    /// Interface the endpoint is attached to; empty or `*` for all interfaces
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub interface_name: String,

    /// IP addresses expected on the interface
    #[serde(
        default,
        rename = "expectedIPs",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub expected_ips: Vec<String>,

    /// Profiles applied to the endpoint
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<String>,

    /// Named ports that policy can reference
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<EndpointPort>,
}

/// A named port on a host endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EndpointPort {
    pub name: String,
    pub protocol: Protocol,
    pub port: u16,
}

/// IP protocol, by name (`TCP`, `UDP`, `SCTP`, ...) or by number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Protocol {
    Number(u8),
    Name(String),
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Number(n) => write!(f, "{}", n),
            Protocol::Name(name) => f.write_str(name),
        }
    }
}
