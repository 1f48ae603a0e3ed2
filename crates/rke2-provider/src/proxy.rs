//! Proxy environment derivation
//!
//! When a node sits behind an HTTP(S) proxy, RKE2 and containerd need the
//! proxy variables plus a `NO_PROXY` list that keeps cluster-internal
//! traffic direct: pod and service ranges, the node's own subnet and the
//! in-cluster DNS suffixes. Each variable is mirrored with a `CONTAINERD_`
//! prefix for the embedded containerd.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::constants::K8S_NO_PROXY;
use crate::network::InterfaceProbe;
use crate::{Error, Result};

pub const HTTP_PROXY: &str = "HTTP_PROXY";
pub const HTTPS_PROXY: &str = "HTTPS_PROXY";
pub const NO_PROXY: &str = "NO_PROXY";

const CONTAINERD_PREFIX: &str = "CONTAINERD_";
const CLUSTER_CIDR: &str = "cluster-cidr";
const SERVICE_CIDR: &str = "service-cidr";

/// Resolved proxy variables for a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxySettings {
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    pub no_proxy: Option<String>,
}

impl ProxySettings {
    /// Derive settings from the user's options (canonical JSON) and the
    /// cluster environment.
    ///
    /// The default allowlist is only computed when an HTTP or HTTPS proxy is
    /// set; a user-supplied `NO_PROXY` is always appended.
    pub fn derive(
        user_options_json: &str,
        env: &BTreeMap<String, String>,
        probe: &dyn InterfaceProbe,
    ) -> Self {
        let http_proxy = non_empty(env.get(HTTP_PROXY));
        let https_proxy = non_empty(env.get(HTTPS_PROXY));
        let user_no_proxy = non_empty(env.get(NO_PROXY));

        let mut no_proxy = Vec::new();
        if http_proxy.is_some() || https_proxy.is_some() {
            no_proxy.push(default_no_proxy(user_options_json, probe));
        }
        no_proxy.extend(user_no_proxy);

        Self {
            http_proxy,
            https_proxy,
            no_proxy: non_empty(Some(&join_segments(no_proxy))),
        }
    }

    pub fn is_proxy_configured(&self) -> bool {
        self.http_proxy.is_some() || self.https_proxy.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.http_proxy.is_none() && self.https_proxy.is_none() && self.no_proxy.is_none()
    }

    /// `KEY=value` lines, each followed by its `CONTAINERD_` mirror.
    pub fn to_env_file(&self) -> String {
        let vars = [
            (HTTP_PROXY, &self.http_proxy),
            (HTTPS_PROXY, &self.https_proxy),
            (NO_PROXY, &self.no_proxy),
        ];

        let mut lines = Vec::new();
        for (key, value) in vars {
            if let Some(value) = value {
                lines.push(format!("{key}={value}"));
                lines.push(format!("{CONTAINERD_PREFIX}{key}={value}"));
            }
        }
        lines.join("\n")
    }
}

/// Environment file content for the node's service, empty when no proxy
/// variable is configured.
pub fn compute_proxy_env(
    user_options_json: &str,
    env: &BTreeMap<String, String>,
    probe: &dyn InterfaceProbe,
) -> String {
    ProxySettings::derive(user_options_json, env, probe).to_env_file()
}

/// Cluster CIDR, service CIDR, node CIDR and in-cluster suffixes,
/// comma-joined.
///
/// Unparseable options or non-string CIDR fields are logged and contribute
/// nothing; the node subnet and suffixes are still included. Options that
/// are JSON `null` yield no defaults at all.
pub fn default_no_proxy(user_options_json: &str, probe: &dyn InterfaceProbe) -> String {
    let mut segments = Vec::new();

    match parse_options(user_options_json) {
        Ok(None) => {
            tracing::debug!("User options are null, no default NO_PROXY");
            return String::new();
        }
        Ok(Some(options)) => {
            for field in [CLUSTER_CIDR, SERVICE_CIDR] {
                match string_option(&options, field) {
                    Ok(Some(cidr)) => segments.push(cidr),
                    Ok(None) => {}
                    Err(e) => tracing::warn!(error = %e, "Ignoring cluster option"),
                }
            }
        }
        Err(e) => tracing::warn!(error = %e, "Error while parsing user options"),
    }

    segments.extend(probe.node_cidr());
    segments.push(K8S_NO_PROXY.to_string());

    join_segments(segments)
}

fn parse_options(user_options_json: &str) -> Result<Option<serde_json::Map<String, Value>>> {
    match serde_json::from_str::<Value>(user_options_json) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(Value::Null) => Ok(None),
        Ok(other) => Err(Error::InvalidOptions {
            message: format!("expected an object, found {other}"),
        }),
        Err(e) => Err(Error::InvalidOptions {
            message: e.to_string(),
        }),
    }
}

fn string_option(options: &serde_json::Map<String, Value>, field: &str) -> Result<Option<String>> {
    match options.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(non_empty(Some(s))),
        Some(other) => Err(Error::InvalidOptionField {
            field: field.to_string(),
            found: other.to_string(),
        }),
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

fn join_segments(segments: Vec<String>) -> String {
    segments
        .iter()
        .flat_map(|s| s.split(','))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}
