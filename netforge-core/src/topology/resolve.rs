//! Client-id resolution
//!
//! Replacement payloads refer to devices by caller-chosen strings. Once the
//! devices are inserted, those strings are bound to durable ids here and the
//! links are resolved against the finished map.

use crate::model::{DeviceId, LinkSpec, UnresolvedLinkReference};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// What to do with a link whose endpoints do not both resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPolicy {
    /// Drop the link, log it, keep going
    #[default]
    Lenient,
    /// Reject the whole replacement
    Strict,
}

impl LinkPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkPolicy::Lenient => "lenient",
            LinkPolicy::Strict => "strict",
        }
    }
}

impl fmt::Display for LinkPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(LinkPolicy::Lenient),
            "strict" => Ok(LinkPolicy::Strict),
            other => Err(format!("unknown link policy '{other}' (expected lenient or strict)")),
        }
    }
}

/// `client_id -> durable id` for one replacement request
#[derive(Debug, Default)]
pub struct ClientIdMap {
    ids: HashMap<String, DeviceId>,
}

impl ClientIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `client_id` to `device_id`; later bindings win.
    ///
    /// Returns the id that was shadowed, if any.
    pub fn bind(&mut self, client_id: impl Into<String>, device_id: DeviceId) -> Option<DeviceId> {
        self.ids.insert(client_id.into(), device_id)
    }

    pub fn get(&self, client_id: &str) -> Option<DeviceId> {
        self.ids.get(client_id).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Resolve both endpoints of the `index`-th link
    pub fn resolve(
        &self,
        index: usize,
        link: &LinkSpec,
    ) -> Result<(DeviceId, DeviceId), UnresolvedLinkReference> {
        let source = self.get(&link.source_client_id);
        let target = self.get(&link.target_client_id);

        match (source, target) {
            (Some(source), Some(target)) => Ok((source, target)),
            _ => Err(UnresolvedLinkReference {
                index,
                source_client_id: link.source_client_id.clone(),
                target_client_id: link.target_client_id.clone(),
                source_resolved: source.is_some(),
                target_resolved: target.is_some(),
            }),
        }
    }
}
