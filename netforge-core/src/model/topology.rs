//! Devices, links and the replacement payloads that describe them

use super::project::Project;
use super::types::{DeviceId, LinkId, ProjectId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Open key/value bag attached to a device (layout coordinates, bandwidth, port count...)
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// A device as the client describes it in a replacement request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSpec {
    pub device_type: String,
    pub name: String,
    #[serde(default)]
    pub properties: Properties,

    /// Request-scoped label that link specs use to refer to this device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl DeviceSpec {
    pub fn new(device_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            device_type: device_type.into(),
            name: name.into(),
            properties: Properties::new(),
            client_id: None,
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// A link between two devices of the same request, addressed by client id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpec {
    #[serde(alias = "source_device_client_id")]
    pub source_client_id: String,
    #[serde(alias = "target_device_client_id")]
    pub target_client_id: String,
    #[serde(default)]
    pub source_port: Option<String>,
    #[serde(default)]
    pub target_port: Option<String>,
}

impl LinkSpec {
    pub fn new(source_client_id: impl Into<String>, target_client_id: impl Into<String>) -> Self {
        Self {
            source_client_id: source_client_id.into(),
            target_client_id: target_client_id.into(),
            source_port: None,
            target_port: None,
        }
    }

    pub fn with_ports(mut self, source_port: impl Into<String>, target_port: impl Into<String>) -> Self {
        self.source_port = Some(source_port.into());
        self.target_port = Some(target_port.into());
        self
    }
}

/// Body of a topology replacement request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologySpec {
    #[serde(default)]
    pub devices: Vec<DeviceSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

impl TopologySpec {
    pub fn new(devices: Vec<DeviceSpec>, links: Vec<LinkSpec>) -> Self {
        Self { devices, links }
    }
}

/// A persisted device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub project_id: ProjectId,
    pub device_type: String,
    pub name: String,
    pub properties: Properties,
}

/// A persisted link; both endpoints belong to `project_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub project_id: ProjectId,
    pub source_device_id: DeviceId,
    pub target_device_id: DeviceId,
    pub source_port: Option<String>,
    pub target_port: Option<String>,
}

/// A project's current devices and links
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub devices: Vec<Device>,
    pub links: Vec<Link>,
}

impl Topology {
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.links.is_empty()
    }

    /// Re-express the stored graph as a replacement payload.
    ///
    /// Durable device ids become client ids, so feeding the result back into a
    /// replacement reproduces the same graph under fresh ids.
    pub fn to_spec(&self) -> TopologySpec {
        let devices = self
            .devices
            .iter()
            .map(|device| DeviceSpec {
                device_type: device.device_type.clone(),
                name: device.name.clone(),
                properties: device.properties.clone(),
                client_id: Some(device.id.to_string()),
            })
            .collect();

        let links = self
            .links
            .iter()
            .map(|link| LinkSpec {
                source_client_id: link.source_device_id.to_string(),
                target_client_id: link.target_device_id.to_string(),
                source_port: link.source_port.clone(),
                target_port: link.target_port.clone(),
            })
            .collect();

        TopologySpec { devices, links }
    }
}

/// Result of a successful replacement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacedTopology {
    pub project: Project,
    pub devices: Vec<Device>,
    pub links: Vec<Link>,

    /// Link specs that were dropped because an endpoint did not resolve
    #[serde(skip)]
    pub unresolved_links: Vec<UnresolvedLinkReference>,
}

impl ReplacedTopology {
    pub fn topology(&self) -> Topology {
        Topology {
            devices: self.devices.clone(),
            links: self.links.clone(),
        }
    }
}

/// A link spec whose client ids could not be mapped to devices of the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedLinkReference {
    /// Position of the link spec in the request
    pub index: usize,
    pub source_client_id: String,
    pub target_client_id: String,
    pub source_resolved: bool,
    pub target_resolved: bool,
}

impl fmt::Display for UnresolvedLinkReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let missing: Vec<&str> = [
            (!self.source_resolved).then_some(self.source_client_id.as_str()),
            (!self.target_resolved).then_some(self.target_client_id.as_str()),
        ]
        .into_iter()
        .flatten()
        .collect();

        write!(
            f,
            "link #{} ({} -> {}): unknown client id {}",
            self.index,
            self.source_client_id,
            self.target_client_id,
            missing.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_link_spec_accepts_editor_field_names() {
        let spec: LinkSpec = serde_json::from_value(json!({
            "source_device_client_id": "r1",
            "target_device_client_id": "sw1",
            "source_port": "ge-0/0/1"
        }))
        .unwrap();

        assert_eq!(spec.source_client_id, "r1");
        assert_eq!(spec.target_client_id, "sw1");
        assert_eq!(spec.source_port.as_deref(), Some("ge-0/0/1"));
        assert_eq!(spec.target_port, None);
    }

    #[test]
    fn test_topology_spec_defaults_to_empty() {
        let spec: TopologySpec = serde_json::from_str("{}").unwrap();
        assert!(spec.devices.is_empty());
        assert!(spec.links.is_empty());
    }

    #[test]
    fn test_device_spec_properties_default() {
        let spec: DeviceSpec =
            serde_json::from_value(json!({"device_type": "router", "name": "edge"})).unwrap();
        assert!(spec.properties.is_empty());
        assert_eq!(spec.client_id, None);
    }

    #[test]
    fn test_to_spec_uses_durable_ids_as_client_ids() {
        let topology = Topology {
            devices: vec![
                Device {
                    id: DeviceId(10),
                    project_id: ProjectId(1),
                    device_type: "router".to_string(),
                    name: "r1".to_string(),
                    properties: Properties::new(),
                },
                Device {
                    id: DeviceId(11),
                    project_id: ProjectId(1),
                    device_type: "host".to_string(),
                    name: "h1".to_string(),
                    properties: Properties::new(),
                },
            ],
            links: vec![Link {
                id: LinkId(5),
                project_id: ProjectId(1),
                source_device_id: DeviceId(10),
                target_device_id: DeviceId(11),
                source_port: Some("eth0".to_string()),
                target_port: None,
            }],
        };

        let spec = topology.to_spec();
        assert_eq!(spec.devices[0].client_id.as_deref(), Some("10"));
        assert_eq!(spec.devices[1].client_id.as_deref(), Some("11"));
        assert_eq!(spec.links[0].source_client_id, "10");
        assert_eq!(spec.links[0].target_client_id, "11");
        assert_eq!(spec.links[0].source_port.as_deref(), Some("eth0"));
    }

    #[test]
    fn test_unresolved_reference_display_names_missing_ids() {
        let reference = UnresolvedLinkReference {
            index: 2,
            source_client_id: "a".to_string(),
            target_client_id: "ghost".to_string(),
            source_resolved: true,
            target_resolved: false,
        };
        assert_eq!(reference.to_string(), "link #2 (a -> ghost): unknown client id ghost");
    }

    #[test]
    fn test_replaced_topology_does_not_serialize_dropped_links() {
        let replaced = ReplacedTopology {
            project: Project {
                id: ProjectId(1),
                owner_id: crate::model::UserId(1),
                name: "lab".to_string(),
                description: None,
                last_modified: crate::model::Timestamp(1),
            },
            devices: vec![],
            links: vec![],
            unresolved_links: vec![UnresolvedLinkReference {
                index: 0,
                source_client_id: "a".to_string(),
                target_client_id: "b".to_string(),
                source_resolved: false,
                target_resolved: false,
            }],
        };

        let json = serde_json::to_value(&replaced).unwrap();
        assert!(json.get("unresolved_links").is_none());
        assert_eq!(json["project"]["name"], "lab");
    }
}
