//! Resource identifiers and kind classification.
//!
//! Every inventory entity is addressed by its Redfish-style URI, e.g.
//! `/redfish/v1/Systems/1/Processors/2`. The kind of resource an identifier
//! points at is derived from the last collection segment of its path.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// URI identifying a single inventory resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier without any `#` fragment.
    pub fn resource_path(&self) -> &str {
        self.0.split('#').next().unwrap_or_default()
    }

    /// Classify this identifier by its collection segment.
    pub fn kind(&self) -> Result<ResourceKind, ResourceError> {
        ResourceKind::classify(&self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

impl From<String> for ResourceId {
    fn from(uri: String) -> Self {
        Self(uri)
    }
}

/// Kind of inventory resource, keyed by its Redfish collection name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    ComputerSystem,
    Processor,
    Memory,
    EthernetInterface,
    SimpleStorage,
    Storage,
    Drive,
    Chassis,
    Switch,
    Port,
    Endpoint,
    Volume,
    StoragePool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceError {
    #[error("unrecognized resource collection in: {0}")]
    UnknownCollection(String),
    #[error("invalid resource URI: {0}")]
    InvalidUri(String),
}

impl ResourceKind {
    /// Collection segment that precedes a member id of this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::ComputerSystem => "Systems",
            ResourceKind::Processor => "Processors",
            ResourceKind::Memory => "Memory",
            ResourceKind::EthernetInterface => "EthernetInterfaces",
            ResourceKind::SimpleStorage => "SimpleStorage",
            ResourceKind::Storage => "Storage",
            ResourceKind::Drive => "Drives",
            ResourceKind::Chassis => "Chassis",
            ResourceKind::Switch => "Switches",
            ResourceKind::Port => "Ports",
            ResourceKind::Endpoint => "Endpoints",
            ResourceKind::Volume => "Volumes",
            ResourceKind::StoragePool => "StoragePools",
        }
    }

    fn from_collection(segment: &str) -> Option<Self> {
        Some(match segment {
            "Systems" => ResourceKind::ComputerSystem,
            "Processors" => ResourceKind::Processor,
            "Memory" => ResourceKind::Memory,
            "EthernetInterfaces" => ResourceKind::EthernetInterface,
            "SimpleStorage" => ResourceKind::SimpleStorage,
            "Storage" => ResourceKind::Storage,
            "Drives" => ResourceKind::Drive,
            "Chassis" => ResourceKind::Chassis,
            "Switches" => ResourceKind::Switch,
            "Ports" => ResourceKind::Port,
            "Endpoints" => ResourceKind::Endpoint,
            "Volumes" => ResourceKind::Volume,
            "StoragePools" => ResourceKind::StoragePool,
            _ => return None,
        })
    }

    /// Classify a URI by the collection segment directly preceding its
    /// final member id. Whole segments are compared, so
    /// `/Chassis/MemoryRack/Drives/1` is a drive, not memory. A JSON-pointer
    /// fragment addresses a part of the resource and is ignored.
    pub fn classify(uri: &str) -> Result<Self, ResourceError> {
        let path = uri.split('#').next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        if !trimmed.starts_with('/') {
            return Err(ResourceError::InvalidUri(uri.to_string()));
        }
        let mut segments = trimmed.rsplit('/');
        let _member = segments
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ResourceError::InvalidUri(uri.to_string()))?;
        let collection = segments
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ResourceError::InvalidUri(uri.to_string()))?;
        Self::from_collection(collection)
            .ok_or_else(|| ResourceError::UnknownCollection(uri.to_string()))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}
