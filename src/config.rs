use crate::network::NetworkError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

// -----------------------------------------------------------------------------
// Topology document
// -----------------------------------------------------------------------------

/// Declarative topology description consumed by `Network::create_from_config`.
///
/// The document lists node declarations and undirected weighted links:
///
/// ```json
/// {
///   "nodes": [ { "name": "Node A" }, { "name": "Node B" } ],
///   "links": [ ["Node A", "Node B", 25] ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub nodes: Vec<NodeDecl>,
    #[serde(default)]
    pub links: Vec<LinkDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDecl {
    pub name: String,
}

/// One undirected link, declared as `[name_a, name_b, latency]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkDecl(pub String, pub String, pub f64);

impl TopologyConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(&path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

// -----------------------------------------------------------------------------
// ConfigError — fatal at startup, never silently dropped
// -----------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    /// A link names a node that was never declared.
    UnknownNode(String),
    /// Latency weights must be non-negative.
    InvalidLatency { link: String, latency: f64 },
    Network(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read topology: {}", e),
            ConfigError::Parse(e) => write!(f, "malformed topology document: {}", e),
            ConfigError::UnknownNode(name) => {
                write!(f, "link references undeclared node '{}'", name)
            }
            ConfigError::InvalidLatency { link, latency } => {
                write!(f, "link {} has negative latency {}", link, latency)
            }
            ConfigError::Network(e) => write!(f, "{}", e),
        }
    }
}

impl From<NetworkError> for ConfigError {
    fn from(e: NetworkError) -> Self {
        ConfigError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let raw = r#"{
            "nodes": [ { "name": "Node A" }, { "name": "Node B" } ],
            "links": [ ["Node A", "Node B", 25] ]
        }"#;
        let topology = TopologyConfig::from_json(raw).unwrap();
        assert_eq!(topology.nodes.len(), 2);
        assert_eq!(topology.links.len(), 1);
        let LinkDecl(a, b, latency) = &topology.links[0];
        assert_eq!(a, "Node A");
        assert_eq!(b, "Node B");
        assert_eq!(*latency, 25.0);
    }

    #[test]
    fn test_links_are_optional() {
        let topology = TopologyConfig::from_json(r#"{ "nodes": [ { "name": "Lone" } ] }"#).unwrap();
        assert_eq!(topology.nodes.len(), 1);
        assert!(topology.links.is_empty());
    }

    #[test]
    fn test_malformed_document_is_a_parse_error() {
        let err = TopologyConfig::from_json("{ not json }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = TopologyConfig::load("definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
