use crate::config::{ConfigError, LinkDecl, TopologyConfig};
use crate::node::{Message, Node, NodeId};
use crate::reporter::Reporter;
use crate::routing::{self, Route};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

// -----------------------------------------------------------------------------
// NetworkError — precondition violations, rejected explicitly
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// A node with this id is already registered; re-registration would
    /// silently mask bugs, so it is rejected instead.
    DuplicateNode(NodeId),
    UnknownNode(NodeId),
    /// Latency weights must be non-negative.
    InvalidLatency(f64),
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::DuplicateNode(id) => write!(f, "node '{}' is already registered", id),
            NetworkError::UnknownNode(id) => write!(f, "unknown node '{}'", id),
            NetworkError::InvalidLatency(latency) => {
                write!(f, "latency must be non-negative, got {}", latency)
            }
        }
    }
}

// -----------------------------------------------------------------------------
// RouteOutcome — the routing protocol's result, one variant per failure mode
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Delivered { path: Vec<NodeId>, total_latency: f64 },
    /// The active subgraph is disconnected for this pair. A normal outcome,
    /// not a fault.
    NoPath,
    /// A path was computed but the hop-by-hop delivery chain did not resolve
    /// to the destination accepting the message.
    Undeliverable { path: Vec<NodeId> },
}

// -----------------------------------------------------------------------------
// Network — owns every node, keeps adjacency symmetric
// -----------------------------------------------------------------------------

/// The topology arena. All nodes live here, keyed by id; adjacency maps refer
/// back into the arena by id only. Single-writer: callers exposing a Network
/// concurrently must serialize access around it.
#[derive(Debug, Default)]
pub struct Network {
    pub nodes: HashMap<NodeId, Node>,
}

impl Network {
    pub fn new() -> Self {
        Network { nodes: HashMap::new() }
    }

    /// Registers a node under its id. Rejects an already-registered id.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, NetworkError> {
        if self.nodes.contains_key(&node.id) {
            return Err(NetworkError::DuplicateNode(node.id.clone()));
        }
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        Ok(id)
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Exact, case-sensitive match. Order among duplicate names is undefined.
    pub fn get_node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.values().find(|node| node.name == name)
    }

    pub fn get_node_by_name_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes.values_mut().find(|node| node.name == name)
    }

    pub fn node_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.values().map(|node| node.name.clone()).collect();
        names.sort();
        names
    }

    /// Establishes the undirected link `a <-> b`. After success both
    /// adjacency maps carry the same latency; re-linking an existing pair
    /// overwrites both sides (last write wins).
    pub fn add_link(&mut self, a_id: &str, b_id: &str, latency: f64) -> Result<(), NetworkError> {
        if latency < 0.0 {
            return Err(NetworkError::InvalidLatency(latency));
        }
        if !self.nodes.contains_key(a_id) {
            return Err(NetworkError::UnknownNode(a_id.to_string()));
        }
        if !self.nodes.contains_key(b_id) {
            return Err(NetworkError::UnknownNode(b_id.to_string()));
        }
        if let Some(a) = self.nodes.get_mut(a_id) {
            a.neighbors.insert(b_id.to_string(), latency);
        }
        if let Some(b) = self.nodes.get_mut(b_id) {
            b.neighbors.insert(a_id.to_string(), latency);
        }
        Ok(())
    }

    pub fn are_linked(&self, a_id: &str, b_id: &str) -> bool {
        self.get_node(a_id)
            .map(|node| node.neighbors.contains_key(b_id))
            .unwrap_or(false)
    }

    /// Minimum-latency path over the currently-active subgraph.
    pub fn find_shortest_path(&self, from_id: &str, to_id: &str) -> Option<Route> {
        routing::shortest_path(self, from_id, to_id)
    }

    /// Single-hop delivery: destination must be a direct neighbor of the
    /// source and must own the message's destination id. Availability is not
    /// consulted; a structurally-present link carries the message.
    pub fn send_direct_message(&self, message: &Message) -> bool {
        if !self.are_linked(&message.source_id, &message.destination_id) {
            return false;
        }
        match self.get_node(&message.destination_id) {
            Some(destination) => destination.receive_message(message),
            None => false,
        }
    }

    fn display_name(&self, id: &str) -> String {
        self.get_node(id)
            .map(|node| node.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// The routing protocol: pathfind, then simulate delivery hop by hop.
    /// Emits exactly one event to the reporter per attempt; that event is the
    /// sole observable side effect of routing.
    pub fn route_message(&self, message: &Message, reporter: &mut Reporter) -> RouteOutcome {
        let source_name = self.display_name(&message.source_id);
        let destination_name = self.display_name(&message.destination_id);

        let Some(route) = self.find_shortest_path(&message.source_id, &message.destination_id)
        else {
            log::warn!("🚫 No route from '{}' to '{}'", source_name, destination_name);
            reporter.log_routing_attempt(&source_name, &destination_name, None, 0.0, false);
            return RouteOutcome::NoPath;
        };

        // Every consecutive hop pair must still be directly linked, and the
        // final node must accept the message.
        let chain_intact = route
            .hops
            .windows(2)
            .all(|pair| self.are_linked(&pair[0], &pair[1]));
        let delivered = chain_intact
            && self
                .get_node(&message.destination_id)
                .map(|destination| destination.receive_message(message))
                .unwrap_or(false);

        let path_names: Vec<String> = route.hops.iter().map(|id| self.display_name(id)).collect();
        reporter.log_routing_attempt(
            &source_name,
            &destination_name,
            Some(&path_names),
            route.total_latency,
            delivered,
        );

        if delivered {
            log::info!(
                "📨 Delivered '{}' -> '{}' via {} ({}ms)",
                source_name,
                destination_name,
                path_names.join(" -> "),
                route.total_latency
            );
            RouteOutcome::Delivered { path: route.hops, total_latency: route.total_latency }
        } else {
            log::warn!(
                "🚫 Path '{}' computed but delivery failed",
                path_names.join(" -> ")
            );
            RouteOutcome::Undeliverable { path: route.hops }
        }
    }

    /// Builds a Network from a topology document on disk: every declared node
    /// is registered, then every declared link is applied. A link naming an
    /// undeclared node is fatal.
    pub fn create_from_config<P: AsRef<Path>>(path: P) -> Result<Network, ConfigError> {
        let topology = TopologyConfig::load(path)?;
        Network::from_topology(&topology)
    }

    pub fn from_topology(topology: &TopologyConfig) -> Result<Network, ConfigError> {
        let mut network = Network::new();
        let mut ids_by_name: HashMap<String, NodeId> = HashMap::new();

        for decl in &topology.nodes {
            let node = Node::new(&decl.name);
            ids_by_name.insert(decl.name.clone(), node.id.clone());
            network.add_node(node)?;
        }

        for LinkDecl(name_a, name_b, latency) in &topology.links {
            let a_id = ids_by_name
                .get(name_a)
                .ok_or_else(|| ConfigError::UnknownNode(name_a.clone()))?;
            let b_id = ids_by_name
                .get(name_b)
                .ok_or_else(|| ConfigError::UnknownNode(name_b.clone()))?;
            if *latency < 0.0 {
                return Err(ConfigError::InvalidLatency {
                    link: format!("'{}' <-> '{}'", name_a, name_b),
                    latency: *latency,
                });
            }
            network.add_link(a_id, b_id, *latency)?;
        }

        log::info!(
            "🗺️ Topology loaded: {} nodes, {} links",
            network.nodes.len(),
            topology.links.len()
        );
        Ok(network)
    }
}
