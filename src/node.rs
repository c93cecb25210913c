use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque node identifier (v4 UUID rendered as a string).
pub type NodeId = String;

// -----------------------------------------------------------------------------
// Node — a network endpoint
// -----------------------------------------------------------------------------

/// A single endpoint in the simulated network.
///
/// Adjacency is stored as id → latency; the `Network` arena owns every node,
/// so neighbor entries never hold references. Edges stay in place while a
/// node is offline; availability is only consulted at traversal time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub is_active: bool,
    pub neighbors: HashMap<NodeId, f64>,
}

impl Node {
    pub fn new(name: &str) -> Self {
        Node {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            is_active: true,
            neighbors: HashMap::new(),
        }
    }

    /// Idempotent: taking an offline node offline is a no-op.
    pub fn take_offline(&mut self) {
        self.is_active = false;
    }

    /// Idempotent counterpart of `take_offline`.
    pub fn bring_online(&mut self) {
        self.is_active = true;
    }

    /// Terminal delivery check. Availability does not matter here, an
    /// offline node still owns its id.
    pub fn receive_message(&self, message: &Message) -> bool {
        message.destination_id == self.id
    }
}

// -----------------------------------------------------------------------------
// Message — one delivery attempt
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub source_id: NodeId,
    pub destination_id: NodeId,
    pub payload: String,
}

impl Message {
    pub fn new(source_id: &str, destination_id: &str, payload: &str) -> Self {
        Message {
            source_id: source_id.to_string(),
            destination_id: destination_id.to_string(),
            payload: payload.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation_defaults() {
        let node = Node::new("Ground Station Alpha");
        assert_eq!(node.name, "Ground Station Alpha");
        assert!(!node.id.is_empty());
        assert!(node.is_active);
        assert!(node.neighbors.is_empty());
    }

    #[test]
    fn test_node_ids_are_unique() {
        let a = Node::new("A");
        let b = Node::new("A");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_receive_message_matches_destination() {
        let node = Node::new("Receiver");
        let message = Message::new("other", &node.id, "Test");
        assert!(node.receive_message(&message));
    }

    #[test]
    fn test_receive_message_rejects_wrong_destination() {
        let node = Node::new("Receiver");
        let message = Message::new("other", "different", "Wrong");
        assert!(!node.receive_message(&message));
    }

    #[test]
    fn test_receive_message_ignores_availability() {
        let mut node = Node::new("Receiver");
        node.take_offline();
        let message = Message::new("other", &node.id, "Still mine");
        assert!(node.receive_message(&message));
    }

    #[test]
    fn test_offline_online_idempotent() {
        let mut node = Node::new("Relay");
        node.take_offline();
        node.take_offline();
        assert!(!node.is_active);
        node.bring_online();
        assert!(node.is_active);
        node.bring_online();
        assert!(node.is_active);
    }
}
