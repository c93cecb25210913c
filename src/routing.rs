use crate::network::Network;
use crate::node::NodeId;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// A computed route through the active subgraph, source and destination
/// inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub hops: Vec<NodeId>,
    pub total_latency: f64,
}

// Frontier entry for the priority queue. BinaryHeap is a max-heap, so the
// ordering is inverted: the cheapest cumulative latency compares greatest.
// `seq` is the discovery counter and breaks ties in discovery order.
struct Frontier {
    cost: f64,
    seq: u64,
    id: NodeId,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

/// Dijkstra over the induced subgraph of currently-active nodes, evaluated
/// against live availability at call time (no caching).
///
/// Endpoints are not exempt from the active-node filter: an offline source or
/// destination is unreachable. `from_id == to_id` on an active node yields
/// the trivial single-node route with zero latency.
pub fn shortest_path(network: &Network, from_id: &str, to_id: &str) -> Option<Route> {
    let source = network.get_node(from_id)?;
    let destination = network.get_node(to_id)?;
    if !source.is_active || !destination.is_active {
        return None;
    }

    let mut best: HashMap<NodeId, f64> = HashMap::new();
    let mut came_from: HashMap<NodeId, NodeId> = HashMap::new();
    let mut settled: HashSet<NodeId> = HashSet::new();
    let mut frontier: BinaryHeap<Frontier> = BinaryHeap::new();
    let mut seq: u64 = 0;

    best.insert(from_id.to_string(), 0.0);
    frontier.push(Frontier { cost: 0.0, seq, id: from_id.to_string() });

    while let Some(Frontier { cost, id, .. }) = frontier.pop() {
        if !settled.insert(id.clone()) {
            continue;
        }
        if id == to_id {
            return Some(Route {
                hops: rebuild_path(&came_from, id),
                total_latency: cost,
            });
        }

        let Some(node) = network.get_node(&id) else { continue };
        for (neighbor_id, latency) in &node.neighbors {
            if settled.contains(neighbor_id) {
                continue;
            }
            // An inactive node is never relaxed into, which removes it and
            // all its edges from this query's reachable graph.
            let Some(neighbor) = network.get_node(neighbor_id) else { continue };
            if !neighbor.is_active {
                continue;
            }
            let candidate = cost + latency;
            if candidate < *best.get(neighbor_id).unwrap_or(&f64::INFINITY) {
                best.insert(neighbor_id.clone(), candidate);
                came_from.insert(neighbor_id.clone(), id.clone());
                seq += 1;
                frontier.push(Frontier { cost: candidate, seq, id: neighbor_id.clone() });
            }
        }
    }

    None
}

fn rebuild_path(came_from: &HashMap<NodeId, NodeId>, end: NodeId) -> Vec<NodeId> {
    let mut hops = vec![end];
    loop {
        let Some(previous) = came_from.get(&hops[hops.len() - 1]) else { break };
        hops.push(previous.clone());
    }
    hops.reverse();
    hops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn triangle() -> (Network, NodeId, NodeId, NodeId) {
        let mut network = Network::new();
        let a = network.add_node(Node::new("A")).unwrap();
        let b = network.add_node(Node::new("B")).unwrap();
        let c = network.add_node(Node::new("C")).unwrap();
        (network, a, b, c)
    }

    #[test]
    fn test_fastest_path_beats_fewest_hops() {
        let (mut network, a, b, c) = triangle();
        network.add_link(&a, &b, 30.0).unwrap();
        network.add_link(&a, &c, 10.0).unwrap();
        network.add_link(&c, &b, 10.0).unwrap();

        let route = shortest_path(&network, &a, &b).unwrap();
        assert_eq!(route.hops, vec![a, c, b]);
        assert_eq!(route.total_latency, 20.0);
    }

    #[test]
    fn test_offline_intermediate_forces_detour() {
        let (mut network, a, b, c) = triangle();
        network.add_link(&a, &b, 100.0).unwrap();
        network.add_link(&b, &c, 100.0).unwrap();
        network.add_link(&a, &c, 500.0).unwrap();

        network.get_node_mut(&b).unwrap().take_offline();
        let route = shortest_path(&network, &a, &c).unwrap();
        assert_eq!(route.hops, vec![a, c]);
        assert_eq!(route.total_latency, 500.0);
    }

    #[test]
    fn test_no_alternate_path_when_relay_offline() {
        let (mut network, a, b, c) = triangle();
        network.add_link(&a, &b, 10.0).unwrap();
        network.add_link(&b, &c, 10.0).unwrap();

        network.get_node_mut(&b).unwrap().take_offline();
        assert!(shortest_path(&network, &a, &c).is_none());
    }

    #[test]
    fn test_disconnected_pair_has_no_path() {
        let (network, a, b, _c) = triangle();
        assert!(shortest_path(&network, &a, &b).is_none());
    }

    #[test]
    fn test_offline_destination_is_unreachable() {
        let (mut network, a, b, _c) = triangle();
        network.add_link(&a, &b, 10.0).unwrap();

        network.get_node_mut(&b).unwrap().take_offline();
        assert!(shortest_path(&network, &a, &b).is_none());

        network.get_node_mut(&b).unwrap().bring_online();
        assert!(shortest_path(&network, &a, &b).is_some());
    }

    #[test]
    fn test_offline_source_is_unreachable() {
        let (mut network, a, b, _c) = triangle();
        network.add_link(&a, &b, 10.0).unwrap();

        network.get_node_mut(&a).unwrap().take_offline();
        assert!(shortest_path(&network, &a, &b).is_none());
    }

    #[test]
    fn test_unknown_id_has_no_path() {
        let (network, a, _b, _c) = triangle();
        assert!(shortest_path(&network, &a, "no-such-id").is_none());
        assert!(shortest_path(&network, "no-such-id", &a).is_none());
    }

    #[test]
    fn test_source_equals_destination_is_trivial() {
        let (network, a, _b, _c) = triangle();
        let route = shortest_path(&network, &a, &a).unwrap();
        assert_eq!(route.hops, vec![a]);
        assert_eq!(route.total_latency, 0.0);
    }

    #[test]
    fn test_availability_is_reevaluated_per_query() {
        let (mut network, a, b, c) = triangle();
        network.add_link(&a, &b, 1.0).unwrap();
        network.add_link(&b, &c, 1.0).unwrap();
        network.add_link(&a, &c, 10.0).unwrap();

        let fast = shortest_path(&network, &a, &c).unwrap();
        assert_eq!(fast.total_latency, 2.0);

        network.get_node_mut(&b).unwrap().take_offline();
        let detour = shortest_path(&network, &a, &c).unwrap();
        assert_eq!(detour.total_latency, 10.0);
        assert_eq!(detour.hops, vec![a, c]);
    }
}
