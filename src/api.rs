use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::network::{Network, RouteOutcome};
use crate::node::Message;
use crate::reporter::Reporter;

pub const ONLINE_COLOR: &str = "#4ade80";
pub const OFFLINE_COLOR: &str = "#f87171";

/// Everything the API layer mutates lives behind one lock, which is the
/// single-writer discipline the core requires.
pub struct SimState {
    pub network: Network,
    pub reporter: Reporter,
}

impl SimState {
    pub fn new(network: Network) -> Self {
        SimState { network, reporter: Reporter::new() }
    }
}

pub type SharedState = Arc<RwLock<SimState>>;

// -----------------------------------------------------------------------------
// Response / request shapes
// -----------------------------------------------------------------------------

#[derive(Serialize)]
struct NeighborView {
    name: String,
    latency: f64,
}

#[derive(Serialize)]
struct NodeView {
    id: String,
    name: String,
    is_active: bool,
    neighbors: Vec<NeighborView>,
}

#[derive(Serialize)]
struct GraphNode {
    id: String,
    label: String,
    color: &'static str,
}

#[derive(Serialize)]
struct GraphEdge {
    from: String,
    to: String,
    label: String,
}

#[derive(Serialize)]
struct GraphData {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

#[derive(Deserialize)]
pub struct PathRequest {
    pub from_node: String,
    pub to_node: String,
}

#[derive(Deserialize)]
pub struct RouteRequest {
    pub from_node: String,
    pub to_node: String,
    pub payload: String,
}

#[derive(Deserialize, Default)]
pub struct ExportRequest {
    #[serde(default)]
    pub filename: Option<String>,
}

type ApiError = (StatusCode, Json<Value>);

fn not_found(error: String) -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({ "error": error })))
}

// -----------------------------------------------------------------------------
// Handlers
// -----------------------------------------------------------------------------

async fn network_status_handler(State(state): State<SharedState>) -> Json<Vec<NodeView>> {
    let sim = state.read().await;
    let mut nodes: Vec<NodeView> = sim
        .network
        .nodes
        .values()
        .map(|node| {
            let mut neighbors: Vec<NeighborView> = node
                .neighbors
                .iter()
                .map(|(neighbor_id, latency)| NeighborView {
                    name: sim
                        .network
                        .get_node(neighbor_id)
                        .map(|n| n.name.clone())
                        .unwrap_or_else(|| neighbor_id.clone()),
                    latency: *latency,
                })
                .collect();
            neighbors.sort_by(|x, y| x.name.cmp(&y.name));
            NodeView {
                id: node.id.clone(),
                name: node.name.clone(),
                is_active: node.is_active,
                neighbors,
            }
        })
        .collect();
    nodes.sort_by(|x, y| x.name.cmp(&y.name));
    Json(nodes)
}

/// Graph payload for the dashboard renderer: one entry per node, one entry
/// per undirected link.
async fn graph_data_handler(State(state): State<SharedState>) -> Json<GraphData> {
    let sim = state.read().await;
    let mut sorted: Vec<_> = sim.network.nodes.values().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let nodes = sorted
        .iter()
        .map(|node| GraphNode {
            id: node.id.clone(),
            label: node.name.clone(),
            color: if node.is_active { ONLINE_COLOR } else { OFFLINE_COLOR },
        })
        .collect();

    let mut edges = Vec::new();
    for node in &sorted {
        for (neighbor_id, latency) in &node.neighbors {
            let Some(neighbor) = sim.network.get_node(neighbor_id) else { continue };
            // adjacency is symmetric; emit each link from the lesser end only
            if (&node.name, &node.id) < (&neighbor.name, &neighbor.id) {
                edges.push(GraphEdge {
                    from: node.id.clone(),
                    to: neighbor.id.clone(),
                    label: format!("{}ms", latency),
                });
            }
        }
    }

    Json(GraphData { nodes, edges })
}

async fn nodes_handler(State(state): State<SharedState>) -> Json<Vec<String>> {
    let sim = state.read().await;
    Json(sim.network.node_names())
}

async fn path_handler(
    State(state): State<SharedState>,
    Json(request): Json<PathRequest>,
) -> Result<Json<Value>, ApiError> {
    let sim = state.read().await;
    let from = sim
        .network
        .get_node_by_name(&request.from_node)
        .ok_or_else(|| not_found(format!("Unknown node '{}'", request.from_node)))?;
    let to = sim
        .network
        .get_node_by_name(&request.to_node)
        .ok_or_else(|| not_found(format!("Unknown node '{}'", request.to_node)))?;

    match sim.network.find_shortest_path(&from.id, &to.id) {
        Some(route) => {
            let path: Vec<String> = route
                .hops
                .iter()
                .map(|id| {
                    sim.network
                        .get_node(id)
                        .map(|n| n.name.clone())
                        .unwrap_or_else(|| id.clone())
                })
                .collect();
            Ok(Json(json!({ "path": path, "latency": route.total_latency })))
        }
        None => Err(not_found(format!(
            "No available path from '{}' to '{}'",
            request.from_node, request.to_node
        ))),
    }
}

async fn route_handler(
    State(state): State<SharedState>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut sim = state.write().await;

    let route_error = |message: String| -> ApiError {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": message })),
        )
    };
    let (source_id, destination_id) = {
        let from = sim
            .network
            .get_node_by_name(&request.from_node)
            .ok_or_else(|| route_error(format!("Unknown node '{}'", request.from_node)))?;
        let to = sim
            .network
            .get_node_by_name(&request.to_node)
            .ok_or_else(|| route_error(format!("Unknown node '{}'", request.to_node)))?;
        (from.id.clone(), to.id.clone())
    };

    let message = Message::new(&source_id, &destination_id, &request.payload);
    let SimState { network, reporter } = &mut *sim;
    let outcome = network.route_message(&message, reporter);

    match outcome {
        RouteOutcome::Delivered { path, total_latency } => {
            let names: Vec<String> = path
                .iter()
                .map(|id| {
                    network
                        .get_node(id)
                        .map(|n| n.name.clone())
                        .unwrap_or_else(|| id.clone())
                })
                .collect();
            Ok(Json(json!({
                "success": true,
                "message": format!(
                    "Message routed successfully!\nPath: {}\nTotal Latency: {}ms",
                    names.join(" -> "),
                    total_latency
                ),
                "path": names,
                "total_latency": total_latency,
            })))
        }
        RouteOutcome::NoPath => Err(route_error(format!(
            "No available path from '{}' to '{}'. Message could not be routed.",
            request.from_node, request.to_node
        ))),
        RouteOutcome::Undeliverable { .. } => Ok(Json(json!({
            "success": false,
            "message": "A path was computed but the message could not be delivered.",
        }))),
    }
}

async fn node_offline_handler(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    set_node_availability(&state, &name, false).await
}

async fn node_online_handler(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    set_node_availability(&state, &name, true).await
}

/// Status-change events are the caller's responsibility, so the toggle and
/// the report entry both happen here, not in the core.
async fn set_node_availability(
    state: &SharedState,
    name: &str,
    online: bool,
) -> Result<Json<Value>, ApiError> {
    let mut sim = state.write().await;
    let SimState { network, reporter } = &mut *sim;

    let Some(node) = network.get_node_by_name_mut(name) else {
        return Err(not_found(format!("Unknown node '{}'", name)));
    };
    if online {
        node.bring_online();
    } else {
        node.take_offline();
    }
    let node_name = node.name.clone();
    reporter.log_status_change(&node_name, online);
    log::info!(
        "{} Node '{}' is now {}",
        if online { "🟢" } else { "🔴" },
        node_name,
        if online { "online" } else { "offline" }
    );

    Ok(Json(json!({
        "success": true,
        "status": if online { "online" } else { "offline" },
    })))
}

async fn report_handler(State(state): State<SharedState>) -> Json<Value> {
    let sim = state.read().await;
    Json(json!(sim.reporter.entries))
}

async fn export_report_handler(
    State(state): State<SharedState>,
    Json(request): Json<ExportRequest>,
) -> Result<Json<Value>, ApiError> {
    let sim = state.read().await;
    let filename = request
        .filename
        .unwrap_or_else(|| "simulation_report.csv".to_string());
    match sim.reporter.write_report(&filename) {
        Ok(path) => Ok(Json(json!({ "success": true, "path": path.display().to_string() }))),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": e })),
        )),
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/network/status", get(network_status_handler))
        .route("/api/network/graph-data", get(graph_data_handler))
        .route("/api/nodes", get(nodes_handler))
        .route("/api/network/path", post(path_handler))
        .route("/api/network/route", post(route_handler))
        .route("/api/node/:name/offline", post(node_offline_handler))
        .route("/api/node/:name/online", post(node_online_handler))
        .route("/api/report", get(report_handler))
        .route("/api/report/export", post(export_report_handler))
        .with_state(state)
}
