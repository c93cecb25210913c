mod api;
mod config;
mod constants;
mod network;
mod node;
mod reporter;
mod routing;

use crate::api::SimState;
use crate::network::{Network, RouteOutcome};
use crate::node::{Message, Node};
use crate::reporter::Reporter;
use std::sync::Arc;
use tokio::sync::RwLock;

#[tokio::main]
async fn main() {
    env_logger::init();
    constants::print_banner();

    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "serve" => {
            let config_path = args
                .get(2)
                .map(|s| s.as_str())
                .unwrap_or(constants::DEFAULT_CONFIG_PATH);
            let port = args
                .get(3)
                .and_then(|s| s.parse().ok())
                .unwrap_or(constants::DEFAULT_API_PORT);
            run_server(config_path, port).await;
        }
        "demo" => {
            if let Err(e) = run_routing_demo() {
                log::error!("Demo failed: {}", e);
                std::process::exit(1);
            }
        }
        _ => {
            println!("aegis-node — available commands:");
            println!("  serve [config] [port]  — load a topology and start the dashboard API");
            println!("                           (defaults: {}, port {})",
                constants::DEFAULT_CONFIG_PATH, constants::DEFAULT_API_PORT);
            println!("  demo                   — scripted routing simulation + CSV report");
        }
    }
}

async fn run_server(config_path: &str, port: u16) {
    log::info!("Loading topology from {}", config_path);
    let network = match Network::create_from_config(config_path) {
        Ok(network) => network,
        Err(e) => {
            log::error!("❌ Failed to load topology: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("Network ready: {} nodes", network.nodes.len());

    let state = Arc::new(RwLock::new(SimState::new(network)));
    let app = api::router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("❌ Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    log::info!("🌐 Dashboard API listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        log::error!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}

/// Scripted simulation: a small relay topology, a failure, a recovery, and a
/// CSV report at the end.
fn run_routing_demo() -> Result<(), String> {
    let mut network = Network::new();
    let hq = network.add_node(Node::new("Command Center")).map_err(|e| e.to_string())?;
    let north = network.add_node(Node::new("Relay North")).map_err(|e| e.to_string())?;
    let south = network.add_node(Node::new("Relay South")).map_err(|e| e.to_string())?;
    let field = network.add_node(Node::new("Mobile Unit 7")).map_err(|e| e.to_string())?;

    network.add_link(&hq, &north, 20.0).map_err(|e| e.to_string())?;
    network.add_link(&north, &field, 35.0).map_err(|e| e.to_string())?;
    network.add_link(&hq, &south, 60.0).map_err(|e| e.to_string())?;
    network.add_link(&south, &field, 45.0).map_err(|e| e.to_string())?;

    let mut reporter = Reporter::new();

    println!("=== Direct delivery between adjacent nodes ===");
    let direct = network.send_direct_message(&Message::new(&hq, &north, "link check"));
    println!("  Command Center -> Relay North: {}", if direct { "ok" } else { "failed" });
    let skipped = network.send_direct_message(&Message::new(&hq, &field, "link check"));
    println!("  Command Center -> Mobile Unit 7 (not adjacent): {}", if skipped { "ok" } else { "failed" });

    println!("\n=== Routing via the fastest relay ===");
    let outcome = network.route_message(&Message::new(&hq, &field, "status request"), &mut reporter);
    print_outcome(&network, &outcome);

    println!("\n=== Relay North goes dark ===");
    if let Some(node) = network.get_node_mut(&north) {
        node.take_offline();
        reporter.log_status_change("Relay North", false);
    }
    let outcome = network.route_message(&Message::new(&hq, &field, "status request"), &mut reporter);
    print_outcome(&network, &outcome);

    println!("\n=== Relay South goes dark too ===");
    if let Some(node) = network.get_node_mut(&south) {
        node.take_offline();
        reporter.log_status_change("Relay South", false);
    }
    let outcome = network.route_message(&Message::new(&hq, &field, "status request"), &mut reporter);
    print_outcome(&network, &outcome);

    println!("\n=== Relay North recovers ===");
    if let Some(node) = network.get_node_mut(&north) {
        node.bring_online();
        reporter.log_status_change("Relay North", true);
    }
    let outcome = network.route_message(&Message::new(&hq, &field, "status request"), &mut reporter);
    print_outcome(&network, &outcome);

    let report_path = reporter.write_report("simulation_report.csv")?;
    println!("\nReport: {}", report_path.display());
    Ok(())
}

fn print_outcome(network: &Network, outcome: &RouteOutcome) {
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
            println!("  delivered: {} ({}ms)", names.join(" -> "), total_latency);
        }
        RouteOutcome::NoPath => println!("  no path available"),
        RouteOutcome::Undeliverable { .. } => println!("  path found, delivery failed"),
    }
}
