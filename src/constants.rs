//! Project-wide constants for the Aegis simulator.

/// Network name
pub const NETWORK_NAME: &str = "Aegis";

/// Crate version, shown in the banner
pub const VERSION: &str = "0.1.0-alpha";

/// Project tagline
pub const TAGLINE: &str = "Availability-aware routing over a point-to-point network";

/// Default topology document, looked up relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "network_config.json";

/// Default port for the dashboard API
pub const DEFAULT_API_PORT: u16 = 8080;

/// Print the startup banner
pub fn print_banner() {
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║                  AEGIS NETWORK SIMULATOR                   ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();
    println!("  {} v{}", NETWORK_NAME, VERSION);
    println!("  {}", TAGLINE);
    println!();
}
