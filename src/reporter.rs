use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const EVENT_MESSAGE_ROUTE: &str = "MESSAGE_ROUTE";
pub const EVENT_NODE_STATUS: &str = "NODE_STATUS";
pub const STATUS_SUCCESS: &str = "SUCCESS";
pub const STATUS_FAILED: &str = "FAILED";
pub const NO_PATH_MARKER: &str = "No path found";
pub const NOT_APPLICABLE: &str = "N/A";

const CSV_HEADER: &str = "timestamp,event_type,details,status,path_taken,total_latency_ms";
const REPORT_DIR: &str = "output/csv";

// -----------------------------------------------------------------------------
// ReportEntry — one structured simulation event
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub timestamp: String,
    pub event_type: String,
    pub details: String,
    pub status: String,
    pub path_taken: String,
    pub total_latency_ms: String,
}

impl ReportEntry {
    fn to_csv_row(&self) -> String {
        [
            &self.timestamp,
            &self.event_type,
            &self.details,
            &self.status,
            &self.path_taken,
            &self.total_latency_ms,
        ]
        .iter()
        .map(|field| csv_escape(field))
        .collect::<Vec<_>>()
        .join(",")
    }
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// -----------------------------------------------------------------------------
// Reporter — event sink for the routing layer, CSV export for operators
// -----------------------------------------------------------------------------

/// Collects simulation events in memory and writes them out as a CSV report.
#[derive(Debug, Default)]
pub struct Reporter {
    pub entries: Vec<ReportEntry>,
}

impl Reporter {
    pub fn new() -> Self {
        Reporter { entries: Vec::new() }
    }

    fn timestamp() -> String {
        Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Records the outcome of a single routing attempt. Exactly one entry is
    /// produced per attempt, whether or not a path existed.
    pub fn log_routing_attempt(
        &mut self,
        source_name: &str,
        destination_name: &str,
        path_names: Option<&[String]>,
        total_latency: f64,
        success: bool,
    ) {
        self.entries.push(ReportEntry {
            timestamp: Self::timestamp(),
            event_type: EVENT_MESSAGE_ROUTE.to_string(),
            details: format!(
                "Route from '{}' to '{}' {}.",
                source_name,
                destination_name,
                if success { "SUCCEEDED" } else { "FAILED" }
            ),
            status: if success { STATUS_SUCCESS } else { STATUS_FAILED }.to_string(),
            path_taken: match path_names {
                Some(hops) => hops.join(" -> "),
                None => NO_PATH_MARKER.to_string(),
            },
            total_latency_ms: if success {
                format!("{}", total_latency)
            } else {
                NOT_APPLICABLE.to_string()
            },
        });
    }

    /// Availability toggles are reported by the layer that drives them, not
    /// by the core topology operations.
    pub fn log_status_change(&mut self, node_name: &str, online: bool) {
        let state = if online { "ONLINE" } else { "OFFLINE" };
        self.entries.push(ReportEntry {
            timestamp: Self::timestamp(),
            event_type: EVENT_NODE_STATUS.to_string(),
            details: format!("Node '{}' is now {}.", node_name, state),
            status: state.to_string(),
            path_taken: NOT_APPLICABLE.to_string(),
            total_latency_ms: NOT_APPLICABLE.to_string(),
        });
    }

    /// Writes all logged entries to `output/csv/<filename>` (an absolute
    /// filename bypasses the default directory). Header row first, entries in
    /// log order.
    pub fn write_report(&self, filename: &str) -> Result<PathBuf, String> {
        if self.entries.is_empty() {
            return Err("no events to report".to_string());
        }

        let filepath = Path::new(REPORT_DIR).join(filename);
        if let Some(parent) = filepath.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {}", parent.display(), e))?;
        }

        let mut out = String::from(CSV_HEADER);
        out.push('\n');
        for entry in &self.entries {
            out.push_str(&entry.to_csv_row());
            out.push('\n');
        }

        fs::write(&filepath, out)
            .map_err(|e| format!("failed to write {}: {}", filepath.display(), e))?;
        log::info!("📄 Report written to {}", filepath.display());
        Ok(filepath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_reporter() -> Reporter {
        let mut reporter = Reporter::new();
        let path = vec!["NodeA".to_string(), "NodeC".to_string()];
        reporter.log_routing_attempt("NodeA", "NodeC", Some(&path), 50.0, true);
        reporter.log_routing_attempt("NodeA", "NodeB", None, 0.0, false);
        reporter
    }

    #[test]
    fn test_routing_attempt_entries() {
        let reporter = sample_reporter();
        assert_eq!(reporter.entries.len(), 2);

        let success = &reporter.entries[0];
        assert_eq!(success.event_type, EVENT_MESSAGE_ROUTE);
        assert_eq!(success.status, STATUS_SUCCESS);
        assert_eq!(success.details, "Route from 'NodeA' to 'NodeC' SUCCEEDED.");
        assert_eq!(success.path_taken, "NodeA -> NodeC");
        assert_eq!(success.total_latency_ms, "50");

        let failure = &reporter.entries[1];
        assert_eq!(failure.status, STATUS_FAILED);
        assert_eq!(failure.details, "Route from 'NodeA' to 'NodeB' FAILED.");
        assert_eq!(failure.path_taken, NO_PATH_MARKER);
        assert_eq!(failure.total_latency_ms, NOT_APPLICABLE);
    }

    #[test]
    fn test_status_change_entry() {
        let mut reporter = Reporter::new();
        reporter.log_status_change("Relay North", false);
        let entry = &reporter.entries[0];
        assert_eq!(entry.event_type, EVENT_NODE_STATUS);
        assert_eq!(entry.status, "OFFLINE");
        assert_eq!(entry.details, "Node 'Relay North' is now OFFLINE.");
    }

    #[test]
    fn test_write_report_produces_csv() {
        let reporter = sample_reporter();
        let target = std::env::temp_dir().join(format!("aegis_report_{}.csv", uuid::Uuid::new_v4()));

        let written = reporter.write_report(target.to_str().unwrap()).unwrap();
        let contents = fs::read_to_string(&written).unwrap();
        let rows: Vec<&str> = contents.lines().collect();

        assert_eq!(rows[0], "timestamp,event_type,details,status,path_taken,total_latency_ms");
        assert!(rows[1].contains("Route from 'NodeA' to 'NodeC' SUCCEEDED."));
        assert!(rows[1].ends_with("NodeA -> NodeC,50"));
        assert!(rows[2].ends_with("No path found,N/A"));

        fs::remove_file(written).unwrap();
    }

    #[test]
    fn test_empty_reporter_refuses_to_write() {
        let reporter = Reporter::new();
        assert!(reporter.write_report("unused.csv").is_err());
    }

    #[test]
    fn test_csv_escaping_quotes_embedded_commas() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
