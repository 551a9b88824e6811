//! Remote container command surface
//!
//! Fixed shell templates executed through the remote runner, and tolerant
//! parsers for their pipe-delimited output. A malformed line is skipped
//! after a log entry; it never aborts the whole listing.

use tracing::debug;

use crate::error::DockhandError;
use crate::ssh::sanitize::{escape_single_quoted, quote_arg};

/// Maximum characters of a log tail rendered to the operator
pub const LOG_RENDER_LIMIT: usize = 3000;

/// One container row from a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub name: String,
    pub status: String,
    pub image: String,
}

impl ContainerSummary {
    /// Whether the status line reports a running container
    pub fn is_running(&self) -> bool {
        self.status.to_lowercase().starts_with("up")
            || self.status.eq_ignore_ascii_case("running")
    }
}

/// One row of resource usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStats {
    pub name: String,
    pub cpu: String,
    pub memory: String,
}

/// Listing template: `name|status|image` per line.
pub fn list_command() -> String {
    "docker ps -a --format '{{.Names}}|{{.Status}}|{{.Image}}'".to_string()
}

/// Stats template: `name|cpu%|mem%` per line.
pub fn stats_command() -> String {
    "docker stats --no-stream --format '{{.Name}}|{{.CPUPerc}}|{{.MemPerc}}'".to_string()
}

/// Single-container status template: `status|image` for an exact name match.
pub fn inspect_command(name: &str) -> String {
    format!(
        "docker ps -a --filter 'name=^/{}$' --format '{{{{.Status}}}}|{{{{.Image}}}}'",
        escape_single_quoted(name)
    )
}

/// Lifecycle template: `docker start|stop|restart <name>`.
pub fn action_command(verb: &str, name: &str) -> String {
    format!("docker {} {}", verb, quote_arg(name))
}

/// Log tail template.
pub fn logs_command(name: &str, tail: usize) -> String {
    format!("docker logs --tail {} {}", tail, quote_arg(name))
}

/// Parse listing output, skipping blank and malformed lines.
pub fn parse_containers(output: &str) -> Vec<ContainerSummary> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut fields = line.splitn(3, '|');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(name), Some(status), Some(image)) => Some(ContainerSummary {
                    name: name.to_string(),
                    status: status.to_string(),
                    image: image.to_string(),
                }),
                _ => {
                    let err = DockhandError::parse(format!("expected name|status|image: {line}"));
                    debug!(error = %err, "skipping container line");
                    None
                }
            }
        })
        .collect()
}

/// Parse stats output, skipping blank and malformed lines.
pub fn parse_stats(output: &str) -> Vec<ContainerStats> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut fields = line.splitn(3, '|');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(name), Some(cpu), Some(memory)) => Some(ContainerStats {
                    name: name.to_string(),
                    cpu: cpu.to_string(),
                    memory: memory.to_string(),
                }),
                _ => {
                    let err = DockhandError::parse(format!("expected name|cpu|mem: {line}"));
                    debug!(error = %err, "skipping stats line");
                    None
                }
            }
        })
        .collect()
}

/// Parse the single-container `status|image` line, if present.
pub fn parse_inspect(output: &str) -> Option<(String, String)> {
    let line = output.lines().find(|line| !line.trim().is_empty())?;
    let (status, image) = line.split_once('|')?;
    Some((status.to_string(), image.to_string()))
}

/// Truncate a log tail to the renderable suffix.
pub fn clip_logs(logs: &str) -> &str {
    if logs.len() <= LOG_RENDER_LIMIT {
        return logs;
    }
    // Stay on a char boundary
    let mut start = logs.len() - LOG_RENDER_LIMIT;
    while !logs.is_char_boundary(start) {
        start += 1;
    }
    &logs[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_containers() {
        let output = "web|Up 3 hours|nginx:1.25\ndb|Exited (0) 2 days ago|postgres:16\n";
        let containers = parse_containers(output);
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[0].name, "web");
        assert!(containers[0].is_running());
        assert!(!containers[1].is_running());
        assert_eq!(containers[1].image, "postgres:16");
    }

    #[test]
    fn test_parse_containers_skips_malformed_and_blank_lines() {
        let output = "web|Up 3 hours|nginx:1.25\nnot-a-row\n\n  \nbad|fields\n";
        let containers = parse_containers(output);
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].name, "web");
    }

    #[test]
    fn test_parse_containers_keeps_extra_delimiters_in_image() {
        // splitn keeps any further pipes inside the last field
        let output = "web|Up|registry:5000/img|tag";
        let containers = parse_containers(output);
        assert_eq!(containers[0].image, "registry:5000/img|tag");
    }

    #[test]
    fn test_parse_stats() {
        let output = "web|12.5%|3.1%\ndb|0.0%|8.2%\n\n";
        let stats = parse_stats(output);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].cpu, "12.5%");
        assert_eq!(stats[1].memory, "8.2%");
    }

    #[test]
    fn test_parse_inspect() {
        assert_eq!(
            parse_inspect("Up 2 hours|nginx:1.25\n"),
            Some(("Up 2 hours".to_string(), "nginx:1.25".to_string()))
        );
        assert_eq!(parse_inspect("\n"), None);
        assert_eq!(parse_inspect("no-delimiter"), None);
    }

    #[test]
    fn test_inspect_command_escapes_name() {
        let cmd = inspect_command("web");
        assert!(cmd.contains("'name=^/web$'"));
        let cmd = inspect_command("a'b");
        assert!(!cmd.contains("^/a'b$"));
    }

    #[test]
    fn test_action_command_quotes_name() {
        assert_eq!(action_command("stop", "db"), "docker stop 'db'");
        assert_eq!(
            action_command("start", "a'b"),
            "docker start 'a'\"'\"'b'"
        );
    }

    #[test]
    fn test_logs_command() {
        assert_eq!(logs_command("web", 50), "docker logs --tail 50 'web'");
    }

    #[test]
    fn test_clip_logs() {
        let short = "hello";
        assert_eq!(clip_logs(short), "hello");

        let long = "x".repeat(LOG_RENDER_LIMIT + 10);
        assert_eq!(clip_logs(&long).len(), LOG_RENDER_LIMIT);
    }
}
