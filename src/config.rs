//! Configuration and CLI argument parsing for dockhand

use clap::Parser;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use crate::error::{DockhandError, Result};

/// Default timeout for remote command execution in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 20_000; // 20 seconds

/// Default log tail length for remote container logs
pub const DEFAULT_LOG_TAIL: usize = 50;

/// Default size of the worker pool for off-path remote calls
pub const DEFAULT_WORKERS: usize = 8;

/// dockhand CLI arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "dockhand")]
#[command(version)]
#[command(about = "Chat-driven control panel for container workloads on remote SSH hosts")]
pub struct Args {
    /// JSON array of environment servers: [{"host","username","password"}].
    /// Each entry is provisioned once at startup; the passwords are not kept.
    #[arg(long, env = "DOCKHAND_SERVERS_JSON")]
    pub servers_json: Option<String>,

    /// Remote command execution timeout in milliseconds
    #[arg(long, default_value = "20000", env = "DOCKHAND_TIMEOUT")]
    pub timeout: u64,

    /// Lines of container logs to tail
    #[arg(long, default_value = "50", env = "DOCKHAND_LOG_TAIL")]
    pub log_tail: usize,

    /// Maximum concurrent remote calls across all operators
    #[arg(long, default_value = "8", env = "DOCKHAND_WORKERS")]
    pub workers: usize,
}

/// One centrally declared server awaiting startup provisioning.
///
/// The password exists only until the startup pass consumes it.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvServerDecl {
    pub host: String,
    pub username: String,
    pub password: String,
}

/// Parsed and validated configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment servers to provision at startup
    pub env_servers: Vec<EnvServerDecl>,

    /// Remote command timeout
    pub timeout: Duration,

    /// Log tail length
    pub log_tail: usize,

    /// Worker pool size
    pub workers: usize,
}

impl Config {
    /// Create Config from CLI Args
    pub fn from_args(args: Args) -> Result<Self> {
        if args.workers == 0 {
            return Err(DockhandError::config("--workers must be at least 1"));
        }
        if args.timeout == 0 {
            return Err(DockhandError::config("--timeout must be positive"));
        }

        let env_servers = match args.servers_json.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_env_servers(raw)?,
            _ => Vec::new(),
        };

        Ok(Config {
            env_servers,
            timeout: Duration::from_millis(args.timeout),
            log_tail: args.log_tail.max(1),
            workers: args.workers,
        })
    }
}

/// Parse the environment server declarations.
///
/// The value must be a JSON array; entries missing a field are logged and
/// skipped rather than failing startup.
pub fn parse_env_servers(raw: &str) -> Result<Vec<EnvServerDecl>> {
    let items: Vec<serde_json::Value> = serde_json::from_str(raw)
        .map_err(|e| DockhandError::config(format!("servers JSON is not a valid array: {}", e)))?;

    let mut servers = Vec::new();
    for (idx, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<EnvServerDecl>(item) {
            Ok(decl) if !decl.host.is_empty() && !decl.username.is_empty() => servers.push(decl),
            Ok(_) => warn!(idx, "servers JSON entry has empty fields, skipping"),
            Err(e) => warn!(idx, error = %e, "servers JSON entry malformed, skipping"),
        }
    }
    Ok(servers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_servers() {
        let raw = r#"[{"host":"10.0.0.1","username":"ops","password":"pw"}]"#;
        let servers = parse_env_servers(raw).unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].host, "10.0.0.1");
        assert_eq!(servers[0].username, "ops");
    }

    #[test]
    fn test_parse_env_servers_skips_malformed_entries() {
        let raw = r#"[
            {"host":"10.0.0.1","username":"ops","password":"pw"},
            {"host":"10.0.0.2"},
            "not-an-object",
            {"host":"","username":"x","password":"y"}
        ]"#;
        let servers = parse_env_servers(raw).unwrap();
        assert_eq!(servers.len(), 1);
    }

    #[test]
    fn test_parse_env_servers_rejects_non_array() {
        assert!(parse_env_servers("{}").is_err());
        assert!(parse_env_servers("garbage").is_err());
    }

    #[test]
    fn test_config_from_args() {
        let args = Args {
            servers_json: None,
            timeout: 20000,
            log_tail: 50,
            workers: 8,
        };
        let config = Config::from_args(args).unwrap();
        assert_eq!(config.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
        assert_eq!(config.log_tail, DEFAULT_LOG_TAIL);
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert!(config.env_servers.is_empty());
    }

    #[test]
    fn test_config_rejects_zero_workers() {
        let args = Args {
            servers_json: None,
            timeout: 20000,
            log_tail: 50,
            workers: 0,
        };
        assert!(Config::from_args(args).is_err());
    }
}
