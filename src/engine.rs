//! Local container engine collaborator
//!
//! The panel only consumes this interface; it owns no local engine state.
//! `CliEngine` backs the trait with the local `docker` CLI so the binary
//! works against a co-located engine without a socket client.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::containers::{parse_containers, ContainerSummary};

/// Read/command interface to the co-located container engine.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<ContainerSummary>>;

    async fn get(&self, name: &str) -> anyhow::Result<Option<ContainerSummary>>;

    /// Returns true on success
    async fn start(&self, name: &str) -> anyhow::Result<bool>;

    /// Returns true on success
    async fn stop(&self, name: &str) -> anyhow::Result<bool>;

    /// Returns true on success
    async fn restart(&self, name: &str) -> anyhow::Result<bool>;

    async fn logs(&self, name: &str, tail: usize) -> anyhow::Result<String>;
}

/// Engine driver shelling out to the local `docker` CLI.
#[derive(Debug, Clone, Default)]
pub struct CliEngine;

impl CliEngine {
    pub fn new() -> Self {
        Self
    }

    async fn docker(&self, args: &[&str]) -> anyhow::Result<std::process::Output> {
        debug!(?args, "running local docker");
        let output = Command::new("docker").args(args).output().await?;
        Ok(output)
    }
}

#[async_trait]
impl ContainerEngine for CliEngine {
    async fn list(&self) -> anyhow::Result<Vec<ContainerSummary>> {
        let output = self
            .docker(&["ps", "-a", "--format", "{{.Names}}|{{.Status}}|{{.Image}}"])
            .await?;
        if !output.status.success() {
            anyhow::bail!(
                "docker ps failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(parse_containers(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn get(&self, name: &str) -> anyhow::Result<Option<ContainerSummary>> {
        let containers = self.list().await?;
        Ok(containers.into_iter().find(|c| c.name == name))
    }

    async fn start(&self, name: &str) -> anyhow::Result<bool> {
        let output = self.docker(&["start", name]).await?;
        Ok(output.status.success())
    }

    async fn stop(&self, name: &str) -> anyhow::Result<bool> {
        let output = self.docker(&["stop", name]).await?;
        Ok(output.status.success())
    }

    async fn restart(&self, name: &str) -> anyhow::Result<bool> {
        let output = self.docker(&["restart", name]).await?;
        Ok(output.status.success())
    }

    async fn logs(&self, name: &str, tail: usize) -> anyhow::Result<String> {
        let output = self
            .docker(&["logs", "--tail", &tail.to_string(), name])
            .await?;
        // docker logs writes container output to both streams
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}
