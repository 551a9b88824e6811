//! Remote command execution over SSH
//!
//! Each call opens a fresh authenticated session, runs one command on an
//! exec channel, and collects the output. Connections are not pooled: the
//! panel's command surface is a handful of short administrative commands and
//! the one-shot model keeps failure handling local to the call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{self, Handle};
use russh::keys::PrivateKeyWithHashAlg;
use russh::ChannelMsg;
use tokio::time::timeout;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::handler::TofuHandler;
use crate::error::{DockhandError, Result};
use crate::registry::ServerRecord;

/// Default timeout for a remote command
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(20);

/// Timeout for establishing the TCP/SSH session
const CONNECT_TIMEOUT_SECS: u64 = 20;

/// Credential presented to the remote host.
///
/// Password auth happens exactly once per server, during provisioning.
/// Every operational call afterwards authenticates with the private key
/// installed by the provisioner.
pub enum Credential {
    Password(Zeroizing<String>),
    /// OpenSSH-serialized private key
    PrivateKey(String),
}

/// Output from a remote command execution
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<u32>,
}

impl CommandOutput {
    /// Check if the command succeeded (exit code 0 or no exit code reported)
    pub fn success(&self) -> bool {
        self.exit_code.is_none_or(|code| code == 0)
    }

    /// Collapse the two streams into the single result the panel reports.
    ///
    /// Some tools log success to stderr, so stderr-only output is the
    /// result; whenever stdout is non-empty it wins.
    pub fn merged(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        if stdout.is_empty() && !stderr.is_empty() {
            stderr.to_string()
        } else {
            stdout.to_string()
        }
    }
}

/// One-shot SSH command executor.
pub struct RemoteExecutor {
    connect_timeout: Duration,
}

impl Default for RemoteExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteExecutor {
    pub fn new() -> Self {
        Self {
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
        }
    }

    /// Execute `command` as `username` on `host`.
    ///
    /// `host` may carry an explicit `:port`; port 22 otherwise. On timeout
    /// the local wait is abandoned; the remote process may keep running.
    pub async fn execute(
        &self,
        host: &str,
        username: &str,
        credential: &Credential,
        command: &str,
        command_timeout: Duration,
    ) -> Result<CommandOutput> {
        let session = self.connect(host, username, credential).await?;

        let channel = session
            .channel_open_session()
            .await
            .map_err(|e| DockhandError::network(format!("failed to open channel: {}", e)))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| DockhandError::network(format!("failed to exec command: {}", e)))?;

        let result = match timeout(command_timeout, collect_channel_output(channel)).await {
            Ok(output) => output,
            Err(_) => {
                warn!(
                    host,
                    timeout_ms = command_timeout.as_millis() as u64,
                    "remote command timed out"
                );
                Err(DockhandError::Timeout(command_timeout.as_millis() as u64))
            }
        };

        let _ = session
            .disconnect(russh::Disconnect::ByApplication, "", "")
            .await;

        result
    }

    /// Connect and authenticate a fresh session.
    async fn connect(
        &self,
        host: &str,
        username: &str,
        credential: &Credential,
    ) -> Result<Handle<TofuHandler>> {
        let addr = host_addr(host);
        debug!(addr = %addr, username, "connecting");

        let ssh_config = Arc::new(client::Config::default());
        let connect_result = timeout(
            self.connect_timeout,
            client::connect(ssh_config, addr.as_str(), TofuHandler::new()),
        )
        .await;

        let mut session = match connect_result {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => return Err(DockhandError::network(e.to_string())),
            Err(_) => {
                return Err(DockhandError::network(format!(
                    "connection timeout after {}s",
                    CONNECT_TIMEOUT_SECS
                )))
            }
        };

        self.authenticate(&mut session, username, credential)
            .await?;
        Ok(session)
    }

    async fn authenticate(
        &self,
        session: &mut Handle<TofuHandler>,
        username: &str,
        credential: &Credential,
    ) -> Result<()> {
        match credential {
            Credential::Password(password) => {
                let auth_result = session
                    .authenticate_password(username, password.as_str())
                    .await
                    .map_err(|e| DockhandError::network(e.to_string()))?;
                if auth_result.success() {
                    debug!(username, "password authentication successful");
                    Ok(())
                } else {
                    Err(DockhandError::auth("password rejected"))
                }
            }
            Credential::PrivateKey(key_content) => {
                let key = russh::keys::PrivateKey::from_openssh(key_content.as_bytes())
                    .map_err(|e| {
                        DockhandError::SshKey(format!("failed to parse private key: {}", e))
                    })?;
                let key_with_alg = PrivateKeyWithHashAlg::new(Arc::new(key), None);

                let auth_result = session
                    .authenticate_publickey(username, key_with_alg)
                    .await
                    .map_err(|e| DockhandError::network(e.to_string()))?;
                if auth_result.success() {
                    debug!(username, "key authentication successful");
                    Ok(())
                } else {
                    Err(DockhandError::auth("key rejected"))
                }
            }
        }
    }
}

/// Collect stdout/stderr/exit status from an exec channel until it closes.
async fn collect_channel_output(
    mut channel: russh::Channel<client::Msg>,
) -> Result<CommandOutput> {
    let mut output = CommandOutput::default();

    while let Some(msg) = channel.wait().await {
        if !absorb_channel_msg(&mut output, msg) {
            break;
        }
    }

    debug!(
        exit_code = ?output.exit_code,
        stdout_len = output.stdout.len(),
        stderr_len = output.stderr.len(),
        "remote command completed"
    );

    Ok(output)
}

/// Fold one channel message into the accumulated output.
///
/// Returns `false` once the channel is finished. `Eof` only ends the data
/// streams; the exit status may still follow it, so collection continues
/// until `Close`.
fn absorb_channel_msg(output: &mut CommandOutput, msg: ChannelMsg) -> bool {
    match msg {
        ChannelMsg::Data { data } => {
            output.stdout.push_str(&String::from_utf8_lossy(&data));
        }
        ChannelMsg::ExtendedData { data, ext } => {
            // ext == 1 is stderr
            if ext == 1 {
                output.stderr.push_str(&String::from_utf8_lossy(&data));
            } else {
                output.stdout.push_str(&String::from_utf8_lossy(&data));
            }
        }
        ChannelMsg::ExitStatus { exit_status } => {
            output.exit_code = Some(exit_status);
        }
        ChannelMsg::Close => return false,
        ChannelMsg::Eof => {}
        _ => {}
    }
    true
}

/// Append the default SSH port when the host carries none.
fn host_addr(host: &str) -> String {
    if host.contains(':') {
        host.to_string()
    } else {
        format!("{}:22", host)
    }
}

/// Seam for running operational commands against a registry record.
///
/// The panel depends on this trait rather than the concrete executor so its
/// flows can be exercised with a fake remote.
#[async_trait]
pub trait RemoteRunner: Send + Sync {
    /// Run a command with the record's installed key and return the merged
    /// output per the stderr/stdout rule.
    async fn run(&self, record: &ServerRecord, command: &str) -> Result<String>;
}

/// Production runner executing over SSH with key authentication.
pub struct SshRunner {
    executor: Arc<RemoteExecutor>,
    command_timeout: Duration,
}

impl SshRunner {
    pub fn new(executor: Arc<RemoteExecutor>, command_timeout: Duration) -> Self {
        Self {
            executor,
            command_timeout,
        }
    }
}

#[async_trait]
impl RemoteRunner for SshRunner {
    async fn run(&self, record: &ServerRecord, command: &str) -> Result<String> {
        let credential = Credential::PrivateKey(record.private_key.clone());
        let output = self
            .executor
            .execute(
                &record.host,
                &record.username,
                &credential,
                command,
                self.command_timeout,
            )
            .await?;
        Ok(output.merged())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_prefers_stdout() {
        let output = CommandOutput {
            stdout: "listed\n".to_string(),
            stderr: "warning: noise\n".to_string(),
            exit_code: Some(0),
        };
        assert_eq!(output.merged(), "listed");
    }

    #[test]
    fn test_merged_reports_stderr_when_stdout_empty() {
        let output = CommandOutput {
            stdout: "  \n".to_string(),
            stderr: "container started\n".to_string(),
            exit_code: Some(0),
        };
        assert_eq!(output.merged(), "container started");
    }

    #[test]
    fn test_merged_empty_when_both_empty() {
        let output = CommandOutput::default();
        assert_eq!(output.merged(), "");
    }

    #[test]
    fn test_success_with_no_exit_code() {
        let output = CommandOutput {
            stdout: "ok".to_string(),
            ..Default::default()
        };
        assert!(output.success());
    }

    #[test]
    fn test_success_with_nonzero_exit_code() {
        let output = CommandOutput {
            exit_code: Some(1),
            ..Default::default()
        };
        assert!(!output.success());
    }

    #[test]
    fn test_host_addr_default_port() {
        assert_eq!(host_addr("10.0.0.5"), "10.0.0.5:22");
        assert_eq!(host_addr("example.com:2222"), "example.com:2222");
    }

    #[test]
    fn test_exit_status_after_eof_is_kept() {
        let mut output = CommandOutput::default();
        assert!(absorb_channel_msg(
            &mut output,
            ChannelMsg::Data {
                data: russh::CryptoVec::from(b"partial".to_vec()),
            }
        ));
        assert!(absorb_channel_msg(&mut output, ChannelMsg::Eof));
        assert!(absorb_channel_msg(
            &mut output,
            ChannelMsg::ExitStatus { exit_status: 1 }
        ));
        assert!(!absorb_channel_msg(&mut output, ChannelMsg::Close));

        assert_eq!(output.exit_code, Some(1));
        assert!(!output.success());
        assert_eq!(output.stdout, "partial");
    }

    #[test]
    fn test_extended_data_routes_to_stderr() {
        let mut output = CommandOutput::default();
        absorb_channel_msg(
            &mut output,
            ChannelMsg::ExtendedData {
                data: russh::CryptoVec::from(b"oops".to_vec()),
                ext: 1,
            },
        );
        assert_eq!(output.stderr, "oops");
        assert!(output.stdout.is_empty());
    }
}
