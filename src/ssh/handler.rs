//! SSH client handler implementation
//!
//! Implements the `russh::client::Handler` trait to handle SSH connection
//! events, in particular server host-key verification.

/// SSH client handler applying a trust-on-first-use policy.
///
/// # Security note
/// Every server key is accepted, so a first connection carries no
/// host-identity guarantee. Proper verification would need a known_hosts
/// file or a fingerprint whitelist and would change what happens on the
/// first connection to every target.
#[derive(Debug, Clone, Default)]
pub struct TofuHandler;

impl TofuHandler {
    pub fn new() -> Self {
        Self
    }
}

impl russh::client::Handler for TofuHandler {
    type Error = anyhow::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh::keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}
