//! SSH subsystem
//!
//! One-shot authenticated command execution against remote hosts, plus
//! keypair generation and the password-bootstrapped public-key install.

pub mod exec;
pub mod handler;
pub mod provision;
pub mod sanitize;

// Re-exports
pub use exec::{CommandOutput, Credential, RemoteExecutor, RemoteRunner, SshRunner};
pub use handler::TofuHandler;
pub use provision::{generate_keypair, Keypair, Provisioner, SshProvisioner};
pub use sanitize::{escape_single_quoted, quote_arg};
