//! dockhand - chat-driven control panel for container workloads on remote hosts
//!
//! This crate manages containerized workloads on remote hosts over SSH from a
//! chat-style control surface. Access to a host is provisioned once with a
//! password: a fresh RSA keypair is generated, the public half is installed
//! into the host's `authorized_keys`, and every later command authenticates
//! with the key. The password is collected by an interactive wizard, used for
//! exactly one installation call, and never stored.
//!
//! # Architecture
//!
//! - [`token`] - opaque routing tokens carried by menu buttons
//! - [`registry`] - in-memory, scoped store of provisioned servers
//! - [`ssh`] - one-shot remote execution, keypair generation, key install
//! - [`wizard`] - per-operator add-server conversation state
//! - [`panel`] - event processing tying the pieces together
//! - [`engine`] - local container engine collaborator
//! - [`console`] - stdin/stdout transport for running without a chat network
//!
//! # Security model
//!
//! Host keys are accepted on first use (see [`ssh::TofuHandler`]); the first
//! connection to a host carries no identity guarantee. Server records,
//! including private keys, live only in process memory and are lost on
//! restart.

pub mod chat;
pub mod config;
pub mod console;
pub mod containers;
pub mod engine;
pub mod error;
pub mod panel;
pub mod registry;
pub mod ssh;
pub mod token;
pub mod wizard;

// Re-exports for convenience
pub use chat::{Button, ChatEvent, ChatTransport, OperatorId};
pub use config::{Args, Config, EnvServerDecl};
pub use error::{DockhandError, Result};
pub use panel::ControlPanel;
pub use registry::{Scope, ServerRecord, ServerRegistry};
pub use ssh::{
    generate_keypair, CommandOutput, Credential, Keypair, Provisioner, RemoteExecutor,
    RemoteRunner, SshProvisioner, SshRunner, TofuHandler,
};
pub use token::{ContainerAction, ServerRef, Token};
pub use wizard::{SessionStore, WizardOutcome, WizardStep};
