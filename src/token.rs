//! Opaque routing tokens for menu buttons
//!
//! Every button the panel renders carries a token from the closed set below.
//! Composite container tokens join fixed fields with `|`; the final field is
//! an arbitrary container name and is percent-encoded so a name containing
//! the delimiter (or a percent sign) survives the round trip. Decoding
//! splits with `splitn` bounded by the fixed-field count, so the remainder
//! is captured whole and decoded last.

use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};

use crate::error::{DockhandError, Result};
use crate::registry::Scope;

/// Delimiter for composite container tokens
const DELIM: char = '|';

/// Prefix marking a composite token for a remote container
const CONTAINER_PREFIX: &str = "sshc";

/// Prefix marking a composite token for a local container
const LOCAL_PREFIX: &str = "locc";

/// Reference to a registry slot: scope plus scope-local index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerRef {
    pub scope: Scope,
    pub index: usize,
}

impl ServerRef {
    pub fn environment(index: usize) -> Self {
        Self {
            scope: Scope::Environment,
            index,
        }
    }

    pub fn user(index: usize) -> Self {
        Self {
            scope: Scope::User,
            index,
        }
    }

    /// Parse `env_3`, `user_0`, or a legacy bare integer (user scope).
    pub fn decode(s: &str) -> Result<Self> {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            // Legacy format predating scoped registries
            let index = s
                .parse()
                .map_err(|_| DockhandError::invalid_token("index out of range"))?;
            return Ok(Self::user(index));
        }

        let (tag, idx) = s
            .split_once('_')
            .ok_or_else(|| DockhandError::invalid_token("malformed server reference"))?;
        let scope = match tag {
            "env" => Scope::Environment,
            "user" => Scope::User,
            _ => return Err(DockhandError::invalid_token("unknown scope tag")),
        };
        let index = idx
            .parse()
            .map_err(|_| DockhandError::invalid_token("non-numeric index"))?;
        Ok(Self { scope, index })
    }
}

impl fmt::Display for ServerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.scope {
            Scope::Environment => "env",
            Scope::User => "user",
        };
        write!(f, "{}_{}", tag, self.index)
    }
}

/// Lifecycle verb carried by a container action token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerAction {
    Start,
    Stop,
    Restart,
}

impl ContainerAction {
    fn as_str(self) -> &'static str {
        match self {
            ContainerAction::Start => "start",
            ContainerAction::Stop => "stop",
            ContainerAction::Restart => "restart",
        }
    }

    fn decode(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(ContainerAction::Start),
            "stop" => Ok(ContainerAction::Stop),
            "restart" => Ok(ContainerAction::Restart),
            _ => Err(DockhandError::invalid_token("unknown container action")),
        }
    }
}

/// The closed set of routing tokens the panel understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Main menu
    Menu,
    /// Local container list
    ListLocal,
    /// Local summary stats
    StatsLocal,
    /// Server overview menu
    ServerMenu,
    /// Start the add-server wizard
    AddServer,
    /// Remote container list for one server
    ServerConnect(ServerRef),
    /// Remote stats for one server
    ServerStats(ServerRef),
    /// Ask for delete confirmation
    ServerDelete(ServerRef),
    /// Confirmed delete
    ServerDeleteConfirm(ServerRef),
    /// Detail view of one remote container
    ContainerInfo { server: ServerRef, name: String },
    /// Lifecycle action against one remote container
    ContainerAction {
        server: ServerRef,
        action: ContainerAction,
        name: String,
    },
    /// Log tail of one remote container
    ContainerLogs { server: ServerRef, name: String },
    /// Detail view of one local container
    LocalInfo { name: String },
    /// Lifecycle action against one local container
    LocalAction { action: ContainerAction, name: String },
    /// Log tail of one local container
    LocalLogs { name: String },
}

impl Token {
    /// Encode to the wire form carried in button callback data.
    pub fn encode(&self) -> String {
        match self {
            Token::Menu => "menu".to_string(),
            Token::ListLocal => "list".to_string(),
            Token::StatsLocal => "stats".to_string(),
            Token::ServerMenu => "srv_menu".to_string(),
            Token::AddServer => "srv_add".to_string(),
            Token::ServerConnect(r) => format!("srv_connect_{}", r),
            Token::ServerStats(r) => format!("srv_stats_{}", r),
            Token::ServerDelete(r) => format!("srv_delete_{}", r),
            Token::ServerDeleteConfirm(r) => format!("srv_delete_confirm_{}", r),
            Token::ContainerInfo { server, name } => {
                format!("{}|info|{}|{}", CONTAINER_PREFIX, server, encode_name(name))
            }
            Token::ContainerAction {
                server,
                action,
                name,
            } => format!(
                "{}|action|{}|{}|{}",
                CONTAINER_PREFIX,
                server,
                action.as_str(),
                encode_name(name)
            ),
            Token::ContainerLogs { server, name } => {
                format!("{}|logs|{}|{}", CONTAINER_PREFIX, server, encode_name(name))
            }
            Token::LocalInfo { name } => {
                format!("{}|info|{}", LOCAL_PREFIX, encode_name(name))
            }
            Token::LocalAction { action, name } => format!(
                "{}|action|{}|{}",
                LOCAL_PREFIX,
                action.as_str(),
                encode_name(name)
            ),
            Token::LocalLogs { name } => {
                format!("{}|logs|{}", LOCAL_PREFIX, encode_name(name))
            }
        }
    }

    /// Decode callback data back into a token.
    ///
    /// Any shape violation fails with `InvalidToken`; the caller surfaces a
    /// generic denial rather than the reason.
    pub fn decode(data: &str) -> Result<Token> {
        match data {
            "menu" => return Ok(Token::Menu),
            "list" => return Ok(Token::ListLocal),
            "stats" => return Ok(Token::StatsLocal),
            "srv_menu" => return Ok(Token::ServerMenu),
            "srv_add" => return Ok(Token::AddServer),
            _ => {}
        }

        // Order matters: srv_delete_confirm_ is a prefix of srv_delete_
        if let Some(rest) = data.strip_prefix("srv_delete_confirm_") {
            return Ok(Token::ServerDeleteConfirm(ServerRef::decode(rest)?));
        }
        if let Some(rest) = data.strip_prefix("srv_delete_") {
            return Ok(Token::ServerDelete(ServerRef::decode(rest)?));
        }
        if let Some(rest) = data.strip_prefix("srv_connect_") {
            return Ok(Token::ServerConnect(ServerRef::decode(rest)?));
        }
        if let Some(rest) = data.strip_prefix("srv_stats_") {
            return Ok(Token::ServerStats(ServerRef::decode(rest)?));
        }

        if data.starts_with(CONTAINER_PREFIX) {
            return decode_container(data);
        }
        if data.starts_with(LOCAL_PREFIX) {
            return decode_local(data);
        }

        Err(DockhandError::invalid_token("unrecognized token"))
    }
}

/// Percent-encode a container name for the final token field.
fn encode_name(name: &str) -> String {
    utf8_percent_encode(name, NON_ALPHANUMERIC).to_string()
}

/// Decode the final, percent-encoded name field.
fn decode_name(enc: &str) -> Result<String> {
    let decoded = percent_decode_str(enc)
        .decode_utf8()
        .map_err(|_| DockhandError::invalid_token("name is not valid UTF-8"))?;
    Ok(decoded.into_owned())
}

fn decode_container(data: &str) -> Result<Token> {
    // Peek at the verb to learn the fixed-field count, then split so the
    // name remainder is captured whole even if it contains the delimiter.
    let mut head = data.splitn(3, DELIM);
    let _prefix = head.next();
    let verb = head
        .next()
        .ok_or_else(|| DockhandError::invalid_token("missing action verb"))?;

    match verb {
        "info" | "logs" => {
            let mut parts = data.splitn(4, DELIM);
            let (_, _, server, name) = (
                parts.next(),
                parts.next(),
                parts.next().ok_or_else(missing_field)?,
                parts.next().ok_or_else(missing_field)?,
            );
            let server = ServerRef::decode(server)?;
            let name = decode_name(name)?;
            if verb == "info" {
                Ok(Token::ContainerInfo { server, name })
            } else {
                Ok(Token::ContainerLogs { server, name })
            }
        }
        "action" => {
            let mut parts = data.splitn(5, DELIM);
            let (_, _, server, action, name) = (
                parts.next(),
                parts.next(),
                parts.next().ok_or_else(missing_field)?,
                parts.next().ok_or_else(missing_field)?,
                parts.next().ok_or_else(missing_field)?,
            );
            Ok(Token::ContainerAction {
                server: ServerRef::decode(server)?,
                action: ContainerAction::decode(action)?,
                name: decode_name(name)?,
            })
        }
        _ => Err(DockhandError::invalid_token("unknown action verb")),
    }
}

fn decode_local(data: &str) -> Result<Token> {
    let mut head = data.splitn(3, DELIM);
    let _prefix = head.next();
    let verb = head
        .next()
        .ok_or_else(|| DockhandError::invalid_token("missing action verb"))?;

    match verb {
        "info" | "logs" => {
            let mut parts = data.splitn(3, DELIM);
            let (_, _, name) = (
                parts.next(),
                parts.next(),
                parts.next().ok_or_else(missing_field)?,
            );
            let name = decode_name(name)?;
            if verb == "info" {
                Ok(Token::LocalInfo { name })
            } else {
                Ok(Token::LocalLogs { name })
            }
        }
        "action" => {
            let mut parts = data.splitn(4, DELIM);
            let (_, _, action, name) = (
                parts.next(),
                parts.next(),
                parts.next().ok_or_else(missing_field)?,
                parts.next().ok_or_else(missing_field)?,
            );
            Ok(Token::LocalAction {
                action: ContainerAction::decode(action)?,
                name: decode_name(name)?,
            })
        }
        _ => Err(DockhandError::invalid_token("unknown action verb")),
    }
}

fn missing_field() -> DockhandError {
    DockhandError::invalid_token("wrong field count")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(token: Token) {
        let encoded = token.encode();
        assert_eq!(Token::decode(&encoded).unwrap(), token);
    }

    #[test]
    fn test_simple_tokens_roundtrip() {
        roundtrip(Token::Menu);
        roundtrip(Token::ListLocal);
        roundtrip(Token::StatsLocal);
        roundtrip(Token::ServerMenu);
        roundtrip(Token::AddServer);
    }

    #[test]
    fn test_server_tokens_roundtrip() {
        roundtrip(Token::ServerConnect(ServerRef::environment(0)));
        roundtrip(Token::ServerStats(ServerRef::user(7)));
        roundtrip(Token::ServerDelete(ServerRef::user(1)));
        roundtrip(Token::ServerDeleteConfirm(ServerRef::user(1)));
    }

    #[test]
    fn test_container_tokens_roundtrip() {
        roundtrip(Token::ContainerInfo {
            server: ServerRef::environment(2),
            name: "web-frontend".to_string(),
        });
        roundtrip(Token::ContainerAction {
            server: ServerRef::user(0),
            action: ContainerAction::Restart,
            name: "db".to_string(),
        });
        roundtrip(Token::ContainerLogs {
            server: ServerRef::user(3),
            name: "worker_1".to_string(),
        });
    }

    #[test]
    fn test_local_tokens_roundtrip() {
        roundtrip(Token::LocalInfo {
            name: "web".to_string(),
        });
        roundtrip(Token::LocalAction {
            action: ContainerAction::Start,
            name: "db|replica".to_string(),
        });
        roundtrip(Token::LocalLogs {
            name: "worker%1".to_string(),
        });
    }

    #[test]
    fn test_local_missing_field_is_invalid() {
        assert!(Token::decode("locc|info").is_err());
        assert!(Token::decode("locc|action|start").is_err());
        assert!(Token::decode("locc|purge|web").is_err());
    }

    #[test]
    fn test_name_with_delimiter_roundtrips() {
        // Names containing the delimiter or percent signs must survive
        for name in ["a|b|c", "50%cpu", "x|%|y", "|", "%7C"] {
            roundtrip(Token::ContainerInfo {
                server: ServerRef::user(0),
                name: name.to_string(),
            });
            roundtrip(Token::ContainerAction {
                server: ServerRef::environment(1),
                action: ContainerAction::Stop,
                name: name.to_string(),
            });
        }
    }

    #[test]
    fn test_bare_integer_resolves_to_user_scope() {
        assert_eq!(ServerRef::decode("4").unwrap(), ServerRef::user(4));
        assert_eq!(
            Token::decode("srv_connect_2").unwrap(),
            Token::ServerConnect(ServerRef::user(2))
        );
    }

    #[test]
    fn test_missing_field_is_invalid() {
        let err = Token::decode("sshc|info|abc").unwrap_err();
        assert!(matches!(err, DockhandError::InvalidToken(_)));
    }

    #[test]
    fn test_non_numeric_index_is_invalid() {
        assert!(Token::decode("srv_connect_env_abc").is_err());
        assert!(Token::decode("sshc|logs|user_x|name").is_err());
    }

    #[test]
    fn test_unknown_scope_tag_is_invalid() {
        assert!(ServerRef::decode("global_0").is_err());
        assert!(Token::decode("sshc|info|sys_1|name").is_err());
    }

    #[test]
    fn test_unknown_verb_is_invalid() {
        assert!(Token::decode("sshc|inspect|env_0|name").is_err());
        assert!(Token::decode("sshc|action|env_0|pause|name").is_err());
        assert!(Token::decode("garbage").is_err());
    }

    #[test]
    fn test_delete_confirm_decodes_before_delete() {
        assert_eq!(
            Token::decode("srv_delete_confirm_user_0").unwrap(),
            Token::ServerDeleteConfirm(ServerRef::user(0))
        );
        assert_eq!(
            Token::decode("srv_delete_user_0").unwrap(),
            Token::ServerDelete(ServerRef::user(0))
        );
    }
}
