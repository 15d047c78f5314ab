//! # Node Configuration
//!
//! One flat TOML table, every field defaulted, overridable per field with
//! `DCRL_*` environment variables.
//!
//! ```toml
//! role = "participant"
//! listen_addr = "0.0.0.0:7000"
//! discovery = "rendezvous.local:6000"
//! become_discoverable = true
//! peers = ["10.0.0.5:7000"]
//! trust_store = "./trust"
//! identity = "./keys/node"
//! ```

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use dcrl_01_trust::SelfSignedPolicy;
use serde::{Deserialize, Serialize};
use shared_types::NetworkIdentity;
use thiserror::Error;

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "DCRL_";

/// Node role. Each role is a superset of the one before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Observer,
    Participant,
    Authority,
}

impl Role {
    /// Participants and authorities sign with a node identity.
    pub fn needs_identity(self) -> bool {
        !matches!(self, Role::Observer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Observer => "observer",
            Role::Participant => "participant",
            Role::Authority => "authority",
        })
    }
}

impl FromStr for Role {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "observer" => Ok(Role::Observer),
            "participant" => Ok(Role::Participant),
            "authority" => Ok(Role::Authority),
            _ => Err(ConfigError::UnknownRole(s.to_string())),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown role '{0}' (expected observer, participant or authority)")]
    UnknownRole(String),

    #[error("Invalid address for {field}: '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("Invalid value for {var}: '{value}'")]
    InvalidEnv { var: String, value: String },

    #[error("Role {0} requires an identity")]
    MissingIdentity(Role),
}

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    pub role: Role,
    /// Address of the inbound accept loop.
    pub listen_addr: String,
    /// Rendezvous service; when absent only `peers` is used.
    pub discovery: Option<String>,
    /// Register with the rendezvous service (and say goodbye on shutdown).
    pub become_discoverable: bool,
    /// Static peers, connected in addition to the rendezvous list.
    pub peers: Vec<String>,
    /// Directory of trusted certificates.
    pub trust_store: PathBuf,
    /// Base path of `<base>.cert` / `<base>.priv`.
    pub identity: Option<PathBuf>,
    /// Peers asked first for the blockchain.
    pub preferred_peers: Vec<String>,
    pub blockchain_request_timeout_secs: u64,
    /// Self-signed certificates must also be in the trust store.
    pub require_anchored_self_signed: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            role: Role::Observer,
            listen_addr: "0.0.0.0:0".to_string(),
            discovery: None,
            become_discoverable: false,
            peers: Vec::new(),
            trust_store: PathBuf::from("./trust"),
            identity: None,
            preferred_peers: Vec::new(),
            blockchain_request_timeout_secs: 10,
            require_anchored_self_signed: false,
        }
    }
}

impl NodeConfig {
    /// Read a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse a TOML string. Missing fields take their defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `DCRL_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from `lookup` (called with the full variable name).
    /// List fields take comma-separated values.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = get("ROLE") {
            self.role = v.parse()?;
        }
        if let Some(v) = get("LISTEN_ADDR") {
            self.listen_addr = v;
        }
        if let Some(v) = get("DISCOVERY") {
            self.discovery = (!v.trim().is_empty()).then_some(v);
        }
        if let Some(v) = get("BECOME_DISCOVERABLE") {
            self.become_discoverable = parse_env("BECOME_DISCOVERABLE", &v)?;
        }
        if let Some(v) = get("PEERS") {
            self.peers = split_list(&v);
        }
        if let Some(v) = get("TRUST_STORE") {
            self.trust_store = PathBuf::from(v);
        }
        if let Some(v) = get("IDENTITY") {
            self.identity = (!v.trim().is_empty()).then(|| PathBuf::from(v));
        }
        if let Some(v) = get("PREFERRED_PEERS") {
            self.preferred_peers = split_list(&v);
        }
        if let Some(v) = get("BLOCKCHAIN_REQUEST_TIMEOUT_SECS") {
            self.blockchain_request_timeout_secs =
                parse_env("BLOCKCHAIN_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("REQUIRE_ANCHORED_SELF_SIGNED") {
            self.require_anchored_self_signed = parse_env("REQUIRE_ANCHORED_SELF_SIGNED", &v)?;
        }
        Ok(())
    }

    /// Check everything startup will need before any socket is opened.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_socket()?;
        self.discovery_identity()?;
        self.peer_identities()?;
        self.preferred_identities()?;
        if self.role.needs_identity() && self.identity.is_none() {
            return Err(ConfigError::MissingIdentity(self.role));
        }
        Ok(())
    }

    pub fn listen_socket(&self) -> Result<SocketAddr, ConfigError> {
        self.listen_addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddress {
                field: "listen_addr",
                value: self.listen_addr.clone(),
            })
    }

    pub fn discovery_identity(&self) -> Result<Option<NetworkIdentity>, ConfigError> {
        self.discovery
            .as_deref()
            .map(|addr| parse_identity("discovery", addr))
            .transpose()
    }

    pub fn peer_identities(&self) -> Result<Vec<NetworkIdentity>, ConfigError> {
        self.peers
            .iter()
            .map(|addr| parse_identity("peers", addr))
            .collect()
    }

    pub fn preferred_identities(&self) -> Result<Vec<NetworkIdentity>, ConfigError> {
        self.preferred_peers
            .iter()
            .map(|addr| parse_identity("preferred_peers", addr))
            .collect()
    }

    pub fn blockchain_timeout(&self) -> Duration {
        Duration::from_secs(self.blockchain_request_timeout_secs)
    }

    pub fn self_signed_policy(&self) -> SelfSignedPolicy {
        if self.require_anchored_self_signed {
            SelfSignedPolicy::RequireAnchor
        } else {
            SelfSignedPolicy::Accept
        }
    }
}

fn parse_identity(field: &'static str, value: &str) -> Result<NetworkIdentity, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidAddress {
            field,
            value: value.to_string(),
        })
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var: format!("{ENV_PREFIX}{name}"),
        value: value.to_string(),
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
