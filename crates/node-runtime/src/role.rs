//! Role construction. The configured role decides how many layers of
//! handler wrap the observer.

use std::sync::Arc;

use dcrl_01_trust::NodeIdentity;
use dcrl_02_peer_protocol::{
    AuthorityHandler, ObserverHandler, ObserverSettings, ParticipantHandler, ProtocolHandler,
    RoleContext,
};

use crate::config::{ConfigError, Role};

/// The handler stack of a running node.
#[derive(Clone)]
pub enum NodeRole {
    Observer(Arc<ObserverHandler>),
    Participant(Arc<ParticipantHandler>),
    Authority(Arc<AuthorityHandler>),
}

impl NodeRole {
    pub fn build(
        role: Role,
        context: RoleContext,
        settings: ObserverSettings,
        identity: Option<NodeIdentity>,
    ) -> Result<Self, ConfigError> {
        let observer = ObserverHandler::new(context, settings);
        if role == Role::Observer {
            return Ok(NodeRole::Observer(Arc::new(observer)));
        }

        let identity = identity.ok_or(ConfigError::MissingIdentity(role))?;
        let participant = ParticipantHandler::new(observer, identity);
        Ok(match role {
            Role::Authority => NodeRole::Authority(Arc::new(AuthorityHandler::new(participant))),
            _ => NodeRole::Participant(Arc::new(participant)),
        })
    }

    pub fn role(&self) -> Role {
        match self {
            NodeRole::Observer(_) => Role::Observer,
            NodeRole::Participant(_) => Role::Participant,
            NodeRole::Authority(_) => Role::Authority,
        }
    }

    /// The outermost layer, as seen by the dispatcher.
    pub fn handler(&self) -> Arc<dyn ProtocolHandler> {
        match self {
            NodeRole::Observer(h) => Arc::clone(h) as Arc<dyn ProtocolHandler>,
            NodeRole::Participant(h) => Arc::clone(h) as Arc<dyn ProtocolHandler>,
            NodeRole::Authority(h) => Arc::clone(h) as Arc<dyn ProtocolHandler>,
        }
    }

    pub fn observer(&self) -> &ObserverHandler {
        match self {
            NodeRole::Observer(h) => h,
            NodeRole::Participant(h) => h.observer(),
            NodeRole::Authority(h) => h.participant().observer(),
        }
    }

    pub fn participant(&self) -> Option<&ParticipantHandler> {
        match self {
            NodeRole::Observer(_) => None,
            NodeRole::Participant(h) => Some(h),
            NodeRole::Authority(h) => Some(h.participant()),
        }
    }

    pub fn authority(&self) -> Option<&AuthorityHandler> {
        match self {
            NodeRole::Authority(h) => Some(h),
            _ => None,
        }
    }

    pub fn identity(&self) -> Option<&NodeIdentity> {
        self.participant().map(ParticipantHandler::node_identity)
    }
}
