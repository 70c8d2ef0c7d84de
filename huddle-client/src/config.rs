use huddle_core::IceServerConfig;
use huddle_core::utils::default_stun_urls;

/// Who sends the offer when two participants meet in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitiatorPolicy {
    /// Members already in the room offer to each newcomer.
    #[default]
    ExistingMembers,
    /// The newcomer offers to every member it finds on join.
    Newcomer,
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Overrides the servers announced by the coordination server.
    pub ice_servers: Option<Vec<IceServerConfig>>,
    pub initiator_policy: InitiatorPolicy,
}

impl ClientConfig {
    /// Local override, else what the server announced, else public STUN.
    pub fn resolve_ice_servers(&self, announced: &[IceServerConfig]) -> Vec<IceServerConfig> {
        if let Some(servers) = &self.ice_servers {
            return servers.clone();
        }
        if !announced.is_empty() {
            return announced.to_vec();
        }
        vec![IceServerConfig {
            urls: default_stun_urls(),
            username: None,
            credential: None,
        }]
    }
}
