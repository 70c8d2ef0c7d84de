use huddle_core::IceServerConfig;
use huddle_core::utils::default_stun_urls;
use std::net::SocketAddr;
use std::num::NonZeroUsize;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Pushed to every client in `iceConfig`.
    pub ice_servers: Vec<IceServerConfig>,
    /// Per-room cap; `None` means unbounded.
    pub max_participants: Option<NonZeroUsize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            ice_servers: vec![IceServerConfig {
                urls: default_stun_urls(),
                username: None,
                credential: None,
            }],
            max_participants: None,
        }
    }
}
