use clap::Parser;
use huddle_core::IceServerConfig;
use huddle_server::{AppState, ServerConfig};
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "huddle-server", version, about = "Voice room signaling server")]
struct Args {
    #[arg(long, env = "HUDDLE_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// TURN/STUN url handed to clients instead of the public STUN defaults.
    #[arg(long, env = "TURN_URL")]
    turn_url: Option<String>,

    #[arg(long, env = "TURN_USERNAME")]
    turn_username: Option<String>,

    #[arg(long, env = "TURN_CREDENTIAL")]
    turn_credential: Option<String>,

    #[arg(long, env = "HUDDLE_MAX_PARTICIPANTS")]
    max_participants: Option<NonZeroUsize>,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let mut config = ServerConfig {
            bind_addr: self.bind,
            max_participants: self.max_participants,
            ..ServerConfig::default()
        };

        if let Some(turn_url) = self.turn_url {
            config.ice_servers = vec![IceServerConfig {
                urls: vec![turn_url],
                username: self.turn_username,
                credential: self.turn_credential,
            }];
        }

        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Args::parse().into_config();
    info!("Initializing huddle server...");

    let state = Arc::new(AppState::new(&config));
    let app = huddle_server::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Signaling server listening on ws://{}/ws", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
