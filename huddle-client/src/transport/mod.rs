mod signal_channel;
mod ws_transport;

pub use signal_channel::*;
pub use ws_transport::*;
