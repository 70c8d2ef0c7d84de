use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// An offer or answer as produced by the peer-connection capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
}

/// What two clients exchange through the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SignalPayload {
    Description(SessionDescription),
    Candidate(IceCandidate),
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed signaling payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Relay-opaque body of a `signal` envelope.
///
/// The server forwards it untouched; only clients interpret it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalData(pub serde_json::Value);

impl SignalData {
    pub fn encode(payload: &SignalPayload) -> Result<Self, PayloadError> {
        Ok(Self(serde_json::to_value(payload)?))
    }

    pub fn decode(&self) -> Result<SignalPayload, PayloadError> {
        Ok(SignalPayload::deserialize(&self.0)?)
    }
}
