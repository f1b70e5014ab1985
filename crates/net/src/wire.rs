use glam::Vec3;
use peerspace_common::{PeerId, Pose};
use serde::{Deserialize, Serialize};

/// Errors from encoding, decoding or moving messages.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown event: {0:?}")]
    UnknownEvent(String),
}

/// `{x, y, z}` vector as sent over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WireVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for WireVec3 {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<WireVec3> for Vec3 {
    fn from(v: WireVec3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

/// Euler rotation. Web clients serialize their rotation objects with
/// underscore-prefixed fields plus an `_order` tag, which is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WireEuler {
    #[serde(alias = "_x")]
    pub x: f32,
    #[serde(alias = "_y")]
    pub y: f32,
    #[serde(alias = "_z")]
    pub z: f32,
}

impl From<Vec3> for WireEuler {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<WireEuler> for Vec3 {
    fn from(e: WireEuler) -> Self {
        Vec3::new(e.x, e.y, e.z)
    }
}

/// Outbound per-frame state of the local rig.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: WireVec3,
    pub rotation: WireEuler,
}

impl From<Pose> for PlayerState {
    fn from(pose: Pose) -> Self {
        Self {
            position: pose.position.into(),
            rotation: pose.rotation.into(),
        }
    }
}

/// Inbound `player` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerStateMessage {
    pub socketid: PeerId,
    pub position: WireVec3,
    pub rotation: WireEuler,
}

impl PeerStateMessage {
    pub fn new(socketid: impl Into<String>, pose: Pose) -> Self {
        Self {
            socketid: PeerId::new(socketid),
            position: pose.position.into(),
            rotation: pose.rotation.into(),
        }
    }
}

/// Inbound `offline` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineMessage {
    pub socketid: PeerId,
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum InboundMessage {
    Player(PeerStateMessage),
    Offline(OfflineMessage),
}

impl InboundMessage {
    pub fn peer(&self) -> &PeerId {
        match self {
            Self::Player(m) => &m.socketid,
            Self::Offline(m) => &m.socketid,
        }
    }
}

/// Event-name plus payload framing, one per JSON line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    pub data: serde_json::Value,
}

impl Envelope {
    pub fn player(state: &PlayerState) -> Result<Self, NetError> {
        Ok(Self {
            event: "player".into(),
            data: serde_json::to_value(state)?,
        })
    }
}

/// Decode an inbound payload delivered under the given event name.
pub fn decode_inbound(event: &str, payload: &str) -> Result<InboundMessage, NetError> {
    match event {
        "player" => Ok(InboundMessage::Player(serde_json::from_str(payload)?)),
        "offline" => Ok(InboundMessage::Offline(serde_json::from_str(payload)?)),
        other => Err(NetError::UnknownEvent(other.to_owned())),
    }
}

/// Decode one `{"event": ..., "data": ...}` line.
pub fn decode_envelope(line: &str) -> Result<InboundMessage, NetError> {
    let envelope: Envelope = serde_json::from_str(line)?;
    match envelope.event.as_str() {
        "player" => Ok(InboundMessage::Player(serde_json::from_value(envelope.data)?)),
        "offline" => Ok(InboundMessage::Offline(serde_json::from_value(envelope.data)?)),
        _ => Err(NetError::UnknownEvent(envelope.event)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_shape() {
        let state = PlayerState::from(Pose::new(
            Vec3::new(1.0, 0.0, -2.5),
            Vec3::new(0.0, 0.5, 0.0),
        ));
        let json: serde_json::Value = serde_json::to_value(state).unwrap();
        assert_eq!(json["position"]["x"], 1.0);
        assert_eq!(json["position"]["z"], -2.5);
        assert_eq!(json["rotation"]["y"], 0.5);
    }

    #[test]
    fn player_accepts_underscore_rotation() {
        let payload = r#"{
            "socketid": "abc",
            "position": {"x": 1, "y": 2, "z": 3},
            "rotation": {"_x": 0, "_y": 0.1, "_z": 0, "_order": "XYZ"}
        }"#;
        let msg = decode_inbound("player", payload).unwrap();
        let InboundMessage::Player(m) = msg else {
            panic!("expected player message");
        };
        assert_eq!(m.socketid, PeerId::new("abc"));
        assert_eq!(Vec3::from(m.position), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.rotation.y, 0.1);
    }

    #[test]
    fn offline_decodes() {
        let msg = decode_inbound("offline", r#"{"socketid": "abc"}"#).unwrap();
        assert_eq!(msg.peer(), &PeerId::new("abc"));
        assert!(matches!(msg, InboundMessage::Offline(_)));
    }

    #[test]
    fn unknown_event_is_an_error() {
        let err = decode_inbound("chat", "{}").unwrap_err();
        assert!(matches!(err, NetError::UnknownEvent(e) if e == "chat"));
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(matches!(
            decode_inbound("player", r#"{"socketid": 5}"#),
            Err(NetError::Json(_))
        ));
    }

    #[test]
    fn envelope_line_decodes() {
        let line = r#"{"event":"player","data":{"socketid":"p1","position":{"x":4,"y":5,"z":6},"rotation":{"x":0,"y":0,"z":0}}}"#;
        let msg = decode_envelope(line).unwrap();
        assert_eq!(msg.peer().as_str(), "p1");

        // The tagged enum form matches the envelope form.
        let direct: InboundMessage = serde_json::from_str(line).unwrap();
        assert_eq!(direct, msg);
    }
}
