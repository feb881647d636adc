//! Records exposed to readers and the inbound message protocol.

use serde::{Deserialize, Serialize};

use crate::ids::{CheckInId, ClientId};

/// Status given to every connection entry when it is registered.
pub const CONNECTED_STATUS: &str = "connected";

/// Text payload a client sends to keep its connection alive.
pub const KEEPALIVE_TOKEN: &str = "ping";

/// Text payload sent back for every keepalive.
pub const KEEPALIVE_REPLY: &str = "pong";

/// A live connection as seen by `/clients`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientEntry {
    pub id: ClientId,
    pub status: String,
}

impl ClientEntry {
    pub fn connected(id: ClientId) -> Self {
        Self {
            id,
            status: CONNECTED_STATUS.to_owned(),
        }
    }
}

/// The shared check-in record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: CheckInId,
    pub status: String,
}

/// Inbound state-update payload.
///
/// Both fields fall back to empty strings when absent and unknown fields are
/// ignored. Keys are accepted in lower case or capitalised (`Status`).
/// `id` is parsed but never used for addressing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StatusUpdate {
    #[serde(alias = "Id")]
    pub id: String,
    #[serde(alias = "Status")]
    pub status: String,
}

impl StatusUpdate {
    pub fn parse(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}

/// A data frame received from or sent to a streaming connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

impl Frame {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(t) => t.as_bytes(),
            Self::Binary(b) => b,
        }
    }
}

/// What an inbound frame asks the session to do.
#[derive(Debug)]
pub enum Inbound {
    Keepalive,
    Update(StatusUpdate),
    Malformed(serde_json::Error),
}

impl Inbound {
    /// Only text frames can carry the keepalive token; everything else is
    /// treated as a status update.
    pub fn classify(frame: &Frame) -> Self {
        if let Frame::Text(text) = frame {
            if text.trim() == KEEPALIVE_TOKEN {
                return Self::Keepalive;
            }
        }
        match StatusUpdate::parse(frame.as_bytes()) {
            Ok(update) => Self::Update(update),
            Err(e) => Self::Malformed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_is_keepalive() {
        assert!(matches!(Inbound::classify(&Frame::text("ping")), Inbound::Keepalive));
    }

    #[test]
    fn ping_with_whitespace_is_keepalive() {
        assert!(matches!(
            Inbound::classify(&Frame::text("  ping\r\n")),
            Inbound::Keepalive
        ));
    }

    #[test]
    fn keepalive_is_case_sensitive() {
        assert!(matches!(
            Inbound::classify(&Frame::text("PING")),
            Inbound::Malformed(_)
        ));
    }

    #[test]
    fn binary_ping_is_not_keepalive() {
        assert!(matches!(
            Inbound::classify(&Frame::Binary(b"ping".to_vec())),
            Inbound::Malformed(_)
        ));
    }

    #[test]
    fn status_update_parses() {
        let frame = Frame::text(r#"{"id":"x","status":"busy"}"#);
        match Inbound::classify(&frame) {
            Inbound::Update(update) => {
                assert_eq!(update.id, "x");
                assert_eq!(update.status, "busy");
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn binary_status_update_parses() {
        let frame = Frame::Binary(br#"{"status":"away"}"#.to_vec());
        match Inbound::classify(&frame) {
            Inbound::Update(update) => assert_eq!(update.status, "away"),
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let update = StatusUpdate::parse(b"{}").unwrap();
        assert_eq!(update, StatusUpdate::default());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let update = StatusUpdate::parse(br#"{"status":"busy","extra":42}"#).unwrap();
        assert_eq!(update.status, "busy");
    }

    #[test]
    fn capitalised_keys_are_accepted() {
        let update = StatusUpdate::parse(br#"{"Id":"x","Status":"busy"}"#).unwrap();
        assert_eq!(update.id, "x");
        assert_eq!(update.status, "busy");
    }

    #[test]
    fn null_payload_is_malformed() {
        assert!(matches!(
            Inbound::classify(&Frame::text("null")),
            Inbound::Malformed(_)
        ));
    }

    #[test]
    fn garbled_payload_is_malformed() {
        assert!(matches!(
            Inbound::classify(&Frame::text("}{garbled")),
            Inbound::Malformed(_)
        ));
    }

    #[test]
    fn non_object_json_is_malformed() {
        assert!(matches!(
            Inbound::classify(&Frame::text("[1,2,3]")),
            Inbound::Malformed(_)
        ));
        assert!(matches!(
            Inbound::classify(&Frame::text(r#"{"status":5}"#)),
            Inbound::Malformed(_)
        ));
    }

    #[test]
    fn client_entry_wire_shape() {
        let entry = ClientEntry::connected(ClientId::from_raw("client_1"));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({"id": "client_1", "status": "connected"}));
    }

    #[test]
    fn check_in_wire_shape() {
        let record = CheckIn {
            id: CheckInId::from_raw("checkin_1"),
            status: String::new(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"id": "checkin_1", "status": ""}));
    }
}
