//! Acknowledgment builder.
//!
//! Stateless constructors for store acks and their addressing.

use crate::domain::{ClientConnection, RejectReason};
use crate::ipc::packets::{cmd, MessageStoreAck, RemotingEvent, RespPacket};

/// Builds a store ack response packet for the request identified by `opaque`.
pub fn store_ack(opaque: u32, message_id: &str, success: bool, feedback: &str) -> RespPacket {
    RespPacket {
        opaque,
        cmd_type: cmd::MESSAGE_STORE_ACK,
        ack: MessageStoreAck {
            message_id: message_id.to_string(),
            status: success,
            feedback: feedback.to_string(),
        },
    }
}

/// Addresses a packet to the connection it answers.
pub fn address(packet: RespPacket, client: &ClientConnection) -> RemotingEvent {
    RemotingEvent {
        packet,
        targets: vec![client.remote_addr().to_string()],
    }
}

/// Negative ack for `reason`, addressed to `client`.
pub fn reject(
    opaque: u32,
    message_id: &str,
    reason: RejectReason,
    client: &ClientConnection,
) -> RemotingEvent {
    address(
        store_ack(opaque, message_id, false, reason.feedback()),
        client,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGE_ID: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_store_ack_fields() {
        let packet = store_ack(42, MESSAGE_ID, false, "Expired Message!");

        assert_eq!(packet.opaque, 42);
        assert_eq!(packet.cmd_type, cmd::MESSAGE_STORE_ACK);
        assert_eq!(packet.ack.message_id, MESSAGE_ID);
        assert!(!packet.ack.status);
        assert_eq!(packet.ack.feedback, "Expired Message!");
    }

    #[test]
    fn test_address_targets_client() {
        let client = ClientConnection::new("192.168.1.20:52110");
        let event = address(store_ack(1, MESSAGE_ID, true, "ok"), &client);

        assert_eq!(event.targets, vec!["192.168.1.20:52110".to_string()]);
        assert!(event.packet.ack.status);
    }

    #[test]
    fn test_reject_uses_reason_feedback() {
        let client = ClientConnection::new("127.0.0.1:9000");
        let event = reject(7, "bad", RejectReason::InvalidMessageId, &client);

        assert_eq!(event.packet.opaque, 7);
        assert_eq!(event.packet.ack.message_id, "bad");
        assert!(!event.packet.ack.status);
        assert_eq!(event.packet.ack.feedback, "Invalid MessageId For UUID!");
    }

    #[test]
    fn test_ack_serializes_with_feedback() {
        let packet = store_ack(3, MESSAGE_ID, false, "UnSupport Topic Message!");
        let json = serde_json::to_value(&packet).unwrap();

        assert_eq!(json["cmd_type"], 4);
        assert_eq!(json["ack"]["feedback"], "UnSupport Topic Message!");
        assert_eq!(json["ack"]["status"], false);
    }
}
