//! OSC wire codec boundary
//!
//! Thin wrapper around `rosc`; the rest of the workspace never sees raw packets.

use rosc::{decoder, encoder, OscPacket};

use crate::{ContractError, Message};

/// Largest datagram a listener will read (max UDP payload)
pub const MAX_DATAGRAM_SIZE: usize = 65_536;

/// Decode one UDP datagram into the messages it carries
///
/// Bundles are flattened depth-first in content order; time tags are ignored.
pub fn decode_datagram(datagram: &[u8]) -> Result<Vec<Message>, ContractError> {
    let (_, packet) =
        decoder::decode_udp(datagram).map_err(|e| ContractError::decode(format!("{e:?}")))?;

    let mut messages = Vec::new();
    flatten(packet, &mut messages);
    Ok(messages)
}

fn flatten(packet: OscPacket, out: &mut Vec<Message>) {
    match packet {
        OscPacket::Message(msg) => out.push(Message::new(msg)),
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                flatten(inner, out);
            }
        }
    }
}

/// Encode a message for the wire
pub fn encode_message(message: &Message) -> Result<Vec<u8>, ContractError> {
    encoder::encode(&OscPacket::Message(message.as_osc().clone())).map_err(|e| {
        ContractError::Encode {
            addr: message.addr().to_string(),
            message: format!("{e:?}"),
        }
    })
}
