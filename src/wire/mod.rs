//! The GWMP (Semtech UDP) wire format: header framing and token handling
//! here, radio-metadata codecs in `datarate`/`codingrate`, and the two
//! JSON bodies in `rxpk`/`txpk`. Only the five packet types below are
//! recognized; there is no `PKT_TX_ACK`.

pub mod base64;
pub mod codingrate;
pub mod datarate;
pub mod error;
pub mod rxpk;
pub mod txpk;

pub use codingrate::CodingRate;
pub use datarate::{Bandwidth, DataRate, SpreadingFactor};
pub use error::ParseError;

use crate::config::GatewayId;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use rand::Rng;

pub const PROTOCOL_VERSION: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Identifier {
    PushData = 0,
    PushAck = 1,
    PullData = 2,
    PullResp = 3,
    PullAck = 4,
}

/// Two random bytes correlating a request with its acknowledgement.
pub fn random_token() -> [u8; 2] {
    let mut rng = rand::thread_rng();
    [rng.gen(), rng.gen()]
}

/// Writes the 12-byte header used by gateway-originated datagrams
/// (PUSH_DATA, PULL_DATA): version, token, identifier, gateway identity.
pub fn write_uplink_header(buf: &mut Vec<u8>, token: [u8; 2], identifier: Identifier, gateway_id: GatewayId) {
    buf.push(PROTOCOL_VERSION);
    buf.push(token[0]);
    buf.push(token[1]);
    buf.push(identifier.into());
    buf.extend_from_slice(&gateway_id.to_be_bytes());
}

/// The 4-byte header carried by every server-originated datagram
/// (PUSH_ACK, PULL_ACK, PULL_RESP); these never repeat the gateway identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownlinkHeader {
    pub token: [u8; 2],
    pub identifier: Identifier,
}

pub fn parse_downlink_header(bytes: &[u8]) -> Result<DownlinkHeader, ParseError> {
    if bytes.len() < 4 {
        return Err(ParseError::Truncated);
    }
    if bytes[0] != PROTOCOL_VERSION {
        return Err(ParseError::InvalidProtocolVersion);
    }
    let identifier =
        Identifier::try_from_primitive(bytes[3]).map_err(|_| ParseError::InvalidIdentifier)?;
    match identifier {
        Identifier::PushAck | Identifier::PullAck | Identifier::PullResp => {}
        Identifier::PushData | Identifier::PullData => return Err(ParseError::UnexpectedUplink),
    }
    Ok(DownlinkHeader {
        token: [bytes[1], bytes[2]],
        identifier,
    })
}
