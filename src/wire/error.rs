use thiserror::Error;

/// Reasons a datagram off the wire could not be turned into a [`super::Packet`].
///
/// These are all "protocol malformed" in the taxonomy of the core: the
/// caller drops the datagram and the loop continues.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("datagram too short")]
    Truncated,
    #[error("invalid protocol version (byte 0)")]
    InvalidProtocolVersion,
    #[error("invalid packet identifier (byte 3)")]
    InvalidIdentifier,
    #[error("utf8 error in JSON body")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("received an uplink datagram where a downlink was expected")]
    UnexpectedUplink,
}

/// Reasons a `datr` or `codr` string could not be decoded.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DataRateError {
    #[error("datarate string too short: {0:?}")]
    TooShort(String),
    #[error("unknown spreading factor in {0:?}")]
    UnknownSpreadingFactor(String),
    #[error("unknown bandwidth in {0:?}")]
    UnknownBandwidth(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown coding rate {0:?}")]
pub struct CodingRateError(pub String);

/// Reasons a PULL_RESP `txpk` object was rejected before scheduling a TX.
///
/// Per the core's error taxonomy this is a "protocol malformed" /
/// "policy reject" condition: the transmission is aborted and the
/// downstream loop continues, it never propagates as a hard error.
#[derive(Error, Debug)]
pub enum TxPkError {
    #[error("txpk is missing both imme and tmst; one is mandatory")]
    MissingTimeField,
    #[error("txpk is missing mandatory field {0}")]
    MissingMandatoryField(&'static str),
    #[error("FSK modulation is not supported for downstream transmission")]
    FskUnsupported,
    #[error("unknown modulation {0:?}")]
    UnknownModulation(String),
    #[error("invalid datarate: {0}")]
    DataRate(#[from] DataRateError),
    #[error("invalid coding rate: {0}")]
    CodingRate(#[from] CodingRateError),
}
