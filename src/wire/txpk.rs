//! The `txpk` object carried by a PULL_RESP body.
//!
//! Unlike `rxpk`, field order doesn't matter here and the input needs real
//! validation, so this side is modeled with `serde::Deserialize` rather
//! than hand-parsed, matching the asymmetry calls out.

use super::error::{ParseError, TxPkError};
use super::{Bandwidth, CodingRate, DataRate};
use crate::hal::{Modulation, OutgoingFrame, TxMode};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PullResp {
    pub txpk: TxPk,
}

/// Parses the JSON body carried at offset 4 of a PULL_RESP datagram.
/// Validates UTF-8 explicitly before handing off to `serde_json` so a
/// non-UTF-8 body is reported distinctly from a body that is valid UTF-8
/// but malformed JSON.
pub fn parse_body(body: &[u8]) -> Result<PullResp, ParseError> {
    let text = std::str::from_utf8(body)?;
    Ok(serde_json::from_str(text)?)
}

#[derive(Debug, Deserialize)]
pub struct TxPk {
    pub imme: Option<bool>,
    pub tmst: Option<u32>,
    pub freq: f64,
    pub rfch: u8,
    pub powe: Option<i8>,
    pub modu: String,
    pub datr: Option<String>,
    pub codr: Option<String>,
    pub ipol: Option<bool>,
    pub prea: Option<u16>,
    pub ncrc: Option<bool>,
    pub size: u32,
    #[serde(with = "super::base64")]
    pub data: Vec<u8>,
}

impl TxPk {
    /// Validates and converts into the frame handed to the HAL. Any
    /// violation aborts the TX; the
    /// base64-length mismatch is the sole exception that still submits,
    /// leaving the caller to log a warning.
    pub fn into_outgoing_frame(self) -> Result<(OutgoingFrame, bool), TxPkError> {
        let tx_mode = match (self.imme, self.tmst) {
            (Some(true), _) => TxMode::Immediate,
            (_, Some(tmst)) => TxMode::Timestamped(tmst),
            _ => return Err(TxPkError::MissingTimeField),
        };

        let modulation = match self.modu.as_str() {
            "LORA" => Modulation::LoRa,
            "FSK" => return Err(TxPkError::FskUnsupported),
            other => return Err(TxPkError::UnknownModulation(other.to_string())),
        };

        let datr = self
            .datr
            .ok_or(TxPkError::MissingMandatoryField("datr"))?;
        let DataRate {
            spreading_factor,
            bandwidth,
        } = DataRate::parse(&datr)?;

        let codr = self
            .codr
            .ok_or(TxPkError::MissingMandatoryField("codr"))?;
        let coding_rate = CodingRate::parse(&codr)?;

        let preamble_len = self.prea.map(|p| p.max(6)).unwrap_or(6);
        let size_mismatch = self.data.len() as u32 != self.size;

        let frame = OutgoingFrame {
            tx_mode,
            freq_hz: (self.freq * 1_000_000.0).round() as u64,
            rf_chain: self.rfch,
            power_dbm: self.powe.unwrap_or(0),
            modulation,
            bandwidth,
            spreading_factor,
            coding_rate,
            invert_polarity: self.ipol.unwrap_or(false),
            preamble_len,
            no_crc: self.ncrc.unwrap_or(false),
            payload: self.data,
        };
        Ok((frame, size_mismatch))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::wire::{Bandwidth, SpreadingFactor};

    fn parse(json: &str) -> TxPk {
        let resp: PullResp = serde_json::from_str(json).unwrap();
        resp.txpk
    }

    #[test]
    fn immediate_lora_txpk_converts_to_outgoing_frame() {
        let txpk = parse(
            r#"{"txpk":{"imme":true,"freq":868.1,"rfch":0,"modu":"LORA","datr":"SF9BW125","codr":"4/5","size":4,"data":"ASNFZw=="}}"#,
        );
        let (frame, mismatch) = txpk.into_outgoing_frame().unwrap();
        assert_eq!(frame.tx_mode, TxMode::Immediate);
        assert_eq!(frame.freq_hz, 868_100_000);
        assert_eq!(frame.spreading_factor, SpreadingFactor::SF9);
        assert_eq!(frame.bandwidth, Bandwidth::BW125);
        assert_eq!(frame.coding_rate, CodingRate::_4_5);
        assert_eq!(frame.payload, vec![0x01, 0x23, 0x45, 0x67]);
        assert!(!mismatch);
    }

    #[test]
    fn missing_datr_is_rejected() {
        let txpk = parse(r#"{"txpk":{"imme":true,"rfch":0,"modu":"LORA","size":0,"data":""}}"#);
        assert!(txpk.into_outgoing_frame().is_err());
    }

    #[test]
    fn fsk_is_rejected() {
        let txpk = parse(
            r#"{"txpk":{"imme":true,"freq":868.1,"rfch":0,"modu":"FSK","size":0,"data":""}}"#,
        );
        assert!(matches!(
            txpk.into_outgoing_frame(),
            Err(TxPkError::FskUnsupported)
        ));
    }

    #[test]
    fn preamble_is_clamped_to_minimum_six() {
        let txpk = parse(
            r#"{"txpk":{"imme":true,"freq":868.1,"rfch":0,"modu":"LORA","datr":"SF7BW125","codr":"4/5","prea":3,"size":0,"data":""}}"#,
        );
        let (frame, _) = txpk.into_outgoing_frame().unwrap();
        assert_eq!(frame.preamble_len, 6);
    }

    #[test]
    fn base64_size_mismatch_still_submits() {
        let txpk = parse(
            r#"{"txpk":{"imme":true,"freq":868.1,"rfch":0,"modu":"LORA","datr":"SF7BW125","codr":"4/5","size":99,"data":"QUJD"}}"#,
        );
        let (_, mismatch) = txpk.into_outgoing_frame().unwrap();
        assert!(mismatch);
    }

    #[test]
    fn parse_body_rejects_invalid_utf8() {
        let err = parse_body(&[0xff, 0xfe, 0xfd]).unwrap_err();
        assert!(matches!(err, ParseError::Utf8(_)));
    }

    #[test]
    fn parse_body_rejects_malformed_json() {
        let err = parse_body(b"{not json").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson(_)));
    }

    #[test]
    fn parse_body_accepts_well_formed_pull_resp() {
        let body = br#"{"txpk":{"imme":true,"freq":868.1,"rfch":0,"modu":"LORA","datr":"SF7BW125","codr":"4/5","size":0,"data":""}}"#;
        assert!(parse_body(body).is_ok());
    }
}
