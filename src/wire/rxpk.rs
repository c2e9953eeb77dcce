//! The `rxpk` object embedded in a PUSH_DATA body.
//!
//! Written with direct buffer appends rather than through `serde_json`:
//! exact control over key order and numeric formatting matters more here
//! than a derived `Serialize` would buy.

use super::{Bandwidth, CodingRate, SpreadingFactor};
use crate::hal::{CrcStatus, Modulation, ReceivedFrame};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt::Write as _;

pub struct RxPk<'a> {
    pub tmst: u32,
    pub time: &'a str,
    pub chan: u8,
    pub rfch: u8,
    pub freq_hz: u64,
    pub crc_status: CrcStatus,
    pub modulation: Modulation,
    pub bandwidth: Bandwidth,
    pub spreading_factor: SpreadingFactor,
    pub coding_rate: CodingRate,
    pub lsnr: f32,
    pub rssi: f32,
    pub payload: &'a [u8],
}

impl<'a> RxPk<'a> {
    pub fn from_frame(frame: &'a ReceivedFrame, time: &'a str) -> Self {
        RxPk {
            tmst: frame.timestamp,
            time,
            chan: frame.if_chain,
            rfch: frame.rf_chain,
            freq_hz: frame.freq_hz,
            crc_status: frame.crc_status,
            modulation: frame.modulation,
            bandwidth: frame.bandwidth,
            spreading_factor: frame.spreading_factor,
            coding_rate: frame.coding_rate,
            lsnr: frame.snr,
            rssi: frame.rssi,
            payload: &frame.payload,
        }
    }

    /// Appends one JSON object (`{...}`, no trailing comma) to `out`.
    pub fn write_object(&self, out: &mut String) {
        let stat = match self.crc_status {
            CrcStatus::Ok => 1,
            CrcStatus::Bad => -1,
            CrcStatus::Absent => 0,
        };
        let _ = write!(
            out,
            "{{\"tmst\":{},\"time\":\"{}\",\"chan\":{},\"rfch\":{},\"freq\":{:.6},\"stat\":{},\"modu\":\"{}\"",
            self.tmst,
            self.time,
            self.chan,
            self.rfch,
            self.freq_hz as f64 / 1_000_000.0,
            stat,
            match self.modulation {
                Modulation::LoRa => "LORA",
                Modulation::Fsk => "FSK",
            },
        );
        if let Modulation::LoRa = self.modulation {
            let datr = super::DataRate::new(self.spreading_factor, self.bandwidth);
            let _ = write!(
                out,
                ",\"datr\":\"{}\",\"codr\":\"{}\",\"lsnr\":{:.1}",
                datr,
                self.coding_rate,
                self.lsnr
            );
        }
        let _ = write!(
            out,
            ",\"rssi\":{},\"size\":{},\"data\":\"{}\"}}",
            self.rssi.round() as i32,
            self.payload.len(),
            STANDARD.encode(self.payload),
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::wire::{Bandwidth, CodingRate, SpreadingFactor};

    #[test]
    fn lora_frame_serializes_expected_fields() {
        let frame = ReceivedFrame {
            timestamp: 12345,
            if_chain: 0,
            rf_chain: 0,
            freq_hz: 868_100_000,
            crc_status: CrcStatus::Ok,
            modulation: Modulation::LoRa,
            bandwidth: Bandwidth::BW125,
            spreading_factor: SpreadingFactor::SF7,
            coding_rate: CodingRate::_4_5,
            rssi: -42.0,
            snr: 7.5,
            payload: b"ABC".to_vec(),
        };
        let time = "2021-02-03T19:03:46.500349Z";
        let rxpk = RxPk::from_frame(&frame, time);
        let mut out = String::new();
        rxpk.write_object(&mut out);

        assert!(out.contains("\"modu\":\"LORA\""));
        assert!(out.contains("\"datr\":\"SF7BW125\""));
        assert!(out.contains("\"codr\":\"4/5\""));
        assert!(out.contains("\"lsnr\":7.5"));
        assert!(out.contains("\"rssi\":-42"));
        assert!(out.contains("\"size\":3"));
        assert!(out.contains("\"data\":\"QUJD\""));
        assert!(out.starts_with('{'));
        assert!(out.ends_with('}'));
    }

    #[test]
    fn fsk_frame_omits_lora_only_fields() {
        let frame = ReceivedFrame {
            timestamp: 0,
            if_chain: 1,
            rf_chain: 0,
            freq_hz: 868_500_000,
            crc_status: CrcStatus::Absent,
            modulation: Modulation::Fsk,
            bandwidth: Bandwidth::BW125,
            spreading_factor: SpreadingFactor::SF7,
            coding_rate: CodingRate::Off,
            rssi: -90.0,
            snr: 0.0,
            payload: vec![],
        };
        let rxpk = RxPk::from_frame(&frame, "2021-01-01T00:00:00.000000Z");
        let mut out = String::new();
        rxpk.write_object(&mut out);
        assert!(!out.contains("datr"));
        assert!(!out.contains("codr"));
        assert!(!out.contains("lsnr"));
        assert!(out.contains("\"modu\":\"FSK\""));
        assert!(out.contains("\"stat\":0"));
    }
}
