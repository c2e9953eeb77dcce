//! `SFxxBWyyy` datarate codec, e.g. `SF7BW125`.
//!
//! Grounded in the teacher crate's `packet::types::DataRate`, which
//! implements the same string as a hand-rolled `Serialize`/`Deserialize`
//! pair rather than deriving it. Restricted here to the LoRa SF/BW pairs
//! this spec recognizes.

use super::error::DataRateError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadingFactor {
    SF7,
    SF8,
    SF9,
    SF10,
    SF11,
    SF12,
}

impl SpreadingFactor {
    pub fn as_u8(self) -> u8 {
        match self {
            SpreadingFactor::SF7 => 7,
            SpreadingFactor::SF8 => 8,
            SpreadingFactor::SF9 => 9,
            SpreadingFactor::SF10 => 10,
            SpreadingFactor::SF11 => 11,
            SpreadingFactor::SF12 => 12,
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            7 => SpreadingFactor::SF7,
            8 => SpreadingFactor::SF8,
            9 => SpreadingFactor::SF9,
            10 => SpreadingFactor::SF10,
            11 => SpreadingFactor::SF11,
            12 => SpreadingFactor::SF12,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bandwidth {
    BW125,
    BW250,
    BW500,
}

impl Bandwidth {
    pub fn as_u16(self) -> u16 {
        match self {
            Bandwidth::BW125 => 125,
            Bandwidth::BW250 => 250,
            Bandwidth::BW500 => 500,
        }
    }

    pub fn from_u16(v: u16) -> Option<Self> {
        Some(match v {
            125 => Bandwidth::BW125,
            250 => Bandwidth::BW250,
            500 => Bandwidth::BW500,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRate {
    pub spreading_factor: SpreadingFactor,
    pub bandwidth: Bandwidth,
}

impl DataRate {
    pub fn new(spreading_factor: SpreadingFactor, bandwidth: Bandwidth) -> Self {
        DataRate {
            spreading_factor,
            bandwidth,
        }
    }

    /// Parses `SFxxBWyyy`. Rejects anything outside SF{7..12} x BW{125,250,500}
    /// without mutating any state, per the bijection invariant in §8.
    pub fn parse(s: &str) -> Result<Self, DataRateError> {
        let rest = s
            .strip_prefix("SF")
            .ok_or_else(|| DataRateError::TooShort(s.to_string()))?;
        let bw_index = rest
            .find("BW")
            .ok_or_else(|| DataRateError::TooShort(s.to_string()))?;
        let (sf_str, bw_str) = rest.split_at(bw_index);
        let bw_str = &bw_str[2..];

        let sf_num: u8 = sf_str
            .parse()
            .map_err(|_| DataRateError::UnknownSpreadingFactor(s.to_string()))?;
        let spreading_factor = SpreadingFactor::from_u8(sf_num)
            .ok_or_else(|| DataRateError::UnknownSpreadingFactor(s.to_string()))?;

        let bw_num: u16 = bw_str
            .parse()
            .map_err(|_| DataRateError::UnknownBandwidth(s.to_string()))?;
        let bandwidth =
            Bandwidth::from_u16(bw_num).ok_or_else(|| DataRateError::UnknownBandwidth(s.to_string()))?;

        Ok(DataRate {
            spreading_factor,
            bandwidth,
        })
    }
}

impl fmt::Display for DataRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SF{}BW{}",
            self.spreading_factor.as_u8(),
            self.bandwidth.as_u16()
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_every_combination() {
        let sfs = [
            SpreadingFactor::SF7,
            SpreadingFactor::SF8,
            SpreadingFactor::SF9,
            SpreadingFactor::SF10,
            SpreadingFactor::SF11,
            SpreadingFactor::SF12,
        ];
        let bws = [Bandwidth::BW125, Bandwidth::BW250, Bandwidth::BW500];
        for sf in sfs {
            for bw in bws {
                let dr = DataRate::new(sf, bw);
                let s = dr.to_string();
                let parsed = DataRate::parse(&s).unwrap();
                assert_eq!(parsed, dr);
            }
        }
    }

    #[test]
    fn rejects_unknown_values_without_state_change() {
        assert!(DataRate::parse("SF6BW125").is_err());
        assert!(DataRate::parse("SF7BW333").is_err());
        assert!(DataRate::parse("garbage").is_err());
    }

    #[test]
    fn sf7bw125_round_trips() {
        let dr = DataRate::new(SpreadingFactor::SF7, Bandwidth::BW125);
        assert_eq!(dr.to_string(), "SF7BW125");
    }
}
