//! LoRa ECC coding rate, e.g. `4/5`.
//!
//! Mirrors the teacher crate's `packet::types::CodingRate`, which uses
//! `#[serde(rename(...))]` on each variant; this module keeps the same
//! variant set and adds the plain string codec the upstream engine's
//! manual buffer writer needs.

use super::error::CodingRateError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodingRate {
    _4_5,
    _4_6,
    _4_7,
    _4_8,
    Off,
}

impl CodingRate {
    pub fn as_str(self) -> &'static str {
        match self {
            CodingRate::_4_5 => "4/5",
            CodingRate::_4_6 => "4/6",
            CodingRate::_4_7 => "4/7",
            CodingRate::_4_8 => "4/8",
            CodingRate::Off => "OFF",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CodingRateError> {
        Ok(match s {
            "4/5" => CodingRate::_4_5,
            "4/6" | "2/3" => CodingRate::_4_6,
            "4/7" => CodingRate::_4_7,
            "4/8" | "1/2" => CodingRate::_4_8,
            "OFF" => CodingRate::Off,
            _ => return Err(CodingRateError(s.to_string())),
        })
    }
}

impl fmt::Display for CodingRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accepts_semtech_aliases() {
        assert_eq!(CodingRate::parse("2/3").unwrap(), CodingRate::_4_6);
        assert_eq!(CodingRate::parse("1/2").unwrap(), CodingRate::_4_8);
    }

    #[test]
    fn rejects_unknown() {
        assert!(CodingRate::parse("4/9").is_err());
    }
}
