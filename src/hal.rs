//! The concentrator hardware access layer (HAL): an opaque collaborator.
//!
//! The driver itself is out of scope here — this module only describes
//! the shape of the interface the core consumes (`start`, `stop`,
//! `receive`, `send`, `version`) as a trait, plus the data records that
//! cross that boundary.

use crate::wire::{Bandwidth, CodingRate, SpreadingFactor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modulation {
    LoRa,
    Fsk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrcStatus {
    Ok,
    Bad,
    Absent,
}

/// Frame handed up from the concentrator by `Hal::receive`.
#[derive(Debug, Clone)]
pub struct ReceivedFrame {
    /// Hardware microsecond timestamp; wraps at 2^32, monotonic otherwise.
    pub timestamp: u32,
    pub if_chain: u8,
    pub rf_chain: u8,
    pub freq_hz: u64,
    pub crc_status: CrcStatus,
    pub modulation: Modulation,
    pub bandwidth: Bandwidth,
    pub spreading_factor: SpreadingFactor,
    pub coding_rate: CodingRate,
    pub rssi: f32,
    pub snr: f32,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    Immediate,
    Timestamped(u32),
}

/// Frame handed down to the concentrator by `Hal::send`.
#[derive(Debug, Clone)]
pub struct OutgoingFrame {
    pub tx_mode: TxMode,
    pub freq_hz: u64,
    pub rf_chain: u8,
    pub power_dbm: i8,
    pub modulation: Modulation,
    pub bandwidth: Bandwidth,
    pub spreading_factor: SpreadingFactor,
    pub coding_rate: CodingRate,
    pub invert_polarity: bool,
    pub preamble_len: u16,
    pub no_crc: bool,
    pub payload: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
#[error("concentrator hardware error: {0}")]
pub struct HalError(pub String);

/// The interface consumed from the concentrator driver.
///
/// Implementations are expected to be cheap to clone/share behind the
/// [`crate::arbiter::ConcentratorArbiter`], which is the only thing allowed
/// to call `receive`/`send`.
pub trait Hal: Send {
    fn start(&mut self) -> Result<(), HalError>;
    fn stop(&mut self) -> Result<(), HalError>;
    fn receive(&mut self, max: usize) -> Result<Vec<ReceivedFrame>, HalError>;
    fn send(&mut self, frame: &OutgoingFrame) -> Result<(), HalError>;
    fn version(&self) -> String;
}

/// A fake concentrator for tests: yields a scripted sequence of receive
/// results and records every send.
#[cfg(any(test, feature = "test-support"))]
pub struct NullHal {
    pub rx_script: std::collections::VecDeque<Vec<ReceivedFrame>>,
    pub sent: Vec<OutgoingFrame>,
    pub fail_next_receive: bool,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for NullHal {
    fn default() -> Self {
        NullHal {
            rx_script: std::collections::VecDeque::new(),
            sent: Vec::new(),
            fail_next_receive: false,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Hal for NullHal {
    fn start(&mut self) -> Result<(), HalError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), HalError> {
        Ok(())
    }

    fn receive(&mut self, max: usize) -> Result<Vec<ReceivedFrame>, HalError> {
        if self.fail_next_receive {
            return Err(HalError("simulated hardware failure".into()));
        }
        let mut batch = self.rx_script.pop_front().unwrap_or_default();
        batch.truncate(max);
        Ok(batch)
    }

    fn send(&mut self, frame: &OutgoingFrame) -> Result<(), HalError> {
        self.sent.push(frame.clone());
        Ok(())
    }

    fn version(&self) -> String {
        "null-hal-0.0".to_string()
    }
}
