//! Core of a LoRa packet forwarder: a bridge between a radio concentrator
//! HAL and a GWMP (Semtech UDP) network server.
//!
//! The HAL driver, configuration-file loading, logging transport, and
//! process signal wiring are all external collaborators this crate
//! consumes rather than implements; see [`hal`], [`config`], [`logging`],
//! and [`supervisor`] respectively.

pub mod arbiter;
pub mod clock;
pub mod config;
pub mod downstream;
pub mod hal;
pub mod logging;
pub mod reporter;
pub mod stats;
pub mod supervisor;
pub mod upstream;
pub mod wire;
