//! Upstream Engine: fetch → filter → serialize → send →
//! ack-match loop.
//!
//! Grounded in the teacher crate's `client_runtime::Rx`/`Tx` actor split,
//! generalized here into a single loop since the spec has no need for the
//! mpsc fan-out the teacher's multi-client mux supports.

use crate::arbiter::ConcentratorArbiter;
use crate::clock::iso8601_now;
use crate::config::{Config, FilterPolicy, GatewayId};
use crate::stats::StatsRegister;
use crate::wire::{self, rxpk::RxPk, Identifier};
use slog::{debug, o, warn, Logger};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;

/// Maximum frames fetched from the concentrator per iteration.
pub const NB_PKT_MAX: usize = 8;
const FETCH_BACKOFF: Duration = Duration::from_millis(10);

pub struct UpstreamEngine {
    arbiter: ConcentratorArbiter,
    stats: Arc<StatsRegister>,
    socket: UdpSocket,
    gateway_id: GatewayId,
    filter: FilterPolicy,
    push_timeout_half: Duration,
    logger: Logger,
}

impl UpstreamEngine {
    pub fn new(
        arbiter: ConcentratorArbiter,
        stats: Arc<StatsRegister>,
        socket: UdpSocket,
        config: &Config,
        logger: Logger,
    ) -> Self {
        UpstreamEngine {
            arbiter,
            stats,
            socket,
            gateway_id: config.gateway_id,
            filter: config.filter,
            push_timeout_half: Duration::from_millis(config.push_timeout_half_ms),
            logger: logger.new(o!("component" => "upstream")),
        }
    }

    /// Runs until `should_exit` is set, then returns once the current
    /// fetch cycle drains.
    pub async fn run(&self, should_exit: Arc<std::sync::atomic::AtomicBool>) {
        use std::sync::atomic::Ordering;
        while !should_exit.load(Ordering::Relaxed) {
            if let Err(e) = self.iterate().await {
                // HAL fetch failure is fatal to this engine.
                warn!(self.logger, "upstream engine stopping"; "error" => %e);
                return;
            }
        }
    }

    async fn iterate(&self) -> Result<(), crate::hal::HalError> {
        let frames = self.arbiter.receive(NB_PKT_MAX).await?;
        if frames.is_empty() {
            tokio::time::sleep(FETCH_BACKOFF).await;
            return Ok(());
        }

        let time = iso8601_now();
        let token = wire::random_token();
        let mut datagram = Vec::with_capacity(256);
        wire::write_uplink_header(&mut datagram, token, Identifier::PushData, self.gateway_id);

        let mut body = String::from("{\"rxpk\":[");
        let mut admitted = 0u32;
        let mut payload_bytes = 0u32;

        for frame in &frames {
            self.stats.record_up(|c| c.nb_rx_rcv += 1);
            match frame.crc_status {
                crate::hal::CrcStatus::Ok => self.stats.record_up(|c| c.nb_rx_ok += 1),
                crate::hal::CrcStatus::Bad => self.stats.record_up(|c| c.nb_rx_bad += 1),
                crate::hal::CrcStatus::Absent => self.stats.record_up(|c| c.nb_rx_nocrc += 1),
            }
            if !self.filter.admits(frame.crc_status) {
                continue;
            }
            if admitted > 0 {
                body.push(',');
            }
            RxPk::from_frame(frame, &time).write_object(&mut body);
            admitted += 1;
            payload_bytes += frame.payload.len() as u32;
            debug!(self.logger, "accepted frame for upstream"; "chan" => frame.if_chain);
        }
        body.push_str("]}");

        if admitted == 0 {
            return Ok(());
        }

        datagram.extend_from_slice(body.as_bytes());

        self.stats.record_up(|c| {
            c.up_pkt_fwd += admitted;
            c.up_payload_byte += payload_bytes;
            c.up_network_byte += datagram.len() as u32;
        });

        if self.socket.send(&datagram).await.is_err() {
            // Network transient: not retried, silently tolerated.
            return Ok(());
        }
        self.stats.record_up(|c| c.up_dgram_sent += 1);

        self.await_ack(token).await;
        Ok(())
    }

    /// Attempts ack reception up to twice, tolerating stray/duplicate
    /// replies.
    async fn await_ack(&self, token: [u8; 2]) {
        let mut buf = [0u8; 16];
        for _ in 0..2 {
            let recv = tokio::time::timeout(self.push_timeout_half, self.socket.recv(&mut buf)).await;
            let n = match recv {
                Ok(Ok(n)) => n,
                _ => return,
            };
            if n < 4 || buf[0] != wire::PROTOCOL_VERSION || buf[3] != Identifier::PushAck as u8 {
                continue;
            }
            if [buf[1], buf[2]] == token {
                self.stats.record_up(|c| c.up_ack_rcv += 1);
                return;
            }
        }
    }
}
