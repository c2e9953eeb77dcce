//! Downstream Engine: keepalive PULL_DATA, PULL_RESP
//! processing, and TX scheduling on the concentrator.

use crate::arbiter::ConcentratorArbiter;
use crate::config::{Config, GatewayId};
use crate::hal::OutgoingFrame;
use crate::stats::StatsRegister;
use crate::wire::txpk::PullResp;
use crate::wire::{self, Identifier};
use slog::{o, warn, Logger};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;

pub struct DownstreamEngine {
    arbiter: ConcentratorArbiter,
    stats: Arc<StatsRegister>,
    socket: UdpSocket,
    gateway_id: GatewayId,
    keepalive_interval: Duration,
    pull_timeout: Duration,
    logger: Logger,
}

impl DownstreamEngine {
    pub fn new(
        arbiter: ConcentratorArbiter,
        stats: Arc<StatsRegister>,
        socket: UdpSocket,
        config: &Config,
        logger: Logger,
    ) -> Self {
        DownstreamEngine {
            arbiter,
            stats,
            socket,
            gateway_id: config.gateway_id,
            keepalive_interval: Duration::from_secs(config.keepalive_interval_s),
            pull_timeout: Duration::from_millis(config.pull_timeout_ms),
            logger: logger.new(o!("component" => "downstream")),
        }
    }

    pub async fn run(&self, should_exit: Arc<AtomicBool>) {
        while !should_exit.load(Ordering::Relaxed) {
            self.iterate(&should_exit).await;
        }
    }

    async fn iterate(&self, should_exit: &Arc<AtomicBool>) {
        let token = wire::random_token();
        let mut datagram = Vec::with_capacity(12);
        wire::write_uplink_header(&mut datagram, token, Identifier::PullData, self.gateway_id);
        if self.socket.send(&datagram).await.is_err() {
            return;
        }
        self.stats.record_down(|c| c.dw_pull_sent += 1);

        let mut req_ack = false;
        let requ_time = Instant::now();
        let mut now = requ_time;
        let mut buf = [0u8; 2048];

        while now.duration_since(requ_time) < self.keepalive_interval {
            if should_exit.load(Ordering::Relaxed) {
                return;
            }
            let recv = tokio::time::timeout(self.pull_timeout, self.socket.recv(&mut buf)).await;
            now = Instant::now();
            let n = match recv {
                Ok(Ok(n)) => n,
                _ => continue,
            };
            self.handle_datagram(&buf[..n], token, &mut req_ack).await;
        }
    }

    async fn handle_datagram(&self, datagram: &[u8], sent_token: [u8; 2], req_ack: &mut bool) {
        let header = match wire::parse_downlink_header(datagram) {
            Ok(h) => h,
            Err(_) => return,
        };
        match header.identifier {
            Identifier::PullAck => {
                if header.token != sent_token {
                    return;
                }
                if !*req_ack {
                    *req_ack = true;
                    self.stats.record_down(|c| c.dw_ack_rcv += 1);
                } else {
                    warn!(self.logger, "duplicate PULL_ACK ignored"; "token" => format!("{:?}", header.token));
                }
            }
            Identifier::PullResp => self.process_pull_resp(datagram).await,
            Identifier::PushAck | Identifier::PushData | Identifier::PullData => {}
        }
    }

    /// `datagram` is the full received PULL_RESP, header included; the JSON
    /// body lives at offset 4 but counters are charged against the whole
    /// datagram, matching how `up_network_byte` is charged on the upstream
    /// side (the full PUSH_DATA datagram, not just the `rxpk` body).
    async fn process_pull_resp(&self, datagram: &[u8]) {
        let parsed: PullResp = match wire::txpk::parse_body(&datagram[4..]) {
            Ok(p) => p,
            Err(e) => {
                warn!(self.logger, "malformed PULL_RESP body"; "error" => %e);
                return;
            }
        };

        let (frame, size_mismatch) = match parsed.txpk.into_outgoing_frame() {
            Ok(ok) => ok,
            Err(e) => {
                warn!(self.logger, "txpk rejected, TX aborted"; "error" => %e);
                return;
            }
        };
        if size_mismatch {
            warn!(self.logger, "txpk payload length disagrees with declared size; submitting anyway");
        }

        self.stats.record_down(|c| {
            c.dw_dgram_rcv += 1;
            c.dw_network_byte += datagram.len() as u32;
            c.dw_payload_byte += frame.payload.len() as u32;
        });

        self.schedule(frame).await;
    }

    async fn schedule(&self, frame: OutgoingFrame) {
        match self.arbiter.send(&frame).await {
            Ok(()) => self.stats.record_down(|c| c.nb_tx_ok += 1),
            Err(e) => {
                warn!(self.logger, "HAL send failed"; "error" => %e);
                self.stats.record_down(|c| c.nb_tx_fail += 1);
            }
        }
    }
}
