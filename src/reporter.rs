//! Reporter: periodic formatted snapshot of the stats
//! register, logged through the abstract sink.

use crate::stats::{StatsRegister, StatsSnapshot};
use slog::{info, o, Logger};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct Reporter {
    stats: Arc<StatsRegister>,
    interval: Duration,
    logger: Logger,
}

impl Reporter {
    pub fn new(stats: Arc<StatsRegister>, interval_s: u64, logger: Logger) -> Self {
        Reporter {
            stats,
            interval: Duration::from_secs(interval_s),
            logger: logger.new(o!("component" => "reporter")),
        }
    }

    pub async fn run(&self, should_exit: Arc<AtomicBool>) {
        while !should_exit.load(Ordering::Relaxed) {
            tokio::time::sleep(self.interval).await;
            if should_exit.load(Ordering::Relaxed) {
                return;
            }
            let snapshot = self.stats.snapshot_and_reset();
            self.emit(&snapshot);
        }
    }

    fn emit(&self, snap: &StatsSnapshot) {
        let report = format_report(snap);
        info!(self.logger, "{}", report);
    }
}

fn ratio(num: u32, den: u32) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn format_report(snap: &StatsSnapshot) -> String {
    let rx_ok_ratio = ratio(snap.up.nb_rx_ok, snap.up.nb_rx_rcv);
    let rx_bad_ratio = ratio(snap.up.nb_rx_bad, snap.up.nb_rx_rcv);
    let rx_nocrc_ratio = ratio(snap.up.nb_rx_nocrc, snap.up.nb_rx_rcv);
    let up_ack_ratio = ratio(snap.up.up_ack_rcv, snap.up.up_dgram_sent);
    let dw_ack_ratio = ratio(snap.down.dw_ack_rcv, snap.down.dw_pull_sent);

    format!(
        "##### STATISTICS #####\n\
         RX received: {nb_rx_rcv} (ok: {rx_ok_ratio:.2}%, bad: {rx_bad_ratio:.2}%, nocrc: {rx_nocrc_ratio:.2}%)\n\
         RX forwarded: {up_pkt_fwd} ({up_payload_byte} bytes)\n\
         PUSH_DATA datagrams sent: {up_dgram_sent}, acked: {up_ack_ratio:.2}%\n\
         PULL_DATA sent: {dw_pull_sent}, acked: {dw_ack_ratio:.2}%\n\
         TX: {nb_tx_ok} ok, {nb_tx_fail} failed\n\
         ######################",
        nb_rx_rcv = snap.up.nb_rx_rcv,
        rx_ok_ratio = rx_ok_ratio * 100.0,
        rx_bad_ratio = rx_bad_ratio * 100.0,
        rx_nocrc_ratio = rx_nocrc_ratio * 100.0,
        up_pkt_fwd = snap.up.up_pkt_fwd,
        up_payload_byte = snap.up.up_payload_byte,
        up_dgram_sent = snap.up.up_dgram_sent,
        up_ack_ratio = up_ack_ratio * 100.0,
        dw_pull_sent = snap.down.dw_pull_sent,
        dw_ack_ratio = dw_ack_ratio * 100.0,
        nb_tx_ok = snap.down.nb_tx_ok,
        nb_tx_fail = snap.down.nb_tx_fail,
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::stats::{DownstreamCounters, UpstreamCounters};

    #[test]
    fn ratios_default_to_zero_on_empty_denominator() {
        let snap = StatsSnapshot::default();
        let report = format_report(&snap);
        assert!(report.contains("ok: 0.00%"));
        assert!(report.contains("acked: 0.00%"));
    }

    #[test]
    fn ratios_reflect_recorded_counters() {
        let snap = StatsSnapshot {
            up: UpstreamCounters {
                nb_rx_rcv: 4,
                nb_rx_ok: 3,
                nb_rx_bad: 1,
                up_dgram_sent: 2,
                up_ack_rcv: 1,
                ..Default::default()
            },
            down: DownstreamCounters {
                dw_pull_sent: 10,
                dw_ack_rcv: 5,
                ..Default::default()
            },
        };
        assert_eq!(ratio(snap.up.nb_rx_ok, snap.up.nb_rx_rcv), 0.75);
        assert_eq!(ratio(snap.down.dw_ack_rcv, snap.down.dw_pull_sent), 0.5);
    }
}
