//! Statistics Register: thread-safe counters with an atomic
//! snapshot-and-reset, read by the Reporter every `stat_interval` seconds.
//!
//! Two independent `std::sync::Mutex`-guarded blocks, one per direction.
//! Never held across each other.

use std::sync::Mutex;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamCounters {
    pub nb_rx_rcv: u32,
    pub nb_rx_ok: u32,
    pub nb_rx_bad: u32,
    pub nb_rx_nocrc: u32,
    pub up_pkt_fwd: u32,
    pub up_network_byte: u32,
    pub up_payload_byte: u32,
    pub up_dgram_sent: u32,
    pub up_ack_rcv: u32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownstreamCounters {
    pub dw_pull_sent: u32,
    pub dw_ack_rcv: u32,
    pub dw_dgram_rcv: u32,
    pub dw_network_byte: u32,
    pub dw_payload_byte: u32,
    pub nb_tx_ok: u32,
    pub nb_tx_fail: u32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub up: UpstreamCounters,
    pub down: DownstreamCounters,
}

#[derive(Default)]
pub struct StatsRegister {
    up: Mutex<UpstreamCounters>,
    down: Mutex<DownstreamCounters>,
}

impl StatsRegister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_up(&self, f: impl FnOnce(&mut UpstreamCounters)) {
        let mut up = self.up.lock().expect("upstream stats mutex poisoned");
        f(&mut up);
    }

    pub fn record_down(&self, f: impl FnOnce(&mut DownstreamCounters)) {
        let mut down = self.down.lock().expect("downstream stats mutex poisoned");
        f(&mut down);
    }

    /// Atomically reads then zeroes both counter blocks. The lock that reads
    /// each block is the same one that resets it, per invariant.
    pub fn snapshot_and_reset(&self) -> StatsSnapshot {
        let up = {
            let mut guard = self.up.lock().expect("upstream stats mutex poisoned");
            std::mem::take(&mut *guard)
        };
        let down = {
            let mut guard = self.down.lock().expect("downstream stats mutex poisoned");
            std::mem::take(&mut *guard)
        };
        StatsSnapshot { up, down }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_deltas_then_resets() {
        let stats = StatsRegister::new();
        stats.record_up(|c| {
            c.nb_rx_rcv += 2;
            c.nb_rx_ok += 1;
        });
        stats.record_down(|c| c.dw_pull_sent += 1);

        let snap = stats.snapshot_and_reset();
        assert_eq!(snap.up.nb_rx_rcv, 2);
        assert_eq!(snap.up.nb_rx_ok, 1);
        assert_eq!(snap.down.dw_pull_sent, 1);

        let second = stats.snapshot_and_reset();
        assert_eq!(second, StatsSnapshot::default());
    }

    #[test]
    fn locks_are_independent_per_direction() {
        let stats = StatsRegister::new();
        stats.record_up(|c| c.up_pkt_fwd += 5);
        // Taking the downstream lock while the upstream block holds data
        // must not require the upstream lock at all.
        stats.record_down(|c| c.nb_tx_ok += 1);
        let snap = stats.snapshot_and_reset();
        assert_eq!(snap.up.up_pkt_fwd, 5);
        assert_eq!(snap.down.nb_tx_ok, 1);
    }
}
