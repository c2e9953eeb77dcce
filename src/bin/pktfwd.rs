//! CLI entry point wiring configuration, logging, the concentrator driver,
//! and the supervisor together: `structopt` for CLI parsing, a `slog`
//! logger installed as the global scope logger, OS signals driving
//! shutdown.

use lora_pkt_fwd::config;
use lora_pkt_fwd::hal::{Hal, HalError, OutgoingFrame, ReceivedFrame};
use lora_pkt_fwd::logging;
use lora_pkt_fwd::supervisor::{self, ShutdownSignal};
use slog::{error, info, o};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "pktfwd", about = "LoRa concentrator to GWMP bridge")]
struct Opt {
    #[structopt(short, long, parse(from_os_str), default_value = "/etc/lora-pkt-fwd/global_conf.toml")]
    config: PathBuf,
}

/// The concentrator driver itself is out of scope for this core
///; this stub exists only so the binary links and fails
/// loudly instead of pretending to drive hardware it does not have.
struct UnimplementedHal;

impl Hal for UnimplementedHal {
    fn start(&mut self) -> Result<(), HalError> {
        Err(HalError(
            "no concentrator driver wired in; replace UnimplementedHal with a real HAL".into(),
        ))
    }
    fn stop(&mut self) -> Result<(), HalError> {
        Ok(())
    }
    fn receive(&mut self, _max: usize) -> Result<Vec<ReceivedFrame>, HalError> {
        Ok(Vec::new())
    }
    fn send(&mut self, _frame: &OutgoingFrame) -> Result<(), HalError> {
        Err(HalError("no concentrator driver wired in".into()))
    }
    fn version(&self) -> String {
        "unimplemented-hal-0.0".to_string()
    }
}

fn main() {
    let opt = Opt::from_args();

    let config = match config::load(&opt.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let logger = logging::build_logger(config.log_sink, logging::level_from_u8(config.logging_level));
    let scope_guard = slog_scope::set_global_logger(logger.clone());
    let _log_guard = slog_stdlog::init().ok();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime");

    let exit_code = runtime.block_on(async move {
        let (shutdown_signal, shutdown_trigger) = ShutdownSignal::new();

        #[cfg(unix)]
        {
            let trigger = shutdown_trigger.clone();
            tokio::spawn(supervisor::watch_os_signals(trigger));
        }
        #[cfg(not(unix))]
        {
            let trigger = shutdown_trigger.clone();
            tokio::spawn(async move {
                let _ = tokio::signal::ctrl_c().await;
                trigger.trigger(supervisor::ExitReason::Clean);
            });
        }

        info!(logger, "starting"; "gateway_id" => format!("{:016x}", config.gateway_id.0));
        let code = supervisor::run(Box::new(UnimplementedHal), config, logger.clone(), shutdown_signal).await;
        if code != 0 {
            error!(logger, "exiting with non-zero status"; "code" => code);
        }
        code
    });

    runtime.shutdown_timeout(std::time::Duration::from_secs(1));
    drop(scope_guard);
    std::process::exit(exit_code);
}
